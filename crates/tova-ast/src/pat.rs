//! Match patterns.
//!
//! Range patterns are their own kind here: the parser normalizes any
//! literal-with-range spelling into [`RangePat`] before the analyzer runs,
//! so matcher paths see a single representation.

use serde::{Deserialize, Serialize};
use tova_common::Loc;

/// A literal value inside a pattern.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum LitValue {
    Number(f64),
    String(String),
    Bool(bool),
    Nil,
}

/// Any pattern node.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    Wildcard(WildcardPat),
    Binding(BindingPat),
    Literal(LiteralPat),
    Range(RangePat),
    Tuple(TuplePat),
    Array(ArrayPat),
    Variant(VariantPat),
    Or(OrPat),
    #[serde(other)]
    Unknown,
}

impl Pattern {
    pub fn loc(&self) -> Option<Loc> {
        match self {
            Pattern::Wildcard(p) => p.loc,
            Pattern::Binding(p) => p.loc,
            Pattern::Literal(p) => p.loc,
            Pattern::Range(p) => p.loc,
            Pattern::Tuple(p) => p.loc,
            Pattern::Array(p) => p.loc,
            Pattern::Variant(p) => p.loc,
            Pattern::Or(p) => p.loc,
            Pattern::Unknown => None,
        }
    }

    /// Whether this pattern matches every value of the subject type:
    /// a wildcard, or an unguarded name binding.
    pub fn is_catch_all(&self) -> bool {
        matches!(self, Pattern::Wildcard(_) | Pattern::Binding(_))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WildcardPat {
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BindingPat {
    pub name: String,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LiteralPat {
    pub value: LitValue,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RangePat {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub inclusive: bool,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TuplePat {
    pub elements: Vec<Pattern>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArrayPat {
    pub elements: Vec<Pattern>,
    /// Trailing `..rest` binding, if present.
    #[serde(default)]
    pub rest: Option<String>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A named field inside a variant pattern: `Rect { w: width }`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NamedFieldPat {
    pub name: String,
    pub pattern: Pattern,
}

/// An ADT variant pattern: `Circle(r)` or `Rect { w, h }`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VariantPat {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Pattern>,
    #[serde(default)]
    pub fields: Vec<NamedFieldPat>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrPat {
    pub alternatives: Vec<Pattern>,
    #[serde(default)]
    pub loc: Option<Loc>,
}
