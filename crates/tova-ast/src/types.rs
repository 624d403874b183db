//! Type annotation expressions.
//!
//! These are syntax, not semantics: the analyzer's `ty` module converts
//! them into its own algebra. `Infer` is the `_` wildcard.

use serde::{Deserialize, Serialize};
use tova_common::Loc;

/// Any type annotation node.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TypeExpr {
    Named(NamedType),
    Array(ArrayType),
    Tuple(TupleType),
    Function(FunctionType),
    Union(UnionType),
    Record(RecordType),
    Nil(NilType),
    Any(AnyType),
    Infer(InferType),
    #[serde(other)]
    Unknown,
}

impl TypeExpr {
    pub fn loc(&self) -> Option<Loc> {
        match self {
            TypeExpr::Named(t) => t.loc,
            TypeExpr::Array(t) => t.loc,
            TypeExpr::Tuple(t) => t.loc,
            TypeExpr::Function(t) => t.loc,
            TypeExpr::Union(t) => t.loc,
            TypeExpr::Record(t) => t.loc,
            TypeExpr::Nil(t) => t.loc,
            TypeExpr::Any(t) => t.loc,
            TypeExpr::Infer(t) => t.loc,
            TypeExpr::Unknown => None,
        }
    }
}

/// A named type, possibly with generic arguments: `User`, `Option<Int>`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NamedType {
    pub name: String,
    #[serde(default)]
    pub args: Vec<TypeExpr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArrayType {
    pub element: Box<TypeExpr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TupleType {
    pub elements: Vec<TypeExpr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FunctionType {
    pub params: Vec<TypeExpr>,
    pub ret: Box<TypeExpr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnionType {
    pub members: Vec<TypeExpr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordTypeField {
    pub name: String,
    pub ty: TypeExpr,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordType {
    pub fields: Vec<RecordTypeField>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NilType {
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnyType {
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InferType {
    #[serde(default)]
    pub loc: Option<Loc>,
}
