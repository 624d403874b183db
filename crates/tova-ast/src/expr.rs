//! Expression nodes.
//!
//! Covers all expression forms: literals, template strings, binary/unary/
//! logical operators, chained comparisons, membership tests, calls, member
//! and optional-chain access, pipes, lambdas, match, array/object literals,
//! comprehensions, ranges, slices, spread, propagate (`?`), await, yield,
//! tuples, if-expressions, JSX, and data-block column expressions.

use serde::{Deserialize, Serialize};
use tova_common::Loc;

use crate::pat::Pattern;
use crate::stmt::Stmt;
use crate::types::TypeExpr;

// ── Operators ────────────────────────────────────────────────────────────

/// Binary operators, including the string-concatenation `++` and the
/// comparison family used by chained comparisons.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Mod,
    #[serde(rename = "**")]
    Pow,
    #[serde(rename = "++")]
    Concat,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl BinaryOp {
    /// Whether this operator is a comparison (result type `Bool`).
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    /// Whether this operator is arithmetic (`+ - * / % **`).
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod | BinaryOp::Pow
        )
    }

    /// Surface spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Concat => "++",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    #[serde(rename = "-")]
    Neg,
    #[serde(rename = "not")]
    Not,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    #[serde(rename = "and")]
    And,
    #[serde(rename = "or")]
    Or,
}

// ── Expr enum ────────────────────────────────────────────────────────────

/// Any expression node.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expr {
    Identifier(Identifier),
    NumberLit(NumberLit),
    StringLit(StringLit),
    TemplateLit(TemplateLit),
    BoolLit(BoolLit),
    NilLit(NilLit),
    BinaryExpr(BinaryExpr),
    UnaryExpr(UnaryExpr),
    LogicalExpr(LogicalExpr),
    ChainedCompare(ChainedCompare),
    Membership(Membership),
    CallExpr(CallExpr),
    MemberExpr(MemberExpr),
    PipeExpr(PipeExpr),
    LambdaExpr(LambdaExpr),
    MatchExpr(MatchExpr),
    ArrayLit(ArrayLit),
    ObjectLit(ObjectLit),
    ListComp(ListComp),
    DictComp(DictComp),
    RangeExpr(RangeExpr),
    SliceExpr(SliceExpr),
    SpreadExpr(SpreadExpr),
    PropagateExpr(PropagateExpr),
    AwaitExpr(AwaitExpr),
    YieldExpr(YieldExpr),
    TupleExpr(TupleExpr),
    IfExpr(IfExpr),
    JsxElement(JsxElement),
    JsxFragment(JsxFragment),
    ColumnExpr(ColumnExpr),
    /// Any node tag outside the closed set. Downstream passes no-op on it.
    #[serde(other)]
    Unknown,
}

impl Expr {
    /// The node's source location, when the parser recorded one.
    pub fn loc(&self) -> Option<Loc> {
        match self {
            Expr::Identifier(n) => n.loc,
            Expr::NumberLit(n) => n.loc,
            Expr::StringLit(n) => n.loc,
            Expr::TemplateLit(n) => n.loc,
            Expr::BoolLit(n) => n.loc,
            Expr::NilLit(n) => n.loc,
            Expr::BinaryExpr(n) => n.loc,
            Expr::UnaryExpr(n) => n.loc,
            Expr::LogicalExpr(n) => n.loc,
            Expr::ChainedCompare(n) => n.loc,
            Expr::Membership(n) => n.loc,
            Expr::CallExpr(n) => n.loc,
            Expr::MemberExpr(n) => n.loc,
            Expr::PipeExpr(n) => n.loc,
            Expr::LambdaExpr(n) => n.loc,
            Expr::MatchExpr(n) => n.loc,
            Expr::ArrayLit(n) => n.loc,
            Expr::ObjectLit(n) => n.loc,
            Expr::ListComp(n) => n.loc,
            Expr::DictComp(n) => n.loc,
            Expr::RangeExpr(n) => n.loc,
            Expr::SliceExpr(n) => n.loc,
            Expr::SpreadExpr(n) => n.loc,
            Expr::PropagateExpr(n) => n.loc,
            Expr::AwaitExpr(n) => n.loc,
            Expr::YieldExpr(n) => n.loc,
            Expr::TupleExpr(n) => n.loc,
            Expr::IfExpr(n) => n.loc,
            Expr::JsxElement(n) => n.loc,
            Expr::JsxFragment(n) => n.loc,
            Expr::ColumnExpr(n) => n.loc,
            Expr::Unknown => None,
        }
    }
}

// ── Literals ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A numeric literal. Tova numbers are a single surface form; the analyzer
/// types integral values as `Int` and the rest as `Float`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NumberLit {
    pub value: f64,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StringLit {
    pub value: String,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// One segment of a template string.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TemplatePart {
    Text(String),
    Interp(Expr),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateLit {
    pub parts: Vec<TemplatePart>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoolLit {
    pub value: bool,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NilLit {
    #[serde(default)]
    pub loc: Option<Loc>,
}

// ── Operators ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogicalExpr {
    pub op: LogicalOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A chained comparison like `1 < x <= 10`: n operands joined by n-1
/// comparison operators.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainedCompare {
    pub operands: Vec<Expr>,
    pub ops: Vec<BinaryOp>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A membership test: `x in xs` / `x not in xs`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Membership {
    pub item: Box<Expr>,
    pub collection: Box<Expr>,
    #[serde(default)]
    pub negated: bool,
    #[serde(default)]
    pub loc: Option<Loc>,
}

// ── Calls & access ───────────────────────────────────────────────────────

/// One call argument: positional, named (`name: value`), or spread.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Arg {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub spread: bool,
    pub value: Expr,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Arg>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// Member access `obj.prop`, or optional-chain access `obj?.prop`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemberExpr {
    pub object: Box<Expr>,
    pub property: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipeExpr {
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

// ── Lambdas & match ──────────────────────────────────────────────────────

/// A function parameter. A parameter with a default is optional at call
/// sites, which is what splits required from total counts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(default)]
    pub ty: Option<TypeExpr>,
    #[serde(default)]
    pub default: Option<Expr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A lambda body: a bare expression (implicit return) or a block.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Vec<Stmt>),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LambdaExpr {
    pub params: Vec<Param>,
    pub body: LambdaBody,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// One `pattern => body` clause.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchArm {
    pub pattern: Pattern,
    #[serde(default)]
    pub guard: Option<Expr>,
    pub body: LambdaBody,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchExpr {
    pub subject: Box<Expr>,
    pub arms: Vec<MatchArm>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

// ── Collections ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArrayLit {
    pub elements: Vec<Expr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub key: String,
    pub value: Expr,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectLit {
    pub entries: Vec<ObjectEntry>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// `[element for name in iter if condition]`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListComp {
    pub element: Box<Expr>,
    pub binding: String,
    pub iter: Box<Expr>,
    #[serde(default)]
    pub condition: Option<Box<Expr>>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// `{key: value for name in iter if condition}`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DictComp {
    pub key: Box<Expr>,
    pub value: Box<Expr>,
    pub binding: String,
    pub iter: Box<Expr>,
    #[serde(default)]
    pub condition: Option<Box<Expr>>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RangeExpr {
    pub start: Box<Expr>,
    pub end: Box<Expr>,
    #[serde(default)]
    pub inclusive: bool,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SliceExpr {
    pub object: Box<Expr>,
    #[serde(default)]
    pub start: Option<Box<Expr>>,
    #[serde(default)]
    pub end: Option<Box<Expr>>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpreadExpr {
    pub value: Box<Expr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

// ── Effects & wrappers ───────────────────────────────────────────────────

/// The `?` propagation operator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PropagateExpr {
    pub value: Box<Expr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AwaitExpr {
    pub value: Box<Expr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct YieldExpr {
    #[serde(default)]
    pub value: Option<Box<Expr>>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TupleExpr {
    pub elements: Vec<Expr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A ternary-style if expression: `if c then a else b`. Both branches are
/// required; an if without an else is a statement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IfExpr {
    pub condition: Box<Expr>,
    pub then: Box<Expr>,
    pub otherwise: Box<Expr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

// ── JSX ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JsxAttr {
    pub name: String,
    #[serde(default)]
    pub value: Option<Expr>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum JsxChild {
    Text(String),
    Interp(Expr),
    Element(JsxElement),
    Fragment(JsxFragment),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JsxElement {
    pub tag: String,
    pub attrs: Vec<JsxAttr>,
    pub children: Vec<JsxChild>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JsxFragment {
    pub children: Vec<JsxChild>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

// ── Data-block columns ───────────────────────────────────────────────────

/// A column expression/assignment inside a `data` block: `col size = len(rows)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnExpr {
    pub name: String,
    #[serde(default)]
    pub value: Option<Box<Expr>>,
    #[serde(default)]
    pub loc: Option<Loc>,
}
