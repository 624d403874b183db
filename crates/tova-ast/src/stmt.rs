//! Statements, declarations, and the block-form family.
//!
//! Covers: assignment and destructuring, compound assignment, functions,
//! type declarations (ADTs and records), type aliases, interfaces, traits,
//! impl blocks, imports, extern, control flow (if/for/while/loop,
//! try/catch, throw, guard, defer, break/continue, return), and the outer
//! block forms (`server`/`client`/`shared`/`data`/`test`/`bench`) with
//! their nested declaration kinds (route, ws, db, rate_limit, middleware,
//! cron; state, computed, component, store, effect).

use serde::{Deserialize, Serialize};
use tova_common::Loc;

use crate::expr::{BinaryOp, Expr, Param};
use crate::types::TypeExpr;

// ── Stmt enum ────────────────────────────────────────────────────────────

/// Any statement or declaration node.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Stmt {
    Assignment(Assignment),
    Destructure(Destructure),
    CompoundAssignment(CompoundAssignment),
    FunctionDecl(FunctionDecl),
    TypeDecl(TypeDecl),
    TypeAlias(TypeAlias),
    InterfaceDecl(InterfaceDecl),
    TraitDecl(TraitDecl),
    ImplBlock(ImplBlock),
    Import(Import),
    DefaultImport(DefaultImport),
    WildcardImport(WildcardImport),
    ExternDecl(ExternDecl),
    If(IfStmt),
    For(ForStmt),
    While(WhileStmt),
    Loop(LoopStmt),
    TryCatch(TryCatch),
    Throw(Throw),
    Return(Return),
    ExprStmt(ExprStmt),
    Block(BlockStmt),
    Break(Break),
    Continue(Continue),
    Guard(Guard),
    Defer(Defer),
    ServerBlock(ServerBlock),
    ClientBlock(ClientBlock),
    SharedBlock(SharedBlock),
    DataBlock(DataBlock),
    TestBlock(TestBlock),
    BenchBlock(BenchBlock),
    RouteDecl(RouteDecl),
    WsDecl(WsDecl),
    DbDecl(DbDecl),
    RateLimitDecl(RateLimitDecl),
    MiddlewareDecl(MiddlewareDecl),
    CronDecl(CronDecl),
    StateDecl(StateDecl),
    ComputedDecl(ComputedDecl),
    ComponentDecl(ComponentDecl),
    StoreDecl(StoreDecl),
    EffectDecl(EffectDecl),
    /// Any node tag outside the closed set. Downstream passes no-op on it.
    #[serde(other)]
    Unknown,
}

impl Stmt {
    /// The node's source location, when the parser recorded one.
    pub fn loc(&self) -> Option<Loc> {
        match self {
            Stmt::Assignment(n) => n.loc,
            Stmt::Destructure(n) => n.loc,
            Stmt::CompoundAssignment(n) => n.loc,
            Stmt::FunctionDecl(n) => n.loc,
            Stmt::TypeDecl(n) => n.loc,
            Stmt::TypeAlias(n) => n.loc,
            Stmt::InterfaceDecl(n) => n.loc,
            Stmt::TraitDecl(n) => n.loc,
            Stmt::ImplBlock(n) => n.loc,
            Stmt::Import(n) => n.loc,
            Stmt::DefaultImport(n) => n.loc,
            Stmt::WildcardImport(n) => n.loc,
            Stmt::ExternDecl(n) => n.loc,
            Stmt::If(n) => n.loc,
            Stmt::For(n) => n.loc,
            Stmt::While(n) => n.loc,
            Stmt::Loop(n) => n.loc,
            Stmt::TryCatch(n) => n.loc,
            Stmt::Throw(n) => n.loc,
            Stmt::Return(n) => n.loc,
            Stmt::ExprStmt(n) => n.loc,
            Stmt::Block(n) => n.loc,
            Stmt::Break(n) => n.loc,
            Stmt::Continue(n) => n.loc,
            Stmt::Guard(n) => n.loc,
            Stmt::Defer(n) => n.loc,
            Stmt::ServerBlock(n) => n.loc,
            Stmt::ClientBlock(n) => n.loc,
            Stmt::SharedBlock(n) => n.loc,
            Stmt::DataBlock(n) => n.loc,
            Stmt::TestBlock(n) => n.loc,
            Stmt::BenchBlock(n) => n.loc,
            Stmt::RouteDecl(n) => n.loc,
            Stmt::WsDecl(n) => n.loc,
            Stmt::DbDecl(n) => n.loc,
            Stmt::RateLimitDecl(n) => n.loc,
            Stmt::MiddlewareDecl(n) => n.loc,
            Stmt::CronDecl(n) => n.loc,
            Stmt::StateDecl(n) => n.loc,
            Stmt::ComputedDecl(n) => n.loc,
            Stmt::ComponentDecl(n) => n.loc,
            Stmt::StoreDecl(n) => n.loc,
            Stmt::EffectDecl(n) => n.loc,
            Stmt::Unknown => None,
        }
    }
}

// ── Bindings ─────────────────────────────────────────────────────────────

/// `x = value` / `var x = value` / `obj.field = value`.
///
/// Tova has no `let`: a bare assignment to an unbound name declares an
/// immutable binding, and `var` opts into mutability.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Assignment {
    pub target: Box<Expr>,
    pub value: Box<Expr>,
    /// True for `var x = ...`.
    #[serde(default)]
    pub mutable: bool,
    /// Declared type annotation, if spelled: `x: Int = 1`.
    #[serde(default)]
    pub ty: Option<TypeExpr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// The shape on the left of a destructuring declaration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum DestructureTarget {
    /// `(a, b) = pair`
    Tuple(Vec<String>),
    /// `[first, ..rest] = xs`
    Array {
        elements: Vec<String>,
        rest: Option<String>,
    },
    /// `{name, age: years} = user`
    Object(Vec<ObjectKey>),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectKey {
    pub key: String,
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Destructure {
    pub target: DestructureTarget,
    pub value: Box<Expr>,
    #[serde(default)]
    pub mutable: bool,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// `x += value` and friends.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompoundAssignment {
    pub target: Box<Expr>,
    pub op: BinaryOp,
    pub value: Box<Expr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

// ── Functions & types ────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<String>,
    pub params: Vec<Param>,
    #[serde(default)]
    pub return_type: Option<TypeExpr>,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// One field of a variant or record: positional (`Circle(Float)`) fields
/// have no name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldDecl {
    #[serde(default)]
    pub name: Option<String>,
    pub ty: TypeExpr,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VariantDecl {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// `type Shape { Circle(Float), Rect(w: Float, h: Float) }`, or a record
/// `type User { name: String, age: Int }` (no variants, only fields).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub variants: Vec<VariantDecl>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub derives: Vec<String>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypeAlias {
    pub name: String,
    #[serde(default)]
    pub type_params: Vec<String>,
    pub target: TypeExpr,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A method signature inside an interface or trait declaration. `self` is
/// implicit and not counted in `params`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MethodProto {
    pub name: String,
    pub params: Vec<Param>,
    #[serde(default)]
    pub return_type: Option<TypeExpr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InterfaceDecl {
    pub name: String,
    pub methods: Vec<MethodProto>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraitDecl {
    pub name: String,
    pub methods: Vec<MethodProto>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// `impl Type { ... }` or `impl Trait for Type { ... }`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImplBlock {
    #[serde(default)]
    pub trait_name: Option<String>,
    pub type_name: String,
    pub methods: Vec<FunctionDecl>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

// ── Imports & extern ─────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Import {
    pub names: Vec<String>,
    pub source: String,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DefaultImport {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WildcardImport {
    pub source: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// `extern fn fetch(url: String) -> String`. Externs may override a
/// builtin of the same name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExternDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub return_type: Option<TypeExpr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

// ── Control flow ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElifClause {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IfStmt {
    pub condition: Box<Expr>,
    pub then_body: Vec<Stmt>,
    #[serde(default)]
    pub elifs: Vec<ElifClause>,
    #[serde(default)]
    pub else_body: Option<Vec<Stmt>>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ForStmt {
    /// Loop bindings: one for `for x in xs`, two for `for k, v in m`.
    pub bindings: Vec<String>,
    pub iter: Box<Expr>,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WhileStmt {
    pub condition: Box<Expr>,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoopStmt {
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TryCatch {
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub catch_name: Option<String>,
    #[serde(default)]
    pub catch_body: Option<Vec<Stmt>>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Throw {
    pub value: Box<Expr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Return {
    #[serde(default)]
    pub value: Option<Box<Expr>>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExprStmt {
    pub expr: Box<Expr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockStmt {
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Break {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Continue {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// `guard cond else { ... }` — the else body is the failure path; success
/// flows through to the following statements.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Guard {
    pub condition: Box<Expr>,
    pub else_body: Vec<Stmt>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Defer {
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

// ── Block forms ──────────────────────────────────────────────────────────

/// `server { ... }` or `server api { ... }`. Named server blocks can call
/// each other RPC-style by name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerBlock {
    #[serde(default)]
    pub name: Option<String>,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientBlock {
    #[serde(default)]
    pub name: Option<String>,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SharedBlock {
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataBlock {
    #[serde(default)]
    pub name: Option<String>,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestBlock {
    pub name: String,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchBlock {
    pub name: String,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

// ── Server-side declarations ─────────────────────────────────────────────

/// `route GET "/users/:id" (id: Int) -> User { ... }`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteDecl {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub return_type: Option<TypeExpr>,
    /// Declared request-body type. Meaningless on GET routes.
    #[serde(default)]
    pub body_type: Option<TypeExpr>,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// `ws "/live" { on_open(conn) { ... } ... }`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WsDecl {
    pub path: String,
    pub handlers: Vec<FunctionDecl>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DbColumn {
    pub name: String,
    pub ty: TypeExpr,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// `db users { id: Int, name: String }`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DbDecl {
    pub name: String,
    pub columns: Vec<DbColumn>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// `rate_limit 100 per 60 { ... }` — optionally scoped to a route path.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RateLimitDecl {
    pub limit: u32,
    pub window_seconds: u32,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MiddlewareDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// `cron "0 * * * *" { ... }`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CronDecl {
    pub schedule: String,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

// ── Client-side declarations ─────────────────────────────────────────────

/// `state count = 0` — reactive, always mutable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateDecl {
    pub name: String,
    pub value: Box<Expr>,
    #[serde(default)]
    pub ty: Option<TypeExpr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// `computed doubled = count * 2`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComputedDecl {
    pub name: String,
    pub value: Box<Expr>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// `component Counter(start: Int) { <div>...</div> }`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComponentDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// `store Cart { state items = [] ... }`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreDecl {
    pub name: String,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// `effect [count] { ... }` — reruns when a dependency changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EffectDecl {
    #[serde(default)]
    pub deps: Vec<String>,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub loc: Option<Loc>,
}
