//! Shared AST builders for the integration suites.
//!
//! The analyzer consumes the parser's AST; tests build those trees
//! directly. Locations are attached where a test asserts on them.

#![allow(dead_code)]

use tova_ast::*;
use tova_common::Loc;
use tova_sema::{Analysis, AnalyzerOptions};

pub fn at(line: u32, col: u32) -> Option<Loc> {
    Some(Loc::new(line, col))
}

// ── Expressions ──────────────────────────────────────────────────────────

pub fn ident(name: &str) -> Expr {
    Expr::Identifier(Identifier { name: name.into(), loc: None })
}

pub fn ident_at(name: &str, line: u32, col: u32) -> Expr {
    Expr::Identifier(Identifier { name: name.into(), loc: at(line, col) })
}

pub fn num(value: f64) -> Expr {
    Expr::NumberLit(NumberLit { value, loc: None })
}

pub fn str_lit(value: &str) -> Expr {
    Expr::StringLit(StringLit { value: value.into(), loc: None })
}

pub fn bool_lit(value: bool) -> Expr {
    Expr::BoolLit(BoolLit { value, loc: None })
}

pub fn nil() -> Expr {
    Expr::NilLit(NilLit { loc: None })
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::BinaryExpr(BinaryExpr {
        op,
        left: Box::new(left),
        right: Box::new(right),
        loc: None,
    })
}

pub fn arg(value: Expr) -> Arg {
    Arg { name: None, spread: false, value }
}

pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::CallExpr(CallExpr {
        callee: Box::new(callee),
        args: args.into_iter().map(arg).collect(),
        loc: None,
    })
}

pub fn call_at(callee: Expr, args: Vec<Expr>, line: u32, col: u32) -> Expr {
    Expr::CallExpr(CallExpr {
        callee: Box::new(callee),
        args: args.into_iter().map(arg).collect(),
        loc: at(line, col),
    })
}

pub fn member(object: Expr, property: &str) -> Expr {
    Expr::MemberExpr(MemberExpr {
        object: Box::new(object),
        property: property.into(),
        optional: false,
        loc: None,
    })
}

pub fn method_call(object: Expr, property: &str, args: Vec<Expr>) -> Expr {
    call(member(object, property), args)
}

pub fn pipe(left: Expr, right: Expr) -> Expr {
    Expr::PipeExpr(PipeExpr { left: Box::new(left), right: Box::new(right), loc: None })
}

pub fn lambda(params: Vec<&str>, body: Expr) -> Expr {
    Expr::LambdaExpr(LambdaExpr {
        params: params
            .into_iter()
            .map(|name| Param { name: name.into(), ty: None, default: None, loc: None })
            .collect(),
        body: LambdaBody::Expr(Box::new(body)),
        is_async: false,
        loc: None,
    })
}

pub fn await_expr(value: Expr, line: u32, col: u32) -> Expr {
    Expr::AwaitExpr(AwaitExpr { value: Box::new(value), loc: at(line, col) })
}

// ── Patterns & match ─────────────────────────────────────────────────────

pub fn wildcard() -> Pattern {
    Pattern::Wildcard(WildcardPat { loc: None })
}

pub fn bind_pat(name: &str) -> Pattern {
    Pattern::Binding(BindingPat { name: name.into(), loc: None })
}

pub fn variant_pat(name: &str) -> Pattern {
    Pattern::Variant(VariantPat { name: name.into(), args: vec![], fields: vec![], loc: None })
}

pub fn variant_pat_with(name: &str, args: Vec<Pattern>) -> Pattern {
    Pattern::Variant(VariantPat { name: name.into(), args, fields: vec![], loc: None })
}

pub fn arm(pattern: Pattern, body: Expr) -> MatchArm {
    MatchArm { pattern, guard: None, body: LambdaBody::Expr(Box::new(body)), loc: None }
}

pub fn arm_at(pattern: Pattern, body: Expr, line: u32, col: u32) -> MatchArm {
    MatchArm {
        pattern,
        guard: None,
        body: LambdaBody::Expr(Box::new(body)),
        loc: at(line, col),
    }
}

pub fn match_expr(subject: Expr, arms: Vec<MatchArm>) -> Expr {
    Expr::MatchExpr(MatchExpr { subject: Box::new(subject), arms, loc: None })
}

// ── Statements ───────────────────────────────────────────────────────────

pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::ExprStmt(ExprStmt { expr: Box::new(expr), loc: None })
}

pub fn assign(name: &str, value: Expr, line: u32) -> Stmt {
    Stmt::Assignment(Assignment {
        target: Box::new(ident_at(name, line, 1)),
        value: Box::new(value),
        mutable: false,
        ty: None,
        loc: at(line, 1),
    })
}

pub fn var_assign(name: &str, value: Expr, line: u32) -> Stmt {
    Stmt::Assignment(Assignment {
        target: Box::new(ident_at(name, line, 1)),
        value: Box::new(value),
        mutable: true,
        ty: None,
        loc: at(line, 1),
    })
}

pub fn typed_assign(name: &str, ty: TypeExpr, value: Expr, line: u32) -> Stmt {
    Stmt::Assignment(Assignment {
        target: Box::new(ident_at(name, line, 1)),
        value: Box::new(value),
        mutable: false,
        ty: Some(ty),
        loc: at(line, 1),
    })
}

pub fn ret(value: Option<Expr>, line: u32) -> Stmt {
    Stmt::Return(Return { value: value.map(Box::new), loc: at(line, 1) })
}

pub fn param(name: &str, ty: Option<TypeExpr>) -> Param {
    Param { name: name.into(), ty, default: None, loc: None }
}

pub fn named_ty(name: &str) -> TypeExpr {
    TypeExpr::Named(NamedType { name: name.into(), args: vec![], loc: None })
}

pub fn fn_decl(
    name: &str,
    params: Vec<Param>,
    return_type: Option<TypeExpr>,
    body: Vec<Stmt>,
    line: u32,
) -> Stmt {
    Stmt::FunctionDecl(FunctionDecl {
        name: name.into(),
        type_params: vec![],
        params,
        return_type,
        body,
        is_async: false,
        is_public: false,
        loc: at(line, 1),
    })
}

pub fn async_fn_decl(name: &str, body: Vec<Stmt>, line: u32) -> Stmt {
    Stmt::FunctionDecl(FunctionDecl {
        name: name.into(),
        type_params: vec![],
        params: vec![],
        return_type: None,
        body,
        is_async: true,
        is_public: false,
        loc: at(line, 1),
    })
}

pub fn if_stmt(condition: Expr, then_body: Vec<Stmt>, else_body: Option<Vec<Stmt>>) -> Stmt {
    Stmt::If(IfStmt {
        condition: Box::new(condition),
        then_body,
        elifs: vec![],
        else_body,
        loc: None,
    })
}

/// `type Name { Variant1, Variant2(FieldTy), ... }`
pub fn type_decl(name: &str, variants: Vec<(&str, Vec<TypeExpr>)>, line: u32) -> Stmt {
    Stmt::TypeDecl(TypeDecl {
        name: name.into(),
        type_params: vec![],
        variants: variants
            .into_iter()
            .map(|(vname, fields)| VariantDecl {
                name: vname.into(),
                fields: fields.into_iter().map(|ty| FieldDecl { name: None, ty }).collect(),
                loc: None,
            })
            .collect(),
        fields: vec![],
        derives: vec![],
        loc: at(line, 1),
    })
}

pub fn server_block(name: Option<&str>, body: Vec<Stmt>, line: u32) -> Stmt {
    Stmt::ServerBlock(ServerBlock {
        name: name.map(str::to_string),
        body,
        loc: at(line, 1),
    })
}

pub fn client_block(body: Vec<Stmt>, line: u32) -> Stmt {
    Stmt::ClientBlock(ClientBlock { name: None, body, loc: at(line, 1) })
}

pub fn state_decl(name: &str, value: Expr, line: u32) -> Stmt {
    Stmt::StateDecl(StateDecl {
        name: name.into(),
        value: Box::new(value),
        ty: None,
        loc: at(line, 1),
    })
}

// ── Running the analyzer ─────────────────────────────────────────────────

pub fn program(body: Vec<Stmt>) -> Program {
    Program { body }
}

pub fn analyze(body: Vec<Stmt>) -> Analysis {
    tova_sema::analyze(&program(body), "test.tova")
}

pub fn analyze_strict(body: Vec<Stmt>) -> Analysis {
    tova_sema::analyze_with_options(&program(body), "test.tova", AnalyzerOptions::strict())
}

pub fn error_codes(analysis: &Analysis) -> Vec<&'static str> {
    analysis.errors.iter().map(|d| d.code.as_str()).collect()
}

pub fn warning_codes(analysis: &Analysis) -> Vec<&'static str> {
    analysis.warnings.iter().map(|d| d.code.as_str()).collect()
}

pub fn assert_clean(analysis: &Analysis) {
    assert!(
        analysis.errors.is_empty(),
        "expected no errors, got: {:?}",
        analysis.errors
    );
}
