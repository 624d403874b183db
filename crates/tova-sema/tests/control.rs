//! Integration tests for control-state validation: async depth, return
//! context, loop context, return paths, and the suspicious-construct
//! warnings.

mod common;

use common::*;
use tova_ast::{BinaryOp, LambdaBody, LambdaExpr, Stmt};

// ── await / async ────────────────────────────────────────────────────────

/// End-to-end scenario: `await` is fine in an async function and an E300
/// in a sync one.
#[test]
fn await_requires_async_context() {
    let analysis = analyze(vec![
        async_fn_decl(
            "a",
            vec![expr_stmt(await_expr(call(ident("fetch"), vec![str_lit("/x")]), 1, 10))],
            1,
        ),
        fn_decl(
            "b",
            vec![],
            None,
            vec![expr_stmt(await_expr(call(ident("fetch"), vec![str_lit("/x")]), 2, 10))],
            2,
        ),
    ]);
    assert_eq!(error_codes(&analysis), ["E300"]);
    assert_eq!(analysis.errors[0].loc.line, 2);
}

/// A sync lambda resets the async depth: awaiting inside it is an error
/// even within an async function.
#[test]
fn sync_lambda_resets_async_depth() {
    let sync_lambda = tova_ast::Expr::LambdaExpr(LambdaExpr {
        params: vec![],
        body: LambdaBody::Expr(Box::new(await_expr(call(ident("fetch"), vec![str_lit("/x")]), 2, 5))),
        is_async: false,
        loc: None,
    });
    let analysis = analyze(vec![async_fn_decl(
        "outer",
        vec![expr_stmt(sync_lambda)],
        1,
    )]);
    assert_eq!(error_codes(&analysis), ["E300"]);
}

// ── return context ───────────────────────────────────────────────────────

#[test]
fn return_outside_function_errors() {
    let analysis = analyze(vec![ret(Some(num(1.0)), 1)]);
    assert_eq!(error_codes(&analysis), ["E301"]);
}

#[test]
fn return_type_mismatch_errors() {
    let analysis = analyze(vec![fn_decl(
        "f",
        vec![],
        Some(named_ty("Int")),
        vec![ret(Some(str_lit("nope")), 2)],
        1,
    )]);
    assert_eq!(error_codes(&analysis), ["E101"]);
    assert!(analysis.errors[0].message.contains("Int"));
    assert!(analysis.errors[0].message.contains("String"));
}

/// End-to-end scenario: a declared return type with a non-returning path
/// warns W205.
#[test]
fn not_all_paths_return_warns() {
    let analysis = analyze(vec![fn_decl(
        "f",
        vec![param("n", Some(named_ty("Int")))],
        Some(named_ty("Int")),
        vec![if_stmt(
            binary(BinaryOp::Gt, ident("n"), num(0.0)),
            vec![ret(Some(num(1.0)), 2)],
            None,
        )],
        1,
    )]);
    assert!(error_codes(&analysis).is_empty());
    let w205: Vec<_> = analysis
        .warnings
        .iter()
        .filter(|d| d.code.as_str() == "W205")
        .collect();
    assert_eq!(w205.len(), 1);
    assert!(w205[0].message.contains("return"));
}

#[test]
fn full_if_else_coverage_does_not_warn() {
    let analysis = analyze(vec![fn_decl(
        "f",
        vec![param("n", Some(named_ty("Int")))],
        Some(named_ty("Int")),
        vec![if_stmt(
            binary(BinaryOp::Gt, ident("n"), num(0.0)),
            vec![ret(Some(num(1.0)), 2)],
            Some(vec![ret(Some(num(0.0)), 3)]),
        )],
        1,
    )]);
    assert!(!warning_codes(&analysis).contains(&"W205"));
}

// ── loops ────────────────────────────────────────────────────────────────

#[test]
fn break_and_continue_require_loops() {
    let analysis = analyze(vec![
        Stmt::Break(tova_ast::Break { label: None, loc: at(1, 1) }),
        Stmt::Continue(tova_ast::Continue { label: None, loc: at(2, 1) }),
    ]);
    assert_eq!(error_codes(&analysis), ["E304", "E305"]);
}

#[test]
fn break_inside_loop_is_fine() {
    let analysis = analyze(vec![Stmt::While(tova_ast::WhileStmt {
        condition: Box::new(binary(BinaryOp::Lt, num(1.0), num(2.0))),
        body: vec![Stmt::Break(tova_ast::Break { label: None, loc: at(2, 3) })],
        label: None,
        loc: at(1, 1),
    })]);
    assert_clean(&analysis);
}

/// A lambda boundary hides the enclosing loop.
#[test]
fn break_inside_lambda_in_loop_errors() {
    let body_lambda = lambda(vec![], num(1.0));
    let tova_ast::Expr::LambdaExpr(mut l) = body_lambda else { unreachable!() };
    l.body = LambdaBody::Block(vec![Stmt::Break(tova_ast::Break { label: None, loc: at(3, 5) })]);
    let analysis = analyze(vec![Stmt::Loop(tova_ast::LoopStmt {
        body: vec![
            expr_stmt(tova_ast::Expr::LambdaExpr(l)),
            Stmt::Break(tova_ast::Break { label: None, loc: at(4, 3) }),
        ],
        label: None,
        loc: at(1, 1),
    })]);
    assert_eq!(error_codes(&analysis), ["E304"]);
}

#[test]
fn labeled_break_matches_label() {
    let analysis = analyze(vec![Stmt::Loop(tova_ast::LoopStmt {
        body: vec![Stmt::Break(tova_ast::Break { label: Some("outer".into()), loc: at(2, 3) })],
        label: Some("outer".into()),
        loc: at(1, 1),
    })]);
    assert_clean(&analysis);

    let wrong = analyze(vec![Stmt::Loop(tova_ast::LoopStmt {
        body: vec![Stmt::Break(tova_ast::Break { label: Some("other".into()), loc: at(2, 3) })],
        label: Some("outer".into()),
        loc: at(1, 1),
    })]);
    assert_eq!(error_codes(&wrong), ["E304"]);
}

// ── suspicious constructs ────────────────────────────────────────────────

#[test]
fn unreachable_code_after_return_warns_once() {
    let analysis = analyze(vec![fn_decl(
        "f",
        vec![],
        None,
        vec![
            ret(Some(num(1.0)), 2),
            expr_stmt(call(ident("println"), vec![str_lit("a")])),
            expr_stmt(call(ident("println"), vec![str_lit("b")])),
        ],
        1,
    )]);
    let w201: Vec<_> = analysis
        .warnings
        .iter()
        .filter(|d| d.code.as_str() == "W201")
        .collect();
    assert_eq!(w201.len(), 1);
}

#[test]
fn constant_conditions_warn() {
    let analysis = analyze(vec![
        if_stmt(bool_lit(true), vec![], None),
        if_stmt(bool_lit(false), vec![], None),
    ]);
    assert_eq!(warning_codes(&analysis), ["W202", "W203"]);
}

#[test]
fn throw_warns_toward_result() {
    let analysis = analyze(vec![fn_decl(
        "f",
        vec![],
        None,
        vec![Stmt::Throw(tova_ast::Throw { value: Box::new(str_lit("boom")), loc: at(2, 3) })],
        1,
    )]);
    assert!(warning_codes(&analysis).contains(&"W206"));
    let w = analysis.warnings.iter().find(|d| d.code.as_str() == "W206").unwrap();
    assert!(w.hint.as_deref().unwrap_or("").contains("Result"));
}

#[test]
fn defer_outside_function_warns() {
    let analysis = analyze(vec![Stmt::Defer(tova_ast::Defer {
        body: vec![expr_stmt(call(ident("println"), vec![str_lit("bye")]))],
        loc: at(1, 1),
    })]);
    assert!(warning_codes(&analysis).contains(&"W208"));

    let inside = analyze(vec![fn_decl(
        "f",
        vec![],
        None,
        vec![Stmt::Defer(tova_ast::Defer {
            body: vec![expr_stmt(call(ident("println"), vec![str_lit("bye")]))],
            loc: at(2, 3),
        })],
        1,
    )]);
    assert!(!warning_codes(&inside).contains(&"W208"));
}
