//! Integration tests for call-site validation: argument counts, argument
//! types, named/spread arguments, and strict-mode upgrades.

mod common;

use common::*;
use tova_ast::{Arg, CallExpr, Expr, Stmt};

fn add_decl() -> Stmt {
    fn_decl(
        "add",
        vec![
            param("a", Some(named_ty("Int"))),
            param("b", Some(named_ty("Int"))),
        ],
        Some(named_ty("Int")),
        vec![ret(
            Some(binary(tova_ast::BinaryOp::Add, ident("a"), ident("b"))),
            2,
        )],
        1,
    )
}

#[test]
fn correct_call_is_clean() {
    let analysis = analyze(vec![
        add_decl(),
        expr_stmt(call(ident("add"), vec![num(1.0), num(2.0)])),
    ]);
    assert_clean(&analysis);
}

#[test]
fn under_supply_warns_by_default() {
    let analysis = analyze(vec![
        add_decl(),
        expr_stmt(call_at(ident("add"), vec![num(1.0)], 3, 1)),
    ]);
    assert!(error_codes(&analysis).is_empty());
    let w = analysis
        .warnings
        .iter()
        .find(|d| d.code.as_str() == "W102")
        .expect("argument count warning");
    assert!(w.message.contains("add"));
    assert!(w.message.contains('2'));
    assert!(w.message.contains('1'));
}

#[test]
fn over_supply_warns() {
    let analysis = analyze(vec![
        add_decl(),
        expr_stmt(call(ident("add"), vec![num(1.0), num(2.0), num(3.0)])),
    ]);
    assert!(warning_codes(&analysis).contains(&"W102"));
}

#[test]
fn strict_mode_upgrades_argument_count() {
    let analysis = analyze_strict(vec![
        add_decl(),
        expr_stmt(call(ident("add"), vec![num(1.0)])),
    ]);
    assert!(error_codes(&analysis).contains(&"E104"));
    assert!(!warning_codes(&analysis).contains(&"W102"));
}

#[test]
fn argument_type_mismatch_with_hint() {
    let analysis = analyze(vec![
        add_decl(),
        expr_stmt(call(ident("add"), vec![num(1.0), str_lit("two")])),
    ]);
    let err = analysis
        .errors
        .iter()
        .find(|d| d.code.as_str() == "E103")
        .expect("argument type error");
    assert!(err.message.contains("argument 2"));
    assert!(err.message.contains("Int"));
    assert!(err.message.contains("String"));
    assert!(err.hint.as_deref().unwrap_or("").contains("to_int"));
}

/// Int widens into Float parameters without complaint.
#[test]
fn int_argument_widens_to_float() {
    let analysis = analyze(vec![
        fn_decl(
            "scale",
            vec![param("f", Some(named_ty("Float")))],
            None,
            vec![expr_stmt(call(ident("println"), vec![ident("f")]))],
            1,
        ),
        expr_stmt(call(ident("scale"), vec![num(2.0)])),
    ]);
    assert_clean(&analysis);
}

/// Named arguments travel as one collective positional.
#[test]
fn named_arguments_count_as_one() {
    let connect = fn_decl(
        "connect",
        vec![param("url", Some(named_ty("String"))), param("opts", None)],
        None,
        vec![
            expr_stmt(call(ident("println"), vec![ident("url")])),
            expr_stmt(call(ident("println"), vec![ident("opts")])),
        ],
        1,
    );
    let call_expr = Expr::CallExpr(CallExpr {
        callee: Box::new(ident("connect")),
        args: vec![
            Arg { name: None, spread: false, value: str_lit("db://x") },
            Arg { name: Some("timeout".into()), spread: false, value: num(5.0) },
            Arg { name: Some("retries".into()), spread: false, value: num(3.0) },
        ],
        loc: at(4, 1),
    });
    let analysis = analyze(vec![connect, expr_stmt(call_expr)]);
    assert!(
        !warning_codes(&analysis).contains(&"W102"),
        "named args should collapse to one slot: {:?}",
        analysis.warnings
    );
}

/// A spread argument makes the count unknowable; the check stays quiet.
#[test]
fn spread_argument_skips_count_check() {
    let call_expr = Expr::CallExpr(CallExpr {
        callee: Box::new(ident("add")),
        args: vec![Arg {
            name: None,
            spread: true,
            value: ident("args"),
        }],
        loc: at(3, 1),
    });
    let analysis = analyze(vec![
        add_decl(),
        assign(
            "args",
            Expr::ArrayLit(tova_ast::ArrayLit { elements: vec![num(1.0), num(2.0)], loc: None }),
            2,
        ),
        expr_stmt(call_expr),
    ]);
    assert!(!warning_codes(&analysis).contains(&"W102"));
    assert!(error_codes(&analysis).is_empty());
}

/// Optional parameters (defaults) widen the accepted count range.
#[test]
fn optional_parameters_extend_range() {
    let greet = Stmt::FunctionDecl(tova_ast::FunctionDecl {
        name: "greet".into(),
        type_params: vec![],
        params: vec![
            param("name", Some(named_ty("String"))),
            tova_ast::Param {
                name: "greeting".into(),
                ty: Some(named_ty("String")),
                default: Some(str_lit("hello")),
                loc: None,
            },
        ],
        return_type: None,
        body: vec![
            expr_stmt(call(ident("println"), vec![ident("name")])),
            expr_stmt(call(ident("println"), vec![ident("greeting")])),
        ],
        is_async: false,
        is_public: false,
        loc: at(1, 1),
    });
    let one = analyze(vec![greet.clone(), expr_stmt(call(ident("greet"), vec![str_lit("ada")]))]);
    assert!(!warning_codes(&one).contains(&"W102"));

    let none = analyze(vec![greet, expr_stmt(call_at(ident("greet"), vec![], 4, 1))]);
    assert!(warning_codes(&none).contains(&"W102"));
}

// ── Binary operator checks ───────────────────────────────────────────────

#[test]
fn string_plus_suggests_concat_operator() {
    let analysis = analyze(vec![assign(
        "x",
        binary(tova_ast::BinaryOp::Add, str_lit("a"), str_lit("b")),
        1,
    )]);
    let w = analysis
        .warnings
        .iter()
        .find(|d| d.code.as_str() == "W103")
        .expect("binary operand warning");
    assert!(w.hint.as_deref().unwrap_or("").contains("++"));
}

#[test]
fn string_repeat_is_allowed() {
    let analysis = analyze(vec![assign(
        "banner",
        binary(tova_ast::BinaryOp::Mul, str_lit("-"), num(40.0)),
        1,
    )]);
    assert!(!warning_codes(&analysis).contains(&"W103"));
}

#[test]
fn strict_mode_upgrades_binary_mismatch() {
    let analysis = analyze_strict(vec![assign(
        "x",
        binary(tova_ast::BinaryOp::Sub, str_lit("a"), num(1.0)),
        1,
    )]);
    assert!(error_codes(&analysis).contains(&"E105"));
}

// ── Compound assignment ──────────────────────────────────────────────────

#[test]
fn compound_assignment_checks_mutability_and_types() {
    let immutable = analyze(vec![
        assign("x", num(1.0), 1),
        Stmt::CompoundAssignment(tova_ast::CompoundAssignment {
            target: Box::new(ident_at("x", 2, 1)),
            op: tova_ast::BinaryOp::Add,
            value: Box::new(num(1.0)),
            loc: at(2, 1),
        }),
    ]);
    assert_eq!(error_codes(&immutable), ["E202"]);

    let mismatched = analyze(vec![
        var_assign("x", num(1.0), 1),
        Stmt::CompoundAssignment(tova_ast::CompoundAssignment {
            target: Box::new(ident_at("x", 2, 1)),
            op: tova_ast::BinaryOp::Add,
            value: Box::new(str_lit("oops")),
            loc: at(2, 1),
        }),
    ]);
    assert!(warning_codes(&mismatched).contains(&"W104"));
}
