//! Integration tests for block-context validation and cross-block RPC.

mod common;

use common::*;
use tova_ast::{Expr, Stmt};

fn jsx(tag: &str) -> Expr {
    Expr::JsxElement(tova_ast::JsxElement {
        tag: tag.into(),
        attrs: vec![],
        children: vec![],
        loc: None,
    })
}

fn component(name: &str, body: Vec<Stmt>, line: u32) -> Stmt {
    Stmt::ComponentDecl(tova_ast::ComponentDecl {
        name: name.into(),
        params: vec![],
        body,
        loc: at(line, 1),
    })
}

// ── Context validation ───────────────────────────────────────────────────

/// End-to-end scenario: state inside a client block is fine; at the top
/// level it is E302 on that line.
#[test]
fn state_outside_client_errors() {
    let analysis = analyze(vec![
        client_block(
            vec![
                state_decl("count", num(0.0), 2),
                component("C", vec![expr_stmt(jsx("div"))], 3),
            ],
            1,
        ),
        state_decl("x", num(1.0), 5),
    ]);
    assert_eq!(error_codes(&analysis), ["E302"]);
    assert_eq!(analysis.errors[0].loc.line, 5);
}

#[test]
fn route_outside_server_errors() {
    let route = Stmt::RouteDecl(tova_ast::RouteDecl {
        method: "GET".into(),
        path: "/users".into(),
        params: vec![],
        return_type: None,
        body_type: None,
        body: vec![],
        loc: at(1, 1),
    });
    let analysis = analyze(vec![route.clone()]);
    assert_eq!(error_codes(&analysis), ["E303"]);

    let inside = analyze(vec![server_block(None, vec![route], 1)]);
    assert_clean(&inside);
}

#[test]
fn get_route_with_body_type_warns() {
    let route = Stmt::RouteDecl(tova_ast::RouteDecl {
        method: "GET".into(),
        path: "/users".into(),
        params: vec![],
        return_type: None,
        body_type: Some(named_ty("String")),
        body: vec![],
        loc: at(2, 3),
    });
    let analysis = analyze(vec![server_block(None, vec![route], 1)]);
    assert!(warning_codes(&analysis).contains(&"W106"));
}

#[test]
fn db_registers_row_type() {
    let db = Stmt::DbDecl(tova_ast::DbDecl {
        name: "users".into(),
        columns: vec![
            tova_ast::DbColumn { name: "id".into(), ty: named_ty("Int"), loc: None },
            tova_ast::DbColumn { name: "name".into(), ty: named_ty("String"), loc: None },
        ],
        loc: at(2, 3),
    });
    let analysis = analyze(vec![server_block(None, vec![db], 1)]);
    assert_clean(&analysis);
    let def = analysis.registry.lookup_type("users").expect("users row type");
    assert_eq!(def.fields().unwrap().len(), 2);
}

#[test]
fn state_in_store_in_client_is_legal() {
    let store = Stmt::StoreDecl(tova_ast::StoreDecl {
        name: "Cart".into(),
        body: vec![state_decl("items", num(0.0), 3)],
        loc: at(2, 3),
    });
    let analysis = analyze(vec![client_block(vec![store], 1)]);
    assert_clean(&analysis);
}

// ── Cross-block RPC ──────────────────────────────────────────────────────

fn two_server_blocks(call_expr: Expr) -> Vec<Stmt> {
    vec![
        server_block(
            Some("auth"),
            vec![fn_decl("login", vec![], None, vec![], 2)],
            1,
        ),
        server_block(
            Some("api"),
            vec![fn_decl(
                "handler",
                vec![],
                None,
                vec![expr_stmt(call_expr)],
                5,
            )],
            4,
        ),
    ]
}

#[test]
fn peer_call_to_existing_function_is_clean() {
    let analysis = analyze(two_server_blocks(method_call(ident("auth"), "login", vec![])));
    assert!(
        !error_codes(&analysis).contains(&"E201"),
        "valid peer call: {:?}",
        analysis.errors
    );
}

#[test]
fn peer_call_to_missing_function_errors() {
    let analysis = analyze(two_server_blocks(method_call(ident("auth"), "logout", vec![])));
    assert_eq!(error_codes(&analysis), ["E201"]);
    let err = &analysis.errors[0];
    assert!(err.message.contains("auth"));
    assert!(err.message.contains("logout"));
}

/// Boundary behavior: a self-call inside a named server block is the
/// specific W105 warning, not the cross-block error.
#[test]
fn self_call_warns_not_errors() {
    let body = vec![
        fn_decl("hello", vec![], None, vec![], 2),
        fn_decl(
            "greet",
            vec![],
            None,
            vec![expr_stmt(method_call(ident("api"), "hello", vec![]))],
            3,
        ),
    ];
    let analysis = analyze(vec![server_block(Some("api"), body, 1)]);
    assert!(!error_codes(&analysis).contains(&"E201"));
    let w = analysis
        .warnings
        .iter()
        .find(|d| d.code.as_str() == "W105")
        .expect("self-call warning");
    assert!(w.message.contains("api"));
}

/// RPC validation only applies inside named server blocks.
#[test]
fn rpc_shape_outside_named_block_is_untouched() {
    let analysis = analyze(vec![
        server_block(Some("auth"), vec![fn_decl("login", vec![], None, vec![], 2)], 1),
        fn_decl(
            "outside",
            vec![],
            None,
            vec![expr_stmt(method_call(ident("auth"), "anything", vec![]))],
            4,
        ),
    ]);
    assert!(!error_codes(&analysis).contains(&"E201"));
}

// ── Components & JSX ─────────────────────────────────────────────────────

#[test]
fn capitalized_jsx_tag_must_resolve() {
    let analysis = analyze(vec![client_block(
        vec![
            component("Header", vec![expr_stmt(jsx("div"))], 2),
            component("Page", vec![expr_stmt(jsx("Header"))], 3),
            component("Broken", vec![expr_stmt(jsx("Missing"))], 4),
        ],
        1,
    )]);
    assert_eq!(error_codes(&analysis), ["E200"]);
    assert!(analysis.errors[0].message.contains("Missing"));
}
