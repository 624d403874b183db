//! Integration tests for trait conformance, derives, impl method
//! registration, and type aliases.

mod common;

use common::*;
use tova_ast::{FunctionDecl, ImplBlock, InterfaceDecl, MethodProto, Stmt, TypeAlias, TypeDecl};

fn point_record(line: u32) -> Stmt {
    Stmt::TypeDecl(TypeDecl {
        name: "Point".into(),
        type_params: vec![],
        variants: vec![],
        fields: vec![
            tova_ast::FieldDecl { name: Some("x".into()), ty: named_ty("Float") },
            tova_ast::FieldDecl { name: Some("y".into()), ty: named_ty("Float") },
        ],
        derives: vec![],
        loc: at(line, 1),
    })
}

fn printable(line: u32) -> Stmt {
    Stmt::InterfaceDecl(InterfaceDecl {
        name: "Printable".into(),
        methods: vec![MethodProto {
            name: "describe".into(),
            params: vec![],
            return_type: Some(named_ty("String")),
            loc: None,
        }],
        loc: at(line, 1),
    })
}

fn impl_method(name: &str, return_type: Option<tova_ast::TypeExpr>, params: Vec<tova_ast::Param>) -> FunctionDecl {
    FunctionDecl {
        name: name.into(),
        type_params: vec![],
        params,
        return_type,
        body: vec![ret(Some(str_lit("point")), 6)],
        is_async: false,
        is_public: false,
        loc: at(5, 3),
    }
}

fn impl_block(trait_name: Option<&str>, methods: Vec<FunctionDecl>, line: u32) -> Stmt {
    Stmt::ImplBlock(ImplBlock {
        trait_name: trait_name.map(str::to_string),
        type_name: "Point".into(),
        methods,
        loc: at(line, 1),
    })
}

#[test]
fn conforming_impl_is_clean() {
    let analysis = analyze(vec![
        point_record(1),
        printable(2),
        impl_block(
            Some("Printable"),
            vec![impl_method("describe", Some(named_ty("String")), vec![param("self", None)])],
            4,
        ),
    ]);
    assert_clean(&analysis);
    assert!(!warning_codes(&analysis).iter().any(|c| c.starts_with("W3")));
}

#[test]
fn missing_trait_method_warns() {
    let analysis = analyze(vec![
        point_record(1),
        printable(2),
        impl_block(Some("Printable"), vec![], 4),
    ]);
    let w = analysis
        .warnings
        .iter()
        .find(|d| d.code.as_str() == "W300")
        .expect("missing method warning");
    assert!(w.message.contains("describe"));
    assert!(w.message.contains("Printable"));
    assert!(w.message.contains("Point"));
}

#[test]
fn trait_method_arity_mismatch_warns() {
    let analysis = analyze(vec![
        point_record(1),
        printable(2),
        impl_block(
            Some("Printable"),
            vec![impl_method(
                "describe",
                Some(named_ty("String")),
                vec![param("self", None), param("verbose", None)],
            )],
            4,
        ),
    ]);
    assert!(warning_codes(&analysis).contains(&"W301"));
}

#[test]
fn trait_method_return_mismatch_warns() {
    let analysis = analyze(vec![
        point_record(1),
        printable(2),
        impl_block(
            Some("Printable"),
            vec![impl_method("describe", Some(named_ty("Int")), vec![param("self", None)])],
            4,
        ),
    ]);
    assert!(warning_codes(&analysis).contains(&"W302"));
}

#[test]
fn impl_for_unknown_type_errors() {
    let analysis = analyze(vec![Stmt::ImplBlock(ImplBlock {
        trait_name: None,
        type_name: "Ghost".into(),
        methods: vec![],
        loc: at(1, 1),
    })]);
    assert_eq!(error_codes(&analysis), ["E200"]);
}

/// Impl methods feed method-call inference and arity checking.
#[test]
fn impl_methods_type_method_calls() {
    let norm = impl_method("norm", Some(named_ty("Float")), vec![param("self", None)]);
    let analysis = analyze(vec![
        point_record(1),
        impl_block(None, vec![norm], 2),
        typed_assign(
            "p",
            named_ty("Point"),
            tova_ast::Expr::ObjectLit(tova_ast::ObjectLit {
                entries: vec![
                    tova_ast::ObjectEntry { key: "x".into(), value: num(1.0) },
                    tova_ast::ObjectEntry { key: "y".into(), value: num(2.0) },
                ],
                loc: None,
            }),
            5,
        ),
        assign("n", method_call(ident("p"), "norm", vec![]), 6),
        assign("bad", method_call(ident("p"), "norm", vec![num(1.0)]), 7),
    ]);
    let root = analysis.scopes.root();
    let n = analysis.scopes.lookup(root, "n").unwrap();
    assert_eq!(analysis.scopes.symbol(n).ty.as_deref(), Some("Float"));
    // The extra-argument call trips the arity check.
    assert!(warning_codes(&analysis).contains(&"W102"));
}

// ── Derives ──────────────────────────────────────────────────────────────

#[test]
fn unknown_derive_warns() {
    let decl = Stmt::TypeDecl(TypeDecl {
        name: "User".into(),
        type_params: vec![],
        variants: vec![],
        fields: vec![tova_ast::FieldDecl { name: Some("name".into()), ty: named_ty("String") }],
        derives: vec!["Json".into(), "Frobnicate".into()],
        loc: at(1, 1),
    });
    let analysis = analyze(vec![decl]);
    let w303: Vec<_> = analysis
        .warnings
        .iter()
        .filter(|d| d.code.as_str() == "W303")
        .collect();
    assert_eq!(w303.len(), 1);
    assert!(w303[0].message.contains("Frobnicate"));
}

// ── Type aliases ─────────────────────────────────────────────────────────

#[test]
fn alias_resolves_in_compatibility() {
    let analysis = analyze(vec![
        Stmt::TypeAlias(TypeAlias {
            name: "UserId".into(),
            type_params: vec![],
            target: named_ty("Int"),
            loc: at(1, 1),
        }),
        typed_assign("id", named_ty("UserId"), num(7.0), 2),
    ]);
    assert_clean(&analysis);
}

#[test]
fn alias_cycle_is_detected() {
    let alias = |name: &str, target: &str, line: u32| {
        Stmt::TypeAlias(TypeAlias {
            name: name.into(),
            type_params: vec![],
            target: named_ty(target),
            loc: at(line, 1),
        })
    };
    let analysis = analyze(vec![alias("A", "B", 1), alias("B", "A", 2)]);
    let cycles: Vec<_> = analysis
        .errors
        .iter()
        .filter(|d| d.message.contains("circular type alias"))
        .collect();
    assert!(!cycles.is_empty(), "expected a cycle error: {:?}", analysis.errors);
}
