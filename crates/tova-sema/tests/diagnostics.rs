//! Integration tests for the diagnostic surface: document ordering,
//! determinism, attribution, rendering, and registry emission.

mod common;

use common::*;
use tova_ast::BinaryOp;
use tova_sema::render::{render_diagnostic, render_line, RenderOptions};

/// Diagnostics come out in document order even when emission order
/// differs (the W205 for a function is emitted after its body has been
/// walked, but sorts to the function's line).
#[test]
fn diagnostics_sort_to_document_order() {
    let analysis = analyze(vec![fn_decl(
        "f",
        vec![param("n", Some(named_ty("Int")))],
        Some(named_ty("Int")),
        vec![
            if_stmt(
                binary(BinaryOp::Gt, ident("n"), num(0.0)),
                vec![ret(Some(num(1.0)), 3)],
                None,
            ),
            assign("unused_tail", num(9.0), 5),
        ],
        1,
    )]);

    let warnings = warning_codes(&analysis);
    let w205_pos = warnings.iter().position(|c| *c == "W205").expect("W205");
    let w001_pos = warnings.iter().position(|c| *c == "W001").expect("W001");
    assert!(
        w205_pos < w001_pos,
        "W205 at line 1 should sort before W001 at line 5: {warnings:?}"
    );

    let lines: Vec<u32> = analysis.warnings.iter().map(|d| d.loc.line).collect();
    let mut sorted = lines.clone();
    sorted.sort_unstable();
    assert_eq!(lines, sorted, "warnings must be in document order");
}

/// Analyzing the same AST twice yields byte-identical streams.
#[test]
fn analysis_is_deterministic() {
    let build = || {
        vec![
            type_decl("Color", vec![("Red", vec![]), ("Green", vec![]), ("Blue", vec![])], 1),
            assign("x", num(10.0), 2),
            assign("x", num(20.0), 3),
            fn_decl(
                "f",
                vec![param("c", None)],
                None,
                vec![expr_stmt(match_expr(
                    ident("c"),
                    vec![arm(variant_pat("Red"), num(1.0))],
                ))],
                4,
            ),
        ]
    };
    let first = analyze(build());
    let second = analyze(build());
    assert_eq!(
        first.render_lines().join("\n"),
        second.render_lines().join("\n")
    );
}

/// Every diagnostic carries file, location, severity, message, and code.
#[test]
fn diagnostics_are_fully_attributed() {
    let analysis = analyze(vec![
        assign("x", num(10.0), 1),
        assign("x", num(20.0), 2),
        expr_stmt(call(ident("println"), vec![ident_at("ghost", 3, 9)])),
    ]);
    assert!(!analysis.errors.is_empty());
    for d in analysis.errors.iter().chain(analysis.warnings.iter()) {
        assert_eq!(d.file, "test.tova");
        assert!(!d.message.is_empty());
        assert!(d.loc.line > 0, "diagnostic should carry a real line: {d:?}");
    }
}

// ── Rendering ────────────────────────────────────────────────────────────

#[test]
fn one_line_rendering_shape() {
    let analysis = analyze(vec![
        assign("x", num(10.0), 1),
        assign("x", num(20.0), 2),
    ]);
    let rendered = render_line(&analysis.errors[0]);
    let first_line = rendered.lines().next().unwrap();
    insta::assert_snapshot!(
        first_line,
        @"test.tova:2:1 — cannot reassign immutable binding `x` [E202]"
    );
    assert!(rendered.contains("hint:"));
}

#[test]
fn constant_condition_one_liner() {
    let analysis = analyze(vec![if_stmt(
        tova_ast::Expr::BoolLit(tova_ast::BoolLit { value: true, loc: at(1, 4) }),
        vec![],
        None,
    )]);
    insta::assert_snapshot!(
        render_line(&analysis.warnings[0]),
        @"test.tova:1:4 — condition is always true [W202]"
    );
}

#[test]
fn ariadne_report_contains_code_and_caret_line() {
    let analysis = analyze(vec![
        assign("x", num(10.0), 1),
        assign("x", num(20.0), 2),
    ]);
    let source = "x = 10\nx = 20\n";
    let report = render_diagnostic(&analysis.errors[0], source, &RenderOptions::colorless());
    assert!(report.contains("E202"));
    assert!(report.contains("cannot reassign immutable binding"));
    assert!(report.contains("x = 20"));
}

// ── Canonical type strings ───────────────────────────────────────────────

#[test]
fn canonical_strings_snapshot() {
    use tova_sema::Ty;
    insta::assert_snapshot!(Ty::result(Ty::int(), Ty::Unknown).to_string(), @"Result<Int, _>");
    insta::assert_snapshot!(Ty::array(Ty::option(Ty::string())).to_string(), @"[Option<String>]");
    insta::assert_snapshot!(
        Ty::Union(vec![Ty::string(), Ty::Nil]).to_string(),
        @"String | Nil"
    );
}

// ── Registry emission ────────────────────────────────────────────────────

#[test]
fn registry_serializes_for_downstream_tools() {
    let analysis = analyze(vec![type_decl(
        "Color",
        vec![("Red", vec![]), ("Green", vec![]), ("Blue", vec![])],
        1,
    )]);
    let json: serde_json::Value =
        serde_json::from_str(&analysis.registry_json()).expect("valid JSON");
    let color = &json["types"]["Color"];
    assert_eq!(color["name"], "Color");
    let variants = color["kind"]["Adt"]["variants"]
        .as_array()
        .expect("variant list");
    assert_eq!(variants.len(), 3);
}
