//! Built-in name registration.
//!
//! Seeds the module scope with primitive type names, the stdlib function
//! surface, runtime names, and the `Option`/`Result` sum types with their
//! variant constructors. Everything registered here has
//! [`SymbolKind::Builtin`], which keeps it out of the unused-symbol report
//! and lets an `extern` declaration override it by name.

use crate::registry::{FieldInfo, TypeDef, TypeDefKind, TypeRegistry, VariantInfo};
use crate::scope::{FnInfo, ScopeTree, Symbol, SymbolKind};

/// Register all built-in names into the module scope and seed the type
/// registry with the built-in sum types.
pub fn register_builtins(scopes: &mut ScopeTree, registry: &mut TypeRegistry) {
    let root = scopes.root();

    // ── Primitive type names ────────────────────────────────────────
    //
    // Registered so annotations and `type_of` comparisons resolve, and so
    // user declarations colliding with them are redefinition errors.
    for name in ["Int", "Float", "String", "Bool", "Nil", "Any", "Element"] {
        let _ = scopes.define(root, Symbol::new(name, SymbolKind::Type).typed(name));
    }

    // ── Option / Result ─────────────────────────────────────────────

    registry.register_type(TypeDef {
        name: "Option".into(),
        type_params: vec!["T".into()],
        kind: TypeDefKind::Adt {
            variants: vec![
                VariantInfo {
                    name: "Some".into(),
                    fields: vec![FieldInfo { name: None, ty: "T".into() }],
                },
                VariantInfo { name: "None".into(), fields: Vec::new() },
            ],
        },
    });
    registry.register_type(TypeDef {
        name: "Result".into(),
        type_params: vec!["T".into(), "E".into()],
        kind: TypeDefKind::Adt {
            variants: vec![
                VariantInfo {
                    name: "Ok".into(),
                    fields: vec![FieldInfo { name: None, ty: "T".into() }],
                },
                VariantInfo {
                    name: "Err".into(),
                    fields: vec![FieldInfo { name: None, ty: "E".into() }],
                },
            ],
        },
    });

    for name in ["Option", "Result"] {
        let _ = scopes.define(root, Symbol::new(name, SymbolKind::Type).typed(name));
    }

    // Variant constructors. `None` is a value, the others are callables.
    for (ctor, owner) in [("Ok", "Result"), ("Err", "Result"), ("Some", "Option")] {
        let sym = Symbol::new(ctor, SymbolKind::Builtin).with_fn_info(FnInfo {
            params: vec!["value".into()],
            required: 1,
            total: 1,
            param_types: vec![None],
            type_params: Vec::new(),
            return_type: Some(owner.into()),
            variant_of: Some(owner.into()),
            ..FnInfo::default()
        });
        let _ = scopes.define(root, sym);
    }
    let _ = scopes.define(root, Symbol::new("None", SymbolKind::Builtin).typed("Option<_>"));

    // ── Stdlib functions ────────────────────────────────────────────

    let mut f = |name: &str, required: usize, total: usize, ret: Option<&str>| {
        let sym = Symbol::new(name, SymbolKind::Builtin).with_fn_info(FnInfo {
            params: (0..total).map(|i| format!("arg{i}")).collect(),
            required,
            total,
            param_types: vec![None; total],
            return_type: ret.map(str::to_string),
            ..FnInfo::default()
        });
        let _ = scopes.define(root, sym);
    };

    // I/O
    f("print", 1, 1, Some("Nil"));
    f("println", 1, 1, Some("Nil"));
    f("input", 0, 1, Some("String"));
    f("log", 1, 1, Some("Nil"));

    // Conversion
    f("to_int", 1, 1, Some("Int"));
    f("to_float", 1, 1, Some("Float"));
    f("to_string", 1, 1, Some("String"));

    // Introspection & numerics
    f("len", 1, 1, Some("Int"));
    f("count", 1, 1, Some("Int"));
    f("type_of", 1, 1, Some("String"));
    f("random", 0, 0, Some("Float"));
    f("abs", 1, 1, None);
    f("min", 2, 2, None);
    f("max", 2, 2, None);
    f("round", 1, 1, Some("Int"));
    f("floor", 1, 1, Some("Int"));
    f("ceil", 1, 1, Some("Int"));
    f("sqrt", 1, 1, Some("Float"));
    f("pow", 2, 2, Some("Float"));
    f("range", 1, 2, Some("[Int]"));

    // Collections. The transformers double as pipe stages; their result
    // types come from the pipe rules, not from a declared return type.
    f("push", 2, 2, Some("Nil"));
    f("pop", 1, 1, None);
    f("keys", 1, 1, Some("[String]"));
    f("values", 1, 1, None);
    f("zip", 2, 2, None);
    f("enumerate", 1, 1, None);
    f("filter", 1, 2, None);
    f("map", 1, 2, None);
    f("sorted", 1, 2, None);
    f("reversed", 1, 1, None);
    f("unique", 1, 1, None);
    f("take", 2, 2, None);
    f("drop", 2, 2, None);
    f("flatten", 1, 1, None);
    f("join", 1, 2, Some("String"));
    f("sum", 1, 1, None);
    f("any", 1, 2, Some("Bool"));
    f("all", 1, 2, Some("Bool"));
    f("every", 1, 2, Some("Bool"));
    f("some", 1, 2, Some("Bool"));
    f("first", 1, 1, None);
    f("last", 1, 1, None);
    f("find", 2, 2, None);

    // Strings
    f("split", 2, 2, Some("[String]"));
    f("trim", 1, 1, Some("String"));
    f("upper", 1, 1, Some("String"));
    f("lower", 1, 1, Some("String"));
    f("contains", 2, 2, Some("Bool"));
    f("starts_with", 2, 2, Some("Bool"));
    f("ends_with", 2, 2, Some("Bool"));
    f("replace", 3, 3, Some("String"));

    // Runtime
    f("now", 0, 0, Some("Int"));
    f("sleep", 1, 1, Some("Nil"));
    f("fetch", 1, 2, Some("String"));
    f("parse_json", 1, 1, Some("Any"));
    f("to_json", 1, 1, Some("String"));
    f("env", 1, 1, Some("String | Nil"));
    f("exit", 1, 1, Some("Nil"));
    f("panic", 1, 1, Some("Nil"));
}
