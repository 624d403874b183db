//! The unused-symbol post-pass.
//!
//! Walks the retained scope tree after the main pass. Inside functions,
//! any unused non-builtin, non-type, non-parameter symbol is reported;
//! at the top levels (module/server/client/shared) only non-public
//! functions are, excluding variant constructors and `main`. A leading
//! underscore opts a name out, and the quick-fix renames to `_<name>`.

use tova_common::{Code, Diagnostic};

use crate::scope::{ScopeTree, SymbolKind};

pub fn report(scopes: &ScopeTree, file: &str) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    for sym_id in scopes.symbol_ids() {
        let sym = scopes.symbol(sym_id);
        if sym.used || sym.name.starts_with('_') {
            continue;
        }
        match sym.kind {
            SymbolKind::Builtin
            | SymbolKind::Type
            | SymbolKind::Parameter
            | SymbolKind::Module
            | SymbolKind::Component => continue,
            _ => {}
        }

        let scope_kind = scopes.scope(scopes.scope_of(sym_id)).kind;
        let name = &sym.name;

        let diag = if scope_kind.is_top_level() {
            // Top level: only private functions, and never variant
            // constructors or the entry point.
            if sym.kind != SymbolKind::Function
                || sym.public
                || sym.name == "main"
                || sym
                    .fn_info
                    .as_ref()
                    .is_some_and(|f| f.variant_of.is_some() || f.is_extern)
            {
                continue;
            }
            Diagnostic::new(
                Code::W002,
                format!("function `{name}` is never used"),
                file,
                sym.loc.unwrap_or_default(),
            )
        } else {
            match sym.kind {
                SymbolKind::Function => Diagnostic::new(
                    Code::W002,
                    format!("function `{name}` is never used"),
                    file,
                    sym.loc.unwrap_or_default(),
                ),
                _ => Diagnostic::new(
                    Code::W001,
                    format!("variable `{name}` is never used"),
                    file,
                    sym.loc.unwrap_or_default(),
                ),
            }
        };

        out.push(
            diag.with_hint(format!("prefix with an underscore to keep it: `_{name}`"))
                .with_fix(format!("rename to `_{name}`"), Some(format!("_{name}"))),
        );
    }

    out
}
