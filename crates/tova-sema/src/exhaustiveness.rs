//! Match exhaustiveness checking.
//!
//! The decision procedure, in order: a wildcard or unguarded binding arm
//! makes the match exhaustive; otherwise the covered variant names are
//! compared against the subject's ADT. When no subject type is available
//! there are two fallbacks — the built-in `Ok`/`Err` and `Some`/`None`
//! pairs, then a name-disambiguation scan over all declared ADTs that
//! stays silent unless exactly one candidate remains.

use rustc_hash::FxHashSet;
use tova_ast::{MatchExpr, Pattern};

use crate::registry::TypeRegistry;
use crate::ty::Ty;

/// One variant a match fails to cover.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingVariant {
    pub adt: String,
    pub variant: String,
}

/// Collect variant names covered by a pattern (descending into
/// or-patterns).
fn collect_covered(pattern: &Pattern, out: &mut FxHashSet<String>) {
    match pattern {
        Pattern::Variant(v) => {
            out.insert(v.name.clone());
        }
        Pattern::Or(or) => {
            for alt in &or.alternatives {
                collect_covered(alt, out);
            }
        }
        _ => {}
    }
}

/// The variants the match leaves uncovered, if that can be decided.
pub fn missing_variants(
    m: &MatchExpr,
    subject_ty: Option<&Ty>,
    registry: &TypeRegistry,
) -> Vec<MissingVariant> {
    // A catch-all arm settles it.
    if m.arms
        .iter()
        .any(|arm| arm.pattern.is_catch_all() && arm.guard.is_none())
    {
        return Vec::new();
    }

    let mut covered = FxHashSet::default();
    for arm in &m.arms {
        collect_covered(&arm.pattern, &mut covered);
    }

    // Resolve the subject's ADT from its inferred type, then fall back to
    // the built-in pair rules and the name-disambiguation scan.
    let registered = |name: &str| -> Option<(String, Vec<String>)> {
        let variants = registry.lookup_type(name)?.variants()?;
        Some((name.to_string(), variants.iter().map(|v| v.name.clone()).collect()))
    };

    let resolved = subject_ty
        .and_then(|ty| ty.base_name())
        .and_then(registered)
        .or_else(|| {
            if covered.is_empty() {
                return None;
            }
            if covered.iter().all(|c| c == "Ok" || c == "Err") {
                return Some(("Result".to_string(), vec!["Ok".to_string(), "Err".to_string()]));
            }
            if covered.iter().all(|c| c == "Some" || c == "None") {
                return Some(("Option".to_string(), vec!["Some".to_string(), "None".to_string()]));
            }
            // Keep only if exactly one ADT's variant set covers the names
            // used; ambiguity stays silent.
            let candidates = registry.adts_covering(&covered);
            if candidates.len() == 1 {
                registered(&candidates[0].name)
            } else {
                None
            }
        });

    let Some((adt_name, variants)) = resolved else {
        return Vec::new();
    };

    variants
        .into_iter()
        .filter(|v| !covered.contains(v))
        .map(|variant| MissingVariant { adt: adt_name.clone(), variant })
        .collect()
}
