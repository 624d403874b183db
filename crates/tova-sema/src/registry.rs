//! The project-level type registry.
//!
//! Three maps keyed by type name: `types` (ADT/record/alias structure),
//! `impls` (method sets per type), and `traits` (required method
//! signatures). The registry is part of the analyzer's output and is
//! serializable for downstream consumers (language server, docs).

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::ty::Ty;

/// One field of a variant or record. Positional fields have no name.
#[derive(Clone, Debug, Serialize)]
pub struct FieldInfo {
    pub name: Option<String>,
    /// Canonical type string.
    pub ty: String,
}

/// One variant of an ADT.
#[derive(Clone, Debug, Serialize)]
pub struct VariantInfo {
    pub name: String,
    pub fields: Vec<FieldInfo>,
}

/// The structure behind a registered type name.
#[derive(Clone, Debug, Serialize)]
pub enum TypeDefKind {
    Adt { variants: Vec<VariantInfo> },
    Record { fields: Vec<FieldInfo> },
    Alias { target: String },
}

/// A registered type definition.
#[derive(Clone, Debug, Serialize)]
pub struct TypeDef {
    pub name: String,
    pub type_params: Vec<String>,
    pub kind: TypeDefKind,
}

impl TypeDef {
    /// The variant list, for ADTs.
    pub fn variants(&self) -> Option<&[VariantInfo]> {
        match &self.kind {
            TypeDefKind::Adt { variants } => Some(variants),
            _ => None,
        }
    }

    /// The field list, for records.
    pub fn fields(&self) -> Option<&[FieldInfo]> {
        match &self.kind {
            TypeDefKind::Record { fields } => Some(fields),
            _ => None,
        }
    }
}

/// A method signature, as stored for impls and traits. `self` is implicit
/// and excluded from the parameter count.
#[derive(Clone, Debug, Serialize)]
pub struct MethodSig {
    pub name: String,
    pub param_count: usize,
    /// Canonical type strings per parameter; `None` for unannotated.
    pub param_types: Vec<Option<String>>,
    pub return_type: Option<String>,
}

/// Registry of all named types, impl method sets, and trait signatures.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TypeRegistry {
    pub types: FxHashMap<String, TypeDef>,
    pub impls: FxHashMap<String, Vec<MethodSig>>,
    pub traits: FxHashMap<String, Vec<MethodSig>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_type(&mut self, def: TypeDef) {
        self.types.insert(def.name.clone(), def);
    }

    pub fn register_trait(&mut self, name: impl Into<String>, methods: Vec<MethodSig>) {
        self.traits.insert(name.into(), methods);
    }

    pub fn register_impl_method(&mut self, type_name: &str, sig: MethodSig) {
        self.impls.entry(type_name.to_string()).or_default().push(sig);
    }

    pub fn lookup_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn lookup_trait(&self, name: &str) -> Option<&[MethodSig]> {
        self.traits.get(name).map(|v| v.as_slice())
    }

    /// Find a method on a type by name, searching the impl set.
    pub fn lookup_method(&self, type_name: &str, method: &str) -> Option<&MethodSig> {
        self.impls
            .get(type_name)
            .and_then(|sigs| sigs.iter().find(|s| s.name == method))
    }

    /// Find the ADT that declares a variant with this name. Scans in
    /// sorted name order so the answer is deterministic when two ADTs
    /// reuse a variant name (first by name wins).
    pub fn variant_owner(&self, variant: &str) -> Option<(&TypeDef, &VariantInfo)> {
        let mut names: Vec<&String> = self.types.keys().collect();
        names.sort();
        for name in names {
            let def = &self.types[name];
            if let Some(variants) = def.variants() {
                if let Some(v) = variants.iter().find(|v| v.name == variant) {
                    return Some((def, v));
                }
            }
        }
        None
    }

    /// All ADTs whose variant set is a superset of `covered`, in sorted
    /// name order. Used by exhaustiveness checking's disambiguation
    /// fallback.
    pub fn adts_covering(&self, covered: &FxHashSet<String>) -> Vec<&TypeDef> {
        let mut names: Vec<&String> = self.types.keys().collect();
        names.sort();
        names
            .into_iter()
            .map(|n| &self.types[n])
            .filter(|def| {
                def.variants().is_some_and(|variants| {
                    covered
                        .iter()
                        .all(|c| variants.iter().any(|v| &v.name == c))
                })
            })
            .collect()
    }

    /// Resolve type aliases, with a visited-set guard against cycles.
    /// A cyclic alias resolves to itself.
    pub fn resolve_alias(&self, ty: &Ty) -> Ty {
        let mut seen = FxHashSet::default();
        self.resolve_alias_inner(ty, &mut seen)
    }

    fn resolve_alias_inner(&self, ty: &Ty, seen: &mut FxHashSet<String>) -> Ty {
        if let Ty::Name(name) = ty {
            if let Some(TypeDef { kind: TypeDefKind::Alias { target }, .. }) = self.types.get(name)
            {
                if !seen.insert(name.clone()) {
                    return ty.clone();
                }
                if let Some(resolved) = Ty::parse(target) {
                    return self.resolve_alias_inner(&resolved, seen);
                }
            }
        }
        ty.clone()
    }

    /// Whether this alias chain loops back on itself.
    pub fn alias_has_cycle(&self, name: &str) -> bool {
        let mut seen = FxHashSet::default();
        let mut current = name.to_string();
        loop {
            if !seen.insert(current.clone()) {
                return true;
            }
            match self.types.get(&current) {
                Some(TypeDef { kind: TypeDefKind::Alias { target }, .. }) => {
                    match Ty::parse(target) {
                        Some(Ty::Name(next)) => current = next,
                        _ => return false,
                    }
                }
                _ => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adt(name: &str, variants: &[&str]) -> TypeDef {
        TypeDef {
            name: name.into(),
            type_params: Vec::new(),
            kind: TypeDefKind::Adt {
                variants: variants
                    .iter()
                    .map(|v| VariantInfo { name: (*v).into(), fields: Vec::new() })
                    .collect(),
            },
        }
    }

    fn alias(name: &str, target: &str) -> TypeDef {
        TypeDef {
            name: name.into(),
            type_params: Vec::new(),
            kind: TypeDefKind::Alias { target: target.into() },
        }
    }

    #[test]
    fn variant_owner_finds_adt() {
        let mut reg = TypeRegistry::new();
        reg.register_type(adt("Color", &["Red", "Green", "Blue"]));
        let (def, variant) = reg.variant_owner("Green").unwrap();
        assert_eq!(def.name, "Color");
        assert_eq!(variant.name, "Green");
        assert!(reg.variant_owner("Teal").is_none());
    }

    #[test]
    fn adts_covering_filters_supersets() {
        let mut reg = TypeRegistry::new();
        reg.register_type(adt("Color", &["Red", "Green", "Blue"]));
        reg.register_type(adt("Light", &["Red", "Green"]));
        let covered: FxHashSet<String> = ["Red".to_string(), "Blue".to_string()].into_iter().collect();
        let hits = reg.adts_covering(&covered);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Color");
    }

    #[test]
    fn alias_resolution_follows_chain() {
        let mut reg = TypeRegistry::new();
        reg.register_type(alias("UserId", "Int"));
        reg.register_type(alias("Key", "UserId"));
        assert_eq!(reg.resolve_alias(&Ty::Name("Key".into())), Ty::int());
    }

    #[test]
    fn alias_cycle_detected_and_resolution_terminates() {
        let mut reg = TypeRegistry::new();
        reg.register_type(alias("A", "B"));
        reg.register_type(alias("B", "A"));
        assert!(reg.alias_has_cycle("A"));
        // Resolution must not loop; a cyclic alias resolves to itself.
        assert_eq!(reg.resolve_alias(&Ty::Name("A".into())), Ty::Name("A".into()));
    }

    #[test]
    fn method_lookup() {
        let mut reg = TypeRegistry::new();
        reg.register_impl_method(
            "Point",
            MethodSig {
                name: "norm".into(),
                param_count: 0,
                param_types: Vec::new(),
                return_type: Some("Float".into()),
            },
        );
        assert!(reg.lookup_method("Point", "norm").is_some());
        assert!(reg.lookup_method("Point", "scale").is_none());
    }
}
