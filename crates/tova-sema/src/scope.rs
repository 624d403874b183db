//! The lexical scope tree and symbol arena.
//!
//! Symbols live in one arena indexed by [`SymbolId`]; scopes hold a
//! name-to-index map plus a parent index, so the tree can be retained
//! cheaply after analysis for the unused-symbol post-pass and for
//! downstream consumers. A symbol is mutated in exactly two places after
//! definition: the usage-flag flip and the first-binding type assignment.

use rustc_hash::FxHashMap;
use tova_ast::TypeExpr;
use tova_common::Loc;

/// Index of a scope in the tree's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

/// Index of a symbol in the arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

/// The context kind of a scope.
///
/// `Module`, `Server`, `Client`, and `Shared` are the top-level block
/// contexts; `Function` starts a new assignment/narrowing boundary; `Block`
/// is any nested brace scope (loops, branches, match arms, test bodies).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Server,
    Client,
    Shared,
    Function,
    Block,
}

impl ScopeKind {
    /// Whether this scope is a function/top-level boundary: the stopping
    /// point for assignment lookups and the shadow-warning horizon.
    pub fn is_boundary(self) -> bool {
        !matches!(self, ScopeKind::Block)
    }

    /// Whether this is one of the top-level block contexts.
    pub fn is_top_level(self) -> bool {
        matches!(
            self,
            ScopeKind::Module | ScopeKind::Server | ScopeKind::Client | ScopeKind::Shared
        )
    }
}

/// What a symbol names.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Builtin,
    Variable,
    Parameter,
    Function,
    Type,
    State,
    Computed,
    Component,
    Module,
}

/// Side data carried by function symbols.
#[derive(Clone, Debug, Default)]
pub struct FnInfo {
    /// Parameter names, in order.
    pub params: Vec<String>,
    /// Number of parameters without defaults.
    pub required: usize,
    /// Total number of parameters.
    pub total: usize,
    /// Canonical type string per parameter; `None` for unannotated.
    pub param_types: Vec<Option<String>>,
    /// Generic type parameter names.
    pub type_params: Vec<String>,
    /// Canonical return type string, when declared.
    pub return_type: Option<String>,
    pub is_async: bool,
    pub is_extern: bool,
    /// For variant constructors: the owning ADT's name.
    pub variant_of: Option<String>,
}

/// A method signature recorded on interface/trait symbols.
#[derive(Clone, Debug)]
pub struct IfaceMethod {
    pub name: String,
    /// Parameter count, excluding `self`.
    pub param_count: usize,
    pub param_types: Vec<Option<String>>,
    pub return_type: Option<String>,
}

/// A named entity in some scope.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub mutable: bool,
    pub loc: Option<Loc>,
    pub used: bool,
    /// Canonical inferred-type string.
    pub ty: Option<String>,
    /// The declared annotation, verbatim from the AST.
    pub declared_ty: Option<TypeExpr>,
    pub public: bool,
    pub fn_info: Option<FnInfo>,
    /// Method signatures, for interface/trait symbols.
    pub methods: Option<Vec<IfaceMethod>>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Symbol {
            name: name.into(),
            kind,
            mutable: false,
            loc: None,
            used: false,
            ty: None,
            declared_ty: None,
            public: false,
            fn_info: None,
            methods: None,
        }
    }

    pub fn mutable(mut self) -> Self {
        self.mutable = true;
        self
    }

    pub fn at(mut self, loc: Option<Loc>) -> Self {
        self.loc = loc;
        self
    }

    pub fn typed(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    pub fn with_fn_info(mut self, info: FnInfo) -> Self {
        self.fn_info = Some(info);
        self
    }
}

/// One node of the scope tree.
#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub kind: ScopeKind,
    /// Name -> symbol index, current scope only.
    names: FxHashMap<String, SymbolId>,
    pub is_loop: bool,
    pub loop_label: Option<String>,
    /// Flow-narrowing overlay: name -> refined canonical type.
    narrowed: FxHashMap<String, String>,
}

/// Why a definition was rejected.
#[derive(Debug, PartialEq, Eq)]
pub enum DefineError {
    /// The name already exists in this scope (and is not a builtin being
    /// overridden by an extern).
    Redefinition,
}

/// The scope tree: a symbol arena plus a tree of name tables.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    /// Owning scope per symbol, parallel to `symbols`.
    owners: Vec<ScopeId>,
}

impl ScopeTree {
    /// Create a tree holding only the module root scope.
    pub fn new() -> Self {
        ScopeTree {
            scopes: vec![Scope {
                parent: None,
                children: Vec::new(),
                kind: ScopeKind::Module,
                names: FxHashMap::default(),
                is_loop: false,
                loop_label: None,
                narrowed: FxHashMap::default(),
            }],
            symbols: Vec::new(),
            owners: Vec::new(),
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Open a new child scope.
    pub fn push(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent: Some(parent),
            children: Vec::new(),
            kind,
            names: FxHashMap::default(),
            is_loop: false,
            loop_label: None,
            narrowed: FxHashMap::default(),
        });
        self.scopes[parent.0 as usize].children.push(id);
        id
    }

    /// Open a loop scope, carrying the `is_loop` flag and optional label.
    pub fn push_loop(&mut self, parent: ScopeId, label: Option<String>) -> ScopeId {
        let id = self.push(parent, ScopeKind::Block);
        let scope = &mut self.scopes[id.0 as usize];
        scope.is_loop = true;
        scope.loop_label = label;
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    /// Number of scopes in the tree.
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// All scope ids, in creation order.
    pub fn scope_ids(&self) -> impl Iterator<Item = ScopeId> {
        (0..self.scopes.len() as u32).map(ScopeId)
    }

    /// All symbol ids, in definition order. Definition order is what makes
    /// the unused-symbol report deterministic.
    pub fn symbol_ids(&self) -> impl Iterator<Item = SymbolId> {
        (0..self.symbols.len() as u32).map(SymbolId)
    }

    /// The scope a symbol was defined in.
    pub fn scope_of(&self, sym: SymbolId) -> ScopeId {
        self.owners[sym.0 as usize]
    }

    // ── Definition ──────────────────────────────────────────────────────

    /// Insert a symbol into a scope.
    ///
    /// Fails with [`DefineError::Redefinition`] if the name already exists
    /// locally, unless the existing symbol is a builtin being overridden by
    /// an extern declaration of the same name.
    pub fn define(&mut self, scope: ScopeId, symbol: Symbol) -> Result<SymbolId, DefineError> {
        if let Some(&existing) = self.scopes[scope.0 as usize].names.get(&symbol.name) {
            let old = &self.symbols[existing.0 as usize];
            let extern_override = old.kind == SymbolKind::Builtin
                && symbol.fn_info.as_ref().is_some_and(|f| f.is_extern);
            if !extern_override {
                return Err(DefineError::Redefinition);
            }
        }
        let id = SymbolId(self.symbols.len() as u32);
        let name = symbol.name.clone();
        self.symbols.push(symbol);
        self.owners.push(scope);
        self.scopes[scope.0 as usize].names.insert(name, id);
        Ok(id)
    }

    // ── Lookup ──────────────────────────────────────────────────────────

    /// Look a name up in one scope only.
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scopes[scope.0 as usize].names.get(name).copied()
    }

    /// Look a name up, walking parents to the root.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(sym) = self.lookup_local(id, name) {
                return Some(sym);
            }
            current = self.scopes[id.0 as usize].parent;
        }
        None
    }

    /// Look a name up for assignment: walk parents, but stop after the
    /// first function/top-level boundary. This is what makes reassignment
    /// of an enclosing-function binding visible from arbitrarily nested
    /// blocks, without ever crossing into an outer function.
    pub fn lookup_for_assignment(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(sym) = self.lookup_local(id, name) {
                return Some(sym);
            }
            if self.scopes[id.0 as usize].kind.is_boundary() {
                return None;
            }
            current = self.scopes[id.0 as usize].parent;
        }
        None
    }

    /// Whether the name exists in any scope beyond the nearest
    /// function/top-level boundary. Drives shadow warnings.
    pub fn exists_in_outer_scope(&self, scope: ScopeId, name: &str) -> bool {
        let mut current = Some(scope);
        // Skip scopes up to and including the nearest boundary.
        while let Some(id) = current {
            let s = &self.scopes[id.0 as usize];
            current = s.parent;
            if s.kind.is_boundary() {
                break;
            }
        }
        while let Some(id) = current {
            if self.lookup_local(id, name).is_some() {
                return true;
            }
            current = self.scopes[id.0 as usize].parent;
        }
        false
    }

    /// Whether any scope from here up to (and including) the enclosing
    /// function is a loop; labels must match when one is given.
    pub fn in_loop(&self, scope: ScopeId, label: Option<&str>) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = &self.scopes[id.0 as usize];
            if s.is_loop && (label.is_none() || s.loop_label.as_deref() == label) {
                return true;
            }
            if s.kind == ScopeKind::Function {
                return false;
            }
            current = s.parent;
        }
        false
    }

    /// The nearest enclosing top-level block context.
    pub fn block_context(&self, scope: ScopeId) -> ScopeKind {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = &self.scopes[id.0 as usize];
            if s.kind.is_top_level() {
                return s.kind;
            }
            current = s.parent;
        }
        ScopeKind::Module
    }

    /// A visible name that differs from `name` only in case, for
    /// "did you mean" hints on resolution errors.
    pub fn suggest_similar(&self, scope: ScopeId, name: &str) -> Option<&str> {
        let mut current = Some(scope);
        while let Some(id) = current {
            for candidate in self.scopes[id.0 as usize].names.keys() {
                if candidate != name && candidate.eq_ignore_ascii_case(name) {
                    return Some(candidate);
                }
            }
            current = self.scopes[id.0 as usize].parent;
        }
        None
    }

    // ── Symbol mutation ─────────────────────────────────────────────────

    /// Flip the usage flag. The single post-definition write besides
    /// [`ScopeTree::assign_type`].
    pub fn mark_used(&mut self, id: SymbolId) {
        self.symbols[id.0 as usize].used = true;
    }

    /// Record the inferred type at first binding. Later writes are
    /// ignored: a binding's type is fixed where it is introduced.
    pub fn assign_type(&mut self, id: SymbolId, ty: String) {
        let sym = &mut self.symbols[id.0 as usize];
        if sym.ty.is_none() {
            sym.ty = Some(ty);
        }
    }

    // ── Narrowing overlay ───────────────────────────────────────────────

    /// Install a narrowed type for a name in one scope.
    pub fn set_narrowed(&mut self, scope: ScopeId, name: impl Into<String>, ty: impl Into<String>) {
        self.scopes[scope.0 as usize].narrowed.insert(name.into(), ty.into());
    }

    /// The active narrowed type for a name, innermost overlay first.
    pub fn narrowed_type(&self, scope: ScopeId, name: &str) -> Option<&str> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = &self.scopes[id.0 as usize];
            if let Some(ty) = s.narrowed.get(name) {
                return Some(ty);
            }
            if s.kind == ScopeKind::Function {
                return None;
            }
            current = s.parent;
        }
        None
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_lookup() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let id = tree.define(root, Symbol::new("x", SymbolKind::Variable)).unwrap();
        assert_eq!(tree.lookup_local(root, "x"), Some(id));
        assert_eq!(tree.lookup(root, "x"), Some(id));
        assert_eq!(tree.lookup(root, "y"), None);
    }

    #[test]
    fn redefinition_rejected() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.define(root, Symbol::new("x", SymbolKind::Variable)).unwrap();
        assert_eq!(
            tree.define(root, Symbol::new("x", SymbolKind::Variable)),
            Err(DefineError::Redefinition)
        );
    }

    #[test]
    fn extern_overrides_builtin() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.define(root, Symbol::new("fetch", SymbolKind::Builtin)).unwrap();
        let ext = Symbol::new("fetch", SymbolKind::Function).with_fn_info(FnInfo {
            is_extern: true,
            ..FnInfo::default()
        });
        assert!(tree.define(root, ext).is_ok());
        // But a plain function may not override a builtin.
        let mut tree2 = ScopeTree::new();
        let root2 = tree2.root();
        tree2.define(root2, Symbol::new("fetch", SymbolKind::Builtin)).unwrap();
        assert!(tree2
            .define(root2, Symbol::new("fetch", SymbolKind::Function))
            .is_err());
    }

    #[test]
    fn lookup_walks_parents() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let outer = tree.define(root, Symbol::new("x", SymbolKind::Variable)).unwrap();
        let func = tree.push(root, ScopeKind::Function);
        let block = tree.push(func, ScopeKind::Block);
        assert_eq!(tree.lookup(block, "x"), Some(outer));
    }

    #[test]
    fn assignment_lookup_stops_at_function_boundary() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.define(root, Symbol::new("x", SymbolKind::Variable)).unwrap();
        let func = tree.push(root, ScopeKind::Function);
        let inner = tree.define(func, Symbol::new("y", SymbolKind::Variable)).unwrap();
        let block = tree.push(func, ScopeKind::Block);
        let deep = tree.push(block, ScopeKind::Block);

        // y is visible for assignment from arbitrarily nested blocks.
        assert_eq!(tree.lookup_for_assignment(deep, "y"), Some(inner));
        // x lives beyond the function boundary: invisible for assignment.
        assert_eq!(tree.lookup_for_assignment(deep, "x"), None);
        // At the top level the module scope itself is the boundary.
        assert!(tree.lookup_for_assignment(root, "x").is_some());
    }

    #[test]
    fn outer_scope_shadow_check() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.define(root, Symbol::new("x", SymbolKind::Variable)).unwrap();
        let func = tree.push(root, ScopeKind::Function);
        let block = tree.push(func, ScopeKind::Block);
        assert!(tree.exists_in_outer_scope(block, "x"));
        assert!(!tree.exists_in_outer_scope(block, "nope"));
    }

    #[test]
    fn loop_detection_respects_function_boundary() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let func = tree.push(root, ScopeKind::Function);
        let lp = tree.push_loop(func, Some("outer".into()));
        let body = tree.push(lp, ScopeKind::Block);
        assert!(tree.in_loop(body, None));
        assert!(tree.in_loop(body, Some("outer")));
        assert!(!tree.in_loop(body, Some("inner")));
        // A lambda inside the loop body is not "in" the loop.
        let lambda = tree.push(body, ScopeKind::Function);
        assert!(!tree.in_loop(lambda, None));
    }

    #[test]
    fn narrowing_overlay_walks_up_to_function() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let func = tree.push(root, ScopeKind::Function);
        let branch = tree.push(func, ScopeKind::Block);
        tree.set_narrowed(branch, "x", "String");
        let deep = tree.push(branch, ScopeKind::Block);
        assert_eq!(tree.narrowed_type(deep, "x"), Some("String"));
        assert_eq!(tree.narrowed_type(func, "x"), None);
    }

    #[test]
    fn type_assignment_only_binds_once() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let id = tree.define(root, Symbol::new("x", SymbolKind::Variable)).unwrap();
        tree.assign_type(id, "Int".into());
        tree.assign_type(id, "String".into());
        assert_eq!(tree.symbol(id).ty.as_deref(), Some("Int"));
    }

    #[test]
    fn every_scope_reaches_module_root() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let a = tree.push(root, ScopeKind::Server);
        let b = tree.push(a, ScopeKind::Function);
        let c = tree.push(b, ScopeKind::Block);
        for id in [a, b, c] {
            let mut cur = Some(id);
            let mut last = id;
            while let Some(s) = cur {
                last = s;
                cur = tree.scope(s).parent;
            }
            assert_eq!(last, root);
        }
        assert_eq!(tree.scope(root).kind, ScopeKind::Module);
    }
}
