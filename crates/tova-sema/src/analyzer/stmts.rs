//! Statement visitors: bindings, control flow, and the per-branch
//! narrowing overlays.

use tova_ast::{
    Assignment, BoolLit, Break, CompoundAssignment, Continue, Defer, Destructure,
    DestructureTarget, Expr, ForStmt, Guard, IfStmt, LoopStmt, Return, Throw, TryCatch,
    WhileStmt,
};
use tova_common::{Code, Loc};

use crate::infer::InferCx;
use crate::narrow;
use crate::scope::{ScopeKind, Symbol, SymbolKind};
use crate::ty::{compatible, is_float_narrowing, Ty};

use super::Analyzer;

impl Analyzer {
    // ── Bindings ────────────────────────────────────────────────────────

    pub(crate) fn visit_assignment(&mut self, a: &Assignment) {
        self.walk_expr(&a.value);
        match a.target.as_ref() {
            Expr::Identifier(id) => self.assign_ident(&id.name, a, id.loc.or(a.loc)),
            // Member/index targets: only the subexpressions are checked.
            other => self.walk_expr(other),
        }
    }

    fn assign_ident(&mut self, name: &str, a: &Assignment, loc: Option<Loc>) {
        let value_ty = self.infer_ty(&a.value);
        let declared = a.ty.as_ref().map(InferCx::from_annotation);

        if let Some(sym_id) = self.scopes.lookup_for_assignment(self.scope, name) {
            if a.mutable {
                // `var x = ...` is a declaration; colliding with a live
                // binding is a redefinition, not a reassignment.
                self.error(
                    Code::E203,
                    format!("`{name}` is already defined in this scope"),
                    loc,
                );
                return;
            }
            let sym = self.scopes.symbol(sym_id);
            if !sym.mutable {
                self.error(
                    Code::E202,
                    format!("cannot reassign immutable binding `{name}`"),
                    loc,
                )
                .set_hint(format!("declare it with `var {name} = ...` to allow reassignment"));
                return;
            }
            let expected = sym.ty.as_deref().and_then(Ty::parse);
            self.check_assign_compat(expected, value_ty, loc);
            return;
        }

        // First binding: this is the declaration site.
        self.check_value_name(name, loc);
        if !name.starts_with('_') && self.scopes.exists_in_outer_scope(self.scope, name) {
            self.warn(
                Code::W101,
                format!("`{name}` shadows a binding from an outer scope"),
                loc,
            );
        }
        self.check_assign_compat(declared.clone(), value_ty.clone(), loc);

        let ty_string = declared
            .map(|t| t.to_string())
            .or_else(|| value_ty.map(|t| t.to_string()));
        let mut sym = Symbol::new(name, SymbolKind::Variable).at(loc);
        sym.mutable = a.mutable;
        sym.ty = ty_string;
        sym.declared_ty = a.ty.clone();
        if self.scopes.define(self.scope, sym).is_err() {
            self.error(
                Code::E203,
                format!("`{name}` is already defined in this scope"),
                loc,
            );
        }
    }

    /// Assignment-position compatibility: E102 on mismatch, W204 (or E102
    /// in strict mode) for the Int <- Float data-loss case.
    pub(crate) fn check_assign_compat(
        &mut self,
        expected: Option<Ty>,
        actual: Option<Ty>,
        loc: Option<Loc>,
    ) {
        let (Some(expected), Some(actual)) = (expected, actual) else {
            return;
        };
        if compatible(&expected, &actual, &self.registry) {
            return;
        }
        if is_float_narrowing(&expected, &actual) && !self.opts.strict {
            self.warn(
                Code::W204,
                "implicit Float to Int narrowing loses precision",
                loc,
            )
            .set_hint("use `to_int(...)` to convert explicitly");
            return;
        }
        self.error(
            Code::E102,
            format!("type mismatch: expected `{expected}`, found `{actual}`"),
            loc,
        );
    }

    pub(crate) fn visit_destructure(&mut self, d: &Destructure) {
        self.walk_expr(&d.value);
        let value_ty = self.infer_ty(&d.value);

        let bind = |this: &mut Self, name: &str, ty: Option<Ty>, loc: Option<Loc>, mutable: bool| {
            this.check_value_name(name, loc);
            if !name.starts_with('_') && this.scopes.exists_in_outer_scope(this.scope, name) {
                this.warn(
                    Code::W101,
                    format!("`{name}` shadows a binding from an outer scope"),
                    loc,
                );
            }
            let mut sym = Symbol::new(name, SymbolKind::Variable).at(loc);
            sym.mutable = mutable;
            sym.ty = ty.map(|t| t.to_string());
            if this.scopes.define(this.scope, sym).is_err() {
                this.error(
                    Code::E203,
                    format!("`{name}` is already defined in this scope"),
                    loc,
                );
            }
        };

        match &d.target {
            DestructureTarget::Tuple(names) => {
                let elems = match &value_ty {
                    Some(Ty::Tuple(elems)) => Some(elems),
                    _ => None,
                };
                for (i, name) in names.iter().enumerate() {
                    let ty = elems.and_then(|e| e.get(i)).cloned();
                    bind(self, name, ty, d.loc, d.mutable);
                }
            }
            DestructureTarget::Array { elements, rest } => {
                let elem_ty = match &value_ty {
                    Some(Ty::Array(e)) => Some((**e).clone()),
                    _ => None,
                };
                for name in elements {
                    bind(self, name, elem_ty.clone(), d.loc, d.mutable);
                }
                if let Some(rest) = rest {
                    bind(self, rest, value_ty.clone(), d.loc, d.mutable);
                }
            }
            DestructureTarget::Object(keys) => {
                for key in keys {
                    let field_ty = match &value_ty {
                        Some(Ty::Record(fields)) => fields
                            .iter()
                            .find(|(n, _)| n == &key.key)
                            .map(|(_, t)| t.clone()),
                        _ => None,
                    };
                    let name = key.alias.as_deref().unwrap_or(&key.key);
                    bind(self, name, field_ty, d.loc, d.mutable);
                }
            }
        }
    }

    pub(crate) fn visit_compound_assignment(&mut self, c: &CompoundAssignment) {
        self.walk_expr(&c.value);
        let Expr::Identifier(id) = c.target.as_ref() else {
            self.walk_expr(&c.target);
            return;
        };
        let loc = id.loc.or(c.loc);
        let Some(sym_id) = self.scopes.lookup_for_assignment(self.scope, &id.name) else {
            self.error(
                Code::E200,
                format!("undefined identifier `{}`", id.name),
                loc,
            );
            return;
        };
        self.scopes.mark_used(sym_id);
        let sym = self.scopes.symbol(sym_id);
        if !sym.mutable {
            let name = &id.name;
            self.error(
                Code::E202,
                format!("cannot reassign immutable binding `{name}`"),
                loc,
            )
            .set_hint(format!("declare it with `var {name} = ...` to allow reassignment"));
            return;
        }
        let expected = sym.ty.as_deref().and_then(Ty::parse);
        let actual = self.infer_ty(&c.value);
        if let (Some(expected), Some(actual)) = (expected, actual) {
            if !compatible(&expected, &actual, &self.registry) {
                let op = c.op.as_str();
                self.strict_upgrade(
                    Code::W104,
                    Code::E106,
                    format!("`{op}=` operand type `{actual}` is incompatible with `{expected}`"),
                    loc,
                );
            }
        }
    }

    // ── Control flow ────────────────────────────────────────────────────

    pub(crate) fn visit_if(&mut self, ifs: &IfStmt) {
        self.walk_expr(&ifs.condition);
        self.check_constant_condition(&ifs.condition);
        let narrowing = narrow::from_condition(&self.cx(), &ifs.condition);

        let then_scope = self.enter(ScopeKind::Block);
        if let Some(n) = &narrowing {
            if let Some(ty) = &n.on_true {
                self.scopes.set_narrowed(then_scope, &n.name, ty);
            }
        }
        self.visit_all(&ifs.then_body);
        self.exit();

        for elif in &ifs.elifs {
            self.walk_expr(&elif.condition);
            self.check_constant_condition(&elif.condition);
            let elif_narrowing = narrow::from_condition(&self.cx(), &elif.condition);
            let scope = self.enter(ScopeKind::Block);
            if let Some(n) = &elif_narrowing {
                if let Some(ty) = &n.on_true {
                    self.scopes.set_narrowed(scope, &n.name, ty);
                }
            }
            self.visit_all(&elif.body);
            self.exit();
        }

        if let Some(else_body) = &ifs.else_body {
            let else_scope = self.enter(ScopeKind::Block);
            if let Some(n) = &narrowing {
                if let Some(ty) = &n.on_false {
                    self.scopes.set_narrowed(else_scope, &n.name, ty);
                }
            }
            self.visit_all(else_body);
            self.exit();
        }
    }

    fn check_constant_condition(&mut self, cond: &Expr) {
        if let Expr::BoolLit(BoolLit { value, loc }) = cond {
            if *value {
                self.warn(Code::W202, "condition is always true", *loc);
            } else {
                self.warn(Code::W203, "condition is always false", *loc);
            }
        }
    }

    pub(crate) fn visit_guard(&mut self, g: &Guard) {
        self.walk_expr(&g.condition);
        let narrowing = narrow::from_condition(&self.cx(), &g.condition);

        // The else body only runs when the condition fails.
        let else_scope = self.enter(ScopeKind::Block);
        if let Some(n) = &narrowing {
            if let Some(ty) = &n.on_false {
                self.scopes.set_narrowed(else_scope, &n.name, ty);
            }
        }
        self.visit_all(&g.else_body);
        self.exit();

        // Success flows through: the refinement persists in the current
        // scope from this statement onward.
        if let Some(n) = &narrowing {
            if let Some(ty) = &n.on_true {
                self.scopes.set_narrowed(self.scope, &n.name, ty);
            }
        }
    }

    pub(crate) fn visit_for(&mut self, f: &ForStmt) {
        self.walk_expr(&f.iter);
        let elem_ty = match self.infer_ty(&f.iter) {
            Some(Ty::Array(elem)) => Some(*elem),
            _ => None,
        };
        self.enter_loop(f.label.clone());
        for (i, name) in f.bindings.iter().enumerate() {
            self.check_value_name(name, f.loc);
            let mut sym = Symbol::new(name, SymbolKind::Variable).at(f.loc);
            // The single-binding form receives the element type; the
            // two-binding (key, value) form stays gradual.
            if i == 0 && f.bindings.len() == 1 {
                sym.ty = elem_ty.as_ref().map(|t| t.to_string());
            }
            if self.scopes.define(self.scope, sym).is_err() {
                self.error(
                    Code::E203,
                    format!("`{name}` is already defined in this scope"),
                    f.loc,
                );
            }
        }
        self.visit_all(&f.body);
        self.exit();
    }

    pub(crate) fn visit_while(&mut self, w: &WhileStmt) {
        self.walk_expr(&w.condition);
        self.enter_loop(w.label.clone());
        self.visit_all(&w.body);
        self.exit();
    }

    pub(crate) fn visit_loop(&mut self, l: &LoopStmt) {
        self.enter_loop(l.label.clone());
        self.visit_all(&l.body);
        self.exit();
    }

    pub(crate) fn visit_break(&mut self, b: &Break) {
        if !self.scopes.in_loop(self.scope, b.label.as_deref()) {
            let message = match &b.label {
                Some(label) => format!("`break {label}` has no matching loop"),
                None => "`break` outside a loop".to_string(),
            };
            self.error(Code::E304, message, b.loc);
        }
    }

    pub(crate) fn visit_continue(&mut self, c: &Continue) {
        if !self.scopes.in_loop(self.scope, c.label.as_deref()) {
            let message = match &c.label {
                Some(label) => format!("`continue {label}` has no matching loop"),
                None => "`continue` outside a loop".to_string(),
            };
            self.error(Code::E305, message, c.loc);
        }
    }

    pub(crate) fn visit_try_catch(&mut self, t: &TryCatch) {
        self.enter(ScopeKind::Block);
        self.visit_all(&t.body);
        self.exit();

        if let Some(catch_body) = &t.catch_body {
            self.enter(ScopeKind::Block);
            if let Some(name) = &t.catch_name {
                let sym = Symbol::new(name, SymbolKind::Variable).at(t.loc).typed("Any");
                let _ = self.scopes.define(self.scope, sym);
            }
            self.visit_all(catch_body);
            self.exit();
        }
    }

    pub(crate) fn visit_throw(&mut self, t: &Throw) {
        self.walk_expr(&t.value);
        self.warn(Code::W206, "`throw` unwinds the stack", t.loc)
            .set_hint("prefer returning a `Result` and handling the error at the call site");
    }

    pub(crate) fn visit_return(&mut self, r: &Return) {
        if self.return_types.is_empty() {
            self.error(Code::E301, "`return` outside a function", r.loc);
            return;
        }
        if let Some(value) = &r.value {
            self.walk_expr(value);
        }
        let declared = self
            .return_types
            .last()
            .and_then(|t| t.as_deref())
            .and_then(Ty::parse);
        let Some(expected) = declared else { return };
        let actual = match &r.value {
            Some(value) => self.infer_ty(value),
            None => Some(Ty::Nil),
        };
        if let Some(actual) = actual {
            if !compatible(&expected, &actual, &self.registry) {
                self.error(
                    Code::E101,
                    format!("return type mismatch: expected `{expected}`, found `{actual}`"),
                    r.loc,
                );
            }
        }
    }

    pub(crate) fn visit_defer(&mut self, d: &Defer) {
        if self.return_types.is_empty() {
            self.warn(Code::W208, "`defer` outside a function has no effect", d.loc);
        }
        self.enter(ScopeKind::Block);
        self.visit_all(&d.body);
        self.exit();
    }

    // ── Naming conventions ──────────────────────────────────────────────

    /// snake_case or UPPER_SNAKE_CASE for variables, functions, and
    /// parameters. A leading underscore suppresses the check.
    pub(crate) fn check_value_name(&mut self, name: &str, loc: Option<Loc>) {
        if name.starts_with('_') || is_snake_case(name) || is_upper_snake_case(name) {
            return;
        }
        self.warn(
            Code::W100,
            format!("`{name}` should be snake_case or UPPER_SNAKE_CASE"),
            loc,
        );
    }

    /// PascalCase for types, components, and stores. A leading underscore
    /// suppresses the check.
    pub(crate) fn check_type_name(&mut self, name: &str, loc: Option<Loc>) {
        if name.starts_with('_') || is_pascal_case(name) {
            return;
        }
        self.warn(Code::W100, format!("`{name}` should be PascalCase"), loc);
    }
}

pub(crate) fn is_snake_case(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

pub(crate) fn is_upper_snake_case(name: &str) -> bool {
    !name.is_empty()
        && name.chars().any(|c| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

pub(crate) fn is_pascal_case(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase()) && !name.contains('_')
}
