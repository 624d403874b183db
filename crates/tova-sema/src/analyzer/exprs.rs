//! Expression walking: identifier resolution, call-site validation,
//! cross-block RPC checks, match analysis, and the async-use check.
//!
//! Walking is the effectful side of expression handling — it flips usage
//! flags and emits diagnostics. Type questions go through the pure
//! inference context.

use rustc_hash::FxHashMap;
use tova_ast::{
    Arg, BinaryOp, CallExpr, Expr, Identifier, JsxChild, JsxElement, JsxFragment, LambdaBody,
    LambdaExpr, MatchExpr, Pattern,
};
use tova_common::{Code, Loc};

use crate::exhaustiveness;
use crate::infer::InferCx;
use crate::scope::{FnInfo, ScopeKind, Symbol, SymbolKind};
use crate::ty::{compatible, infer_bindings, substitute, Ty};

use super::Analyzer;

impl Analyzer {
    pub(crate) fn walk_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Identifier(id) => self.use_ident(id),
            Expr::NumberLit(_) | Expr::StringLit(_) | Expr::BoolLit(_) | Expr::NilLit(_) => {}
            Expr::TemplateLit(t) => {
                for part in &t.parts {
                    if let tova_ast::TemplatePart::Interp(e) = part {
                        self.walk_expr(e);
                    }
                }
            }
            Expr::BinaryExpr(bin) => {
                self.walk_expr(&bin.left);
                self.walk_expr(&bin.right);
                self.check_binary_operands(bin.op, &bin.left, &bin.right, bin.loc);
            }
            Expr::UnaryExpr(un) => self.walk_expr(&un.operand),
            Expr::LogicalExpr(l) => {
                self.walk_expr(&l.left);
                self.walk_expr(&l.right);
            }
            Expr::ChainedCompare(c) => {
                for operand in &c.operands {
                    self.walk_expr(operand);
                }
            }
            Expr::Membership(m) => {
                self.walk_expr(&m.item);
                self.walk_expr(&m.collection);
            }
            Expr::CallExpr(call) => self.walk_call(call, false),
            Expr::MemberExpr(member) => self.walk_expr(&member.object),
            Expr::PipeExpr(pipe) => {
                self.walk_expr(&pipe.left);
                match pipe.right.as_ref() {
                    Expr::CallExpr(call) => self.walk_call(call, true),
                    other => self.walk_expr(other),
                }
            }
            Expr::LambdaExpr(lambda) => self.walk_lambda(lambda),
            Expr::MatchExpr(m) => self.visit_match(m),
            Expr::ArrayLit(arr) => {
                for element in &arr.elements {
                    self.walk_expr(element);
                }
            }
            Expr::ObjectLit(obj) => {
                for entry in &obj.entries {
                    self.walk_expr(&entry.value);
                }
            }
            Expr::TupleExpr(t) => {
                for element in &t.elements {
                    self.walk_expr(element);
                }
            }
            Expr::ListComp(comp) => {
                self.walk_expr(&comp.iter);
                let elem_ty = match self.infer_ty(&comp.iter) {
                    Some(Ty::Array(e)) => Some((*e).to_string()),
                    _ => None,
                };
                self.enter(ScopeKind::Block);
                let mut sym = Symbol::new(&comp.binding, SymbolKind::Variable);
                sym.ty = elem_ty;
                let _ = self.scopes.define(self.scope, sym);
                if let Some(cond) = &comp.condition {
                    self.walk_expr(cond);
                }
                self.walk_expr(&comp.element);
                self.exit();
            }
            Expr::DictComp(comp) => {
                self.walk_expr(&comp.iter);
                self.enter(ScopeKind::Block);
                let _ = self
                    .scopes
                    .define(self.scope, Symbol::new(&comp.binding, SymbolKind::Variable));
                if let Some(cond) = &comp.condition {
                    self.walk_expr(cond);
                }
                self.walk_expr(&comp.key);
                self.walk_expr(&comp.value);
                self.exit();
            }
            Expr::RangeExpr(r) => {
                self.walk_expr(&r.start);
                self.walk_expr(&r.end);
            }
            Expr::SliceExpr(s) => {
                self.walk_expr(&s.object);
                if let Some(start) = &s.start {
                    self.walk_expr(start);
                }
                if let Some(end) = &s.end {
                    self.walk_expr(end);
                }
            }
            Expr::SpreadExpr(s) => self.walk_expr(&s.value),
            Expr::PropagateExpr(p) => self.walk_expr(&p.value),
            Expr::AwaitExpr(a) => {
                if self.async_depth == 0 {
                    self.error(Code::E300, "`await` outside an async function", a.loc)
                        .set_hint("mark the enclosing function `async`");
                }
                self.walk_expr(&a.value);
            }
            Expr::YieldExpr(y) => {
                if let Some(value) = &y.value {
                    self.walk_expr(value);
                }
            }
            Expr::IfExpr(ife) => {
                self.walk_expr(&ife.condition);
                self.walk_expr(&ife.then);
                self.walk_expr(&ife.otherwise);
            }
            Expr::JsxElement(el) => self.walk_jsx_element(el),
            Expr::JsxFragment(frag) => self.walk_jsx_fragment(frag),
            Expr::ColumnExpr(col) => {
                if let Some(value) = &col.value {
                    self.walk_expr(value);
                }
            }
            Expr::Unknown => {}
        }
    }

    // ── Identifiers ─────────────────────────────────────────────────────

    pub(crate) fn use_ident(&mut self, id: &Identifier) {
        match self.scopes.lookup(self.scope, &id.name) {
            Some(sym) => self.scopes.mark_used(sym),
            None => {
                let name = &id.name;
                let suggestion = self
                    .scopes
                    .suggest_similar(self.scope, name)
                    .map(|s| format!("did you mean `{s}`?"));
                let d = self.error(Code::E200, format!("undefined identifier `{name}`"), id.loc);
                if let Some(hint) = suggestion {
                    d.hint = Some(hint);
                }
            }
        }
    }

    // ── Binary operand checks ───────────────────────────────────────────

    /// Arithmetic operand validation: numeric on both sides, with the
    /// `String * Int` repeat form allowed. Strict mode upgrades to E105.
    fn check_binary_operands(&mut self, op: BinaryOp, left: &Expr, right: &Expr, loc: Option<Loc>) {
        if !op.is_arithmetic() {
            return;
        }
        let (Some(l), Some(r)) = (self.infer_ty(left), self.infer_ty(right)) else {
            return;
        };
        let numeric = |t: &Ty| *t == Ty::int() || *t == Ty::float();
        if numeric(&l) && numeric(&r) {
            return;
        }
        let string = Ty::string();
        if op == BinaryOp::Mul && ((l == string && r == Ty::int()) || (l == Ty::int() && r == string))
        {
            return;
        }
        let op_str = op.as_str();
        let offender = if numeric(&l) { &r } else { &l };
        let mut message =
            format!("operator `{op_str}` expects numeric operands, found `{offender}`");
        let mut hint = None;
        if op == BinaryOp::Add && (l == string || r == string) {
            message = "operator `+` does not concatenate strings".to_string();
            hint = Some("use `++` for string concatenation".to_string());
        }
        self.strict_upgrade(Code::W103, Code::E105, message, loc);
        if let Some(hint) = hint {
            if self.opts.strict {
                if let Some(d) = self.errors.last_mut() {
                    d.hint = Some(hint);
                }
            } else if let Some(d) = self.warnings.last_mut() {
                d.hint = Some(hint);
            }
        }
    }

    // ── Calls ───────────────────────────────────────────────────────────

    pub(crate) fn walk_call(&mut self, call: &CallExpr, piped: bool) {
        match call.callee.as_ref() {
            Expr::Identifier(id) => {
                match self.scopes.lookup(self.scope, &id.name) {
                    Some(sym_id) => {
                        self.scopes.mark_used(sym_id);
                        let info = self.scopes.symbol(sym_id).fn_info.clone();
                        if let Some(info) = info {
                            self.check_call_args(&id.name, &info, call, piped, id.loc);
                        }
                    }
                    None => self.use_ident(id),
                }
            }
            Expr::MemberExpr(member) => {
                let handled = self.check_rpc_call(member, call);
                if !handled {
                    self.walk_expr(&member.object);
                    self.check_method_arity(member, call);
                }
            }
            other => self.walk_expr(other),
        }
        for arg in &call.args {
            self.walk_expr(&arg.value);
        }
    }

    /// Argument count and type validation against a function's side data.
    fn check_call_args(
        &mut self,
        name: &str,
        info: &FnInfo,
        call: &CallExpr,
        piped: bool,
        loc: Option<Loc>,
    ) {
        let has_spread = call.args.iter().any(|a| a.spread);
        let has_named = call.args.iter().any(|a| a.name.is_some());
        let positional: Vec<&Arg> = call
            .args
            .iter()
            .filter(|a| a.name.is_none() && !a.spread)
            .collect();

        // Named arguments travel together as one options object.
        let supplied =
            positional.len() + usize::from(has_named) + usize::from(piped);

        if !has_spread && (supplied < info.required || supplied > info.total) {
            let expected = if info.required == info.total {
                format!("{}", info.total)
            } else {
                format!("{} to {}", info.required, info.total)
            };
            self.strict_upgrade(
                Code::W102,
                Code::E104,
                format!("`{name}` expects {expected} argument(s), found {supplied}"),
                loc,
            );
        }

        // Infer generic bindings across all supplied positionals, then
        // check each slot with the bindings substituted in.
        let offset = usize::from(piped);
        let actual_tys: Vec<Option<Ty>> = positional
            .iter()
            .map(|a| self.infer_ty(&a.value))
            .collect();

        let mut bindings = FxHashMap::default();
        if !info.type_params.is_empty() {
            for (i, actual) in actual_tys.iter().enumerate() {
                let (Some(Some(annot)), Some(actual)) =
                    (info.param_types.get(i + offset), actual)
                else {
                    continue;
                };
                if let Some(annot_ty) = Ty::parse(annot) {
                    infer_bindings(&annot_ty, actual, &info.type_params, &mut bindings);
                }
            }
        }

        for (i, (arg, actual)) in positional.iter().zip(&actual_tys).enumerate() {
            let (Some(Some(annot)), Some(actual)) = (info.param_types.get(i + offset), actual)
            else {
                continue;
            };
            let Some(annot_ty) = Ty::parse(annot) else { continue };
            let expected = if info.type_params.is_empty() {
                annot_ty
            } else {
                substitute(&annot_ty, &info.type_params, &bindings)
            };
            if !compatible(&expected, actual, &self.registry) {
                let slot = i + 1;
                let d_loc = arg.value.loc().or(loc);
                let hint = conversion_hint(&expected, actual);
                let d = self.error(
                    Code::E103,
                    format!("argument {slot} of `{name}`: expected `{expected}`, found `{actual}`"),
                    d_loc,
                );
                if let Some(hint) = hint {
                    d.hint = Some(hint);
                }
            }
        }
    }

    /// Validate `other.fn()` RPC-style calls between named server blocks.
    /// Returns true when the call was handled as an RPC reference.
    fn check_rpc_call(&mut self, member: &tova_ast::MemberExpr, call: &CallExpr) -> bool {
        let Some(current) = self.current_server_block.clone() else {
            return false;
        };
        let Expr::Identifier(obj) = member.object.as_ref() else {
            return false;
        };
        let Some(peer_fns) = self.server_blocks.get(&obj.name).cloned() else {
            return false;
        };

        if obj.name == current {
            let block = &obj.name;
            let func = &member.property;
            self.warn(
                Code::W105,
                format!("block `{block}` calls itself through its own name"),
                member.loc.or_else(|| call.loc),
            )
            .set_hint(format!("call `{func}()` directly"));
        } else if !peer_fns.contains(&member.property) {
            let block = &obj.name;
            let func = &member.property;
            self.error(
                Code::E201,
                format!("block `{block}` has no function `{func}`"),
                member.loc.or_else(|| call.loc),
            );
        }
        if let Some(sym) = self.scopes.lookup(self.scope, &obj.name) {
            self.scopes.mark_used(sym);
        }
        true
    }

    /// Arity check for method calls resolved through the impl registry.
    fn check_method_arity(&mut self, member: &tova_ast::MemberExpr, call: &CallExpr) {
        let Some(obj_ty) = self.infer_ty(&member.object) else { return };
        let Some(base) = obj_ty.base_name() else { return };
        let Some(sig) = self.registry.lookup_method(base, &member.property) else {
            return;
        };
        if call.args.iter().any(|a| a.spread) {
            return;
        }
        let supplied = call.args.len();
        if supplied != sig.param_count {
            let method = &member.property;
            let expected = sig.param_count;
            self.strict_upgrade(
                Code::W102,
                Code::E104,
                format!("`{method}` expects {expected} argument(s), found {supplied}"),
                member.loc.or_else(|| call.loc),
            );
        }
    }

    // ── Lambdas ─────────────────────────────────────────────────────────

    fn walk_lambda(&mut self, lambda: &LambdaExpr) {
        self.enter(ScopeKind::Function);
        for param in &lambda.params {
            self.check_value_name(&param.name, param.loc.or(lambda.loc));
            let mut sym = Symbol::new(&param.name, SymbolKind::Parameter).at(param.loc);
            sym.ty = param.ty.as_ref().map(|t| InferCx::from_annotation(t).to_string());
            let _ = self.scopes.define(self.scope, sym);
        }
        let saved_depth = self.async_depth;
        self.async_depth = if lambda.is_async { self.async_depth + 1 } else { 0 };
        self.return_types.push(None);

        match &lambda.body {
            LambdaBody::Expr(e) => self.walk_expr(e),
            LambdaBody::Block(body) => self.visit_all(body),
        }

        self.return_types.pop();
        self.async_depth = saved_depth;
        self.exit();
    }

    // ── Match ───────────────────────────────────────────────────────────

    pub(crate) fn visit_match(&mut self, m: &MatchExpr) {
        self.walk_expr(&m.subject);
        let subject_ty = self.infer_ty(&m.subject);
        let subject_name = match m.subject.as_ref() {
            Expr::Identifier(id) => Some(id.name.clone()),
            _ => None,
        };

        if m.arms.is_empty() {
            self.warn(Code::W200, "match has no arms", m.loc);
        }

        // Arms after an unguarded catch-all can never run.
        let catch_all = m
            .arms
            .iter()
            .position(|arm| arm.pattern.is_catch_all() && arm.guard.is_none());
        if let Some(idx) = catch_all {
            if idx + 1 < m.arms.len() {
                let loc = m.arms[idx + 1].loc.or(m.loc);
                self.warn(Code::W207, "unreachable match arm after a catch-all", loc);
            }
        }

        for arm in &m.arms {
            self.enter(ScopeKind::Block);
            self.bind_pattern(&arm.pattern, subject_ty.as_ref());
            if let (Some(name), Some(narrowed)) = (
                &subject_name,
                variant_narrowing(&arm.pattern, subject_ty.as_ref()),
            ) {
                self.scopes.set_narrowed(self.scope, name, narrowed);
            }
            if let Some(guard) = &arm.guard {
                self.walk_expr(guard);
            }
            match &arm.body {
                LambdaBody::Expr(e) => self.walk_expr(e),
                LambdaBody::Block(body) => self.visit_all(body),
            }
            self.exit();
        }

        for missing in
            exhaustiveness::missing_variants(m, subject_ty.as_ref(), &self.registry)
        {
            let adt = &missing.adt;
            let variant = &missing.variant;
            self.warn(
                Code::W200,
                format!("match on `{adt}` is missing variant `{variant}`"),
                m.loc,
            )
            .set_hint(format!("add a `{variant}` arm or a `_` catch-all"));
        }
    }

    /// Define the names a pattern binds, with field types resolved from
    /// the registry when the variant is known.
    fn bind_pattern(&mut self, pattern: &Pattern, subject_ty: Option<&Ty>) {
        match pattern {
            Pattern::Binding(b) => {
                let mut sym = Symbol::new(&b.name, SymbolKind::Variable).at(b.loc);
                sym.ty = subject_ty.map(|t| t.to_string());
                let _ = self.scopes.define(self.scope, sym);
            }
            Pattern::Tuple(t) => {
                let elems = match subject_ty {
                    Some(Ty::Tuple(elems)) => Some(elems.clone()),
                    _ => None,
                };
                for (i, element) in t.elements.iter().enumerate() {
                    let ty = elems.as_ref().and_then(|e| e.get(i)).cloned();
                    self.bind_pattern(element, ty.as_ref());
                }
            }
            Pattern::Array(a) => {
                let elem_ty = match subject_ty {
                    Some(Ty::Array(e)) => Some((**e).clone()),
                    _ => None,
                };
                for element in &a.elements {
                    self.bind_pattern(element, elem_ty.as_ref());
                }
                if let Some(rest) = &a.rest {
                    let mut sym = Symbol::new(rest, SymbolKind::Variable).at(a.loc);
                    sym.ty = subject_ty.map(|t| t.to_string());
                    let _ = self.scopes.define(self.scope, sym);
                }
            }
            Pattern::Variant(v) => {
                let field_tys = self.variant_field_tys(&v.name, subject_ty);
                for (i, arg) in v.args.iter().enumerate() {
                    let ty = field_tys.as_ref().and_then(|f| f.get(i)).and_then(|(_, t)| t.clone());
                    self.bind_pattern(arg, ty.as_ref());
                }
                for field in &v.fields {
                    let ty = field_tys.as_ref().and_then(|tys| {
                        tys.iter()
                            .find(|(n, _)| n.as_deref() == Some(field.name.as_str()))
                            .and_then(|(_, t)| t.clone())
                    });
                    self.bind_pattern(&field.pattern, ty.as_ref());
                }
            }
            Pattern::Or(or) => {
                // Alternatives must bind the same names; the first
                // alternative supplies the definitions.
                if let Some(first) = or.alternatives.first() {
                    self.bind_pattern(first, subject_ty);
                }
            }
            Pattern::Wildcard(_) | Pattern::Literal(_) | Pattern::Range(_) | Pattern::Unknown => {}
        }
    }

    /// Field name/type pairs of a variant, with the owner's type
    /// parameters substituted from the subject type when instantiated.
    fn variant_field_tys(
        &self,
        variant: &str,
        subject_ty: Option<&Ty>,
    ) -> Option<Vec<(Option<String>, Option<Ty>)>> {
        let (def, info) = self.registry.variant_owner(variant)?;
        let bindings: FxHashMap<String, Ty> = match subject_ty {
            Some(Ty::Generic(name, args)) if name == &def.name => def
                .type_params
                .iter()
                .cloned()
                .zip(args.iter().cloned())
                .collect(),
            _ => FxHashMap::default(),
        };
        Some(
            info.fields
                .iter()
                .map(|f| {
                    let ty = Ty::parse(&f.ty)
                        .map(|t| substitute(&t, &def.type_params, &bindings));
                    (f.name.clone(), ty)
                })
                .collect(),
        )
    }

    // ── JSX ─────────────────────────────────────────────────────────────

    fn walk_jsx_element(&mut self, el: &JsxElement) {
        // Capitalized tags are component references; lowercase tags are
        // plain HTML elements.
        if el.tag.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
            self.use_ident(&Identifier { name: el.tag.clone(), loc: el.loc });
        }
        for attr in &el.attrs {
            if let Some(value) = &attr.value {
                self.walk_expr(value);
            }
        }
        self.walk_jsx_children(&el.children);
    }

    fn walk_jsx_fragment(&mut self, frag: &JsxFragment) {
        self.walk_jsx_children(&frag.children);
    }

    fn walk_jsx_children(&mut self, children: &[JsxChild]) {
        for child in children {
            match child {
                JsxChild::Text(_) => {}
                JsxChild::Interp(e) => self.walk_expr(e),
                JsxChild::Element(el) => self.walk_jsx_element(el),
                JsxChild::Fragment(frag) => self.walk_jsx_fragment(frag),
            }
        }
    }
}

/// The narrowed type a variant pattern proves for the match subject, in
/// the same variant-as-type encoding the `isOk`/`isSome` tests produce.
fn variant_narrowing(pattern: &Pattern, subject_ty: Option<&Ty>) -> Option<String> {
    let Pattern::Variant(v) = pattern else { return None };
    match subject_ty {
        Some(Ty::Generic(base, args)) if base == "Result" || base == "Option" => {
            let payload = match v.name.as_str() {
                "Ok" | "Some" => args.first().cloned().unwrap_or(Ty::Unknown),
                "Err" => args.get(1).cloned().unwrap_or(Ty::Unknown),
                "None" => return Some("None".to_string()),
                _ => return None,
            };
            Some(Ty::Generic(v.name.clone(), vec![payload]).to_string())
        }
        _ => {
            if v.args.is_empty() && v.fields.is_empty() {
                Some(v.name.clone())
            } else {
                None
            }
        }
    }
}

/// A one-line conversion suggestion for an argument type mismatch.
fn conversion_hint(expected: &Ty, actual: &Ty) -> Option<String> {
    let int = Ty::int();
    let float = Ty::float();
    let string = Ty::string();
    if *expected == int && (*actual == string || *actual == float) {
        return Some("try `to_int(value)` to convert".to_string());
    }
    if *expected == float && *actual == string {
        return Some("try `to_float(value)` to convert".to_string());
    }
    if *expected == string && (*actual == int || *actual == float) {
        return Some("try `to_string(value)` to convert".to_string());
    }
    None
}
