//! Expression type inference.
//!
//! Pure: inference reads the scope tree, narrowing overlays, and the type
//! registry, and never writes any of them. `None` means "no information" —
//! gradual typing downstream treats it like `_`.
//!
//! Identifier resolution order is: inference-local bindings (lambda
//! parameters, comprehension variables), then the narrowing overlay, then
//! the symbol's stored type.

use rustc_hash::FxHashMap;
use tova_ast::{
    Arg, BinaryOp, CallExpr, Expr, LambdaBody, LambdaExpr, MemberExpr, PipeExpr, TypeExpr,
    UnaryOp,
};

use crate::registry::TypeRegistry;
use crate::scope::{FnInfo, ScopeId, ScopeTree};
use crate::ty::{infer_bindings, substitute, Ty};

/// The read-only context inference runs in.
#[derive(Clone)]
pub struct InferCx<'a> {
    pub scopes: &'a ScopeTree,
    pub scope: ScopeId,
    pub registry: &'a TypeRegistry,
    /// Inference-local bindings, innermost last.
    locals: Vec<(String, Ty)>,
}

impl<'a> InferCx<'a> {
    pub fn new(scopes: &'a ScopeTree, scope: ScopeId, registry: &'a TypeRegistry) -> Self {
        InferCx { scopes, scope, registry, locals: Vec::new() }
    }

    /// A child context with one extra local binding.
    fn with_local(&self, name: &str, ty: Ty) -> Self {
        let mut child = self.clone();
        child.locals.push((name.to_string(), ty));
        child
    }

    /// The type of a name as visible from this context.
    pub fn type_of_name(&self, name: &str) -> Option<Ty> {
        if let Some((_, ty)) = self.locals.iter().rev().find(|(n, _)| n == name) {
            return Some(ty.clone());
        }
        if let Some(narrowed) = self.scopes.narrowed_type(self.scope, name) {
            return Ty::parse(narrowed);
        }
        let sym_id = self.scopes.lookup(self.scope, name)?;
        let sym = self.scopes.symbol(sym_id);
        if let Some(info) = &sym.fn_info {
            let params = info
                .param_types
                .iter()
                .map(|p| p.as_deref().and_then(Ty::parse).unwrap_or(Ty::Unknown))
                .collect();
            let ret = info
                .return_type
                .as_deref()
                .and_then(Ty::parse)
                .unwrap_or(Ty::Unknown);
            return Some(Ty::fun(params, ret));
        }
        sym.ty.as_deref().and_then(Ty::parse)
    }

    /// Convert a type annotation into the algebra. Names listed in
    /// `type_params` stay as parameters for later binding inference.
    pub fn from_annotation(te: &TypeExpr) -> Ty {
        match te {
            TypeExpr::Named(n) => {
                if n.args.is_empty() {
                    Ty::Name(n.name.clone())
                } else {
                    Ty::Generic(n.name.clone(), n.args.iter().map(Self::from_annotation).collect())
                }
            }
            TypeExpr::Array(a) => Ty::array(Self::from_annotation(&a.element)),
            TypeExpr::Tuple(t) => {
                Ty::Tuple(t.elements.iter().map(Self::from_annotation).collect())
            }
            TypeExpr::Function(f) => Ty::fun(
                f.params.iter().map(Self::from_annotation).collect(),
                Self::from_annotation(&f.ret),
            ),
            TypeExpr::Union(u) => {
                Ty::union_of(u.members.iter().map(Self::from_annotation).collect())
            }
            TypeExpr::Record(r) => Ty::Record(
                r.fields
                    .iter()
                    .map(|f| (f.name.clone(), Self::from_annotation(&f.ty)))
                    .collect(),
            ),
            TypeExpr::Nil(_) => Ty::Nil,
            TypeExpr::Any(_) => Ty::Any,
            TypeExpr::Infer(_) => Ty::Unknown,
            TypeExpr::Unknown => Ty::Unknown,
        }
    }

    // ── Entry point ─────────────────────────────────────────────────────

    /// Infer the type of an expression, or `None` when nothing is known.
    pub fn infer(&self, expr: &Expr) -> Option<Ty> {
        match expr {
            Expr::NumberLit(n) => {
                if n.value.is_finite() && n.value.fract() == 0.0 {
                    Some(Ty::int())
                } else {
                    Some(Ty::float())
                }
            }
            Expr::StringLit(_) | Expr::TemplateLit(_) => Some(Ty::string()),
            Expr::BoolLit(_) => Some(Ty::bool()),
            Expr::NilLit(_) => Some(Ty::Nil),
            Expr::Identifier(id) => self.type_of_name(&id.name),

            Expr::ArrayLit(arr) => {
                if arr.elements.is_empty() {
                    Some(Ty::array(Ty::Any))
                } else {
                    let elem = self.infer(&arr.elements[0]).unwrap_or(Ty::Unknown);
                    Some(Ty::array(elem))
                }
            }
            Expr::TupleExpr(t) => Some(Ty::Tuple(
                t.elements
                    .iter()
                    .map(|e| self.infer(e).unwrap_or(Ty::Unknown))
                    .collect(),
            )),
            Expr::ObjectLit(obj) => Some(Ty::Record(
                obj.entries
                    .iter()
                    .map(|e| (e.key.clone(), self.infer(&e.value).unwrap_or(Ty::Unknown)))
                    .collect(),
            )),

            Expr::BinaryExpr(bin) => self.infer_binary(bin.op, &bin.left, &bin.right),
            Expr::UnaryExpr(un) => match un.op {
                UnaryOp::Not => Some(Ty::bool()),
                UnaryOp::Neg => self.infer(&un.operand),
            },
            Expr::LogicalExpr(_) => Some(Ty::bool()),
            Expr::ChainedCompare(_) => Some(Ty::bool()),
            Expr::Membership(_) => Some(Ty::bool()),

            Expr::CallExpr(call) => self.infer_call(call),
            Expr::MemberExpr(member) => self.infer_member(member),
            Expr::PipeExpr(pipe) => self.infer_pipe(pipe),
            Expr::LambdaExpr(lambda) => Some(self.lambda_type(lambda)),

            Expr::MatchExpr(m) => {
                let mut result: Option<Ty> = None;
                for arm in &m.arms {
                    let arm_ty = match &arm.body {
                        LambdaBody::Expr(e) => self.infer(e),
                        LambdaBody::Block(_) => None,
                    }?;
                    match &result {
                        None => result = Some(arm_ty),
                        Some(prev) if *prev == arm_ty => {}
                        Some(_) => return None,
                    }
                }
                result
            }

            Expr::ListComp(comp) => {
                let elem_in = match self.infer(&comp.iter) {
                    Some(Ty::Array(e)) => *e,
                    _ => Ty::Unknown,
                };
                let child = self.with_local(&comp.binding, elem_in);
                let elem = child.infer(&comp.element).unwrap_or(Ty::Unknown);
                Some(Ty::array(elem))
            }
            Expr::DictComp(_) => None,

            Expr::RangeExpr(_) => Some(Ty::array(Ty::int())),
            Expr::SliceExpr(slice) => match self.infer(&slice.object)? {
                arr @ Ty::Array(_) => Some(arr),
                s if s == Ty::string() => Some(Ty::string()),
                _ => None,
            },
            Expr::SpreadExpr(spread) => self.infer(&spread.value),
            Expr::PropagateExpr(prop) => match self.infer(&prop.value)? {
                Ty::Generic(name, args) if name == "Result" && !args.is_empty() => {
                    Some(args[0].clone())
                }
                Ty::Generic(name, args) if name == "Option" && args.len() == 1 => {
                    Some(args[0].clone())
                }
                _ => None,
            },
            Expr::AwaitExpr(a) => self.infer(&a.value),
            Expr::YieldExpr(_) => None,

            Expr::IfExpr(ife) => {
                let then_ty = self.infer(&ife.then)?;
                let else_ty = self.infer(&ife.otherwise)?;
                if then_ty == else_ty {
                    Some(then_ty)
                } else {
                    Some(Ty::union_of(vec![then_ty, else_ty]))
                }
            }

            Expr::JsxElement(_) | Expr::JsxFragment(_) => Some(Ty::Name("Element".into())),
            Expr::ColumnExpr(col) => col.value.as_deref().and_then(|v| self.infer(v)),
            Expr::Unknown => None,
        }
    }

    // ── Operators ───────────────────────────────────────────────────────

    fn infer_binary(&self, op: BinaryOp, left: &Expr, right: &Expr) -> Option<Ty> {
        if op.is_comparison() {
            return Some(Ty::bool());
        }
        if op == BinaryOp::Concat {
            return Some(Ty::string());
        }
        // Arithmetic: Float taints, String survives the repeat case, Int
        // is the default.
        let l = self.infer(left)?;
        let r = self.infer(right)?;
        let float = Ty::float();
        let string = Ty::string();
        if l == float || r == float {
            Some(float)
        } else if l == string || r == string {
            Some(string)
        } else {
            Some(Ty::int())
        }
    }

    // ── Calls ───────────────────────────────────────────────────────────

    fn positional_tys(&self, args: &[Arg]) -> Vec<Ty> {
        args.iter()
            .filter(|a| a.name.is_none() && !a.spread)
            .map(|a| self.infer(&a.value).unwrap_or(Ty::Unknown))
            .collect()
    }

    fn infer_call(&self, call: &CallExpr) -> Option<Ty> {
        match call.callee.as_ref() {
            Expr::Identifier(id) => {
                let arg_tys = self.positional_tys(&call.args);

                // Built-in variant constructors wrap their argument.
                match id.name.as_str() {
                    "Ok" => {
                        let t = arg_tys.first().cloned().unwrap_or(Ty::Unknown);
                        return Some(Ty::result(t, Ty::Unknown));
                    }
                    "Err" => {
                        let e = arg_tys.first().cloned().unwrap_or(Ty::Unknown);
                        return Some(Ty::result(Ty::Unknown, e));
                    }
                    "Some" => {
                        let t = arg_tys.first().cloned().unwrap_or(Ty::Unknown);
                        return Some(Ty::option(t));
                    }
                    // Hard-coded builtin results.
                    "len" | "count" => return Some(Ty::int()),
                    "type_of" => return Some(Ty::string()),
                    "random" => return Some(Ty::float()),
                    _ => {}
                }

                let sym_id = self.scopes.lookup(self.scope, &id.name)?;
                let info = self.scopes.symbol(sym_id).fn_info.clone()?;
                self.infer_fn_result(&info, &arg_tys)
            }
            Expr::MemberExpr(member) => self.infer_method_call(member, call),
            // Calling a lambda or function-typed value directly.
            other => match self.infer(other)? {
                Ty::Fun(_, ret) => Some(*ret),
                _ => None,
            },
        }
    }

    /// The result type of calling a registered function with these
    /// argument types: infer generic bindings, then substitute into the
    /// declared return type.
    pub fn infer_fn_result(&self, info: &FnInfo, arg_tys: &[Ty]) -> Option<Ty> {
        if let Some(owner) = &info.variant_of {
            return Some(self.variant_result(owner, info, arg_tys));
        }
        let declared = Ty::parse(info.return_type.as_deref()?)?;
        if info.type_params.is_empty() {
            return Some(declared);
        }
        let mut bindings = FxHashMap::default();
        for (i, actual) in arg_tys.iter().enumerate() {
            if let Some(Some(annot)) = info.param_types.get(i) {
                if let Some(annot_ty) = Ty::parse(annot) {
                    infer_bindings(&annot_ty, actual, &info.type_params, &mut bindings);
                }
            }
        }
        Some(substitute(&declared, &info.type_params, &bindings))
    }

    /// The instantiated ADT type produced by a user variant constructor.
    fn variant_result(&self, owner: &str, info: &FnInfo, arg_tys: &[Ty]) -> Ty {
        let Some(def) = self.registry.lookup_type(owner) else {
            return Ty::Name(owner.to_string());
        };
        if def.type_params.is_empty() {
            return Ty::Name(owner.to_string());
        }
        let mut bindings = FxHashMap::default();
        for (i, actual) in arg_tys.iter().enumerate() {
            if let Some(Some(annot)) = info.param_types.get(i) {
                if let Some(annot_ty) = Ty::parse(annot) {
                    infer_bindings(&annot_ty, actual, &def.type_params, &mut bindings);
                }
            }
        }
        let args = def
            .type_params
            .iter()
            .map(|p| bindings.get(p).cloned().unwrap_or(Ty::Unknown))
            .collect();
        Ty::Generic(owner.to_string(), args)
    }

    /// Method calls: Option/Result combinators plus impl-registered
    /// methods on named types.
    fn infer_method_call(&self, member: &MemberExpr, call: &CallExpr) -> Option<Ty> {
        let obj_ty = self.infer(&member.object)?;

        if let Ty::Generic(base, args) = &obj_ty {
            match (base.as_str(), member.property.as_str()) {
                ("Result", "map") | ("Option", "map") => {
                    let payload = args.first().cloned().unwrap_or(Ty::Unknown);
                    let mapped = self.mapped_payload(&call.args, payload);
                    return Some(match base.as_str() {
                        "Result" => Ty::result(
                            mapped,
                            args.get(1).cloned().unwrap_or(Ty::Unknown),
                        ),
                        _ => Ty::option(mapped),
                    });
                }
                ("Result", "isOk") | ("Result", "isErr") | ("Option", "isSome")
                | ("Option", "isNone") => return Some(Ty::bool()),
                ("Result", "unwrap") | ("Option", "unwrap") => {
                    return args.first().cloned();
                }
                ("Result", "unwrap_or") | ("Option", "unwrap_or") => {
                    return args.first().cloned();
                }
                _ => {}
            }
        }

        let base = obj_ty.base_name()?;
        let sig = self.registry.lookup_method(base, &member.property)?;
        sig.return_type.as_deref().and_then(Ty::parse)
    }

    /// The payload type produced by a `.map(f)` argument given the current
    /// payload type.
    fn mapped_payload(&self, args: &[Arg], payload: Ty) -> Ty {
        let Some(first) = args.iter().find(|a| a.name.is_none() && !a.spread) else {
            return Ty::Unknown;
        };
        match &first.value {
            Expr::LambdaExpr(lambda) => self
                .lambda_result(lambda, &[payload])
                .unwrap_or(Ty::Unknown),
            other => match self.infer(other) {
                Some(Ty::Fun(_, ret)) => *ret,
                _ => Ty::Unknown,
            },
        }
    }

    // ── Member access ───────────────────────────────────────────────────

    fn infer_member(&self, member: &MemberExpr) -> Option<Ty> {
        let obj_ty = self.infer(&member.object)?;
        let field_ty = match &obj_ty {
            Ty::Record(fields) => fields
                .iter()
                .find(|(name, _)| name == &member.property)
                .map(|(_, ty)| ty.clone())?,
            Ty::Name(name) | Ty::Generic(name, _) => {
                let def = self.registry.lookup_type(name)?;
                let field = def
                    .fields()?
                    .iter()
                    .find(|f| f.name.as_deref() == Some(member.property.as_str()))?;
                let parsed = Ty::parse(&field.ty)?;
                if let (Ty::Generic(_, args), false) = (&obj_ty, def.type_params.is_empty()) {
                    let bindings: FxHashMap<String, Ty> = def
                        .type_params
                        .iter()
                        .cloned()
                        .zip(args.iter().cloned())
                        .collect();
                    substitute(&parsed, &def.type_params, &bindings)
                } else {
                    parsed
                }
            }
            _ => return None,
        };
        if member.optional {
            Some(Ty::union_of(vec![field_ty, Ty::Nil]))
        } else {
            Some(field_ty)
        }
    }

    // ── Pipes ───────────────────────────────────────────────────────────

    fn infer_pipe(&self, pipe: &PipeExpr) -> Option<Ty> {
        let input = self.infer(&pipe.left);
        let (name, args): (&str, &[Arg]) = match pipe.right.as_ref() {
            Expr::CallExpr(call) => match call.callee.as_ref() {
                Expr::Identifier(id) => (id.name.as_str(), &call.args),
                _ => return None,
            },
            Expr::Identifier(id) => (id.name.as_str(), &[]),
            _ => return None,
        };

        match name {
            "filter" | "sorted" | "reversed" | "unique" | "take" | "drop" => input,
            "map" => {
                let elem = match input {
                    Some(Ty::Array(e)) => *e,
                    _ => Ty::Unknown,
                };
                let mapped = self.mapped_payload(args, elem);
                Some(Ty::array(mapped))
            }
            "flatten" => match input {
                Some(Ty::Array(inner)) => match *inner {
                    Ty::Array(elem) => Some(Ty::array(*elem)),
                    other => Some(Ty::array(other)),
                },
                other => other,
            },
            "join" => Some(Ty::string()),
            "count" | "len" => Some(Ty::int()),
            "sum" => match input {
                Some(Ty::Array(elem)) if *elem == Ty::float() => Some(Ty::float()),
                _ => Some(Ty::int()),
            },
            "any" | "all" | "every" | "some" => Some(Ty::bool()),
            "first" | "last" | "find" => match input {
                Some(Ty::Array(elem)) => Some(*elem),
                _ => None,
            },
            // A user function in pipe position receives the input as its
            // first argument.
            _ => {
                let sym_id = self.scopes.lookup(self.scope, name)?;
                let info = self.scopes.symbol(sym_id).fn_info.clone()?;
                let mut arg_tys = vec![input.unwrap_or(Ty::Unknown)];
                arg_tys.extend(self.positional_tys(args));
                self.infer_fn_result(&info, &arg_tys)
            }
        }
    }

    // ── Lambdas ─────────────────────────────────────────────────────────

    /// The function type of a lambda, with unannotated parameters typed
    /// `_`.
    fn lambda_type(&self, lambda: &LambdaExpr) -> Ty {
        let params: Vec<Ty> = lambda
            .params
            .iter()
            .map(|p| p.ty.as_ref().map(Self::from_annotation).unwrap_or(Ty::Unknown))
            .collect();
        let ret = self
            .lambda_result(lambda, &params.clone())
            .unwrap_or(Ty::Unknown);
        Ty::fun(params, ret)
    }

    /// The result type of a lambda body given parameter types.
    pub fn lambda_result(&self, lambda: &LambdaExpr, param_tys: &[Ty]) -> Option<Ty> {
        let mut cx = self.clone();
        for (i, param) in lambda.params.iter().enumerate() {
            let ty = param
                .ty
                .as_ref()
                .map(Self::from_annotation)
                .or_else(|| param_tys.get(i).cloned())
                .unwrap_or(Ty::Unknown);
            cx.locals.push((param.name.clone(), ty));
        }
        match &lambda.body {
            LambdaBody::Expr(e) => cx.infer(e),
            LambdaBody::Block(stmts) => {
                // The implicit return is the trailing expression; an
                // explicit return anywhere also settles it.
                for stmt in stmts {
                    if let tova_ast::Stmt::Return(ret) = stmt {
                        return ret.value.as_deref().map(|v| cx.infer(v)).unwrap_or(Some(Ty::Nil));
                    }
                }
                match stmts.last() {
                    Some(tova_ast::Stmt::ExprStmt(es)) => cx.infer(&es.expr),
                    _ => None,
                }
            }
        }
    }
}
