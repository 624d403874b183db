//! Declaration visitors: functions, types, traits, impls, imports, extern,
//! and the server/client nested declaration forms.

use tova_ast::{
    CronDecl, ComputedDecl, ComponentDecl, DbDecl, DefaultImport, EffectDecl, ExternDecl,
    FunctionDecl, Import, ImplBlock, MethodProto, MiddlewareDecl, Param, RateLimitDecl,
    RouteDecl, StateDecl, StoreDecl, Stmt, TypeAlias, TypeDecl, TypeExpr, WildcardImport,
    WsDecl,
};
use tova_common::{Code, Loc};

use crate::flow;
use crate::infer::InferCx;
use crate::registry::{FieldInfo, MethodSig, TypeDef, TypeDefKind, VariantInfo};
use crate::scope::{FnInfo, IfaceMethod, ScopeKind, Symbol, SymbolKind};
use crate::ty::Ty;

use super::Analyzer;

/// Trait names a `derive` list may mention.
const KNOWN_DERIVES: &[&str] = &["Eq", "Ord", "Show", "Hash", "Json", "Debug"];

impl Analyzer {
    // ── Functions ───────────────────────────────────────────────────────

    pub(crate) fn visit_function(&mut self, f: &FunctionDecl) {
        self.check_value_name(&f.name, f.loc);

        let info = fn_info_of(&f.params, f.return_type.as_ref(), &f.type_params, f.is_async);
        let fn_ty = fn_type_string(&info);
        let mut sym = Symbol::new(&f.name, SymbolKind::Function).at(f.loc).typed(fn_ty);
        sym.public = f.is_public;
        sym.fn_info = Some(info);
        if self.scopes.define(self.scope, sym).is_err() {
            let name = &f.name;
            self.error(
                Code::E203,
                format!("`{name}` is already defined in this scope"),
                f.loc,
            );
        }

        self.visit_fn_body(FnBody {
            params: &f.params,
            return_type: f.return_type.as_ref(),
            body: &f.body,
            is_async: f.is_async,
            check_return_paths: true,
            self_ty: None,
            loc: f.loc,
        });
    }

    /// Shared body analysis for everything function-shaped: declared
    /// functions, impl methods, routes, handlers, components, effects.
    pub(crate) fn visit_fn_body(&mut self, body: FnBody<'_>) {
        self.enter(ScopeKind::Function);

        if let Some(self_ty) = &body.self_ty {
            let sym = Symbol::new("self", SymbolKind::Parameter).typed(self_ty.clone());
            if let Ok(id) = self.scopes.define(self.scope, sym) {
                self.scopes.mark_used(id);
            }
        }
        for param in body.params {
            self.check_value_name(&param.name, param.loc.or(body.loc));
            let mut sym = Symbol::new(&param.name, SymbolKind::Parameter).at(param.loc);
            sym.ty = param.ty.as_ref().map(|t| InferCx::from_annotation(t).to_string());
            sym.declared_ty = param.ty.clone();
            if self.scopes.define(self.scope, sym).is_err() {
                let name = &param.name;
                self.error(
                    Code::E203,
                    format!("duplicate parameter `{name}`"),
                    param.loc.or(body.loc),
                );
            }
        }
        for param in body.params {
            if let Some(default) = &param.default {
                self.walk_expr(default);
            }
        }

        let saved_depth = self.async_depth;
        self.async_depth = if body.is_async { self.async_depth + 1 } else { 0 };
        let ret = body
            .return_type
            .map(|t| InferCx::from_annotation(t).to_string());
        self.return_types.push(ret.clone());

        self.visit_all(body.body);

        if body.check_return_paths && ret.is_some() && !flow::always_returns(body.body) {
            self.warn(Code::W205, "not all code paths return a value", body.loc);
        }

        self.return_types.pop();
        self.async_depth = saved_depth;
        self.exit();
    }

    // ── Types ───────────────────────────────────────────────────────────

    pub(crate) fn visit_type_decl(&mut self, t: &TypeDecl) {
        self.check_type_name(&t.name, t.loc);

        let kind = if !t.variants.is_empty() {
            TypeDefKind::Adt {
                variants: t
                    .variants
                    .iter()
                    .map(|v| VariantInfo {
                        name: v.name.clone(),
                        fields: v
                            .fields
                            .iter()
                            .map(|f| FieldInfo {
                                name: f.name.clone(),
                                ty: InferCx::from_annotation(&f.ty).to_string(),
                            })
                            .collect(),
                    })
                    .collect(),
            }
        } else {
            TypeDefKind::Record {
                fields: t
                    .fields
                    .iter()
                    .map(|f| FieldInfo {
                        name: f.name.clone(),
                        ty: InferCx::from_annotation(&f.ty).to_string(),
                    })
                    .collect(),
            }
        };
        self.registry.register_type(TypeDef {
            name: t.name.clone(),
            type_params: t.type_params.clone(),
            kind,
        });

        for derive in &t.derives {
            if !KNOWN_DERIVES.contains(&derive.as_str()) {
                let name = &t.name;
                self.warn(
                    Code::W303,
                    format!("cannot derive `{derive}` for `{name}`"),
                    t.loc,
                )
                .set_hint(format!("derivable traits are {}", KNOWN_DERIVES.join(", ")));
            }
        }

        let sym = Symbol::new(&t.name, SymbolKind::Type).at(t.loc).typed(&t.name);
        if self.scopes.define(self.scope, sym).is_err() {
            let name = &t.name;
            self.error(
                Code::E203,
                format!("`{name}` is already defined in this scope"),
                t.loc,
            );
        }

        // Variant constructors become callable symbols. A name collision
        // with another ADT's variant keeps the first definition; match
        // disambiguation handles shared variant names.
        let ctor_return = if t.type_params.is_empty() {
            t.name.clone()
        } else {
            Ty::Generic(
                t.name.clone(),
                t.type_params.iter().map(|p| Ty::Name(p.clone())).collect(),
            )
            .to_string()
        };
        for variant in &t.variants {
            self.check_type_name(&variant.name, variant.loc.or(t.loc));
            let total = variant.fields.len();
            let info = FnInfo {
                params: variant
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(i, f)| f.name.clone().unwrap_or_else(|| format!("field{i}")))
                    .collect(),
                required: total,
                total,
                param_types: variant
                    .fields
                    .iter()
                    .map(|f| Some(InferCx::from_annotation(&f.ty).to_string()))
                    .collect(),
                type_params: t.type_params.clone(),
                return_type: Some(ctor_return.clone()),
                variant_of: Some(t.name.clone()),
                ..FnInfo::default()
            };
            let sym = Symbol::new(&variant.name, SymbolKind::Function)
                .at(variant.loc.or(t.loc))
                .with_fn_info(info);
            let _ = self.scopes.define(self.scope, sym);
        }
    }

    pub(crate) fn visit_type_alias(&mut self, t: &TypeAlias) {
        self.check_type_name(&t.name, t.loc);
        let target = InferCx::from_annotation(&t.target).to_string();
        self.registry.register_type(TypeDef {
            name: t.name.clone(),
            type_params: t.type_params.clone(),
            kind: TypeDefKind::Alias { target },
        });
        if self.registry.alias_has_cycle(&t.name) {
            let name = &t.name;
            self.error(Code::E203, format!("circular type alias `{name}`"), t.loc);
        }
        let sym = Symbol::new(&t.name, SymbolKind::Type).at(t.loc).typed(&t.name);
        if self.scopes.define(self.scope, sym).is_err() {
            let name = &t.name;
            self.error(
                Code::E203,
                format!("`{name}` is already defined in this scope"),
                t.loc,
            );
        }
    }

    // ── Interfaces, traits, impls ───────────────────────────────────────

    pub(crate) fn visit_interface(&mut self, name: &str, methods: &[MethodProto], loc: Option<Loc>) {
        self.check_type_name(name, loc);
        let sigs: Vec<MethodSig> = methods
            .iter()
            .map(|m| MethodSig {
                name: m.name.clone(),
                param_count: m.params.len(),
                param_types: m
                    .params
                    .iter()
                    .map(|p| p.ty.as_ref().map(|t| InferCx::from_annotation(t).to_string()))
                    .collect(),
                return_type: m
                    .return_type
                    .as_ref()
                    .map(|t| InferCx::from_annotation(t).to_string()),
            })
            .collect();
        self.registry.register_trait(name, sigs.clone());

        let mut sym = Symbol::new(name, SymbolKind::Type).at(loc).typed(name);
        sym.methods = Some(
            sigs.into_iter()
                .map(|s| IfaceMethod {
                    name: s.name,
                    param_count: s.param_count,
                    param_types: s.param_types,
                    return_type: s.return_type,
                })
                .collect(),
        );
        if self.scopes.define(self.scope, sym).is_err() {
            self.error(
                Code::E203,
                format!("`{name}` is already defined in this scope"),
                loc,
            );
        }
    }

    pub(crate) fn visit_impl(&mut self, imp: &ImplBlock) {
        let type_known = self.scopes.lookup(self.scope, &imp.type_name).is_some()
            || self.registry.lookup_type(&imp.type_name).is_some();
        if let Some(sym) = self.scopes.lookup(self.scope, &imp.type_name) {
            self.scopes.mark_used(sym);
        }
        if !type_known {
            let name = &imp.type_name;
            self.error(Code::E200, format!("undefined identifier `{name}`"), imp.loc);
        }

        // Register the method set before conformance so self-referential
        // method bodies resolve.
        for method in &imp.methods {
            let has_self = method.params.first().map_or(false, |p| p.name == "self");
            let params = if has_self { &method.params[1..] } else { &method.params[..] };
            let sig = MethodSig {
                name: method.name.clone(),
                param_count: params.len(),
                param_types: params
                    .iter()
                    .map(|p| p.ty.as_ref().map(|t| InferCx::from_annotation(t).to_string()))
                    .collect(),
                return_type: method
                    .return_type
                    .as_ref()
                    .map(|t| InferCx::from_annotation(t).to_string()),
            };
            self.registry.register_impl_method(&imp.type_name, sig);
        }

        if let Some(trait_name) = &imp.trait_name {
            self.check_trait_conformance(trait_name, imp);
        }

        for method in &imp.methods {
            self.check_value_name(&method.name, method.loc);
            let has_self = method.params.first().map_or(false, |p| p.name == "self");
            let params = if has_self { &method.params[1..] } else { &method.params[..] };
            self.visit_fn_body(FnBody {
                params,
                return_type: method.return_type.as_ref(),
                body: &method.body,
                is_async: method.is_async,
                check_return_paths: true,
                self_ty: Some(imp.type_name.clone()),
                loc: method.loc.or(imp.loc),
            });
        }
    }

    fn check_trait_conformance(&mut self, trait_name: &str, imp: &ImplBlock) {
        let Some(required) = self.registry.lookup_trait(trait_name).map(|m| m.to_vec()) else {
            self.error(
                Code::E200,
                format!("undefined identifier `{trait_name}`"),
                imp.loc,
            );
            return;
        };
        let type_name = &imp.type_name;
        for req in &required {
            let method = &req.name;
            let Some(provided) = self
                .registry
                .lookup_method(type_name, method)
                .cloned()
            else {
                self.warn(
                    Code::W300,
                    format!("impl of `{trait_name}` for `{type_name}` is missing method `{method}`"),
                    imp.loc,
                );
                continue;
            };
            if provided.param_count != req.param_count {
                let expected = req.param_count;
                let found = provided.param_count;
                self.warn(
                    Code::W301,
                    format!(
                        "method `{method}` of `{trait_name}` takes {expected} parameter(s), this impl takes {found}"
                    ),
                    imp.loc,
                );
            }
            if let (Some(expected), Some(found)) = (&req.return_type, &provided.return_type) {
                if expected != found {
                    self.warn(
                        Code::W302,
                        format!(
                            "method `{method}` of `{trait_name}` returns `{expected}`, this impl returns `{found}`"
                        ),
                        imp.loc,
                    );
                }
            }
        }
    }

    // ── Imports & extern ────────────────────────────────────────────────

    pub(crate) fn visit_import(&mut self, i: &Import) {
        for name in &i.names {
            let sym = Symbol::new(name, SymbolKind::Variable).at(i.loc);
            if self.scopes.define(self.scope, sym).is_err() {
                self.error(
                    Code::E203,
                    format!("`{name}` is already defined in this scope"),
                    i.loc,
                );
            }
        }
    }

    pub(crate) fn visit_default_import(&mut self, i: &DefaultImport) {
        let name = &i.name;
        let sym = Symbol::new(name, SymbolKind::Module).at(i.loc);
        if self.scopes.define(self.scope, sym).is_err() {
            self.error(
                Code::E203,
                format!("`{name}` is already defined in this scope"),
                i.loc,
            );
        }
    }

    pub(crate) fn visit_wildcard_import(&mut self, i: &WildcardImport) {
        // Without an alias a wildcard import injects unknowable names;
        // nothing to define.
        if let Some(alias) = &i.alias {
            let sym = Symbol::new(alias, SymbolKind::Module).at(i.loc);
            if self.scopes.define(self.scope, sym).is_err() {
                self.error(
                    Code::E203,
                    format!("`{alias}` is already defined in this scope"),
                    i.loc,
                );
            }
        }
    }

    pub(crate) fn visit_extern(&mut self, e: &ExternDecl) {
        let mut info = fn_info_of(&e.params, e.return_type.as_ref(), &[], false);
        info.is_extern = true;
        let fn_ty = fn_type_string(&info);
        let sym = Symbol::new(&e.name, SymbolKind::Function)
            .at(e.loc)
            .typed(fn_ty)
            .with_fn_info(info);
        if self.scopes.define(self.scope, sym).is_err() {
            let name = &e.name;
            self.error(
                Code::E203,
                format!("`{name}` is already defined in this scope"),
                e.loc,
            );
        }
    }

    // ── Server-side declarations ────────────────────────────────────────

    fn require_server_context(&mut self, form: &str, loc: Option<Loc>) {
        if self.block_context() != ScopeKind::Server {
            self.error(
                Code::E303,
                format!("`{form}` declaration outside a `server` block"),
                loc,
            );
        }
    }

    fn require_client_context(&mut self, form: &str, loc: Option<Loc>) {
        if self.block_context() != ScopeKind::Client {
            self.error(
                Code::E302,
                format!("`{form}` declaration outside a `client` block"),
                loc,
            );
        }
    }

    pub(crate) fn visit_route(&mut self, r: &RouteDecl) {
        self.require_server_context("route", r.loc);
        if r.method.eq_ignore_ascii_case("GET") && r.body_type.is_some() {
            self.warn(Code::W106, "GET route declares a request body type", r.loc)
                .set_hint("GET requests carry no body; use query parameters or switch to POST");
        }
        // Route handlers run on the async runtime.
        self.visit_fn_body(FnBody {
            params: &r.params,
            return_type: r.return_type.as_ref(),
            body: &r.body,
            is_async: true,
            check_return_paths: false,
            self_ty: None,
            loc: r.loc,
        });
    }

    pub(crate) fn visit_ws(&mut self, w: &WsDecl) {
        self.require_server_context("ws", w.loc);
        for handler in &w.handlers {
            self.visit_fn_body(FnBody {
                params: &handler.params,
                return_type: handler.return_type.as_ref(),
                body: &handler.body,
                is_async: true,
                check_return_paths: false,
                self_ty: None,
                loc: handler.loc.or(w.loc),
            });
        }
    }

    pub(crate) fn visit_db(&mut self, d: &DbDecl) {
        self.require_server_context("db", d.loc);
        self.check_value_name(&d.name, d.loc);
        self.registry.register_type(TypeDef {
            name: d.name.clone(),
            type_params: Vec::new(),
            kind: TypeDefKind::Record {
                fields: d
                    .columns
                    .iter()
                    .map(|c| FieldInfo {
                        name: Some(c.name.clone()),
                        ty: InferCx::from_annotation(&c.ty).to_string(),
                    })
                    .collect(),
            },
        });
        let sym = Symbol::new(&d.name, SymbolKind::Type).at(d.loc).typed(&d.name);
        if self.scopes.define(self.scope, sym).is_err() {
            let name = &d.name;
            self.error(
                Code::E203,
                format!("`{name}` is already defined in this scope"),
                d.loc,
            );
        }
    }

    pub(crate) fn visit_rate_limit(&mut self, r: &RateLimitDecl) {
        self.require_server_context("rate_limit", r.loc);
    }

    pub(crate) fn visit_middleware(&mut self, m: &MiddlewareDecl) {
        self.require_server_context("middleware", m.loc);
        self.check_value_name(&m.name, m.loc);
        let info = fn_info_of(&m.params, None, &[], true);
        let sym = Symbol::new(&m.name, SymbolKind::Function)
            .at(m.loc)
            .with_fn_info(info);
        if self.scopes.define(self.scope, sym).is_err() {
            let name = &m.name;
            self.error(
                Code::E203,
                format!("`{name}` is already defined in this scope"),
                m.loc,
            );
        }
        self.visit_fn_body(FnBody {
            params: &m.params,
            return_type: None,
            body: &m.body,
            is_async: true,
            check_return_paths: false,
            self_ty: None,
            loc: m.loc,
        });
    }

    pub(crate) fn visit_cron(&mut self, c: &CronDecl) {
        self.require_server_context("cron", c.loc);
        self.visit_fn_body(FnBody {
            params: &[],
            return_type: None,
            body: &c.body,
            is_async: true,
            check_return_paths: false,
            self_ty: None,
            loc: c.loc,
        });
    }

    // ── Client-side declarations ────────────────────────────────────────

    pub(crate) fn visit_state(&mut self, s: &StateDecl) {
        self.require_client_context("state", s.loc);
        self.walk_expr(&s.value);
        self.check_value_name(&s.name, s.loc);

        let declared = s.ty.as_ref().map(InferCx::from_annotation);
        let value_ty = self.infer_ty(&s.value);
        self.check_assign_compat(declared.clone(), value_ty.clone(), s.loc);

        let mut sym = Symbol::new(&s.name, SymbolKind::State).at(s.loc).mutable();
        sym.ty = declared
            .map(|t| t.to_string())
            .or_else(|| value_ty.map(|t| t.to_string()));
        sym.declared_ty = s.ty.clone();
        if self.scopes.define(self.scope, sym).is_err() {
            let name = &s.name;
            self.error(
                Code::E203,
                format!("`{name}` is already defined in this scope"),
                s.loc,
            );
        }
    }

    pub(crate) fn visit_computed(&mut self, c: &ComputedDecl) {
        self.require_client_context("computed", c.loc);
        self.walk_expr(&c.value);
        self.check_value_name(&c.name, c.loc);
        let mut sym = Symbol::new(&c.name, SymbolKind::Computed).at(c.loc);
        sym.ty = self.infer_ty(&c.value).map(|t| t.to_string());
        if self.scopes.define(self.scope, sym).is_err() {
            let name = &c.name;
            self.error(
                Code::E203,
                format!("`{name}` is already defined in this scope"),
                c.loc,
            );
        }
    }

    pub(crate) fn visit_component(&mut self, c: &ComponentDecl) {
        self.require_client_context("component", c.loc);
        self.check_type_name(&c.name, c.loc);
        let sym = Symbol::new(&c.name, SymbolKind::Component).at(c.loc).typed("Element");
        if self.scopes.define(self.scope, sym).is_err() {
            let name = &c.name;
            self.error(
                Code::E203,
                format!("`{name}` is already defined in this scope"),
                c.loc,
            );
        }
        self.visit_fn_body(FnBody {
            params: &c.params,
            return_type: None,
            body: &c.body,
            is_async: false,
            check_return_paths: false,
            self_ty: None,
            loc: c.loc,
        });
    }

    pub(crate) fn visit_store(&mut self, s: &StoreDecl) {
        self.require_client_context("store", s.loc);
        self.check_type_name(&s.name, s.loc);
        let sym = Symbol::new(&s.name, SymbolKind::Module).at(s.loc);
        if let Ok(id) = self.scopes.define(self.scope, sym) {
            self.scopes.mark_used(id);
        } else {
            let name = &s.name;
            self.error(
                Code::E203,
                format!("`{name}` is already defined in this scope"),
                s.loc,
            );
        }
        self.enter(ScopeKind::Block);
        self.visit_all(&s.body);
        self.exit();
    }

    pub(crate) fn visit_effect(&mut self, e: &EffectDecl) {
        self.require_client_context("effect", e.loc);
        for dep in &e.deps {
            match self.scopes.lookup(self.scope, dep) {
                Some(sym) => self.scopes.mark_used(sym),
                None => {
                    self.error(Code::E200, format!("undefined identifier `{dep}`"), e.loc);
                }
            }
        }
        self.visit_fn_body(FnBody {
            params: &[],
            return_type: None,
            body: &e.body,
            is_async: false,
            check_return_paths: false,
            self_ty: None,
            loc: e.loc,
        });
    }
}

/// Everything [`Analyzer::visit_fn_body`] needs to analyze one
/// function-shaped body.
pub(crate) struct FnBody<'a> {
    pub params: &'a [Param],
    pub return_type: Option<&'a TypeExpr>,
    pub body: &'a [Stmt],
    pub is_async: bool,
    pub check_return_paths: bool,
    pub self_ty: Option<String>,
    pub loc: Option<Loc>,
}

/// Build function side data from a parameter list and annotations.
pub(crate) fn fn_info_of(
    params: &[Param],
    return_type: Option<&TypeExpr>,
    type_params: &[String],
    is_async: bool,
) -> FnInfo {
    FnInfo {
        params: params.iter().map(|p| p.name.clone()).collect(),
        required: params.iter().filter(|p| p.default.is_none()).count(),
        total: params.len(),
        param_types: params
            .iter()
            .map(|p| p.ty.as_ref().map(|t| InferCx::from_annotation(t).to_string()))
            .collect(),
        type_params: type_params.to_vec(),
        return_type: return_type.map(|t| InferCx::from_annotation(t).to_string()),
        is_async,
        ..FnInfo::default()
    }
}

/// The canonical function-type string stored on function symbols.
pub(crate) fn fn_type_string(info: &FnInfo) -> String {
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
    Ty::fun(params, ret).to_string()
}
