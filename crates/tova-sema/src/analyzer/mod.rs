//! The analyzer: traversal state, dispatcher, pre-pass and post-pass.
//!
//! One visitor per node kind, spread over three submodules: [`stmts`] for
//! control flow and bindings, [`items`] for declarations, [`exprs`] for
//! expression walking and call-site validation. The block-form family
//! dispatches through the plugin registry in [`crate::blocks`].
//!
//! Three traversal state machines live here: the async-depth counter, the
//! return-type stack, and the current named-server-block tracker used for
//! cross-block RPC validation.

mod exprs;
mod items;
mod stmts;

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use tova_ast::{Program, Stmt};
use tova_common::{Code, Diagnostic, Loc, Severity};

use crate::blocks::BlockRegistry;
use crate::builtins;
use crate::infer::InferCx;
use crate::registry::TypeRegistry;
use crate::scope::{ScopeId, ScopeKind, ScopeTree};
use crate::ty::Ty;
use crate::unused;
use crate::{Analysis, AnalyzerOptions};

pub struct Analyzer {
    pub(crate) opts: AnalyzerOptions,
    pub(crate) file: String,
    pub(crate) errors: Vec<Diagnostic>,
    pub(crate) warnings: Vec<Diagnostic>,
    pub(crate) scopes: ScopeTree,
    pub(crate) scope: ScopeId,
    pub(crate) registry: TypeRegistry,
    blocks: Rc<BlockRegistry>,
    /// > 0 while inside an async function/lambda; reset to 0 at any
    /// non-async function boundary.
    pub(crate) async_depth: u32,
    /// Declared return type (canonical) per enclosing function, innermost
    /// last. `None` entries are functions without a declared return type.
    pub(crate) return_types: Vec<Option<String>>,
    /// The name of the named server block being analyzed, if any.
    pub(crate) current_server_block: Option<String>,
    /// Pre-pass result: block name -> function names, for RPC validation.
    pub(crate) server_blocks: FxHashMap<String, FxHashSet<String>>,
}

impl Analyzer {
    pub fn new(file: impl Into<String>, opts: AnalyzerOptions) -> Self {
        let mut scopes = ScopeTree::new();
        let mut registry = TypeRegistry::new();
        builtins::register_builtins(&mut scopes, &mut registry);
        let scope = scopes.root();
        Analyzer {
            opts,
            file: file.into(),
            errors: Vec::new(),
            warnings: Vec::new(),
            scopes,
            scope,
            registry,
            blocks: Rc::new(BlockRegistry::with_default_plugins()),
            async_depth: 0,
            return_types: Vec::new(),
            current_server_block: None,
            server_blocks: FxHashMap::default(),
        }
    }

    /// Run the full analysis: pre-pass, main walk, unused post-pass, and
    /// the document-order sort of both diagnostic streams.
    pub fn run(mut self, program: &Program) -> Analysis {
        self.pre_pass(program);
        self.visit_all(&program.body);

        let mut unused = unused::report(&self.scopes, &self.file);
        self.warnings.append(&mut unused);

        // Diagnostics stream in document order, deterministically.
        self.errors.sort_by_key(|d| (d.loc.line, d.loc.column));
        self.warnings.sort_by_key(|d| (d.loc.line, d.loc.column));

        Analysis {
            errors: self.errors,
            warnings: self.warnings,
            scopes: self.scopes,
            registry: self.registry,
        }
    }

    /// Collect {block name -> function names} from top-level named server
    /// blocks, so RPC-style calls can be validated against peers that are
    /// declared later in the program.
    fn pre_pass(&mut self, program: &Program) {
        for stmt in &program.body {
            if let Stmt::ServerBlock(block) = stmt {
                if let Some(name) = &block.name {
                    let fns: FxHashSet<String> = block
                        .body
                        .iter()
                        .filter_map(|s| match s {
                            Stmt::FunctionDecl(f) => Some(f.name.clone()),
                            _ => None,
                        })
                        .collect();
                    self.server_blocks.insert(name.clone(), fns);
                }
            }
        }
    }

    // ── Dispatcher ──────────────────────────────────────────────────────

    /// Visit a statement list, flagging code after a terminator once.
    pub(crate) fn visit_all(&mut self, stmts: &[Stmt]) {
        let mut terminated = false;
        for stmt in stmts {
            if terminated && !matches!(stmt, Stmt::Unknown) {
                self.warn(Code::W201, "unreachable code", stmt.loc());
                terminated = false;
            }
            self.visit_stmt(stmt);
            if matches!(
                stmt,
                Stmt::Return(_) | Stmt::Break(_) | Stmt::Continue(_) | Stmt::Throw(_)
            ) {
                terminated = true;
            }
        }
    }

    pub(crate) fn visit_stmt(&mut self, stmt: &Stmt) {
        // Block forms go through the plugin registry so new kinds can be
        // added without touching this dispatcher.
        let blocks = Rc::clone(&self.blocks);
        if let Some(plugin) = blocks.plugin_for(stmt) {
            plugin.analyze(self, stmt);
            return;
        }

        match stmt {
            Stmt::Assignment(a) => self.visit_assignment(a),
            Stmt::Destructure(d) => self.visit_destructure(d),
            Stmt::CompoundAssignment(c) => self.visit_compound_assignment(c),
            Stmt::FunctionDecl(f) => self.visit_function(f),
            Stmt::TypeDecl(t) => self.visit_type_decl(t),
            Stmt::TypeAlias(t) => self.visit_type_alias(t),
            Stmt::InterfaceDecl(i) => self.visit_interface(&i.name, &i.methods, i.loc),
            Stmt::TraitDecl(t) => self.visit_interface(&t.name, &t.methods, t.loc),
            Stmt::ImplBlock(i) => self.visit_impl(i),
            Stmt::Import(i) => self.visit_import(i),
            Stmt::DefaultImport(i) => self.visit_default_import(i),
            Stmt::WildcardImport(i) => self.visit_wildcard_import(i),
            Stmt::ExternDecl(e) => self.visit_extern(e),
            Stmt::If(i) => self.visit_if(i),
            Stmt::For(f) => self.visit_for(f),
            Stmt::While(w) => self.visit_while(w),
            Stmt::Loop(l) => self.visit_loop(l),
            Stmt::TryCatch(t) => self.visit_try_catch(t),
            Stmt::Throw(t) => self.visit_throw(t),
            Stmt::Return(r) => self.visit_return(r),
            Stmt::ExprStmt(e) => self.walk_expr(&e.expr),
            Stmt::Block(b) => {
                self.enter(ScopeKind::Block);
                self.visit_all(&b.body);
                self.exit();
            }
            Stmt::Break(b) => self.visit_break(b),
            Stmt::Continue(c) => self.visit_continue(c),
            Stmt::Guard(g) => self.visit_guard(g),
            Stmt::Defer(d) => self.visit_defer(d),
            Stmt::RouteDecl(r) => self.visit_route(r),
            Stmt::WsDecl(w) => self.visit_ws(w),
            Stmt::DbDecl(d) => self.visit_db(d),
            Stmt::RateLimitDecl(r) => self.visit_rate_limit(r),
            Stmt::MiddlewareDecl(m) => self.visit_middleware(m),
            Stmt::CronDecl(c) => self.visit_cron(c),
            Stmt::StateDecl(s) => self.visit_state(s),
            Stmt::ComputedDecl(c) => self.visit_computed(c),
            Stmt::ComponentDecl(c) => self.visit_component(c),
            Stmt::StoreDecl(s) => self.visit_store(s),
            Stmt::EffectDecl(e) => self.visit_effect(e),
            // Block forms are handled by plugins above; an unknown tag is
            // a no-op.
            Stmt::ServerBlock(_)
            | Stmt::ClientBlock(_)
            | Stmt::SharedBlock(_)
            | Stmt::DataBlock(_)
            | Stmt::TestBlock(_)
            | Stmt::BenchBlock(_)
            | Stmt::Unknown => {}
        }
    }

    // ── Scope helpers ───────────────────────────────────────────────────

    pub(crate) fn enter(&mut self, kind: ScopeKind) -> ScopeId {
        let id = self.scopes.push(self.scope, kind);
        self.scope = id;
        id
    }

    pub(crate) fn enter_loop(&mut self, label: Option<String>) -> ScopeId {
        let id = self.scopes.push_loop(self.scope, label);
        self.scope = id;
        id
    }

    pub(crate) fn exit(&mut self) {
        if let Some(parent) = self.scopes.scope(self.scope).parent {
            self.scope = parent;
        }
    }

    /// The nearest enclosing top-level block context.
    pub(crate) fn block_context(&self) -> ScopeKind {
        self.scopes.block_context(self.scope)
    }

    // ── Inference helpers ───────────────────────────────────────────────

    pub(crate) fn infer_ty(&self, expr: &tova_ast::Expr) -> Option<Ty> {
        InferCx::new(&self.scopes, self.scope, &self.registry).infer(expr)
    }

    pub(crate) fn cx(&self) -> InferCx<'_> {
        InferCx::new(&self.scopes, self.scope, &self.registry)
    }

    // ── Diagnostic helpers ──────────────────────────────────────────────

    pub(crate) fn loc_or_default(&self, loc: Option<Loc>) -> Loc {
        loc.unwrap_or_default()
    }

    pub(crate) fn error(
        &mut self,
        code: Code,
        message: impl Into<String>,
        loc: Option<Loc>,
    ) -> &mut Diagnostic {
        let d = Diagnostic::new(code, message, self.file.clone(), self.loc_or_default(loc));
        self.errors.push(d);
        self.errors.last_mut().expect("just pushed")
    }

    pub(crate) fn warn(
        &mut self,
        code: Code,
        message: impl Into<String>,
        loc: Option<Loc>,
    ) -> &mut Diagnostic {
        let d = Diagnostic::new(code, message, self.file.clone(), self.loc_or_default(loc));
        self.warnings.push(d);
        self.warnings.last_mut().expect("just pushed")
    }

    /// Emit a finding that strict mode upgrades from warning to error.
    /// `strict_code` is used (as an error) when strict mode is on.
    pub(crate) fn strict_upgrade(
        &mut self,
        warn_code: Code,
        strict_code: Code,
        message: impl Into<String>,
        loc: Option<Loc>,
    ) {
        if self.opts.strict {
            let d = Diagnostic::new(strict_code, message, self.file.clone(), self.loc_or_default(loc))
                .with_severity(Severity::Error);
            self.errors.push(d);
        } else {
            self.warn(warn_code, message, loc);
        }
    }
}
