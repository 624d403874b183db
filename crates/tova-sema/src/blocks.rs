//! The block plugin registry.
//!
//! Each top-level block form (`server`, `client`, `shared`, `data`,
//! `test`, `bench`) is handled by a [`BlockPlugin`]: `detect` claims a
//! node, `analyze` opens the right scope context and walks the body. The
//! dispatcher consults the registry first, so a new block kind is a new
//! plugin registration, not a dispatcher edit. Parsing and code
//! generation for block forms belong to the out-of-scope stages; analyzer
//! plugins only carry the `analyze` behavior.

use tova_ast::Stmt;

use crate::analyzer::Analyzer;
use crate::scope::{ScopeKind, Symbol, SymbolKind};

pub trait BlockPlugin {
    /// The surface keyword this plugin owns.
    fn name(&self) -> &'static str;
    /// Whether this statement is this plugin's block form.
    fn detect(&self, stmt: &Stmt) -> bool;
    /// Analyze the block: context scope, symbol registration, body walk.
    fn analyze(&self, an: &mut Analyzer, stmt: &Stmt);
}

/// The set of registered block plugins, built once at analyzer startup.
pub struct BlockRegistry {
    plugins: Vec<Box<dyn BlockPlugin>>,
}

impl BlockRegistry {
    pub fn with_default_plugins() -> Self {
        BlockRegistry {
            plugins: vec![
                Box::new(ServerPlugin),
                Box::new(ClientPlugin),
                Box::new(SharedPlugin),
                Box::new(DataPlugin),
                Box::new(TestPlugin),
                Box::new(BenchPlugin),
            ],
        }
    }

    pub fn plugin_for(&self, stmt: &Stmt) -> Option<&dyn BlockPlugin> {
        self.plugins
            .iter()
            .find(|p| p.detect(stmt))
            .map(|p| p.as_ref())
    }
}

/// Define a block's name as a used module symbol, so references to it
/// (RPC receivers, store access) resolve.
fn define_block_name(an: &mut Analyzer, name: &str, loc: Option<tova_common::Loc>) {
    let sym = Symbol::new(name, SymbolKind::Module).at(loc);
    if let Ok(id) = an.scopes.define(an.scope, sym) {
        an.scopes.mark_used(id);
    }
}

// ── server ───────────────────────────────────────────────────────────────

struct ServerPlugin;

impl BlockPlugin for ServerPlugin {
    fn name(&self) -> &'static str {
        "server"
    }

    fn detect(&self, stmt: &Stmt) -> bool {
        matches!(stmt, Stmt::ServerBlock(_))
    }

    fn analyze(&self, an: &mut Analyzer, stmt: &Stmt) {
        let Stmt::ServerBlock(block) = stmt else { return };
        if let Some(name) = &block.name {
            define_block_name(an, name, block.loc);
        }
        let saved = an.current_server_block.take();
        an.current_server_block = block.name.clone();
        an.enter(ScopeKind::Server);
        an.visit_all(&block.body);
        an.exit();
        an.current_server_block = saved;
    }
}

// ── client ───────────────────────────────────────────────────────────────

struct ClientPlugin;

impl BlockPlugin for ClientPlugin {
    fn name(&self) -> &'static str {
        "client"
    }

    fn detect(&self, stmt: &Stmt) -> bool {
        matches!(stmt, Stmt::ClientBlock(_))
    }

    fn analyze(&self, an: &mut Analyzer, stmt: &Stmt) {
        let Stmt::ClientBlock(block) = stmt else { return };
        if let Some(name) = &block.name {
            define_block_name(an, name, block.loc);
        }
        an.enter(ScopeKind::Client);
        an.visit_all(&block.body);
        an.exit();
    }
}

// ── shared ───────────────────────────────────────────────────────────────

struct SharedPlugin;

impl BlockPlugin for SharedPlugin {
    fn name(&self) -> &'static str {
        "shared"
    }

    fn detect(&self, stmt: &Stmt) -> bool {
        matches!(stmt, Stmt::SharedBlock(_))
    }

    fn analyze(&self, an: &mut Analyzer, stmt: &Stmt) {
        let Stmt::SharedBlock(block) = stmt else { return };
        an.enter(ScopeKind::Shared);
        an.visit_all(&block.body);
        an.exit();
    }
}

// ── data ─────────────────────────────────────────────────────────────────

struct DataPlugin;

impl BlockPlugin for DataPlugin {
    fn name(&self) -> &'static str {
        "data"
    }

    fn detect(&self, stmt: &Stmt) -> bool {
        matches!(stmt, Stmt::DataBlock(_))
    }

    fn analyze(&self, an: &mut Analyzer, stmt: &Stmt) {
        let Stmt::DataBlock(block) = stmt else { return };
        if let Some(name) = &block.name {
            define_block_name(an, name, block.loc);
        }
        an.enter(ScopeKind::Block);
        an.visit_all(&block.body);
        an.exit();
    }
}

// ── test / bench ─────────────────────────────────────────────────────────

struct TestPlugin;

impl BlockPlugin for TestPlugin {
    fn name(&self) -> &'static str {
        "test"
    }

    fn detect(&self, stmt: &Stmt) -> bool {
        matches!(stmt, Stmt::TestBlock(_))
    }

    fn analyze(&self, an: &mut Analyzer, stmt: &Stmt) {
        let Stmt::TestBlock(block) = stmt else { return };
        an.enter(ScopeKind::Block);
        an.visit_all(&block.body);
        an.exit();
    }
}

struct BenchPlugin;

impl BlockPlugin for BenchPlugin {
    fn name(&self) -> &'static str {
        "bench"
    }

    fn detect(&self, stmt: &Stmt) -> bool {
        matches!(stmt, Stmt::BenchBlock(_))
    }

    fn analyze(&self, an: &mut Analyzer, stmt: &Stmt) {
        let Stmt::BenchBlock(block) = stmt else { return };
        an.enter(ScopeKind::Block);
        an.visit_all(&block.body);
        an.exit();
    }
}
