//! Tova semantic analyzer.
//!
//! Consumes a parsed [`Program`](tova_ast::Program) and produces the
//! diagnostic streams, the retained scope tree, and the project type
//! registry consumed by downstream tools (code generator, language
//! server, formatter).
//!
//! The pass weaves together lexical scoping, mutability tracking, gradual
//! type inference, flow-sensitive narrowing, return-path analysis, match
//! exhaustiveness, and block-context validation — a single synchronous
//! walk with no external effects. Analyzing the same AST twice yields
//! byte-identical diagnostic streams.
//!
//! # Architecture
//!
//! - [`ty`]: the type algebra, canonical string encoding, compatibility
//! - [`scope`]: the arena scope tree and symbol table
//! - [`registry`]: named types, impl method sets, trait signatures
//! - [`builtins`]: module-scope seeding (stdlib, runtime, primitives)
//! - [`infer`]: pure expression type inference
//! - [`narrow`]: flow-sensitive narrowing facts
//! - [`flow`]: return-path analysis
//! - [`exhaustiveness`]: match coverage
//! - [`blocks`]: the block-form plugin registry
//! - [`analyzer`]: the visitors and traversal state machines
//! - [`unused`]: the unused-symbol post-pass
//! - [`render`]: ariadne and one-line diagnostic rendering

pub mod analyzer;
pub mod blocks;
pub mod builtins;
pub mod exhaustiveness;
pub mod flow;
pub mod infer;
pub mod narrow;
pub mod registry;
pub mod render;
pub mod scope;
pub mod ty;
pub mod unused;

use tova_ast::Program;
use tova_common::Diagnostic;

pub use crate::analyzer::Analyzer;
pub use crate::registry::TypeRegistry;
pub use crate::scope::{ScopeTree, Symbol, SymbolKind};
pub use crate::ty::Ty;

/// Analyzer configuration.
///
/// `tolerant` keeps the pass collect-and-continue (the default); callers
/// running non-tolerant treat a nonempty error list as fatal once the
/// pass completes. `strict` upgrades argument-count, binary-operator, and
/// compound-assignment findings to errors and makes `Int <- Float`
/// narrowing an error.
#[derive(Copy, Clone, Debug)]
pub struct AnalyzerOptions {
    pub tolerant: bool,
    pub strict: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        AnalyzerOptions { tolerant: true, strict: false }
    }
}

impl AnalyzerOptions {
    pub fn strict() -> Self {
        AnalyzerOptions { tolerant: true, strict: true }
    }
}

/// The result of analyzing a program.
pub struct Analysis {
    /// Errors, in document order.
    pub errors: Vec<Diagnostic>,
    /// Warnings, in document order.
    pub warnings: Vec<Diagnostic>,
    /// The retained scope tree, for downstream consumers.
    pub scopes: ScopeTree,
    /// Named types, impl method sets, and trait signatures.
    pub registry: TypeRegistry,
}

impl Analysis {
    /// Whether the caller should treat this run as failed.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Render every diagnostic in the one-line form, errors first.
    pub fn render_lines(&self) -> Vec<String> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .map(render::render_line)
            .collect()
    }

    /// The type registry as JSON, for the language server and docs.
    pub fn registry_json(&self) -> String {
        serde_json::to_string_pretty(&self.registry)
            .expect("the registry serializes without fallible types")
    }
}

/// Analyze a program with default options.
pub fn analyze(program: &Program, file: impl Into<String>) -> Analysis {
    analyze_with_options(program, file, AnalyzerOptions::default())
}

/// Analyze a program with explicit options.
pub fn analyze_with_options(
    program: &Program,
    file: impl Into<String>,
    options: AnalyzerOptions,
) -> Analysis {
    Analyzer::new(file, options).run(program)
}
