//! AST node definitions for the Tova language.
//!
//! This crate is the contract between the parser and everything downstream
//! (semantic analyzer, code generator, formatter). Nodes are plain owned
//! enums with one variant per node tag; every node carries an optional
//! source [`Loc`](tova_common::Loc). The serde representation is
//! internally tagged on `"type"`, so a JSON AST produced by the driver
//! round-trips; unknown tags deserialize to the `Unknown` variant, which
//! downstream passes treat as a no-op.
//!
//! # Architecture
//!
//! - [`expr`]: expression nodes (literals through JSX)
//! - [`stmt`]: statements, declarations, and the block-form family
//! - [`pat`]: match patterns
//! - [`types`]: type annotation expressions

pub mod expr;
pub mod pat;
pub mod stmt;
pub mod types;

use serde::{Deserialize, Serialize};

pub use expr::*;
pub use pat::*;
pub use stmt::*;
pub use types::*;

/// The root of an analyzed program. The driver merges all source files
/// into a single body before any downstream pass runs.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Program {
    pub body: Vec<Stmt>,
}
