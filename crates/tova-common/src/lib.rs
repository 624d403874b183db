//! Shared types for the Tova compiler.
//!
//! Home of the two data shapes every compiler stage agrees on: source
//! locations ([`Loc`]) and diagnostics ([`Diagnostic`]). The semantic
//! analyzer produces diagnostics; the CLI, language server, and formatter
//! consume them, so they live here rather than inside any single stage.

pub mod diagnostic;
pub mod loc;

pub use diagnostic::{Code, Diagnostic, Fix, Severity};
pub use loc::Loc;
