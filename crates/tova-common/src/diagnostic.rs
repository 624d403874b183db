//! The diagnostic data model.
//!
//! A [`Diagnostic`] is a single closed struct with nullable fields and a
//! stable [`Code`]; the analyzer appends them to its error/warning streams
//! and never mutates one after the fact. Rendering (ariadne reports, the
//! one-line `file:line:col — message` form) lives in the analyzer's
//! `render` module; this crate only defines the shape.

use std::fmt;

use serde::Serialize;

use crate::loc::Loc;

/// Diagnostic severity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

/// Stable diagnostic codes.
///
/// The numeric surface is frozen: tools match on these strings. Errors are
/// grouped by hundreds (1xx typing, 2xx resolution/binding, 3xx context &
/// control), warnings likewise (0xx unused, 1xx conventions, 2xx suspicious
/// constructs, 3xx conformance).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Code {
    /// Return type of a function body does not match its declaration.
    E101,
    /// Assigned value's type does not match the binding's type.
    E102,
    /// Call argument type does not match the parameter type.
    E103,
    /// Wrong number of call arguments (strict mode).
    E104,
    /// Binary operator operand type mismatch (strict mode).
    E105,
    /// Compound assignment operand incompatibility (strict mode).
    E106,
    /// Undefined identifier.
    E200,
    /// No such function in the referenced peer block.
    E201,
    /// Reassignment of an immutable binding.
    E202,
    /// Redefinition of a name in the same scope.
    E203,
    /// `await` outside an async function.
    E300,
    /// `return` outside a function.
    E301,
    /// Client-only declaration outside a `client` block.
    E302,
    /// Server-only declaration outside a `server` block.
    E303,
    /// `break` outside a loop.
    E304,
    /// `continue` outside a loop.
    E305,
    /// Unused variable.
    W001,
    /// Unused function.
    W002,
    /// Naming convention violation.
    W100,
    /// Declaration shadows a name from an outer scope.
    W101,
    /// Wrong number of call arguments.
    W102,
    /// Binary operator operand type mismatch.
    W103,
    /// Compound assignment operand incompatibility.
    W104,
    /// RPC-style call to the block's own name.
    W105,
    /// Body type annotation on a GET route.
    W106,
    /// Non-exhaustive match.
    W200,
    /// Unreachable code.
    W201,
    /// Condition is always true.
    W202,
    /// Condition is always false.
    W203,
    /// Implicit Int <- Float narrowing (data loss).
    W204,
    /// Not all code paths return a value.
    W205,
    /// `throw` used where a Result would do.
    W206,
    /// Match arm after a catch-all arm.
    W207,
    /// `defer` outside a function.
    W208,
    /// Impl is missing a trait method.
    W300,
    /// Impl method arity differs from the trait signature.
    W301,
    /// Impl method return type differs from the trait signature.
    W302,
    /// Unknown name in a derive list.
    W303,
}

impl Code {
    /// The severity class this code belongs to.
    pub fn severity(self) -> Severity {
        match self {
            Code::E101
            | Code::E102
            | Code::E103
            | Code::E104
            | Code::E105
            | Code::E106
            | Code::E200
            | Code::E201
            | Code::E202
            | Code::E203
            | Code::E300
            | Code::E301
            | Code::E302
            | Code::E303
            | Code::E304
            | Code::E305 => Severity::Error,
            _ => Severity::Warning,
        }
    }

    /// The literal code string (e.g. `"E202"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Code::E101 => "E101",
            Code::E102 => "E102",
            Code::E103 => "E103",
            Code::E104 => "E104",
            Code::E105 => "E105",
            Code::E106 => "E106",
            Code::E200 => "E200",
            Code::E201 => "E201",
            Code::E202 => "E202",
            Code::E203 => "E203",
            Code::E300 => "E300",
            Code::E301 => "E301",
            Code::E302 => "E302",
            Code::E303 => "E303",
            Code::E304 => "E304",
            Code::E305 => "E305",
            Code::W001 => "W001",
            Code::W002 => "W002",
            Code::W100 => "W100",
            Code::W101 => "W101",
            Code::W102 => "W102",
            Code::W103 => "W103",
            Code::W104 => "W104",
            Code::W105 => "W105",
            Code::W106 => "W106",
            Code::W200 => "W200",
            Code::W201 => "W201",
            Code::W202 => "W202",
            Code::W203 => "W203",
            Code::W204 => "W204",
            Code::W205 => "W205",
            Code::W206 => "W206",
            Code::W207 => "W207",
            Code::W208 => "W208",
            Code::W300 => "W300",
            Code::W301 => "W301",
            Code::W302 => "W302",
            Code::W303 => "W303",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposed textual fix. Advisory only; never applied by the analyzer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Fix {
    /// What applying the fix would do, one line.
    pub description: String,
    /// Replacement text for the underlined span, when one exists.
    pub replacement: Option<String>,
}

/// A single finding: severity, message, source attribution, and optional
/// hint/fix payload.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub file: String,
    pub loc: Loc,
    /// Length of the underlined span, in characters.
    pub length: Option<u32>,
    pub code: Code,
    /// One-line actionable suggestion.
    pub hint: Option<String>,
    pub fix: Option<Fix>,
}

impl Diagnostic {
    /// Create a diagnostic with the code's default severity and no
    /// hint/fix payload.
    pub fn new(code: Code, message: impl Into<String>, file: impl Into<String>, loc: Loc) -> Self {
        Diagnostic {
            severity: code.severity(),
            message: message.into(),
            file: file.into(),
            loc,
            length: None,
            code,
            hint: None,
            fix: None,
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_fix(mut self, description: impl Into<String>, replacement: Option<String>) -> Self {
        self.fix = Some(Fix {
            description: description.into(),
            replacement,
        });
        self
    }

    /// Force a severity different from the code's default. Used by strict
    /// mode to upgrade specific warnings.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// In-place variant of [`Diagnostic::with_hint`], for diagnostics
    /// already appended to a stream.
    pub fn set_hint(&mut self, hint: impl Into<String>) -> &mut Self {
        self.hint = Some(hint.into());
        self
    }

    /// In-place variant of [`Diagnostic::with_fix`].
    pub fn set_fix(
        &mut self,
        description: impl Into<String>,
        replacement: Option<String>,
    ) -> &mut Self {
        self.fix = Some(Fix {
            description: description.into(),
            replacement,
        });
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} — {}", self.file, self.loc, self.message)
    }
}
