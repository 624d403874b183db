//! Source locations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position in a source file, 1-indexed on both axes.
///
/// The file name is not part of the location; diagnostics carry it
/// separately so that nodes stay small after the driver merges files.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Loc {
    pub line: u32,
    pub column: u32,
}

impl Loc {
    pub fn new(line: u32, column: u32) -> Self {
        Loc { line, column }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
