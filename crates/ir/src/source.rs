//! Source positions of the high-level program the IR was lowered from.
use std::{fmt, ops::Range};

/// A byte offset into the original source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SourcePos(pub u32);

impl SourcePos {
    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A half-open byte range `[start, end)` covered by an AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceRange {
    pub start: SourcePos,
    pub end: SourcePos,
}

impl SourceRange {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "inverted source range {start}..{end}");
        Self {
            start: SourcePos(start),
            end: SourcePos(end),
        }
    }

    pub fn as_range(self) -> Range<usize> {
        self.start.as_usize()..self.end.as_usize()
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
