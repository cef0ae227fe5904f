//! Provenance of IR instructions.
//!
//! Every instruction and every function carries a [`Location`]. A valid
//! location is a non-owning handle into the [`crate::AstContext`] node table
//! tagged with how the instruction relates to that node. Locations are
//! resolved into a closed [`Origin`] discriminator by
//! [`crate::AstContext::resolve`].
use std::fmt;

use thiserror::Error;

use crate::{ast::AstNodeKind, AstNodeRef, SourceRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Location {
    /// Synthesized by a transformation; has no user-facing meaning.
    #[default]
    Invalid,
    Ast(AstLoc),
}

impl Location {
    pub fn regular(node: AstNodeRef) -> Self {
        Self::Ast(AstLoc {
            node,
            kind: LocKind::Regular,
        })
    }

    pub fn ret(node: AstNodeRef) -> Self {
        Self::Ast(AstLoc {
            node,
            kind: LocKind::Return,
        })
    }

    pub fn implicit_return(node: AstNodeRef) -> Self {
        Self::Ast(AstLoc {
            node,
            kind: LocKind::ImplicitReturn,
        })
    }

    pub fn is_valid(self) -> bool {
        matches!(self, Self::Ast(_))
    }

    pub fn ast_loc(self) -> Option<AstLoc> {
        match self {
            Self::Invalid => None,
            Self::Ast(loc) => Some(loc),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => "<invalid>".fmt(f),
            Self::Ast(AstLoc { node, kind }) => match kind {
                LocKind::Regular => write!(f, "#{}", node.as_u32()),
                LocKind::Return => write!(f, "return #{}", node.as_u32()),
                LocKind::ImplicitReturn => write!(f, "implicit_return #{}", node.as_u32()),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AstLoc {
    pub node: AstNodeRef,
    pub kind: LocKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocKind {
    /// The instruction was lowered from the node itself.
    Regular,
    /// The instruction implements an explicit `return` statement.
    Return,
    /// The instruction implements the implicit return at the end of a body.
    ImplicitReturn,
}

/// The construct a valid location was attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    FuncDecl,
    ClosureExpr,
    SwitchStmt,
    /// An explicit `return` statement.
    Return,
    /// The implicit return at the end of a function or closure body.
    ImplicitReturn,
    /// Any other node lowered with a regular location.
    Other(AstNodeKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLoc {
    pub origin: Origin,
    pub range: SourceRange,
}

impl ResolvedLoc {
    pub fn start(&self) -> crate::SourcePos {
        self.range.start
    }

    pub fn end(&self) -> crate::SourcePos {
        self.range.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location references AST node #{} which is not in the AST context", .0.as_u32())]
    DanglingNode(AstNodeRef),
    #[error("return location references a {found} node instead of a return statement")]
    ReturnOnNonReturnStmt { found: AstNodeKind },
    #[error("implicit return location references a {found} node instead of a function or closure")]
    ImplicitReturnOnNonBody { found: AstNodeKind },
}
