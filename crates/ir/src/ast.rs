//! The subset of the high-level AST that IR locations point back into.
//!
//! The AST is owned by the front end; the IR only holds [`AstNodeRef`]
//! handles into [`AstContext`], which outlives every function referring to
//! it.
use std::fmt;

use cranelift_entity::{entity_impl, PrimaryMap};

use crate::{
    location::{LocKind, LocationError, Origin, ResolvedLoc},
    types::TypeStore,
    Location, SourceRange,
};

/// An opaque reference to an [`AstNode`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AstNodeRef(u32);
entity_impl!(AstNodeRef, "node");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstNodeKind {
    FuncDecl,
    ClosureExpr,
    SwitchStmt,
    ReturnStmt,
    IfStmt,
    CallExpr,
    LiteralExpr,
    OtherStmt,
    OtherExpr,
}

impl AstNodeKind {
    pub fn by_name(name: &str) -> Option<Self> {
        let kind = match name {
            "func_decl" => Self::FuncDecl,
            "closure_expr" => Self::ClosureExpr,
            "switch_stmt" => Self::SwitchStmt,
            "return_stmt" => Self::ReturnStmt,
            "if_stmt" => Self::IfStmt,
            "call_expr" => Self::CallExpr,
            "literal_expr" => Self::LiteralExpr,
            "stmt" => Self::OtherStmt,
            "expr" => Self::OtherExpr,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FuncDecl => "func_decl",
            Self::ClosureExpr => "closure_expr",
            Self::SwitchStmt => "switch_stmt",
            Self::ReturnStmt => "return_stmt",
            Self::IfStmt => "if_stmt",
            Self::CallExpr => "call_expr",
            Self::LiteralExpr => "literal_expr",
            Self::OtherStmt => "stmt",
            Self::OtherExpr => "expr",
        }
    }

    /// Returns `true` for the constructs that own a body and can therefore
    /// originate an IR function.
    pub fn is_body_owner(self) -> bool {
        matches!(self, Self::FuncDecl | Self::ClosureExpr)
    }
}

impl fmt::Display for AstNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AstNode {
    pub kind: AstNodeKind,
    pub range: SourceRange,
}

#[derive(Debug, Default, Clone)]
pub struct AstContext {
    nodes: PrimaryMap<AstNodeRef, AstNode>,
    pub types: TypeStore,
}

impl AstContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn make_node(&mut self, kind: AstNodeKind, range: SourceRange) -> AstNodeRef {
        self.nodes.push(AstNode { kind, range })
    }

    pub fn node(&self, node: AstNodeRef) -> Option<&AstNode> {
        self.nodes.get(node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (AstNodeRef, &AstNode)> {
        self.nodes.iter()
    }

    pub fn node_num(&self) -> usize {
        self.nodes.len()
    }

    /// Classifies `loc` into the construct it was attributed to.
    ///
    /// Returns `Ok(None)` for an invalid location. A location whose kind is
    /// inconsistent with the node it points at is a broken invariant of the
    /// stage that produced the IR.
    pub fn resolve(&self, loc: Location) -> Result<Option<ResolvedLoc>, LocationError> {
        let Some(ast_loc) = loc.ast_loc() else {
            return Ok(None);
        };

        let node = self
            .node(ast_loc.node)
            .ok_or(LocationError::DanglingNode(ast_loc.node))?;

        let origin = match ast_loc.kind {
            LocKind::Return => {
                if node.kind != AstNodeKind::ReturnStmt {
                    return Err(LocationError::ReturnOnNonReturnStmt { found: node.kind });
                }
                Origin::Return
            }

            LocKind::ImplicitReturn => {
                if !node.kind.is_body_owner() {
                    return Err(LocationError::ImplicitReturnOnNonBody { found: node.kind });
                }
                Origin::ImplicitReturn
            }

            LocKind::Regular => match node.kind {
                AstNodeKind::FuncDecl => Origin::FuncDecl,
                AstNodeKind::ClosureExpr => Origin::ClosureExpr,
                AstNodeKind::SwitchStmt => Origin::SwitchStmt,
                kind => Origin::Other(kind),
            },
        };

        Ok(Some(ResolvedLoc {
            origin,
            range: node.range,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> (AstContext, [AstNodeRef; 4]) {
        let mut ast = AstContext::new();
        let func = ast.make_node(AstNodeKind::FuncDecl, SourceRange::new(0, 100));
        let switch = ast.make_node(AstNodeKind::SwitchStmt, SourceRange::new(10, 40));
        let ret = ast.make_node(AstNodeKind::ReturnStmt, SourceRange::new(50, 58));
        let call = ast.make_node(AstNodeKind::CallExpr, SourceRange::new(60, 70));
        (ast, [func, switch, ret, call])
    }

    #[test]
    fn resolve_regular_locations() {
        let (ast, [func, switch, ret, call]) = ctx();

        let resolved = ast.resolve(Location::regular(func)).unwrap().unwrap();
        assert_eq!(resolved.origin, Origin::FuncDecl);
        assert_eq!(resolved.end().as_u32(), 100);

        let resolved = ast.resolve(Location::regular(switch)).unwrap().unwrap();
        assert_eq!(resolved.origin, Origin::SwitchStmt);
        assert_eq!(resolved.start().as_u32(), 10);

        // A return statement lowered with a regular location is not a return edge.
        let resolved = ast.resolve(Location::regular(ret)).unwrap().unwrap();
        assert_eq!(resolved.origin, Origin::Other(AstNodeKind::ReturnStmt));

        let resolved = ast.resolve(Location::regular(call)).unwrap().unwrap();
        assert_eq!(resolved.origin, Origin::Other(AstNodeKind::CallExpr));
    }

    #[test]
    fn resolve_return_locations() {
        let (ast, [func, switch, ret, _]) = ctx();

        let resolved = ast.resolve(Location::ret(ret)).unwrap().unwrap();
        assert_eq!(resolved.origin, Origin::Return);

        let resolved = ast.resolve(Location::implicit_return(func)).unwrap().unwrap();
        assert_eq!(resolved.origin, Origin::ImplicitReturn);

        assert_eq!(
            ast.resolve(Location::ret(func)),
            Err(LocationError::ReturnOnNonReturnStmt {
                found: AstNodeKind::FuncDecl
            })
        );
        assert_eq!(
            ast.resolve(Location::implicit_return(switch)),
            Err(LocationError::ImplicitReturnOnNonBody {
                found: AstNodeKind::SwitchStmt
            })
        );
    }

    #[test]
    fn resolve_invalid_and_dangling() {
        let (ast, _) = ctx();
        assert_eq!(ast.resolve(Location::Invalid), Ok(None));

        let mut other = AstContext::new();
        for _ in 0..8 {
            other.make_node(AstNodeKind::OtherExpr, SourceRange::default());
        }
        let foreign = other.make_node(AstNodeKind::OtherExpr, SourceRange::default());
        assert_eq!(
            ast.resolve(Location::regular(foreign)),
            Err(LocationError::DanglingNode(foreign))
        );
    }
}
