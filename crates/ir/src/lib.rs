pub mod ast;
pub mod builder;
pub mod dfg;
pub mod function;
pub mod inst;
pub mod ir_writer;
pub mod layout;
pub mod location;
pub mod module;
pub mod source;
pub mod types;
pub mod value;

pub use ast::{AstContext, AstNode, AstNodeKind, AstNodeRef};
pub use dfg::{Block, BlockId, DataFlowGraph};
pub use function::{Function, Signature};
pub use inst::{Builtin, Inst, InstData, InstId};
pub use layout::Layout;
pub use location::{AstLoc, LocKind, Location, LocationError, Origin, ResolvedLoc};
pub use module::{FuncRef, Module};
pub use source::{SourcePos, SourceRange};
pub use types::{NominalRef, Type, TypeStore};
pub use value::{Value, ValueId};
