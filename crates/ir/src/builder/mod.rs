mod func_builder;
mod module_builder;

pub use func_builder::FunctionBuilder;
pub use module_builder::ModuleBuilder;

pub mod test_util {
    use super::*;

    use crate::{AstNodeKind, AstNodeRef, Location, SourceRange, Type};

    /// Declares a function originating from a fresh `func_decl` node spanning
    /// `range` and returns the builder together with that node.
    pub fn test_func_decl(
        mb: &mut ModuleBuilder,
        ret_ty: Type,
        noreturn: bool,
        range: SourceRange,
    ) -> (crate::module::FuncRef, AstNodeRef) {
        let node = mb.make_ast_node(AstNodeKind::FuncDecl, range);
        let sig = crate::Signature::new("test_func", &[], ret_ty).with_noreturn(noreturn);
        let func_ref = mb.declare_function(sig, Location::regular(node));
        (func_ref, node)
    }
}
