use cranelift_entity::{entity_impl, PrimaryMap};

use crate::{AstContext, Function};

#[derive(Debug, Default)]
pub struct Module {
    /// The AST every location of the module points into.
    pub ast: AstContext,

    /// Holds all functions of the module in declaration order.
    pub funcs: PrimaryMap<FuncRef, Function>,
}

impl Module {
    #[doc(hidden)]
    pub fn new(ast: AstContext) -> Self {
        Self {
            ast,
            funcs: PrimaryMap::default(),
        }
    }

    /// Returns `func_ref` in the module.
    pub fn iter_functions(&self) -> impl Iterator<Item = FuncRef> {
        self.funcs.keys()
    }

    pub fn func_by_name(&self, name: &str) -> Option<FuncRef> {
        self.funcs
            .iter()
            .find_map(|(func_ref, func)| (func.name() == name).then_some(func_ref))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FuncRef(u32);
entity_impl!(FuncRef, "func");
