use cranelift_entity::PrimaryMap;
use rustc_hash::FxHashMap;

use super::FunctionBuilder;
use crate::{
    module::FuncRef, AstContext, AstNodeKind, AstNodeRef, Function, Location, Module, Signature,
    SourceRange, Type,
};

#[derive(Debug, Default)]
pub struct ModuleBuilder {
    pub ast: AstContext,

    funcs: PrimaryMap<FuncRef, Function>,

    /// Map function name -> FuncRef to avoid duplicated declaration.
    declared_funcs: FxHashMap<String, FuncRef>,
}

impl ModuleBuilder {
    pub fn new(ast: AstContext) -> Self {
        Self {
            ast,
            funcs: PrimaryMap::default(),
            declared_funcs: FxHashMap::default(),
        }
    }

    /// Declares a function. Re-declaring a name returns the existing
    /// reference and leaves the first declaration untouched.
    pub fn declare_function(&mut self, sig: Signature, loc: Location) -> FuncRef {
        if let Some(func_ref) = self.declared_funcs.get(sig.name()) {
            *func_ref
        } else {
            let name = sig.name().to_string();
            let func_ref = self.funcs.push(Function::new(sig, loc));
            self.declared_funcs.insert(name, func_ref);
            func_ref
        }
    }

    pub fn lookup_func(&self, name: &str) -> Option<FuncRef> {
        self.declared_funcs.get(name).copied()
    }

    pub fn sig(&self, func_ref: FuncRef) -> &Signature {
        &self.funcs[func_ref].sig
    }

    pub fn make_ast_node(&mut self, kind: AstNodeKind, range: SourceRange) -> AstNodeRef {
        self.ast.make_node(kind, range)
    }

    pub fn nominal_type(&mut self, name: &str) -> Type {
        self.ast.types.make_nominal(name)
    }

    pub fn func_builder(&mut self, func_ref: FuncRef) -> FunctionBuilder<'_> {
        FunctionBuilder::new(&mut self.funcs[func_ref])
    }

    /// Returns a builder for `func_ref` together with the AST context, so that
    /// nominal types can still be interned while the function is built.
    pub fn func_builder_with_ast(
        &mut self,
        func_ref: FuncRef,
    ) -> (FunctionBuilder<'_>, &mut AstContext) {
        (FunctionBuilder::new(&mut self.funcs[func_ref]), &mut self.ast)
    }

    pub fn build(self) -> Module {
        Module {
            ast: self.ast,
            funcs: self.funcs,
        }
    }
}
