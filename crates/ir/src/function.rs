use smallvec::SmallVec;

use super::{DataFlowGraph, Layout, Location, Type, ValueId};

#[derive(Debug, Clone)]
pub struct Function {
    pub sig: Signature,
    /// The construct the function was lowered from: a function declaration
    /// or a closure expression.
    pub loc: Location,
    pub arg_values: SmallVec<[ValueId; 8]>,
    pub dfg: DataFlowGraph,
    pub layout: Layout,
}

impl Function {
    pub fn new(sig: Signature, loc: Location) -> Self {
        let mut dfg = DataFlowGraph::new();
        let arg_values = sig
            .args()
            .iter()
            .enumerate()
            .map(|(idx, arg_ty)| dfg.make_value(crate::Value::Arg { ty: *arg_ty, idx }))
            .collect();

        Self {
            sig,
            loc,
            arg_values,
            dfg,
            layout: Layout::default(),
        }
    }

    pub fn name(&self) -> &str {
        self.sig.name()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    /// Name of the function.
    name: String,

    args: SmallVec<[Type; 8]>,
    ret_ty: Type,

    /// The function never returns control to its caller.
    noreturn: bool,
}

impl Signature {
    pub fn new(name: &str, args: &[Type], ret_ty: Type) -> Self {
        Self {
            name: name.to_string(),
            args: args.into(),
            ret_ty,
            noreturn: false,
        }
    }

    pub fn with_noreturn(mut self, noreturn: bool) -> Self {
        self.noreturn = noreturn;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Type] {
        &self.args
    }

    pub fn ret_ty(&self) -> Type {
        self.ret_ty
    }

    pub fn is_noreturn(&self) -> bool {
        self.noreturn
    }
}
