use smallvec::SmallVec;

use crate::{
    module::FuncRef, BlockId, Builtin, Function, Inst, InstId, Location, Type, Value, ValueId,
};

/// Appends blocks and instructions to a [`Function`].
///
/// Every inserted instruction takes the builder's current location, set with
/// [`FunctionBuilder::set_location`]. A fresh builder inserts instructions
/// with [`Location::Invalid`].
pub struct FunctionBuilder<'a> {
    pub func: &'a mut Function,
    current_block: Option<BlockId>,
    loc: Location,
}

impl<'a> FunctionBuilder<'a> {
    pub fn new(func: &'a mut Function) -> Self {
        Self {
            func,
            current_block: None,
            loc: Location::Invalid,
        }
    }

    pub fn args(&self) -> &[ValueId] {
        &self.func.arg_values
    }

    pub fn append_block(&mut self) -> BlockId {
        let block = self.make_block();
        self.insert_block(block);
        block
    }

    /// Creates a block without placing it in the layout.
    pub fn make_block(&mut self) -> BlockId {
        self.func.dfg.make_block()
    }

    /// Places a block made by [`Self::make_block`] after the last block of
    /// the layout.
    pub fn insert_block(&mut self, block: BlockId) {
        self.func.layout.append_block(block);
    }

    pub fn append_block_param(&mut self, block: BlockId, ty: Type) -> ValueId {
        self.func.dfg.make_block_param(block, ty)
    }

    pub fn switch_to_block(&mut self, block: BlockId) {
        self.current_block = Some(block);
    }

    pub fn current_block(&self) -> Option<BlockId> {
        self.current_block
    }

    pub fn set_location(&mut self, loc: Location) {
        self.loc = loc;
    }

    pub fn location(&self) -> Location {
        self.loc
    }

    /// Appends `inst` to the current block and returns its id.
    ///
    /// # Panics
    /// Panics if no block was selected with [`Self::switch_to_block`].
    pub fn insert_inst_no_result(&mut self, inst: Inst) -> InstId {
        let block = self
            .current_block
            .expect("no block selected; call `switch_to_block` first");
        let inst_id = self.func.dfg.make_inst(inst, self.loc);
        self.func.layout.append_inst(inst_id, block);
        inst_id
    }

    /// Appends `inst` to the current block and returns a `ValueId` for its
    /// result of type `ret_ty`.
    pub fn insert_inst(&mut self, inst: Inst, ret_ty: Type) -> ValueId {
        let inst_id = self.insert_inst_no_result(inst);
        let result = self.func.dfg.make_value(Value::Inst {
            inst: inst_id,
            ty: ret_ty,
        });
        self.func.dfg.attach_result(inst_id, result);
        result
    }

    pub fn integer_literal(&mut self, value: i128, ty: Type) -> ValueId {
        self.insert_inst(Inst::IntegerLiteral { value }, ty)
    }

    pub fn builtin_ref(&mut self, builtin: Builtin) -> ValueId {
        self.insert_inst(Inst::BuiltinRef { builtin }, Type::Fn)
    }

    pub fn function_ref(&mut self, func: FuncRef) -> ValueId {
        self.insert_inst(Inst::FunctionRef { func }, Type::Fn)
    }

    pub fn apply(&mut self, callee: ValueId, args: &[ValueId], ret_ty: Type) -> ValueId {
        let args = SmallVec::from_slice(args);
        self.insert_inst(Inst::Apply { callee, args }, ret_ty)
    }

    pub fn br(&mut self, dest: BlockId, args: &[ValueId]) -> InstId {
        let args = SmallVec::from_slice(args);
        self.insert_inst_no_result(Inst::Br { dest, args })
    }

    pub fn cond_br(&mut self, cond: ValueId, then_dest: BlockId, else_dest: BlockId) -> InstId {
        self.insert_inst_no_result(Inst::CondBr {
            cond,
            then_dest,
            else_dest,
        })
    }

    pub fn ret(&mut self, arg: Option<ValueId>) -> InstId {
        self.insert_inst_no_result(Inst::Return { arg })
    }

    pub fn unreachable(&mut self) -> InstId {
        self.insert_inst_no_result(Inst::Unreachable)
    }
}
