//! This module contains the sluice IR data flow graph.
use cranelift_entity::{entity_impl, packed_option::PackedOption, PrimaryMap, SecondaryMap};
use smallvec::SmallVec;

use crate::{inst::InstData, Inst, InstId, Location, Type, Value, ValueId};

#[derive(Debug, Default, Clone)]
pub struct DataFlowGraph {
    #[doc(hidden)]
    pub blocks: PrimaryMap<BlockId, Block>,
    #[doc(hidden)]
    pub values: PrimaryMap<ValueId, Value>,
    insts: PrimaryMap<InstId, InstData>,
    inst_results: SecondaryMap<InstId, PackedOption<ValueId>>,
}

impl DataFlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn make_block(&mut self) -> BlockId {
        self.blocks.push(Block::new())
    }

    pub fn make_value(&mut self, value: Value) -> ValueId {
        self.values.push(value)
    }

    pub fn make_inst(&mut self, inst: Inst, loc: Location) -> InstId {
        self.insts.push(InstData { inst, loc })
    }

    pub fn make_block_param(&mut self, block: BlockId, ty: Type) -> ValueId {
        let idx = self.blocks[block].params.len();
        let value = self.make_value(Value::BlockParam { block, ty, idx });
        self.blocks[block].params.push(value);
        value
    }

    pub fn attach_result(&mut self, inst_id: InstId, value_id: ValueId) {
        debug_assert!(self.inst_results[inst_id].is_none());
        self.inst_results[inst_id] = value_id.into();
    }

    pub fn inst(&self, inst_id: InstId) -> &Inst {
        &self.insts[inst_id].inst
    }

    pub fn inst_loc(&self, inst_id: InstId) -> Location {
        self.insts[inst_id].loc
    }

    pub fn value(&self, value_id: ValueId) -> &Value {
        &self.values[value_id]
    }

    pub fn get_value(&self, value_id: ValueId) -> Option<&Value> {
        self.values.get(value_id)
    }

    pub fn value_ty(&self, value_id: ValueId) -> Type {
        self.values[value_id].ty()
    }

    pub fn inst_result(&self, inst_id: InstId) -> Option<ValueId> {
        self.inst_results[inst_id].expand()
    }

    /// Returns the instruction defining `value_id`, if it is an instruction
    /// result.
    pub fn value_inst(&self, value_id: ValueId) -> Option<InstId> {
        match self.values.get(value_id)? {
            Value::Inst { inst, .. } => Some(*inst),
            _ => None,
        }
    }

    pub fn value_def(&self, value_id: ValueId) -> Option<&Inst> {
        self.value_inst(value_id).map(|inst| self.inst(inst))
    }

    pub fn block_params(&self, block: BlockId) -> &[ValueId] {
        &self.blocks[block].params
    }

    pub fn is_terminator(&self, inst: InstId) -> bool {
        self.inst(inst).is_terminator()
    }
}

/// An opaque reference to [`Block`]
#[derive(Clone, PartialEq, Eq, Copy, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);
entity_impl!(BlockId, "block");

/// A block data definition.
/// A Block data doesn't hold any information for layout of a program. It is managed by
/// [`super::layout::Layout`].
#[derive(Debug, Clone, Default)]
pub struct Block {
    params: SmallVec<[ValueId; 4]>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }
}
