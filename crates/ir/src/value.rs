//! This module contains sluice IR value definition.
use cranelift_entity::entity_impl;

use crate::{BlockId, InstId, Type};

/// An opaque reference to [`Value`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueId(pub u32);
entity_impl!(ValueId, "v");

/// A value data definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// The value is defined by an instruction.
    Inst { inst: InstId, ty: Type },

    /// The value is a function argument.
    Arg { ty: Type, idx: usize },

    /// The value is a block parameter, bound by the branches into `block`.
    BlockParam {
        block: BlockId,
        ty: Type,
        idx: usize,
    },
}

impl Value {
    pub fn ty(&self) -> Type {
        match self {
            Self::Inst { ty, .. } | Self::Arg { ty, .. } | Self::BlockParam { ty, .. } => *ty,
        }
    }
}
