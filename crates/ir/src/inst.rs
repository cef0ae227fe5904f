//! Instructions of the sluice IR.
//!
//! The instruction set is a closed enum so that every consumer matches on it
//! exhaustively; adding a terminator forces every analysis to be revisited.
use std::fmt;

use cranelift_entity::entity_impl;
use smallvec::SmallVec;

use crate::{module::FuncRef, BlockId, Location, ValueId};

/// An opaque reference to [`InstData`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstId(pub u32);
entity_impl!(InstId, "inst");

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Inst {
    /// An integer constant, typically produced by constant folding.
    IntegerLiteral { value: i128 },
    /// A reference to a compiler intrinsic.
    BuiltinRef { builtin: Builtin },
    /// A reference to a function of the module.
    FunctionRef { func: FuncRef },
    /// A call of `callee` with `args`.
    Apply {
        callee: ValueId,
        args: SmallVec<[ValueId; 4]>,
    },
    /// Unconditional branch passing `args` to the parameters of `dest`.
    Br {
        dest: BlockId,
        args: SmallVec<[ValueId; 4]>,
    },
    CondBr {
        cond: ValueId,
        then_dest: BlockId,
        else_dest: BlockId,
    },
    Return { arg: Option<ValueId> },
    /// Asserts that control never reaches this point.
    Unreachable,
}

impl Inst {
    pub fn is_terminator(&self) -> bool {
        match self {
            Self::Br { .. } | Self::CondBr { .. } | Self::Return { .. } | Self::Unreachable => true,
            Self::IntegerLiteral { .. }
            | Self::BuiltinRef { .. }
            | Self::FunctionRef { .. }
            | Self::Apply { .. } => false,
        }
    }

    /// Returns the successor blocks of a terminator.
    pub fn dests(&self) -> SmallVec<[BlockId; 2]> {
        match self {
            Self::Br { dest, .. } => smallvec::smallvec![*dest],
            Self::CondBr {
                then_dest,
                else_dest,
                ..
            } => smallvec::smallvec![*then_dest, *else_dest],
            _ => SmallVec::new(),
        }
    }

    pub fn visit_values(&self, f: &mut impl FnMut(ValueId)) {
        match self {
            Self::Apply { callee, args } => {
                f(*callee);
                args.iter().copied().for_each(f);
            }
            Self::Br { args, .. } => args.iter().copied().for_each(f),
            Self::CondBr { cond, .. } => f(*cond),
            Self::Return { arg } => {
                if let Some(arg) = arg {
                    f(*arg)
                }
            }
            Self::IntegerLiteral { .. }
            | Self::BuiltinRef { .. }
            | Self::FunctionRef { .. }
            | Self::Unreachable => {}
        }
    }

    pub fn as_text(&self) -> &'static str {
        match self {
            Self::IntegerLiteral { .. } => "integer_literal",
            Self::BuiltinRef { .. } => "builtin_ref",
            Self::FunctionRef { .. } => "function_ref",
            Self::Apply { .. } => "apply",
            Self::Br { .. } => "br",
            Self::CondBr { .. } => "cond_br",
            Self::Return { .. } => "return",
            Self::Unreachable => "unreachable",
        }
    }
}

/// An instruction together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstData {
    pub inst: Inst,
    pub loc: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `static_report(cond, is_error, message)`: diagnoses at compile time
    /// once `cond` is folded to `1`.
    StaticReport,
    CondFail,
    Add,
    Sub,
    Mul,
    CmpEq,
    CmpSlt,
}

impl Builtin {
    pub fn by_name(name: &str) -> Option<Self> {
        let builtin = match name {
            "static_report" => Self::StaticReport,
            "cond_fail" => Self::CondFail,
            "add" => Self::Add,
            "sub" => Self::Sub,
            "mul" => Self::Mul,
            "cmp_eq" => Self::CmpEq,
            "cmp_slt" => Self::CmpSlt,
            _ => return None,
        };
        Some(builtin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StaticReport => "static_report",
            Self::CondFail => "cond_fail",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::CmpEq => "cmp_eq",
            Self::CmpSlt => "cmp_slt",
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use cranelift_entity::EntityRef;
    use smallvec::smallvec;

    use super::*;

    #[test]
    fn terminators() {
        let b0 = BlockId::new(0);
        let b1 = BlockId::new(1);
        let v0 = ValueId::new(0);

        assert!(Inst::Unreachable.is_terminator());
        assert!(Inst::Return { arg: None }.is_terminator());
        assert!(Inst::Br {
            dest: b0,
            args: SmallVec::new()
        }
        .is_terminator());
        assert!(!Inst::IntegerLiteral { value: 1 }.is_terminator());
        assert!(!Inst::Apply {
            callee: v0,
            args: smallvec![v0]
        }
        .is_terminator());

        let cond_br = Inst::CondBr {
            cond: v0,
            then_dest: b0,
            else_dest: b1,
        };
        assert_eq!(cond_br.dests().as_slice(), &[b0, b1]);
        assert!(Inst::Unreachable.dests().is_empty());
    }

    #[test]
    fn visit_apply_operands() {
        let callee = ValueId::new(3);
        let args: SmallVec<[ValueId; 4]> = smallvec![ValueId::new(1), ValueId::new(2)];
        let apply = Inst::Apply { callee, args };

        let mut seen = vec![];
        apply.visit_values(&mut |v| seen.push(v));
        assert_eq!(seen, vec![ValueId::new(3), ValueId::new(1), ValueId::new(2)]);
    }

    #[test]
    fn builtin_names_round_trip() {
        for name in ["static_report", "cond_fail", "add", "cmp_slt"] {
            assert_eq!(Builtin::by_name(name).unwrap().as_str(), name);
        }
        assert_eq!(Builtin::by_name("static_assert"), None);
    }
}
