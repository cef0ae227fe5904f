//! The diagnosers run by [`crate::EmitDataflowDiagnostics`].
//!
//! Each check inspects a single instruction and produces at most one
//! diagnostic. Checks never look at other blocks: reachability has already
//! been decided by the optimizer.
pub(crate) mod noreturn;
pub(crate) mod static_report;
pub(crate) mod unreachable;

use sluice_ir::{AstContext, Function, Inst, ResolvedLoc, ValueId};

use crate::error::InvariantViolation;

/// The function under inspection.
pub(crate) struct FuncCtx<'a> {
    pub ast: &'a AstContext,
    pub func: &'a Function,
    /// The resolved location of the function itself; `None` if it is
    /// invalid.
    pub origin: Option<ResolvedLoc>,
}

impl FuncCtx<'_> {
    /// Returns the instruction defining `value`, or `None` for arguments and
    /// block parameters.
    pub fn value_def(&self, value: ValueId) -> Result<Option<&Inst>, InvariantViolation> {
        if self.func.dfg.get_value(value).is_none() {
            return Err(InvariantViolation::DanglingValue { value });
        }
        Ok(self.func.dfg.value_def(value))
    }
}
