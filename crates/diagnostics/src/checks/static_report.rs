use sluice_ir::{Builtin, Inst, ResolvedLoc, ValueId};

use super::FuncCtx;
use crate::{error::InvariantViolation, Diagnostic};

/// Diagnoses `apply` of the `static_report` builtin whose condition was
/// folded to `1`.
///
/// A condition that is not an integer literal was not folded and stays
/// silent, as does a literal `0`.
pub(crate) fn check(
    ctx: &FuncCtx,
    callee: ValueId,
    args: &[ValueId],
    loc: Option<ResolvedLoc>,
) -> Result<Option<Diagnostic>, InvariantViolation> {
    if !matches!(
        ctx.value_def(callee)?,
        Some(Inst::BuiltinRef {
            builtin: Builtin::StaticReport
        })
    ) {
        return Ok(None);
    }

    let Some(&cond) = args.first() else {
        return Err(InvariantViolation::StaticReportArity);
    };

    match ctx.value_def(cond)? {
        Some(Inst::IntegerLiteral { value: 1 }) => Ok(Some(Diagnostic::static_report_error(
            loc.map(|loc| loc.start()),
        ))),
        _ => Ok(None),
    }
}
