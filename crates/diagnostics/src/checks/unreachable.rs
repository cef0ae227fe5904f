use sluice_ir::{Origin, ResolvedLoc};

use super::FuncCtx;
use crate::{error::InvariantViolation, Diagnostic};

/// Diagnoses an `unreachable` terminator left behind by the optimizer.
///
/// An `unreachable` attributed to a function or closure body means control
/// falls off its end; one attributed to a `switch` means no case matched.
pub(crate) fn check(
    ctx: &FuncCtx,
    loc: Option<ResolvedLoc>,
) -> Result<Option<Diagnostic>, InvariantViolation> {
    let Some(loc) = loc else {
        return Ok(None);
    };

    // The epilog of a body is lowered with an implicit return location on
    // the function or closure itself, so both kinds count.
    match loc.origin {
        Origin::FuncDecl | Origin::ClosureExpr | Origin::ImplicitReturn => {
            missing_return(ctx, loc)
        }
        Origin::SwitchStmt => Ok(Some(Diagnostic::non_exhaustive_switch(loc.end()))),
        Origin::Return | Origin::Other(_) => Ok(None),
    }
}

fn missing_return(
    ctx: &FuncCtx,
    loc: ResolvedLoc,
) -> Result<Option<Diagnostic>, InvariantViolation> {
    // The wording follows the function's own origin, not the node the
    // `unreachable` points at.
    let is_closure = match ctx.origin.map(|origin| origin.origin) {
        Some(Origin::FuncDecl) => false,
        Some(Origin::ClosureExpr) => true,
        origin => return Err(InvariantViolation::UnexpectedFunctionOrigin { origin }),
    };

    let sig = &ctx.func.sig;
    if sig.ret_ty().is_unit() || sig.is_noreturn() {
        return Ok(None);
    }

    let ret_ty = sig.ret_ty().display(ctx.ast).to_string();
    Ok(Some(Diagnostic::missing_return(loc.end(), ret_ty, is_closure)))
}
