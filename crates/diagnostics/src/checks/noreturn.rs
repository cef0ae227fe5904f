use sluice_ir::{Origin, ResolvedLoc};

use super::FuncCtx;
use crate::Diagnostic;

/// Diagnoses a `br` or `return` that hands control back to the caller of a
/// `noreturn` function.
///
/// Only edges lowered from an explicit or implicit `return` count. Closures
/// are not checked.
pub(crate) fn check(ctx: &FuncCtx, loc: Option<ResolvedLoc>) -> Option<Diagnostic> {
    let from_decl = ctx
        .origin
        .is_some_and(|origin| origin.origin == Origin::FuncDecl);
    if !from_decl || !ctx.func.sig.is_noreturn() {
        return None;
    }

    let loc = loc?;
    matches!(loc.origin, Origin::Return | Origin::ImplicitReturn)
        .then(|| Diagnostic::return_from_noreturn(loc.start()))
}
