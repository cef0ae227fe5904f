use sluice_ir::{BlockId, FuncRef, InstId, LocationError, Origin, ValueId};
use thiserror::Error;

/// A broken invariant of the IR handed to the pass.
///
/// These are never source diagnostics: they mean an earlier stage of the
/// pipeline produced malformed IR.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("internal error in function `{func_name}`{}: {violation}", fmt_inst(.inst))]
pub struct InternalError {
    pub func: FuncRef,
    pub func_name: String,
    pub inst: Option<InstId>,
    pub violation: InvariantViolation,
}

fn fmt_inst(inst: &Option<InstId>) -> String {
    match inst {
        Some(inst) => format!(" at {inst}"),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("{block} does not end with a terminator")]
    MissingTerminator { block: BlockId },

    #[error("terminator {inst} is not the last instruction of {block}")]
    TerminatorNotLast { block: BlockId, inst: InstId },

    #[error("{inst} is laid out in {block} but the layout records another block")]
    InstBlockMismatch { inst: InstId, block: BlockId },

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error("function must originate from a function declaration or a closure, found {}", fmt_origin(.origin))]
    UnexpectedFunctionOrigin { origin: Option<Origin> },

    #[error("`static_report` is applied without arguments")]
    StaticReportArity,

    #[error("{value} is not defined in the function")]
    DanglingValue { value: ValueId },
}

fn fmt_origin(origin: &Option<Origin>) -> String {
    match origin {
        None => "an invalid location".to_string(),
        Some(Origin::Other(kind)) => format!("a `{kind}` node"),
        Some(origin) => format!("{origin:?}"),
    }
}
