//! Dataflow diagnostics for the sluice IR.
//!
//! After constant folding and dead code elimination, some source-level
//! errors become visible in the IR: an `unreachable` left at the end of a
//! function body, a `switch` that no case matched, a `noreturn` function
//! that still returns, or a `static_report` whose condition folded to true.
//! [`EmitDataflowDiagnostics`] finds them and maps them back to the source
//! construct they came from.
mod checks;
mod config;
mod diagnostic;
mod error;
mod pass;
mod report;
mod sink;

use rayon::prelude::*;
use sluice_ir::{AstContext, FuncRef, Function, Module};
use sluice_parser::{parse_module, ParsedModule};
use thiserror::Error;

pub use config::DiagnosticsConfig;
pub use diagnostic::{Diagnostic, DiagnosticArg, DiagnosticKind};
pub use error::{InternalError, InvariantViolation};
pub use pass::EmitDataflowDiagnostics;
pub use report::DiagnosticReport;
pub use sink::DiagnosticSink;

pub fn emit_function_diagnostics(
    ast: &AstContext,
    func_ref: FuncRef,
    func: &Function,
    cfg: &DiagnosticsConfig,
    sink: &mut impl DiagnosticSink,
) -> Result<(), InternalError> {
    EmitDataflowDiagnostics::new(ast, cfg).run(func_ref, func, sink)
}

/// Runs the pass over every function of `module` in parallel.
///
/// Diagnostics are reported grouped by function in declaration order, each
/// group in the order its function's run emitted them. If several functions
/// fail, the error of the first one in declaration order is returned.
pub fn emit_module_diagnostics(
    module: &Module,
    cfg: &DiagnosticsConfig,
) -> Result<DiagnosticReport, InternalError> {
    let pass = EmitDataflowDiagnostics::new(&module.ast, cfg);
    let funcs: Vec<_> = module.iter_functions().collect();

    let mut func_results: Vec<_> = funcs
        .into_par_iter()
        .map(|func_ref| {
            let mut diags = Vec::new();
            let result = pass.run(func_ref, &module.funcs[func_ref], &mut diags);
            (func_ref, result.map(|()| diags))
        })
        .collect();

    func_results.sort_by_key(|(func_ref, _)| func_ref.as_u32());

    let mut report = DiagnosticReport::with_limit(cfg.max_diagnostics);
    for (_, result) in func_results {
        report.extend_with_limit(result?);
    }

    Ok(report)
}

/// Like [`emit_module_diagnostics`], but aborts on IR that breaks the
/// pass's invariants.
///
/// # Panics
/// Panics with the [`InternalError`] message if the IR is malformed.
pub fn emit_module_diagnostics_or_panic(
    module: &Module,
    cfg: &DiagnosticsConfig,
) -> DiagnosticReport {
    match emit_module_diagnostics(module, cfg) {
        Ok(report) => report,
        Err(err) => panic!("SLUICE_DATAFLOW_DIAGNOSTICS_FAILURE: {err}"),
    }
}

#[derive(Debug, Error)]
pub enum DiagnoseError {
    #[error("failed to parse module: {} error(s)", .0.len())]
    Parse(Vec<sluice_parser::Error>),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// Parses a textual module and runs the pass over it.
pub fn parse_and_diagnose(
    input: &str,
    cfg: &DiagnosticsConfig,
) -> Result<(ParsedModule, DiagnosticReport), DiagnoseError> {
    let parsed = parse_module(input).map_err(DiagnoseError::Parse)?;
    let report = emit_module_diagnostics(&parsed.module, cfg)?;
    Ok((parsed, report))
}
