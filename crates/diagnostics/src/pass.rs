use sluice_ir::{AstContext, BlockId, FuncRef, Function, Inst, InstId};
use tracing::{debug, error, trace};

use crate::{
    checks::{noreturn, static_report, unreachable, FuncCtx},
    error::{InternalError, InvariantViolation},
    DiagnosticSink, DiagnosticsConfig,
};

/// Emits the diagnostics that only become decidable once the optimizer has
/// folded constants and removed dead code.
///
/// The pass never modifies the IR. Running it twice on the same function
/// emits the same diagnostics in the same order.
pub struct EmitDataflowDiagnostics<'a> {
    ast: &'a AstContext,
    cfg: &'a DiagnosticsConfig,
}

impl<'a> EmitDataflowDiagnostics<'a> {
    pub fn new(ast: &'a AstContext, cfg: &'a DiagnosticsConfig) -> Self {
        Self { ast, cfg }
    }

    /// Visits every instruction of `func` once, in layout order, and emits
    /// the diagnostics found into `sink`.
    ///
    /// Diagnostics emitted before an [`InternalError`] is detected stay in
    /// the sink.
    pub fn run(
        &self,
        func_ref: FuncRef,
        func: &Function,
        sink: &mut impl DiagnosticSink,
    ) -> Result<(), InternalError> {
        debug!(func = func.name(), "emitting dataflow diagnostics");

        self.run_inner(func, sink).map_err(|(inst, violation)| {
            let err = InternalError {
                func: func_ref,
                func_name: func.name().to_string(),
                inst,
                violation,
            };
            error!(%err, "dataflow diagnostics aborted");
            err
        })
    }

    fn run_inner(
        &self,
        func: &Function,
        sink: &mut impl DiagnosticSink,
    ) -> Result<(), (Option<InstId>, InvariantViolation)> {
        let origin = self
            .ast
            .resolve(func.loc)
            .map_err(|err| (None, err.into()))?;
        let ctx = FuncCtx {
            ast: self.ast,
            func,
            origin,
        };

        for block in func.layout.iter_block() {
            check_block_shape(func, block)?;

            for inst in func.layout.iter_inst(block) {
                let diag = self
                    .visit_inst(&ctx, inst)
                    .map_err(|violation| (Some(inst), violation))?;

                if let Some(diag) = diag {
                    trace!(%diag, %inst, "emit");
                    sink.emit(diag);
                }
            }
        }

        Ok(())
    }

    fn visit_inst(
        &self,
        ctx: &FuncCtx,
        inst: InstId,
    ) -> Result<Option<crate::Diagnostic>, InvariantViolation> {
        let loc = self.ast.resolve(ctx.func.dfg.inst_loc(inst))?;

        match ctx.func.dfg.inst(inst) {
            Inst::Unreachable => {
                if self.cfg.check_unreachable {
                    return unreachable::check(ctx, loc);
                }
            }

            Inst::Br { .. } | Inst::Return { .. } => {
                if self.cfg.check_noreturn {
                    return Ok(noreturn::check(ctx, loc));
                }
            }

            Inst::Apply { callee, args } => {
                if self.cfg.check_static_reports {
                    return static_report::check(ctx, *callee, args, loc);
                }
            }

            Inst::CondBr { .. }
            | Inst::IntegerLiteral { .. }
            | Inst::BuiltinRef { .. }
            | Inst::FunctionRef { .. } => {}
        }

        Ok(None)
    }
}

/// Checks that `block` ends with its only terminator and that the layout
/// agrees on where each instruction lives.
fn check_block_shape(
    func: &Function,
    block: BlockId,
) -> Result<(), (Option<InstId>, InvariantViolation)> {
    let Some(last) = func.layout.last_inst_of(block) else {
        return Err((None, InvariantViolation::MissingTerminator { block }));
    };
    if !func.dfg.is_terminator(last) {
        return Err((Some(last), InvariantViolation::MissingTerminator { block }));
    }

    for inst in func.layout.iter_inst(block) {
        if func.layout.inst_block(inst) != Some(block) {
            return Err((
                Some(inst),
                InvariantViolation::InstBlockMismatch { inst, block },
            ));
        }
        if inst != last && func.dfg.is_terminator(inst) {
            return Err((
                Some(inst),
                InvariantViolation::TerminatorNotLast { block, inst },
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use sluice_ir::{
        builder::{test_util::test_func_decl, ModuleBuilder},
        AstNodeKind, Builtin, Location, LocationError, Module, SourceRange, Type,
    };

    use super::*;
    use crate::{Diagnostic, DiagnosticKind};

    /// A function exercising every check: a folded `static_report`, a switch
    /// that fell through, and a missing return in another block.
    fn mixed_module() -> (Module, FuncRef) {
        let mut mb = ModuleBuilder::default();
        let int = mb.nominal_type("Int");
        let (func_ref, func_node) =
            test_func_decl(&mut mb, int, false, SourceRange::new(0, 200));
        let call = mb.make_ast_node(AstNodeKind::CallExpr, SourceRange::new(150, 170));
        let switch = mb.make_ast_node(AstNodeKind::SwitchStmt, SourceRange::new(20, 100));

        let mut builder = mb.func_builder(func_ref);
        let b0 = builder.append_block();
        let b1 = builder.append_block();
        let b2 = builder.append_block();

        builder.switch_to_block(b0);
        let cond = builder.integer_literal(1, Type::I1);
        builder.cond_br(cond, b1, b2);

        builder.switch_to_block(b1);
        builder.set_location(Location::regular(switch));
        builder.unreachable();

        builder.switch_to_block(b2);
        builder.set_location(Location::Invalid);
        let report = builder.builtin_ref(Builtin::StaticReport);
        let one = builder.integer_literal(1, Type::I1);
        builder.set_location(Location::regular(call));
        builder.apply(report, &[one], Type::Unit);
        builder.set_location(Location::regular(func_node));
        builder.unreachable();

        (mb.build(), func_ref)
    }

    #[test]
    fn block_then_instruction_order() {
        let (module, func_ref) = mixed_module();
        let cfg = DiagnosticsConfig::default();
        let pass = EmitDataflowDiagnostics::new(&module.ast, &cfg);

        let mut sink: Vec<Diagnostic> = Vec::new();
        pass.run(func_ref, &module.funcs[func_ref], &mut sink).unwrap();

        let kinds: Vec<_> = sink.iter().map(|diag| diag.kind).collect();
        assert_eq!(
            kinds,
            [
                DiagnosticKind::NonExhaustiveSwitch,
                DiagnosticKind::StaticReportError,
                DiagnosticKind::MissingReturn,
            ]
        );
        let positions: Vec<_> = sink
            .iter()
            .map(|diag| diag.pos.unwrap().as_u32())
            .collect();
        assert_eq!(positions, [100, 150, 200]);
    }

    #[test]
    fn idempotent() {
        let (module, func_ref) = mixed_module();
        let cfg = DiagnosticsConfig::default();
        let pass = EmitDataflowDiagnostics::new(&module.ast, &cfg);
        let func = &module.funcs[func_ref];

        let mut first: Vec<Diagnostic> = Vec::new();
        let mut second: Vec<Diagnostic> = Vec::new();
        pass.run(func_ref, func, &mut first).unwrap();
        pass.run(func_ref, func, &mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn checks_can_be_disabled() {
        let (module, func_ref) = mixed_module();
        let cfg = DiagnosticsConfig {
            check_unreachable: false,
            ..Default::default()
        };
        let pass = EmitDataflowDiagnostics::new(&module.ast, &cfg);

        let mut sink: Vec<Diagnostic> = Vec::new();
        pass.run(func_ref, &module.funcs[func_ref], &mut sink).unwrap();
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].kind, DiagnosticKind::StaticReportError);
    }

    #[test]
    fn missing_terminator() {
        let mut mb = ModuleBuilder::default();
        let (func_ref, _) = test_func_decl(&mut mb, Type::Unit, false, SourceRange::new(0, 10));
        let mut builder = mb.func_builder(func_ref);
        let b0 = builder.append_block();
        builder.switch_to_block(b0);
        let lit = builder.integer_literal(0, Type::I8);
        let module = mb.build();

        let cfg = DiagnosticsConfig::default();
        let pass = EmitDataflowDiagnostics::new(&module.ast, &cfg);
        let err = pass
            .run(func_ref, &module.funcs[func_ref], &mut Vec::<Diagnostic>::new())
            .unwrap_err();
        assert_eq!(err.inst, module.funcs[func_ref].dfg.value_inst(lit));
        assert_eq!(err.violation, InvariantViolation::MissingTerminator { block: b0 });
        insta::assert_snapshot!(
            err,
            @"internal error in function `test_func` at inst0: block0 does not end with a terminator"
        );
    }

    #[test]
    fn empty_block() {
        let mut mb = ModuleBuilder::default();
        let (func_ref, _) = test_func_decl(&mut mb, Type::Unit, false, SourceRange::new(0, 10));
        let b0 = mb.func_builder(func_ref).append_block();
        let module = mb.build();

        let cfg = DiagnosticsConfig::default();
        let pass = EmitDataflowDiagnostics::new(&module.ast, &cfg);
        let err = pass
            .run(func_ref, &module.funcs[func_ref], &mut Vec::<Diagnostic>::new())
            .unwrap_err();
        assert_eq!(err.inst, None);
        assert_eq!(err.violation, InvariantViolation::MissingTerminator { block: b0 });
    }

    #[test]
    fn terminator_not_last() {
        let mut mb = ModuleBuilder::default();
        let (func_ref, _) = test_func_decl(&mut mb, Type::Unit, false, SourceRange::new(0, 10));
        let mut builder = mb.func_builder(func_ref);
        let b0 = builder.append_block();
        builder.switch_to_block(b0);
        let early = builder.ret(None);
        builder.unreachable();
        let module = mb.build();

        let cfg = DiagnosticsConfig::default();
        let pass = EmitDataflowDiagnostics::new(&module.ast, &cfg);
        let err = pass
            .run(func_ref, &module.funcs[func_ref], &mut Vec::<Diagnostic>::new())
            .unwrap_err();
        assert_eq!(
            err.violation,
            InvariantViolation::TerminatorNotLast {
                block: b0,
                inst: early
            }
        );
    }

    #[test]
    fn inconsistent_location() {
        let mut mb = ModuleBuilder::default();
        let (func_ref, func_node) =
            test_func_decl(&mut mb, Type::Unit, false, SourceRange::new(0, 10));
        let mut builder = mb.func_builder(func_ref);
        let b0 = builder.append_block();
        builder.switch_to_block(b0);
        builder.set_location(Location::ret(func_node));
        let ret = builder.ret(None);
        let module = mb.build();

        let cfg = DiagnosticsConfig::default();
        let pass = EmitDataflowDiagnostics::new(&module.ast, &cfg);
        let err = pass
            .run(func_ref, &module.funcs[func_ref], &mut Vec::<Diagnostic>::new())
            .unwrap_err();
        assert_eq!(err.inst, Some(ret));
        assert_eq!(
            err.violation,
            InvariantViolation::Location(LocationError::ReturnOnNonReturnStmt {
                found: AstNodeKind::FuncDecl
            })
        );
    }
}
