use sluice_diagnostics::{
    emit_function_diagnostics, emit_module_diagnostics, emit_module_diagnostics_or_panic,
    parse_and_diagnose, DiagnoseError, DiagnosticKind, DiagnosticReport, DiagnosticsConfig,
    InvariantViolation,
};
use sluice_ir::{AstNodeKind, Origin};
use sluice_parser::parse_module;

const MANY_FUNCS: &str = r#"
ast {
    #0: func_decl 0..100;
    #1: switch_stmt 10..50;
    #2: func_decl 100..200;
    #3: func_decl 200..300;
    #4: return_stmt 210..220;
}

func %a() -> Int @ #0 {
    block0:
        unreachable @ #1;
}

func %b() -> Int @ #2 {
    block0:
        unreachable @ #2;
}

func %c() -> unit noreturn @ #3 {
    block0:
        return @ return #4;
}

func %d() -> Int @ #0 {
    block0:
        unreachable @ #1;
    block1:
        unreachable @ #0;
}
"#;

#[test]
fn functions_in_declaration_order() {
    let parsed = parse_module(MANY_FUNCS).unwrap();
    let cfg = DiagnosticsConfig::default();

    let report = emit_module_diagnostics(&parsed.module, &cfg).unwrap();
    insta::assert_snapshot!(report, @r"
    error [DF0002] switch must be exhaustive @ 50
    error [DF0001] missing return in a function expected to return 'Int' @ 200
    error [DF0003] return from a 'noreturn' function @ 210
    error [DF0002] switch must be exhaustive @ 50
    error [DF0001] missing return in a function expected to return 'Int' @ 100
    ");

    for _ in 0..8 {
        let again = emit_module_diagnostics(&parsed.module, &cfg).unwrap();
        assert_eq!(again.diagnostics, report.diagnostics);
    }
}

#[test]
fn single_function_into_report() {
    let parsed = parse_module(MANY_FUNCS).unwrap();
    let module = &parsed.module;
    let func_ref = module.func_by_name("d").unwrap();

    let mut report = DiagnosticReport::with_limit(1);
    emit_function_diagnostics(
        &module.ast,
        func_ref,
        &module.funcs[func_ref],
        &DiagnosticsConfig::default(),
        &mut report,
    )
    .unwrap();
    insta::assert_snapshot!(report, @"error [DF0002] switch must be exhaustive @ 50");
}

#[test]
fn diagnostic_limit() {
    let parsed = parse_module(MANY_FUNCS).unwrap();
    let cfg = DiagnosticsConfig::default().with_max_diagnostics(3);

    let report = emit_module_diagnostics(&parsed.module, &cfg).unwrap();
    let kinds: Vec<_> = report.iter().map(|diag| diag.kind).collect();
    assert_eq!(
        kinds,
        [
            DiagnosticKind::NonExhaustiveSwitch,
            DiagnosticKind::MissingReturn,
            DiagnosticKind::ReturnFromNoreturn,
        ]
    );
}

#[test]
fn clean_module() {
    let src = r#"
ast {
    #0: func_decl 0..40;
}

func %f(v0.i32) -> i32 @ #0 {
    block0:
        return v0 @ implicit_return #0;
}
"#;
    let (_, report) = parse_and_diagnose(src, &DiagnosticsConfig::default()).unwrap();
    assert!(report.is_empty());
    assert_eq!(report.to_string(), "no diagnostics");
}

const BAD_ORIGIN: &str = r#"
ast {
    #0: func_decl 0..100;
    #1: call_expr 20..30;
}

func %ok() -> Int @ #0 {
    block0:
        unreachable @ #0;
}

func %bad() -> Int @ #1 {
    block0:
        unreachable @ #0;
}
"#;

#[test]
fn unexpected_function_origin() {
    let err = match parse_and_diagnose(BAD_ORIGIN, &DiagnosticsConfig::default()) {
        Err(DiagnoseError::Internal(err)) => err,
        Err(err) => panic!("unexpected error: {err}"),
        Ok((_, report)) => panic!("expected an internal error, got {report}"),
    };

    assert_eq!(err.func_name, "bad");
    assert_eq!(
        err.violation,
        InvariantViolation::UnexpectedFunctionOrigin {
            origin: Some(Origin::Other(AstNodeKind::CallExpr))
        }
    );
    insta::assert_snapshot!(
        err,
        @"internal error in function `bad` at inst0: function must originate from a function declaration or a closure, found a `call_expr` node"
    );
}

#[test]
#[should_panic(expected = "SLUICE_DATAFLOW_DIAGNOSTICS_FAILURE")]
fn or_panic_aborts() {
    let parsed = parse_module(BAD_ORIGIN).unwrap();
    emit_module_diagnostics_or_panic(&parsed.module, &DiagnosticsConfig::default());
}

#[test]
fn missing_terminator_from_text() {
    let src = r#"
func %f() -> unit {
    block0:
        v0.i1 = integer_literal 1;
}
"#;
    let Err(DiagnoseError::Internal(err)) = parse_and_diagnose(src, &DiagnosticsConfig::default())
    else {
        panic!("expected an internal error");
    };
    assert!(matches!(
        err.violation,
        InvariantViolation::MissingTerminator { .. }
    ));
}

#[test]
fn parse_errors_are_forwarded() {
    let src = "func %f() -> unit { block0: return }";
    let Err(DiagnoseError::Parse(errors)) = parse_and_diagnose(src, &DiagnosticsConfig::default())
    else {
        panic!("expected a parse error");
    };
    assert_eq!(errors.len(), 1);
}
