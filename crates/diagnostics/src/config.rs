#[derive(Debug, Clone)]
pub struct DiagnosticsConfig {
    /// Maximum number of diagnostics collected over a module; `0` means
    /// unlimited.
    pub max_diagnostics: usize,
    /// Diagnose `unreachable` terminators: missing returns and
    /// non-exhaustive switches.
    pub check_unreachable: bool,
    /// Diagnose returns from `noreturn` functions.
    pub check_noreturn: bool,
    /// Diagnose `static_report` calls folded to a true condition.
    pub check_static_reports: bool,
}

impl DiagnosticsConfig {
    pub fn with_max_diagnostics(mut self, max_diagnostics: usize) -> Self {
        self.max_diagnostics = max_diagnostics;
        self
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            max_diagnostics: 0,
            check_unreachable: true,
            check_noreturn: true,
            check_static_reports: true,
        }
    }
}
