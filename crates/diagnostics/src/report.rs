use std::fmt;

use crate::diagnostic::Diagnostic;

#[derive(Debug, Clone, Default)]
pub struct DiagnosticReport {
    pub diagnostics: Vec<Diagnostic>,
    /// Maximum number of diagnostics kept; `0` keeps all of them.
    pub max_diagnostics: usize,
}

impl DiagnosticReport {
    pub fn with_limit(max_diagnostics: usize) -> Self {
        Self {
            diagnostics: Vec::new(),
            max_diagnostics,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_full(&self) -> bool {
        self.max_diagnostics != 0 && self.diagnostics.len() >= self.max_diagnostics
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if !self.is_full() {
            self.diagnostics.push(diagnostic);
        }
    }

    pub fn extend_with_limit(&mut self, mut other: Vec<Diagnostic>) {
        if self.max_diagnostics == 0 {
            self.diagnostics.extend(other);
            return;
        }

        let remaining = self.max_diagnostics.saturating_sub(self.diagnostics.len());
        if remaining == 0 {
            return;
        }

        if other.len() > remaining {
            other.truncate(remaining);
        }
        self.diagnostics.extend(other);
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.diagnostics.is_empty() {
            return "no diagnostics".fmt(f);
        }

        for (index, diagnostic) in self.diagnostics.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sluice_ir::SourcePos;

    use super::*;

    fn diags(n: u32) -> Vec<Diagnostic> {
        (0..n)
            .map(|i| Diagnostic::non_exhaustive_switch(SourcePos(i)))
            .collect()
    }

    #[test]
    fn limit_is_applied() {
        let mut report = DiagnosticReport::with_limit(3);
        report.extend_with_limit(diags(2));
        assert!(!report.is_full());
        report.extend_with_limit(diags(2));
        assert!(report.is_full());
        report.push(Diagnostic::static_report_error(None));
        assert_eq!(report.len(), 3);
        assert_eq!(report.diagnostics[2].pos, Some(SourcePos(0)));
    }

    #[test]
    fn zero_means_unlimited() {
        let mut report = DiagnosticReport::default();
        report.extend_with_limit(diags(500));
        report.push(Diagnostic::static_report_error(None));
        assert_eq!(report.len(), 501);
    }

    #[test]
    fn display() {
        assert_eq!(DiagnosticReport::default().to_string(), "no diagnostics");

        let mut report = DiagnosticReport::default();
        report.extend_with_limit(diags(2));
        insta::assert_snapshot!(report, @r"
        error [DF0002] switch must be exhaustive @ 0
        error [DF0002] switch must be exhaustive @ 1
        ");
    }
}
