use std::{fmt, io, ops::Range};

use annotate_snippets::{Level, Renderer, Snippet};
use smallvec::SmallVec;
use sluice_ir::SourcePos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Control reaches the end of a function or closure that must return a
    /// value.
    MissingReturn,
    NonExhaustiveSwitch,
    /// A function marked `noreturn` returns to its caller.
    ReturnFromNoreturn,
    /// `static_report` was folded to a true condition.
    StaticReportError,
}

impl DiagnosticKind {
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::MissingReturn => 1,
            Self::NonExhaustiveSwitch => 2,
            Self::ReturnFromNoreturn => 3,
            Self::StaticReportError => 4,
        }
    }

    pub fn code(self) -> String {
        format!("DF{:04}", self.as_u16())
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::MissingReturn => "missing_return",
            Self::NonExhaustiveSwitch => "non_exhaustive_switch",
            Self::ReturnFromNoreturn => "return_from_noreturn",
            Self::StaticReportError => "static_report_error",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.code().fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticArg {
    /// A type, already rendered to its source spelling.
    Type(String),
    /// Chooses between alternative wordings of the message.
    Select(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// `None` if the offending instruction has no source location.
    pub pos: Option<SourcePos>,
    pub args: SmallVec<[DiagnosticArg; 2]>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, pos: Option<SourcePos>) -> Self {
        Self {
            kind,
            pos,
            args: SmallVec::new(),
        }
    }

    pub fn with_arg(mut self, arg: DiagnosticArg) -> Self {
        self.args.push(arg);
        self
    }

    /// `is_closure` selects the "closure" wording over "function".
    pub fn missing_return(pos: SourcePos, ret_ty: impl Into<String>, is_closure: bool) -> Self {
        Self::new(DiagnosticKind::MissingReturn, Some(pos))
            .with_arg(DiagnosticArg::Type(ret_ty.into()))
            .with_arg(DiagnosticArg::Select(is_closure as u8))
    }

    pub fn non_exhaustive_switch(pos: SourcePos) -> Self {
        Self::new(DiagnosticKind::NonExhaustiveSwitch, Some(pos))
    }

    pub fn return_from_noreturn(pos: SourcePos) -> Self {
        Self::new(DiagnosticKind::ReturnFromNoreturn, Some(pos))
    }

    pub fn static_report_error(pos: Option<SourcePos>) -> Self {
        Self::new(DiagnosticKind::StaticReportError, pos)
    }

    pub fn message(&self) -> String {
        match self.kind {
            DiagnosticKind::MissingReturn => {
                let what = match self.select() {
                    Some(1) => "closure",
                    _ => "function",
                };
                let ty = self.type_arg().unwrap_or("_");
                format!("missing return in a {what} expected to return '{ty}'")
            }
            DiagnosticKind::NonExhaustiveSwitch => "switch must be exhaustive".into(),
            DiagnosticKind::ReturnFromNoreturn => "return from a 'noreturn' function".into(),
            DiagnosticKind::StaticReportError => "static report error".into(),
        }
    }

    fn type_arg(&self) -> Option<&str> {
        self.args.iter().find_map(|arg| match arg {
            DiagnosticArg::Type(ty) => Some(ty.as_str()),
            DiagnosticArg::Select(_) => None,
        })
    }

    fn select(&self) -> Option<u8> {
        self.args.iter().find_map(|arg| match arg {
            DiagnosticArg::Select(n) => Some(*n),
            DiagnosticArg::Type(_) => None,
        })
    }

    /// Renders the diagnostic against the source text its positions point
    /// into.
    pub fn print(
        &self,
        mut w: impl io::Write,
        path: &str,
        content: &str,
        colors: bool,
    ) -> io::Result<()> {
        let message = self.message();
        let code = self.kind.code();
        let mut msg = Level::Error.title(&message).id(&code);
        if let Some(pos) = self.pos {
            msg = msg.snippet(
                Snippet::source(content)
                    .line_start(1)
                    .origin(path)
                    .fold(true)
                    .annotation(Level::Error.span(snippet_span(content, pos)).label(self.kind.name())),
            );
        }

        let rend = if colors {
            Renderer::styled()
        } else {
            Renderer::plain()
        };
        let disp = rend.render(msg);
        writeln!(w, "{disp}")
    }

    pub fn print_to_string(&self, path: &str, content: &str, colors: bool) -> String {
        let mut v = vec![];
        self.print(&mut v, path, content, colors)
            .expect("writing to a Vec never fails");
        String::from_utf8_lossy(&v).into_owned()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error [{}] {}", self.kind, self.message())?;
        match self.pos {
            Some(pos) => write!(f, " @ {pos}"),
            None => write!(f, " @ <unknown>"),
        }
    }
}

/// Returns a one-character span at `pos`, clamped to `content`.
fn snippet_span(content: &str, pos: SourcePos) -> Range<usize> {
    let mut start = pos.as_usize().min(content.len());
    while !content.is_char_boundary(start) {
        start -= 1;
    }
    let end = content[start..]
        .chars()
        .next()
        .map_or(start, |c| start + c.len_utf8());
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let diag = Diagnostic::missing_return(SourcePos(120), "Int", false);
        assert_eq!(diag.kind.code(), "DF0001");
        insta::assert_snapshot!(
            diag,
            @"error [DF0001] missing return in a function expected to return 'Int' @ 120"
        );

        let diag = Diagnostic::missing_return(SourcePos(7), "(Int, Bool)", true);
        assert_eq!(
            diag.message(),
            "missing return in a closure expected to return '(Int, Bool)'"
        );

        insta::assert_snapshot!(
            Diagnostic::non_exhaustive_switch(SourcePos(90)),
            @"error [DF0002] switch must be exhaustive @ 90"
        );
        insta::assert_snapshot!(
            Diagnostic::return_from_noreturn(SourcePos(3)),
            @"error [DF0003] return from a 'noreturn' function @ 3"
        );
        insta::assert_snapshot!(
            Diagnostic::static_report_error(None),
            @"error [DF0004] static report error @ <unknown>"
        );
    }

    #[test]
    fn snippet_span_is_clamped() {
        assert_eq!(snippet_span("abc", SourcePos(1)), 1..2);
        assert_eq!(snippet_span("abc", SourcePos(3)), 3..3);
        assert_eq!(snippet_span("abc", SourcePos(40)), 3..3);
        // `é` is two bytes long.
        assert_eq!(snippet_span("é!", SourcePos(1)), 0..2);
    }

    #[test]
    fn print_with_source() {
        let source = "func f() -> Int {\n}\n";
        let diag = Diagnostic::missing_return(SourcePos(18), "Int", false);
        let rendered = diag.print_to_string("main.swift", source, false);
        assert!(rendered.contains("error[DF0001]: missing return in a function"));
        assert!(rendered.contains("main.swift:2:1"));
        assert!(rendered.contains("missing_return"));
    }
}
