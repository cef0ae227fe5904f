use std::io;

use annotate_snippets::{Level, Renderer, Snippet};
use smol_str::SmolStr;

use crate::{syntax::Rule, Span};

#[derive(Debug)]
#[allow(clippy::large_enum_variant)]
pub enum Error {
    NumberOutOfBounds(Span),
    SyntaxError(pest::error::Error<Rule>),
    Undefined(UndefinedKind, Span),
    DuplicateValueName(SmolStr, Span),
    DuplicatedDeclaration(SmolStr, Span),

    /// AST nodes must be declared as `#0`, `#1`, ... in order.
    UnexpectedNodeId {
        expected: u32,
        span: Span,
    },

    InvalidSourceRange(Span),

    TypeError {
        expected: String,
        span: Span,
    },
}

#[derive(Debug)]
pub enum UndefinedKind {
    Block(u32),
    Func(SmolStr),
    Value(SmolStr),
    Node(u32),
    NodeKind(SmolStr),
    Builtin(SmolStr),
}

impl Error {
    pub fn span(&self) -> Span {
        match self {
            Error::NumberOutOfBounds(span) => *span,
            Error::Undefined(_, span) => *span,
            Error::DuplicateValueName(_, span) => *span,
            Error::DuplicatedDeclaration(_, span) => *span,
            Error::UnexpectedNodeId { span, .. } => *span,
            Error::InvalidSourceRange(span) => *span,
            Error::TypeError { span, .. } => *span,

            Error::SyntaxError(err) => match err.location {
                pest::error::InputLocation::Pos(p) => Span(p as u32, p as u32),
                pest::error::InputLocation::Span((s, e)) => Span(s as u32, e as u32),
            },
        }
    }

    /// The one-line description attached to the error's span.
    pub fn message(&self) -> String {
        match self {
            Error::NumberOutOfBounds(_) => "number out of bounds".into(),

            Error::SyntaxError(err) => err.variant.message().into_owned(),

            Error::Undefined(kind, _) => match kind {
                UndefinedKind::Block(id) => format!("undefined block: `block{id}`"),
                UndefinedKind::Func(name) => format!("undefined function: `%{name}`"),
                UndefinedKind::Value(name) => format!("undefined value: `{name}`"),
                UndefinedKind::Node(id) => format!("undefined ast node: `#{id}`"),
                UndefinedKind::NodeKind(name) => format!("unknown ast node kind: `{name}`"),
                UndefinedKind::Builtin(name) => format!("unknown builtin: `{name}`"),
            },

            Error::DuplicatedDeclaration(name, _) => format!("{name} is already declared"),
            Error::DuplicateValueName(name, _) => format!("value name `{name}` is already defined"),

            Error::UnexpectedNodeId { expected, .. } => {
                format!("ast nodes must be numbered in order: expected `#{expected}` here")
            }

            Error::InvalidSourceRange(_) => "source range ends before it starts".into(),

            Error::TypeError { expected, .. } => {
                format!("type error: expected `{expected}` here")
            }
        }
    }

    pub fn print(
        &self,
        mut w: impl io::Write,
        path: &str,
        content: &str,
        colors: bool,
    ) -> io::Result<()> {
        let label = self.message();
        let snippet = Level::Error.title("parse error").snippet(
            Snippet::source(content)
                .line_start(1)
                .origin(path)
                .fold(true)
                .annotation(Level::Error.span(self.span().as_range()).label(&label)),
        );
        let rend = if colors {
            Renderer::styled()
        } else {
            Renderer::plain()
        };
        let disp = rend.render(snippet);
        writeln!(w, "{disp}")
    }

    pub fn print_to_string(&self, path: &str, content: &str, colors: bool) -> String {
        let mut v = vec![];
        self.print(&mut v, path, content, colors)
            .expect("writing to a Vec never fails");
        String::from_utf8_lossy(&v).into_owned()
    }
}
