//! Error types for parsing template documents and evaluating conditionals

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::expr::ExprError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// A template document that could not be parsed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse error at byte {position}: {message}")]
    Syntax { position: usize, message: String },
}

impl ParseError {
    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            position,
            message: message.into(),
        }
    }

    /// Byte offset where the problem was detected
    pub fn position(&self) -> usize {
        match self {
            ParseError::Syntax { position, .. } => *position,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            ParseError::Syntax { position, message } => {
                let start = (*position).min(source.len());
                let end = (start + 1).min(source.len()).max(start);
                render_report(source, filename, start..end, message, message)
            }
        }
    }
}

/// A conditional `test` expression that failed to evaluate
///
/// Carries the expression text after variable substitution, which is what
/// the evaluator actually saw.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Cannot evaluate expression \"{expression}\": {cause}")]
pub struct ExpressionError {
    pub expression: String,
    #[source]
    pub cause: ExprError,
}

impl ExpressionError {
    pub fn new(expression: impl Into<String>, cause: ExprError) -> Self {
        Self {
            expression: expression.into(),
            cause,
        }
    }

    /// Format the error against the expression text using ariadne
    pub fn format(&self) -> String {
        let span = self
            .cause
            .span()
            .unwrap_or(0..self.expression.len());
        render_report(
            &self.expression,
            "test",
            span,
            "Cannot evaluate expression",
            &self.cause.to_string(),
        )
    }
}

fn render_report(source: &str, filename: &str, span: Span, title: &str, label: &str) -> String {
    let mut buf = Vec::new();
    let written = Report::build(ReportKind::Error, filename, span.start)
        .with_message(title)
        .with_label(
            Label::new((filename, span))
                .with_message(label)
                .with_color(Color::Red),
        )
        .finish()
        .write((filename, Source::from(source)), &mut buf);

    match written {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => format!("{}: {}", title, label),
    }
}
