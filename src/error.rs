//! Error types for directive parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::types::SourceLocation;

/// Failures the grammar tree and value library can report.
///
/// The tree never attempts recovery: every failure is returned to the
/// immediate caller with the offending location and the full line, and
/// the consuming collaborator decides how to surface it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Token shape does not match any grammar alternative at the current
    /// tree position.
    #[error("{location}: no grammar alternative matches \"{line}\"")]
    Syntax {
        location: SourceLocation,
        line: String,
    },

    /// A numeric value parsed correctly but lies outside the declared
    /// bounds. The stored value is left unchanged.
    #[error("{location}: value {value} outside [{min}, {max}] in \"{line}\"")]
    Range {
        location: SourceLocation,
        line: String,
        value: f32,
        min: f32,
        max: f32,
    },

    /// A LOCAL or GLOBAL qualifier with no directive after it.
    #[error("{location}: {qualifier} qualifier is not followed by a directive")]
    AmbiguousScope {
        location: SourceLocation,
        qualifier: String,
    },
}

impl ParseError {
    /// Create a syntax error from the token list being parsed.
    pub fn syntax(location: &SourceLocation, args: &[String]) -> Self {
        Self::Syntax {
            location: location.clone(),
            line: args.join(" "),
        }
    }

    /// Create a range error, keeping the offending line for the message.
    pub fn range(
        location: &SourceLocation,
        args: &[String],
        value: f32,
        min: f32,
        max: f32,
    ) -> Self {
        Self::Range {
            location: location.clone(),
            line: args.join(" "),
            value,
            min,
            max,
        }
    }

    /// Create an ambiguous-scope error for a dangling qualifier.
    pub fn ambiguous_scope(location: &SourceLocation, qualifier: &str) -> Self {
        Self::AmbiguousScope {
            location: location.clone(),
            qualifier: qualifier.to_string(),
        }
    }

    /// The location the failing directive came from.
    pub fn location(&self) -> &SourceLocation {
        match self {
            Self::Syntax { location, .. }
            | Self::Range { location, .. }
            | Self::AmbiguousScope { location, .. } => location,
        }
    }

    /// Render the error with source context using ariadne. `source_line`
    /// is the raw text of the offending line.
    pub fn format(&self, source_line: &str) -> String {
        let filename = self.location().model_name.clone();
        let span = 0..source_line.len().max(1);
        let mut buf = Vec::new();

        Report::build(ReportKind::Error, filename.as_str(), 0)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename.as_str(), span))
                    .with_message(match self {
                        Self::Syntax { .. } => "no grammar alternative matches here",
                        Self::Range { .. } => "value outside the declared range",
                        Self::AmbiguousScope { .. } => "qualifier needs a directive after it",
                    })
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename.as_str(), Source::from(source_line)), &mut buf)
            .expect("report rendering to a Vec cannot fail");

        String::from_utf8(buf).expect("ariadne emits utf-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let here = SourceLocation::new("model.ldr", 7);
        let err = ParseError::syntax(&here, &["PAGE".into(), "BOGUS".into()]);
        let text = err.to_string();
        assert!(text.contains("model.ldr:7"));
        assert!(text.contains("PAGE BOGUS"));
    }

    #[test]
    fn test_range_error_display() {
        let here = SourceLocation::new("model.ldr", 3);
        let err = ParseError::range(&here, &["MARGINS".into(), "900".into()], 900.0, 0.0, 100.0);
        assert!(err.to_string().contains("900"));
        assert!(err.to_string().contains("[0, 100]"));
    }

    #[test]
    fn test_format_renders_source_context() {
        let here = SourceLocation::new("model.ldr", 1);
        let err = ParseError::syntax(&here, &["PAGE".into(), "BOGUS".into()]);
        let rendered = err.format("0 !LPUB PAGE BOGUS");
        assert!(rendered.contains("model.ldr"));
    }
}
