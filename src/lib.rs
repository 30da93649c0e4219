//! brickpage - directive language and relative-placement engine for
//! paginated building instructions.
//!
//! A model file annotated with directive commands describes what the
//! finished instruction pages should look like without ever naming
//! pixels: each directive configures a typed value (a placement, a
//! border, a margin pair) or triggers a mode change (new step, callout,
//! buffer exchange). The placement engine then resolves every page
//! element's position relative to other elements once a renderer reports
//! concrete pixel sizes.
//!
//! # Example
//!
//! ```
//! use brickpage::{ActionCode, Meta, SourceLocation};
//!
//! let mut meta = Meta::new();
//! let here = SourceLocation::new("model.ldr", 1);
//! assert_eq!(meta.parse("0 STEP", &here).unwrap(), ActionCode::Step);
//!
//! meta.parse("0 !LPUB PAGE NUMBER FONT_COLOR \"black\"", &here).unwrap();
//! let leaf = meta.leaf(&["!LPUB", "PAGE", "NUMBER", "FONT_COLOR"]).unwrap();
//! assert_eq!(leaf.format(false, false), "FONT_COLOR \"black\"");
//! ```

pub mod error;
pub mod layout;
pub mod parser;
pub mod project;

pub use error::ParseError;
pub use layout::{LayoutArena, LayoutNode, NodeId};
pub use parser::{ActionCode, Meta, SourceLocation};
pub use project::{ProjectSettings, SettingsError};

/// One reported failure from a document pass.
#[derive(Debug)]
pub struct Diagnostic {
    pub line_number: usize,
    pub line: String,
    pub error: ParseError,
}

/// Parse a whole document top to bottom, collecting the action codes of
/// recognized directives and one diagnostic per failing line. A bad
/// directive never aborts the pass; parsing continues with the next
/// line.
pub fn check_document(
    meta: &mut Meta,
    source: &str,
    model_name: &str,
) -> (Vec<ActionCode>, Vec<Diagnostic>) {
    let mut actions = Vec::new();
    let mut diagnostics = Vec::new();

    for (i, line) in source.lines().enumerate() {
        let here = SourceLocation::new(model_name, i + 1);
        match meta.parse(line, &here) {
            Ok(rc) => {
                if rc.is_action() {
                    log::debug!("{}: action {:?}", here, rc);
                    actions.push(rc);
                }
            }
            Err(error) => {
                log::debug!("{}: {}", here, error);
                diagnostics.push(Diagnostic {
                    line_number: i + 1,
                    line: line.to_string(),
                    error,
                });
            }
        }
    }

    (actions, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_document_collects_actions_and_errors() {
        let mut meta = Meta::new();
        let source = "\
0 !LPUB PAGE MARGINS 0.05 0.05
0 STEP
0 !LPUB PAGE MARGINS bogus 0.05
0 STEP";
        let (actions, diagnostics) = check_document(&mut meta, source, "model.ldr");
        assert_eq!(actions, vec![ActionCode::Step, ActionCode::Step]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line_number, 3);
    }

    #[test]
    fn test_check_document_ignores_foreign_lines() {
        let mut meta = Meta::new();
        let source = "\
0 Title castle.ldr
0 Name: castle
1 16 0 0 0 1 0 0 0 1 0 0 0 1 wall.ldr
0 STEP";
        let (actions, diagnostics) = check_document(&mut meta, source, "castle.ldr");
        assert_eq!(actions, vec![ActionCode::Step]);
        assert!(diagnostics.is_empty());
    }
}
