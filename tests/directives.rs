//! Formatting snapshots and dispatcher behavior on full directive lines.

use brickpage::{ActionCode, Meta, SourceLocation};
use insta::assert_snapshot;
use pretty_assertions::assert_eq;

fn here() -> SourceLocation {
    SourceLocation::new("model.ldr", 1)
}

fn format_after(line: &str, path: &[&str]) -> String {
    let mut meta = Meta::new();
    meta.parse(line, &here())
        .unwrap_or_else(|e| panic!("{}: {}", line, e));
    meta.leaf(path).expect("leaf exists").format(false, false)
}

#[test]
fn test_format_string_leaf() {
    assert_snapshot!(
        format_after(
            "0 !LPUB PAGE NUMBER FONT_COLOR \"black\"",
            &["!LPUB", "PAGE", "NUMBER", "FONT_COLOR"]
        ),
        @r#"FONT_COLOR "black""#
    );
}

#[test]
fn test_format_margins() {
    assert_snapshot!(
        format_after("0 !LPUB PAGE MARGINS 0.05 0.1", &["!LPUB", "PAGE", "MARGINS"]),
        @"MARGINS 0.0500 0.1000"
    );
}

#[test]
fn test_format_placement_line() {
    let mut meta = Meta::new();
    meta.parse("0 !LPUB PLI PLACEMENT TOP LEFT PAGE OUTSIDE", &here())
        .unwrap();
    let node = meta.leaf(&["!LPUB", "PLI", "PLACEMENT"]).unwrap();
    assert_snapshot!(
        node.format_line(false, false),
        @"0 !LPUB PLI PLACEMENT TOP LEFT PAGE OUTSIDE"
    );
}

#[test]
fn test_format_border() {
    assert_snapshot!(
        format_after("0 !LPUB PLI BORDER SQUARE Black 0.125", &["!LPUB", "PLI", "BORDER"]),
        @"BORDER SQUARE 1 Black 0.125 MARGINS 0.05 0.05"
    );
}

#[test]
fn test_format_rotstep() {
    assert_snapshot!(
        format_after("0 ROTSTEP 0 90 0 REL", &["ROTSTEP"]),
        @"ROTSTEP 0 90 0 REL"
    );
}

#[test]
fn test_unknown_families_are_not_ours() {
    let mut meta = Meta::new();
    for line in [
        "0 Title castle.ldr",
        "0 Author A Builder",
        "0 LDCAD SNAP_INCL [ref=clip.ldr]",
        "0 // plain comment",
        "2 24 0 0 0 1 0 0",
    ] {
        assert_eq!(
            meta.parse(line, &here()).unwrap(),
            ActionCode::Ok,
            "{}",
            line
        );
    }
}

#[test]
fn test_one_bad_line_does_not_poison_the_next() {
    let mut meta = Meta::new();
    assert!(meta.parse("0 !LPUB PAGE MARGINS x y", &here()).is_err());
    assert!(meta
        .parse("0 !LPUB PAGE MARGINS 0.05 0.05", &here())
        .is_ok());
}

#[test]
fn test_preamble_probe_accepts_partial_paths() {
    let meta = Meta::new();
    assert!(meta.preamble_match("0 !LPUB"));
    assert!(meta.preamble_match("0 !LPUB CALLOUT"));
    assert!(meta.preamble_match("0 !LPUB CALLOUT BORDER"));
    assert!(!meta.preamble_match("0 !LPUB CALLOUT BORDERS"));
    assert!(!meta.preamble_match("0 !LPUX"));
}

#[test]
fn test_documentation_lists_grammar() {
    let meta = Meta::new();
    let doc = meta.documentation();
    // Sorted leaf-by-leaf reference, one line per alternative.
    assert!(doc.iter().any(|l| l == "0 !LPUB PAGE MARGINS <float> <float>"));
    assert!(doc.iter().any(|l| l.contains("0 !LPUB PAGE BORDER")));
    assert!(doc
        .iter()
        .any(|l| l.contains("0 BUFEXCHG <bufferName> (STORE|RETRIEVE)")));
    // Aliases do not duplicate their subtree.
    let multi_step_begin = doc
        .iter()
        .filter(|l| l.ends_with("MULTI_STEP BEGIN"))
        .count();
    assert_eq!(multi_step_begin, 1);
}
