//! The round-trip law: for every leaf value kind, a parsed directive
//! reformatted to text must reparse to the same stored value.
//!
//! Formatting is allowed to differ textually from the input (canonical
//! spacing, explicit prepositions, resolved aliases) but never
//! semantically.

use brickpage::{Meta, ParseError, SourceLocation};
use pretty_assertions::assert_eq;

fn here() -> SourceLocation {
    SourceLocation::new("model.ldr", 1)
}

/// Parse `line`, reformat the leaf at `path` as a full directive line,
/// reparse that into a fresh tree, and require the stored values to be
/// identical.
fn roundtrip(path: &[&str], line: &str) {
    let mut meta = Meta::new();
    meta.parse(line, &here())
        .unwrap_or_else(|e| panic!("{}: {}", line, e));

    let node = meta.leaf(path).expect("leaf exists after parse");
    let stored = node.leaf.clone();
    let formatted = node.format_line(false, false);

    let mut second = Meta::new();
    second
        .parse(&formatted, &here())
        .unwrap_or_else(|e| panic!("reformatted {:?}: {}", formatted, e));

    assert_eq!(
        second.leaf(path).unwrap().leaf,
        stored,
        "round-trip changed the value: {:?} -> {:?}",
        line,
        formatted
    );
}

#[test]
fn test_string_value() {
    roundtrip(
        &["!LPUB", "PAGE", "NUMBER", "FONT_COLOR"],
        "0 !LPUB PAGE NUMBER FONT_COLOR \"black\"",
    );
}

#[test]
fn test_string_with_spaces() {
    roundtrip(
        &["!LPUB", "PLI", "SORT_BY"],
        "0 !LPUB PLI SORT_BY \"Part Size\"",
    );
}

#[test]
fn test_string_list() {
    roundtrip(
        &["!LPUB", "PAGE", "SUBMODEL_BACKGROUND_COLOR"],
        "0 !LPUB PAGE SUBMODEL_BACKGROUND_COLOR \"#ffffff\" \"#ffffcc\" \"#ffcccc\"",
    );
}

#[test]
fn test_integer_value() {
    roundtrip(&["!LPUB", "FADE_STEP", "OPACITY"], "0 !LPUB FADE_STEP OPACITY 50");
}

#[test]
fn test_float_value() {
    roundtrip(
        &["!LPUB", "ASSEM", "MODEL_SCALE"],
        "0 !LPUB ASSEM MODEL_SCALE 0.75",
    );
}

#[test]
fn test_float_pair() {
    roundtrip(&["!LPUB", "PAGE", "MARGINS"], "0 !LPUB PAGE MARGINS 0.05 0.1");
}

#[test]
fn test_boolean() {
    roundtrip(
        &["!LPUB", "PAGE", "DISPLAY_PAGE_NUMBER"],
        "0 !LPUB PAGE DISPLAY_PAGE_NUMBER FALSE",
    );
}

#[test]
fn test_placement_edge_with_justification() {
    roundtrip(
        &["!LPUB", "PLI", "PLACEMENT"],
        "0 !LPUB PLI PLACEMENT TOP LEFT PAGE OUTSIDE",
    );
}

#[test]
fn test_placement_corner_with_offsets() {
    roundtrip(
        &["!LPUB", "PAGE", "NUMBER", "PLACEMENT"],
        "0 !LPUB PAGE NUMBER PLACEMENT BOTTOM_RIGHT PAGE INSIDE 0.01 -0.02",
    );
}

#[test]
fn test_placement_every_grammar_spot() {
    use brickpage::parser::types::RectSpot;

    // Sweep the whole 25-spot grid through parse -> format -> parse.
    for spot in RectSpot::all() {
        let (placement, justification, preposition) = spot.decode();
        let mut line = format!("0 !LPUB PLI PLACEMENT {}", placement.keyword());
        let is_edge = matches!(
            placement,
            brickpage::parser::types::CompassSpot::Top
                | brickpage::parser::types::CompassSpot::Bottom
                | brickpage::parser::types::CompassSpot::Left
                | brickpage::parser::types::CompassSpot::Right
        );
        if is_edge && preposition == brickpage::parser::types::Preposition::Outside {
            line.push_str(&format!(" {}", justification.keyword()));
        }
        line.push_str(&format!(" CALLOUT {}", preposition.keyword()));
        roundtrip(&["!LPUB", "PLI", "PLACEMENT"], &line);
    }
}

#[test]
fn test_border_square() {
    roundtrip(
        &["!LPUB", "PLI", "BORDER"],
        "0 !LPUB PLI BORDER SQUARE Black 0.03125",
    );
}

#[test]
fn test_border_round_with_margins() {
    roundtrip(
        &["!LPUB", "CALLOUT", "BORDER"],
        "0 !LPUB CALLOUT BORDER ROUND Blue 0.125 15 MARGINS 0.05 0.05",
    );
}

#[test]
fn test_border_hidden() {
    roundtrip(
        &["!LPUB", "PLI", "BORDER"],
        "0 !LPUB PLI BORDER HIDDEN Black 0.0625",
    );
}

#[test]
fn test_background_color() {
    roundtrip(
        &["!LPUB", "PAGE", "BACKGROUND"],
        "0 !LPUB PAGE BACKGROUND COLOR \"#c0c0c0\"",
    );
}

#[test]
fn test_background_picture_stretch() {
    roundtrip(
        &["!LPUB", "PAGE", "BACKGROUND"],
        "0 !LPUB PAGE BACKGROUND PICTURE \"castle bg.png\" STRETCH",
    );
}

#[test]
fn test_background_gradient() {
    roundtrip(
        &["!LPUB", "PAGE", "BACKGROUND"],
        "0 !LPUB PAGE BACKGROUND GRADIENT 0 1 0 100 200 45 \"0,0|0,100\" \"0,0xff131360|1,0xff202ccc\"",
    );
}

#[test]
fn test_pointer_single_segment() {
    roundtrip(
        &["!LPUB", "CALLOUT", "POINTER"],
        "0 !LPUB CALLOUT POINTER RIGHT 0.5 0.25 0.75 0.125",
    );
}

#[test]
fn test_pointer_corner() {
    roundtrip(
        &["!LPUB", "CALLOUT", "POINTER"],
        "0 !LPUB CALLOUT POINTER TOP_LEFT 0.25 0.5",
    );
}

#[test]
fn test_page_pointer_with_base_rect() {
    roundtrip(
        &["!LPUB", "PAGE", "POINTER"],
        "0 !LPUB PAGE POINTER BOTTOM 0.5 0.5 1 0.5 1 0.5 1 0.5 1 0.125 1 BASE_BOTTOM",
    );
}

#[test]
fn test_separator_default_length() {
    roundtrip(
        &["!LPUB", "MULTI_STEP", "SEPARATOR"],
        "0 !LPUB MULTI_STEP SEPARATOR 0.05 Black 0.1 0.1",
    );
}

#[test]
fn test_separator_custom_length() {
    roundtrip(
        &["!LPUB", "MULTI_STEP", "SEPARATOR"],
        "0 !LPUB MULTI_STEP SEPARATOR CUSTOM_LENGTH 4.5 0.05 Black 0.1 0.1",
    );
}

#[test]
fn test_freeform() {
    roundtrip(&["!LPUB", "CALLOUT", "FREEFORM"], "0 !LPUB CALLOUT FREEFORM PLI CENTER");
    roundtrip(&["!LPUB", "CALLOUT", "FREEFORM"], "0 !LPUB CALLOUT FREEFORM FALSE");
}

#[test]
fn test_constrain() {
    roundtrip(&["!LPUB", "PLI", "CONSTRAIN"], "0 !LPUB PLI CONSTRAIN COLS 5");
    roundtrip(&["!LPUB", "PLI", "CONSTRAIN"], "0 !LPUB PLI CONSTRAIN SQUARE");
    roundtrip(&["!LPUB", "PLI", "CONSTRAIN"], "0 !LPUB PLI CONSTRAIN WIDTH 3.5");
}

#[test]
fn test_alignment() {
    roundtrip(
        &["!LPUB", "ROTATE_ICON", "ALIGNMENT"],
        "0 !LPUB ROTATE_ICON ALIGNMENT RIGHT",
    );
}

#[test]
fn test_alloc() {
    roundtrip(&["!LPUB", "CALLOUT", "ALLOC"], "0 !LPUB CALLOUT ALLOC HORIZONTAL");
}

#[test]
fn test_orientation() {
    roundtrip(
        &["!LPUB", "PAGE", "ORIENTATION"],
        "0 !LPUB PAGE ORIENTATION LANDSCAPE",
    );
}

#[test]
fn test_page_size() {
    roundtrip(&["!LPUB", "PAGE", "SIZE"], "0 !LPUB PAGE SIZE 8.5 11.0 Letter");
    roundtrip(&["!LPUB", "PAGE", "SIZE"], "0 !LPUB PAGE SIZE A4");
}

#[test]
fn test_rotstep() {
    roundtrip(&["ROTSTEP"], "0 ROTSTEP 0 90 0 REL");
    roundtrip(&["ROTSTEP"], "0 ROTSTEP END");
}

#[test]
fn test_buffer_exchange() {
    roundtrip(&["BUFEXCHG"], "0 BUFEXCHG A STORE");
    roundtrip(&["BUFEXCHG"], "0 BUFEXCHG B RETRIEVE");
}

#[test]
fn test_callout_begin_mode() {
    roundtrip(&["!LPUB", "CALLOUT", "BEGIN"], "0 !LPUB CALLOUT BEGIN ASSEMBLED");
}

#[test]
fn test_insert_picture() {
    roundtrip(
        &["!LPUB", "INSERT"],
        "0 !LPUB INSERT PICTURE \"logo.png\" SCALE 2 OFFSET 0.3 0.4",
    );
}

#[test]
fn test_insert_text() {
    roundtrip(
        &["!LPUB", "INSERT"],
        "0 !LPUB INSERT TEXT \"Step back\" \"Arial\" \"Black\"",
    );
}

/* Range law: out-of-range numerics fail and leave the stored value
 * untouched. */

#[test]
fn test_range_error_leaves_int_unchanged() {
    let mut meta = Meta::new();
    meta.parse("0 !LPUB FADE_STEP OPACITY 80", &here()).unwrap();
    let err = meta
        .parse("0 !LPUB FADE_STEP OPACITY 150", &here())
        .unwrap_err();
    assert!(matches!(err, ParseError::Range { .. }));

    let leaf = meta.leaf(&["!LPUB", "FADE_STEP", "OPACITY"]).unwrap();
    match &leaf.leaf {
        brickpage::parser::values::Leaf::Int(int) => assert_eq!(*int.value.value(), 80),
        other => panic!("expected int leaf, got {:?}", other),
    }
}

#[test]
fn test_range_error_leaves_float_pair_unchanged() {
    let mut meta = Meta::new();
    meta.parse("0 !LPUB PAGE MARGINS 0.25 0.25", &here()).unwrap();
    let err = meta
        .parse("0 !LPUB PAGE MARGINS 500 0.25", &here())
        .unwrap_err();
    assert!(matches!(err, ParseError::Range { .. }));

    let leaf = meta.leaf(&["!LPUB", "PAGE", "MARGINS"]).unwrap();
    assert_eq!(*leaf.leaf.as_float_pair().unwrap().value.value(), [0.25, 0.25]);
}

#[test]
fn test_range_boundaries_are_inclusive() {
    let mut meta = Meta::new();
    assert!(meta.parse("0 !LPUB FADE_STEP OPACITY 0", &here()).is_ok());
    assert!(meta.parse("0 !LPUB FADE_STEP OPACITY 100", &here()).is_ok());
    assert!(meta.parse("0 !LPUB FADE_STEP OPACITY 101", &here()).is_err());
}
