//! A realistic annotated model walked top to bottom: action codes come
//! back in document order, configuration accumulates, and local scopes
//! end cleanly at step-group boundaries.

use brickpage::parser::types::RectSpot;
use brickpage::{check_document, ActionCode, Meta, ProjectSettings, SourceLocation};
use pretty_assertions::assert_eq;

const MODEL: &str = r#"0 FILE castle.ldr
0 Name: castle.ldr
0 Author: A Builder
0 !LPUB PAGE SIZE 8.5 11.0 Letter
0 !LPUB PAGE MARGINS 0.05 0.05
0 !LPUB PAGE NUMBER PLACEMENT BOTTOM_RIGHT PAGE INSIDE
0 !LPUB PAGE NUMBER FONT_COLOR "black"
0 !LPUB INSERT COVER_PAGE
0 STEP
0 !LPUB MULTI_STEP BEGIN
0 !LPUB PLI PLACEMENT LOCAL BOTTOM_LEFT PAGE INSIDE
1 16 0 0 0 1 0 0 0 1 0 0 0 1 wall.ldr
0 STEP
1 16 0 -24 0 1 0 0 0 1 0 0 0 1 tower.ldr
0 ROTSTEP 0 90 0 REL
0 STEP
0 !LPUB MULTI_STEP END
0 !LPUB CALLOUT BEGIN
1 16 0 0 0 1 0 0 0 1 0 0 0 1 gate.ldr
0 !LPUB CALLOUT POINTER RIGHT 0.5 0.25 0.75 0.125
0 STEP
0 !LPUB CALLOUT END
0 BUFEXCHG A STORE
1 16 0 -48 0 1 0 0 0 1 0 0 0 1 roof.ldr
0 STEP
0 BUFEXCHG A RETRIEVE
0 STEP
"#;

#[test]
fn test_action_sequence_in_document_order() {
    let mut meta = Meta::new();
    let (actions, diagnostics) = check_document(&mut meta, MODEL, "castle.ldr");

    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    assert_eq!(
        actions,
        vec![
            ActionCode::PageSize,
            ActionCode::InsertCoverPage,
            ActionCode::Step,
            ActionCode::StepGroupBegin,
            ActionCode::Step,
            ActionCode::RotStep,
            ActionCode::Step,
            ActionCode::StepGroupEnd,
            ActionCode::CalloutBegin,
            ActionCode::CalloutPointer,
            ActionCode::Step,
            ActionCode::CalloutEnd,
            ActionCode::BufferStore,
            ActionCode::Step,
            ActionCode::BufferLoad,
            ActionCode::Step,
        ]
    );
}

#[test]
fn test_configuration_accumulates_during_walk() {
    let mut meta = Meta::new();
    let (_, diagnostics) = check_document(&mut meta, MODEL, "castle.ldr");
    assert!(diagnostics.is_empty());

    let color = meta
        .leaf(&["!LPUB", "PAGE", "NUMBER", "FONT_COLOR"])
        .unwrap();
    assert_eq!(color.leaf.as_str().unwrap().value.value(), "black");

    let number = meta
        .leaf(&["!LPUB", "PAGE", "NUMBER", "PLACEMENT"])
        .unwrap();
    assert_eq!(
        number.leaf.as_placement().unwrap().value.value().rect,
        RectSpot::BottomRightInsideCorner
    );

    // The LOCAL parts-list placement is still pushed; the page builder
    // pops at the end of the step group it belongs to.
    let pli = meta.leaf(&["!LPUB", "PLI", "PLACEMENT"]).unwrap();
    assert!(pli.leaf.as_placement().unwrap().value.is_overridden());
    meta.pop();
    let pli = meta.leaf(&["!LPUB", "PLI", "PLACEMENT"]).unwrap();
    assert_eq!(
        pli.leaf.as_placement().unwrap().value.value().rect,
        RectSpot::RightTopOutside
    );
}

#[test]
fn test_locations_point_back_to_source_lines() {
    let mut meta = Meta::new();
    check_document(&mut meta, MODEL, "castle.ldr");

    let color = meta
        .leaf(&["!LPUB", "PAGE", "NUMBER", "FONT_COLOR"])
        .unwrap();
    let here = color.leaf.as_str().unwrap().value.here().unwrap();
    assert_eq!(here.model_name, "castle.ldr");
    // FONT_COLOR is on line 7 of the document.
    assert_eq!(here.line_number, 7);
}

#[test]
fn test_settings_seed_defaults_before_walk() {
    let mut meta = Meta::new();
    let settings = ProjectSettings::from_str(
        "[page]\nwidth = 11.6929\nheight = 16.5354\nsize_id = \"A3\"\ndpi = 300.0\n",
    )
    .unwrap();
    settings.apply(&mut meta);

    // A document that never sets a page size sees the project default.
    let (_, diagnostics) = check_document(&mut meta, "0 STEP\n", "empty.ldr");
    assert!(diagnostics.is_empty());
    let size = meta.leaf(&["!LPUB", "PAGE", "SIZE"]).unwrap();
    match &size.leaf {
        brickpage::parser::values::Leaf::PageSize(leaf) => {
            assert_eq!(leaf.value.value().size_id, "A3");
            assert!((leaf.value.value().size[0] - 11.6929).abs() < 1e-4);
        }
        other => panic!("expected page size leaf, got {:?}", other),
    }
}

#[test]
fn test_error_reporting_continues_per_line() {
    let source = "\
0 !LPUB PAGE MARGINS bogus 0.05
0 !LPUB FADE_STEP OPACITY 900
0 !LPUB PAGE MARGINS LOCAL
0 STEP";
    let mut meta = Meta::new();
    let (actions, diagnostics) = check_document(&mut meta, source, "bad.ldr");

    assert_eq!(actions, vec![ActionCode::Step]);
    assert_eq!(diagnostics.len(), 3);
    assert_eq!(diagnostics[0].line_number, 1);
    assert_eq!(diagnostics[1].line_number, 2);
    assert_eq!(diagnostics[2].line_number, 3);
    // Each diagnostic renders with source context.
    let rendered = diagnostics[0].error.format(&diagnostics[0].line);
    assert!(rendered.contains("bad.ldr"));
}

#[test]
fn test_parse_failure_line_is_reported_once() {
    let mut meta = Meta::new();
    let here = SourceLocation::new("bad.ldr", 9);
    let err = meta
        .parse("0 !LPUB PLI PLACEMENT NOWHERE PAGE", &here)
        .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("bad.ldr:9"));
    assert!(text.contains("PLACEMENT NOWHERE PAGE"));
}
