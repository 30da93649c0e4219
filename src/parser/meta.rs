//! The root dispatcher: one entry point that tokenizes a directive line,
//! locates the top-level keyword and drives the grammar tree.
//!
//! Action directives such as STEP or CALLOUT BEGIN come back as special
//! action codes; configuration directives store their data on the tree
//! for later use and come back as `Ok`. Unknown leading keywords belong
//! to foreign directive families and pass through untouched.

use crate::error::ParseError;
use crate::parser::grammar::{Branch, LeafNode, Node, Pattern};
use crate::parser::tokenizer::tokenize;
use crate::parser::types::{
    ActionCode, Alignment, AllocDirection, BackgroundData, BorderData, BorderLine, BorderShape,
    ElementKind, KeywordTable, PageOrientation, PageSizeData, RectSpot, SepData, SourceLocation,
};
use crate::parser::values::{
    ActionLeaf, AlignmentLeaf, AllocLeaf, BackgroundLeaf, BoolLeaf, BorderLeaf, BuffExchgLeaf,
    CalloutBeginLeaf, ConstrainLeaf, FloatLeaf, FloatPairLeaf, FreeFormLeaf, InsertLeaf, IntLeaf,
    Leaf, OrientationLeaf, PageSizeLeaf, PlacementLeaf, PointerLeaf, RotStepLeaf, SepLeaf,
    StringLeaf, StringListLeaf,
};

const DEFAULT_MARGIN: f32 = 0.05;
const DEFAULT_MARGIN_RANGE: (f32, f32) = (0.0, 100.0);
const DEFAULT_THICKNESS: f32 = 1.0 / 32.0;

/// The grammar tree plus the keyword table it parses against.
///
/// Construct once and reuse for a whole document; values accumulate on
/// the tree as lines are parsed, and `pop()` ends a local scope.
#[derive(Debug)]
pub struct Meta {
    root: Branch,
    table: KeywordTable,
}

impl Meta {
    pub fn new() -> Self {
        let mut root = Branch::new();

        root.add("!LPUB", Node::branch(lpub_branch()));
        root.add(
            "STEP",
            Node::leaf("STEP", Leaf::Action(ActionLeaf::new(ActionCode::Step))),
        );
        root.add(
            "CLEAR",
            Node::leaf("CLEAR", Leaf::Action(ActionLeaf::new(ActionCode::Clear))),
        );
        root.add("ROTSTEP", Node::leaf("ROTSTEP", Leaf::RotStep(RotStepLeaf::new())));
        root.add(
            "BUFEXCHG",
            Node::leaf("BUFEXCHG", Leaf::BuffExchg(BuffExchgLeaf::new())),
        );
        // Tolerated foreign family; its sub-directives are accepted and
        // ignored so both tools can annotate the same document.
        root.add("MLCAD", Node::branch(Branch::lenient()));

        root.set_preambles("0 ");

        Self {
            root,
            table: KeywordTable::new(),
        }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    /// Parse one line of the document. Lines that do not start a known
    /// directive family are not ours and come back `Ok` untouched.
    pub fn parse(&mut self, line: &str, here: &SourceLocation) -> Result<ActionCode, ParseError> {
        let mut argv = tokenize(line);
        if argv.is_empty() {
            return Ok(ActionCode::Ok);
        }
        // Drop the fixed line-type prefix.
        argv.remove(0);
        if argv.is_empty() {
            return Ok(ActionCode::Ok);
        }

        // Top-level keyword alias kept for older documents.
        if argv[0] == "LPUB" {
            argv[0] = "!LPUB".to_string();
        }

        // The legacy PLIST family maps straight onto the parts-list
        // subtree.
        if argv[0] == "PLIST" {
            let pli = self
                .root
                .child_mut("!LPUB")
                .and_then(|node| match node {
                    Node::Branch(branch) => branch.child_mut("PLI"),
                    Node::Leaf(_) => None,
                })
                .expect("parts-list subtree exists");
            return pli.parse(&argv, 1, here, &self.table);
        }

        if self.root.child(&argv[0]).is_some() {
            self.root.parse(&argv, 0, here, &self.table)
        } else {
            Ok(ActionCode::Ok)
        }
    }

    /// Probe whether a line's tokens form a prefix of a live grammar
    /// path, without mutating any state. Used for interactive
    /// assistance.
    pub fn preamble_match(&self, line: &str) -> bool {
        let mut argv = tokenize(line);
        if argv.is_empty() {
            return false;
        }
        argv.remove(0);
        if argv.is_empty() {
            return false;
        }
        if argv[0] == "LPUB" {
            argv[0] = "!LPUB".to_string();
        }
        self.root.child(&argv[0]).is_some() && self.root.preamble_match(&argv, 0)
    }

    /// Clear every scope flag and local override in the tree; call at
    /// the end of each local scope, or to reset after abandoning a
    /// document mid-parse.
    pub fn pop(&mut self) {
        self.root.pop();
    }

    /// One grammar summary per leaf, sorted by keyword path.
    pub fn documentation(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.root.doc(&mut out, "0");
        out
    }

    /// Look up a leaf by its keyword path, e.g.
    /// `["!LPUB", "PAGE", "NUMBER", "FONT_COLOR"]`.
    pub fn leaf(&self, path: &[&str]) -> Option<&LeafNode> {
        let mut branch = &self.root;
        for (i, key) in path.iter().copied().enumerate() {
            match branch.child(key)? {
                Node::Branch(next) => branch = next,
                Node::Leaf(leaf) => {
                    return if i + 1 == path.len() { Some(leaf) } else { None };
                }
            }
        }
        None
    }

    /// Mutable leaf lookup, used to seed defaults from project settings.
    pub fn leaf_mut(&mut self, path: &[&str]) -> Option<&mut LeafNode> {
        let mut branch = &mut self.root;
        for (i, key) in path.iter().copied().enumerate() {
            match branch.child_mut(key)? {
                Node::Branch(next) => branch = next,
                Node::Leaf(leaf) => {
                    return if i + 1 == path.len() { Some(leaf) } else { None };
                }
            }
        }
        None
    }
}

impl Default for Meta {
    fn default() -> Self {
        Self::new()
    }
}

fn margins(default: [f32; 2]) -> Node {
    Node::leaf(
        "MARGINS",
        Leaf::FloatPair(FloatPairLeaf::new(
            default,
            DEFAULT_MARGIN_RANGE.0,
            DEFAULT_MARGIN_RANGE.1,
        )),
    )
}

fn placement(rect: RectSpot, relative_to: ElementKind) -> Node {
    Node::leaf(
        "PLACEMENT",
        Leaf::Placement(PlacementLeaf::new(rect, relative_to)),
    )
}

fn action(keyword: &'static str, rc: ActionCode) -> Node {
    Node::leaf(keyword, Leaf::Action(ActionLeaf::new(rc)))
}

fn alloc(default: AllocDirection) -> Node {
    Node::leaf("ALLOC", Leaf::Alloc(AllocLeaf::new(default)))
}

/// Font, color, margins and placement of a rendered number (page number,
/// step number, instance counts, annotations).
fn number_branch(font: &'static str, color: &'static str, place: Node) -> Branch {
    let mut branch = Branch::new();
    branch.add("FONT", Node::leaf("FONT", Leaf::Str(StringLeaf::new(font))));
    branch.add(
        "FONT_COLOR",
        Node::leaf("FONT_COLOR", Leaf::Str(StringLeaf::new(color))),
    );
    branch.add("MARGINS", margins([0.0, 0.0]));
    branch.add("PLACEMENT", place);
    branch
}

fn model_scale() -> Node {
    Node::leaf(
        "MODEL_SCALE",
        Leaf::Float(FloatLeaf::new(1.0, -10000.0, 10000.0).with_formats(7, 4)),
    )
}

fn lpub_branch() -> Branch {
    let mut lpub = Branch::new();

    lpub.add("PAGE", Node::branch(page_branch()));
    lpub.add("ASSEM", Node::branch(assem_branch()));
    lpub.add("PLI", Node::branch(pli_branch()));
    lpub.add("BOM", Node::branch(bom_branch()));
    lpub.add("CALLOUT", Node::branch(callout_branch()));
    lpub.add("MULTI_STEP", Node::branch(multi_step_branch()));
    lpub.add_alias("STEP_GROUP", "MULTI_STEP");
    lpub.add(
        "STEP_NUMBER",
        Node::branch(number_branch(
            "Arial,18,-1,255,75,0,0,0,0,0",
            "black",
            placement(RectSpot::TopLeftOutsideCorner, ElementKind::Assembly),
        )),
    );
    lpub.add("SUBMODEL_DISPLAY", Node::branch(submodel_branch()));
    lpub.add("ROTATE_ICON", Node::branch(rotate_icon_branch()));
    lpub.add("INSERT", Node::leaf("INSERT", Leaf::Insert(InsertLeaf::new())));
    lpub.add(
        "RESERVE",
        Node::leaf(
            "RESERVE",
            Leaf::Float(FloatLeaf::new(0.0, 0.0, 1_000_000.0).with_rc(ActionCode::Reserve)),
        ),
    );
    lpub.add(
        "RESOLUTION",
        Node::leaf(
            "RESOLUTION",
            Leaf::Float(
                FloatLeaf::new(150.0, 10.0, 2400.0)
                    .with_rc(ActionCode::Resolution)
                    .with_formats(0, 0),
            ),
        ),
    );
    lpub.add("NOSTEP", action("NOSTEP", ActionCode::NoStep));
    lpub.add("FADE_STEP", Node::branch(fade_step_branch()));
    lpub.add("HIGHLIGHT_STEP", Node::branch(highlight_step_branch()));

    lpub
}

fn fade_step_branch() -> Branch {
    let mut fade = Branch::new();
    fade.add("ENABLED", Node::leaf("ENABLED", Leaf::Bool(BoolLeaf::new(false))));
    fade.add(
        "COLOR",
        Node::leaf("COLOR", Leaf::Str(StringLeaf::new("Very_Light_Bluish_Gray"))),
    );
    fade.add(
        "OPACITY",
        Node::leaf("OPACITY", Leaf::Int(IntLeaf::new(50, 0, 100))),
    );
    fade
}

fn highlight_step_branch() -> Branch {
    let mut highlight = Branch::new();
    highlight.add("ENABLED", Node::leaf("ENABLED", Leaf::Bool(BoolLeaf::new(false))));
    highlight.add(
        "COLOR",
        Node::leaf("COLOR", Leaf::Str(StringLeaf::new("#FFFF00"))),
    );
    highlight.add(
        "LINE_WIDTH",
        Node::leaf("LINE_WIDTH", Leaf::Int(IntLeaf::new(1, 0, 10))),
    );
    highlight
}

fn page_branch() -> Branch {
    let mut page = Branch::new();
    page.add(
        "SIZE",
        Node::leaf("SIZE", Leaf::PageSize(PageSizeLeaf::new(PageSizeData::default()))),
    );
    page.add(
        "ORIENTATION",
        Node::leaf(
            "ORIENTATION",
            Leaf::Orientation(OrientationLeaf::new(PageOrientation::Portrait)),
        ),
    );
    page.add("MARGINS", margins([DEFAULT_MARGIN, DEFAULT_MARGIN]));
    page.add(
        "BORDER",
        Node::leaf("BORDER", Leaf::Border(BorderLeaf::new(BorderData::default()))),
    );
    page.add(
        "BACKGROUND",
        Node::leaf(
            "BACKGROUND",
            Leaf::Background(BackgroundLeaf::new(BackgroundData::SubmodelColor)),
        ),
    );
    page.add(
        "DISPLAY_PAGE_NUMBER",
        Node::leaf("DISPLAY_PAGE_NUMBER", Leaf::Bool(BoolLeaf::new(true))),
    );
    page.add(
        "NUMBER",
        Node::branch(number_branch(
            "Arial,18,-1,255,75,0,0,0,0,0",
            "black",
            placement(RectSpot::BottomRightInsideCorner, ElementKind::Page),
        )),
    );
    page.add("PAGE_HEADER", Node::branch(header_footer_branch(true)));
    page.add("PAGE_FOOTER", Node::branch(header_footer_branch(false)));
    page.add(
        "POINTER",
        Node::leaf(
            "POINTER",
            Leaf::Pointer(PointerLeaf::new(true, ActionCode::PagePointer)),
        ),
    );
    page.add(
        "SUBMODEL_BACKGROUND_COLOR",
        Node::leaf(
            "SUBMODEL_BACKGROUND_COLOR",
            Leaf::StrList(StringListLeaf::new()),
        ),
    );
    page
}

fn header_footer_branch(header: bool) -> Branch {
    let mut branch = Branch::new();
    branch.add(
        "SIZE",
        Node::leaf(
            "SIZE",
            Leaf::FloatPair(FloatPairLeaf::new([8.5, 0.3], 0.0, 1000.0)),
        ),
    );
    branch.add(
        "PLACEMENT",
        if header {
            placement(RectSpot::TopInside, ElementKind::Page)
        } else {
            placement(RectSpot::BottomInside, ElementKind::Page)
        },
    );
    branch
}

fn assem_branch() -> Branch {
    let mut assem = Branch::new();
    assem.add("MARGINS", margins([0.0, 0.0]));
    assem.add(
        "PLACEMENT",
        placement(RectSpot::CenterCenter, ElementKind::Page),
    );
    assem.add("MODEL_SCALE", model_scale());
    assem.add(
        "SHOW_STEP_NUMBER",
        Node::leaf("SHOW_STEP_NUMBER", Leaf::Bool(BoolLeaf::new(true))),
    );
    assem
}

fn pli_border() -> BorderData {
    BorderData {
        shape: BorderShape::Square,
        line: BorderLine::Solid,
        color: "Black".to_string(),
        thickness: DEFAULT_THICKNESS,
        radius: 15.0,
        margin: [DEFAULT_MARGIN, DEFAULT_MARGIN],
        hidden: false,
    }
}

fn pli_branch() -> Branch {
    let mut pli = Branch::new();
    pli.add(
        "PLACEMENT",
        placement(RectSpot::RightTopOutside, ElementKind::StepNumber),
    );
    pli.add(
        "CONSTRAIN",
        Node::leaf("CONSTRAIN", Leaf::Constrain(ConstrainLeaf::new())),
    );
    pli.add(
        "BORDER",
        Node::leaf("BORDER", Leaf::Border(BorderLeaf::new(pli_border()))),
    );
    pli.add(
        "BACKGROUND",
        Node::leaf(
            "BACKGROUND",
            Leaf::Background(BackgroundLeaf::new(BackgroundData::Color(
                "#ffffff".to_string(),
            ))),
        ),
    );
    pli.add("MARGINS", margins([0.0, 0.0]));
    pli.add("MODEL_SCALE", model_scale());
    pli.add("SHOW", Node::leaf("SHOW", Leaf::Bool(BoolLeaf::new(true))));
    pli.add(
        "SORT_BY",
        Node::leaf("SORT_BY", Leaf::Str(StringLeaf::new("Part Size"))),
    );
    pli.add(
        "INSTANCE_COUNT",
        Node::branch(number_branch(
            "Arial,36,-1,255,75,0,0,0,0,0",
            "black",
            placement(RectSpot::TopLeftInsideCorner, ElementKind::PartsList),
        )),
    );
    pli.add(
        "ANNOTATE",
        Node::branch(number_branch(
            "Arial,24,-1,5,50,0,0,0,0,0",
            "#3a3938",
            placement(RectSpot::TopRightInsideCorner, ElementKind::PartsList),
        )),
    );

    let mut begin = Branch::new();
    begin.add("IGN", action("IGN", ActionCode::PliBegin));
    begin.add("SUB", action("SUB", ActionCode::PliBeginSub));
    pli.add("BEGIN", Node::branch(begin));
    pli.add("END", action("END", ActionCode::PliEnd));
    pli
}

fn bom_branch() -> Branch {
    let mut bom = Branch::new();
    bom.add(
        "PLACEMENT",
        placement(RectSpot::CenterCenter, ElementKind::Page),
    );
    bom.add(
        "CONSTRAIN",
        Node::leaf("CONSTRAIN", Leaf::Constrain(ConstrainLeaf::new())),
    );
    bom.add(
        "BORDER",
        Node::leaf("BORDER", Leaf::Border(BorderLeaf::new(pli_border()))),
    );
    bom.add(
        "BACKGROUND",
        Node::leaf(
            "BACKGROUND",
            Leaf::Background(BackgroundLeaf::new(BackgroundData::Color(
                "#ffffff".to_string(),
            ))),
        ),
    );
    bom.add("MARGINS", margins([0.0, 0.0]));
    bom
}

fn callout_branch() -> Branch {
    let mut callout = Branch::new();
    callout.add(
        "BEGIN",
        Node::leaf("BEGIN", Leaf::CalloutBegin(CalloutBeginLeaf::new())),
    );
    callout.add("DIVIDER", action("DIVIDER", ActionCode::CalloutDivider));
    callout.add("END", action("END", ActionCode::CalloutEnd));
    callout.add_with_pattern(
        "ALLOC",
        Pattern::AnyOf(&["HORIZONTAL", "VERTICAL"]),
        alloc(AllocDirection::Vertical),
    );
    callout.add("MARGINS", margins([DEFAULT_MARGIN, DEFAULT_MARGIN]));
    callout.add(
        "PLACEMENT",
        placement(RectSpot::LeftOutside, ElementKind::Assembly),
    );
    callout.add(
        "BORDER",
        Node::leaf("BORDER", Leaf::Border(BorderLeaf::new(pli_border()))),
    );
    callout.add(
        "BACKGROUND",
        Node::leaf(
            "BACKGROUND",
            Leaf::Background(BackgroundLeaf::new(BackgroundData::Color(
                "#ffffff".to_string(),
            ))),
        ),
    );
    callout.add(
        "FREEFORM",
        Node::leaf("FREEFORM", Leaf::FreeForm(FreeFormLeaf::new())),
    );
    callout.add(
        "POINTER",
        Node::leaf(
            "POINTER",
            Leaf::Pointer(PointerLeaf::new(false, ActionCode::CalloutPointer)),
        ),
    );
    callout.add(
        "DIVIDER_POINTER",
        Node::leaf(
            "DIVIDER_POINTER",
            Leaf::Pointer(PointerLeaf::new(false, ActionCode::CalloutDividerPointer)),
        ),
    );
    callout.add(
        "SEPARATOR",
        Node::leaf("SEPARATOR", Leaf::Sep(SepLeaf::new(SepData::default()))),
    );
    callout.add(
        "INSTANCE_COUNT",
        Node::branch(number_branch(
            "Arial,24,-1,255,75,0,0,0,0,0",
            "black",
            placement(RectSpot::TopLeftInsideCorner, ElementKind::Callout),
        )),
    );
    callout
}

fn multi_step_branch() -> Branch {
    let mut ms = Branch::new();
    ms.add("BEGIN", action("BEGIN", ActionCode::StepGroupBegin));
    ms.add("DIVIDER", action("DIVIDER", ActionCode::StepGroupDivider));
    ms.add("END", action("END", ActionCode::StepGroupEnd));
    ms.add_with_pattern(
        "ALLOC",
        Pattern::AnyOf(&["HORIZONTAL", "VERTICAL"]),
        alloc(AllocDirection::Vertical),
    );
    ms.add("MARGINS", margins([DEFAULT_MARGIN, DEFAULT_MARGIN]));
    ms.add(
        "PLACEMENT",
        placement(RectSpot::TopLeftInsideCorner, ElementKind::Page),
    );
    ms.add(
        "SEPARATOR",
        Node::leaf("SEPARATOR", Leaf::Sep(SepLeaf::new(SepData::default()))),
    );
    ms.add(
        "DIVIDER_POINTER",
        Node::leaf(
            "DIVIDER_POINTER",
            Leaf::Pointer(PointerLeaf::new(false, ActionCode::StepGroupDividerPointer)),
        ),
    );
    ms
}

fn submodel_branch() -> Branch {
    let mut sm = Branch::new();
    sm.add(
        "PLACEMENT",
        placement(RectSpot::TopLeftOutsideCorner, ElementKind::Assembly),
    );
    sm.add("MARGINS", margins([0.0, 0.0]));
    sm.add(
        "BORDER",
        Node::leaf("BORDER", Leaf::Border(BorderLeaf::new(pli_border()))),
    );
    sm.add(
        "BACKGROUND",
        Node::leaf(
            "BACKGROUND",
            Leaf::Background(BackgroundLeaf::new(BackgroundData::Color(
                "#ffffff".to_string(),
            ))),
        ),
    );
    sm.add("SHOW", Node::leaf("SHOW", Leaf::Bool(BoolLeaf::new(false))));
    sm
}

fn rotate_icon_branch() -> Branch {
    let mut ri = Branch::new();
    ri.add(
        "SIZE",
        Node::leaf(
            "SIZE",
            Leaf::FloatPair(FloatPairLeaf::new([0.52, 0.52], 0.0, 10.0)),
        ),
    );
    ri.add(
        "PLACEMENT",
        placement(RectSpot::RightOutside, ElementKind::Assembly),
    );
    ri.add("MARGINS", margins([0.0, 0.0]));
    ri.add(
        "BORDER",
        Node::leaf("BORDER", Leaf::Border(BorderLeaf::new(pli_border()))),
    );
    ri.add(
        "BACKGROUND",
        Node::leaf(
            "BACKGROUND",
            Leaf::Background(BackgroundLeaf::new(BackgroundData::Color(
                "#ffffff".to_string(),
            ))),
        ),
    );
    ri.add("DISPLAY", Node::leaf("DISPLAY", Leaf::Bool(BoolLeaf::new(true))));

    // Alignment of the rotate arrows on the icon face.
    ri.add(
        "ALIGNMENT",
        Node::leaf("ALIGNMENT", Leaf::Alignment(AlignmentLeaf::new(Alignment::Center))),
    );
    ri
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::types::{CompassSpot, Preposition};

    fn here() -> SourceLocation {
        SourceLocation::new("model.ldr", 1)
    }

    #[test]
    fn test_configuration_directive_stores_value() {
        let mut meta = Meta::new();
        let rc = meta
            .parse("0 !LPUB PAGE NUMBER FONT_COLOR \"black\"", &here())
            .unwrap();
        assert_eq!(rc, ActionCode::Ok);
        let leaf = meta
            .leaf(&["!LPUB", "PAGE", "NUMBER", "FONT_COLOR"])
            .unwrap();
        assert_eq!(leaf.leaf.as_str().unwrap().value.value(), "black");
        assert_eq!(leaf.format(false, false), "FONT_COLOR \"black\"");
    }

    #[test]
    fn test_action_directive_returns_code() {
        let mut meta = Meta::new();
        assert_eq!(meta.parse("0 STEP", &here()).unwrap(), ActionCode::Step);
        assert_eq!(
            meta.parse("0 !LPUB CALLOUT BEGIN", &here()).unwrap(),
            ActionCode::CalloutBegin
        );
        assert_eq!(
            meta.parse("0 !LPUB MULTI_STEP END", &here()).unwrap(),
            ActionCode::StepGroupEnd
        );
        assert_eq!(
            meta.parse("0 !LPUB INSERT PAGE", &here()).unwrap(),
            ActionCode::InsertPage
        );
        assert_eq!(
            meta.parse("0 BUFEXCHG A RETRIEVE", &here()).unwrap(),
            ActionCode::BufferLoad
        );
    }

    #[test]
    fn test_lpub_alias_normalized() {
        let mut meta = Meta::new();
        let rc = meta
            .parse("0 LPUB PAGE DISPLAY_PAGE_NUMBER FALSE", &here())
            .unwrap();
        assert_eq!(rc, ActionCode::Ok);
        let leaf = meta
            .leaf(&["!LPUB", "PAGE", "DISPLAY_PAGE_NUMBER"])
            .unwrap();
        assert!(!leaf.leaf.as_bool().unwrap().value.value());
    }

    #[test]
    fn test_foreign_directives_pass_through() {
        let mut meta = Meta::new();
        assert_eq!(
            meta.parse("0 LDCAD GROUP_DEF [ids=1]", &here()).unwrap(),
            ActionCode::Ok
        );
        assert_eq!(
            meta.parse("1 16 0 0 0 1 0 0 0 1 0 0 0 1 sub.ldr", &here())
                .unwrap(),
            ActionCode::Ok
        );
    }

    #[test]
    fn test_mlcad_family_is_lenient() {
        let mut meta = Meta::new();
        assert_eq!(
            meta.parse("0 MLCAD BTG Left Wing", &here()).unwrap(),
            ActionCode::Ok
        );
        assert_eq!(
            meta.parse("0 MLCAD HIDE", &here()).unwrap(),
            ActionCode::Ok
        );
    }

    #[test]
    fn test_plist_legacy_family_routes_to_pli() {
        let mut meta = Meta::new();
        let rc = meta.parse("0 PLIST SHOW FALSE", &here()).unwrap();
        assert_eq!(rc, ActionCode::Ok);
        let leaf = meta.leaf(&["!LPUB", "PLI", "SHOW"]).unwrap();
        assert!(!leaf.leaf.as_bool().unwrap().value.value());
    }

    #[test]
    fn test_step_group_alias() {
        let mut meta = Meta::new();
        assert_eq!(
            meta.parse("0 !LPUB STEP_GROUP BEGIN", &here()).unwrap(),
            ActionCode::StepGroupBegin
        );
    }

    #[test]
    fn test_keywordless_alloc_through_fallback() {
        let mut meta = Meta::new();
        let rc = meta.parse("0 !LPUB CALLOUT HORIZONTAL", &here()).unwrap();
        assert_eq!(rc, ActionCode::Ok);
        let leaf = meta.leaf(&["!LPUB", "CALLOUT", "ALLOC"]).unwrap();
        match &leaf.leaf {
            Leaf::Alloc(alloc) => assert_eq!(*alloc.value.value(), AllocDirection::Horizontal),
            other => panic!("expected alloc leaf, got {:?}", other),
        }
    }

    #[test]
    fn test_placement_directive_end_to_end() {
        let mut meta = Meta::new();
        let rc = meta
            .parse(
                "0 !LPUB PLI PLACEMENT BOTTOM_LEFT PAGE INSIDE 0.05 0",
                &here(),
            )
            .unwrap();
        assert_eq!(rc, ActionCode::Ok);
        let leaf = meta.leaf(&["!LPUB", "PLI", "PLACEMENT"]).unwrap();
        let value = leaf.leaf.as_placement().unwrap().value.value();
        assert_eq!(value.placement, CompassSpot::BottomLeft);
        assert_eq!(value.preposition, Preposition::Inside);
        assert_eq!(value.relative_to, ElementKind::Page);
        assert_eq!(value.offsets, [0.05, 0.0]);
    }

    #[test]
    fn test_syntax_error_reports_location() {
        let mut meta = Meta::new();
        let err = meta
            .parse("0 !LPUB PAGE MARGINS nope 0.05", &here())
            .unwrap_err();
        assert_eq!(err.location().line_number, 1);
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn test_preamble_probe_for_assistance() {
        let meta = Meta::new();
        assert!(meta.preamble_match("0 !LPUB PAGE NUMBER"));
        assert!(meta.preamble_match("0 LPUB CALLOUT"));
        assert!(!meta.preamble_match("0 !LPUB PAGE NONSENSE"));
        assert!(!meta.preamble_match("0 OTHERTOOL PAGE"));
    }

    #[test]
    fn test_documentation_covers_leaves() {
        let meta = Meta::new();
        let doc = meta.documentation();
        assert!(doc.iter().any(|line| line.contains("0 !LPUB PAGE MARGINS")));
        assert!(doc
            .iter()
            .any(|line| line.contains("0 !LPUB PLI PLACEMENT")));
        assert!(doc.iter().any(|line| line.starts_with("0 STEP")));
    }

    #[test]
    fn test_source_location_recorded() {
        let mut meta = Meta::new();
        let here = SourceLocation::new("model.ldr", 42);
        meta.parse("0 !LPUB PAGE MARGINS 0.1 0.1", &here).unwrap();
        let leaf = meta.leaf(&["!LPUB", "PAGE", "MARGINS"]).unwrap();
        let stored = leaf.leaf.as_float_pair().unwrap();
        assert_eq!(stored.value.here().unwrap().line_number, 42);
    }
}
