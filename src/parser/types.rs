//! Data types carried by directive values: placement descriptors, borders,
//! backgrounds, pointers, and the keyword table that names them all.

use std::collections::HashMap;
use std::fmt;

/// Identifies the originating model file and line of a parsed directive.
///
/// Every stored value keeps one of these so edits can be written back to
/// the exact line that produced the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub model_name: String,
    pub line_number: usize,
}

impl SourceLocation {
    pub fn new(model_name: impl Into<String>, line_number: usize) -> Self {
        Self {
            model_name: model_name.into(),
            line_number,
        }
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self {
            model_name: "undefined".to_string(),
            line_number: 0,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.model_name, self.line_number)
    }
}

/// Outcome of parsing one directive line.
///
/// `Ok` means a configuration value was stored and nothing else happens.
/// Every other code asks the caller to change mode: open a page, start a
/// callout, exchange a buffer, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCode {
    Ok,

    Step,
    RotStep,
    Clear,

    CalloutBegin,
    CalloutDivider,
    CalloutEnd,
    CalloutPointer,
    CalloutDividerPointer,

    StepGroupBegin,
    StepGroupDivider,
    StepGroupEnd,
    StepGroupDividerPointer,

    Insert,
    InsertPage,
    InsertCoverPage,
    InsertFinalModel,

    PagePointer,

    BufferStore,
    BufferLoad,

    PliBegin,
    PliBeginSub,
    PliEnd,

    PageSize,
    PageOrientation,
    Reserve,
    Resolution,
    NoStep,
}

impl ActionCode {
    /// True for codes that require the caller to change mode rather than
    /// just accept a stored configuration value.
    pub fn is_action(self) -> bool {
        self != ActionCode::Ok
    }
}

/// The nine compass positions an element can occupy around or within its
/// anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompassSpot {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    Center,
}

impl CompassSpot {
    pub fn keyword(self) -> &'static str {
        match self {
            CompassSpot::TopLeft => "TOP_LEFT",
            CompassSpot::Top => "TOP",
            CompassSpot::TopRight => "TOP_RIGHT",
            CompassSpot::Right => "RIGHT",
            CompassSpot::BottomRight => "BOTTOM_RIGHT",
            CompassSpot::Bottom => "BOTTOM",
            CompassSpot::BottomLeft => "BOTTOM_LEFT",
            CompassSpot::Left => "LEFT",
            CompassSpot::Center => "CENTER",
        }
    }
}

/// Whether a dependent sits within its anchor's rectangle or beyond it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preposition {
    Inside,
    Outside,
}

impl Preposition {
    pub fn keyword(self) -> &'static str {
        match self {
            Preposition::Inside => "INSIDE",
            Preposition::Outside => "OUTSIDE",
        }
    }
}

/// The 25 distinct spots of the placement grid.
///
/// Think of the possible placements as a five-by-five table of places
/// around and within a rectangle:
///
/// ```text
///  TopLeftOutsideCorner    TopLeftOutside         TopOutside     TopRightOutside         TopRightOutsideCorner
///  LeftTopOutside          TopLeftInsideCorner    TopInside      TopRightInsideCorner    RightTopOutside
///  LeftOutside             LeftInside             CenterCenter   RightInside             RightOutside
///  LeftBottomOutside       BottomLeftInsideCorner BottomInside   BottomRightInsideCorner RightBottomOutside
///  BottomLeftOutsideCorner BottomLeftOutside      BottomOutside  BottomRightOutside      BottomRightOutsideCorner
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum RectSpot {
    TopLeftOutsideCorner,
    TopLeftOutside,
    TopOutside,
    TopRightOutside,
    TopRightOutsideCorner,

    LeftTopOutside,
    TopLeftInsideCorner,
    TopInside,
    TopRightInsideCorner,
    RightTopOutside,

    LeftOutside,
    LeftInside,
    CenterCenter,
    RightInside,
    RightOutside,

    LeftBottomOutside,
    BottomLeftInsideCorner,
    BottomInside,
    BottomRightInsideCorner,
    RightBottomOutside,

    BottomLeftOutsideCorner,
    BottomLeftOutside,
    BottomOutside,
    BottomRightOutside,
    BottomRightOutsideCorner,
}

pub const NUM_RECT_SPOTS: usize = 25;

const RECT_SPOTS: [RectSpot; NUM_RECT_SPOTS] = [
    RectSpot::TopLeftOutsideCorner,
    RectSpot::TopLeftOutside,
    RectSpot::TopOutside,
    RectSpot::TopRightOutside,
    RectSpot::TopRightOutsideCorner,
    RectSpot::LeftTopOutside,
    RectSpot::TopLeftInsideCorner,
    RectSpot::TopInside,
    RectSpot::TopRightInsideCorner,
    RectSpot::RightTopOutside,
    RectSpot::LeftOutside,
    RectSpot::LeftInside,
    RectSpot::CenterCenter,
    RectSpot::RightInside,
    RectSpot::RightOutside,
    RectSpot::LeftBottomOutside,
    RectSpot::BottomLeftInsideCorner,
    RectSpot::BottomInside,
    RectSpot::BottomRightInsideCorner,
    RectSpot::RightBottomOutside,
    RectSpot::BottomLeftOutsideCorner,
    RectSpot::BottomLeftOutside,
    RectSpot::BottomOutside,
    RectSpot::BottomRightOutside,
    RectSpot::BottomRightOutsideCorner,
];

/// Decode table mapping each of the 25 grid spots to its
/// (placement, justification, preposition) triple. The inverse mapping is
/// `RectSpot::from_parts`.
const RECT_DECODE: [(CompassSpot, CompassSpot, Preposition); NUM_RECT_SPOTS] = [
    (CompassSpot::TopLeft, CompassSpot::Center, Preposition::Outside),
    (CompassSpot::Top, CompassSpot::Left, Preposition::Outside),
    (CompassSpot::Top, CompassSpot::Center, Preposition::Outside),
    (CompassSpot::Top, CompassSpot::Right, Preposition::Outside),
    (CompassSpot::TopRight, CompassSpot::Center, Preposition::Outside),
    (CompassSpot::Left, CompassSpot::Top, Preposition::Outside),
    (CompassSpot::TopLeft, CompassSpot::Center, Preposition::Inside),
    (CompassSpot::Top, CompassSpot::Center, Preposition::Inside),
    (CompassSpot::TopRight, CompassSpot::Center, Preposition::Inside),
    (CompassSpot::Right, CompassSpot::Top, Preposition::Outside),
    (CompassSpot::Left, CompassSpot::Center, Preposition::Outside),
    (CompassSpot::Left, CompassSpot::Center, Preposition::Inside),
    (CompassSpot::Center, CompassSpot::Center, Preposition::Inside),
    (CompassSpot::Right, CompassSpot::Center, Preposition::Inside),
    (CompassSpot::Right, CompassSpot::Center, Preposition::Outside),
    (CompassSpot::Left, CompassSpot::Bottom, Preposition::Outside),
    (CompassSpot::BottomLeft, CompassSpot::Center, Preposition::Inside),
    (CompassSpot::Bottom, CompassSpot::Center, Preposition::Inside),
    (CompassSpot::BottomRight, CompassSpot::Center, Preposition::Inside),
    (CompassSpot::Right, CompassSpot::Bottom, Preposition::Outside),
    (CompassSpot::BottomLeft, CompassSpot::Center, Preposition::Outside),
    (CompassSpot::Bottom, CompassSpot::Left, Preposition::Outside),
    (CompassSpot::Bottom, CompassSpot::Center, Preposition::Outside),
    (CompassSpot::Bottom, CompassSpot::Right, Preposition::Outside),
    (CompassSpot::BottomRight, CompassSpot::Center, Preposition::Outside),
];

/// Textual grammar for each grid spot: placement keyword, justification
/// keyword (empty when the spot takes none), preposition keyword. This is
/// the table `PlacementData::parse` searches when reassembling a spot from
/// directive tokens.
const RECT_GRAMMAR: [(&str, &str, &str); NUM_RECT_SPOTS] = [
    ("TOP_LEFT", "", "OUTSIDE"),
    ("TOP", "LEFT", "OUTSIDE"),
    ("TOP", "CENTER", "OUTSIDE"),
    ("TOP", "RIGHT", "OUTSIDE"),
    ("TOP_RIGHT", "", "OUTSIDE"),
    ("LEFT", "TOP", "OUTSIDE"),
    ("TOP_LEFT", "", "INSIDE"),
    ("TOP", "", "INSIDE"),
    ("TOP_RIGHT", "", "INSIDE"),
    ("RIGHT", "TOP", "OUTSIDE"),
    ("LEFT", "CENTER", "OUTSIDE"),
    ("LEFT", "", "INSIDE"),
    ("CENTER", "", "INSIDE"),
    ("RIGHT", "", "INSIDE"),
    ("RIGHT", "CENTER", "OUTSIDE"),
    ("LEFT", "BOTTOM", "OUTSIDE"),
    ("BOTTOM_LEFT", "", "INSIDE"),
    ("BOTTOM", "", "INSIDE"),
    ("BOTTOM_RIGHT", "", "INSIDE"),
    ("RIGHT", "BOTTOM", "OUTSIDE"),
    ("BOTTOM_LEFT", "", "OUTSIDE"),
    ("BOTTOM", "LEFT", "OUTSIDE"),
    ("BOTTOM", "CENTER", "OUTSIDE"),
    ("BOTTOM", "RIGHT", "OUTSIDE"),
    ("BOTTOM_RIGHT", "", "OUTSIDE"),
];

impl RectSpot {
    /// Every spot of the grid, in table order.
    pub fn all() -> [RectSpot; NUM_RECT_SPOTS] {
        RECT_SPOTS
    }

    /// The (placement, justification, preposition) triple for this spot.
    pub fn decode(self) -> (CompassSpot, CompassSpot, Preposition) {
        RECT_DECODE[self as usize]
    }

    /// Reassemble a spot from the textual triple found on a directive
    /// line. `justification` is empty for corners, center, and all inside
    /// spots.
    pub fn from_grammar(placement: &str, justification: &str, preposition: &str) -> Option<Self> {
        RECT_GRAMMAR
            .iter()
            .position(|&(p, j, pre)| p == placement && j == justification && pre == preposition)
            .map(|i| RECT_SPOTS[i])
    }

    /// The BASE_* keyword naming this spot in page-pointer directives.
    /// Only the nine inside spots have one.
    pub fn base_keyword(self) -> Option<&'static str> {
        match self {
            RectSpot::TopLeftInsideCorner => Some("BASE_TOP_LEFT"),
            RectSpot::TopInside => Some("BASE_TOP"),
            RectSpot::TopRightInsideCorner => Some("BASE_TOP_RIGHT"),
            RectSpot::LeftInside => Some("BASE_LEFT"),
            RectSpot::CenterCenter => Some("BASE_CENTER"),
            RectSpot::RightInside => Some("BASE_RIGHT"),
            RectSpot::BottomLeftInsideCorner => Some("BASE_BOTTOM_LEFT"),
            RectSpot::BottomInside => Some("BASE_BOTTOM"),
            RectSpot::BottomRightInsideCorner => Some("BASE_BOTTOM_RIGHT"),
            _ => None,
        }
    }
}

/// What an element is, and therefore what other elements may anchor to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Page,
    Assembly,
    StepGroup,
    StepNumber,
    PartsList,
    Callout,
    PageNumber,
    PageHeader,
    PageFooter,
    Submodel,
    RotateIcon,
    Step,
    Range,
    Reserve,
    Bom,
    PagePointer,
    SingleStep,
    CoverPage,
}

impl ElementKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ElementKind::Page => "PAGE",
            ElementKind::Assembly => "ASSEM",
            ElementKind::StepGroup => "MULTI_STEP",
            ElementKind::StepNumber => "STEP_NUMBER",
            ElementKind::PartsList => "PLI",
            ElementKind::Callout => "CALLOUT",
            ElementKind::PageNumber => "PAGE_NUMBER",
            ElementKind::PageHeader => "PAGE_HEADER",
            ElementKind::PageFooter => "PAGE_FOOTER",
            ElementKind::Submodel => "SUBMODEL_DISPLAY",
            ElementKind::RotateIcon => "ROTATE_ICON",
            ElementKind::Step => "STEP",
            ElementKind::Range => "RANGE",
            ElementKind::Reserve => "RESERVE",
            ElementKind::Bom => "BOM",
            ElementKind::PagePointer => "PAGE_POINTER",
            ElementKind::SingleStep => "SINGLE_STEP",
            ElementKind::CoverPage => "COVER_PAGE",
        }
    }
}

/// Where one element sits relative to another.
///
/// `rect` is always derivable from `(placement, justification,
/// preposition)` through the 25-entry decode table, and vice versa;
/// `PlacementData::from_rect` maintains the invariant.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementData {
    pub placement: CompassSpot,
    pub justification: CompassSpot,
    pub relative_to: ElementKind,
    pub preposition: Preposition,
    pub rect: RectSpot,
    /// Fine nudge as a fraction of the anchor's size on each axis.
    pub offsets: [f32; 2],
}

impl PlacementData {
    /// Build a descriptor from a grid spot and an anchor kind, deriving
    /// the compass triple from the decode table.
    pub fn from_rect(rect: RectSpot, relative_to: ElementKind) -> Self {
        let (placement, justification, preposition) = rect.decode();
        Self {
            placement,
            justification,
            relative_to,
            preposition,
            rect,
            offsets: [0.0, 0.0],
        }
    }
}

impl Default for PlacementData {
    fn default() -> Self {
        Self::from_rect(RectSpot::TopLeftInsideCorner, ElementKind::Page)
    }
}

/// Border shape alternatives selected by the leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderShape {
    None,
    Square,
    Round,
}

/// Line style carried by the newer border format as a numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BorderLine {
    NoLine = 0,
    Solid = 1,
    Dash = 2,
    Dot = 3,
    DashDot = 4,
    DashDotDot = 5,
}

impl BorderLine {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(BorderLine::NoLine),
            1 => Some(BorderLine::Solid),
            2 => Some(BorderLine::Dash),
            3 => Some(BorderLine::Dot),
            4 => Some(BorderLine::DashDot),
            5 => Some(BorderLine::DashDotDot),
            _ => None,
        }
    }
}

/// A border around an element: shape, line style, color, thickness, corner
/// radius for the round shape, and margins between border and content.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderData {
    pub shape: BorderShape,
    pub line: BorderLine,
    pub color: String,
    pub thickness: f32,
    pub radius: f32,
    pub margin: [f32; 2],
    /// Set by the HIDDEN alternative; the border participates in layout
    /// but is not drawn.
    pub hidden: bool,
}

impl Default for BorderData {
    fn default() -> Self {
        Self {
            shape: BorderShape::None,
            line: BorderLine::NoLine,
            color: "Black".to_string(),
            thickness: 0.125,
            radius: 15.0,
            margin: [0.0, 0.0],
            hidden: false,
        }
    }
}

/// Gradient fill description, stored exactly as the directive spells it:
/// numeric mode/spread/type codes, size, angle, way-points and color
/// stops.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientData {
    pub mode: u8,
    pub spread: u8,
    pub gradient_type: u8,
    pub size: [f32; 2],
    pub angle: f32,
    pub points: Vec<(f32, f32)>,
    /// (position, rgba) pairs.
    pub stops: Vec<(f32, u32)>,
}

/// Background alternatives selected by the leading keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundData {
    Transparent,
    SubmodelColor,
    Color(String),
    Picture { file: String, stretch: bool },
    Gradient(GradientData),
}

impl Default for BackgroundData {
    fn default() -> Self {
        BackgroundData::Transparent
    }
}

/// Pointer (arrow) geometry: where the pointer leaves its base rectangle
/// and where tip, base and the mid-segment control points sit, all as
/// fractions of the anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerData {
    pub placement: CompassSpot,
    /// Fraction along the chosen side for edge placements; unused for
    /// corners.
    pub loc: f32,
    pub base: f32,
    pub segments: u32,
    pub tip: (f32, f32),
    pub base_point: (f32, f32),
    pub mid_base: (f32, f32),
    pub mid_tip: (f32, f32),
    /// Base rectangle spot, carried only by page pointers.
    pub rect: RectSpot,
}

impl Default for PointerData {
    fn default() -> Self {
        Self {
            placement: CompassSpot::TopLeft,
            loc: 0.0,
            base: 0.125,
            segments: 1,
            tip: (0.5, 0.5),
            base_point: (0.5, 0.5),
            mid_base: (0.5, 0.5),
            mid_tip: (0.5, 0.5),
            rect: RectSpot::TopLeftOutsideCorner,
        }
    }
}

/// Divider separator between ranges of steps.
#[derive(Debug, Clone, PartialEq)]
pub struct SepData {
    pub length: SepLength,
    pub thickness: f32,
    pub color: String,
    pub margin: [f32; 2],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SepLength {
    Default,
    Page,
    Custom(f32),
}

impl Default for SepData {
    fn default() -> Self {
        Self {
            length: SepLength::Default,
            thickness: 0.125,
            color: "Black".to_string(),
            margin: [0.0, 0.0],
        }
    }
}

/// Constraint on how a parts list allocates its rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstrainData {
    Area,
    Square,
    Width(f32),
    Height(f32),
    Columns(f32),
}

impl Default for ConstrainData {
    fn default() -> Self {
        ConstrainData::Area
    }
}

/// Free-form placement: either off, or "justify against this base element
/// along this edge".
#[derive(Debug, Clone, PartialEq)]
pub struct FreeFormData {
    pub mode: bool,
    pub base: ElementKind,
    pub justification: CompassSpot,
}

impl Default for FreeFormData {
    fn default() -> Self {
        Self {
            mode: false,
            base: ElementKind::StepNumber,
            justification: CompassSpot::Left,
        }
    }
}

/// Direction ranges of steps are stacked within their container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocDirection {
    Horizontal,
    Vertical,
}

/// Text alignment within an inserted text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOrientation {
    Portrait,
    Landscape,
}

/// Page dimensions plus the named size they were derived from, when any.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSizeData {
    pub size: [f32; 2],
    pub size_id: String,
}

impl Default for PageSizeData {
    fn default() -> Self {
        Self {
            size: [8.5, 11.0],
            size_id: "Letter".to_string(),
        }
    }
}

/// A rotation applied to the model before rendering a step, or `END` to
/// drop back to the default view.
#[derive(Debug, Clone, PartialEq)]
pub struct RotStepData {
    pub rots: [f32; 3],
    pub kind: Option<RotStepKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotStepKind {
    Absolute,
    Relative,
    Additive,
}

impl RotStepKind {
    pub fn keyword(self) -> &'static str {
        match self {
            RotStepKind::Absolute => "ABS",
            RotStepKind::Relative => "REL",
            RotStepKind::Additive => "ADD",
        }
    }
}

impl Default for RotStepData {
    fn default() -> Self {
        Self {
            rots: [0.0, 0.0, 0.0],
            kind: None,
        }
    }
}

/// Named part-buffer exchange: store the current state or retrieve a
/// previously stored one.
#[derive(Debug, Clone, PartialEq)]
pub struct BuffExchgData {
    pub buffer: char,
    pub retrieve: bool,
}

impl Default for BuffExchgData {
    fn default() -> Self {
        Self {
            buffer: 'A',
            retrieve: false,
        }
    }
}

/// An object inserted onto the page outside the normal step flow.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertKind {
    Picture { name: String, scale: f32 },
    Text { text: String, font: String, color: String },
    Arrow {
        head: (f32, f32),
        tail: (f32, f32),
        hafting_depth: f32,
        hafting_tip: (f32, f32),
    },
    Bom,
    RotateIcon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertData {
    pub kind: InsertKind,
    pub offsets: [f32; 2],
}

impl Default for InsertData {
    fn default() -> Self {
        Self {
            kind: InsertKind::Bom,
            offsets: [0.0, 0.0],
        }
    }
}

/// The keyword table translates directive tokens to the enums the grammar
/// and placement code work with. Built once when a `Meta` is constructed
/// and passed by reference into every parse call.
#[derive(Debug)]
pub struct KeywordTable {
    element_kinds: HashMap<&'static str, ElementKind>,
    compass: HashMap<&'static str, CompassSpot>,
    base_rects: HashMap<&'static str, RectSpot>,
}

impl KeywordTable {
    pub fn new() -> Self {
        let mut element_kinds = HashMap::new();
        for kind in [
            ElementKind::Page,
            ElementKind::Assembly,
            ElementKind::StepGroup,
            ElementKind::StepNumber,
            ElementKind::PartsList,
            ElementKind::Callout,
            ElementKind::PageNumber,
            ElementKind::PageHeader,
            ElementKind::PageFooter,
            ElementKind::Submodel,
            ElementKind::RotateIcon,
            ElementKind::Step,
            ElementKind::Range,
            ElementKind::Reserve,
            ElementKind::Bom,
            ElementKind::PagePointer,
            ElementKind::SingleStep,
            ElementKind::CoverPage,
        ] {
            element_kinds.insert(kind.keyword(), kind);
        }
        // legacy alias
        element_kinds.insert("STEP_GROUP", ElementKind::StepGroup);

        let mut compass = HashMap::new();
        for spot in [
            CompassSpot::TopLeft,
            CompassSpot::Top,
            CompassSpot::TopRight,
            CompassSpot::Right,
            CompassSpot::BottomRight,
            CompassSpot::Bottom,
            CompassSpot::BottomLeft,
            CompassSpot::Left,
            CompassSpot::Center,
        ] {
            compass.insert(spot.keyword(), spot);
        }

        let mut base_rects = HashMap::new();
        base_rects.insert("BASE_TOP_LEFT", RectSpot::TopLeftInsideCorner);
        base_rects.insert("BASE_TOP", RectSpot::TopInside);
        base_rects.insert("BASE_TOP_RIGHT", RectSpot::TopRightInsideCorner);
        base_rects.insert("BASE_LEFT", RectSpot::LeftInside);
        base_rects.insert("BASE_CENTER", RectSpot::CenterCenter);
        base_rects.insert("BASE_RIGHT", RectSpot::RightInside);
        base_rects.insert("BASE_BOTTOM_LEFT", RectSpot::BottomLeftInsideCorner);
        base_rects.insert("BASE_BOTTOM", RectSpot::BottomInside);
        base_rects.insert("BASE_BOTTOM_RIGHT", RectSpot::BottomRightInsideCorner);

        Self {
            element_kinds,
            compass,
            base_rects,
        }
    }

    pub fn element_kind(&self, token: &str) -> Option<ElementKind> {
        self.element_kinds.get(token).copied()
    }

    pub fn compass(&self, token: &str) -> Option<CompassSpot> {
        self.compass.get(token).copied()
    }

    pub fn base_rect(&self, token: &str) -> Option<RectSpot> {
        self.base_rects.get(token).copied()
    }

    /// The base-rect keyword for a spot, for page-pointer formatting.
    pub fn base_rect_keyword(&self, rect: RectSpot) -> Option<&'static str> {
        rect.base_keyword()
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_decode_round_trips_through_grammar() {
        // Every spot's textual triple must map back to the same spot.
        for (i, &(p, j, pre)) in RECT_GRAMMAR.iter().enumerate() {
            let spot = RectSpot::from_grammar(p, j, pre).expect("grammar triple resolves");
            assert_eq!(spot as usize, i);
        }
    }

    #[test]
    fn test_rect_decode_matches_grammar_table() {
        // The enum decode and the textual grammar describe the same grid.
        for &spot in RECT_SPOTS.iter() {
            let (placement, justification, preposition) = spot.decode();
            let (p, j, pre) = RECT_GRAMMAR[spot as usize];
            assert_eq!(placement.keyword(), p);
            assert_eq!(preposition.keyword(), pre);
            if !j.is_empty() {
                assert_eq!(justification.keyword(), j);
            }
        }
    }

    #[test]
    fn test_placement_data_from_rect() {
        let data = PlacementData::from_rect(RectSpot::BottomRightInsideCorner, ElementKind::Page);
        assert_eq!(data.placement, CompassSpot::BottomRight);
        assert_eq!(data.preposition, Preposition::Inside);
        assert_eq!(data.relative_to, ElementKind::Page);
        assert_eq!(data.offsets, [0.0, 0.0]);
    }

    #[test]
    fn test_keyword_table_element_kinds() {
        let table = KeywordTable::new();
        assert_eq!(table.element_kind("PAGE"), Some(ElementKind::Page));
        assert_eq!(table.element_kind("ASSEM"), Some(ElementKind::Assembly));
        // alias
        assert_eq!(table.element_kind("STEP_GROUP"), Some(ElementKind::StepGroup));
        assert_eq!(table.element_kind("MULTI_STEP"), Some(ElementKind::StepGroup));
        assert_eq!(table.element_kind("NOT_A_KIND"), None);
    }

    #[test]
    fn test_keyword_table_base_rects() {
        let table = KeywordTable::new();
        assert_eq!(table.base_rect("BASE_BOTTOM"), Some(RectSpot::BottomInside));
        assert_eq!(table.base_rect_keyword(RectSpot::BottomInside), Some("BASE_BOTTOM"));
        assert_eq!(table.base_rect_keyword(RectSpot::TopOutside), None);
    }

    #[test]
    fn test_source_location_display() {
        let here = SourceLocation::new("model.ldr", 42);
        assert_eq!(here.to_string(), "model.ldr:42");
    }
}
