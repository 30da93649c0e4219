//! The value library: every typed leaf a directive line can set.
//!
//! Each leaf owns a two-slot store (page-wide default plus an optional
//! scope override) and the source location of the directive that set it,
//! so values can be reformatted and written back to the document. Parsing
//! fills the slot selected by the node's `pushed` flag; formatting
//! re-emits a canonical, re-parseable suffix for the current value.

use crate::error::ParseError;
use crate::parser::types::{
    ActionCode, Alignment, AllocDirection, BackgroundData, BorderData, BorderLine, BorderShape,
    BuffExchgData, CompassSpot, ConstrainData, ElementKind, FreeFormData, GradientData, InsertData,
    InsertKind, KeywordTable, PageOrientation, PageSizeData, PlacementData, PointerData, RectSpot,
    RotStepData, RotStepKind, SepData, SepLength, SourceLocation,
};

/// Two-slot scoped storage: a page-wide default and an optional LOCAL
/// override, each remembering where it was set.
///
/// `pop()` discards the override; the default slot is never touched by a
/// pop, which is what makes the scope law hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Scoped<T> {
    default: T,
    local: Option<T>,
    default_here: Option<SourceLocation>,
    local_here: Option<SourceLocation>,
}

impl<T: Clone> Scoped<T> {
    pub fn new(default: T) -> Self {
        Self {
            default,
            local: None,
            default_here: None,
            local_here: None,
        }
    }

    /// The active value: the override when one is set, the default
    /// otherwise.
    pub fn value(&self) -> &T {
        self.local.as_ref().unwrap_or(&self.default)
    }

    /// The default slot, unaffected by scope overrides.
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// True while a LOCAL override is stored.
    pub fn is_overridden(&self) -> bool {
        self.local.is_some()
    }

    /// Store a value into the slot selected by `pushed`.
    pub fn store(&mut self, value: T, here: &SourceLocation, pushed: bool) {
        if pushed {
            self.local = Some(value);
            self.local_here = Some(here.clone());
        } else {
            self.default = value;
            self.default_here = Some(here.clone());
        }
    }

    /// Read-modify-write of the slot selected by `pushed`, seeding the
    /// override from the active value when it does not exist yet.
    pub fn modify(&mut self, here: &SourceLocation, pushed: bool, f: impl FnOnce(&mut T)) {
        if pushed {
            let mut value = self.value().clone();
            f(&mut value);
            self.local = Some(value);
            self.local_here = Some(here.clone());
        } else {
            f(&mut self.default);
            self.default_here = Some(here.clone());
        }
    }

    /// Overwrite the default slot without recording a location; used when
    /// applying project settings before any parsing happens.
    pub fn set_default(&mut self, value: T) {
        self.default = value;
    }

    /// The location of the directive that set the active value.
    pub fn here(&self) -> Option<&SourceLocation> {
        if self.local.is_some() {
            self.local_here.as_ref()
        } else {
            self.default_here.as_ref()
        }
    }

    pub fn pop(&mut self) {
        self.local = None;
        self.local_here = None;
    }
}

fn parse_f32(token: &str) -> Option<f32> {
    token.parse::<f32>().ok()
}

/* ------------------ */

/// A leaf that stores nothing and answers with a fixed action code; used
/// for flow-control directives like STEP or CALLOUT END.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionLeaf {
    pub rc: ActionCode,
    pub here: Option<SourceLocation>,
}

impl ActionLeaf {
    pub fn new(rc: ActionCode) -> Self {
        Self { rc, here: None }
    }

    pub fn parse(&mut self, here: &SourceLocation) -> Result<ActionCode, ParseError> {
        self.here = Some(here.clone());
        Ok(self.rc)
    }
}

/* ------------------ */

#[derive(Debug, Clone, PartialEq)]
pub struct IntLeaf {
    pub value: Scoped<i32>,
    pub min: i32,
    pub max: i32,
    pub radix: u32,
    pub rc: ActionCode,
}

impl IntLeaf {
    pub fn new(default: i32, min: i32, max: i32) -> Self {
        Self {
            value: Scoped::new(default),
            min,
            max,
            radix: 10,
            rc: ActionCode::Ok,
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
    ) -> Result<ActionCode, ParseError> {
        if index + 1 == args.len() {
            if let Ok(v) = i32::from_str_radix(&args[index], self.radix) {
                if v < self.min || v > self.max {
                    return Err(ParseError::range(
                        here,
                        args,
                        v as f32,
                        self.min as f32,
                        self.max as f32,
                    ));
                }
                self.value.store(v, here, pushed);
                return Ok(self.rc);
            }
        }
        Err(ParseError::syntax(here, args))
    }

    pub fn format_value(&self) -> String {
        if self.radix == 16 {
            format!("{:x}", self.value.value())
        } else {
            format!("{}", self.value.value())
        }
    }

    pub fn doc(&self) -> String {
        "<integer>".to_string()
    }
}

/* ------------------ */

#[derive(Debug, Clone, PartialEq)]
pub struct FloatLeaf {
    pub value: Scoped<f32>,
    pub min: f32,
    pub max: f32,
    pub field_width: usize,
    pub precision: usize,
    pub rc: ActionCode,
}

impl FloatLeaf {
    pub fn new(default: f32, min: f32, max: f32) -> Self {
        Self {
            value: Scoped::new(default),
            min,
            max,
            field_width: 6,
            precision: 4,
            rc: ActionCode::Ok,
        }
    }

    pub fn with_rc(mut self, rc: ActionCode) -> Self {
        self.rc = rc;
        self
    }

    pub fn with_formats(mut self, field_width: usize, precision: usize) -> Self {
        self.field_width = field_width;
        self.precision = precision;
        self
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
    ) -> Result<ActionCode, ParseError> {
        if index + 1 == args.len() {
            if let Some(v) = parse_f32(&args[index]) {
                if v < self.min || v > self.max {
                    return Err(ParseError::range(here, args, v, self.min, self.max));
                }
                self.value.store(v, here, pushed);
                return Ok(self.rc);
            }
        }
        Err(ParseError::syntax(here, args))
    }

    pub fn format_value(&self) -> String {
        format!(
            "{:>width$.prec$}",
            self.value.value(),
            width = self.field_width,
            prec = self.precision
        )
    }

    pub fn doc(&self) -> String {
        "<float>".to_string()
    }
}

/* ------------------ */

/// Two floats with a shared range, used for margins, sizes and camera
/// angles. Stored in document units (inches); `value_pixels` converts with
/// the resolution the rendering collaborator reports.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatPairLeaf {
    pub value: Scoped<[f32; 2]>,
    pub min: f32,
    pub max: f32,
    pub field_width: usize,
    pub precision: usize,
    pub rc: ActionCode,
}

impl FloatPairLeaf {
    pub fn new(default: [f32; 2], min: f32, max: f32) -> Self {
        Self {
            value: Scoped::new(default),
            min,
            max,
            field_width: 6,
            precision: 4,
            rc: ActionCode::Ok,
        }
    }

    pub fn value_pixels(&self, dpi: f32) -> [f32; 2] {
        let v = self.value.value();
        [v[0] * dpi, v[1] * dpi]
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
    ) -> Result<ActionCode, ParseError> {
        if args.len() - index == 2 {
            if let (Some(v0), Some(v1)) = (parse_f32(&args[index]), parse_f32(&args[index + 1])) {
                for v in [v0, v1] {
                    if v < self.min || v > self.max {
                        return Err(ParseError::range(here, args, v, self.min, self.max));
                    }
                }
                self.value.store([v0, v1], here, pushed);
                return Ok(self.rc);
            }
        }
        Err(ParseError::syntax(here, args))
    }

    pub fn format_value(&self) -> String {
        let v = self.value.value();
        format!(
            "{:>w$.p$} {:>w$.p$}",
            v[0],
            v[1],
            w = self.field_width,
            p = self.precision
        )
    }

    pub fn doc(&self) -> String {
        "<float> <float>".to_string()
    }
}

/* ------------------ */

#[derive(Debug, Clone, PartialEq)]
pub struct StringLeaf {
    pub value: Scoped<String>,
    pub delim: &'static str,
    pub rc: ActionCode,
}

impl StringLeaf {
    pub fn new(default: &str) -> Self {
        Self {
            value: Scoped::new(default.to_string()),
            delim: "\"",
            rc: ActionCode::Ok,
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
    ) -> Result<ActionCode, ParseError> {
        if args.len() - index == 1 {
            self.value.store(args[index].clone(), here, pushed);
            return Ok(self.rc);
        }
        Err(ParseError::syntax(here, args))
    }

    pub fn format_value(&self) -> String {
        format!("{}{}{}", self.delim, self.value.value(), self.delim)
    }

    pub fn doc(&self) -> String {
        "<\"string\">".to_string()
    }
}

/* ------------------ */

/// A ragged tail of strings; cannot fail to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct StringListLeaf {
    pub value: Scoped<Vec<String>>,
    pub delim: &'static str,
    pub rc: ActionCode,
}

impl StringListLeaf {
    pub fn new() -> Self {
        Self {
            value: Scoped::new(Vec::new()),
            delim: "\"",
            rc: ActionCode::Ok,
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
    ) -> Result<ActionCode, ParseError> {
        let values: Vec<String> = args[index..].to_vec();
        self.value.store(values, here, pushed);
        Ok(self.rc)
    }

    pub fn format_value(&self) -> String {
        self.value
            .value()
            .iter()
            .map(|v| format!("{}{}{}", self.delim, v, self.delim))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn doc(&self) -> String {
        "<\"string\"> <\"string\"> .....".to_string()
    }
}

impl Default for StringListLeaf {
    fn default() -> Self {
        Self::new()
    }
}

/* ------------------ */

#[derive(Debug, Clone, PartialEq)]
pub struct BoolLeaf {
    pub value: Scoped<bool>,
    pub rc: ActionCode,
}

impl BoolLeaf {
    pub fn new(default: bool) -> Self {
        Self {
            value: Scoped::new(default),
            rc: ActionCode::Ok,
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
    ) -> Result<ActionCode, ParseError> {
        if args.len() - index == 1 && (args[index] == "TRUE" || args[index] == "FALSE") {
            self.value.store(args[index] == "TRUE", here, pushed);
            return Ok(self.rc);
        }
        Err(ParseError::syntax(here, args))
    }

    pub fn format_value(&self) -> String {
        if *self.value.value() { "TRUE" } else { "FALSE" }.to_string()
    }

    pub fn doc(&self) -> String {
        "<TRUE|FALSE>".to_string()
    }
}

/* ------------------ */

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementLeaf {
    pub value: Scoped<PlacementData>,
    pub rc: ActionCode,
}

impl PlacementLeaf {
    pub fn new(rect: RectSpot, relative_to: ElementKind) -> Self {
        Self {
            value: Scoped::new(PlacementData::from_rect(rect, relative_to)),
            rc: ActionCode::Ok,
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
        table: &KeywordTable,
    ) -> Result<ActionCode, ParseError> {
        let argc = args.len();
        let mut i = index;
        if i >= argc {
            return Err(ParseError::syntax(here, args));
        }

        // The drag-to-rewrite shortcut updates only the fine offsets.
        if args[i] == "OFFSET" && argc - i == 3 {
            if let (Some(x), Some(y)) = (parse_f32(&args[i + 1]), parse_f32(&args[i + 2])) {
                self.value.modify(here, pushed, |v| v.offsets = [x, y]);
                return Ok(self.rc);
            }
            return Err(ParseError::syntax(here, args));
        }

        let is_relative_to = |tok: &str| table.element_kind(tok).is_some();

        let placement;
        let mut justification = "";
        match args[i].as_str() {
            // Edge placements may take a cross-axis justification.
            p @ ("TOP" | "BOTTOM") => {
                placement = p;
                i += 1;
                if i >= argc {
                    return Err(ParseError::syntax(here, args));
                }
                if matches!(args[i].as_str(), "LEFT" | "CENTER" | "RIGHT") {
                    justification = args[i].as_str();
                    i += 1;
                } else if !is_relative_to(&args[i]) {
                    return Err(ParseError::syntax(here, args));
                }
            }
            p @ ("LEFT" | "RIGHT") => {
                placement = p;
                i += 1;
                if i >= argc {
                    return Err(ParseError::syntax(here, args));
                }
                if matches!(args[i].as_str(), "TOP" | "CENTER" | "BOTTOM") {
                    justification = args[i].as_str();
                    i += 1;
                } else if !is_relative_to(&args[i]) {
                    return Err(ParseError::syntax(here, args));
                }
            }
            p @ ("TOP_LEFT" | "TOP_RIGHT" | "BOTTOM_LEFT" | "BOTTOM_RIGHT" | "CENTER") => {
                placement = p;
                i += 1;
            }
            _ => return Err(ParseError::syntax(here, args)),
        }

        if i >= argc {
            return Err(ParseError::syntax(here, args));
        }
        let relative_to = match table.element_kind(&args[i]) {
            Some(kind) => {
                i += 1;
                kind
            }
            None => return Err(ParseError::syntax(here, args)),
        };

        let mut preposition = "";
        if i < argc && matches!(args[i].as_str(), "INSIDE" | "OUTSIDE") {
            preposition = args[i].as_str();
            i += 1;
        }

        let mut offsets = [0.0f32, 0.0];
        if argc - i == 2 {
            match (parse_f32(&args[i]), parse_f32(&args[i + 1])) {
                (Some(x), Some(y)) => {
                    offsets = [x, y];
                    i += 2;
                }
                _ => return Err(ParseError::syntax(here, args)),
            }
        }
        if i != argc {
            return Err(ParseError::syntax(here, args));
        }

        // Inside placements carry no justification in the grammar table.
        let justification = if preposition == "INSIDE" && justification == "CENTER" {
            ""
        } else {
            justification
        };

        // When the preposition is omitted (the bare corner-plus-anchor
        // form) the inside spot wins over the outside one.
        let rect = if preposition.is_empty() {
            RectSpot::from_grammar(placement, justification, "INSIDE")
                .or_else(|| RectSpot::from_grammar(placement, justification, "OUTSIDE"))
        } else {
            RectSpot::from_grammar(placement, justification, preposition)
        };
        let rect = rect.ok_or_else(|| ParseError::syntax(here, args))?;

        let mut data = PlacementData::from_rect(rect, relative_to);
        data.offsets = offsets;
        self.value.store(data, here, pushed);
        Ok(self.rc)
    }

    pub fn format_value(&self) -> String {
        let v = self.value.value();
        let mut out = match (v.preposition, v.placement) {
            // Outside edges carry their justification; every other spot
            // is fully named by the placement keyword alone.
            (
                crate::parser::types::Preposition::Outside,
                CompassSpot::Top | CompassSpot::Bottom | CompassSpot::Left | CompassSpot::Right,
            ) => format!(
                "{} {} {} {}",
                v.placement.keyword(),
                v.justification.keyword(),
                v.relative_to.keyword(),
                v.preposition.keyword()
            ),
            _ => format!(
                "{} {} {}",
                v.placement.keyword(),
                v.relative_to.keyword(),
                v.preposition.keyword()
            ),
        };
        if v.offsets[0] != 0.0 || v.offsets[1] != 0.0 {
            out.push_str(&format!(" {} {}", v.offsets[0], v.offsets[1]));
        }
        out
    }

    pub fn doc(&self) -> Vec<String> {
        vec![
            "(TOP|BOTTOM) (LEFT|CENTER|RIGHT) <relativeTo> (INSIDE|OUTSIDE) [<offsetX> <offsetY>]"
                .to_string(),
            "(LEFT|RIGHT) (TOP|CENTER|BOTTOM) <relativeTo> (INSIDE|OUTSIDE)".to_string(),
            "(TOP_LEFT|TOP_RIGHT|BOTTOM_LEFT|BOTTOM_RIGHT|CENTER) <relativeTo> [INSIDE|OUTSIDE]"
                .to_string(),
        ]
    }
}

/* ------------------ */

#[derive(Debug, Clone, PartialEq)]
pub struct BorderLeaf {
    pub value: Scoped<BorderData>,
    pub rc: ActionCode,
}

impl BorderLeaf {
    pub fn new(default: BorderData) -> Self {
        Self {
            value: Scoped::new(default),
            rc: ActionCode::Ok,
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
    ) -> Result<ActionCode, ParseError> {
        let argc = args.len();
        let mut i = index;
        if i >= argc {
            return Err(ParseError::syntax(here, args));
        }
        let mut data = self.value.value().clone();

        // The newer format carries a numeric line-style code right after
        // the shape keyword.
        let line_code = args
            .get(i + 1)
            .and_then(|t| t.parse::<u8>().ok())
            .and_then(BorderLine::from_code);

        match args[i].as_str() {
            "NONE" => {
                data.shape = BorderShape::None;
                data.hidden = false;
                if let Some(line) = line_code {
                    data.line = line;
                    i += 2;
                } else {
                    data.line = BorderLine::Solid;
                    i += 1;
                }
            }
            shape @ ("HIDDEN" | "SQUARE") => {
                data.shape = BorderShape::Square;
                data.hidden = shape == "HIDDEN";
                if let Some(line) = line_code {
                    if argc - i < 4 {
                        return Err(ParseError::syntax(here, args));
                    }
                    data.line = line;
                    data.color = args[i + 2].clone();
                    data.thickness =
                        parse_f32(&args[i + 3]).ok_or_else(|| ParseError::syntax(here, args))?;
                    i += 4;
                } else {
                    if argc - i < 3 {
                        return Err(ParseError::syntax(here, args));
                    }
                    data.line = BorderLine::Solid;
                    data.color = args[i + 1].clone();
                    data.thickness =
                        parse_f32(&args[i + 2]).ok_or_else(|| ParseError::syntax(here, args))?;
                    i += 3;
                }
            }
            "ROUND" => {
                data.shape = BorderShape::Round;
                data.hidden = false;
                if let Some(line) = line_code {
                    if argc - i < 5 {
                        return Err(ParseError::syntax(here, args));
                    }
                    data.line = line;
                    data.color = args[i + 2].clone();
                    data.thickness =
                        parse_f32(&args[i + 3]).ok_or_else(|| ParseError::syntax(here, args))?;
                    data.radius =
                        parse_f32(&args[i + 4]).ok_or_else(|| ParseError::syntax(here, args))?;
                    i += 5;
                } else {
                    if argc - i < 4 {
                        return Err(ParseError::syntax(here, args));
                    }
                    data.line = BorderLine::Solid;
                    data.color = args[i + 1].clone();
                    data.thickness =
                        parse_f32(&args[i + 2]).ok_or_else(|| ParseError::syntax(here, args))?;
                    data.radius =
                        parse_f32(&args[i + 3]).ok_or_else(|| ParseError::syntax(here, args))?;
                    i += 4;
                }
            }
            _ => return Err(ParseError::syntax(here, args)),
        }

        match argc - i {
            0 => {}
            3 if args[i] == "MARGINS" => {
                match (parse_f32(&args[i + 1]), parse_f32(&args[i + 2])) {
                    (Some(x), Some(y)) => data.margin = [x, y],
                    _ => return Err(ParseError::syntax(here, args)),
                }
            }
            _ => return Err(ParseError::syntax(here, args)),
        }

        self.value.store(data, here, pushed);
        Ok(self.rc)
    }

    pub fn format_value(&self) -> String {
        let v = self.value.value();
        let body = match v.shape {
            BorderShape::None => format!("NONE {}", v.line as u8),
            BorderShape::Square => format!(
                "{} {} {} {}",
                if v.hidden { "HIDDEN" } else { "SQUARE" },
                v.line as u8,
                v.color,
                v.thickness
            ),
            BorderShape::Round => format!(
                "ROUND {} {} {} {}",
                v.line as u8, v.color, v.thickness, v.radius
            ),
        };
        format!("{} MARGINS {} {}", body, v.margin[0], v.margin[1])
    }

    pub fn doc(&self) -> String {
        "(NONE <line>|HIDDEN <line> <color> <thickness>|SQUARE <line> <color> <thickness>|\
         ROUND <line> <color> <thickness> <radius>) MARGINS <x> <y>"
            .to_string()
    }
}

/* ------------------ */

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundLeaf {
    pub value: Scoped<BackgroundData>,
    pub rc: ActionCode,
}

impl BackgroundLeaf {
    pub fn new(default: BackgroundData) -> Self {
        Self {
            value: Scoped::new(default),
            rc: ActionCode::Ok,
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
    ) -> Result<ActionCode, ParseError> {
        let data = match args.len() - index {
            1 => match args[index].as_str() {
                "TRANS" | "TRANSPARENT" => BackgroundData::Transparent,
                "SUBMODEL_BACKGROUND_COLOR" => BackgroundData::SubmodelColor,
                file => BackgroundData::Picture {
                    file: file.to_string(),
                    stretch: false,
                },
            },
            2 => match args[index].as_str() {
                "COLOR" => BackgroundData::Color(args[index + 1].clone()),
                "PICTURE" => BackgroundData::Picture {
                    file: args[index + 1].clone(),
                    stretch: false,
                },
                _ => return Err(ParseError::syntax(here, args)),
            },
            3 if args[index] == "PICTURE" && args[index + 2] == "STRETCH" => {
                BackgroundData::Picture {
                    file: args[index + 1].clone(),
                    stretch: true,
                }
            }
            9 if args[index] == "GRADIENT" => {
                let gradient = Self::parse_gradient(&args[index + 1..index + 9])
                    .ok_or_else(|| ParseError::syntax(here, args))?;
                BackgroundData::Gradient(gradient)
            }
            _ => return Err(ParseError::syntax(here, args)),
        };
        self.value.store(data, here, pushed);
        Ok(self.rc)
    }

    fn parse_gradient(args: &[String]) -> Option<GradientData> {
        let mode = args[0].parse::<u8>().ok().filter(|&m| m <= 2)?;
        let spread = args[1].parse::<u8>().ok().filter(|&s| s <= 2)?;
        let gradient_type = args[2].parse::<u8>().ok().filter(|&t| t <= 2)?;
        let size = [parse_f32(&args[3])?, parse_f32(&args[4])?];
        let angle = parse_f32(&args[5])?;

        let mut points = Vec::new();
        for point in args[6].split('|') {
            let (x, y) = point.split_once(',')?;
            points.push((parse_f32(x)?, parse_f32(y)?));
        }

        let mut stops = Vec::new();
        for stop in args[7].split('|') {
            let (pos, rgba) = stop.split_once(',')?;
            let rgba = rgba.trim_start_matches("0x").trim_start_matches("0X");
            stops.push((parse_f32(pos)?, u32::from_str_radix(rgba, 16).ok()?));
        }

        Some(GradientData {
            mode,
            spread,
            gradient_type,
            size,
            angle,
            points,
            stops,
        })
    }

    pub fn format_value(&self) -> String {
        match self.value.value() {
            BackgroundData::Transparent => "TRANSPARENT".to_string(),
            BackgroundData::SubmodelColor => "SUBMODEL_BACKGROUND_COLOR".to_string(),
            BackgroundData::Color(color) => format!("COLOR \"{}\"", color),
            BackgroundData::Picture { file, stretch } => {
                if *stretch {
                    format!("PICTURE \"{}\" STRETCH", file)
                } else {
                    format!("PICTURE \"{}\"", file)
                }
            }
            BackgroundData::Gradient(g) => {
                let points = g
                    .points
                    .iter()
                    .map(|(x, y)| format!("{},{}", x, y))
                    .collect::<Vec<_>>()
                    .join("|");
                let stops = g
                    .stops
                    .iter()
                    .map(|(pos, rgba)| format!("{},0x{:08x}", pos, rgba))
                    .collect::<Vec<_>>()
                    .join("|");
                format!(
                    "GRADIENT {} {} {} {} {} {} \"{}\" \"{}\"",
                    g.mode, g.spread, g.gradient_type, g.size[0], g.size[1], g.angle, points, stops
                )
            }
        }
    }

    pub fn doc(&self) -> String {
        "(TRANSPARENT|SUBMODEL_BACKGROUND_COLOR|COLOR <\"color\">|\
         GRADIENT <mode> <spread> <type> <sizeX> <sizeY> <angle> <\"points\"> <\"stops\">|\
         PICTURE <\"file\"> [STRETCH])"
            .to_string()
    }
}

/* ------------------ */

/// Pointer geometry. A page pointer additionally carries the base-rect
/// spot its stem leaves from, so the leaf knows at construction whether it
/// speaks the page-pointer dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerLeaf {
    pub value: Scoped<PointerData>,
    pub page_pointer: bool,
    pub rc: ActionCode,
}

impl PointerLeaf {
    pub fn new(page_pointer: bool, rc: ActionCode) -> Self {
        Self {
            value: Scoped::new(PointerData::default()),
            page_pointer,
            rc,
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
        table: &KeywordTable,
    ) -> Result<ActionCode, ParseError> {
        let n = args.len() - index;
        if n == 0 {
            return Err(ParseError::syntax(here, args));
        }
        let pp = self.page_pointer;
        let corner = matches!(
            args[index].as_str(),
            "TOP_LEFT" | "TOP_RIGHT" | "BOTTOM_LEFT" | "BOTTOM_RIGHT"
        );
        let edge = matches!(
            args[index].as_str(),
            "TOP" | "BOTTOM" | "LEFT" | "RIGHT" | "CENTER"
        );
        if !corner && !edge {
            return Err(ParseError::syntax(here, args));
        }

        let placement = table
            .compass(&args[index])
            .ok_or_else(|| ParseError::syntax(here, args))?;

        let f = |off: usize| parse_f32(&args[index + off]);
        let mut data = self.value.value().clone();
        data.placement = placement;
        data.rect = RectSpot::TopLeftInsideCorner;

        let syntax = || ParseError::syntax(here, args);
        let mut base = -1.0f32;

        // Single-segment forms: tip only, optionally followed by a base
        // width. Edge forms lead with the fraction along the side.
        if corner && (n == 3 || n == 4) {
            data.loc = 0.0;
            data.tip = (f(1).ok_or_else(syntax)?, f(2).ok_or_else(syntax)?);
            if n == 4 {
                base = f(3).ok_or_else(syntax)?;
            }
        } else if edge && (n == 4 || n == 5) {
            data.loc = f(1).ok_or_else(syntax)?;
            data.tip = (f(2).ok_or_else(syntax)?, f(3).ok_or_else(syntax)?);
            if n == 5 {
                base = f(4).ok_or_else(syntax)?;
            }
        } else {
            // Multi-segment forms append base/mid control points and a
            // segment count; page pointers add the base-rect keyword.
            let lead = if corner { 0 } else { 1 };
            let tail = if pp { 1 } else { 0 };
            let with_base = n == 1 + lead + 8 + 2 + tail;
            let without_base = n == 1 + lead + 8 + 1 + tail;
            if !with_base && !without_base {
                return Err(syntax());
            }
            let mut off = 1;
            if !corner {
                data.loc = f(off).ok_or_else(syntax)?;
                off += 1;
            }
            data.tip = (f(off).ok_or_else(syntax)?, f(off + 1).ok_or_else(syntax)?);
            data.base_point = (f(off + 2).ok_or_else(syntax)?, f(off + 3).ok_or_else(syntax)?);
            data.mid_base = (f(off + 4).ok_or_else(syntax)?, f(off + 5).ok_or_else(syntax)?);
            data.mid_tip = (f(off + 6).ok_or_else(syntax)?, f(off + 7).ok_or_else(syntax)?);
            off += 8;
            if with_base {
                base = f(off).ok_or_else(syntax)?;
                off += 1;
            }
            data.segments = args[index + off].parse::<u32>().map_err(|_| syntax())?;
            off += 1;
            if pp {
                data.rect = table.base_rect(&args[index + off]).ok_or_else(syntax)?;
            }
        }

        if base > 0.0 {
            data.base = base;
        } else if data.base == 0.0 {
            data.base = 1.0 / 8.0;
        }
        self.value.store(data, here, pushed);
        Ok(self.rc)
    }

    pub fn format_value(&self) -> String {
        let v = self.value.value();
        let corner = matches!(
            v.placement,
            CompassSpot::TopLeft | CompassSpot::TopRight | CompassSpot::BottomLeft | CompassSpot::BottomRight
        );
        let mut out = v.placement.keyword().to_string();
        if !corner {
            out.push_str(&format!(" {:.3}", v.loc));
        }
        out.push_str(&format!(
            " {:.3} {:.3} {:.3} {:.3} {:.3} {:.3} {:.3} {:.3} {} {}",
            v.tip.0,
            v.tip.1,
            v.base_point.0,
            v.base_point.1,
            v.mid_base.0,
            v.mid_base.1,
            v.mid_tip.0,
            v.mid_tip.1,
            v.base,
            v.segments
        ));
        if self.page_pointer {
            if let Some(kw) = v.rect.base_keyword() {
                out.push_str(&format!(" {}", kw));
            }
        }
        out
    }

    pub fn doc(&self) -> String {
        "(TOP_LEFT|TOP_RIGHT|BOTTOM_LEFT|BOTTOM_RIGHT|TOP|BOTTOM|LEFT|RIGHT|CENTER) [<loc>] \
         <tipX> <tipY> [<baseX> <baseY> <midBaseX> <midBaseY> <midTipX> <midTipY>] <base> \
         [<segments>] [<BASE_RECT>]"
            .to_string()
    }
}

/* ------------------ */

#[derive(Debug, Clone, PartialEq)]
pub struct SepLeaf {
    pub value: Scoped<SepData>,
    pub rc: ActionCode,
}

impl SepLeaf {
    pub fn new(default: SepData) -> Self {
        Self {
            value: Scoped::new(default),
            rc: ActionCode::Ok,
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
    ) -> Result<ActionCode, ParseError> {
        let syntax = || ParseError::syntax(here, args);
        let data = match args.len() - index {
            4 => SepData {
                length: SepLength::Default,
                thickness: parse_f32(&args[index]).ok_or_else(syntax)?,
                color: args[index + 1].clone(),
                margin: [
                    parse_f32(&args[index + 2]).ok_or_else(syntax)?,
                    parse_f32(&args[index + 3]).ok_or_else(syntax)?,
                ],
            },
            5 if matches!(args[index].as_str(), "PAGE" | "PAGE_LENGTH") => SepData {
                length: SepLength::Page,
                thickness: parse_f32(&args[index + 1]).ok_or_else(syntax)?,
                color: args[index + 2].clone(),
                margin: [
                    parse_f32(&args[index + 3]).ok_or_else(syntax)?,
                    parse_f32(&args[index + 4]).ok_or_else(syntax)?,
                ],
            },
            6 if matches!(args[index].as_str(), "CUSTOM" | "CUSTOM_LENGTH") => SepData {
                length: SepLength::Custom(parse_f32(&args[index + 1]).ok_or_else(syntax)?),
                thickness: parse_f32(&args[index + 2]).ok_or_else(syntax)?,
                color: args[index + 3].clone(),
                margin: [
                    parse_f32(&args[index + 4]).ok_or_else(syntax)?,
                    parse_f32(&args[index + 5]).ok_or_else(syntax)?,
                ],
            },
            _ => return Err(syntax()),
        };
        self.value.store(data, here, pushed);
        Ok(self.rc)
    }

    pub fn format_value(&self) -> String {
        let v = self.value.value();
        match v.length {
            SepLength::Default => format!(
                "{} {} {} {}",
                v.thickness, v.color, v.margin[0], v.margin[1]
            ),
            SepLength::Page => format!(
                "PAGE_LENGTH {} {} {} {}",
                v.thickness, v.color, v.margin[0], v.margin[1]
            ),
            SepLength::Custom(length) => format!(
                "CUSTOM_LENGTH {} {} {} {} {}",
                length, v.thickness, v.color, v.margin[0], v.margin[1]
            ),
        }
    }

    pub fn doc(&self) -> String {
        "[PAGE_LENGTH|CUSTOM_LENGTH <length>] <thickness> <color> <marginX> <marginY>".to_string()
    }
}

/* ------------------ */

#[derive(Debug, Clone, PartialEq)]
pub struct FreeFormLeaf {
    pub value: Scoped<FreeFormData>,
    pub rc: ActionCode,
}

impl FreeFormLeaf {
    pub fn new() -> Self {
        Self {
            value: Scoped::new(FreeFormData::default()),
            rc: ActionCode::Ok,
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
        table: &KeywordTable,
    ) -> Result<ActionCode, ParseError> {
        let remaining = args.len() - index;
        if remaining == 1 && args[index] == "FALSE" {
            let mut data = self.value.value().clone();
            data.mode = false;
            self.value.store(data, here, pushed);
            return Ok(self.rc);
        }
        if remaining == 2 {
            let base_ok = matches!(
                args[index].as_str(),
                "STEP_NUMBER" | "ASSEM" | "PLI" | "ROTATE_ICON"
            );
            let just = table.compass(&args[index + 1]);
            if base_ok {
                if let (Some(base), Some(justification)) =
                    (table.element_kind(&args[index]), just)
                {
                    if matches!(
                        justification,
                        CompassSpot::Left
                            | CompassSpot::Right
                            | CompassSpot::Top
                            | CompassSpot::Bottom
                            | CompassSpot::Center
                    ) {
                        self.value.store(
                            FreeFormData {
                                mode: true,
                                base,
                                justification,
                            },
                            here,
                            pushed,
                        );
                        return Ok(self.rc);
                    }
                }
            }
        }
        Err(ParseError::syntax(here, args))
    }

    pub fn format_value(&self) -> String {
        let v = self.value.value();
        if v.mode {
            format!("{} {}", v.base.keyword(), v.justification.keyword())
        } else {
            "FALSE".to_string()
        }
    }

    pub fn doc(&self) -> String {
        "(FALSE|(STEP_NUMBER|ASSEM|PLI|ROTATE_ICON) (LEFT|RIGHT|TOP|BOTTOM|CENTER))".to_string()
    }
}

impl Default for FreeFormLeaf {
    fn default() -> Self {
        Self::new()
    }
}

/* ------------------ */

#[derive(Debug, Clone, PartialEq)]
pub struct ConstrainLeaf {
    pub value: Scoped<ConstrainData>,
    pub rc: ActionCode,
}

impl ConstrainLeaf {
    pub fn new() -> Self {
        Self {
            value: Scoped::new(ConstrainData::Area),
            rc: ActionCode::Ok,
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
    ) -> Result<ActionCode, ParseError> {
        let data = match args.len() - index {
            1 => match args[index].as_str() {
                "AREA" => ConstrainData::Area,
                "SQUARE" => ConstrainData::Square,
                _ => return Err(ParseError::syntax(here, args)),
            },
            2 => {
                let v = parse_f32(&args[index + 1])
                    .ok_or_else(|| ParseError::syntax(here, args))?;
                match args[index].as_str() {
                    "WIDTH" => ConstrainData::Width(v),
                    "HEIGHT" => ConstrainData::Height(v),
                    "COLS" => ConstrainData::Columns(v),
                    _ => return Err(ParseError::syntax(here, args)),
                }
            }
            _ => return Err(ParseError::syntax(here, args)),
        };
        self.value.store(data, here, pushed);
        Ok(self.rc)
    }

    pub fn format_value(&self) -> String {
        match self.value.value() {
            ConstrainData::Area => "AREA".to_string(),
            ConstrainData::Square => "SQUARE".to_string(),
            ConstrainData::Width(v) => format!("WIDTH {}", v),
            ConstrainData::Height(v) => format!("HEIGHT {}", v),
            ConstrainData::Columns(v) => format!("COLS {}", v),
        }
    }

    pub fn doc(&self) -> String {
        "(AREA|SQUARE|(WIDTH|HEIGHT|COLS) <number>)".to_string()
    }
}

impl Default for ConstrainLeaf {
    fn default() -> Self {
        Self::new()
    }
}

/* ------------------ */

#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentLeaf {
    pub value: Scoped<Alignment>,
    pub rc: ActionCode,
}

impl AlignmentLeaf {
    pub fn new(default: Alignment) -> Self {
        Self {
            value: Scoped::new(default),
            rc: ActionCode::Ok,
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
    ) -> Result<ActionCode, ParseError> {
        if args.len() - index == 1 {
            let value = match args[index].as_str() {
                "LEFT" => Alignment::Left,
                "CENTER" => Alignment::Center,
                "RIGHT" => Alignment::Right,
                _ => return Err(ParseError::syntax(here, args)),
            };
            self.value.store(value, here, pushed);
            return Ok(self.rc);
        }
        Err(ParseError::syntax(here, args))
    }

    pub fn format_value(&self) -> String {
        match self.value.value() {
            Alignment::Left => "LEFT",
            Alignment::Center => "CENTER",
            Alignment::Right => "RIGHT",
        }
        .to_string()
    }

    pub fn doc(&self) -> String {
        "(LEFT|CENTER|RIGHT)".to_string()
    }
}

/* ------------------ */

#[derive(Debug, Clone, PartialEq)]
pub struct AllocLeaf {
    pub value: Scoped<AllocDirection>,
    pub rc: ActionCode,
}

impl AllocLeaf {
    pub fn new(default: AllocDirection) -> Self {
        Self {
            value: Scoped::new(default),
            rc: ActionCode::Ok,
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
    ) -> Result<ActionCode, ParseError> {
        if args.len() - index == 1 {
            let value = match args[index].as_str() {
                "HORIZONTAL" => AllocDirection::Horizontal,
                "VERTICAL" => AllocDirection::Vertical,
                _ => return Err(ParseError::syntax(here, args)),
            };
            self.value.store(value, here, pushed);
            return Ok(self.rc);
        }
        Err(ParseError::syntax(here, args))
    }

    pub fn format_value(&self) -> String {
        match self.value.value() {
            AllocDirection::Horizontal => "HORIZONTAL",
            AllocDirection::Vertical => "VERTICAL",
        }
        .to_string()
    }

    pub fn doc(&self) -> String {
        "(HORIZONTAL|VERTICAL)".to_string()
    }
}

/* ------------------ */

#[derive(Debug, Clone, PartialEq)]
pub struct OrientationLeaf {
    pub value: Scoped<PageOrientation>,
    pub rc: ActionCode,
}

impl OrientationLeaf {
    pub fn new(default: PageOrientation) -> Self {
        Self {
            value: Scoped::new(default),
            rc: ActionCode::PageOrientation,
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
    ) -> Result<ActionCode, ParseError> {
        if args.len() - index == 1 {
            let value = match args[index].as_str() {
                "PORTRAIT" => PageOrientation::Portrait,
                "LANDSCAPE" => PageOrientation::Landscape,
                _ => return Err(ParseError::syntax(here, args)),
            };
            self.value.store(value, here, pushed);
            return Ok(self.rc);
        }
        Err(ParseError::syntax(here, args))
    }

    pub fn format_value(&self) -> String {
        match self.value.value() {
            PageOrientation::Portrait => "PORTRAIT",
            PageOrientation::Landscape => "LANDSCAPE",
        }
        .to_string()
    }

    pub fn doc(&self) -> String {
        "(PORTRAIT|LANDSCAPE)".to_string()
    }
}

/* ------------------ */

/// Named page sizes in inches, for the one-token form of the size
/// directive.
const PAGE_SIZES: [(&str, f32, f32); 6] = [
    ("A3", 11.6929, 16.5354),
    ("A4", 8.2677, 11.6929),
    ("A5", 5.8268, 8.2677),
    ("Legal", 8.5, 14.0),
    ("Letter", 8.5, 11.0),
    ("Tabloid", 11.0, 17.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct PageSizeLeaf {
    pub value: Scoped<PageSizeData>,
    pub min: f32,
    pub max: f32,
    pub field_width: usize,
    pub precision: usize,
    pub rc: ActionCode,
}

impl PageSizeLeaf {
    pub fn new(default: PageSizeData) -> Self {
        Self {
            value: Scoped::new(default),
            min: 0.0,
            max: 1000.0,
            field_width: 6,
            precision: 4,
            rc: ActionCode::PageSize,
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
    ) -> Result<ActionCode, ParseError> {
        let remaining = args.len() - index;
        if remaining >= 2 {
            if let (Some(w), Some(h)) = (parse_f32(&args[index]), parse_f32(&args[index + 1])) {
                for v in [w, h] {
                    if v < self.min || v > self.max {
                        return Err(ParseError::range(here, args, v, self.min, self.max));
                    }
                }
                let size_id = if remaining == 3 {
                    args[index + 2].clone()
                } else {
                    "Custom".to_string()
                };
                self.value.store(PageSizeData { size: [w, h], size_id }, here, pushed);
                return Ok(self.rc);
            }
        }
        if remaining == 1 && !args[index].eq_ignore_ascii_case("custom") {
            let wanted = &args[index];
            if let Some(&(id, w, h)) = PAGE_SIZES
                .iter()
                .find(|(id, _, _)| id.eq_ignore_ascii_case(wanted))
            {
                self.value.store(
                    PageSizeData {
                        size: [w, h],
                        size_id: id.to_string(),
                    },
                    here,
                    pushed,
                );
                return Ok(self.rc);
            }
        }
        Err(ParseError::syntax(here, args))
    }

    pub fn format_value(&self) -> String {
        let v = self.value.value();
        format!(
            "{:>w$.p$} {:>w$.p$} {}",
            v.size[0],
            v.size[1],
            v.size_id,
            w = self.field_width,
            p = self.precision
        )
    }

    pub fn doc(&self) -> String {
        "(<float> <float> [<page size id>]|<page size id>)".to_string()
    }
}

/* ------------------ */

#[derive(Debug, Clone, PartialEq)]
pub struct RotStepLeaf {
    pub value: Scoped<RotStepData>,
    pub rc: ActionCode,
}

impl RotStepLeaf {
    pub fn new() -> Self {
        Self {
            value: Scoped::new(RotStepData::default()),
            rc: ActionCode::RotStep,
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
    ) -> Result<ActionCode, ParseError> {
        let remaining = args.len() - index;
        if remaining == 4 {
            let rots = [
                parse_f32(&args[index]),
                parse_f32(&args[index + 1]),
                parse_f32(&args[index + 2]),
            ];
            let kind = match args[index + 3].as_str() {
                "ABS" => Some(RotStepKind::Absolute),
                "REL" => Some(RotStepKind::Relative),
                "ADD" => Some(RotStepKind::Additive),
                _ => None,
            };
            if let ([Some(x), Some(y), Some(z)], Some(kind)) =
                (rots, kind)
            {
                self.value.store(
                    RotStepData {
                        rots: [x, y, z],
                        kind: Some(kind),
                    },
                    here,
                    pushed,
                );
                return Ok(self.rc);
            }
        } else if remaining == 1 && args[index] == "END" {
            self.value.store(RotStepData::default(), here, pushed);
            return Ok(self.rc);
        }
        Err(ParseError::syntax(here, args))
    }

    pub fn format_value(&self) -> String {
        let v = self.value.value();
        match v.kind {
            Some(kind) => format!("{} {} {} {}", v.rots[0], v.rots[1], v.rots[2], kind.keyword()),
            None => "END".to_string(),
        }
    }

    pub fn doc(&self) -> String {
        "(<rotX> <rotY> <rotZ> (ABS|REL|ADD)|END)".to_string()
    }
}

impl Default for RotStepLeaf {
    fn default() -> Self {
        Self::new()
    }
}

/* ------------------ */

#[derive(Debug, Clone, PartialEq)]
pub struct BuffExchgLeaf {
    pub value: Scoped<BuffExchgData>,
}

impl BuffExchgLeaf {
    pub fn new() -> Self {
        Self {
            value: Scoped::new(BuffExchgData::default()),
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
    ) -> Result<ActionCode, ParseError> {
        if args.len() - index == 2 {
            let buffer = args[index].as_str();
            let single_upper =
                buffer.len() == 1 && buffer.chars().all(|c| c.is_ascii_uppercase());
            let retrieve = match args[index + 1].as_str() {
                "STORE" => Some(false),
                "RETRIEVE" => Some(true),
                _ => None,
            };
            if let (true, Some(retrieve)) = (single_upper, retrieve) {
                self.value.store(
                    BuffExchgData {
                        buffer: buffer.chars().next().expect("checked single char"),
                        retrieve,
                    },
                    here,
                    pushed,
                );
                return Ok(if retrieve {
                    ActionCode::BufferLoad
                } else {
                    ActionCode::BufferStore
                });
            }
        }
        Err(ParseError::syntax(here, args))
    }

    pub fn format_value(&self) -> String {
        let v = self.value.value();
        format!(
            "{} {}",
            v.buffer,
            if v.retrieve { "RETRIEVE" } else { "STORE" }
        )
    }

    pub fn doc(&self) -> String {
        "<bufferName> (STORE|RETRIEVE)".to_string()
    }
}

impl Default for BuffExchgLeaf {
    fn default() -> Self {
        Self::new()
    }
}

/* ------------------ */

/// Callout rendering mode recorded by CALLOUT BEGIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalloutMode {
    Unassembled,
    Assembled,
    Rotated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalloutBeginLeaf {
    pub value: Scoped<CalloutMode>,
}

impl CalloutBeginLeaf {
    pub fn new() -> Self {
        Self {
            value: Scoped::new(CalloutMode::Unassembled),
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
    ) -> Result<ActionCode, ParseError> {
        let mode = match args.len() - index {
            0 => CalloutMode::Unassembled,
            1 => match args[index].as_str() {
                "ASSEMBLED" => CalloutMode::Assembled,
                "ROTATED" => CalloutMode::Rotated,
                _ => return Err(ParseError::syntax(here, args)),
            },
            _ => return Err(ParseError::syntax(here, args)),
        };
        self.value.store(mode, here, pushed);
        Ok(ActionCode::CalloutBegin)
    }

    pub fn format_value(&self) -> String {
        match self.value.value() {
            CalloutMode::Unassembled => "",
            CalloutMode::Assembled => "ASSEMBLED",
            CalloutMode::Rotated => "ROTATED",
        }
        .to_string()
    }

    pub fn doc(&self) -> String {
        "[ASSEMBLED|ROTATED]".to_string()
    }
}

impl Default for CalloutBeginLeaf {
    fn default() -> Self {
        Self::new()
    }
}

/* ------------------ */

#[derive(Debug, Clone, PartialEq)]
pub struct InsertLeaf {
    pub value: Scoped<InsertData>,
}

impl InsertLeaf {
    pub fn new() -> Self {
        Self {
            value: Scoped::new(InsertData::default()),
        }
    }

    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
    ) -> Result<ActionCode, ParseError> {
        let argc = args.len();
        let remaining = argc - index;
        let syntax = || ParseError::syntax(here, args);

        // Bare flow-control inserts store nothing.
        if remaining == 1 {
            match args[index].as_str() {
                "PAGE" => return Ok(ActionCode::InsertPage),
                "MODEL" => return Ok(ActionCode::InsertFinalModel),
                "COVER_PAGE" => return Ok(ActionCode::InsertCoverPage),
                _ => {}
            }
        }
        if remaining == 2 && args[index] == "COVER_PAGE" {
            return Ok(ActionCode::InsertCoverPage);
        }

        let mut i = index;
        let kind = match args.get(i).map(String::as_str) {
            Some("PICTURE") if remaining > 1 => {
                let name = args[i + 1].clone();
                i += 2;
                let mut scale = 1.0;
                if argc - i >= 2 && args[i] == "SCALE" {
                    scale = parse_f32(&args[i + 1]).ok_or_else(syntax)?;
                    i += 2;
                }
                InsertKind::Picture { name, scale }
            }
            Some("TEXT") if remaining > 3 => {
                let kind = InsertKind::Text {
                    text: args[i + 1].clone(),
                    font: args[i + 2].clone(),
                    color: args[i + 3].clone(),
                };
                i += 4;
                kind
            }
            Some("ROTATE_ICON") => {
                i += 1;
                InsertKind::RotateIcon
            }
            Some("ARROW") if remaining >= 8 => {
                let f = |off: usize| parse_f32(&args[i + off]).ok_or_else(syntax);
                let kind = InsertKind::Arrow {
                    head: (f(1)?, f(2)?),
                    tail: (f(3)?, f(4)?),
                    hafting_depth: f(5)?,
                    hafting_tip: (f(6)?, f(7)?),
                };
                i += 8;
                kind
            }
            Some("BOM") => {
                i += 1;
                InsertKind::Bom
            }
            _ => return Err(syntax()),
        };

        let mut offsets = [0.5f32, 0.5];
        match argc - i {
            0 => {}
            3 if args[i] == "OFFSET" => {
                offsets = [
                    parse_f32(&args[i + 1]).ok_or_else(syntax)?,
                    parse_f32(&args[i + 2]).ok_or_else(syntax)?,
                ];
            }
            _ => return Err(syntax()),
        }

        self.value.store(InsertData { kind, offsets }, here, pushed);
        Ok(ActionCode::Insert)
    }

    pub fn format_value(&self) -> String {
        let v = self.value.value();
        let mut out = match &v.kind {
            InsertKind::Picture { name, scale } => {
                if *scale != 1.0 {
                    format!("PICTURE \"{}\" SCALE {}", name, scale)
                } else {
                    format!("PICTURE \"{}\"", name)
                }
            }
            InsertKind::Text { text, font, color } => {
                format!("TEXT \"{}\" \"{}\" \"{}\"", text, font, color)
            }
            InsertKind::Arrow {
                head,
                tail,
                hafting_depth,
                hafting_tip,
            } => format!(
                "ARROW {} {} {} {} {} {} {}",
                head.0, head.1, tail.0, tail.1, hafting_depth, hafting_tip.0, hafting_tip.1
            ),
            InsertKind::Bom => "BOM".to_string(),
            InsertKind::RotateIcon => "ROTATE_ICON".to_string(),
        };
        if v.offsets[0] != 0.0 || v.offsets[1] != 0.0 {
            out.push_str(&format!(" OFFSET {} {}", v.offsets[0], v.offsets[1]));
        }
        out
    }

    pub fn doc(&self) -> String {
        "(PAGE|COVER_PAGE|MODEL|PICTURE <\"file\"> [SCALE <s>]|TEXT <\"text\"> <\"font\"> \
         <\"color\">|ARROW <hx> <hy> <tx> <ty> <hd> <hfx> <hfy>|BOM|ROTATE_ICON) [OFFSET <x> <y>]"
            .to_string()
    }
}

impl Default for InsertLeaf {
    fn default() -> Self {
        Self::new()
    }
}

/* ------------------ */

/// The closed set of leaf kinds. Matching exhaustively here is what makes
/// the round-trip law mechanically checkable per variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    Action(ActionLeaf),
    Int(IntLeaf),
    Float(FloatLeaf),
    FloatPair(FloatPairLeaf),
    Str(StringLeaf),
    StrList(StringListLeaf),
    Bool(BoolLeaf),
    Placement(PlacementLeaf),
    Border(BorderLeaf),
    Background(BackgroundLeaf),
    Pointer(PointerLeaf),
    Sep(SepLeaf),
    FreeForm(FreeFormLeaf),
    Constrain(ConstrainLeaf),
    Alignment(AlignmentLeaf),
    Alloc(AllocLeaf),
    Orientation(OrientationLeaf),
    PageSize(PageSizeLeaf),
    RotStep(RotStepLeaf),
    BuffExchg(BuffExchgLeaf),
    CalloutBegin(CalloutBeginLeaf),
    Insert(InsertLeaf),
}

impl Leaf {
    pub fn parse(
        &mut self,
        args: &[String],
        index: usize,
        here: &SourceLocation,
        pushed: bool,
        table: &KeywordTable,
    ) -> Result<ActionCode, ParseError> {
        match self {
            Leaf::Action(leaf) => leaf.parse(here),
            Leaf::Int(leaf) => leaf.parse(args, index, here, pushed),
            Leaf::Float(leaf) => leaf.parse(args, index, here, pushed),
            Leaf::FloatPair(leaf) => leaf.parse(args, index, here, pushed),
            Leaf::Str(leaf) => leaf.parse(args, index, here, pushed),
            Leaf::StrList(leaf) => leaf.parse(args, index, here, pushed),
            Leaf::Bool(leaf) => leaf.parse(args, index, here, pushed),
            Leaf::Placement(leaf) => leaf.parse(args, index, here, pushed, table),
            Leaf::Border(leaf) => leaf.parse(args, index, here, pushed),
            Leaf::Background(leaf) => leaf.parse(args, index, here, pushed),
            Leaf::Pointer(leaf) => leaf.parse(args, index, here, pushed, table),
            Leaf::Sep(leaf) => leaf.parse(args, index, here, pushed),
            Leaf::FreeForm(leaf) => leaf.parse(args, index, here, pushed, table),
            Leaf::Constrain(leaf) => leaf.parse(args, index, here, pushed),
            Leaf::Alignment(leaf) => leaf.parse(args, index, here, pushed),
            Leaf::Alloc(leaf) => leaf.parse(args, index, here, pushed),
            Leaf::Orientation(leaf) => leaf.parse(args, index, here, pushed),
            Leaf::PageSize(leaf) => leaf.parse(args, index, here, pushed),
            Leaf::RotStep(leaf) => leaf.parse(args, index, here, pushed),
            Leaf::BuffExchg(leaf) => leaf.parse(args, index, here, pushed),
            Leaf::CalloutBegin(leaf) => leaf.parse(args, index, here, pushed),
            Leaf::Insert(leaf) => leaf.parse(args, index, here, pushed),
        }
    }

    /// The canonical textual form of the current value, without keyword or
    /// scope prefix.
    pub fn format_value(&self) -> String {
        match self {
            Leaf::Action(_) => String::new(),
            Leaf::Int(leaf) => leaf.format_value(),
            Leaf::Float(leaf) => leaf.format_value(),
            Leaf::FloatPair(leaf) => leaf.format_value(),
            Leaf::Str(leaf) => leaf.format_value(),
            Leaf::StrList(leaf) => leaf.format_value(),
            Leaf::Bool(leaf) => leaf.format_value(),
            Leaf::Placement(leaf) => leaf.format_value(),
            Leaf::Border(leaf) => leaf.format_value(),
            Leaf::Background(leaf) => leaf.format_value(),
            Leaf::Pointer(leaf) => leaf.format_value(),
            Leaf::Sep(leaf) => leaf.format_value(),
            Leaf::FreeForm(leaf) => leaf.format_value(),
            Leaf::Constrain(leaf) => leaf.format_value(),
            Leaf::Alignment(leaf) => leaf.format_value(),
            Leaf::Alloc(leaf) => leaf.format_value(),
            Leaf::Orientation(leaf) => leaf.format_value(),
            Leaf::PageSize(leaf) => leaf.format_value(),
            Leaf::RotStep(leaf) => leaf.format_value(),
            Leaf::BuffExchg(leaf) => leaf.format_value(),
            Leaf::CalloutBegin(leaf) => leaf.format_value(),
            Leaf::Insert(leaf) => leaf.format_value(),
        }
    }

    /// One grammar summary line per alternative this leaf accepts.
    pub fn doc(&self) -> Vec<String> {
        match self {
            Leaf::Action(_) => vec![String::new()],
            Leaf::Int(leaf) => vec![leaf.doc()],
            Leaf::Float(leaf) => vec![leaf.doc()],
            Leaf::FloatPair(leaf) => vec![leaf.doc()],
            Leaf::Str(leaf) => vec![leaf.doc()],
            Leaf::StrList(leaf) => vec![leaf.doc()],
            Leaf::Bool(leaf) => vec![leaf.doc()],
            Leaf::Placement(leaf) => leaf.doc(),
            Leaf::Border(leaf) => vec![leaf.doc()],
            Leaf::Background(leaf) => vec![leaf.doc()],
            Leaf::Pointer(leaf) => vec![leaf.doc()],
            Leaf::Sep(leaf) => vec![leaf.doc()],
            Leaf::FreeForm(leaf) => vec![leaf.doc()],
            Leaf::Constrain(leaf) => vec![leaf.doc()],
            Leaf::Alignment(leaf) => vec![leaf.doc()],
            Leaf::Alloc(leaf) => vec![leaf.doc()],
            Leaf::Orientation(leaf) => vec![leaf.doc()],
            Leaf::PageSize(leaf) => vec![leaf.doc()],
            Leaf::RotStep(leaf) => vec![leaf.doc()],
            Leaf::BuffExchg(leaf) => vec![leaf.doc()],
            Leaf::CalloutBegin(leaf) => vec![leaf.doc()],
            Leaf::Insert(leaf) => vec![leaf.doc()],
        }
    }

    /// Drop any scope override this leaf carries.
    pub fn pop(&mut self) {
        match self {
            Leaf::Action(_) => {}
            Leaf::Int(leaf) => leaf.value.pop(),
            Leaf::Float(leaf) => leaf.value.pop(),
            Leaf::FloatPair(leaf) => leaf.value.pop(),
            Leaf::Str(leaf) => leaf.value.pop(),
            Leaf::StrList(leaf) => leaf.value.pop(),
            Leaf::Bool(leaf) => leaf.value.pop(),
            Leaf::Placement(leaf) => leaf.value.pop(),
            Leaf::Border(leaf) => leaf.value.pop(),
            Leaf::Background(leaf) => leaf.value.pop(),
            Leaf::Pointer(leaf) => leaf.value.pop(),
            Leaf::Sep(leaf) => leaf.value.pop(),
            Leaf::FreeForm(leaf) => leaf.value.pop(),
            Leaf::Constrain(leaf) => leaf.value.pop(),
            Leaf::Alignment(leaf) => leaf.value.pop(),
            Leaf::Alloc(leaf) => leaf.value.pop(),
            Leaf::Orientation(leaf) => leaf.value.pop(),
            Leaf::PageSize(leaf) => leaf.value.pop(),
            Leaf::RotStep(leaf) => leaf.value.pop(),
            Leaf::BuffExchg(leaf) => leaf.value.pop(),
            Leaf::CalloutBegin(leaf) => leaf.value.pop(),
            Leaf::Insert(leaf) => leaf.value.pop(),
        }
    }

    pub fn as_placement(&self) -> Option<&PlacementLeaf> {
        match self {
            Leaf::Placement(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_float_pair(&self) -> Option<&FloatPairLeaf> {
        match self {
            Leaf::FloatPair(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&StringLeaf> {
        match self {
            Leaf::Str(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<&BoolLeaf> {
        match self {
            Leaf::Bool(leaf) => Some(leaf),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn here() -> SourceLocation {
        SourceLocation::new("test.ldr", 1)
    }

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scoped_default_and_override() {
        let mut v = Scoped::new(10);
        assert_eq!(*v.value(), 10);
        v.store(20, &here(), true);
        assert_eq!(*v.value(), 20);
        assert_eq!(*v.default_value(), 10);
        v.pop();
        assert_eq!(*v.value(), 10);
    }

    #[test]
    fn test_float_leaf_range_error_leaves_value() {
        let mut leaf = FloatLeaf::new(1.0, 0.0, 100.0);
        let result = leaf.parse(&args("900.0"), 0, &here(), false);
        assert!(matches!(result, Err(ParseError::Range { .. })));
        assert_eq!(*leaf.value.value(), 1.0);
    }

    #[test]
    fn test_float_leaf_format_width() {
        let mut leaf = FloatLeaf::new(0.0, 0.0, 100.0);
        leaf.parse(&args("0.05"), 0, &here(), false).unwrap();
        assert_eq!(leaf.format_value(), "0.0500");
    }

    #[test]
    fn test_bool_leaf_rejects_anything_else() {
        let mut leaf = BoolLeaf::new(false);
        assert!(leaf.parse(&args("TRUE"), 0, &here(), false).is_ok());
        assert!(*leaf.value.value());
        assert!(leaf.parse(&args("YES"), 0, &here(), false).is_err());
    }

    #[test]
    fn test_placement_parse_inside_corner() {
        let table = KeywordTable::new();
        let mut leaf = PlacementLeaf::new(RectSpot::TopLeftInsideCorner, ElementKind::Page);
        leaf.parse(&args("BOTTOM_RIGHT PAGE INSIDE"), 0, &here(), false, &table)
            .unwrap();
        let v = leaf.value.value();
        assert_eq!(v.rect, RectSpot::BottomRightInsideCorner);
        assert_eq!(v.relative_to, ElementKind::Page);
    }

    #[test]
    fn test_placement_parse_outside_edge_with_justification() {
        let table = KeywordTable::new();
        let mut leaf = PlacementLeaf::new(RectSpot::TopLeftInsideCorner, ElementKind::Page);
        leaf.parse(&args("TOP RIGHT ASSEM OUTSIDE"), 0, &here(), false, &table)
            .unwrap();
        let v = leaf.value.value();
        assert_eq!(v.rect, RectSpot::TopRightOutside);
        assert_eq!(v.relative_to, ElementKind::Assembly);
    }

    #[test]
    fn test_placement_parse_offsets_tail() {
        let table = KeywordTable::new();
        let mut leaf = PlacementLeaf::new(RectSpot::TopLeftInsideCorner, ElementKind::Page);
        leaf.parse(
            &args("BOTTOM CENTER PAGE OUTSIDE 0.1 -0.25"),
            0,
            &here(),
            false,
            &table,
        )
        .unwrap();
        assert_eq!(leaf.value.value().offsets, [0.1, -0.25]);
    }

    #[test]
    fn test_placement_offset_shortcut_preserves_spot() {
        let table = KeywordTable::new();
        let mut leaf = PlacementLeaf::new(RectSpot::BottomRightInsideCorner, ElementKind::Page);
        leaf.parse(&args("OFFSET 0.01 0.02"), 0, &here(), false, &table)
            .unwrap();
        let v = leaf.value.value();
        assert_eq!(v.rect, RectSpot::BottomRightInsideCorner);
        assert_eq!(v.offsets, [0.01, 0.02]);
    }

    #[test]
    fn test_placement_bare_corner_prefers_inside() {
        let table = KeywordTable::new();
        let mut leaf = PlacementLeaf::new(RectSpot::TopLeftInsideCorner, ElementKind::Page);
        leaf.parse(&args("BOTTOM_LEFT PAGE"), 0, &here(), false, &table)
            .unwrap();
        assert_eq!(leaf.value.value().rect, RectSpot::BottomLeftInsideCorner);
    }

    #[test]
    fn test_border_round_with_margins() {
        let mut leaf = BorderLeaf::new(BorderData::default());
        leaf.parse(&args("ROUND Blue 0.125 15 MARGINS 0.05 0.05"), 0, &here(), false)
            .unwrap();
        let v = leaf.value.value();
        assert_eq!(v.shape, BorderShape::Round);
        assert_eq!(v.color, "Blue");
        assert_eq!(v.radius, 15.0);
        assert_eq!(v.margin, [0.05, 0.05]);
    }

    #[test]
    fn test_border_new_format_line_code() {
        let mut leaf = BorderLeaf::new(BorderData::default());
        leaf.parse(&args("SQUARE 2 Black 0.03125"), 0, &here(), false)
            .unwrap();
        assert_eq!(leaf.value.value().line, BorderLine::Dash);
    }

    #[test]
    fn test_background_gradient_round_trip() {
        let mut leaf = BackgroundLeaf::new(BackgroundData::default());
        let line = args("GRADIENT 0 1 0 100 200 45 0,0|0,100 0,0xff131360|1,0xff202ccc");
        leaf.parse(&line, 0, &here(), false).unwrap();
        let formatted = leaf.format_value();
        let mut second = BackgroundLeaf::new(BackgroundData::default());
        // Reparse the formatted text; quoted tokens arrive unquoted.
        let reparsed: Vec<String> = crate::parser::tokenizer::tokenize(&formatted);
        second.parse(&reparsed, 0, &here(), false).unwrap_or_else(|e| {
            panic!("reparse failed for {:?}: {}", formatted, e);
        });
        assert_eq!(leaf.value.value(), second.value.value());
    }

    #[test]
    fn test_pointer_edge_single_segment() {
        let table = KeywordTable::new();
        let mut leaf = PointerLeaf::new(false, ActionCode::CalloutPointer);
        let rc = leaf
            .parse(&args("RIGHT 0.5 0.25 0.75 0.125"), 0, &here(), false, &table)
            .unwrap();
        assert_eq!(rc, ActionCode::CalloutPointer);
        let v = leaf.value.value();
        assert_eq!(v.placement, CompassSpot::Right);
        assert_eq!(v.loc, 0.5);
        assert_eq!(v.tip, (0.25, 0.75));
        assert_eq!(v.base, 0.125);
    }

    #[test]
    fn test_pointer_page_variant_base_rect() {
        let table = KeywordTable::new();
        let mut leaf = PointerLeaf::new(true, ActionCode::PagePointer);
        let line = args("BOTTOM 0.5 0.5 1 0.5 1 0.5 1 0.5 1 0.125 1 BASE_BOTTOM");
        leaf.parse(&line, 0, &here(), false, &table).unwrap();
        assert_eq!(leaf.value.value().rect, RectSpot::BottomInside);
    }

    #[test]
    fn test_insert_picture_with_scale_and_offset() {
        let mut leaf = InsertLeaf::new();
        let rc = leaf
            .parse(
                &["PICTURE", "logo.png", "SCALE", "0.75", "OFFSET", "0.1", "0.2"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>(),
                0,
                &here(),
                false,
            )
            .unwrap();
        assert_eq!(rc, ActionCode::Insert);
        let v = leaf.value.value();
        assert_eq!(
            v.kind,
            InsertKind::Picture {
                name: "logo.png".to_string(),
                scale: 0.75
            }
        );
        assert_eq!(v.offsets, [0.1, 0.2]);
    }

    #[test]
    fn test_insert_bare_page_is_flow_control() {
        let mut leaf = InsertLeaf::new();
        assert_eq!(
            leaf.parse(&args("PAGE"), 0, &here(), false).unwrap(),
            ActionCode::InsertPage
        );
    }

    #[test]
    fn test_buffer_exchange_codes() {
        let mut leaf = BuffExchgLeaf::new();
        assert_eq!(
            leaf.parse(&args("A STORE"), 0, &here(), false).unwrap(),
            ActionCode::BufferStore
        );
        assert_eq!(
            leaf.parse(&args("A RETRIEVE"), 0, &here(), false).unwrap(),
            ActionCode::BufferLoad
        );
        assert!(leaf.parse(&args("AB STORE"), 0, &here(), false).is_err());
    }

    #[test]
    fn test_rotstep_end_round_trips() {
        let mut leaf = RotStepLeaf::new();
        leaf.parse(&args("END"), 0, &here(), false).unwrap();
        assert_eq!(leaf.format_value(), "END");
        leaf.parse(&args("0 90 0 REL"), 0, &here(), false).unwrap();
        assert_eq!(leaf.format_value(), "0 90 0 REL");
    }

    #[test]
    fn test_page_size_named_id() {
        let mut leaf = PageSizeLeaf::new(PageSizeData::default());
        leaf.parse(&args("A4"), 0, &here(), false).unwrap();
        let v = leaf.value.value();
        assert_eq!(v.size_id, "A4");
        assert!((v.size[0] - 8.2677).abs() < 1e-4);
    }
}
