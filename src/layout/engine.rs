//! The relative-placement algorithm.
//!
//! This is the center piece of the whole concept of placing items
//! relative to other items. A page declares a tree of anchors: the page
//! anchors the assembly, the assembly anchors the step number, the parts
//! list, callouts and so on, each through a compass spot and an
//! inside/outside preposition. Margins merge per axis (the larger of the
//! two wins), a fractional offset pair applies a fine nudge, and every
//! anchor's bounding rectangle grows to enclose whatever was placed
//! against it.

use crate::layout::arena::{LayoutArena, NodeId, XX, YY};
use crate::parser::types::{CompassSpot, ElementKind, Preposition};

impl LayoutArena {
    /// Walk the anchor tree from `root`, adopting every unparented node
    /// whose configured anchor kind matches the node currently visited,
    /// placing it, and recursing into the adopted nodes. Because
    /// discovery is by kind, document declaration order never matters.
    ///
    /// A node whose anchor kind is never visited stays unparented at
    /// `loc == [0, 0]`; callers detect that as a configuration error.
    /// Anchoring a node to its own kind is not checked here and must be
    /// prevented when the arena is built.
    pub fn link_relative(&mut self, root: NodeId) {
        let anchor_kind = self[root].kind;
        let dependents: Vec<NodeId> = self
            .ids()
            .filter(|&id| {
                id != root
                    && self[id].parent.is_none()
                    && self[id].kind != ElementKind::Page
                    && self[id].placement.relative_to == anchor_kind
            })
            .collect();

        for dep in dependents {
            self.place_relative(root, dep);
            self.append_relative(root, dep);
        }

        let children = self[root].children.clone();
        for child in children {
            self.link_relative(child);
        }
    }

    /// Link `dep` into the anchor's placed-relative-to-me list. Page
    /// nodes are never adopted, and a node is linked at most once.
    pub fn append_relative(&mut self, anchor: NodeId, dep: NodeId) {
        if self[dep].kind == ElementKind::Page {
            return;
        }
        if self[anchor].children.contains(&dep) {
            return;
        }
        self[anchor].children.push(dep);
        self[dep].parent = Some(anchor);
    }

    /// Place `dep` against `anchor` using the dependent's own size, then
    /// grow the anchor's bounding rectangle to keep the dependent
    /// enclosed.
    pub fn place_relative(&mut self, anchor: NodeId, dep: NodeId) {
        let margin = self[anchor].margin;
        self.place_relative_with_margin(anchor, dep, margin);
    }

    /// Variant taking the anchor-side margin explicitly; page pointers
    /// and free text carry their own margins instead of the anchor's.
    pub fn place_relative_with_margin(&mut self, anchor: NodeId, dep: NodeId, margin: [f32; 2]) {
        let mut lmargin = self[dep].margin;
        for axis in [XX, YY] {
            if margin[axis] > lmargin[axis] {
                lmargin[axis] = margin[axis];
            }
        }

        let dep_size = self[dep].size;
        self.place_relative_sized(anchor, dep, dep_size, lmargin);

        for axis in [XX, YY] {
            self[dep].bounding_loc[axis] = self[dep].loc[axis];

            // Grow toward the top-left when the dependent starts before
            // our current bounds, then toward the bottom-right when it
            // ends after them.
            let top = self[dep].loc[axis];
            let growth = self[anchor].bounding_loc[axis] - top;
            if growth > 0.0 {
                self[anchor].bounding_loc[axis] -= growth;
                self[anchor].bounding_size[axis] += growth;
            }

            let bottom = top + dep_size[axis];
            let growth =
                bottom - (self[anchor].bounding_loc[axis] + self[anchor].bounding_size[axis]);
            if growth > 0.0 {
                self[anchor].bounding_size[axis] += growth;
            }
        }
    }

    /// Place `dep` using its bounding rectangle instead of its own size,
    /// biasing the final location so the node proper lands where its
    /// bounding offset says. Composites like callouts with pointers are
    /// placed this way.
    pub fn place_relative_bounding(&mut self, anchor: NodeId, dep: NodeId) {
        let margin = self[anchor].margin;
        let mut lmargin = self[dep].margin;
        for axis in [XX, YY] {
            if margin[axis] > lmargin[axis] {
                lmargin[axis] = margin[axis];
            }
        }

        let bias = [
            self[dep].loc[XX] - self[dep].bounding_loc[XX],
            self[dep].loc[YY] - self[dep].bounding_loc[YY],
        ];
        let bounding_size = self[dep].bounding_size;
        self.place_relative_sized(anchor, dep, bounding_size, lmargin);
        self[dep].loc[XX] += bias[XX];
        self[dep].loc[YY] += bias[YY];
    }

    /// The core compass math: resolve `dep`'s location from the anchor's
    /// rectangle, the placement descriptor, the merged margin and the
    /// fractional fine offsets.
    fn place_relative_sized(
        &mut self,
        anchor: NodeId,
        dep: NodeId,
        dep_size: [f32; 2],
        lmargin: [f32; 2],
    ) {
        let a_loc = self[anchor].loc;
        let a_size = self[anchor].size;
        let data = self[dep].placement.clone();

        self[dep].relative_to_loc = a_loc;
        self[dep].relative_to_size = a_size;

        let mut loc = self[dep].loc;

        match data.preposition {
            Preposition::Outside => {
                loc[XX] = match data.placement {
                    CompassSpot::TopLeft | CompassSpot::Left | CompassSpot::BottomLeft => {
                        a_loc[XX] - (dep_size[XX] + lmargin[XX])
                    }
                    CompassSpot::TopRight | CompassSpot::Right | CompassSpot::BottomRight => {
                        a_loc[XX] + a_size[XX] + lmargin[XX]
                    }
                    CompassSpot::Top | CompassSpot::Bottom => {
                        let mut x = a_loc[XX];
                        match data.justification {
                            CompassSpot::Center => x += (a_size[XX] - dep_size[XX]) / 2.0,
                            CompassSpot::Right => x += a_size[XX] - dep_size[XX],
                            _ => {}
                        }
                        x
                    }
                    CompassSpot::Center => a_loc[XX],
                };
                loc[YY] = match data.placement {
                    CompassSpot::TopLeft | CompassSpot::Top | CompassSpot::TopRight => {
                        a_loc[YY] - (dep_size[YY] + lmargin[YY])
                    }
                    CompassSpot::BottomLeft | CompassSpot::Bottom | CompassSpot::BottomRight => {
                        a_loc[YY] + a_size[YY] + lmargin[YY]
                    }
                    CompassSpot::Left | CompassSpot::Right => {
                        let mut y = a_loc[YY];
                        match data.justification {
                            CompassSpot::Center => y += (a_size[YY] - dep_size[YY]) / 2.0,
                            CompassSpot::Bottom => y += a_size[YY] - dep_size[YY],
                            _ => {}
                        }
                        y
                    }
                    CompassSpot::Center => a_loc[YY],
                };
            }
            Preposition::Inside => {
                loc[XX] = match data.placement {
                    CompassSpot::TopLeft | CompassSpot::Left | CompassSpot::BottomLeft => {
                        a_loc[XX] + lmargin[XX]
                    }
                    CompassSpot::Top | CompassSpot::Center | CompassSpot::Bottom => {
                        a_loc[XX] + (a_size[XX] - dep_size[XX]) / 2.0
                    }
                    CompassSpot::TopRight | CompassSpot::Right | CompassSpot::BottomRight => {
                        a_loc[XX] + a_size[XX] - dep_size[XX] - lmargin[XX]
                    }
                };
                loc[YY] = match data.placement {
                    CompassSpot::TopLeft | CompassSpot::Top | CompassSpot::TopRight => {
                        a_loc[YY] + lmargin[YY]
                    }
                    CompassSpot::Left | CompassSpot::Center | CompassSpot::Right => {
                        a_loc[YY] + (a_size[YY] - dep_size[YY]) / 2.0
                    }
                    CompassSpot::BottomLeft | CompassSpot::Bottom | CompassSpot::BottomRight => {
                        a_loc[YY] + a_size[YY] - dep_size[YY] - lmargin[YY]
                    }
                };
            }
        }

        loc[XX] += a_size[XX] * data.offsets[XX];
        loc[YY] += a_size[YY] * data.offsets[YY];
        self[dep].loc = loc;
    }

    /// Re-justify an edge-placed node horizontally within a band of the
    /// given width starting at `origin`. Only Top/Bottom placements have
    /// a horizontal justification to honor.
    pub fn justify_x(&mut self, id: NodeId, origin: f32, width: f32) {
        let data = self[id].placement.clone();
        if !matches!(data.placement, CompassSpot::Top | CompassSpot::Bottom) {
            return;
        }
        let size = self[id].size[XX];
        self[id].loc[XX] = match data.justification {
            CompassSpot::Left => origin,
            CompassSpot::Center => origin + (width - size) / 2.0,
            CompassSpot::Right => origin + width - size,
            _ => return,
        };
    }

    /// Vertical counterpart of `justify_x` for Left/Right placements.
    pub fn justify_y(&mut self, id: NodeId, origin: f32, height: f32) {
        let data = self[id].placement.clone();
        if !matches!(data.placement, CompassSpot::Left | CompassSpot::Right) {
            return;
        }
        let size = self[id].size[YY];
        self[id].loc[YY] = match data.justification {
            CompassSpot::Top => origin,
            CompassSpot::Center => origin + (height - size) / 2.0,
            CompassSpot::Bottom => origin + height - size,
            _ => return,
        };
    }

    /// Inverse of the placement math: given a dependent's measured
    /// on-canvas rectangle, recover the fractional fine offsets that
    /// would reproduce it against the anchor the node was last placed
    /// on. Used when a dragged element must be written back as an OFFSET
    /// directive.
    pub fn calc_offsets(&self, dep: NodeId, top_left: [f32; 2], size: [f32; 2]) -> [f32; 2] {
        let data = &self[dep].placement;
        let rel_loc = self[dep].relative_to_loc;
        let rel_size = self[dep].relative_to_size;

        let tl = [top_left[XX] - rel_loc[XX], top_left[YY] - rel_loc[YY]];
        let mut offset = [0.0f32; 2];

        match data.preposition {
            Preposition::Inside => {
                offset[XX] = match data.placement {
                    CompassSpot::TopLeft | CompassSpot::Left | CompassSpot::BottomLeft => tl[XX],
                    CompassSpot::TopRight | CompassSpot::Right | CompassSpot::BottomRight => {
                        (tl[XX] + size[XX]) - rel_size[XX]
                    }
                    _ => tl[XX] + size[XX] / 2.0 - rel_size[XX] / 2.0,
                };
                offset[YY] = match data.placement {
                    CompassSpot::TopLeft | CompassSpot::Top | CompassSpot::TopRight => tl[YY],
                    CompassSpot::BottomLeft | CompassSpot::Bottom | CompassSpot::BottomRight => {
                        (tl[YY] + size[YY]) - rel_size[YY]
                    }
                    _ => tl[YY] + size[YY] / 2.0 - rel_size[YY] / 2.0,
                };
            }
            Preposition::Outside => {
                offset[XX] = match data.placement {
                    CompassSpot::TopLeft | CompassSpot::Left | CompassSpot::BottomLeft => {
                        tl[XX] + size[XX]
                    }
                    CompassSpot::TopRight | CompassSpot::Right | CompassSpot::BottomRight => {
                        tl[XX] - rel_size[XX]
                    }
                    _ => tl[XX] + size[XX] / 2.0 - rel_size[XX] / 2.0,
                };
                offset[YY] = match data.placement {
                    CompassSpot::TopLeft | CompassSpot::Top | CompassSpot::TopRight => {
                        tl[YY] + size[YY]
                    }
                    CompassSpot::BottomLeft | CompassSpot::Bottom | CompassSpot::BottomRight => {
                        tl[YY] - rel_size[YY]
                    }
                    _ => tl[YY] + size[YY] / 2.0 - rel_size[YY] / 2.0,
                };
            }
        }

        [offset[XX] / rel_size[XX], offset[YY] / rel_size[YY]]
    }
}

/// Convert a configured length in document units to pixels at the
/// resolution the rendering collaborator reports.
pub fn units_to_pixels(value: f32, dpi: f32) -> f32 {
    value * dpi
}
