//! Arena storage for placement nodes.
//!
//! Layout nodes are addressed by index into one per-page arena, so the
//! anchor/dependent relationships are plain indices with no lifetime
//! entanglement. A page build creates an arena, the rendering
//! collaborator fills in pixel sizes, the engine resolves positions, and
//! the arena is dropped with the page.

use std::ops::{Index, IndexMut};

use crate::parser::types::{ElementKind, PlacementData};

/// Axis indices into the `[f32; 2]` pairs used throughout the engine.
pub const XX: usize = 0;
pub const YY: usize = 1;

/// Handle to a node inside one arena. Only meaningful for the arena that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// One visual element of a page: its identity, anchoring configuration,
/// measured size and resolved position.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub kind: ElementKind,
    pub placement: PlacementData,
    /// Configured margin per axis, in pixels.
    pub margin: [f32; 2],
    /// Pixel size reported by the rendering collaborator.
    pub size: [f32; 2],
    /// Resolved location within the parent group.
    pub loc: [f32; 2],
    /// Grid cell within the page table, when the caller assigns one.
    pub table_cell: [i32; 2],
    /// This node and everything placed relative to it.
    pub bounding_size: [f32; 2],
    pub bounding_loc: [f32; 2],
    /// Rectangle of the anchor this node was last placed against; the
    /// inverse offset calculation reads these back.
    pub relative_to_loc: [f32; 2],
    pub relative_to_size: [f32; 2],
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl LayoutNode {
    pub fn new(kind: ElementKind, placement: PlacementData) -> Self {
        Self {
            kind,
            placement,
            margin: [0.0, 0.0],
            size: [0.0, 0.0],
            loc: [0.0, 0.0],
            table_cell: [0, 0],
            bounding_size: [0.0, 0.0],
            bounding_loc: [0.0, 0.0],
            relative_to_loc: [0.0, 0.0],
            relative_to_size: [1.0, 1.0],
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_margin(mut self, x: f32, y: f32) -> Self {
        self.margin = [x, y];
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.set_size(width, height);
        self
    }

    /// Record the measured pixel size; the bounding rectangle starts out
    /// congruent with it.
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.size = [width, height];
        self.bounding_size = [width, height];
    }
}

/// Per-page arena of layout nodes.
#[derive(Debug, Default)]
pub struct LayoutArena {
    nodes: Vec<LayoutNode>,
}

impl LayoutArena {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn insert(&mut self, node: LayoutNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// First node of the given kind, if any.
    pub fn find_kind(&self, kind: ElementKind) -> Option<NodeId> {
        self.ids().find(|&id| self[id].kind == kind)
    }
}

impl Index<NodeId> for LayoutArena {
    type Output = LayoutNode;

    fn index(&self, id: NodeId) -> &LayoutNode {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for LayoutArena {
    fn index_mut(&mut self, id: NodeId) -> &mut LayoutNode {
        &mut self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::types::{PlacementData, RectSpot};

    #[test]
    fn test_set_size_seeds_bounding() {
        let mut node = LayoutNode::new(ElementKind::Page, PlacementData::default());
        node.set_size(850.0, 1100.0);
        assert_eq!(node.size, [850.0, 1100.0]);
        assert_eq!(node.bounding_size, [850.0, 1100.0]);
    }

    #[test]
    fn test_arena_indexing() {
        let mut arena = LayoutArena::new();
        let page = arena.insert(LayoutNode::new(ElementKind::Page, PlacementData::default()));
        let number = arena.insert(LayoutNode::new(
            ElementKind::PageNumber,
            PlacementData::from_rect(RectSpot::BottomRightInsideCorner, ElementKind::Page),
        ));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena[page].kind, ElementKind::Page);
        assert_eq!(arena[number].kind, ElementKind::PageNumber);
        assert_eq!(arena.find_kind(ElementKind::PageNumber), Some(number));
        assert_eq!(arena.find_kind(ElementKind::Callout), None);
    }
}
