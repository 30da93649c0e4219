//! Relative-placement engine for page elements.
//!
//! Consumers build a [`LayoutArena`] per page, fill each node's pixel
//! size from the rendering collaborator, then resolve positions with
//! [`LayoutArena::link_relative`]. Independent pages own disjoint arenas
//! and may be resolved concurrently by the caller.

pub mod arena;
pub mod engine;

pub use arena::{LayoutArena, LayoutNode, NodeId, XX, YY};
pub use engine::units_to_pixels;
