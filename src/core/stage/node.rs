//=========================================================================
// Stage Nodes
//=========================================================================
//
// A node is either a plain container or a sprite carrying a texture.
// Hierarchy links (parent / children) are owned by the Stage and are
// read-only from the outside.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;

use kurbo::{Point, Vec2};

//=== Internal Dependencies ===============================================

use crate::core::assets::Texture;

//=== NodeId ==============================================================

/// Generational handle to a node in a [`Stage`](super::Stage).
///
/// Ids of destroyed nodes stay invalid even after their slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(super) index: u32,
    pub(super) generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

//=== NodeContent =========================================================

/// What a node draws.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    /// Groups children; draws nothing itself.
    Container,

    /// Draws a texture.
    Sprite(Texture),
}

//=== Node ================================================================

/// Drawable element of the display graph.
///
/// Transform fields are public so tasks can animate them directly.
#[derive(Debug, Clone)]
pub struct Node {
    /// Position relative to the parent.
    pub position: Point,

    /// Scale relative to the parent (negative values mirror).
    pub scale: Vec2,

    /// Normalized anchor inside the sprite (`0,0` top-left, `1,1` bottom-right).
    pub anchor: Vec2,

    /// Opacity in `[0, 1]`, multiplied down the hierarchy.
    pub alpha: f64,

    /// Hidden nodes and their subtrees are skipped when drawing.
    pub visible: bool,

    content: NodeContent,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
}

impl Node {
    pub(super) fn new(content: NodeContent) -> Self {
        Self {
            position: Point::ORIGIN,
            scale: Vec2::new(1.0, 1.0),
            anchor: Vec2::ZERO,
            alpha: 1.0,
            visible: true,
            content,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn content(&self) -> &NodeContent {
        &self.content
    }

    /// Returns the sprite texture, `None` for containers.
    pub fn texture(&self) -> Option<&Texture> {
        match &self.content {
            NodeContent::Sprite(texture) => Some(texture),
            NodeContent::Container => None,
        }
    }

    /// Swaps the drawn texture, turning a container into a sprite if needed.
    pub fn set_texture(&mut self, texture: Texture) {
        self.content = NodeContent::Sprite(texture);
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Sets a uniform scale on both axes.
    pub fn set_uniform_scale(&mut self, value: f64) {
        self.scale = Vec2::new(value, value);
    }
}
