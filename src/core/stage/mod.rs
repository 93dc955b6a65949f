//=========================================================================
// Stage (Display Graph)
//=========================================================================
//
// Shared display root that scenes attach their layers to and that the
// renderer draws once per frame.
//
// Architecture:
//   Stage
//     ├─ slots: Vec<Slot>   (generational arena of nodes)
//     ├─ free:  Vec<u32>    (recycled slot indices)
//     └─ root:  NodeId      (display root, never destroyed)
//
// Flow:
//   Scene attaches layers → tasks mutate nodes → draw_list() → Renderer
//
//=========================================================================

//=== Module Declarations =================================================

mod node;

//=== External Dependencies ===============================================

use kurbo::{Point, Size, Vec2};
use log::trace;

//=== Internal Dependencies ===============================================

use crate::core::assets::Texture;
use crate::core::error::StageError;

//=== Public API ==========================================================

pub use node::{Node, NodeContent, NodeId};

//=== DrawItem ============================================================

/// A sprite flattened into world space, ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub node: NodeId,
    pub texture: Texture,
    /// World-space top-left corner after anchoring.
    pub origin: Point,
    /// Accumulated scale.
    pub scale: Vec2,
    /// Accumulated opacity.
    pub alpha: f64,
}

//=== Slot ================================================================

struct Slot {
    generation: u32,
    node: Option<Node>,
}

//=== Stage ===============================================================

/// Arena-backed display graph with a single root container.
///
/// Nodes are addressed by [`NodeId`]. Looking up a destroyed node returns
/// [`StageError::UnknownNode`] instead of touching a recycled slot.
pub struct Stage {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    live: usize,
}

impl Stage {
    //--- Construction -----------------------------------------------------

    /// Creates a stage holding only the display root.
    pub fn new() -> Self {
        let root = NodeId { index: 0, generation: 0 };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::new(NodeContent::Container)),
            }],
            free: Vec::new(),
            root,
            live: 1,
        }
    }

    /// Returns the display root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, including the root.
    pub fn len(&self) -> usize {
        self.live
    }

    /// True when only the root exists.
    pub fn is_empty(&self) -> bool {
        self.live == 1
    }

    //--- Allocation -------------------------------------------------------

    /// Creates a detached container node.
    pub fn create_container(&mut self) -> NodeId {
        self.allocate(Node::new(NodeContent::Container))
    }

    /// Creates a detached sprite node.
    pub fn create_sprite(&mut self, texture: Texture) -> NodeId {
        self.allocate(Node::new(NodeContent::Sprite(texture)))
    }

    /// Creates a container already appended to the display root.
    pub fn create_layer(&mut self) -> NodeId {
        let mut layer = Node::new(NodeContent::Container);
        layer.parent = Some(self.root);
        let id = self.allocate(layer);

        if let Some(root) = self.slots[self.root.index as usize].node.as_mut() {
            root.children.push(id);
        }
        id
    }

    fn allocate(&mut self, node: Node) -> NodeId {
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId { index, generation: slot.generation };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, node: Some(node) });
        NodeId { index, generation: 0 }
    }

    //--- Lookup -----------------------------------------------------------

    /// True if `id` refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, StageError> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(StageError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, StageError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(StageError::UnknownNode(id))
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], StageError> {
        self.node(id).map(Node::children)
    }

    /// Displayed size of a sprite (texture size times absolute scale).
    ///
    /// Containers report [`Size::ZERO`].
    pub fn size_of(&self, id: NodeId) -> Result<Size, StageError> {
        let node = self.node(id)?;
        Ok(match node.texture() {
            Some(texture) => Size::new(
                texture.width() as f64 * node.scale.x.abs(),
                texture.height() as f64 * node.scale.y.abs(),
            ),
            None => Size::ZERO,
        })
    }

    //--- Hierarchy --------------------------------------------------------

    /// Appends `child` to `parent`, detaching it from any previous parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), StageError> {
        if child == self.root {
            return Err(StageError::RootImmutable);
        }
        self.node(child)?;

        // Walk up from the parent; meeting the child means a cycle
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(StageError::CyclicAttach { parent, child });
            }
            cursor = self.node(current)?.parent;
        }

        self.detach(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Detaches `child` from `parent`. Returns false if it was not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool, StageError> {
        let node = self.node_mut(parent)?;
        let Some(pos) = node.children.iter().position(|&c| c == child) else {
            return Ok(false);
        };
        node.children.remove(pos);
        self.node_mut(child)?.parent = None;
        Ok(true)
    }

    /// Detaches every child of `parent` and returns them in order.
    pub fn remove_children(&mut self, parent: NodeId) -> Result<Vec<NodeId>, StageError> {
        let children = std::mem::take(&mut self.node_mut(parent)?.children);
        for &child in &children {
            self.node_mut(child)?.parent = None;
        }
        Ok(children)
    }

    fn detach(&mut self, id: NodeId) -> Result<(), StageError> {
        if let Some(parent) = self.node(id)?.parent {
            self.remove_child(parent, id)?;
        }
        Ok(())
    }

    //--- Release ----------------------------------------------------------

    /// Detaches and frees `id` with its whole subtree.
    ///
    /// Returns the number of freed nodes.
    pub fn destroy(&mut self, id: NodeId) -> Result<usize, StageError> {
        if id == self.root {
            return Err(StageError::RootImmutable);
        }
        self.detach(id)?;

        let mut pending = vec![id];
        let mut freed = 0;

        while let Some(current) = pending.pop() {
            let slot = &mut self.slots[current.index as usize];
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                pending.extend(node.children);
                freed += 1;
            }
        }

        self.live -= freed;
        Ok(freed)
    }

    /// Removes and frees every child of the display root.
    ///
    /// Returns the number of freed nodes.
    pub fn clear_root(&mut self) -> usize {
        let root = self.root;
        let children = self.remove_children(root).unwrap_or_default();

        let mut freed = 0;
        for child in children {
            freed += self.destroy(child).unwrap_or(0);
        }

        trace!(target: "stage", "Cleared display root ({} nodes freed)", freed);
        freed
    }

    //--- Drawing ----------------------------------------------------------

    /// Flattens visible sprites into world-space draw items.
    ///
    /// Traversal is depth-first in child order, so later siblings draw on
    /// top of earlier ones.
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let mut items = Vec::new();
        self.collect(self.root, Point::ORIGIN, Vec2::new(1.0, 1.0), 1.0, &mut items);
        items
    }

    fn collect(
        &self,
        id: NodeId,
        parent_origin: Point,
        parent_scale: Vec2,
        parent_alpha: f64,
        items: &mut Vec<DrawItem>,
    ) {
        let Ok(node) = self.node(id) else {
            return;
        };
        if !node.visible {
            return;
        }

        let origin = Point::new(
            parent_origin.x + node.position.x * parent_scale.x,
            parent_origin.y + node.position.y * parent_scale.y,
        );
        let scale = Vec2::new(parent_scale.x * node.scale.x, parent_scale.y * node.scale.y);
        let alpha = parent_alpha * node.alpha;

        if let Some(texture) = node.texture() {
            let offset = Vec2::new(
                node.anchor.x * texture.width() as f64 * scale.x,
                node.anchor.y * texture.height() as f64 * scale.y,
            );
            items.push(DrawItem {
                node: id,
                texture: texture.clone(),
                origin: origin - offset,
                scale,
                alpha,
            });
        }

        for &child in &node.children {
            self.collect(child, origin, scale, alpha, items);
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
