//=========================================================================
// Scene System
//=========================================================================
//
// Scene lifecycle and stack-based scene switching.
//
// Architecture:
//   SceneDirector
//     ├─ factories: HashMap<S, SceneFactory<S>>
//     ├─ stack: Vec<S>                  (top = last)
//     └─ active: Option<ActiveScene>    (built from the top key)
//
// Flow:
//   push(k) → destroy active → stack.push(k) → factory(ctx) → assets.load()
//   poll_assets() → Completed → Scene::initialized() (once)
//   pop()   → destroy active → stack.pop() → factory(ctx) for new top
//
// Only one scene instance exists at a time. A covered scene is torn down
// and rebuilt from its factory when it becomes the top again.
//
//=========================================================================

//=== Module Declarations =================================================

mod commands;
mod director;

//=== External Dependencies ===============================================

use std::fmt::Debug;
use std::hash::Hash;

//=== Internal Dependencies ===============================================

use crate::core::error::SceneError;
use crate::core::globals::HostContext;
use crate::core::stage::NodeId;

//=== Public API ==========================================================

pub(crate) use commands::CommandQueue;
pub use commands::DirectorCommand;
pub use director::SceneDirector;

//=== Scene Key Trait =====================================================

/// Marker trait for scene identifiers.
///
/// Each key names one registered factory. Typically implemented by an
/// application-specific enum.
pub trait SceneKey: Clone + Copy + Eq + Hash + Debug + 'static {}

//=== Scene Trait =========================================================

/// Lifecycle-bound presentation unit.
///
/// A scene is built by its factory, which attaches layers to the stage,
/// queues the assets it needs and may start tasks. Once the queued assets
/// resolve, [`initialized`](Self::initialized) fires exactly once.
///
/// # Minimal Implementation
///
/// ```rust
/// # use stagecraft::prelude::*;
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// # enum Screen { Title }
/// # impl SceneKey for Screen {}
/// struct TitleScene {
///     layers: SceneLayers,
/// }
///
/// impl Scene<Screen> for TitleScene {}
/// ```
pub trait Scene<S: SceneKey> {
    /// Called once after the assets queued during construction resolved.
    ///
    /// Default implementation does nothing.
    ///
    /// # Errors
    ///
    /// Any error halts the frame loop (typically a missing asset).
    fn initialized(&mut self, _context: &mut HostContext<S>) -> Result<(), SceneError> {
        Ok(())
    }

    /// Called when the scene leaves the stack top.
    ///
    /// The default runs [`HostContext::teardown`], which resets the asset
    /// loader, stops every task and frees every child of the display root.
    /// Overrides must keep that guarantee.
    fn destroy(&mut self, context: &mut HostContext<S>) {
        context.teardown();
    }
}

//=== SceneLayers =========================================================

/// Content and overlay containers owned by one scene.
///
/// Both are direct children of the display root; the overlay is added last
/// so it draws above the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneLayers {
    pub content: NodeId,
    pub overlay: NodeId,
}

impl SceneLayers {
    /// Creates both layers and appends them to the display root.
    pub fn attach<S: SceneKey>(context: &mut HostContext<S>) -> Self {
        let content = context.stage.create_layer();
        let overlay = context.stage.create_layer();
        Self { content, overlay }
    }
}
