//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use stagecraft::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine core
pub use crate::engine::{Engine, EngineBuilder};

// Host context
pub use crate::core::globals::{HostContext, Viewport};

// Scene system
pub use crate::core::scene::{DirectorCommand, Scene, SceneDirector, SceneKey, SceneLayers};

// Task system
pub use crate::core::task::{Task, TaskFrame, TaskHandle, TaskScheduler};

// Animation
pub use crate::core::anim::{CubicBezier, Delay, DropIn, Easing, FadeIn, FadeOut, FloatLoop, HeartBeat, ScaleEase};

// Display graph and assets
pub use crate::core::assets::{AssetLoader, AssetSource, StaticSource, Texture};
pub use crate::core::stage::{NodeId, Stage};

// Rendering
pub use crate::core::render::{HeadlessRenderer, Renderer};

// Errors
pub use crate::core::error::{AssetError, EngineError, RenderError, SceneError, StageError, TaskError};
