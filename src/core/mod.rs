//=========================================================================
// Core Systems
//=========================================================================
//
// Everything that runs inside a frame, independent of the windowing
// platform.
//
// Architecture:
//   globals::HostContext
//     ├─ task::TaskScheduler    (per-frame cooperative tasks)
//     ├─ assets::AssetLoader    (named textures)
//     └─ stage::Stage           (display root)
//   scene::SceneDirector        (scene stack, one active instance)
//   render::Renderer            (draws the stage)
//   anim                        (ready-made animation tasks)
//
//=========================================================================

//=== Module Declarations =================================================

pub mod anim;
pub mod assets;
pub mod error;
pub mod globals;
pub mod render;
pub mod scene;
pub mod stage;
pub mod task;
