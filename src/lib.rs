//=========================================================================
// Stagecraft Library Root
//
// This crate defines the public API surface of the Stagecraft engine.
//
// Responsibilities:
// - Expose the engine facade (`Engine`, `EngineBuilder`)
// - Expose the core systems (tasks, scenes, stage, assets, rendering)
//   for scene authors
// - Keep the windowing layer (`platform`) hidden from end users
//
// Typical usage:
// ```no_run
// use stagecraft::prelude::*;
//
// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
// enum Screen { Title }
// impl SceneKey for Screen {}
//
// struct TitleScene;
// impl Scene<Screen> for TitleScene {}
//
// fn main() -> Result<(), EngineError> {
//     EngineBuilder::<Screen>::new()
//         .build()
//         .init(|director, ctx| {
//             director.register(Screen::Title, |_ctx| TitleScene);
//             director.push(Screen::Title, ctx)
//         })?
//         .run()
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains everything that runs inside a frame. `prelude` gathers
// the types scene code uses most.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` owns the Winit window and event loop and is not part of the
// public API surface.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder};
