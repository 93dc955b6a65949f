//=========================================================================
// Global Engine State
//=========================================================================
//
// Shared services handed to scenes and the director.
//
// Architecture:
//   HostContext: TaskScheduler + AssetLoader + Stage + Viewport
//                + director command queue
//
// The context is owned by the engine and passed explicitly by reference.
// Nothing in it is reachable through a global.
//
//=========================================================================

//=== Module Declarations =================================================

mod host_context;
mod viewport;

//=== Public API ==========================================================

pub use host_context::HostContext;
pub use viewport::Viewport;
