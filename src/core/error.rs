//=========================================================================
// Error Types
//=========================================================================
//
// Typed failures for every core concern.
//
// Layering:
//   StageError ─┐
//   AssetError ─┼─> TaskError ─> TaskFault ─┐
//               └─> SceneError ─────────────┼─> EngineError (halts the loop)
//   RenderError ────────────────────────────┘
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::stage::NodeId;
use crate::core::task::TaskId;

//=== StageError ==========================================================

/// Display graph failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    /// The id was never allocated or its node has been destroyed.
    #[error("node {0} does not exist (destroyed or never created)")]
    UnknownNode(NodeId),

    /// Attaching `child` under `parent` would create a cycle.
    #[error("cannot attach node {child} under its own descendant {parent}")]
    CyclicAttach { parent: NodeId, child: NodeId },

    /// The display root cannot be reparented or destroyed.
    #[error("the display root cannot be detached or destroyed")]
    RootImmutable,
}

//=== AssetError ==========================================================

/// Asset resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    /// Content read a resource key that was never loaded.
    ///
    /// This is a content bug and is treated as fatal.
    #[error("asset `{0}` was requested but never loaded")]
    Missing(String),

    /// The asset source could not resolve a queued name.
    #[error("asset source failed to resolve `{name}`: {reason}")]
    Unresolved { name: String, reason: String },
}

//=== TaskError ===========================================================

/// Failure reported by a task body during a tick.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Free-form failure raised by content code.
    #[error("{0}")]
    Custom(String),
}

//=== TaskFault ===========================================================

/// A task failure tagged with the failing task's id.
///
/// Returned by the scheduler when a tick is aborted.
#[derive(Debug, Error)]
#[error("task {id} failed: {source}")]
pub struct TaskFault {
    pub id: TaskId,
    #[source]
    pub source: TaskError,
}

//=== SceneError ==========================================================

/// Scene construction, initialization and navigation failures.
#[derive(Debug, Error)]
pub enum SceneError {
    /// A scene key was pushed without a registered factory.
    #[error("scene {0} has no registered factory")]
    Unregistered(String),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Asset(#[from] AssetError),
}

//=== RenderError =========================================================

/// Failure reported by a renderer backend.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render pass failed: {0}")]
    Backend(String),

    #[error(transparent)]
    Stage(#[from] StageError),
}

//=== EngineError =========================================================

/// Unrecovered fault that halts the frame loop.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A task failed during `advance`.
    #[error(transparent)]
    Task(#[from] TaskFault),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("event loop creation failed: {0}")]
    EventLoopCreation(#[source] winit::error::EventLoopError),

    #[error("event loop error: {0}")]
    EventLoopExecution(#[source] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    WindowCreation(#[source] winit::error::OsError),
}

//=========================================================================
// Unit Tests
//=========================================================================
