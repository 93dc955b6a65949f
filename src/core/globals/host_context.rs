//=========================================================================
// Host Context
//=========================================================================
//
// Shared services that scenes and the director operate on.
//
// Contains:
// - tasks:    the one task scheduler
// - assets:   the one asset loader
// - stage:    the display root and every attached node
// - viewport: logical design resolution
// - commands: deferred director requests
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::Sender;
use log::info;

//=== Internal Dependencies ===============================================

use super::Viewport;
use crate::core::assets::{AssetLoader, AssetSource};
use crate::core::error::TaskFault;
use crate::core::scene::{CommandQueue, DirectorCommand, SceneKey};
use crate::core::stage::Stage;
use crate::core::task::TaskScheduler;

//=== HostContext =========================================================

/// Services every scene receives by reference.
///
/// The engine owns exactly one context and lends it to scene factories,
/// lifecycle hooks and the director. Scenes request stack changes through
/// [`request`](Self::request) or a cloned [`commands`](Self::commands)
/// sender; those are applied by the engine after the task advance.
pub struct HostContext<S: SceneKey> {
    /// Cooperative per-frame task scheduler.
    pub tasks: TaskScheduler,

    /// Named resource loader.
    pub assets: AssetLoader,

    /// Display graph drawn by the renderer every frame.
    pub stage: Stage,

    viewport: Viewport,
    commands: CommandQueue<S>,
}

impl<S: SceneKey> HostContext<S> {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new(viewport: Viewport, source: Box<dyn AssetSource>) -> Self {
        Self {
            tasks: TaskScheduler::new(),
            assets: AssetLoader::new(source),
            stage: Stage::new(),
            viewport,
            commands: CommandQueue::new(),
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Sender that tasks can capture to request stack changes later.
    pub fn commands(&self) -> Sender<DirectorCommand<S>> {
        self.commands.sender()
    }

    /// Queues a director command for the end of the current frame.
    pub fn request(&self, command: DirectorCommand<S>) {
        // The queue keeps a receiver alive, so sending cannot fail.
        let _ = self.commands.sender().send(command);
    }

    pub(crate) fn drain_commands(&self) -> Vec<DirectorCommand<S>> {
        self.commands.drain()
    }

    //--- Frame Work -------------------------------------------------------

    /// Advances every live task against the stage.
    ///
    /// # Errors
    ///
    /// Propagates the first task failure of the tick.
    pub fn advance_tasks(&mut self, delta: f64) -> Result<(), TaskFault> {
        self.tasks.advance(delta, &mut self.stage)
    }

    //--- Teardown ---------------------------------------------------------

    /// Discards all scene-owned state.
    ///
    /// Resets the asset loader, stops every task and frees every child of
    /// the display root. This is engine-wide, not scoped to one scene: it
    /// is only correct because the director keeps a single scene alive at
    /// a time. Returns the number of freed nodes.
    pub fn teardown(&mut self) -> usize {
        self.assets.reset();
        self.tasks.stop_all();
        let freed = self.stage.clear_root();
        info!(target: "scene", "Scene teardown freed {} nodes", freed);
        freed
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assets::StaticSource;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Key {
        Main,
    }

    impl SceneKey for Key {}

    fn context() -> HostContext<Key> {
        HostContext::new(Viewport::default(), Box::new(StaticSource::new().with("logo", 64, 32)))
    }

    #[test]
    fn teardown_clears_everything() {
        let mut ctx = context();
        let layer = ctx.stage.create_layer();
        let child = ctx.stage.create_container();
        ctx.stage.add_child(layer, child).unwrap();
        ctx.tasks.spawn_fn(|_, _, _| Ok(()));
        ctx.assets.add("logo").load();

        assert_eq!(ctx.teardown(), 2);
        assert!(ctx.stage.is_empty(), "Only the root remains");
        assert!(ctx.tasks.is_empty());
        assert!(!ctx.assets.is_loading(), "Pending load is discarded");
    }

    #[test]
    fn requests_are_drained_in_order() {
        let ctx = context();
        ctx.request(DirectorCommand::Push(Key::Main));
        ctx.commands().send(DirectorCommand::Pop).unwrap();

        assert_eq!(
            ctx.drain_commands(),
            vec![DirectorCommand::Push(Key::Main), DirectorCommand::Pop]
        );
    }

    #[test]
    fn advance_tasks_drives_the_stage() {
        let mut ctx = context();
        let layer = ctx.stage.create_layer();
        ctx.tasks.spawn_fn(move |delta, frame, _| {
            frame.stage.node_mut(layer)?.position.x += delta;
            Ok(())
        });

        ctx.advance_tasks(16.0).unwrap();
        ctx.advance_tasks(16.0).unwrap();
        assert_eq!(ctx.stage.node(layer).unwrap().position.x, 32.0);
    }
}
