//=========================================================================
// Scene Director
//=========================================================================
//
// Manages factory registration, the scene stack and the one active
// instance.
//
// Scenes are stored as factories by key and referenced via a stack of
// keys. Scene state does not survive being covered: push destroys the
// active scene and pop rebuilds the one beneath from its factory.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::{DirectorCommand, Scene, SceneKey};
use crate::core::assets::LoadStatus;
use crate::core::error::SceneError;
use crate::core::globals::HostContext;

//=== SceneFactory ========================================================

type SceneFactory<S> = Box<dyn Fn(&mut HostContext<S>) -> Box<dyn Scene<S>>>;

//=== ActiveScene =========================================================

struct ActiveScene<S: SceneKey> {
    key: S,
    instance: u64,
    scene: Box<dyn Scene<S>>,
    initialized: bool,
}

//=== SceneDirector =======================================================

/// Ordered stack of scene keys with exactly one instantiated top.
///
/// An active scene exists iff the stack is non-empty, and it was built
/// from the top key.
pub struct SceneDirector<S: SceneKey> {
    factories: HashMap<S, SceneFactory<S>>,
    stack: Vec<S>,
    active: Option<ActiveScene<S>>,
    constructed: u64,
}

impl<S: SceneKey> SceneDirector<S> {
    //--- Construction -----------------------------------------------------

    /// Creates a director with no factories and an empty stack.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            stack: Vec::new(),
            active: None,
            constructed: 0,
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers the factory that builds the scene for `key`.
    ///
    /// Re-registering a key replaces its factory. Scenes already on the
    /// stack use the new factory the next time they are built.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use stagecraft::prelude::*;
    /// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// # enum Screen { Title }
    /// # impl SceneKey for Screen {}
    /// struct TitleScene;
    /// impl Scene<Screen> for TitleScene {}
    ///
    /// let mut director = SceneDirector::new();
    /// director.register(Screen::Title, |_ctx| TitleScene);
    /// assert!(director.is_registered(Screen::Title));
    /// ```
    pub fn register<F, T>(&mut self, key: S, factory: F)
    where
        F: Fn(&mut HostContext<S>) -> T + 'static,
        T: Scene<S> + 'static,
    {
        let factory: SceneFactory<S> =
            Box::new(move |ctx: &mut HostContext<S>| -> Box<dyn Scene<S>> { Box::new(factory(ctx)) });

        if self.factories.insert(key, factory).is_some() {
            warn!(target: "scene", "Scene {:?} was already registered and has been replaced", key);
        } else {
            debug!(target: "scene", "Registered scene {:?}", key);
        }
    }

    pub fn is_registered(&self, key: S) -> bool {
        self.factories.contains_key(&key)
    }

    //--- Stack Operations -------------------------------------------------

    /// Destroys the active scene, then builds `key` on top of the stack.
    ///
    /// The new scene's queued assets are requested immediately; its
    /// `initialized` hook fires from a later [`poll_assets`](Self::poll_assets).
    ///
    /// # Errors
    ///
    /// [`SceneError::Unregistered`] if `key` has no factory. Nothing is
    /// destroyed in that case.
    pub fn push(&mut self, key: S, context: &mut HostContext<S>) -> Result<(), SceneError> {
        if !self.factories.contains_key(&key) {
            warn!(target: "scene", "Attempted to push unregistered scene {:?}", key);
            return Err(SceneError::Unregistered(format!("{:?}", key)));
        }

        self.destroy_active(context);
        debug!(target: "scene", "Pushing scene {:?} onto stack", key);
        self.stack.push(key);
        self.instantiate(key, context);
        Ok(())
    }

    /// Destroys the active scene and rebuilds the one beneath it, if any.
    ///
    /// Popping an empty stack does nothing.
    pub fn pop(&mut self, context: &mut HostContext<S>) {
        let Some(key) = self.stack.last().copied() else {
            debug!(target: "scene", "Pop on empty scene stack ignored");
            return;
        };

        self.destroy_active(context);
        self.stack.pop();
        debug!(target: "scene", "Popped scene {:?} from stack", key);

        if let Some(&top) = self.stack.last() {
            self.instantiate(top, context);
        }
    }

    /// Executes one queued director command.
    ///
    /// # Errors
    ///
    /// Same as [`push`](Self::push).
    pub fn apply(&mut self, command: DirectorCommand<S>, context: &mut HostContext<S>) -> Result<(), SceneError> {
        match command {
            DirectorCommand::Push(key) => self.push(key, context),
            DirectorCommand::Pop => {
                self.pop(context);
                Ok(())
            }
        }
    }

    //--- Asset Completion -------------------------------------------------

    /// Polls the asset loader and fires `initialized` once on completion.
    ///
    /// # Errors
    ///
    /// Asset resolution failures and errors returned by the hook.
    pub fn poll_assets(&mut self, context: &mut HostContext<S>) -> Result<(), SceneError> {
        if context.assets.poll()? != LoadStatus::Completed {
            return Ok(());
        }

        if let Some(active) = self.active.as_mut() {
            if !active.initialized {
                active.initialized = true;
                info!(target: "scene", "Scene {:?} initialized (instance {})", active.key, active.instance);
                active.scene.initialized(context)?;
            }
        }
        Ok(())
    }

    //--- Queries ----------------------------------------------------------

    /// Key of the scene currently instantiated.
    pub fn active_key(&self) -> Option<S> {
        self.active.as_ref().map(|active| active.key)
    }

    /// Construction number of the active instance.
    ///
    /// Every construction gets a new number, so a scene rebuilt by `pop`
    /// is distinguishable from the instance that was destroyed by `push`.
    pub fn active_instance(&self) -> Option<u64> {
        self.active.as_ref().map(|active| active.instance)
    }

    /// Whether the active scene's `initialized` hook has fired.
    pub fn is_initialized(&self) -> bool {
        self.active.as_ref().is_some_and(|active| active.initialized)
    }

    /// Stack contents, bottom first.
    pub fn stack(&self) -> &[S] {
        &self.stack
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    //--- Internal Helpers -------------------------------------------------

    fn destroy_active(&mut self, context: &mut HostContext<S>) {
        if let Some(mut active) = self.active.take() {
            active.scene.destroy(context);
            info!(target: "scene", "Destroyed scene {:?} (instance {})", active.key, active.instance);
        }
    }

    fn instantiate(&mut self, key: S, context: &mut HostContext<S>) {
        let Some(factory) = self.factories.get(&key) else {
            warn!(target: "scene", "Scene {:?} on stack has no factory", key);
            return;
        };

        self.constructed += 1;
        let scene = factory(context);
        context.assets.load();

        info!(target: "scene", "Constructed scene {:?} (instance {})", key, self.constructed);
        self.active = Some(ActiveScene {
            key,
            instance: self.constructed,
            scene,
            initialized: false,
        });
    }
}

impl<S: SceneKey> Default for SceneDirector<S> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
