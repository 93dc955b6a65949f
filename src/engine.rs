//=========================================================================
// Stagecraft Engine
//
// Composition root: owns the director, the host context and the renderer
// and drives one frame at a time.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──init()──>  Engine  ──run()──>  [Window]
//         │                          │                                       │
//         ├─ with_viewport()         └─ frame(delta)                         └─ frame() per redraw
//         ├─ with_title()                ├─ director.poll_assets()
//         ├─ with_max_frame_delta()      ├─ context.advance_tasks()
//         ├─ with_asset_source()         ├─ director.apply(commands)
//         └─ with_renderer()             └─ renderer.render(stage)
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::marker::PhantomData;

use kurbo::Size;
use log::{debug, info, trace, warn};

//=== Internal Dependencies ===============================================

use crate::core::assets::{AssetSource, StaticSource};
use crate::core::error::{EngineError, SceneError};
use crate::core::globals::{HostContext, Viewport};
use crate::core::render::{HeadlessRenderer, Renderer};
use crate::core::scene::{SceneDirector, SceneKey};
use crate::platform::Platform;

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **Viewport**: 1360×640 logical pixels
/// - **Title**: "Stagecraft"
/// - **Max frame delta**: 250 ms
/// - **Asset source**: empty [`StaticSource`]
/// - **Renderer**: [`HeadlessRenderer`]
///
/// # Examples
///
/// ```no_run
/// use stagecraft::prelude::*;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Screen { Title }
/// impl SceneKey for Screen {}
///
/// struct TitleScene;
/// impl Scene<Screen> for TitleScene {}
///
/// let engine = EngineBuilder::<Screen>::new()
///     .with_title("Demo")
///     .with_max_frame_delta(100.0)
///     .build()
///     .init(|director, ctx| {
///         director.register(Screen::Title, |_ctx| TitleScene);
///         director.push(Screen::Title, ctx)
///     })?;
///
/// engine.run()?;
/// # Ok::<(), EngineError>(())
/// ```
pub struct EngineBuilder<S: SceneKey> {
    viewport: Viewport,
    title: String,
    max_frame_delta: f64,
    source: Option<Box<dyn AssetSource>>,
    renderer: Option<Box<dyn Renderer>>,
    _phantom: PhantomData<S>,
}

impl<S: SceneKey> EngineBuilder<S> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            viewport: Viewport::default(),
            title: "Stagecraft".to_string(),
            max_frame_delta: 250.0,
            source: None,
            renderer: None,
            _phantom: PhantomData,
        }
    }

    /// Sets the logical design resolution.
    ///
    /// Default: 1360×640
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Viewport::new(width, height);
        self
    }

    /// Sets the window title used by [`Engine::run`].
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the largest delta (ms) a single frame may advance tasks by.
    ///
    /// Longer gaps (window dragged, process suspended) are clamped so
    /// animations do not jump.
    ///
    /// Default: 250.0
    ///
    /// # Panics
    ///
    /// Panics if `max <= 0.0` or `max` is not finite.
    pub fn with_max_frame_delta(mut self, max: f64) -> Self {
        assert!(
            max.is_finite() && max > 0.0,
            "Max frame delta must be positive, got {}",
            max
        );
        self.max_frame_delta = max;
        self
    }

    /// Sets the backend that resolves asset names.
    pub fn with_asset_source<A: AssetSource + 'static>(mut self, source: A) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Sets the backend that draws the stage.
    pub fn with_renderer<R: Renderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Builds the engine instance.
    ///
    /// The stack is empty; register factories and push the first scene
    /// with [`Engine::init`].
    pub fn build(self) -> Engine<S> {
        info!(
            target: "engine",
            "Building engine (viewport: {}x{}, max delta: {} ms)",
            self.viewport.width(),
            self.viewport.height(),
            self.max_frame_delta
        );

        let source = self.source.unwrap_or_else(|| Box::new(StaticSource::new()));
        let renderer = self.renderer.unwrap_or_else(|| Box::new(HeadlessRenderer::new()));

        Engine {
            director: SceneDirector::new(),
            context: HostContext::new(self.viewport, source),
            renderer,
            title: self.title,
            max_frame_delta: self.max_frame_delta,
            frames: 0,
            scale: 1.0,
        }
    }
}

impl<S: SceneKey> Default for EngineBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Stagecraft runtime.
///
/// Owns exactly one [`SceneDirector`], one [`HostContext`] and one
/// [`Renderer`]. Create via [`EngineBuilder`].
///
/// # Frame Order
///
/// Every [`frame`](Self::frame) performs, in order:
///
/// 1. Asset poll (may fire the active scene's `initialized`)
/// 2. Task advance with the clamped delta
/// 3. Director command drain
/// 4. Render of the display root
///
/// Any error aborts the frame and is returned; [`run`](Self::run) stops
/// the event loop on the first one. A failed director command also drops
/// the commands drained after it in the same frame.
pub struct Engine<S: SceneKey> {
    director: SceneDirector<S>,
    context: HostContext<S>,
    renderer: Box<dyn Renderer>,
    title: String,
    max_frame_delta: f64,
    frames: u64,
    scale: f64,
}

impl<S: SceneKey> Engine<S> {
    //--- Initialization ---------------------------------------------------

    /// Registers scenes and pushes the initial one.
    ///
    /// # Errors
    ///
    /// Whatever `init_fn` returns, typically an unregistered initial push.
    pub fn init<F>(mut self, init_fn: F) -> Result<Self, EngineError>
    where
        F: FnOnce(&mut SceneDirector<S>, &mut HostContext<S>) -> Result<(), SceneError>,
    {
        info!(target: "engine", "Initializing scenes");
        init_fn(&mut self.director, &mut self.context)?;
        info!(
            target: "engine",
            "Engine initialization complete (stack: {:?})",
            self.director.stack()
        );
        Ok(self)
    }

    //--- Frame Loop -------------------------------------------------------

    /// Runs one frame with `delta_ms` elapsed since the previous one.
    ///
    /// The delta is clamped to `[0, max_frame_delta]`; negative or
    /// non-finite values count as zero.
    ///
    /// # Errors
    ///
    /// The first asset, scene, task or render failure of the frame.
    pub fn frame(&mut self, delta_ms: f64) -> Result<(), EngineError> {
        let delta = self.clamp_delta(delta_ms);

        self.director.poll_assets(&mut self.context)?;
        self.context.advance_tasks(delta)?;

        let commands = self.context.drain_commands();
        let drained = commands.len();
        for (applied, command) in commands.into_iter().enumerate() {
            debug!(target: "engine", "Applying {:?}", command);
            if let Err(fault) = self.director.apply(command, &mut self.context) {
                let discarded = drained - applied - 1;
                if discarded > 0 {
                    warn!(
                        target: "engine",
                        "Discarding {} director command(s) queued after the failed one",
                        discarded
                    );
                }
                return Err(fault.into());
            }
        }

        self.renderer.render(&self.context.stage)?;
        self.frames += 1;

        trace!(
            target: "engine",
            "Frame {} done (delta: {:.2} ms, tasks: {}, nodes: {})",
            self.frames,
            delta,
            self.context.tasks.len(),
            self.context.stage.len()
        );
        Ok(())
    }

    fn clamp_delta(&self, delta_ms: f64) -> f64 {
        if !delta_ms.is_finite() || delta_ms < 0.0 {
            warn!(target: "engine", "Invalid frame delta {} treated as 0", delta_ms);
            return 0.0;
        }
        if delta_ms > self.max_frame_delta {
            debug!(
                target: "engine",
                "Frame delta {:.2} ms clamped to {} ms",
                delta_ms,
                self.max_frame_delta
            );
        }
        delta_ms.min(self.max_frame_delta)
    }

    //--- Surface ----------------------------------------------------------

    /// Fits the viewport into a `width`×`height` surface.
    ///
    /// The display root is scaled uniformly by `min(w / VW, h / VH)` and
    /// the renderer receives the scaled viewport size, rounded up.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            debug!(target: "engine", "Ignoring resize to {}x{}", width, height);
            return;
        }

        let viewport = self.context.viewport();
        let surface = Size::new(f64::from(width), f64::from(height));
        self.scale = viewport.fit_scale(surface);

        let root = self.context.stage.root();
        if let Ok(node) = self.context.stage.node_mut(root) {
            node.set_uniform_scale(self.scale);
        }

        let scaled = viewport.scaled_size(self.scale);
        self.renderer.resize(scaled);
        debug!(
            target: "engine",
            "Resized to {}x{} (scale {:.3}, surface {}x{})",
            width,
            height,
            self.scale,
            scaled.width,
            scaled.height
        );
    }

    //--- Navigation -------------------------------------------------------

    /// Pushes a scene immediately. See [`SceneDirector::push`].
    ///
    /// # Errors
    ///
    /// [`SceneError::Unregistered`] wrapped in [`EngineError::Scene`].
    pub fn push(&mut self, key: S) -> Result<(), EngineError> {
        self.director.push(key, &mut self.context)?;
        Ok(())
    }

    /// Pops the active scene immediately. See [`SceneDirector::pop`].
    pub fn pop(&mut self) {
        self.director.pop(&mut self.context);
    }

    //--- Execution --------------------------------------------------------

    /// Opens a window and drives [`frame`](Self::frame) on every redraw.
    ///
    /// Blocks until the window closes or a frame fails.
    ///
    /// # Errors
    ///
    /// The frame error that stopped the loop, or a windowing failure.
    pub fn run(self) -> Result<(), EngineError> {
        info!(target: "engine", "Starting engine runtime");
        let result = Platform::new(self).run();
        match &result {
            Ok(()) => info!(target: "engine", "Engine shutdown complete"),
            Err(e) => info!(target: "engine", "Engine halted: {}", e),
        }
        result
    }

    //--- Accessors --------------------------------------------------------

    pub fn director(&self) -> &SceneDirector<S> {
        &self.director
    }

    pub fn context(&self) -> &HostContext<S> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut HostContext<S> {
        &mut self.context
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn max_frame_delta(&self) -> f64 {
        self.max_frame_delta
    }

    /// Number of completed frames.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Current display root scale from the last [`resize`](Self::resize).
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
