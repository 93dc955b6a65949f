//=========================================================================
// Platform Subsystem
//
// Bridges Winit (OS-level window and redraw events) with the engine's
// frame loop.
//
// Architecture:
// ```text
//  Main Thread:
//  ┌────────────────────────────────────────┐
//  │  Winit Event Loop                      │
//  │   ├─ resumed()          → create window, fit viewport
//  │   ├─ Resized            → Engine::resize()
//  │   ├─ RedrawRequested    → Engine::frame(delta)
//  │   │     ├─ Ok  → request next redraw
//  │   │     └─ Err → store fault, exit loop
//  │   └─ CloseRequested     → exit loop
//  └────────────────────────────────────────┘
// ```
//
// Frame Boundary: RedrawRequested
//   → delta measured from the previous redraw (0 on the first one)
//   → the next redraw is requested immediately, so frames run at the
//     display refresh rate
//
// Main thread requirement: Winit mandates the main thread on macOS/iOS,
// so this runs on the thread that called `Engine::run()`.
//
//=========================================================================

//=== External Crates =====================================================

use std::time::Instant;

use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::error::EngineError;
use crate::core::scene::SceneKey;
use crate::engine::Engine;

//=== Platform ============================================================

/// Window owner and redraw pump for one [`Engine`].
///
/// # Lifecycle
///
/// 1. **Construction**: `Platform::new(engine)`
/// 2. **Execution**: `platform.run()` blocks on the event loop
/// 3. **Shutdown**: window closed, or a frame failed; the fault (if any)
///    is returned from `run`
///
/// # Fields
///
/// - `window`: Created lazily in `resumed()` (mobile compatibility)
/// - `last_frame`: Timestamp of the previous redraw
/// - `fault`: First unrecovered error, reported after the loop exits
pub(crate) struct Platform<S: SceneKey> {
    engine: Engine<S>,
    window: Option<Window>,
    last_frame: Option<Instant>,
    fault: Option<EngineError>,
}

impl<S: SceneKey> Platform<S> {
    //--- Construction -----------------------------------------------------

    pub fn new(engine: Engine<S>) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            engine,
            window: None,
            last_frame: None,
            fault: None,
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the event loop until the window closes or a frame fails.
    ///
    /// # Errors
    ///
    /// Event loop failures, window creation failure, or the frame error
    /// that halted the loop.
    ///
    /// # Panics
    ///
    /// Panics if called off the main thread (macOS/iOS Winit requirement).
    pub fn run(mut self) -> Result<(), EngineError> {
        debug!(target: "platform", "Starting Winit event loop");
        let event_loop = EventLoop::new().map_err(EngineError::EventLoopCreation)?;
        event_loop
            .run_app(&mut self)
            .map_err(EngineError::EventLoopExecution)?;

        debug!(target: "platform", "Winit event loop exited");
        match self.fault.take() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    //--- Internal Helpers -------------------------------------------------

    /// Milliseconds since the previous call; 0 on the first.
    fn frame_delta(&mut self, now: Instant) -> f64 {
        let delta = self
            .last_frame
            .map(|previous| now.saturating_duration_since(previous).as_secs_f64() * 1000.0)
            .unwrap_or(0.0);
        self.last_frame = Some(now);
        delta
    }

    fn halt(&mut self, event_loop: &ActiveEventLoop, fault: EngineError) {
        error!(target: "platform", "Halting frame loop: {}", fault);
        self.fault = Some(fault);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let delta = self.frame_delta(Instant::now());

        match self.engine.frame(delta) {
            Ok(()) => {
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            Err(fault) => self.halt(event_loop, fault),
        }
    }

    //--- Test Accessors ---------------------------------------------------

    #[cfg(test)]
    pub(crate) fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }
}

//=== Winit Integration ===================================================

impl<S: SceneKey> ApplicationHandler for Platform<S> {
    /// Called when app becomes active (startup or mobile resume).
    ///
    /// Creates the window if it doesn't exist yet and fits the viewport to
    /// its initial size.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        let viewport = self.engine.context().viewport();
        let attrs = WindowAttributes::default()
            .with_title(self.engine.title())
            .with_inner_size(LogicalSize::new(viewport.width(), viewport.height()));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                let size = window.inner_size();
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    size.width,
                    size.height,
                    window.scale_factor()
                );
                self.engine.resize(size.width, size.height);
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => self.halt(event_loop, EngineError::WindowCreation(e)),
        }
    }

    /// Handles per-window events.
    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                trace!(target: "platform", "Window resized to {}x{}", size.width, size.height);
                self.engine.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
