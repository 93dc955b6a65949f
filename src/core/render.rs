//=========================================================================
// Renderer Contract
//=========================================================================
//
// Draws the display root once per frame.
//
// The core never inspects how pixels get produced. Backends receive the
// stage and typically consume `Stage::draw_list()`, which already carries
// accumulated transforms and opacity.
//
//=========================================================================

//=== External Dependencies ===============================================

use kurbo::Size;
use log::trace;

//=== Internal Dependencies ===============================================

use crate::core::error::RenderError;
use crate::core::stage::{DrawItem, Stage};

//=== Renderer Trait ======================================================

/// Backend that presents the stage.
///
/// Implemented by real graphics backends and by test doubles.
pub trait Renderer {
    /// Draws the whole display graph.
    ///
    /// # Errors
    ///
    /// Any error halts the frame loop.
    fn render(&mut self, stage: &Stage) -> Result<(), RenderError>;

    /// Called when the output surface changes size (in physical pixels).
    ///
    /// Default implementation does nothing.
    fn resize(&mut self, _surface: Size) {}
}

//=== HeadlessRenderer ====================================================

/// Renderer that only flattens the stage and keeps frame statistics.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: u64,
    surface: Size,
    last_frame: Vec<DrawItem>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed `render` calls.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Most recent surface size passed to `resize`.
    pub fn surface(&self) -> Size {
        self.surface
    }

    /// Draw items produced by the last frame.
    pub fn last_frame(&self) -> &[DrawItem] {
        &self.last_frame
    }
}

impl Renderer for HeadlessRenderer {
    fn render(&mut self, stage: &Stage) -> Result<(), RenderError> {
        self.last_frame = stage.draw_list();
        self.frames += 1;
        trace!(
            target: "engine",
            "Headless frame {}: {} sprites from {} nodes",
            self.frames,
            self.last_frame.len(),
            stage.len()
        );
        Ok(())
    }

    fn resize(&mut self, surface: Size) {
        self.surface = surface;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assets::Texture;

    #[test]
    fn headless_records_each_frame() {
        let mut stage = Stage::new();
        let layer = stage.create_layer();
        let sprite = stage.create_sprite(Texture::new("card", 10, 10));
        stage.add_child(layer, sprite).unwrap();

        let mut renderer = HeadlessRenderer::new();
        renderer.render(&stage).unwrap();
        assert_eq!(renderer.frames(), 1);
        assert_eq!(renderer.last_frame().len(), 1);

        stage.node_mut(sprite).unwrap().visible = false;
        renderer.render(&stage).unwrap();
        assert_eq!(renderer.frames(), 2);
        assert!(renderer.last_frame().is_empty(), "Hidden sprites are not drawn");
    }

    #[test]
    fn headless_tracks_surface() {
        let mut renderer = HeadlessRenderer::new();
        renderer.resize(Size::new(680.0, 320.0));
        assert_eq!(renderer.surface(), Size::new(680.0, 320.0));
    }
}
