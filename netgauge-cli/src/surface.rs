//! Terminal render surface.
//!
//! Translates gauge draw commands into status lines. Frames only arrive
//! when the gauge is dirty, so output stays quiet between state changes.

use std::path::Path;

use console::style;
use netgauge::gauge::RenderSurface;

/// Render surface that prints one status line per frame.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    frames: u64,
}

impl TerminalSurface {
    /// Creates a fresh surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderSurface for TerminalSurface {
    fn begin_frame(&mut self, _width: f32, _height: f32, _pixel_ratio: f32) {
        self.frames += 1;
    }

    fn fill_text(&mut self, _x: f32, _y: f32, _font_size: f32, text: &str) {
        println!("[frame {}] {}", self.frames, style(text).cyan());
    }

    fn draw_payload(&mut self, path: Option<&Path>, bytes: &[u8]) {
        match path {
            Some(path) => println!(
                "[frame {}] payload: {} ({} bytes)",
                self.frames,
                style(path.display()).green(),
                bytes.len()
            ),
            None => println!(
                "[frame {}] payload: {} bytes {}",
                self.frames,
                bytes.len(),
                style("(not persisted)").yellow()
            ),
        }
    }

    fn end_frame(&mut self) {}
}
