//! Rendering seam.
//!
//! Real vector-graphics output is the host's concern; the library only
//! describes what to draw. Implementations translate these calls to their
//! graphics stack (the CLI prints status lines, tests record commands).

use std::path::Path;

/// Draw-command sink for one gauge frame.
///
/// Calls arrive strictly as `begin_frame`, any number of draw commands,
/// `end_frame`. Coordinates are logical pixels; `pixel_ratio` carries the
/// device scale for surfaces that rasterize.
pub trait RenderSurface {
    /// Starts a frame covering the gauge's window.
    fn begin_frame(&mut self, width: f32, height: f32, pixel_ratio: f32);

    /// Draws centered text at the given position.
    fn fill_text(&mut self, x: f32, y: f32, font_size: f32, text: &str);

    /// Presents a fetched payload.
    ///
    /// `path` is where the payload was persisted, when persistence
    /// succeeded; `bytes` is always the full payload.
    fn draw_payload(&mut self, path: Option<&Path>, bytes: &[u8]);

    /// Finishes the frame.
    fn end_frame(&mut self);
}

#[cfg(test)]
pub mod tests {
    use std::path::PathBuf;

    use super::*;

    /// Recorded draw command for assertions.
    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawCommand {
        BeginFrame {
            width: f32,
            height: f32,
            pixel_ratio: f32,
        },
        FillText {
            x: f32,
            y: f32,
            font_size: f32,
            text: String,
        },
        DrawPayload {
            path: Option<PathBuf>,
            bytes: usize,
        },
        EndFrame,
    }

    /// Surface that records every command it receives.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub commands: Vec<DrawCommand>,
    }

    impl RecordingSurface {
        pub fn new() -> Self {
            Self::default()
        }

        /// Text of every `FillText` command, in order.
        pub fn texts(&self) -> Vec<&str> {
            self.commands
                .iter()
                .filter_map(|c| match c {
                    DrawCommand::FillText { text, .. } => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    impl RenderSurface for RecordingSurface {
        fn begin_frame(&mut self, width: f32, height: f32, pixel_ratio: f32) {
            self.commands.push(DrawCommand::BeginFrame {
                width,
                height,
                pixel_ratio,
            });
        }

        fn fill_text(&mut self, x: f32, y: f32, font_size: f32, text: &str) {
            self.commands.push(DrawCommand::FillText {
                x,
                y,
                font_size,
                text: text.to_string(),
            });
        }

        fn draw_payload(&mut self, path: Option<&Path>, bytes: &[u8]) {
            self.commands.push(DrawCommand::DrawPayload {
                path: path.map(Path::to_path_buf),
                bytes: bytes.len(),
            });
        }

        fn end_frame(&mut self) {
            self.commands.push(DrawCommand::EndFrame);
        }
    }

    #[test]
    fn test_recording_surface_captures_order() {
        let mut surface = RecordingSurface::new();
        surface.begin_frame(100.0, 50.0, 1.0);
        surface.fill_text(50.0, 25.0, 20.0, "hello");
        surface.end_frame();

        assert_eq!(surface.commands.len(), 3);
        assert_eq!(surface.texts(), vec!["hello"]);
        assert_eq!(surface.commands[2], DrawCommand::EndFrame);
    }
}
