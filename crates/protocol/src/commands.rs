use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;
use crate::theme::ThemeToken;
use crate::types::{Color, Point, Rect};

/// A single, stateless render instruction.
///
/// The core emits a `Vec<RenderCommand>` for each view. Renderers consume
/// this list sequentially and each command carries all the data it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled rectangle. `frame_id` is the handle a renderer reports
    /// back in [`crate::ViewEvent`]s; `title` is hover text for renderers that
    /// have a native tooltip (SVG `<title>`).
    DrawRect {
        rect: Rect,
        fill: Color,
        border_color: Option<ThemeToken>,
        title: Option<SharedStr>,
        frame_id: Option<u64>,
    },

    /// Draw a text string anchored at a position.
    DrawText {
        position: Point,
        text: SharedStr,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    },

    /// Begin a logical group (the flame graph, a tooltip). Renderers may use
    /// this for layering.
    BeginGroup {
        id: SharedStr,
        label: Option<SharedStr>,
    },

    /// End the current group.
    EndGroup,
}

/// Horizontal anchor of a `DrawText` position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}
