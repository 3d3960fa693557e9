pub mod commands;
pub mod events;
pub mod shared_str;
pub mod theme;
pub mod types;

pub use commands::{RenderCommand, TextAlign};
pub use events::ViewEvent;
pub use shared_str::SharedStr;
pub use theme::ThemeToken;
pub use types::{Color, ColorParseError, NAMED_COLORS, Point, Rect, Viewport};
