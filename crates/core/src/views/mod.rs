pub mod flame;
pub mod label;
pub mod tooltip;

pub use flame::{FlameLayout, LayoutError, NodeRect, Orientation, layout_flame, render_flame};
pub use label::LabelPolicy;
pub use tooltip::render_tooltip;
