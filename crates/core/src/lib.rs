//! Call-tree model, JMC report parser, and flame graph layout.
//!
//! ```text
//!   report ─▶ parse_jmc ─▶ CallForest ─▶ FlameSession ─▶ RenderCommand[] ─▶ renderer
//!                              ▲               │                               │
//!                              └── zoom_into ◀─┴────────── ViewEvent ◀─────────┘
//! ```

pub mod colors;
pub mod config;
pub mod model;
pub mod parsers;
pub mod svg;
pub mod views;

pub use colors::{ColorRules, PrefixRule};
pub use config::Config;
pub use model::{CallForest, CallTree, CallTreeNode, FlameSession, NodeDetail, NodeId, ViewAction};
pub use parsers::{JmcParseError, parse_jmc};
pub use views::{LabelPolicy, LayoutError, Orientation};
