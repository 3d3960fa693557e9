use serde::{Deserialize, Serialize};

/// Pointer events a renderer reports back to the view that produced its
/// commands. Frame ids are the `frame_id` handles of `DrawRect` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewEvent {
    /// The pointer entered the rectangle with this frame id.
    Enter(u64),
    /// The pointer left whatever rectangle it was over.
    Leave,
    /// The rectangle was activated (double-click, Enter key).
    Activate(u64),
}
