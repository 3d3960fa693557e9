use serde::{Deserialize, Serialize};

/// Semantic colour tokens for chrome around the flame graph, resolved by the
/// renderer's active theme. Node fills are concrete [`crate::Color`]s chosen
/// by the signature classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,
    Border,

    TextPrimary,
    TextMuted,

    TooltipText,

    StatusBarBackground,
    StatusBarText,
}
