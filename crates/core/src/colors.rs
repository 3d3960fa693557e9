use jmc_flame_protocol::Color;
use serde::{Deserialize, Serialize};

/// Maps a signature to a fill colour when it starts with `prefix`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixRule {
    pub prefix: String,
    pub color: Color,
}

impl PrefixRule {
    pub fn new(prefix: impl Into<String>, color: Color) -> Self {
        Self {
            prefix: prefix.into(),
            color,
        }
    }
}

/// Ordered prefix rules: the first matching rule wins, otherwise `fallback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorRules {
    pub rules: Vec<PrefixRule>,
    pub fallback: Color,
}

impl ColorRules {
    pub fn new(rules: Vec<PrefixRule>, fallback: Color) -> Self {
        Self { rules, fallback }
    }

    pub fn color_for(&self, signature: &str) -> Color {
        self.rules
            .iter()
            .find(|rule| signature.starts_with(rule.prefix.as_str()))
            .map_or(self.fallback, |rule| rule.color)
    }
}

impl Default for ColorRules {
    /// Common Java middleware packages.
    fn default() -> Self {
        Self {
            rules: vec![
                PrefixRule::new("oracle", Color::rgb(0xff, 0xff, 0x00)),
                PrefixRule::new("org.springframework", Color::rgb(0x00, 0xff, 0x7f)),
                PrefixRule::new("java.io", Color::rgb(0xff, 0xa5, 0x00)),
                PrefixRule::new("com.google", Color::rgb(0xbe, 0xbe, 0xbe)),
                PrefixRule::new("org.jboss", Color::rgb(0xff, 0x00, 0x00)),
            ],
            fallback: Color::rgb(0xff, 0xff, 0xff),
        }
    }
}
