use serde::{Deserialize, Serialize};

/// Font metrics and legibility thresholds for labels drawn inside rects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelPolicy {
    /// Advance width of one character (monospace font assumed).
    pub char_width: f64,
    /// Rects this tall or shorter get no label.
    pub min_height: f64,
    /// Rects must be wider than this many characters to get a label.
    pub min_chars: f64,
    pub font_size: f64,
}

impl Default for LabelPolicy {
    /// Courier 12 on a 96 dpi canvas.
    fn default() -> Self {
        Self {
            char_width: 7.2,
            min_height: 10.0,
            min_chars: 3.0,
            font_size: 12.0,
        }
    }
}

impl LabelPolicy {
    /// One character per terminal cell.
    pub fn terminal() -> Self {
        Self {
            char_width: 1.0,
            min_height: 0.5,
            min_chars: 3.0,
            font_size: 1.0,
        }
    }

    /// The text to draw for `signature` inside a `width` × `height` rect, or
    /// `None` when the rect is too small to be legible.
    ///
    /// Falls back from the full signature to the member name, then to the
    /// tail of the full signature.
    pub fn fit(&self, signature: &str, width: f64, height: f64) -> Option<String> {
        if self.char_width <= 0.0
            || height <= self.min_height
            || width <= self.min_chars * self.char_width
        {
            return None;
        }
        let available = (width / self.char_width).floor() as usize;

        if signature.chars().count() <= available {
            return Some(signature.to_string());
        }
        let member = member_name(signature);
        if !member.is_empty() && member.chars().count() <= available {
            return Some(member.to_string());
        }
        let skip = signature.chars().count().saturating_sub(available);
        Some(signature.chars().skip(skip).collect())
    }
}

/// Text after the last `.` of the qualified name, ignoring dots inside a
/// trailing parameter list: `a.B.run(java.lang.String)` → `run(java.lang.String)`.
pub fn member_name(signature: &str) -> &str {
    let qualified_end = signature.find('(').unwrap_or(signature.len());
    match signature[..qualified_end].rfind('.') {
        Some(dot) => &signature[dot + 1..],
        None => signature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> LabelPolicy {
        LabelPolicy {
            char_width: 10.0,
            min_height: 10.0,
            min_chars: 3.0,
            font_size: 12.0,
        }
    }

    #[test]
    fn member_name_skips_parameter_dots() {
        assert_eq!(member_name("a.b.C.run()"), "run()");
        assert_eq!(
            member_name("a.b.C.open(java.lang.String, int)"),
            "open(java.lang.String, int)"
        );
        assert_eq!(member_name("main"), "main");
    }

    #[test]
    fn too_small_rects_get_no_label() {
        let p = policy();
        assert_eq!(p.fit("a.b()", 200.0, 10.0), None);
        assert_eq!(p.fit("a.b()", 30.0, 20.0), None);
        assert!(p.fit("a.b()", 31.0, 20.0).is_some());
    }

    #[test]
    fn full_signature_when_it_fits() {
        let p = policy();
        assert_eq!(p.fit("a.b.Cc.run()", 120.0, 20.0).as_deref(), Some("a.b.Cc.run()"));
    }

    #[test]
    fn member_when_signature_is_too_long() {
        let p = policy();
        // 7 characters available; "run()" has 5.
        assert_eq!(
            p.fit("com.example.Server.run()", 75.0, 20.0).as_deref(),
            Some("run()")
        );
    }

    #[test]
    fn tail_of_signature_when_member_is_too_long() {
        let p = policy();
        // 4 characters available.
        assert_eq!(
            p.fit("com.example.Server.handleRequest()", 45.0, 20.0).as_deref(),
            Some("st()")
        );
    }

    #[test]
    fn terminal_policy_counts_cells() {
        let p = LabelPolicy::terminal();
        assert_eq!(p.fit("x.y.zap()", 6.0, 1.0).as_deref(), Some("zap()"));
        assert_eq!(p.fit("x.y.zap()", 3.0, 1.0), None);
    }
}
