//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.

use std::fmt::Write;

use jmc_flame_protocol::{RenderCommand, TextAlign, ThemeToken};

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions. Rect titles become
/// `<title>` children, which browsers show as hover tooltips.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64) -> String {
    let mut svg = String::with_capacity(commands.len() * 160);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:Courier,monospace">"#,
    );
    let _ = write!(
        svg,
        r#"<rect width="{width}" height="{height}" fill="{}"/>"#,
        resolve_color(ThemeToken::Background),
    );

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                fill,
                border_color,
                title,
                ..
            } => {
                let stroke = border_color.map_or("none", resolve_color);
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{fill}" stroke="{stroke}" stroke-width="0.5">"#,
                    rect.x, rect.y, rect.w, rect.h,
                );
                if let Some(title) = title {
                    let _ = write!(svg, "<title>{}</title>", escape_xml(title));
                }
                svg.push_str("</rect>");
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{}" fill="{}" font-size="{font_size}" text-anchor="{anchor}" dominant-baseline="central" style="pointer-events:none">{}</text>"#,
                    position.x,
                    position.y,
                    resolve_color(*color),
                    escape_xml(text),
                );
            }
            RenderCommand::BeginGroup { id, .. } => {
                let _ = write!(svg, r#"<g id="{}">"#, escape_xml(id));
            }
            RenderCommand::EndGroup => svg.push_str("</g>"),
        }
    }

    svg.push_str("</svg>");
    svg
}

fn resolve_color(token: ThemeToken) -> &'static str {
    match token {
        ThemeToken::Background => "#ffffff",
        ThemeToken::Border => "#808080",
        ThemeToken::TextPrimary | ThemeToken::TooltipText | ThemeToken::StatusBarText => {
            "#000000"
        }
        ThemeToken::TextMuted => "#666666",
        ThemeToken::StatusBarBackground => "#d9d9d9",
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use jmc_flame_protocol::{Color, Point, Rect};

    #[test]
    fn basic_svg_output() {
        let commands = vec![
            RenderCommand::BeginGroup {
                id: "flame".into(),
                label: None,
            },
            RenderCommand::DrawRect {
                rect: Rect::new(10.0, 20.0, 100.0, 18.0),
                fill: Color::rgb(0xff, 0xff, 0x00),
                border_color: Some(ThemeToken::Border),
                title: Some("oracle.db.Connect".into()),
                frame_id: Some(1),
            },
            RenderCommand::EndGroup,
        ];
        let svg = render_svg(&commands, 800.0, 400.0);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"<g id="flame">"#));
        assert!(svg.contains("<title>oracle.db.Connect</title>"));
        assert!(svg.contains(r##"fill="#ffff00""##));
    }

    #[test]
    fn escapes_xml_entities() {
        let commands = vec![RenderCommand::DrawText {
            position: Point::new(0.0, 0.0),
            text: "Map<K, V>.get(&key)".into(),
            color: ThemeToken::TextPrimary,
            font_size: 12.0,
            align: TextAlign::Center,
        }];
        let svg = render_svg(&commands, 400.0, 100.0);
        assert!(svg.contains("Map&lt;K, V&gt;.get(&amp;key)"));
        assert!(svg.contains(r#"text-anchor="middle""#));
    }
}
