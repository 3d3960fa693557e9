use jmc_flame_protocol::{Color, Point, Rect, RenderCommand, TextAlign, ThemeToken, Viewport};

use crate::model::NodeDetail;
use crate::views::label::LabelPolicy;

// Offsets in units of the font size, tuned for a 12px font: the tooltip
// sits 10px above the pointer, or 20px below it within 30px of the top.
const FLIP_BELOW: f64 = 30.0 / 12.0;
const OFFSET_ABOVE: f64 = 10.0 / 12.0;
const OFFSET_BELOW: f64 = 20.0 / 12.0;
const PADDING: f64 = 2.0 / 12.0;
const TOOLTIP_FILL: Color = Color::rgb(0xff, 0xff, 0xff);

/// Place the detail text for a hovered node next to the pointer.
///
/// The text sits above the pointer unless that would leave the top of the
/// viewport, and is anchored left, centre or right depending on which third
/// of the viewport the pointer is in, so it stays on screen.
pub fn render_tooltip(
    detail: &NodeDetail,
    pointer: Point,
    viewport: &Viewport,
    labels: &LabelPolicy,
) -> Vec<RenderCommand> {
    let text = detail.to_string();
    let font_size = labels.font_size;
    let rel_x = pointer.x - viewport.x;
    let rel_y = pointer.y - viewport.y;

    let baseline = if rel_y > FLIP_BELOW * font_size {
        pointer.y - OFFSET_ABOVE * font_size
    } else {
        pointer.y + OFFSET_BELOW * font_size
    };
    let align = if rel_x < viewport.width * 0.3 {
        TextAlign::Left
    } else if rel_x < viewport.width * 0.7 {
        TextAlign::Center
    } else {
        TextAlign::Right
    };

    let text_w = text.chars().count() as f64 * labels.char_width;
    let left = match align {
        TextAlign::Left => pointer.x,
        TextAlign::Center => pointer.x - text_w / 2.0,
        TextAlign::Right => pointer.x - text_w,
    };
    let pad = PADDING * font_size;
    let background = Rect::new(
        left - pad,
        baseline - font_size - pad,
        text_w + 2.0 * pad,
        font_size + 2.0 * pad,
    );

    vec![
        RenderCommand::BeginGroup {
            id: "tooltip".into(),
            label: None,
        },
        RenderCommand::DrawRect {
            rect: background,
            fill: TOOLTIP_FILL,
            border_color: None,
            title: None,
            frame_id: None,
        },
        RenderCommand::DrawText {
            position: Point::new(pointer.x, baseline - font_size / 2.0),
            text: text.into(),
            color: ThemeToken::TooltipText,
            font_size,
            align,
        },
        RenderCommand::EndGroup,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail() -> NodeDetail {
        NodeDetail {
            signature: "oracle.db.Connect.open".into(),
            samples: 400,
            percentage: 40.0,
        }
    }

    fn text_of(cmds: &[RenderCommand]) -> Option<(Point, TextAlign, String)> {
        cmds.iter().find_map(|c| match c {
            RenderCommand::DrawText {
                position,
                align,
                text,
                ..
            } => Some((*position, *align, text.to_string())),
            _ => None,
        })
    }

    fn tip(x: f64, y: f64) -> Option<(Point, TextAlign, String)> {
        let vp = Viewport::new(1000.0, 500.0);
        text_of(&render_tooltip(&detail(), Point::new(x, y), &vp, &LabelPolicy::default()))
    }

    #[test]
    fn anchors_by_pointer_third() {
        assert_eq!(tip(100.0, 200.0).map(|t| t.1), Some(TextAlign::Left));
        assert_eq!(tip(500.0, 200.0).map(|t| t.1), Some(TextAlign::Center));
        assert_eq!(tip(900.0, 200.0).map(|t| t.1), Some(TextAlign::Right));
    }

    #[test]
    fn flips_below_pointer_near_top() {
        assert!(tip(10.0, 200.0).is_some_and(|t| t.0.y < 200.0));
        assert!(tip(10.0, 20.0).is_some_and(|t| t.0.y > 20.0));
    }

    #[test]
    fn shows_signature_samples_and_percentage() {
        assert_eq!(
            tip(10.0, 200.0).map(|t| t.2).as_deref(),
            Some("oracle.db.Connect.open 400 40.00%")
        );
    }

    #[test]
    fn scales_with_terminal_cells() {
        let vp = Viewport::new(80.0, 24.0);
        let cmds = render_tooltip(&detail(), Point::new(2.5, 10.5), &vp, &LabelPolicy::terminal());
        let text = text_of(&cmds).expect("text");
        // One row above the pointer.
        assert_eq!(text.0.y.floor(), 9.0);
    }
}
