use jmc_flame_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken, Viewport};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::colors::ColorRules;
use crate::model::{CallForest, CallTree, NodeId};
use crate::views::label::LabelPolicy;

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("cannot lay out {name:?}: it has no samples")]
    EmptyForest { name: String },
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },
}

/// Which edge of the viewport the root row sits against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// Roots along the bottom edge, callees stacked upward (classic flame graph).
    #[default]
    BottomUp,
    /// Roots along the top edge, callees hanging downward (icicle graph).
    TopDown,
}

/// Placed rectangle for one call-tree node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRect {
    pub node: NodeId,
    /// Row index; roots are 0.
    pub depth: usize,
    pub rect: Rect,
}

/// Geometry for every node of a forest, in depth-first pre-order of the
/// sorted layout.
#[derive(Debug, Clone)]
pub struct FlameLayout {
    pub viewport: Viewport,
    pub orientation: Orientation,
    pub x_scale: f64,
    pub y_scale: f64,
    pub rects: Vec<NodeRect>,
}

impl FlameLayout {
    pub fn rect_of(&self, node: NodeId) -> Option<Rect> {
        self.rects.iter().find(|r| r.node == node).map(|r| r.rect)
    }

    /// The node drawn under `point`, if any.
    pub fn hit_test(&self, point: Point) -> Option<NodeId> {
        self.rects
            .iter()
            .find(|r| r.rect.contains(point))
            .map(|r| r.node)
    }
}

/// Lay out `forest` into `viewport`: width proportional to inclusive
/// samples, one row per call depth.
///
/// Siblings (and roots) are ordered by signature so output does not depend on
/// report order.
pub fn layout_flame(
    forest: &CallForest,
    viewport: &Viewport,
    orientation: Orientation,
) -> Result<FlameLayout, LayoutError> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(viewport.width) || !valid(viewport.height) {
        return Err(LayoutError::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
        });
    }

    let total = forest.total_samples();
    if total == 0 {
        return Err(LayoutError::EmptyForest {
            name: forest.name().to_string(),
        });
    }

    let x_scale = viewport.width / total as f64;
    let y_scale = viewport.height / forest.depth() as f64;

    let mut layout = FlameLayout {
        viewport: *viewport,
        orientation,
        x_scale,
        y_scale,
        rects: Vec::with_capacity(forest.tree().len()),
    };
    place_nodes(forest.tree(), forest.roots(), viewport.x, &mut layout);

    tracing::debug!(
        forest = forest.name(),
        rects = layout.rects.len(),
        x_scale,
        y_scale,
        "laid out flame graph"
    );
    Ok(layout)
}

fn row_y(layout: &FlameLayout, depth: usize) -> f64 {
    let vp = &layout.viewport;
    let offset = depth as f64 * layout.y_scale;
    match layout.orientation {
        Orientation::BottomUp => vp.y + vp.height - layout.y_scale - offset,
        Orientation::TopDown => vp.y + offset,
    }
}

fn sorted_by_signature(tree: &CallTree, ids: &[NodeId]) -> Vec<NodeId> {
    let mut sorted = ids.to_vec();
    sorted.sort_by(|&a, &b| {
        let sig = |id| tree.node(id).map(|n| n.signature.as_str());
        sig(a).cmp(&sig(b))
    });
    sorted
}

/// Place every node reachable from `roots`, depth-first in pre-order, using
/// an explicit work stack.
fn place_nodes(tree: &CallTree, roots: &[NodeId], x_origin: f64, layout: &mut FlameLayout) {
    let mut pending: Vec<(NodeId, usize, f64)> = Vec::new();
    push_siblings(tree, roots, 0, x_origin, layout.x_scale, &mut pending);

    while let Some((id, depth, x)) = pending.pop() {
        let Some(node) = tree.node(id) else {
            continue;
        };
        layout.rects.push(NodeRect {
            node: id,
            depth,
            rect: Rect::new(
                x,
                row_y(layout, depth),
                node.samples as f64 * layout.x_scale,
                layout.y_scale,
            ),
        });
        push_siblings(tree, &node.children, depth + 1, x, layout.x_scale, &mut pending);
    }
}

/// Queue one sibling group, sorted and offset left to right. Pushed in
/// reverse so the leftmost sibling is popped first.
fn push_siblings(
    tree: &CallTree,
    ids: &[NodeId],
    depth: usize,
    x_origin: f64,
    x_scale: f64,
    pending: &mut Vec<(NodeId, usize, f64)>,
) {
    let start = pending.len();
    let mut offset_samples: u64 = 0;
    for id in sorted_by_signature(tree, ids) {
        let Some(node) = tree.node(id) else {
            continue;
        };
        // Offsets scale the integer running total so that sibling edges
        // do not drift from accumulated float error.
        pending.push((id, depth, x_origin + offset_samples as f64 * x_scale));
        offset_samples += node.samples;
    }
    pending[start..].reverse();
}

/// Turn a layout into render commands: every rect first, then every label
/// that fits, so text is never covered by a later rect.
pub fn render_flame(
    forest: &CallForest,
    layout: &FlameLayout,
    colors: &ColorRules,
    labels: &LabelPolicy,
) -> Vec<RenderCommand> {
    let mut commands = Vec::with_capacity(layout.rects.len() * 2 + 2);
    commands.push(RenderCommand::BeginGroup {
        id: "flame".into(),
        label: Some(forest.name().into()),
    });

    let mut texts = Vec::new();
    for placed in &layout.rects {
        let Some(node) = forest.node(placed.node) else {
            continue;
        };
        let rect = placed.rect;
        commands.push(RenderCommand::DrawRect {
            rect,
            fill: colors.color_for(&node.signature),
            border_color: Some(ThemeToken::Border),
            title: Some(node.signature.clone()),
            frame_id: Some(placed.node.frame_id()),
        });
        if let Some(text) = labels.fit(&node.signature, rect.w, rect.h) {
            texts.push(RenderCommand::DrawText {
                position: rect.center(),
                text: text.into(),
                color: ThemeToken::TextPrimary,
                font_size: labels.font_size,
                align: TextAlign::Center,
            });
        }
    }
    commands.append(&mut texts);

    commands.push(RenderCommand::EndGroup);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{ForestBuilder, JmcLine, parse_jmc};

    const EXAMPLE: &str = "oracle.db.Connect\t1,000\n   oracle.db.Connect.open\t400\n   oracle.db.Connect.close\t600\n";

    fn forest(input: &str) -> CallForest {
        parse_jmc(input.as_bytes(), "test").expect("parse")
    }

    fn rect_named(forest: &CallForest, layout: &FlameLayout, signature: &str) -> Rect {
        layout
            .rects
            .iter()
            .find(|r| forest.node(r.node).is_some_and(|n| n.signature == signature))
            .map(|r| r.rect)
            .expect("rect for signature")
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn example_scenario_geometry() {
        let f = forest(EXAMPLE);
        let vp = Viewport::new(1000.0, 200.0);
        let layout = layout_flame(&f, &vp, Orientation::BottomUp).expect("layout");

        assert!(close(layout.x_scale, 1.0));
        assert!(close(layout.y_scale, 100.0));

        let root = rect_named(&f, &layout, "oracle.db.Connect");
        assert_eq!(root, Rect::new(0.0, 100.0, 1000.0, 100.0));

        // Input order is open, close, but layout is lexical: close sorts first.
        let close_rect = rect_named(&f, &layout, "oracle.db.Connect.close");
        let open_rect = rect_named(&f, &layout, "oracle.db.Connect.open");
        assert_eq!(close_rect, Rect::new(0.0, 0.0, 600.0, 100.0));
        assert_eq!(open_rect, Rect::new(600.0, 0.0, 400.0, 100.0));
    }

    #[test]
    fn top_down_places_roots_at_top() {
        let f = forest(EXAMPLE);
        let layout =
            layout_flame(&f, &Viewport::new(1000.0, 200.0), Orientation::TopDown).expect("layout");
        assert!(close(rect_named(&f, &layout, "oracle.db.Connect").y, 0.0));
        assert!(close(rect_named(&f, &layout, "oracle.db.Connect.open").y, 100.0));
    }

    #[test]
    fn roots_fill_the_width() {
        let f = forest("b\t3\na\t7\n   x\t2\nc\t1\n");
        let vp = Viewport::new(777.0, 90.0);
        let layout = layout_flame(&f, &vp, Orientation::BottomUp).expect("layout");
        let roots: Vec<_> = layout.rects.iter().filter(|r| r.depth == 0).collect();
        let width: f64 = roots.iter().map(|r| r.rect.w).sum();
        assert!(close(width, 777.0));
        assert!(close(layout.x_scale * f.total_samples() as f64, 777.0));
        // Sorted a, b, c left to right.
        assert!(close(rect_named(&f, &layout, "a").x, 0.0));
        assert!(close(rect_named(&f, &layout, "b").x, 7.0 * layout.x_scale));
        assert!(close(rect_named(&f, &layout, "c").right(), 777.0));
    }

    #[test]
    fn children_stay_inside_parent() {
        let f = forest("r\t100\n   z\t30\n      z1\t10\n      z2\t15\n   a\t50\n   m\t5\n");
        let layout =
            layout_flame(&f, &Viewport::new(640.0, 480.0), Orientation::BottomUp).expect("layout");
        for placed in &layout.rects {
            let children = f.tree().children(placed.node);
            let mut width = 0.0;
            for &child in children {
                let r = layout.rect_of(child).expect("child rect");
                assert!(r.x >= placed.rect.x - 1e-9);
                assert!(r.right() <= placed.rect.right() + 1e-9);
                assert!(close(r.y, placed.rect.y - layout.y_scale));
                width += r.w;
            }
            assert!(width <= placed.rect.w + 1e-9);
        }
    }

    #[test]
    fn equal_signatures_keep_report_order() {
        let f = forest("dup\t1\ndup\t2\n");
        let layout =
            layout_flame(&f, &Viewport::new(30.0, 10.0), Orientation::BottomUp).expect("layout");
        let widths: Vec<_> = layout.rects.iter().map(|r| r.rect.w).collect();
        assert_eq!(widths, vec![10.0, 20.0]);
    }

    #[test]
    fn rejects_empty_forest() {
        let f = forest("idle\t0\n");
        assert_eq!(
            layout_flame(&f, &Viewport::new(100.0, 100.0), Orientation::BottomUp).map(|l| l.x_scale),
            Err(LayoutError::EmptyForest {
                name: "test".to_string()
            })
        );
    }

    #[test]
    fn rejects_degenerate_viewport() {
        let f = forest(EXAMPLE);
        assert!(matches!(
            layout_flame(&f, &Viewport::new(0.0, 100.0), Orientation::BottomUp),
            Err(LayoutError::InvalidViewport { .. })
        ));
        assert!(matches!(
            layout_flame(&f, &Viewport::new(100.0, f64::NAN), Orientation::BottomUp),
            Err(LayoutError::InvalidViewport { .. })
        ));
    }

    #[test]
    fn lays_out_very_deep_chains() {
        const DEPTH: usize = 200_000;
        let mut builder = ForestBuilder::new("deep");
        for depth in 0..DEPTH {
            let line = JmcLine {
                depth,
                signature: "java.lang.Thread.recurse()",
                samples: 10,
            };
            builder.push(&line, depth + 1).expect("push");
        }
        let f = builder.finish();
        assert_eq!(f.depth(), DEPTH);

        let vp = Viewport::new(100.0, DEPTH as f64);
        let layout = layout_flame(&f, &vp, Orientation::TopDown).expect("layout");
        assert_eq!(layout.rects.len(), DEPTH);
        // Pre-order along a chain means row i holds the node at depth i.
        for (i, placed) in layout.rects.iter().enumerate().step_by(20_000) {
            assert_eq!(placed.depth, i);
            assert!(close(placed.rect.y, i as f64));
            assert!(close(placed.rect.w, 100.0));
        }
    }

    #[test]
    fn rects_are_in_sorted_pre_order() {
        let f = forest("b\t4\n   z\t1\n   y\t2\na\t6\n   x\t3\n");
        let layout =
            layout_flame(&f, &Viewport::new(10.0, 2.0), Orientation::BottomUp).expect("layout");
        let order: Vec<_> = layout
            .rects
            .iter()
            .filter_map(|r| f.node(r.node).map(|n| n.signature.to_string()))
            .collect();
        assert_eq!(order, ["a", "x", "b", "y", "z"]);
        let z = rect_named(&f, &layout, "z");
        assert!(close(z.x, 8.0));
        assert!(close(z.w, 1.0));
    }

    #[test]
    fn hit_test_finds_deepest_row_under_pointer() {
        let f = forest(EXAMPLE);
        let layout =
            layout_flame(&f, &Viewport::new(1000.0, 200.0), Orientation::BottomUp).expect("layout");
        let hit = layout
            .hit_test(Point::new(700.0, 50.0))
            .and_then(|id| f.node(id));
        assert_eq!(hit.map(|n| n.signature.as_str()), Some("oracle.db.Connect.open"));
        assert!(layout.hit_test(Point::new(1200.0, 50.0)).is_none());
    }

    #[test]
    fn renders_rects_before_labels() {
        let f = forest(EXAMPLE);
        let layout =
            layout_flame(&f, &Viewport::new(1000.0, 200.0), Orientation::BottomUp).expect("layout");
        let cmds = render_flame(&f, &layout, &ColorRules::default(), &LabelPolicy::default());

        assert!(matches!(cmds.first(), Some(RenderCommand::BeginGroup { .. })));
        assert!(matches!(cmds.last(), Some(RenderCommand::EndGroup)));
        let first_text = cmds
            .iter()
            .position(|c| matches!(c, RenderCommand::DrawText { .. }))
            .expect("labels");
        let last_rect = cmds
            .iter()
            .rposition(|c| matches!(c, RenderCommand::DrawRect { .. }))
            .expect("rects");
        assert!(last_rect < first_text);

        let fills: Vec<_> = cmds
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawRect { fill, .. } => Some(*fill),
                _ => None,
            })
            .collect();
        assert_eq!(fills.len(), 3);
        assert!(fills.iter().all(|&c| c == ColorRules::default().color_for("oracle")));
    }
}
