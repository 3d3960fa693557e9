use std::fmt;

use jmc_flame_protocol::{RenderCommand, SharedStr, ViewEvent, Viewport};

use crate::colors::ColorRules;
use crate::model::{CallForest, NodeId};
use crate::views::flame::{FlameLayout, LayoutError, Orientation, layout_flame, render_flame};
use crate::views::label::LabelPolicy;

/// What the hover tooltip shows for a node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDetail {
    pub signature: SharedStr,
    pub samples: u64,
    /// Share of the samples of the forest being viewed, `0.0..=100.0`.
    pub percentage: f64,
}

impl fmt::Display for NodeDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:.2}%", self.signature, self.samples, self.percentage)
    }
}

/// What the presentation layer should do in response to a [`ViewEvent`].
#[derive(Debug)]
pub enum ViewAction {
    ShowDetail(NodeDetail),
    HideDetail,
    /// Present a new, independent view zoomed into the activated node.
    OpenView(Box<FlameSession>),
    /// The event referred to a frame this view does not know.
    Ignore,
}

/// One rendering session: a forest laid out into a fixed viewport.
///
/// Sessions never mutate their forest. Zooming creates a new session whose
/// forest shares the same node arena, so any number of views (the original
/// included) stay valid side by side.
#[derive(Debug, Clone)]
pub struct FlameSession {
    forest: CallForest,
    layout: FlameLayout,
}

impl FlameSession {
    pub fn new(
        forest: CallForest,
        viewport: Viewport,
        orientation: Orientation,
    ) -> Result<Self, LayoutError> {
        let layout = layout_flame(&forest, &viewport, orientation)?;
        Ok(Self { forest, layout })
    }

    pub fn forest(&self) -> &CallForest {
        &self.forest
    }

    pub fn layout(&self) -> &FlameLayout {
        &self.layout
    }

    pub fn title(&self) -> &str {
        self.forest.name()
    }

    /// Render commands for this view.
    pub fn render(&self, colors: &ColorRules, labels: &LabelPolicy) -> Vec<RenderCommand> {
        render_flame(&self.forest, &self.layout, colors, labels)
    }

    /// Tooltip data for `node`, relative to this view's total samples.
    pub fn detail(&self, node: NodeId) -> Option<NodeDetail> {
        if !self.forest.contains(node) {
            return None;
        }
        let n = self.forest.node(node)?;
        let total = self.forest.total_samples();
        let percentage = if total == 0 {
            0.0
        } else {
            100.0 * n.samples as f64 / total as f64
        };
        Some(NodeDetail {
            signature: n.signature.clone(),
            samples: n.samples,
            percentage,
        })
    }

    /// A new session rooted at `node`, with the same viewport and orientation.
    ///
    /// Returns `Ok(None)` if `node` is not part of this view.
    pub fn zoom_into(&self, node: NodeId) -> Result<Option<Self>, LayoutError> {
        if !self.forest.contains(node) {
            return Ok(None);
        }
        let Some(forest) = self.forest.zoom(node) else {
            return Ok(None);
        };
        tracing::debug!(from = self.title(), to = forest.name(), "zooming in");
        Self::new(forest, self.layout.viewport, self.layout.orientation).map(Some)
    }

    /// Dispatch a renderer event.
    pub fn handle_event(&self, event: ViewEvent) -> Result<ViewAction, LayoutError> {
        let action = match event {
            ViewEvent::Leave => ViewAction::HideDetail,
            ViewEvent::Enter(frame_id) => NodeId::from_frame_id(frame_id)
                .and_then(|id| self.detail(id))
                .map_or(ViewAction::Ignore, ViewAction::ShowDetail),
            ViewEvent::Activate(frame_id) => match NodeId::from_frame_id(frame_id) {
                Some(id) => self
                    .zoom_into(id)?
                    .map_or(ViewAction::Ignore, |s| ViewAction::OpenView(Box::new(s))),
                None => ViewAction::Ignore,
            },
        };
        Ok(action)
    }
}
