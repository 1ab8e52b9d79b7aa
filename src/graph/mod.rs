//! Commit graph engine: lane assignment, incremental relayout, and
//! windowed materialization of drawables.

mod layout;
mod occupancy;
mod viewport;

use tracing::warn;

use crate::config::GraphConfig;
use crate::protocol::{
    CollaboratorRequest, CommitDescriptor, ContextAction, LabelAssignment,
};
use crate::scene::{
    CHIP_LOCAL, CHIP_OTHER, CHIP_REMOTE, CHIP_TAG, Color, Drawable, MonospaceMetrics, Rect,
    Surface, TextMetrics,
};

use layout::LayoutState;
pub use occupancy::OccupancyTable;
use viewport::Viewport;

/// What a ref label points at, which decides the chip color and whether a
/// double-click can check it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Local,
    Remote,
    Tag,
    Other,
}

impl LabelKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "local" => LabelKind::Local,
            "remote" => LabelKind::Remote,
            "tag" => LabelKind::Tag,
            _ => LabelKind::Other,
        }
    }

    pub fn chip_color(&self) -> Color {
        match self {
            LabelKind::Local => CHIP_LOCAL,
            LabelKind::Remote => CHIP_REMOTE,
            LabelKind::Tag => CHIP_TAG,
            LabelKind::Other => CHIP_OTHER,
        }
    }
}

/// A ref badge attached to a row. `x` and `width` are content-space pixels
/// assigned during label placement.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelChip {
    pub shorthand: String,
    pub full_name: String,
    pub kind: LabelKind,
    pub x: f32,
    pub width: f32,
}

/// Grid geometry of one piece of an edge. Pixel coordinates are derived from
/// the lane numbers and the index of the row the segment is bucketed on, so
/// rows can move vertically without touching their segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentShape {
    /// Straight piece spanning this row and the row above in one lane
    Vertical { lane: usize },
    /// Final hop bending from the child's lane into the parent's lane
    Curve { child_lane: usize, parent_lane: usize },
}

/// One row-sized piece of a parent/child edge, stored on the row it passes
/// through so the window walk picks it up without scanning the whole edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSegment {
    pub parent_sha: String,
    pub child_sha: String,
    pub shape: SegmentShape,
    pub color: Color,
}

/// Materialized drawables for one visible row, grouped by paint pass.
#[derive(Debug, Clone)]
pub struct RowDrawables {
    pub edges: Vec<Drawable>,
    pub node: Drawable,
    pub labels: Vec<Drawable>,
    pub hit_region: Drawable,
}

impl RowDrawables {
    pub fn translate_y(&mut self, dy: f32) {
        for edge in &mut self.edges {
            edge.translate_y(dy);
        }
        self.node.translate_y(dy);
        for label in &mut self.labels {
            label.translate_y(dy);
        }
        self.hit_region.translate_y(dy);
    }

    pub fn hit_rect(&self) -> Option<Rect> {
        match self.hit_region.shape {
            crate::scene::Shape::RoundedRect { rect, .. } => Some(rect),
            _ => None,
        }
    }
}

/// One commit in the laid-out graph.
#[derive(Debug, Clone)]
pub struct Row {
    pub sha: String,
    pub summary: String,
    pub parent_shas: Vec<String>,
    pub child_shas: Vec<String>,
    pub lane: usize,
    pub row_index: usize,
    pub edges: Vec<EdgeSegment>,
    pub chips: Vec<LabelChip>,
    /// Left edge of the summary text, to the right of any chips
    pub summary_x: f32,
    /// Right edge of the row's content, where the hit region ends
    pub right_edge: f32,
    /// Present only while the row is inside the visible window
    pub drawables: Option<RowDrawables>,
}

/// Entry offered by [`GraphEngine::context_menu_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextMenuItem {
    pub label: &'static str,
    pub action: ContextAction,
}

/// Context menu for one commit row.
#[derive(Debug, Clone)]
pub struct ContextMenu {
    pub sha: String,
    pub items: Vec<ContextMenuItem>,
}

/// The commit graph view: owns the laid-out rows, the visible window, and the
/// selection, and turns pointer input into collaborator requests.
///
/// None of the public operations return errors. Inconsistent batches (unknown
/// shas, duplicates) are logged and skipped so one bad message cannot take the
/// graph down.
pub struct GraphEngine {
    config: GraphConfig,
    metrics: Box<dyn TextMetrics>,
    layout: LayoutState,
    viewport: Viewport,
}

impl GraphEngine {
    pub fn new(config: GraphConfig) -> Self {
        Self::with_metrics(config, Box::new(MonospaceMetrics))
    }

    pub fn with_metrics(config: GraphConfig, metrics: Box<dyn TextMetrics>) -> Self {
        Self {
            config,
            metrics,
            layout: LayoutState::new(),
            viewport: Viewport::new(),
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn rows(&self) -> &[Row] {
        self.layout.rows()
    }

    pub fn row_of(&self, sha: &str) -> Option<&Row> {
        self.layout.row_of(sha)
    }

    /// Inclusive materialized window, `None` while the graph is empty
    pub fn window(&self) -> Option<(usize, usize)> {
        self.viewport.window()
    }

    pub fn scroll_offset(&self) -> f32 {
        self.viewport.scroll_offset()
    }

    pub fn selected_sha(&self) -> Option<&str> {
        self.viewport.selected()
    }

    pub fn hovered_sha(&self) -> Option<&str> {
        self.viewport.hovered()
    }

    /// Total pixel extent of the laid-out graph, for the host's scrollbar
    pub fn content_size(&self) -> (f32, f32) {
        let height = if self.layout.rows().is_empty() {
            0.0
        } else {
            self.config.y_offset + self.layout.rows().len() as f32 * self.config.row_spacing
        };
        (self.layout.content_width(), height)
    }

    /// Replace the whole graph from a full batch.
    pub fn layout_full(&mut self, commits: &[CommitDescriptor], labels: &[LabelAssignment]) {
        self.layout
            .layout_full(&self.config, self.metrics.as_ref(), commits, labels);
        self.viewport.prune(&self.layout);
        self.viewport.refresh(&mut self.layout, &self.config);
    }

    /// Prepend newly arrived commits without relaying out the survivors.
    pub fn layout_incremental_add(&mut self, commits: &[CommitDescriptor]) {
        self.layout
            .incremental_add(&self.config, self.metrics.as_ref(), commits);
        self.viewport.refresh(&mut self.layout, &self.config);
    }

    /// Drop amended-away commits, splicing their neighbors together.
    pub fn layout_incremental_remove(&mut self, shas: &[String]) {
        self.layout
            .incremental_remove(&self.config, self.metrics.as_ref(), shas);
        self.viewport.prune(&self.layout);
        self.viewport.refresh(&mut self.layout, &self.config);
    }

    /// Replace every ref label in one pass.
    pub fn set_labels(&mut self, labels: &[LabelAssignment]) {
        self.layout
            .set_labels(&self.config, self.metrics.as_ref(), labels);
        self.viewport.refresh(&mut self.layout, &self.config);
    }

    pub fn resize(&mut self, visible_height: f32) {
        self.viewport.set_visible_height(visible_height);
        self.viewport.refresh(&mut self.layout, &self.config);
    }

    /// Recompute the visible window from the current scroll offset and
    /// materialize exactly the rows inside it.
    pub fn set_visible_window(&mut self) {
        self.viewport.refresh(&mut self.layout, &self.config);
    }

    /// Scroll by `delta` pixels, walking the window edges row by row.
    pub fn on_scroll(&mut self, delta: f32) {
        self.viewport.scroll(&mut self.layout, &self.config, delta);
    }

    /// Center the given commit in the viewport. Returns false for unknown shas.
    pub fn scroll_to_commit(&mut self, sha: &str) -> bool {
        let Some(index) = self.layout.index_of(sha) else {
            warn!("Cannot scroll to unknown commit {sha}");
            return false;
        };
        self.viewport
            .scroll_to_row(&mut self.layout, &self.config, index);
        true
    }

    /// Paint the current window onto a surface: edges, then nodes, then
    /// labels, then hit regions.
    pub fn render(&self, surface: &mut dyn Surface) {
        self.viewport.render(&self.layout, surface);
    }

    /// Single click in viewport coordinates. Selects the row under the
    /// pointer and asks the collaborator for its details, or clears the
    /// selection on empty space.
    pub fn on_primary_click(&mut self, x: f32, y: f32) -> Option<CollaboratorRequest> {
        self.viewport
            .primary_click(&mut self.layout, &self.config, x, y)
    }

    /// Double click in viewport coordinates. On a local or remote branch chip
    /// this checks the branch out; anywhere else on a row it checks out the
    /// commit detached.
    pub fn on_double_click(&mut self, x: f32, y: f32) -> Option<CollaboratorRequest> {
        self.viewport
            .double_click(&mut self.layout, &self.config, x, y)
    }

    /// Pointer motion in viewport coordinates. Returns true when the hovered
    /// row changed and a repaint is worth it.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.viewport
            .pointer_move(&mut self.layout, &self.config, x, y)
    }

    /// Context menu for the row under the pointer, if any.
    pub fn context_menu_at(&self, x: f32, y: f32) -> Option<ContextMenu> {
        let index = self.viewport.row_at_point(&self.layout, &self.config, x, y)?;
        let sha = self.layout.rows()[index].sha.clone();
        let items = ContextAction::ALL
            .iter()
            .map(|&action| ContextMenuItem {
                label: action.label(),
                action,
            })
            .collect();
        Some(ContextMenu { sha, items })
    }

    /// Turn a picked context menu entry into a collaborator request.
    pub fn dispatch_context_action(
        &self,
        sha: &str,
        action: ContextAction,
    ) -> Option<CollaboratorRequest> {
        if self.layout.index_of(sha).is_none() {
            warn!("Context action {action:?} on unknown commit {sha}");
            return None;
        }
        Some(action.request(sha))
    }

    /// Move the selection one row down, scrolling it into view.
    pub fn select_next(&mut self) -> Option<CollaboratorRequest> {
        self.viewport.select_step(&mut self.layout, &self.config, 1)
    }

    /// Move the selection one row up, scrolling it into view.
    pub fn select_prev(&mut self) -> Option<CollaboratorRequest> {
        self.viewport.select_step(&mut self.layout, &self.config, -1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_kind_from_wire_name() {
        assert_eq!(LabelKind::from_name("local"), LabelKind::Local);
        assert_eq!(LabelKind::from_name("remote"), LabelKind::Remote);
        assert_eq!(LabelKind::from_name("tag"), LabelKind::Tag);
        assert_eq!(LabelKind::from_name("note"), LabelKind::Other);
    }

    #[test]
    fn test_chip_colors_follow_kind() {
        assert_eq!(LabelKind::Local.chip_color(), CHIP_LOCAL);
        assert_eq!(LabelKind::Remote.chip_color(), CHIP_REMOTE);
        assert_eq!(LabelKind::Tag.chip_color(), CHIP_TAG);
        assert_eq!(LabelKind::Other.chip_color(), CHIP_OTHER);
    }
}
