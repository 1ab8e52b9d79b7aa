use crate::config::GraphConfig;
use crate::protocol::CollaboratorRequest;
use crate::scene::{
    Drawable, HIT_REGION_ACTIVE_COLOR, HIT_REGION_COLOR, Rect, Shape, Stroke, Surface, TEXT_COLOR,
    lane_color,
};

use super::layout::LayoutState;
use super::{LabelKind, Row, RowDrawables, SegmentShape};

/// The visible slice of the graph. Owns the scroll offset, the inclusive
/// materialized window, and the pointer state; rows outside the window have
/// no drawables at all.
pub(crate) struct Viewport {
    scroll_offset: f32,
    visible_height: f32,
    window: Option<(usize, usize)>,
    selected: Option<String>,
    hovered: Option<String>,
}

impl Viewport {
    pub(crate) fn new() -> Self {
        Self {
            scroll_offset: 0.0,
            visible_height: 0.0,
            window: None,
            selected: None,
            hovered: None,
        }
    }

    pub(crate) fn window(&self) -> Option<(usize, usize)> {
        self.window
    }

    pub(crate) fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub(crate) fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub(crate) fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub(crate) fn set_visible_height(&mut self, height: f32) {
        self.visible_height = height;
    }

    /// Forget pointer state that refers to rows that no longer exist.
    pub(crate) fn prune(&mut self, layout: &LayoutState) {
        if let Some(sha) = &self.selected {
            if layout.index_of(sha).is_none() {
                self.selected = None;
            }
        }
        if let Some(sha) = &self.hovered {
            if layout.index_of(sha).is_none() {
                self.hovered = None;
            }
        }
    }

    /// Recompute the window from scratch and make drawable presence match it
    /// exactly. Used after structural changes, where a full pass over the
    /// rows is already on the table.
    pub(crate) fn refresh(&mut self, layout: &mut LayoutState, cfg: &GraphConfig) {
        self.clamp_scroll(layout, cfg);
        let Some((top, bottom)) = self.target_window(layout, cfg) else {
            self.window = None;
            return;
        };
        let count = layout.rows().len();
        for i in 0..count {
            if i >= top && i <= bottom {
                self.materialize_at(layout, cfg, i);
            } else {
                layout.rows_mut()[i].drawables = None;
            }
        }
        self.window = Some((top, bottom));
    }

    /// Scroll by `delta` pixels. The window edges walk one row at a time, so
    /// the cost tracks how far the view moved rather than how many rows the
    /// graph has.
    pub(crate) fn scroll(&mut self, layout: &mut LayoutState, cfg: &GraphConfig, delta: f32) {
        let max = self.max_scroll(layout, cfg);
        self.scroll_offset = (self.scroll_offset + delta).clamp(0.0, max);
        let Some((target_top, target_bottom)) = self.target_window(layout, cfg) else {
            self.window = None;
            return;
        };
        let Some((mut top, mut bottom)) = self.window else {
            self.refresh(layout, cfg);
            return;
        };
        if target_top > bottom || target_bottom < top {
            // the viewport jumped past the old window entirely
            for i in top..=bottom {
                layout.rows_mut()[i].drawables = None;
            }
            for i in target_top..=target_bottom {
                self.materialize_at(layout, cfg, i);
            }
        } else {
            while top < target_top {
                layout.rows_mut()[top].drawables = None;
                top += 1;
            }
            while top > target_top {
                top -= 1;
                self.materialize_at(layout, cfg, top);
            }
            while bottom < target_bottom {
                bottom += 1;
                self.materialize_at(layout, cfg, bottom);
            }
            while bottom > target_bottom {
                layout.rows_mut()[bottom].drawables = None;
                bottom -= 1;
            }
        }
        self.window = Some((target_top, target_bottom));
    }

    pub(crate) fn scroll_to_row(&mut self, layout: &mut LayoutState, cfg: &GraphConfig, index: usize) {
        let target = cfg.row_y(index) - self.visible_height / 2.0;
        let delta = target - self.scroll_offset;
        self.scroll(layout, cfg, delta);
    }

    /// Paint the window: every edge first, then nodes, then labels, then the
    /// hit regions on top.
    pub(crate) fn render(&self, layout: &LayoutState, surface: &mut dyn Surface) {
        surface.clear();
        let Some((top, bottom)) = self.window else {
            return;
        };
        let rows = layout.rows();
        for row in &rows[top..=bottom] {
            if let Some(drawables) = &row.drawables {
                for edge in &drawables.edges {
                    surface.draw(edge);
                }
            }
        }
        for row in &rows[top..=bottom] {
            if let Some(drawables) = &row.drawables {
                surface.draw(&drawables.node);
            }
        }
        for row in &rows[top..=bottom] {
            if let Some(drawables) = &row.drawables {
                for label in &drawables.labels {
                    surface.draw(label);
                }
            }
        }
        for row in &rows[top..=bottom] {
            if let Some(drawables) = &row.drawables {
                surface.draw(&drawables.hit_region);
            }
        }
    }

    /// The materialized row under a viewport-space point, if the point falls
    /// inside its hit region.
    pub(crate) fn row_at_point(
        &self,
        layout: &LayoutState,
        cfg: &GraphConfig,
        x: f32,
        y: f32,
    ) -> Option<usize> {
        let (top, bottom) = self.window?;
        let content_y = y + self.scroll_offset;
        let index = cfg.row_at_y(content_y, layout.rows().len())?;
        if index < top || index > bottom {
            return None;
        }
        let rect = layout.rows()[index].drawables.as_ref()?.hit_rect()?;
        rect.contains(x, content_y).then_some(index)
    }

    pub(crate) fn primary_click(
        &mut self,
        layout: &mut LayoutState,
        cfg: &GraphConfig,
        x: f32,
        y: f32,
    ) -> Option<CollaboratorRequest> {
        match self.row_at_point(layout, cfg, x, y) {
            Some(index) => {
                let sha = layout.rows()[index].sha.clone();
                self.set_selected(layout, Some(sha.clone()));
                Some(CollaboratorRequest::RequestCommitDetail { sha })
            }
            None => {
                self.set_selected(layout, None);
                None
            }
        }
    }

    pub(crate) fn double_click(
        &mut self,
        layout: &mut LayoutState,
        cfg: &GraphConfig,
        x: f32,
        y: f32,
    ) -> Option<CollaboratorRequest> {
        let index = self.row_at_point(layout, cfg, x, y)?;
        let content_y = y + self.scroll_offset;
        let row = &layout.rows()[index];
        let row_py = cfg.row_y(index);
        for chip in &row.chips {
            let rect = Rect::new(
                chip.x,
                row_py - cfg.chip_height / 2.0,
                chip.width,
                cfg.chip_height,
            );
            if !rect.contains(x, content_y) {
                continue;
            }
            match chip.kind {
                LabelKind::Local | LabelKind::Remote => {
                    let reference = if chip.full_name.is_empty() {
                        chip.shorthand.clone()
                    } else {
                        chip.full_name.clone()
                    };
                    return Some(CollaboratorRequest::CheckoutBranch {
                        reference,
                        is_remote: chip.kind == LabelKind::Remote,
                    });
                }
                // tags and plain refs have no branch to check out
                LabelKind::Tag | LabelKind::Other => break,
            }
        }
        Some(CollaboratorRequest::CheckoutDetached {
            sha: row.sha.clone(),
        })
    }

    /// Returns true when the hovered row changed.
    pub(crate) fn pointer_move(
        &mut self,
        layout: &mut LayoutState,
        cfg: &GraphConfig,
        x: f32,
        y: f32,
    ) -> bool {
        let next = self
            .row_at_point(layout, cfg, x, y)
            .map(|i| layout.rows()[i].sha.clone());
        if next == self.hovered {
            return false;
        }
        let prev = std::mem::replace(&mut self.hovered, next);
        if let Some(sha) = prev {
            self.retint(layout, &sha);
        }
        if let Some(sha) = self.hovered.clone() {
            self.retint(layout, &sha);
        }
        true
    }

    /// Move the selection by `step` rows, pulling it into view first so the
    /// highlighted row is always materialized.
    pub(crate) fn select_step(
        &mut self,
        layout: &mut LayoutState,
        cfg: &GraphConfig,
        step: i64,
    ) -> Option<CollaboratorRequest> {
        let count = layout.rows().len();
        if count == 0 {
            return None;
        }
        let index = match self.selected.as_deref().and_then(|s| layout.index_of(s)) {
            Some(current) => (current as i64 + step).clamp(0, count as i64 - 1) as usize,
            None => 0,
        };
        let row_py = cfg.row_y(index);
        if row_py - cfg.row_spacing < self.scroll_offset
            || row_py + cfg.row_spacing > self.scroll_offset + self.visible_height
        {
            self.scroll_to_row(layout, cfg, index);
        }
        let sha = layout.rows()[index].sha.clone();
        self.set_selected(layout, Some(sha.clone()));
        Some(CollaboratorRequest::RequestCommitDetail { sha })
    }

    fn set_selected(&mut self, layout: &mut LayoutState, next: Option<String>) {
        if next == self.selected {
            return;
        }
        let prev = std::mem::replace(&mut self.selected, next);
        if let Some(sha) = prev {
            self.retint(layout, &sha);
        }
        if let Some(sha) = self.selected.clone() {
            self.retint(layout, &sha);
        }
    }

    /// Repaint one row's hit region to match its selection/hover state.
    fn retint(&self, layout: &mut LayoutState, sha: &str) {
        let Some(index) = layout.index_of(sha) else {
            return;
        };
        let active = self.is_active(sha);
        if let Some(drawables) = &mut layout.rows_mut()[index].drawables {
            drawables.hit_region.fill = Some(if active {
                HIT_REGION_ACTIVE_COLOR
            } else {
                HIT_REGION_COLOR
            });
            drawables.hit_region.dirty = true;
        }
    }

    fn is_active(&self, sha: &str) -> bool {
        self.selected.as_deref() == Some(sha) || self.hovered.as_deref() == Some(sha)
    }

    fn materialize_at(&self, layout: &mut LayoutState, cfg: &GraphConfig, index: usize) {
        let row = &mut layout.rows_mut()[index];
        if row.drawables.is_some() {
            return;
        }
        let active = self.is_active(&row.sha);
        materialize_row(row, cfg, active);
    }

    fn clamp_scroll(&mut self, layout: &LayoutState, cfg: &GraphConfig) {
        let max = self.max_scroll(layout, cfg);
        self.scroll_offset = self.scroll_offset.clamp(0.0, max);
    }

    fn max_scroll(&self, layout: &LayoutState, cfg: &GraphConfig) -> f32 {
        let count = layout.rows().len();
        if count == 0 {
            return 0.0;
        }
        let content_height = cfg.y_offset + count as f32 * cfg.row_spacing;
        (content_height - self.visible_height).max(0.0)
    }

    /// Rows the window should cover for the current scroll offset: the
    /// visible span padded by the render margin, rounded to the nearest row
    /// and clamped to the graph.
    fn target_window(&self, layout: &LayoutState, cfg: &GraphConfig) -> Option<(usize, usize)> {
        let count = layout.rows().len();
        let top = cfg.row_at_y(self.scroll_offset - cfg.render_margin, count)?;
        let bottom = cfg.row_at_y(
            self.scroll_offset + self.visible_height + cfg.render_margin,
            count,
        )?;
        Some((top, bottom))
    }
}

/// Build the drawables for one row from its grid data. Pixel positions come
/// from the row index and lane numbers alone, so a row materialized after a
/// shift lands exactly where a translated one would.
fn materialize_row(row: &mut Row, cfg: &GraphConfig, active: bool) {
    let py = cfg.row_y(row.row_index);
    let y_top = py - cfg.row_spacing;

    let edges = row
        .edges
        .iter()
        .map(|segment| {
            let shape = match segment.shape {
                SegmentShape::Vertical { lane } => {
                    let x = cfg.lane_x(lane);
                    Shape::Line {
                        x1: x,
                        y1: y_top,
                        x2: x,
                        y2: py,
                    }
                }
                SegmentShape::Curve {
                    child_lane,
                    parent_lane,
                } => {
                    let x1 = cfg.lane_x(child_lane);
                    let x2 = cfg.lane_x(parent_lane);
                    let (c1x, c1y, c2x, c2y) = if child_lane < parent_lane {
                        (x1 + cfg.lane_spacing * 0.75, y_top, x2, py - cfg.row_spacing * 0.75)
                    } else {
                        (x1, y_top + cfg.row_spacing * 0.75, x2 + cfg.lane_spacing * 0.75, py)
                    };
                    Shape::Curve {
                        x1,
                        y1: y_top,
                        c1x,
                        c1y,
                        c2x,
                        c2y,
                        x2,
                        y2: py,
                    }
                }
            };
            Drawable::stroked(shape, segment.color, cfg.edge_width)
        })
        .collect();

    let node_color = lane_color(row.lane);
    let node = Drawable {
        shape: Shape::Circle {
            cx: cfg.lane_x(row.lane),
            cy: py,
            radius: cfg.node_radius,
        },
        fill: Some(node_color),
        stroke: Some(Stroke {
            color: node_color,
            width: 1.0,
        }),
        dirty: true,
    };

    let mut labels = Vec::with_capacity(row.chips.len() * 2 + 1);
    for chip in &row.chips {
        labels.push(Drawable::filled(
            Shape::RoundedRect {
                rect: Rect::new(
                    chip.x,
                    py - cfg.chip_height / 2.0,
                    chip.width,
                    cfg.chip_height,
                ),
                corner_radius: cfg.chip_corner_radius,
            },
            chip.kind.chip_color(),
        ));
        labels.push(Drawable::filled(
            Shape::Text {
                x: chip.x + cfg.chip_text_pad,
                y: py + cfg.text_y_offset,
                content: chip.shorthand.clone(),
                size: cfg.text_size,
            },
            TEXT_COLOR,
        ));
    }
    if !row.summary.is_empty() {
        labels.push(Drawable::filled(
            Shape::Text {
                x: row.summary_x,
                y: py + cfg.text_y_offset,
                content: row.summary.clone(),
                size: cfg.text_size,
            },
            TEXT_COLOR,
        ));
    }

    let hit_x = cfg.lane_x(row.lane);
    let hit_region = Drawable::filled(
        Shape::RoundedRect {
            rect: Rect::new(
                hit_x,
                py - cfg.chip_height / 2.0,
                (row.right_edge - hit_x).max(cfg.lane_spacing),
                cfg.chip_height,
            ),
            corner_radius: 0.0,
        },
        if active {
            HIT_REGION_ACTIVE_COLOR
        } else {
            HIT_REGION_COLOR
        },
    );

    row.drawables = Some(RowDrawables {
        edges,
        node,
        labels,
        hit_region,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{CommitDescriptor, LabelAssignment};
    use crate::scene::MonospaceMetrics;

    fn chain(count: usize) -> Vec<CommitDescriptor> {
        (0..count)
            .map(|i| CommitDescriptor {
                sha: format!("c{i}"),
                parent_shas: if i + 1 < count {
                    vec![format!("c{}", i + 1)]
                } else {
                    Vec::new()
                },
                child_shas: if i > 0 {
                    vec![format!("c{}", i - 1)]
                } else {
                    Vec::new()
                },
                summary: format!("commit {i}"),
                row_pixel_y: None,
            })
            .collect()
    }

    fn setup(count: usize, height: f32) -> (Viewport, LayoutState, GraphConfig) {
        let cfg = GraphConfig::default();
        let mut layout = LayoutState::new();
        layout.layout_full(&cfg, &MonospaceMetrics, &chain(count), &[]);
        let mut viewport = Viewport::new();
        viewport.set_visible_height(height);
        viewport.refresh(&mut layout, &cfg);
        (viewport, layout, cfg)
    }

    fn materialized(layout: &LayoutState) -> Vec<usize> {
        layout
            .rows()
            .iter()
            .filter(|r| r.drawables.is_some())
            .map(|r| r.row_index)
            .collect()
    }

    struct RecordingSurface {
        kinds: Vec<&'static str>,
        clears: usize,
    }

    impl RecordingSurface {
        fn new() -> Self {
            Self {
                kinds: Vec::new(),
                clears: 0,
            }
        }
    }

    impl Surface for RecordingSurface {
        fn draw(&mut self, drawable: &Drawable) {
            self.kinds.push(match drawable.shape {
                Shape::Circle { .. } => "circle",
                Shape::Line { .. } => "line",
                Shape::Curve { .. } => "curve",
                Shape::RoundedRect { .. } => "rect",
                Shape::Text { .. } => "text",
            });
        }

        fn clear(&mut self) {
            self.kinds.clear();
            self.clears += 1;
        }
    }

    #[test]
    fn test_window_covers_viewport_plus_margin() {
        let (viewport, layout, _cfg) = setup(100, 240.0);
        assert_eq!(viewport.window(), Some((0, 18)));
        assert_eq!(materialized(&layout), (0..=18).collect::<Vec<_>>());
    }

    #[test]
    fn test_scroll_walks_one_row_per_step() {
        let (mut viewport, mut layout, cfg) = setup(100, 240.0);
        viewport.scroll(&mut layout, &cfg, cfg.row_spacing);
        assert_eq!(viewport.window(), Some((0, 19)));
        assert!(layout.rows()[19].drawables.is_some());

        viewport.scroll(&mut layout, &cfg, cfg.row_spacing);
        assert_eq!(viewport.window(), Some((0, 20)));

        viewport.scroll(&mut layout, &cfg, -cfg.row_spacing);
        assert_eq!(viewport.window(), Some((0, 19)));
        assert!(layout.rows()[20].drawables.is_none());
    }

    #[test]
    fn test_scroll_clamps_to_content() {
        let (mut viewport, mut layout, cfg) = setup(100, 240.0);
        viewport.scroll(&mut layout, &cfg, 1.0e9);
        // content height is 20 + 100 * 24 = 2420
        assert!((viewport.scroll_offset() - 2180.0).abs() < 1e-3);
        assert_eq!(viewport.window(), Some((82, 99)));
        assert!(layout.rows()[81].drawables.is_none());
        assert!(layout.rows()[99].drawables.is_some());

        viewport.scroll(&mut layout, &cfg, -1.0e9);
        assert_eq!(viewport.scroll_offset(), 0.0);
        assert_eq!(viewport.window(), Some((0, 18)));
    }

    #[test]
    fn test_deep_jump_rebuilds_window() {
        let (mut viewport, mut layout, cfg) = setup(100, 240.0);
        viewport.scroll(&mut layout, &cfg, 1200.0);
        assert_eq!(viewport.window(), Some((41, 68)));
        assert_eq!(materialized(&layout), (41..=68).collect::<Vec<_>>());
    }

    #[test]
    fn test_refresh_after_shrink_drops_out_of_range_rows() {
        let (mut viewport, mut layout, cfg) = setup(100, 240.0);
        viewport.scroll(&mut layout, &cfg, 1.0e9);
        let shas: Vec<String> = (3..100).map(|i| format!("c{i}")).collect();
        layout.incremental_remove(&cfg, &MonospaceMetrics, &shas);
        viewport.refresh(&mut layout, &cfg);
        assert_eq!(viewport.scroll_offset(), 0.0);
        assert_eq!(viewport.window(), Some((0, 2)));
        assert_eq!(materialized(&layout), vec![0, 1, 2]);
    }

    #[test]
    fn test_render_paints_in_z_order() {
        let (viewport, layout, _cfg) = setup(3, 240.0);
        let mut surface = RecordingSurface::new();
        viewport.render(&layout, &mut surface);
        assert_eq!(surface.clears, 1);
        assert_eq!(
            surface.kinds,
            vec![
                "line", "line", // edges of rows 1 and 2
                "circle", "circle", "circle",
                "text", "text", "text",
                "rect", "rect", "rect",
            ]
        );
    }

    #[test]
    fn test_click_selects_and_requests_detail() {
        let (mut viewport, mut layout, cfg) = setup(3, 240.0);
        let request = viewport.primary_click(&mut layout, &cfg, cfg.x_offset, cfg.y_offset);
        assert_eq!(
            request,
            Some(CollaboratorRequest::RequestCommitDetail {
                sha: "c0".to_string()
            })
        );
        assert_eq!(viewport.selected(), Some("c0"));
        let fill = layout.rows()[0]
            .drawables
            .as_ref()
            .and_then(|d| d.hit_region.fill);
        assert_eq!(fill, Some(HIT_REGION_ACTIVE_COLOR));

        // empty space clears the selection without a request
        let request = viewport.primary_click(&mut layout, &cfg, cfg.x_offset, 1000.0);
        assert_eq!(request, None);
        assert_eq!(viewport.selected(), None);
        let fill = layout.rows()[0]
            .drawables
            .as_ref()
            .and_then(|d| d.hit_region.fill);
        assert_eq!(fill, Some(HIT_REGION_COLOR));
    }

    #[test]
    fn test_click_left_of_node_is_ignored() {
        let (mut viewport, mut layout, cfg) = setup(3, 240.0);
        let request = viewport.primary_click(&mut layout, &cfg, 2.0, cfg.y_offset);
        assert_eq!(request, None);
        assert_eq!(viewport.selected(), None);
    }

    #[test]
    fn test_double_click_chip_checks_out_branch() {
        let cfg = GraphConfig::default();
        let mut layout = LayoutState::new();
        let labels = [
            LabelAssignment {
                sha: "c0".to_string(),
                shorthand: "main".to_string(),
                full_name: "refs/heads/main".to_string(),
                kind: "local".to_string(),
            },
            LabelAssignment {
                sha: "c1".to_string(),
                shorthand: "origin/main".to_string(),
                full_name: "refs/remotes/origin/main".to_string(),
                kind: "remote".to_string(),
            },
        ];
        layout.layout_full(&cfg, &MonospaceMetrics, &chain(3), &labels);
        let mut viewport = Viewport::new();
        viewport.set_visible_height(240.0);
        viewport.refresh(&mut layout, &cfg);

        // on the local chip of row 0
        let chip_x = layout.rows()[0].chips[0].x + 2.0;
        let request = viewport.double_click(&mut layout, &cfg, chip_x, cfg.row_y(0));
        assert_eq!(
            request,
            Some(CollaboratorRequest::CheckoutBranch {
                reference: "refs/heads/main".to_string(),
                is_remote: false,
            })
        );

        // on the remote chip of row 1
        let chip_x = layout.rows()[1].chips[0].x + 2.0;
        let request = viewport.double_click(&mut layout, &cfg, chip_x, cfg.row_y(1));
        assert_eq!(
            request,
            Some(CollaboratorRequest::CheckoutBranch {
                reference: "refs/remotes/origin/main".to_string(),
                is_remote: true,
            })
        );

        // past the chips but still on the row
        let text_x = layout.rows()[0].summary_x + 2.0;
        let request = viewport.double_click(&mut layout, &cfg, text_x, cfg.row_y(0));
        assert_eq!(
            request,
            Some(CollaboratorRequest::CheckoutDetached {
                sha: "c0".to_string()
            })
        );
    }

    #[test]
    fn test_pointer_move_tracks_hover() {
        let (mut viewport, mut layout, cfg) = setup(3, 240.0);
        assert!(viewport.pointer_move(&mut layout, &cfg, cfg.x_offset, cfg.row_y(0)));
        assert_eq!(viewport.hovered(), Some("c0"));

        // wiggling inside the same row changes nothing
        assert!(!viewport.pointer_move(&mut layout, &cfg, cfg.x_offset + 3.0, cfg.row_y(0) + 2.0));

        assert!(viewport.pointer_move(&mut layout, &cfg, cfg.x_offset, cfg.row_y(1)));
        assert_eq!(viewport.hovered(), Some("c1"));
        let fill = layout.rows()[0]
            .drawables
            .as_ref()
            .and_then(|d| d.hit_region.fill);
        assert_eq!(fill, Some(HIT_REGION_COLOR));
        let fill = layout.rows()[1]
            .drawables
            .as_ref()
            .and_then(|d| d.hit_region.fill);
        assert_eq!(fill, Some(HIT_REGION_ACTIVE_COLOR));
    }

    #[test]
    fn test_select_step_walks_the_graph() {
        let (mut viewport, mut layout, cfg) = setup(100, 240.0);
        let request = viewport.select_step(&mut layout, &cfg, 1);
        assert_eq!(viewport.selected(), Some("c0"));
        assert!(request.is_some());

        viewport.select_step(&mut layout, &cfg, 1);
        assert_eq!(viewport.selected(), Some("c1"));

        viewport.select_step(&mut layout, &cfg, -1);
        assert_eq!(viewport.selected(), Some("c0"));

        // clamped at the top
        viewport.select_step(&mut layout, &cfg, -1);
        assert_eq!(viewport.selected(), Some("c0"));
    }

    #[test]
    fn test_select_step_scrolls_selection_into_view() {
        let (mut viewport, mut layout, cfg) = setup(100, 240.0);
        for _ in 0..30 {
            viewport.select_step(&mut layout, &cfg, 1);
        }
        assert_eq!(viewport.selected(), Some("c29"));
        let row_py = cfg.row_y(29);
        assert!(row_py >= viewport.scroll_offset());
        assert!(row_py <= viewport.scroll_offset() + 240.0);
        // the selected row is materialized and highlighted
        let index = layout.index_of("c29").unwrap();
        let fill = layout.rows()[index]
            .drawables
            .as_ref()
            .and_then(|d| d.hit_region.fill);
        assert_eq!(fill, Some(HIT_REGION_ACTIVE_COLOR));
    }

    #[test]
    fn test_materialized_row_matches_translated_row() {
        // a row materialized in place must equal one that was materialized
        // earlier and translated with the batch
        let cfg = GraphConfig::default();
        let mut row_a = Row {
            sha: "a".to_string(),
            summary: "subject".to_string(),
            parent_shas: Vec::new(),
            child_shas: Vec::new(),
            lane: 1,
            row_index: 4,
            edges: Vec::new(),
            chips: Vec::new(),
            summary_x: 50.0,
            right_edge: 120.0,
            drawables: None,
        };
        let mut row_b = row_a.clone();
        row_b.row_index = 6;

        materialize_row(&mut row_a, &cfg, false);
        let mut translated = row_a.drawables.clone().unwrap();
        translated.translate_y(2.0 * cfg.row_spacing);

        materialize_row(&mut row_b, &cfg, false);
        let fresh = row_b.drawables.unwrap();
        assert_eq!(translated.node, fresh.node);
        assert_eq!(translated.hit_region.shape, fresh.hit_region.shape);
        assert_eq!(translated.labels, fresh.labels);
    }
}
