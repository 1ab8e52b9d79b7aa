use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::config::GraphConfig;
use crate::protocol::{CommitDescriptor, LabelAssignment};
use crate::scene::{TextMetrics, lane_color};

use super::occupancy::OccupancyTable;
use super::{EdgeSegment, LabelChip, LabelKind, Row, SegmentShape};

/// Cell protecting the bend of a curved edge. The curve crosses one extra
/// cell next to whichever endpoint sits on the smaller lane.
fn corner_cell(
    parent_idx: usize,
    parent_lane: usize,
    child_idx: usize,
    child_lane: usize,
) -> Option<(usize, usize)> {
    if parent_lane < child_lane {
        Some((parent_idx, child_lane))
    } else if parent_lane > child_lane {
        Some((child_idx, parent_lane))
    } else {
        None
    }
}

/// Rows, lane occupancy, and the sha index. All three are kept consistent by
/// every operation; the viewport only ever reads rows and materializes their
/// drawables in place.
pub(crate) struct LayoutState {
    rows: Vec<Row>,
    index: HashMap<String, usize>,
    occupancy: OccupancyTable,
    content_width: f32,
}

impl LayoutState {
    pub(crate) fn new() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
            occupancy: OccupancyTable::new(),
            content_width: 0.0,
        }
    }

    pub(crate) fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub(crate) fn index_of(&self, sha: &str) -> Option<usize> {
        self.index.get(sha).copied()
    }

    pub(crate) fn row_of(&self, sha: &str) -> Option<&Row> {
        self.index_of(sha).map(|i| &self.rows[i])
    }

    pub(crate) fn content_width(&self) -> f32 {
        self.content_width
    }

    #[cfg(test)]
    pub(crate) fn occupancy(&self) -> &OccupancyTable {
        &self.occupancy
    }

    /// Lay the whole graph out from scratch, newest commit first.
    pub(crate) fn layout_full(
        &mut self,
        cfg: &GraphConfig,
        metrics: &dyn TextMetrics,
        commits: &[CommitDescriptor],
        labels: &[LabelAssignment],
    ) {
        self.rows.clear();
        self.index.clear();
        for descriptor in commits {
            if self.index.contains_key(&descriptor.sha) {
                warn!(
                    "Duplicate commit {} in graph batch, keeping the first",
                    descriptor.sha
                );
                continue;
            }
            let row = Self::make_row(descriptor, self.rows.len());
            self.index.insert(row.sha.clone(), row.row_index);
            self.rows.push(row);
        }

        let count = self.rows.len();
        self.occupancy.reset(count);
        for i in 0..count {
            let lane = self.occupancy.lowest_free(i);
            self.rows[i].lane = lane;
            self.occupancy.occupy(i, lane);
            self.reserve_paths(i);
            self.mark_child_corners(i);
        }
        for i in 0..count {
            let parent_shas = self.rows[i].parent_shas.clone();
            for parent_sha in &parent_shas {
                if let Some(&p) = self.index.get(parent_sha) {
                    if p > i {
                        self.build_edge(p, i);
                    }
                }
            }
        }

        self.apply_labels(cfg, metrics, labels);
        for i in 0..count {
            self.place_labels(cfg, metrics, i);
        }
        self.recompute_content_width();
        debug!("Laid out {count} commits");
    }

    /// Prepend commits that arrived since the last batch. Surviving rows keep
    /// their lanes; their drawables are shifted down instead of being rebuilt.
    pub(crate) fn incremental_add(
        &mut self,
        cfg: &GraphConfig,
        metrics: &dyn TextMetrics,
        commits: &[CommitDescriptor],
    ) {
        let mut fresh: Vec<Row> = Vec::new();
        for descriptor in commits {
            if self.index.contains_key(&descriptor.sha)
                || fresh.iter().any(|r| r.sha == descriptor.sha)
            {
                warn!(
                    "Commit {} is already laid out, ignoring incremental add",
                    descriptor.sha
                );
                continue;
            }
            fresh.push(Self::make_row(descriptor, 0));
        }
        let added = fresh.len();
        if added == 0 {
            return;
        }

        let dy = added as f32 * cfg.row_spacing;
        for row in &mut self.rows {
            if let Some(drawables) = &mut row.drawables {
                drawables.translate_y(dy);
            }
        }
        self.rows.splice(0..0, fresh);
        self.occupancy.insert_rows(0, added);
        self.rebuild_index();

        let mut dirty: BTreeSet<usize> = BTreeSet::new();
        for i in 0..added {
            let lane = self.occupancy.lowest_free(i);
            self.rows[i].lane = lane;
            self.occupancy.occupy(i, lane);

            let parent_shas = self.rows[i].parent_shas.clone();
            for parent_sha in &parent_shas {
                let Some(&p) = self.index.get(parent_sha) else {
                    warn!(
                        "Commit {} references unknown parent {parent_sha}",
                        self.rows[i].sha
                    );
                    continue;
                };
                if p <= i {
                    warn!(
                        "Commit {} lists {parent_sha} as a parent but it is laid out above, ignoring",
                        self.rows[i].sha
                    );
                    continue;
                }
                // Rows later in this batch have no lane yet, so only nodes in
                // the pre-existing region can be in the way.
                self.resolve_lane_conflicts(cfg, added, p, lane, &mut dirty);
                for r in (i + 1)..p {
                    self.occupancy.occupy(r, lane);
                    dirty.insert(r);
                }
                if p >= added {
                    // Previously laid-out parent: claim the bend cell from the
                    // child side and remember the new child for later splices.
                    if let Some((row, corner_lane)) = corner_cell(p, self.rows[p].lane, i, lane) {
                        self.occupancy.occupy(row, corner_lane);
                        dirty.insert(row);
                    }
                    let child_sha = self.rows[i].sha.clone();
                    if !self.rows[p].child_shas.contains(&child_sha) {
                        self.rows[p].child_shas.push(child_sha);
                    }
                }
            }
            self.mark_child_corners(i);
        }

        for i in 0..added {
            let parent_shas = self.rows[i].parent_shas.clone();
            for parent_sha in &parent_shas {
                if let Some(&p) = self.index.get(parent_sha) {
                    if p > i {
                        self.build_edge(p, i);
                    }
                }
            }
        }

        for i in 0..added {
            dirty.insert(i);
        }
        for &i in &dirty {
            let right = self.place_labels(cfg, metrics, i);
            self.content_width = self.content_width.max(right);
        }
        debug!("Prepended {added} commits, {} total", self.rows.len());
    }

    /// Drop rewritten-away commits one by one, splicing each one's children
    /// onto its parents so the surviving history stays connected.
    pub(crate) fn incremental_remove(
        &mut self,
        cfg: &GraphConfig,
        metrics: &dyn TextMetrics,
        shas: &[String],
    ) {
        let mut dirty: BTreeSet<usize> = BTreeSet::new();
        let mut removed = 0usize;
        for sha in shas {
            let Some(&index) = self.index.get(sha) else {
                warn!("Incremental remove for unknown commit {sha}");
                continue;
            };
            self.remove_single(cfg, index, &mut dirty);
            removed += 1;
        }
        if removed == 0 {
            return;
        }
        for &i in &dirty {
            self.place_labels(cfg, metrics, i);
        }
        self.recompute_content_width();
        debug!("Removed {removed} commits, {} remain", self.rows.len());
    }

    /// Replace the full set of ref labels.
    pub(crate) fn set_labels(
        &mut self,
        cfg: &GraphConfig,
        metrics: &dyn TextMetrics,
        labels: &[LabelAssignment],
    ) {
        let touched = self.apply_labels(cfg, metrics, labels);
        for &i in &touched {
            self.place_labels(cfg, metrics, i);
        }
        self.recompute_content_width();
    }

    fn make_row(descriptor: &CommitDescriptor, row_index: usize) -> Row {
        Row {
            sha: descriptor.sha.clone(),
            summary: descriptor.summary.clone(),
            parent_shas: descriptor.parent_shas.clone(),
            child_shas: descriptor.child_shas.clone(),
            lane: 0,
            row_index,
            edges: Vec::new(),
            chips: Vec::new(),
            summary_x: 0.0,
            right_edge: 0.0,
            drawables: None,
        }
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.row_index = i;
            self.index.insert(row.sha.clone(), i);
        }
    }

    /// Claim the cells an edge passes through on the way down to each parent,
    /// so later rows cannot take a lane an edge already runs in.
    fn reserve_paths(&mut self, index: usize) {
        let lane = self.rows[index].lane;
        let parent_shas = self.rows[index].parent_shas.clone();
        for parent_sha in &parent_shas {
            match self.index.get(parent_sha) {
                Some(&p) if p > index => {
                    for r in (index + 1)..p {
                        self.occupancy.occupy(r, lane);
                    }
                }
                Some(_) => warn!(
                    "Commit {} lists {parent_sha} as a parent but it is laid out above, ignoring",
                    self.rows[index].sha
                ),
                None => warn!(
                    "Commit {} references unknown parent {parent_sha}",
                    self.rows[index].sha
                ),
            }
        }
    }

    /// Claim the bend cells of the curved edges into this row's children.
    /// Children sit above, so their lanes are already final.
    fn mark_child_corners(&mut self, index: usize) {
        let lane = self.rows[index].lane;
        let child_shas = self.rows[index].child_shas.clone();
        for child_sha in &child_shas {
            match self.index.get(child_sha) {
                Some(&c) if c < index => {
                    if let Some((row, corner_lane)) =
                        corner_cell(index, lane, c, self.rows[c].lane)
                    {
                        self.occupancy.occupy(row, corner_lane);
                    }
                }
                Some(_) => warn!(
                    "Commit {} lists {child_sha} as a child but it is laid out below, ignoring",
                    self.rows[index].sha
                ),
                None => warn!(
                    "Commit {} references unknown child {child_sha}",
                    self.rows[index].sha
                ),
            }
        }
    }

    /// Bucket the segments of one parent/child edge onto the rows they pass
    /// through: straight pieces in the child's lane, then a final hop into
    /// the parent's lane on the parent's own row. Touched rows lose their
    /// drawables so the next window pass repaints the new segments.
    fn build_edge(&mut self, parent_idx: usize, child_idx: usize) {
        let parent_lane = self.rows[parent_idx].lane;
        let child_lane = self.rows[child_idx].lane;
        let parent_sha = self.rows[parent_idx].sha.clone();
        let child_sha = self.rows[child_idx].sha.clone();

        for bucket in (child_idx + 1)..parent_idx {
            self.rows[bucket].edges.push(EdgeSegment {
                parent_sha: parent_sha.clone(),
                child_sha: child_sha.clone(),
                shape: SegmentShape::Vertical { lane: child_lane },
                color: lane_color(child_lane),
            });
            self.rows[bucket].drawables = None;
        }

        let color = if child_lane >= parent_lane {
            lane_color(child_lane)
        } else {
            lane_color(parent_lane)
        };
        let shape = if child_lane == parent_lane {
            SegmentShape::Vertical { lane: parent_lane }
        } else {
            SegmentShape::Curve {
                child_lane,
                parent_lane,
            }
        };
        self.rows[parent_idx].edges.push(EdgeSegment {
            parent_sha,
            child_sha,
            shape,
            color,
        });
        self.rows[parent_idx].drawables = None;
    }

    fn drop_edge(&mut self, child_idx: usize, parent_idx: usize, parent_sha: &str, child_sha: &str) {
        for bucket in (child_idx + 1)..=parent_idx {
            let edges = &mut self.rows[bucket].edges;
            let before = edges.len();
            edges.retain(|seg| !(seg.parent_sha == parent_sha && seg.child_sha == child_sha));
            if edges.len() != before {
                self.rows[bucket].drawables = None;
            }
        }
    }

    /// Shove any node sitting on `lane` in `start..end` one or more lanes to
    /// the right, so a new pass-through reservation cannot run over it.
    fn resolve_lane_conflicts(
        &mut self,
        cfg: &GraphConfig,
        start: usize,
        end: usize,
        lane: usize,
        dirty: &mut BTreeSet<usize>,
    ) {
        for r in start..end {
            if self.rows[r].lane == lane {
                self.shift_row_right(cfg, r, dirty);
            }
        }
    }

    /// Move one node to the nearest free lane on its right, migrating every
    /// cell it claimed and rebuilding the edges that touch it. Displacing the
    /// node can displace others further down; lanes only ever move rightward,
    /// so the cascade terminates.
    fn shift_row_right(&mut self, cfg: &GraphConfig, index: usize, dirty: &mut BTreeSet<usize>) {
        let old_lane = self.rows[index].lane;
        let sha = self.rows[index].sha.clone();
        let parents: Vec<usize> = self.rows[index]
            .parent_shas
            .iter()
            .filter_map(|s| self.index.get(s).copied())
            .filter(|&p| p > index)
            .collect();
        let children: Vec<usize> = self.rows[index]
            .child_shas
            .iter()
            .filter_map(|s| self.index.get(s).copied())
            .filter(|&c| c < index)
            .collect();

        self.occupancy.release(index, old_lane);
        for &p in &parents {
            for r in (index + 1)..p {
                self.occupancy.release(r, old_lane);
                dirty.insert(r);
            }
            if let Some((row, l)) = corner_cell(p, self.rows[p].lane, index, old_lane) {
                self.occupancy.release(row, l);
                dirty.insert(row);
            }
        }
        for &c in &children {
            if let Some((row, l)) = corner_cell(index, old_lane, c, self.rows[c].lane) {
                self.occupancy.release(row, l);
                dirty.insert(row);
            }
        }

        let new_lane = self.occupancy.lowest_free_from(index, old_lane + 1);
        self.rows[index].lane = new_lane;
        self.occupancy.occupy(index, new_lane);
        for &p in &parents {
            self.resolve_lane_conflicts(cfg, index + 1, p, new_lane, dirty);
            for r in (index + 1)..p {
                self.occupancy.occupy(r, new_lane);
                dirty.insert(r);
            }
            if let Some((row, l)) = corner_cell(p, self.rows[p].lane, index, new_lane) {
                self.occupancy.occupy(row, l);
                dirty.insert(row);
            }
        }
        for &c in &children {
            if let Some((row, l)) = corner_cell(index, new_lane, c, self.rows[c].lane) {
                self.occupancy.occupy(row, l);
                dirty.insert(row);
            }
        }

        for &p in &parents {
            let parent_sha = self.rows[p].sha.clone();
            self.drop_edge(index, p, &parent_sha, &sha);
            self.build_edge(p, index);
        }
        for &c in &children {
            let child_sha = self.rows[c].sha.clone();
            self.drop_edge(c, index, &sha, &child_sha);
            self.build_edge(index, c);
        }
        dirty.insert(index);
        debug!("Shifted {sha} from lane {old_lane} to lane {new_lane}");
    }

    fn remove_single(&mut self, cfg: &GraphConfig, index: usize, dirty: &mut BTreeSet<usize>) {
        let removed_sha = self.rows[index].sha.clone();
        let removed_lane = self.rows[index].lane;
        let removed_parents = self.rows[index].parent_shas.clone();
        let removed_children = self.rows[index].child_shas.clone();
        let parents: Vec<usize> = removed_parents
            .iter()
            .filter_map(|s| self.index.get(s).copied())
            .filter(|&p| p > index)
            .collect();
        let children: Vec<usize> = removed_children
            .iter()
            .filter_map(|s| self.index.get(s).copied())
            .filter(|&c| c < index)
            .collect();

        // release every cell this row claimed, plus the cells its children's
        // edges claimed on the way in
        self.occupancy.release(index, removed_lane);
        for &p in &parents {
            for r in (index + 1)..p {
                self.occupancy.release(r, removed_lane);
                dirty.insert(r);
            }
            if let Some((row, l)) = corner_cell(p, self.rows[p].lane, index, removed_lane) {
                self.occupancy.release(row, l);
                dirty.insert(row);
            }
            let parent_sha = self.rows[p].sha.clone();
            self.drop_edge(index, p, &parent_sha, &removed_sha);
        }
        for &c in &children {
            let child_lane = self.rows[c].lane;
            for r in (c + 1)..index {
                self.occupancy.release(r, child_lane);
                dirty.insert(r);
            }
            if let Some((row, l)) = corner_cell(index, removed_lane, c, child_lane) {
                self.occupancy.release(row, l);
                dirty.insert(row);
            }
            let child_sha = self.rows[c].sha.clone();
            self.drop_edge(c, index, &removed_sha, &child_sha);
        }

        // splice the links shut, remembering which pairs need a bridge edge
        let mut bridged: Vec<(String, String)> = Vec::new();
        for &c in &children {
            let child_sha = self.rows[c].sha.clone();
            let list = &mut self.rows[c].parent_shas;
            if let Some(pos) = list.iter().position(|s| *s == removed_sha) {
                list.remove(pos);
                let mut at = pos;
                for parent_sha in &removed_parents {
                    if !list.contains(parent_sha) {
                        list.insert(at, parent_sha.clone());
                        at += 1;
                        bridged.push((parent_sha.clone(), child_sha.clone()));
                    }
                }
            }
        }
        for &p in &parents {
            let list = &mut self.rows[p].child_shas;
            if let Some(pos) = list.iter().position(|s| *s == removed_sha) {
                list.remove(pos);
                let mut at = pos;
                for child_sha in &removed_children {
                    if !list.contains(child_sha) {
                        list.insert(at, child_sha.clone());
                        at += 1;
                    }
                }
            }
        }

        // drop the row; everything below moves up one slot
        self.rows.remove(index);
        self.occupancy.remove_row(index);
        self.index.remove(&removed_sha);
        for r in index..self.rows.len() {
            self.rows[r].row_index = r;
            if let Some(entry) = self.index.get_mut(&self.rows[r].sha) {
                *entry = r;
            }
            if let Some(drawables) = &mut self.rows[r].drawables {
                drawables.translate_y(-cfg.row_spacing);
            }
        }
        let shifted: BTreeSet<usize> = dirty
            .iter()
            .filter(|&&r| r != index)
            .map(|&r| if r > index { r - 1 } else { r })
            .collect();
        *dirty = shifted;

        // bridge each severed child to the parents it inherited
        for (parent_sha, child_sha) in bridged {
            let (Some(&p), Some(&c)) = (self.index.get(&parent_sha), self.index.get(&child_sha))
            else {
                continue;
            };
            if p <= c {
                continue;
            }
            let child_lane = self.rows[c].lane;
            self.resolve_lane_conflicts(cfg, c + 1, p, child_lane, dirty);
            for r in (c + 1)..p {
                self.occupancy.occupy(r, child_lane);
                dirty.insert(r);
            }
            if let Some((row, l)) = corner_cell(p, self.rows[p].lane, c, child_lane) {
                self.occupancy.occupy(row, l);
                dirty.insert(row);
            }
            self.build_edge(p, c);
        }
        debug!("Removed {removed_sha} from row {index}");
    }

    /// Hand each row its chips for this label pass. Returns the rows whose
    /// chip set changed in either direction.
    fn apply_labels(
        &mut self,
        cfg: &GraphConfig,
        metrics: &dyn TextMetrics,
        labels: &[LabelAssignment],
    ) -> Vec<usize> {
        let mut grouped: HashMap<&str, Vec<LabelChip>> = HashMap::new();
        for assignment in labels {
            grouped
                .entry(assignment.sha.as_str())
                .or_default()
                .push(LabelChip {
                    shorthand: assignment.shorthand.clone(),
                    full_name: assignment.full_name.clone(),
                    kind: LabelKind::from_name(&assignment.kind),
                    x: 0.0,
                    width: metrics.text_width(&assignment.shorthand, cfg.text_size)
                        + 2.0 * cfg.chip_text_pad,
                });
        }
        let mut touched = Vec::new();
        for i in 0..self.rows.len() {
            match grouped.remove(self.rows[i].sha.as_str()) {
                Some(chips) => {
                    self.rows[i].chips = chips;
                    touched.push(i);
                }
                None => {
                    if !self.rows[i].chips.is_empty() {
                        self.rows[i].chips.clear();
                        touched.push(i);
                    }
                }
            }
        }
        for sha in grouped.keys() {
            warn!("Label for unknown commit {sha}");
        }
        touched
    }

    /// Lay the row's chips and summary out to the right of its last occupied
    /// lane. Drops the row's drawables when anything actually moved.
    fn place_labels(&mut self, cfg: &GraphConfig, metrics: &dyn TextMetrics, index: usize) -> f32 {
        let start_lane = self.occupancy.max_lane(index).unwrap_or(0) + 1;
        let mut x = cfg.lane_x(start_lane);
        let row = &mut self.rows[index];
        let mut changed = false;
        for chip in &mut row.chips {
            if chip.x != x {
                chip.x = x;
                changed = true;
            }
            x += chip.width + cfg.chip_spacing;
        }
        if row.summary_x != x {
            row.summary_x = x;
            changed = true;
        }
        row.right_edge = x + metrics.text_width(&row.summary, cfg.text_size);
        if changed {
            row.drawables = None;
        }
        row.right_edge
    }

    fn recompute_content_width(&mut self) {
        self.content_width = self.rows.iter().map(|r| r.right_edge).fold(0.0, f32::max);
    }
}
