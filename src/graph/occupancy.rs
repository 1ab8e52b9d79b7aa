use std::collections::BTreeMap;

/// Row-indexed table of occupied lanes.
///
/// Cells are reference counted: a lane at a given row can be claimed by a
/// node, by pass-through reservations, and by curve corners at the same time,
/// and incremental removal has to release exactly one claim without freeing
/// the cell for the others.
#[derive(Debug, Clone, Default)]
pub struct OccupancyTable {
    rows: Vec<BTreeMap<usize, u32>>,
}

impl OccupancyTable {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Drop everything and start over with `row_count` empty rows
    pub fn reset(&mut self, row_count: usize) {
        self.rows.clear();
        self.rows.resize_with(row_count, BTreeMap::new);
    }

    pub fn occupy(&mut self, row: usize, lane: usize) {
        *self.rows[row].entry(lane).or_insert(0) += 1;
    }

    /// Release one claim on a cell. Releasing a cell that holds no claim is
    /// ignored so a bad batch degrades instead of corrupting neighbors.
    pub fn release(&mut self, row: usize, lane: usize) {
        if let Some(count) = self.rows[row].get_mut(&lane) {
            if *count <= 1 {
                self.rows[row].remove(&lane);
            } else {
                *count -= 1;
            }
        }
    }

    pub fn is_occupied(&self, row: usize, lane: usize) -> bool {
        self.rows[row].contains_key(&lane)
    }

    /// Lowest unoccupied lane at this row
    pub fn lowest_free(&self, row: usize) -> usize {
        self.lowest_free_from(row, 0)
    }

    /// Lowest unoccupied lane at this row that is >= `start`
    pub fn lowest_free_from(&self, row: usize, start: usize) -> usize {
        let mut lane = start;
        for &occupied in self.rows[row].keys() {
            if occupied < lane {
                continue;
            }
            if occupied > lane {
                break;
            }
            lane += 1;
        }
        lane
    }

    /// Highest occupied lane at this row, if any
    pub fn max_lane(&self, row: usize) -> Option<usize> {
        self.rows[row].keys().next_back().copied()
    }

    /// Splice `count` empty rows in at `at`, shifting everything below down
    pub fn insert_rows(&mut self, at: usize, count: usize) {
        self.rows
            .splice(at..at, std::iter::repeat_with(BTreeMap::new).take(count));
    }

    /// Remove one row, shifting everything below up
    pub fn remove_row(&mut self, row: usize) {
        self.rows.remove(row);
    }

    /// Occupied lanes at a row, ascending. Used to compare against a freshly
    /// derived table when checking the collision-free invariant.
    pub fn lanes_at(&self, row: usize) -> Vec<usize> {
        self.rows[row].keys().copied().collect()
    }

    /// Number of claims on one cell
    pub fn claims_at(&self, row: usize, lane: usize) -> u32 {
        self.rows[row].get(&lane).copied().unwrap_or(0)
    }
}
