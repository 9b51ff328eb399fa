#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Uniform grid index that keeps neighbour queries sub-linear as agents move.
//!
//! The index stores identifiers and the authoritative indexed position of
//! every agent, never the agents themselves. Grid cells only prune
//! candidates: every query filters by exact Euclidean distance, so the grid
//! and linear modes return identical results.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use battle_arena_core::AgentId;
use glam::Vec2;
use tracing::trace;

/// Integer coordinates of a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    x: i32,
    y: i32,
}

impl CellKey {
    /// Creates a cell key from its column and row.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }
}

/// Computes `floor(position / cell_size)` on both axes.
///
/// Flooring keeps negative coordinates in the cell to their left or above
/// rather than collapsing them onto cell zero.
#[must_use]
pub fn cell_key(position: Vec2, cell_size: f32) -> CellKey {
    CellKey::new(
        (position.x / cell_size).floor() as i32,
        (position.y / cell_size).floor() as i32,
    )
}

/// Inclusive range of cell coordinates covering `[center - radius, center +
/// radius]` on one axis, widened by one cell on each side.
///
/// Both ends go through the same flooring and saturating cast as
/// [`cell_key`], so a far away centre narrows to the same edge cells as far
/// away agents instead of shifting the whole window off the occupied cells.
fn cell_span(center: f32, radius: f32, cell_size: f32) -> (i32, i32) {
    let low = ((center - radius) / cell_size).floor() as i32;
    let high = ((center + radius) / cell_size).floor() as i32;
    // One extra ring absorbs rounding for agents sitting on a cell border.
    (low.saturating_sub(1), high.saturating_add(1))
}

/// How the index narrows down candidates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Partitioning {
    /// Agents are bucketed into square cells of the given edge length.
    Grid {
        /// Edge length of a cell. Must be positive.
        cell_size: f32,
    },
    /// Every query scans all indexed agents.
    Linear,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    position: Vec2,
    cell: Option<CellKey>,
}

/// Spatial hash mapping cells to the agents currently inside them.
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    partitioning: Partitioning,
    entries: BTreeMap<AgentId, Entry>,
    cells: HashMap<CellKey, BTreeSet<AgentId>>,
}

impl SpatialIndex {
    /// Creates an empty index using the provided partitioning.
    #[must_use]
    pub fn new(partitioning: Partitioning) -> Self {
        if let Partitioning::Grid { cell_size } = partitioning {
            debug_assert!(cell_size > 0.0, "grid cell size must be positive");
        }

        Self {
            partitioning,
            entries: BTreeMap::new(),
            cells: HashMap::new(),
        }
    }

    /// Creates an empty grid index.
    #[must_use]
    pub fn grid(cell_size: f32) -> Self {
        Self::new(Partitioning::Grid { cell_size })
    }

    /// Creates an empty index that answers queries by scanning every agent.
    #[must_use]
    pub fn linear() -> Self {
        Self::new(Partitioning::Linear)
    }

    /// Partitioning used by the index.
    #[must_use]
    pub const fn partitioning(&self) -> Partitioning {
        self.partitioning
    }

    /// Cell that would hold the position, or `None` for a linear index.
    #[must_use]
    pub fn cell_for(&self, position: Vec2) -> Option<CellKey> {
        match self.partitioning {
            Partitioning::Grid { cell_size } => Some(cell_key(position, cell_size)),
            Partitioning::Linear => None,
        }
    }

    /// Number of indexed agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no agent is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reports whether the agent is indexed.
    #[must_use]
    pub fn contains(&self, id: AgentId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Indexed position of the agent.
    #[must_use]
    pub fn position(&self, id: AgentId) -> Option<Vec2> {
        self.entries.get(&id).map(|entry| entry.position)
    }

    /// Cell currently listing the agent.
    #[must_use]
    pub fn cell_of(&self, id: AgentId) -> Option<CellKey> {
        self.entries.get(&id).and_then(|entry| entry.cell)
    }

    /// Agents listed in the given cell in ascending identifier order.
    pub fn members(&self, cell: CellKey) -> impl Iterator<Item = AgentId> + '_ {
        self.cells.get(&cell).into_iter().flatten().copied()
    }

    /// Number of cells holding at least one agent.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Indexes an agent at `position`.
    ///
    /// Inserting an agent that is already indexed moves it instead. Returns
    /// `true` when the agent was not indexed before.
    pub fn insert(&mut self, id: AgentId, position: Vec2) -> bool {
        if let Some(previous) = self.position(id) {
            let _ = self.reposition(id, previous, position);
            return false;
        }

        let cell = self.cell_for(position);
        if let Some(cell) = cell {
            let _ = self.cells.entry(cell).or_default().insert(id);
        }
        let _ = self.entries.insert(id, Entry { position, cell });
        true
    }

    /// Drops the agent from the index, returning its last indexed position.
    pub fn remove(&mut self, id: AgentId) -> Option<Vec2> {
        let entry = self.entries.remove(&id)?;
        if let Some(cell) = entry.cell {
            self.vacate(cell, id);
        }
        Some(entry.position)
    }

    /// Moves an indexed agent to `new`.
    ///
    /// `old` is advisory: the agent's tracked cell is authoritative for the
    /// removal half, so a stale `old` is ignored and the agent is never left
    /// listed in two cells. Returns `false` when the agent is not indexed.
    pub fn reposition(&mut self, id: AgentId, old: Vec2, new: Vec2) -> bool {
        let new_cell = self.cell_for(new);
        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };

        if entry.position != old {
            trace!(
                agent = %id,
                indexed = %entry.position,
                %old,
                "stale previous position ignored"
            );
        }
        entry.position = new;

        let old_cell = entry.cell;
        if old_cell == new_cell {
            return true;
        }
        entry.cell = new_cell;

        if let Some(cell) = old_cell {
            self.vacate(cell, id);
        }
        if let Some(cell) = new_cell {
            let _ = self.cells.entry(cell).or_default().insert(id);
        }
        true
    }

    /// Removes every agent from the index.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cells.clear();
    }

    /// Agents whose indexed position lies within `radius` of `center`, in
    /// ascending identifier order.
    #[must_use]
    pub fn query_radius(&self, center: Vec2, radius: f32) -> Vec<AgentId> {
        let mut out = Vec::new();
        self.query_radius_into(center, radius, &mut out);
        out
    }

    /// Buffer-reusing form of [`SpatialIndex::query_radius`]. The output is
    /// cleared first.
    pub fn query_radius_into(&self, center: Vec2, radius: f32, out: &mut Vec<AgentId>) {
        out.clear();
        if radius.is_nan() || radius < 0.0 || !center.is_finite() {
            return;
        }

        match self.partitioning {
            Partitioning::Grid { cell_size } => self.grid_query(center, radius, cell_size, out),
            Partitioning::Linear => self.linear_query(center, radius, out),
        }
    }

    fn grid_query(&self, center: Vec2, radius: f32, cell_size: f32, out: &mut Vec<AgentId>) {
        let (min_x, max_x) = cell_span(center.x, radius, cell_size);
        let (min_y, max_y) = cell_span(center.y, radius, cell_size);

        let span_x = (i64::from(max_x) - i64::from(min_x) + 1) as u64;
        let span_y = (i64::from(max_y) - i64::from(min_y) + 1) as u64;
        let window = span_x.saturating_mul(span_y);

        if window > self.cells.len() as u64 {
            for (cell, members) in &self.cells {
                if (min_x..=max_x).contains(&cell.x) && (min_y..=max_y).contains(&cell.y) {
                    self.collect_within(members, center, radius, out);
                }
            }
        } else {
            for x in min_x..=max_x {
                for y in min_y..=max_y {
                    if let Some(members) = self.cells.get(&CellKey::new(x, y)) {
                        self.collect_within(members, center, radius, out);
                    }
                }
            }
        }

        out.sort_unstable();
    }

    fn collect_within(
        &self,
        members: &BTreeSet<AgentId>,
        center: Vec2,
        radius: f32,
        out: &mut Vec<AgentId>,
    ) {
        for id in members {
            if let Some(entry) = self.entries.get(id) {
                if entry.position.distance(center) <= radius {
                    out.push(*id);
                }
            }
        }
    }

    fn linear_query(&self, center: Vec2, radius: f32, out: &mut Vec<AgentId>) {
        out.extend(
            self.entries
                .iter()
                .filter(|(_, entry)| entry.position.distance(center) <= radius)
                .map(|(id, _)| *id),
        );
    }

    fn vacate(&mut self, cell: CellKey, id: AgentId) {
        if let Some(members) = self.cells.get_mut(&cell) {
            let _ = members.remove(&id);
            if members.is_empty() {
                let _ = self.cells.remove(&cell);
            }
        }
    }
}
