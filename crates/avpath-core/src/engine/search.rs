use super::error::EngineError;
use super::graph::NeighborTable;
use crate::core::grid::header::GridError;
use crate::core::grid::map::PathGrid;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::{debug, instrument};

/// Summary of a completed path search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    /// Number of voxels popped from the frontier.
    pub visited: usize,
    /// Final cost of the requested terminal voxel, if one was given and reached.
    pub target_cost: Option<f64>,
}

/// Frontier entry ordered for a min-heap on `priority`.
///
/// Ties on priority are broken by insertion order: the entry pushed first is
/// popped first. This makes the predecessor recorded among equal-cost
/// alternatives deterministic, which reachability and optimal costs do not
/// depend on but test reproducibility does.
#[derive(Debug, Clone, Copy)]
struct FrontierEntry {
    priority: f64,
    cost: f64,
    sequence: u64,
    index: usize,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Inverted so that std's max-heap pops the smallest priority;
        // priorities are finite by construction.
        other
            .priority
            .partial_cmp(&self.priority)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

fn check_index(grid: &PathGrid, index: usize) -> Result<(), EngineError> {
    let count = grid.header().voxel_count();
    if index >= count {
        return Err(EngineError::Grid {
            source: GridError::IndexOutOfRange { index, count },
        });
    }
    Ok(())
}

/// Single-source shortest paths over the voxel graph (Dijkstra).
///
/// With `target = None` the search runs to exhaustion: every voxel reachable
/// from `start` ends with its minimal cumulative edge-weighted cost and a
/// valid predecessor link, while unreachable voxels keep infinite cost and no
/// predecessor. With `target = Some(t)` the search stops once `t` is
/// finalized. Callers must run [`super::graph::update_tiles`] beforehand; an
/// occupied start voxel reaches nothing.
#[instrument(level = "trace", skip(grid, table))]
pub fn find_path_dijkstra(
    grid: &mut PathGrid,
    table: &NeighborTable,
    start: usize,
    target: Option<usize>,
) -> Result<SearchOutcome, EngineError> {
    check_index(grid, start)?;
    if let Some(t) = target {
        check_index(grid, t)?;
    }
    run_search(grid, table, start, target, |_, _| 0.0)
}

/// Single-pair shortest path over the voxel graph (A*).
///
/// The heuristic is the index-space Euclidean distance to the terminal voxel,
/// which never exceeds the true remaining cost (edge weights are at least the
/// index-space distances), so the reported cost to `target` is minimal and
/// identical to what Dijkstra would report. The search terminates as soon as
/// the terminal is finalized and in general leaves the rest of the grid
/// unexplored.
#[instrument(level = "trace", skip(grid, table))]
pub fn find_path_astar(
    grid: &mut PathGrid,
    table: &NeighborTable,
    start: usize,
    target: usize,
) -> Result<SearchOutcome, EngineError> {
    check_index(grid, start)?;
    check_index(grid, target)?;

    let header = grid.header();
    let (tx, ty, tz) = header.dim_indices(target);
    let side = header.side();
    let heuristic = move |index: usize, _side: usize| {
        let x = index % side;
        let y = (index / side) % side;
        let z = index / (side * side);
        let dx = x as f64 - tx as f64;
        let dy = y as f64 - ty as f64;
        let dz = z as f64 - tz as f64;
        (dx * dx + dy * dy + dz * dz).sqrt()
    };
    run_search(grid, table, start, Some(target), heuristic)
}

fn run_search(
    grid: &mut PathGrid,
    table: &NeighborTable,
    start: usize,
    target: Option<usize>,
    heuristic: impl Fn(usize, usize) -> f64,
) -> Result<SearchOutcome, EngineError> {
    let side = grid.header().side();
    let mut visited = 0usize;
    if grid.is_occupied(start) {
        // An occupied voxel has no incident edges, so not even the start
        // itself counts as reached; callers unblock the origin first.
        debug!(start, "search start voxel is occupied, nothing is reachable");
        return Ok(SearchOutcome {
            visited,
            target_cost: None,
        });
    }

    grid.tiles_mut()[start].cost = 0.0;
    grid.tiles_mut()[start].previous = None;

    let header = grid.header().clone();
    let threshold = header.obstacle_threshold();
    let mut sequence = 0u64;
    let mut frontier = BinaryHeap::new();
    frontier.push(FrontierEntry {
        priority: heuristic(start, side),
        cost: 0.0,
        sequence,
        index: start,
    });

    while let Some(entry) = frontier.pop() {
        let current = entry.index;
        // Lazy deletion: a stale entry carries an outdated cost.
        if entry.cost > grid.tiles()[current].cost {
            continue;
        }
        visited += 1;
        if target == Some(current) {
            break;
        }

        let current_cost = grid.tiles()[current].cost;
        let (tiles, occupancy) = grid.tiles_and_occupancy_mut();
        table.for_each_neighbor(&header, current, |neighbor, edge_length| {
            if occupancy[neighbor] > threshold {
                return;
            }
            let tile = &mut tiles[neighbor];
            let candidate = current_cost + edge_length * tile.penalty;
            if candidate < tile.cost {
                tile.cost = candidate;
                tile.previous = Some(current);
                sequence += 1;
                frontier.push(FrontierEntry {
                    priority: candidate + heuristic(neighbor, side),
                    cost: candidate,
                    sequence,
                    index: neighbor,
                });
            }
        });
    }

    let target_cost = target
        .map(|t| grid.tiles()[t].cost)
        .filter(|c| c.is_finite());
    debug!(visited, ?target_cost, "path search finished");
    Ok(SearchOutcome {
        visited,
        target_cost,
    })
}

/// Reconstructs the voxel sequence from `index` back to the search origin.
///
/// The returned indices are ordered target first, origin last. A voxel that
/// was never reached has no predecessor and yields a path of length 1 (just
/// itself). The walk is capped at the voxel count; exceeding the cap means a
/// predecessor cycle, which is a bug in the search, not a recoverable state.
///
/// # Errors
///
/// Returns [`EngineError::Internal`] on a predecessor cycle and a grid error
/// if `index` is out of range.
pub fn backtrack_to_path(grid: &PathGrid, index: usize) -> Result<Vec<usize>, EngineError> {
    check_index(grid, index)?;
    let cap = grid.header().voxel_count();
    let mut path = Vec::new();
    let mut current = Some(index);
    while let Some(idx) = current {
        if path.len() >= cap {
            return Err(EngineError::Internal(format!(
                "predecessor cycle detected while backtracking from voxel {index}"
            )));
        }
        path.push(idx);
        current = grid.tiles()[idx].previous;
    }
    Ok(path)
}
