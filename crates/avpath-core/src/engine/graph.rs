use crate::core::grid::header::GridHeader;
use crate::core::grid::map::PathGrid;
use crate::core::grid::tile::{TILE_FREE_PENALTY, TILE_OBSTACLE_PENALTY};
use itertools::iproduct;
use tracing::trace;

/// A relative neighbor of a voxel, with its index-space Euclidean distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborOffset {
    pub dx: i64,
    pub dy: i64,
    pub dz: i64,
    pub distance: f64,
}

/// Precomputed offsets of every voxel within the connectivity radius.
///
/// The voxel graph is implicit: an edge between voxels A and B exists iff
/// their index-space Euclidean distance is at most the neighbor radius and
/// neither voxel is occupied. Edges are symmetric because the offset set is
/// symmetric; an occupied voxel contributes to no edges at all. The edge
/// weight is `offset.distance * penalty(B)`, the penalty being the destination
/// tile's traversal multiplier (1 for free tiles).
#[derive(Debug, Clone)]
pub struct NeighborTable {
    offsets: Vec<NeighborOffset>,
}

impl NeighborTable {
    /// Enumerates all offsets inside the ball of `neighbor_radius` voxels.
    ///
    /// A radius of 1 yields the 6-connected face neighborhood; a radius of 2
    /// adds the 12 face diagonals, 8 body diagonals, and 6 double steps.
    pub fn new(neighbor_radius: f64) -> Self {
        let reach = neighbor_radius.ceil() as i64;
        let radius_sq = neighbor_radius * neighbor_radius;
        let mut offsets = Vec::new();
        for (dz, dy, dx) in iproduct!(-reach..=reach, -reach..=reach, -reach..=reach) {
            if (dx, dy, dz) == (0, 0, 0) {
                continue;
            }
            let distance_sq = (dx * dx + dy * dy + dz * dz) as f64;
            if distance_sq <= radius_sq {
                offsets.push(NeighborOffset {
                    dx,
                    dy,
                    dz,
                    distance: distance_sq.sqrt(),
                });
            }
        }
        trace!(
            neighbor_radius,
            count = offsets.len(),
            "neighbor table built"
        );
        Self { offsets }
    }

    pub fn offsets(&self) -> &[NeighborOffset] {
        &self.offsets
    }

    /// Shortest edge length in the table (1 voxel for any radius >= 1).
    pub fn min_edge_length(&self) -> f64 {
        self.offsets
            .iter()
            .map(|o| o.distance)
            .fold(f64::INFINITY, f64::min)
    }

    /// Calls `visit` with the linear index and edge length of every in-grid
    /// neighbor of `index`.
    pub fn for_each_neighbor(
        &self,
        header: &GridHeader,
        index: usize,
        mut visit: impl FnMut(usize, f64),
    ) {
        let side = header.side() as i64;
        let (x, y, z) = header.dim_indices(index);
        let (x, y, z) = (x as i64, y as i64, z as i64);
        for offset in &self.offsets {
            let nx = x + offset.dx;
            let ny = y + offset.dy;
            let nz = z + offset.dz;
            if nx < 0 || nx >= side || ny < 0 || ny >= side || nz < 0 || nz >= side {
                continue;
            }
            let neighbor = header.linear_index(nx as usize, ny as usize, nz as usize);
            visit(neighbor, offset.distance);
        }
    }
}

/// Resets every tile's search state and reclassifies occupancy.
///
/// Costs return to infinity and predecessors to `None`; the penalty becomes
/// the obstacle multiplier where the occupancy field exceeds the threshold
/// and the free multiplier elsewhere. No tiles are allocated. Must run after
/// obstacle sampling and before every search; searches themselves are
/// stateless with respect to prior runs.
pub fn update_tiles(grid: &mut PathGrid) {
    let threshold = grid.header().obstacle_threshold();
    let (tiles, occupancy) = grid.tiles_and_occupancy_mut();
    for (tile, &occ) in tiles.iter_mut().zip(occupancy.iter()) {
        tile.reset_search_state();
        tile.penalty = if occ > threshold {
            TILE_OBSTACLE_PENALTY
        } else {
            TILE_FREE_PENALTY
        };
    }
}
