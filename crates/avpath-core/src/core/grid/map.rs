use super::header::{GridError, GridHeader};
use super::tile::Tile;
use nalgebra::Point3;

/// Dense voxel grid owning the tiles and the obstacle-occupancy field.
///
/// The occupancy field is written by the obstacle sampler and classifies
/// tiles as passable or impassable against the header's obstacle threshold.
/// It is stored separately from the tiles' sampling weight (`Tile::density`):
/// occupancy decides where a path may go, density decides how much statistical
/// weight a reachable voxel carries.
#[derive(Debug, Clone)]
pub struct PathGrid {
    header: GridHeader,
    tiles: Vec<Tile>,
    occupancy: Vec<f64>,
}

impl PathGrid {
    /// Allocates a grid with the geometry of `header`.
    ///
    /// All tiles start unvisited with default density; the occupancy field
    /// starts empty (all zero).
    pub fn new(header: GridHeader) -> Self {
        let count = header.voxel_count();
        let tiles = (0..count).map(Tile::new).collect();
        Self {
            header,
            tiles,
            occupancy: vec![0.0; count],
        }
    }

    pub fn header(&self) -> &GridHeader {
        &self.header
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    /// Returns the tile at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::IndexOutOfRange`] if `index` exceeds the voxel count.
    pub fn tile(&self, index: usize) -> Result<&Tile, GridError> {
        self.tiles.get(index).ok_or(GridError::IndexOutOfRange {
            index,
            count: self.tiles.len(),
        })
    }

    pub fn occupancy(&self) -> &[f64] {
        &self.occupancy
    }

    /// Split borrow: mutable tiles alongside the read-only occupancy field.
    pub fn tiles_and_occupancy_mut(&mut self) -> (&mut [Tile], &[f64]) {
        (&mut self.tiles, &self.occupancy)
    }

    pub fn occupancy_mut(&mut self) -> &mut [f64] {
        &mut self.occupancy
    }

    /// Zeroes the occupancy field in place.
    pub fn clear_occupancy(&mut self) {
        self.occupancy.fill(0.0);
    }

    /// Whether the voxel at `index` is impassable under the obstacle threshold.
    pub fn is_occupied(&self, index: usize) -> bool {
        self.occupancy[index] > self.header.obstacle_threshold()
    }

    /// Overrides the occupancy inside or outside a sphere.
    ///
    /// With `inverse = false` every voxel whose center lies strictly inside the
    /// sphere is set to `value`; with `inverse = true` every voxel at or beyond
    /// the sphere surface is set instead. Used to wall off the volume beyond
    /// the reachability budget and to clear the seed region around a source
    /// that coincides with an obstacle.
    pub fn fill_sphere(&mut self, center: Point3<f64>, radius: f64, value: f64, inverse: bool) {
        let radius_sq = radius * radius;
        for index in 0..self.occupancy.len() {
            let distance_sq = (self.header.location_of(index) - center).norm_squared();
            let inside = distance_sq < radius_sq;
            if inside != inverse {
                self.occupancy[index] = value;
            }
        }
    }
}
