use crate::core::grid::header::GridHeader;
use crate::core::grid::map::PathGrid;
use crate::core::models::obstacle::Obstacle;
use itertools::iproduct;
use tracing::{instrument, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Rasterizes weighted obstacle spheres into a grid's occupancy field.
///
/// Hard-sphere kernel: every voxel whose center lies within
/// `radius + extra_radius` of an obstacle center accumulates that obstacle's
/// weight; overlapping spheres add. The sampler only writes the occupancy
/// field; tile cost, predecessor, and density are untouched.
pub struct ObstacleSampler<'a> {
    obstacles: &'a [Obstacle],
}

impl<'a> ObstacleSampler<'a> {
    pub fn new(obstacles: &'a [Obstacle]) -> Self {
        Self { obstacles }
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    /// Replaces the grid's occupancy field with a fresh rasterization.
    ///
    /// `extra_radius` inflates every obstacle uniformly; the obstacle list
    /// itself is never modified. Rasterization is per-obstacle over the
    /// bounding box of the inflated sphere, so cost scales with covered
    /// volume rather than grid size.
    #[instrument(level = "trace", skip(self, grid))]
    pub fn sample(&self, grid: &mut PathGrid, extra_radius: f64) {
        grid.clear_occupancy();

        #[cfg(feature = "parallel")]
        {
            let header = grid.header().clone();
            let side = header.side();
            let slab = side * side;
            let obstacles = self.obstacles;
            grid.occupancy_mut()
                .par_chunks_mut(slab)
                .enumerate()
                .for_each(|(z, occupancy_slab)| {
                    for obstacle in obstacles {
                        rasterize_slab(&header, z, occupancy_slab, obstacle, extra_radius);
                    }
                });
        }

        #[cfg(not(feature = "parallel"))]
        {
            let header = grid.header().clone();
            let side = header.side();
            let slab = side * side;
            for (z, occupancy_slab) in grid.occupancy_mut().chunks_mut(slab).enumerate() {
                for obstacle in self.obstacles {
                    rasterize_slab(&header, z, occupancy_slab, obstacle, extra_radius);
                }
            }
        }

        trace!(
            obstacles = self.obstacles.len(),
            extra_radius,
            "occupancy field resampled"
        );
    }
}

/// Adds one inflated obstacle to a single z slab of the occupancy field.
fn rasterize_slab(
    header: &GridHeader,
    z: usize,
    occupancy_slab: &mut [f64],
    obstacle: &Obstacle,
    extra_radius: f64,
) {
    let radius = obstacle.radius + extra_radius;
    if radius <= 0.0 {
        return;
    }
    let radius_sq = radius * radius;
    let side = header.side();
    let spacing = header.spacing();
    let corner = header.corner();

    let plane_z = corner.z + z as f64 * spacing;
    let dz = plane_z - obstacle.position.z;
    if dz.abs() > radius {
        return;
    }

    let axis_range = |center: f64, corner_axis: f64| {
        let low = ((center - radius - corner_axis) / spacing).floor().max(0.0) as usize;
        let high = ((center + radius - corner_axis) / spacing).ceil() as isize;
        let high = high.clamp(0, side as isize - 1) as usize;
        (low.min(side - 1), high)
    };
    let (y_low, y_high) = axis_range(obstacle.position.y, corner.y);
    let (x_low, x_high) = axis_range(obstacle.position.x, corner.x);

    for (y, x) in iproduct!(y_low..=y_high, x_low..=x_high) {
        let dy = corner.y + y as f64 * spacing - obstacle.position.y;
        let dx = corner.x + x as f64 * spacing - obstacle.position.x;
        if dx * dx + dy * dy + dz * dz <= radius_sq {
            occupancy_slab[y * side + x] += obstacle.weight;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn grid() -> PathGrid {
        PathGrid::new(GridHeader::new(Point3::origin(), 5.0, 1.0, 2.0, 1e-6))
    }

    #[test]
    fn single_sphere_covers_expected_voxels() {
        let mut g = grid();
        let obstacles = [Obstacle::new(Point3::origin(), 1.0)];
        ObstacleSampler::new(&obstacles).sample(&mut g, 0.0);

        let header = g.header().clone();
        let at = |p: Point3<f64>| g.occupancy()[header.index_of(&p).unwrap()];
        assert_eq!(at(Point3::origin()), 1.0);
        assert_eq!(at(Point3::new(1.0, 0.0, 0.0)), 1.0);
        assert_eq!(at(Point3::new(1.0, 1.0, 0.0)), 0.0);
        assert_eq!(at(Point3::new(2.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn extra_radius_inflates_without_mutating_input() {
        let mut g = grid();
        let obstacles = [Obstacle::new(Point3::origin(), 1.0)];
        ObstacleSampler::new(&obstacles).sample(&mut g, 1.0);

        let header = g.header().clone();
        let at = |p: Point3<f64>| g.occupancy()[header.index_of(&p).unwrap()];
        assert_eq!(at(Point3::new(2.0, 0.0, 0.0)), 1.0);
        assert_eq!(at(Point3::new(1.0, 1.0, 1.0)), 1.0);
        assert_eq!(obstacles[0].radius, 1.0);
    }

    #[test]
    fn overlapping_spheres_accumulate_weight() {
        let mut g = grid();
        let obstacles = [
            Obstacle::with_weight(Point3::origin(), 1.5, 2.0),
            Obstacle::with_weight(Point3::new(1.0, 0.0, 0.0), 1.5, 3.0),
        ];
        ObstacleSampler::new(&obstacles).sample(&mut g, 0.0);

        let header = g.header().clone();
        let center = header.index_of(&Point3::origin()).unwrap();
        assert_eq!(g.occupancy()[center], 5.0);
    }

    #[test]
    fn resampling_replaces_previous_field() {
        let mut g = grid();
        let first = [Obstacle::new(Point3::new(3.0, 3.0, 3.0), 1.0)];
        let second = [Obstacle::new(Point3::origin(), 1.0)];
        ObstacleSampler::new(&first).sample(&mut g, 0.0);
        ObstacleSampler::new(&second).sample(&mut g, 0.0);

        let header = g.header().clone();
        let stale = header.index_of(&Point3::new(3.0, 3.0, 3.0)).unwrap();
        assert_eq!(g.occupancy()[stale], 0.0);
    }

    #[test]
    fn sampling_does_not_touch_search_state() {
        let mut g = grid();
        g.tiles_mut()[0].cost = 1.0;
        g.tiles_mut()[0].previous = Some(5);
        let obstacles = [Obstacle::new(Point3::origin(), 2.0)];
        ObstacleSampler::new(&obstacles).sample(&mut g, 0.0);
        assert_eq!(g.tiles()[0].cost, 1.0);
        assert_eq!(g.tiles()[0].previous, Some(5));
        assert_eq!(g.tiles()[0].density, 1.0);
    }

    #[test]
    fn sphere_outside_grid_contributes_nothing() {
        let mut g = grid();
        let obstacles = [Obstacle::new(Point3::new(100.0, 0.0, 0.0), 1.0)];
        ObstacleSampler::new(&obstacles).sample(&mut g, 0.0);
        assert!(g.occupancy().iter().all(|&v| v == 0.0));
    }
}
