use super::config::AvParameters;
use super::error::EngineError;
use super::features::FeatureExtractor;
use super::graph::{NeighborTable, update_tiles};
use super::sampler::ObstacleSampler;
use super::search::find_path_dijkstra;
use crate::core::grid::header::GridHeader;
use crate::core::grid::map::PathGrid;
use crate::core::grid::tile::{FeatureKey, TILE_BLOCKING_OCCUPANCY};
use crate::core::models::obstacle::Obstacle;
use nalgebra::{Point3, Vector3};
use tracing::{debug, info, instrument};

/// One weighted voxel of the accessible region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedPoint {
    /// Linear voxel index in the owning grid.
    pub index: usize,
    /// Cartesian center of the voxel.
    pub position: Point3<f64>,
    /// Sampling weight of the voxel.
    pub weight: f64,
}

/// The accessible volume around one labeling site.
///
/// Owns its grid; references, but never owns or mutates, the obstacle list
/// and the source coordinate supplied by the structure subsystem. All derived
/// state (grid, accessible set, mean position) is invalidated whenever the
/// source or the parameters change and is rebuilt by [`resample`].
///
/// An AV with zero accessible voxels is a well-defined state, not an error:
/// the mean position is `None` and downstream samplers yield empty results.
///
/// [`resample`]: AccessibleVolume::resample
pub struct AccessibleVolume<'a> {
    parameters: AvParameters,
    obstacles: &'a [Obstacle],
    source: Point3<f64>,
    table: NeighborTable,
    grid: Option<PathGrid>,
    accessible: Vec<WeightedPoint>,
    mean_position: Option<Point3<f64>>,
}

impl<'a> AccessibleVolume<'a> {
    /// Creates an unsampled accessible volume.
    ///
    /// # Errors
    ///
    /// Fails fast on invalid parameters; nothing is allocated in that case.
    pub fn new(
        obstacles: &'a [Obstacle],
        source: Point3<f64>,
        parameters: AvParameters,
    ) -> Result<Self, EngineError> {
        parameters.validate()?;
        let table = NeighborTable::new(parameters.neighbor_radius as f64);
        Ok(Self {
            parameters,
            obstacles,
            source,
            table,
            grid: None,
            accessible: Vec::new(),
            mean_position: None,
        })
    }

    pub fn parameters(&self) -> &AvParameters {
        &self.parameters
    }

    pub fn source(&self) -> Point3<f64> {
        self.source
    }

    /// Moves the labeling site, invalidating all derived state.
    pub fn set_source(&mut self, source: Point3<f64>) {
        self.source = source;
        self.invalidate();
    }

    /// Replaces the parameters, invalidating all derived state.
    ///
    /// # Errors
    ///
    /// Rejects invalid parameters and leaves the previous ones in place.
    pub fn set_parameters(&mut self, parameters: AvParameters) -> Result<(), EngineError> {
        parameters.validate()?;
        self.table = NeighborTable::new(parameters.neighbor_radius as f64);
        self.parameters = parameters;
        self.invalidate();
        Ok(())
    }

    fn invalidate(&mut self) {
        self.grid = None;
        self.accessible.clear();
        self.mean_position = None;
    }

    /// The grid of the last resample, if any.
    pub fn grid(&self) -> Option<&PathGrid> {
        self.grid.as_ref()
    }

    /// The accessible voxels of the last resample, with sampling weights.
    pub fn accessible_points(&self) -> &[WeightedPoint] {
        &self.accessible
    }

    /// Whether the last resample found no accessible voxel (or none ran yet).
    pub fn is_empty(&self) -> bool {
        self.accessible.is_empty()
    }

    /// Weighted centroid of the accessible region; `None` while the AV is empty.
    pub fn mean_position(&self) -> Option<Point3<f64>> {
        self.mean_position
    }

    /// Feature extraction over the last resample's grid.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotResampled`] before the first [`resample`].
    ///
    /// [`resample`]: AccessibleVolume::resample
    pub fn features(&self) -> Result<FeatureExtractor<'_>, EngineError> {
        self.grid
            .as_ref()
            .map(FeatureExtractor::new)
            .ok_or(EngineError::NotResampled)
    }

    /// Runs the full pipeline for the current source and obstacle list.
    ///
    /// Builds a grid centered on the source, rasterizes the obstacles inflated
    /// by half the linker width, walls off everything beyond the linker length,
    /// clears the allowed sphere around the source, runs the exhaustive
    /// shortest-path search, removes voxels the dye center cannot occupy,
    /// applies the contact-volume reweighting, and caches the accessible set
    /// and its weighted centroid.
    #[instrument(skip_all, name = "av_resample")]
    pub fn resample(&mut self) -> Result<(), EngineError> {
        let p = &self.parameters;
        let header = GridHeader::new(
            self.source,
            p.linker_length,
            p.grid_spacing,
            p.neighbor_radius as f64,
            p.obstacle_threshold,
        );
        let mut grid = PathGrid::new(header);
        let sampler = ObstacleSampler::new(self.obstacles);
        info!(
            obstacles = sampler.obstacle_count(),
            voxels = grid.header().voxel_count(),
            "resampling accessible volume"
        );

        sampler.sample(&mut grid, p.linker_width * 0.5);
        grid.fill_sphere(self.source, p.linker_length, TILE_BLOCKING_OCCUPANCY, true);
        grid.fill_sphere(self.source, p.allowed_sphere_radius, 0.0, false);

        update_tiles(&mut grid);
        let start = grid.header().index_of(&self.source)?;
        let outcome = find_path_dijkstra(&mut grid, &self.table, start, None)?;
        debug!(visited = outcome.visited, "reachability search finished");

        // The dye center cannot come closer to an obstacle than its own
        // radius; such voxels keep their path cost but lose all weight.
        let dye_radius = p.radii[0];
        if dye_radius > 0.0 && !self.obstacles.is_empty() {
            sampler.sample(&mut grid, dye_radius);
            let threshold = grid.header().obstacle_threshold();
            let (tiles, occupancy) = grid.tiles_and_occupancy_mut();
            for (tile, &occ) in tiles.iter_mut().zip(occupancy.iter()) {
                if occ > threshold {
                    tile.density = 0.0;
                }
            }
        }

        self.accessible = collect_accessible(&grid, self.source, p);
        apply_contact_reweighting(&mut grid, &mut self.accessible, self.source, p);
        self.mean_position = weighted_centroid(&self.accessible);

        info!(
            accessible = self.accessible.len(),
            empty = self.accessible.is_empty(),
            "accessible volume updated"
        );
        self.grid = Some(grid);
        Ok(())
    }
}

/// Collects the weighted voxels reachable within the linker length.
///
/// A voxel belongs to the accessible region iff its path length lies in
/// `[0, linker_length]`, it still carries weight, and it lies at least the
/// allowed sphere radius away from the source (the linker must first span
/// its rigid minimum reach before the dye can splay).
fn collect_accessible(
    grid: &PathGrid,
    source: Point3<f64>,
    parameters: &AvParameters,
) -> Vec<WeightedPoint> {
    let header = grid.header();
    let spacing = header.spacing();
    let mut points = Vec::new();
    for tile in grid.tiles() {
        if tile.density <= 0.0 || !tile.cost.is_finite() {
            continue;
        }
        if tile.cost * spacing > parameters.linker_length {
            continue;
        }
        let position = header.location_of(tile.index);
        if (position - source).norm() < parameters.allowed_sphere_radius {
            continue;
        }
        points.push(WeightedPoint {
            index: tile.index,
            position,
            weight: tile.density,
        });
    }
    points
}

/// Rescales the contact shell so it carries the trapped fraction of the
/// total weight, modeling a dye partially stuck at the protein surface.
///
/// The shell is the layer within `contact_volume_thickness` outside the
/// allowed sphere. Reweighted values are mirrored into the tiles' densities
/// and recorded under `FeatureKey::ContactWeight`.
fn apply_contact_reweighting(
    grid: &mut PathGrid,
    accessible: &mut [WeightedPoint],
    source: Point3<f64>,
    parameters: &AvParameters,
) {
    let thickness = parameters.contact_volume_thickness;
    let trapped = parameters.contact_volume_trapped_fraction;
    if thickness <= 0.0 || !(0.0..=1.0).contains(&trapped) {
        return;
    }

    let shell_outer = parameters.allowed_sphere_radius + thickness;
    let in_shell =
        |point: &WeightedPoint| (point.position - source).norm() <= shell_outer;

    let total: f64 = accessible.iter().map(|point| point.weight).sum();
    let shell: f64 = accessible.iter().filter(|p| in_shell(p)).map(|p| p.weight).sum();
    if shell <= 0.0 || total <= shell {
        return;
    }

    // Scale factor that moves the shell's share of the total weight to the
    // trapped fraction; factors below 1 thin the shell out instead.
    let factor = if trapped >= 1.0 {
        f64::INFINITY
    } else {
        trapped * (total - shell) / ((1.0 - trapped) * shell)
    };
    debug!(shell, total, factor, "contact volume reweighting");

    for point in accessible.iter_mut() {
        if !in_shell(point) {
            continue;
        }
        point.weight = if factor.is_finite() {
            point.weight * factor
        } else {
            point.weight
        };
        let tile = &mut grid.tiles_mut()[point.index];
        tile.density = point.weight;
        tile.set_feature(FeatureKey::ContactWeight, point.weight);
    }
    if !factor.is_finite() {
        // Fully trapped: everything outside the shell loses its weight.
        for point in accessible.iter_mut() {
            if !in_shell(point) {
                point.weight = 0.0;
                grid.tiles_mut()[point.index].density = 0.0;
            }
        }
    }
}

fn weighted_centroid(points: &[WeightedPoint]) -> Option<Point3<f64>> {
    let mut sum = Vector3::zeros();
    let mut weight_sum = 0.0;
    for point in points {
        if point.weight <= 0.0 {
            continue;
        }
        sum += point.position.coords * point.weight;
        weight_sum += point.weight;
    }
    if weight_sum > 0.0 {
        Some(Point3::from(sum / weight_sum))
    } else {
        None
    }
}
