/// Traversal penalty multiplier of a free tile.
pub const TILE_FREE_PENALTY: f64 = 1.0;
/// Traversal penalty multiplier assigned to occupied tiles.
pub const TILE_OBSTACLE_PENALTY: f64 = 1.0e5;
/// Occupancy value that blocks a tile under any sensible threshold.
pub const TILE_BLOCKING_OCCUPANCY: f64 = 1.0e5;
/// Sampling weight a tile carries before any clearance or reweighting step.
pub const TILE_DENSITY_DEFAULT: f64 = 1.0;

/// Keys of the sparse per-tile feature registry.
///
/// Features are problem-specific scalar weights attached to individual tiles,
/// kept separate from the search state so extensions do not grow the tile
/// struct. The set of keys is closed to preserve type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKey {
    /// Reweighted sampling weight of tiles inside the contact-volume shell.
    ContactWeight,
    /// Scratch weight available to library users.
    UserWeight,
}

/// Named per-tile quantities that can be read out of a grid.
///
/// Plain scalar fields (`Penalty`, `Cost`, `Density`, `Feature`) are clamped
/// into the requested bounds. Path-length-gated fields
/// (`PathLength`, `PathLengthDensity`, `CostDensity`, `Accessible*`) are zeroed
/// when the tile's path length falls outside the bounds; this is the mechanism
/// by which "reachable within the linker length" selections are made.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TileField {
    /// The traversal penalty multiplier of the tile.
    Penalty,
    /// The accumulated path cost from the search origin, in voxel units.
    Cost,
    /// The sampling weight (AV density) of the tile.
    Density,
    /// Cost times density, gated by the cost window.
    CostDensity,
    /// Cost times grid spacing, i.e. the physical path length.
    PathLength,
    /// Path length times density.
    PathLengthDensity,
    /// A named feature value.
    Feature(FeatureKey),
    /// Density of tiles whose path length lies within the bounds, else zero.
    AccessibleDensity,
    /// Feature value of tiles whose path length lies within the bounds, else zero.
    AccessibleFeature(FeatureKey),
}

/// A closed value window applied when reading tile values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueBounds {
    pub low: f64,
    pub high: f64,
}

impl Default for ValueBounds {
    fn default() -> Self {
        Self {
            low: f64::NEG_INFINITY,
            high: f64::INFINITY,
        }
    }
}

impl ValueBounds {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.low).min(self.high)
    }
}

/// A single voxel of the search grid.
///
/// Carries the search state (cost, predecessor), the traversal penalty derived
/// from the occupancy field, the sampling weight (`density`), and the sparse
/// feature registry. Tiles are allocated once when the grid is sized and are
/// reset, never freed, between searches.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// Linear voxel index of this tile, unique per grid.
    pub index: usize,
    /// Penalty multiplier for traversing this tile.
    pub penalty: f64,
    /// Accumulated path cost from the search origin; infinite until visited.
    pub cost: f64,
    /// Predecessor tile of the cheapest known path; `None` until reached.
    pub previous: Option<usize>,
    /// Sampling weight of the tile (the AV density).
    pub density: f64,
    features: Vec<(FeatureKey, f64)>,
}

impl Tile {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            penalty: TILE_FREE_PENALTY,
            cost: f64::INFINITY,
            previous: None,
            density: TILE_DENSITY_DEFAULT,
            features: Vec::new(),
        }
    }

    /// Resets the search state while keeping penalty, density, and features.
    pub fn reset_search_state(&mut self) {
        self.cost = f64::INFINITY;
        self.previous = None;
    }

    pub fn feature(&self, key: FeatureKey) -> Option<f64> {
        self.features
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    pub fn set_feature(&mut self, key: FeatureKey, value: f64) {
        if let Some(slot) = self.features.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.features.push((key, value));
        }
    }

    /// Reads a named value of this tile.
    ///
    /// Unreached tiles (infinite cost) read as 0 for every cost-derived field,
    /// so exported fields never carry infinities. `grid_spacing` converts the
    /// cost into a physical path length where the field calls for it.
    pub fn value(&self, field: TileField, bounds: ValueBounds, grid_spacing: f64) -> f64 {
        let path_length = self.cost * grid_spacing;
        match field {
            TileField::Penalty => bounds.clamp(self.penalty),
            TileField::Cost => {
                if self.cost.is_finite() {
                    bounds.clamp(self.cost)
                } else {
                    0.0
                }
            }
            TileField::Density => bounds.clamp(self.density),
            TileField::CostDensity => {
                if self.cost.is_finite() && bounds.contains(self.cost) {
                    self.cost * self.density
                } else {
                    0.0
                }
            }
            TileField::PathLength => {
                if path_length.is_finite() && bounds.contains(path_length) {
                    path_length
                } else {
                    0.0
                }
            }
            TileField::PathLengthDensity => {
                if path_length.is_finite() && bounds.contains(path_length) {
                    path_length * self.density
                } else {
                    0.0
                }
            }
            TileField::Feature(key) => bounds.clamp(self.feature(key).unwrap_or(0.0)),
            TileField::AccessibleDensity => {
                if path_length.is_finite() && bounds.contains(path_length) {
                    self.density
                } else {
                    0.0
                }
            }
            TileField::AccessibleFeature(key) => {
                if path_length.is_finite() && bounds.contains(path_length) {
                    self.feature(key).unwrap_or(0.0)
                } else {
                    0.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tile_is_unvisited() {
        let tile = Tile::new(7);
        assert_eq!(tile.index, 7);
        assert_eq!(tile.cost, f64::INFINITY);
        assert_eq!(tile.previous, None);
        assert_eq!(tile.penalty, TILE_FREE_PENALTY);
        assert_eq!(tile.density, TILE_DENSITY_DEFAULT);
    }

    #[test]
    fn reset_clears_only_search_state() {
        let mut tile = Tile::new(0);
        tile.cost = 3.5;
        tile.previous = Some(1);
        tile.penalty = TILE_OBSTACLE_PENALTY;
        tile.density = 0.25;
        tile.reset_search_state();
        assert_eq!(tile.cost, f64::INFINITY);
        assert_eq!(tile.previous, None);
        assert_eq!(tile.penalty, TILE_OBSTACLE_PENALTY);
        assert_eq!(tile.density, 0.25);
    }

    #[test]
    fn features_upsert_and_read_back() {
        let mut tile = Tile::new(0);
        assert_eq!(tile.feature(FeatureKey::UserWeight), None);
        tile.set_feature(FeatureKey::UserWeight, 2.0);
        tile.set_feature(FeatureKey::UserWeight, 4.0);
        tile.set_feature(FeatureKey::ContactWeight, 0.5);
        assert_eq!(tile.feature(FeatureKey::UserWeight), Some(4.0));
        assert_eq!(tile.feature(FeatureKey::ContactWeight), Some(0.5));
    }

    #[test]
    fn scalar_fields_clamp_into_bounds() {
        let mut tile = Tile::new(0);
        tile.cost = 12.0;
        tile.density = 3.0;
        let bounds = ValueBounds::new(0.0, 10.0);
        assert_eq!(tile.value(TileField::Cost, bounds, 1.0), 10.0);
        assert_eq!(tile.value(TileField::Density, bounds, 1.0), 3.0);
        assert_eq!(tile.value(TileField::Penalty, bounds, 1.0), 1.0);
    }

    #[test]
    fn path_length_fields_zero_outside_window() {
        let mut tile = Tile::new(0);
        tile.cost = 8.0;
        tile.density = 2.0;
        let spacing = 0.5;
        let inside = ValueBounds::new(0.0, 20.0);
        let outside = ValueBounds::new(0.0, 3.0);
        assert_eq!(tile.value(TileField::PathLength, inside, spacing), 4.0);
        assert_eq!(tile.value(TileField::PathLength, outside, spacing), 0.0);
        assert_eq!(tile.value(TileField::PathLengthDensity, inside, spacing), 8.0);
        assert_eq!(tile.value(TileField::AccessibleDensity, inside, spacing), 2.0);
        assert_eq!(tile.value(TileField::AccessibleDensity, outside, spacing), 0.0);
    }

    #[test]
    fn unreached_tile_reads_as_zero() {
        let tile = Tile::new(0);
        let bounds = ValueBounds::default();
        assert_eq!(tile.value(TileField::Cost, bounds, 1.0), 0.0);
        assert_eq!(tile.value(TileField::PathLength, bounds, 1.0), 0.0);
        assert_eq!(tile.value(TileField::AccessibleDensity, bounds, 1.0), 0.0);
        assert_eq!(tile.value(TileField::CostDensity, bounds, 1.0), 0.0);
    }

    #[test]
    fn accessible_feature_gates_on_path_length() {
        let mut tile = Tile::new(0);
        tile.set_feature(FeatureKey::UserWeight, 7.0);
        let bounds = ValueBounds::new(0.0, 5.0);
        assert_eq!(
            tile.value(TileField::AccessibleFeature(FeatureKey::UserWeight), bounds, 1.0),
            0.0
        );
        tile.cost = 2.0;
        assert_eq!(
            tile.value(TileField::AccessibleFeature(FeatureKey::UserWeight), bounds, 1.0),
            7.0
        );
    }
}
