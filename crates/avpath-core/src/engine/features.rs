use crate::core::grid::field::DensityField;
use crate::core::grid::map::PathGrid;
use crate::core::grid::tile::{TileField, ValueBounds};

/// Exports named per-voxel quantities of a grid as dense scalar fields.
///
/// The output array shares the grid's linear ordering (x fastest) and its
/// geometry (origin at the center of voxel `(0, 0, 0)`, isotropic spacing),
/// so it can be handed directly to a volumetric writer. Unreachable or
/// bound-filtered voxels read as 0.
pub struct FeatureExtractor<'a> {
    grid: &'a PathGrid,
}

impl<'a> FeatureExtractor<'a> {
    pub fn new(grid: &'a PathGrid) -> Self {
        Self { grid }
    }

    /// Extracts `field` with the default (unbounded) value window.
    pub fn extract(&self, field: TileField) -> DensityField {
        self.extract_bounded(field, ValueBounds::default())
    }

    /// Extracts `field`, filtering values through `bounds`.
    ///
    /// Plain scalar fields clamp into the window; path-length-gated fields
    /// zero voxels whose path length falls outside it. This is how
    /// "accessible within the linker length" selections are exported.
    pub fn extract_bounded(&self, field: TileField, bounds: ValueBounds) -> DensityField {
        let header = self.grid.header();
        let spacing = header.spacing();
        let data = self
            .grid
            .tiles()
            .iter()
            .map(|tile| tile.value(field, bounds, spacing))
            .collect();
        DensityField {
            dims: [header.side(); 3],
            origin: header.corner(),
            spacing,
            data,
        }
    }
}
