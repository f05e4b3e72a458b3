use nalgebra::Point3;

/// A dense scalar field sampled on a voxel grid.
///
/// `data` holds one value per voxel in the grid's linear order, x fastest,
/// then y, then z (`data[x + nx * (y + ny * z)]`). `origin` is the Cartesian
/// center of voxel `(0, 0, 0)`. This is the container handed to volumetric
/// writers for external visualization.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityField {
    pub dims: [usize; 3],
    pub origin: Point3<f64>,
    pub spacing: f64,
    pub data: Vec<f64>,
}

impl DensityField {
    /// Total number of voxels described by `dims`.
    pub fn voxel_count(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Whether the data length matches the dimensions.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.voxel_count()
    }

    /// Value at the per-axis voxel indices `(x, y, z)`.
    pub fn value_at(&self, x: usize, y: usize, z: usize) -> f64 {
        self.data[x + self.dims[0] * (y + self.dims[1] * z)]
    }
}
