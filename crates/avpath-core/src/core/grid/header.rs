use nalgebra::{Point3, Vector3};
use thiserror::Error;

/// Errors raised by grid index math.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    /// A Cartesian coordinate was mapped to a voxel outside the grid extent.
    #[error("coordinate ({x:.3}, {y:.3}, {z:.3}) lies outside the grid")]
    OutOfBounds { x: f64, y: f64, z: f64 },

    /// A linear voxel index exceeded the voxel count of the grid.
    #[error("voxel index {index} is out of range for a grid of {count} voxels")]
    IndexOutOfRange { index: usize, count: usize },
}

/// Defines the geometry of a cubic voxel grid centered on a path origin.
///
/// The grid is a cube of `side = 2 * ceil(max_path_length / spacing) + 1`
/// voxels per axis, so the path origin always falls on the center voxel.
/// Linear indices run x fastest, then y, then z:
/// `index = x + side * (y + side * z)`. This ordering is stable and is the
/// ordering of every dense field exported from the grid.
///
/// A header is immutable once the grid is built, except for re-centering on a
/// new origin when the source coordinate moves between resamples.
#[derive(Debug, Clone, PartialEq)]
pub struct GridHeader {
    origin: Point3<f64>,
    spacing: f64,
    max_path_length: f64,
    neighbor_radius: f64,
    obstacle_threshold: f64,
    half_extent: usize,
    side: usize,
}

impl GridHeader {
    /// Derives the grid geometry from the path origin and search parameters.
    ///
    /// # Arguments
    ///
    /// * `origin` - Center of the grid, i.e. the path origin (labeling site).
    /// * `max_path_length` - Maximum path length; fixes the grid half-extent.
    /// * `spacing` - Voxel edge length, must be positive.
    /// * `neighbor_radius` - Connectivity cutoff in voxel units, at least 1.
    /// * `obstacle_threshold` - Occupancy above which a voxel is impassable.
    pub fn new(
        origin: Point3<f64>,
        max_path_length: f64,
        spacing: f64,
        neighbor_radius: f64,
        obstacle_threshold: f64,
    ) -> Self {
        let half_extent = (max_path_length / spacing).ceil() as usize;
        Self {
            origin,
            spacing,
            max_path_length,
            neighbor_radius,
            obstacle_threshold,
            half_extent,
            side: 2 * half_extent + 1,
        }
    }

    /// Number of voxels along each axis.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Total number of voxels in the grid.
    pub fn voxel_count(&self) -> usize {
        self.side * self.side * self.side
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn max_path_length(&self) -> f64 {
        self.max_path_length
    }

    pub fn neighbor_radius(&self) -> f64 {
        self.neighbor_radius
    }

    pub fn obstacle_threshold(&self) -> f64 {
        self.obstacle_threshold
    }

    /// The path origin, i.e. the center of the grid.
    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    /// Re-centers the grid on a new path origin. Voxel dimensions are unchanged.
    pub fn set_origin(&mut self, origin: Point3<f64>) {
        self.origin = origin;
    }

    /// The Cartesian position of the center of voxel `(0, 0, 0)`.
    pub fn corner(&self) -> Point3<f64> {
        self.origin - Vector3::repeat(self.half_extent as f64 * self.spacing)
    }

    /// Splits a linear index into its per-axis voxel indices `(x, y, z)`.
    pub fn dim_indices(&self, index: usize) -> (usize, usize, usize) {
        let x = index % self.side;
        let y = (index / self.side) % self.side;
        let z = index / (self.side * self.side);
        (x, y, z)
    }

    /// Combines per-axis voxel indices into a linear index.
    pub fn linear_index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.side * (y + self.side * z)
    }

    /// The Cartesian position of the center of the voxel at `index`.
    pub fn location_of(&self, index: usize) -> Point3<f64> {
        let (x, y, z) = self.dim_indices(index);
        self.corner() + Vector3::new(x as f64, y as f64, z as f64) * self.spacing
    }

    /// Maps a Cartesian coordinate to the nearest voxel index.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if the coordinate rounds to a voxel
    /// outside the grid extent.
    pub fn index_of(&self, coordinate: &Point3<f64>) -> Result<usize, GridError> {
        let relative = (coordinate - self.corner()) / self.spacing;
        let out_of_bounds = || GridError::OutOfBounds {
            x: coordinate.x,
            y: coordinate.y,
            z: coordinate.z,
        };

        let mut indices = [0usize; 3];
        for (slot, value) in indices.iter_mut().zip(relative.iter()) {
            let rounded = value.round();
            if rounded < 0.0 || rounded >= self.side as f64 {
                return Err(out_of_bounds());
            }
            *slot = rounded as usize;
        }
        Ok(self.linear_index(indices[0], indices[1], indices[2]))
    }
}
