use nalgebra::Point3;

/// Represents a single spherical obstacle in the search domain.
///
/// Obstacles are supplied by an external structure subsystem, typically one
/// sphere per atom of a molecular structure. The engine treats the obstacle
/// collection as read-only input: it is rasterized into the grid's occupancy
/// field but never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    /// The center of the sphere in Angstroms.
    pub position: Point3<f64>,
    /// The sphere radius in Angstroms (e.g., a van der Waals radius).
    pub radius: f64,
    /// The contribution this obstacle adds to the occupancy of every voxel it
    /// covers (e.g., mass or occupancy). Overlapping obstacles accumulate.
    pub weight: f64,
}

impl Obstacle {
    /// Creates an obstacle with unit weight.
    ///
    /// # Arguments
    ///
    /// * `position` - The sphere center.
    /// * `radius` - The sphere radius.
    pub fn new(position: Point3<f64>, radius: f64) -> Self {
        Self {
            position,
            radius,
            weight: 1.0,
        }
    }

    /// Creates an obstacle with an explicit per-voxel weight.
    ///
    /// # Arguments
    ///
    /// * `position` - The sphere center.
    /// * `radius` - The sphere radius.
    /// * `weight` - The occupancy contribution of this obstacle.
    pub fn with_weight(position: Point3<f64>, radius: f64, weight: f64) -> Self {
        Self {
            position,
            radius,
            weight,
        }
    }
}
