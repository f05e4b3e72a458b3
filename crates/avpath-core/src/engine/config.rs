use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Hard ceiling on the voxel count of a single grid (256 per axis).
///
/// Grid memory scales with `(2 * linker_length / grid_spacing)^3`; spacing and
/// linker length are resource knobs, not merely accuracy knobs, so parameter
/// combinations beyond this ceiling fail fast instead of allocating.
pub const MAX_GRID_VOXELS: usize = 1 << 24;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parameter '{name}' must be positive (got {value})")]
    NonPositive { name: &'static str, value: f64 },

    #[error("parameter '{name}' must not be negative (got {value})")]
    Negative { name: &'static str, value: f64 },

    #[error("contact_volume_trapped_fraction must lie in [-1, 1] (got {0})")]
    TrappedFractionOutOfRange(f64),

    #[error("neighbor_radius must be at least 1 (got {0})")]
    NeighborRadiusTooSmall(u32),

    #[error("grid of {requested} voxels exceeds the ceiling of {ceiling}")]
    GridTooLarge { requested: usize, ceiling: usize },

    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// Parameters of one accessible-volume calculation.
///
/// Lengths are in Angstroms. The defaults model a single-sphere dye on a
/// flexible linker; they match common single-molecule FRET practice.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AvParameters {
    /// Reachability budget: maximum path length from the labeling site.
    pub linker_length: f64,
    /// Diameter of the linker chain; obstacles are inflated by half of it.
    pub linker_width: f64,
    /// Nested dye sphere radii; `radii[0]` is the clearance radius of the dye.
    pub radii: [f64; 3],
    /// Radius around the source cleared of obstacles before the search, so a
    /// source buried inside an atom can seed the search at all.
    pub allowed_sphere_radius: f64,
    /// Thickness of the surface shell biased by the trapped fraction; 0 disables.
    pub contact_volume_thickness: f64,
    /// Fraction of the total AV weight trapped in the contact shell; -1 disables.
    pub contact_volume_trapped_fraction: f64,
    /// Voxel edge length of the simulation grid.
    pub grid_spacing: f64,
    /// Connectivity cutoff of the voxel graph, in voxel units.
    pub neighbor_radius: u32,
    /// Occupancy above which a voxel is impassable.
    pub obstacle_threshold: f64,
}

impl Default for AvParameters {
    fn default() -> Self {
        Self {
            linker_length: 20.0,
            linker_width: 0.5,
            radii: [3.5, 0.0, 0.0],
            allowed_sphere_radius: 1.5,
            contact_volume_thickness: 0.0,
            contact_volume_trapped_fraction: -1.0,
            grid_spacing: 1.5,
            neighbor_radius: 2,
            obstacle_threshold: 1e-6,
        }
    }
}

impl AvParameters {
    pub fn builder() -> AvParametersBuilder {
        AvParametersBuilder::default()
    }

    /// Number of voxels along each grid axis these parameters produce.
    pub fn grid_side(&self) -> usize {
        2 * (self.linker_length / self.grid_spacing).ceil() as usize + 1
    }

    /// Checks every parameter range and the grid resource ceiling.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint; never clamps silently.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("linker_length", self.linker_length),
            ("grid_spacing", self.grid_spacing),
            ("obstacle_threshold", self.obstacle_threshold),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        let non_negative = [
            ("linker_width", self.linker_width),
            ("radius1", self.radii[0]),
            ("radius2", self.radii[1]),
            ("radius3", self.radii[2]),
            ("allowed_sphere_radius", self.allowed_sphere_radius),
            ("contact_volume_thickness", self.contact_volume_thickness),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { name, value });
            }
        }

        let trapped = self.contact_volume_trapped_fraction;
        if !(-1.0..=1.0).contains(&trapped) || trapped.is_nan() {
            return Err(ConfigError::TrappedFractionOutOfRange(trapped));
        }

        if self.neighbor_radius < 1 {
            return Err(ConfigError::NeighborRadiusTooSmall(self.neighbor_radius));
        }

        let side = self.grid_side();
        let requested = side * side * side;
        if requested > MAX_GRID_VOXELS {
            return Err(ConfigError::GridTooLarge {
                requested,
                ceiling: MAX_GRID_VOXELS,
            });
        }

        Ok(())
    }

    /// Loads and validates parameters from a TOML file.
    ///
    /// Absent keys take their defaults, so a file may specify only the
    /// parameters it wants to override.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read,
    /// `ConfigError::Toml` if it is not valid TOML, or any validation error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let parameters: AvParameters =
            toml::from_str(&content).map_err(|e| ConfigError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        parameters.validate()?;
        Ok(parameters)
    }
}

#[derive(Debug, Default, Clone)]
pub struct AvParametersBuilder {
    linker_length: Option<f64>,
    linker_width: Option<f64>,
    radii: Option<[f64; 3]>,
    allowed_sphere_radius: Option<f64>,
    contact_volume_thickness: Option<f64>,
    contact_volume_trapped_fraction: Option<f64>,
    grid_spacing: Option<f64>,
    neighbor_radius: Option<u32>,
    obstacle_threshold: Option<f64>,
}

impl AvParametersBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn linker_length(mut self, length: f64) -> Self {
        self.linker_length = Some(length);
        self
    }
    pub fn linker_width(mut self, width: f64) -> Self {
        self.linker_width = Some(width);
        self
    }
    pub fn radii(mut self, radii: [f64; 3]) -> Self {
        self.radii = Some(radii);
        self
    }
    pub fn allowed_sphere_radius(mut self, radius: f64) -> Self {
        self.allowed_sphere_radius = Some(radius);
        self
    }
    pub fn contact_volume_thickness(mut self, thickness: f64) -> Self {
        self.contact_volume_thickness = Some(thickness);
        self
    }
    pub fn contact_volume_trapped_fraction(mut self, fraction: f64) -> Self {
        self.contact_volume_trapped_fraction = Some(fraction);
        self
    }
    pub fn grid_spacing(mut self, spacing: f64) -> Self {
        self.grid_spacing = Some(spacing);
        self
    }
    pub fn neighbor_radius(mut self, radius: u32) -> Self {
        self.neighbor_radius = Some(radius);
        self
    }
    pub fn obstacle_threshold(mut self, threshold: f64) -> Self {
        self.obstacle_threshold = Some(threshold);
        self
    }

    /// Fills unset fields with defaults and validates the result.
    pub fn build(self) -> Result<AvParameters, ConfigError> {
        let defaults = AvParameters::default();
        let parameters = AvParameters {
            linker_length: self.linker_length.unwrap_or(defaults.linker_length),
            linker_width: self.linker_width.unwrap_or(defaults.linker_width),
            radii: self.radii.unwrap_or(defaults.radii),
            allowed_sphere_radius: self
                .allowed_sphere_radius
                .unwrap_or(defaults.allowed_sphere_radius),
            contact_volume_thickness: self
                .contact_volume_thickness
                .unwrap_or(defaults.contact_volume_thickness),
            contact_volume_trapped_fraction: self
                .contact_volume_trapped_fraction
                .unwrap_or(defaults.contact_volume_trapped_fraction),
            grid_spacing: self.grid_spacing.unwrap_or(defaults.grid_spacing),
            neighbor_radius: self.neighbor_radius.unwrap_or(defaults.neighbor_radius),
            obstacle_threshold: self
                .obstacle_threshold
                .unwrap_or(defaults.obstacle_threshold),
        };
        parameters.validate()?;
        Ok(parameters)
    }
}
