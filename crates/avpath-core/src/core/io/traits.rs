use crate::core::grid::field::DensityField;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Defines the interface for writing volumetric map formats.
///
/// Implementors serialize a [`DensityField`] (voxel size, origin, dense float
/// grid) into a format-specific byte layout. The field's in-memory ordering is
/// always x fastest; implementors reorder as their format requires.
pub trait VolumeFile {
    /// The error type for write operations.
    type Error: Error + From<io::Error>;

    /// Writes a density field to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is malformed or an I/O operation fails.
    fn write_to(field: &DensityField, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Writes a density field to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(field: &DensityField, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(field, &mut writer)
    }
}
