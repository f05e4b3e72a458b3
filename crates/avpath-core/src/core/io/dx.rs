use super::traits::VolumeFile;
use crate::core::grid::field::DensityField;
use itertools::iproduct;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DxError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("field data length {len} does not match dimensions {dims:?}")]
    DimensionMismatch { len: usize, dims: [usize; 3] },
}

/// Writer for the OpenDX scalar-field format.
///
/// OpenDX stores the grid z fastest, so the x-fastest field data is reordered
/// on the way out. The `origin` record is the center of voxel `(0, 0, 0)`,
/// matching the in-memory convention.
pub struct DxFile;

impl VolumeFile for DxFile {
    type Error = DxError;

    fn write_to(field: &DensityField, writer: &mut impl Write) -> Result<(), Self::Error> {
        if !field.is_consistent() {
            return Err(DxError::DimensionMismatch {
                len: field.data.len(),
                dims: field.dims,
            });
        }

        let [nx, ny, nz] = field.dims;
        let o = field.origin;
        let s = field.spacing;

        writeln!(writer, "object 1 class gridpositions counts {nx} {ny} {nz}")?;
        writeln!(writer, "origin {:.6} {:.6} {:.6}", o.x, o.y, o.z)?;
        writeln!(writer, "delta {s:.6} 0.000000 0.000000")?;
        writeln!(writer, "delta 0.000000 {s:.6} 0.000000")?;
        writeln!(writer, "delta 0.000000 0.000000 {s:.6}")?;
        writeln!(writer, "object 2 class gridconnections counts {nx} {ny} {nz}")?;
        writeln!(
            writer,
            "object 3 class array type double rank 0 items {} data follows",
            field.voxel_count()
        )?;

        let mut on_line = 0;
        for (x, y, z) in iproduct!(0..nx, 0..ny, 0..nz) {
            write!(writer, "{:.6e}", field.value_at(x, y, z))?;
            on_line += 1;
            if on_line == 3 {
                writeln!(writer)?;
                on_line = 0;
            } else {
                write!(writer, " ")?;
            }
        }
        if on_line != 0 {
            writeln!(writer)?;
        }

        writeln!(writer, "attribute \"dep\" string \"positions\"")?;
        writeln!(writer, "object \"density\" class field")?;
        writeln!(writer, "component \"positions\" value 1")?;
        writeln!(writer, "component \"connections\" value 2")?;
        writeln!(writer, "component \"data\" value 3")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn sample_field() -> DensityField {
        DensityField {
            dims: [2, 2, 2],
            origin: Point3::new(-1.0, 0.0, 1.0),
            spacing: 0.5,
            data: (0..8).map(f64::from).collect(),
        }
    }

    #[test]
    fn writes_expected_header_records() {
        let mut buffer = Vec::new();
        DxFile::write_to(&sample_field(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("object 1 class gridpositions counts 2 2 2"));
        assert!(text.contains("origin -1.000000 0.000000 1.000000"));
        assert!(text.contains("delta 0.500000 0.000000 0.000000"));
        assert!(text.contains("items 8 data follows"));
    }

    #[test]
    fn data_section_is_z_fastest() {
        let mut buffer = Vec::new();
        DxFile::write_to(&sample_field(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let values: Vec<f64> = text
            .lines()
            .skip(7)
            .take(3)
            .flat_map(|line| line.split_whitespace())
            .map(|token| token.parse().unwrap())
            .collect();
        // In-memory order is x fastest, so (x, y, z) = (0, 0, 1) is item 4;
        // in the file, z varies fastest and that voxel comes second.
        assert_eq!(values, vec![0.0, 4.0, 2.0, 6.0, 1.0, 5.0, 3.0, 7.0]);
    }

    #[test]
    fn inconsistent_field_is_rejected() {
        let field = DensityField {
            dims: [2, 2, 2],
            origin: Point3::origin(),
            spacing: 1.0,
            data: vec![0.0; 3],
        };
        let mut buffer = Vec::new();
        assert!(matches!(
            DxFile::write_to(&field, &mut buffer),
            Err(DxError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn write_to_path_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.dx");
        DxFile::write_to_path(&sample_field(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("object \"density\" class field"));
    }
}
