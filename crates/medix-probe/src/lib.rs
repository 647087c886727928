//! Crate `medix_probe`: decodes a single image or audio file and describes it as a flat
//! summary row.

pub mod error;
pub mod media;
pub mod summary;

use std::path::PathBuf;

pub use error::ProbeError;
pub use media::{AudioInfo, AverageColor, Descriptor, ImageInfo, MediaFile, MediaInfo, MediaKind, Summarize};
pub use summary::{SummaryRow, Value};

/// Analyzes `path` as `kind` in one call.
pub fn probe(path: impl Into<PathBuf>, kind: MediaKind) -> Result<Descriptor, ProbeError> {
    MediaFile::new(path, kind).analyze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn probe_builds_summary_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        RgbImage::from_pixel(100, 50, Rgb([255, 0, 0])).save(&path).unwrap();

        let row = probe(&path, MediaKind::Image).unwrap().summary();
        let names: Vec<_> = row.field_names().collect();
        assert_eq!(
            names,
            vec![
                "type", "name", "resolution", "width", "height", "channels", "size_kb", "color_r", "color_g",
                "color_b"
            ]
        );
        assert_eq!(row.get_str("type"), Some("image"));
        assert_eq!(row.get_str("name"), Some("a.png"));
        assert_eq!(row.get_f64("color_r"), Some(255.0));
    }
}
