mod audio_file;
mod image_file;

pub use audio_file::AudioInfo;
pub use image_file::{AverageColor, ImageInfo};

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use tracing::{Level, instrument};

use crate::{error::ProbeError, summary::SummaryRow};

/// Closed set of media variants the probe knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file on disk, not yet analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    path: PathBuf,
    name: String,
    kind: MediaKind,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>, kind: MediaKind) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Self { path, name, kind }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Reads and decodes the file. A descriptor is only produced when every field
    /// could be computed.
    #[instrument(level = Level::DEBUG, skip(self), fields(file = %self.name))]
    pub fn analyze(&self) -> Result<Descriptor, ProbeError> {
        let info = match self.kind {
            MediaKind::Image => MediaInfo::Image(image_file::analyze(&self.path)?),
            MediaKind::Audio => MediaInfo::Audio(audio_file::analyze(&self.path)?),
        };

        Ok(Descriptor {
            path: self.path.clone(),
            name: self.name.clone(),
            info,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaInfo {
    Image(ImageInfo),
    Audio(AudioInfo),
}

/// Extracted metadata of one successfully analyzed file.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    pub path: PathBuf,
    pub name: String,
    pub info: MediaInfo,
}

impl Descriptor {
    pub fn kind(&self) -> MediaKind {
        match self.info {
            MediaInfo::Image(_) => MediaKind::Image,
            MediaInfo::Audio(_) => MediaKind::Audio,
        }
    }

    pub fn summary(&self) -> SummaryRow {
        let mut row = SummaryRow::new()
            .with("type", self.kind().as_str())
            .with("name", self.name.as_str());

        match &self.info {
            MediaInfo::Image(info) => info.summarize(&mut row),
            MediaInfo::Audio(info) => info.summarize(&mut row),
        }

        row
    }
}

/// Variant-specific part of a summary row.
pub trait Summarize {
    fn summarize(&self, row: &mut SummaryRow);
}

/// On-disk length of `path`, refusing anything that isn't a regular file.
pub(crate) fn regular_file_size(path: &Path) -> Result<u64, ProbeError> {
    let meta = fs::metadata(path).map_err(|e| ProbeError::io(path, e))?;
    if !meta.is_file() {
        return Err(ProbeError::NotAFile(path.to_path_buf()));
    }
    Ok(meta.len())
}

pub(crate) fn size_kb(size_bytes: u64) -> f64 {
    size_bytes as f64 / 1024.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_final_segment() {
        let file = MediaFile::new("some/dir/photo.PNG", MediaKind::Image);
        assert_eq!(file.name(), "photo.PNG");
        assert_eq!(file.kind(), MediaKind::Image);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = MediaFile::new(dir.path().join("nope.png"), MediaKind::Image);

        let err = file.analyze().unwrap_err();
        assert!(matches!(err, ProbeError::Io { .. }));
        assert!(!err.is_decode());
    }

    #[test]
    fn directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("album.wav");
        std::fs::create_dir(&sub).unwrap();

        let err = MediaFile::new(&sub, MediaKind::Audio).analyze().unwrap_err();
        assert!(matches!(err, ProbeError::NotAFile(p) if p == sub));
    }
}
