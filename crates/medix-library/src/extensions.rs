use std::{collections::HashMap, ffi::OsStr, path::Path};

use medix_probe::MediaKind;
use serde::{Deserialize, Serialize};

/// Extensions recognised out of the box.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SupportedExtension {
    Jpg,
    Jpeg,
    Png,
    Bmp,
    Wav,
    Mp3,
}

impl SupportedExtension {
    pub const ALL: &'static [SupportedExtension] = &[
        SupportedExtension::Jpg,
        SupportedExtension::Jpeg,
        SupportedExtension::Png,
        SupportedExtension::Bmp,
        SupportedExtension::Wav,
        SupportedExtension::Mp3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedExtension::Jpg => "jpg",
            SupportedExtension::Jpeg => "jpeg",
            SupportedExtension::Png => "png",
            SupportedExtension::Bmp => "bmp",
            SupportedExtension::Wav => "wav",
            SupportedExtension::Mp3 => "mp3",
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            SupportedExtension::Jpg | SupportedExtension::Jpeg | SupportedExtension::Png | SupportedExtension::Bmp => {
                MediaKind::Image
            }
            SupportedExtension::Wav | SupportedExtension::Mp3 => MediaKind::Audio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Media(MediaKind),
    /// Not an error: the entry is simply skipped.
    Unsupported,
}

/// Lowercase extension → media kind. Classification never looks at file contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionTable {
    kinds: HashMap<String, MediaKind>,
}

impl Default for ExtensionTable {
    fn default() -> Self {
        let kinds = SupportedExtension::ALL
            .iter()
            .map(|ext| (ext.as_str().to_string(), ext.kind()))
            .collect();
        Self { kinds }
    }
}

impl ExtensionTable {
    pub fn empty() -> Self {
        Self { kinds: HashMap::new() }
    }

    /// Registers extra extensions; `.TIFF`, `tiff` and `Tiff` all register `tiff`.
    pub fn register<I, S>(&mut self, kind: MediaKind, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ext in extensions {
            let ext = normalize_extension(ext.as_ref());
            if !ext.is_empty() {
                self.kinds.insert(ext, kind);
            }
        }
    }

    pub fn classify_extension(&self, ext: &str) -> Classification {
        self.kinds
            .get(&ext.to_ascii_lowercase())
            .map_or(Classification::Unsupported, |kind| Classification::Media(*kind))
    }

    pub fn classify(&self, path: &Path) -> Classification {
        match path.extension().and_then(OsStr::to_str) {
            Some(ext) => self.classify_extension(ext),
            None => Classification::Unsupported,
        }
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

pub(crate) fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_case_insensitive() {
        let table = ExtensionTable::default();

        assert_eq!(table.classify(Path::new("x/a.PNG")), Classification::Media(MediaKind::Image));
        assert_eq!(table.classify(Path::new("b.JpEg")), Classification::Media(MediaKind::Image));
        assert_eq!(table.classify(Path::new("c.Mp3")), Classification::Media(MediaKind::Audio));
        assert_eq!(table.classify(Path::new("d.txt")), Classification::Unsupported);
        assert_eq!(table.classify(Path::new("README")), Classification::Unsupported);
        assert_eq!(table.len(), SupportedExtension::ALL.len());
    }

    #[test]
    fn register_normalizes() {
        let mut table = ExtensionTable::empty();
        table.register(MediaKind::Image, [".TIFF", " gif "]);

        assert_eq!(table.classify_extension("tiff"), Classification::Media(MediaKind::Image));
        assert_eq!(table.classify_extension("GIF"), Classification::Media(MediaKind::Image));
        assert_eq!(table.classify_extension("png"), Classification::Unsupported);
    }
}
