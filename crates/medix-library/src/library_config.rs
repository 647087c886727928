use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use derive_builder::Builder;
use medix_probe::MediaKind;
use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    extensions::{ExtensionTable, normalize_extension},
};

const MIN_CHART_WIDTH: u32 = 200;
const MIN_CHART_HEIGHT: u32 = 150;

#[derive(Debug, Clone, Serialize, Deserialize, Builder, PartialEq, Eq)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct ChartConfig {
    pub enabled: bool,
    pub width: u32,
    pub height: u32,
    /// Opens each written chart in the system viewer when a display is available.
    pub show: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            enabled: true,
            width: 1000,
            height: 500,
            show: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Builder, PartialEq, Eq)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct MedixConfig {
    pub input_dir: PathBuf,
    pub report_path: PathBuf,
    pub chart_dir: PathBuf,
    pub extra_image_extensions: Vec<String>,
    pub extra_audio_extensions: Vec<String>,
    /// Deterministic row order; the scan itself follows the filesystem.
    pub sort_by_name: bool,
    pub charts: ChartConfig,
}

impl Default for MedixConfig {
    fn default() -> Self {
        MedixConfig {
            input_dir: PathBuf::from("media"),
            report_path: PathBuf::from("media_report.csv"),
            chart_dir: PathBuf::from("."),
            extra_image_extensions: Vec::new(),
            extra_audio_extensions: Vec::new(),
            sort_by_name: false,
            charts: ChartConfig::default(),
        }
    }
}

impl MedixConfig {
    /// Defaults, then the TOML file, then `MEDIX_*` environment variables
    /// (`MEDIX_CHARTS__WIDTH` for nested keys).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_string_lossy().into_owned();
        Self::load(Some(&path))
    }

    /// Defaults overridden by `MEDIX_*` environment variables only.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    fn load(file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&MedixConfig::default())?);
        if let Some(path) = file {
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        let cfg = builder
            .add_source(
                Environment::with_prefix("MEDIX")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("extra_image_extensions")
                    .with_list_parse_key("extra_audio_extensions"),
            )
            .build()?;

        let mut mc = cfg.try_deserialize::<MedixConfig>()?;
        mc.validate()?;
        Ok(mc)
    }

    /// Rejects unusable chart sizes and normalizes the extra extensions.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.charts.width < MIN_CHART_WIDTH || self.charts.height < MIN_CHART_HEIGHT {
            return Err(ConfigError::Invalid(format!(
                "charts must be at least {MIN_CHART_WIDTH}x{MIN_CHART_HEIGHT}, got {}x{}",
                self.charts.width, self.charts.height
            )));
        }

        for list in [&mut self.extra_image_extensions, &mut self.extra_audio_extensions] {
            *list = list
                .iter()
                .map(|ext| normalize_extension(ext))
                .filter(|ext| !ext.is_empty())
                .collect();
        }

        Ok(())
    }

    /// Effective configuration as TOML, loadable again with [`MedixConfig::from_file`].
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn extension_table(&self) -> ExtensionTable {
        let mut table = ExtensionTable::default();
        table.register(MediaKind::Image, &self.extra_image_extensions);
        table.register(MediaKind::Audio, &self.extra_audio_extensions);
        table
    }
}
