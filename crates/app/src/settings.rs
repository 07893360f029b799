use anyhow::Context;
use mathocr_ocr::ImageSource;
use mathocr_storage::StorageConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = "settings.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrSettings {
    /// Tesseract `tessdata` directory; the engine default when unset.
    pub data_path: Option<String>,
    pub lang: String,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            data_path: None,
            lang: "eng".into(),
        }
    }
}

/// Persisted toggles and paths, stored as TOML in the data directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub image_source: ImageSource,
    /// Folder watched for new pictures when the source is `camera`.
    pub capture_dir: PathBuf,
    pub storage: StorageConfig,
    #[serde(default)]
    pub ocr: OcrSettings,
}

impl Settings {
    pub fn defaults(data_dir: &Path) -> Self {
        Self {
            image_source: ImageSource::default(),
            capture_dir: data_dir.join("captures"),
            storage: StorageConfig::in_dir(data_dir),
            ocr: OcrSettings::default(),
        }
    }

    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(SETTINGS_FILE_NAME)
    }

    /// Read settings from `data_dir`, falling back to defaults when none exist.
    pub fn load(data_dir: &Path) -> anyhow::Result<Self> {
        let path = Self::path(data_dir);
        if !path.exists() {
            return Ok(Self::defaults(data_dir));
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save(&self, data_dir: &Path) -> anyhow::Result<()> {
        let path = Self::path(data_dir);
        let content = toml::to_string_pretty(self).context("serializing settings")?;
        std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
