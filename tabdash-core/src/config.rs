use crate::canvas::{DEFAULT_WIDGET_SIZE, DragPersistence};
use crate::store::{DEFAULT_MAX_QUICK_LINKS, StoreOptions};
use crate::widget::Size;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Config directory not found")]
    NoConfigDir,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Settings document location, `<data_dir>/tabdash/settings.json` when unset
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Write the settings document on every drag move instead of only at drop
    pub persist_on_drag_tick: bool,
    pub default_widget_width: u16,
    pub default_widget_height: u16,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            persist_on_drag_tick: false,
            default_widget_width: DEFAULT_WIDGET_SIZE.width,
            default_widget_height: DEFAULT_WIDGET_SIZE.height,
        }
    }
}

impl CanvasConfig {
    pub fn drag_persistence(&self) -> DragPersistence {
        if self.persist_on_drag_tick {
            DragPersistence::EveryTick
        } else {
            DragPersistence::OnDrop
        }
    }

    pub fn default_widget_size(&self) -> Size {
        Size::new(self.default_widget_width.max(4), self.default_widget_height.max(3))
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub max_quick_links: usize,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            max_quick_links: DEFAULT_MAX_QUICK_LINKS,
        }
    }
}

impl SettingsConfig {
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            max_quick_links: self.max_quick_links,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Log file, `<data_dir>/tabdash/tabdash.log` when unset
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl ConfigFile {
    pub fn load() -> Result<Self, ConfigError> {
        // Priority: ./tabdash.toml -> ~/.config/tabdash/tabdash.toml -> default
        let paths = [
            std::env::current_dir()?.join("tabdash.toml"),
            dirs::config_dir()
                .ok_or(ConfigError::NoConfigDir)?
                .join("tabdash/tabdash.toml"),
        ];

        for path in paths {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(ConfigError::Parse)
    }
}
