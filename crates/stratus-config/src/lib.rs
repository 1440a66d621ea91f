//! Configuration loading and persistence for stratus.
//!
//! The config lives in `config.toml` under the platform config directory and
//! doubles as the store for the list of tracked cities.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use stratus_core::TemperatureUnit;
use thiserror::Error;
use tracing::{info, warn};

const CONFIG_FILE: &str = "config.toml";

/// Errors raised while reading or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config directory available on this platform")]
    NoConfigDir,

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// A tracked city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    #[serde(default)]
    pub country: String,
}

impl City {
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
        }
    }

    /// Text shown on the card: "Name, Country" or just the name.
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }

    /// Whether this city is called `name`, ignoring case and surrounding
    /// whitespace.
    pub fn same_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }

    /// Query string for the weather service.
    pub fn query(&self) -> String {
        self.label()
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cities shown on the dashboard, in display order.
    pub cities: Vec<City>,
    /// Unit used to display temperatures.
    pub units: TemperatureUnit,
    /// Minutes between weather refreshes.
    pub refresh_minutes: u64,
    /// Draw weather animations behind cards.
    pub animations: bool,
    /// Use generated weather instead of the network.
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cities: default_cities(),
            units: TemperatureUnit::default(),
            refresh_minutes: 30,
            animations: true,
            offline: false,
        }
    }
}

fn default_cities() -> Vec<City> {
    vec![
        City::new("Minsk", "Belarus"),
        City::new("Tallinn", "Estonia"),
        City::new("Saint Petersburg", "Russia"),
        City::new("Beijing", "China"),
        City::new("Harbin", "China"),
        City::new("Ashgabat", "Turkmenistan"),
    ]
}

impl Config {
    /// Default location of the config file.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        ProjectDirs::from("", "", "stratus")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), cities = config.cities.len(), "loaded config");
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path()?)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(io_err)?;
        info!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Track a new city. Returns `false` if a city with the same name (ignoring
    /// case) is already tracked.
    pub fn add_city(&mut self, city: City) -> bool {
        let name = city.name.trim();
        if name.is_empty() {
            return false;
        }
        if self
            .cities
            .iter()
            .any(|existing| existing.same_name(name))
        {
            warn!(city = %city.name, "city already added");
            return false;
        }
        self.cities.push(City {
            name: name.to_string(),
            country: city.country.trim().to_string(),
        });
        true
    }

    /// Stop tracking the city called `name`. Returns `false` if not tracked.
    pub fn remove_city(&mut self, name: &str) -> bool {
        let before = self.cities.len();
        self.cities.retain(|city| !city.same_name(name));
        self.cities.len() != before
    }

    /// Refresh interval, never shorter than one minute.
    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_minutes.max(1) * 60)
    }
}
