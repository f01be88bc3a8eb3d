//! Configuration
//!
//! The config file maps package manager IDs to the argv templates used to
//! install and uninstall packages, names the default manager, and says
//! where the package log lives. It is JSON, loaded once per invocation and
//! treated as read-only afterwards.

mod editor;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ImsError, ImsResult};
use crate::utils::atomic_write;

pub use editor::open_in_editor;

/// Application directory name under the platform config/data dirs
pub const APP_NAME: &str = "ims";

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "ims_config.json";

/// Argv templates for one package manager
///
/// A manager may leave an operation out, e.g. an install-only helper
/// script; resolving the missing operation then fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerCommands {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uninstall: Option<Vec<String>>,
}

impl ManagerCommands {
    pub fn new(install: &[&str], uninstall: &[&str]) -> Self {
        Self {
            install: Some(install.iter().map(|s| s.to_string()).collect()),
            uninstall: Some(uninstall.iter().map(|s| s.to_string()).collect()),
        }
    }
}

/// Typed IMS configuration
///
/// Missing top-level keys fall back to the built-in defaults, so an old
/// config file keeps working when new keys are introduced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `uncommitted.json` and `committed.json`
    pub data_folder: String,
    /// Manager used when a package is given without a `manager:` prefix
    pub default_package_manager: String,
    pub package_managers: BTreeMap<String, ManagerCommands>,
}

impl Default for Config {
    fn default() -> Self {
        let mut package_managers = BTreeMap::new();
        package_managers.insert(
            "apt".to_string(),
            ManagerCommands::new(
                &["sudo", "apt", "install", "-y"],
                &["sudo", "apt", "remove", "-y"],
            ),
        );
        package_managers.insert(
            "flatpak".to_string(),
            ManagerCommands::new(&["flatpak", "install", "-y"], &["flatpak", "uninstall", "-y"]),
        );
        package_managers.insert(
            "pip".to_string(),
            ManagerCommands::new(&["pip", "install"], &["pip", "uninstall", "-y"]),
        );

        Self {
            data_folder: default_data_dir().to_string_lossy().to_string(),
            default_package_manager: "apt".to_string(),
            package_managers,
        }
    }
}

impl Config {
    /// Load the config file, bootstrapping it with defaults if it is missing
    ///
    /// An unreadable or unparsable file is reported and replaced by the
    /// defaults in memory (the file itself is left alone). The result is
    /// validated before it is returned.
    pub fn load<P: AsRef<Path>>(path: P) -> ImsResult<Self> {
        let path = path.as_ref();

        let config = if path.exists() {
            match fs::read_to_string(path)
                .map_err(ImsError::from)
                .and_then(|content| serde_json::from_str::<Config>(&content).map_err(ImsError::from))
            {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config");
                    config
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Could not read config, using defaults"
                    );
                    Config::default()
                }
            }
        } else {
            let config = Config::default();
            config.save(path)?;
            info!(path = %path.display(), "Created default config");
            config
        };

        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ImsResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        atomic_write(path, &content)?;
        Ok(())
    }

    /// Check that the config can resolve commands
    pub fn validate(&self) -> ImsResult<()> {
        if !self.package_managers.contains_key(&self.default_package_manager) {
            return Err(ImsError::InvalidConfig(format!(
                "default package manager '{}' is not defined in package_managers",
                self.default_package_manager
            )));
        }

        for (name, commands) in &self.package_managers {
            let templates = [("install", &commands.install), ("uninstall", &commands.uninstall)];
            for (operation, template) in templates {
                if matches!(template, Some(argv) if argv.is_empty()) {
                    return Err(ImsError::InvalidConfig(format!(
                        "'{}' command for package manager '{}' is empty",
                        operation, name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Resolved data folder, with a leading `~` expanded to the home directory
    pub fn data_dir(&self) -> PathBuf {
        expand_home(&self.data_folder)
    }
}

/// Default config file location (`<config dir>/ims/ims_config.json`)
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(CONFIG_FILE_NAME)
}

/// Default data folder (`<data dir>/ims`)
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(path));
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
