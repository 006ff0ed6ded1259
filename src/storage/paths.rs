//! Application paths for config and persisted state.

use directories::ProjectDirs;
use std::path::PathBuf;

/// Application paths.
pub struct AppPaths {
    /// Configuration directory.
    pub config: PathBuf,
    /// Persisted state directory.
    pub state: PathBuf,
}

impl AppPaths {
    /// Create paths for the modelmux application.
    #[must_use]
    pub fn new() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("com", "modelmux", "modelmux") {
            Self {
                config: proj_dirs.config_dir().to_path_buf(),
                state: proj_dirs.data_dir().to_path_buf(),
            }
        } else {
            // Fallback to home directory
            let home = directories::BaseDirs::new()
                .map_or_else(|| PathBuf::from("."), |d| d.home_dir().to_path_buf());
            Self {
                config: home.join(".config/modelmux"),
                state: home.join(".local/share/modelmux"),
            }
        }
    }

    /// Path to the config file.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }

    /// Path to the persisted cooldown store.
    #[must_use]
    pub fn cooldown_file(&self) -> PathBuf {
        self.state.join("cooldowns.json")
    }

    /// Path to the last-selection record consulted by `skip`.
    #[must_use]
    pub fn last_selection_file(&self) -> PathBuf {
        self.state.join("last-selection.json")
    }

    /// Path to the host's active-model record.
    #[must_use]
    pub fn active_model_file(&self) -> PathBuf {
        self.state.join("active-model.json")
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
