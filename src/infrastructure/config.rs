use crate::domain::{config::HarnessConfig, error::{HarnessError, HarnessResult}};
use std::fs;
use std::path::{Path, PathBuf};

const PROJECT_DIR: &str = ".tunnel-harness";
const CONFIG_FILE: &str = "config.toml";

/// Configuration manager
pub struct ConfigManager {
    global_config_path: Option<PathBuf>,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create new configuration manager rooted at the current directory
    pub fn new() -> Self {
        let project_config_path = std::env::current_dir()
            .ok()
            .and_then(|dir| Self::find_project_config_path(&dir));

        Self {
            global_config_path: Self::get_global_config_path(),
            project_config_path,
        }
    }

    /// Create a manager with explicit file locations
    pub fn with_paths(global: Option<PathBuf>, project: Option<PathBuf>) -> Self {
        Self {
            global_config_path: global,
            project_config_path: project,
        }
    }

    /// Load configuration, layering the project file over the global one.
    ///
    /// Layering is per key inside each section, so a project file that only
    /// sets `[echo] bind` keeps the global `[http]` section intact.
    pub fn load_config(&self) -> HarnessResult<HarnessConfig> {
        let mut merged = toml::Table::new();

        for path in [&self.global_config_path, &self.project_config_path]
            .into_iter()
            .flatten()
        {
            if path.exists() {
                let layer = Self::read_table(path)?;
                merge_tables(&mut merged, layer);
            }
        }

        toml::Value::Table(merged)
            .try_into()
            .map_err(|e| HarnessError::Config {
                message: format!("Invalid configuration: {}", e),
            })
    }

    /// Global configuration path, `<home>/.config/tunnel-harness/config.toml`
    fn get_global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("tunnel-harness").join(CONFIG_FILE))
    }

    /// Find project configuration path by walking up directory tree
    pub fn find_project_config_path(start: &Path) -> Option<PathBuf> {
        let mut path = start;

        loop {
            let config_path = path.join(PROJECT_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }

    fn read_table(path: &Path) -> HarnessResult<toml::Table> {
        let content = fs::read_to_string(path).map_err(|e| HarnessError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| HarnessError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(&self, path: &Path) -> HarnessResult<HarnessConfig> {
        let content = fs::read_to_string(path).map_err(|e| HarnessError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| HarnessError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to specific path
    pub fn save_config_to_path(&self, path: &Path, config: &HarnessConfig) -> HarnessResult<()> {
        let content = toml::to_string_pretty(config).map_err(|e| HarnessError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| HarnessError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Create default project configuration under `path/.tunnel-harness`
    pub fn init_project_config(&self, path: &Path) -> HarnessResult<PathBuf> {
        let config_dir = path.join(PROJECT_DIR);
        let config_file = config_dir.join(CONFIG_FILE);

        if config_file.exists() {
            return Err(HarnessError::Config {
                message: "Project configuration already exists".to_string(),
            });
        }

        fs::create_dir_all(&config_dir).map_err(|e| HarnessError::Config {
            message: format!("Failed to create {} directory: {}", PROJECT_DIR, e),
        })?;

        self.save_config_to_path(&config_file, &HarnessConfig::default())?;

        Ok(config_file)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_tables(base: &mut toml::Table, layer: toml::Table) {
    for (key, value) in layer {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, toml::Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}
