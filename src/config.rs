use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::buttons::{ButtonConfig, ButtonResolver};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Label of the next button on a terminal step
    #[serde(default = "default_finish_label")]
    pub finish_label: String,
    /// Wizard-wide default button layout; steps override it per key
    #[serde(default = "ButtonConfig::wizard_default")]
    pub buttons: ButtonConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

fn default_finish_label() -> String {
    "Finish".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,

    /// Directory for log files (default: platform data dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Event poll interval for the terminal shell
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
}

fn default_tick_rate() -> u64 {
    250
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
        }
    }
}

impl Config {
    /// Per-user config file, `~/.config/stepgraph/config.toml` on Linux
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stepgraph").join("config.toml"))
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let user_config = Self::user_config_path().filter(|p| p.exists());
        Self::load_from(user_config.as_deref(), config_path)
    }

    /// Layer embedded defaults, an optional user file, an optional explicit
    /// file and `STEPGRAPH__*` environment variables, later sources winning
    pub fn load_from(user_config: Option<&Path>, config_path: Option<&str>) -> Result<Self> {
        Self::load_layers(user_config, config_path, env_source())
    }

    fn load_layers(
        user_config: Option<&Path>,
        config_path: Option<&str>,
        env: config::Environment,
    ) -> Result<Self> {
        // Start with embedded defaults so the wizard works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        if let Some(path) = user_config {
            builder = builder.add_source(config::File::from(path));
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder.add_source(env);

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Save config as TOML, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_str = self.to_toml()?;
        std::fs::write(path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config to TOML")
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        match &self.logging.dir {
            Some(dir) => {
                let path = PathBuf::from(dir);
                if path.is_absolute() {
                    path
                } else {
                    std::env::current_dir().unwrap_or_default().join(path)
                }
            }
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from(".stepgraph"))
                .join("stepgraph")
                .join("logs"),
        }
    }

    /// Button resolver built from the configured defaults
    pub fn button_resolver(&self) -> ButtonResolver {
        ButtonResolver::new(self.buttons.clone()).with_finish_label(self.finish_label.clone())
    }
}

/// `STEPGRAPH__UI__TICK_RATE_MS=100` sets `ui.tick_rate_ms`
fn env_source() -> config::Environment {
    config::Environment::with_prefix("STEPGRAPH")
        .separator("__")
        .try_parsing(true)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            finish_label: default_finish_label(),
            buttons: ButtonConfig::wizard_default(),
            logging: LoggingConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons::{ButtonKind, ButtonPosition};
    use crate::wizard::WizardContext;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_files() {
        let config = Config::load_from(None, None).unwrap();

        assert_eq!(config.finish_label, "Finish");
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.to_file);
        assert_eq!(config.ui.tick_rate_ms, 250);
        assert_eq!(config.buttons, ButtonConfig::wizard_default());
    }

    #[test]
    fn test_explicit_file_overrides_single_button_field() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wizard.toml");
        std::fs::write(
            &path,
            "finish_label = \"Done\"\n\n[buttons.next]\nlabel = \"Go\"\n",
        )
        .unwrap();

        let config = Config::load_from(None, path.to_str()).unwrap();
        let next = config.buttons.next.as_ref().unwrap();

        assert_eq!(config.finish_label, "Done");
        assert_eq!(next.label.as_deref(), Some("Go"));
        assert_eq!(next.position, Some(ButtonPosition::Right));
        assert!(config.buttons.previous.is_some());
    }

    #[test]
    fn test_explicit_file_wins_over_user_file() {
        let temp_dir = TempDir::new().unwrap();
        let user = temp_dir.path().join("user.toml");
        let explicit = temp_dir.path().join("explicit.toml");
        std::fs::write(&user, "finish_label = \"User\"\n[ui]\ntick_rate_ms = 100\n").unwrap();
        std::fs::write(&explicit, "finish_label = \"Explicit\"\n").unwrap();

        let config = Config::load_from(Some(&user), explicit.to_str()).unwrap();

        assert_eq!(config.finish_label, "Explicit");
        assert_eq!(config.ui.tick_rate_ms, 100);
    }

    #[test]
    fn test_env_layer_wins_over_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wizard.toml");
        std::fs::write(&path, "finish_label = \"File\"\n").unwrap();

        let vars = std::collections::HashMap::from([
            ("STEPGRAPH__FINISH_LABEL".to_string(), "Ship it".to_string()),
            ("STEPGRAPH__UI__TICK_RATE_MS".to_string(), "50".to_string()),
            ("STEPGRAPH__BUTTONS__NEXT__LABEL".to_string(), "Onward".to_string()),
        ]);
        let env = env_source().source(Some(vars));

        let config = Config::load_layers(None, path.to_str(), env).unwrap();
        let next = config.buttons.next.as_ref().unwrap();

        assert_eq!(config.finish_label, "Ship it");
        assert_eq!(config.ui.tick_rate_ms, 50);
        assert_eq!(next.label.as_deref(), Some("Onward"));
        assert_eq!(next.position, Some(ButtonPosition::Right));
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.finish_label = "Submit".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(None, path.to_str()).unwrap();
        assert_eq!(loaded.finish_label, "Submit");
    }

    #[test]
    fn test_logs_path_uses_configured_dir() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.logging.dir = Some(temp_dir.path().to_string_lossy().to_string());

        assert_eq!(config.logs_path(), temp_dir.path());
    }

    #[test]
    fn test_button_resolver_uses_finish_label() {
        let mut config = Config::default();
        config.finish_label = "Complete".to_string();

        let buttons = config
            .button_resolver()
            .resolve(None, &WizardContext::new("a"), true);

        assert_eq!(buttons.find(ButtonKind::Next).unwrap().label, "Complete");
    }
}
