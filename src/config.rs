//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--viewer`, `--all`, `--log-file`, etc.)
//! 2. An explicit `--config` file
//! 3. `$DIRPEEK_CONFIG` environment variable (path to config file)
//! 4. Project-local `.dirpeek.toml` in the current working directory
//! 5. Global `~/.config/dirpeek/config.toml`
//! 6. Built-in defaults
//!
//! Configuration is only ever read.

use std::path::{Path, PathBuf};

use serde::Deserialize;

// ── Section configs ──────────────────────────────────────────────────────────

/// General browsing settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Starting directory, `~`-relative or absolute (overridden by CLI positional arg).
    pub start_path: Option<String>,
    /// List hidden entries at startup.
    pub show_hidden: Option<bool>,
}

/// External viewer settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ViewerConfig {
    /// Program run with the selected file as its only argument.
    pub program: Option<String>,
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file path. Logging is off when unset.
    pub file: Option<PathBuf>,
    /// Maximum level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub viewer: ViewerConfig,
    pub logging: LoggingConfig,
}

// ── Default constants ────────────────────────────────────────────────────────

/// Default starting directory.
pub const DEFAULT_START_PATH: &str = "~";
/// Default external viewer.
pub const DEFAULT_VIEWER: &str = "less";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path, which is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("DIRPEEK_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".dirpeek.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("dirpeek").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (with a warning printed to stderr).
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`: `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                start_path: other
                    .general
                    .start_path
                    .clone()
                    .or(self.general.start_path),
                show_hidden: other.general.show_hidden.or(self.general.show_hidden),
            },
            viewer: ViewerConfig {
                program: other.viewer.program.clone().or(self.viewer.program),
            },
            logging: LoggingConfig {
                file: other.logging.file.clone().or(self.logging.file),
                level: other.logging.level.clone().or(self.logging.level),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Walk in reverse so that the highest-priority candidate is merged last.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn start_path(&self) -> &str {
        self.general
            .start_path
            .as_deref()
            .unwrap_or(DEFAULT_START_PATH)
    }

    pub fn show_hidden(&self) -> bool {
        self.general.show_hidden.unwrap_or(false)
    }

    pub fn viewer_program(&self) -> &str {
        self.viewer.program.as_deref().unwrap_or(DEFAULT_VIEWER)
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.logging.file.as_deref()
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.start_path(), "~");
        assert!(!cfg.show_hidden());
        assert_eq!(cfg.viewer_program(), "less");
        assert!(cfg.log_file().is_none());
        assert_eq!(cfg.log_level(), "info");
    }

    #[test]
    fn test_toml_parsing_full() {
        let toml = r#"
[general]
start_path = "/srv"
show_hidden = true

[viewer]
program = "vim"

[logging]
file = "/tmp/dirpeek.log"
level = "debug"
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert_eq!(cfg.start_path(), "/srv");
        assert!(cfg.show_hidden());
        assert_eq!(cfg.viewer_program(), "vim");
        assert_eq!(cfg.log_file(), Some(Path::new("/tmp/dirpeek.log")));
        assert_eq!(cfg.log_level(), "debug");
    }

    #[test]
    fn test_toml_parsing_partial() {
        let toml = r#"
[viewer]
program = "bat"
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert_eq!(cfg.viewer_program(), "bat");
        assert_eq!(cfg.start_path(), "~");
        assert!(!cfg.show_hidden());
    }

    #[test]
    fn test_toml_parsing_empty() {
        let cfg: AppConfig = toml::from_str("").expect("parse failed");
        assert!(!cfg.show_hidden());
        assert_eq!(cfg.viewer_program(), "less");
    }

    #[test]
    fn test_merge_overrides() {
        let base = AppConfig {
            general: GeneralConfig {
                start_path: Some("/base".into()),
                show_hidden: Some(false),
            },
            viewer: ViewerConfig {
                program: Some("less".into()),
            },
            ..Default::default()
        };

        let over = AppConfig {
            general: GeneralConfig {
                show_hidden: Some(true),
                // start_path not set: should keep base
                ..Default::default()
            },
            viewer: ViewerConfig {
                program: Some("most".into()),
            },
            ..Default::default()
        };

        let merged = base.merge(&over);
        assert!(merged.show_hidden());
        assert_eq!(merged.start_path(), "/base");
        assert_eq!(merged.viewer_program(), "most");
    }

    #[test]
    fn test_merge_none_does_not_clear_some() {
        let base = AppConfig {
            logging: LoggingConfig {
                file: Some(PathBuf::from("/tmp/a.log")),
                level: Some("warn".into()),
            },
            ..Default::default()
        };
        let merged = base.merge(&AppConfig::default());
        assert_eq!(merged.log_file(), Some(Path::new("/tmp/a.log")));
        assert_eq!(merged.log_level(), "warn");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("test-config.toml");
        let mut f = std::fs::File::create(&cfg_path).expect("create");
        writeln!(
            f,
            r#"
[general]
show_hidden = true

[viewer]
program = "view"
"#
        )
        .expect("write");

        let cfg = load_file(&cfg_path).expect("load");
        assert!(cfg.show_hidden());
        assert_eq!(cfg.viewer_program(), "view");
        assert_eq!(cfg.start_path(), "~");
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_file(Path::new("/nonexistent/config.toml")).is_none());
    }

    #[test]
    fn test_load_invalid_toml_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("bad.toml");
        std::fs::write(&cfg_path, "this is { not valid toml").expect("write");
        assert!(load_file(&cfg_path).is_none());
    }

    #[test]
    fn test_load_with_cli_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("config.toml");
        std::fs::write(
            &cfg_path,
            r#"
[general]
show_hidden = true

[viewer]
program = "less"
"#,
        )
        .expect("write");

        let cli_overrides = AppConfig {
            viewer: ViewerConfig {
                program: Some("nano".into()),
            },
            ..Default::default()
        };

        let cfg = AppConfig::load(Some(&cfg_path), Some(&cli_overrides));
        assert_eq!(cfg.viewer_program(), "nano");
        assert!(cfg.show_hidden());
    }
}
