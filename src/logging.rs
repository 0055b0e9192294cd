//! File logging through `log4rs`.
//!
//! The terminal belongs to the UI, so log records only ever go to a file and
//! only when one is configured.

use std::path::Path;
use std::str::FromStr;

use log::LevelFilter;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::config::AppConfig;
use crate::error::{AppError, Result};

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} - {l} - {m}{n}";

/// Install the global logger described by `config`. No-op without a log file.
pub fn init(config: &AppConfig) -> Result<()> {
    let Some(path) = config.log_file() else {
        return Ok(());
    };
    let level = parse_level(config.log_level())?;
    log4rs::init_config(build_config(path, level)?)
        .map_err(|e| AppError::Logging(e.to_string()))?;
    log::info!("logging to {} at {}", path.display(), level);
    Ok(())
}

fn parse_level(level: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(level)
        .map_err(|_| AppError::Config(format!("unknown log level {level:?}")))
}

fn build_config(path: &Path, level: LevelFilter) -> Result<Config> {
    let appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(path)
        .map_err(|e| AppError::Logging(format!("{}: {e}", path.display())))?;
    Config::builder()
        .appender(Appender::builder().build("file", Box::new(appender)))
        .build(Root::builder().appender("file").build(level))
        .map_err(|e| AppError::Logging(e.to_string()))
}
