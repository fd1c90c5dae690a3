//! Process-wide `tracing` setup for the task tooling.
//!
//! Call [`logger_init`] once at startup. Text and JSON go to stdout; journald
//! entries are tagged with [`SYSLOG_IDENTIFIER`].

mod config;
mod error;
mod format;
mod log;

use tracing::debug;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use format::LoggerFormat;

/// `SYSLOG_IDENTIFIER` attached to journald entries.
pub const SYSLOG_IDENTIFIER: &str = "pvetask";

pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    match cfg.format {
        LoggerFormat::Text => log::Logger::text(cfg),
        LoggerFormat::Json => log::Logger::json(cfg),
        LoggerFormat::Journald => log::Logger::journald(cfg, SYSLOG_IDENTIFIER),
    }?;
    debug!(format = ?cfg.format, level = %cfg.level, "logger ready");
    Ok(())
}
