use thiserror::Error;

/// Failure to install the process-wide `tracing` subscriber.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format '{0}', use text, json or journald")]
    InvalidFormat(String),
    #[error("journald logging needs a linux build with the `journald` feature")]
    JournaldNotSupported,
    #[error("a tracing subscriber is already installed for this process")]
    AlreadyInitialized,
    #[error("cannot install tracing subscriber: {0}")]
    InitializationFailed(String),
    #[error("cannot connect to journald as '{identifier}': {reason}")]
    Journald { identifier: String, reason: String },
    #[error("invalid log filter '{0}' (from the level setting or PVE_LOG)")]
    InvalidLogLevel(String),
}
