//! HPD-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, HotplugError>;

/// Top-level error type for hotplugd.
#[derive(Debug, Error)]
pub enum HotplugError {
    #[error("[HPD-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[HPD-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[HPD-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[HPD-2001] uevent socket setup failed during {stage}: {source}")]
    Socket {
        stage: &'static str,
        #[source]
        source: nix::Error,
    },

    #[error("[HPD-2002] signal setup failed for {signal}: {source}")]
    SignalSetup {
        signal: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("[HPD-2003] daemonization failed: {source}")]
    Daemonize {
        #[source]
        source: nix::Error,
    },

    #[error("[HPD-2004] cold-plug scan aborted at {path}: {source}")]
    ColdplugAborted {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[HPD-3001] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[HPD-3002] uevent receive failed: {source}")]
    Receive {
        #[source]
        source: nix::Error,
    },

    #[error("[HPD-3003] wait for wakeup failed: {source}")]
    Wait {
        #[source]
        source: nix::Error,
    },

    #[error("[HPD-3004] could not spawn {program} for alias {alias}: {source}")]
    Spawn {
        program: String,
        alias: String,
        #[source]
        source: std::io::Error,
    },

    #[error("[HPD-3005] {call} failed for {path}: {source}")]
    Syscall {
        call: &'static str,
        path: PathBuf,
        #[source]
        source: nix::Error,
    },
}

impl HotplugError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "HPD-1001",
            Self::MissingConfig { .. } => "HPD-1002",
            Self::ConfigParse { .. } => "HPD-1003",
            Self::Socket { .. } => "HPD-2001",
            Self::SignalSetup { .. } => "HPD-2002",
            Self::Daemonize { .. } => "HPD-2003",
            Self::ColdplugAborted { .. } => "HPD-2004",
            Self::Io { .. } => "HPD-3001",
            Self::Receive { .. } => "HPD-3002",
            Self::Wait { .. } => "HPD-3003",
            Self::Spawn { .. } => "HPD-3004",
            Self::Syscall { .. } => "HPD-3005",
        }
    }

    /// Whether the failure ends the daemon. A spawn failure only costs one
    /// module load.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Spawn { .. })
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<toml::de::Error> for HotplugError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
