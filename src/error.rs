//! Fatal startup error taxonomy (spec §7). Per-request runtime errors
//! don't exist in steady state; coherence-protocol violations are
//! programmer errors and `panic!`/`assert!` with a diagnostic instead
//! of going through this type.

use std::path::PathBuf;
use thiserror::Error;

/// Errors reading or parsing a trace file.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("could not read trace file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("trace {path}:{line_no}: malformed record: {raw:?}")]
    MalformedLine {
        path: PathBuf,
        line_no: usize,
        raw: String,
    },

    #[error("trace {path}:{line_no}: unknown record kind {raw:?} (expected R, W, or N)")]
    UnknownKind {
        path: PathBuf,
        line_no: usize,
        raw: String,
    },

    #[error("trace {path}:{line_no}: invalid address {raw:?}")]
    BadAddress {
        path: PathBuf,
        line_no: usize,
        raw: String,
    },
}

/// Errors loading simulation configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("assoc and nsets must both be powers of two (got assoc={assoc}, nsets={nsets})")]
    NotPowerOfTwo { assoc: usize, nsets: usize },
}

/// Top-level error type returned by [`crate::run`].
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("trace declares zero processors")]
    ZeroProcessors,
}
