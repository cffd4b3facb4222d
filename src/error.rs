//! Crate-wide error type.
//!
//! Most of these are absorbed inside the engine: an unresolvable note is just
//! silence, an unknown control is an ignored event. They surface as values so
//! callers and tests can see what was skipped.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unresolvable note: {0:?}")]
    UnresolvableNote(String),

    #[error("unknown control: {0:?}")]
    UnknownControl(String),

    #[error("audio backend unavailable: {0}")]
    AudioBackendUnavailable(String),

    #[error("invalid tonality {tonality:?}: {reason}")]
    InvalidTonality { tonality: String, reason: String },

    #[cfg(feature = "serde")]
    #[error("config: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
