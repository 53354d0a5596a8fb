//! Error types shared across the crate.
//!
//! The animation core itself never fails: misuse degrades to a logged no-op.
//! Errors only come out of parsing textual configuration and out of the
//! content and contact boundaries.

use thiserror::Error;

/// Errors produced while parsing ease names, trigger thresholds and timeline
/// positions.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("unknown ease `{0}`")]
    UnknownEase(String),

    #[error("invalid parameters for ease `{name}`: {params}")]
    InvalidEaseParams { name: String, params: String },

    #[error("invalid trigger threshold `{0}`, expected `<edge> <percent>%` such as `top 80%`")]
    InvalidThreshold(String),

    #[error("invalid timeline position `{0}`")]
    InvalidPosition(String),
}

/// Errors produced while loading the embedded site content.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("malformed content document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u32 },
}
