//! icerank - ICE/RICE scoring, ranking and quadrant classification for ideas.
//!
//! This library provides the core functionality for the `ice` CLI tool:
//! the idea model with per-field provenance, the pure scoring engine,
//! text/table ingestion, export, and the KDL configuration layer.

pub mod board;
pub mod cli;
pub mod commands;
pub mod config;
pub mod export;
pub mod ingest;
pub mod models;
pub mod scoring;

/// Library-level error type for icerank operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Malformed table: {0}")]
    MalformedTable(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for icerank operations.
pub type Result<T> = std::result::Result<T, Error>;
