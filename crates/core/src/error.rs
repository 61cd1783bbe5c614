//! Error types for chess-insights-core

use thiserror::Error;

use crate::engine::EngineError;
use crate::parser::PgnError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("PGN error: {0}")]
    Pgn(#[from] PgnError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Illegal move '{san}' at ply {ply}")]
    IllegalMove { ply: usize, san: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
