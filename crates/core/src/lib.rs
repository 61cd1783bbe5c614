//! Chess Insights Core Library
//!
//! Turns PGN games and engine evaluations into accuracy figures, move
//! classifications and ranked highlights per game and per player.

pub mod config;
pub mod engine;
pub mod error;
pub mod insights;
pub mod parser;
pub mod patterns;
pub mod pipeline;
pub mod players;
pub mod position;
pub mod report;

pub use config::AnalysisConfig;
pub use engine::{EngineVerdict, Evaluator, PositionEvaluation, StockfishEngine};
pub use error::{Error, Result};
pub use insights::{Classification, GameAnalysis, MoveRecord};
pub use parser::{parse_pgn_file, parse_pgn_reader, PgnBatch, PgnGame};
pub use patterns::{HighlightCandidate, HighlightKind};
pub use pipeline::{analyze_batch, analyze_game};
pub use report::AnalysisReport;
