//! Chess engine integration
//!
//! Provides the evaluator seam and a UCI adapter for Stockfish.

pub mod evaluation;
pub mod stockfish;

pub use evaluation::{EngineVerdict, Evaluator, PositionEvaluation, ScoreKind};
pub use stockfish::{EngineError, SearchInfo, StockfishEngine};
