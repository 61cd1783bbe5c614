//! Engine evaluation types and the evaluator seam

use std::fmt;

use serde::{Deserialize, Serialize};
use shakmaty::Color;

use super::EngineError;

/// Which kind of score the engine reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreKind {
    /// Centipawn score
    #[serde(rename = "cp")]
    Centipawn,
    /// Forced mate in N moves
    Mate,
    /// Anything the engine emitted that we could not read
    #[serde(other)]
    Unknown,
}

/// A single engine reading, always from White's perspective.
///
/// For `Mate`, a positive value means White mates, negative means Black mates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionEvaluation {
    pub kind: ScoreKind,
    pub value: i32,
}

impl PositionEvaluation {
    pub fn centipawns(cp: i32) -> Self {
        Self { kind: ScoreKind::Centipawn, value: cp }
    }

    pub fn mate(moves: i32) -> Self {
        Self { kind: ScoreKind::Mate, value: moves }
    }

    pub fn unknown() -> Self {
        Self { kind: ScoreKind::Unknown, value: 0 }
    }

    /// The reading recorded for a position where `winner` just delivered mate.
    pub fn checkmate_by(winner: Color) -> Self {
        Self::mate(if winner == Color::White { 1 } else { -1 })
    }

    pub fn is_centipawn(&self) -> bool {
        self.kind == ScoreKind::Centipawn
    }

    pub fn is_mate(&self) -> bool {
        self.kind == ScoreKind::Mate
    }

    /// Returns the mate distance if `color` is the side delivering the mate
    pub fn mate_for(&self, color: Color) -> Option<i32> {
        if !self.is_mate() {
            return None;
        }
        match color {
            Color::White if self.value > 0 => Some(self.value),
            Color::Black if self.value < 0 => Some(-self.value),
            _ => None,
        }
    }

    /// Flips a side-to-move relative reading to White's perspective
    pub fn white_relative(self, side_to_move: Color) -> Self {
        match side_to_move {
            Color::White => self,
            Color::Black => Self { kind: self.kind, value: -self.value },
        }
    }
}

impl fmt::Display for PositionEvaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ScoreKind::Centipawn => {
                let score = self.value as f32 / 100.0;
                if score >= 0.0 {
                    write!(f, "+{:.2}", score)
                } else {
                    write!(f, "{:.2}", score)
                }
            }
            ScoreKind::Mate => {
                if self.value >= 0 {
                    write!(f, "M{}", self.value)
                } else {
                    write!(f, "-M{}", -self.value)
                }
            }
            ScoreKind::Unknown => write!(f, "?"),
        }
    }
}

/// What an evaluator returns for one position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineVerdict {
    pub evaluation: PositionEvaluation,
    /// Preferred move in UCI notation, when the engine gave one
    pub best_move: Option<String>,
}

/// Anything that can score a position at a given search depth.
///
/// Implementations return the evaluation from White's perspective.
pub trait Evaluator {
    fn evaluate(&mut self, fen: &str, depth: u8) -> Result<EngineVerdict, EngineError>;
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&mut self, fen: &str, depth: u8) -> Result<EngineVerdict, EngineError> {
        (**self).evaluate(fen, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_centipawns() {
        assert_eq!(PositionEvaluation::centipawns(125).to_string(), "+1.25");
        assert_eq!(PositionEvaluation::centipawns(-40).to_string(), "-0.40");
        assert_eq!(PositionEvaluation::centipawns(0).to_string(), "+0.00");
    }

    #[test]
    fn test_display_mate() {
        assert_eq!(PositionEvaluation::mate(3).to_string(), "M3");
        assert_eq!(PositionEvaluation::mate(-2).to_string(), "-M2");
    }

    #[test]
    fn test_mate_for() {
        let eval = PositionEvaluation::mate(-4);
        assert_eq!(eval.mate_for(Color::Black), Some(4));
        assert_eq!(eval.mate_for(Color::White), None);
        assert_eq!(PositionEvaluation::centipawns(900).mate_for(Color::White), None);
    }

    #[test]
    fn test_side_to_move_flip() {
        let eval = PositionEvaluation::centipawns(80).white_relative(Color::Black);
        assert_eq!(eval.value, -80);
        let eval = PositionEvaluation::mate(2).white_relative(Color::White);
        assert_eq!(eval.value, 2);
    }

    #[test]
    fn test_unknown_kind_deserializes() {
        let eval: PositionEvaluation =
            serde_json::from_str(r#"{"kind":"wdl","value":12}"#).unwrap();
        assert_eq!(eval.kind, ScoreKind::Unknown);

        let eval: PositionEvaluation = serde_json::from_str(r#"{"kind":"cp","value":12}"#).unwrap();
        assert_eq!(eval, PositionEvaluation::centipawns(12));
    }
}
