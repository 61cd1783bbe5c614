//! Move-quality classification from win-probability loss

use serde::{Deserialize, Serialize};
use shakmaty::Color;

use super::normalize::{win_probability, NormalizedScore};
use crate::engine::PositionEvaluation;

/// Quality tier of a single move, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// < 2% win-probability loss
    Excellent,
    /// < 5%
    Good,
    /// < 10%
    Inaccuracy,
    /// < 20%, or a blunder in an already decided position
    Mistake,
    /// >= 20%
    Blunder,
}

impl Classification {
    pub fn from_loss(loss: f64) -> Self {
        match loss {
            l if l < 2.0 => Classification::Excellent,
            l if l < 5.0 => Classification::Good,
            l if l < 10.0 => Classification::Inaccuracy,
            l if l < 20.0 => Classification::Mistake,
            _ => Classification::Blunder,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Excellent => "excellent",
            Classification::Good => "good",
            Classification::Inaccuracy => "inaccuracy",
            Classification::Mistake => "mistake",
            Classification::Blunder => "blunder",
        }
    }
}

/// Outcome of classifying one move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub classification: Classification,
    /// Mover's win-probability loss, never negative
    pub loss: f64,
    pub win_prob_before: f64,
    pub win_prob_after: f64,
}

/// Classifies a move from White-perspective scores before and after it.
pub fn classify_move(before: NormalizedScore, after: NormalizedScore, mover: Color) -> Verdict {
    let win_prob_before = win_probability(before);
    let win_prob_after = win_probability(after);

    let raw_loss = match mover {
        Color::White => win_prob_before - win_prob_after,
        Color::Black => (100.0 - win_prob_before) - (100.0 - win_prob_after),
    };
    let loss = raw_loss.max(0.0);

    let mut classification = Classification::from_loss(loss);

    // A big swing in a position that was already decided is noise, not a blunder
    let decided = win_prob_before <= 10.0 || win_prob_before >= 90.0;
    if classification == Classification::Blunder && decided {
        classification = Classification::Mistake;
    }

    Verdict {
        classification,
        loss,
        win_prob_before,
        win_prob_after,
    }
}

/// Centipawn loss for ACPL, only when both readings are plain centipawns
pub fn centipawn_loss(
    before: &PositionEvaluation,
    after: &PositionEvaluation,
    mover: Color,
) -> Option<i32> {
    if !before.is_centipawn() || !after.is_centipawn() {
        return None;
    }
    let loss = match mover {
        Color::White => before.value - after.value,
        Color::Black => after.value - before.value,
    };
    Some(loss.max(0))
}

/// Score change seen from the mover's side: positive means the move helped them
pub fn mover_swing(before: NormalizedScore, after: NormalizedScore, mover: Color) -> i32 {
    match mover {
        Color::White => after - before,
        Color::Black => before - after,
    }
}
