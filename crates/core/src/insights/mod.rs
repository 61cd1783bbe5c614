//! Evaluation-to-insight core: normalization, classification, aggregation

pub mod accuracy;
pub mod classify;
pub mod normalize;

pub use accuracy::{accuracy, acpl, round1};
pub use classify::{centipawn_loss, classify_move, mover_swing, Classification, Verdict};
pub use normalize::{normalize, win_probability, NormalizedScore};

use serde::{Deserialize, Serialize};
use shakmaty::Color;

use crate::engine::PositionEvaluation;
use crate::patterns::HighlightCandidate;
use crate::position::PlyFacts;

/// Serializable side of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

/// Engine-derived part of a move record; absent for plies skipped by sampling
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub eval_before: PositionEvaluation,
    pub eval_after: PositionEvaluation,
    pub score_before: NormalizedScore,
    pub score_after: NormalizedScore,
    pub win_prob_before: f64,
    pub win_prob_after: f64,
    pub classification: Classification,
    /// Mover's win-probability loss
    pub loss: f64,
    /// Centipawn loss when both readings were finite
    pub cp_loss: Option<i32>,
    /// Engine's preferred move in the position before
    pub best_move: Option<String>,
}

impl Assessment {
    pub fn new(
        eval_before: PositionEvaluation,
        eval_after: PositionEvaluation,
        mover: Color,
        best_move: Option<String>,
    ) -> Self {
        let score_before = normalize(&eval_before);
        let score_after = normalize(&eval_after);
        let verdict = classify_move(score_before, score_after, mover);

        Self {
            eval_before,
            eval_after,
            score_before,
            score_after,
            win_prob_before: verdict.win_prob_before,
            win_prob_after: verdict.win_prob_after,
            classification: verdict.classification,
            loss: verdict.loss,
            cp_loss: centipawn_loss(&eval_before, &eval_after, mover),
            best_move,
        }
    }
}

/// One analyzed ply
#[derive(Debug, Clone)]
pub struct MoveRecord {
    pub ply: PlyFacts,
    pub assessment: Option<Assessment>,
}

impl MoveRecord {
    pub fn color(&self) -> Color {
        self.ply.color
    }

    /// Normalized score change from the mover's side
    pub fn swing(&self) -> Option<i32> {
        self.assessment
            .as_ref()
            .map(|a| mover_swing(a.score_before, a.score_after, self.ply.color))
    }

    /// How far the normalized score dropped for the mover
    pub fn score_drop(&self) -> Option<i32> {
        self.swing().map(|swing| (-swing).max(0))
    }

    pub fn classification(&self) -> Option<Classification> {
        self.assessment.as_ref().map(|a| a.classification)
    }
}

/// Per-tier move counts for one side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityTally {
    pub excellent: u32,
    pub good: u32,
    pub inaccuracies: u32,
    pub mistakes: u32,
    pub blunders: u32,
}

impl QualityTally {
    pub fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Excellent => self.excellent += 1,
            Classification::Good => self.good += 1,
            Classification::Inaccuracy => self.inaccuracies += 1,
            Classification::Mistake => self.mistakes += 1,
            Classification::Blunder => self.blunders += 1,
        }
    }

    pub fn merge(&mut self, other: &QualityTally) {
        self.excellent += other.excellent;
        self.good += other.good;
        self.inaccuracies += other.inaccuracies;
        self.mistakes += other.mistakes;
        self.blunders += other.blunders;
    }

    pub fn total(&self) -> u32 {
        self.excellent + self.good + self.inaccuracies + self.mistakes + self.blunders
    }
}

/// The worst blunder of a game, scores from the mover's point of view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlunderSummary {
    pub move_number: usize,
    pub player: Side,
    pub cp_loss: i32,
    #[serde(rename = "move")]
    pub san: String,
    pub eval_before: i32,
    pub eval_after: i32,
}

/// Per-side aggregates of one game
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SideStats {
    pub accuracy: f64,
    pub acpl: f64,
    pub quality: QualityTally,
    /// Moves that received an engine assessment
    pub assessed_moves: usize,
}

impl SideStats {
    fn from_records(records: &[MoveRecord], color: Color) -> Self {
        let mut losses = Vec::new();
        let mut cp_losses = Vec::new();
        let mut quality = QualityTally::default();

        for assessment in records
            .iter()
            .filter(|r| r.ply.color == color)
            .filter_map(|r| r.assessment.as_ref())
        {
            losses.push(assessment.loss);
            if let Some(cp) = assessment.cp_loss {
                cp_losses.push(cp);
            }
            quality.record(assessment.classification);
        }

        Self {
            accuracy: accuracy(&losses),
            acpl: acpl(&cp_losses),
            quality,
            assessed_moves: losses.len(),
        }
    }
}

/// Full analysis of one game
#[derive(Debug, Clone)]
pub struct GameAnalysis {
    pub game_index: usize,
    pub white: String,
    pub black: String,
    pub moves: Vec<MoveRecord>,
    pub white_stats: SideStats,
    pub black_stats: SideStats,
    pub highlights: Vec<HighlightCandidate>,
}

impl GameAnalysis {
    /// Builds the analysis and its per-side aggregates; highlights start empty
    pub fn from_records(
        game_index: usize,
        white: &str,
        black: &str,
        moves: Vec<MoveRecord>,
    ) -> Self {
        let white_stats = SideStats::from_records(&moves, Color::White);
        let black_stats = SideStats::from_records(&moves, Color::Black);

        Self {
            game_index,
            white: white.to_string(),
            black: black.to_string(),
            moves,
            white_stats,
            black_stats,
            highlights: Vec::new(),
        }
    }

    pub fn stats(&self, color: Color) -> &SideStats {
        match color {
            Color::White => &self.white_stats,
            Color::Black => &self.black_stats,
        }
    }

    pub fn biggest_blunder(&self) -> Option<BlunderSummary> {
        let mut biggest: Option<BlunderSummary> = None;

        for record in &self.moves {
            let Some(a) = &record.assessment else {
                continue;
            };
            if a.classification != Classification::Blunder {
                continue;
            }
            let cp_loss = record.score_drop().unwrap_or(0);
            if biggest.as_ref().is_some_and(|b| cp_loss <= b.cp_loss) {
                continue;
            }
            let (eval_before, eval_after) = match record.ply.color {
                Color::White => (a.score_before, a.score_after),
                Color::Black => (-a.score_before, -a.score_after),
            };
            biggest = Some(BlunderSummary {
                move_number: record.ply.move_number,
                player: record.ply.color.into(),
                cp_loss,
                san: record.ply.san.clone(),
                eval_before,
                eval_after,
            });
        }

        biggest
    }
}
