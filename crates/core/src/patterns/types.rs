//! Highlight types

use serde::{Deserialize, Serialize};

use crate::insights::Side;
use crate::parser::PgnGame;

/// Kind of memorable moment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightKind {
    Checkmate,
    BrilliantSacrifice,
    BrilliantMove,
    Blunder,
    Comeback,
    TacticalCheck,
    EnPassant,
    Underpromotion,
}

impl HighlightKind {
    /// Lower tiers win ties at equal score
    pub fn priority_tier(&self) -> u8 {
        match self {
            HighlightKind::Checkmate
            | HighlightKind::BrilliantSacrifice
            | HighlightKind::Underpromotion => 1,
            HighlightKind::BrilliantMove | HighlightKind::Blunder | HighlightKind::Comeback => 2,
            HighlightKind::TacticalCheck => 3,
            HighlightKind::EnPassant => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightKind::Checkmate => "checkmate",
            HighlightKind::BrilliantSacrifice => "brilliant_sacrifice",
            HighlightKind::BrilliantMove => "brilliant_move",
            HighlightKind::Blunder => "blunder",
            HighlightKind::Comeback => "comeback",
            HighlightKind::TacticalCheck => "tactical_check",
            HighlightKind::EnPassant => "en_passant",
            HighlightKind::Underpromotion => "underpromotion",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            HighlightKind::Checkmate => "Checkmate",
            HighlightKind::BrilliantSacrifice => "Brilliant Sacrifice",
            HighlightKind::BrilliantMove => "Brilliant Move",
            HighlightKind::Blunder => "Blunder",
            HighlightKind::Comeback => "Comeback",
            HighlightKind::TacticalCheck => "Tactical Check",
            HighlightKind::EnPassant => "En Passant",
            HighlightKind::Underpromotion => "Underpromotion",
        }
    }
}

/// Rule-specific numbers behind a highlight
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swing: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cp_loss: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_sacrificed: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub win_prob_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promoted_to: Option<String>,
}

/// Game details attached once a candidate leaves its game
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightContext {
    pub player: String,
    pub opponent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<String>,
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eco: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_url: Option<String>,
}

/// A moment worth showing, before or after selection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightCandidate {
    #[serde(rename = "type")]
    pub kind: HighlightKind,
    pub priority_tier: u8,
    pub score: f64,
    pub game_index: usize,
    pub ply_index: usize,
    pub move_number: usize,
    pub color: Side,
    #[serde(rename = "move")]
    pub san: String,
    pub uci: String,
    pub fen_before: String,
    pub fen_after: String,
    /// Display form of the engine reading, e.g. "+1.25" or "M3"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_after: Option<String>,
    /// Engine's choice in the position before, in UCI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_move: Option<String>,
    pub description: String,
    pub metrics: HighlightMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<HighlightContext>,
}

impl HighlightCandidate {
    /// Attributes the candidate to whoever moved and attaches game details
    pub fn with_context(mut self, game: &PgnGame) -> Self {
        let (player, opponent) = match self.color {
            Side::White => (game.white_name(), game.black_name()),
            Side::Black => (game.black_name(), game.white_name()),
        };
        self.context = Some(HighlightContext {
            player: player.to_string(),
            opponent: opponent.to_string(),
            round: game.round.clone(),
            result: game.result_str().to_string(),
            eco: game.eco.clone(),
            opening: game.opening.clone(),
            game_url: game.game_url.clone(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&HighlightKind::BrilliantSacrifice).unwrap();
        assert_eq!(json, "\"brilliant_sacrifice\"");
        assert_eq!(HighlightKind::TacticalCheck.as_str(), "tactical_check");
    }

    #[test]
    fn test_tiers() {
        assert_eq!(HighlightKind::Checkmate.priority_tier(), 1);
        assert_eq!(HighlightKind::Underpromotion.priority_tier(), 1);
        assert_eq!(HighlightKind::Comeback.priority_tier(), 2);
        assert_eq!(HighlightKind::TacticalCheck.priority_tier(), 3);
        assert_eq!(HighlightKind::EnPassant.priority_tier(), 4);
    }

    #[test]
    fn test_context_follows_mover() {
        let pgn = "[White \"Anna\"]\n[Black \"Ben\"]\n[Round \"3\"]\n[Result \"0-1\"]\n\n1. e4 e5 0-1\n";
        let game = crate::parser::parse_pgn_string(pgn).unwrap().games.remove(0);
        let candidate = HighlightCandidate {
            kind: HighlightKind::Blunder,
            priority_tier: 2,
            score: 70.0,
            game_index: 0,
            ply_index: 1,
            move_number: 1,
            color: Side::Black,
            san: "e5".into(),
            uci: "e7e5".into(),
            fen_before: String::new(),
            fen_after: String::new(),
            eval_before: Some("+0.30".into()),
            eval_after: Some("+4.00".into()),
            best_move: Some("g8f6".into()),
            description: String::new(),
            metrics: HighlightMetrics::default(),
            context: None,
        };

        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["bestMove"], "g8f6");

        let context = candidate.with_context(&game).context.unwrap();
        assert_eq!(context.player, "Ben");
        assert_eq!(context.opponent, "Anna");
        assert_eq!(context.round.as_deref(), Some("3"));
        assert_eq!(context.result, "0-1");
    }
}
