//! Highlight detection over one analyzed game

use shakmaty::{Color, Role};

use super::types::*;
use crate::insights::{round1, Classification, GameAnalysis, MoveRecord};

const SACRIFICE_MIN_MATERIAL: i32 = 2;
const BRILLIANT_MIN_SWING: i32 = 150;
const BLUNDER_MIN_CP_LOSS: i32 = 200;
const HUGE_BLUNDER_CP_LOSS: i32 = 800;
const TACTICAL_CHECK_MIN_SWING: i32 = 100;
const COMEBACK_LOW: i32 = 300;
const COMEBACK_RECOVERED: i32 = 100;
const COMEBACK_MIN_SWING: i32 = 500;

/// Worst score each side has had to sit through so far in one game
#[derive(Debug, Default)]
struct ComebackTracker {
    white_low: i32,
    black_high: i32,
}

impl ComebackTracker {
    /// Returns the recovered distance if the mover just climbed out of a hole.
    /// The fired side's extreme goes back to 0.
    fn test(&mut self, mover: Color, score_after: i32) -> Option<i32> {
        match mover {
            Color::White => {
                let swing = score_after - self.white_low;
                if self.white_low < -COMEBACK_LOW
                    && score_after > COMEBACK_RECOVERED
                    && swing > COMEBACK_MIN_SWING
                {
                    self.white_low = 0;
                    return Some(swing);
                }
            }
            Color::Black => {
                let swing = self.black_high - score_after;
                if self.black_high > COMEBACK_LOW
                    && score_after < -COMEBACK_RECOVERED
                    && swing > COMEBACK_MIN_SWING
                {
                    self.black_high = 0;
                    return Some(swing);
                }
            }
        }
        None
    }

    fn absorb(&mut self, score: i32) {
        self.white_low = self.white_low.min(score);
        self.black_high = self.black_high.max(score);
    }
}

pub struct HighlightDetector<'a> {
    analysis: &'a GameAnalysis,
    comeback: ComebackTracker,
    found: Vec<HighlightCandidate>,
}

impl<'a> HighlightDetector<'a> {
    pub fn new(analysis: &'a GameAnalysis) -> Self {
        Self {
            analysis,
            comeback: ComebackTracker::default(),
            found: Vec::new(),
        }
    }

    /// Scans the game once and returns every candidate, in move order
    pub fn detect(mut self) -> Vec<HighlightCandidate> {
        let analysis = self.analysis;
        for (index, record) in analysis.moves.iter().enumerate() {
            self.check_checkmate(record);
            self.check_underpromotion(record);
            self.check_en_passant(record);

            if let Some(assessment) = &record.assessment {
                let material_loss = self.material_given_up(index);
                self.check_sacrifice(record, material_loss);
                self.check_brilliant_move(record, material_loss);
                self.check_blunder(record);
                self.check_comeback(record);
                self.check_tactical_check(record);
                self.comeback.absorb(assessment.score_after);
            }
        }

        self.found
    }

    /// Material the mover is down once the opponent has taken the moved piece.
    ///
    /// Only a reply capturing on the landing square counts. When the mover
    /// recaptures on that square next, the balance is taken after that.
    fn material_given_up(&self, index: usize) -> i32 {
        let moves = &self.analysis.moves;
        let record = &moves[index];
        let square = record.ply.to;
        let lands_on_square = |r: &&MoveRecord| r.ply.is_capture() && r.ply.to == square;

        let Some(reply) = moves.get(index + 1).filter(lands_on_square) else {
            return 0;
        };
        let settled = moves.get(index + 2).filter(lands_on_square).unwrap_or(reply);

        let color = record.color();
        let before = record.ply.material_before.balance_for(color);
        before - settled.ply.material_after.balance_for(color)
    }

    fn check_checkmate(&mut self, record: &MoveRecord) {
        let mate_in_one = record
            .assessment
            .as_ref()
            .is_some_and(|a| a.eval_after.mate_for(record.color()) == Some(1));
        if !record.ply.is_checkmate && !mate_in_one {
            return;
        }
        let description = if record.ply.is_checkmate {
            format!("{} delivers checkmate with {}", side_name(record), record.ply.san)
        } else {
            format!("{} sets up mate in one with {}", side_name(record), record.ply.san)
        };
        let metrics = HighlightMetrics::default();
        self.push(record, HighlightKind::Checkmate, 100.0, description, metrics);
    }

    fn check_underpromotion(&mut self, record: &MoveRecord) {
        let Some(role) = record.ply.promotion else {
            return;
        };
        if role == Role::Queen {
            return;
        }
        let description = format!(
            "{} promotes to a {} instead of a queen",
            side_name(record),
            role_name(role)
        );
        let metrics = HighlightMetrics {
            promoted_to: Some(role_name(role).to_string()),
            ..Default::default()
        };
        self.push(record, HighlightKind::Underpromotion, 95.0, description, metrics);
    }

    fn check_en_passant(&mut self, record: &MoveRecord) {
        if !record.ply.is_en_passant {
            return;
        }
        let description = format!(
            "{} captures en passant with {}",
            side_name(record),
            record.ply.san
        );
        self.push(record, HighlightKind::EnPassant, 40.0, description, HighlightMetrics::default());
    }

    fn check_sacrifice(&mut self, record: &MoveRecord, material_loss: i32) {
        if record.classification() != Some(Classification::Excellent)
            || material_loss < SACRIFICE_MIN_MATERIAL
            || record.ply.promotion.is_some()
            || record.ply.san.contains('=')
        {
            return;
        }
        let description = format!(
            "{} sacrifices the {} with {} for {} points and the engine approves",
            side_name(record),
            role_name(record.ply.role),
            record.ply.san,
            material_loss
        );
        let metrics = HighlightMetrics {
            material_sacrificed: Some(material_loss),
            swing: record.swing(),
            ..Default::default()
        };
        let score = 90.0 + 5.0 * f64::from(material_loss);
        self.push(record, HighlightKind::BrilliantSacrifice, score, description, metrics);
    }

    fn check_brilliant_move(&mut self, record: &MoveRecord, material_loss: i32) {
        let swing = record.swing().unwrap_or(0);
        if record.classification() != Some(Classification::Excellent)
            || material_loss >= SACRIFICE_MIN_MATERIAL
            || swing <= BRILLIANT_MIN_SWING
        {
            return;
        }
        let description = format!(
            "{} finds {}, gaining {} centipawns",
            side_name(record),
            record.ply.san,
            swing
        );
        let metrics = HighlightMetrics {
            swing: Some(swing),
            ..Default::default()
        };
        let score = 70.0 + (f64::from(swing) / 10.0).min(30.0);
        self.push(record, HighlightKind::BrilliantMove, score, description, metrics);
    }

    fn check_blunder(&mut self, record: &MoveRecord) {
        let Some(assessment) = &record.assessment else {
            return;
        };
        let cp_loss = record.score_drop().unwrap_or(0);
        if assessment.classification != Classification::Blunder || cp_loss <= BLUNDER_MIN_CP_LOSS {
            return;
        }

        let color = record.color();
        let missed_mate = assessment.eval_before.mate_for(color).is_some()
            && assessment.eval_after.mate_for(color).is_none();
        let description = if missed_mate {
            format!("{} lets a forced mate slip with {}", side_name(record), record.ply.san)
        } else if cp_loss > HUGE_BLUNDER_CP_LOSS {
            format!("{} throws the game away with {}", side_name(record), record.ply.san)
        } else {
            format!("{} blunders with {}", side_name(record), record.ply.san)
        };

        let metrics = HighlightMetrics {
            cp_loss: Some(cp_loss),
            win_prob_loss: Some(assessment.loss),
            ..Default::default()
        };
        let score = 60.0 + (assessment.loss + f64::from(cp_loss) / 20.0).min(40.0);
        self.push(record, HighlightKind::Blunder, score, description, metrics);
    }

    fn check_comeback(&mut self, record: &MoveRecord) {
        let Some(assessment) = &record.assessment else {
            return;
        };
        let Some(swing) = self.comeback.test(record.color(), assessment.score_after) else {
            return;
        };
        let description = format!(
            "{} climbs back from a lost position with {}",
            side_name(record),
            record.ply.san
        );
        let metrics = HighlightMetrics {
            swing: Some(swing),
            ..Default::default()
        };
        let score = 65.0 + (f64::from(swing) / 20.0).min(35.0);
        self.push(record, HighlightKind::Comeback, score, description, metrics);
    }

    fn check_tactical_check(&mut self, record: &MoveRecord) {
        let swing = record.swing().unwrap_or(0);
        let sound = matches!(
            record.classification(),
            Some(Classification::Excellent | Classification::Good)
        );
        if !record.ply.is_check || !sound || swing <= TACTICAL_CHECK_MIN_SWING {
            return;
        }
        let description = format!(
            "{} strikes with the check {}",
            side_name(record),
            record.ply.san
        );
        let metrics = HighlightMetrics {
            swing: Some(swing),
            ..Default::default()
        };
        let score = 50.0 + (f64::from(swing) / 10.0).min(30.0);
        self.push(record, HighlightKind::TacticalCheck, score, description, metrics);
    }

    fn push(
        &mut self,
        record: &MoveRecord,
        kind: HighlightKind,
        score: f64,
        description: String,
        metrics: HighlightMetrics,
    ) {
        let ply = &record.ply;
        let assessment = record.assessment.as_ref();

        self.found.push(HighlightCandidate {
            kind,
            priority_tier: kind.priority_tier(),
            score: round1(score),
            game_index: self.analysis.game_index,
            ply_index: ply.ply_index,
            move_number: ply.move_number,
            color: ply.color.into(),
            san: ply.san.clone(),
            uci: ply.uci.clone(),
            fen_before: ply.fen_before.clone(),
            fen_after: ply.fen_after.clone(),
            eval_before: assessment.map(|a| a.eval_before.to_string()),
            eval_after: assessment.map(|a| a.eval_after.to_string()),
            best_move: assessment.and_then(|a| a.best_move.clone()),
            description,
            metrics,
            context: None,
        });
    }
}

fn side_name(record: &MoveRecord) -> &'static str {
    match record.color() {
        Color::White => "White",
        Color::Black => "Black",
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::Pawn => "pawn",
        Role::Knight => "knight",
        Role::Bishop => "bishop",
        Role::Rook => "rook",
        Role::Queen => "queen",
        Role::King => "king",
    }
}
