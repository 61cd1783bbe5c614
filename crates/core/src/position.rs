//! Move replay: turns a SAN mainline into per-ply position facts

use serde::Serialize;
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{Board, Chess, Color, EnPassantMode, File, Move, Position, Role, Square};

use crate::error::{Error, Result};
use crate::parser::PgnGame;

/// Material count per side (pawn 1, minor 3, rook 5, queen 9)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Material {
    pub white: i32,
    pub black: i32,
}

impl Material {
    pub fn of(board: &Board) -> Self {
        let mut material = Material::default();
        for sq in board.occupied() {
            if let Some(piece) = board.piece_at(sq) {
                let value = piece_value(piece.role);
                match piece.color {
                    Color::White => material.white += value,
                    Color::Black => material.black += value,
                }
            }
        }
        material
    }

    pub fn side(&self, color: Color) -> i32 {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    /// Own material minus the opponent's, seen from `color`
    pub fn balance_for(&self, color: Color) -> i32 {
        self.side(color) - self.side(color.other())
    }
}

pub fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => 1,
        Role::Knight => 3,
        Role::Bishop => 3,
        Role::Rook => 5,
        Role::Queen => 9,
        Role::King => 0,
    }
}

/// Everything the analysis needs to know about one ply, independent of any engine
#[derive(Debug, Clone)]
pub struct PlyFacts {
    pub ply_index: usize,
    pub move_number: usize,
    pub color: Color,
    pub san: String,
    pub uci: String,
    pub fen_before: String,
    pub fen_after: String,
    /// Piece that moved
    pub role: Role,
    /// Landing square; the rook's square for castling
    pub to: Square,
    pub captured: Option<Role>,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_en_passant: bool,
    pub is_castle: bool,
    pub promotion: Option<Role>,
    pub material_before: Material,
    pub material_after: Material,
}

impl PlyFacts {
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

/// Replays the game's mainline from the standard starting position
pub fn replay_mainline(game: &PgnGame) -> Result<Vec<PlyFacts>> {
    replay_san(&game.moves)
}

pub fn replay_san(moves: &[String]) -> Result<Vec<PlyFacts>> {
    let mut position = Chess::default();
    let mut plies = Vec::with_capacity(moves.len());

    for (ply, san_str) in moves.iter().enumerate() {
        let illegal = || Error::IllegalMove {
            ply,
            san: san_str.clone(),
        };

        let san: SanPlus = san_str.parse().map_err(|_| illegal())?;
        let mv = san.san.to_move(&position).map_err(|_| illegal())?;

        let color = position.turn();
        let fen_before = fen_of(&position);
        let material_before = Material::of(position.board());

        let next = position.clone().play(mv.clone()).map_err(|_| illegal())?;

        plies.push(PlyFacts {
            ply_index: ply,
            move_number: ply / 2 + 1,
            color,
            san: san_str.clone(),
            uci: move_to_uci(&mv),
            fen_before,
            fen_after: fen_of(&next),
            role: mv.role(),
            to: mv.to(),
            captured: mv.capture(),
            is_check: next.is_check(),
            is_checkmate: next.is_checkmate(),
            is_en_passant: mv.is_en_passant(),
            is_castle: mv.is_castle(),
            promotion: mv.promotion(),
            material_before,
            material_after: Material::of(next.board()),
        });

        position = next;
    }

    Ok(plies)
}

fn fen_of(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}

/// Convert shakmaty Move to UCI string
fn move_to_uci(mv: &Move) -> String {
    match mv {
        Move::Normal { from, to, promotion, .. } => {
            let promo = promotion.map(|r| r.char().to_string()).unwrap_or_default();
            format!("{}{}{}", from, to, promo)
        }
        Move::EnPassant { from, to, .. } => format!("{}{}", from, to),
        Move::Castle { king, rook } => {
            let king_to = if rook.file() > king.file() {
                Square::from_coords(File::G, king.rank())
            } else {
                Square::from_coords(File::C, king.rank())
            };
            format!("{}{}", king, king_to)
        }
        Move::Put { .. } => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sans(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_starting_material() {
        let material = Material::of(Chess::default().board());
        assert_eq!(material.white, 39);
        assert_eq!(material.black, 39);
        assert_eq!(material.balance_for(Color::Black), 0);
    }

    #[test]
    fn test_replay_basic_facts() {
        let plies = replay_san(&sans("e4 d5 exd5 Qxd5")).unwrap();
        assert_eq!(plies.len(), 4);

        assert_eq!(plies[0].color, Color::White);
        assert_eq!(plies[1].color, Color::Black);
        assert_eq!(plies[2].move_number, 2);
        assert_eq!(plies[0].uci, "e2e4");

        assert_eq!(plies[2].captured, Some(Role::Pawn));
        assert_eq!(plies[3].role, Role::Queen);
        assert_eq!(plies[3].to, Square::D5);
        assert_eq!(plies[2].material_after.black, 38);
        assert_eq!(plies[3].material_after.white, 38);
        assert!(!plies[3].is_check);
    }

    #[test]
    fn test_replay_checkmate() {
        let plies = replay_san(&sans("f3 e5 g4 Qh4#")).unwrap();
        let last = plies.last().unwrap();
        assert!(last.is_check);
        assert!(last.is_checkmate);
        assert_eq!(last.color, Color::Black);
    }

    #[test]
    fn test_replay_en_passant_and_castle() {
        let plies = replay_san(&sans("e4 Nf6 e5 d5 exd6 e6 Nf3 Bxd6 Bc4 O-O O-O")).unwrap();
        assert!(plies[4].is_en_passant);
        assert_eq!(plies[4].captured, Some(Role::Pawn));
        assert_eq!(plies[4].uci, "e5d6");
        assert!(plies[9].is_castle);
        assert_eq!(plies[9].uci, "e8g8");
        assert_eq!(plies[10].uci, "e1g1");
    }

    #[test]
    fn test_replay_rejects_illegal_move() {
        let err = replay_san(&sans("e4 e5 Ke3")).unwrap_err();
        assert!(matches!(err, Error::IllegalMove { ply: 2, .. }));
    }
}
