//! Per-player statistics across their games

use serde::Serialize;
use shakmaty::Color;

use super::roster::PlayerGames;
use crate::insights::{round1, GameAnalysis, QualityTally};
use crate::parser::PgnGame;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteOpening {
    pub eco: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameLength {
    pub game_index: usize,
    pub opponent: String,
    /// Moves the player made themselves
    pub half_moves: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCard {
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub win_rate: f64,
    pub games_as_white: u32,
    pub games_as_black: u32,
    pub analyzed_games: u32,
    pub avg_accuracy_white: Option<f64>,
    pub avg_accuracy_black: Option<f64>,
    #[serde(rename = "avgACPL")]
    pub avg_acpl: Option<f64>,
    pub move_quality: QualityTally,
    pub captures: u32,
    pub checks: u32,
    pub checkmates: u32,
    pub en_passants: u32,
    pub promotions: u32,
    pub castles: u32,
    pub favorite_opening_white: Option<FavoriteOpening>,
    pub favorite_opening_black: Option<FavoriteOpening>,
    pub longest_game: Option<GameLength>,
    pub shortest_game: Option<GameLength>,
}

/// ECO counts in order of first occurrence
#[derive(Default)]
struct OpeningCounter {
    seen: Vec<FavoriteOpening>,
}

impl OpeningCounter {
    fn record(&mut self, game: &PgnGame) {
        let Some(eco) = game.eco.as_deref().filter(|e| !e.is_empty() && *e != "?") else {
            return;
        };
        match self.seen.iter_mut().find(|o| o.eco == eco) {
            Some(opening) => opening.count += 1,
            None => self.seen.push(FavoriteOpening {
                eco: eco.to_string(),
                name: game.opening.clone(),
                count: 1,
            }),
        }
    }

    fn favorite(self) -> Option<FavoriteOpening> {
        let mut best: Option<FavoriteOpening> = None;
        for opening in self.seen {
            if best.as_ref().map_or(true, |b| opening.count > b.count) {
                best = Some(opening);
            }
        }
        best
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(round1(values.iter().sum::<f64>() / values.len() as f64))
}

/// Half-moves played by the given side in a game of `plies` plies
fn own_half_moves(plies: usize, color: Color) -> usize {
    match color {
        Color::White => plies.div_ceil(2),
        Color::Black => plies / 2,
    }
}

impl PlayerCard {
    /// Folds every game the player appears in. `games` and `analyses` are
    /// indexed by game index.
    pub fn build(
        player: &PlayerGames,
        games: &[PgnGame],
        analyses: &[Option<GameAnalysis>],
    ) -> Self {
        let mut card = PlayerCard::default();
        let mut accuracy_white = Vec::new();
        let mut accuracy_black = Vec::new();
        let mut acpls = Vec::new();
        let mut openings_white = OpeningCounter::default();
        let mut openings_black = OpeningCounter::default();

        for appearance in &player.appearances {
            let Some(game) = games.get(appearance.game_index) else {
                continue;
            };
            let color = appearance.color;
            let opponent = match color {
                Color::White => game.black_name(),
                Color::Black => game.white_name(),
            };

            card.games += 1;
            match (game.result_str(), color) {
                ("1-0", Color::White) | ("0-1", Color::Black) => card.wins += 1,
                ("1-0", Color::Black) | ("0-1", Color::White) => card.losses += 1,
                ("1/2-1/2", _) => card.draws += 1,
                _ => {}
            }
            match color {
                Color::White => {
                    card.games_as_white += 1;
                    openings_white.record(game);
                }
                Color::Black => {
                    card.games_as_black += 1;
                    openings_black.record(game);
                }
            }

            let length = GameLength {
                game_index: game.game_index,
                opponent: opponent.to_string(),
                half_moves: own_half_moves(game.move_count(), color),
            };
            if card.longest_game.as_ref().map_or(true, |l| length.half_moves > l.half_moves) {
                card.longest_game = Some(length.clone());
            }
            if card.shortest_game.as_ref().map_or(true, |s| length.half_moves < s.half_moves) {
                card.shortest_game = Some(length);
            }

            let Some(analysis) = analyses.get(appearance.game_index).and_then(Option::as_ref) else {
                continue;
            };
            card.analyzed_games += 1;

            let stats = analysis.stats(color);
            match color {
                Color::White => accuracy_white.push(stats.accuracy),
                Color::Black => accuracy_black.push(stats.accuracy),
            }
            if stats.assessed_moves > 0 {
                acpls.push(stats.acpl);
            }
            card.move_quality.merge(&stats.quality);

            for record in analysis.moves.iter().filter(|m| m.color() == color) {
                let ply = &record.ply;
                card.captures += u32::from(ply.is_capture());
                card.checks += u32::from(ply.is_check);
                card.checkmates += u32::from(ply.is_checkmate);
                card.en_passants += u32::from(ply.is_en_passant);
                card.promotions += u32::from(ply.promotion.is_some());
                card.castles += u32::from(ply.is_castle);
            }
        }

        if card.games > 0 {
            card.win_rate = round1(f64::from(card.wins) / f64::from(card.games) * 100.0);
        }
        card.avg_accuracy_white = mean(&accuracy_white);
        card.avg_accuracy_black = mean(&accuracy_black);
        card.avg_acpl = mean(&acpls);
        card.favorite_opening_white = openings_white.favorite();
        card.favorite_opening_black = openings_black.favorite();

        card
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::test_support::cp_move;
    use crate::parser::parse_pgn_string;
    use crate::players::build_roster;

    const PGN: &str = r#"[White "Anna"]
[Black "Ben"]
[Result "1-0"]
[ECO "C20"]
[Opening "King's Pawn Game"]

1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 1-0

[White "Ben"]
[Black "Anna"]
[Result "1/2-1/2"]
[ECO "D00"]

1. d4 d5 2. Nf3 1/2-1/2

[White "Anna"]
[Black "Cleo"]
[Result "0-1"]
[ECO "B01"]

1. e4 d5 0-1

[White "Anna"]
[Black "Ben"]
[Result "*"]
[ECO "B01"]

1. e4 d5 2. exd5 *
"#;

    fn anna_card(analyses: &[Option<GameAnalysis>]) -> PlayerCard {
        let games = parse_pgn_string(PGN).unwrap().games;
        let roster = build_roster(&games);
        let anna = roster.iter().find(|p| p.name == "Anna").unwrap();
        PlayerCard::build(anna, &games, analyses)
    }

    #[test]
    fn test_results_and_colors() {
        let card = anna_card(&[]);
        assert_eq!(card.games, 4);
        assert_eq!((card.wins, card.losses, card.draws), (1, 1, 1));
        assert_eq!(card.win_rate, 25.0);
        assert_eq!((card.games_as_white, card.games_as_black), (3, 1));
        assert_eq!(card.analyzed_games, 0);
        assert_eq!(card.avg_accuracy_white, None);
    }

    #[test]
    fn test_favorite_opening_first_wins_ties() {
        let card = anna_card(&[]);
        let white = card.favorite_opening_white.unwrap();
        assert_eq!(white.eco, "B01");
        assert_eq!(white.count, 2);

        let black = card.favorite_opening_black.unwrap();
        assert_eq!(black.eco, "D00");
    }

    #[test]
    fn test_game_length_uses_own_moves() {
        let card = anna_card(&[]);
        let longest = card.longest_game.unwrap();
        assert_eq!((longest.game_index, longest.half_moves), (0, 4));

        // one own move in games 2 and 3; the first one seen is kept
        let shortest = card.shortest_game.unwrap();
        assert_eq!((shortest.game_index, shortest.half_moves), (1, 1));
        assert_eq!(shortest.opponent, "Ben");
    }

    #[test]
    fn test_analysis_feeds_accuracy_and_tactics() {
        let games = parse_pgn_string(PGN).unwrap().games;
        let plies = crate::position::replay_mainline(&games[0]).unwrap();
        let records = plies
            .into_iter()
            .map(|ply| {
                let mut record = cp_move(ply.ply_index, &ply.san, 0, 0);
                record.ply = ply;
                record
            })
            .collect();
        let analysis = GameAnalysis::from_records(0, "Anna", "Ben", records);

        let card = anna_card(&[Some(analysis)]);
        assert_eq!(card.analyzed_games, 1);
        assert_eq!(card.avg_accuracy_white, Some(100.0));
        assert_eq!(card.avg_accuracy_black, None);
        assert_eq!(card.avg_acpl, Some(0.0));
        assert_eq!(card.move_quality.excellent, 4);
        assert_eq!(card.captures, 1);
        assert_eq!(card.checkmates, 1);
        assert_eq!(card.checks, 1);
    }
}
