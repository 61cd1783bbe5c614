//! Grouping games by player

use std::collections::HashMap;

use shakmaty::Color;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::parser::PgnGame;

/// One game a player took part in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appearance {
    pub game_index: usize,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerGames {
    pub name: String,
    pub appearances: Vec<Appearance>,
}

impl PlayerGames {
    pub fn game_count(&self) -> usize {
        self.appearances.len()
    }
}

/// Groups games by player name in order of first appearance, White before Black
pub fn build_roster(games: &[PgnGame]) -> Vec<PlayerGames> {
    let mut roster: Vec<PlayerGames> = Vec::new();
    let mut index_of: HashMap<String, usize> = HashMap::new();

    for game in games {
        let sides = [
            (game.white_name(), Color::White),
            (game.black_name(), Color::Black),
        ];
        for (name, color) in sides {
            let slot = *index_of.entry(name.to_string()).or_insert_with(|| {
                roster.push(PlayerGames {
                    name: name.to_string(),
                    appearances: Vec::new(),
                });
                roster.len() - 1
            });
            roster[slot].appearances.push(Appearance {
                game_index: game.game_index,
                color,
            });
        }
    }

    roster
}

/// Applies the game-count threshold, then the name filter, then the limit
pub fn select_players(
    roster: Vec<PlayerGames>,
    config: &AnalysisConfig,
) -> Result<Vec<PlayerGames>> {
    let total = roster.len();
    let mut players: Vec<PlayerGames> = roster
        .into_iter()
        .filter(|p| p.game_count() >= config.min_games)
        .collect();
    debug!(
        "{} of {} players have at least {} games",
        players.len(),
        total,
        config.min_games
    );

    if let Some(filter) = &config.player_filter {
        let needle = filter.to_lowercase();
        players.retain(|p| p.name.to_lowercase().contains(&needle));
        if players.is_empty() {
            return Err(Error::Config(format!("no player matches '{}'", filter)));
        }
    }

    if let Some(limit) = config.player_limit {
        players.truncate(limit);
    }

    Ok(players)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_pgn_string;

    const PGN: &str = r#"[White "Carlsen"]
[Black "Nakamura"]
[Result "1-0"]

1. e4 e5 1-0

[White "Caruana"]
[Black "Carlsen"]
[Result "1/2-1/2"]

1. d4 d5 1/2-1/2

[White "Nakamura"]
[Black "Carlsen"]
[Result "0-1"]

1. c4 e5 0-1
"#;

    fn roster() -> Vec<PlayerGames> {
        build_roster(&parse_pgn_string(PGN).unwrap().games)
    }

    fn names(players: &[PlayerGames]) -> Vec<&str> {
        players.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_first_appearance_order() {
        let roster = roster();
        assert_eq!(names(&roster), vec!["Carlsen", "Nakamura", "Caruana"]);
        assert_eq!(roster[0].game_count(), 3);
        assert_eq!(
            roster[0].appearances[1],
            Appearance {
                game_index: 1,
                color: Color::Black
            }
        );
    }

    #[test]
    fn test_min_games() {
        let config = AnalysisConfig {
            min_games: 2,
            ..Default::default()
        };
        let players = select_players(roster(), &config).unwrap();
        assert_eq!(names(&players), vec!["Carlsen", "Nakamura"]);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let config = AnalysisConfig {
            min_games: 1,
            player_filter: Some("CAR".into()),
            ..Default::default()
        };
        let players = select_players(roster(), &config).unwrap();
        assert_eq!(names(&players), vec!["Carlsen", "Caruana"]);
    }

    #[test]
    fn test_filter_applies_after_threshold() {
        let config = AnalysisConfig {
            min_games: 2,
            player_filter: Some("caruana".into()),
            ..Default::default()
        };
        assert!(matches!(select_players(roster(), &config), Err(Error::Config(_))));
    }

    #[test]
    fn test_limit_keeps_first() {
        let config = AnalysisConfig {
            min_games: 1,
            player_limit: Some(2),
            ..Default::default()
        };
        let players = select_players(roster(), &config).unwrap();
        assert_eq!(names(&players), vec!["Carlsen", "Nakamura"]);
    }
}
