//! Player roster, cards and highlight attribution

mod card;
mod roster;

pub use card::{FavoriteOpening, GameLength, PlayerCard};
pub use roster::{build_roster, select_players, Appearance, PlayerGames};

use serde::Serialize;

use crate::insights::{GameAnalysis, Side};
use crate::parser::PgnGame;
use crate::patterns::{select_highlights, HighlightCandidate};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerReport {
    pub name: String,
    pub stats: PlayerCard,
    pub highlights: Vec<HighlightCandidate>,
}

impl PlayerReport {
    pub fn build(
        player: &PlayerGames,
        games: &[PgnGame],
        analyses: &[Option<GameAnalysis>],
    ) -> Self {
        Self {
            name: player.name.clone(),
            stats: PlayerCard::build(player, games, analyses),
            highlights: select_highlights(player_candidates(player, games, analyses)),
        }
    }
}

/// Every candidate from the player's own moves, with game context attached
pub fn player_candidates(
    player: &PlayerGames,
    games: &[PgnGame],
    analyses: &[Option<GameAnalysis>],
) -> Vec<HighlightCandidate> {
    let mut candidates = Vec::new();

    for appearance in &player.appearances {
        let (Some(game), Some(Some(analysis))) =
            (games.get(appearance.game_index), analyses.get(appearance.game_index))
        else {
            continue;
        };
        let side = Side::from(appearance.color);
        candidates.extend(
            analysis
                .highlights
                .iter()
                .filter(|c| c.color == side)
                .map(|c| c.clone().with_context(game)),
        );
    }

    candidates
}
