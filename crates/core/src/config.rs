//! Analysis settings

use serde::Serialize;

use crate::error::{Error, Result};

pub const DEFAULT_DEPTH: u8 = 15;
pub const DEFAULT_SAMPLE_STRIDE: usize = 1;
pub const DEFAULT_MIN_GAMES: usize = 3;
pub const DEFAULT_STOCKFISH_PATH: &str = "stockfish";

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Engine search depth per position
    pub depth: u8,
    /// Analyze every Nth move of each side
    pub sample_stride: usize,
    /// Players with fewer games are left out of the player section
    pub min_games: usize,
    /// Case-insensitive substring a player name must contain
    pub player_filter: Option<String>,
    /// Keep only the first N players
    pub player_limit: Option<usize>,
    #[serde(skip)]
    pub stockfish_path: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            sample_stride: DEFAULT_SAMPLE_STRIDE,
            min_games: DEFAULT_MIN_GAMES,
            player_filter: None,
            player_limit: None,
            stockfish_path: DEFAULT_STOCKFISH_PATH.to_string(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.depth == 0 {
            return Err(Error::Config("search depth must be at least 1".into()));
        }
        if self.sample_stride == 0 {
            return Err(Error::Config("sample stride must be at least 1".into()));
        }
        if self.player_limit == Some(0) {
            return Err(Error::Config("player limit must be at least 1".into()));
        }
        Ok(())
    }

    /// Whether the ply at `ply_index` gets engine analysis
    pub fn is_sampled(&self, ply_index: usize) -> bool {
        (ply_index / 2) % self.sample_stride == 0
    }

    /// True when the player section is narrowed beyond the game-count threshold
    pub fn narrows_players(&self) -> bool {
        self.player_filter.is_some() || self.player_limit.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_values() {
        let config = AnalysisConfig { depth: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = AnalysisConfig { sample_stride: 0, ..Default::default() };
        assert!(config.validate().is_err());

        let config = AnalysisConfig { player_limit: Some(0), ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sampling_is_per_side() {
        let config = AnalysisConfig { sample_stride: 2, ..Default::default() };
        let sampled: Vec<usize> = (0..10).filter(|&p| config.is_sampled(p)).collect();
        // both sides' first, third and fifth moves
        assert_eq!(sampled, vec![0, 1, 4, 5, 8, 9]);

        let every = AnalysisConfig::default();
        assert!((0..10).all(|p| every.is_sampled(p)));
    }
}
