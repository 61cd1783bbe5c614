//! The JSON artifact: per-game results, batch summary, player sections

use std::io::Write;

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::insights::{round1, BlunderSummary, GameAnalysis, QualityTally, Side};
use crate::parser::PgnBatch;
use crate::players::{PlayerGames, PlayerReport};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Set by the caller when the report is written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub settings: AnalysisConfig,
    pub games_parsed: usize,
    pub games_rejected: usize,
    pub games_analyzed: usize,
    pub games: Vec<GameSummary>,
    pub summary: BatchSummary,
    pub players: Vec<PlayerReport>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub game_index: usize,
    pub white: String,
    pub black: String,
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eco: Option<String>,
    pub moves: usize,
    pub analyzed: bool,
    pub white_accuracy: Option<f64>,
    pub black_accuracy: Option<f64>,
    #[serde(rename = "whiteACPL")]
    pub white_acpl: Option<f64>,
    #[serde(rename = "blackACPL")]
    pub black_acpl: Option<f64>,
    pub white_move_quality: Option<QualityTally>,
    pub black_move_quality: Option<QualityTally>,
    pub biggest_blunder: Option<BlunderSummary>,
}

impl AnalysisReport {
    /// Writes the report as pretty-printed JSON followed by a newline
    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// One side of one game, as cited by the batch summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideRecord {
    pub player: Side,
    pub accuracy: f64,
    pub acpl: f64,
    pub white: String,
    pub black: String,
    pub game_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedAcpl {
    #[serde(rename = "combinedACPL")]
    pub combined_acpl: f64,
    #[serde(rename = "whiteACPL")]
    pub white_acpl: f64,
    #[serde(rename = "blackACPL")]
    pub black_acpl: f64,
    pub white: String,
    pub black: String,
    pub game_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameBlunder {
    #[serde(flatten)]
    pub blunder: BlunderSummary,
    pub white: String,
    pub black: String,
    pub game_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub accuracy_king: Option<SideRecord>,
    pub biggest_blunder: Option<GameBlunder>,
    #[serde(rename = "lowestACPL")]
    pub lowest_acpl: Option<SideRecord>,
    #[serde(rename = "highestACPL")]
    pub highest_acpl: Option<SideRecord>,
    #[serde(rename = "lowestCombinedACPL")]
    pub lowest_combined_acpl: Option<CombinedAcpl>,
    #[serde(rename = "highestCombinedACPL")]
    pub highest_combined_acpl: Option<CombinedAcpl>,
}

/// Replaces `slot` when it is empty or `better` prefers the candidate.
/// Strict comparisons keep the earliest entry on ties.
fn keep<T>(slot: &mut Option<T>, candidate: T, better: impl Fn(&T, &T) -> bool) {
    if slot.as_ref().map_or(true, |current| better(&candidate, current)) {
        *slot = Some(candidate);
    }
}

impl BatchSummary {
    pub fn from_analyses<'a>(analyses: impl IntoIterator<Item = &'a GameAnalysis>) -> Self {
        let mut summary = BatchSummary::default();

        for analysis in analyses {
            let side = |player: Side| {
                let stats = match player {
                    Side::White => &analysis.white_stats,
                    Side::Black => &analysis.black_stats,
                };
                (
                    stats.assessed_moves,
                    SideRecord {
                        player,
                        accuracy: round1(stats.accuracy),
                        acpl: round1(stats.acpl),
                        white: analysis.white.clone(),
                        black: analysis.black.clone(),
                        game_index: analysis.game_index,
                    },
                )
            };

            for player in [Side::White, Side::Black] {
                let (assessed, record) = side(player);
                if assessed == 0 {
                    continue;
                }
                keep(&mut summary.accuracy_king, record.clone(), |a, b| a.accuracy > b.accuracy);
                keep(&mut summary.lowest_acpl, record.clone(), |a, b| a.acpl < b.acpl);
                keep(&mut summary.highest_acpl, record, |a, b| a.acpl > b.acpl);
            }

            if analysis.white_stats.assessed_moves > 0 && analysis.black_stats.assessed_moves > 0 {
                let white_acpl = round1(analysis.white_stats.acpl);
                let black_acpl = round1(analysis.black_stats.acpl);
                let combined = CombinedAcpl {
                    combined_acpl: round1(white_acpl + black_acpl),
                    white_acpl,
                    black_acpl,
                    white: analysis.white.clone(),
                    black: analysis.black.clone(),
                    game_index: analysis.game_index,
                };
                keep(&mut summary.lowest_combined_acpl, combined.clone(), |a, b| {
                    a.combined_acpl < b.combined_acpl
                });
                keep(&mut summary.highest_combined_acpl, combined, |a, b| {
                    a.combined_acpl > b.combined_acpl
                });
            }

            if let Some(blunder) = analysis.biggest_blunder() {
                let entry = GameBlunder {
                    blunder,
                    white: analysis.white.clone(),
                    black: analysis.black.clone(),
                    game_index: analysis.game_index,
                };
                keep(&mut summary.biggest_blunder, entry, |a, b| {
                    a.blunder.cp_loss > b.blunder.cp_loss
                });
            }
        }

        summary
    }
}

/// Assembles the report. `analyses` is indexed by game index, `None` for
/// games that were skipped or failed.
pub fn build_report(
    batch: &PgnBatch,
    analyses: &[Option<GameAnalysis>],
    players: &[PlayerGames],
    config: &AnalysisConfig,
) -> AnalysisReport {
    let games = batch
        .games
        .iter()
        .map(|game| {
            let analysis = analyses.get(game.game_index).and_then(Option::as_ref);
            GameSummary {
                game_index: game.game_index,
                white: game.white_name().to_string(),
                black: game.black_name().to_string(),
                result: game.result_str().to_string(),
                round: game.round.clone(),
                eco: game.eco.clone(),
                moves: game.move_count(),
                analyzed: analysis.is_some(),
                white_accuracy: analysis.map(|a| round1(a.white_stats.accuracy)),
                black_accuracy: analysis.map(|a| round1(a.black_stats.accuracy)),
                white_acpl: analysis.map(|a| round1(a.white_stats.acpl)),
                black_acpl: analysis.map(|a| round1(a.black_stats.acpl)),
                white_move_quality: analysis.map(|a| a.white_stats.quality),
                black_move_quality: analysis.map(|a| a.black_stats.quality),
                biggest_blunder: analysis.and_then(GameAnalysis::biggest_blunder),
            }
        })
        .collect();

    let players = players
        .iter()
        .map(|p| PlayerReport::build(p, &batch.games, analyses))
        .collect();

    AnalysisReport {
        generated_at: None,
        settings: config.clone(),
        games_parsed: batch.games.len(),
        games_rejected: batch.rejected.len(),
        games_analyzed: analyses.iter().filter(|a| a.is_some()).count(),
        games,
        summary: BatchSummary::from_analyses(analyses.iter().flatten()),
        players,
    }
}
