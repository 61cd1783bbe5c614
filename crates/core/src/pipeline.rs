//! Drives games through evaluation, classification and detection

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::engine::{EngineVerdict, Evaluator, PositionEvaluation};
use crate::error::Result;
use crate::insights::{Assessment, GameAnalysis, MoveRecord};
use crate::parser::{PgnBatch, PgnGame};
use crate::patterns::HighlightDetector;
use crate::players::{build_roster, select_players};
use crate::position::replay_mainline;
use crate::report::{build_report, AnalysisReport};

/// Engine verdicts per position index; position `i` is the one before ply `i`
struct PositionCache {
    verdicts: Vec<Option<EngineVerdict>>,
}

impl PositionCache {
    fn new(positions: usize) -> Self {
        Self {
            verdicts: vec![None; positions],
        }
    }

    fn insert(&mut self, index: usize, verdict: EngineVerdict) {
        self.verdicts[index] = Some(verdict);
    }

    fn get_or_evaluate<E: Evaluator + ?Sized>(
        &mut self,
        index: usize,
        fen: &str,
        evaluator: &mut E,
        depth: u8,
    ) -> Result<EngineVerdict> {
        if let Some(verdict) = &self.verdicts[index] {
            return Ok(verdict.clone());
        }
        let verdict = evaluator.evaluate(fen, depth)?;
        self.verdicts[index] = Some(verdict.clone());
        Ok(verdict)
    }
}

/// Evaluates, classifies and scans one game.
///
/// Plies skipped by sampling still get a [`MoveRecord`], without an
/// assessment. Positions ending in checkmate are scored without asking the
/// engine. Any evaluator failure aborts the game.
pub fn analyze_game<E: Evaluator + ?Sized>(
    game: &PgnGame,
    evaluator: &mut E,
    config: &AnalysisConfig,
) -> Result<GameAnalysis> {
    let plies = replay_mainline(game)?;
    let mut cache = PositionCache::new(plies.len() + 1);
    let mut records = Vec::with_capacity(plies.len());

    for ply in plies {
        let index = ply.ply_index;

        if !config.is_sampled(index) {
            records.push(MoveRecord { ply, assessment: None });
            continue;
        }

        if ply.is_checkmate {
            cache.insert(
                index + 1,
                EngineVerdict {
                    evaluation: PositionEvaluation::checkmate_by(ply.color),
                    best_move: None,
                },
            );
        }

        let before = cache.get_or_evaluate(index, &ply.fen_before, evaluator, config.depth)?;
        let after = cache.get_or_evaluate(index + 1, &ply.fen_after, evaluator, config.depth)?;

        let assessment = Assessment::new(
            before.evaluation,
            after.evaluation,
            ply.color,
            before.best_move,
        );
        debug!(
            ply = index,
            san = %ply.san,
            before = %assessment.eval_before,
            after = %assessment.eval_after,
            classification = assessment.classification.as_str(),
            "assessed move"
        );

        records.push(MoveRecord {
            ply,
            assessment: Some(assessment),
        });
    }

    let mut analysis = GameAnalysis::from_records(
        game.game_index,
        game.white_name(),
        game.black_name(),
        records,
    );
    analysis.highlights = HighlightDetector::new(&analysis).detect();

    Ok(analysis)
}

/// Analyzes a parsed batch and assembles the report.
///
/// With a player filter or limit, only games involving the selected players
/// reach the engine. A game whose analysis fails is logged and reported as
/// not analyzed.
pub fn analyze_batch<E: Evaluator + ?Sized>(
    batch: &PgnBatch,
    evaluator: &mut E,
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    config.validate()?;

    let players = select_players(build_roster(&batch.games), config)?;
    let wanted: Option<HashSet<usize>> = config.narrows_players().then(|| {
        players
            .iter()
            .flat_map(|p| p.appearances.iter().map(|a| a.game_index))
            .collect()
    });

    let total = batch.games.len();
    let mut analyses = Vec::with_capacity(total);

    for game in &batch.games {
        if wanted.as_ref().is_some_and(|w| !w.contains(&game.game_index)) {
            analyses.push(None);
            continue;
        }

        info!(
            game_index = game.game_index,
            total,
            "Analyzing {}",
            game.summary()
        );
        match analyze_game(game, evaluator, config) {
            Ok(analysis) => analyses.push(Some(analysis)),
            Err(e) => {
                warn!(game_index = game.game_index, error = %e, "Game analysis failed");
                analyses.push(None);
            }
        }
    }

    Ok(build_report(batch, &analyses, &players, config))
}
