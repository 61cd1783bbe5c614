use std::collections::HashMap;

use chess_insights_core::engine::EngineError;
use chess_insights_core::parser::parse_pgn_string;
use chess_insights_core::position::replay_san;
use chess_insights_core::{
    analyze_batch, AnalysisConfig, EngineVerdict, Evaluator, HighlightKind, PositionEvaluation,
};

/// Answers from a fixed table of FEN -> centipawns
#[derive(Default)]
struct TableEvaluator {
    scores: HashMap<String, i32>,
    calls: usize,
}

impl TableEvaluator {
    /// `scores[i]` is the evaluation of the position before ply `i`;
    /// the last entry is the final position
    fn script(&mut self, moves: &str, scores: &[i32]) {
        let moves: Vec<String> = moves.split_whitespace().map(str::to_string).collect();
        let plies = replay_san(&moves).unwrap();
        for (ply, score) in plies.iter().zip(scores) {
            self.scores.insert(ply.fen_before.clone(), *score);
        }
        if let (Some(last), Some(score)) = (plies.last(), scores.get(plies.len())) {
            self.scores.insert(last.fen_after.clone(), *score);
        }
    }
}

impl Evaluator for TableEvaluator {
    fn evaluate(&mut self, fen: &str, _depth: u8) -> Result<EngineVerdict, EngineError> {
        self.calls += 1;
        let score = self
            .scores
            .get(fen)
            .copied()
            .ok_or_else(|| EngineError::Protocol(format!("unscripted position {}", fen)))?;
        Ok(EngineVerdict {
            evaluation: PositionEvaluation::centipawns(score),
            best_move: None,
        })
    }
}

const QUEEN_TRAP: &str = "e4 e5 Nf3 Qh4 Nxh4 Nc6 Nf3 d6";
const FOOLS_MATE: &str = "f3 e5 g4 Qh4#";

const PGN: &str = r#"[Event "Club Night"]
[Round "1"]
[White "Anna"]
[Black "Ben"]
[Result "1-0"]
[ECO "C40"]

1. e4 e5 2. Nf3 Qh4 3. Nxh4 Nc6 4. Nf3 d6 1-0

[Event "Club Night"]
[Round "2"]
[White "Ben"]
[Black "Anna"]
[Result "0-1"]
[ECO "A00"]

1. f3 e5 2. g4 Qh4# 0-1

[Event "Club Night"]
[Round "3"]
[White "Ben"]
[Black "Anna"]
[Result "*"]

1. e4 e5 2. Ke3 *
"#;

fn evaluator() -> TableEvaluator {
    let mut evaluator = TableEvaluator::default();
    evaluator.script(QUEEN_TRAP, &[0, 30, 25, 30, 600, 620, 610, 630, 640]);
    evaluator.script(FOOLS_MATE, &[0, -50, -100, -300]);
    evaluator
}

fn config() -> AnalysisConfig {
    AnalysisConfig {
        min_games: 1,
        ..Default::default()
    }
}

#[test]
fn illegal_game_is_rejected_not_fatal() {
    let batch = parse_pgn_string(PGN).unwrap();
    assert_eq!(batch.games.len(), 2);
    assert_eq!(batch.rejected.len(), 1);
    assert_eq!(batch.rejected[0].san, "Ke3");
}

#[test]
fn report_covers_games_summary_and_players() {
    let batch = parse_pgn_string(PGN).unwrap();
    let mut evaluator = evaluator();
    let report = analyze_batch(&batch, &mut evaluator, &config()).unwrap();

    // nine positions, then four more; the mated position is never sent
    assert_eq!(evaluator.calls, 13);
    assert_eq!(report.games_parsed, 2);
    assert_eq!(report.games_rejected, 1);
    assert_eq!(report.games_analyzed, 2);

    let first = &report.games[0];
    assert_eq!(first.white_accuracy, Some(100.0));
    assert_eq!(first.black_move_quality.unwrap().blunders, 1);

    let blunder = report.summary.biggest_blunder.as_ref().unwrap();
    assert_eq!(blunder.game_index, 0);
    assert_eq!(blunder.blunder.san, "Qh4");
    assert_eq!(blunder.blunder.cp_loss, 570);

    let king = report.summary.accuracy_king.as_ref().unwrap();
    assert_eq!((king.game_index, king.white.as_str()), (0, "Anna"));

    let names: Vec<&str> = report.players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Anna", "Ben"]);
}

#[test]
fn highlights_belong_to_the_mover() {
    let batch = parse_pgn_string(PGN).unwrap();
    let report = analyze_batch(&batch, &mut evaluator(), &config()).unwrap();

    let anna = &report.players[0];
    let kinds: Vec<HighlightKind> = anna.highlights.iter().map(|h| h.kind).collect();
    assert_eq!(
        kinds,
        vec![
            HighlightKind::Checkmate,
            HighlightKind::BrilliantMove,
            HighlightKind::TacticalCheck
        ]
    );
    let mate = &anna.highlights[0];
    let context = mate.context.as_ref().unwrap();
    assert_eq!(context.player, "Anna");
    assert_eq!(context.opponent, "Ben");
    assert_eq!(context.round.as_deref(), Some("2"));
    assert_eq!(mate.eval_after.as_deref(), Some("-M1"));
    assert_eq!(anna.stats.checkmates, 1);
    assert_eq!(anna.stats.wins, 2);

    let ben = &report.players[1];
    assert_eq!(ben.highlights.len(), 1);
    assert_eq!(ben.highlights[0].kind, HighlightKind::Blunder);
    assert_eq!(ben.highlights[0].san, "Qh4");
}

#[test]
fn report_json_shape() {
    let batch = parse_pgn_string(PGN).unwrap();
    let report = analyze_batch(&batch, &mut evaluator(), &config()).unwrap();

    let mut out = Vec::new();
    report.write_json(&mut out).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(json["settings"]["depth"], 15);
    assert_eq!(json["settings"]["minGames"], 1);
    assert!(json["settings"].get("stockfishPath").is_none());
    assert_eq!(json["games"][0]["whiteACPL"], 0.0);
    assert_eq!(json["summary"]["biggestBlunder"]["move"], "Qh4");
    assert_eq!(json["summary"]["biggestBlunder"]["player"], "black");
    assert_eq!(json["players"][0]["highlights"][0]["type"], "checkmate");
    assert_eq!(json["players"][0]["highlights"][0]["priorityTier"], 1);
    assert!(json.get("generatedAt").is_none());
}

#[test]
fn unmatched_player_filter_is_an_error() {
    let batch = parse_pgn_string(PGN).unwrap();
    let config = AnalysisConfig {
        player_filter: Some("zed".into()),
        ..config()
    };
    let err = analyze_batch(&batch, &mut evaluator(), &config).unwrap_err();
    assert!(matches!(err, chess_insights_core::Error::Config(_)));
}
