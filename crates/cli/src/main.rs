//! chess-insights: PGN in, accuracy and highlights JSON out

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chess_insights_core::config::{
    DEFAULT_DEPTH, DEFAULT_MIN_GAMES, DEFAULT_SAMPLE_STRIDE, DEFAULT_STOCKFISH_PATH,
};
use chess_insights_core::{
    analyze_batch, parse_pgn_file, parse_pgn_reader, AnalysisConfig, PgnBatch, StockfishEngine,
};

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// PGN file to analyze, or `-` to read standard input
    pgn: String,

    /// Write the JSON report here instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Engine search depth per position
    #[arg(long, env = "CHESS_INSIGHTS_DEPTH", default_value_t = DEFAULT_DEPTH)]
    depth: u8,

    /// Analyze every Nth move of each side
    #[arg(long, env = "CHESS_INSIGHTS_SAMPLE", default_value_t = DEFAULT_SAMPLE_STRIDE)]
    sample: usize,

    /// Minimum games for a player to get a section
    #[arg(long, env = "CHESS_INSIGHTS_MIN_GAMES", default_value_t = DEFAULT_MIN_GAMES)]
    min_games: usize,

    /// Only players whose name contains this (case-insensitive)
    #[arg(long, env = "CHESS_INSIGHTS_PLAYER")]
    player: Option<String>,

    /// Keep at most this many players
    #[arg(long, env = "CHESS_INSIGHTS_LIMIT")]
    limit: Option<usize>,

    /// Stockfish executable
    #[arg(long, env = "STOCKFISH_PATH", default_value = DEFAULT_STOCKFISH_PATH)]
    stockfish_path: String,
}

impl Args {
    fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            depth: self.depth,
            sample_stride: self.sample,
            min_games: self.min_games,
            player_filter: self.player.clone(),
            player_limit: self.limit,
            stockfish_path: self.stockfish_path.clone(),
        }
    }
}

fn read_batch(source: &str) -> anyhow::Result<PgnBatch> {
    let batch = if source == "-" {
        parse_pgn_reader(io::stdin().lock()).context("failed to read PGN from stdin")?
    } else {
        parse_pgn_file(source).with_context(|| format!("failed to read PGN from '{}'", source))?
    };
    Ok(batch)
}

/// `RUST_LOG` when set and valid, `info` otherwise
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(log_filter())
        .init();

    let args = Args::parse();
    let config = args.config();
    config.validate()?;

    let batch = read_batch(&args.pgn)?;
    info!(
        games = batch.games.len(),
        rejected = batch.rejected.len(),
        "Parsed PGN"
    );

    let mut engine = StockfishEngine::new(&config.stockfish_path)
        .with_context(|| format!("failed to start Stockfish at '{}'", config.stockfish_path))?;

    let mut report = analyze_batch(&batch, &mut engine, &config)?;
    report.generated_at = Some(chrono::Utc::now().to_rfc3339());

    for player in &report.players {
        let kinds: Vec<&str> = player.highlights.iter().map(|h| h.kind.display_name()).collect();
        info!("{}: {} games, highlights: {}", player.name, player.stats.games, kinds.join(", "));
    }

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create '{}'", path.display()))?;
            report.write_json(BufWriter::new(file))?;
            info!("Report written to {}", path.display());
        }
        None => report.write_json(io::stdout().lock())?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_rust_log_sets_the_level() {
        std::env::set_var("RUST_LOG", "debug");
        assert_eq!(log_filter().max_level_hint(), Some(LevelFilter::DEBUG));

        std::env::remove_var("RUST_LOG");
        assert_eq!(log_filter().max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_args_build_config() {
        let args = Args::parse_from([
            "chess-insights",
            "games.pgn",
            "--depth",
            "12",
            "--player",
            "anna",
        ]);
        let config = args.config();
        assert_eq!(config.depth, 12);
        assert_eq!(config.player_filter.as_deref(), Some("anna"));
        assert_eq!(config.sample_stride, DEFAULT_SAMPLE_STRIDE);
    }
}
