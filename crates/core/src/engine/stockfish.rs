//! Stockfish chess engine interface
//!
//! Spawns Stockfish as a subprocess and communicates via UCI protocol.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Duration;

use shakmaty::Color;
use thiserror::Error;
use tracing::{debug, info};

use super::evaluation::{EngineVerdict, Evaluator, PositionEvaluation, ScoreKind};

/// Error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to start the engine process
    #[error("Failed to start engine: {0}")]
    Spawn(String),
    /// Failed to communicate with engine
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Engine returned unexpected response
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Raw result of one `go depth` search
#[derive(Debug, Clone)]
pub struct SearchInfo {
    /// Best move in UCI notation, `None` when the engine answered `(none)`
    pub best_move: Option<String>,
    /// Score relative to the side to move
    pub score: PositionEvaluation,
    /// Deepest iteration reported before `bestmove`
    pub depth: u8,
}

/// Wrapper around Stockfish chess engine
pub struct StockfishEngine {
    /// The child process
    process: Child,
    /// Stdin for sending commands
    stdin: ChildStdin,
    /// Stdout reader for receiving responses
    stdout: BufReader<ChildStdout>,
}

impl StockfishEngine {
    /// Creates a new Stockfish engine instance
    ///
    /// # Arguments
    /// * `path` - Path to stockfish binary (or "stockfish" if in PATH)
    ///
    /// # Example
    /// ```ignore
    /// let mut engine = StockfishEngine::new("stockfish")?;
    /// ```
    pub fn new(path: &str) -> Result<Self, EngineError> {
        let mut process = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| EngineError::Spawn(format!("{}: {}", path, e)))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Spawn("Failed to open stdin".into()))?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::Spawn("Failed to open stdout".into()))?;

        let mut engine = StockfishEngine {
            process,
            stdin,
            stdout: BufReader::new(stdout),
        };

        engine.init_uci()?;
        info!(path, "Stockfish ready");

        Ok(engine)
    }

    fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        debug!(cmd, "engine <");
        writeln!(self.stdin, "{}", cmd)?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, EngineError> {
        let mut line = String::new();
        let read = self.stdout.read_line(&mut line)?;
        if read == 0 {
            return Err(EngineError::Protocol("engine closed its output".into()));
        }
        Ok(line.trim().to_string())
    }

    /// Reads lines until we get the expected response
    fn read_until(&mut self, expected: &str) -> Result<Vec<String>, EngineError> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            let done = line.starts_with(expected);
            lines.push(line);
            if done {
                break;
            }
        }
        Ok(lines)
    }

    fn init_uci(&mut self) -> Result<(), EngineError> {
        self.send("uci")?;
        self.read_until("uciok")?;

        self.send("isready")?;
        self.read_until("readyok")?;
        Ok(())
    }

    /// Sets the position to search from a FEN string
    pub fn set_position(&mut self, fen: &str) -> Result<(), EngineError> {
        self.send(&format!("position fen {}", fen))
    }

    /// Searches the current position to a fixed depth
    pub fn search(&mut self, depth: u8) -> Result<SearchInfo, EngineError> {
        self.send(&format!("go depth {}", depth))?;

        let mut info = SearchInfo {
            best_move: None,
            score: PositionEvaluation::unknown(),
            depth: 0,
        };

        loop {
            let line = self.read_line()?;

            if line.starts_with("bestmove") {
                // "bestmove e2e4 ponder e7e5" or "bestmove (none)"
                info.best_move = line
                    .split_whitespace()
                    .nth(1)
                    .filter(|mv| *mv != "(none)")
                    .map(str::to_string);
                break;
            } else if line.starts_with("info") {
                parse_info_line(&line, &mut info);
            }
        }

        Ok(info)
    }

    /// Quit the engine cleanly
    pub fn quit(&mut self) -> Result<(), EngineError> {
        self.send("quit")?;
        std::thread::sleep(Duration::from_millis(100));
        let _ = self.process.kill();
        Ok(())
    }
}

impl Evaluator for StockfishEngine {
    fn evaluate(&mut self, fen: &str, depth: u8) -> Result<EngineVerdict, EngineError> {
        let turn = side_to_move(fen)?;
        self.set_position(fen)?;
        let search = self.search(depth)?;
        debug!(
            depth = search.depth,
            score = %search.score,
            best_move = search.best_move.as_deref().unwrap_or("(none)"),
            "search finished"
        );

        let evaluation = match search.score {
            // The side to move is already mated: record it for the side that mated.
            PositionEvaluation { kind: ScoreKind::Mate, value: 0 } => {
                PositionEvaluation::checkmate_by(turn.other())
            }
            score => score.white_relative(turn),
        };

        Ok(EngineVerdict {
            evaluation,
            best_move: search.best_move,
        })
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        let _ = self.quit();
    }
}

fn side_to_move(fen: &str) -> Result<Color, EngineError> {
    match fen.split_whitespace().nth(1) {
        Some("w") => Ok(Color::White),
        Some("b") => Ok(Color::Black),
        _ => Err(EngineError::Protocol(format!("FEN without side to move: {}", fen))),
    }
}

/// Parses an info line from Stockfish into the running search info
fn parse_info_line(line: &str, info: &mut SearchInfo) {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let mut i = 0;

    while i < parts.len() {
        match parts[i] {
            "depth" => {
                if i + 1 < parts.len() {
                    info.depth = parts[i + 1].parse().unwrap_or(0);
                }
                i += 2;
            }
            "score" => {
                if i + 2 < parts.len() {
                    let value = parts[i + 2].parse::<i32>().unwrap_or(0);
                    info.score = match parts[i + 1] {
                        "cp" => PositionEvaluation::centipawns(value),
                        "mate" => PositionEvaluation::mate(value),
                        _ => PositionEvaluation::unknown(),
                    };
                }
                i += 3;
            }
            // the principal variation runs to the end of the line
            "pv" => break,
            _ => {
                i += 1;
            }
        }
    }
}
