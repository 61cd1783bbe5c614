//! PGN file parsing functionality

use pgn_reader::{RawTag, SanPlus, Skip, Visitor};
use shakmaty::{Chess, Position};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::ops::ControlFlow;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Represents a parsed chess game
#[derive(Debug, Clone)]
pub struct PgnGame {
    /// Position of this game among the accepted games of its batch
    pub game_index: usize,
    pub event: Option<String>,
    pub site: Option<String>,
    pub date: Option<String>,
    pub round: Option<String>,
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>,
    pub white_elo: Option<u16>,
    pub black_elo: Option<u16>,
    pub eco: Option<String>,
    pub opening: Option<String>,
    pub termination: Option<String>,
    pub game_url: Option<String>,
    /// Mainline moves in SAN, including check and mate suffixes
    pub moves: Vec<String>,
}

impl PgnGame {
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn white_name(&self) -> &str {
        self.white.as_deref().unwrap_or("Unknown")
    }

    pub fn black_name(&self) -> &str {
        self.black.as_deref().unwrap_or("Unknown")
    }

    pub fn result_str(&self) -> &str {
        self.result.as_deref().unwrap_or("*")
    }

    pub fn summary(&self) -> String {
        format!("{} vs {} - {}", self.white_name(), self.black_name(), self.result_str())
    }
}

#[derive(Default)]
struct GameTags {
    event: Option<String>,
    site: Option<String>,
    date: Option<String>,
    round: Option<String>,
    white: Option<String>,
    black: Option<String>,
    result: Option<String>,
    white_elo: Option<u16>,
    black_elo: Option<u16>,
    eco: Option<String>,
    opening: Option<String>,
    termination: Option<String>,
    game_url: Option<String>,
}

struct GameMoves {
    tags: GameTags,
    moves: Vec<String>,
    current_position: Chess,
    /// First SAN that could not be played, with its ply
    failure: Option<(usize, String)>,
}

/// Why a single game was left out of a batch
#[derive(Debug, Clone)]
pub struct RejectedGame {
    /// Ordinal of the game in the source text, counting rejected ones
    pub ordinal: usize,
    pub white: Option<String>,
    pub black: Option<String>,
    pub ply: usize,
    pub san: String,
}

struct GameParser;

impl Visitor for GameParser {
    type Tags = GameTags;
    type Movetext = GameMoves;
    type Output = Result<PgnGame, RejectedGame>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(GameTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let name_str = String::from_utf8_lossy(name);
        let value_str = value.decode_utf8_lossy().to_string();

        match name_str.as_ref() {
            "Event" => tags.event = Some(value_str),
            "Site" => tags.site = Some(value_str),
            "Date" => tags.date = Some(value_str),
            "Round" => tags.round = Some(value_str),
            "White" => tags.white = Some(value_str),
            "Black" => tags.black = Some(value_str),
            "Result" => tags.result = Some(value_str),
            "WhiteElo" => tags.white_elo = value_str.parse().ok(),
            "BlackElo" => tags.black_elo = value_str.parse().ok(),
            "ECO" => tags.eco = Some(value_str),
            "Opening" => tags.opening = Some(value_str),
            "Termination" => tags.termination = Some(value_str),
            "GameURL" => tags.game_url = Some(value_str),
            _ => {}
        }

        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(GameMoves {
            tags,
            moves: Vec::new(),
            current_position: Chess::default(),
            failure: None,
        })
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        if movetext.failure.is_some() {
            return ControlFlow::Continue(());
        }

        let ply = movetext.moves.len();
        let played = san
            .san
            .to_move(&movetext.current_position)
            .ok()
            .and_then(|m| movetext.current_position.clone().play(m).ok());

        match played {
            Some(new_pos) => {
                movetext.current_position = new_pos;
                movetext.moves.push(san.to_string());
            }
            None => movetext.failure = Some((ply, san.to_string())),
        }

        ControlFlow::Continue(())
    }

    fn begin_variation(
        &mut self,
        _movetext: &mut Self::Movetext,
    ) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        let tags = movetext.tags;

        if let Some((ply, san)) = movetext.failure {
            return Err(RejectedGame {
                ordinal: 0,
                white: tags.white,
                black: tags.black,
                ply,
                san,
            });
        }

        let game_url = tags.game_url.or_else(|| tags.site.clone());
        Ok(PgnGame {
            game_index: 0,
            event: tags.event,
            site: tags.site,
            date: tags.date,
            round: tags.round,
            white: tags.white,
            black: tags.black,
            result: tags.result,
            white_elo: tags.white_elo,
            black_elo: tags.black_elo,
            eco: tags.eco,
            opening: tags.opening,
            termination: tags.termination,
            game_url,
            moves: movetext.moves,
        })
    }
}

#[derive(Error, Debug)]
pub enum PgnError {
    #[error("File error: {0}")]
    File(#[from] io::Error),
    #[error("No valid games found in PGN")]
    NoGamesFound,
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Games accepted from one PGN source, plus the ones that were skipped
#[derive(Debug, Clone)]
pub struct PgnBatch {
    pub games: Vec<PgnGame>,
    pub rejected: Vec<RejectedGame>,
}

pub fn parse_pgn_file<P: AsRef<Path>>(path: P) -> Result<PgnBatch, PgnError> {
    let file = File::open(path)?;
    parse_pgn_reader(BufReader::new(file))
}

pub fn parse_pgn_string(pgn: &str) -> Result<PgnBatch, PgnError> {
    parse_pgn_reader(pgn.as_bytes())
}

/// Parses every game in `input`.
///
/// Input is read as bytes and tag values are decoded lossily. A game with an
/// illegal or unreadable move is skipped and reported in
/// [`PgnBatch::rejected`]; the rest of the batch is still returned.
pub fn parse_pgn_reader<R: Read>(input: R) -> Result<PgnBatch, PgnError> {
    let mut parser = GameParser;
    let mut games: Vec<PgnGame> = Vec::new();
    let mut rejected: Vec<RejectedGame> = Vec::new();

    let mut reader = pgn_reader::Reader::new(input);
    let mut ordinal = 0;

    loop {
        match reader.read_game(&mut parser) {
            Ok(Some(Ok(mut game))) => {
                game.game_index = games.len();
                debug!(game_index = game.game_index, moves = game.move_count(), "parsed game");
                games.push(game);
            }
            Ok(Some(Err(mut skipped))) => {
                skipped.ordinal = ordinal;
                warn!(
                    ordinal,
                    ply = skipped.ply,
                    san = %skipped.san,
                    "skipping game with an illegal move"
                );
                rejected.push(skipped);
            }
            Ok(None) => break,
            Err(e) => return Err(PgnError::Parse(e.to_string())),
        }
        ordinal += 1;
    }

    if games.is_empty() {
        Err(PgnError::NoGamesFound)
    } else {
        Ok(PgnBatch { games, rejected })
    }
}
