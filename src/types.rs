// src/types.rs
//
// Common shared types for the Caissa environment core.
//
// Positions and actions are kept as validated string newtypes (FEN and UCI
// move codes) because that is what crosses every boundary in this system:
// the rules engine, the adapters, the human-statistics tables and the
// results recorder all speak FEN/UCI. Parsing into the rules engine's
// native types happens at the point of use.

use std::fmt;
use std::str::FromStr;

use chess::{Board, ChessMove, File, Piece, Rank, Square};
use serde::{Deserialize, Serialize};

/// Sentinel value that requests a full environment reset instead of a move.
pub const ENV_RESET: &str = "ENV_RESET";

/// Immutable serialization of full board state (FEN).
///
/// Produced by the episode engine; adapters only read it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position(String);

impl Position {
    pub fn new(fen: impl Into<String>) -> Self {
        Position(fen.into())
    }

    /// Build from the rules engine's board representation.
    pub fn from_board(board: &Board) -> Self {
        Position(board.to_string())
    }

    pub fn fen(&self) -> &str {
        &self.0
    }

    /// Parse into the rules engine's board type.
    pub fn board(&self) -> Result<Board, EnvError> {
        Board::from_str(&self.0).map_err(|_| EnvError::InvalidFen(self.0.clone()))
    }

    /// Key with the move counters stripped (board, side to move, castling).
    ///
    /// Commentary sources are keyed this way: the same middlegame structure
    /// should hit the same annotation regardless of move number.
    pub fn normalized_key(&self) -> String {
        self.0.split_whitespace().take(3).collect::<Vec<_>>().join(" ")
    }

    /// Whether this is the reset-request sentinel rather than a real position.
    pub fn is_reset_sentinel(&self) -> bool {
        self.0 == ENV_RESET
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single move code: origin square, destination square, optional
/// promotion piece (4-5 characters, e.g. "e2e4" or "e7e8q").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action(String);

impl Action {
    pub fn new(uci: impl Into<String>) -> Self {
        Action(uci.into())
    }

    pub fn as_uci(&self) -> &str {
        &self.0
    }

    /// Whether this is the reset-request sentinel rather than a real move.
    pub fn is_reset_sentinel(&self) -> bool {
        self.0 == ENV_RESET
    }

    /// Parse the move code into the rules engine's move type.
    ///
    /// This validates shape only; legality against a position is checked by
    /// the caller via the rules engine.
    pub fn to_move(&self) -> Result<ChessMove, EnvError> {
        let bytes = self.0.as_bytes();
        if bytes.len() != 4 && bytes.len() != 5 {
            return Err(EnvError::InvalidAction(self.0.clone()));
        }
        let from = parse_square(bytes[0], bytes[1])
            .ok_or_else(|| EnvError::InvalidAction(self.0.clone()))?;
        let to = parse_square(bytes[2], bytes[3])
            .ok_or_else(|| EnvError::InvalidAction(self.0.clone()))?;
        let promotion = match bytes.get(4) {
            None => None,
            Some(b'q') => Some(Piece::Queen),
            Some(b'r') => Some(Piece::Rook),
            Some(b'b') => Some(Piece::Bishop),
            Some(b'n') => Some(Piece::Knight),
            Some(_) => return Err(EnvError::InvalidAction(self.0.clone())),
        };
        Ok(ChessMove::new(from, to, promotion))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn parse_square(file_byte: u8, rank_byte: u8) -> Option<Square> {
    let file = file_byte.checked_sub(b'a')? as usize;
    let rank = rank_byte.checked_sub(b'1')? as usize;
    if file > 7 || rank > 7 {
        return None;
    }
    Some(Square::make_square(
        Rank::from_index(rank),
        File::from_index(file),
    ))
}

/// Errors surfaced by the environment core.
///
/// Input-contract violations (illegal actions, malformed FEN/UCI, missing
/// padding markers) are fatal and propagate; they are never silently
/// corrected or retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    /// FEN string the rules engine refused to parse.
    InvalidFen(String),
    /// Move code that is not a well-formed origin+destination(+promotion).
    InvalidAction(String),
    /// Well-formed move that is not legal in the position it was applied to.
    IllegalAction { action: String, fen: String },
    /// The prior-actions shadow board diverged from the recorded history.
    ShadowReplay {
        action: String,
        fen: String,
        history_len: usize,
    },
    /// CombinedAdapter found no empty placeholder to normalize away.
    MissingPadding,
    /// Unrecognized state-adapter key at configuration time.
    UnknownAdapter(String),
    /// Unrecognized opponent-policy key at configuration time.
    UnknownOpponent(String),
    /// Annotations adapter requested without a commentary table.
    MissingCommentary,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvError::InvalidFen(fen) => write!(f, "invalid FEN: {fen}"),
            EnvError::InvalidAction(uci) => write!(f, "invalid move code: {uci}"),
            EnvError::IllegalAction { action, fen } => {
                write!(f, "illegal action {action} in position {fen}")
            }
            EnvError::ShadowReplay {
                action,
                fen,
                history_len,
            } => write!(
                f,
                "shadow replay diverged: action {action} illegal at {fen} (history length {history_len})"
            ),
            EnvError::MissingPadding => {
                write!(f, "combined representation has no empty placeholder to remove")
            }
            EnvError::UnknownAdapter(key) => write!(f, "unknown state adapter key: {key}"),
            EnvError::UnknownOpponent(key) => write!(f, "unknown opponent policy key: {key}"),
            EnvError::MissingCommentary => {
                write!(f, "annotations adapter requires a commentary table")
            }
        }
    }
}

impl std::error::Error for EnvError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_roundtrip_start() {
        let board = Board::default();
        let pos = Position::from_board(&board);
        let parsed = pos.board().unwrap();
        assert_eq!(parsed, board);
    }

    #[test]
    fn test_position_normalized_key_strips_counters() {
        let pos = Position::new("rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2");
        assert_eq!(
            pos.normalized_key(),
            "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq"
        );
    }

    #[test]
    fn test_action_parse_plain_and_promotion() {
        let mv = Action::new("e2e4").to_move().unwrap();
        assert_eq!(mv.get_promotion(), None);
        assert_eq!(mv.get_source().to_string(), "e2");
        assert_eq!(mv.get_dest().to_string(), "e4");

        let promo = Action::new("e7e8q").to_move().unwrap();
        assert_eq!(promo.get_promotion(), Some(Piece::Queen));
    }

    #[test]
    fn test_action_parse_rejects_garbage() {
        assert!(Action::new("e2").to_move().is_err());
        assert!(Action::new("z9z9").to_move().is_err());
        assert!(Action::new("e7e8x").to_move().is_err());
    }

    #[test]
    fn test_reset_sentinel() {
        assert!(Action::new(ENV_RESET).is_reset_sentinel());
        assert!(!Action::new("e2e4").is_reset_sentinel());
    }
}
