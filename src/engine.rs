// src/engine.rs
//
// Thin episode engine over the rules engine: reset, step, legal moves.
//
// The engine owns the authoritative board. It knows nothing about rewards
// beyond the zero default (the driver computes the real signal), and it
// reports termination purely from the rules engine's game-over test.

use chess::{Board, BoardStatus, MoveGen};

use crate::types::{Action, EnvError, Position};

/// Result of one engine step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Position after the move (or the start position after a reset).
    pub position: Position,
    /// Always zero here; the driver owns the reward signal.
    pub reward: f64,
    /// Rules-engine game-over signal.
    pub terminated: bool,
}

/// Authoritative game state for one episode at a time.
#[derive(Debug)]
pub struct EpisodeEngine {
    board: Board,
}

impl Default for EpisodeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EpisodeEngine {
    pub fn new() -> Self {
        Self {
            board: Board::default(),
        }
    }

    /// Fully reset to the standard start position.
    pub fn reset(&mut self) -> Position {
        self.board = Board::default();
        Position::from_board(&self.board)
    }

    /// Current position.
    pub fn position(&self) -> Position {
        Position::from_board(&self.board)
    }

    /// Legal moves in the current position; explicitly empty at terminal
    /// positions rather than an error.
    pub fn legal_moves(&self) -> Vec<Action> {
        MoveGen::new_legal(&self.board)
            .map(|m| Action::new(m.to_string()))
            .collect()
    }

    /// Apply one move.
    ///
    /// The reset sentinel in either slot performs a full reset instead of a
    /// move. A well-formed but illegal move is a caller bug and fatal; the
    /// engine never substitutes a different move.
    pub fn step(&mut self, state: &Position, action: &Action) -> Result<StepOutcome, EnvError> {
        if state.is_reset_sentinel() || action.is_reset_sentinel() {
            let position = self.reset();
            return Ok(StepOutcome {
                position,
                reward: 0.0,
                terminated: false,
            });
        }

        let mv = action.to_move()?;
        if !self.board.legal(mv) {
            return Err(EnvError::IllegalAction {
                action: action.as_uci().to_string(),
                fen: self.board.to_string(),
            });
        }
        self.board = self.board.make_move_new(mv);

        Ok(StepOutcome {
            position: Position::from_board(&self.board),
            reward: 0.0,
            terminated: self.board.status() != BoardStatus::Ongoing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ENV_RESET;

    #[test]
    fn test_reset_returns_start_position() {
        let mut engine = EpisodeEngine::new();
        let pos = engine.reset();
        assert_eq!(
            pos.fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }

    #[test]
    fn test_step_applies_legal_move() {
        let mut engine = EpisodeEngine::new();
        let start = engine.reset();
        let outcome = engine.step(&start, &Action::new("e2e4")).unwrap();
        assert!(!outcome.terminated);
        assert_eq!(outcome.reward, 0.0);
        assert!(outcome.position.fen().starts_with("rnbqkbnr/pppppppp/8/8/4P3/"));
    }

    #[test]
    fn test_step_rejects_illegal_move() {
        let mut engine = EpisodeEngine::new();
        let start = engine.reset();
        assert!(matches!(
            engine.step(&start, &Action::new("e2e5")),
            Err(EnvError::IllegalAction { .. })
        ));
    }

    #[test]
    fn test_sentinel_action_resets() {
        let mut engine = EpisodeEngine::new();
        let start = engine.reset();
        engine.step(&start, &Action::new("e2e4")).unwrap();
        let outcome = engine
            .step(&engine.position(), &Action::new(ENV_RESET))
            .unwrap();
        assert!(!outcome.terminated);
        assert_eq!(outcome.position, Position::from_board(&Board::default()));
    }

    #[test]
    fn test_legal_moves_at_start() {
        let engine = EpisodeEngine::new();
        assert_eq!(engine.legal_moves().len(), 20);
    }

    #[test]
    fn test_terminal_detection_and_empty_legal_moves() {
        let mut engine = EpisodeEngine::new();
        engine.reset();
        // Fool's mate.
        for (i, uci) in ["f2f3", "e7e5", "g2g4", "d8h4"].iter().enumerate() {
            let outcome = engine.step(&engine.position(), &Action::new(*uci)).unwrap();
            assert_eq!(outcome.terminated, i == 3);
        }
        assert!(engine.legal_moves().is_empty());
    }
}
