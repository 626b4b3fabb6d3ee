// src/adapters/possible_actions.rs
//
// Possible-actions adapter: a fixed window over verbal descriptions of the
// currently legal moves.

use std::sync::Arc;

use crate::codec::describe_move;
use crate::config::AdapterKind;
use crate::encoder::Encoder;
use crate::index_cache::IndexCacheSet;
use crate::types::{Action, EnvError, Position};

use super::{AdapterCore, EncodeMode, Representation, StateAdapter};

/// Describes each legal move against the current position, keeps the first
/// `window` descriptions in the order the caller supplied them, and
/// left-pads with empty strings up to the window size. An empty action
/// history marks the start of a fresh episode and yields the all-empty
/// window.
pub struct PossibleActionsAdapter {
    core: AdapterCore,
    window: usize,
}

impl PossibleActionsAdapter {
    pub fn new(window: usize, encoder: Arc<dyn Encoder>, caches: &mut IndexCacheSet) -> Self {
        Self {
            core: AdapterCore::new(AdapterKind::PossibleActions, encoder, caches),
            window,
        }
    }
}

impl StateAdapter for PossibleActionsAdapter {
    fn kind(&self) -> AdapterKind {
        self.core.kind()
    }

    fn encode(
        &mut self,
        position: &Position,
        legal_moves: &[Action],
        action_history: &[Action],
        mode: EncodeMode,
    ) -> Result<Representation, EnvError> {
        if action_history.is_empty() {
            return Ok(self.core.finalize(vec![String::new(); self.window], mode));
        }

        let board = position.board()?;
        let mut phrases = Vec::with_capacity(legal_moves.len().min(self.window));
        for action in legal_moves.iter().take(self.window) {
            phrases.push(describe_move(&board, action.to_move()?)?);
        }

        let mut tokens = vec![String::new(); self.window.saturating_sub(phrases.len())];
        tokens.extend(phrases);
        Ok(self.core.finalize(tokens, mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::HashEncoder;
    use chess::{Board, MoveGen};

    fn adapter(window: usize) -> PossibleActionsAdapter {
        PossibleActionsAdapter::new(window, HashEncoder::shared(8), &mut IndexCacheSet::new())
    }

    fn legal_actions(board: &Board) -> Vec<Action> {
        MoveGen::new_legal(board)
            .map(|m| Action::new(m.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_history_yields_empty_window() {
        let mut adapter = adapter(5);
        let pos = Position::from_board(&Board::default());
        let rep = adapter
            .encode(&pos, &legal_actions(&Board::default()), &[], EncodeMode::Text)
            .unwrap();
        assert!(rep.as_text().unwrap().iter().all(|t| t.is_empty()));
        assert_eq!(rep.len(), 5);
    }

    #[test]
    fn test_window_left_padded_and_fixed_size() {
        let mut adapter = adapter(30);
        let board = Board::default();
        let pos = Position::from_board(&board);
        let legal = legal_actions(&board);
        assert_eq!(legal.len(), 20);
        let rep = adapter
            .encode(&pos, &legal, &[Action::new("e2e4")], EncodeMode::Text)
            .unwrap();
        let tokens = rep.as_text().unwrap();
        assert_eq!(tokens.len(), 30);
        assert!(tokens[..10].iter().all(|t| t.is_empty()));
        assert!(tokens[10..].iter().all(|t| !t.is_empty()));
    }

    #[test]
    fn test_overflow_truncates_to_first_n() {
        let mut adapter = adapter(3);
        let board = Board::default();
        let pos = Position::from_board(&board);
        let legal = legal_actions(&board);
        let rep = adapter
            .encode(&pos, &legal, &[Action::new("e2e4")], EncodeMode::Text)
            .unwrap();
        let tokens = rep.as_text().unwrap();
        assert_eq!(tokens.len(), 3);
        let board = Board::default();
        let expected = describe_move(&board, legal[0].to_move().unwrap()).unwrap();
        assert_eq!(tokens[0], expected);
    }
}
