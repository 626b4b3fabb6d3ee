// src/adapters/board.rs
//
// Raw-board adapter: the position as 64 single-character piece tokens.

use std::sync::Arc;

use chess::{File, Rank, Square};

use crate::codec::piece_token;
use crate::config::AdapterKind;
use crate::encoder::Encoder;
use crate::index_cache::IndexCacheSet;
use crate::types::{Action, EnvError, Position};

use super::{AdapterCore, EncodeMode, Representation, StateAdapter};

/// Renders the board as one token per square, a1 through h8, after
/// mirroring the board vertically so the token sequence reads from the
/// mover-facing side.
pub struct BoardAdapter {
    core: AdapterCore,
}

impl BoardAdapter {
    pub fn new(encoder: Arc<dyn Encoder>, caches: &mut IndexCacheSet) -> Self {
        Self {
            core: AdapterCore::new(AdapterKind::Board, encoder, caches),
        }
    }
}

impl StateAdapter for BoardAdapter {
    fn kind(&self) -> AdapterKind {
        self.core.kind()
    }

    fn encode(
        &mut self,
        position: &Position,
        _legal_moves: &[Action],
        _action_history: &[Action],
        mode: EncodeMode,
    ) -> Result<Representation, EnvError> {
        let board = position.board()?;
        // Vertical mirror: output square (file, rank) reads the piece at
        // (file, 7 - rank) of the actual board.
        let tokens: Vec<String> = (0..8)
            .flat_map(|rank| (0..8).map(move |file| (rank, file)))
            .map(|(rank, file)| {
                let source = Square::make_square(Rank::from_index(7 - rank), File::from_index(file));
                piece_token(&board, source)
            })
            .collect();
        Ok(self.core.finalize(tokens, mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::HashEncoder;

    fn adapter() -> BoardAdapter {
        BoardAdapter::new(HashEncoder::shared(8), &mut IndexCacheSet::new())
    }

    #[test]
    fn test_start_position_is_64_tokens_mirrored() {
        let mut adapter = adapter();
        let rep = adapter
            .encode(
                &Position::from_board(&chess::Board::default()),
                &[],
                &[],
                EncodeMode::Text,
            )
            .unwrap();
        let tokens = rep.as_text().unwrap();
        assert_eq!(tokens.len(), 64);
        // Mirrored: black's back rank occupies the first eight tokens.
        assert_eq!(
            &tokens[0..8],
            &["r", "n", "b", "q", "k", "b", "n", "r"]
        );
        assert_eq!(
            &tokens[56..64],
            &["R", "N", "B", "Q", "K", "B", "N", "R"]
        );
        assert!(tokens[16..48].iter().all(|t| t == "."));
    }

    #[test]
    fn test_indexed_matches_token_order() {
        let mut adapter = adapter();
        let pos = Position::from_board(&chess::Board::default());
        let text = adapter.encode(&pos, &[], &[], EncodeMode::Text).unwrap();
        let indexed = adapter.encode(&pos, &[], &[], EncodeMode::Indexed).unwrap();
        let (tokens, ids) = match (text, indexed) {
            (Representation::Text(t), Representation::Indexed(i)) => (t, i),
            _ => unreachable!(),
        };
        // Same token, same id, everywhere.
        assert_eq!(tokens[0], tokens[7]);
        assert_eq!(ids[0], ids[7]);
        assert_ne!(ids[0], ids[1]);
    }
}
