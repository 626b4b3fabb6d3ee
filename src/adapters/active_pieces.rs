// src/adapters/active_pieces.rs
//
// Active-pieces adapter: one positional phrase per piece on the board.

use std::sync::Arc;

use crate::codec::{piece_name, player_name, square_name};
use crate::config::AdapterKind;
use crate::encoder::Encoder;
use crate::index_cache::IndexCacheSet;
use crate::types::{Action, EnvError, Position};

use super::{AdapterCore, EncodeMode, Representation, StateAdapter};

/// Renders every occupied square as "<Player> <piece> at <square>",
/// scanning a1 through h8. Output length tracks the live piece count, so it
/// shrinks as material comes off.
pub struct ActivePiecesAdapter {
    core: AdapterCore,
}

impl ActivePiecesAdapter {
    pub fn new(encoder: Arc<dyn Encoder>, caches: &mut IndexCacheSet) -> Self {
        Self {
            core: AdapterCore::new(AdapterKind::ActivePieces, encoder, caches),
        }
    }
}

impl StateAdapter for ActivePiecesAdapter {
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
        let tokens: Vec<String> = chess::ALL_SQUARES
            .iter()
            .filter_map(|sq| match (board.piece_on(*sq), board.color_on(*sq)) {
                (Some(piece), Some(color)) => Some(format!(
                    "{} {} at {}",
                    player_name(color),
                    piece_name(piece),
                    square_name(*sq),
                )),
                _ => None,
            })
            .collect();
        Ok(self.core.finalize(tokens, mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::HashEncoder;

    #[test]
    fn test_start_position_has_32_phrases() {
        let mut adapter =
            ActivePiecesAdapter::new(HashEncoder::shared(8), &mut IndexCacheSet::new());
        let rep = adapter
            .encode(
                &Position::from_board(&chess::Board::default()),
                &[],
                &[],
                EncodeMode::Text,
            )
            .unwrap();
        let tokens = rep.as_text().unwrap();
        assert_eq!(tokens.len(), 32);
        assert_eq!(tokens[0], "White rook at a1");
        assert_eq!(tokens[31], "Black rook at h8");
    }

    #[test]
    fn test_length_shrinks_with_material() {
        let mut adapter =
            ActivePiecesAdapter::new(HashEncoder::shared(8), &mut IndexCacheSet::new());
        let pos = Position::new("rnbqkbnr/ppp1pppp/8/3P4/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 2");
        let rep = adapter.encode(&pos, &[], &[], EncodeMode::Text).unwrap();
        assert_eq!(rep.len(), 31);
    }
}
