// src/adapters/board_language.rs
//
// Piece-census adapter: one sentence per player summarising what they have
// left on the board.

use std::sync::Arc;

use chess::{Color, Piece};

use crate::codec::{count_to_words, piece_name, player_name};
use crate::config::AdapterKind;
use crate::encoder::Encoder;
use crate::index_cache::IndexCacheSet;
use crate::types::{Action, EnvError, Position};

use super::{AdapterCore, EncodeMode, Representation, StateAdapter};

/// Counts piece-kind occurrences per player and renders each player's
/// census as one sentence, e.g.
/// "The White player has eight pawn, two rook, ... left on the board."
///
/// Players and piece kinds appear in first-encountered order over an
/// a1-to-h8 board scan, so two boards with the same material in different
/// layouts can phrase the census differently.
pub struct BoardToLanguageAdapter {
    core: AdapterCore,
}

impl BoardToLanguageAdapter {
    pub fn new(encoder: Arc<dyn Encoder>, caches: &mut IndexCacheSet) -> Self {
        Self {
            core: AdapterCore::new(AdapterKind::BoardLanguage, encoder, caches),
        }
    }
}

impl StateAdapter for BoardToLanguageAdapter {
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

        // Vec-of-vecs rather than maps to keep first-encountered order.
        let mut census: Vec<(Color, Vec<(Piece, u32)>)> = Vec::new();
        for square in chess::ALL_SQUARES {
            let (piece, color) = match (board.piece_on(square), board.color_on(square)) {
                (Some(piece), Some(color)) => (piece, color),
                _ => continue,
            };
            let slot = match census.iter().position(|(c, _)| *c == color) {
                Some(i) => i,
                None => {
                    census.push((color, Vec::new()));
                    census.len() - 1
                }
            };
            let player = &mut census[slot].1;
            match player.iter_mut().find(|(p, _)| *p == piece) {
                Some((_, count)) => *count += 1,
                None => player.push((piece, 1)),
            }
        }

        let tokens: Vec<String> = census
            .into_iter()
            .map(|(color, counts)| {
                let mut sentence = format!("The {} player has ", player_name(color));
                for (piece, count) in counts {
                    sentence.push_str(&count_to_words(count));
                    sentence.push(' ');
                    sentence.push_str(piece_name(piece));
                    sentence.push_str(", ");
                }
                sentence.push_str("left on the board.");
                sentence
            })
            .collect();

        Ok(self.core.finalize(tokens, mode))
    }
}
