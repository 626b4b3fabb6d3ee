// src/adapters/combined.rs
//
// Combined adapter: the four language adapters concatenated into one state
// description.

use std::sync::Arc;

use crate::config::{AdapterKind, EnvConfig};
use crate::encoder::Encoder;
use crate::index_cache::IndexCacheSet;
use crate::types::{Action, EnvError, Position};

use super::{
    ActivePiecesAdapter, AdapterCore, BoardToLanguageAdapter, EncodeMode, PossibleActionsAdapter,
    PriorActionsAdapter, Representation, StateAdapter,
};

/// Concatenates the text outputs of BoardToLanguage, ActivePieces,
/// PriorActions and PossibleActions, in that order, then removes exactly
/// one empty placeholder before encoding. The windowed sub-adapters always
/// contribute at least one empty token, so a missing placeholder means a
/// sub-adapter broke its padding contract and is reported loudly.
///
/// Encoding and indexing happen once over the merged sequence, against the
/// combined adapter's own cache.
pub struct CombinedAdapter {
    core: AdapterCore,
    board_language: BoardToLanguageAdapter,
    active_pieces: ActivePiecesAdapter,
    prior_actions: PriorActionsAdapter,
    possible_actions: PossibleActionsAdapter,
}

impl CombinedAdapter {
    pub fn new(config: &EnvConfig, encoder: Arc<dyn Encoder>, caches: &mut IndexCacheSet) -> Self {
        Self {
            core: AdapterCore::new(AdapterKind::Combined, encoder.clone(), caches),
            board_language: BoardToLanguageAdapter::new(encoder.clone(), caches),
            active_pieces: ActivePiecesAdapter::new(encoder.clone(), caches),
            prior_actions: PriorActionsAdapter::new(config.prior_actions_window, encoder.clone(), caches),
            possible_actions: PossibleActionsAdapter::new(
                config.possible_actions_window,
                encoder,
                caches,
            ),
        }
    }
}

impl StateAdapter for CombinedAdapter {
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
        let mut tokens = Vec::new();
        let parts: [&mut dyn StateAdapter; 4] = [
            &mut self.board_language,
            &mut self.active_pieces,
            &mut self.prior_actions,
            &mut self.possible_actions,
        ];
        for part in parts {
            match part.encode(position, legal_moves, action_history, EncodeMode::Text)? {
                Representation::Text(part_tokens) => tokens.extend(part_tokens),
                // Sub-adapters were asked for text.
                _ => unreachable!(),
            }
        }

        match tokens.iter().position(|t| t.is_empty()) {
            Some(i) => {
                tokens.remove(i);
            }
            None => return Err(EnvError::MissingPadding),
        }

        Ok(self.core.finalize(tokens, mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::HashEncoder;

    fn small_config() -> EnvConfig {
        let mut cfg = EnvConfig::default();
        cfg.prior_actions_window = 4;
        cfg.possible_actions_window = 25;
        cfg
    }

    #[test]
    fn test_combined_length_is_sum_of_parts_minus_one() {
        let cfg = small_config();
        let encoder = HashEncoder::shared(8);
        let mut caches = IndexCacheSet::new();
        let mut combined = CombinedAdapter::new(&cfg, encoder.clone(), &mut caches);

        let pos = Position::from_board(&chess::Board::default());
        let history = vec![Action::new("e2e4")];
        let legal: Vec<Action> = chess::MoveGen::new_legal(&chess::Board::default())
            .map(|m| Action::new(m.to_string()))
            .collect();

        let rep = combined
            .encode(&pos, &legal, &history, EncodeMode::Text)
            .unwrap();

        // Parts built fresh so their internal windows see the same history.
        let mut parts_total = 0;
        let mut board_language = BoardToLanguageAdapter::new(encoder.clone(), &mut caches);
        let mut active_pieces = ActivePiecesAdapter::new(encoder.clone(), &mut caches);
        let mut prior = PriorActionsAdapter::new(4, encoder.clone(), &mut caches);
        let mut possible = PossibleActionsAdapter::new(25, encoder, &mut caches);
        let parts: [&mut dyn StateAdapter; 4] =
            [&mut board_language, &mut active_pieces, &mut prior, &mut possible];
        for part in parts {
            parts_total += part
                .encode(&pos, &legal, &history, EncodeMode::Text)
                .unwrap()
                .len();
        }

        assert_eq!(rep.len(), parts_total - 1);
    }

    #[test]
    fn test_no_padding_marker_is_loud() {
        // Window 0 leaves no empty placeholder anywhere once the census and
        // piece phrases are all non-empty.
        let mut cfg = small_config();
        cfg.prior_actions_window = 0;
        cfg.possible_actions_window = 0;
        let mut combined =
            CombinedAdapter::new(&cfg, HashEncoder::shared(8), &mut IndexCacheSet::new());

        let pos = Position::from_board(&chess::Board::default());
        let history = vec![Action::new("e2e4")];
        assert!(matches!(
            combined.encode(&pos, &[], &history, EncodeMode::Text),
            Err(EnvError::MissingPadding)
        ));
    }
}
