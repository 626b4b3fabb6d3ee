// src/adapters/prior_actions.rs
//
// Prior-actions adapter: a fixed window over verbal descriptions of the
// moves played so far in the episode.

use std::sync::Arc;

use chess::Board;

use crate::codec::describe_move;
use crate::config::AdapterKind;
use crate::encoder::Encoder;
use crate::index_cache::IndexCacheSet;
use crate::types::{Action, EnvError, Position};

use super::{AdapterCore, EncodeMode, Representation, StateAdapter};

/// Replays the episode's action history on a private shadow board so each
/// move can be described against the position it was played from, then
/// windows the descriptions to a fixed size with empty-string left-padding.
///
/// The driver encodes the same state twice per ply (agent and opponent
/// perspectives), so back-to-back calls carrying the same last action are
/// deduplicated instead of described twice. An empty history resets the
/// shadow state and yields an all-empty window. A history action that is
/// not legal on the shadow board means the caller's history diverged from
/// the game, which is fatal.
pub struct PriorActionsAdapter {
    core: AdapterCore,
    window: usize,
    shadow: Board,
    phrases: Vec<String>,
    last_seen: Option<Action>,
}

impl PriorActionsAdapter {
    pub fn new(window: usize, encoder: Arc<dyn Encoder>, caches: &mut IndexCacheSet) -> Self {
        Self {
            core: AdapterCore::new(AdapterKind::PriorActions, encoder, caches),
            window,
            shadow: Board::default(),
            phrases: Vec::new(),
            last_seen: None,
        }
    }

    fn reset_shadow(&mut self) {
        self.shadow = Board::default();
        self.phrases.clear();
        self.last_seen = None;
    }
}

impl StateAdapter for PriorActionsAdapter {
    fn kind(&self) -> AdapterKind {
        self.core.kind()
    }

    fn encode(
        &mut self,
        _position: &Position,
        _legal_moves: &[Action],
        action_history: &[Action],
        mode: EncodeMode,
    ) -> Result<Representation, EnvError> {
        let last = match action_history.last() {
            Some(last) => last,
            None => {
                self.reset_shadow();
                return Ok(self.core.finalize(vec![String::new(); self.window], mode));
            }
        };

        if self.last_seen.as_ref() != Some(last) {
            let mv = last.to_move()?;
            if !self.shadow.legal(mv) {
                return Err(EnvError::ShadowReplay {
                    action: last.as_uci().to_string(),
                    fen: self.shadow.to_string(),
                    history_len: action_history.len(),
                });
            }
            self.phrases.push(describe_move(&self.shadow, mv)?);
            self.shadow = self.shadow.make_move_new(mv);
            self.last_seen = Some(last.clone());
        }

        let recent = self
            .phrases
            .iter()
            .rev()
            .take(self.window)
            .rev()
            .cloned();
        let mut tokens = vec![String::new(); self.window.saturating_sub(self.phrases.len())];
        tokens.extend(recent);
        Ok(self.core.finalize(tokens, mode))
    }
}
