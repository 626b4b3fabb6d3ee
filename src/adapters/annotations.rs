// src/adapters/annotations.rs
//
// Human-annotations adapter: real commentary where we have it, a growing
// synthetic placeholder where we do not.

use std::sync::Arc;

use crate::config::AdapterKind;
use crate::encoder::Encoder;
use crate::index_cache::IndexCacheSet;
use crate::stats::CommentaryTable;
use crate::types::{Action, EnvError, Position};

use super::{AdapterCore, EncodeMode, Representation, StateAdapter};

/// Minimum clause length kept after splitting an annotation on '.'.
const MIN_FRAGMENT_LEN: usize = 3;

/// Looks the position up in the commentary table by its normalized key
/// (board, turn, castling). On a hit the longest annotation is split into
/// sentence fragments; fragments under three characters are noise from the
/// split and dropped. On a miss the adapter emits "<prior> progressing",
/// chaining on its own previous output so consecutive unannotated positions
/// still produce distinct states.
pub struct AnnotationsAdapter {
    core: AdapterCore,
    table: Arc<CommentaryTable>,
    prior: String,
}

impl AnnotationsAdapter {
    pub fn new(
        table: Arc<CommentaryTable>,
        encoder: Arc<dyn Encoder>,
        caches: &mut IndexCacheSet,
    ) -> Self {
        Self {
            core: AdapterCore::new(AdapterKind::Annotations, encoder, caches),
            table,
            prior: "None".to_string(),
        }
    }
}

impl StateAdapter for AnnotationsAdapter {
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
        let key = position.normalized_key();
        let tokens = match self.table.annotations_for(&key) {
            Some(annotations) => {
                // Longest annotation wins; earliest wins ties.
                let longest = annotations
                    .iter()
                    .fold("", |best, a| if a.len() > best.len() { a } else { best });
                longest
                    .split('.')
                    .filter(|s| s.len() >= MIN_FRAGMENT_LEN)
                    .map(str::to_string)
                    .collect()
            }
            None => {
                let synthetic = format!("{} progressing", self.prior);
                self.prior = synthetic.clone();
                vec![synthetic]
            }
        };
        Ok(self.core.finalize(tokens, mode))
    }
}
