// src/adapters/mod.rs
//
// State-adapter family: alternative renderings of the same underlying
// game state.
//
// Every adapter consumes the canonical (position, legal moves, action
// history) triple and produces one of three interchangeable forms chosen by
// the caller per call: raw text, encoder embeddings, or cache-assigned
// indices. Adapters may carry per-episode internal state (the prior-actions
// shadow board, the annotations fallback chain); an empty action history is
// the signal to reset it.

mod active_pieces;
mod annotations;
mod board;
mod board_language;
mod combined;
mod possible_actions;
mod prior_actions;

pub use active_pieces::ActivePiecesAdapter;
pub use annotations::AnnotationsAdapter;
pub use board::BoardAdapter;
pub use board_language::BoardToLanguageAdapter;
pub use combined::CombinedAdapter;
pub use possible_actions::PossibleActionsAdapter;
pub use prior_actions::PriorActionsAdapter;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{AdapterKind, EnvConfig};
use crate::encoder::{Embedding, Encoder};
use crate::index_cache::{IndexCacheSet, SharedIndexCache};
use crate::stats::CommentaryTable;
use crate::types::{Action, EnvError, Position};

/// Output form requested from an adapter for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeMode {
    /// Raw token strings.
    Text,
    /// One embedding per token via the configured encoder.
    Embedded,
    /// One cache-assigned id per token.
    Indexed,
}

/// One encoded state, in whichever form the caller requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Representation {
    Text(Vec<String>),
    Embedded(Vec<Embedding>),
    Indexed(Vec<u32>),
}

impl Representation {
    /// Number of semantic units (identical across the three forms).
    pub fn len(&self) -> usize {
        match self {
            Representation::Text(t) => t.len(),
            Representation::Embedded(e) => e.len(),
            Representation::Indexed(i) => i.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Token strings, if this is the text form.
    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            Representation::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Common adapter contract.
///
/// `encode` takes `&mut self` because some variants replay history on a
/// shadow board or chain fallback descriptions between calls.
pub trait StateAdapter {
    fn kind(&self) -> AdapterKind;

    fn encode(
        &mut self,
        position: &Position,
        legal_moves: &[Action],
        action_history: &[Action],
        mode: EncodeMode,
    ) -> Result<Representation, EnvError>;
}

/// Shared encode/index plumbing behind every variant.
pub(crate) struct AdapterCore {
    kind: AdapterKind,
    encoder: Arc<dyn Encoder>,
    cache: SharedIndexCache,
}

impl AdapterCore {
    pub(crate) fn new(
        kind: AdapterKind,
        encoder: Arc<dyn Encoder>,
        caches: &mut IndexCacheSet,
    ) -> Self {
        let cache = caches.cache_for(kind);
        Self {
            kind,
            encoder,
            cache,
        }
    }

    pub(crate) fn kind(&self) -> AdapterKind {
        self.kind
    }

    /// Turn finished tokens into the requested output form. Index order
    /// always matches token order.
    pub(crate) fn finalize(&self, tokens: Vec<String>, mode: EncodeMode) -> Representation {
        match mode {
            EncodeMode::Text => Representation::Text(tokens),
            EncodeMode::Embedded => Representation::Embedded(self.encoder.encode(&tokens)),
            EncodeMode::Indexed => {
                // The cache is append-only, so a poisoned lock still holds a
                // usable map.
                let mut cache = self
                    .cache
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                Representation::Indexed(
                    tokens.iter().map(|t| cache.get_or_assign(t)).collect(),
                )
            }
        }
    }
}

/// Construct the adapter for `kind` with the run's shared collaborators.
///
/// The annotations and combined variants need a commentary table; asking for
/// them without one is a configuration error.
pub fn build_adapter(
    kind: AdapterKind,
    config: &EnvConfig,
    encoder: Arc<dyn Encoder>,
    caches: &mut IndexCacheSet,
    commentary: Option<Arc<CommentaryTable>>,
) -> Result<Box<dyn StateAdapter>, EnvError> {
    let adapter: Box<dyn StateAdapter> = match kind {
        AdapterKind::Board => Box::new(BoardAdapter::new(encoder, caches)),
        AdapterKind::BoardLanguage => Box::new(BoardToLanguageAdapter::new(encoder, caches)),
        AdapterKind::ActivePieces => Box::new(ActivePiecesAdapter::new(encoder, caches)),
        AdapterKind::PriorActions => Box::new(PriorActionsAdapter::new(
            config.prior_actions_window,
            encoder,
            caches,
        )),
        AdapterKind::PossibleActions => Box::new(PossibleActionsAdapter::new(
            config.possible_actions_window,
            encoder,
            caches,
        )),
        AdapterKind::Annotations => {
            let table = commentary.ok_or(EnvError::MissingCommentary)?;
            Box::new(AnnotationsAdapter::new(table, encoder, caches))
        }
        AdapterKind::Combined => Box::new(CombinedAdapter::new(config, encoder, caches)),
    };
    Ok(adapter)
}
