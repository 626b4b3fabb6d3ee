// src/config.rs
//
// Central configuration for the Caissa environment.
//
// Everything the driver needs to run a train/test phase lives here: which
// state adapter feeds the agent, which opponent plays the other side,
// episode counts and action caps, the reward signal, and the optional
// sub-goal that ends episodes early.

use serde::{Deserialize, Serialize};

use crate::types::EnvError;

/// State-adapter variants available to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdapterKind {
    /// Raw 64-token board, mirrored to the mover's perspective.
    Board,
    /// Per-player piece-count sentences.
    BoardLanguage,
    /// One positional phrase per active piece.
    ActivePieces,
    /// Fixed window of verbal descriptions of the episode's moves so far.
    PriorActions,
    /// Fixed window of verbal descriptions of the currently legal moves.
    PossibleActions,
    /// Human commentary lookup with synthetic fallback.
    Annotations,
    /// Concatenation of the four language adapters above.
    Combined,
}

impl AdapterKind {
    /// Stable lowercase key (used in config files, CLI args and logs).
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterKind::Board => "board",
            AdapterKind::BoardLanguage => "board_language",
            AdapterKind::ActivePieces => "active_pieces",
            AdapterKind::PriorActions => "prior_actions",
            AdapterKind::PossibleActions => "possible_actions",
            AdapterKind::Annotations => "annotations",
            AdapterKind::Combined => "combined",
        }
    }

    /// Parse an adapter key. Unknown keys are fatal at configuration time.
    pub fn parse(key: &str) -> Result<AdapterKind, EnvError> {
        match key.trim().to_ascii_lowercase().as_str() {
            "board" | "engine" => Ok(AdapterKind::Board),
            "board_language" | "board_as_language" => Ok(AdapterKind::BoardLanguage),
            "active_pieces" => Ok(AdapterKind::ActivePieces),
            "prior_actions" => Ok(AdapterKind::PriorActions),
            "possible_actions" => Ok(AdapterKind::PossibleActions),
            "annotations" | "human_annotations" => Ok(AdapterKind::Annotations),
            "combined" => Ok(AdapterKind::Combined),
            _ => Err(EnvError::UnknownAdapter(key.to_string())),
        }
    }
}

/// Opponent-policy variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpponentKind {
    /// Uniform over legal moves.
    Random,
    /// Weighted by historical human-game frequency, uniform fallback.
    Sampled,
}

impl OpponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpponentKind::Random => "random",
            OpponentKind::Sampled => "sampled",
        }
    }

    /// Parse an opponent key. Unknown keys are fatal at configuration time.
    pub fn parse(key: &str) -> Result<OpponentKind, EnvError> {
        match key.trim().to_ascii_lowercase().as_str() {
            "random" | "uniform" => Ok(OpponentKind::Random),
            "sampled" | "weighted" => Ok(OpponentKind::Sampled),
            _ => Err(EnvError::UnknownOpponent(key.to_string())),
        }
    }
}

/// Reward constants, all from the white (learning) perspective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardSignal {
    /// Decisive win / sub-goal value (negated for a black outcome).
    pub win: f64,
    /// Draw value, also paid when the action cap ends the episode.
    pub draw: f64,
    /// Immediate reward for every non-terminal action.
    pub per_step: f64,
}

impl Default for RewardSignal {
    fn default() -> Self {
        Self {
            win: 1.0,
            draw: 0.5,
            per_step: -0.05,
        }
    }
}

/// Early-termination condition distinct from the formal chess result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubGoal {
    /// Any capture: total material signature dropping below the full-board
    /// threshold.
    FirstCapture,
    /// Literal membership of the reached position in a configured FEN set.
    Positions(Vec<String>),
}

/// Environment configuration.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Human-readable config / release version.
    pub version: &'static str,
    /// State adapter feeding the learning agent.
    pub adapter: AdapterKind,
    /// Opponent used during training episodes.
    pub training_opponent: OpponentKind,
    /// Opponent used during testing episodes (generalisability check).
    pub testing_opponent: OpponentKind,
    /// Number of training episodes per run.
    pub num_train_episodes: u32,
    /// Number of testing episodes per run.
    pub num_test_episodes: u32,
    /// Agent-action cap per training episode.
    pub training_action_cap: u32,
    /// Agent-action cap per testing episode.
    pub testing_action_cap: u32,
    /// Reward constants.
    pub reward_signal: RewardSignal,
    /// Optional early-termination sub-goal.
    pub sub_goal: Option<SubGoal>,
    /// Window size for the prior-actions adapter.
    pub prior_actions_window: usize,
    /// Window size for the possible-actions adapter. A single position
    /// tops out around 110 legal moves, so the default leaves headroom.
    pub possible_actions_window: usize,
    /// Embedding dimension requested from the encoder.
    pub encoder_dim: usize,
    /// Base RNG seed for agent and opponent policies.
    pub seed: u64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            version: "caissa-0.1",
            adapter: AdapterKind::Combined,
            training_opponent: OpponentKind::Random,
            testing_opponent: OpponentKind::Random,
            num_train_episodes: 100,
            num_test_episodes: 20,
            training_action_cap: 50,
            testing_action_cap: 50,
            reward_signal: RewardSignal::default(),
            sub_goal: None,
            prior_actions_window: 15,
            possible_actions_window: 125,
            encoder_dim: 384,
            seed: 0,
        }
    }
}

impl EnvConfig {
    pub fn with_adapter(mut self, adapter: AdapterKind) -> Self {
        self.adapter = adapter;
        self
    }

    pub fn with_opponents(mut self, training: OpponentKind, testing: OpponentKind) -> Self {
        self.training_opponent = training;
        self.testing_opponent = testing;
        self
    }

    pub fn with_episodes(mut self, train: u32, test: u32) -> Self {
        self.num_train_episodes = train;
        self.num_test_episodes = test;
        self
    }

    pub fn with_action_caps(mut self, training: u32, testing: u32) -> Self {
        self.training_action_cap = training;
        self.testing_action_cap = testing;
        self
    }

    pub fn with_reward_signal(mut self, signal: RewardSignal) -> Self {
        self.reward_signal = signal;
        self
    }

    pub fn with_sub_goal(mut self, sub_goal: Option<SubGoal>) -> Self {
        self.sub_goal = sub_goal;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_key_roundtrip() {
        for kind in [
            AdapterKind::Board,
            AdapterKind::BoardLanguage,
            AdapterKind::ActivePieces,
            AdapterKind::PriorActions,
            AdapterKind::PossibleActions,
            AdapterKind::Annotations,
            AdapterKind::Combined,
        ] {
            assert_eq!(AdapterKind::parse(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_keys_are_fatal() {
        assert!(matches!(
            AdapterKind::parse("telepathy"),
            Err(EnvError::UnknownAdapter(_))
        ));
        assert!(matches!(
            OpponentKind::parse("stockfish"),
            Err(EnvError::UnknownOpponent(_))
        ));
    }

    #[test]
    fn test_builder_chain() {
        let cfg = EnvConfig::default()
            .with_adapter(AdapterKind::Board)
            .with_episodes(5, 2)
            .with_action_caps(10, 10)
            .with_seed(42);
        assert_eq!(cfg.adapter, AdapterKind::Board);
        assert_eq!(cfg.num_train_episodes, 5);
        assert_eq!(cfg.training_action_cap, 10);
        assert_eq!(cfg.seed, 42);
    }
}
