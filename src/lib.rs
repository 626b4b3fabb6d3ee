//! Caissa core library.
//!
//! A chess environment for reinforcement-learning research where the agent
//! observes the game through interchangeable *state adapters*: the raw
//! board, several natural-language renderings, human commentary, or a
//! combination. The binary (`src/main.rs`) is just a thin research harness
//! around these components.
//!
//! # Architecture
//!
//! - **Engine** (`engine`): Thin episode engine over the rules engine —
//!   reset, step, legal moves, terminal detection. No rewards.
//!
//! - **Adapters** (`adapters`): The `StateAdapter` family turning
//!   (position, legal moves, history) into text, embeddings or indices.
//!
//! - **Driver** (`env`): The episode state machine — agent half-move,
//!   opponent half-move, termination priority, reward signal.
//!
//! - **Opponents** (`opponent`): Uniform-random and human-frequency-sampled
//!   policies for the black side.
//!
//! - **Data** (`stats`): Human play-frequency and commentary tables loaded
//!   once at startup.
//!
//! - **Results** (`results`): Per-episode records with JSONL/CSV export.

pub mod adapters;
pub mod agent;
pub mod codec;
pub mod config;
pub mod encoder;
pub mod engine;
pub mod env;
pub mod index_cache;
pub mod logging;
pub mod opponent;
pub mod results;
pub mod stats;
pub mod types;

// --- Re-exports for ergonomic external use ---------------------------------

pub use adapters::{build_adapter, EncodeMode, Representation, StateAdapter};
pub use agent::{Agent, AgentMetrics, RandomAgent};
pub use config::{AdapterKind, EnvConfig, OpponentKind, RewardSignal, SubGoal};
pub use engine::{EpisodeEngine, StepOutcome};
pub use env::{EnvironmentDriver, EpisodePhase, EpisodeSummary, TerminationReason};
pub use types::{Action, EnvError, Position, ENV_RESET};
