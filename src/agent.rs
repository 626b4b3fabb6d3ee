// src/agent.rs
//
// Learning-agent interface and the random reference agent.
//
// The environment only ever talks to agents through this trait: hand them a
// state representation and the legal actions, get a move back, and feed the
// transition to `learn` once the reward is known. Real learners plug in
// from outside the crate; RandomAgent is the baseline used by the harness
// and tests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::adapters::Representation;
use crate::types::Action;

/// Counters an agent reports into the results table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    /// Actions chosen across the agent's lifetime.
    pub actions_taken: u64,
    /// Transitions fed to `learn`.
    pub learn_calls: u64,
    /// Sum of rewards seen in `learn`.
    pub cumulative_reward: f64,
}

/// The learning side of an episode.
pub trait Agent {
    fn name(&self) -> &'static str;

    /// Pick one action. `None` only when `legal_actions` is empty.
    fn policy(&mut self, state: &Representation, legal_actions: &[Action]) -> Option<Action>;

    /// Absorb one transition. During testing phases the driver simply does
    /// not call this.
    fn learn(
        &mut self,
        state: &Representation,
        next_state: &Representation,
        reward: f64,
        action: &Action,
    );

    fn metrics(&self) -> AgentMetrics;

    /// Clear per-episode state; lifetime metrics survive.
    fn reset_episode(&mut self);
}

/// Uniform-random baseline. Does not learn, but keeps honest metrics.
pub struct RandomAgent {
    rng: ChaCha8Rng,
    metrics: AgentMetrics,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            metrics: AgentMetrics::default(),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &'static str {
        "random"
    }

    fn policy(&mut self, _state: &Representation, legal_actions: &[Action]) -> Option<Action> {
        if legal_actions.is_empty() {
            return None;
        }
        self.metrics.actions_taken += 1;
        let idx = self.rng.gen_range(0..legal_actions.len());
        Some(legal_actions[idx].clone())
    }

    fn learn(
        &mut self,
        _state: &Representation,
        _next_state: &Representation,
        reward: f64,
        _action: &Action,
    ) {
        self.metrics.learn_calls += 1;
        self.metrics.cumulative_reward += reward;
    }

    fn metrics(&self) -> AgentMetrics {
        self.metrics
    }

    fn reset_episode(&mut self) {}
}
