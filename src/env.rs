// src/env.rs
//
// Environment driver: the episode state machine tying engine, adapter,
// agent and opponent together.
//
// The agent always plays White and moves first; the opponent policy plays
// Black. One driver step is a half-move. Rewards are computed here, not in
// the engine, and only the agent's side of the transition is ever fed to
// `learn`.

use std::sync::Arc;
use std::time::Instant;

use chess::{Board, BoardStatus, Color};
use serde::{Deserialize, Serialize};

use crate::adapters::{build_adapter, EncodeMode, Representation, StateAdapter};
use crate::agent::Agent;
use crate::codec::{formal_result, material_signature, GameResult, FULL_MATERIAL_SIGNATURE};
use crate::config::{EnvConfig, SubGoal};
use crate::encoder::HashEncoder;
use crate::engine::EpisodeEngine;
use crate::index_cache::IndexCacheSet;
use crate::logging::{EventSink, NoopSink, StepEvent};
use crate::opponent::{build_opponent, OpponentPolicy};
use crate::results::{EpisodeRecord, ResultsTable};
use crate::stats::{CommentaryTable, HumanStatsTable};
use crate::types::{Action, EnvError, Position};

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Rules-engine checkmate.
    Checkmate,
    /// Rules-engine stalemate.
    Stalemate,
    /// Agent action count reached the configured cap.
    ActionCap,
    /// Configured sub-goal reached before any formal result.
    SubGoal,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::Checkmate => "checkmate",
            TerminationReason::Stalemate => "stalemate",
            TerminationReason::ActionCap => "action_cap",
            TerminationReason::SubGoal => "sub_goal",
        }
    }
}

/// Where the state machine stands within one episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodePhase {
    /// No live episode; the next transition is a reset.
    AwaitingReset,
    /// The agent (White) is to move.
    AgentTurn,
    /// The opponent (Black) is to move.
    OpponentTurn,
    /// Episode finished.
    Terminal,
}

/// Outcome of one finished episode.
#[derive(Debug, Clone)]
pub struct EpisodeSummary {
    pub episode: u32,
    /// Agent half-moves taken (opponent moves are not counted).
    pub steps: u32,
    pub total_reward: f64,
    pub termination: TerminationReason,
    pub duration_ms: u64,
    /// Both sides' moves in order.
    pub action_history: Vec<Action>,
}

/// Termination test, in priority order: formal result, action cap,
/// configured sub-goal.
pub fn goal_reached(
    config: &EnvConfig,
    board: &Board,
    engine_terminated: bool,
    steps: u32,
    action_cap: u32,
) -> Option<TerminationReason> {
    if engine_terminated {
        return Some(match board.status() {
            BoardStatus::Checkmate => TerminationReason::Checkmate,
            _ => TerminationReason::Stalemate,
        });
    }
    if steps >= action_cap {
        return Some(TerminationReason::ActionCap);
    }
    match &config.sub_goal {
        Some(SubGoal::FirstCapture) => {
            if material_signature(board) < FULL_MATERIAL_SIGNATURE {
                Some(TerminationReason::SubGoal)
            } else {
                None
            }
        }
        Some(SubGoal::Positions(fens)) => {
            let fen = board.to_string();
            if fens.iter().any(|f| *f == fen) {
                Some(TerminationReason::SubGoal)
            } else {
                None
            }
        }
        None => None,
    }
}

/// Reward for one half-move, from the agent's (White's) perspective.
///
/// Non-terminal moves pay the per-step value. The cap pays the draw value.
/// A sub-goal pays the win value, negated when the opponent's move reached
/// it. Formal results map white-positive.
pub fn reward_for(
    config: &EnvConfig,
    board: &Board,
    termination: Option<TerminationReason>,
    mover: Color,
) -> f64 {
    let signal = &config.reward_signal;
    match termination {
        None => signal.per_step,
        Some(TerminationReason::ActionCap) => signal.draw,
        Some(TerminationReason::SubGoal) => match mover {
            Color::White => signal.win,
            Color::Black => -signal.win,
        },
        Some(TerminationReason::Checkmate) | Some(TerminationReason::Stalemate) => {
            match formal_result(board) {
                GameResult::WhiteWins => signal.win,
                GameResult::BlackWins => -signal.win,
                // A formal-result termination on a live board means the
                // caller's arguments disagree; pay the neutral value.
                GameResult::Draw | GameResult::Ongoing => signal.draw,
            }
        }
    }
}

/// Drives episodes end to end and accumulates results.
pub struct EnvironmentDriver {
    config: EnvConfig,
    engine: EpisodeEngine,
    adapter: Box<dyn StateAdapter>,
    agent: Box<dyn Agent>,
    training_opponent: Box<dyn OpponentPolicy>,
    testing_opponent: Box<dyn OpponentPolicy>,
    sink: Box<dyn EventSink>,
    results: ResultsTable,
    mode: EncodeMode,
    phase: EpisodePhase,
}

impl EnvironmentDriver {
    /// Driver with no human data attached: the sampled opponent degrades to
    /// uniform and the annotations adapter is unavailable.
    pub fn new(config: EnvConfig, agent: Box<dyn Agent>) -> Result<Self, EnvError> {
        Self::with_data(config, agent, Arc::new(HumanStatsTable::default()), None)
    }

    /// Driver wired to loaded human statistics and commentary.
    pub fn with_data(
        config: EnvConfig,
        agent: Box<dyn Agent>,
        stats: Arc<HumanStatsTable>,
        commentary: Option<Arc<CommentaryTable>>,
    ) -> Result<Self, EnvError> {
        let encoder = HashEncoder::shared(config.encoder_dim);
        let mut caches = IndexCacheSet::new();
        let adapter = build_adapter(config.adapter, &config, encoder, &mut caches, commentary)?;
        let training_opponent =
            build_opponent(config.training_opponent, config.seed, stats.clone());
        let testing_opponent =
            build_opponent(config.testing_opponent, config.seed.wrapping_add(1), stats);
        Ok(Self {
            config,
            engine: EpisodeEngine::new(),
            adapter,
            agent,
            training_opponent,
            testing_opponent,
            sink: Box::new(NoopSink),
            results: ResultsTable::new(),
            mode: EncodeMode::Embedded,
            phase: EpisodePhase::AwaitingReset,
        })
    }

    pub fn set_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sink = sink;
    }

    pub fn set_encode_mode(&mut self, mode: EncodeMode) {
        self.mode = mode;
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn results(&self) -> &ResultsTable {
        &self.results
    }

    pub fn agent(&self) -> &dyn Agent {
        self.agent.as_ref()
    }

    fn log_step(
        &mut self,
        episode: u32,
        steps: u32,
        phase: &str,
        action: &Action,
        reward: f64,
        terminal: bool,
        position: &Position,
        state: &Representation,
    ) {
        self.sink.log_step(&StepEvent {
            episode,
            step: steps,
            phase,
            action: action.as_uci(),
            reward,
            terminal,
            fen: position.fen(),
            state_text: state.as_text(),
        });
    }

    /// Play one full episode. `train` selects the training opponent and cap
    /// and enables `learn` calls.
    pub fn run_episode(&mut self, episode: u32, train: bool) -> Result<EpisodeSummary, EnvError> {
        let action_cap = if train {
            self.config.training_action_cap
        } else {
            self.config.testing_action_cap
        };

        // AwaitingReset: clear per-episode state and encode the start.
        self.phase = EpisodePhase::AwaitingReset;
        let mut history: Vec<Action> = Vec::new();
        let mut obs = self.engine.reset();
        let legal = self.engine.legal_moves();
        let mut state = self.adapter.encode(&obs, &legal, &history, self.mode)?;
        self.agent.reset_episode();
        self.phase = EpisodePhase::AgentTurn;

        let start = Instant::now();
        let mut steps: u32 = 0;
        let mut total_reward = 0.0;
        let termination;

        // Last agent transition, kept so an opponent-terminated episode can
        // still credit the agent's final move with the terminal reward.
        let mut last_agent_action = None;
        let mut next_state = state.clone();

        loop {
            match self.phase {
                EpisodePhase::AgentTurn => {
                    let legal = self.engine.legal_moves();
                    let action = match self.agent.policy(&state, &legal) {
                        Some(action) => action,
                        // Non-terminal positions always offer a move.
                        None => unreachable!("agent asked to move in a terminal position"),
                    };
                    history.push(action.clone());

                    let outcome = self.engine.step(&obs, &action)?;
                    obs = outcome.position.clone();
                    steps += 1;

                    let legal = self.engine.legal_moves();
                    next_state = self.adapter.encode(&obs, &legal, &history, self.mode)?;

                    let board = obs.board()?;
                    let check =
                        goal_reached(&self.config, &board, outcome.terminated, steps, action_cap);
                    let reward = reward_for(&self.config, &board, check, Color::White);
                    if train {
                        self.agent.learn(&state, &next_state, reward, &action);
                    }
                    total_reward += reward;
                    self.log_step(
                        episode,
                        steps,
                        "agent",
                        &action,
                        reward,
                        check.is_some(),
                        &obs,
                        &next_state,
                    );
                    last_agent_action = Some(action);

                    if let Some(reason) = check {
                        termination = reason;
                        self.phase = EpisodePhase::Terminal;
                        break;
                    }
                    state = next_state.clone();
                    self.phase = EpisodePhase::OpponentTurn;
                }
                EpisodePhase::OpponentTurn => {
                    let legal = self.engine.legal_moves();
                    let choice = if train {
                        self.training_opponent.choose(&obs, &legal)
                    } else {
                        self.testing_opponent.choose(&obs, &legal)
                    };
                    let action = match choice {
                        Some(action) => action,
                        None => unreachable!("opponent asked to move in a terminal position"),
                    };
                    history.push(action.clone());

                    let outcome = self.engine.step(&obs, &action)?;
                    obs = outcome.position.clone();

                    let board = obs.board()?;
                    let check =
                        goal_reached(&self.config, &board, outcome.terminated, steps, action_cap);

                    if let Some(reason) = check {
                        // The opponent ended the game: the agent's last move
                        // is re-credited with the terminal reward.
                        let reward = reward_for(&self.config, &board, check, Color::Black);
                        total_reward += reward;
                        if train {
                            if let Some(agent_action) = &last_agent_action {
                                self.agent.learn(&state, &next_state, reward, agent_action);
                            }
                        }
                        self.log_step(
                            episode, steps, "opponent", &action, reward, true, &obs, &next_state,
                        );
                        termination = reason;
                        self.phase = EpisodePhase::Terminal;
                        break;
                    }

                    // Re-encode so the agent sees the position it actually
                    // faces, opponent reply included.
                    let legal = self.engine.legal_moves();
                    state = self.adapter.encode(&obs, &legal, &history, self.mode)?;
                    self.log_step(episode, steps, "opponent", &action, 0.0, false, &obs, &state);
                    self.phase = EpisodePhase::AgentTurn;
                }
                EpisodePhase::AwaitingReset | EpisodePhase::Terminal => {
                    unreachable!("episode loop entered with no live episode")
                }
            }
        }

        Ok(EpisodeSummary {
            episode,
            steps,
            total_reward,
            termination,
            duration_ms: start.elapsed().as_millis() as u64,
            action_history: history,
        })
    }

    /// Run the configured number of episodes for the phase and record one
    /// results row per episode.
    pub fn run(&mut self, train: bool) -> Result<(), EnvError> {
        let episodes = if train {
            self.config.num_train_episodes
        } else {
            self.config.num_test_episodes
        };
        let opponent = if train {
            self.training_opponent.name()
        } else {
            self.testing_opponent.name()
        };
        for episode in 0..episodes {
            let summary = self.run_episode(episode, train)?;
            self.results.push(EpisodeRecord {
                episode,
                train,
                agent: self.agent.name().to_string(),
                opponent: opponent.to_string(),
                steps: summary.steps,
                total_reward: summary.total_reward,
                duration_ms: summary.duration_ms,
                termination: summary.termination,
                action_history: summary.action_history,
                agent_metrics: self.agent.metrics(),
            });
        }
        Ok(())
    }
}
