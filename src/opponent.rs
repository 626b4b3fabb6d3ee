// src/opponent.rs
//
// Opponent policies for the black side.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::OpponentKind;
use crate::stats::HumanStatsTable;
use crate::types::{Action, Position};

/// Move chooser for the non-learning side.
///
/// Policies own their RNG and never mutate shared state, so episodes are
/// reproducible from the configured seed.
pub trait OpponentPolicy {
    fn name(&self) -> &'static str;

    /// Pick one move. `None` only when `legal_moves` is empty, which the
    /// driver treats as a terminal position it should already have caught.
    fn choose(&mut self, position: &Position, legal_moves: &[Action]) -> Option<Action>;
}

/// Uniform choice over the legal moves.
pub struct UniformPolicy {
    rng: ChaCha8Rng,
}

impl UniformPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl OpponentPolicy for UniformPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose(&mut self, _position: &Position, legal_moves: &[Action]) -> Option<Action> {
        if legal_moves.is_empty() {
            return None;
        }
        let idx = self.rng.gen_range(0..legal_moves.len());
        Some(legal_moves[idx].clone())
    }
}

/// Frequency-weighted choice from human-game statistics.
///
/// Candidates come from the stats table entry for the position, matched on
/// the table's normalized key so the engine's FEN quirks (pinned counters,
/// en-passant convention) cannot mask real data. Selection
/// draws an inclusive value in [0, total] and scans the cumulative counts.
/// Candidates are sorted by move code first so the scan order, and with it
/// the seeded outcome, does not depend on table iteration order. A position
/// miss or an all-zero entry falls back to the uniform rule.
pub struct SampledPolicy {
    rng: ChaCha8Rng,
    stats: Arc<HumanStatsTable>,
}

impl SampledPolicy {
    pub fn new(stats: Arc<HumanStatsTable>, seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            stats,
        }
    }

    fn uniform(&mut self, legal_moves: &[Action]) -> Option<Action> {
        if legal_moves.is_empty() {
            return None;
        }
        let idx = self.rng.gen_range(0..legal_moves.len());
        Some(legal_moves[idx].clone())
    }
}

impl OpponentPolicy for SampledPolicy {
    fn name(&self) -> &'static str {
        "sampled"
    }

    fn choose(&mut self, position: &Position, legal_moves: &[Action]) -> Option<Action> {
        let moves = match self.stats.moves_for(position.fen()) {
            Some(moves) if !moves.is_empty() => moves,
            _ => return self.uniform(legal_moves),
        };

        let mut candidates: Vec<(&String, u64)> =
            moves.iter().map(|(uci, count)| (uci, *count)).collect();
        candidates.sort_by(|a, b| a.0.cmp(b.0));

        let total: u64 = candidates.iter().map(|(_, c)| c).sum();
        let draw = self.rng.gen_range(0..=total);

        let mut cum = 0u64;
        let mut chosen = candidates.len() - 1;
        for (i, (_, count)) in candidates.iter().enumerate() {
            cum += count;
            if cum >= draw {
                chosen = i;
                break;
            }
        }

        if cum > 0 {
            Some(Action::new(candidates[chosen].0.clone()))
        } else {
            self.uniform(legal_moves)
        }
    }
}

/// Construct the policy for `kind`. The sampled policy degrades to uniform
/// per position when the table has no entry, so an empty table is a valid
/// (if pointless) configuration.
pub fn build_opponent(
    kind: OpponentKind,
    seed: u64,
    stats: Arc<HumanStatsTable>,
) -> Box<dyn OpponentPolicy> {
    match kind {
        OpponentKind::Random => Box::new(UniformPolicy::new(seed)),
        OpponentKind::Sampled => Box::new(SampledPolicy::new(stats, seed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn start_position() -> Position {
        Position::from_board(&chess::Board::default())
    }

    fn actions(ucis: &[&str]) -> Vec<Action> {
        ucis.iter().map(|u| Action::new(*u)).collect()
    }

    fn stats_for_start(counts: &[(&str, u64)]) -> Arc<HumanStatsTable> {
        let mut moves = HashMap::new();
        for (uci, count) in counts {
            moves.insert(uci.to_string(), *count);
        }
        let mut table = HashMap::new();
        table.insert(start_position().fen().to_string(), moves);
        Arc::new(HumanStatsTable::new(table))
    }

    #[test]
    fn test_uniform_only_picks_legal_moves() {
        let mut policy = UniformPolicy::new(7);
        let legal = actions(&["e2e4", "d2d4", "g1f3"]);
        for _ in 0..50 {
            let pick = policy.choose(&start_position(), &legal).unwrap();
            assert!(legal.contains(&pick));
        }
    }

    #[test]
    fn test_uniform_empty_moves_is_none() {
        let mut policy = UniformPolicy::new(7);
        assert!(policy.choose(&start_position(), &[]).is_none());
    }

    #[test]
    fn test_uniform_reproducible_from_seed() {
        let legal = actions(&["e2e4", "d2d4", "g1f3", "c2c4"]);
        let picks = |seed| {
            let mut policy = UniformPolicy::new(seed);
            (0..10)
                .map(|_| policy.choose(&start_position(), &legal).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(42), picks(42));
    }

    #[test]
    fn test_sampled_dominant_weight_wins() {
        let stats = stats_for_start(&[("e2e4", 10_000), ("a2a3", 0)]);
        let mut policy = SampledPolicy::new(stats, 3);
        let legal = actions(&["e2e4", "a2a3"]);
        let mut e4 = 0;
        for _ in 0..100 {
            if policy.choose(&start_position(), &legal).unwrap() == Action::new("e2e4") {
                e4 += 1;
            }
        }
        assert!(e4 >= 99);
    }

    #[test]
    fn test_sampled_zero_total_falls_back_to_uniform() {
        let stats = stats_for_start(&[("e2e4", 0), ("a2a3", 0)]);
        let mut policy = SampledPolicy::new(stats, 3);
        let legal = actions(&["g1f3"]);
        // Weighted candidates all have zero weight, so the legal-move
        // fallback is the only possible outcome.
        assert_eq!(
            policy.choose(&start_position(), &legal).unwrap(),
            Action::new("g1f3")
        );
    }

    #[test]
    fn test_sampled_matches_exported_keys_against_engine_positions() {
        // Stats exports key positions by the source library's FEN, with a
        // real en-passant square and live move counters. The same position
        // reached through the engine prints neither; the weighted path
        // must still fire.
        let mut moves = HashMap::new();
        moves.insert("d7d5".to_string(), 10_000);
        let mut table = HashMap::new();
        table.insert(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1".to_string(),
            moves,
        );
        let stats = Arc::new(HumanStatsTable::new(table));
        let mut policy = SampledPolicy::new(stats, 5);

        let after_e4 =
            chess::Board::default().make_move_new(Action::new("e2e4").to_move().unwrap());
        let position = Position::from_board(&after_e4);
        // d7d5 is the only weighted candidate, so a stats hit always
        // returns it; the uniform fallback could only return a7a6.
        let legal = actions(&["a7a6"]);
        assert_eq!(
            policy.choose(&position, &legal).unwrap(),
            Action::new("d7d5")
        );
    }

    #[test]
    fn test_sampled_unknown_position_falls_back_to_uniform() {
        let stats = Arc::new(HumanStatsTable::default());
        let mut policy = SampledPolicy::new(stats, 3);
        let legal = actions(&["b1c3"]);
        assert_eq!(
            policy.choose(&start_position(), &legal).unwrap(),
            Action::new("b1c3")
        );
    }
}
