// src/stats.rs
//
// Human-game data sources: per-position move frequencies for the sampled
// opponent, and position commentary for the annotations adapter.
//
// Both tables are loaded once at startup and read-only afterwards. Load
// failures are fatal: a run configured to use human data must not silently
// degrade to uniform play or synthetic commentary.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Play-data JSON: fen -> uci -> entry (entry fields other than the move
/// key itself are not used here).
type PlayData = HashMap<String, HashMap<String, serde_json::Value>>;

#[derive(Debug, Deserialize)]
struct CountEntry {
    #[serde(rename = "totalGames")]
    total_games: u64,
}

/// Count JSON: fen -> uci -> totalGames.
type CountData = HashMap<String, HashMap<String, CountEntry>>;

/// Per-position human move frequencies, merged from the play-data and
/// game-count exports.
///
/// The play data defines which (position, move) pairs exist; the count
/// table supplies how often humans played each. A pair with no count entry
/// keeps weight zero rather than disappearing, so the sampled opponent
/// still sees the full candidate set.
///
/// Keys are normalized to board, turn and castling at load and lookup.
/// The exports carry real en-passant fields and move counters while the
/// rules engine pins its counters, so matching on the full FEN would miss
/// every position.
#[derive(Debug, Default)]
pub struct HumanStatsTable {
    counts: HashMap<String, HashMap<String, u64>>,
}

impl HumanStatsTable {
    /// Build directly from merged counts (tests, synthetic tables), keyed
    /// by any FEN form; keys are normalized here.
    pub fn new(counts: HashMap<String, HashMap<String, u64>>) -> Self {
        let mut normalized: HashMap<String, HashMap<String, u64>> = HashMap::new();
        for (fen, moves) in counts {
            normalized.entry(normalize_key(&fen)).or_default().extend(moves);
        }
        Self { counts: normalized }
    }

    /// Load and merge the two JSON exports.
    pub fn load(play_data_path: &Path, counts_path: &Path) -> anyhow::Result<Self> {
        let play_raw = fs::read_to_string(play_data_path)
            .with_context(|| format!("reading play data {}", play_data_path.display()))?;
        let play: PlayData = serde_json::from_str(&play_raw)
            .with_context(|| format!("parsing play data {}", play_data_path.display()))?;

        let counts_raw = fs::read_to_string(counts_path)
            .with_context(|| format!("reading game counts {}", counts_path.display()))?;
        let count_data: CountData = serde_json::from_str(&counts_raw)
            .with_context(|| format!("parsing game counts {}", counts_path.display()))?;

        Ok(Self::merge(&play, &count_data))
    }

    fn merge(play: &PlayData, count_data: &CountData) -> Self {
        let counts = play
            .iter()
            .map(|(fen, moves)| {
                let merged = moves
                    .keys()
                    .map(|uci| {
                        let count = count_data
                            .get(fen)
                            .and_then(|m| m.get(uci))
                            .map(|e| e.total_games)
                            .unwrap_or(0);
                        (uci.clone(), count)
                    })
                    .collect();
                (fen.clone(), merged)
            })
            .collect();
        Self::new(counts)
    }

    /// Move counts recorded for a position, looked up by its normalized
    /// key; `fen` may be any FEN form.
    pub fn moves_for(&self, fen: &str) -> Option<&HashMap<String, u64>> {
        self.counts.get(&normalize_key(fen))
    }

    /// Number of known positions.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Position commentary keyed by normalized FEN (board, turn, castling).
///
/// Move counters are stripped from keys at load so the same structure
/// reached by different move orders hits the same annotation.
#[derive(Debug, Default)]
pub struct CommentaryTable {
    annotations: HashMap<String, Vec<String>>,
}

impl CommentaryTable {
    /// Build from raw fen -> annotations entries, normalizing keys.
    pub fn new(entries: HashMap<String, Vec<String>>) -> Self {
        let annotations = entries
            .into_iter()
            .map(|(fen, annots)| (normalize_key(&fen), annots))
            .collect();
        Self { annotations }
    }

    /// Load from a JSON export of fen -> annotation(s).
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading commentary {}", path.display()))?;
        let parsed: HashMap<String, OneOrMany> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing commentary {}", path.display()))?;
        Ok(Self::new(
            parsed
                .into_iter()
                .map(|(fen, v)| (fen, v.into_vec()))
                .collect(),
        ))
    }

    /// All annotations recorded for a normalized position key.
    pub fn annotations_for(&self, key: &str) -> Option<&[String]> {
        self.annotations.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

fn normalize_key(fen: &str) -> String {
    fen.split_whitespace().take(3).collect::<Vec<_>>().join(" ")
}
