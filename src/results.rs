// src/results.rs
//
// Episode results accumulation and export.
//
// One EpisodeRecord per finished episode, collected into a ResultsTable
// that can summarise a run and export it as JSONL (full records) or CSV
// (flat numeric view for spreadsheets).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::agent::AgentMetrics;
use crate::env::TerminationReason;
use crate::types::Action;

/// Everything recorded about one finished episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub episode: u32,
    /// Training episode (learn calls enabled) or testing episode.
    pub train: bool,
    pub agent: String,
    pub opponent: String,
    /// Agent actions taken.
    pub steps: u32,
    /// Sum of rewards paid to the agent.
    pub total_reward: f64,
    pub duration_ms: u64,
    pub termination: TerminationReason,
    /// Full move history, both sides, in order.
    pub action_history: Vec<Action>,
    pub agent_metrics: AgentMetrics,
}

/// Aggregates over one results table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResultsSummary {
    pub episodes: usize,
    pub mean_reward: f64,
    pub mean_steps: f64,
}

/// Accumulator for a run's episode records.
#[derive(Debug, Default)]
pub struct ResultsTable {
    records: Vec<EpisodeRecord>,
}

impl ResultsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: EpisodeRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[EpisodeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> ResultsSummary {
        let n = self.records.len();
        if n == 0 {
            return ResultsSummary {
                episodes: 0,
                mean_reward: 0.0,
                mean_steps: 0.0,
            };
        }
        let reward: f64 = self.records.iter().map(|r| r.total_reward).sum();
        let steps: u64 = self.records.iter().map(|r| r.steps as u64).sum();
        ResultsSummary {
            episodes: n,
            mean_reward: reward / n as f64,
            mean_steps: steps as f64 / n as f64,
        }
    }

    /// Write one JSON object per record.
    pub fn write_jsonl(&self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)
            .with_context(|| format!("creating results file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        for record in &self.records {
            let line = serde_json::to_string(record).context("serializing episode record")?;
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Flat CSV view: one row per episode, history and metrics reduced to
    /// scalar columns.
    pub fn write_csv(&self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)
            .with_context(|| format!("creating results file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writeln!(
            writer,
            "episode,train,agent,opponent,steps,total_reward,duration_ms,termination"
        )?;
        for r in &self.records {
            writeln!(
                writer,
                "{},{},{},{},{},{},{},{}",
                r.episode,
                r.train,
                r.agent,
                r.opponent,
                r.steps,
                r.total_reward,
                r.duration_ms,
                r.termination.as_str(),
            )?;
        }
        writer.flush()?;
        Ok(())
    }
}
