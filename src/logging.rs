// src/logging.rs
//
// Telemetry sinks for the environment driver.
// - EventSink: trait used by the driver
// - NoopSink:  discards all events
// - FileSink:  writes one JSON line per step for offline analysis

use std::fs::File;
use std::io::{self, BufWriter, Write};

use serde::Serialize;

/// One step worth of telemetry.
#[derive(Debug, Clone, Serialize)]
pub struct StepEvent<'a> {
    pub episode: u32,
    pub step: u32,
    /// "agent" or "opponent".
    pub phase: &'a str,
    pub action: &'a str,
    pub reward: f64,
    pub terminal: bool,
    pub fen: &'a str,
    /// Text representation, when the run logs states.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_text: Option<&'a [String]>,
}

/// Abstract sink for per-step telemetry.
pub trait EventSink {
    fn log_step(&mut self, event: &StepEvent<'_>);
}

/// Sink that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn log_step(&mut self, _event: &StepEvent<'_>) {
        // intentionally no-op
    }
}

/// JSONL file sink. Each step is one JSON object on its own line.
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create a new sink writing to `path`.
    pub fn create(path: &str) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl EventSink for FileSink {
    fn log_step(&mut self, event: &StepEvent<'_>) {
        // If logging fails we don't want to crash the episode,
        // so we deliberately ignore I/O errors.
        if let Ok(line) = serde_json::to_string(event) {
            let _ = self.writer.write_all(line.as_bytes());
            let _ = self.writer.write_all(b"\n");
            let _ = self.writer.flush();
        }
    }
}
