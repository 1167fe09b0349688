//! Replay summary

use chrono::{DateTime, Local};
use hkg_car_interface::OutgoingMessage;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Counters collected over one replay
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub model: String,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub cycles: u64,
    pub first_frame: Option<u64>,
    pub last_frame: Option<u64>,
    /// Messages emitted, keyed by "name@bus"
    pub messages: BTreeMap<String, u64>,
    pub resume_presses: u64,
    pub schema_violations: u64,
}

impl ReplaySummary {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            started_at: Local::now(),
            finished_at: None,
            cycles: 0,
            first_frame: None,
            last_frame: None,
            messages: BTreeMap::new(),
            resume_presses: 0,
            schema_violations: 0,
        }
    }

    /// Account for one processed cycle
    pub fn record_cycle(&mut self, frame: u64, messages: &[OutgoingMessage]) {
        self.cycles += 1;
        self.first_frame.get_or_insert(frame);
        self.last_frame = Some(frame);
        for msg in messages {
            *self
                .messages
                .entry(format!("{}@{}", msg.name, msg.bus))
                .or_insert(0) += 1;
        }
    }

    pub fn finish(&mut self, resume_presses: u64) {
        self.resume_presses = resume_presses;
        self.finished_at = Some(Local::now());
    }

    pub fn total_messages(&self) -> u64 {
        self.messages.values().sum()
    }
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Replay summary ({})", self.model)?;
        writeln!(f, "  Started:   {}", self.started_at.format("%Y-%m-%d %H:%M:%S"))?;
        if let Some(finished) = self.finished_at {
            let elapsed = finished - self.started_at;
            writeln!(f, "  Elapsed:   {} ms", elapsed.num_milliseconds())?;
        }
        match (self.first_frame, self.last_frame) {
            (Some(first), Some(last)) => {
                writeln!(f, "  Cycles:    {} (frames {}..={})", self.cycles, first, last)?
            }
            _ => writeln!(f, "  Cycles:    0")?,
        }
        writeln!(f, "  Messages:  {}", self.total_messages())?;
        for (name, count) in &self.messages {
            writeln!(f, "    {:<22} {}", name, count)?;
        }
        writeln!(f, "  Resume presses:    {}", self.resume_presses)?;
        write!(f, "  Schema violations: {}", self.schema_violations)
    }
}
