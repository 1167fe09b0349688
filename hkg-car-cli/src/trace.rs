//! JSON-lines trace input and replay output
//!
//! A trace holds one decoded cycle per line:
//!
//! ```text
//! {"frame": 0, "buses": {"default": {"CLU11": {"CF_Clu_Vanz": 0.0}}}, "request": {"enabled": false}}
//! ```
//!
//! `frame` is optional and defaults to the line's cycle index offset by the
//! session's start frame. Blank lines are skipped.

use anyhow::{Context, Result};
use hkg_car_interface::{ActuatorRequest, BusSnapshots, CycleOutput, OutgoingMessage, VehicleState};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

/// One cycle of recorded input
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TraceRecord {
    #[serde(default)]
    pub frame: Option<u64>,
    #[serde(default)]
    pub buses: BusSnapshots,
    #[serde(default)]
    pub request: ActuatorRequest,
}

/// Streaming reader over a JSON-lines trace
pub struct TraceReader<R> {
    reader: R,
    line_number: usize,
    cycle: u64,
    start_frame: u64,
    buffer: String,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R, start_frame: u64) -> Self {
        Self {
            reader,
            line_number: 0,
            cycle: 0,
            start_frame,
            buffer: String::new(),
        }
    }

    /// Read the next cycle, resolving its frame index
    ///
    /// Returns `Ok(None)` at end of input. A malformed line is an error that
    /// names the line.
    pub fn next_record(&mut self) -> Result<Option<(u64, TraceRecord)>> {
        loop {
            self.buffer.clear();
            let read = self
                .reader
                .read_line(&mut self.buffer)
                .with_context(|| format!("Failed to read trace line {}", self.line_number + 1))?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = self.buffer.trim();
            if line.is_empty() {
                continue;
            }

            let record: TraceRecord = serde_json::from_str(line)
                .with_context(|| format!("Malformed trace record on line {}", self.line_number))?;
            let frame = record.frame.unwrap_or(self.start_frame + self.cycle);
            self.cycle += 1;
            return Ok(Some((frame, record)));
        }
    }

    /// Lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

/// One cycle of replay output
#[derive(Debug, Serialize)]
pub struct OutputRecord<'a> {
    pub frame: u64,
    pub messages: &'a [OutgoingMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<&'a VehicleState>,
}

impl<'a> OutputRecord<'a> {
    pub fn from_cycle(output: &'a CycleOutput, emit_state: bool) -> Self {
        Self {
            frame: output.frame,
            messages: &output.messages,
            state: emit_state.then_some(&output.state),
        }
    }
}

/// Write one JSON object followed by a newline
pub fn write_json_line<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *writer, value).context("Failed to serialize output record")?;
    writeln!(writer).context("Failed to write output")?;
    Ok(())
}
