//! Outgoing message schema check against a DBC file
//!
//! The replay does not pack frames, but it can still catch messages the codec
//! would reject: unknown message names, unknown signals, and physical values
//! outside the range the DBC declares.

use hkg_car_interface::OutgoingMessage;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Failed to read DBC file {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse DBC file {0}")]
    Parse(String),
}

/// Declared physical range of one signal
#[derive(Debug, Clone, Copy, PartialEq)]
struct SignalRange {
    min: f64,
    max: f64,
}

impl SignalRange {
    fn contains(&self, value: f64) -> bool {
        // many DBCs leave both bounds at 0 to mean "unbounded"
        if self.min >= self.max {
            return true;
        }
        value >= self.min && value <= self.max
    }
}

/// A problem found in one outgoing message
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    UnknownMessage { message: String },
    UnknownSignal { message: String, signal: String },
    OutOfRange {
        message: String,
        signal: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UnknownMessage { message } => write!(f, "unknown message {}", message),
            Violation::UnknownSignal { message, signal } => {
                write!(f, "unknown signal {}.{}", message, signal)
            }
            Violation::OutOfRange {
                message,
                signal,
                value,
                min,
                max,
            } => write!(
                f,
                "{}.{} = {} outside [{}, {}]",
                message, signal, value, min, max
            ),
        }
    }
}

/// Message and signal layout known to the codec
#[derive(Debug, Default)]
pub struct MessageSchema {
    messages: HashMap<String, HashMap<String, SignalRange>>,
}

impl MessageSchema {
    /// Load a schema from a DBC file
    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        log::info!("Loading DBC schema: {:?}", path);
        let bytes = std::fs::read(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        // fall back to Latin-1 for vendor files that are not UTF-8
        let content = String::from_utf8(bytes).unwrap_or_else(|e| {
            log::warn!("DBC file is not UTF-8, trying Latin-1 encoding");
            e.into_bytes().iter().map(|&b| b as char).collect()
        });

        let schema = Self::from_dbc_str(&content)
            .map_err(|e| SchemaError::Parse(format!("{:?}: {}", path, e)))?;
        log::info!("Schema has {} messages", schema.len());
        Ok(schema)
    }

    /// Parse a schema from DBC text
    pub fn from_dbc_str(content: &str) -> Result<Self, String> {
        let dbc = can_dbc::DBC::from_slice(content.as_bytes()).map_err(|e| format!("{:?}", e))?;

        let mut messages = HashMap::new();
        for message in dbc.messages() {
            let signals = message
                .signals()
                .iter()
                .map(|signal| {
                    (
                        signal.name().to_string(),
                        SignalRange {
                            min: *signal.min(),
                            max: *signal.max(),
                        },
                    )
                })
                .collect();
            messages.insert(message.message_name().to_string(), signals);
        }

        Ok(Self { messages })
    }

    /// Number of messages in the schema
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check one outgoing message
    pub fn check(&self, msg: &OutgoingMessage) -> Vec<Violation> {
        let Some(signals) = self.messages.get(&msg.name) else {
            return vec![Violation::UnknownMessage {
                message: msg.name.clone(),
            }];
        };

        let mut violations = Vec::new();
        for (name, &value) in &msg.signals {
            match signals.get(name) {
                None => violations.push(Violation::UnknownSignal {
                    message: msg.name.clone(),
                    signal: name.clone(),
                }),
                Some(range) if !range.contains(value) => violations.push(Violation::OutOfRange {
                    message: msg.name.clone(),
                    signal: name.clone(),
                    value,
                    min: range.min,
                    max: range.max,
                }),
                Some(_) => {}
            }
        }
        violations
    }
}
