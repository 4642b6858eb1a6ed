// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/covertext

//! Run records for the external history layer.
//!
//! Persistence itself is out of scope; per completed run the core hands the
//! caller exactly the values the history table stores — file identifier,
//! algorithm name, operation kind, timestamp, resulting text, and payload
//! size — and nothing more.

use chrono::Local;

use super::Algorithm;

/// Kind of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Encode,
    Decode,
}

impl Operation {
    /// The label the history layer stores.
    pub fn name(self) -> &'static str {
        match self {
            Self::Encode => "encode",
            Self::Decode => "decode",
        }
    }
}

/// The externally observable output of one completed encode or decode run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    /// Caller-supplied file identifier (the core never touches the file).
    pub file: String,
    pub algorithm: Algorithm,
    pub operation: Operation,
    /// Local wall-clock time, formatted `%Y-%m-%d %H:%M:%S`.
    pub timestamp: String,
    /// The stego text of the run.
    pub text: String,
    /// Payload size in bytes.
    pub payload_size: usize,
}

impl RunRecord {
    pub fn new(
        file: &str,
        algorithm: Algorithm,
        operation: Operation,
        text: String,
        payload_size: usize,
    ) -> Self {
        Self {
            file: file.to_string(),
            algorithm,
            operation,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            text,
            payload_size,
        }
    }
}
