// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/covertext

//! Error types for model loading and validation.

use core::fmt;
use std::io;

/// Errors that can occur while loading or validating a Markov model artifact.
#[derive(Debug)]
pub enum ModelError {
    /// The artifact file could not be read.
    Io(io::Error),
    /// The artifact is not valid JSON or does not match the expected shape.
    Json(serde_json::Error),
    /// The declared state size is zero.
    InvalidStateSize(usize),
    /// A context key's length does not match the declared state size.
    ContextLength { expected: usize, got: usize },
    /// The artifact contains no transitions at all.
    Empty,
    /// No context key is padded with the START sentinel, so the model has
    /// no legal place to begin a chain.
    MissingStartContext,
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "model artifact I/O error: {e}"),
            Self::Json(e) => write!(f, "model artifact parse error: {e}"),
            Self::InvalidStateSize(n) => write!(f, "invalid state size {n} (must be >= 1)"),
            Self::ContextLength { expected, got } => {
                write!(f, "context key length {got} does not match state size {expected}")
            }
            Self::Empty => write!(f, "model has no transitions"),
            Self::MissingStartContext => write!(f, "model has no START-padded context"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ModelError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// A specialized `Result` type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
