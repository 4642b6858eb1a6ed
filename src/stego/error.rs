// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/covertext

//! Error types for the bit↔text transcoding layer.
//!
//! [`StegoError`] covers all failure modes of both algorithm families.
//! A failure aborts the session whole — there is no retry or partial-output
//! recovery. Note that [`StegoError::LiteralEscape`] and
//! [`StegoError::UnresolvableToken`] are *expected-possible* outcomes of the
//! Existing algorithm on unaligned payload tails, not internal bugs.

use core::fmt;

use crate::model::ModelError;

/// Errors that can occur during encoding or decoding.
#[derive(Debug)]
pub enum StegoError {
    /// The current context tuple is absent from the model; generation cannot
    /// continue.
    ModelLookup(String),
    /// The model yields no entry points, so no chain can be started.
    NoEntrypoints,
    /// A decode-time token matches neither the expected candidate list nor an
    /// end-key-bearing spelling of one.
    UnresolvableToken(String),
    /// The decoder hit a bracket-literal escape token. Existing only; mirrors
    /// the documented tail-alignment defect of that algorithm.
    LiteralEscape(String),
    /// A selection would require an index outside the addressable range
    /// `0..2^width` of its candidate list.
    AddressableRange { index: usize, limit: usize },
    /// The terminal selection consumed more bits than the end-key marker can
    /// express (`'a'..='z'` covers only `0..=25`).
    EndKeyOutOfRange(usize),
    /// A decoded bit sequence cannot be packed into bytes because its length
    /// is not a multiple of eight.
    BitLength(usize),
    /// The model artifact was invalid.
    Model(ModelError),
    /// The operation was cancelled by the caller.
    Cancelled,
}

impl fmt::Display for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelLookup(ctx) => write!(f, "context [{ctx}] absent from model"),
            Self::NoEntrypoints => write!(f, "model has no entry points"),
            Self::UnresolvableToken(t) => write!(f, "token {t:?} does not resolve"),
            Self::LiteralEscape(t) => write!(f, "literal escape token {t:?} in stego text"),
            Self::AddressableRange { index, limit } => {
                write!(f, "index {index} outside addressable range 0..{limit}")
            }
            Self::EndKeyOutOfRange(c) => {
                write!(f, "terminal selection consumed {c} bits (end key covers 0..=25)")
            }
            Self::BitLength(n) => write!(f, "{n} bits is not a whole number of bytes"),
            Self::Model(e) => write!(f, "invalid model: {e}"),
            Self::Cancelled => write!(f, "operation cancelled by caller"),
        }
    }
}

impl std::error::Error for StegoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Model(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ModelError> for StegoError {
    fn from(e: ModelError) -> Self {
        Self::Model(e)
    }
}
