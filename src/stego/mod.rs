// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/covertext

//! Bit↔text transcoding over a shared language model.
//!
//! This module provides two algorithm families:
//!
//! - **Enhanced** ([`EnhancedEncoder`] / [`EnhancedDecoder`]): canonical
//!   fixed-index coding over frequency-sorted candidate lists, with an
//!   end-key marker recording the true bit count of the terminal selection.
//!   Round-trips every payload bit-exactly.
//!
//! - **Existing** ([`ExistingEncoder`] / [`ExistingDecoder`]): Huffman prefix
//!   coding over the same weighted candidate lists, with a literal-escape
//!   fallback for unmatched bit groups and a punctuation-triggered forced
//!   termination heuristic on the decode side. Expected to fail on some
//!   inputs by design; failures are reported, never papered over.
//!
//! Both families derive entry points and candidate lists independently on
//! each side from the same read-only [`MarkovModel`](crate::model::MarkovModel);
//! the derivation order is the wire contract.

pub mod bits;
pub mod candidates;
pub mod enhanced;
pub mod error;
pub mod existing;
mod pipeline;
pub mod prefix;
pub mod progress;
pub mod record;

pub use bits::{BitBuffer, BitCursor};
pub use enhanced::{EnhancedDecoder, EnhancedEncoder};
pub use error::StegoError;
pub use existing::{ExistingDecoder, ExistingEncoder};
pub use pipeline::{
    decode_bits, decode_bytes, decode_run, encode_bits, encode_bytes, encode_run, random_seed,
};
pub use record::{Operation, RunRecord};

#[cfg(feature = "parallel")]
pub use pipeline::{encode_batch, EncodeJob};

/// The two transcoding algorithm families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Prefix-code (Huffman) scheme with literal-escape fallback.
    Existing,
    /// Canonical fixed-index scheme with end-key completion marker.
    Enhanced,
}

impl Algorithm {
    /// The display label the history layer stores.
    pub fn name(self) -> &'static str {
        match self {
            Self::Existing => "Existing Algorithm",
            Self::Enhanced => "Enhanced Algorithm",
        }
    }

    /// Parse a label back into an algorithm. Accepts the display labels and
    /// the short lowercase forms.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Existing Algorithm" | "existing" => Some(Self::Existing),
            "Enhanced Algorithm" | "enhanced" => Some(Self::Enhanced),
            _ => None,
        }
    }
}
