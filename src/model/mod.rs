// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/covertext

//! Read-only adapter over a pre-trained n-gram language model.
//!
//! A [`MarkovModel`] maps a context of `state_size` tokens to a weighted set
//! of successor tokens. Two sentinel tokens are reserved: [`START`] appears
//! only as left-padding context before the first real token of a chain, and
//! [`END`] is a valid successor meaning "the chain terminates here".
//!
//! The model is immutable once built and safe to share across concurrent
//! encode/decode sessions. Iteration order of both the context keys and each
//! context's successor set is the insertion order of the artifact — this
//! order is part of the wire contract: encoder and decoder must derive
//! bit-identical candidate lists from the same model, and any divergence
//! silently corrupts every following bit.

pub mod artifact;
pub mod error;

use std::collections::HashMap;

pub use error::ModelError;
use error::Result;

/// Sentinel token used as left-padding context before the first real token.
pub const START: &str = "___BEGIN__";

/// Sentinel successor token marking a permissible chain termination.
pub const END: &str = "___END__";

/// A pre-trained n-gram language model.
///
/// Built from an artifact with [`MarkovModel::from_json`] / [`MarkovModel::load`],
/// or programmatically with [`MarkovModel::from_entries`]. Entry points (the
/// tokens legally allowed to start a generated sequence) are extracted once
/// at construction and cached.
pub struct MarkovModel {
    state_size: usize,
    /// Context keys paired with their weighted successors, in artifact order.
    entries: Vec<(Vec<String>, Vec<(String, u64)>)>,
    /// Lookup from context key to position in `entries`.
    index: HashMap<Vec<String>, usize>,
    /// Cached entry points, in model order.
    entrypoints: Vec<String>,
}

impl MarkovModel {
    /// Build a model from `(context, successors)` entries.
    ///
    /// Entries are kept in the given order; a duplicate context key extends
    /// the successor list of its first occurrence.
    ///
    /// # Errors
    /// - [`ModelError::InvalidStateSize`] if `state_size` is zero.
    /// - [`ModelError::Empty`] if `entries` is empty.
    /// - [`ModelError::ContextLength`] if a key's length differs from `state_size`.
    /// - [`ModelError::MissingStartContext`] if no key begins with [`START`].
    pub fn from_entries(
        state_size: usize,
        entries: Vec<(Vec<String>, Vec<(String, u64)>)>,
    ) -> Result<Self> {
        if state_size == 0 {
            return Err(ModelError::InvalidStateSize(0));
        }
        if entries.is_empty() {
            return Err(ModelError::Empty);
        }

        let mut merged: Vec<(Vec<String>, Vec<(String, u64)>)> = Vec::with_capacity(entries.len());
        let mut index: HashMap<Vec<String>, usize> = HashMap::with_capacity(entries.len());
        for (key, successors) in entries {
            if key.len() != state_size {
                return Err(ModelError::ContextLength {
                    expected: state_size,
                    got: key.len(),
                });
            }
            match index.get(&key) {
                Some(&at) => merged[at].1.extend(successors),
                None => {
                    index.insert(key.clone(), merged.len());
                    merged.push((key, successors));
                }
            }
        }

        if !merged.iter().any(|(key, _)| key[0] == START) {
            return Err(ModelError::MissingStartContext);
        }

        let entrypoints = extract_entrypoints(state_size, &merged);
        Ok(Self {
            state_size,
            entries: merged,
            index,
            entrypoints,
        })
    }

    /// Parse a model from JSON artifact bytes. See [`artifact`] for the format.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        artifact::from_json(bytes)
    }

    /// Read and parse a model artifact from a file.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        artifact::from_json(&bytes)
    }

    /// The context order `k` of the model.
    pub fn state_size(&self) -> usize {
        self.state_size
    }

    /// Number of distinct context keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the model has no context keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Weighted successors of `context`, in artifact order, or `None` if the
    /// context key is absent from the model.
    pub fn successors(&self, context: &[String]) -> Option<&[(String, u64)]> {
        self.index.get(context).map(|&at| self.entries[at].1.as_slice())
    }

    /// The tokens legally allowed to start a generated sequence, in model
    /// order. Both encoder and decoder index into this exact list.
    pub fn entrypoints(&self) -> &[String] {
        &self.entrypoints
    }

    /// Iterate over `(context, successors)` entries in artifact order.
    pub fn entries(&self) -> impl Iterator<Item = (&[String], &[(String, u64)])> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}

/// Extract entry points from the model's context keys.
///
/// For `k == 1` the entry points are the successors of the single-token START
/// context, in successor order. For `k > 1` they are the last element of every
/// context key whose first `k-1` elements are all START, skipping the first
/// such key encountered (the all-START key, which is not a usable entry
/// point). The skip applies to the first qualifying key whatever it is.
fn extract_entrypoints(
    state_size: usize,
    entries: &[(Vec<String>, Vec<(String, u64)>)],
) -> Vec<String> {
    if state_size == 1 {
        let start_key = [START.to_string()];
        return entries
            .iter()
            .find(|(key, _)| key[..] == start_key[..])
            .map(|(_, successors)| successors.iter().map(|(t, _)| t.clone()).collect())
            .unwrap_or_default();
    }

    let mut first_seen = false;
    let mut entrypoints = Vec::new();
    for (key, _) in entries {
        if key[..state_size - 1].iter().all(|t| t == START) {
            if !first_seen {
                first_seen = true;
                continue;
            }
            entrypoints.push(key[state_size - 1].clone());
        }
    }
    entrypoints
}
