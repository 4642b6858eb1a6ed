// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/covertext

//! Blocking encode/decode pipelines.
//!
//! Sessions are step-driven so a caller-owned loop (e.g. a UI refresh timer)
//! can interleave progress display; these functions are the convenience path
//! that drives a session to completion in one call, wiring in the global
//! [`progress`] counter and cancellation checks at loop boundaries.

use log::{debug, info};
use rand::Rng;

use crate::model::MarkovModel;

use super::bits::BitBuffer;
use super::enhanced::{EnhancedDecoder, EnhancedEncoder};
use super::error::StegoError;
use super::existing::{ExistingDecoder, ExistingEncoder};
use super::progress;
use super::record::{Operation, RunRecord};
use super::Algorithm;

/// Draw a fresh seed for an encoder session from the thread RNG.
///
/// Encode runs that must be reproducible (tests, replays) pass a fixed seed
/// instead.
pub fn random_seed() -> [u8; 32] {
    let mut seed = [0u8; 32];
    rand::thread_rng().fill(&mut seed);
    seed
}

/// Encode a payload bit sequence into stego text.
///
/// # Errors
/// [`StegoError::NoEntrypoints`], [`StegoError::ModelLookup`],
/// [`StegoError::EndKeyOutOfRange`] (Enhanced) or
/// [`StegoError::Cancelled`].
pub fn encode_bits(
    model: &MarkovModel,
    payload: BitBuffer,
    algorithm: Algorithm,
    seed: [u8; 32],
) -> Result<String, StegoError> {
    let total_bits = payload.len();
    // Rough step estimate, refined implicitly by the cap in advance().
    progress::init((total_bits / 8).max(1) as u32);
    debug!("encode start: {} bits, {}", total_bits, algorithm.name());

    let text = match algorithm {
        Algorithm::Enhanced => {
            let mut session = EnhancedEncoder::new(model, payload, seed)?;
            while !session.is_finished() {
                progress::check_cancelled()?;
                session.step()?;
                progress::advance();
            }
            session.output()
        }
        Algorithm::Existing => {
            let mut session = ExistingEncoder::new(model, payload, seed)?;
            while !session.is_finished() {
                progress::check_cancelled()?;
                session.step()?;
                progress::advance();
            }
            session.output()
        }
    };

    progress::finish();
    info!(
        "encode done: {} bits -> {} tokens",
        total_bits,
        text.split_whitespace().count()
    );
    Ok(text)
}

/// Decode stego text back into its payload bit sequence.
///
/// # Errors
/// [`StegoError::UnresolvableToken`], [`StegoError::LiteralEscape`]
/// (Existing), [`StegoError::AddressableRange`], [`StegoError::ModelLookup`]
/// or [`StegoError::Cancelled`].
pub fn decode_bits(
    model: &MarkovModel,
    text: &str,
    algorithm: Algorithm,
) -> Result<BitBuffer, StegoError> {
    let token_count = text.split_whitespace().count();
    progress::init(token_count.max(1) as u32);
    debug!("decode start: {} tokens, {}", token_count, algorithm.name());

    let bits = match algorithm {
        Algorithm::Enhanced => {
            let mut session = EnhancedDecoder::new(model, text)?;
            while !session.is_finished() {
                progress::check_cancelled()?;
                session.step()?;
                progress::advance();
            }
            session.solve()?
        }
        Algorithm::Existing => {
            let mut session = ExistingDecoder::new(model, text)?;
            while !session.is_finished() {
                progress::check_cancelled()?;
                session.step()?;
                progress::advance();
            }
            session.solve()?
        }
    };

    progress::finish();
    info!("decode done: {} tokens -> {} bits", token_count, bits.len());
    Ok(bits)
}

/// Encode a byte payload (MSB-first bit unpacking) into stego text.
pub fn encode_bytes(
    model: &MarkovModel,
    payload: &[u8],
    algorithm: Algorithm,
    seed: [u8; 32],
) -> Result<String, StegoError> {
    encode_bits(model, BitBuffer::from_bytes(payload), algorithm, seed)
}

/// Decode stego text back into a byte payload.
///
/// # Errors
/// In addition to the [`decode_bits`] errors, [`StegoError::BitLength`] if
/// the recovered bit count is not a multiple of eight (an Existing-algorithm
/// hazard on unaligned tails).
pub fn decode_bytes(
    model: &MarkovModel,
    text: &str,
    algorithm: Algorithm,
) -> Result<Vec<u8>, StegoError> {
    decode_bits(model, text, algorithm)?.to_bytes()
}

/// Encode a byte payload and produce the run record the history layer
/// persists.
pub fn encode_run(
    model: &MarkovModel,
    file: &str,
    payload: &[u8],
    algorithm: Algorithm,
    seed: [u8; 32],
) -> Result<RunRecord, StegoError> {
    let text = encode_bytes(model, payload, algorithm, seed)?;
    Ok(RunRecord::new(
        file,
        algorithm,
        Operation::Encode,
        text,
        payload.len(),
    ))
}

/// Decode stego text and produce both the payload bytes and the run record.
pub fn decode_run(
    model: &MarkovModel,
    file: &str,
    text: &str,
    algorithm: Algorithm,
) -> Result<(Vec<u8>, RunRecord), StegoError> {
    let payload = decode_bytes(model, text, algorithm)?;
    let record = RunRecord::new(
        file,
        algorithm,
        Operation::Decode,
        text.to_string(),
        payload.len(),
    );
    Ok((payload, record))
}

/// One payload in a batch encode.
#[cfg(feature = "parallel")]
pub struct EncodeJob {
    pub file: String,
    pub payload: Vec<u8>,
    pub seed: [u8; 32],
}

/// Encode several payloads against one shared model in parallel.
///
/// The model is read-only and each session owns its mutable state, so no
/// locking is needed. All jobs advance the same global progress counter
/// concurrently; per-job progress is not distinguishable in this mode.
#[cfg(feature = "parallel")]
pub fn encode_batch(
    model: &MarkovModel,
    jobs: &[EncodeJob],
    algorithm: Algorithm,
) -> Vec<Result<RunRecord, StegoError>> {
    use rayon::prelude::*;

    jobs.par_iter()
        .map(|job| encode_run(model, &job.file, &job.payload, algorithm, job.seed))
        .collect()
}
