// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/covertext

//! Enhanced algorithm: canonical fixed-index coding with an end-key marker.
//!
//! Each step addresses the current context's candidate list with a
//! fixed-width big-endian index of `floor(log2(n))` bits. The terminal
//! selection may consume fewer bits than its canonical width when the payload
//! runs short; the true count is recorded as a single trailing letter
//! (`'a'` + count) appended to one uniformly-randomly chosen already-emitted
//! token. The decoder re-derives every list from the shared model, spots the
//! marker as the one token that fails its literal candidate match, and
//! overrides the terminal selection's width with the recorded count —
//! producing bit-exact round trips for payloads of any length.
//!
//! A context whose candidates include the END sentinel is a chain boundary:
//! the step consumes nothing and the next step picks a fresh entry point
//! (indexed by payload bits, unlike the Existing algorithm's random choice).

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::model::MarkovModel;

use super::bits::{BitBuffer, BitCursor};
use super::candidates::{code_width, contains_end, ordered_candidates, ContextWindow};
use super::error::StegoError;

/// Marker character for a terminal selection that consumed `consumed` bits.
///
/// # Errors
/// [`StegoError::EndKeyOutOfRange`] for counts the letter range cannot
/// express (`>= 26`).
pub(crate) fn end_key_char(consumed: usize) -> Result<char, StegoError> {
    if consumed > 25 {
        return Err(StegoError::EndKeyOutOfRange(consumed));
    }
    Ok((b'a' + consumed as u8) as char)
}

/// Split a trailing end-key marker off a token, if one is present.
pub(crate) fn split_end_key(token: &str) -> Option<(&str, usize)> {
    if token.len() < 2 {
        return None;
    }
    let last = *token.as_bytes().last().expect("length checked");
    if last.is_ascii_lowercase() {
        Some((&token[..token.len() - 1], (last - b'a') as usize))
    } else {
        None
    }
}

/// Encoder session for the Enhanced algorithm.
///
/// A single-step state machine: `exhausted` means the next step picks a new
/// entry point, `finished` is terminal. The pseudo-random source (for the
/// end-key position) is injected as a seed so runs are reproducible.
pub struct EnhancedEncoder<'m> {
    model: &'m MarkovModel,
    cursor: BitCursor,
    rng: ChaCha20Rng,
    window: Option<ContextWindow>,
    tokens: Vec<String>,
    exhausted: bool,
    finished: bool,
}

impl<'m> EnhancedEncoder<'m> {
    /// Create a session over `payload`.
    ///
    /// # Errors
    /// [`StegoError::NoEntrypoints`] if the model yields no legal first
    /// tokens.
    pub fn new(model: &'m MarkovModel, payload: BitBuffer, seed: [u8; 32]) -> Result<Self, StegoError> {
        if model.entrypoints().is_empty() {
            return Err(StegoError::NoEntrypoints);
        }
        Ok(Self {
            model,
            cursor: BitCursor::new(payload),
            rng: ChaCha20Rng::from_seed(seed),
            window: None,
            tokens: Vec::new(),
            exhausted: true,
            finished: false,
        })
    }

    /// Advance the session by one selection and return the fraction of the
    /// payload consumed so far. Idempotent once finished (returns 1.0).
    pub fn step(&mut self) -> Result<f64, StegoError> {
        if self.finished {
            return Ok(1.0);
        }

        if self.exhausted {
            let entrypoints = self.model.entrypoints();
            let width = code_width(entrypoints.len());
            let (index, consumed) = self.cursor.take(width);
            let token = entrypoints[index].clone();
            self.window = Some(ContextWindow::seed(self.model.state_size(), &token));
            self.tokens.push(token);
            self.exhausted = false;
            self.finish_if_spent(consumed)?;
            return Ok(self.progress());
        }

        let window = self.window.as_ref().expect("mid-chain window");
        let candidates = ordered_candidates(self.model, window.as_slice())?;
        if contains_end(&candidates) {
            // Chain boundary: nothing is consumed, the next step re-enters.
            self.exhausted = true;
            return Ok(self.progress());
        }

        let width = code_width(candidates.len());
        let (index, consumed) = self.cursor.take(width);
        let token = candidates[index].0.to_string();
        self.window.as_mut().expect("mid-chain window").push(&token);
        self.tokens.push(token);
        self.finish_if_spent(consumed)?;
        Ok(self.progress())
    }

    /// Drive the session to completion and return the stego text.
    pub fn generate(&mut self) -> Result<String, StegoError> {
        while !self.finished {
            self.step()?;
        }
        Ok(self.output())
    }

    /// The space-joined token sequence emitted so far.
    pub fn output(&self) -> String {
        self.tokens.join(" ")
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn progress(&self) -> f64 {
        if self.finished {
            1.0
        } else {
            self.cursor.fraction()
        }
    }

    /// Terminate once the payload is fully consumed: record the true bit
    /// count of the final selection on a uniformly random emitted token.
    fn finish_if_spent(&mut self, consumed: usize) -> Result<(), StegoError> {
        if self.cursor.remaining() > 0 {
            return Ok(());
        }
        let marker = end_key_char(consumed)?;
        // u32 range keeps the draw identical across platforms.
        let at = self.rng.gen_range(0..self.tokens.len() as u32) as usize;
        self.tokens[at].push(marker);
        self.finished = true;
        Ok(())
    }
}

/// Decoder session for the Enhanced algorithm.
pub struct EnhancedDecoder<'m> {
    model: &'m MarkovModel,
    tokens: Vec<String>,
    pos: usize,
    window: Option<ContextWindow>,
    /// `(index, canonical width)` per emitted token, in order.
    selections: Vec<(usize, usize)>,
    end_key: Option<usize>,
    exhausted: bool,
    finished: bool,
}

impl<'m> EnhancedDecoder<'m> {
    /// Create a session over whitespace-separated stego text.
    ///
    /// # Errors
    /// [`StegoError::NoEntrypoints`] if the model yields no legal first
    /// tokens.
    pub fn new(model: &'m MarkovModel, text: &str) -> Result<Self, StegoError> {
        if model.entrypoints().is_empty() {
            return Err(StegoError::NoEntrypoints);
        }
        let tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        let finished = tokens.is_empty();
        Ok(Self {
            model,
            tokens,
            pos: 0,
            window: None,
            selections: Vec::new(),
            end_key: None,
            exhausted: true,
            finished,
        })
    }

    /// Consume one token (or cross one chain boundary) and return the
    /// fraction of the text processed. Idempotent once finished.
    pub fn step(&mut self) -> Result<f64, StegoError> {
        if self.finished {
            return Ok(1.0);
        }

        let token = self.tokens[self.pos].clone();
        if self.exhausted {
            let entrypoints = self.model.entrypoints();
            let width = code_width(entrypoints.len());
            let (literal, index) =
                self.resolve(&token, |t| entrypoints.iter().position(|e| e == t))?;
            check_addressable(index, width)?;
            self.window = Some(ContextWindow::seed(self.model.state_size(), &literal));
            self.selections.push((index, width));
            self.exhausted = false;
            self.advance_token();
            return Ok(self.progress());
        }

        let window = self.window.as_ref().expect("mid-chain window");
        let candidates = ordered_candidates(self.model, window.as_slice())?;
        if contains_end(&candidates) {
            // Chain boundary, mirroring the encoder: the token is consumed by
            // the next step as an entry point.
            self.exhausted = true;
            return Ok(self.progress());
        }

        let width = code_width(candidates.len());
        let (literal, index) =
            self.resolve(&token, |t| candidates.iter().position(|(c, _)| *c == t))?;
        check_addressable(index, width)?;
        self.window.as_mut().expect("mid-chain window").push(&literal);
        self.selections.push((index, width));
        self.advance_token();
        Ok(self.progress())
    }

    /// Drive the session to completion and reassemble the payload bits.
    ///
    /// The end key (if one was found) overrides the canonical width of the
    /// terminal selection, recovering a final code word that consumed fewer
    /// bits than its structural width.
    pub fn solve(&mut self) -> Result<BitBuffer, StegoError> {
        while !self.finished {
            self.step()?;
        }

        let mut bits = Vec::new();
        let last = self.selections.len().wrapping_sub(1);
        for (i, &(index, canonical)) in self.selections.iter().enumerate() {
            let width = if i == last {
                self.end_key.unwrap_or(canonical)
            } else {
                canonical
            };
            check_addressable(index, width)?;
            for bit in (0..width).rev() {
                bits.push(((index >> bit) & 1) as u8);
            }
        }
        Ok(BitBuffer::from_bits(bits))
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Match `token` against a candidate lookup, falling back to the
    /// end-key-stripped spelling. At most one marker may appear per text.
    fn resolve(
        &mut self,
        token: &str,
        find: impl Fn(&str) -> Option<usize>,
    ) -> Result<(String, usize), StegoError> {
        if let Some(index) = find(token) {
            return Ok((token.to_string(), index));
        }
        if let Some((stripped, key)) = split_end_key(token) {
            if let Some(index) = find(stripped) {
                if self.end_key.is_some() {
                    return Err(StegoError::UnresolvableToken(token.to_string()));
                }
                self.end_key = Some(key);
                return Ok((stripped.to_string(), index));
            }
        }
        Err(StegoError::UnresolvableToken(token.to_string()))
    }

    fn advance_token(&mut self) {
        self.pos += 1;
        if self.pos == self.tokens.len() {
            self.finished = true;
        }
    }

    fn progress(&self) -> f64 {
        if self.finished {
            1.0
        } else {
            self.pos as f64 / self.tokens.len() as f64
        }
    }
}

fn check_addressable(index: usize, width: usize) -> Result<(), StegoError> {
    let limit = 1usize << width;
    if index >= limit {
        return Err(StegoError::AddressableRange { index, limit });
    }
    Ok(())
}
