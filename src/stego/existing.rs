// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/covertext

//! Existing algorithm: frequency-weighted prefix coding with literal escape.
//!
//! Each mid-chain step builds a Huffman code over the weighted candidates of
//! the current context (END included as a selectable symbol — matching its
//! codeword terminates the chain) and consumes the longest codeword that
//! prefixes the remaining payload. When no codeword matches, the entire
//! remaining buffer is emitted as a bracket-delimited literal token, which
//! visibly breaks the language-model illusion and is the documented source of
//! decode failure for unaligned tails. Entry points are chosen at random and
//! carry no payload bits.
//!
//! The decoder mirrors the code construction and looks up each literal
//! token's codeword. It cannot see where the encoder's chains ended, so it
//! guesses: after a token ending in `.`, `?` or `!` whose new context admits
//! END, it appends END's codeword and treats the chain as closed. This
//! punctuation heuristic is not mirrored by the encoder's random entry-point
//! re-selection and is preserved as-is, asymmetry included.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::model::{MarkovModel, END};

use super::bits::{BitBuffer, BitCursor};
use super::candidates::{contains_end, ordered_candidates, ContextWindow};
use super::error::StegoError;
use super::prefix::PrefixCode;

/// Returns `true` for bracket-delimited literal-escape tokens.
pub(crate) fn is_literal_escape(token: &str) -> bool {
    token.len() >= 2 && token.starts_with('<') && token.ends_with('>')
}

/// Format the remaining payload bits as a literal-escape token.
fn literal_escape(rest: &[u8]) -> String {
    let mut out = String::with_capacity(rest.len() + 2);
    out.push('<');
    for &bit in rest {
        out.push(if bit == 1 { '1' } else { '0' });
    }
    out.push('>');
    out
}

/// Encoder session for the Existing algorithm.
pub struct ExistingEncoder<'m> {
    model: &'m MarkovModel,
    cursor: BitCursor,
    rng: ChaCha20Rng,
    window: Option<ContextWindow>,
    tokens: Vec<String>,
    exhausted: bool,
    finished: bool,
}

impl<'m> ExistingEncoder<'m> {
    /// Create a session over `payload`. The pseudo-random source (for entry
    /// point selection) is injected as a seed so runs are reproducible.
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
            let at = self.rng.gen_range(0..entrypoints.len() as u32) as usize;
            let token = entrypoints[at].clone();
            self.window = Some(ContextWindow::seed(self.model.state_size(), &token));
            self.tokens.push(token);
            self.exhausted = false;
            if self.cursor.remaining() == 0 {
                self.finished = true;
            }
            return Ok(self.progress());
        }

        let window = self.window.as_ref().expect("mid-chain window");
        let candidates = ordered_candidates(self.model, window.as_slice())?;

        if candidates.len() == 1 {
            let (token, _) = candidates[0];
            if token == END {
                self.exhausted = true;
                return Ok(self.progress());
            }
            // Sole candidate: emitted unconditionally, zero bits consumed.
            let token = token.to_string();
            self.window.as_mut().expect("mid-chain window").push(&token);
            self.tokens.push(token);
            if self.cursor.remaining() == 0 {
                self.finished = true;
            }
            return Ok(self.progress());
        }

        let code = PrefixCode::build(&candidates);
        match code.match_longest(self.cursor.rest()) {
            Some((token, len)) => {
                self.cursor.advance(len);
                if token == END {
                    if self.cursor.remaining() == 0 {
                        // Buffer spent exactly at the boundary: stop without
                        // opening a new chain.
                        self.finished = true;
                    } else {
                        self.exhausted = true;
                    }
                } else {
                    let token = token.to_string();
                    self.window.as_mut().expect("mid-chain window").push(&token);
                    self.tokens.push(token);
                    if self.cursor.remaining() == 0 {
                        self.finished = true;
                    }
                }
            }
            None => {
                // No codeword prefixes the remaining bits: escape them all.
                let escape = literal_escape(self.cursor.rest());
                let count = self.cursor.remaining();
                self.cursor.advance(count);
                self.tokens.push(escape);
                self.finished = true;
            }
        }
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
}

/// Decoder session for the Existing algorithm.
pub struct ExistingDecoder<'m> {
    model: &'m MarkovModel,
    tokens: Vec<String>,
    pos: usize,
    window: Option<ContextWindow>,
    bits: Vec<u8>,
    exhausted: bool,
    finished: bool,
}

impl<'m> ExistingDecoder<'m> {
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
            bits: Vec::new(),
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
        if is_literal_escape(&token) {
            // Tagged as unrecoverable rather than guessed around.
            return Err(StegoError::LiteralEscape(token));
        }

        if self.exhausted {
            if !self.model.entrypoints().iter().any(|e| e == &token) {
                return Err(StegoError::UnresolvableToken(token));
            }
            self.window = Some(ContextWindow::seed(self.model.state_size(), &token));
            self.exhausted = false;
            self.advance_token();
            self.maybe_force_end(&token);
            return Ok(self.progress());
        }

        let window = self.window.as_ref().expect("mid-chain window");
        let candidates = ordered_candidates(self.model, window.as_slice())?;

        if candidates.len() == 1 {
            let (expected, _) = candidates[0];
            if expected == END {
                self.exhausted = true;
                return Ok(self.progress());
            }
            if token != expected {
                return Err(StegoError::UnresolvableToken(token));
            }
            self.window.as_mut().expect("mid-chain window").push(&token);
            self.advance_token();
            self.maybe_force_end(&token);
            return Ok(self.progress());
        }

        let code = PrefixCode::build(&candidates);
        match code.code_of(&token) {
            Some(pattern) => {
                self.bits.extend_from_slice(pattern);
                self.window.as_mut().expect("mid-chain window").push(&token);
                self.advance_token();
                self.maybe_force_end(&token);
            }
            None => return Err(StegoError::UnresolvableToken(token)),
        }
        Ok(self.progress())
    }

    /// Drive the session to completion and return the recovered bits.
    pub fn solve(&mut self) -> Result<BitBuffer, StegoError> {
        while !self.finished {
            self.step()?;
        }
        Ok(BitBuffer::from_bits(self.bits.clone()))
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Punctuation-forced termination: after a sentence-terminal token whose
    /// new context admits END, assume the encoder closed the chain there and
    /// append END's codeword. Fires regardless of what the next literal token
    /// is (or whether one exists), and tolerates a context absent from the
    /// model (the encoder never looked such a context up either).
    fn maybe_force_end(&mut self, token: &str) {
        if !token.ends_with(['.', '?', '!']) {
            return;
        }
        let window = self.window.as_ref().expect("window set before force-end");
        if self.model.successors(window.as_slice()).is_none() {
            return;
        }
        let candidates = ordered_candidates(self.model, window.as_slice())
            .expect("successor presence checked");
        if !contains_end(&candidates) {
            return;
        }
        if candidates.len() > 1 {
            let code = PrefixCode::build(&candidates);
            if let Some(pattern) = code.code_of(END) {
                self.bits.extend_from_slice(pattern);
            }
        }
        self.exhausted = true;
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
