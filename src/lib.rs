// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/covertext

//! # covertext-core
//!
//! Markov-chain text steganography engine: transcodes an arbitrary binary
//! payload into a sequence of natural-language-like tokens by walking a
//! pre-trained n-gram model, and transcodes such text back into the original
//! bits. Two algorithm families are provided:
//!
//! - **Enhanced**: canonical fixed-index coding over frequency-sorted
//!   candidate lists, with an end-key marker that makes round trips bit-exact
//!   for payloads of any length.
//! - **Existing**: frequency-weighted prefix (Huffman) coding with a
//!   literal-escape fallback. May legitimately fail to decode unaligned
//!   payload tails; failures are typed and reported.
//!
//! The model layer (`model` module) is a read-only adapter over a pre-built
//! artifact; training is out of scope. The transcoding layer (`stego` module)
//! is step-driven so a caller-owned loop can report progress without any
//! internal threading, and all randomness (entry-point and end-key-position
//! choices) comes from an injected ChaCha20 seed so runs are reproducible.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use covertext_core::{Algorithm, MarkovModel, encode_bytes, decode_bytes, random_seed};
//!
//! let model = MarkovModel::load("models/legal_corpus.json").unwrap();
//! let text = encode_bytes(&model, b"secret", Algorithm::Enhanced, random_seed()).unwrap();
//! let payload = decode_bytes(&model, &text, Algorithm::Enhanced).unwrap();
//! assert_eq!(payload, b"secret");
//! ```

pub mod model;
pub mod stego;

pub use model::{MarkovModel, ModelError, END, START};
pub use stego::progress;
pub use stego::{
    decode_bits, decode_bytes, decode_run, encode_bits, encode_bytes, encode_run, random_seed,
    Algorithm, BitBuffer, BitCursor, EnhancedDecoder, EnhancedEncoder, ExistingDecoder,
    ExistingEncoder, Operation, RunRecord, StegoError,
};

#[cfg(feature = "parallel")]
pub use stego::{encode_batch, EncodeJob};
