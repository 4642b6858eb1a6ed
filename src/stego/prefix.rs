// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/covertext

//! Frequency-weighted prefix codes (Huffman) over candidate lists.
//!
//! The Existing algorithm replaces fixed-width indexing with a variable-length
//! prefix code built from the candidate weights of each context. Construction
//! must be bit-identical on the encoder and decoder side, so every source of
//! nondeterminism is pinned down: leaves enter the queue in canonical
//! candidate order, merges break weight ties by sequence number, and the
//! first node popped from a merge always takes the 0 branch.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// A prefix code over one context's candidate list.
///
/// Maps each token to a codeword (a 0/1 sequence) and back. Built per step
/// from the candidate list of the current context; requires at least two
/// candidates (a single candidate is emitted without consuming bits and
/// never reaches this type).
pub struct PrefixCode<'m> {
    /// `(token, codeword)` in candidate order.
    codes: Vec<(&'m str, Vec<u8>)>,
    by_token: HashMap<&'m str, usize>,
    by_pattern: HashMap<Vec<u8>, usize>,
    max_len: usize,
}

enum Node {
    Leaf(usize),
    Internal(usize, usize),
}

impl<'m> PrefixCode<'m> {
    /// Build the code for `candidates` (canonical order, length >= 2).
    pub fn build(candidates: &[(&'m str, u64)]) -> Self {
        debug_assert!(candidates.len() >= 2);

        let n = candidates.len();
        let mut nodes: Vec<Node> = (0..n).map(Node::Leaf).collect();
        // Reverse-ordered min-heap of (weight, sequence, node index). The
        // sequence number makes tie-breaking deterministic: leaves use their
        // candidate position, internal nodes count up from n.
        let mut heap: BinaryHeap<Reverse<(u64, usize, usize)>> = candidates
            .iter()
            .enumerate()
            .map(|(i, (_, w))| Reverse((*w, i, i)))
            .collect();

        let mut seq = n;
        while heap.len() > 1 {
            let Reverse((w0, _, zero)) = heap.pop().expect("heap len checked");
            let Reverse((w1, _, one)) = heap.pop().expect("heap len checked");
            nodes.push(Node::Internal(zero, one));
            heap.push(Reverse((w0.saturating_add(w1), seq, nodes.len() - 1)));
            seq += 1;
        }
        let Reverse((_, _, root)) = heap.pop().expect("non-empty candidate list");

        // Walk the tree, assigning 0 to the first-popped child of each merge.
        let mut codes: Vec<(&'m str, Vec<u8>)> =
            candidates.iter().map(|(t, _)| (*t, Vec::new())).collect();
        let mut stack: Vec<(usize, Vec<u8>)> = vec![(root, Vec::new())];
        let mut max_len = 0;
        while let Some((at, prefix)) = stack.pop() {
            match &nodes[at] {
                Node::Leaf(i) => {
                    max_len = max_len.max(prefix.len());
                    codes[*i].1 = prefix;
                }
                Node::Internal(zero, one) => {
                    let mut p0 = prefix.clone();
                    p0.push(0);
                    let mut p1 = prefix;
                    p1.push(1);
                    stack.push((*zero, p0));
                    stack.push((*one, p1));
                }
            }
        }

        let by_token = codes.iter().enumerate().map(|(i, (t, _))| (*t, i)).collect();
        let by_pattern = codes
            .iter()
            .enumerate()
            .map(|(i, (_, c))| (c.clone(), i))
            .collect();
        Self {
            codes,
            by_token,
            by_pattern,
            max_len,
        }
    }

    /// The codeword for `token`, or `None` if it is not a candidate.
    pub fn code_of(&self, token: &str) -> Option<&[u8]> {
        self.by_token.get(token).map(|&i| self.codes[i].1.as_slice())
    }

    /// Length of the longest codeword.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Find the longest prefix of `rest` that is a valid codeword, trying
    /// lengths from the maximum down to 1. Returns the matched token and the
    /// codeword length.
    pub fn match_longest(&self, rest: &[u8]) -> Option<(&'m str, usize)> {
        let top = self.max_len.min(rest.len());
        for len in (1..=top).rev() {
            if let Some(&i) = self.by_pattern.get(&rest[..len]) {
                return Some((self.codes[i].0, len));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(code: &PrefixCode) -> Vec<(String, Vec<u8>)> {
        code.codes
            .iter()
            .map(|(t, c)| (t.to_string(), c.clone()))
            .collect()
    }

    #[test]
    fn two_symbols_get_single_bits() {
        let code = PrefixCode::build(&[("hi", 3), ("lo", 1)]);
        assert_eq!(code.code_of("hi").unwrap().len(), 1);
        assert_eq!(code.code_of("lo").unwrap().len(), 1);
        assert_ne!(code.code_of("hi"), code.code_of("lo"));
        assert_eq!(code.max_len(), 1);
    }

    #[test]
    fn construction_is_deterministic() {
        let cands = [("a", 2), ("b", 2), ("c", 2), ("d", 1)];
        let first = patterns(&PrefixCode::build(&cands));
        let second = patterns(&PrefixCode::build(&cands));
        assert_eq!(first, second);
    }

    #[test]
    fn codes_are_prefix_free() {
        let code = PrefixCode::build(&[("a", 7), ("b", 4), ("c", 2), ("d", 1), ("e", 1)]);
        let pats = patterns(&code);
        for (i, (_, p)) in pats.iter().enumerate() {
            for (j, (_, q)) in pats.iter().enumerate() {
                if i != j {
                    assert!(!q.starts_with(p), "{p:?} is a prefix of {q:?}");
                }
            }
        }
    }

    #[test]
    fn heaviest_symbol_gets_shortest_code() {
        let code = PrefixCode::build(&[("rare", 1), ("common", 90), ("odd", 2)]);
        assert!(code.code_of("common").unwrap().len() <= code.code_of("rare").unwrap().len());
        assert!(code.code_of("common").unwrap().len() <= code.code_of("odd").unwrap().len());
    }

    #[test]
    fn full_tree_kraft_equality() {
        let code = PrefixCode::build(&[("a", 5), ("b", 3), ("c", 2), ("d", 1)]);
        let sum: f64 = patterns(&code)
            .iter()
            .map(|(_, p)| 0.5f64.powi(p.len() as i32))
            .sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn match_longest_prefers_longer_codeword() {
        let code = PrefixCode::build(&[("a", 8), ("b", 2), ("c", 1)]);
        // "a" has the 1-bit code; "b"/"c" share its complement as prefix.
        let a = code.code_of("a").unwrap().to_vec();
        let b = code.code_of("b").unwrap().to_vec();
        let (tok, len) = code.match_longest(&b).unwrap();
        assert_eq!((tok, len), ("b", b.len()));
        let (tok, len) = code.match_longest(&a).unwrap();
        assert_eq!((tok, len), ("a", a.len()));
    }

    #[test]
    fn match_longest_none_on_short_tail() {
        let code = PrefixCode::build(&[("a", 1), ("b", 1), ("c", 1), ("d", 1)]);
        // All codewords are 2 bits for four equal weights; a 1-bit tail
        // cannot match anything.
        assert_eq!(code.max_len(), 2);
        assert!(code.match_longest(&[1]).is_none());
        assert!(code.match_longest(&[]).is_none());
    }

    #[test]
    fn zero_weights_still_build() {
        let code = PrefixCode::build(&[("a", 0), ("b", 0), ("c", 0)]);
        assert!(code.code_of("a").is_some());
        assert!(code.code_of("b").is_some());
        assert!(code.code_of("c").is_some());
    }
}
