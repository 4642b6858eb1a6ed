// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/covertext

//! Canonical candidate lists and the sliding context window.
//!
//! For a given context, both encoder and decoder must derive the exact same
//! ordered list of admissible next tokens: descending weight, ties broken by
//! first-seen order in the model (stable sort). The order is part of the wire
//! contract — a divergence silently corrupts every following bit.
//!
//! The canonical code width for a list of `n` candidates is
//! `floor(log2(n))` bits, so only the first `2^width` sorted candidates are
//! ever addressable by the fixed-index scheme. Candidates beyond that are
//! structurally unreachable; the truncation is preserved deliberately since
//! extending addressability would break compatibility with previously
//! produced text under the same model.

use crate::model::{MarkovModel, END, START};

use super::error::StegoError;

/// The weighted successors of one context, in canonical order.
pub type CandidateList<'m> = Vec<(&'m str, u64)>;

/// Derive the canonical candidate list for `context`.
///
/// # Errors
/// [`StegoError::ModelLookup`] if the context key is absent from the model.
pub fn ordered_candidates<'m>(
    model: &'m MarkovModel,
    context: &[String],
) -> Result<CandidateList<'m>, StegoError> {
    let successors = model
        .successors(context)
        .ok_or_else(|| StegoError::ModelLookup(context.join(" ")))?;
    let mut candidates: CandidateList<'m> = successors
        .iter()
        .map(|(t, w)| (t.as_str(), *w))
        .collect();
    // Stable: equal weights keep model order.
    candidates.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(candidates)
}

/// Returns `true` if the END sentinel is among the candidates.
pub fn contains_end(candidates: &[(&str, u64)]) -> bool {
    candidates.iter().any(|(t, _)| *t == END)
}

/// Canonical code width for a candidate list of size `n >= 1`:
/// `floor(log2(n))` bits (zero for a single candidate).
pub fn code_width(n: usize) -> usize {
    debug_assert!(n >= 1);
    n.ilog2() as usize
}

/// The fixed-size sliding tuple of the last `k` emitted tokens.
#[derive(Debug, Clone)]
pub struct ContextWindow {
    tokens: Vec<String>,
}

impl ContextWindow {
    /// Seed a window with `k-1` copies of START followed by the first chosen
    /// token.
    pub fn seed(state_size: usize, first: &str) -> Self {
        let mut tokens = vec![START.to_string(); state_size - 1];
        tokens.push(first.to_string());
        Self { tokens }
    }

    /// Slide the window by one emitted token.
    pub fn push(&mut self, token: &str) {
        self.tokens.remove(0);
        self.tokens.push(token.to_string());
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MarkovModel;

    fn key(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn succ(pairs: &[(&str, u64)]) -> Vec<(String, u64)> {
        pairs.iter().map(|(t, w)| (t.to_string(), *w)).collect()
    }

    #[test]
    fn code_width_formula() {
        for (n, expect) in [(1, 0), (2, 1), (3, 1), (4, 2), (5, 2), (8, 3), (9, 3)] {
            assert_eq!(code_width(n), expect, "L({n})");
        }
    }

    #[test]
    fn sorted_descending_with_stable_ties() {
        let model = MarkovModel::from_entries(
            1,
            vec![
                (key(&[START]), succ(&[("w", 1)])),
                // "x" and "z" tie at weight 2: model order must be kept.
                (key(&["w"]), succ(&[("x", 2), ("y", 5), ("z", 2), ("q", 1)])),
            ],
        )
        .unwrap();
        let cands = ordered_candidates(&model, &key(&["w"])).unwrap();
        let tokens: Vec<_> = cands.iter().map(|(t, _)| *t).collect();
        assert_eq!(tokens, vec!["y", "x", "z", "q"]);
    }

    #[test]
    fn order_reproducible() {
        let entries = vec![
            (key(&[START]), succ(&[("w", 1)])),
            (key(&["w"]), succ(&[("a", 3), ("b", 3), ("c", 3)])),
        ];
        let model = MarkovModel::from_entries(1, entries.clone()).unwrap();
        let first = ordered_candidates(&model, &key(&["w"])).unwrap();
        let second = ordered_candidates(&model, &key(&["w"])).unwrap();
        assert_eq!(first, second);

        let rebuilt = MarkovModel::from_entries(1, entries).unwrap();
        let third = ordered_candidates(&rebuilt, &key(&["w"])).unwrap();
        assert_eq!(first, third);
    }

    #[test]
    fn missing_context_is_lookup_failure() {
        let model =
            MarkovModel::from_entries(1, vec![(key(&[START]), succ(&[("w", 1)]))]).unwrap();
        let r = ordered_candidates(&model, &key(&["nope"]));
        assert!(matches!(r, Err(StegoError::ModelLookup(_))));
    }

    #[test]
    fn end_detection() {
        assert!(contains_end(&[("x", 1), (END, 9)]));
        assert!(!contains_end(&[("x", 1), ("y", 2)]));
    }

    #[test]
    fn window_seed_and_slide() {
        let mut w = ContextWindow::seed(3, "first");
        assert_eq!(w.as_slice(), &[START.to_string(), START.to_string(), "first".to_string()]);
        w.push("second");
        assert_eq!(
            w.as_slice(),
            &[START.to_string(), "first".to_string(), "second".to_string()]
        );
    }

    #[test]
    fn window_k1_holds_single_token() {
        let mut w = ContextWindow::seed(1, "only");
        assert_eq!(w.as_slice(), &["only".to_string()]);
        w.push("next");
        assert_eq!(w.as_slice(), &["next".to_string()]);
    }
}
