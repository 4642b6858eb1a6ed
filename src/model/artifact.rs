// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/covertext

//! JSON model artifact format.
//!
//! The artifact is a single JSON document:
//!
//! ```text
//! {
//!   "state_size": 2,
//!   "transitions": [
//!     [["___BEGIN__", "___BEGIN__"], [["the", 5], ["a", 2]]],
//!     [["___BEGIN__", "the"],        [["cat", 3]]],
//!     ...
//!   ]
//! }
//! ```
//!
//! Context keys and successor sets are JSON *arrays*, not objects, so the
//! training-time insertion order survives serialization. That order is load
//! bearing: entry-point extraction and candidate tie-breaking both depend on
//! it (see [`crate::model`]).

use serde::{Deserialize, Serialize};

use super::error::Result;
use super::MarkovModel;

#[derive(Serialize, Deserialize)]
struct ModelArtifact {
    state_size: usize,
    transitions: Vec<(Vec<String>, Vec<(String, u64)>)>,
}

/// Parse a model from artifact bytes.
///
/// # Errors
/// [`ModelError::Json`](super::ModelError::Json) on malformed input, plus any
/// validation error from [`MarkovModel::from_entries`].
pub fn from_json(bytes: &[u8]) -> Result<MarkovModel> {
    let artifact: ModelArtifact = serde_json::from_slice(bytes)?;
    MarkovModel::from_entries(artifact.state_size, artifact.transitions)
}

/// Serialize a model back to artifact JSON.
///
/// Round-trips with [`from_json`]: the output preserves context-key and
/// successor order exactly.
pub fn to_json(model: &MarkovModel) -> Vec<u8> {
    let artifact = ModelArtifact {
        state_size: model.state_size(),
        transitions: model
            .entries()
            .map(|(k, v)| (k.to_vec(), v.to_vec()))
            .collect(),
    };
    serde_json::to_vec(&artifact).expect("model artifact serialization cannot fail")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelError, END, START};

    const SAMPLE: &str = r#"{
        "state_size": 1,
        "transitions": [
            [["___BEGIN__"], [["the", 3], ["a", 1]]],
            [["the"], [["end", 1]]],
            [["a"], [["end", 2]]],
            [["end"], [["___END__", 1]]]
        ]
    }"#;

    #[test]
    fn parse_sample() {
        let model = from_json(SAMPLE.as_bytes()).unwrap();
        assert_eq!(model.state_size(), 1);
        assert_eq!(model.len(), 4);
        assert_eq!(model.entrypoints(), &["the".to_string(), "a".to_string()]);
        let s = model.successors(&["end".to_string()]).unwrap();
        assert_eq!(s, &[(END.to_string(), 1)]);
    }

    #[test]
    fn json_roundtrip_preserves_order() {
        let model = from_json(SAMPLE.as_bytes()).unwrap();
        let bytes = to_json(&model);
        let again = from_json(&bytes).unwrap();

        let keys_a: Vec<_> = model.entries().map(|(k, _)| k.to_vec()).collect();
        let keys_b: Vec<_> = again.entries().map(|(k, _)| k.to_vec()).collect();
        assert_eq!(keys_a, keys_b);

        let start_key = vec![START.to_string()];
        assert_eq!(
            model.successors(&start_key).unwrap(),
            again.successors(&start_key).unwrap()
        );
    }

    #[test]
    fn malformed_json_rejected() {
        let r = from_json(b"{ not json");
        assert!(matches!(r, Err(ModelError::Json(_))));
    }

    #[test]
    fn wrong_shape_rejected() {
        let r = from_json(br#"{"state_size": "two", "transitions": []}"#);
        assert!(matches!(r, Err(ModelError::Json(_))));
    }

    #[test]
    fn invalid_state_size_surfaces() {
        let r = from_json(br#"{"state_size": 0, "transitions": [[["x"], [["y", 1]]]]}"#);
        assert!(matches!(r, Err(ModelError::InvalidStateSize(0))));
    }
}
