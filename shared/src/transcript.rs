//! Result batches delivered by a continuous speech-to-text engine.
//!
//! A batch carries every result of the current recognition pass; only the
//! results from `result_index` onwards changed since the previous batch.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Alternative {
    pub transcript: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TranscriptResult {
    /// Stable (final) or tentative (interim) hypothesis.
    pub is_final: bool,
    pub alternatives: Vec<Alternative>,
}

impl TranscriptResult {
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            is_final: true,
            alternatives: vec![Alternative {
                transcript: text.into(),
                confidence: None,
            }],
        }
    }

    pub fn interim_text(text: impl Into<String>) -> Self {
        Self {
            is_final: false,
            ..Self::final_text(text)
        }
    }

    /// The top alternative, the only one ever consulted.
    pub fn best(&self) -> Option<&Alternative> {
        self.alternatives.first()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ResultBatch {
    #[serde(default)]
    pub result_index: usize,
    pub results: Vec<TranscriptResult>,
}

impl ResultBatch {
    pub fn new(result_index: usize, results: Vec<TranscriptResult>) -> Self {
        Self {
            result_index,
            results,
        }
    }

    /// Results that changed in this batch, paired with their index, in
    /// ascending index order. An out-of-range `result_index` yields nothing.
    pub fn pending(&self) -> impl Iterator<Item = (usize, &TranscriptResult)> {
        self.results
            .iter()
            .enumerate()
            .skip(self.result_index)
    }
}
