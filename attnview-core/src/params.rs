//! Viewer parameters supplied by the attention producer.
//!
//! The producer serializes one JSON object per viewer:
//!
//! ```json
//! {
//!   "attention": { "all": { "left_text": [...], "right_text": [...], "attn": [[[[0.1, ...]]]] } },
//!   "default_filter": "all",
//!   "display_mode": "light",
//!   "include_layers": [0, 1],
//!   "include_heads": [0, 1, 2],
//!   "total_heads": 12,
//!   "root_div_id": "bertviz-4f2a"
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ParamsError, Result};
use crate::palette::DisplayMode;

/// Attention weights indexed `[layer][head][source][target]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttentionTensor(Vec<Vec<Vec<Vec<f64>>>>);

impl AttentionTensor {
    pub fn new(weights: Vec<Vec<Vec<Vec<f64>>>>) -> Self {
        Self(weights)
    }

    pub fn num_layers(&self) -> usize {
        self.0.len()
    }

    /// Head count of the first layer; every layer has the same count once validated.
    pub fn num_heads(&self) -> usize {
        self.0.first().map(Vec::len).unwrap_or(0)
    }

    /// The source x target matrix for one (layer, head).
    pub fn head(&self, layer: usize, head: usize) -> Option<&[Vec<f64>]> {
        self.0
            .get(layer)
            .and_then(|heads| heads.get(head))
            .map(Vec::as_slice)
    }

    pub fn weight(&self, layer: usize, head: usize, source: usize, target: usize) -> Option<f64> {
        self.head(layer, head)
            .and_then(|rows| rows.get(source))
            .and_then(|row| row.get(target))
            .copied()
    }

    /// Check that every (layer, head) matrix is `sources x targets`.
    pub fn validate_shape(
        &self,
        filter: &str,
        sources: usize,
        targets: usize,
    ) -> std::result::Result<(), ParamsError> {
        let expected_heads = self.num_heads();
        for (layer, heads) in self.0.iter().enumerate() {
            if heads.len() != expected_heads {
                return Err(ParamsError::RaggedHeads {
                    filter: filter.to_string(),
                    layer,
                    expected: expected_heads,
                    found: heads.len(),
                });
            }
            for (head, rows) in heads.iter().enumerate() {
                if rows.len() != sources {
                    return Err(ParamsError::SourceMismatch {
                        filter: filter.to_string(),
                        layer,
                        head,
                        expected: sources,
                        found: rows.len(),
                    });
                }
                for (source_index, row) in rows.iter().enumerate() {
                    if row.len() != targets {
                        return Err(ParamsError::TargetMismatch {
                            filter: filter.to_string(),
                            layer,
                            head,
                            source_index,
                            expected: targets,
                            found: row.len(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Tokens and weights for one filter key (e.g. sentence A -> sentence B).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionData {
    pub left_text: Vec<String>,
    pub right_text: Vec<String>,
    pub attn: AttentionTensor,
}

impl AttentionData {
    /// Longest token column; drives row counts in both views.
    pub fn max_tokens(&self) -> usize {
        self.left_text.len().max(self.right_text.len())
    }

    pub fn validate(&self, filter: &str) -> std::result::Result<(), ParamsError> {
        self.attn
            .validate_shape(filter, self.left_text.len(), self.right_text.len())
    }
}

/// Everything a viewer instance needs, supplied once at initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerParams {
    pub attention: BTreeMap<String, AttentionData>,
    pub default_filter: String,
    #[serde(default)]
    pub display_mode: DisplayMode,
    /// Display labels for the included layers, used in detail headings.
    #[serde(deserialize_with = "labels_from_any")]
    pub include_layers: Vec<String>,
    #[serde(deserialize_with = "labels_from_any")]
    pub include_heads: Vec<String>,
    pub total_heads: usize,
    pub root_div_id: String,
}

impl ViewerParams {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Look up the data for a filter key.
    pub fn filter(&self, key: &str) -> std::result::Result<&AttentionData, ParamsError> {
        self.attention
            .get(key)
            .ok_or_else(|| ParamsError::UnknownFilter {
                key: key.to_string(),
            })
    }

    pub fn filter_keys(&self) -> impl Iterator<Item = &str> {
        self.attention.keys().map(String::as_str)
    }

    /// Check the parts every render depends on: the default filter exists,
    /// `total_heads` is non-zero, and every filter's tensor matches its tokens.
    pub fn validate(&self) -> std::result::Result<(), ParamsError> {
        if self.attention.is_empty() {
            return Err(ParamsError::NoFilters);
        }
        if self.total_heads == 0 {
            return Err(ParamsError::ZeroTotalHeads);
        }
        self.filter(&self.default_filter)?;
        for (key, data) in &self.attention {
            data.validate(key)?;
            let found = data.attn.num_heads();
            if found > self.total_heads {
                return Err(ParamsError::TooManyHeads {
                    filter: key.clone(),
                    found,
                    total_heads: self.total_heads,
                });
            }
        }
        Ok(())
    }

    /// Heading label for a layer index, falling back to the index itself.
    pub fn layer_label(&self, layer: usize) -> String {
        self.include_layers
            .get(layer)
            .cloned()
            .unwrap_or_else(|| layer.to_string())
    }

    pub fn head_label(&self, head: usize) -> String {
        self.include_heads
            .get(head)
            .cloned()
            .unwrap_or_else(|| head.to_string())
    }
}

/// Accept labels as JSON numbers or strings; producers usually send layer indices.
fn labels_from_any<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    values
        .into_iter()
        .map(|value| match value {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "expected a number or string label, got {other}"
            ))),
        })
        .collect()
}
