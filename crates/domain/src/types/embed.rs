//! Embedding batches

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::DEFAULT_EMBED_TRUNCATE;
use crate::impl_wire_enum_conversions;
use crate::types::sync::{DataObject, ObjectKind, SyncPayload};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedInputType {
    #[default]
    Passage,
    Query,
}

impl_wire_enum_conversions!(EmbedInputType {
    Passage => "passage",
    Query => "query",
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedInput {
    pub text: String,
}

impl EmbedInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedParameters {
    #[serde(default)]
    pub input_type: EmbedInputType,
    /// How the service handles inputs longer than the model supports.
    #[serde(default = "default_truncate")]
    pub truncate: String,
}

impl Default for EmbedParameters {
    fn default() -> Self {
        Self { input_type: EmbedInputType::default(), truncate: default_truncate() }
    }
}

fn default_truncate() -> String {
    DEFAULT_EMBED_TRUNCATE.to_string()
}

/// Stable id for a batch: SHA-256 over the model and texts, NUL-separated.
/// Re-embedding the same batch maps to the same cache row.
pub fn embed_batch_id<'a>(model: &str, texts: impl IntoIterator<Item = &'a str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model.as_bytes());
    for text in texts {
        hasher.update([0u8]);
        hasher.update(text.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// A batch of texts and, once generated, their embeddings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedRecord {
    pub id: String,
    #[serde(default)]
    pub inputs: Vec<EmbedInput>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub parameters: EmbedParameters,
    /// One vector per input, in input order. Empty until generated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeddings: Vec<Vec<f32>>,
}

impl EmbedRecord {
    pub fn new(id: impl Into<String>, model: impl Into<String>, inputs: Vec<EmbedInput>) -> Self {
        Self {
            id: id.into(),
            inputs,
            model: model.into(),
            parameters: EmbedParameters::default(),
            embeddings: Vec::new(),
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|input| input.text.as_str())
    }
}

impl DataObject for EmbedRecord {
    const KIND: ObjectKind = ObjectKind::Embed;

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn into_payload(self) -> SyncPayload {
        SyncPayload::Embed(self)
    }
}
