//! Vector records

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::sync::{DataObject, ObjectKind, SyncPayload};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseValues {
    pub indices: Vec<u32>,
    pub values: Vec<f32>,
}

/// A single dense (optionally hybrid) vector stored in an index namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    #[serde(default)]
    pub values: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparse_values: Option<SparseValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl VectorRecord {
    pub fn new(id: impl Into<String>, values: Vec<f32>) -> Self {
        Self { id: id.into(), values, ..Self::default() }
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl DataObject for VectorRecord {
    const KIND: ObjectKind = ObjectKind::Vector;

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn into_payload(self) -> SyncPayload {
        SyncPayload::Vector(self)
    }
}

/// One page of vector ids from a namespace listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorPage {
    pub ids: Vec<String>,
    /// Token for the following page; `None` once the listing is exhausted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}
