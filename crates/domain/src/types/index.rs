//! Index records and their deployment shapes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::impl_wire_enum_conversions;
use crate::types::sync::{DataObject, ObjectKind, SyncPayload};

/// Similarity metric used by an index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    #[default]
    Cosine,
    Euclidean,
    Dotproduct,
}

impl_wire_enum_conversions!(MetricType {
    Cosine => "cosine",
    Euclidean => "euclidean",
    Dotproduct => "dotproduct",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    #[default]
    Aws,
    Gcp,
    Azure,
}

impl_wire_enum_conversions!(CloudProvider {
    Aws => "aws",
    Gcp => "gcp",
    Azure => "azure",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionProtection {
    #[default]
    Disabled,
    Enabled,
}

impl_wire_enum_conversions!(DeletionProtection {
    Disabled => "disabled",
    Enabled => "enabled",
});

/// Lifecycle state reported by the index service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexState {
    Initializing,
    InitializationFailed,
    ScalingUp,
    ScalingDown,
    ScalingUpPodSize,
    ScalingDownPodSize,
    Terminating,
    Ready,
}

impl_wire_enum_conversions!(IndexState {
    Initializing => "Initializing",
    InitializationFailed => "InitializationFailed",
    ScalingUp => "ScalingUp",
    ScalingDown => "ScalingDown",
    ScalingUpPodSize => "ScalingUpPodSize",
    ScalingDownPodSize => "ScalingDownPodSize",
    Terminating => "Terminating",
    Ready => "Ready",
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerlessSpec {
    pub cloud: CloudProvider,
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodSpec {
    pub environment: String,
    pub pod_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pods: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shards: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_collection: Option<String>,
}

/// Deployment spec. Exactly one of the two is expected to be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serverless: Option<ServerlessSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod: Option<PodSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStatus {
    pub ready: bool,
    pub state: IndexState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub name: String,
    pub dimension: u32,
    #[serde(default)]
    pub metric: MetricType,
    #[serde(default)]
    pub spec: IndexSpec,
    #[serde(default)]
    pub deletion_protection: DeletionProtection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IndexStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
}

impl IndexRecord {
    pub fn new(name: impl Into<String>, dimension: u32, metric: MetricType) -> Self {
        Self { name: name.into(), dimension, metric, ..Self::default() }
    }

    #[must_use]
    pub fn serverless(mut self, cloud: CloudProvider, region: impl Into<String>) -> Self {
        self.spec = IndexSpec {
            serverless: Some(ServerlessSpec { cloud, region: region.into() }),
            pod: None,
        };
        self
    }

    pub fn is_ready(&self) -> bool {
        self.status.is_some_and(|status| status.ready)
    }
}

impl DataObject for IndexRecord {
    const KIND: ObjectKind = ObjectKind::Index;

    /// Indexes are addressed by name; the name doubles as the id.
    fn id(&self) -> &str {
        self.name.as_str()
    }

    fn into_payload(self) -> SyncPayload {
        SyncPayload::Index(self)
    }
}
