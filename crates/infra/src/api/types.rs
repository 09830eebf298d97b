//! Wire shapes for the vector-database REST API
//!
//! Only the fields the connector reads or writes are modelled; unknown
//! fields are ignored on the way in.

use std::collections::{BTreeMap, HashMap};

use pinesync_domain::{
    DeletionProtection, EmbedInput, EmbedParameters, EmbedRecord, IndexRecord, IndexSpec,
    IndexState, IndexStatus, MetricType, SparseValues, VectorPage, VectorRecord,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/* -------------------------------------------------------------------------- */
/* Vectors */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireVector {
    pub id: String,
    #[serde(default)]
    pub values: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparse_values: Option<SparseValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl From<&VectorRecord> for WireVector {
    fn from(record: &VectorRecord) -> Self {
        Self {
            id: record.id.clone(),
            values: record.values.clone(),
            sparse_values: record.sparse_values.clone(),
            metadata: record.metadata.clone(),
        }
    }
}

impl WireVector {
    pub fn into_record(self, namespace: Option<&str>) -> VectorRecord {
        VectorRecord {
            id: self.id,
            values: self.values,
            sparse_values: self.sparse_values,
            metadata: self.metadata,
            namespace: namespace.map(str::to_owned),
        }
    }
}

/// Body of `POST /vectors/upsert`. The connector always sends one item.
#[derive(Debug, Clone, Serialize)]
pub struct UpsertRequest {
    pub vectors: Vec<WireVector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl UpsertRequest {
    pub fn single(record: &VectorRecord) -> Self {
        Self { vectors: vec![WireVector::from(record)], namespace: record.namespace.clone() }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListVectorsResponse {
    #[serde(default)]
    pub vectors: Vec<VectorIdEntry>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VectorIdEntry {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub next: Option<String>,
}

impl From<ListVectorsResponse> for VectorPage {
    fn from(response: ListVectorsResponse) -> Self {
        Self {
            ids: response.vectors.into_iter().map(|v| v.id).collect(),
            next_token: response.pagination.and_then(|p| p.next).filter(|t| !t.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchVectorsResponse {
    #[serde(default)]
    pub vectors: HashMap<String, WireVector>,
    #[serde(default)]
    pub namespace: Option<String>,
}

impl FetchVectorsResponse {
    /// Records ordered like `requested`; ids the service did not return are
    /// left out.
    pub fn into_records(mut self, requested: &[String]) -> Vec<VectorRecord> {
        let namespace = self.namespace.take().filter(|ns| !ns.is_empty());
        requested
            .iter()
            .filter_map(|id| self.vectors.remove(id))
            .map(|wire| wire.into_record(namespace.as_deref()))
            .collect()
    }
}

/* -------------------------------------------------------------------------- */
/* Indexes */
/* -------------------------------------------------------------------------- */

/// Body of `POST /indexes`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateIndexRequest {
    pub name: String,
    pub dimension: u32,
    pub metric: MetricType,
    pub spec: IndexSpec,
    pub deletion_protection: DeletionProtection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
}

impl From<&IndexRecord> for CreateIndexRequest {
    fn from(index: &IndexRecord) -> Self {
        Self {
            name: index.name.clone(),
            dimension: index.dimension,
            metric: index.metric,
            spec: index.spec.clone(),
            deletion_protection: index.deletion_protection,
            tags: index.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexListResponse {
    #[serde(default)]
    pub indexes: Vec<IndexSummary>,
}

/// Index as described by the list endpoint. Enumerations arrive as free
/// strings and are parsed leniently.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexSummary {
    pub name: String,
    #[serde(default)]
    pub dimension: u32,
    #[serde(default)]
    pub metric: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub spec: IndexSpec,
    #[serde(default)]
    pub status: Option<WireIndexStatus>,
    #[serde(default)]
    pub deletion_protection: Option<String>,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireIndexStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: String,
}

/// Fails on a metric outside [`MetricType`]; a guessed metric would be cached
/// as fact.
impl TryFrom<IndexSummary> for IndexRecord {
    type Error = String;

    fn try_from(summary: IndexSummary) -> Result<Self, Self::Error> {
        let metric = summary.metric.parse::<MetricType>().map_err(|_| {
            format!("unknown metric `{}` for index `{}`", summary.metric, summary.name)
        })?;
        let deletion_protection = summary
            .deletion_protection
            .as_deref()
            .and_then(|raw| raw.parse::<DeletionProtection>().ok())
            .unwrap_or_default();
        let status = summary.status.and_then(|status| {
            status
                .state
                .parse::<IndexState>()
                .ok()
                .map(|state| IndexStatus { ready: status.ready, state })
        });

        Ok(Self {
            name: summary.name,
            dimension: summary.dimension,
            metric,
            spec: summary.spec,
            deletion_protection,
            host: summary.host.filter(|h| !h.is_empty()),
            status,
            tags: summary.tags,
        })
    }
}

/* -------------------------------------------------------------------------- */
/* Embeddings */
/* -------------------------------------------------------------------------- */

/// Body of `POST /embed`.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedRequest<'a> {
    pub model: &'a str,
    pub inputs: &'a [EmbedInput],
    pub parameters: &'a EmbedParameters,
}

impl<'a> From<&'a EmbedRecord> for EmbedRequest<'a> {
    fn from(record: &'a EmbedRecord) -> Self {
        Self { model: &record.model, inputs: &record.inputs, parameters: &record.parameters }
    }
}
