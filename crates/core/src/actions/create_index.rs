//! Create-index action

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use pinesync_domain::constants::{MAX_INDEX_DIMENSION, MAX_INDEX_NAME_LENGTH, MIN_INDEX_DIMENSION};
use pinesync_domain::{
    CacheSyncCollection, DataObject, DeletionProtection, IndexRecord, IndexSpec, IndexStatus,
    MetricType, Result, SyncOperation,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::outcome::{fail_or_propagate, ActionFailure, ActionOutcome};
use super::ports::{ActionHandler, VectorDbGateway};
use crate::sync::KeyResolverRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIndexInput {
    pub name: String,
    pub dimension: u32,
    #[serde(default)]
    pub metric: MetricType,
    #[serde(default)]
    pub spec: Option<IndexSpec>,
    #[serde(default)]
    pub deletion_protection: DeletionProtection,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
}

impl CreateIndexInput {
    pub fn new(name: impl Into<String>, dimension: u32, metric: MetricType) -> Self {
        Self {
            name: name.into(),
            dimension,
            metric,
            spec: None,
            deletion_protection: DeletionProtection::default(),
            tags: None,
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        validate_index_name(&self.name)?;
        if !(MIN_INDEX_DIMENSION..=MAX_INDEX_DIMENSION).contains(&self.dimension) {
            return Err(format!(
                "dimension must be within {MIN_INDEX_DIMENSION}..={MAX_INDEX_DIMENSION}, got {}",
                self.dimension
            ));
        }
        Ok(())
    }

    fn into_record(self) -> IndexRecord {
        IndexRecord {
            name: self.name,
            dimension: self.dimension,
            metric: self.metric,
            spec: self.spec.unwrap_or_default(),
            deletion_protection: self.deletion_protection,
            host: None,
            status: None,
            tags: self.tags,
        }
    }
}

/// 1..=45 chars of lowercase alphanumerics or `-`, alphanumeric at both ends.
fn validate_index_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() || name.len() > MAX_INDEX_NAME_LENGTH {
        return Err(format!("name must be 1..={MAX_INDEX_NAME_LENGTH} characters"));
    }
    if !name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err("name may only contain lowercase letters, digits and '-'".to_string());
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err("name must start and end with a letter or digit".to_string());
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIndexOutput {
    pub name: String,
    pub status: Option<IndexStatus>,
    pub host: String,
}

pub struct CreateIndexHandler {
    gateway: Arc<dyn VectorDbGateway>,
    resolvers: KeyResolverRegistry<IndexRecord>,
}

impl CreateIndexHandler {
    pub fn new(gateway: Arc<dyn VectorDbGateway>) -> Self {
        Self { gateway, resolvers: KeyResolverRegistry::new() }
    }

    #[must_use]
    pub fn with_resolvers(mut self, resolvers: KeyResolverRegistry<IndexRecord>) -> Self {
        self.resolvers = resolvers;
        self
    }

    /// Case-insensitive lookup among existing indexes. A failed listing is
    /// not fatal: the create call decides.
    async fn exists(&self, name: &str, cancel: &CancellationToken) -> Result<bool> {
        let listing = self.gateway.list_indexes(cancel).await?;
        if !listing.is_successful() {
            warn!(status = listing.status(), "index_listing_failed_before_create");
            return Ok(false);
        }
        Ok(listing
            .data()
            .is_some_and(|indexes| indexes.iter().any(|i| i.name.eq_ignore_ascii_case(name))))
    }
}

#[async_trait]
impl ActionHandler for CreateIndexHandler {
    type Input = CreateIndexInput;
    type Output = CreateIndexOutput;

    const NAME: &'static str = "CreateIndexHandler";

    #[instrument(skip(self, input, cancel), fields(index = %input.name))]
    async fn handle(
        &self,
        input: CreateIndexInput,
        cancel: &CancellationToken,
    ) -> Result<ActionOutcome<CreateIndexOutput>> {
        if let Err(reason) = input.validate() {
            return Ok(ActionOutcome::Failed(ActionFailure::invalid_input(Self::NAME, reason)));
        }

        info!("checking_existing_index");
        match self.exists(&input.name, cancel).await {
            Ok(true) => {
                return Ok(ActionOutcome::Failed(ActionFailure::new(
                    409,
                    Self::NAME,
                    format!("An index with the name '{}' already exists.", input.name),
                )));
            }
            Ok(false) => {}
            Err(err) => return fail_or_propagate(Self::NAME, err),
        }

        info!("creating_index");
        let record = input.into_record();
        let response = match self.gateway.create_index(&record, cancel).await {
            Ok(response) => response,
            Err(err) => return fail_or_propagate(Self::NAME, err),
        };

        if !response.is_successful() {
            return Ok(ActionOutcome::Failed(ActionFailure::from_response(
                Self::NAME,
                &response,
                "Failed to create index",
            )));
        }

        let created = response.into_data().unwrap_or(record);
        let output = CreateIndexOutput {
            name: created.name.clone(),
            status: created.status,
            host: created.host.clone().unwrap_or_default(),
        };

        let identity = match self.resolvers.resolve(&IndexRecord::KIND.data_path(), &created) {
            Ok(identity) => identity,
            Err(err) => return fail_or_propagate(Self::NAME, err.into()),
        };
        let mut sync = CacheSyncCollection::new(IndexRecord::KIND);
        sync.push(SyncOperation::upsert(identity, created.into_payload()));

        info!(host = %output.host, "index_created");
        Ok(ActionOutcome::Succeeded { output, sync })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_names() {
        let longest = "x".repeat(45);
        for name in ["docs", "a", "my-index-2", longest.as_str()] {
            assert!(validate_index_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_invalid_names() {
        let too_long = "x".repeat(46);
        for name in ["", "Docs", "-docs", "docs-", "my_index", "dots.here", too_long.as_str()] {
            assert!(validate_index_name(name).is_err(), "{name}");
        }
    }

    #[test]
    fn rejects_dimension_out_of_range() {
        assert!(CreateIndexInput::new("docs", 1, MetricType::Cosine).validate().is_err());
        assert!(CreateIndexInput::new("docs", 20_000, MetricType::Cosine).validate().is_err());
        assert!(CreateIndexInput::new("docs", 2, MetricType::Cosine).validate().is_ok());
        assert!(CreateIndexInput::new("docs", 19_999, MetricType::Cosine).validate().is_ok());
    }

    #[test]
    fn input_defaults_metric_and_spec() {
        let input: CreateIndexInput =
            serde_json::from_str(r#"{"name":"docs","dimension":1536}"#).unwrap();
        assert_eq!(input.metric, MetricType::Cosine);
        assert_eq!(input.into_record().spec, IndexSpec::default());
    }
}
