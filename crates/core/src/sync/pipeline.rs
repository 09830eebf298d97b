//! Bulk sync run: read, resolve and assemble each registered object kind,
//! then hand every completed collection to the cache writer.

use std::sync::Arc;

use async_trait::async_trait;
use pinesync_domain::{ConnectorError, DataObject, ObjectKind, Result};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::assembler::{Assembly, CacheSyncAssembler};
use super::identity::KeyResolverRegistry;
use super::ports::{CacheWriter, DataReader, RunArguments};

/// Outcome of one object kind within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindReport {
    pub kind: ObjectKind,
    pub assembled: usize,
    pub skipped: usize,
    pub error: Option<ConnectorError>,
}

impl KindReport {
    const fn failed(kind: ObjectKind, error: ConnectorError) -> Self {
        Self { kind, assembled: 0, skipped: 0, error: Some(error) }
    }

    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncRunReport {
    pub run_id: Uuid,
    pub kinds: Vec<KindReport>,
}

impl SyncRunReport {
    pub fn is_success(&self) -> bool {
        self.kinds.iter().all(KindReport::is_success)
    }

    pub fn total_assembled(&self) -> usize {
        self.kinds.iter().map(|k| k.assembled).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.kinds.iter().map(|k| k.skipped).sum()
    }

    pub fn kind(&self, kind: ObjectKind) -> Option<&KindReport> {
        self.kinds.iter().find(|k| k.kind == kind)
    }

    pub fn failed_kinds(&self) -> impl Iterator<Item = ObjectKind> + '_ {
        self.kinds.iter().filter(|k| !k.is_success()).map(|k| k.kind)
    }
}

#[async_trait]
trait SyncSource: Send + Sync {
    fn kind(&self) -> ObjectKind;

    async fn collect(&self, args: RunArguments, cancel: &CancellationToken) -> Result<Assembly>;
}

struct ReaderSource<T> {
    reader: Arc<dyn DataReader<T>>,
    assembler: CacheSyncAssembler<T>,
}

#[async_trait]
impl<T: DataObject> SyncSource for ReaderSource<T> {
    fn kind(&self) -> ObjectKind {
        T::KIND
    }

    async fn collect(&self, args: RunArguments, cancel: &CancellationToken) -> Result<Assembly> {
        let objects = self.reader.get_data(args, cancel.clone());
        self.assembler.assemble_stream(objects, cancel).await
    }
}

/// Runs every registered object kind independently.
///
/// Kinds run one after another in registration order. A kind that fails
/// (reader cancelled, writer error) is reported and the next kind still
/// runs.
pub struct SyncPipeline {
    sources: Vec<Box<dyn SyncSource>>,
    writer: Arc<dyn CacheWriter>,
}

impl SyncPipeline {
    pub fn new(writer: Arc<dyn CacheWriter>) -> Self {
        Self { sources: Vec::new(), writer }
    }

    /// Register a reader for `T`, resolving identities through `registry`.
    #[must_use]
    pub fn register<T: DataObject>(
        mut self,
        reader: Arc<dyn DataReader<T>>,
        registry: &KeyResolverRegistry<T>,
    ) -> Self {
        let assembler = CacheSyncAssembler::for_kind(registry);
        self.sources.push(Box::new(ReaderSource { reader, assembler }));
        self
    }

    pub fn kinds(&self) -> Vec<ObjectKind> {
        self.sources.iter().map(|source| source.kind()).collect()
    }

    pub async fn run(&self, args: RunArguments, cancel: &CancellationToken) -> SyncRunReport {
        let run_id = args.run_id;
        info!(%run_id, kinds = self.sources.len(), "sync_run_started");

        let mut kinds = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            kinds.push(self.run_kind(source.as_ref(), args.clone(), cancel).await);
        }

        let report = SyncRunReport { run_id, kinds };
        info!(
            %run_id,
            assembled = report.total_assembled(),
            skipped = report.total_skipped(),
            success = report.is_success(),
            "sync_run_finished"
        );
        report
    }

    async fn run_kind(
        &self,
        source: &dyn SyncSource,
        args: RunArguments,
        cancel: &CancellationToken,
    ) -> KindReport {
        let kind = source.kind();
        if cancel.is_cancelled() {
            warn!(%kind, "sync_kind_cancelled");
            return KindReport::failed(kind, ConnectorError::Cancelled);
        }

        let Assembly { collection, report } = match source.collect(args, cancel).await {
            Ok(assembly) => assembly,
            Err(err) => {
                warn!(%kind, error = %err, "sync_kind_failed");
                return KindReport::failed(kind, err);
            }
        };

        if let Err(err) = self.writer.apply(collection).await {
            error!(%kind, error = %err, "cache_write_failed");
            return KindReport::failed(kind, err);
        }

        info!(%kind, assembled = report.assembled, skipped = report.skipped, "sync_kind_completed");
        KindReport { kind, assembled: report.assembled, skipped: report.skipped, error: None }
    }
}
