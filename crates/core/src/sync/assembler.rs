//! Turns resolved objects into cache sync operations for one object kind

use futures::stream::{BoxStream, StreamExt};
use pinesync_domain::{CacheSyncCollection, ConnectorError, DataObject, Result, SyncOperation};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::identity::{KeyResolverRegistry, ResolverChain};

/// Counters for one assembly pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub assembled: usize,
    pub skipped: usize,
}

impl AssemblyReport {
    pub const fn seen(&self) -> usize {
        self.assembled + self.skipped
    }
}

/// Collection plus the counters that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub collection: CacheSyncCollection,
    pub report: AssemblyReport,
}

/// Emits one `Upsert` per resolvable object, in input order.
///
/// No reordering and no deduplication: repeated keys are passed through as
/// separate operations.
pub struct CacheSyncAssembler<T> {
    path: String,
    chain: ResolverChain<T>,
}

impl<T: DataObject> CacheSyncAssembler<T> {
    pub fn new(path: impl Into<String>, registry: &KeyResolverRegistry<T>) -> Self {
        let path = path.into();
        let chain = registry.chain_for(&path);
        Self { path, chain }
    }

    /// Assembler for the kind's own data path.
    pub fn for_kind(registry: &KeyResolverRegistry<T>) -> Self {
        Self::new(T::KIND.data_path(), registry)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Resolve one object and append its operation. Unresolvable objects are
    /// counted and logged, never returned as an error.
    pub fn push(&self, object: T, collection: &mut CacheSyncCollection, report: &mut AssemblyReport) {
        let position = report.seen();
        match self.chain.resolve(&object) {
            Ok(identity) => {
                collection.push(SyncOperation::upsert(identity, object.into_payload()));
                report.assembled += 1;
            }
            Err(err) => {
                report.skipped += 1;
                warn!(path = %self.path, position, error = %err, "sync_object_skipped");
            }
        }
    }

    pub fn assemble<I>(&self, objects: I) -> Assembly
    where
        I: IntoIterator<Item = T>,
    {
        let mut collection = CacheSyncCollection::new(T::KIND);
        let mut report = AssemblyReport::default();
        for object in objects {
            self.push(object, &mut collection, &mut report);
        }
        self.finish(collection, report)
    }

    /// Drain a reader stream. Cancellation discards the partial collection.
    pub async fn assemble_stream(
        &self,
        mut objects: BoxStream<'_, T>,
        cancel: &CancellationToken,
    ) -> Result<Assembly> {
        let mut collection = CacheSyncCollection::new(T::KIND);
        let mut report = AssemblyReport::default();

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(ConnectorError::Cancelled),
                next = objects.next() => next,
            };
            let Some(object) = next else { break };
            self.push(object, &mut collection, &mut report);
        }

        // A reader may end its stream early because it saw the cancellation.
        if cancel.is_cancelled() {
            return Err(ConnectorError::Cancelled);
        }

        Ok(self.finish(collection, report))
    }

    fn finish(&self, collection: CacheSyncCollection, report: AssemblyReport) -> Assembly {
        debug!(
            path = %self.path,
            assembled = report.assembled,
            skipped = report.skipped,
            "sync_collection_assembled"
        );
        Assembly { collection, report }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::stream;
    use pinesync_domain::{ObjectKind, UpdateOperation, VectorRecord};

    use super::*;
    use crate::sync::identity::FnResolver;

    fn vectors(ids: &[&str]) -> Vec<VectorRecord> {
        ids.iter().map(|id| VectorRecord::new(*id, vec![0.1, 0.2])).collect()
    }

    #[test]
    fn emits_one_upsert_per_object_in_order() {
        let assembler = CacheSyncAssembler::for_kind(&KeyResolverRegistry::new());
        let assembly = assembler.assemble(vectors(&["b", "a", "c"]));

        assert_eq!(assembly.collection.kind, ObjectKind::Vector);
        assert_eq!(assembly.collection.keys().collect::<Vec<_>>(), ["b", "a", "c"]);
        assert!(assembly.collection.changes.iter().all(|op| op.operation == UpdateOperation::Upsert));
        assert_eq!(assembly.report, AssemblyReport { assembled: 3, skipped: 0 });
    }

    #[test]
    fn duplicates_pass_through() {
        let assembler = CacheSyncAssembler::for_kind(&KeyResolverRegistry::new());
        let assembly = assembler.assemble(vectors(&["a", "a"]));
        assert_eq!(assembly.collection.len(), 2);
    }

    #[test]
    fn unresolvable_objects_are_counted_not_fatal() {
        let assembler = CacheSyncAssembler::for_kind(&KeyResolverRegistry::new());
        let assembly = assembler.assemble(vectors(&["a", "", "c"]));
        assert_eq!(assembly.collection.keys().collect::<Vec<_>>(), ["a", "c"]);
        assert_eq!(assembly.report, AssemblyReport { assembled: 2, skipped: 1 });
    }

    #[test]
    fn assembling_twice_is_identical() {
        let assembler = CacheSyncAssembler::for_kind(&KeyResolverRegistry::new());
        let input = vectors(&["x", "y", "x"]);
        let first = assembler.assemble(input.clone());
        let second = assembler.assemble(input);
        assert_eq!(first, second);
    }

    #[test]
    fn uses_override_registered_for_path() {
        let registry = KeyResolverRegistry::new().with_override(
            ObjectKind::Vector.data_path(),
            Arc::new(FnResolver::new(["Id"], |v: &VectorRecord| Some(format!("v:{}", v.id)))),
        );
        let assembler = CacheSyncAssembler::for_kind(&registry);
        let assembly = assembler.assemble(vectors(&["1"]));
        assert_eq!(assembly.collection.changes[0].key, "v:1");
    }

    #[tokio::test]
    async fn stream_assembly_matches_iterator_assembly() {
        let assembler = CacheSyncAssembler::for_kind(&KeyResolverRegistry::new());
        let cancel = CancellationToken::new();
        let streamed = assembler
            .assemble_stream(stream::iter(vectors(&["a", "b"])).boxed(), &cancel)
            .await
            .unwrap();
        assert_eq!(streamed, assembler.assemble(vectors(&["a", "b"])));
    }

    #[tokio::test]
    async fn cancelled_stream_yields_no_collection() {
        let assembler = CacheSyncAssembler::for_kind(&KeyResolverRegistry::new());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = assembler
            .assemble_stream(stream::iter(vectors(&["a"])).boxed(), &cancel)
            .await;
        assert_eq!(result, Err(ConnectorError::Cancelled));
    }
}
