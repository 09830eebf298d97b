//! Domain types and models

pub mod embed;
pub mod envelope;
pub mod index;
pub mod sync;
pub mod vector;

pub use embed::{embed_batch_id, EmbedInput, EmbedInputType, EmbedParameters, EmbedRecord};
pub use envelope::{is_success_status, ApiResponse};
pub use index::{
    CloudProvider, DeletionProtection, IndexRecord, IndexSpec, IndexState, IndexStatus,
    MetricType, PodSpec, ServerlessSpec,
};
pub use sync::{
    CacheSyncCollection, DataObject, ObjectKind, ResolvedIdentity, SyncOperation, SyncPayload,
    UpdateOperation,
};
pub use vector::{SparseValues, VectorPage, VectorRecord};
