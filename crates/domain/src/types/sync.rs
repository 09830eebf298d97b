//! Identity and cache-sync shapes handed to the cache writer

use serde::{Deserialize, Serialize};

use crate::constants::DATA_PATH_PREFIX;
use crate::errors::ResolutionError;
use crate::impl_wire_enum_conversions;
use crate::types::{EmbedRecord, IndexRecord, VectorRecord};

/// Object kinds mirrored into the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Vector,
    Index,
    Embed,
}

impl_wire_enum_conversions!(ObjectKind {
    Vector => "vector",
    Index => "index",
    Embed => "embed",
});

impl ObjectKind {
    pub const ALL: [Self; 3] = [Self::Index, Self::Vector, Self::Embed];

    /// Logical path keying resolvers and cache rows, e.g. `pinecone/app/1/index`.
    pub fn data_path(&self) -> String {
        format!("{DATA_PATH_PREFIX}/{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOperation {
    Upsert,
    Delete,
}

impl_wire_enum_conversions!(UpdateOperation {
    Upsert => "Upsert",
    Delete => "Delete",
});

/// Stable cache identity of one object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "IdentityParts")]
pub struct ResolvedIdentity {
    key: String,
    field_names: Vec<String>,
}

impl ResolvedIdentity {
    /// Fails on an empty key so no object is ever cached under `""`.
    pub fn new(
        key: impl Into<String>,
        field_names: Vec<String>,
    ) -> Result<Self, ResolutionError> {
        let key = key.into();
        if key.trim().is_empty() {
            let field = field_names.first().cloned().unwrap_or_default();
            return Err(ResolutionError::EmptyKey { field });
        }
        Ok(Self { key, field_names })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }
}

/// Unchecked wire form; deserialization goes through [`ResolvedIdentity::new`].
#[derive(Deserialize)]
struct IdentityParts {
    key: String,
    #[serde(default)]
    field_names: Vec<String>,
}

impl TryFrom<IdentityParts> for ResolvedIdentity {
    type Error = ResolutionError;

    fn try_from(parts: IdentityParts) -> Result<Self, Self::Error> {
        Self::new(parts.key, parts.field_names)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "object", rename_all = "lowercase")]
pub enum SyncPayload {
    Vector(VectorRecord),
    Index(IndexRecord),
    Embed(EmbedRecord),
}

impl SyncPayload {
    pub const fn kind(&self) -> ObjectKind {
        match self {
            Self::Vector(_) => ObjectKind::Vector,
            Self::Index(_) => ObjectKind::Index,
            Self::Embed(_) => ObjectKind::Embed,
        }
    }
}

/// One reconciliation instruction for the cache writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncOperation {
    pub operation: UpdateOperation,
    pub key: String,
    pub field_names: Vec<String>,
    /// Always present for `Upsert`; a `Delete` may only know the key.
    pub payload: Option<SyncPayload>,
}

impl SyncOperation {
    pub fn upsert(identity: ResolvedIdentity, payload: SyncPayload) -> Self {
        let ResolvedIdentity { key, field_names } = identity;
        Self { operation: UpdateOperation::Upsert, key, field_names, payload: Some(payload) }
    }

    pub fn delete(identity: ResolvedIdentity) -> Self {
        let ResolvedIdentity { key, field_names } = identity;
        Self { operation: UpdateOperation::Delete, key, field_names, payload: None }
    }
}

/// Ordered sync operations for one object kind from one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSyncCollection {
    pub kind: ObjectKind,
    pub changes: Vec<SyncOperation>,
}

impl CacheSyncCollection {
    pub const fn new(kind: ObjectKind) -> Self {
        Self { kind, changes: Vec::new() }
    }

    pub fn push(&mut self, operation: SyncOperation) {
        self.changes.push(operation);
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.changes.iter().map(|op| op.key.as_str())
    }
}

/// A record that can be mirrored into the cache.
pub trait DataObject: Clone + Send + Sync + 'static {
    const KIND: ObjectKind;

    /// Value of the well-known `Id` field. May be empty; resolution rejects
    /// that.
    fn id(&self) -> &str;

    fn into_payload(self) -> SyncPayload;
}
