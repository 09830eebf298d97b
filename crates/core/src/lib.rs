//! # Pinesync Core
//!
//! Business logic layer - no I/O.
//!
//! This crate contains:
//! - Port interfaces for the remote gateway, data readers and the cache writer
//! - Identity resolution (resolver chain and per-path registry)
//! - Cache sync assembly and the bulk sync pipeline
//! - Action handlers for create/upsert/embed/delete and the connection test
//!
//! ## Architecture Principles
//! - Only depends on `pinesync-domain`
//! - All external effects via traits

pub mod actions;
pub mod sync;

pub use actions::{
    ActionFailure, ActionHandler, ActionOutcome, ConnectionTestHandler, CreateEmbedHandler,
    CreateIndexHandler, DeleteIndexHandler, TestConnectionResult, UpsertVectorHandler,
    VectorDbGateway,
};
pub use sync::{
    CacheSyncAssembler, CacheWriter, DataReader, KeyResolver, KeyResolverRegistry, RunArguments,
    SyncPipeline, SyncRunReport,
};
