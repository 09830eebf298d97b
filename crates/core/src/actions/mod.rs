//! Action handlers: validated mutations forwarded to the remote service,
//! each answered with an outcome and the cache update it implies.

pub mod create_embed;
pub mod create_index;
pub mod delete_index;
pub mod outcome;
pub mod ports;
pub mod upsert_vector;

pub use connection_test::{ConnectionTestHandler, TestConnectionResult};
pub use create_embed::{decode_embeddings, CreateEmbedHandler, CreateEmbedInput, CreateEmbedOutput};
pub use create_index::{CreateIndexHandler, CreateIndexInput, CreateIndexOutput};
pub use delete_index::{DeleteIndexHandler, DeleteIndexInput, DeleteIndexOutput};
pub use outcome::{ActionErrorDetail, ActionFailure, ActionOutcome};
pub use ports::{ActionHandler, VectorDbGateway};
pub use upsert_vector::{UpsertVectorHandler, UpsertVectorOutput};
