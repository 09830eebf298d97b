//! Cache synchronization: read remote state, resolve identities, assemble
//! sync operations per object kind.

pub mod assembler;
pub mod identity;
pub mod pipeline;
pub mod ports;

pub use assembler::{Assembly, AssemblyReport, CacheSyncAssembler};
pub use identity::{FnResolver, IdFieldResolver, KeyResolver, KeyResolverRegistry, ResolverChain};
pub use pipeline::{KindReport, SyncPipeline, SyncRunReport};
pub use ports::{CacheWriter, DataReader, RunArguments};
