//! Identity resolution for cache rows
//!
//! Every object kind resolves through an ordered chain of strategies,
//! first success wins. The registry builds the chain for a data path: the
//! override registered for that path (if any), then the `Id` field.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use pinesync_domain::constants::IDENTITY_FIELD;
use pinesync_domain::{DataObject, ResolutionError, ResolvedIdentity};

/// Derives the cache identity of one object.
pub trait KeyResolver<T>: Send + Sync {
    fn resolve(&self, object: &T) -> Result<ResolvedIdentity, ResolutionError>;
}

/// Reads the well-known `Id` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdFieldResolver;

impl<T: DataObject> KeyResolver<T> for IdFieldResolver {
    fn resolve(&self, object: &T) -> Result<ResolvedIdentity, ResolutionError> {
        ResolvedIdentity::new(object.id(), vec![IDENTITY_FIELD.to_string()])
    }
}

/// Resolver backed by a closure returning the key, if any.
pub struct FnResolver<F> {
    field_names: Vec<String>,
    key_fn: F,
}

impl<F> FnResolver<F> {
    pub fn new<I, S>(field_names: I, key_fn: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { field_names: field_names.into_iter().map(Into::into).collect(), key_fn }
    }
}

impl<F> fmt::Debug for FnResolver<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnResolver").field("field_names", &self.field_names).finish_non_exhaustive()
    }
}

impl<T, F> KeyResolver<T> for FnResolver<F>
where
    F: Fn(&T) -> Option<String> + Send + Sync,
{
    fn resolve(&self, object: &T) -> Result<ResolvedIdentity, ResolutionError> {
        let key = (self.key_fn)(object).ok_or_else(|| {
            ResolutionError::Rejected(format!("no key for fields {:?}", self.field_names))
        })?;
        ResolvedIdentity::new(key, self.field_names.clone())
    }
}

/// Ordered list of strategies, evaluated first-match-wins.
pub struct ResolverChain<T> {
    resolvers: Vec<Arc<dyn KeyResolver<T>>>,
}

impl<T> ResolverChain<T> {
    pub fn new() -> Self {
        Self { resolvers: Vec::new() }
    }

    #[must_use]
    pub fn then(mut self, resolver: Arc<dyn KeyResolver<T>>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// First successful identity, else the last strategy's error.
    pub fn resolve(&self, object: &T) -> Result<ResolvedIdentity, ResolutionError> {
        let mut last_err = ResolutionError::NoResolver;
        for resolver in &self.resolvers {
            match resolver.resolve(object) {
                Ok(identity) => return Ok(identity),
                Err(err) => last_err = err,
            }
        }
        Err(last_err)
    }
}

impl<T> Clone for ResolverChain<T> {
    fn clone(&self) -> Self {
        Self { resolvers: self.resolvers.clone() }
    }
}

impl<T> Default for ResolverChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ResolverChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverChain").field("len", &self.resolvers.len()).finish()
    }
}

/// Per-path resolver overrides with the `Id` field as fallback.
pub struct KeyResolverRegistry<T> {
    overrides: HashMap<String, Arc<dyn KeyResolver<T>>>,
    fallback: Arc<dyn KeyResolver<T>>,
}

impl<T: DataObject> KeyResolverRegistry<T> {
    pub fn new() -> Self {
        Self { overrides: HashMap::new(), fallback: Arc::new(IdFieldResolver) }
    }

    /// Register an override for `path`, replacing any earlier one.
    #[must_use]
    pub fn with_override(mut self, path: impl Into<String>, resolver: Arc<dyn KeyResolver<T>>) -> Self {
        self.register(path, resolver);
        self
    }

    pub fn register(&mut self, path: impl Into<String>, resolver: Arc<dyn KeyResolver<T>>) {
        self.overrides.insert(path.into(), resolver);
    }

    pub fn has_override(&self, path: &str) -> bool {
        self.overrides.contains_key(path)
    }

    /// Chain for `path`: override first (if registered), then the fallback.
    pub fn chain_for(&self, path: &str) -> ResolverChain<T> {
        let chain = self
            .overrides
            .get(path)
            .map_or_else(ResolverChain::new, |resolver| ResolverChain::new().then(Arc::clone(resolver)));
        chain.then(Arc::clone(&self.fallback))
    }

    pub fn resolve(&self, path: &str, object: &T) -> Result<ResolvedIdentity, ResolutionError> {
        self.chain_for(path).resolve(object)
    }
}

impl<T: DataObject> Default for KeyResolverRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for KeyResolverRegistry<T> {
    fn clone(&self) -> Self {
        Self { overrides: self.overrides.clone(), fallback: Arc::clone(&self.fallback) }
    }
}
