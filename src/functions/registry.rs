//! Function lookup by name.
//!
//! # Responsibilities
//! - Map function names to factories, built once at startup
//! - Report "not registered" distinctly from "failed to load"
//! - List loadable names for diagnostic payloads
//!
//! # Design Decisions
//! - Names match exactly (case-sensitive, no fuzzy matching)
//! - Loads are not cached: each load runs the factory again, so
//!   concurrent loads of the same name need no coordination
//! - Listing is sorted, so it is stable within and across calls

use std::collections::{BTreeMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

use crate::functions::handler::{panic_message, EdgeFunction, FunctionError};
use crate::functions::hello_world::HelloWorld;

/// Builds a fresh instance of a function.
pub type FunctionFactory =
    Arc<dyn Fn() -> Result<Arc<dyn EdgeFunction>, FunctionError> + Send + Sync>;

/// Error type for registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("function '{0}' not found")]
    NotFound(String),

    #[error("function '{name}' failed to load: {source}")]
    Load {
        name: String,
        #[source]
        source: FunctionError,
    },
}

/// Registry of functions the gateway can dispatch to.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    factories: BTreeMap<String, FunctionFactory>,
    disabled: HashSet<String>,
}

impl FunctionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the functions compiled into this binary.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_instance("hello-world", Arc::new(HelloWorld));
        registry
    }

    /// Treat the given names as absent even if registered.
    pub fn with_disabled<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled.extend(names.into_iter().map(Into::into));
        self
    }

    /// Register a factory under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Arc<dyn EdgeFunction>, FunctionError> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Register a shared instance; every load hands out the same one.
    pub fn register_instance(&mut self, name: impl Into<String>, function: Arc<dyn EdgeFunction>) {
        self.register(name, move || Ok(function.clone()));
    }

    /// Whether `name` is registered and enabled.
    pub fn exists(&self, name: &str) -> bool {
        self.factories.contains_key(name) && !self.disabled.contains(name)
    }

    /// Instantiate the function registered under `name`.
    pub fn load(&self, name: &str) -> Result<Arc<dyn EdgeFunction>, RegistryError> {
        let factory = self
            .factories
            .get(name)
            .filter(|_| !self.disabled.contains(name))
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

        let loaded = catch_unwind(AssertUnwindSafe(|| factory()))
            .unwrap_or_else(|panic| Err(FunctionError::Load(panic_message(panic.as_ref()))));

        loaded.map_err(|source| {
            let source = match source {
                FunctionError::Load(_) => source,
                other => FunctionError::Load(other.to_string()),
            };
            RegistryError::Load {
                name: name.to_string(),
                source,
            }
        })
    }

    /// Names that would pass [`exists`](Self::exists), in sorted order.
    pub fn list_available(&self) -> Vec<String> {
        self.factories
            .keys()
            .filter(|name| self.exists(name))
            .cloned()
            .collect()
    }

    /// Number of enabled functions.
    pub fn len(&self) -> usize {
        self.list_available().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.list_available())
            .field("disabled", &self.disabled)
            .finish()
    }
}
