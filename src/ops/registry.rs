use std::path::PathBuf;
use std::sync::Arc;

use crate::error::OperationError;

use super::Operation;
use super::builtins;

#[derive(Clone, Default)]
pub struct OperationRegistry {
    operations: Vec<Arc<dyn Operation>>,
}

impl OperationRegistry {
    /// Registry holding the built-in operations. `hash_output` is the directory
    /// the hashing operation writes digests to; digests are discarded when it is
    /// `None`.
    #[must_use]
    pub fn with_builtins(hash_output: Option<PathBuf>) -> Self {
        let mut registry = Self::default();
        for builtin in builtins::builtins(hash_output) {
            if let Err(err) = registry.register_shared(builtin) {
                tracing::warn!("Skipping duplicate builtin operation: {}", err);
            }
        }
        registry
    }

    /// Registers an operation under its own name.
    ///
    /// # Errors
    ///
    /// Returns an error when an operation with the same name is already
    /// registered.
    pub fn register<O>(&mut self, operation: O) -> Result<(), OperationError>
    where
        O: Operation + 'static,
    {
        self.register_shared(Arc::new(operation))
    }

    fn register_shared(&mut self, operation: Arc<dyn Operation>) -> Result<(), OperationError> {
        let name = operation.name();
        if self.contains(name) {
            return Err(OperationError::AlreadyRegistered { name });
        }
        self.operations.push(operation);
        Ok(())
    }

    /// Resolves an operation by name.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::Unknown` when no operation has that name.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Operation>, OperationError> {
        self.operations
            .iter()
            .find(|operation| operation.name() == name)
            .map(Arc::clone)
            .ok_or_else(|| OperationError::Unknown {
                name: name.to_owned(),
            })
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.operations
            .iter()
            .any(|operation| operation.name() == name)
    }

    /// Registered `(name, description)` pairs sorted by name.
    #[must_use]
    pub fn describe(&self) -> Vec<(&'static str, &'static str)> {
        let mut entries: Vec<(&'static str, &'static str)> = self
            .operations
            .iter()
            .map(|operation| (operation.name(), operation.description()))
            .collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries
    }
}
