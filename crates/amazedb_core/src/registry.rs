//! The group-name registry consumed by [`Group`](crate::Group).

use crate::error::{CoreError, CoreResult};
use parking_lot::RwLock;
use std::collections::BTreeSet;

/// A mutable registry of the group names in one database.
///
/// Groups register themselves on creation and unregister on drop.
/// Implementations persist the change before returning.
pub trait GroupRegistry: Send + Sync {
    /// Adds a group name. Registering a known name is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be persisted.
    fn register_group(&self, name: &str) -> CoreResult<()>;

    /// Removes a group name.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` if the name is not registered, or an error if
    /// the registry cannot be persisted.
    fn unregister_group(&self, name: &str) -> CoreResult<()>;

    /// Returns whether a group name is registered.
    fn contains_group(&self, name: &str) -> bool;

    /// Returns the registered names in registration order.
    fn group_names(&self) -> Vec<String>;
}

/// A registry that lives only in memory.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    names: RwLock<Vec<String>>,
}

impl MemoryRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding `names`, deduplicated.
    #[must_use]
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|n: &String| seen.insert(n.clone()))
            .collect();
        Self {
            names: RwLock::new(names),
        }
    }
}

impl GroupRegistry for MemoryRegistry {
    fn register_group(&self, name: &str) -> CoreResult<()> {
        let mut names = self.names.write();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        Ok(())
    }

    fn unregister_group(&self, name: &str) -> CoreResult<()> {
        let mut names = self.names.write();
        let index = names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| CoreError::group_not_found(name))?;
        names.remove(index);
        Ok(())
    }

    fn contains_group(&self, name: &str) -> bool {
        self.names.read().iter().any(|n| n == name)
    }

    fn group_names(&self) -> Vec<String> {
        self.names.read().clone()
    }
}
