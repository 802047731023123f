//! Activation and admin operations over a [`BindingStore`].

use crate::authority::AuthoritySource;
use crate::error::{ActivationError, ActivationResult};
use crate::store::{BindingStore, Bindings};
use std::collections::btree_map::Entry;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a successful activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// The key was unbound and is now bound to the identifier.
    Bound,
    /// The key was already bound to the same identifier; nothing changed.
    Reverified,
}

/// Orchestrates authority checks and binding persistence.
#[derive(Clone)]
pub struct ActivationService {
    store: Arc<BindingStore>,
    authority: Arc<dyn AuthoritySource>,
}

impl ActivationService {
    pub fn new(store: Arc<BindingStore>, authority: Arc<dyn AuthoritySource>) -> Self {
        Self { store, authority }
    }

    /// Binds `key` to `identifier` on first use; re-verifies it afterwards.
    ///
    /// The authority list is fetched before the store lock is taken, so a slow
    /// authority never blocks other store operations.
    ///
    /// # Errors
    ///
    /// - [`ActivationError::MissingField`] if either argument is empty
    /// - [`ActivationError::AuthorityUnavailable`] if the authority fetch fails
    /// - [`ActivationError::KeyNotAuthorized`] if the key is not listed
    /// - [`ActivationError::KeyAlreadyBound`] if the key has another identifier
    pub async fn activate(
        &self,
        key: &str,
        identifier: &str,
    ) -> ActivationResult<ActivationOutcome> {
        if key.is_empty() || identifier.is_empty() {
            return Err(ActivationError::MissingField);
        }

        let authority = self.authority.fetch().await?;
        if !authority.contains(key) {
            warn!("Rejected key not on {} authority list", self.authority.name());
            return Err(ActivationError::KeyNotAuthorized);
        }

        let key = key.to_string();
        let identifier = identifier.to_string();
        self.with_store(move |store| {
            store.transaction(|bindings| match bindings.entry(key.clone()) {
                Entry::Occupied(bound) if *bound.get() == identifier => {
                    Ok(ActivationOutcome::Reverified)
                }
                Entry::Occupied(_) => {
                    warn!("Rejected rebind of key {} to a different identifier", key);
                    Err(ActivationError::KeyAlreadyBound)
                }
                Entry::Vacant(slot) => {
                    slot.insert(identifier.clone());
                    info!("Bound key {} to {}", key, identifier);
                    Ok(ActivationOutcome::Bound)
                }
            })
        })
        .await
    }

    /// Returns every current binding.
    pub async fn list_bindings(&self) -> ActivationResult<Bindings> {
        self.with_store(|store| store.load()).await
    }

    /// Deletes the binding for `key`, returning the identifier it held.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::KeyNotFound`] if `key` is unbound.
    pub async fn remove_binding(&self, key: &str) -> ActivationResult<String> {
        let key = key.to_string();
        self.with_store(move |store| {
            store.transaction(|bindings| {
                let identifier = bindings.remove(&key).ok_or(ActivationError::KeyNotFound)?;
                info!("Removed binding for key {} (was {})", key, identifier);
                Ok(identifier)
            })
        })
        .await
    }

    /// Runs blocking store work off the async runtime.
    async fn with_store<T, F>(&self, f: F) -> ActivationResult<T>
    where
        F: FnOnce(&BindingStore) -> ActivationResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| ActivationError::Storage(format!("store task failed: {e}")))?
    }
}
