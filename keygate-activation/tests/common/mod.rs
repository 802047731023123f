//! Shared test helpers for activation tests.

#![allow(dead_code)]

use async_trait::async_trait;
use keygate_activation::{
    ActivationError, ActivationResult, ActivationService, AuthorityList, AuthoritySource,
    BindingStore, StaticAuthority,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// An authority that always fails, as if the remote were down.
pub struct UnavailableAuthority;

#[async_trait]
impl AuthoritySource for UnavailableAuthority {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn fetch(&self) -> ActivationResult<AuthorityList> {
        Err(ActivationError::AuthorityUnavailable("connection refused".into()))
    }
}

/// A fixed key list that counts how often it is fetched.
pub struct CountingAuthority {
    inner: StaticAuthority,
    fetches: AtomicUsize,
}

impl CountingAuthority {
    pub fn new(keys: &[&str]) -> Self {
        Self {
            inner: StaticAuthority::new(keys.iter().copied()),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthoritySource for CountingAuthority {
    fn name(&self) -> &str {
        "counting"
    }

    async fn fetch(&self) -> ActivationResult<AuthorityList> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch().await
    }
}

/// A service over a fresh temp-dir store. Keep the `TempDir` alive for the test.
pub struct Fixture {
    pub dir: TempDir,
    pub store: Arc<BindingStore>,
    pub service: ActivationService,
}

impl Fixture {
    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("keys.json")
    }

    pub fn file_text(&self) -> Option<String> {
        std::fs::read_to_string(self.store_path()).ok()
    }
}

/// Creates a fixture whose authority lists exactly `keys`.
pub fn fixture_with_keys(keys: &[&str]) -> Fixture {
    fixture_with_authority(Arc::new(StaticAuthority::new(keys.iter().copied())))
}

/// Creates a fixture with the given authority source.
pub fn fixture_with_authority(authority: Arc<dyn AuthoritySource>) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(BindingStore::new(dir.path().join("keys.json")));
    Fixture {
        service: ActivationService::new(Arc::clone(&store), authority),
        store,
        dir,
    }
}
