//! File-backed binding store.
//!
//! The whole mapping lives in one JSON object on disk. It is read fresh for
//! every operation and rewritten in full after every mutation; nothing is
//! cached in memory between calls.

use crate::error::{ActivationError, ActivationResult};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Key → identifier mapping as persisted on disk.
pub type Bindings = BTreeMap<String, String>;

/// Durable store of key bindings.
///
/// The store path sits behind a mutex. Every read-modify-write goes through
/// [`BindingStore::transaction`] while holding it, so concurrent activations
/// of the same key cannot both observe it as unbound.
#[derive(Debug)]
pub struct BindingStore {
    path: Mutex<PathBuf>,
}

impl BindingStore {
    /// Creates a store backed by the file at `path`. The file need not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Mutex::new(path.into()),
        }
    }

    /// Reads all bindings. A missing file yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// including when it is empty.
    pub fn load(&self) -> ActivationResult<Bindings> {
        let path = self.lock()?;
        read_bindings(&path)
    }

    /// Replaces the file contents with `bindings`.
    pub fn save(&self, bindings: &Bindings) -> ActivationResult<()> {
        let path = self.lock()?;
        write_bindings(&path, bindings)
    }

    /// Runs `f` against freshly loaded bindings under the store lock.
    ///
    /// The file is rewritten only if `f` returns `Ok` and changed the map.
    pub fn transaction<T, F>(&self, f: F) -> ActivationResult<T>
    where
        F: FnOnce(&mut Bindings) -> ActivationResult<T>,
    {
        let path = self.lock()?;
        let mut bindings = read_bindings(&path)?;
        let before = bindings.clone();

        let value = f(&mut bindings)?;

        if bindings != before {
            write_bindings(&path, &bindings)?;
        }
        Ok(value)
    }

    fn lock(&self) -> ActivationResult<MutexGuard<'_, PathBuf>> {
        self.path
            .lock()
            .map_err(|_| ActivationError::Storage("binding store lock poisoned".to_string()))
    }
}

fn read_bindings(path: &Path) -> ActivationResult<Bindings> {
    if !path.exists() {
        debug!("Store {:?} does not exist yet, starting empty", path);
        return Ok(Bindings::new());
    }

    let bytes = fs::read(path)?;
    let bindings: Bindings = serde_json::from_slice(&bytes)?;
    debug!("Loaded {} bindings from {:?}", bindings.len(), path);
    Ok(bindings)
}

fn write_bindings(path: &Path, bindings: &Bindings) -> ActivationResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut bytes = Vec::new();
    let mut ser = Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(b"    "));
    bindings.serialize(&mut ser)?;

    // Write-then-rename so a crash never leaves a truncated store behind.
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, &bytes)?;
    fs::rename(&tmp_path, path)?;

    debug!("Saved {} bindings to {:?}", bindings.len(), path);
    Ok(())
}
