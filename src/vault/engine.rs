//! Lock-guarded state shared by the file-backed providers.
//!
//! An `Engine` owns one `VaultState` plus whatever the backend needs to
//! seal it (a key, a recipient list, nothing at all).  Reads take the
//! shared lock.  Mutations take the exclusive lock, work on a copy of
//! the state, seal and atomically write the copy, and only then swap it
//! in, so a failed write leaves both memory and disk at the previous
//! state.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use zeroize::Zeroizing;

use super::persist;
use super::secret::SecretValue;
use super::state::{validate_secret_key, Metadata, VaultState};
use crate::errors::{Result, VaultError};

/// Turns a state into the bytes written to the vault file.
pub(crate) trait Seal: Send + Sync {
    fn seal(&self, state: &VaultState) -> Result<Zeroizing<Vec<u8>>>;
}

pub(crate) struct Loaded<S> {
    pub state: VaultState,
    pub sealer: S,
}

pub(crate) struct Engine<S> {
    id: String,
    path: PathBuf,
    loaded: RwLock<Option<Loaded<S>>>,
}

impl<S: Seal> Engine<S> {
    /// Wrap a state that was just read from `path`.
    pub fn loaded(id: &str, path: PathBuf, state: VaultState, sealer: S) -> Self {
        Self {
            id: id.to_string(),
            path,
            loaded: RwLock::new(Some(Loaded { state, sealer })),
        }
    }

    /// Write `state` to `path` as a brand-new vault.
    pub fn create(id: &str, path: PathBuf, state: VaultState, sealer: S) -> Result<Self> {
        let data = sealer.seal(&state)?;
        persist::write_atomic(&path, &data)?;
        tracing::info!(vault = id, path = %path.display(), "created vault");
        Ok(Self::loaded(id, path, state, sealer))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn closed(&self) -> VaultError {
        VaultError::VaultClosed(self.id.clone())
    }

    /// Run `f` under the shared lock.
    pub fn read<R>(&self, f: impl FnOnce(&Loaded<S>) -> Result<R>) -> Result<R> {
        let guard = self.loaded.read();
        let loaded = guard.as_ref().ok_or_else(|| self.closed())?;
        f(loaded)
    }

    /// Run `f` on a copy of the state under the exclusive lock.
    ///
    /// `f` returns whether it changed anything; unchanged states are not
    /// written.  Changed states get a new `last_modified` and are
    /// persisted before they replace the in-memory state.
    pub fn mutate(&self, f: impl FnOnce(&mut VaultState) -> Result<bool>) -> Result<()> {
        let mut guard = self.loaded.write();
        let loaded = guard.as_mut().ok_or_else(|| self.closed())?;

        let mut next = loaded.state.clone();
        if !f(&mut next)? {
            return Ok(());
        }
        next.metadata.touch();

        let data = loaded.sealer.seal(&next)?;
        persist::write_atomic(&self.path, &data)?;
        loaded.state = next;
        Ok(())
    }

    pub fn get_secret(&self, key: &str) -> Result<SecretValue> {
        validate_secret_key(key)?;
        self.read(|loaded| {
            loaded
                .state
                .secrets
                .get(key)
                .map(|value| SecretValue::new(value.as_bytes()))
                .ok_or_else(|| VaultError::SecretNotFound(key.to_string()))
        })
    }

    pub fn set_secret(&self, key: &str, mut value: SecretValue) -> Result<()> {
        let result = validate_secret_key(key).and_then(|()| {
            let text = value.as_str().ok_or_else(|| {
                VaultError::SerializationError(format!(
                    "value of secret '{key}' is not valid UTF-8"
                ))
            })?;
            let text = text.to_string();
            self.mutate(|state| {
                state.secrets.insert(key.to_string(), text);
                Ok(true)
            })
        });
        value.zero();
        if result.is_ok() {
            tracing::debug!(vault = %self.id, secret = key, "secret stored");
        }
        result
    }

    pub fn delete_secret(&self, key: &str) -> Result<()> {
        validate_secret_key(key)?;
        self.mutate(|state| match state.secrets.remove(key) {
            Some(_) => Ok(true),
            None => Err(VaultError::SecretNotFound(key.to_string())),
        })?;
        tracing::debug!(vault = %self.id, secret = key, "secret deleted");
        Ok(())
    }

    pub fn list_secrets(&self) -> Result<Vec<String>> {
        self.read(|loaded| Ok(loaded.state.names()))
    }

    pub fn has_secret(&self, key: &str) -> Result<bool> {
        validate_secret_key(key)?;
        self.read(|loaded| Ok(loaded.state.secrets.contains_key(key)))
    }

    pub fn metadata(&self) -> Result<Metadata> {
        self.read(|loaded| Ok(loaded.state.metadata))
    }

    /// Drop the state and sealing material.  Idempotent.
    pub fn close(&self) {
        if self.loaded.write().take().is_some() {
            tracing::debug!(vault = %self.id, "vault closed");
        }
    }
}
