//! Typed views over a module's key space.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::codec;
use crate::errors::StoreError;
use crate::ports::StateStore;

/// Length of a module store prefix.
pub const STORE_PREFIX_LENGTH: usize = 4;

/// Length of a substore prefix.
pub const SUBSTORE_PREFIX_LENGTH: usize = 2;

/// Store prefix of a module: the first four bytes of SHA-256(module name).
pub fn store_prefix(module: &str) -> [u8; STORE_PREFIX_LENGTH] {
    let digest = Sha256::digest(module.as_bytes());
    let mut prefix = [0u8; STORE_PREFIX_LENGTH];
    prefix.copy_from_slice(&digest[..STORE_PREFIX_LENGTH]);
    prefix
}

/// Typed records of one substore, keyed by
/// `store_prefix(module) ‖ substore_prefix ‖ key`.
pub struct Substore<T> {
    prefix: Vec<u8>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Substore<T> {
    fn clone(&self) -> Self {
        Self {
            prefix: self.prefix.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Substore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Substore")
            .field("prefix", &hex::encode(&self.prefix))
            .finish()
    }
}

impl<T: Serialize + DeserializeOwned> Substore<T> {
    /// View over `module`'s substore `substore_prefix`.
    pub fn new(module: &str, substore_prefix: [u8; SUBSTORE_PREFIX_LENGTH]) -> Self {
        let mut prefix = store_prefix(module).to_vec();
        prefix.extend_from_slice(&substore_prefix);
        Self {
            prefix,
            _record: PhantomData,
        }
    }

    /// Full prefix (module prefix ‖ substore prefix).
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Substore prefix alone.
    pub fn substore_prefix(&self) -> &[u8] {
        &self.prefix[STORE_PREFIX_LENGTH..]
    }

    /// Full store key of `key`.
    pub fn key(&self, key: &[u8]) -> Vec<u8> {
        let mut full = Vec::with_capacity(self.prefix.len() + key.len());
        full.extend_from_slice(&self.prefix);
        full.extend_from_slice(key);
        full
    }

    /// Record under `key`, or the typed not-found error.
    pub fn get(&self, store: &dyn StateStore, key: &[u8]) -> Result<T, StoreError> {
        let bytes = store.get(&self.key(key))?;
        Ok(codec::decode(&bytes)?)
    }

    /// Record under `key`, if any.
    pub fn get_opt(&self, store: &dyn StateStore, key: &[u8]) -> Result<Option<T>, StoreError> {
        match store.get_opt(&self.key(key)) {
            Some(bytes) => Ok(Some(codec::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Whether a record exists under `key`.
    pub fn has(&self, store: &dyn StateStore, key: &[u8]) -> bool {
        store.has(&self.key(key))
    }

    /// Store `value` under `key`.
    pub fn set(&self, store: &mut dyn StateStore, key: &[u8], value: &T) -> Result<(), StoreError> {
        store.set(self.key(key), codec::encode(value)?);
        Ok(())
    }

    /// Remove the record under `key`.
    pub fn del(&self, store: &mut dyn StateStore, key: &[u8]) {
        store.del(&self.key(key));
    }

    /// Every record as (key without prefix, value), in key order.
    pub fn iter(&self, store: &dyn StateStore) -> Result<Vec<(Vec<u8>, T)>, StoreError> {
        store
            .iterate_prefix(&self.prefix)
            .into_iter()
            .map(|(key, bytes)| {
                let value = codec::decode(&bytes)?;
                Ok((key[self.prefix.len()..].to_vec(), value))
            })
            .collect()
    }
}
