//! Key store and replay cache
//!
//! Both are collaborators owned by the consuming service. The traits take
//! `&self` so one instance can be shared between request handlers; every
//! call must be atomic on its own.
//!
//! The in-memory implementations here live only as long as the process. A
//! real deployment keeps per-device keys in a secured database and persists
//! used tokens so that a restart does not reopen the replay window.

use crate::token::{Token, TOKEN_LEN};
use crate::types::{DeviceId, SymmetricKey};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

/// Default AES key of the OPTIGA Authenticate NBT development kits and shields
pub const DEV_KIT_KEY: [u8; 16] = [
    0x37, 0x3F, 0x50, 0x60, 0x40, 0x9B, 0xA0, 0x14, 0xB6, 0x9A, 0x62, 0x76, 0x22, 0xF2, 0x3B, 0x59,
];

/// Device id of the demo token used in documentation and tests
pub const DEMO_DEVICE_ID: [u8; 7] = [0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

/// Key of the demo device
pub const DEMO_KEY: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
];

/// Mapping from NFC UID to device specific AES key
pub trait KeyStore: Send + Sync {
    /// Returns the AES key for `device_id`, or `None` if the device is unknown
    fn get(&self, device_id: &DeviceId) -> Option<SymmetricKey>;

    /// Sets the AES key to be used for `device_id`
    fn set(&self, device_id: DeviceId, key: SymmetricKey);
}

/// Store of previously used tokens, preventing replay attacks
///
/// `is_used` followed by `mark_used` is a check-then-act sequence; two
/// concurrent validations of the same token can both see it as fresh. The
/// validator therefore commits through [`ReplayCache::try_use`], which
/// implementations must make atomic.
pub trait ReplayCache: Send + Sync {
    /// Returns true if `token` has been used before
    fn is_used(&self, token: &Token) -> bool;

    /// Marks `token` as used. Idempotent.
    fn mark_used(&self, token: &Token);

    /// Atomically marks `token` as used, returning true only if this call
    /// performed the transition from fresh to used
    fn try_use(&self, token: &Token) -> bool;
}

impl<T: KeyStore + ?Sized> KeyStore for Arc<T> {
    fn get(&self, device_id: &DeviceId) -> Option<SymmetricKey> {
        (**self).get(device_id)
    }

    fn set(&self, device_id: DeviceId, key: SymmetricKey) {
        (**self).set(device_id, key)
    }
}

impl<T: ReplayCache + ?Sized> ReplayCache for Arc<T> {
    fn is_used(&self, token: &Token) -> bool {
        (**self).is_used(token)
    }

    fn mark_used(&self, token: &Token) {
        (**self).mark_used(token)
    }

    fn try_use(&self, token: &Token) -> bool {
        (**self).try_use(token)
    }
}

/// In-memory [`KeyStore`]
///
/// Unknown devices yield `None` unless a fallback key was configured with
/// [`MemoryKeyStore::with_fallback`].
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    keys: RwLock<HashMap<DeviceId, SymmetricKey>>,
    fallback: Option<SymmetricKey>,
}

impl MemoryKeyStore {
    /// Create an empty store that reports unknown devices as unknown
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that answers every unknown device with `key`
    ///
    /// This mirrors development kits that all ship with [`DEV_KIT_KEY`]. With
    /// a fallback configured the validator can no longer report
    /// `UNKNOWN_DEVICE`; do not use it in production.
    pub fn with_fallback(key: SymmetricKey) -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
            fallback: Some(key),
        }
    }

    /// Create a store holding the demo device and its key
    pub fn with_demo_device() -> Self {
        let store = Self::new();
        store.set(
            DeviceId::from(DEMO_DEVICE_ID),
            SymmetricKey::from(DEMO_KEY),
        );
        store
    }

    /// Number of devices with an explicitly set key
    pub fn len(&self) -> usize {
        self.keys.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns true if no device has an explicitly set key
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyStore for MemoryKeyStore {
    fn get(&self, device_id: &DeviceId) -> Option<SymmetricKey> {
        let keys = self.keys.read().unwrap_or_else(|e| e.into_inner());
        keys.get(device_id).cloned().or_else(|| self.fallback.clone())
    }

    fn set(&self, device_id: DeviceId, key: SymmetricKey) {
        let mut keys = self.keys.write().unwrap_or_else(|e| e.into_inner());
        keys.insert(device_id, key);
    }
}

/// In-memory [`ReplayCache`] holding the assembled bytes of every used token
#[derive(Debug, Default)]
pub struct MemoryReplayCache {
    used: Mutex<HashSet<[u8; TOKEN_LEN]>>,
}

impl MemoryReplayCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens marked as used
    pub fn len(&self) -> usize {
        self.used.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns true if no token has been used yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReplayCache for MemoryReplayCache {
    fn is_used(&self, token: &Token) -> bool {
        let used = self.used.lock().unwrap_or_else(|e| e.into_inner());
        used.contains(&token.assemble())
    }

    fn mark_used(&self, token: &Token) {
        self.try_use(token);
    }

    fn try_use(&self, token: &Token) -> bool {
        let mut used = self.used.lock().unwrap_or_else(|e| e.into_inner());
        used.insert(token.assemble())
    }
}
