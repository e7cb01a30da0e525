//! Token validation
//!
//! [`Validator`] runs the full server-side check for one candidate token:
//!
//! 1. candidate missing → [`ValidationOutcome::Missing`]
//! 2. not decodable → [`ValidationOutcome::SyntaxInvalid`]
//! 3. no key for the device id → [`ValidationOutcome::UnknownDevice`]
//! 4. already used → [`ValidationOutcome::Replayed`]
//! 5. MAC mismatch → [`ValidationOutcome::InvalidMac`]
//! 6. otherwise the token is marked used → [`ValidationOutcome::Valid`]
//!
//! The order is observable by clients: a used token with a wrong MAC is
//! reported as replayed, and a wrong MAC for an unknown device as unknown.
//! Only tokens with a valid MAC are ever recorded in the replay cache.
//!
//! # Example
//!
//! ```
//! use cott::{MemoryKeyStore, MemoryReplayCache, ValidationOutcome, Validator};
//!
//! let validator = Validator::new(MemoryKeyStore::with_demo_device(), MemoryReplayCache::new());
//! let token = "AAECAwQFBgcICQoLDA0ODxDbq1lCP77Fp74yxIzhqA4z";
//!
//! assert_eq!(validator.validate(Some(token)).outcome(), ValidationOutcome::Valid);
//! assert_eq!(validator.validate(Some(token)).outcome(), ValidationOutcome::Replayed);
//! assert_eq!(validator.validate(None).status_code(), 400);
//! ```

use crate::store::{KeyStore, ReplayCache};
use crate::token::Token;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Result of validating one candidate token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationOutcome {
    /// No candidate supplied
    Missing,
    /// Candidate is not valid Base64 or not 33 bytes
    SyntaxInvalid,
    /// No key known for the token's device id
    UnknownDevice,
    /// Token was used before
    Replayed,
    /// Token MAC was not created with the device key
    InvalidMac,
    /// Token is authentic and fresh; it is now marked as used
    Valid,
}

impl ValidationOutcome {
    /// HTTP status code a transport layer should answer with
    pub fn status_code(self) -> u16 {
        match self {
            Self::Missing | Self::SyntaxInvalid => 400,
            Self::UnknownDevice => 404,
            Self::Replayed => 429,
            Self::InvalidMac => 403,
            Self::Valid => 200,
        }
    }

    /// Stable name of the outcome
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "MISSING",
            Self::SyntaxInvalid => "SYNTAX_INVALID",
            Self::UnknownDevice => "UNKNOWN_DEVICE",
            Self::Replayed => "REPLAYED",
            Self::InvalidMac => "INVALID_MAC",
            Self::Valid => "VALID",
        }
    }

    /// Returns true only for [`ValidationOutcome::Valid`]
    pub fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a validation together with the decoded token, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    outcome: ValidationOutcome,
    token: Option<Token>,
}

impl Validation {
    fn new(outcome: ValidationOutcome, token: Option<Token>) -> Self {
        Self { outcome, token }
    }

    pub fn outcome(&self) -> ValidationOutcome {
        self.outcome
    }

    /// The decoded token; `None` for `Missing` and `SyntaxInvalid`
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn status_code(&self) -> u16 {
        self.outcome.status_code()
    }

    pub fn is_valid(&self) -> bool {
        self.outcome.is_valid()
    }
}

/// Validates candidate tokens against a key store and replay cache
///
/// Both collaborators are queried on every call; nothing is cached between
/// validations.
#[derive(Debug)]
pub struct Validator<K, C> {
    key_store: K,
    replay_cache: C,
}

impl<K: KeyStore, C: ReplayCache> Validator<K, C> {
    pub fn new(key_store: K, replay_cache: C) -> Self {
        Self {
            key_store,
            replay_cache,
        }
    }

    pub fn key_store(&self) -> &K {
        &self.key_store
    }

    pub fn replay_cache(&self) -> &C {
        &self.replay_cache
    }

    /// Validate a Base64 encoded candidate, as received from a client
    pub fn validate(&self, candidate: Option<&str>) -> Validation {
        let Some(encoded) = candidate else {
            warn!("Missing COTT");
            return Validation::new(ValidationOutcome::Missing, None);
        };

        let token = match Token::decode(encoded) {
            Ok(token) => token,
            Err(e) => {
                warn!("Syntactically invalid COTT data: {}", e);
                return Validation::new(ValidationOutcome::SyntaxInvalid, None);
            }
        };

        let outcome = self.validate_token(&token);
        Validation::new(outcome, Some(token))
    }

    /// Validate an already decoded token
    pub fn validate_token(&self, token: &Token) -> ValidationOutcome {
        let device_id = token.device_id();

        let Some(key) = self.key_store.get(device_id) else {
            warn!("No key found for UID {}", device_id);
            return ValidationOutcome::UnknownDevice;
        };

        if self.replay_cache.is_used(token) {
            warn!("COTT for UID {} has been used before", device_id);
            return ValidationOutcome::Replayed;
        }

        if !token.verify(&key) {
            warn!("COTT MAC for UID {} not matching -> invalid AES key", device_id);
            return ValidationOutcome::InvalidMac;
        }

        // A concurrent validation of the same token may have committed
        // between the check above and here.
        if !self.replay_cache.try_use(token) {
            warn!("COTT for UID {} was used concurrently", device_id);
            return ValidationOutcome::Replayed;
        }

        debug!("COTT for UID {} valid", device_id);
        ValidationOutcome::Valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryKeyStore, MemoryReplayCache, DEMO_KEY};
    use crate::types::{DeviceId, SymmetricKey};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    const VALID: &str = "AAECAwQFBgcICQoLDA0ODxDbq1lCP77Fp74yxIzhqA4z";
    const UNKNOWN_UID: &str = "AAEAAAAAAAAACQoLDA0ODxDbq1lCP77Fp74yxIzhqA4z";
    const WRONG_MAC: &str = "AAECAwQFBgcICQoLDA0ODxD_____________________";

    fn validator() -> Validator<MemoryKeyStore, MemoryReplayCache> {
        Validator::new(MemoryKeyStore::with_demo_device(), MemoryReplayCache::new())
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ValidationOutcome::Missing.status_code(), 400);
        assert_eq!(ValidationOutcome::SyntaxInvalid.status_code(), 400);
        assert_eq!(ValidationOutcome::UnknownDevice.status_code(), 404);
        assert_eq!(ValidationOutcome::Replayed.status_code(), 429);
        assert_eq!(ValidationOutcome::InvalidMac.status_code(), 403);
        assert_eq!(ValidationOutcome::Valid.status_code(), 200);
    }

    #[test]
    fn test_outcome_serde_names() {
        let json = serde_json::to_string(&ValidationOutcome::UnknownDevice).unwrap();
        assert_eq!(json, "\"UNKNOWN_DEVICE\"");
        assert_eq!(ValidationOutcome::UnknownDevice.to_string(), "UNKNOWN_DEVICE");
    }

    #[test]
    fn test_valid() {
        let validator = validator();
        let result = validator.validate(Some(VALID));
        assert_eq!(result.outcome(), ValidationOutcome::Valid);
        assert_eq!(result.token().unwrap().encode(), VALID);
        assert_eq!(validator.replay_cache().len(), 1);
    }

    #[test]
    fn test_missing() {
        let result = validator().validate(None);
        assert_eq!(result.outcome(), ValidationOutcome::Missing);
        assert!(result.token().is_none());
    }

    #[test]
    fn test_syntax_invalid() {
        for candidate in ["MDA=", "A", "", "AAECAwQFBgcICQoLDA0ODxD/////////////////////"] {
            let result = validator().validate(Some(candidate));
            assert_eq!(result.outcome(), ValidationOutcome::SyntaxInvalid, "{}", candidate);
            assert!(result.token().is_none());
        }
    }

    #[test]
    fn test_replayed() {
        let validator = validator();
        assert_eq!(validator.validate(Some(VALID)).outcome(), ValidationOutcome::Valid);
        assert_eq!(validator.validate(Some(VALID)).outcome(), ValidationOutcome::Replayed);
    }

    #[test]
    fn test_unknown_device() {
        let validator = validator();
        assert_eq!(
            validator.validate(Some(UNKNOWN_UID)).outcome(),
            ValidationOutcome::UnknownDevice
        );
        assert!(validator.replay_cache().is_empty());
    }

    #[test]
    fn test_invalid_mac() {
        let validator = validator();
        assert_eq!(validator.validate(Some(WRONG_MAC)).outcome(), ValidationOutcome::InvalidMac);
        // Forged tokens are never recorded
        assert!(validator.replay_cache().is_empty());
        assert_eq!(validator.validate(Some(WRONG_MAC)).outcome(), ValidationOutcome::InvalidMac);
    }

    #[test]
    fn test_replayed_takes_precedence_over_invalid_mac() {
        let validator = validator();
        let forged = Token::decode(WRONG_MAC).unwrap();
        validator.replay_cache().mark_used(&forged);

        assert_eq!(validator.validate_token(&forged), ValidationOutcome::Replayed);
    }

    #[test]
    fn test_unknown_device_takes_precedence_over_invalid_mac() {
        let validator = Validator::new(MemoryKeyStore::new(), MemoryReplayCache::new());
        assert_eq!(
            validator.validate(Some(WRONG_MAC)).outcome(),
            ValidationOutcome::UnknownDevice
        );
    }

    #[test]
    fn test_fallback_key_store_hides_unknown_device() {
        let validator = Validator::new(
            MemoryKeyStore::with_fallback(SymmetricKey::from(DEMO_KEY)),
            MemoryReplayCache::new(),
        );
        let token = Token::issue(
            [0x00, 0x01],
            DeviceId::from_hex("00000000000000").unwrap(),
            [0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10],
            &SymmetricKey::from(DEMO_KEY),
        );
        assert_eq!(validator.validate_token(&token), ValidationOutcome::Valid);
        assert_eq!(
            validator.validate(Some(UNKNOWN_UID)).outcome(),
            ValidationOutcome::InvalidMac
        );
    }

    #[test]
    fn test_keys_are_queried_every_time() {
        let validator = Validator::new(MemoryKeyStore::new(), MemoryReplayCache::new());
        assert_eq!(
            validator.validate(Some(VALID)).outcome(),
            ValidationOutcome::UnknownDevice
        );

        validator.key_store().set(
            DeviceId::from_hex("02030405060708").unwrap(),
            SymmetricKey::from(DEMO_KEY),
        );
        assert_eq!(validator.validate(Some(VALID)).outcome(), ValidationOutcome::Valid);
    }

    /// Cache that reports every token as fresh and loses the commit race
    #[derive(Default)]
    struct RacingCache {
        committed: AtomicBool,
    }

    impl ReplayCache for RacingCache {
        fn is_used(&self, _token: &Token) -> bool {
            false
        }

        fn mark_used(&self, _token: &Token) {
            self.committed.store(true, Ordering::SeqCst);
        }

        fn try_use(&self, _token: &Token) -> bool {
            !self.committed.swap(true, Ordering::SeqCst)
        }
    }

    #[test]
    fn test_lost_commit_race_is_replayed() {
        let validator = Validator::new(MemoryKeyStore::with_demo_device(), RacingCache::default());
        assert_eq!(validator.validate(Some(VALID)).outcome(), ValidationOutcome::Valid);
        assert_eq!(validator.validate(Some(VALID)).outcome(), ValidationOutcome::Replayed);
    }

    #[test]
    fn test_shared_validator() {
        let validator = Arc::new(validator());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let validator = Arc::clone(&validator);
                std::thread::spawn(move || validator.validate(Some(VALID)).outcome())
            })
            .collect();

        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let valid = outcomes.iter().filter(|o| o.is_valid()).count();
        assert_eq!(valid, 1);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o, ValidationOutcome::Valid | ValidationOutcome::Replayed)));
    }
}
