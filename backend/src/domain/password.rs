//! Credential hashing behind the [`PasswordHasher`](crate::domain::ports::PasswordHasher) port.
//!
//! The pipeline treats hashing as an opaque one-way function with a verify
//! contract. The default implementation derives a digest by iterating
//! HMAC-SHA256 over a random per-credential salt; verification recomputes
//! the digest and compares in constant time.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::ports::PasswordHasher;

type HmacSha256 = Hmac<Sha256>;

/// Stored one-way credential hash, encoded as `"<hex salt>$<hex digest>"`.
///
/// Never serialized outward; the user DTO drops it unconditionally.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash loaded from the store.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Encoded form for persistence.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

// Redacted: the encoded digest stays out of logs and assertion output.
impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

const SALT_LEN: usize = 16;
const DEFAULT_ITERATIONS: u32 = 4096;

/// Salted iterated HMAC-SHA256 credential hasher.
#[derive(Debug, Clone)]
pub struct HmacPasswordHasher {
    iterations: u32,
}

impl HmacPasswordHasher {
    /// Construct a hasher with an explicit iteration count.
    pub const fn with_iterations(iterations: u32) -> Self {
        Self { iterations }
    }

    fn digest(&self, salt: &[u8], password: &str) -> [u8; 32] {
        let mut acc = mac_digest(salt, password.as_bytes());
        for _ in 1..self.iterations {
            acc = mac_digest(salt, &acc);
        }
        acc
    }
}

impl Default for HmacPasswordHasher {
    fn default() -> Self {
        Self::with_iterations(DEFAULT_ITERATIONS)
    }
}

fn mac_digest(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

impl PasswordHasher for HmacPasswordHasher {
    fn hash(&self, password: &str) -> PasswordHash {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let digest = self.digest(&salt, password);
        PasswordHash::from_stored(format!("{}${}", hex::encode(salt), hex::encode(digest)))
    }

    fn verify(&self, password: &str, stored: &PasswordHash) -> bool {
        let Some((salt_hex, digest_hex)) = stored.as_str().split_once('$') else {
            return false;
        };
        let (Ok(salt), Ok(digest)) = (hex::decode(salt_hex), hex::decode(digest_hex)) else {
            return false;
        };
        let recomputed = self.digest(&salt, password);
        recomputed.ct_eq(digest.as_slice()).into()
    }
}
