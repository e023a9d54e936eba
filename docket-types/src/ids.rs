//! Record identifiers.
//!
//! Identifiers are lowercase hex strings drawn from the operating system's
//! random source. When that source fails the generator degrades to a
//! seeded pseudo-random generator instead of failing the caller.

use crate::Value;
use rand::rngs::{OsRng, SmallRng};
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Reserved document key under which a record's identifier travels.
pub const ID_KEY: &str = "_id";

/// Unique identifier of a record.
///
/// Either generated locally by [`IdGenerator`] or assigned by the backend.
/// Backend-native numeric keys are held by their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wraps an existing identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extracts an identifier from a document value.
    ///
    /// Non-empty text and numbers are accepted; anything else is not an id.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// Returns the identifier as a document value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Text(self.0.clone())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Produces random, fixed-length lowercase hex identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdGenerator {
    digits: usize,
}

impl IdGenerator {
    /// Number of hex digits produced by [`IdGenerator::new`].
    pub const DEFAULT_DIGITS: usize = 24;

    /// Creates a generator producing [`Self::DEFAULT_DIGITS`] digits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            digits: Self::DEFAULT_DIGITS,
        }
    }

    /// Creates a generator producing `digits` hex digits.
    #[must_use]
    pub const fn with_digits(digits: usize) -> Self {
        Self { digits }
    }

    /// Returns the number of hex digits per identifier.
    #[must_use]
    pub const fn digits(&self) -> usize {
        self.digits
    }

    /// Generates an identifier from the operating system's random source.
    #[must_use]
    pub fn generate(&self) -> RecordId {
        self.generate_from(&mut OsRng)
    }

    /// Generates an identifier from `strong`, falling back to a seeded
    /// pseudo-random generator if `strong` cannot deliver bytes.
    ///
    /// The fallback is a degradation, not an error: it is logged and the
    /// caller still receives an identifier of the requested length.
    pub fn generate_from<R: RngCore + ?Sized>(&self, strong: &mut R) -> RecordId {
        // An odd digit count needs one extra nibble; the surplus digit is cut below.
        let mut bytes = vec![0u8; self.digits.div_ceil(2)];

        if let Err(e) = strong.try_fill_bytes(&mut bytes) {
            warn!(error = %e, "Strong entropy unavailable, using pseudo-random identifier bytes");
            fallback_rng().fill_bytes(&mut bytes);
        }

        let mut id = hex::encode(bytes);
        id.truncate(self.digits);
        RecordId(id)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn fallback_rng() -> SmallRng {
    static CALLS: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let calls = CALLS.fetch_add(1, Ordering::Relaxed);

    SmallRng::seed_from_u64(nanos ^ calls.rotate_left(32) ^ u64::from(std::process::id()))
}
