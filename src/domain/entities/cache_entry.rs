//! Sidecar metadata stored next to each cached payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default time-to-live for cached variants.
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Contents of a `{key}.meta.json` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// Write time in Unix milliseconds.
    pub timestamp: i64,
    /// Lifetime in seconds.
    pub ttl: u64,
    /// Payload suffix including the leading dot.
    pub extension: String,
}

impl CacheMetadata {
    /// Creates metadata for an entry written at `created_at`.
    #[must_use]
    pub fn new(created_at: DateTime<Utc>, ttl: u64, extension: impl Into<String>) -> Self {
        Self {
            timestamp: created_at.timestamp_millis(),
            ttl,
            extension: extension.into(),
        }
    }

    /// Age of the entry in fractional seconds at `now`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn age_secs(&self, now: DateTime<Utc>) -> f64 {
        (now.timestamp_millis() - self.timestamp) as f64 / 1000.0
    }

    /// An entry is stale once its age strictly exceeds the ttl.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.age_secs(now) > self.ttl as f64
    }
}
