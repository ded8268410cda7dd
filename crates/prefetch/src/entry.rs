//! Stored cache entry codec.
//!
//! Every stored value carries the instant its response was fetched, in the
//! record layout the server's session-cache module reads: an 8-byte
//! little-endian microseconds-since-epoch prefix followed by the raw OCSP
//! response bytes.

use std::time::Duration;

/// Length of the timestamp prefix on every stored value.
const TIMESTAMP_LEN: usize = 8;

/// A cached OCSP response together with its fetch timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    fetched_at_micros: i64,
    response: Vec<u8>,
}

impl CacheEntry {
    /// Wrap a freshly fetched response, stamped with the current time.
    pub fn new(response: Vec<u8>) -> Self {
        Self { fetched_at_micros: chrono::Utc::now().timestamp_micros(), response }
    }

    /// Decode a stored value. Returns `None` when the value is too short
    /// to carry a timestamp prefix.
    pub fn from_bytes(raw: &[u8]) -> Option<Self> {
        if raw.len() < TIMESTAMP_LEN {
            return None;
        }
        let (prefix, response) = raw.split_at(TIMESTAMP_LEN);
        let fetched_at_micros = i64::from_le_bytes(prefix.try_into().ok()?);
        Some(Self { fetched_at_micros, response: response.to_vec() })
    }

    /// Encode into the stored value layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut raw = Vec::with_capacity(TIMESTAMP_LEN + self.response.len());
        raw.extend_from_slice(&self.fetched_at_micros.to_le_bytes());
        raw.extend_from_slice(&self.response);
        raw
    }

    /// Raw OCSP response bytes.
    pub fn response(&self) -> &[u8] {
        &self.response
    }

    /// Microseconds since the Unix epoch at fetch time.
    pub fn fetched_at_micros(&self) -> i64 {
        self.fetched_at_micros
    }

    /// Entry age relative to `now_micros`, saturating to zero when the
    /// entry's timestamp lies in the future.
    pub fn age(&self, now_micros: i64) -> Duration {
        let delta = now_micros.saturating_sub(self.fetched_at_micros).max(0) as u64;
        Duration::from_micros(delta)
    }

    /// Whether this entry needs refetching under the given TTL.
    ///
    /// A zero TTL means always stale.
    pub fn is_stale(&self, ttl: Duration, now_micros: i64) -> bool {
        ttl.is_zero() || self.age(now_micros) > ttl
    }
}
