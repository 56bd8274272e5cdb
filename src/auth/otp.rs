// Expiring, single-use OTP storage keyed by phone number.
//
// The store is injected into AuthService: redis in production, an
// in-memory map for tests and redis-less development. Codes are
// consumed on read (take_once), so a code can never be replayed.

use async_trait::async_trait;
use rand::Rng;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::auth::error::AuthError;

/// How long a requested code stays valid
pub const OTP_TTL: Duration = Duration::from_secs(5 * 60);

/// Expiring single-use key-value store for OTP codes
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Store a code under a key; overwrites any pending code for the key
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AuthError>;

    /// Remove and return the code for a key. Returns None when no code
    /// was requested or the code lapsed.
    async fn take_once(&self, key: &str) -> Result<Option<String>, AuthError>;
}

/// Generate a 6-digit numeric code
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// In-memory OTP store backed by a TTL map
#[derive(Default)]
pub struct InMemoryOtpStore {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AuthError> {
        let deadline = Instant::now() + ttl;
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }

    async fn take_once(&self, key: &str) -> Result<Option<String>, AuthError> {
        let mut entries = self.entries.write().await;
        match entries.remove(key) {
            Some((value, deadline)) if Instant::now() <= deadline => Ok(Some(value)),
            // lapsed entries are dropped on access
            _ => Ok(None),
        }
    }
}

/// Redis-backed OTP store; SETEX for expiry, atomic GET+DEL for the
/// single-use read.
#[derive(Clone)]
pub struct RedisOtpStore {
    conn: redis::aio::ConnectionManager,
}

impl RedisOtpStore {
    pub async fn connect(redis_url: &str) -> Result<Self, AuthError> {
        let client =
            redis::Client::open(redis_url).map_err(|e| AuthError::StoreError(e.to_string()))?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(|e| AuthError::StoreError(e.to_string()))?;

        Ok(Self { conn })
    }

    fn otp_key(key: &str) -> String {
        format!("otp:{}", key)
    }
}

#[async_trait]
impl OtpStore for RedisOtpStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AuthError> {
        let mut conn = self.conn.clone();
        redis::cmd("SETEX")
            .arg(Self::otp_key(key))
            .arg(ttl.as_secs())
            .arg(value)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| AuthError::StoreError(e.to_string()))
    }

    async fn take_once(&self, key: &str) -> Result<Option<String>, AuthError> {
        let mut conn = self.conn.clone();
        let redis_key = Self::otp_key(key);
        let (value,): (Option<String>,) = redis::pipe()
            .atomic()
            .get(&redis_key)
            .del(&redis_key)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| AuthError::StoreError(e.to_string()))?;

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(otp.chars().next(), Some('0'));
        }
    }

    #[tokio::test]
    async fn test_put_then_take_returns_code() {
        let store = InMemoryOtpStore::new();
        store.put("9876543210", "482913", OTP_TTL).await.unwrap();

        let taken = store.take_once("9876543210").await.unwrap();
        assert_eq!(taken.as_deref(), Some("482913"));
    }

    #[tokio::test]
    async fn test_take_is_single_use() {
        let store = InMemoryOtpStore::new();
        store.put("9876543210", "482913", OTP_TTL).await.unwrap();

        assert!(store.take_once("9876543210").await.unwrap().is_some());
        assert!(store.take_once("9876543210").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_take_without_put_is_none() {
        let store = InMemoryOtpStore::new();
        assert!(store.take_once("9876543210").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lapsed_code_is_gone() {
        let store = InMemoryOtpStore::new();
        store
            .put("9876543210", "482913", Duration::from_millis(10))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(store.take_once("9876543210").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_pending_code() {
        let store = InMemoryOtpStore::new();
        store.put("9876543210", "111111", OTP_TTL).await.unwrap();
        store.put("9876543210", "222222", OTP_TTL).await.unwrap();

        let taken = store.take_once("9876543210").await.unwrap();
        assert_eq!(taken.as_deref(), Some("222222"));
    }
}
