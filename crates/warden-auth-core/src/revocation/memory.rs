//! In-process revocation store for single-node deployments and tests

use async_trait::async_trait;
use dashmap::DashMap;
use moka::notification::RemovalCause;
use moka::{future::Cache, Expiry};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use warden_types::UserId;

use super::{RevocationStore, StoreError};

#[derive(Debug, Clone)]
struct LiveEntry {
    subject: UserId,
    ttl: Duration,
    expires_at: Instant,
}

impl LiveEntry {
    fn is_live(&self) -> bool {
        self.expires_at > Instant::now()
    }
}

/// Each entry expires after its own TTL
struct PerEntryTtl;

impl Expiry<String, LiveEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &LiveEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &LiveEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Revocation store backed by a moka cache
#[derive(Clone)]
pub struct MemoryRevocationStore {
    entries: Cache<String, LiveEntry>,
    by_subject: Arc<DashMap<UserId, HashSet<String>>>,
}

impl MemoryRevocationStore {
    /// Default capacity, in live refresh tokens
    pub const DEFAULT_CAPACITY: u64 = 100_000;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(max_capacity: u64) -> Self {
        let by_subject: Arc<DashMap<UserId, HashSet<String>>> = Arc::new(DashMap::new());
        let index = Arc::clone(&by_subject);

        // Explicit removals clean the index themselves
        let on_evict = move |fingerprint: Arc<String>, entry: LiveEntry, cause: RemovalCause| {
            if cause.was_evicted() {
                forget(&index, entry.subject, &fingerprint);
            }
        };

        Self {
            entries: Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(PerEntryTtl)
                .eviction_listener(on_evict)
                .build(),
            by_subject,
        }
    }
}

fn forget(index: &DashMap<UserId, HashSet<String>>, subject: UserId, fingerprint: &str) {
    if let Some(mut fps) = index.get_mut(&subject) {
        fps.remove(fingerprint);
    }
    index.remove_if(&subject, |_, fps| fps.is_empty());
}

impl Default for MemoryRevocationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn mark_live(&self, fingerprint: &str, subject: UserId, ttl: Duration) -> Result<(), StoreError> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| StoreError::Command(format!("ttl of {}s out of range", ttl.as_secs())))?;
        let entry = LiveEntry {
            subject,
            ttl,
            expires_at,
        };
        // Index first, so an eviction racing the insert still finds it
        self.by_subject
            .entry(subject)
            .or_default()
            .insert(fingerprint.to_string());
        self.entries.insert(fingerprint.to_string(), entry).await;
        Ok(())
    }

    async fn is_live(&self, fingerprint: &str) -> Result<bool, StoreError> {
        Ok(self
            .entries
            .get(fingerprint)
            .await
            .is_some_and(|entry| entry.is_live()))
    }

    async fn revoke(&self, fingerprint: &str) -> Result<(), StoreError> {
        if let Some(entry) = self.entries.remove(fingerprint).await {
            forget(&self.by_subject, entry.subject, fingerprint);
        }
        Ok(())
    }

    async fn consume(&self, fingerprint: &str) -> Result<bool, StoreError> {
        match self.entries.remove(fingerprint).await {
            Some(entry) => {
                forget(&self.by_subject, entry.subject, fingerprint);
                Ok(entry.is_live())
            }
            None => Ok(false),
        }
    }

    async fn revoke_all_for_subject(&self, subject: UserId) -> Result<u64, StoreError> {
        let Some((_, fingerprints)) = self.by_subject.remove(&subject) else {
            return Ok(0);
        };

        let mut revoked = 0;
        for fp in fingerprints {
            if let Some(entry) = self.entries.remove(&fp).await {
                if entry.is_live() {
                    revoked += 1;
                }
            }
        }
        Ok(revoked)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

impl std::fmt::Debug for MemoryRevocationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRevocationStore")
            .field("entries", &self.entries.entry_count())
            .field("subjects", &self.by_subject.len())
            .finish()
    }
}
