//! Speech Cache - 带 TTL 的已校验音频缓存
//!
//! - 新鲜条目：重新校验，通过则返回，失败则淘汰
//! - 过期条目：淘汰
//! - 未命中：调用工厂，写入内存并尽力持久化
//!
//! 同一 key 的并发调用会被合并（single-flight）。

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::application::ports::{
    AudioValidatorPort, SpeechStorePort, StoreStats, StoredSource, StoredSpeech, Strategy,
    SynthesisError,
};
use crate::domain::audio::{AudioOrigin, AudioResource, SourceHandle};

use super::Synthesized;

/// 缓存配置
#[derive(Debug, Clone)]
pub struct SpeechCacheConfig {
    pub ttl: Duration,
    /// 是否写入持久化存储
    pub persist: bool,
}

impl Default for SpeechCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            persist: true,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    resource: AudioResource,
    created_at: DateTime<Utc>,
}

impl CacheEntry {
    fn age(&self) -> Duration {
        (Utc::now() - self.created_at).to_std().unwrap_or_default()
    }
}

/// 缓存统计
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub persisted: Option<StoreStats>,
}

/// single-flight 闸门；调用结束或被取消时，最后一个持有者移除它
struct InflightSlot<'a> {
    inflight: &'a DashMap<String, Arc<Mutex<()>>>,
    key: &'a str,
    gate: Arc<Mutex<()>>,
}

impl<'a> InflightSlot<'a> {
    fn acquire(inflight: &'a DashMap<String, Arc<Mutex<()>>>, key: &'a str) -> Self {
        let gate = inflight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        Self {
            inflight,
            key,
            gate,
        }
    }
}

impl Drop for InflightSlot<'_> {
    fn drop(&mut self) {
        // 表内一份 + 自身一份
        self.inflight.remove_if(self.key, |_, gate| {
            Arc::ptr_eq(gate, &self.gate) && Arc::strong_count(gate) == 2
        });
    }
}

pub struct SpeechCache {
    config: SpeechCacheConfig,
    validator: Arc<dyn AudioValidatorPort>,
    store: Option<Arc<dyn SpeechStorePort>>,
    entries: DashMap<String, CacheEntry>,
    inflight: DashMap<String, Arc<Mutex<()>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SpeechCache {
    pub fn new(config: SpeechCacheConfig, validator: Arc<dyn AudioValidatorPort>) -> Self {
        Self {
            config,
            validator,
            store: None,
            entries: DashMap::new(),
            inflight: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// 附加持久化存储
    pub fn with_store(mut self, store: Arc<dyn SpeechStorePort>) -> Self {
        self.store = Some(store);
        self
    }

    /// 取得已校验的缓存音频，或调用 `factory` 生成
    pub async fn get_or_create<F, Fut>(
        &self,
        key: &str,
        factory: F,
    ) -> Result<Synthesized, SynthesisError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Synthesized, SynthesisError>>,
    {
        let slot = InflightSlot::acquire(&self.inflight, key);
        let _guard = slot.gate.lock().await;
        self.resolve(key, factory).await
    }

    async fn resolve<F, Fut>(&self, key: &str, factory: F) -> Result<Synthesized, SynthesisError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Synthesized, SynthesisError>>,
    {
        if let Some(entry) = self.lookup(key).await {
            if entry.age() > self.config.ttl {
                debug!(key = %key, age_secs = entry.age().as_secs(), "Cache entry expired");
                self.evict(key, &entry).await;
            } else {
                match self.validator.validate(&entry.resource).await {
                    Ok(_) => {
                        self.hits.fetch_add(1, Ordering::Relaxed);
                        debug!(key = %key, resource_id = %entry.resource.id(), "Cache hit");
                        return Ok(Synthesized {
                            resource: entry.resource,
                            strategy: Strategy::Cached,
                            notice: None,
                        });
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "Cached audio failed revalidation, evicting");
                        self.evict(key, &entry).await;
                    }
                }
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let synthesized = factory().await?;
        self.insert(key, &synthesized).await;
        Ok(synthesized)
    }

    /// 内存优先，其次持久化存储
    async fn lookup(&self, key: &str) -> Option<CacheEntry> {
        if let Some(entry) = self.entries.get(key) {
            return Some(entry.clone());
        }

        let store = self.store.as_ref()?;
        let stored = match store.get(key).await {
            Ok(stored) => stored?,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read persisted speech");
                return None;
            }
        };

        let handle = match stored.source {
            StoredSource::Bytes(data) => SourceHandle::buffer(data),
            StoredSource::File(path) => SourceHandle::File(path),
        };
        let entry = CacheEntry {
            resource: AudioResource::with_duration_hint(
                handle,
                AudioOrigin::Cached,
                stored.format,
                stored.duration_hint,
            ),
            created_at: DateTime::<Utc>::from_timestamp_millis(stored.created_at)
                .unwrap_or_else(Utc::now),
        };

        debug!(key = %key, origin = %stored.origin, "Restored speech from persistent store");
        self.entries.insert(key.to_string(), entry.clone());
        Some(entry)
    }

    async fn insert(&self, key: &str, synthesized: &Synthesized) {
        let entry = CacheEntry {
            resource: synthesized.resource.clone(),
            created_at: Utc::now(),
        };

        if let Some(previous) = self.entries.insert(key.to_string(), entry.clone()) {
            if !previous.resource.same_as(&entry.resource) {
                previous.resource.release();
            }
        }

        if !self.config.persist {
            return;
        }
        let Some(store) = &self.store else {
            return;
        };
        let Some(handle) = entry.resource.handle() else {
            return;
        };

        let stored = StoredSpeech {
            source: match handle {
                SourceHandle::Buffer(data) => StoredSource::Bytes(data.to_vec()),
                SourceHandle::File(path) => StoredSource::File(path),
            },
            origin: entry.resource.origin(),
            format: entry.resource.format(),
            duration_hint: entry.resource.duration_hint(),
            created_at: entry.created_at.timestamp_millis(),
        };

        if let Err(e) = store.put(key, stored).await {
            warn!(key = %key, error = %e, "Failed to persist speech");
        }
    }

    /// 只淘汰仍是同一资源的条目
    async fn evict(&self, key: &str, entry: &CacheEntry) {
        self.entries
            .remove_if(key, |_, current| current.resource.same_as(&entry.resource));
        entry.resource.release();
        self.remove_persisted(key).await;
    }

    async fn remove_persisted(&self, key: &str) {
        if let Some(store) = &self.store {
            if let Err(e) = store.remove(key).await {
                warn!(key = %key, error = %e, "Failed to remove persisted speech");
            }
        }
    }

    /// 释放并移除一个条目
    pub async fn invalidate(&self, key: &str) {
        if let Some((_, entry)) = self.entries.remove(key) {
            entry.resource.release();
            debug!(key = %key, "Cache entry invalidated");
        }
        self.remove_persisted(key).await;
    }

    /// 释放并移除全部条目，返回内存中移除的数量
    pub async fn clear(&self) -> usize {
        let keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        let mut removed = 0;
        for key in keys {
            if let Some((_, entry)) = self.entries.remove(&key) {
                entry.resource.release();
                removed += 1;
            }
        }

        if let Some(store) = &self.store {
            if let Err(e) = store.clear().await {
                warn!(error = %e, "Failed to clear persisted speech");
            }
        }

        info!(removed, "Speech cache cleared");
        removed
    }

    pub async fn stats(&self) -> CacheStats {
        let persisted = match &self.store {
            Some(store) => Some(store.stats().await),
            None => None,
        };
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            persisted,
        }
    }
}
