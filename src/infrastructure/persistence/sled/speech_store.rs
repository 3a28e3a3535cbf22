//! Sled Speech Store - 语音缓存的持久化实现
//!
//! 实现 SpeechStorePort trait；超过容量时淘汰最早写入的条目

use async_trait::async_trait;
use sled::Db;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::application::ports::{CacheError, SpeechStorePort, StoreStats, StoredSpeech};

const KEY_PREFIX: &str = "speech:";

/// Sled 存储配置
#[derive(Debug, Clone)]
pub struct SledStoreConfig {
    /// 数据库路径
    pub db_path: String,
    /// 最大存储大小（字节）
    pub max_size_bytes: u64,
}

impl Default for SledStoreConfig {
    fn default() -> Self {
        Self {
            db_path: "data/speech.sled".to_string(),
            max_size_bytes: 256 * 1024 * 1024, // 256MB
        }
    }
}

/// Sled 语音存储
pub struct SledSpeechStore {
    db: Db,
    max_size_bytes: u64,
    current_size: AtomicU64,
}

fn db_error(e: sled::Error) -> CacheError {
    CacheError::DatabaseError(e.to_string())
}

impl SledSpeechStore {
    /// 创建新的存储实例
    pub fn new(config: &SledStoreConfig) -> Result<Self, CacheError> {
        let db = sled::open(&config.db_path).map_err(db_error)?;

        // 计算当前存储大小
        let current_size = Self::calculate_total_size(&db)?;

        tracing::info!(
            db_path = %config.db_path,
            max_size_bytes = config.max_size_bytes,
            current_size = current_size,
            "SledSpeechStore initialized"
        );

        Ok(Self {
            db,
            max_size_bytes: config.max_size_bytes,
            current_size: AtomicU64::new(current_size),
        })
    }

    /// 打开现有存储
    pub fn open<P: AsRef<Path>>(path: P, max_size_bytes: u64) -> Result<Self, CacheError> {
        let config = SledStoreConfig {
            db_path: path.as_ref().to_string_lossy().to_string(),
            max_size_bytes,
        };
        Self::new(&config)
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn calculate_total_size(db: &Db) -> Result<u64, CacheError> {
        let mut total = 0u64;
        for item in db.scan_prefix(KEY_PREFIX) {
            let (_, value) = item.map_err(db_error)?;
            if let Ok(entry) = bincode::deserialize::<StoredSpeech>(&value) {
                total += entry.size_bytes();
            }
        }
        Ok(total)
    }

    /// 淘汰最早写入的条目；没有可淘汰条目时返回 false
    fn evict_oldest(&self) -> Result<bool, CacheError> {
        let mut oldest: Option<(sled::IVec, StoredSpeech)> = None;

        for item in self.db.scan_prefix(KEY_PREFIX) {
            let (key, value) = item.map_err(db_error)?;
            if let Ok(entry) = bincode::deserialize::<StoredSpeech>(&value) {
                let is_older = oldest
                    .as_ref()
                    .map(|(_, e)| entry.created_at < e.created_at)
                    .unwrap_or(true);
                if is_older {
                    oldest = Some((key, entry));
                }
            }
        }

        let Some((key, entry)) = oldest else {
            return Ok(false);
        };

        self.db.remove(&key).map_err(db_error)?;
        self.current_size
            .fetch_sub(entry.size_bytes(), Ordering::Relaxed);
        tracing::debug!(
            key = %String::from_utf8_lossy(&key),
            size_bytes = entry.size_bytes(),
            "Evicted oldest persisted speech"
        );
        Ok(true)
    }

    fn subtract_size(&self, bytes: u64) {
        let _ = self
            .current_size
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(current.saturating_sub(bytes))
            });
    }

    /// 刷新数据库
    pub fn flush(&self) -> Result<(), CacheError> {
        self.db.flush().map_err(db_error)?;
        Ok(())
    }
}

#[async_trait]
impl SpeechStorePort for SledSpeechStore {
    async fn put(&self, key: &str, entry: StoredSpeech) -> Result<(), CacheError> {
        let size = entry.size_bytes();
        if size > self.max_size_bytes {
            tracing::debug!(key = %key, size_bytes = size, "Speech too large to persist");
            return Ok(());
        }

        // 先移除同名旧条目，保证大小统计准确
        self.remove(key).await?;

        while self.current_size.load(Ordering::Relaxed) + size > self.max_size_bytes {
            if !self.evict_oldest()? {
                break;
            }
        }

        let entry_bytes =
            bincode::serialize(&entry).map_err(|e| CacheError::SerializationError(e.to_string()))?;

        self.db
            .insert(format!("{}{}", KEY_PREFIX, key), entry_bytes)
            .map_err(db_error)?;
        self.current_size.fetch_add(size, Ordering::Relaxed);

        tracing::debug!(key = %key, size_bytes = size, origin = %entry.origin, "Speech persisted");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredSpeech>, CacheError> {
        match self.db.get(format!("{}{}", KEY_PREFIX, key)).map_err(db_error)? {
            Some(data) => {
                let entry = bincode::deserialize(&data)
                    .map_err(|e| CacheError::SerializationError(e.to_string()))?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        if let Some(data) = self
            .db
            .remove(format!("{}{}", KEY_PREFIX, key))
            .map_err(db_error)?
        {
            if let Ok(entry) = bincode::deserialize::<StoredSpeech>(&data) {
                self.subtract_size(entry.size_bytes());
            }
        }
        Ok(())
    }

    async fn clear(&self) -> Result<usize, CacheError> {
        let keys: Vec<sled::IVec> = self
            .db
            .scan_prefix(KEY_PREFIX)
            .keys()
            .collect::<Result<_, _>>()
            .map_err(db_error)?;

        for key in &keys {
            self.db.remove(key).map_err(db_error)?;
        }
        self.current_size.store(0, Ordering::Relaxed);

        Ok(keys.len())
    }

    async fn stats(&self) -> StoreStats {
        StoreStats {
            total_entries: self.db.scan_prefix(KEY_PREFIX).count(),
            total_size_bytes: self.current_size.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::StoredSource;
    use crate::domain::audio::{AudioFormat, AudioOrigin};
    use tempfile::tempdir;

    fn entry(bytes: usize, created_at: i64) -> StoredSpeech {
        StoredSpeech {
            source: StoredSource::Bytes(vec![7u8; bytes]),
            origin: AudioOrigin::RemoteSynthesis,
            format: Some(AudioFormat::Mp3),
            duration_hint: Some(1.5),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_put_get_remove() {
        let dir = tempdir().unwrap();
        let store = SledSpeechStore::open(dir.path().join("speech.sled"), 1024 * 1024).unwrap();

        store.put("voice_a", entry(100, 1)).await.unwrap();

        let loaded = store.get("voice_a").await.unwrap().unwrap();
        assert_eq!(loaded, entry(100, 1));

        let stats = store.stats().await;
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.total_size_bytes, 100);

        store.remove("voice_a").await.unwrap();
        assert!(store.get("voice_a").await.unwrap().is_none());
        assert_eq!(store.stats().await.total_size_bytes, 0);
    }

    #[tokio::test]
    async fn test_oldest_entry_evicted_when_full() {
        let dir = tempdir().unwrap();
        let store = SledSpeechStore::open(dir.path().join("speech.sled"), 250).unwrap();

        store.put("voice_old", entry(100, 1)).await.unwrap();
        store.put("voice_mid", entry(100, 2)).await.unwrap();
        store.put("voice_new", entry(100, 3)).await.unwrap();

        assert!(store.get("voice_old").await.unwrap().is_none());
        assert!(store.get("voice_mid").await.unwrap().is_some());
        assert!(store.get("voice_new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("speech.sled");
        {
            let store = SledSpeechStore::open(&path, 1024 * 1024).unwrap();
            store.put("voice_a", entry(64, 1)).await.unwrap();
            store
                .put(
                    "voice_b",
                    StoredSpeech {
                        source: StoredSource::File("public/intro.mp3".into()),
                        origin: AudioOrigin::LocalFallback,
                        format: Some(AudioFormat::Mp3),
                        duration_hint: None,
                        created_at: 2,
                    },
                )
                .await
                .unwrap();
            store.flush().unwrap();
        }

        let reopened = SledSpeechStore::open(&path, 1024 * 1024).unwrap();
        assert_eq!(reopened.stats().await.total_size_bytes, 64);
        assert!(matches!(
            reopened.get("voice_b").await.unwrap().unwrap().source,
            StoredSource::File(_)
        ));

        assert_eq!(reopened.clear().await.unwrap(), 2);
        assert_eq!(reopened.stats().await.total_entries, 0);
    }
}
