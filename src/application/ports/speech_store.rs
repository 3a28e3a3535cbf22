//! Speech Store Port - 语音缓存持久化
//!
//! 跨进程重启保存 缓存 key → 音频 的映射，具体实现使用 Sled

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::audio::{AudioFormat, AudioOrigin};

/// Speech Store 错误
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// 持久化的音频来源
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoredSource {
    Bytes(Vec<u8>),
    File(PathBuf),
}

/// 持久化条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSpeech {
    pub source: StoredSource,
    pub origin: AudioOrigin,
    pub format: Option<AudioFormat>,
    pub duration_hint: Option<f64>,
    /// 创建时间（Unix 毫秒）
    pub created_at: i64,
}

impl StoredSpeech {
    pub fn size_bytes(&self) -> u64 {
        match &self.source {
            StoredSource::Bytes(data) => data.len() as u64,
            StoredSource::File(_) => 0,
        }
    }
}

/// 缓存统计信息
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    pub total_entries: usize,
    pub total_size_bytes: u64,
}

/// Speech Store Port
#[async_trait]
pub trait SpeechStorePort: Send + Sync {
    async fn put(&self, key: &str, entry: StoredSpeech) -> Result<(), CacheError>;

    async fn get(&self, key: &str) -> Result<Option<StoredSpeech>, CacheError>;

    async fn remove(&self, key: &str) -> Result<(), CacheError>;

    /// 删除全部条目，返回删除数量
    async fn clear(&self) -> Result<usize, CacheError>;

    async fn stats(&self) -> StoreStats;
}
