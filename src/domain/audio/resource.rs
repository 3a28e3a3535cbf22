//! Audio Context - 可播放音频资源

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

use super::AudioFormat;

/// 音频资源来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AudioOrigin {
    /// 远程 TTS 服务合成
    RemoteSynthesis,
    /// 本地静态兜底音频
    LocalFallback,
    /// 程序生成的提示音
    Synthetic,
    /// 从持久化缓存恢复
    Cached,
}

impl std::fmt::Display for AudioOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::RemoteSynthesis => "remote-synthesis",
            Self::LocalFallback => "local-fallback",
            Self::Synthetic => "synthetic",
            Self::Cached => "cached",
        };
        f.write_str(s)
    }
}

/// 可播放字节的句柄
#[derive(Debug, Clone)]
pub enum SourceHandle {
    /// 内存中的完整音频文件
    Buffer(Arc<[u8]>),
    /// 本地音频文件
    File(PathBuf),
}

impl SourceHandle {
    pub fn buffer(data: impl Into<Arc<[u8]>>) -> Self {
        Self::Buffer(data.into())
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Buffer(data) => format!("buffer:{}B", data.len()),
            Self::File(path) => format!("file:{}", path.display()),
        }
    }
}

#[derive(Debug)]
struct ResourceInner {
    id: Uuid,
    origin: AudioOrigin,
    format: Option<AudioFormat>,
    duration_hint: Option<f64>,
    handle: RwLock<Option<SourceHandle>>,
}

/// 音频资源
///
/// 克隆只复制引用；`release()` 对所有克隆生效。
/// 被释放的资源不再持有字节，校验和加载都会失败。
#[derive(Debug, Clone)]
pub struct AudioResource {
    inner: Arc<ResourceInner>,
}

impl AudioResource {
    pub fn new(handle: SourceHandle, origin: AudioOrigin, format: Option<AudioFormat>) -> Self {
        Self::with_duration_hint(handle, origin, format, None)
    }

    pub fn with_duration_hint(
        handle: SourceHandle,
        origin: AudioOrigin,
        format: Option<AudioFormat>,
        duration_hint: Option<f64>,
    ) -> Self {
        Self {
            inner: Arc::new(ResourceInner {
                id: Uuid::new_v4(),
                origin,
                format,
                duration_hint,
                handle: RwLock::new(Some(handle)),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn origin(&self) -> AudioOrigin {
        self.inner.origin
    }

    pub fn format(&self) -> Option<AudioFormat> {
        self.inner.format
    }

    pub fn duration_hint(&self) -> Option<f64> {
        self.inner.duration_hint
    }

    /// 当前句柄；已释放时返回 None
    pub fn handle(&self) -> Option<SourceHandle> {
        self.inner
            .handle
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_released(&self) -> bool {
        self.inner
            .handle
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// 释放底层存储，幂等
    pub fn release(&self) {
        let taken = self
            .inner
            .handle
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = taken {
            tracing::debug!(
                resource_id = %self.inner.id,
                origin = %self.inner.origin,
                source = %handle.describe(),
                "Audio resource released"
            );
        }
    }

    /// 两个句柄是否指向同一资源
    pub fn same_as(&self, other: &AudioResource) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
