//! Fallback Provider Port - 兜底音频提供者
//!
//! 远程合成失败后按顺序尝试的音频来源

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::audio::AudioResource;
use crate::domain::narration::NarrationRequest;

/// 产出音频资源的策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// 远程 TTS 服务
    RemoteSynthesis,
    /// 调用方指定的兜底文件
    CustomFallback,
    /// 内置兜底文件
    DefaultFallback,
    /// 程序生成的通知音
    SyntheticTone,
    /// 缓存命中
    Cached,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RemoteSynthesis => "remote_synthesis",
            Self::CustomFallback => "custom_fallback",
            Self::DefaultFallback => "default_fallback",
            Self::SyntheticTone => "synthetic_tone",
            Self::Cached => "cached",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fallback Provider
///
/// `try_resolve` 只返回已校验可播放的资源；不可用时返回 None。
#[async_trait]
pub trait FallbackProvider: Send + Sync {
    fn strategy(&self) -> Strategy;

    async fn try_resolve(&self, request: &NarrationRequest) -> Option<AudioResource>;
}
