//! Audio Validator Port - 解码校验
//!
//! 在信任一个音频资源（缓存、播放）之前确认它确实可以解码

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::AudioResource;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Audio resource has been released")]
    Released,

    #[error("Audio source unreadable: {0}")]
    Unreadable(String),

    #[error("Audio is not decodable: {0}")]
    Undecodable(String),

    #[error("Audio validation timed out after {0}ms")]
    Timeout(u64),
}

/// 探测结果
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AudioProbe {
    pub duration_secs: Option<f64>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
}

/// Audio Validator Port
#[async_trait]
pub trait AudioValidatorPort: Send + Sync {
    /// 无界面地加载资源
    ///
    /// 首个数据包可解码或元数据给出正时长即通过；
    /// 解码失败或超时则拒绝。
    async fn validate(&self, resource: &AudioResource) -> Result<AudioProbe, ValidationError>;
}
