//! Tone Output Port - 提示音输出上下文

use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToneOutputError {
    #[error("Audio output device not available: {0}")]
    DeviceUnavailable(String),

    #[error("Tone playback failed: {0}")]
    PlaybackFailed(String),
}

/// 已打开的音频输出上下文
pub trait ToneOutputPort: Send + Sync {
    /// 输出设备采样率
    fn sample_rate(&self) -> u32;

    /// 立即播放一段单声道样本，不阻塞、不排队
    fn play_samples(
        &self,
        samples: Arc<[f32]>,
        sample_rate: u32,
        gain: f32,
    ) -> Result<(), ToneOutputError>;
}

/// 延迟打开输出上下文
pub trait ToneOutputFactory: Send + Sync {
    fn open(&self) -> Result<Arc<dyn ToneOutputPort>, ToneOutputError>;
}
