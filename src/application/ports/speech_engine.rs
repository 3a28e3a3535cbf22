//! Speech Engine Port - 远程语音合成抽象
//!
//! 定义远程 TTS 服务的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::AudioFormat;
use crate::domain::narration::{NarrationText, VoiceProfile};

/// 合成错误
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// 凭据缺失或格式错误
    #[error("Speech credentials problem: {0}")]
    Config(String),

    /// 文本为空或过长
    #[error("Invalid narration input: {0}")]
    Input(String),

    #[error("Speech API rejected credentials (401): {0}")]
    Auth(String),

    #[error("Speech API rate limit exceeded (429): {0}")]
    RateLimit(String),

    #[error("Speech API server error ({status}): {detail}")]
    Service { status: u16, detail: String },

    #[error("Speech API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("Network error: {0}")]
    Network(String),

    /// 响应不是音频
    #[error("Invalid response format: {0}")]
    Format(String),

    /// 音频过小或损坏
    #[error("Corrupt audio payload: {0}")]
    Corrupt(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Synthesis cancelled")]
    Cancelled,

    /// 所有策略均失败
    #[error("Audio unavailable: {0}")]
    Exhausted(String),
}

impl SynthesisError {
    /// 远程失败后是否应该尝试兜底
    pub fn allows_fallback(&self) -> bool {
        !matches!(
            self,
            Self::Input(_) | Self::Cancelled | Self::Exhausted(_)
        )
    }
}

/// 远程合成的音频
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    /// 完整音频文件字节
    pub audio_data: Vec<u8>,
    /// 响应声明的 Content-Type
    pub content_type: String,
    pub format: Option<AudioFormat>,
}

/// Speech Engine Port
///
/// 一次同步的请求/响应合成调用
#[async_trait]
pub trait SpeechEnginePort: Send + Sync {
    /// 引擎名称（用于日志）
    fn name(&self) -> &str;

    /// 本地凭据检查，不访问网络；请求指定的音色优先于默认音色
    fn check_credentials(&self, voice: &VoiceProfile) -> Result<(), SynthesisError>;

    /// 合成文本；丢弃返回的 future 即中止请求
    async fn synthesize(
        &self,
        text: &NarrationText,
        voice: &VoiceProfile,
    ) -> Result<SynthesizedAudio, SynthesisError>;
}
