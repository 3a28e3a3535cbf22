//! Fixed Speech Engine - 离线开发用的语音引擎
//!
//! 始终返回固定的音频文件，不实际调用远程服务

use async_trait::async_trait;
use std::path::PathBuf;

use crate::application::ports::{SpeechEnginePort, SynthesisError, SynthesizedAudio};
use crate::domain::audio::AudioFormat;
use crate::domain::narration::{NarrationText, VoiceProfile};

/// Fixed Speech Engine 配置
#[derive(Debug, Clone)]
pub struct FixedSpeechEngineConfig {
    /// 固定返回的音频文件路径
    pub audio_file_path: PathBuf,
    /// 模拟的合成延迟（毫秒）
    pub latency_ms: u64,
}

impl Default for FixedSpeechEngineConfig {
    fn default() -> Self {
        Self {
            audio_file_path: PathBuf::from("public/voice-intro.mp3"),
            latency_ms: 200,
        }
    }
}

/// Fixed Speech Engine
pub struct FixedSpeechEngine {
    config: FixedSpeechEngineConfig,
    format: Option<AudioFormat>,
    /// 缓存的音频数据
    audio_data: Vec<u8>,
}

impl FixedSpeechEngine {
    pub fn new(config: FixedSpeechEngineConfig) -> Result<Self, std::io::Error> {
        let audio_data = std::fs::read(&config.audio_file_path)?;
        let format = AudioFormat::from_path(&config.audio_file_path);
        tracing::info!(
            path = %config.audio_file_path.display(),
            size = audio_data.len(),
            "FixedSpeechEngine initialized"
        );
        Ok(Self {
            config,
            format,
            audio_data,
        })
    }
}

#[async_trait]
impl SpeechEnginePort for FixedSpeechEngine {
    fn name(&self) -> &str {
        "fixed"
    }

    fn check_credentials(&self, _voice: &VoiceProfile) -> Result<(), SynthesisError> {
        Ok(())
    }

    async fn synthesize(
        &self,
        text: &NarrationText,
        voice: &VoiceProfile,
    ) -> Result<SynthesizedAudio, SynthesisError> {
        tracing::debug!(
            text_len = text.char_count(),
            model_id = %voice.model_id,
            "FixedSpeechEngine: returning fixed audio"
        );

        tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;

        let format = self.format.unwrap_or(AudioFormat::Mp3);
        Ok(SynthesizedAudio {
            audio_data: self.audio_data.clone(),
            content_type: format.mime_type().to_string(),
            format: Some(format),
        })
    }
}
