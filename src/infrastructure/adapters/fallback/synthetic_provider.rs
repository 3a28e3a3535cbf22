//! Synthetic Tone Provider - 最后一级兜底
//!
//! 生成 A4 + C#5 通知音并编码为 16 位单声道 WAV

use async_trait::async_trait;

use crate::application::ports::{FallbackProvider, Strategy};
use crate::domain::audio::{
    encode_wav, mono_duration_secs, notification_tone, AudioFormat, AudioOrigin, AudioResource,
    SourceHandle,
};
use crate::domain::narration::NarrationRequest;

pub struct SyntheticToneProvider {
    sample_rate: u32,
    duration_secs: f32,
}

impl SyntheticToneProvider {
    pub fn new(sample_rate: u32, duration_secs: f32) -> Self {
        Self {
            sample_rate,
            duration_secs,
        }
    }
}

impl Default for SyntheticToneProvider {
    fn default() -> Self {
        Self::new(44100, 2.0)
    }
}

#[async_trait]
impl FallbackProvider for SyntheticToneProvider {
    fn strategy(&self) -> Strategy {
        Strategy::SyntheticTone
    }

    async fn try_resolve(&self, _request: &NarrationRequest) -> Option<AudioResource> {
        let samples = match notification_tone(self.sample_rate, self.duration_secs) {
            Ok(samples) => samples,
            Err(e) => {
                tracing::error!(error = %e, "Failed to render notification tone");
                return None;
            }
        };

        let duration = mono_duration_secs(samples.len(), self.sample_rate);
        let wav = encode_wav(&samples, self.sample_rate, 1);

        tracing::debug!(
            sample_rate = self.sample_rate,
            duration_secs = duration,
            bytes = wav.len(),
            "Synthetic notification tone generated"
        );

        Some(AudioResource::with_duration_hint(
            SourceHandle::buffer(wav),
            AudioOrigin::Synthetic,
            Some(AudioFormat::Wav),
            Some(duration),
        ))
    }
}
