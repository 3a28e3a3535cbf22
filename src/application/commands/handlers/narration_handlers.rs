//! Narration Command Handlers

use serde::Serialize;
use std::sync::Arc;

use crate::application::commands::{PlayNarration, RetryNarration, StopNarration, SynthesizeNarration};
use crate::application::error::ApplicationError;
use crate::application::narration::{FallbackNotice, Narrator, PlaybackOutcome};
use crate::application::ports::Strategy;
use crate::domain::audio::{AudioFormat, SourceHandle};
use crate::domain::narration::{NarrationRequest, Section, VoiceProfile};

fn voice_for(section: Option<Section>) -> VoiceProfile {
    section.map(|s| s.voice_profile()).unwrap_or_default()
}

// ============================================================================
// PlayNarration
// ============================================================================

/// 播放结果响应
#[derive(Debug, Clone, Serialize)]
pub struct PlayNarrationResponse {
    pub outcome: PlaybackOutcome,
    pub strategy: Option<Strategy>,
    pub notice: Option<FallbackNotice>,
}

/// PlayNarration Handler
pub struct PlayNarrationHandler {
    narrator: Arc<Narrator>,
}

impl PlayNarrationHandler {
    pub fn new(narrator: Arc<Narrator>) -> Self {
        Self { narrator }
    }

    pub async fn handle(&self, command: PlayNarration) -> Result<PlayNarrationResponse, ApplicationError> {
        let mut voice = voice_for(command.section);
        if let Some(voice_id) = command.voice_id {
            voice = voice.with_voice_id(voice_id);
        }

        let mut request = NarrationRequest::new(command.text, voice);
        if let Some(asset) = command.fallback_asset {
            request = request.with_fallback_asset(asset);
        }

        let played = self.narrator.play(request).await?;

        tracing::info!(
            outcome = ?played.outcome,
            strategy = ?played.strategy,
            "Narration play completed"
        );

        Ok(PlayNarrationResponse {
            outcome: played.outcome,
            strategy: played.strategy,
            notice: played.notice,
        })
    }
}

// ============================================================================
// SynthesizeNarration
// ============================================================================

/// 合成出的音频字节
#[derive(Debug, Clone)]
pub struct NarrationAudio {
    pub data: Vec<u8>,
    pub content_type: &'static str,
    pub strategy: Strategy,
}

/// SynthesizeNarration Handler
pub struct SynthesizeNarrationHandler {
    narrator: Arc<Narrator>,
}

impl SynthesizeNarrationHandler {
    pub fn new(narrator: Arc<Narrator>) -> Self {
        Self { narrator }
    }

    pub async fn handle(&self, command: SynthesizeNarration) -> Result<NarrationAudio, ApplicationError> {
        let request = NarrationRequest::new(command.text, voice_for(command.section));
        let synthesized = self.narrator.audio(request).await?;

        let handle = synthesized
            .resource
            .handle()
            .ok_or_else(|| ApplicationError::Unavailable("audio was released".to_string()))?;

        let data = match handle {
            SourceHandle::Buffer(bytes) => bytes.to_vec(),
            SourceHandle::File(path) => tokio::fs::read(&path)
                .await
                .map_err(|e| ApplicationError::internal(format!("{}: {}", path.display(), e)))?,
        };

        let content_type = synthesized
            .resource
            .format()
            .unwrap_or(AudioFormat::Mp3)
            .mime_type();

        Ok(NarrationAudio {
            data,
            content_type,
            strategy: synthesized.strategy,
        })
    }
}

// ============================================================================
// StopNarration / RetryNarration
// ============================================================================

/// StopNarration Handler
pub struct StopNarrationHandler {
    narrator: Arc<Narrator>,
}

impl StopNarrationHandler {
    pub fn new(narrator: Arc<Narrator>) -> Self {
        Self { narrator }
    }

    pub fn handle(&self, _command: StopNarration) {
        self.narrator.stop();
    }
}

/// RetryNarration Handler
pub struct RetryNarrationHandler {
    narrator: Arc<Narrator>,
}

impl RetryNarrationHandler {
    pub fn new(narrator: Arc<Narrator>) -> Self {
        Self { narrator }
    }

    pub async fn handle(&self, _command: RetryNarration) {
        self.narrator.retry().await;
    }
}
