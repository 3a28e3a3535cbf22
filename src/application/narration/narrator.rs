//! Narrator - 旁白门面
//!
//! play = prepare（缓存 + 合成）+ perform（播放控制器）。
//! 记录最近一次错误和兜底提示，供 `status()` / `get_error()` 查询。

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::ports::{PlaybackError, Strategy, SynthesisError};
use crate::domain::narration::{narration_cache_key, NarrationRequest, NarrationText};

use super::{
    FallbackNotice, PlaybackController, PlaybackOutcome, PlaybackStatus, SpeechCache,
    SpeechSynthesisClient, Synthesized,
};

/// 面向用户的失败类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Configuration,
    Input,
    Unavailable,
    Playback,
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrationFailure {
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum NarratorError {
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

impl NarratorError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Synthesis(SynthesisError::Input(_)) => FailureKind::Input,
            Self::Synthesis(SynthesisError::Config(_)) => FailureKind::Configuration,
            Self::Synthesis(SynthesisError::Timeout(_)) => FailureKind::Timeout,
            Self::Synthesis(_) => FailureKind::Unavailable,
            Self::Playback(PlaybackError::Timeout(_)) => FailureKind::Timeout,
            Self::Playback(_) => FailureKind::Playback,
        }
    }

    pub fn failure(&self) -> NarrationFailure {
        NarrationFailure {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// 旁白状态
#[derive(Debug, Clone, Serialize)]
pub struct NarrationStatus {
    pub playback: PlaybackStatus,
    pub strategy: Option<Strategy>,
    pub notice: Option<FallbackNotice>,
    pub error: Option<NarrationFailure>,
}

/// 一次 `play` 的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrationPlayback {
    pub outcome: PlaybackOutcome,
    pub strategy: Option<Strategy>,
    pub notice: Option<FallbackNotice>,
}

impl NarrationPlayback {
    fn stopped() -> Self {
        Self {
            outcome: PlaybackOutcome::Stopped,
            strategy: None,
            notice: None,
        }
    }
}

fn narration_key(request: &NarrationRequest) -> Result<String, SynthesisError> {
    let text =
        NarrationText::new(&request.text).map_err(|e| SynthesisError::Input(e.to_string()))?;
    Ok(narration_cache_key(&text, &request.voice))
}

#[derive(Default)]
struct NarratorState {
    generation: u64,
    pending: Option<(u64, CancellationToken)>,
    last_key: Option<String>,
    last_strategy: Option<Strategy>,
    notice: Option<FallbackNotice>,
    last_error: Option<NarrationFailure>,
}

pub struct Narrator {
    client: Arc<SpeechSynthesisClient>,
    cache: Arc<SpeechCache>,
    controller: Arc<PlaybackController>,
    state: Mutex<NarratorState>,
}

impl Narrator {
    pub fn new(
        client: Arc<SpeechSynthesisClient>,
        cache: Arc<SpeechCache>,
        controller: Arc<PlaybackController>,
    ) -> Self {
        Self {
            client,
            cache,
            controller,
            state: Mutex::new(NarratorState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, NarratorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 合成（或取缓存）并播放
    ///
    /// 新的 `play` 会取消上一次尚未完成的合成。
    pub async fn play(&self, request: NarrationRequest) -> Result<NarrationPlayback, NarratorError> {
        let key = narration_key(&request).map_err(|e| self.record(e.into()))?;

        let cancel = CancellationToken::new();
        let generation = {
            let mut state = self.lock();
            state.generation += 1;
            let generation = state.generation;
            if let Some((_, superseded)) = state.pending.replace((generation, cancel.clone())) {
                superseded.cancel();
            }
            state.last_key = Some(key.clone());
            generation
        };

        let result = self.synthesize(&key, &request, &cancel).await;
        {
            let mut state = self.lock();
            if state
                .pending
                .as_ref()
                .is_some_and(|(current, _)| *current == generation)
            {
                state.pending = None;
            }
        }

        let synthesized = match result {
            Ok(synthesized) => synthesized,
            Err(SynthesisError::Cancelled) => return Ok(NarrationPlayback::stopped()),
            Err(e) => return Err(self.record(e.into())),
        };
        self.remember(generation, &synthesized);

        info!(
            key = %key,
            strategy = %synthesized.strategy,
            resource_id = %synthesized.resource.id(),
            "Narration prepared"
        );

        let outcome = if cancel.is_cancelled() {
            PlaybackOutcome::Stopped
        } else {
            match self.controller.play(&synthesized.resource).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.cache.invalidate(&key).await;
                    return Err(self.record(e.into()));
                }
            }
        };

        Ok(NarrationPlayback {
            outcome,
            strategy: Some(synthesized.strategy),
            notice: synthesized.notice,
        })
    }

    /// 只合成不播放，返回可直接下发的音频
    ///
    /// 不参与播放的取消与状态记录。
    pub async fn audio(&self, request: NarrationRequest) -> Result<Synthesized, NarratorError> {
        let key = narration_key(&request)?;
        let synthesized = self
            .synthesize(&key, &request, &CancellationToken::new())
            .await?;

        info!(
            key = %key,
            strategy = %synthesized.strategy,
            "Narration audio prepared"
        );
        Ok(synthesized)
    }

    async fn synthesize(
        &self,
        key: &str,
        request: &NarrationRequest,
        cancel: &CancellationToken,
    ) -> Result<Synthesized, SynthesisError> {
        self.cache
            .get_or_create(key, || self.client.synthesize(request, cancel))
            .await
    }

    /// 只记录最新一次 `play` 的策略与提示
    fn remember(&self, generation: u64, synthesized: &Synthesized) {
        let mut state = self.lock();
        if state.generation != generation {
            return;
        }
        if synthesized.strategy != Strategy::Cached {
            state.notice = synthesized.notice.clone();
        }
        state.last_strategy = Some(synthesized.strategy);
        state.last_error = None;
    }

    fn record(&self, error: NarratorError) -> NarratorError {
        let failure = error.failure();
        warn!(kind = ?failure.kind, error = %failure.message, "Narration failed");
        self.lock().last_error = Some(failure);
        error
    }

    /// 中止合成与播放
    pub fn stop(&self) {
        if let Some((_, pending)) = self.lock().pending.take() {
            pending.cancel();
        }
        self.controller.stop();
    }

    /// 清除错误并丢弃上一次旁白的缓存
    pub async fn retry(&self) {
        let key = {
            let mut state = self.lock();
            state.last_error = None;
            state.notice = None;
            state.last_key.clone()
        };
        if let Some(key) = key {
            self.cache.invalidate(&key).await;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.controller.is_playing()
    }

    pub fn get_error(&self) -> Option<NarrationFailure> {
        self.lock().last_error.clone()
    }

    pub fn status(&self) -> NarrationStatus {
        let playback = self.controller.status();
        let state = self.lock();
        NarrationStatus {
            playback,
            strategy: state.last_strategy,
            notice: state.notice.clone(),
            error: state.last_error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::narration::test_support::*;
    use crate::application::narration::{NoticeKind, SpeechCacheConfig};
    use crate::application::ports::FallbackProvider;
    use crate::domain::audio::AudioOrigin;
    use crate::domain::narration::Section;
    use std::time::Duration;

    struct Harness {
        narrator: Arc<Narrator>,
        engine: Arc<FakeEngine>,
        port: Arc<ScriptedPlayerPort>,
    }

    fn harness(engine: FakeEngine, port: ScriptedPlayerPort, load_timeout: Duration) -> Harness {
        let engine = Arc::new(engine);
        let port = Arc::new(port);
        let validator = Arc::new(FakeValidator::default());
        let synthetic: Arc<dyn FallbackProvider> = Arc::new(FixedProvider::new(
            Strategy::SyntheticTone,
            AudioOrigin::Synthetic,
            true,
        ));

        let client = Arc::new(SpeechSynthesisClient::new(
            engine.clone(),
            validator.clone(),
            vec![synthetic],
        ));
        let cache = Arc::new(SpeechCache::new(
            SpeechCacheConfig {
                ttl: Duration::from_secs(300),
                persist: false,
            },
            validator,
        ));
        let controller = Arc::new(PlaybackController::new(port.clone(), load_timeout));

        Harness {
            narrator: Arc::new(Narrator::new(client, cache, controller)),
            engine,
            port,
        }
    }

    fn hero(text: &str) -> NarrationRequest {
        NarrationRequest::for_section(text, Section::Hero)
    }

    #[tokio::test]
    async fn test_play_uses_cache_on_second_call() {
        let h = harness(
            FakeEngine::new(EngineBehavior::Audio(wav_bytes())),
            ScriptedPlayerPort::new(true, true),
            Duration::from_secs(10),
        );

        let first = h.narrator.play(hero("Welcome")).await.unwrap();
        assert_eq!(first.outcome, PlaybackOutcome::Finished);
        assert_eq!(first.strategy, Some(Strategy::RemoteSynthesis));
        assert_eq!(h.narrator.status().strategy, Some(Strategy::RemoteSynthesis));

        let second = h.narrator.play(hero("Welcome")).await.unwrap();
        assert_eq!(second.strategy, Some(Strategy::Cached));
        assert_eq!(h.engine.calls(), 1);
        assert_eq!(h.narrator.status().strategy, Some(Strategy::Cached));
        assert!(h.narrator.get_error().is_none());
    }

    #[tokio::test]
    async fn test_load_timeout_records_error_and_invalidates() {
        let h = harness(
            FakeEngine::new(EngineBehavior::Audio(wav_bytes())),
            ScriptedPlayerPort::new(false, false),
            Duration::from_millis(50),
        );

        let result = h.narrator.play(hero("Welcome")).await;
        assert!(matches!(
            result,
            Err(NarratorError::Playback(PlaybackError::Timeout(50)))
        ));
        assert!(!h.narrator.is_playing());
        assert_eq!(h.narrator.get_error().unwrap().kind, FailureKind::Timeout);

        let _ = h.narrator.play(hero("Welcome")).await;
        assert_eq!(h.engine.calls(), 2);
    }

    #[tokio::test]
    async fn test_input_error_is_recorded_without_synthesis() {
        let h = harness(
            FakeEngine::new(EngineBehavior::Audio(wav_bytes())),
            ScriptedPlayerPort::new(true, true),
            Duration::from_secs(10),
        );

        let result = h.narrator.play(hero("  ")).await;
        assert!(matches!(
            result,
            Err(NarratorError::Synthesis(SynthesisError::Input(_)))
        ));
        assert_eq!(h.narrator.get_error().unwrap().kind, FailureKind::Input);
        assert_eq!(h.engine.calls(), 0);
        assert_eq!(h.port.loaded(), 0);
    }

    #[tokio::test]
    async fn test_missing_credentials_play_fallback_with_notice() {
        let h = harness(
            FakeEngine::new(EngineBehavior::Audio(wav_bytes())).without_credentials(),
            ScriptedPlayerPort::new(true, true),
            Duration::from_secs(10),
        );

        let played = h.narrator.play(hero("Welcome")).await.unwrap();

        assert_eq!(played.outcome, PlaybackOutcome::Finished);
        assert_eq!(played.strategy, Some(Strategy::SyntheticTone));
        assert_eq!(
            played.notice.map(|notice| notice.kind),
            Some(NoticeKind::Configuration)
        );
        let status = h.narrator.status();
        assert_eq!(status.strategy, Some(Strategy::SyntheticTone));
        assert_eq!(status.notice.unwrap().kind, NoticeKind::Configuration);
    }

    #[tokio::test]
    async fn test_retry_clears_error_and_cache() {
        let h = harness(
            FakeEngine::new(EngineBehavior::Audio(wav_bytes())),
            ScriptedPlayerPort::new(true, true),
            Duration::from_secs(10),
        );

        h.narrator.play(hero("Welcome")).await.unwrap();
        h.narrator.retry().await;
        assert!(h.narrator.get_error().is_none());

        h.narrator.play(hero("Welcome")).await.unwrap();
        assert_eq!(h.engine.calls(), 2);
    }

    #[tokio::test]
    async fn test_stop_during_synthesis_resolves_stopped() {
        let h = harness(
            FakeEngine::new(EngineBehavior::Hang),
            ScriptedPlayerPort::new(true, true),
            Duration::from_secs(10),
        );

        let task = {
            let narrator = h.narrator.clone();
            tokio::spawn(async move { narrator.play(hero("Welcome")).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        h.narrator.stop();

        let played = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(played.outcome, PlaybackOutcome::Stopped);
        assert!(h.narrator.get_error().is_none());
        assert_eq!(h.port.loaded(), 0);
    }

    #[tokio::test]
    async fn test_audio_does_not_cancel_pending_play() {
        let h = harness(
            FakeEngine::new(EngineBehavior::Hang),
            ScriptedPlayerPort::new(true, true),
            Duration::from_secs(10),
        );

        let play = {
            let narrator = h.narrator.clone();
            tokio::spawn(async move { narrator.play(hero("Welcome to the hero section")).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let download = {
            let narrator = h.narrator.clone();
            tokio::spawn(async move {
                narrator
                    .audio(NarrationRequest::for_section(
                        "Some other about text",
                        Section::About,
                    ))
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(!play.is_finished());
        download.abort();

        h.narrator.stop();
        let played = tokio::time::timeout(Duration::from_secs(1), play)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(played.outcome, PlaybackOutcome::Stopped);
    }

    #[tokio::test]
    async fn test_retry_targets_last_play_not_last_audio() {
        let h = harness(
            FakeEngine::new(EngineBehavior::Audio(wav_bytes())),
            ScriptedPlayerPort::new(true, true),
            Duration::from_secs(10),
        );

        h.narrator.play(hero("Welcome")).await.unwrap();
        h.narrator
            .audio(NarrationRequest::for_section("About me", Section::About))
            .await
            .unwrap();
        assert_eq!(h.engine.calls(), 2);

        h.narrator.retry().await;

        let about = h
            .narrator
            .audio(NarrationRequest::for_section("About me", Section::About))
            .await
            .unwrap();
        assert_eq!(about.strategy, Strategy::Cached);

        h.narrator.play(hero("Welcome")).await.unwrap();
        assert_eq!(h.engine.calls(), 3);
    }

    #[tokio::test]
    async fn test_audio_returns_resource_without_playing() {
        let h = harness(
            FakeEngine::new(EngineBehavior::Audio(wav_bytes())),
            ScriptedPlayerPort::new(true, true),
            Duration::from_secs(10),
        );

        let synthesized = h.narrator.audio(hero("Welcome")).await.unwrap();

        assert_eq!(synthesized.strategy, Strategy::RemoteSynthesis);
        assert_eq!(h.port.loaded(), 0);
    }
}
