//! Speech Synthesis Client - 远程合成 + 有序兜底链
//!
//! 远程合成成功即返回；远程失败（凭据、网络、服务端、格式）被吸收，
//! 依次尝试兜底提供者。只有全部失败才向上返回 `Exhausted`。

use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::ports::{
    AudioValidatorPort, FallbackProvider, SpeechEnginePort, Strategy, SynthesisError,
    ValidationError,
};
use crate::domain::audio::{AudioOrigin, AudioResource, SourceHandle};
use crate::domain::narration::{NarrationRequest, NarrationText};

/// 兜底提示类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// 凭据缺失或格式错误
    Configuration,
    /// 远程服务临时失败
    Transient,
}

/// 使用兜底音频时附带的远程失败说明
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackNotice {
    pub kind: NoticeKind,
    pub message: String,
}

impl FallbackNotice {
    fn from_error(error: &SynthesisError) -> Self {
        let kind = match error {
            SynthesisError::Config(_) => NoticeKind::Configuration,
            _ => NoticeKind::Transient,
        };
        Self {
            kind,
            message: error.to_string(),
        }
    }
}

/// 合成结果
#[derive(Debug, Clone)]
pub struct Synthesized {
    pub resource: AudioResource,
    pub strategy: Strategy,
    /// 远程失败说明（使用兜底时）
    pub notice: Option<FallbackNotice>,
}

pub struct SpeechSynthesisClient {
    engine: Arc<dyn SpeechEnginePort>,
    validator: Arc<dyn AudioValidatorPort>,
    fallbacks: Vec<Arc<dyn FallbackProvider>>,
}

impl SpeechSynthesisClient {
    pub fn new(
        engine: Arc<dyn SpeechEnginePort>,
        validator: Arc<dyn AudioValidatorPort>,
        fallbacks: Vec<Arc<dyn FallbackProvider>>,
    ) -> Self {
        Self {
            engine,
            validator,
            fallbacks,
        }
    }

    /// 合成一段旁白
    ///
    /// 返回的资源都已通过解码校验。`cancel` 触发后立即中止远程请求并返回 `Cancelled`。
    pub async fn synthesize(
        &self,
        request: &NarrationRequest,
        cancel: &CancellationToken,
    ) -> Result<Synthesized, SynthesisError> {
        let text = NarrationText::new(&request.text)
            .map_err(|e| SynthesisError::Input(e.to_string()))?;
        request
            .voice
            .settings
            .validate()
            .map_err(|e| SynthesisError::Input(e.to_string()))?;

        if cancel.is_cancelled() {
            return Err(SynthesisError::Cancelled);
        }

        let remote_error = match self.synthesize_remote(&text, request, cancel).await {
            Ok(resource) => {
                info!(
                    engine = %self.engine.name(),
                    chars = text.char_count(),
                    resource_id = %resource.id(),
                    "Remote synthesis succeeded"
                );
                return Ok(Synthesized {
                    resource,
                    strategy: Strategy::RemoteSynthesis,
                    notice: None,
                });
            }
            Err(e) if !e.allows_fallback() => return Err(e),
            Err(e) => e,
        };

        warn!(
            engine = %self.engine.name(),
            error = %remote_error,
            "Remote synthesis unavailable, trying fallbacks"
        );

        for provider in &self.fallbacks {
            let resolved = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SynthesisError::Cancelled),
                resolved = provider.try_resolve(request) => resolved,
            };

            match resolved {
                Some(resource) => {
                    info!(
                        strategy = %provider.strategy(),
                        resource_id = %resource.id(),
                        "Fallback audio resolved"
                    );
                    return Ok(Synthesized {
                        resource,
                        strategy: provider.strategy(),
                        notice: Some(FallbackNotice::from_error(&remote_error)),
                    });
                }
                None => debug!(strategy = %provider.strategy(), "Fallback not available"),
            }
        }

        Err(SynthesisError::Exhausted(format!(
            "remote synthesis failed ({}) and no fallback audio could be played",
            remote_error
        )))
    }

    async fn synthesize_remote(
        &self,
        text: &NarrationText,
        request: &NarrationRequest,
        cancel: &CancellationToken,
    ) -> Result<AudioResource, SynthesisError> {
        self.engine.check_credentials(&request.voice)?;

        let audio = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SynthesisError::Cancelled),
            result = self.engine.synthesize(text, &request.voice) => result?,
        };

        let handle = SourceHandle::buffer(audio.audio_data);
        let candidate = AudioResource::new(handle.clone(), AudioOrigin::RemoteSynthesis, audio.format);

        match self.validator.validate(&candidate).await {
            Ok(probe) => Ok(AudioResource::with_duration_hint(
                handle,
                AudioOrigin::RemoteSynthesis,
                audio.format,
                probe.duration_secs,
            )),
            Err(e) => {
                candidate.release();
                Err(match e {
                    ValidationError::Timeout(ms) => {
                        SynthesisError::Timeout(format!("audio validation exceeded {}ms", ms))
                    }
                    other => SynthesisError::Corrupt(format!("generated audio is not playable: {}", other)),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::narration::test_support::*;
    use crate::domain::narration::{Section, VoiceProfile};
    use std::sync::atomic::Ordering;

    fn client(
        engine: Arc<FakeEngine>,
        validator: Arc<FakeValidator>,
        fallbacks: Vec<Arc<dyn FallbackProvider>>,
    ) -> SpeechSynthesisClient {
        SpeechSynthesisClient::new(engine, validator, fallbacks)
    }

    fn request(text: &str) -> NarrationRequest {
        NarrationRequest::for_section(text, Section::Hero)
    }

    #[tokio::test]
    async fn test_remote_success_returns_validated_resource() {
        let engine = Arc::new(FakeEngine::new(EngineBehavior::Audio(wav_bytes())));
        let validator = Arc::new(FakeValidator::default());
        let client = client(engine.clone(), validator.clone(), vec![]);

        let result = client
            .synthesize(&request("Hello there"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.strategy, Strategy::RemoteSynthesis);
        assert_eq!(result.resource.origin(), AudioOrigin::RemoteSynthesis);
        assert_eq!(result.resource.duration_hint(), Some(1.0));
        assert!(result.notice.is_none());
        assert_eq!(engine.calls(), 1);
        assert_eq!(validator.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_or_oversized_text_is_rejected_without_network() {
        let engine = Arc::new(FakeEngine::new(EngineBehavior::Audio(wav_bytes())));
        let synthetic = Arc::new(FixedProvider::new(
            Strategy::SyntheticTone,
            AudioOrigin::Synthetic,
            true,
        ));
        let client = client(
            engine.clone(),
            Arc::new(FakeValidator::default()),
            vec![synthetic.clone()],
        );

        let empty = client
            .synthesize(&request("   "), &CancellationToken::new())
            .await;
        assert!(matches!(empty, Err(SynthesisError::Input(_))));

        let oversized = client
            .synthesize(&request(&"a".repeat(5001)), &CancellationToken::new())
            .await;
        assert!(matches!(oversized, Err(SynthesisError::Input(_))));

        assert_eq!(engine.calls(), 0);
        assert_eq!(synthetic.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_auth_failure_falls_back_in_order() {
        let engine = Arc::new(FakeEngine::new(EngineBehavior::Fail(|| {
            SynthesisError::Auth("invalid api key".to_string())
        })));
        let custom = Arc::new(FixedProvider::new(
            Strategy::CustomFallback,
            AudioOrigin::LocalFallback,
            false,
        ));
        let defaults = Arc::new(FixedProvider::new(
            Strategy::DefaultFallback,
            AudioOrigin::LocalFallback,
            true,
        ));
        let synthetic = Arc::new(FixedProvider::new(
            Strategy::SyntheticTone,
            AudioOrigin::Synthetic,
            true,
        ));
        let client = client(
            engine,
            Arc::new(FakeValidator::default()),
            vec![custom.clone(), defaults.clone(), synthetic.clone()],
        );

        let result = client
            .synthesize(&request("Hello there"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.strategy, Strategy::DefaultFallback);
        assert_ne!(result.resource.origin(), AudioOrigin::RemoteSynthesis);
        assert_eq!(result.notice.unwrap().kind, NoticeKind::Transient);
        assert_eq!(custom.calls.load(Ordering::SeqCst), 1);
        assert_eq!(synthetic.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_credentials_skip_remote_tier() {
        let engine = Arc::new(
            FakeEngine::new(EngineBehavior::Audio(wav_bytes())).without_credentials(),
        );
        let synthetic = Arc::new(FixedProvider::new(
            Strategy::SyntheticTone,
            AudioOrigin::Synthetic,
            true,
        ));
        let client = client(
            engine.clone(),
            Arc::new(FakeValidator::default()),
            vec![synthetic],
        );

        let result = client
            .synthesize(&request("Hello there"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(engine.calls(), 0);
        assert_eq!(result.strategy, Strategy::SyntheticTone);
        assert_eq!(result.notice.unwrap().kind, NoticeKind::Configuration);
    }

    #[tokio::test]
    async fn test_undecodable_remote_audio_falls_through() {
        let engine = Arc::new(FakeEngine::new(EngineBehavior::Audio(wav_bytes())));
        let validator = Arc::new(FakeValidator::default());
        validator.reject_all(true);
        let client = client(engine, validator, vec![]);

        let result = client
            .synthesize(&request("Hello there"), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(SynthesisError::Exhausted(_))));
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_request() {
        let engine = Arc::new(FakeEngine::new(EngineBehavior::Hang));
        let client = Arc::new(client(
            engine,
            Arc::new(FakeValidator::default()),
            vec![],
        ));
        let cancel = CancellationToken::new();

        let task = {
            let client = client.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                client
                    .synthesize(
                        &NarrationRequest::new("Hello", VoiceProfile::default()),
                        &cancel,
                    )
                    .await
            })
        };

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        cancel.cancel();

        let result = tokio::time::timeout(std::time::Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(SynthesisError::Cancelled)));
    }
}
