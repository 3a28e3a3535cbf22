//! ElevenLabs Client - 调用 ElevenLabs 文本转语音 API
//!
//! 实现 SpeechEnginePort trait
//!
//! POST {base_url}/v1/text-to-speech/{voice_id}
//! Headers: Accept: audio/mpeg, xi-api-key: sk_...
//! Request: {"text": "...", "model_id": "...", "voice_settings": {...}}  (JSON)
//! Response: audio/mpeg binary

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{SpeechEnginePort, SynthesisError, SynthesizedAudio};
use crate::domain::audio::AudioFormat;
use crate::domain::narration::{NarrationText, VoiceProfile, VoiceSettings};

/// 小于该字节数的响应视为损坏
const MIN_AUDIO_BYTES: usize = 1024;

/// 合成请求体 (JSON)
#[derive(Debug, Serialize)]
struct SpeechHttpRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: &'a VoiceSettings,
}

/// ElevenLabs 客户端配置
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    /// API 基础 URL
    pub base_url: String,
    pub api_key: Option<String>,
    /// 默认声音 ID
    pub voice_id: Option<String>,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.elevenlabs.io".to_string(),
            api_key: None,
            voice_id: None,
            timeout_secs: 30,
        }
    }
}

impl ElevenLabsConfig {
    pub fn new(api_key: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            voice_id: Some(voice_id.into()),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

fn check_api_key(key: Option<&str>) -> Result<&str, SynthesisError> {
    let key = key.map(str::trim).filter(|k| !k.is_empty()).ok_or_else(|| {
        SynthesisError::Config("ElevenLabs API key is not configured".to_string())
    })?;
    if !key.starts_with("sk_") || key.len() < 30 {
        return Err(SynthesisError::Config(
            "Invalid ElevenLabs API key format. Should start with \"sk_\" and be at least 30 characters."
                .to_string(),
        ));
    }
    Ok(key)
}

fn check_voice_id(voice_id: Option<&str>) -> Result<&str, SynthesisError> {
    let voice_id = voice_id
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SynthesisError::Config("ElevenLabs voice id is not configured".to_string()))?;
    let valid = (15..=25).contains(&voice_id.len())
        && voice_id.chars().all(|c| c.is_ascii_alphanumeric());
    if !valid {
        return Err(SynthesisError::Config(format!(
            "Invalid voice id format: {}",
            voice_id
        )));
    }
    Ok(voice_id)
}

/// 从错误响应中提取 `detail.message` 或 `detail`
fn error_detail(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| match json.get("detail")? {
            serde_json::Value::Object(detail) => detail
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .or_else(|| Some(serde_json::Value::Object(detail.clone()).to_string())),
            serde_json::Value::String(detail) => Some(detail.clone()),
            other => Some(other.to_string()),
        });

    match detail {
        Some(detail) => detail,
        None if body.trim().is_empty() => status.to_string(),
        None => body.trim().to_string(),
    }
}

fn classify_status(status: StatusCode, detail: String) -> SynthesisError {
    match status.as_u16() {
        401 => SynthesisError::Auth(detail),
        429 => SynthesisError::RateLimit(detail),
        code if code >= 500 => SynthesisError::Service { status: code, detail },
        code => SynthesisError::Api { status: code, detail },
    }
}

/// ElevenLabs TTS 客户端
pub struct ElevenLabsClient {
    client: Client,
    config: ElevenLabsConfig,
}

impl ElevenLabsClient {
    /// 创建新的客户端
    pub fn new(config: ElevenLabsConfig) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 请求音色优先，其次配置的默认音色
    fn voice_id<'a>(&'a self, voice: &'a VoiceProfile) -> Result<&'a str, SynthesisError> {
        check_voice_id(
            voice
                .voice_id
                .as_deref()
                .or(self.config.voice_id.as_deref()),
        )
    }

    /// 获取合成 URL
    fn speech_url(&self, voice_id: &str) -> String {
        format!(
            "{}/v1/text-to-speech/{}",
            self.config.base_url.trim_end_matches('/'),
            voice_id
        )
    }
}

#[async_trait]
impl SpeechEnginePort for ElevenLabsClient {
    fn name(&self) -> &str {
        "elevenlabs"
    }

    fn check_credentials(&self, voice: &VoiceProfile) -> Result<(), SynthesisError> {
        check_api_key(self.config.api_key.as_deref())?;
        self.voice_id(voice)?;
        Ok(())
    }

    async fn synthesize(
        &self,
        text: &NarrationText,
        voice: &VoiceProfile,
    ) -> Result<SynthesizedAudio, SynthesisError> {
        let api_key = check_api_key(self.config.api_key.as_deref())?;
        let voice_id = self.voice_id(voice)?;

        let url = self.speech_url(voice_id);
        let body = SpeechHttpRequest {
            text: text.as_str(),
            model_id: &voice.model_id,
            voice_settings: &voice.settings,
        };

        tracing::debug!(
            url = %url,
            text_len = text.char_count(),
            model_id = %voice.model_id,
            "Sending speech synthesis request"
        );

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "audio/mpeg")
            .header("xi-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SynthesisError::Timeout(format!("speech request exceeded {}s", self.config.timeout_secs))
                } else if e.is_connect() {
                    SynthesisError::Network(format!("Cannot connect to speech service: {}", e))
                } else {
                    SynthesisError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let error = classify_status(status, error_detail(status, &error_text));
            tracing::warn!(status = status.as_u16(), error = %error, "Speech API returned an error");
            return Err(error);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.contains("audio") {
            return Err(SynthesisError::Format(format!(
                "expected audio, got: {}",
                if content_type.is_empty() { "no content type" } else { content_type.as_str() }
            )));
        }

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Network(format!("Failed to read audio: {}", e)))?
            .to_vec();

        if audio_data.is_empty() {
            return Err(SynthesisError::Corrupt("empty audio file returned".to_string()));
        }
        if audio_data.len() < MIN_AUDIO_BYTES {
            return Err(SynthesisError::Corrupt(format!(
                "audio file too small ({} bytes)",
                audio_data.len()
            )));
        }

        tracing::info!(
            voice_id = %voice_id,
            audio_size = audio_data.len(),
            content_type = %content_type,
            "Speech synthesis completed"
        );

        Ok(SynthesizedAudio {
            format: AudioFormat::from_mime(&content_type).or(Some(AudioFormat::Mp3)),
            audio_data,
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode as HttpStatus};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};

    const KEY: &str = "sk_0123456789abcdef0123456789abcdef";
    const VOICE: &str = "21m00Tcm4TlvDq8ikWAM";

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: &str) -> ElevenLabsClient {
        ElevenLabsClient::new(ElevenLabsConfig::new(KEY, VOICE).with_base_url(base_url)).unwrap()
    }

    fn text(s: &str) -> NarrationText {
        NarrationText::new(s).unwrap()
    }

    fn respond_with(status: HttpStatus, content_type: &'static str, body: Vec<u8>) -> Router {
        Router::new().route(
            "/v1/text-to-speech/:voice_id",
            post(move || {
                let body = body.clone();
                async move { (status, [(axum::http::header::CONTENT_TYPE, content_type)], body) }
            }),
        )
    }

    #[test]
    fn test_config_default() {
        let config = ElevenLabsConfig::default();
        assert_eq!(config.base_url, "https://api.elevenlabs.io");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_credentials_validation() {
        let check = |key: Option<&str>, voice: Option<&str>| {
            let config = ElevenLabsConfig {
                api_key: key.map(str::to_string),
                voice_id: voice.map(str::to_string),
                ..Default::default()
            };
            ElevenLabsClient::new(config)
                .unwrap()
                .check_credentials(&VoiceProfile::default())
        };

        assert!(check(Some(KEY), Some(VOICE)).is_ok());
        assert!(matches!(check(None, Some(VOICE)), Err(SynthesisError::Config(_))));
        assert!(matches!(check(Some("sk_short"), Some(VOICE)), Err(SynthesisError::Config(_))));
        assert!(matches!(
            check(Some("pk_0123456789abcdef0123456789abcdef"), Some(VOICE)),
            Err(SynthesisError::Config(_))
        ));
        assert!(matches!(check(Some(KEY), Some("short")), Err(SynthesisError::Config(_))));
        assert!(matches!(
            check(Some(KEY), Some("21m00Tcm4-lvDq8ikWAM")),
            Err(SynthesisError::Config(_))
        ));
    }

    #[test]
    fn test_request_voice_satisfies_credentials_without_default() {
        let client = ElevenLabsClient::new(ElevenLabsConfig {
            api_key: Some(KEY.to_string()),
            voice_id: None,
            ..Default::default()
        })
        .unwrap();

        assert!(matches!(
            client.check_credentials(&VoiceProfile::default()),
            Err(SynthesisError::Config(_))
        ));
        assert!(client
            .check_credentials(&VoiceProfile::default().with_voice_id(VOICE))
            .is_ok());
        assert!(matches!(
            client.check_credentials(&VoiceProfile::default().with_voice_id("short")),
            Err(SynthesisError::Config(_))
        ));
    }

    #[test]
    fn test_error_detail_extraction() {
        let status = StatusCode::UNAUTHORIZED;
        assert_eq!(
            error_detail(status, r#"{"detail":{"status":"invalid_api_key","message":"Invalid API key"}}"#),
            "Invalid API key"
        );
        assert_eq!(error_detail(status, r#"{"detail":"quota exceeded"}"#), "quota exceeded");
        assert_eq!(error_detail(status, "plain failure"), "plain failure");
        assert_eq!(error_detail(status, ""), "401 Unauthorized");
    }

    #[tokio::test]
    async fn test_synthesize_sends_request_and_returns_audio() {
        let router = Router::new().route(
            "/v1/text-to-speech/:voice_id",
            post(
                |Path(voice_id): Path<String>,
                 headers: HeaderMap,
                 Json(body): Json<serde_json::Value>| async move {
                    let ok = voice_id == VOICE
                        && headers.get("xi-api-key").and_then(|v| v.to_str().ok()) == Some(KEY)
                        && headers.get("accept").and_then(|v| v.to_str().ok()) == Some("audio/mpeg")
                        && body["text"] == "Hello world"
                        && body["model_id"] == "eleven_turbo_v2_5"
                        && body["voice_settings"]["stability"].is_number();
                    if ok {
                        (HttpStatus::OK, [(axum::http::header::CONTENT_TYPE, "audio/mpeg")], vec![7u8; 2048])
                            .into_response()
                    } else {
                        (HttpStatus::BAD_REQUEST, "unexpected request").into_response()
                    }
                },
            ),
        );
        let base_url = spawn_server(router).await;

        let audio = client(&base_url)
            .synthesize(&text("  Hello world  "), &VoiceProfile::default())
            .await
            .unwrap();

        assert_eq!(audio.audio_data.len(), 2048);
        assert_eq!(audio.format, Some(AudioFormat::Mp3));
        assert_eq!(audio.content_type, "audio/mpeg");
    }

    #[tokio::test]
    async fn test_status_classification() {
        let cases = [
            (HttpStatus::UNAUTHORIZED, r#"{"detail":{"message":"bad key"}}"#),
            (HttpStatus::TOO_MANY_REQUESTS, r#"{"detail":"slow down"}"#),
            (HttpStatus::SERVICE_UNAVAILABLE, "down"),
            (HttpStatus::UNPROCESSABLE_ENTITY, r#"{"detail":"bad text"}"#),
        ];

        let mut errors = Vec::new();
        for (status, body) in cases {
            let base_url =
                spawn_server(respond_with(status, "application/json", body.as_bytes().to_vec())).await;
            errors.push(
                client(&base_url)
                    .synthesize(&text("Hello"), &VoiceProfile::default())
                    .await
                    .unwrap_err(),
            );
        }

        assert!(matches!(&errors[0], SynthesisError::Auth(d) if d == "bad key"));
        assert!(matches!(&errors[1], SynthesisError::RateLimit(d) if d == "slow down"));
        assert!(matches!(&errors[2], SynthesisError::Service { status: 503, .. }));
        assert!(matches!(&errors[3], SynthesisError::Api { status: 422, detail } if detail == "bad text"));
    }

    #[tokio::test]
    async fn test_non_audio_response_is_format_error() {
        let base_url = spawn_server(respond_with(
            HttpStatus::OK,
            "application/json",
            vec![b'x'; 4096],
        ))
        .await;

        let result = client(&base_url)
            .synthesize(&text("Hello"), &VoiceProfile::default())
            .await;
        assert!(matches!(result, Err(SynthesisError::Format(_))));
    }

    #[tokio::test]
    async fn test_tiny_audio_is_corrupt() {
        let base_url =
            spawn_server(respond_with(HttpStatus::OK, "audio/mpeg", vec![0u8; 100])).await;

        let result = client(&base_url)
            .synthesize(&text("Hello"), &VoiceProfile::default())
            .await;
        assert!(matches!(result, Err(SynthesisError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_invalid_voice_override_is_config_error() {
        let base_url =
            spawn_server(respond_with(HttpStatus::OK, "audio/mpeg", vec![0u8; 2048])).await;

        let voice = VoiceProfile::default().with_voice_id("not a voice");
        let result = client(&base_url).synthesize(&text("Hello"), &voice).await;
        assert!(matches!(result, Err(SynthesisError::Config(_))));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = client(&format!("http://{}", addr))
            .synthesize(&text("Hello"), &VoiceProfile::default())
            .await;
        assert!(matches!(result, Err(SynthesisError::Network(_))));
    }
}
