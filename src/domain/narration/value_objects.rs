//! Narration Context - Value Objects

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::NarrationError;

/// 单次合成允许的最大字符数
pub const MAX_NARRATION_CHARS: usize = 5000;

/// 默认合成模型
pub const DEFAULT_MODEL_ID: &str = "eleven_turbo_v2_5";

/// 旁白文本
///
/// 不变量:
/// - 去除首尾空白后非空
/// - 字符数不超过 5000
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationText(String);

impl NarrationText {
    pub fn new(text: &str) -> Result<Self, NarrationError> {
        let count = text.chars().count();
        if count > MAX_NARRATION_CHARS {
            return Err(NarrationError::TextTooLong {
                len: count,
                max: MAX_NARRATION_CHARS,
            });
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(NarrationError::EmptyText);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

/// 合成语音参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_speaker_boost: Option<bool>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.8,
            style: Some(0.5),
            use_speaker_boost: Some(true),
        }
    }
}

impl VoiceSettings {
    pub fn new(stability: f32, similarity_boost: f32, style: f32) -> Self {
        Self {
            stability,
            similarity_boost,
            style: Some(style),
            use_speaker_boost: Some(true),
        }
    }

    pub fn validate(&self) -> Result<(), NarrationError> {
        let in_unit = |v: f32| (0.0..=1.0).contains(&v);
        if !in_unit(self.stability) || !in_unit(self.similarity_boost) {
            return Err(NarrationError::InvalidVoiceSettings(
                "stability and similarity_boost must be within 0.0..=1.0".to_string(),
            ));
        }
        if let Some(style) = self.style {
            if !in_unit(style) {
                return Err(NarrationError::InvalidVoiceSettings(
                    "style must be within 0.0..=1.0".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// 音色配置：声音 + 模型 + 参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// 覆盖全局配置的声音 ID
    #[serde(default)]
    pub voice_id: Option<String>,
    pub model_id: String,
    pub settings: VoiceSettings,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            voice_id: None,
            model_id: DEFAULT_MODEL_ID.to_string(),
            settings: VoiceSettings::default(),
        }
    }
}

impl VoiceProfile {
    pub fn with_voice_id(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = Some(voice_id.into());
        self
    }

    /// 参与缓存 key 计算的稳定描述
    fn fingerprint(&self) -> String {
        format!(
            "{}|{}|{:.3}|{:.3}|{:?}|{:?}",
            self.voice_id.as_deref().unwrap_or("default"),
            self.model_id,
            self.settings.stability,
            self.settings.similarity_boost,
            self.settings.style,
            self.settings.use_speaker_boost,
        )
    }
}

/// 作品集页面分区
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Hero,
    About,
    Skills,
    Experience,
    Projects,
    Contact,
}

impl Section {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::About => "about",
            Self::Skills => "skills",
            Self::Experience => "experience",
            Self::Projects => "projects",
            Self::Contact => "contact",
        }
    }

    /// 分区对应的朗读风格
    pub fn voice_profile(&self) -> VoiceProfile {
        let settings = match self {
            Self::Hero => VoiceSettings::new(0.7, 0.9, 0.6),
            Self::About => VoiceSettings::new(0.8, 0.9, 0.4),
            Self::Skills => VoiceSettings::new(0.7, 0.9, 0.5),
            Self::Projects => VoiceSettings::new(0.7, 0.9, 0.5),
            Self::Contact => VoiceSettings::new(0.8, 0.9, 0.3),
            Self::Experience => VoiceSettings::new(0.8, 0.9, 0.4),
        };
        VoiceProfile {
            voice_id: None,
            model_id: DEFAULT_MODEL_ID.to_string(),
            settings,
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 旁白请求
///
/// 每次播放尝试构造一次，不持久化。
#[derive(Debug, Clone)]
pub struct NarrationRequest {
    pub text: String,
    pub voice: VoiceProfile,
    /// 调用方指定的兜底音频（优先于内置兜底）
    pub fallback_asset: Option<PathBuf>,
}

impl NarrationRequest {
    pub fn new(text: impl Into<String>, voice: VoiceProfile) -> Self {
        Self {
            text: text.into(),
            voice,
            fallback_asset: None,
        }
    }

    pub fn for_section(text: impl Into<String>, section: Section) -> Self {
        Self::new(text, section.voice_profile())
    }

    pub fn with_fallback_asset(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback_asset = Some(path.into());
        self
    }
}

/// 生成缓存 key
///
/// md5(完整文本 + 音色描述)，形如 `voice_<32 位十六进制>`。
pub fn narration_cache_key(text: &NarrationText, voice: &VoiceProfile) -> String {
    let mut material = String::with_capacity(text.as_str().len() + 64);
    material.push_str(text.as_str());
    material.push('\u{1f}');
    material.push_str(&voice.fingerprint());
    format!("voice_{:x}", md5::compute(material.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narration_text_bounds() {
        assert_eq!(NarrationText::new(""), Err(NarrationError::EmptyText));
        assert_eq!(NarrationText::new("   \n"), Err(NarrationError::EmptyText));
        assert!(NarrationText::new(&"a".repeat(MAX_NARRATION_CHARS)).is_ok());
        assert_eq!(
            NarrationText::new(&"a".repeat(MAX_NARRATION_CHARS + 1)),
            Err(NarrationError::TextTooLong {
                len: MAX_NARRATION_CHARS + 1,
                max: MAX_NARRATION_CHARS
            })
        );
    }

    #[test]
    fn test_narration_text_counts_chars_not_bytes() {
        // 5000 个多字节字符仍然合法
        let text = "语".repeat(MAX_NARRATION_CHARS);
        let parsed = NarrationText::new(&text).unwrap();
        assert_eq!(parsed.char_count(), MAX_NARRATION_CHARS);
    }

    #[test]
    fn test_narration_text_is_trimmed() {
        let text = NarrationText::new("  hello  ").unwrap();
        assert_eq!(text.as_str(), "hello");
    }

    #[test]
    fn test_cache_key_uses_full_text() {
        let voice = VoiceProfile::default();
        let prefix = "x".repeat(60);
        let a = NarrationText::new(&format!("{}A", prefix)).unwrap();
        let b = NarrationText::new(&format!("{}B", prefix)).unwrap();

        let key_a = narration_cache_key(&a, &voice);
        let key_b = narration_cache_key(&b, &voice);
        assert_ne!(key_a, key_b);
        assert_eq!(key_a, narration_cache_key(&a, &voice));
        assert_eq!(key_a.len(), "voice_".len() + 32);
        assert!(key_a.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[test]
    fn test_cache_key_depends_on_voice() {
        let text = NarrationText::new("Welcome to my portfolio").unwrap();
        let hero = narration_cache_key(&text, &Section::Hero.voice_profile());
        let contact = narration_cache_key(&text, &Section::Contact.voice_profile());
        assert_ne!(hero, contact);
    }

    #[test]
    fn test_voice_settings_validation() {
        assert!(VoiceSettings::default().validate().is_ok());
        assert!(VoiceSettings::new(1.5, 0.5, 0.5).validate().is_err());
        assert!(VoiceSettings::new(0.5, 0.5, -0.1).validate().is_err());
    }
}
