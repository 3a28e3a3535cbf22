//! Configuration Loader
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml / config.local.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, SpeechEngineKind};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// # 环境变量示例
/// - `FOLIO_SERVER__PORT=3000`
/// - `FOLIO_SPEECH__API_KEY=sk_...`
/// - `FOLIO_SPEECH__VOICE_ID=21m00Tcm4TlvDq8ikWAM`
/// - `FOLIO_NARRATION__CACHE_TTL_SECS=600`
/// - `FOLIO_SOUNDS__ENABLED=false`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// `config_path` 为 None 时搜索工作目录下的默认文件
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 默认值由各配置结构体的 serde default 提供；
    // 这里只放环境变量需要覆盖的基础键
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 前缀 FOLIO_，层级分隔符 __；`fallback.candidates` 可用逗号分隔
    builder = builder.add_source(
        Environment::with_prefix("FOLIO")
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("fallback.candidates")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
///
/// 语音凭据不在此校验：缺失或格式错误时旁白降级到兜底音频
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.speech.engine == SpeechEngineKind::ElevenLabs && config.speech.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Speech base URL cannot be empty".to_string(),
        ));
    }

    if config.narration.cache_ttl_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Narration cache TTL cannot be 0".to_string(),
        ));
    }

    if config.narration.validation_timeout_ms == 0 || config.narration.load_timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Narration timeouts must be positive".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&config.sounds.volume) {
        return Err(ConfigError::ValidationError(format!(
            "Sound volume must be within 0.0..=1.0, got {}",
            config.sounds.volume
        )));
    }

    if config.fallback.sample_rate == 0 || config.sounds.sample_rate == 0 {
        return Err(ConfigError::ValidationError(
            "Sample rate cannot be 0".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（API key 打码）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    if config.server.static_files.enabled {
        tracing::info!("Static Files: {:?}", config.server.static_files.dir);
    }
    tracing::info!("Speech Engine: {:?}", config.speech.engine);
    tracing::info!("Speech API Key: {}", config.speech.masked_api_key());
    tracing::info!(
        "Speech Voice ID: {}",
        config.speech.voice_id.as_deref().unwrap_or("<unset>")
    );
    tracing::info!("Speech Base URL: {}", config.speech.base_url);
    tracing::info!("Narration Cache TTL: {}s", config.narration.cache_ttl_secs);
    tracing::info!("Narration Cache Persisted: {}", config.narration.persist_cache);
    tracing::info!("Fallback Assets: {:?}", config.fallback.assets_dir);
    tracing::info!(
        "Sounds: enabled={} volume={}",
        config.sounds.enabled,
        config.sounds.volume
    );
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Speech Cache: {:?}", config.storage.cache_dir);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_passes_for_default_config() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.sounds.volume = 1.5;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.narration.cache_ttl_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_missing_credentials_are_not_fatal() {
        let config = AppConfig::default();
        assert!(config.speech.api_key.is_none());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 3000

[speech]
engine = "fixed"
fixed_audio_path = "assets/intro.mp3"

[narration]
cache_ttl_secs = 60

[fallback]
candidates = ["a.mp3", "b.mp3"]

[sounds]
volume = 0.5
"#,
        )
        .unwrap();

        let config = load_config_from_path(Some(&path)).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.speech.engine, SpeechEngineKind::Fixed);
        assert_eq!(config.narration.cache_ttl_secs, 60);
        assert_eq!(config.narration.load_timeout_ms, 10_000);
        assert_eq!(config.fallback.candidates, vec!["a.mp3", "b.mp3"]);
        assert!((config.sounds.volume - 0.5).abs() < f32::EPSILON);
    }
}
