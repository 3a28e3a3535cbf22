//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// 语音合成引擎配置
    #[serde(default)]
    pub speech: SpeechConfig,

    /// 旁白缓存与播放配置
    #[serde(default)]
    pub narration: NarrationConfig,

    /// 兜底音频配置
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// 界面提示音配置
    #[serde(default)]
    pub sounds: SoundsConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 请求体大小上限（字节）
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    /// 静态文件服务配置
    #[serde(default)]
    pub static_files: StaticFilesConfig,
}

/// 静态文件服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    #[serde(default)]
    pub enabled: bool,

    /// 前端构建产物目录
    #[serde(default = "default_static_dir")]
    pub dir: PathBuf,
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("dist")
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
            static_files: StaticFilesConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 语音合成引擎
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechEngineKind {
    /// ElevenLabs 远程合成
    #[default]
    ElevenLabs,
    /// 固定返回本地音频文件（离线 / 演示）
    Fixed,
}

/// 语音合成配置
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    #[serde(default)]
    pub engine: SpeechEngineKind,

    /// ElevenLabs API key（sk_ 开头）
    #[serde(default)]
    pub api_key: Option<String>,

    /// 默认 voice id
    #[serde(default)]
    pub voice_id: Option<String>,

    #[serde(default = "default_speech_base_url")]
    pub base_url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_speech_timeout")]
    pub timeout_secs: u64,

    /// `fixed` 引擎返回的音频文件
    #[serde(default = "default_fixed_audio_path")]
    pub fixed_audio_path: PathBuf,

    /// `fixed` 引擎模拟的延迟（毫秒）
    #[serde(default = "default_fixed_latency")]
    pub fixed_latency_ms: u64,
}

fn default_speech_base_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_speech_timeout() -> u64 {
    30
}

fn default_fixed_audio_path() -> PathBuf {
    PathBuf::from("public/voice-intro.mp3")
}

fn default_fixed_latency() -> u64 {
    200
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            engine: SpeechEngineKind::default(),
            api_key: None,
            voice_id: None,
            base_url: default_speech_base_url(),
            timeout_secs: default_speech_timeout(),
            fixed_audio_path: default_fixed_audio_path(),
            fixed_latency_ms: default_fixed_latency(),
        }
    }
}

impl SpeechConfig {
    /// 日志中显示的 API key
    pub fn masked_api_key(&self) -> String {
        match self.api_key.as_deref().map(str::trim) {
            None | Some("") => "<unset>".to_string(),
            Some(key) if key.chars().count() <= 8 => "****".to_string(),
            Some(key) => {
                let head: String = key.chars().take(3).collect();
                let tail: String = key.chars().skip(key.chars().count() - 4).collect();
                format!("{}****{}", head, tail)
            }
        }
    }
}

/// 旁白配置
#[derive(Debug, Clone, Deserialize)]
pub struct NarrationConfig {
    /// 缓存条目存活时间（秒）
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// 单次解码校验超时（毫秒）
    #[serde(default = "default_validation_timeout")]
    pub validation_timeout_ms: u64,

    /// 播放器加载超时（毫秒）
    #[serde(default = "default_load_timeout")]
    pub load_timeout_ms: u64,

    /// 是否把缓存写入 sled
    #[serde(default = "default_true")]
    pub persist_cache: bool,
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_validation_timeout() -> u64 {
    5000
}

fn default_load_timeout() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            validation_timeout_ms: default_validation_timeout(),
            load_timeout_ms: default_load_timeout(),
            persist_cache: true,
        }
    }
}

/// 兜底音频配置
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackConfig {
    /// 兜底音频所在目录，请求中的路径相对此目录解析
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// 内置兜底文件，按顺序尝试
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,

    /// 通知音时长（秒），限制在 1..=3
    #[serde(default = "default_synthetic_duration")]
    pub synthetic_duration_secs: f32,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_candidates() -> Vec<String> {
    crate::infrastructure::adapters::DEFAULT_FALLBACK_ASSETS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_synthetic_duration() -> f32 {
    2.0
}

fn default_sample_rate() -> u32 {
    44100
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            candidates: default_candidates(),
            synthetic_duration_secs: default_synthetic_duration(),
            sample_rate: default_sample_rate(),
        }
    }
}

/// 提示音配置
#[derive(Debug, Clone, Deserialize)]
pub struct SoundsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 主音量 0.0..=1.0
    #[serde(default = "default_volume")]
    pub volume: f32,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_volume() -> f32 {
    0.3
}

impl Default for SoundsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: default_volume(),
            sample_rate: default_sample_rate(),
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// 启动时导入的内容种子文件（JSON）
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

fn default_db_path() -> String {
    "data/folio.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
            seed_path: None,
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// sled 语音缓存目录
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// sled 缓存容量上限（字节）
    #[serde(default = "default_cache_max_bytes")]
    pub cache_max_bytes: u64,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("data/speech.sled")
}

fn default_cache_max_bytes() -> u64 {
    256 * 1024 * 1024 // 256 MB
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            cache_max_bytes: default_cache_max_bytes(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别（`RUST_LOG` 优先）
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.addr(), "0.0.0.0:8080");
        assert_eq!(config.speech.engine, SpeechEngineKind::ElevenLabs);
        assert_eq!(config.narration.cache_ttl_secs, 300);
        assert_eq!(config.fallback.candidates.len(), 3);
        assert!((config.sounds.volume - 0.3).abs() < f32::EPSILON);
        assert_eq!(
            config.database.database_url(),
            "sqlite:data/folio.db?mode=rwc"
        );
    }

    #[test]
    fn test_masked_api_key() {
        let mut speech = SpeechConfig::default();
        assert_eq!(speech.masked_api_key(), "<unset>");

        speech.api_key = Some("sk_0123456789abcdef0123456789abcd".to_string());
        assert_eq!(speech.masked_api_key(), "sk_****abcd");

        speech.api_key = Some("short".to_string());
        assert_eq!(speech.masked_api_key(), "****");
    }
}
