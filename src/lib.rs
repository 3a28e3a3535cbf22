//! Folio - 作品集站点后端
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Audio: 音频格式、资源生命周期、WAV 编码、程序化提示音
//! - Narration: 旁白文本、音色参数、缓存键
//! - Content: 项目、技能、经历、联系表单
//!
//! 应用层 (application/):
//! - Ports: SpeechEngine, AudioValidator, FallbackProvider, MediaPlayer, SpeechStore, Repositories
//! - Narration: 合成客户端、语音缓存、播放控制器、旁白门面
//! - SoundBank: 界面提示音
//! - Commands / Queries: CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + 静态前端托管
//! - Adapters: ElevenLabs 客户端、symphonia 校验、兜底音频、播放器
//! - Persistence: SQLite（内容）+ Sled（语音缓存）

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
