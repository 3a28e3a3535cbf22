//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SpeechEngine、AudioValidator、MediaPlayer、Repository 等）
//! - narration: 合成客户端、语音缓存、播放控制器和旁白门面
//! - sound_bank: 界面提示音
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod narration;
pub mod ports;
pub mod queries;
pub mod sound_bank;

// Re-exports
pub use commands::{
    // Narration commands
    PlayNarration,
    RetryNarration,
    StopNarration,
    SynthesizeNarration,
    // Sound commands
    PlaySound,
    UpdateSoundSettings,
    // Content commands
    RecordVisit,
    SubmitContact,
    // Handlers
    handlers::{
        NarrationAudio, PlayNarrationHandler, PlayNarrationResponse, PlaySoundHandler,
        RecordVisitHandler, RetryNarrationHandler, StopNarrationHandler, SubmitContactHandler,
        SynthesizeNarrationHandler, UpdateSoundSettingsHandler,
    },
};

pub use error::ApplicationError;

pub use narration::{
    CacheStats, FailureKind, FallbackNotice, NarrationFailure, NarrationPlayback, NarrationStatus,
    Narrator, NarratorError, NoticeKind, PlaybackController, PlaybackOutcome, PlaybackStatus,
    SpeechCache, SpeechCacheConfig, SpeechSynthesisClient, Synthesized,
};

pub use queries::{
    GetNarrationStatus,
    GetSoundWav,
    ListExperience,
    ListProjects,
    ListSkills,
    // Handlers
    handlers::{
        GetNarrationStatusHandler, GetSoundWavHandler, ListExperienceHandler,
        ListProjectsHandler, ListSkillsHandler,
    },
};

pub use sound_bank::{SoundBank, SoundBankConfig, SoundSettings};
