//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_validator;
mod fallback_provider;
mod media_player;
mod repositories;
mod speech_engine;
mod speech_store;
mod tone_output;

pub use audio_validator::{AudioProbe, AudioValidatorPort, ValidationError};
pub use fallback_provider::{FallbackProvider, Strategy};
pub use media_player::{LoadedPlayer, MediaPlayerPort, PlaybackError, PlayerEvent, PlayerInstance};
pub use repositories::{
    ContactRecord, ContactRepositoryPort, PortfolioRepositoryPort, ProjectFilter,
    RepositoryError, VisitCount, VisitCounterPort,
};
pub use speech_engine::{SpeechEnginePort, SynthesisError, SynthesizedAudio};
pub use speech_store::{CacheError, SpeechStorePort, StoreStats, StoredSource, StoredSpeech};
pub use tone_output::{ToneOutputError, ToneOutputFactory, ToneOutputPort};
