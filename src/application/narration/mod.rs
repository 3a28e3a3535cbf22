//! Narration Services - 旁白合成、缓存与播放

mod narrator;
mod playback_controller;
mod speech_cache;
mod synthesis_client;

#[cfg(test)]
pub(crate) mod test_support;

pub use narrator::{
    FailureKind, NarrationFailure, NarrationPlayback, NarrationStatus, Narrator, NarratorError,
};
pub use playback_controller::{PlaybackController, PlaybackOutcome, PlaybackStatus};
pub use speech_cache::{CacheStats, SpeechCache, SpeechCacheConfig};
pub use synthesis_client::{FallbackNotice, NoticeKind, SpeechSynthesisClient, Synthesized};
