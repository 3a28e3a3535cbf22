//! TTS Adapter - 语音合成引擎实现

mod elevenlabs_client;
mod fixed_speech_engine;

pub use elevenlabs_client::{ElevenLabsClient, ElevenLabsConfig};
pub use fixed_speech_engine::{FixedSpeechEngine, FixedSpeechEngineConfig};
