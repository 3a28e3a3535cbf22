//! Sled 持久化实现

mod speech_store;

pub use speech_store::{SledSpeechStore, SledStoreConfig};
