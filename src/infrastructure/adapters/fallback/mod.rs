//! Fallback Adapter - 兜底音频提供者

mod asset_provider;
mod synthetic_provider;

pub use asset_provider::{AssetFallbackProvider, DEFAULT_FALLBACK_ASSETS};
pub use synthetic_provider::SyntheticToneProvider;
