//! Headless Tone Output - 无音频设备时的提示音工厂

use std::sync::Arc;

use crate::application::ports::{ToneOutputError, ToneOutputFactory, ToneOutputPort};

/// 总是报告没有输出设备；提示音因此静默降级
#[derive(Debug, Clone, Default)]
pub struct HeadlessToneFactory;

impl ToneOutputFactory for HeadlessToneFactory {
    fn open(&self) -> Result<Arc<dyn ToneOutputPort>, ToneOutputError> {
        Err(ToneOutputError::DeviceUnavailable(
            "no audio output configured".to_string(),
        ))
    }
}
