//! Symphonia Validator - 解码校验实现
//!
//! 实现 AudioValidatorPort trait

use async_trait::async_trait;
use std::time::Duration;

use crate::application::ports::{AudioProbe, AudioValidatorPort, ValidationError};
use crate::domain::audio::AudioResource;

use super::decoder::probe_source;

/// 基于 symphonia 的解码校验器
pub struct SymphoniaValidator {
    timeout: Duration,
}

impl SymphoniaValidator {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SymphoniaValidator {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[async_trait]
impl AudioValidatorPort for SymphoniaValidator {
    async fn validate(&self, resource: &AudioResource) -> Result<AudioProbe, ValidationError> {
        let handle = resource.handle().ok_or(ValidationError::Released)?;
        let format = resource.format();
        let fallback_duration = resource.duration_hint();

        let task = tokio::task::spawn_blocking(move || probe_source(&handle, format, false));
        let probed = match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => return Err(ValidationError::Undecodable(format!("Probe task failed: {}", e))),
            Err(_) => {
                let millis = self.timeout.as_millis() as u64;
                tracing::warn!(resource_id = %resource.id(), timeout_ms = millis, "Audio validation timed out");
                return Err(ValidationError::Timeout(millis));
            }
        };

        if !probed.is_playable() {
            return Err(ValidationError::Undecodable(
                "no packet could be decoded and duration is unknown".to_string(),
            ));
        }

        tracing::debug!(
            resource_id = %resource.id(),
            origin = %resource.origin(),
            duration_secs = ?probed.duration_secs,
            "Audio validated"
        );

        Ok(AudioProbe {
            duration_secs: probed.duration_secs.or(fallback_duration),
            sample_rate: probed.sample_rate,
            channels: probed.channels,
        })
    }
}
