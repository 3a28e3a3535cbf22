//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::narration::{FailureKind, NarratorError};
use crate::application::ports::RepositoryError;
use crate::domain::audio::ToneError;
use crate::domain::content::ContentError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 语音服务配置错误
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// 所有音频来源都不可用
    #[error("Audio unavailable: {0}")]
    Unavailable(String),

    /// 播放失败
    #[error("Playback error: {0}")]
    PlaybackError(String),

    /// 超时
    #[error("Timed out: {0}")]
    Timeout(String),

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => Self::not_found("Entity", id),
            other => Self::RepositoryError(other.to_string()),
        }
    }
}

impl From<NarratorError> for ApplicationError {
    fn from(err: NarratorError) -> Self {
        let message = err.to_string();
        match err.kind() {
            FailureKind::Input => Self::ValidationError(message),
            FailureKind::Configuration => Self::ConfigurationError(message),
            FailureKind::Unavailable => Self::Unavailable(message),
            FailureKind::Playback => Self::PlaybackError(message),
            FailureKind::Timeout => Self::Timeout(message),
        }
    }
}

impl From<ContentError> for ApplicationError {
    fn from(err: ContentError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<ToneError> for ApplicationError {
    fn from(err: ToneError) -> Self {
        Self::InternalError(err.to_string())
    }
}
