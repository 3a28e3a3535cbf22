//! Content Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ContentError {
    #[error("无效字段 {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}
