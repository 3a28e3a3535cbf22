//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::domain::narration::Section;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(Empty {}),
        }
    }
}

// ============================================================================
// Narration DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PlayNarrationRequest {
    pub text: String,
    #[serde(default)]
    pub section: Option<Section>,
    #[serde(default)]
    pub voice_id: Option<String>,
    /// 相对资源目录的路径
    #[serde(default)]
    pub fallback_asset: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SynthesizeNarrationRequest {
    pub text: String,
    #[serde(default)]
    pub section: Option<Section>,
}

// ============================================================================
// Sound DTOs
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PlaySoundRequest {
    #[serde(default)]
    pub volume: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SoundSettingsRequest {
    #[serde(default)]
    pub volume: Option<f32>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

// ============================================================================
// Content DTOs
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ProjectsQuery {
    pub featured: Option<bool>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExperienceQuery {
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}
