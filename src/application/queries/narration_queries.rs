//! Narration Queries

/// 查询旁白状态
#[derive(Debug, Clone)]
pub struct GetNarrationStatus;
