//! Repository Ports - 出站端口
//!
//! 定义作品集内容存储的抽象接口
//! 具体实现在 infrastructure 层（如 SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::content::{
    ContactMessage, Experience, ExperienceKind, Project, ProjectCategory, Skill,
};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// Portfolio Content (只读)
// ============================================================================

/// 项目查询条件
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub featured: Option<bool>,
    pub category: Option<ProjectCategory>,
}

/// Portfolio Repository Port
#[async_trait]
pub trait PortfolioRepositoryPort: Send + Sync {
    /// 按创建时间倒序列出项目
    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, RepositoryError>;

    /// 按分类、熟练度倒序列出技能
    async fn list_skills(&self) -> Result<Vec<Skill>, RepositoryError>;

    /// 按开始日期倒序列出经历
    async fn list_experience(
        &self,
        kind: Option<ExperienceKind>,
    ) -> Result<Vec<Experience>, RepositoryError>;
}

// ============================================================================
// Contacts (只写)
// ============================================================================

/// 已保存的联系记录
#[derive(Debug, Clone, Serialize)]
pub struct ContactRecord {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

/// Contact Repository Port
#[async_trait]
pub trait ContactRepositoryPort: Send + Sync {
    async fn save(&self, contact: &ContactMessage) -> Result<ContactRecord, RepositoryError>;
}

// ============================================================================
// Visits (计数器)
// ============================================================================

/// 访问计数
#[derive(Debug, Clone, Serialize)]
pub struct VisitCount {
    pub count: i64,
    pub updated_at: DateTime<Utc>,
}

/// Visit Counter Port
#[async_trait]
pub trait VisitCounterPort: Send + Sync {
    /// 原子加一并返回新值
    async fn increment(&self) -> Result<VisitCount, RepositoryError>;

    async fn current(&self) -> Result<VisitCount, RepositoryError>;
}
