//! Content Queries

use crate::domain::content::{ExperienceKind, ProjectCategory};

/// 列出项目
#[derive(Debug, Clone, Default)]
pub struct ListProjects {
    pub featured: Option<bool>,
    pub category: Option<ProjectCategory>,
}

/// 列出技能
#[derive(Debug, Clone)]
pub struct ListSkills;

/// 列出经历
#[derive(Debug, Clone, Default)]
pub struct ListExperience {
    pub kind: Option<ExperienceKind>,
}
