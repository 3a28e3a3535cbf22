//! Content Context - Entities

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ContentError;

/// 项目分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectCategory {
    Fullstack,
    Frontend,
    Backend,
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "Open Source")]
    OpenSource,
}

impl ProjectCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fullstack => "Fullstack",
            Self::Frontend => "Frontend",
            Self::Backend => "Backend",
            Self::Ai => "AI",
            Self::OpenSource => "Open Source",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ContentError> {
        match s {
            "Fullstack" => Ok(Self::Fullstack),
            "Frontend" => Ok(Self::Frontend),
            "Backend" => Ok(Self::Backend),
            "AI" => Ok(Self::Ai),
            "Open Source" => Ok(Self::OpenSource),
            other => Err(ContentError::InvalidField {
                field: "category",
                reason: format!("unknown project category '{}'", other),
            }),
        }
    }
}

/// 作品集项目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub tech_stack: Vec<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub category: ProjectCategory,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// 项目简介朗读文本
    pub fn narration(&self) -> String {
        format!("{}: {}", self.title, self.description)
    }
}

/// 技能
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: i64,
    pub name: String,
    pub icon_url: String,
    /// 熟练度 0..=100
    pub level: u8,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// 经历类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceKind {
    Work,
    Training,
    Certification,
}

impl ExperienceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Training => "training",
            Self::Certification => "certification",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ContentError> {
        match s {
            "work" => Ok(Self::Work),
            "training" => Ok(Self::Training),
            "certification" => Ok(Self::Certification),
            other => Err(ContentError::InvalidField {
                field: "type",
                reason: format!("unknown experience type '{}'", other),
            }),
        }
    }
}

/// 经历状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceStatus {
    Completed,
    Ongoing,
    Current,
}

impl ExperienceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Ongoing => "ongoing",
            Self::Current => "current",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ContentError> {
        match s {
            "completed" => Ok(Self::Completed),
            "ongoing" => Ok(Self::Ongoing),
            "current" => Ok(Self::Current),
            other => Err(ContentError::InvalidField {
                field: "status",
                reason: format!("unknown experience status '{}'", other),
            }),
        }
    }
}

/// 工作 / 培训 / 认证经历
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: i64,
    pub title: String,
    pub organization: String,
    #[serde(rename = "type")]
    pub kind: ExperienceKind,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub url: Option<String>,
    pub logo_url: Option<String>,
    pub skills: Vec<String>,
    pub status: ExperienceStatus,
    pub created_at: DateTime<Utc>,
}

/// 联系表单提交
///
/// 不变量:
/// - name 非空且不超过 100 字符
/// - email 形如 local@domain.tld
/// - message 非空且不超过 5000 字符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    name: String,
    email: String,
    message: String,
}

impl ContactMessage {
    pub fn new(name: &str, email: &str, message: &str) -> Result<Self, ContentError> {
        let name = name.trim();
        let email = email.trim();
        let message = message.trim();

        if name.is_empty() || name.chars().count() > 100 {
            return Err(ContentError::InvalidField {
                field: "name",
                reason: "name must be 1-100 characters".to_string(),
            });
        }
        if !looks_like_email(email) {
            return Err(ContentError::InvalidField {
                field: "email",
                reason: format!("'{}' is not a valid email address", email),
            });
        }
        if message.is_empty() || message.chars().count() > 5000 {
            return Err(ContentError::InvalidField {
                field: "message",
                reason: "message must be 1-5000 characters".to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
}
