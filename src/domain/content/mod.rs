//! Content Context - 作品集内容限界上下文
//!
//! 职责:
//! - 项目、技能、经历的只读模型
//! - 联系表单校验

mod entities;
mod errors;

pub use entities::{
    ContactMessage, Experience, ExperienceKind, ExperienceStatus, Project, ProjectCategory, Skill,
};
pub use errors::ContentError;
