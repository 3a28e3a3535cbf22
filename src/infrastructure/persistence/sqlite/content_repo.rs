//! SQLite Portfolio Repository
//!
//! 作品集内容只读查询；`import` 用于从 JSON 种子文件填充

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::{FromRow, QueryBuilder, Sqlite};
use std::path::Path;

use super::DbPool;
use crate::application::ports::{PortfolioRepositoryPort, ProjectFilter, RepositoryError};
use crate::domain::content::{
    Experience, ExperienceKind, ExperienceStatus, Project, ProjectCategory, Skill,
};

/// 内容种子文件
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentSeed {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub experience: Vec<Experience>,
}

impl ContentSeed {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let raw = tokio::fs::read(path.as_ref())
            .await
            .map_err(|e| RepositoryError::DatabaseError(format!("{}: {}", path.as_ref().display(), e)))?;
        serde_json::from_slice(&raw).map_err(|e| RepositoryError::SerializationError(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.projects.len() + self.skills.len() + self.experience.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// SQLite Portfolio Repository
pub struct SqlitePortfolioRepository {
    pool: DbPool,
}

impl SqlitePortfolioRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// 写入种子内容，按 id 覆盖已有行
    pub async fn import(&self, seed: &ContentSeed) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        for project in &seed.projects {
            sqlx::query(
                r#"
                INSERT INTO projects (id, title, description, image_url, tech_stack, live_url,
                                      github_url, category, featured, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    image_url = excluded.image_url,
                    tech_stack = excluded.tech_stack,
                    live_url = excluded.live_url,
                    github_url = excluded.github_url,
                    category = excluded.category,
                    featured = excluded.featured,
                    created_at = excluded.created_at
                "#,
            )
            .bind(project.id)
            .bind(&project.title)
            .bind(&project.description)
            .bind(&project.image_url)
            .bind(to_json(&project.tech_stack)?)
            .bind(&project.live_url)
            .bind(&project.github_url)
            .bind(project.category.as_str())
            .bind(project.featured)
            .bind(project.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        for skill in &seed.skills {
            sqlx::query(
                r#"
                INSERT INTO skills (id, name, icon_url, level, category, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    icon_url = excluded.icon_url,
                    level = excluded.level,
                    category = excluded.category,
                    created_at = excluded.created_at
                "#,
            )
            .bind(skill.id)
            .bind(&skill.name)
            .bind(&skill.icon_url)
            .bind(skill.level as i64)
            .bind(&skill.category)
            .bind(skill.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        for item in &seed.experience {
            sqlx::query(
                r#"
                INSERT INTO experience (id, title, organization, type, description, start_date,
                                        end_date, location, url, logo_url, skills, status, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    organization = excluded.organization,
                    type = excluded.type,
                    description = excluded.description,
                    start_date = excluded.start_date,
                    end_date = excluded.end_date,
                    location = excluded.location,
                    url = excluded.url,
                    logo_url = excluded.logo_url,
                    skills = excluded.skills,
                    status = excluded.status,
                    created_at = excluded.created_at
                "#,
            )
            .bind(item.id)
            .bind(&item.title)
            .bind(&item.organization)
            .bind(item.kind.as_str())
            .bind(&item.description)
            .bind(item.start_date.to_string())
            .bind(item.end_date.map(|d| d.to_string()))
            .bind(&item.location)
            .bind(&item.url)
            .bind(&item.logo_url)
            .bind(to_json(&item.skills)?)
            .bind(item.status.as_str())
            .bind(item.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;

        tracing::info!(
            projects = seed.projects.len(),
            skills = seed.skills.len(),
            experience = seed.experience.len(),
            "Portfolio content imported"
        );
        Ok(seed.len())
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

fn serialization_error(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::SerializationError(e.to_string())
}

fn to_json(list: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(list).map_err(serialization_error)
}

fn from_json(raw: &str) -> Result<Vec<String>, RepositoryError> {
    serde_json::from_str(raw).map_err(serialization_error)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .map_err(serialization_error)?
        .with_timezone(&Utc))
}

fn parse_date(raw: &str) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(serialization_error)
}

#[derive(FromRow)]
struct ProjectRow {
    id: i64,
    title: String,
    description: String,
    image_url: String,
    tech_stack: String,
    live_url: Option<String>,
    github_url: Option<String>,
    category: String,
    featured: bool,
    created_at: String,
}

impl TryFrom<ProjectRow> for Project {
    type Error = RepositoryError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Project {
            id: row.id,
            title: row.title,
            description: row.description,
            image_url: row.image_url,
            tech_stack: from_json(&row.tech_stack)?,
            live_url: row.live_url,
            github_url: row.github_url,
            category: ProjectCategory::parse(&row.category).map_err(serialization_error)?,
            featured: row.featured,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[derive(FromRow)]
struct SkillRow {
    id: i64,
    name: String,
    icon_url: String,
    level: i64,
    category: String,
    created_at: String,
}

impl TryFrom<SkillRow> for Skill {
    type Error = RepositoryError;

    fn try_from(row: SkillRow) -> Result<Self, Self::Error> {
        Ok(Skill {
            id: row.id,
            name: row.name,
            icon_url: row.icon_url,
            level: u8::try_from(row.level.clamp(0, 100)).map_err(serialization_error)?,
            category: row.category,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[derive(FromRow)]
struct ExperienceRow {
    id: i64,
    title: String,
    organization: String,
    #[sqlx(rename = "type")]
    kind: String,
    description: String,
    start_date: String,
    end_date: Option<String>,
    location: Option<String>,
    url: Option<String>,
    logo_url: Option<String>,
    skills: String,
    status: String,
    created_at: String,
}

impl TryFrom<ExperienceRow> for Experience {
    type Error = RepositoryError;

    fn try_from(row: ExperienceRow) -> Result<Self, Self::Error> {
        Ok(Experience {
            id: row.id,
            title: row.title,
            organization: row.organization,
            kind: ExperienceKind::parse(&row.kind).map_err(serialization_error)?,
            description: row.description,
            start_date: parse_date(&row.start_date)?,
            end_date: row.end_date.as_deref().map(parse_date).transpose()?,
            location: row.location,
            url: row.url,
            logo_url: row.logo_url,
            skills: from_json(&row.skills)?,
            status: ExperienceStatus::parse(&row.status).map_err(serialization_error)?,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[async_trait]
impl PortfolioRepositoryPort for SqlitePortfolioRepository {
    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, RepositoryError> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, title, description, image_url, tech_stack, live_url, github_url, \
             category, featured, created_at FROM projects WHERE 1 = 1",
        );
        if let Some(featured) = filter.featured {
            query.push(" AND featured = ").push_bind(featured);
        }
        if let Some(category) = filter.category {
            query.push(" AND category = ").push_bind(category.as_str());
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let rows: Vec<ProjectRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(Project::try_from).collect()
    }

    async fn list_skills(&self) -> Result<Vec<Skill>, RepositoryError> {
        let rows: Vec<SkillRow> = sqlx::query_as(
            "SELECT id, name, icon_url, level, category, created_at FROM skills \
             ORDER BY category ASC, level DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(Skill::try_from).collect()
    }

    async fn list_experience(
        &self,
        kind: Option<ExperienceKind>,
    ) -> Result<Vec<Experience>, RepositoryError> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, title, organization, type, description, start_date, end_date, location, \
             url, logo_url, skills, status, created_at FROM experience",
        );
        if let Some(kind) = kind {
            query.push(" WHERE type = ").push_bind(kind.as_str());
        }
        query.push(" ORDER BY start_date DESC, id DESC");

        let rows: Vec<ExperienceRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(Experience::try_from).collect()
    }
}
