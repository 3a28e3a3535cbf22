//! Content Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{PortfolioRepositoryPort, ProjectFilter};
use crate::application::queries::{ListExperience, ListProjects, ListSkills};
use crate::domain::content::{Experience, Project, Skill};

/// ListProjects Handler
pub struct ListProjectsHandler {
    portfolio_repo: Arc<dyn PortfolioRepositoryPort>,
}

impl ListProjectsHandler {
    pub fn new(portfolio_repo: Arc<dyn PortfolioRepositoryPort>) -> Self {
        Self { portfolio_repo }
    }

    pub async fn handle(&self, query: ListProjects) -> Result<Vec<Project>, ApplicationError> {
        let filter = ProjectFilter {
            featured: query.featured,
            category: query.category,
        };
        Ok(self.portfolio_repo.list_projects(&filter).await?)
    }
}

/// ListSkills Handler
pub struct ListSkillsHandler {
    portfolio_repo: Arc<dyn PortfolioRepositoryPort>,
}

impl ListSkillsHandler {
    pub fn new(portfolio_repo: Arc<dyn PortfolioRepositoryPort>) -> Self {
        Self { portfolio_repo }
    }

    pub async fn handle(&self, _query: ListSkills) -> Result<Vec<Skill>, ApplicationError> {
        Ok(self.portfolio_repo.list_skills().await?)
    }
}

/// ListExperience Handler
pub struct ListExperienceHandler {
    portfolio_repo: Arc<dyn PortfolioRepositoryPort>,
}

impl ListExperienceHandler {
    pub fn new(portfolio_repo: Arc<dyn PortfolioRepositoryPort>) -> Self {
        Self { portfolio_repo }
    }

    pub async fn handle(&self, query: ListExperience) -> Result<Vec<Experience>, ApplicationError> {
        Ok(self.portfolio_repo.list_experience(query.kind).await?)
    }
}
