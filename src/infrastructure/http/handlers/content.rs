//! Content HTTP Handlers

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::application::ports::{ContactRecord, VisitCount};
use crate::application::{
    ListExperience, ListProjects, ListSkills, RecordVisit, SubmitContact,
};
use crate::domain::content::{Experience, ExperienceKind, Project, ProjectCategory, Skill};
use crate::infrastructure::http::dto::{ApiResponse, ContactRequest, ExperienceQuery, ProjectsQuery};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProjectsQuery>,
) -> Result<Json<ApiResponse<Vec<Project>>>, ApiError> {
    let category = query
        .category
        .as_deref()
        .map(ProjectCategory::parse)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let projects = state
        .list_projects_handler
        .handle(ListProjects {
            featured: query.featured,
            category,
        })
        .await?;
    Ok(Json(ApiResponse::success(projects)))
}

pub async fn list_skills(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Skill>>>, ApiError> {
    let skills = state.list_skills_handler.handle(ListSkills).await?;
    Ok(Json(ApiResponse::success(skills)))
}

pub async fn list_experience(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExperienceQuery>,
) -> Result<Json<ApiResponse<Vec<Experience>>>, ApiError> {
    let kind = query
        .kind
        .as_deref()
        .map(ExperienceKind::parse)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let experience = state
        .list_experience_handler
        .handle(ListExperience { kind })
        .await?;
    Ok(Json(ApiResponse::success(experience)))
}

pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ContactRequest>,
) -> Result<Json<ApiResponse<ContactRecord>>, ApiError> {
    let record = state
        .submit_contact_handler
        .handle(SubmitContact {
            name: req.name,
            email: req.email,
            message: req.message,
        })
        .await?;
    Ok(Json(ApiResponse::success(record)))
}

pub async fn record_visit(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<VisitCount>>, ApiError> {
    let visits = state.record_visit_handler.handle(RecordVisit).await?;
    Ok(Json(ApiResponse::success(visits)))
}
