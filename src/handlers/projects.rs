//! Project CRUD handlers with ownership enforcement and demo fallback

use super::types::{
    AddMaterialRequest, AddRoomRequest, CreateProjectRequest, MessageResponse, Pagination,
    ProjectListQuery, ProjectListResponse, ProjectResponse, UpdateProjectRequest,
};
use crate::auth::{check_ownership, AuthError, Identity};
use crate::database::{ProjectFilter, StoreError};
use crate::models::{
    Complexity, Material, MaterialUnit, Project, ProjectStatus, ProjectType, Room,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

fn store_unavailable(state: &AppState, err: StoreError) -> AuthError {
    AuthError::StoreUnavailable {
        detail: state.config.dev_mode.then(|| err.to_string()),
    }
}

fn no_database(state: &AppState) -> AuthError {
    AuthError::StoreUnavailable {
        detail: state
            .config
            .dev_mode
            .then(|| "no database configured".to_string()),
    }
}

/// Load a project through the ownership guard, via the database or the demo
/// substitute. The bool marks a demo-sourced resource.
pub(crate) async fn load_owned_project(
    state: &AppState,
    identity: &Identity,
    project_id: &str,
) -> Result<(Project, bool), AuthError> {
    match &state.database {
        Some(db) => {
            let project =
                check_ownership(project_id, identity, |pid| db.find_project(pid)).await?;
            Ok((project, false))
        }
        None if state.config.demo_mode => {
            let project =
                check_ownership(project_id, identity, |pid| demo_find_project(pid, identity))
                    .await?;
            Ok((project, true))
        }
        None => Err(no_database(state)),
    }
}

/// List the caller's projects with filtering, search and pagination
pub async fn list_projects(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ProjectListQuery>,
) -> Result<Json<ProjectListResponse>, AuthError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    match &state.database {
        Some(db) => {
            let filter = ProjectFilter {
                project_type: query.project_type,
                status: query.status,
                search: query.search.clone(),
                sort_by: query.sort_by.clone().unwrap_or_else(|| "created_at".to_string()),
                sort_desc: query.sort_order.as_deref() != Some("asc"),
                limit: limit as i64,
                offset: ((page - 1) * limit) as i64,
            };

            let (projects, total) = db
                .list_projects(&identity.id, &filter)
                .await
                .map_err(|e| store_unavailable(&state, e))?;

            Ok(Json(ProjectListResponse {
                count: total as u64,
                projects,
                pagination: Pagination::new(page, limit, total as u64),
                mode: None,
            }))
        }
        None if state.config.demo_mode => {
            let mut projects = demo_projects(&identity.id);

            if let Some(project_type) = query.project_type {
                projects.retain(|p| p.project_type == project_type);
            }
            if let Some(status) = query.status {
                projects.retain(|p| p.status == status);
            }
            if let Some(term) = &query.search {
                let term = term.to_lowercase();
                projects.retain(|p| {
                    p.name.to_lowercase().contains(&term)
                        || p.description.to_lowercase().contains(&term)
                        || p.main_material.to_lowercase().contains(&term)
                });
            }

            let total = projects.len() as u64;
            let start = ((page - 1) * limit) as usize;
            let page_items: Vec<Project> = projects
                .into_iter()
                .skip(start)
                .take(limit as usize)
                .collect();

            Ok(Json(ProjectListResponse {
                count: total,
                projects: page_items,
                pagination: Pagination::new(page, limit, total),
                mode: Some("demo"),
            }))
        }
        None => Err(no_database(&state)),
    }
}

/// Create a new project owned by the caller
pub async fn create_project(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), AuthError> {
    if request.name.trim().is_empty() || request.main_material.trim().is_empty() {
        return Err(AuthError::Validation(
            "Name and main material are required".to_string(),
        ));
    }
    if request.total_area <= 0.0 {
        return Err(AuthError::Validation(
            "Total area must be greater than zero".to_string(),
        ));
    }

    let now = Utc::now();
    let project = Project {
        id: Uuid::new_v4().to_string(),
        user_id: identity.id.clone(),
        name: request.name,
        description: request.description,
        total_area: request.total_area,
        project_type: request.project_type,
        main_material: request.main_material,
        status: ProjectStatus::InProgress,
        budget: request.budget,
        deadline: request.deadline,
        rooms: request.rooms,
        materials: request.materials,
        files: vec![],
        notes: vec![],
        created_at: now,
        updated_at: now,
    };

    match &state.database {
        Some(db) => {
            db.save_project(&project)
                .await
                .map_err(|e| store_unavailable(&state, e))?;

            info!("Project created: {} by {}", project.id, identity.id);
            Ok((
                StatusCode::CREATED,
                Json(ProjectResponse {
                    project,
                    mode: None,
                }),
            ))
        }
        None if state.config.demo_mode => {
            warn!("database unavailable, echoing synthetic project");
            Ok((
                StatusCode::CREATED,
                Json(ProjectResponse {
                    project,
                    mode: Some("demo"),
                }),
            ))
        }
        None => Err(no_database(&state)),
    }
}

/// Fetch a single project; caller must own it or hold the admin role
pub async fn get_project(
    State(state): State<AppState>,
    identity: Identity,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectResponse>, AuthError> {
    let (project, demo) = load_owned_project(&state, &identity, &project_id).await?;

    Ok(Json(ProjectResponse {
        project,
        mode: demo.then_some("demo"),
    }))
}

/// Apply a partial update to an owned project
pub async fn update_project(
    State(state): State<AppState>,
    identity: Identity,
    Path(project_id): Path<String>,
    Json(request): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, AuthError> {
    let (mut project, demo) = load_owned_project(&state, &identity, &project_id).await?;

    if let Some(name) = request.name {
        project.name = name;
    }
    if let Some(description) = request.description {
        project.description = description;
    }
    if let Some(total_area) = request.total_area {
        if total_area <= 0.0 {
            return Err(AuthError::Validation(
                "Total area must be greater than zero".to_string(),
            ));
        }
        project.total_area = total_area;
    }
    if let Some(project_type) = request.project_type {
        project.project_type = project_type;
    }
    if let Some(main_material) = request.main_material {
        project.main_material = main_material;
    }
    if let Some(status) = request.status {
        project.status = status;
    }
    if let Some(budget) = request.budget {
        project.budget = Some(budget);
    }
    if let Some(deadline) = request.deadline {
        project.deadline = Some(deadline);
    }
    if let Some(rooms) = request.rooms {
        project.rooms = rooms;
    }
    if let Some(materials) = request.materials {
        project.materials = materials;
    }
    project.updated_at = Utc::now();

    if let Some(db) = &state.database {
        db.save_project(&project)
            .await
            .map_err(|e| store_unavailable(&state, e))?;
        info!("Project updated: {}", project.id);
    }

    Ok(Json(ProjectResponse {
        project,
        mode: demo.then_some("demo"),
    }))
}

/// Delete an owned project
pub async fn delete_project(
    State(state): State<AppState>,
    identity: Identity,
    Path(project_id): Path<String>,
) -> Result<Json<MessageResponse>, AuthError> {
    let (project, _demo) = load_owned_project(&state, &identity, &project_id).await?;

    if let Some(db) = &state.database {
        db.delete_project(&project.id)
            .await
            .map_err(|e| store_unavailable(&state, e))?;
        info!("Project deleted: {} by {}", project.id, identity.id);
    }

    Ok(Json(MessageResponse {
        message: "Project deleted successfully".to_string(),
    }))
}

/// Add a room to an owned project
pub async fn add_room(
    State(state): State<AppState>,
    identity: Identity,
    Path(project_id): Path<String>,
    Json(request): Json<AddRoomRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), AuthError> {
    if request.name.trim().is_empty() {
        return Err(AuthError::Validation("Room name is required".to_string()));
    }
    if request.area <= 0.0 {
        return Err(AuthError::Validation(
            "Room area must be greater than zero".to_string(),
        ));
    }

    let (mut project, demo) = load_owned_project(&state, &identity, &project_id).await?;

    project.rooms.push(Room {
        name: request.name,
        area: request.area,
        complexity: request.complexity.unwrap_or_default(),
        dimensions: request.dimensions,
    });
    project.updated_at = Utc::now();

    if let Some(db) = &state.database {
        db.save_project(&project)
            .await
            .map_err(|e| store_unavailable(&state, e))?;
    }

    Ok((
        StatusCode::CREATED,
        Json(ProjectResponse {
            project,
            mode: demo.then_some("demo"),
        }),
    ))
}

/// Add a material line item to an owned project
pub async fn add_material(
    State(state): State<AppState>,
    identity: Identity,
    Path(project_id): Path<String>,
    Json(request): Json<AddMaterialRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), AuthError> {
    if request.name.trim().is_empty() {
        return Err(AuthError::Validation(
            "Material name is required".to_string(),
        ));
    }
    if request.quantity <= 0.0 {
        return Err(AuthError::Validation(
            "Material quantity must be greater than zero".to_string(),
        ));
    }
    if request.unit_price < 0.0 {
        return Err(AuthError::Validation(
            "Unit price cannot be negative".to_string(),
        ));
    }

    let (mut project, demo) = load_owned_project(&state, &identity, &project_id).await?;

    project.materials.push(Material {
        name: request.name,
        quantity: request.quantity,
        unit: request.unit,
        unit_price: request.unit_price,
    });
    project.updated_at = Utc::now();

    if let Some(db) = &state.database {
        db.save_project(&project)
            .await
            .map_err(|e| store_unavailable(&state, e))?;
    }

    Ok((
        StatusCode::CREATED,
        Json(ProjectResponse {
            project,
            mode: demo.then_some("demo"),
        }),
    ))
}

/// Demo substitute for the project store
async fn demo_find_project(
    project_id: &str,
    identity: &Identity,
) -> Result<Option<Project>, StoreError> {
    Ok(demo_projects(&identity.id)
        .into_iter()
        .find(|p| p.id == project_id))
}

/// Canned projects served when the database is unreachable
pub(crate) fn demo_projects(owner_id: &str) -> Vec<Project> {
    let now = Utc::now();

    vec![
        Project {
            id: "proj_demo_1".to_string(),
            user_id: owner_id.to_string(),
            name: "Residential Apartment".to_string(),
            description: "Renovation project for a city apartment".to_string(),
            total_area: 120.0,
            project_type: ProjectType::Residential,
            main_material: "Laminate flooring".to_string(),
            status: ProjectStatus::InProgress,
            budget: Some(15000.0),
            deadline: None,
            rooms: vec![
                demo_room("Living Room", 45.0, Complexity::Medium),
                demo_room("Bedroom 1", 25.0, Complexity::Low),
                demo_room("Bedroom 2", 20.0, Complexity::Low),
                demo_room("Kitchen", 15.0, Complexity::High),
                demo_room("Bathroom", 8.0, Complexity::High),
            ],
            materials: vec![
                demo_material("7mm laminate", 120.0, MaterialUnit::SquareMeter, 45.9),
                demo_material("Underlay", 120.0, MaterialUnit::SquareMeter, 5.5),
                demo_material("Skirting board", 85.0, MaterialUnit::Meter, 15.75),
            ],
            files: vec![],
            notes: vec![],
            created_at: now - Duration::days(7),
            updated_at: now - Duration::days(2),
        },
        Project {
            id: "proj_demo_2".to_string(),
            user_id: owner_id.to_string(),
            name: "Commercial Office".to_string(),
            description: "Fit-out for a new office space".to_string(),
            total_area: 80.0,
            project_type: ProjectType::Commercial,
            main_material: "Vinyl flooring".to_string(),
            status: ProjectStatus::Completed,
            budget: Some(12000.0),
            deadline: None,
            rooms: vec![
                demo_room("Reception", 20.0, Complexity::Medium),
                demo_room("Office 1", 15.0, Complexity::Low),
                demo_room("Office 2", 15.0, Complexity::Low),
                demo_room("Meeting Room", 25.0, Complexity::Medium),
                demo_room("Kitchenette", 5.0, Complexity::Low),
            ],
            materials: vec![
                demo_material("Glue-down vinyl", 80.0, MaterialUnit::SquareMeter, 89.9),
                demo_material("Adhesive", 20.0, MaterialUnit::Kilogram, 25.0),
                demo_material("Trim profile", 35.0, MaterialUnit::Meter, 18.5),
            ],
            files: vec![],
            notes: vec![],
            created_at: now - Duration::days(60),
            updated_at: now - Duration::days(45),
        },
    ]
}

fn demo_room(name: &str, area: f64, complexity: Complexity) -> Room {
    Room {
        name: name.to_string(),
        area,
        complexity,
        dimensions: None,
    }
}

fn demo_material(name: &str, quantity: f64, unit: MaterialUnit, unit_price: f64) -> Material {
    Material {
        name: name.to_string(),
        quantity,
        unit,
        unit_price,
    }
}
