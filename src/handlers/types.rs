//! Request and response types for the HTTP API

use crate::models::{
    Complexity, Dimensions, Material, MaterialUnit, Project, ProjectStatus, ProjectType, Room,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: bool,
    pub demo_mode: bool,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Create project request
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub total_area: f64,
    pub project_type: ProjectType,
    pub main_material: String,
    pub budget: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub materials: Vec<Material>,
}

/// Partial project update; absent fields are left untouched
#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub total_area: Option<f64>,
    pub project_type: Option<ProjectType>,
    pub main_material: Option<String>,
    pub status: Option<ProjectStatus>,
    pub budget: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    pub rooms: Option<Vec<Room>>,
    pub materials: Option<Vec<Material>>,
}

/// Query parameters for the project listing
#[derive(Debug, Deserialize)]
pub struct ProjectListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub project_type: Option<ProjectType>,
    pub status: Option<ProjectStatus>,
    pub search: Option<String>,
}

/// Pagination metadata for list responses
#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = (total as f64 / limit as f64).ceil() as u32;
        Self {
            page,
            limit,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

/// Project listing response
#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub count: u64,
    pub projects: Vec<Project>,
    pub pagination: Pagination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
}

/// Single-project response
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub project: Project,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
}

/// Add a room to a project
#[derive(Debug, Deserialize)]
pub struct AddRoomRequest {
    pub name: String,
    pub area: f64,
    pub complexity: Option<Complexity>,
    pub dimensions: Option<Dimensions>,
}

/// Add a material line item to a project
#[derive(Debug, Deserialize)]
pub struct AddMaterialRequest {
    pub name: String,
    pub quantity: f64,
    pub unit: MaterialUnit,
    pub unit_price: f64,
}

/// Generic message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Stored file metadata returned after an upload
#[derive(Debug, Serialize)]
pub struct UploadedFileInfo {
    pub filename: String,
    pub original_name: String,
    pub path: String,
    pub size: u64,
    pub mime_type: String,
}

/// Data extracted from an uploaded floor plan.
///
/// Extraction is a stub: real plan analysis happens outside this service,
/// these values let the client exercise the flow end to end.
#[derive(Debug, Serialize)]
pub struct ExtractedData {
    pub kind: String,
    pub rooms: Vec<Room>,
    pub total_area: f64,
    pub materials: Vec<Material>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Upload-and-extract response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub file: UploadedFileInfo,
    pub data: ExtractedData,
}
