//! File upload handlers and the extraction stubs behind them

use super::types::{ExtractedData, MessageResponse, ProjectResponse, UploadResponse, UploadedFileInfo};
use crate::auth::{AuthError, Identity};
use crate::handlers::projects::load_owned_project;
use crate::models::{Complexity, Material, MaterialUnit, ProjectFile, Room};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use std::path::PathBuf;
use tracing::{error, info, warn};
use uuid::Uuid;

const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/svg+xml",
    "application/octet-stream", // DWG/DXF exports
    "application/dxf",
    "application/dwg",
];

struct IncomingFile {
    original_name: String,
    mime_type: String,
    data: Bytes,
}

/// Pull the `file` part out of a multipart body and validate its type
async fn read_upload(multipart: &mut Multipart) -> Result<IncomingFile, AuthError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AuthError::Validation(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        if !ALLOWED_MIME_TYPES.contains(&mime_type.as_str()) {
            return Err(AuthError::Validation(format!(
                "Unsupported file type '{}'. Allowed: PDF, JPEG, PNG, WEBP, SVG, DWG and DXF",
                mime_type
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AuthError::Validation(format!("Failed to read upload: {}", e)))?;

        return Ok(IncomingFile {
            original_name,
            mime_type,
            data,
        });
    }

    Err(AuthError::Validation("No file provided".to_string()))
}

/// Keep only filesystem-safe characters; everything else becomes '_'
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

async fn store_file(state: &AppState, upload: &IncomingFile) -> Result<ProjectFile, AuthError> {
    let stored_name = format!("{}-{}", Uuid::new_v4(), sanitize_filename(&upload.original_name));
    let disk_path: PathBuf = PathBuf::from(&state.config.upload_dir).join(&stored_name);

    tokio::fs::write(&disk_path, &upload.data).await.map_err(|e| {
        error!("Failed to store upload {}: {}", disk_path.display(), e);
        AuthError::Internal(format!("failed to store upload: {}", e))
    })?;

    Ok(ProjectFile {
        id: Uuid::new_v4().to_string(),
        filename: stored_name.clone(),
        original_name: upload.original_name.clone(),
        path: format!("/uploads/{}", stored_name),
        size: upload.data.len() as u64,
        mime_type: upload.mime_type.clone(),
        uploaded_at: Utc::now(),
    })
}

/// Process an uploaded plan and return the extraction stub's reading of it
pub async fn upload_file(
    State(state): State<AppState>,
    identity: Identity,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AuthError> {
    let upload = read_upload(&mut multipart).await?;

    info!(
        "Processing upload '{}' ({} bytes) for {}",
        upload.original_name,
        upload.data.len(),
        identity.id
    );

    let stored = store_file(&state, &upload).await?;
    let data = extract_file_data(&upload.mime_type);

    Ok(Json(UploadResponse {
        message: "File processed successfully".to_string(),
        file: UploadedFileInfo {
            filename: stored.filename,
            original_name: stored.original_name,
            path: stored.path,
            size: stored.size,
            mime_type: stored.mime_type,
        },
        data,
    }))
}

/// Attach an uploaded file to an owned project
pub async fn upload_to_project(
    State(state): State<AppState>,
    identity: Identity,
    Path(project_id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ProjectResponse>), AuthError> {
    let upload = read_upload(&mut multipart).await?;

    // Ownership is checked before anything touches the disk
    let (mut project, demo) = load_owned_project(&state, &identity, &project_id).await?;

    let stored = store_file(&state, &upload).await?;
    info!(
        "Attached file '{}' to project {}",
        stored.original_name, project.id
    );

    project.files.push(stored);
    project.updated_at = Utc::now();

    if let Some(db) = &state.database {
        db.save_project(&project).await.map_err(|e| {
            AuthError::StoreUnavailable {
                detail: state.config.dev_mode.then(|| e.to_string()),
            }
        })?;
    }

    Ok((
        StatusCode::CREATED,
        Json(ProjectResponse {
            project,
            mode: demo.then_some("demo"),
        }),
    ))
}

/// Remove a file from an owned project and delete it from disk
pub async fn delete_project_file(
    State(state): State<AppState>,
    identity: Identity,
    Path((project_id, file_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, AuthError> {
    let (mut project, _demo) = load_owned_project(&state, &identity, &project_id).await?;

    let index = project
        .files
        .iter()
        .position(|f| f.id == file_id)
        .ok_or(AuthError::NotFound)?;

    let removed = project.files.remove(index);
    project.updated_at = Utc::now();

    if let Some(db) = &state.database {
        db.save_project(&project).await.map_err(|e| {
            AuthError::StoreUnavailable {
                detail: state.config.dev_mode.then(|| e.to_string()),
            }
        })?;
    }

    let disk_path = PathBuf::from(&state.config.upload_dir).join(&removed.filename);
    if let Err(e) = tokio::fs::remove_file(&disk_path).await {
        // The record is already gone; a missing file is not worth failing over
        warn!("Could not remove stored file {}: {}", disk_path.display(), e);
    }

    info!(
        "Removed file '{}' from project {}",
        removed.original_name, project.id
    );

    Ok(Json(MessageResponse {
        message: "File removed successfully".to_string(),
    }))
}

/// Extraction stub keyed by file kind. Real plan analysis lives outside
/// this service; these canned readings keep the client flow working.
fn extract_file_data(mime_type: &str) -> ExtractedData {
    if mime_type == "application/pdf" {
        ExtractedData {
            kind: "pdf".to_string(),
            rooms: vec![
                stub_room("Living Room", 450.0, Complexity::Medium),
                stub_room("Bedroom 1", 220.0, Complexity::Low),
                stub_room("Bedroom 2", 220.0, Complexity::Low),
                stub_room("Bedroom 3", 180.0, Complexity::Low),
                stub_room("Hallway", 180.0, Complexity::High),
            ],
            total_area: 1250.0,
            materials: vec![
                stub_material("Laminate flooring", 1300.0, MaterialUnit::SquareMeter, 45.9),
                stub_material("Underlay", 1300.0, MaterialUnit::SquareMeter, 5.5),
                stub_material("Skirting board", 230.0, MaterialUnit::Meter, 15.75),
                stub_material("Finishing pieces", 12.0, MaterialUnit::Piece, 22.9),
            ],
            note: None,
        }
    } else if mime_type.starts_with("image/") {
        ExtractedData {
            kind: "image".to_string(),
            rooms: vec![
                stub_room("Area 1", 320.0, Complexity::Medium),
                stub_room("Area 2", 180.0, Complexity::Low),
            ],
            total_area: 500.0,
            materials: vec![
                stub_material("Laminate flooring", 525.0, MaterialUnit::SquareMeter, 45.9),
                stub_material("Underlay", 525.0, MaterialUnit::SquareMeter, 5.5),
                stub_material("Skirting board", 120.0, MaterialUnit::Meter, 15.75),
            ],
            note: None,
        }
    } else {
        ExtractedData {
            kind: "other".to_string(),
            rooms: vec![stub_room("Unidentified area", 0.0, Complexity::Medium)],
            total_area: 0.0,
            materials: vec![],
            note: Some(
                "File type detected, but this format requires manual analysis".to_string(),
            ),
        }
    }
}

fn stub_room(name: &str, area: f64, complexity: Complexity) -> Room {
    Room {
        name: name.to_string(),
        area,
        complexity,
        dimensions: None,
    }
}

fn stub_material(name: &str, quantity: f64, unit: MaterialUnit, unit_price: f64) -> Material {
    Material {
        name: name.to_string(),
        quantity,
        unit,
        unit_price,
    }
}
