//! File upload, extraction stubs and project attachments

mod helpers;

use helpers::spawn_app;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

fn pdf_form(filename: &str) -> Form {
    let part = Part::bytes(b"%PDF-1.4 fake plan".to_vec())
        .file_name(filename.to_string())
        .mime_str("application/pdf")
        .unwrap();
    Form::new().part("file", part)
}

#[tokio::test]
async fn test_upload_returns_extraction_stub_for_pdf() {
    let app = spawn_app().await;
    let (_user, token) = app.register_user().await;

    let response = app
        .post_multipart_with_auth("/api/upload", &token, pdf_form("floor-plan.pdf"))
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["file"]["original_name"], "floor-plan.pdf");
    assert_eq!(body["file"]["mime_type"], "application/pdf");
    assert_eq!(body["data"]["kind"], "pdf");
    assert!(body["data"]["rooms"].as_array().unwrap().len() > 0);
    assert!(body["data"]["total_area"].as_f64().unwrap() > 0.0);

    // The stored file is served back from the upload directory
    let path = body["file"]["path"].as_str().unwrap();
    let response = app.get(path).await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_upload_image_stub_differs_from_pdf() {
    let app = spawn_app().await;
    let (_user, token) = app.register_user().await;

    let part = Part::bytes(vec![0x89, b'P', b'N', b'G'])
        .file_name("photo.png")
        .mime_str("image/png")
        .unwrap();
    let form = Form::new().part("file", part);

    let response = app.post_multipart_with_auth("/api/upload", &token, form).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["kind"], "image");
}

#[tokio::test]
async fn test_upload_rejects_unsupported_type() {
    let app = spawn_app().await;
    let (_user, token) = app.register_user().await;

    let part = Part::bytes(b"#!/bin/sh".to_vec())
        .file_name("script.sh")
        .mime_str("text/x-shellscript")
        .unwrap();
    let form = Form::new().part("file", part);

    let response = app.post_multipart_with_auth("/api/upload", &token, form).await;
    assert_eq!(response.status().as_u16(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "validation_failed");
}

#[tokio::test]
async fn test_upload_requires_authentication() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(format!("{}/api/upload", app.address))
        .multipart(pdf_form("plan.pdf"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn test_attach_and_remove_project_file() {
    let app = spawn_app().await;
    let (_user, token) = app.register_user().await;
    let project_id = app.create_project(&token, "With attachments").await;

    let response = app
        .post_multipart_with_auth(
            &format!("/api/upload/project/{}", project_id),
            &token,
            pdf_form("measurements.pdf"),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);

    let body: Value = response.json().await.unwrap();
    let files = body["project"]["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["original_name"], "measurements.pdf");
    let file_id = files[0]["id"].as_str().unwrap().to_string();

    // The attachment survives a reload
    let response = app
        .get_with_auth(&format!("/api/projects/{}", project_id), &token)
        .await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["project"]["files"].as_array().unwrap().len(), 1);

    let response = app
        .delete_with_auth(
            &format!("/api/upload/project/{}/file/{}", project_id, file_id),
            &token,
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let response = app
        .get_with_auth(&format!("/api/projects/{}", project_id), &token)
        .await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["project"]["files"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_attach_to_foreign_project_is_forbidden() {
    let app = spawn_app().await;
    let (_owner, owner_token) = app.register_user().await;
    let (_other, other_token) = app.register_user().await;
    let project_id = app.create_project(&owner_token, "Not yours").await;

    let response = app
        .post_multipart_with_auth(
            &format!("/api/upload/project/{}", project_id),
            &other_token,
            pdf_form("sneaky.pdf"),
        )
        .await;
    assert_eq!(response.status().as_u16(), 403);

    // Nothing was attached
    let response = app
        .get_with_auth(&format!("/api/projects/{}", project_id), &owner_token)
        .await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["project"]["files"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_remove_unknown_file_is_not_found() {
    let app = spawn_app().await;
    let (_user, token) = app.register_user().await;
    let project_id = app.create_project(&token, "No files").await;

    let response = app
        .delete_with_auth(
            &format!("/api/upload/project/{}/file/{}", project_id, "missing"),
            &token,
        )
        .await;
    assert_eq!(response.status().as_u16(), 404);
}
