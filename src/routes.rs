//! Route definitions for the PlanFloor web server

use crate::{auth, handlers, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Account management
        .route("/auth/register", post(auth::handlers::register_user))
        .route("/auth/login", post(auth::handlers::login_user))
        .route("/auth/refresh", post(auth::handlers::refresh_token))
        .route("/auth/me", get(auth::handlers::get_current_user))
        .route("/auth/update", put(auth::handlers::update_profile))
        // Projects
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/projects/{id}",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        .route("/projects/{id}/rooms", post(handlers::add_room))
        .route("/projects/{id}/materials", post(handlers::add_material))
        // Uploads
        .route("/upload", post(handlers::upload_file))
        .route("/upload/project/{id}", post(handlers::upload_to_project))
        .route(
            "/upload/project/{id}/file/{file_id}",
            delete(handlers::delete_project_file),
        )
        // Admin surface
        .route("/admin/stats", get(auth::handlers::admin_stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AppState, WebConfig};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check_route() {
        let state = AppState::new(WebConfig::default()).await.unwrap();
        let app = api_routes().with_state(state);

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_projects_require_authentication() {
        let state = AppState::new(WebConfig::default()).await.unwrap();
        let app = api_routes().with_state(state);

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/projects")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
