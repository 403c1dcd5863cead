pub mod health;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::state::AppState;
use crate::submissions::handlers;
use crate::submissions::upload::MAX_REQUEST_BYTES;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/submissions",
            get(handlers::handle_list)
                .post(handlers::handle_create)
                .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES)),
        )
        .route("/submissions/:id", get(handlers::handle_get))
        .route(
            "/submissions/:id/resume",
            get(handlers::handle_download_resume),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::store::MemorySubmissionStore;
    use crate::submissions::upload::{MAX_RESUME_BYTES, RESUME_REQUIRED, RESUME_TOO_LARGE};

    const BOUNDARY: &str = "intake-test-boundary";
    const RESUME: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n%%EOF";

    fn app() -> Router {
        build_router(AppState::new(Arc::new(MemorySubmissionStore::new())))
    }

    fn fields<'a>(email: &'a str, scholar_no: &'a str) -> Vec<(&'static str, &'a str)> {
        vec![
            ("name", "Asha Rao"),
            ("email", email),
            ("currentyear", "2"),
            ("scholarNo", scholar_no),
            ("branch", "CSE"),
            ("pref1", "Treasurer"),
            ("pref2", "Event Manager"),
            ("message", "Happy to help"),
        ]
    }

    fn multipart_request(fields: &[(&str, &str)], resume: Option<&[u8]>) -> Request<Body> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(data) = resume {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"cv.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/submissions")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create(app: &Router, email: &str, scholar_no: &str) -> Response {
        send(app, multipart_request(&fields(email, scholar_no), Some(RESUME))).await
    }

    async fn listed(app: &Router) -> Vec<Value> {
        let response = send(app, get("/submissions")).await;
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await.as_array().unwrap().clone()
    }

    #[tokio::test]
    async fn test_create_then_read_back() {
        let app = app();
        let response = create(&app, "asha@example.com", "21110001").await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Submission created");
        let id = body["id"].as_str().unwrap().to_string();

        let response = send(&app, get(&format!("/submissions/{id}"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let submission = json_body(response).await;
        assert_eq!(submission["id"], id.as_str());
        assert_eq!(submission["scholarNo"], "21110001");
        assert_eq!(submission["message"], "Happy to help");
        assert!(submission.get("resume").is_none());

        let all = listed(&app).await;
        assert_eq!(all.len(), 1);
        assert!(all[0].get("resume").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let app = app();
        assert_eq!(
            create(&app, "asha@example.com", "21110001").await.status(),
            StatusCode::CREATED
        );

        let response = create(&app, "asha@example.com", "21110002").await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            json_body(response).await["error"],
            "Form already filled with this email or scholar number."
        );
        assert_eq!(listed(&app).await.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_scholar_no_conflicts() {
        let app = app();
        create(&app, "asha@example.com", "21110001").await;
        let response = create(&app, "ravi@example.com", "21110001").await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(listed(&app).await.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_resume_is_rejected() {
        let app = app();
        let response = send(
            &app,
            multipart_request(&fields("asha@example.com", "21110001"), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], RESUME_REQUIRED);
        assert!(listed(&app).await.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_resume_is_rejected() {
        let app = app();
        let resume = vec![b'x'; 400 * 1024];
        let response = send(
            &app,
            multipart_request(&fields("asha@example.com", "21110001"), Some(&resume)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], RESUME_TOO_LARGE);
        assert!(listed(&app).await.is_empty());
    }

    #[tokio::test]
    async fn test_body_over_request_limit_is_rejected() {
        let app = app();
        let resume = vec![b'x'; 2 * MAX_RESUME_BYTES];
        let response = send(
            &app,
            multipart_request(&fields("asha@example.com", "21110001"), Some(&resume)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(listed(&app).await.is_empty());
    }

    #[tokio::test]
    async fn test_resume_at_limit_is_accepted() {
        let app = app();
        let resume = vec![b'x'; MAX_RESUME_BYTES];
        let response = send(
            &app,
            multipart_request(&fields("asha@example.com", "21110001"), Some(&resume)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_missing_text_field_is_rejected() {
        let app = app();
        let partial: Vec<_> = fields("asha@example.com", "21110001")
            .into_iter()
            .filter(|(name, _)| *name != "branch")
            .collect();
        let response = send(&app, multipart_request(&partial, Some(RESUME))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error = json_body(response).await["error"].as_str().unwrap().to_string();
        assert!(error.contains("branch"), "unexpected error: {error}");
        assert!(listed(&app).await.is_empty());
    }

    #[tokio::test]
    async fn test_download_returns_original_bytes() {
        let app = app();
        let body = json_body(create(&app, "asha@example.com", "21110001").await).await;
        let id = body["id"].as_str().unwrap();

        let response = send(&app, get(&format!("/submissions/{id}/resume"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Asha Rao_resume.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes.as_ref(), RESUME);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let app = app();
        let id = Uuid::new_v4();

        let response = send(&app, get(&format!("/submissions/{id}"))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "Submission not found");

        let response = send(&app, get(&format!("/submissions/{id}/resume"))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes.as_ref(), b"Resume not found");
    }

    #[tokio::test]
    async fn test_malformed_id_is_server_error() {
        let app = app();
        let response = send(&app, get("/submissions/not-a-uuid")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json_body(response).await["error"]
            .as_str()
            .unwrap()
            .contains("not-a-uuid"));
    }

    #[tokio::test]
    async fn test_list_counts_every_creation() {
        let app = app();
        for i in 0..5 {
            let response = create(&app, &format!("user{i}@example.com"), &format!("2111000{i}")).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }
        let all = listed(&app).await;
        assert_eq!(all.len(), 5);
        assert!(all.iter().all(|s| s.get("resume").is_none()));
        assert_eq!(all[0]["email"], "user0@example.com");
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(&app(), get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }
}
