use std::net::SocketAddr;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;
use crate::config::ServerConfig;
use crate::state::AppState;
use crate::students;

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(students::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    let request_id = Uuid::new_v4();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        %request_id,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, server: &ServerConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", server.host, server.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        async_trait,
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppConfig;
    use crate::students::repo::StudentStore;
    use crate::students::repo_types::{NewStudent, Student};

    struct UnreachableStore;

    #[async_trait]
    impl StudentStore for UnreachableStore {
        async fn list(&self) -> anyhow::Result<Vec<Student>> {
            anyhow::bail!("connection refused")
        }
        async fn get(&self, _id: i64) -> anyhow::Result<Option<Student>> {
            anyhow::bail!("connection refused")
        }
        async fn create(&self, _new: NewStudent) -> anyhow::Result<Student> {
            anyhow::bail!("connection refused")
        }
        async fn update(&self, _id: i64, _fields: NewStudent) -> anyhow::Result<Option<Student>> {
            anyhow::bail!("connection refused")
        }
        async fn delete(&self, _id: i64) -> anyhow::Result<bool> {
            anyhow::bail!("connection refused")
        }
    }

    async fn send(
        state: &AppState,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, header::HeaderMap, Vec<u8>) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(ct) = content_type {
            req = req.header(header::CONTENT_TYPE, ct);
        }
        let res = build_app(state.clone())
            .oneshot(req.body(Body::from(body.to_owned())).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, headers, bytes.to_vec())
    }

    fn json_of(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    const JSON: Option<&str> = Some("application/json");

    #[tokio::test]
    async fn health_says_ok() {
        let (status, _, body) = send(&AppState::fake(), Method::GET, "/health", None, "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let (status, _, body) =
            send(&AppState::fake(), Method::POST, "/estudiantes/", JSON, "{").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let detail = json_of(&body)["detail"].as_str().unwrap().to_string();
        assert!(detail.starts_with("JSON parse error - "), "{}", detail);
    }

    #[tokio::test]
    async fn missing_content_type_is_unsupported_media_type() {
        let payload = json!({ "name": "Ana", "email": "a@x.com", "controlnum": "C100", "year": 2021 });
        let (status, _, body) = send(
            &AppState::fake(),
            Method::POST,
            "/estudiantes/",
            None,
            &payload.to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(json_of(&body)["detail"].as_str().unwrap().contains("application/json"));
    }

    #[tokio::test]
    async fn crud_over_http_with_and_without_trailing_slash() {
        let state = AppState::fake();
        let payload = json!({ "name": "Ana", "email": "a@x.com", "controlnum": "C100", "year": 2021 });

        let (status, headers, body) =
            send(&state, Method::POST, "/estudiantes", JSON, &payload.to_string()).await;
        assert_eq!(status, StatusCode::CREATED);
        let created = json_of(&body);
        let id = created["id"].as_i64().unwrap();
        assert_eq!(
            headers.get(header::LOCATION).unwrap(),
            &format!("/estudiantes/{}/", id)
        );

        let (status, _, body) =
            send(&state, Method::GET, &format!("/estudiantes/{}", id), None, "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body), created);

        let (status, _, body) = send(&state, Method::GET, "/estudiantes/", None, "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body), json!([{ "id": id, "name": "Ana" }]));

        let (status, _, body) = send(
            &state,
            Method::PATCH,
            &format!("/estudiantes/{}/", id),
            JSON,
            r#"{"year": "2022"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body)["year"], 2022);

        let (status, _, body) =
            send(&state, Method::DELETE, &format!("/estudiantes/{}/", id), None, "").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());

        let (status, _, body) =
            send(&state, Method::GET, &format!("/estudiantes/{}/", id), None, "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json_of(&body), json!({ "detail": "Not found." }));
    }

    #[tokio::test]
    async fn validation_errors_reach_the_wire() {
        let (status, _, body) = send(
            &AppState::fake(),
            Method::POST,
            "/estudiantes/",
            JSON,
            r#"{"name": "Ana", "email": "nope", "controlnum": "C100", "year": 2101}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json_of(&body),
            json!({
                "email": ["Enter a valid email address."],
                "year": ["Ensure this value is less than or equal to 2100."]
            })
        );
    }

    #[tokio::test]
    async fn non_numeric_id_is_not_found() {
        let (status, _, body) =
            send(&AppState::fake(), Method::GET, "/estudiantes/abc/", None, "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json_of(&body), json!({ "detail": "Not found." }));
    }

    #[tokio::test]
    async fn store_failure_is_a_generic_server_error() {
        let state = AppState::from_parts(
            Arc::new(AppConfig::default()),
            Arc::new(UnreachableStore),
        );
        for (method, uri) in [(Method::GET, "/estudiantes/"), (Method::GET, "/estudiantes/1/")] {
            let (status, _, body) = send(&state, method, uri, None, "").await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(json_of(&body), json!({ "detail": "A server error occurred." }));
        }
        let (status, _, body) =
            send(&state, Method::DELETE, "/estudiantes/1/", None, "").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!String::from_utf8_lossy(&body).contains("connection refused"));
    }
}
