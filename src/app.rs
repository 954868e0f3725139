use std::net::SocketAddr;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::cli::ServeArgs;
use crate::state::AppState;
use crate::{announcements, auth, export, profiles, resumes, templates};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1",
              Router::new()
                  .merge(auth::router())
                  .merge(profiles::router())
                  .merge(templates::router())
                  .merge(resumes::router())
                  .merge(export::router())
                  .merge(announcements::router())
                  .route("/health", get(|| async { "ok" }))
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
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

pub async fn serve(app: Router, args: ServeArgs) -> anyhow::Result<()> {
    let host = args
        .host
        .unwrap_or_else(|| std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()));
    let port = match args.port {
        Some(port) => port.to_string(),
        None => std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into()),
    };
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::JwtKeys;
    use axum::{
        body::{to_bytes, Body},
        extract::FromRef,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = build_app(AppState::fake());
        let resp = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let app = build_app(AppState::fake());
        for uri in ["/api/v1/me", "/api/v1/resumes/new", "/api/v1/profile"] {
            let resp = app
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn refresh_token_is_not_accepted_as_access_token() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state)
            .sign_refresh(uuid::Uuid::new_v4())
            .unwrap();
        let resp = build_app(state)
            .oneshot(
                Request::get("/api/v1/resumes/new")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn new_resume_form_has_five_blank_rows() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state)
            .sign_access(uuid::Uuid::new_v4())
            .unwrap();
        let resp = build_app(state)
            .oneshot(
                Request::get("/api/v1/resumes/new")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert!(body["resume"].is_null());
        let rows = body["rows"].as_array().unwrap();
        let types: Vec<_> = rows.iter().map(|r| r["section_type"].as_str().unwrap()).collect();
        assert_eq!(types, vec!["personal", "experience", "education", "skills", "other"]);
        let orders: Vec<_> = rows.iter().map(|r| r["order"].as_i64().unwrap()).collect();
        assert_eq!(orders, vec![0, 1, 2, 3, 4]);
        assert!(rows.iter().all(|r| r["id"].is_null() && r["content"] == ""));
    }
}
