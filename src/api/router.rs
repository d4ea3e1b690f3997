use axum::{middleware, routing::get, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::logging_middleware;
use super::state::AppState;
use super::v1;

/// Create a minimal router without state
/// Note: /ready endpoint is not available without state
pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .layer(TraceLayer::new_for_http())
}

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/v1", v1::create_v1_router())
        .with_state(state)
        // Outermost layer last: ids are assigned before tracing and logging see the request
        .layer(middleware::from_fn(logging_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppConfig;
    use crate::infrastructure::platform::InMemoryPlatformDirectory;
    use crate::infrastructure::storage::RosterBackend;

    const MODERATOR: &str = "9000";

    fn app() -> Router {
        let mut config = AppConfig::default();
        config.moderation.moderator_ids = vec![MODERATOR.to_string()];

        let state = AppState::new(
            RosterBackend::in_memory(),
            Arc::new(InMemoryPlatformDirectory::new()),
            &config,
        );
        create_router_with_state(state)
    }

    fn command(actor: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/v1/commands")
            .header("content-type", "application/json");

        if let Some(actor) = actor {
            builder = builder.header("x-actor-id", actor);
        }

        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn register(app: &Router, actor: &str, nickname: &str) {
        let (status, _) = send(
            app,
            command(
                Some(actor),
                json!({"command": "player.register", "nickname": nickname, "lane": "mid"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_without_state() {
        let response = create_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_reports_roster_store() {
        let (status, body) = send(&app(), Request::get("/ready").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["checks"][0]["name"], "roster_store");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let request = Request::get("/live")
            .header("x-request-id", "req-42")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.headers()["x-request-id"], "req-42");

        let response = app()
            .oneshot(Request::get("/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_missing_actor_is_unauthorized() {
        let (status, body) = send(&app(), command(None, json!({"command": "team.list"}))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["type"], "authentication_error");
    }

    #[tokio::test]
    async fn test_unknown_command_is_unprocessable() {
        let (status, body) = send(
            &app(),
            command(Some("1001"), json!({"command": "team.delete"})),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "json_parse_error");
    }

    #[tokio::test]
    async fn test_unregistered_actor_is_not_found() {
        let (status, body) = send(
            &app(),
            command(Some("1001"), json!({"command": "membership.leave"})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn test_register_then_found_a_team() {
        let app = app();
        register(&app, "1001", "Faker").await;

        let (status, body) = send(
            &app,
            command(
                Some("1001"),
                json!({"command": "team.create", "name": "Blue Otters", "tag": "otr", "captain": "1001"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["kind"], "team");
        assert_eq!(body["result"]["team"]["tag"], "OTR");
        assert_eq!(body["warnings"], json!([]));

        let (status, body) = send(
            &app,
            command(Some("1001"), json!({"command": "player.profile"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["kind"], "profile");
        assert_eq!(body["result"]["team"]["name"], "Blue Otters");
    }

    #[tokio::test]
    async fn test_duplicate_tag_is_conflict() {
        let app = app();
        register(&app, "1001", "Faker").await;
        register(&app, "1002", "Chovy").await;

        let create = |captain: &str, name: &str| {
            command(
                Some(captain),
                json!({"command": "team.create", "name": name, "tag": "otr", "captain": captain}),
            )
        };

        let (status, _) = send(&app, create("1001", "Blue Otters")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, create("1002", "Red Otters")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "tag_taken");
    }

    #[tokio::test]
    async fn test_moderator_rights_come_from_config() {
        let app = app();
        register(&app, "1001", "Faker").await;
        register(&app, MODERATOR, "Admin").await;

        let queue = json!({"command": "invite.list_awaiting_approval"});

        let (status, body) = send(&app, command(Some("1001"), queue.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "permission_denied");

        let (status, body) = send(&app, command(Some(MODERATOR), queue)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["kind"], "invites");
    }
}
