//! Actor extraction
//!
//! The chat front end authenticates users itself and forwards the platform
//! handle of the caller in `X-Actor-Id`. Moderator rights come from
//! configuration, never from the request.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use tracing::debug;
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::command::CommandContext;
use crate::domain::player::PlayerId;

pub const ACTOR_HEADER: &str = "x-actor-id";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Extractor yielding the [`CommandContext`] of the calling player
#[derive(Debug, Clone)]
pub struct Actor(pub CommandContext);

impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let actor = extract_actor_from_headers(&parts.headers)?;
        let request_id = extract_request_id(&parts.headers);
        let is_moderator = state.moderation.is_moderator(actor.as_str());

        debug!(actor = %actor, request_id = %request_id, is_moderator, "Resolved actor");

        let mut ctx = CommandContext::new(actor, request_id);
        ctx.is_moderator = is_moderator;

        Ok(Actor(ctx))
    }
}

fn extract_actor_from_headers(headers: &HeaderMap) -> Result<PlayerId, ApiError> {
    let value = headers
        .get(ACTOR_HEADER)
        .ok_or_else(|| ApiError::unauthorized("Missing X-Actor-Id header"))?;

    let value = value
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid X-Actor-Id header encoding"))?;

    PlayerId::new(value.trim())
        .map_err(|e| ApiError::bad_request(format!("Invalid X-Actor-Id header: {}", e)))
}

/// Uses the id set by the request-id layer, or mints one
fn extract_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
