//! Command endpoint

use axum::extract::State;
use tracing::debug;

use crate::api::middleware::Actor;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::command::{Command, CommandReply};

/// POST /v1/commands
pub async fn execute_command(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Json(command): Json<Command>,
) -> Result<Json<CommandReply>, ApiError> {
    debug!(request_id = %ctx.request_id, command = command.name(), "Received command");

    let reply = state
        .dispatcher
        .dispatch(&ctx, command)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(reply))
}
