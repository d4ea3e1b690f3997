//! Row mapping shared by the PostgreSQL repositories

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::invite::{Invite, InviteId};
use crate::domain::player::{LaneRole, Player, PlayerId};
use crate::domain::team::{League, Team, TeamId};
use crate::domain::transfer::{Transfer, TransferId};
use crate::domain::{ConflictKind, DomainError};

pub(super) const PLAYER_COLUMNS: &str =
    "id, team_id, lane, nickname, premium, bio, registered_at";

pub(super) const TEAM_COLUMNS: &str = "id, name, tag, captain_id, league, active, created_at";

pub(super) const INVITE_COLUMNS: &str = "id, inviter_id, invitee_id, team_id, approved, active, \
     expires_at, approved_by, approved_at, created_at";

pub(super) const TRANSFER_COLUMNS: &str = "id, player_id, team_id, kind, lane, recorded_at";

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::storage(format!("Failed to read column '{}': {}", name, e)))
}

fn player_id(value: String) -> Result<PlayerId, DomainError> {
    PlayerId::new(value)
        .map_err(|e| DomainError::storage(format!("Invalid player ID in database: {}", e)))
}

fn lane(value: &str) -> Result<LaneRole, DomainError> {
    value
        .parse()
        .map_err(|e| DomainError::storage(format!("Invalid lane in database: {}", e)))
}

pub(super) fn row_to_player(row: &PgRow) -> Result<Player, DomainError> {
    let team_id: Option<Uuid> = column(row, "team_id")?;
    let lane_value: String = column(row, "lane")?;
    let registered_at: DateTime<Utc> = column(row, "registered_at")?;

    Ok(Player::from_storage(
        player_id(column(row, "id")?)?,
        team_id.map(TeamId::from_uuid),
        lane(&lane_value)?,
        column(row, "nickname")?,
        column(row, "premium")?,
        column(row, "bio")?,
        registered_at,
    ))
}

pub(super) fn row_to_team(row: &PgRow) -> Result<Team, DomainError> {
    let id: Uuid = column(row, "id")?;
    let captain_id: Option<String> = column(row, "captain_id")?;
    let league: String = column(row, "league")?;
    let league: League = league
        .parse()
        .map_err(|e| DomainError::storage(format!("Invalid league in database: {}", e)))?;

    Ok(Team::from_storage(
        TeamId::from_uuid(id),
        column(row, "name")?,
        column(row, "tag")?,
        captain_id.map(player_id).transpose()?,
        league,
        column(row, "active")?,
        column(row, "created_at")?,
    ))
}

pub(super) fn row_to_invite(row: &PgRow) -> Result<Invite, DomainError> {
    let id: Uuid = column(row, "id")?;
    let team_id: Uuid = column(row, "team_id")?;
    let approved_by: Option<String> = column(row, "approved_by")?;

    Ok(Invite {
        id: InviteId::from_uuid(id),
        inviter_id: player_id(column(row, "inviter_id")?)?,
        invitee_id: player_id(column(row, "invitee_id")?)?,
        team_id: TeamId::from_uuid(team_id),
        approved: column(row, "approved")?,
        active: column(row, "active")?,
        expires_at: column(row, "expires_at")?,
        approved_by: approved_by.map(player_id).transpose()?,
        approved_at: column(row, "approved_at")?,
        created_at: column(row, "created_at")?,
    })
}

pub(super) fn row_to_transfer(row: &PgRow) -> Result<Transfer, DomainError> {
    let id: Uuid = column(row, "id")?;
    let team_id: Uuid = column(row, "team_id")?;
    let kind: String = column(row, "kind")?;
    let lane_value: String = column(row, "lane")?;

    Ok(Transfer {
        id: TransferId::from_uuid(id),
        player_id: player_id(column(row, "player_id")?)?,
        team_id: TeamId::from_uuid(team_id),
        kind: kind.parse()?,
        lane: lane(&lane_value)?,
        recorded_at: column(row, "recorded_at")?,
    })
}

/// Maps unique-index violations to the conflict they stand for
pub(super) fn map_write_error(error: sqlx::Error, context: &str) -> DomainError {
    let constraint = error
        .as_database_error()
        .and_then(|db| db.constraint())
        .map(str::to_string);

    match constraint.as_deref() {
        Some("idx_teams_name_lower") => {
            DomainError::conflict(ConflictKind::NameTaken, "Team name is already taken")
        }
        Some("idx_teams_tag") => {
            DomainError::conflict(ConflictKind::TagTaken, "Team tag is already taken")
        }
        Some("idx_invites_active_pair") => DomainError::conflict(
            ConflictKind::DuplicateInvite,
            "Player already has an open invite from this team",
        ),
        Some("players_pkey") => DomainError::conflict(
            ConflictKind::AlreadyRegistered,
            "Player is already registered",
        ),
        _ => DomainError::storage(format!("{}: {}", context, error)),
    }
}
