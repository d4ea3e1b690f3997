//! In-memory roster store
//!
//! Useful for testing and development. Data is lost when the process
//! terminates. A transaction holds the store's write lock for its whole
//! lifetime and works on a copy of the tables that is swapped in on commit.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::domain::invite::{Invite, InviteId, InviteRepository};
use crate::domain::player::{Player, PlayerId, PlayerRepository};
use crate::domain::store::{RosterStore, RosterTransaction};
use crate::domain::team::{Team, TeamId, TeamQuery, TeamRepository};
use crate::domain::transfer::{Transfer, TransferRepository};
use crate::domain::{ConflictKind, DomainError};

#[derive(Debug, Default, Clone)]
struct RosterTables {
    players: HashMap<PlayerId, Player>,
    teams: HashMap<TeamId, Team>,
    invites: HashMap<InviteId, Invite>,
    transfers: Vec<Transfer>,
}

impl RosterTables {
    fn check_team_unique(&self, team: &Team) -> Result<(), DomainError> {
        for existing in self.teams.values() {
            if existing.name().eq_ignore_ascii_case(team.name()) {
                return Err(DomainError::conflict(
                    ConflictKind::NameTaken,
                    format!("Team name '{}' is already taken", team.name()),
                ));
            }

            if existing.tag() == team.tag() {
                return Err(DomainError::conflict(
                    ConflictKind::TagTaken,
                    format!("Team tag '{}' is already taken", team.tag()),
                ));
            }
        }

        Ok(())
    }
}

/// Thread-safe in-memory implementation of every roster repository
#[derive(Debug, Clone, Default)]
pub struct InMemoryRosterStore {
    tables: Arc<RwLock<RosterTables>>,
}

impl InMemoryRosterStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

/// Open transaction over [`InMemoryRosterStore`]
struct InMemoryTransaction {
    guard: OwnedRwLockWriteGuard<RosterTables>,
    working: RosterTables,
}

#[async_trait]
impl RosterTransaction for InMemoryTransaction {
    async fn insert_team(&mut self, team: &Team) -> Result<(), DomainError> {
        self.working.check_team_unique(team)?;
        self.working.teams.insert(team.id().clone(), team.clone());
        Ok(())
    }

    async fn lock_team(&mut self, id: &TeamId) -> Result<Option<Team>, DomainError> {
        Ok(self.working.teams.get(id).cloned())
    }

    async fn clear_captain(
        &mut self,
        id: &TeamId,
        captain_id: &PlayerId,
    ) -> Result<bool, DomainError> {
        match self.working.teams.get_mut(id) {
            Some(team) if team.is_captain(captain_id) => {
                team.set_captain(None);
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(DomainError::not_found(format!("Team '{}' not found", id))),
        }
    }

    async fn archive_team(&mut self, id: &TeamId) -> Result<bool, DomainError> {
        match self.working.teams.get_mut(id) {
            Some(team) if team.is_active() => {
                team.archive();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(DomainError::not_found(format!("Team '{}' not found", id))),
        }
    }

    async fn list_members(&mut self, id: &TeamId) -> Result<Vec<Player>, DomainError> {
        let mut members: Vec<Player> = self
            .working
            .players
            .values()
            .filter(|p| p.is_member_of(id))
            .cloned()
            .collect();

        members.sort_by_key(|p| p.registered_at());
        Ok(members)
    }

    async fn move_player(
        &mut self,
        player_id: &PlayerId,
        from: Option<&TeamId>,
        to: Option<&TeamId>,
    ) -> Result<bool, DomainError> {
        let player = self
            .working
            .players
            .get_mut(player_id)
            .ok_or_else(|| DomainError::not_found(format!("Player '{}' not found", player_id)))?;

        if player.team_id() != from {
            return Ok(false);
        }

        player.assign_team(to.cloned());
        Ok(true)
    }

    async fn append_transfer(&mut self, transfer: &Transfer) -> Result<(), DomainError> {
        self.working.transfers.push(transfer.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let InMemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl RosterStore for InMemoryRosterStore {
    async fn begin(&self) -> Result<Box<dyn RosterTransaction>, DomainError> {
        let guard = Arc::clone(&self.tables).write_owned().await;
        let working = guard.clone();

        Ok(Box::new(InMemoryTransaction { guard, working }))
    }
}

#[async_trait]
impl PlayerRepository for InMemoryRosterStore {
    async fn get(&self, id: &PlayerId) -> Result<Option<Player>, DomainError> {
        Ok(self.tables.read().await.players.get(id).cloned())
    }

    async fn create(&self, player: Player) -> Result<Player, DomainError> {
        let mut tables = self.tables.write().await;

        if tables.players.contains_key(player.id()) {
            return Err(DomainError::conflict(
                ConflictKind::AlreadyRegistered,
                format!("Player '{}' is already registered", player.id()),
            ));
        }

        tables.players.insert(player.id().clone(), player.clone());
        Ok(player)
    }

    async fn update_profile(&self, player: &Player) -> Result<Player, DomainError> {
        let mut tables = self.tables.write().await;

        let stored = tables
            .players
            .get_mut(player.id())
            .ok_or_else(|| DomainError::not_found(format!("Player '{}' not found", player.id())))?;

        stored
            .set_nickname(player.nickname())
            .map_err(|e| DomainError::validation(e.to_string()))?;
        stored.set_lane(player.lane());
        stored
            .set_bio(player.bio().map(str::to_string))
            .map_err(|e| DomainError::validation(e.to_string()))?;
        stored.set_premium(player.is_premium());

        Ok(stored.clone())
    }

    async fn exists(&self, id: &PlayerId) -> Result<bool, DomainError> {
        Ok(self.tables.read().await.players.contains_key(id))
    }

    async fn list_by_team(&self, team_id: &TeamId) -> Result<Vec<Player>, DomainError> {
        let tables = self.tables.read().await;
        let mut members: Vec<Player> = tables
            .players
            .values()
            .filter(|p| p.is_member_of(team_id))
            .cloned()
            .collect();

        members.sort_by_key(|p| p.registered_at());
        Ok(members)
    }

    async fn list_free_agents(&self) -> Result<Vec<Player>, DomainError> {
        let tables = self.tables.read().await;
        let mut players: Vec<Player> = tables
            .players
            .values()
            .filter(|p| p.team_id().is_none())
            .cloned()
            .collect();

        players.sort_by_key(|p| p.registered_at());
        Ok(players)
    }
}

#[async_trait]
impl TeamRepository for InMemoryRosterStore {
    async fn get(&self, id: &TeamId) -> Result<Option<Team>, DomainError> {
        Ok(self.tables.read().await.teams.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Team>, DomainError> {
        let name = name.trim();
        let tables = self.tables.read().await;

        Ok(tables
            .teams
            .values()
            .find(|t| t.name().eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn find_by_tag(&self, tag: &str) -> Result<Option<Team>, DomainError> {
        let tag = crate::domain::team::normalize_tag(tag);
        let tables = self.tables.read().await;

        Ok(tables.teams.values().find(|t| t.tag() == tag).cloned())
    }

    async fn find_by_captain(&self, captain_id: &PlayerId) -> Result<Option<Team>, DomainError> {
        let tables = self.tables.read().await;

        Ok(tables
            .teams
            .values()
            .find(|t| t.is_captain(captain_id))
            .cloned())
    }

    async fn list(&self, query: &TeamQuery) -> Result<Vec<Team>, DomainError> {
        let tables = self.tables.read().await;
        let mut teams: Vec<Team> = tables
            .teams
            .values()
            .filter(|t| query.matches(t))
            .cloned()
            .collect();

        teams.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(teams)
    }

    async fn replace_captain(
        &self,
        id: &TeamId,
        from: &PlayerId,
        to: &PlayerId,
    ) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;

        let successor_is_member = tables
            .players
            .get(to)
            .is_some_and(|p| p.is_member_of(id));

        let Some(team) = tables.teams.get_mut(id) else {
            return Ok(false);
        };

        if !team.is_active() || !team.is_captain(from) || !successor_is_member {
            return Ok(false);
        }

        team.set_captain(Some(to.clone()));
        Ok(true)
    }
}

#[async_trait]
impl InviteRepository for InMemoryRosterStore {
    async fn get(&self, id: &InviteId) -> Result<Option<Invite>, DomainError> {
        Ok(self.tables.read().await.invites.get(id).cloned())
    }

    async fn insert_exclusive(
        &self,
        invite: Invite,
        now: DateTime<Utc>,
    ) -> Result<Invite, DomainError> {
        let mut tables = self.tables.write().await;

        let existing = tables.invites.values_mut().find(|i| {
            i.active && i.team_id == invite.team_id && i.invitee_id == invite.invitee_id
        });

        if let Some(existing) = existing {
            if existing.is_usable(now) {
                return Err(DomainError::conflict(
                    ConflictKind::DuplicateInvite,
                    format!("Player '{}' already has an open invite", invite.invitee_id),
                ));
            }

            existing.close();
        }

        tables.invites.insert(invite.id.clone(), invite.clone());
        Ok(invite)
    }

    async fn save_decision(
        &self,
        invite: &Invite,
        expected: Option<bool>,
    ) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;

        match tables.invites.get_mut(&invite.id) {
            Some(stored) if stored.active && stored.approved == expected => {
                *stored = invite.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_active(
        &self,
        team_id: &TeamId,
        invitee_id: &PlayerId,
    ) -> Result<Option<Invite>, DomainError> {
        let tables = self.tables.read().await;

        Ok(tables
            .invites
            .values()
            .find(|i| i.active && &i.team_id == team_id && &i.invitee_id == invitee_id)
            .cloned())
    }

    async fn list_active_by_team(&self, team_id: &TeamId) -> Result<Vec<Invite>, DomainError> {
        self.collect_invites(|i| i.active && &i.team_id == team_id)
            .await
    }

    async fn list_active_by_invitee(
        &self,
        invitee_id: &PlayerId,
    ) -> Result<Vec<Invite>, DomainError> {
        self.collect_invites(|i| i.active && &i.invitee_id == invitee_id)
            .await
    }

    async fn list_awaiting_approval(&self) -> Result<Vec<Invite>, DomainError> {
        self.collect_invites(|i| i.active && i.is_pending()).await
    }

    async fn close_all_for_team(&self, team_id: &TeamId) -> Result<u64, DomainError> {
        let mut tables = self.tables.write().await;
        let mut closed = 0;

        for invite in tables
            .invites
            .values_mut()
            .filter(|i| i.active && &i.team_id == team_id)
        {
            invite.close();
            closed += 1;
        }

        Ok(closed)
    }
}

impl InMemoryRosterStore {
    async fn collect_invites(
        &self,
        predicate: impl Fn(&Invite) -> bool,
    ) -> Result<Vec<Invite>, DomainError> {
        let tables = self.tables.read().await;
        let mut invites: Vec<Invite> = tables
            .invites
            .values()
            .filter(|i| predicate(i))
            .cloned()
            .collect();

        invites.sort_by_key(|i| i.created_at);
        Ok(invites)
    }
}

#[async_trait]
impl TransferRepository for InMemoryRosterStore {
    async fn list_by_player(&self, player_id: &PlayerId) -> Result<Vec<Transfer>, DomainError> {
        let tables = self.tables.read().await;

        Ok(tables
            .transfers
            .iter()
            .filter(|t| &t.player_id == player_id)
            .cloned()
            .collect())
    }

    async fn list_by_team(&self, team_id: &TeamId) -> Result<Vec<Transfer>, DomainError> {
        let tables = self.tables.read().await;

        Ok(tables
            .transfers
            .iter()
            .filter(|t| &t.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn list_by_team_between(
        &self,
        team_id: &TeamId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transfer>, DomainError> {
        let tables = self.tables.read().await;

        Ok(tables
            .transfers
            .iter()
            .filter(|t| &t.team_id == team_id && t.recorded_at >= from && t.recorded_at <= to)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::player::LaneRole;
    use crate::domain::team::{League, DEFAULT_TAG_MAX_LENGTH};
    use crate::domain::transfer::TransferKind;
    use chrono::Duration;

    fn player(id: &str) -> Player {
        Player::new(PlayerId::new(id).unwrap(), id, LaneRole::Mid).unwrap()
    }

    fn team(name: &str, tag: &str, captain: &str) -> Team {
        Team::new(
            name,
            tag,
            PlayerId::new(captain).unwrap(),
            League::Prime,
            DEFAULT_TAG_MAX_LENGTH,
        )
        .unwrap()
    }

    async fn store_with_team() -> (InMemoryRosterStore, Team) {
        let store = InMemoryRosterStore::new();
        store.create(player("cap")).await.unwrap();

        let team = team("Blue Otters", "otr", "cap");
        let mut tx = store.begin().await.unwrap();
        tx.insert_team(&team).await.unwrap();
        tx.move_player(&PlayerId::new("cap").unwrap(), None, Some(team.id()))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        (store, team)
    }

    #[tokio::test]
    async fn test_player_registration_conflict() {
        let store = InMemoryRosterStore::new();
        store.create(player("p1")).await.unwrap();

        let err = store.create(player("p1")).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Conflict {
                kind: ConflictKind::AlreadyRegistered,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_committed_transaction_is_visible() {
        let (store, team) = store_with_team().await;

        let cap = PlayerRepository::get(&store, &PlayerId::new("cap").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(cap.is_member_of(team.id()));
        assert!(TeamRepository::get(&store, team.id()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let store = InMemoryRosterStore::new();
        store.create(player("cap")).await.unwrap();
        let team = team("Blue Otters", "otr", "cap");

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_team(&team).await.unwrap();
            tx.append_transfer(&Transfer::new(
                PlayerId::new("cap").unwrap(),
                team.id().clone(),
                TransferKind::TeamCreate,
                LaneRole::Mid,
            ))
            .await
            .unwrap();
        }

        assert!(TeamRepository::get(&store, team.id()).await.unwrap().is_none());
        assert!(TransferRepository::list_by_team(&store, team.id())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_move_player_is_conditional() {
        let (store, team) = store_with_team().await;
        let cap = PlayerId::new("cap").unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(!tx.move_player(&cap, None, Some(team.id())).await.unwrap());
        assert!(tx.move_player(&cap, Some(team.id()), None).await.unwrap());
        tx.commit().await.unwrap();

        assert!(store.list_free_agents().await.unwrap().iter().any(|p| p.id() == &cap));
    }

    #[tokio::test]
    async fn test_name_and_tag_are_globally_unique() {
        let (store, existing) = store_with_team().await;

        let mut tx = store.begin().await.unwrap();
        tx.archive_team(existing.id()).await.unwrap();
        let err = tx
            .insert_team(&team("blue otters", "new", "cap"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Conflict {
                kind: ConflictKind::NameTaken,
                ..
            }
        ));

        let err = tx
            .insert_team(&team("Red Foxes", "OTR", "cap"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Conflict {
                kind: ConflictKind::TagTaken,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_find_by_tag_is_case_insensitive() {
        let (store, team) = store_with_team().await;

        let found = store.find_by_tag("otr").await.unwrap().unwrap();
        assert_eq!(found.id(), team.id());
    }

    #[tokio::test]
    async fn test_replace_captain_requires_membership() {
        let (store, team) = store_with_team().await;
        store.create(player("outsider")).await.unwrap();

        let cap = PlayerId::new("cap").unwrap();
        let outsider = PlayerId::new("outsider").unwrap();

        assert!(!store.replace_captain(team.id(), &cap, &outsider).await.unwrap());

        let mut tx = store.begin().await.unwrap();
        tx.move_player(&outsider, None, Some(team.id())).await.unwrap();
        tx.commit().await.unwrap();

        assert!(store.replace_captain(team.id(), &cap, &outsider).await.unwrap());
        let stored = TeamRepository::get(&store, team.id()).await.unwrap().unwrap();
        assert!(stored.is_captain(&outsider));
    }

    #[tokio::test]
    async fn test_clear_captain_is_conditional() {
        let (store, team) = store_with_team().await;
        let cap = PlayerId::new("cap").unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(!tx
            .clear_captain(team.id(), &PlayerId::new("other").unwrap())
            .await
            .unwrap());
        assert!(tx.clear_captain(team.id(), &cap).await.unwrap());

        let locked = tx.lock_team(team.id()).await.unwrap().unwrap();
        assert!(locked.captain_id().is_none());
        assert!(locked.is_active());
        tx.commit().await.unwrap();

        let stored = TeamRepository::get(&store, team.id()).await.unwrap().unwrap();
        assert!(stored.captain_id().is_none());
    }

    #[tokio::test]
    async fn test_archive_reports_transition_once() {
        let (store, team) = store_with_team().await;

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.list_members(team.id()).await.unwrap().len(), 1);
        assert!(tx.archive_team(team.id()).await.unwrap());
        assert!(!tx.archive_team(team.id()).await.unwrap());
        tx.commit().await.unwrap();

        let stored = TeamRepository::get(&store, team.id()).await.unwrap().unwrap();
        assert!(!stored.is_active());
        assert!(stored.captain_id().is_none());

        let mut tx = store.begin().await.unwrap();
        assert!(tx.archive_team(&TeamId::generate()).await.is_err());
    }

    #[tokio::test]
    async fn test_insert_exclusive_retires_expired_invite() {
        let (store, team) = store_with_team().await;
        store.create(player("rookie")).await.unwrap();
        let now = Utc::now();

        let first = Invite::new(
            team.id().clone(),
            PlayerId::new("cap").unwrap(),
            PlayerId::new("rookie").unwrap(),
            now,
            Duration::days(7),
        );
        store.insert_exclusive(first.clone(), now).await.unwrap();

        let duplicate = Invite::new(
            team.id().clone(),
            PlayerId::new("cap").unwrap(),
            PlayerId::new("rookie").unwrap(),
            now,
            Duration::days(7),
        );
        let err = store.insert_exclusive(duplicate, now).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Conflict {
                kind: ConflictKind::DuplicateInvite,
                ..
            }
        ));

        let later = now + Duration::days(8);
        let replacement = Invite::new(
            team.id().clone(),
            PlayerId::new("cap").unwrap(),
            PlayerId::new("rookie").unwrap(),
            later,
            Duration::days(7),
        );
        store.insert_exclusive(replacement.clone(), later).await.unwrap();

        let active = store.list_active_by_team(team.id()).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, replacement.id);
        assert!(!InviteRepository::get(&store, &first.id).await.unwrap().unwrap().active);
    }

    #[tokio::test]
    async fn test_save_decision_is_compare_and_set() {
        let (store, team) = store_with_team().await;
        let now = Utc::now();
        let invite = Invite::new(
            team.id().clone(),
            PlayerId::new("cap").unwrap(),
            PlayerId::new("rookie").unwrap(),
            now,
            Duration::days(7),
        );
        store.insert_exclusive(invite.clone(), now).await.unwrap();

        let mut approved = invite.clone();
        approved.approve(PlayerId::new("mod").unwrap(), now, Duration::days(7));
        assert!(store.save_decision(&approved, None).await.unwrap());

        let mut declined = invite;
        declined.decline();
        assert!(!store.save_decision(&declined, None).await.unwrap());
    }

    #[tokio::test]
    async fn test_transfers_between_window() {
        let (store, team) = store_with_team().await;
        let transfer = Transfer::new(
            PlayerId::new("cap").unwrap(),
            team.id().clone(),
            TransferKind::TeamCreate,
            LaneRole::Mid,
        );
        let recorded = transfer.recorded_at;

        let mut tx = store.begin().await.unwrap();
        tx.append_transfer(&transfer).await.unwrap();
        tx.commit().await.unwrap();

        let inside = store
            .list_by_team_between(team.id(), recorded - Duration::hours(1), recorded)
            .await
            .unwrap();
        assert_eq!(inside.len(), 1);

        let outside = store
            .list_by_team_between(
                team.id(),
                recorded + Duration::seconds(1),
                recorded + Duration::hours(1),
            )
            .await
            .unwrap();
        assert!(outside.is_empty());
    }
}
