//! Party state machine.
//!
//! Per player: not in a party, leader, or member. Per (sender, target)
//! pair: no invite or pending. Not-found and no-op outcomes come back as
//! `false`, `None` or empty vectors; only store failures are errors, and
//! those are returned untouched so callers can answer "try again".
//!
//! The plain operations leave authorization to the caller, who checks
//! `is_player_leader` first. `exclude_as` and `disband_as` enforce it here
//! instead and return `DomainError::Forbidden`.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::domain::DomainError;
use crate::repos::groups::{self, Group};
use crate::repos::invites;
use crate::services::succession::{RandomSuccession, SuccessionPolicy};
use crate::store::KvStore;

pub struct PartyManager {
    store: Arc<dyn KvStore>,
    succession: Box<dyn SuccessionPolicy>,
    max_members: Option<usize>,
}

impl PartyManager {
    /// Random succession, no member limit.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            succession: Box::new(RandomSuccession::default()),
            max_members: None,
        }
    }

    pub fn with_succession(mut self, succession: Box<dyn SuccessionPolicy>) -> Self {
        self.succession = succession;
        self
    }

    pub fn with_max_members(mut self, max_members: Option<usize>) -> Self {
        self.max_members = max_members;
        self
    }

    pub fn max_members(&self) -> Option<usize> {
        self.max_members
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    fn kv(&self) -> &dyn KvStore {
        self.store.as_ref()
    }

    /// New party led by `player`; no-op when `player` is already in one.
    pub async fn create_party(&self, player: &str) -> Result<(), DomainError> {
        if groups::resolve_group_for_player(self.kv(), player)
            .await?
            .is_some()
        {
            debug!(player, "create_party: already in a party");
            return Ok(());
        }

        let group = groups::create_group(self.kv(), player).await?;
        info!(player, group = %group, "party created");
        Ok(())
    }

    /// Record a pending invite. Repeating it overwrites the earlier one.
    pub async fn invite_player(&self, sender: &str, target: &str) -> Result<(), DomainError> {
        invites::save(self.kv(), sender, target).await?;
        info!(sender, target, "invite sent");
        Ok(())
    }

    /// Join `sender`'s party if `sender` is the canonical pending sender for
    /// `target`.
    ///
    /// Returns `false` without consuming the invite when `target` is
    /// already in a party or the party is full. An invite whose sender has
    /// no party any more is discarded.
    pub async fn accept_invite(&self, sender: &str, target: &str) -> Result<bool, DomainError> {
        let canonical = invites::first_sender(self.kv(), target).await?;
        if canonical.as_deref() != Some(sender) {
            warn!(sender, target, ?canonical, "accept_invite: no matching pending invite");
            return Ok(false);
        }

        if groups::resolve_group_for_player(self.kv(), target)
            .await?
            .is_some()
        {
            warn!(sender, target, "accept_invite: target already in a party");
            return Ok(false);
        }

        let Some(party) = groups::group_of(self.kv(), sender).await? else {
            warn!(sender, target, "accept_invite: sender has no party, dropping invite");
            invites::remove(self.kv(), sender, target).await?;
            return Ok(false);
        };

        if let Some(limit) = self.max_members {
            if party.members.len() >= limit {
                warn!(sender, target, group = %party.name, limit, "accept_invite: party is full");
                return Ok(false);
            }
        }

        if groups::add_member(self.kv(), sender, target).await?.is_none() {
            warn!(sender, target, "accept_invite: sender left before the join");
            invites::remove(self.kv(), sender, target).await?;
            return Ok(false);
        }
        invites::remove(self.kv(), sender, target).await?;

        info!(sender, target, group = %party.name, "invite accepted");
        Ok(true)
    }

    /// Drop the invite `sender` -> `target`. `false` when `target` has no
    /// pending invite at all.
    pub async fn refuse_invite(&self, sender: &str, target: &str) -> Result<bool, DomainError> {
        if !invites::any_pending(self.kv(), target).await? {
            warn!(sender, target, "refuse_invite: no invite pending");
            return Ok(false);
        }

        invites::remove(self.kv(), sender, target).await?;
        info!(sender, target, "invite refused");
        Ok(true)
    }

    /// Leave the current party, handing leadership on if needed. Silent
    /// no-op when not in a party.
    pub async fn leave_party(&self, player: &str) -> Result<(), DomainError> {
        match groups::remove_member(self.kv(), self.succession.as_ref(), player).await? {
            Some(removal) => {
                info!(
                    player,
                    group = %removal.group,
                    was_leader = removal.was_leader,
                    new_leader = ?removal.new_leader,
                    emptied = removal.emptied,
                    "left party"
                );
            }
            None => debug!(player, "leave_party: not in a party"),
        }
        Ok(())
    }

    /// Remove `target` from its party. Same semantics as `leave_party`.
    pub async fn exclude_player(&self, target: &str) -> Result<(), DomainError> {
        self.leave_party(target).await
    }

    /// Delete the party `player` belongs to.
    pub async fn disband_party(&self, player: &str) -> Result<(), DomainError> {
        match groups::delete_group(self.kv(), player).await? {
            Some(group) => info!(player, group = %group, "party disbanded"),
            None => debug!(player, "disband_party: not in a party"),
        }
        Ok(())
    }

    /// `exclude_player` issued by `leader`, who must lead `target`'s party.
    pub async fn exclude_as(&self, leader: &str, target: &str) -> Result<(), DomainError> {
        let party = self.require_leader(leader).await?;
        if !party.members.iter().any(|member| member == target) {
            return Err(DomainError::forbidden(format!(
                "{target} is not in {leader}'s party"
            )));
        }
        if target == leader {
            return self.leave_party(leader).await;
        }
        self.exclude_player(target).await
    }

    /// `disband_party` issued by `leader`, who must lead a party.
    pub async fn disband_as(&self, leader: &str) -> Result<(), DomainError> {
        self.require_leader(leader).await?;
        self.disband_party(leader).await
    }

    async fn require_leader(&self, player: &str) -> Result<Group, DomainError> {
        match groups::group_of(self.kv(), player).await? {
            Some(party) if party.leader.as_deref() == Some(player) => Ok(party),
            Some(_) => Err(DomainError::forbidden(format!(
                "{player} is not the party leader"
            ))),
            None => Err(DomainError::forbidden(format!("{player} is not in a party"))),
        }
    }

    pub async fn is_player_in_party(&self, player: &str) -> Result<bool, DomainError> {
        Ok(groups::resolve_group_for_player(self.kv(), player)
            .await?
            .is_some())
    }

    pub async fn is_player_leader(&self, player: &str) -> Result<bool, DomainError> {
        groups::is_leader(self.kv(), player).await
    }

    /// Sorted member names; empty when `player` is not in a party.
    pub async fn get_party_members(&self, player: &str) -> Result<Vec<String>, DomainError> {
        groups::members(self.kv(), player).await
    }

    /// Party name, leader and members for `player`.
    pub async fn get_party(&self, player: &str) -> Result<Option<Group>, DomainError> {
        groups::group_of(self.kv(), player).await
    }

    /// Senders with an invite pending for `target`, sorted.
    pub async fn get_pending_invites(&self, target: &str) -> Result<Vec<String>, DomainError> {
        invites::senders(self.kv(), target).await
    }

    /// The sender `accept_invite` and `refuse_invite` would act on.
    pub async fn get_invitation_sender(&self, target: &str) -> Result<Option<String>, DomainError> {
        invites::first_sender(self.kv(), target).await
    }

    pub async fn has_pending_invite(&self, sender: &str, target: &str) -> Result<bool, DomainError> {
        invites::exists(self.kv(), sender, target).await
    }

    pub async fn remove_pending_invite(&self, sender: &str, target: &str) -> Result<(), DomainError> {
        invites::remove(self.kv(), sender, target).await
    }

    pub async fn remove_all_pending_invites(&self, target: &str) -> Result<(), DomainError> {
        invites::remove_all(self.kv(), target).await
    }

    /// Rebuild the player -> party index from the stored parties.
    pub async fn rebuild_index(&self) -> Result<usize, DomainError> {
        groups::rebuild_index(self.kv()).await
    }
}
