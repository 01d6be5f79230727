//! Group collections and the player -> group index.
//!
//! Every membership write touches the group collection and `group_index` in
//! one atomic batch. Lookups go through the index and verify it against the
//! group collection; an entry pointing at a group the player is no longer in
//! is deleted on sight.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::errors::domain::DomainError;
use crate::repos::keys::{
    group_key, group_name, group_name_from_key, group_pattern, GROUP_INDEX, LEADER_FLAG,
    MEMBER_FLAG,
};
use crate::services::succession::SuccessionPolicy;
use crate::store::{Guard, KvStore, Mutation};

/// Snapshot of one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub leader: Option<String>,
    /// Sorted by name.
    pub members: Vec<String>,
}

impl Group {
    fn from_fields(name: String, fields: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut leader = None;
        let mut members = Vec::new();
        for (member, flag) in fields {
            if flag == LEADER_FLAG {
                leader = Some(member.clone());
            }
            members.push(member);
        }
        members.sort();
        Self {
            name,
            leader,
            members,
        }
    }
}

/// What `remove_member` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub group: String,
    pub was_leader: bool,
    pub new_leader: Option<String>,
    /// The removed member was the last one; the group no longer exists.
    pub emptied: bool,
}

/// Index lookup, verified against the group collection.
pub async fn resolve_group_for_player(
    store: &dyn KvStore,
    player: &str,
) -> Result<Option<String>, DomainError> {
    loop {
        let Some(group) = store.get_field(GROUP_INDEX, player).await? else {
            return Ok(None);
        };

        if store.field_exists(&group_key(&group), player).await? {
            return Ok(Some(group));
        }

        // Delete only if the entry still names `group`.
        let healed = store
            .apply_guarded(
                Guard::field_equals(GROUP_INDEX, player, group.as_str()),
                vec![Mutation::delete(GROUP_INDEX, player)],
            )
            .await?;
        if healed {
            warn!(player, group = %group, "removed stale group index entry");
            return Ok(None);
        }
        debug!(player, group = %group, "group index entry moved while healing");
    }
}

/// Create a fresh group led by `creator` and return its name.
///
/// Takes the lowest `group_<n>` that is free at the moment of the write;
/// the claim and the index entry land together or not at all.
/// Callers check that `creator` is not already in a group.
pub async fn create_group(store: &dyn KvStore, creator: &str) -> Result<String, DomainError> {
    let mut n = 1u64;
    loop {
        let group = group_name(n);
        let key = group_key(&group);
        let claimed = store
            .apply_guarded(
                Guard::absent(key.as_str()),
                vec![
                    Mutation::set(key.as_str(), creator, LEADER_FLAG),
                    Mutation::set(GROUP_INDEX, creator, group.as_str()),
                ],
            )
            .await?;
        if claimed {
            debug!(creator, group = %group, "group created");
            return Ok(group);
        }
        n += 1;
    }
}

/// Add `new_member` to the group `owner` belongs to. `None` when the owner
/// has no group.
pub async fn add_member(
    store: &dyn KvStore,
    owner: &str,
    new_member: &str,
) -> Result<Option<String>, DomainError> {
    let Some(group) = resolve_group_for_player(store, owner).await? else {
        return Ok(None);
    };

    store
        .apply(vec![
            Mutation::set(group_key(&group), new_member, MEMBER_FLAG),
            Mutation::set(GROUP_INDEX, new_member, group.as_str()),
        ])
        .await?;

    Ok(Some(group))
}

/// Remove `member` from its group, promoting a successor when the leader
/// leaves a non-empty group.
pub async fn remove_member(
    store: &dyn KvStore,
    policy: &dyn SuccessionPolicy,
    member: &str,
) -> Result<Option<Removal>, DomainError> {
    let Some(group) = resolve_group_for_player(store, member).await? else {
        return Ok(None);
    };

    let key = group_key(&group);
    let mut fields = store.get_all_fields(&key).await?;
    let Some(flag) = fields.remove(member) else {
        // Removed concurrently between the lookup and the read.
        return Ok(None);
    };

    let was_leader = flag == LEADER_FLAG;
    let mut remaining: Vec<String> = fields.into_keys().collect();
    remaining.sort();

    let mut batch = vec![
        Mutation::delete(key.as_str(), member),
        Mutation::delete(GROUP_INDEX, member),
    ];

    let new_leader = if was_leader {
        policy.choose(&remaining)
    } else {
        None
    };
    if let Some(successor) = &new_leader {
        batch.push(Mutation::set(key.as_str(), successor.as_str(), LEADER_FLAG));
    }

    store.apply(batch).await?;

    Ok(Some(Removal {
        group,
        was_leader,
        new_leader,
        emptied: remaining.is_empty(),
    }))
}

pub async fn is_leader(store: &dyn KvStore, member: &str) -> Result<bool, DomainError> {
    let Some(group) = resolve_group_for_player(store, member).await? else {
        return Ok(false);
    };
    let flag = store.get_field(&group_key(&group), member).await?;
    Ok(flag.as_deref() == Some(LEADER_FLAG))
}

/// Group `player` belongs to, with its leader and members.
pub async fn group_of(store: &dyn KvStore, player: &str) -> Result<Option<Group>, DomainError> {
    let Some(group) = resolve_group_for_player(store, player).await? else {
        return Ok(None);
    };
    let fields = store.get_all_fields(&group_key(&group)).await?;
    if fields.is_empty() {
        return Ok(None);
    }
    Ok(Some(Group::from_fields(group, fields)))
}

/// Members of the group `player` belongs to, sorted; empty when none.
pub async fn members(store: &dyn KvStore, player: &str) -> Result<Vec<String>, DomainError> {
    Ok(group_of(store, player)
        .await?
        .map(|group| group.members)
        .unwrap_or_default())
}

/// Delete the group `member` belongs to along with every member's index
/// entry. Returns the deleted group's name.
pub async fn delete_group(store: &dyn KvStore, member: &str) -> Result<Option<String>, DomainError> {
    let Some(group) = resolve_group_for_player(store, member).await? else {
        return Ok(None);
    };

    let key = group_key(&group);
    let fields = store.get_all_fields(&key).await?;

    let mut batch: Vec<Mutation> = fields
        .keys()
        .map(|player| Mutation::delete(GROUP_INDEX, player.as_str()))
        .collect();
    batch.push(Mutation::drop_collection(key));
    store.apply(batch).await?;

    Ok(Some(group))
}

/// Rebuild `group_index` from every `group:*` collection. Returns the
/// number of indexed players.
pub async fn rebuild_index(store: &dyn KvStore) -> Result<usize, DomainError> {
    let keys = store.list_collection_keys(&group_pattern()).await?;

    let mut index: BTreeMap<String, String> = BTreeMap::new();
    for key in &keys {
        let Some(group) = group_name_from_key(key) else {
            continue;
        };
        let fields = store.get_all_fields(key).await?;
        for player in fields.into_keys() {
            if let Some(existing) = index.get(&player) {
                warn!(
                    player = %player,
                    kept = %existing,
                    ignored = group,
                    "player found in more than one group"
                );
                continue;
            }
            index.insert(player, group.to_string());
        }
    }

    let indexed = index.len();
    let mut batch = vec![Mutation::drop_collection(GROUP_INDEX)];
    batch.extend(
        index
            .into_iter()
            .map(|(player, group)| Mutation::set(GROUP_INDEX, player, group)),
    );
    store.apply(batch).await?;

    info!(groups = keys.len(), players = indexed, "group index rebuilt");
    Ok(indexed)
}
