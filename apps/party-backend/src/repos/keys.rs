//! Backing-store key schema.
//!
//! - `group:<name>`: field = player, value = `"true"` (leader) or `"false"`
//! - `pending_invites:<target>`: field = `"sender:<sender>"`, value = `"true"`
//! - `group_index`: field = player, value = group name

pub const GROUP_PREFIX: &str = "group:";
pub const INVITE_PREFIX: &str = "pending_invites:";
pub const SENDER_PREFIX: &str = "sender:";
pub const GROUP_INDEX: &str = "group_index";
pub const GROUP_NAME_PREFIX: &str = "group_";

pub const LEADER_FLAG: &str = "true";
pub const MEMBER_FLAG: &str = "false";
pub const PRESENT: &str = "true";

pub fn group_key(group: &str) -> String {
    format!("{GROUP_PREFIX}{group}")
}

/// Pattern matching every group collection.
pub fn group_pattern() -> String {
    format!("{GROUP_PREFIX}*")
}

/// Inverse of [`group_key`].
pub fn group_name_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(GROUP_PREFIX).filter(|name| !name.is_empty())
}

/// Generated group name for a numeric suffix (`group_1`, `group_2`, ...).
pub fn group_name(n: u64) -> String {
    format!("{GROUP_NAME_PREFIX}{n}")
}

pub fn invite_key(target: &str) -> String {
    format!("{INVITE_PREFIX}{target}")
}

pub fn sender_field(sender: &str) -> String {
    format!("{SENDER_PREFIX}{sender}")
}

pub fn sender_from_field(field: &str) -> Option<&str> {
    field.strip_prefix(SENDER_PREFIX)
}
