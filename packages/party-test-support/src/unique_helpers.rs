//! Unique test data so suites sharing one store never collide.

use ulid::Ulid;

/// Longest prefix that still leaves room for the random suffix inside the
/// backend's 32-character player name limit.
const MAX_PREFIX_LEN: usize = 19;

/// A valid player name starting with `prefix`, e.g. `alice_01HZX3K9QW7M`.
///
/// ```
/// use party_test_support::unique_helpers::unique_player;
///
/// let a = unique_player("alice");
/// let b = unique_player("alice");
/// assert_ne!(a, b);
/// assert!(a.starts_with("alice_"));
/// assert!(a.len() <= 32);
/// ```
pub fn unique_player(prefix: &str) -> String {
    let prefix: String = prefix.chars().take(MAX_PREFIX_LEN).collect();
    let ulid = Ulid::new().to_string();
    // The last 12 characters are all randomness.
    format!("{prefix}_{}", &ulid[ulid.len() - 12..])
}

/// `count` distinct player names sharing one prefix.
pub fn unique_players(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|_| unique_player(prefix)).collect()
}
