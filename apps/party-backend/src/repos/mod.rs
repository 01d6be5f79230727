//! Domain-to-storage mapping for parties and invites.

pub mod groups;
pub mod invites;
pub mod keys;
