pub mod parties;
pub mod succession;

pub use parties::PartyManager;
