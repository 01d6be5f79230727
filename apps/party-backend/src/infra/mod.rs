//! Infrastructure layer - store connection supervision and state assembly.

pub mod state;
pub mod supervisor;
