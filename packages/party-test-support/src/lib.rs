//! Shared helpers for the party backend's unit and integration tests:
//! idempotent log setup, unique player names and problem-details assertions.

pub mod logging;
pub mod problem_details;
pub mod unique_helpers;
