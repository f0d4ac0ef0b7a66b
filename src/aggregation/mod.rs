//! Merging of per-instance records into aggregated entities
//!
//! Averages are always recomputed from the raw rating lists after a merge,
//! never updated incrementally.

pub mod membership;
pub mod players;
pub mod teams;

pub use membership::{MembershipIndex, UNKNOWN_TEAM};
