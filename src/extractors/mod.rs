//! Pure document-to-record parsers, one per upstream page type
//!
//! Every extractor accepts `None` for a page that could not be fetched and
//! then returns its empty record shape.

mod common;
pub mod competition;
pub mod division;
pub mod pairing;
pub mod player;
pub mod ratings_history;
pub mod round;
pub mod team;

pub use competition::{CompetitionPage, TeamNamePattern, extract_competition};
pub use division::extract_division;
pub use pairing::{GHOST_PLAYER, PairingLookup, extract_opponent_rating};
pub use player::extract_player;
pub use ratings_history::{extract_monthly_ratings, ratings_url};
pub use round::extract_round_date;
pub use team::{Fixture, TeamPage, extract_team};
