mod round_dates;
mod store;

pub use round_dates::RoundDates;
pub use store::{DIVISIONS_FILE, PLAYERS_FILE, Store, TEAMS_FILE};
