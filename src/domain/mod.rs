mod collection;
pub mod models;
pub mod ordering;
mod progress;

pub use collection::{DivisionCollection, PlayerCollection, TeamCollection};
pub use models::*;
pub use progress::{HasData, StageProgress};
