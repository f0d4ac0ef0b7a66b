pub mod federations;
pub mod settings;

pub use federations::{FederationConfig, get_federations};
pub use settings::AppConfig;
