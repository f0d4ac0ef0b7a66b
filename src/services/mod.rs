pub mod crawl;
mod discovery;
mod fan_out;
pub mod repair;
mod scrape;

pub use crawl::{CrawlReport, CrawlService};
pub use repair::{RepairReport, RepairService};
