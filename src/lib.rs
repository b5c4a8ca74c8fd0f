pub mod browser;
pub mod config;
pub mod error;
pub mod models;
pub mod parsers;
pub mod report;
pub mod scraping;
pub mod session;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use error::ScrapeError;
pub use session::{RunOutcome, Session};
