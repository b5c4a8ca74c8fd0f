pub mod product;
pub mod status;

pub use product::*;
pub use status::*;

/// Sentinel written into every cell the site did not provide.
pub const NOT_AVAILABLE: &str = "N/A";
