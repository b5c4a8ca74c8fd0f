use anyhow::Result;
use async_trait::async_trait;

mod google_sheets;
pub mod range;
pub use google_sheets::GoogleSheets;

#[cfg(test)]
pub(crate) mod memory;

/// A spreadsheet seen as ranges of string cells, addressed in A1 notation.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Acquire credentials; must succeed before any other call.
    async fn authenticate(&self) -> Result<()>;
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>>;
    async fn write_range(&self, range: &str, rows: &[Vec<String>]) -> Result<()>;
    async fn clear_range(&self, range: &str) -> Result<()>;
}
