//! In-memory `SheetStore` recording every mutation, for tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::SheetStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetOp {
    Write { range: String, rows: Vec<Vec<String>> },
    Clear { range: String },
}

#[derive(Default)]
pub struct MemorySheet {
    pub cells: Mutex<HashMap<String, Vec<Vec<String>>>>,
    pub ops: Mutex<Vec<SheetOp>>,
    pub fail_auth: bool,
    /// Writes to ranges starting with this prefix fail.
    pub fail_writes_to: Option<String>,
}

impl MemorySheet {
    pub fn with_cell(range: &str, value: &str) -> Self {
        let sheet = Self::default();
        sheet
            .cells
            .lock()
            .unwrap()
            .insert(range.to_string(), vec![vec![value.to_string()]]);
        sheet
    }

    pub fn ops(&self) -> Vec<SheetOp> {
        self.ops.lock().unwrap().clone()
    }

    /// Writes whose range starts with `prefix`, in order.
    pub fn writes_to(&self, prefix: &str) -> Vec<(String, Vec<Vec<String>>)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                SheetOp::Write { range, rows } if range.starts_with(prefix) => Some((range, rows)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl SheetStore for MemorySheet {
    async fn authenticate(&self) -> Result<()> {
        if self.fail_auth {
            return Err(anyhow!("invalid service account key"));
        }
        Ok(())
    }

    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>> {
        Ok(self.cells.lock().unwrap().get(range).cloned().unwrap_or_default())
    }

    async fn write_range(&self, range: &str, rows: &[Vec<String>]) -> Result<()> {
        if let Some(prefix) = &self.fail_writes_to {
            if range.starts_with(prefix.as_str()) {
                return Err(anyhow!("quota exceeded writing {}", range));
            }
        }
        self.cells
            .lock()
            .unwrap()
            .insert(range.to_string(), rows.to_vec());
        self.ops.lock().unwrap().push(SheetOp::Write {
            range: range.to_string(),
            rows: rows.to_vec(),
        });
        Ok(())
    }

    async fn clear_range(&self, range: &str) -> Result<()> {
        self.ops.lock().unwrap().push(SheetOp::Clear {
            range: range.to_string(),
        });
        Ok(())
    }
}
