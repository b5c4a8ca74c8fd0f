use serde::{Deserialize, Serialize};
use std::fmt;

/// Health of one run as shown in the status cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    Running,
    Success,
    Error,
    NoProducts,
    NoUrls,
    DateDisabled,
}

impl RunStatus {
    pub fn key(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Success => "success",
            RunStatus::Error => "error",
            RunStatus::NoProducts => "no-products",
            RunStatus::NoUrls => "no-urls",
            RunStatus::DateDisabled => "date-disabled",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Running => write!(f, "RUNNING"),
            RunStatus::Success => write!(f, "SUCCESS"),
            RunStatus::Error => write!(f, "ERROR"),
            RunStatus::NoProducts => write!(f, "NO PRODUCTS"),
            RunStatus::NoUrls => write!(f, "NO URLS"),
            RunStatus::DateDisabled => write!(f, "DATE DISABLED"),
        }
    }
}
