use thiserror::Error;

/// Failures the orchestrator and operators care to tell apart.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("packing date cell {0} is empty")]
    EmptyPackingDate(String),

    #[error("login was rejected: the login form is still shown after submit")]
    LoginRejected,

    #[error("element not found: {0}")]
    MissingElement(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("unexpected script result: {0}")]
    Script(String),
}
