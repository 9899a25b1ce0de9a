use crate::pdf::CanvasError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An operation other than `reset`/`check_page_space` ran before
    /// `create_document`.
    #[error("document must be created before {operation}")]
    Uninitialized { operation: &'static str },

    #[error("headers are required for table generation")]
    MissingHeaders,

    #[error("failed to export PDF: {0}")]
    Export(#[source] CanvasError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid report definition: {0}")]
    Report(#[from] serde_json::Error),
}

impl Error {
    /// True for caller mistakes that abort the current document rather than
    /// anything about its content.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::Uninitialized { .. })
    }
}
