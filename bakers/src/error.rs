use thiserror::Error;

/// Errors surfaced by the baker directory.
///
/// `Clone` because the outcome of a single in-flight fetch is broadcast to
/// every caller that coalesced onto it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The baker source failed (transport, HTTP status, or response decode).
    #[error("baker source error: {0}")]
    Source(String),

    /// A fetch task died without reporting an outcome.
    #[error("baker fetch aborted")]
    Aborted,
}
