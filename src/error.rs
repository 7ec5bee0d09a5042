//! Error types for the IMAP library.

use std::time::Duration;

use thiserror::Error;

use crate::types::Uid;

/// Errors that can occur during IMAP operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error during network operations. Retriable.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS handshake or encryption error. Retriable.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Invalid DNS name for TLS. Not retriable (configuration problem).
    #[error("Invalid DNS name: {0}")]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),

    /// Protocol parsing error.
    #[error("Protocol error at position {position}: {message}")]
    Parse {
        /// Byte position where the error occurred.
        position: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// Authentication failed (LOGIN returned NO/BAD). Not retriable.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Server returned NO response.
    #[error("Server returned NO: {0}")]
    No(String),

    /// Server returned BAD response.
    #[error("Server returned BAD: {0}")]
    Bad(String),

    /// Server sent BYE (disconnecting).
    #[error("Server sent BYE: {0}")]
    Bye(String),

    /// Operation timed out. Retriable.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid state for the requested operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Protocol violation or unexpected data. Connection should be discarded.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The connection was lost and reconnection attempts were exhausted.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// Invalid configuration value (e.g. `pool_max_per_key` of 0).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// SELECT/EXAMINE of a mailbox failed.
    #[error("failed to select mailbox: {0}")]
    MailboxSelection(String),

    /// CREATE/RENAME target already exists.
    #[error("folder already exists: {0}")]
    FolderExists(String),

    /// DELETE/RENAME/STATUS target does not exist.
    #[error("folder not found: {0}")]
    FolderNotFound(String),

    /// Operation refused because it targets a protected default folder (e.g. INBOX).
    #[error("operation not permitted on default folder: {0}")]
    DefaultFolder(String),

    /// SEARCH/UID SEARCH failed.
    #[error("search failed: {0}")]
    Search(String),

    /// FETCH/UID FETCH failed.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// STORE/UID STORE failed.
    #[error("store failed: {0}")]
    Store(String),

    /// COPY/UID COPY failed.
    #[error("copy failed: {0}")]
    Copy(String),

    /// MOVE/UID MOVE (or its COPY+STORE+EXPUNGE emulation) failed.
    #[error("move failed: {0}")]
    Move(String),

    /// APPEND failed.
    #[error("append failed: {0}")]
    Append(String),

    /// EXPUNGE/UID EXPUNGE failed.
    #[error("expunge failed: {0}")]
    Expunge(String),

    /// STATUS failed.
    #[error("status failed: {0}")]
    Status(String),

    /// Argument failed validation (e.g. an empty `MessageSet`, a mailbox-binding mismatch).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A batched operation partially succeeded; some identifiers failed.
    #[error("{} of {} messages failed", failures.len(), succeeded + failures.len())]
    PartialOperation {
        /// Number of identifiers processed successfully.
        succeeded: usize,
        /// Per-UID failures.
        failures: Vec<(Uid, Box<Error>)>,
    },

    /// The mailbox's UIDVALIDITY changed since it was last observed; cached UIDs are void.
    #[error("UIDVALIDITY changed: expected {expected}, found {found}")]
    UidValidityChanged {
        /// Previously observed UIDVALIDITY.
        expected: u32,
        /// Currently reported UIDVALIDITY.
        found: u32,
    },
}

impl Error {
    /// Returns true if the operation that produced this error is safe to retry
    /// after reconnecting, per the retry policy.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Tls(_) | Self::Timeout(_))
    }

    /// Wraps a server `NO`/`BAD`/`BYE` diagnostic into an operation-specific
    /// variant, preserving the server's text. Used by service-layer call sites
    /// so the generic `No`/`Bad` wire error becomes a typed, actionable one.
    #[must_use]
    pub fn into_operation(self, map: impl FnOnce(String) -> Self) -> Self {
        match self {
            Self::No(text) | Self::Bad(text) => map(text),
            other => other,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
