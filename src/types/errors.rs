use std::fmt;

// === CodecError ===

/// Errors raised while encoding or decoding a bookmark blob.
#[derive(Debug)]
pub enum CodecError {
    /// The transport layer (base64 / UTF-8) could not be reversed.
    Transport(String),
    /// The decoded text does not parse as a bookmark record.
    Malformed(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Transport(msg) => write!(f, "Blob transport encoding invalid: {}", msg),
            CodecError::Malformed(msg) => write!(f, "Malformed bookmark record: {}", msg),
        }
    }
}

impl std::error::Error for CodecError {}

// === BackendError ===

/// Errors related to remote store operations.
#[derive(Debug)]
pub enum BackendError {
    /// The backend could not be reached at all.
    Network(String),
    /// The backend answered outside its documented contract.
    Protocol(String),
    /// The backend answered with an unexpected HTTP status.
    Http { status: u16, body: String },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Network(msg) => write!(f, "Backend unreachable: {}", msg),
            BackendError::Protocol(msg) => write!(f, "Backend protocol violation: {}", msg),
            BackendError::Http { status, body } => {
                write!(f, "Unexpected HTTP return code {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for BackendError {}

// === SyncError ===

/// Errors surfaced by a synchronization session.
#[derive(Debug)]
pub enum SyncError {
    /// A bookmark with the target URL already exists at the destination
    /// address. Reported distinctly so the UI can point at the URL field.
    UrlExists,
    /// The stored record and the edited record do not share a consistent
    /// shape, so they cannot be diffed safely.
    Inconsistent,
    /// The stored blob could not be decoded, or the record not encoded.
    Codec(CodecError),
    /// The remote call itself failed.
    Backend(BackendError),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::UrlExists => write!(f, "A bookmark with that URL already exists"),
            SyncError::Inconsistent => write!(f, "Records are structurally inconsistent"),
            SyncError::Codec(err) => write!(f, "{}", err),
            SyncError::Backend(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SyncError {}

impl From<CodecError> for SyncError {
    fn from(err: CodecError) -> Self {
        SyncError::Codec(err)
    }
}

impl From<BackendError> for SyncError {
    fn from(err: BackendError) -> Self {
        SyncError::Backend(err)
    }
}
