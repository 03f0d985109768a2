use thiserror::Error;

/**
    Errors raised while rewriting a downloaded archive.
*/
#[derive(Debug, Clone, Error)]
pub enum PatchError {
    // ── Archive shape ─────────────────────────────────────────────────
    #[error("no application bundle found in archive")]
    PayloadBundleNameUnavailable,
    #[error("sinf manifest has no path for sinf {0}")]
    PayloadSinfUnavailable(u64),
    #[error("application descriptor unavailable")]
    PayloadInfoUnavailable,
    #[error("license carries no sinf records")]
    NoSinfs,

    // ── Codecs ────────────────────────────────────────────────────────
    #[error("archive error: {0}")]
    Archive(String),
    #[error("invalid property list: {0}")]
    Plist(String),
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<zip::result::ZipError> for PatchError {
    fn from(e: zip::result::ZipError) -> Self {
        Self::Archive(e.to_string())
    }
}

impl From<plist::Error> for PatchError {
    fn from(e: plist::Error) -> Self {
        Self::Plist(e.to_string())
    }
}

impl From<std::io::Error> for PatchError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/**
    Type alias for results that may return a [`PatchError`].
*/
pub type PatchResult<T> = std::result::Result<T, PatchError>;
