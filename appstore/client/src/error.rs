use thiserror::Error;

/**
    Errors surfaced by the store protocol exchange.

    Vendor failure codes are mapped onto the account and license kinds;
    anything unmapped is carried verbatim in [`StoreError::UnknownFailure`].
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    // ── Account ───────────────────────────────────────────────────────
    #[error("invalid account credentials")]
    InvalidCredentials,
    #[error("store service temporarily unavailable")]
    ServiceTemporarilyUnavailable,
    #[error("session is not authenticated")]
    SessionUnavailable,
    #[error("session has expired, sign in again")]
    SessionExpired,

    // ── License ───────────────────────────────────────────────────────
    #[error("no license available for this package")]
    LicenseUnavailable,
    #[error("license already exists for this package")]
    LicenseAlreadyExists,

    // ── Vendor ────────────────────────────────────────────────────────
    #[error("unknown failure type '{0}'")]
    UnknownFailure(String),

    // ── Transport / decoding ──────────────────────────────────────────
    #[error("transport error: {0}")]
    Transport(String),
    #[error("store returned HTTP {0}")]
    HttpStatus(u16),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("property list error: {0}")]
    Plist(String),
    #[error("JSON error: {0}")]
    Json(String),
}

impl StoreError {
    /**
        Returns true if the caller may retry the same request unchanged.
    */
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceTemporarilyUnavailable)
    }

    /**
        Returns true if the caller must sign in again before retrying.
    */
    pub fn requires_authentication(&self) -> bool {
        matches!(self, Self::SessionUnavailable | Self::SessionExpired)
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<plist::Error> for StoreError {
    fn from(e: plist::Error) -> Self {
        Self::Plist(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

/**
    Type alias for results that may return a [`StoreError`].
*/
pub type StoreResult<T> = std::result::Result<T, StoreError>;
