/// Error taxonomy for the photo and report pipeline
///
/// Photo-level failures (`Decode`) are scoped to a single photo, surface
/// failures abort one generation call, and storage failures are swallowed
/// by the session store after logging.

pub type SnapResult<T> = Result<T, SnapError>;

#[derive(thiserror::Error, Debug)]
pub enum SnapError {
    #[error("decode error: {0}")]
    Decode(String),

    #[error("surface error: {0}")]
    Surface(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("delivery error: {0}")]
    Delivery(String),
}

impl SnapError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }
}

impl From<rusqlite::Error> for SnapError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for SnapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(format!("session record: {err}"))
    }
}

impl From<image::ImageError> for SnapError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode(err.to_string())
    }
}
