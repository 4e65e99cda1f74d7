use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a page could not be fetched.
///
/// Data sources report these through [`crate::FetchResult::error`] rather than returning
/// `Err`; the window manager logs them and leaves the gap in place.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[source] BoxError),
    #[error("unexpected status: {status} body={body}")]
    Status { status: u16, body: String },
    #[error("failed to decode page: {0}")]
    Decode(#[source] BoxError),
    #[error("data source error: {0}")]
    Source(String),
    #[error("fetch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl FetchError {
    pub fn source_error(message: impl Into<String>) -> Self {
        Self::Source(message.into())
    }
}

#[cfg(feature = "rest")]
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(Box::new(err))
        } else {
            Self::Http(Box::new(err))
        }
    }
}

#[cfg(feature = "rest")]
impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(Box::new(err))
    }
}
