use std::path::PathBuf;
use thiserror::Error;

/// Every way a single upload invocation can fail.
///
/// `IdentityPersistFailed` is the only variant the pipeline treats as
/// non-fatal: it is reported after the URL has already been produced.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Screen capture is not supported on {0}")]
    UnsupportedPlatform(String),

    #[error("Failed to take a screenshot: {0}")]
    CaptureFailed(String),

    #[error("Failed to upload: unsupported file type ({})", .0.display())]
    UnsupportedFileType(PathBuf),

    #[error("Failed to open and read {}: {source}", path.display())]
    FileOpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create multipart/form-data: {0}")]
    EncodeFailed(String),

    #[error("Failed to upload: {0}")]
    NetworkFailed(String),

    #[error("Upload rejected: {status} - {body}")]
    UploadRejected { status: u16, body: String },

    #[error("Response error: {0}")]
    ResponseMalformed(String),

    #[error("Failed to store Gyazo ID: {0}")]
    IdentityPersistFailed(#[source] std::io::Error),
}

impl UploadError {
    /// Whether the failure still leaves the user with a usable URL.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, UploadError::IdentityPersistFailed(_))
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        UploadError::NetworkFailed(err.to_string())
    }
}
