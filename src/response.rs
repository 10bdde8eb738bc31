// Interpretation of the upload reply. The branch is chosen by the same `Mode`
// that chose the request shape.

use crate::api::{Image, Mode, RawResponse};
use crate::error::UploadError;
use crate::identity::Identity;

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub url: String,
    /// Server-assigned identity to persist (anonymous mode only).
    pub identity: Option<Identity>,
}

pub fn parse(mode: &Mode, response: RawResponse) -> Result<UploadResult, UploadError> {
    if !(200..300).contains(&response.status) {
        return Err(UploadError::UploadRejected {
            status: response.status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        });
    }

    match mode {
        Mode::Authenticated(_) => parse_api(&response.body),
        Mode::Anonymous(_) => parse_legacy(response),
    }
}

fn parse_api(body: &[u8]) -> Result<UploadResult, UploadError> {
    let image: Image = serde_json::from_slice(body)
        .map_err(|e| UploadError::ResponseMalformed(format!("invalid image JSON: {e}")))?;
    if image.permalink_url.is_empty() {
        return Err(UploadError::ResponseMalformed(
            "empty permalink_url".to_string(),
        ));
    }
    Ok(UploadResult {
        url: image.permalink_url,
        identity: None,
    })
}

// The body is the URL, byte for byte.
fn parse_legacy(response: RawResponse) -> Result<UploadResult, UploadError> {
    let url = String::from_utf8(response.body)
        .map_err(|e| UploadError::ResponseMalformed(format!("body is not UTF-8: {e}")))?;
    if url.is_empty() {
        return Err(UploadError::ResponseMalformed("empty body".to_string()));
    }
    let identity = response
        .gyazo_id
        .filter(|id| !id.is_empty())
        .map(Identity::new);
    Ok(UploadResult { url, identity })
}
