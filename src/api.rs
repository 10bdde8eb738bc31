// Upload transport: a small blocking HTTP client that talks to the Gyazo
// upload endpoint in one of two modes. The endpoint is fixed when the client
// is built and the mode travels with each request.

use crate::error::UploadError;
use crate::identity::Identity;
use reqwest::blocking::{multipart, Client, Request};
use serde::Deserialize;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// Response header carrying a server-assigned identity (anonymous mode).
pub const GYAZO_ID_HEADER: &str = "X-Gyazo-Id";

/// How this invocation authenticates. Decided once before any network I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Bearer token against the upload API; JSON reply.
    Authenticated(String),
    /// Legacy multipart endpoint; plain-text reply plus optional identity header.
    Anonymous(Option<Identity>),
}

impl Mode {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Mode::Authenticated(_))
    }
}

/// One image upload, with everything the transport needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Base name sent as the multipart filename.
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Media type declared on the file part.
    pub mime: Option<String>,
    pub mode: Mode,
}

/// Server reply reduced to the parts either mode looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub gyazo_id: Option<String>,
    pub body: Vec<u8>,
}

/// Uploaded image as described by the API.
///
/// Gyazo API docs: https://gyazo.com/api/docs/image
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Image {
    #[serde(default)]
    pub image_id: Option<String>,
    pub permalink_url: String,
    #[serde(default)]
    pub thumb_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Sends an upload and returns the raw reply.
#[cfg_attr(test, automock)]
pub trait Transport {
    fn send(&self, request: UploadRequest) -> Result<RawResponse, UploadError>;
}

fn image_part(
    filename: &str,
    bytes: Vec<u8>,
    mime: Option<&str>,
) -> Result<multipart::Part, UploadError> {
    let part = multipart::Part::bytes(bytes).file_name(filename.to_string());
    match mime {
        Some(m) => part
            .mime_str(m)
            .map_err(|e| UploadError::EncodeFailed(format!("invalid media type {m:?}: {e}"))),
        None => Ok(part),
    }
}

/// Multipart body for the legacy endpoint: the `imagedata` file part plus an
/// `id` field holding the stored identity, or `""` when none is known yet.
pub fn encode_anonymous(
    filename: &str,
    bytes: Vec<u8>,
    mime: Option<&str>,
    identity: Option<&Identity>,
) -> Result<multipart::Form, UploadError> {
    let id = identity.map(|i| i.as_str().to_string()).unwrap_or_default();
    Ok(multipart::Form::new()
        .part("imagedata", image_part(filename, bytes, mime)?)
        .text("id", id))
}

/// Multipart body for the API: only the `imagedata` part. The token goes in
/// the Authorization header.
pub fn encode_image(
    filename: &str,
    bytes: Vec<u8>,
    mime: Option<&str>,
) -> Result<multipart::Form, UploadError> {
    Ok(multipart::Form::new().part("imagedata", image_part(filename, bytes, mime)?))
}

/// Blocking client bound to one endpoint for the life of the process.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: String,
}

impl ApiClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, UploadError> {
        // No client-side deadline; uploads wait as long as the OS allows.
        let client = Client::builder()
            .timeout(None)
            .user_agent(concat!("gyazo-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UploadError::NetworkFailed(format!("failed to build HTTP client: {e}")))?;
        Ok(ApiClient {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Build the POST for `req` without sending it.
    pub fn build_request(&self, req: UploadRequest) -> Result<Request, UploadError> {
        let UploadRequest {
            filename,
            bytes,
            mime,
            mode,
        } = req;

        let builder = match &mode {
            Mode::Authenticated(token) => {
                let form = encode_image(&filename, bytes, mime.as_deref())?;
                self.client
                    .post(&self.endpoint)
                    .bearer_auth(token)
                    .multipart(form)
            }
            Mode::Anonymous(identity) => {
                let form = encode_anonymous(&filename, bytes, mime.as_deref(), identity.as_ref())?;
                self.client.post(&self.endpoint).multipart(form)
            }
        };

        Ok(builder.build()?)
    }
}

impl Transport for ApiClient {
    fn send(&self, request: UploadRequest) -> Result<RawResponse, UploadError> {
        let authenticated = request.mode.is_authenticated();
        let request = self.build_request(request)?;
        debug!(
            "POST {} ({})",
            request.url(),
            if authenticated { "authenticated" } else { "anonymous" }
        );

        let res = self.client.execute(request)?;
        let status = res.status().as_u16();
        let gyazo_id = res
            .headers()
            .get(GYAZO_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = res.bytes()?.to_vec();
        debug!("Response {} with {} body bytes", status, body.len());

        Ok(RawResponse {
            status,
            gyazo_id,
            body,
        })
    }
}
