// Resolved environment inputs. Everything here is read once at startup and
// handed to the pipeline; nothing below re-reads the environment.

/// Legacy anonymous upload endpoint.
pub const LEGACY_ENDPOINT: &str = "http://upload.gyazo.com/upload.cgi";

/// Authenticated upload API.
pub const API_ENDPOINT: &str = "https://upload.gyazo.com/api/upload";

pub const SERVER_URL_VAR: &str = "GYAZO_SERVER_URL";
pub const ACCESS_TOKEN_VAR: &str = "GYAZO_ACCESS_TOKEN";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub server_url: Option<String>,
    pub access_token: Option<String>,
}

impl Settings {
    /// Empty strings count as unset, same as an unset variable.
    pub fn new(server_url: Option<String>, access_token: Option<String>) -> Self {
        Settings {
            server_url: server_url.filter(|s| !s.is_empty()),
            access_token: access_token.filter(|s| !s.is_empty()),
        }
    }

    /// Read `GYAZO_SERVER_URL` and `GYAZO_ACCESS_TOKEN` from the process
    /// environment.
    pub fn from_env() -> Self {
        Settings::new(
            std::env::var(SERVER_URL_VAR).ok(),
            std::env::var(ACCESS_TOKEN_VAR).ok(),
        )
    }

    /// The upload URL for this process: an explicit override wins, then the
    /// API endpoint if a token is configured, then the legacy endpoint.
    pub fn endpoint(&self) -> String {
        match (&self.server_url, &self.access_token) {
            (Some(url), _) => url.clone(),
            (None, Some(_)) => API_ENDPOINT.to_string(),
            (None, None) => LEGACY_ENDPOINT.to_string(),
        }
    }
}
