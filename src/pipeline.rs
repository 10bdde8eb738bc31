// One upload per invocation, strictly in order:
//
//   acquire source -> validate type -> pick mode -> read + send -> parse
//   -> persist identity (anonymous only)
//
// Any failing stage ends the run. Only the final identity write is allowed
// to fail without failing the upload.

use crate::api::{Mode, Transport, UploadRequest};
use crate::capture::Capturer;
use crate::config::Settings;
use crate::content_type;
use crate::error::UploadError;
use crate::identity::{Identity, IdentityStore};
use crate::response;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where the image came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    ExistingFile(PathBuf),
    CapturedScreenshot(PathBuf),
}

impl UploadSource {
    pub fn path(&self) -> &Path {
        match self {
            UploadSource::ExistingFile(p) | UploadSource::CapturedScreenshot(p) => p,
        }
    }
}

#[derive(Debug)]
pub enum IdentityUpdate {
    /// The reply carried no identity, or the upload was authenticated.
    Unchanged,
    Stored(Identity),
    /// The upload succeeded but the identity could not be written.
    Failed(UploadError),
}

#[derive(Debug)]
pub struct UploadOutcome {
    pub url: String,
    pub source: UploadSource,
    pub identity: IdentityUpdate,
}

pub struct UploadPipeline<C, T> {
    capturer: C,
    transport: T,
    store: IdentityStore,
    access_token: Option<String>,
}

impl<C: Capturer, T: Transport> UploadPipeline<C, T> {
    pub fn new(capturer: C, transport: T, store: IdentityStore, settings: &Settings) -> Self {
        UploadPipeline {
            capturer,
            transport,
            store,
            access_token: settings.access_token.clone(),
        }
    }

    pub fn run(&self, input: Option<PathBuf>) -> Result<UploadOutcome, UploadError> {
        let source = match input {
            Some(path) => UploadSource::ExistingFile(path),
            None => UploadSource::CapturedScreenshot(self.capturer.capture()?),
        };
        debug!("Source: {:?}", source);

        let path = source.path();
        if !content_type::is_image(path) {
            return Err(UploadError::UnsupportedFileType(path.to_path_buf()));
        }

        let mode = self.mode();
        debug!(
            "Upload mode: {}",
            if mode.is_authenticated() { "authenticated" } else { "anonymous" }
        );

        let bytes = fs::read(path).map_err(|source| UploadError::FileOpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let request = UploadRequest {
            filename: file_name(path),
            bytes,
            mime: content_type::media_type(path).map(|m| m.essence_str().to_string()),
            mode: mode.clone(),
        };

        let raw = self.transport.send(request)?;
        let result = response::parse(&mode, raw)?;
        info!("Uploaded to {}", result.url);

        let identity = match result.identity {
            Some(id) if !mode.is_authenticated() => self.persist(id),
            _ => IdentityUpdate::Unchanged,
        };

        Ok(UploadOutcome {
            url: result.url,
            source,
            identity,
        })
    }

    // Decided once per run; never re-evaluated after this point.
    fn mode(&self) -> Mode {
        match &self.access_token {
            Some(token) => Mode::Authenticated(token.clone()),
            None => Mode::Anonymous(self.store.load()),
        }
    }

    fn persist(&self, id: Identity) -> IdentityUpdate {
        match self.store.store(&id) {
            Ok(()) => IdentityUpdate::Stored(id),
            Err(e) => {
                let err = UploadError::IdentityPersistFailed(e);
                warn!("{}", err);
                IdentityUpdate::Failed(err)
            }
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.png".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockTransport, RawResponse};
    use crate::capture::MockCapturer;
    use tempfile::TempDir;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    fn store(dir: &TempDir) -> IdentityStore {
        IdentityStore::new(dir.path().join("state").join(".gyazo.id"))
    }

    fn legacy_reply(url: &str, id: Option<&str>) -> RawResponse {
        RawResponse {
            status: 200,
            gyazo_id: id.map(str::to_string),
            body: url.as_bytes().to_vec(),
        }
    }

    fn no_capture() -> MockCapturer {
        let mut capturer = MockCapturer::new();
        capturer.expect_capture().never();
        capturer
    }

    #[test]
    fn anonymous_upload_prints_body_and_stores_identity() {
        let dir = tempfile::tempdir().unwrap();
        let photo = write_file(&dir, "photo.png", PNG);

        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.mode == Mode::Anonymous(None)
                    && req.filename == "photo.png"
                    && req.bytes == PNG
                    && req.mime.as_deref() == Some("image/png")
            })
            .times(1)
            .returning(|_| Ok(legacy_reply("https://x.example/abc", Some("zzz"))));

        let pipeline =
            UploadPipeline::new(no_capture(), transport, store(&dir), &Settings::default());
        let outcome = pipeline.run(Some(photo.clone())).unwrap();

        assert_eq!(outcome.url, "https://x.example/abc");
        assert_eq!(outcome.source, UploadSource::ExistingFile(photo));
        assert!(matches!(outcome.identity, IdentityUpdate::Stored(ref id) if id.as_str() == "zzz"));
        assert_eq!(store(&dir).load(), Some(Identity::new("zzz")));
    }

    #[test]
    fn stored_identity_is_sent_and_rotated() {
        let dir = tempfile::tempdir().unwrap();
        let photo = write_file(&dir, "photo.png", PNG);
        store(&dir).store(&Identity::new("old")).unwrap();

        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.mode == Mode::Anonymous(Some(Identity::new("old"))))
            .times(1)
            .returning(|_| Ok(legacy_reply("https://x.example/def", Some("new"))));

        let pipeline =
            UploadPipeline::new(no_capture(), transport, store(&dir), &Settings::default());
        pipeline.run(Some(photo)).unwrap();

        assert_eq!(store(&dir).load(), Some(Identity::new("new")));
        let backups: Vec<_> = fs::read_dir(dir.path().join("state"))
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with("old_") && n.ends_with(".bak"))
            .collect();
        assert_eq!(backups.len(), 1);
    }

    #[test]
    fn token_selects_authenticated_mode_only() {
        let dir = tempfile::tempdir().unwrap();
        let photo = write_file(&dir, "photo.png", PNG);

        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.mode == Mode::Authenticated("secret".into()))
            .times(1)
            .returning(|_| {
                Ok(RawResponse {
                    status: 200,
                    gyazo_id: Some("should-not-be-stored".into()),
                    body: br#"{"image_id":"abc","permalink_url":"https://gyazo.com/abc"}"#.to_vec(),
                })
            });

        let settings = Settings::new(None, Some("secret".into()));
        let pipeline = UploadPipeline::new(no_capture(), transport, store(&dir), &settings);
        let outcome = pipeline.run(Some(photo)).unwrap();

        assert_eq!(outcome.url, "https://gyazo.com/abc");
        assert!(matches!(outcome.identity, IdentityUpdate::Unchanged));
        assert!(store(&dir).load().is_none());
    }

    #[test]
    fn non_image_is_rejected_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let notes = write_file(&dir, "notes.txt", b"hello");

        let mut transport = MockTransport::new();
        transport.expect_send().never();

        let pipeline =
            UploadPipeline::new(no_capture(), transport, store(&dir), &Settings::default());
        let err = pipeline.run(Some(notes)).unwrap_err();

        assert!(matches!(err, UploadError::UnsupportedFileType(_)));
    }

    #[test]
    fn failed_capture_skips_upload() {
        let dir = tempfile::tempdir().unwrap();

        let mut capturer = MockCapturer::new();
        capturer
            .expect_capture()
            .times(1)
            .returning(|| Err(UploadError::CaptureFailed("import exited with 1".into())));
        let mut transport = MockTransport::new();
        transport.expect_send().never();

        let pipeline = UploadPipeline::new(capturer, transport, store(&dir), &Settings::default());
        let err = pipeline.run(None).unwrap_err();

        assert!(matches!(err, UploadError::CaptureFailed(_)));
    }

    #[test]
    fn captured_screenshot_is_uploaded() {
        let dir = tempfile::tempdir().unwrap();
        let shot = write_file(&dir, "image_upload42.png", PNG);

        let mut capturer = MockCapturer::new();
        let returned = shot.clone();
        capturer
            .expect_capture()
            .times(1)
            .returning(move || Ok(returned.clone()));
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.filename == "image_upload42.png")
            .times(1)
            .returning(|_| Ok(legacy_reply("https://x.example/shot", None)));

        let pipeline = UploadPipeline::new(capturer, transport, store(&dir), &Settings::default());
        let outcome = pipeline.run(None).unwrap();

        assert_eq!(outcome.source, UploadSource::CapturedScreenshot(shot));
        assert!(matches!(outcome.identity, IdentityUpdate::Unchanged));
    }

    #[test]
    fn unreadable_image_fails_before_sending() {
        let dir = tempfile::tempdir().unwrap();

        let mut transport = MockTransport::new();
        transport.expect_send().never();

        let pipeline =
            UploadPipeline::new(no_capture(), transport, store(&dir), &Settings::default());
        let err = pipeline
            .run(Some(dir.path().join("missing.png")))
            .unwrap_err();

        assert!(matches!(err, UploadError::FileOpenFailed { .. }));
    }

    #[test]
    fn network_failure_leaves_identity_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let photo = write_file(&dir, "photo.png", PNG);
        store(&dir).store(&Identity::new("keep")).unwrap();

        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Err(UploadError::NetworkFailed("connection refused".into())));

        let pipeline =
            UploadPipeline::new(no_capture(), transport, store(&dir), &Settings::default());
        let err = pipeline.run(Some(photo)).unwrap_err();

        assert!(matches!(err, UploadError::NetworkFailed(_)));
        assert_eq!(store(&dir).load(), Some(Identity::new("keep")));
    }

    #[test]
    fn identity_write_failure_keeps_url() {
        let dir = tempfile::tempdir().unwrap();
        let photo = write_file(&dir, "photo.png", PNG);
        // A regular file where the identity directory should be.
        fs::write(dir.path().join("state"), b"").unwrap();

        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(legacy_reply("https://x.example/abc", Some("zzz"))));

        let pipeline =
            UploadPipeline::new(no_capture(), transport, store(&dir), &Settings::default());
        let outcome = pipeline.run(Some(photo)).unwrap();

        assert_eq!(outcome.url, "https://x.example/abc");
        match outcome.identity {
            IdentityUpdate::Failed(err) => assert!(!err.is_fatal()),
            other => panic!("expected persistence failure, got {other:?}"),
        }
    }
}
