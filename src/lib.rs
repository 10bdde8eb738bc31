// Library root
// ------------
// The `gyazo` binary is a thin wrapper around `pipeline::UploadPipeline`.
//
// Module responsibilities:
// - `config`: resolved environment inputs and endpoint selection.
// - `platform`: per-OS capability table (capture tool, identity path,
//   browser opener).
// - `capture`: interactive screen capture when no file is given.
// - `content_type`: extension-based image check.
// - `identity`: the persisted anonymous identity and its backups.
// - `api`: multipart encoding and the blocking HTTP transport.
// - `response`: turning the server reply into a URL (and identity).
// - `pipeline`: the ordered upload run.
// - `ui`: logging, spinner, printing and browser side effects.
pub mod api;
pub mod capture;
pub mod config;
pub mod content_type;
pub mod error;
pub mod identity;
pub mod pipeline;
pub mod platform;
pub mod response;
pub mod ui;

pub use error::UploadError;
