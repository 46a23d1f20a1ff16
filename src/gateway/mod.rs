pub mod envelope;
pub mod http;

use std::path::Path;

use crate::domain::email::{EmailBatch, NextEmail};
use crate::domain::reply::{OutgoingReply, SuggestRequest, Suggestions};
use crate::domain::upload::FileInfo;
use crate::error::ClientResult;

/// The backend calls the client needs. Every call is a single blocking
/// request/response; implementations hold no per-call state.
pub trait ServerGateway: Send + Sync {
    /// `GET /auth`. `Ok` means Gmail is already connected.
    fn start_auth(&self) -> ClientResult<()>;
    /// `POST /auth {code}`
    fn complete_auth(&self, code: &str) -> ClientResult<()>;
    /// `POST /set-api-key {api_key}`
    fn set_api_key(&self, api_key: &str) -> ClientResult<()>;

    fn list_emails(&self) -> ClientResult<EmailBatch>;
    fn suggest_reply(&self, request: &SuggestRequest) -> ClientResult<Suggestions>;
    fn send_reply(&self, reply: &OutgoingReply) -> ClientResult<()>;

    /// `POST /upload-file` as multipart.
    fn upload_file(&self, path: &Path) -> ClientResult<FileInfo>;
    fn next_email(&self) -> ClientResult<NextEmail>;
}
