use std::path::Path;

use anyhow::{Result, anyhow};
use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder, multipart};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::json;
use url::Url;

use crate::domain::email::{Email, EmailBatch, NextEmail};
use crate::domain::reply::{OutgoingReply, SuggestRequest, Suggestions};
use crate::domain::upload::FileInfo;
use crate::error::{ClientError, ClientResult};
use crate::gateway::ServerGateway;
use crate::gateway::envelope::{self, Reply};

#[derive(Deserialize)]
struct UploadPayload {
    file_info: FileInfo,
}

#[derive(Deserialize)]
struct NextEmailPayload {
    email: Email,
}

/// [`ServerGateway`] over HTTP/JSON using a blocking reqwest client.
pub struct HttpGateway {
    base: Url,
    http: Client,
    max_upload_bytes: u64,
}

impl HttpGateway {
    pub fn new(server_url: &str, max_upload_bytes: u64) -> Result<Self> {
        let mut base =
            Url::parse(server_url).map_err(|e| anyhow!("invalid server url {server_url}: {e}"))?;
        // Url::join replaces the last segment unless the path ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder().build()?;
        Ok(Self {
            base,
            http,
            max_upload_bytes,
        })
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base
            .join(path)
            .map_err(|e| ClientError::Transport(format!("bad endpoint {path}: {e}")))
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Reply<T>> {
        let url = self.endpoint(path)?;
        debug!("GET {url}");
        Self::finish(self.http.get(url))
    }

    fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<Reply<T>> {
        let url = self.endpoint(path)?;
        debug!("POST {url}");
        Self::finish(self.http.post(url).json(body))
    }

    fn finish<T: DeserializeOwned>(req: RequestBuilder) -> ClientResult<Reply<T>> {
        let resp = req.send()?;
        let status = resp.status().as_u16();
        let text = resp.text()?;
        let decoded = envelope::decode(status, &text);
        if let Err(e) = &decoded {
            warn!("request failed (HTTP {status}): {e}");
        }
        decoded
    }
}

impl ServerGateway for HttpGateway {
    fn start_auth(&self) -> ClientResult<()> {
        envelope::expect_success(self.get::<IgnoredAny>("auth")?).map(|_| ())
    }

    fn complete_auth(&self, code: &str) -> ClientResult<()> {
        let reply = self.post_json::<IgnoredAny, _>("auth", &json!({ "code": code }))?;
        envelope::expect_success(reply).map(|_| ())
    }

    fn set_api_key(&self, api_key: &str) -> ClientResult<()> {
        let reply =
            self.post_json::<IgnoredAny, _>("set-api-key", &json!({ "api_key": api_key }))?;
        envelope::expect_success(reply).map(|_| ())
    }

    fn list_emails(&self) -> ClientResult<EmailBatch> {
        envelope::expect_success(self.get("emails")?)
    }

    fn suggest_reply(&self, request: &SuggestRequest) -> ClientResult<Suggestions> {
        envelope::expect_success(self.post_json("suggest-reply", request)?)
    }

    fn send_reply(&self, reply: &OutgoingReply) -> ClientResult<()> {
        envelope::expect_success(self.post_json::<IgnoredAny, _>("send-reply", reply)?)
            .map(|_| ())
    }

    fn upload_file(&self, path: &Path) -> ClientResult<FileInfo> {
        let meta = std::fs::metadata(path).map_err(|e| {
            ClientError::Validation(format!("Cannot read {}: {e}", path.display()))
        })?;
        if !meta.is_file() {
            return Err(ClientError::Validation(format!(
                "{} is not a file",
                path.display()
            )));
        }
        if meta.len() > self.max_upload_bytes {
            return Err(ClientError::Validation(format!(
                "{} is larger than the {} byte upload limit",
                path.display(),
                self.max_upload_bytes
            )));
        }

        let form = multipart::Form::new()
            .file("file", path)
            .map_err(|e| ClientError::Validation(format!("Cannot read {}: {e}", path.display())))?;
        let url = self.endpoint("upload-file")?;
        debug!("POST {url} ({} bytes)", meta.len());
        let payload: UploadPayload =
            envelope::expect_success(Self::finish(self.http.post(url).multipart(form))?)?;
        Ok(payload.file_info)
    }

    fn next_email(&self) -> ClientResult<NextEmail> {
        match self.get::<NextEmailPayload>("next-email")? {
            Reply::Success(p) => Ok(NextEmail::Email(p.email)),
            Reply::NoMore(msg) => Ok(NextEmail::NoMore(msg)),
        }
    }
}
