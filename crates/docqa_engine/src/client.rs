use std::path::Path;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use docqa_logging::{docqa_debug, docqa_info, docqa_warn};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tokio_util::io::ReaderStream;
use url::Url;

use crate::{ChatPayload, ChatReply, FailureKind, RequestError, UploadResponse};

const UPLOAD_ENDPOINT: &str = "upload";
const CHAT_ENDPOINT: &str = "chat";
const PDF_MIME: &str = "application/pdf";
const ERROR_SNIPPET_CHARS: usize = 200;
const ERROR_BODY_BYTES: usize = 4 * 1024;

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Base URL both endpoints are resolved against.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// `None` leaves the worst case to the transport.
    pub request_timeout: Option<Duration>,
    pub max_response_bytes: u64,
    /// Multipart field carrying the PDF.
    pub upload_field: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_response_bytes: 1024 * 1024,
            upload_field: "file".to_string(),
        }
    }
}

/// The two calls the document service offers.
#[async_trait::async_trait]
pub trait DocQaService: Send + Sync {
    /// Sends the file at `path` for indexing.
    async fn upload(&self, path: &Path) -> Result<UploadResponse, RequestError>;

    /// Asks a question about a previously indexed document.
    async fn chat(&self, payload: &ChatPayload) -> Result<ChatReply, RequestError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestService {
    settings: ClientSettings,
    client: reqwest::Client,
    upload_url: Url,
    chat_url: Url,
}

impl ReqwestService {
    pub fn new(settings: ClientSettings) -> Result<Self, RequestError> {
        let base = parse_base_url(&settings.base_url)?;
        let upload_url = join_endpoint(&base, UPLOAD_ENDPOINT)?;
        let chat_url = join_endpoint(&base, CHAT_ENDPOINT)?;

        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| RequestError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            client,
            upload_url,
            chat_url,
        })
    }

    pub fn upload_url(&self) -> &Url {
        &self.upload_url
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    /// Turns a non-success status into an error, then reads the whole body,
    /// refusing anything above `max_response_bytes`.
    async fn read_response(&self, response: reqwest::Response) -> Result<Bytes, RequestError> {
        let status = response.status();
        if !status.is_success() {
            let snippet = read_error_snippet(response).await;
            return Err(RequestError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status_message(status, &snippet),
            ));
        }

        let max_bytes = self.settings.max_response_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(RequestError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(RequestError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body.freeze())
    }
}

#[async_trait::async_trait]
impl DocQaService for ReqwestService {
    async fn upload(&self, path: &Path) -> Result<UploadResponse, RequestError> {
        let unreadable = |err: std::io::Error| {
            RequestError::new(
                FailureKind::FileUnreadable,
                format!("{}: {err}", path.display()),
            )
        };
        let file = tokio::fs::File::open(path).await.map_err(unreadable)?;
        let len = file.metadata().await.map_err(unreadable)?.len();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        docqa_info!(
            "POST {} filename={} bytes={}",
            self.upload_url,
            filename,
            len
        );

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = Part::stream_with_length(body, len)
            .file_name(filename)
            .mime_str(PDF_MIME)
            .map_err(map_reqwest_error)?;
        let form = Form::new().part(self.settings.upload_field.clone(), part);

        let response = self
            .client
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = self.read_response(response).await?;
        let parsed: UploadResponse = parse_json(&body)?;
        if parsed.document_id.trim().is_empty() {
            docqa_warn!("Upload response carried an empty doc_id");
            return Err(RequestError::new(
                FailureKind::MalformedBody,
                "response has an empty doc_id",
            ));
        }

        docqa_info!(
            "Indexed doc_id={} filename={} chunks={}",
            parsed.document_id,
            parsed.filename,
            parsed.chunk_count
        );
        Ok(parsed)
    }

    async fn chat(&self, payload: &ChatPayload) -> Result<ChatReply, RequestError> {
        let body = serde_json::to_vec(payload)
            .map_err(|err| RequestError::new(FailureKind::MalformedBody, err.to_string()))?;

        docqa_info!(
            "POST {} doc_id={} question_len={}",
            self.chat_url,
            payload.document_id,
            payload.question.len()
        );
        docqa_debug!("question={:?}", payload.question);

        let response = self
            .client
            .post(self.chat_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = self.read_response(response).await?;
        let reply: ChatReply = parse_json(&body)?;

        docqa_debug!("answer={:?} evidence={}", reply.answer, reply.evidence.len());
        Ok(reply)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, RequestError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|err| RequestError::new(FailureKind::InvalidUrl, format!("{raw}: {err}")))?;
    if url.cannot_be_a_base() {
        return Err(RequestError::new(
            FailureKind::InvalidUrl,
            format!("{raw}: not a base url"),
        ));
    }
    // Without a trailing slash `join` would replace the last path segment.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn join_endpoint(base: &Url, endpoint: &str) -> Result<Url, RequestError> {
    base.join(endpoint)
        .map_err(|err| RequestError::new(FailureKind::InvalidUrl, err.to_string()))
}

fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, RequestError> {
    serde_json::from_slice(body).map_err(|err| {
        docqa_warn!("Unparseable response body ({} bytes): {}", body.len(), err);
        RequestError::new(FailureKind::MalformedBody, err.to_string())
    })
}

/// Keeps the head of an error body for the message; the rest is dropped.
async fn read_error_snippet(response: reqwest::Response) -> Bytes {
    let mut body = BytesMut::new();
    let mut stream = response.bytes_stream();
    while let Some(Ok(chunk)) = stream.next().await {
        let room = ERROR_BODY_BYTES - body.len();
        body.extend_from_slice(&chunk[..chunk.len().min(room)]);
        if body.len() >= ERROR_BODY_BYTES {
            break;
        }
    }
    body.freeze()
}

fn status_message(status: reqwest::StatusCode, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return status.to_string();
    }
    let snippet: String = text.chars().take(ERROR_SNIPPET_CHARS).collect();
    format!("{status}: {snippet}")
}

fn map_reqwest_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        return RequestError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return RequestError::new(FailureKind::InvalidUrl, err.to_string());
    }
    RequestError::new(FailureKind::Network, err.to_string())
}
