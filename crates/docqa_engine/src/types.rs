use std::fmt;

use serde::{Deserialize, Serialize};

pub type RequestId = u64;

/// Success body of `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    #[serde(rename = "doc_id")]
    pub document_id: String,
    pub filename: String,
    #[serde(rename = "chunks")]
    pub chunk_count: u64,
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatPayload {
    #[serde(rename = "doc_id")]
    pub document_id: String,
    pub question: String,
}

/// Success body of `POST /chat`. Only `answer` is required.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub answer: String,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
}

impl ChatReply {
    /// Start pages of the cited chunks, in the order the server listed them.
    pub fn cited_pages(&self) -> Vec<u32> {
        self.evidence
            .iter()
            .filter_map(|evidence| evidence.page_start)
            .collect()
    }
}

/// A retrieved chunk the server based its answer on.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Evidence {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub page_start: Option<u32>,
    #[serde(default)]
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    UploadCompleted {
        request_id: RequestId,
        result: Result<UploadResponse, RequestError>,
    },
    ChatCompleted {
        request_id: RequestId,
        result: Result<ChatReply, RequestError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RequestError {
    pub kind: FailureKind,
    pub message: String,
}

impl RequestError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    FileUnreadable,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    MalformedBody,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::FileUnreadable => write!(f, "file unreadable"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::MalformedBody => write!(f, "malformed response body"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
