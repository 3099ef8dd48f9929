//! Docqa engine: HTTP client for the document service and effect execution.
mod client;
mod engine;
mod types;

pub use client::{ClientSettings, DocQaService, ReqwestService};
pub use engine::{ChannelEventSink, EngineError, EngineHandle, EventSink};
pub use types::{
    ChatPayload, ChatReply, EngineEvent, Evidence, FailureKind, RequestError, RequestId,
    UploadResponse,
};
