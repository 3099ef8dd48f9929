use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use docqa_logging::{docqa_info, docqa_warn};

use crate::client::{ClientSettings, DocQaService, ReqwestService};
use crate::{ChatPayload, EngineEvent, RequestError, RequestId};

enum EngineCommand {
    Upload { request_id: RequestId, path: PathBuf },
    Chat {
        request_id: RequestId,
        payload: ChatPayload,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to set up http client: {0}")]
    Client(#[from] RequestError),
}

/// Receives completions from the engine thread.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Runs requests on a tokio runtime owned by a background thread.
///
/// Commands are fire-and-forget; every command produces exactly one event on
/// the sink. Dropping the handle stops the thread once queued commands are
/// dispatched.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        let service = ReqwestService::new(settings)?;
        Self::with_service(Arc::new(service), sink)
    }

    pub fn with_service(
        service: Arc<dyn DocQaService>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let service = service.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    handle_command(service.as_ref(), command, sink.as_ref()).await;
                });
            }
        });

        Ok(Self { cmd_tx })
    }

    pub fn upload(&self, request_id: RequestId, path: impl Into<PathBuf>) {
        let _ = self.cmd_tx.send(EngineCommand::Upload {
            request_id,
            path: path.into(),
        });
    }

    pub fn chat(&self, request_id: RequestId, payload: ChatPayload) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::Chat { request_id, payload });
    }
}

async fn handle_command(service: &dyn DocQaService, command: EngineCommand, sink: &dyn EventSink) {
    match command {
        EngineCommand::Upload { request_id, path } => {
            let result = service.upload(&path).await;
            log_outcome("upload", request_id, &result);
            sink.emit(EngineEvent::UploadCompleted { request_id, result });
        }
        EngineCommand::Chat {
            request_id,
            payload,
        } => {
            let result = service.chat(&payload).await;
            log_outcome("chat", request_id, &result);
            sink.emit(EngineEvent::ChatCompleted { request_id, result });
        }
    }
}

fn log_outcome<T>(what: &str, request_id: RequestId, result: &Result<T, RequestError>) {
    match result {
        Ok(_) => docqa_info!("{} request {} completed", what, request_id),
        Err(err) => docqa_warn!("{} request {} failed: {}", what, request_id, err),
    }
}
