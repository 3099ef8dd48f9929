use std::sync::{mpsc, Arc};

use docqa_core::{Answer, DocumentId, Effect, FlowError, Msg, UploadSummary};
use docqa_engine::{
    ChatPayload, ClientSettings, EngineError, EngineEvent, EngineHandle, EventSink, RequestError,
};
use docqa_logging::{docqa_debug, docqa_info};

use super::app::LoopEvent;
use super::ui::render::Surface;

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: ClientSettings, tx: mpsc::Sender<LoopEvent>) -> Result<Self, EngineError> {
        let engine = EngineHandle::new(settings, Arc::new(MsgForwarder::new(tx)))?;
        Ok(Self::with_engine(engine))
    }

    pub fn with_engine(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn run(&self, effects: Vec<Effect>, surface: &mut dyn Surface) {
        for effect in effects {
            match effect {
                Effect::Upload { request_id, path } => {
                    docqa_info!("Upload request_id={} path={}", request_id, path.display());
                    self.engine.upload(request_id, path);
                }
                Effect::Chat {
                    request_id,
                    request,
                } => {
                    docqa_info!(
                        "Chat request_id={} doc_id={} question_len={}",
                        request_id,
                        request.document_id,
                        request.question.len()
                    );
                    self.engine.chat(
                        request_id,
                        ChatPayload {
                            document_id: request.document_id.to_string(),
                            question: request.question,
                        },
                    );
                }
                Effect::Alert(err) => {
                    docqa_debug!("Alert: {}", err);
                    surface.alert(&err.to_string());
                }
            }
        }
    }
}

/// Feeds engine completions back into the main loop as core messages.
pub(crate) struct MsgForwarder {
    tx: mpsc::Sender<LoopEvent>,
}

impl MsgForwarder {
    pub(crate) fn new(tx: mpsc::Sender<LoopEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for MsgForwarder {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(LoopEvent::Completed(map_event(event)));
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadCompleted { request_id, result } => Msg::UploadFinished {
            request_id,
            result: result
                .map(|response| UploadSummary {
                    document_id: DocumentId::new(response.document_id),
                    filename: response.filename,
                    chunk_count: response.chunk_count,
                })
                .map_err(flow_failure),
        },
        EngineEvent::ChatCompleted { request_id, result } => Msg::ChatFinished {
            request_id,
            result: result
                .map(|reply| Answer {
                    source_pages: reply.cited_pages(),
                    text: reply.answer,
                })
                .map_err(flow_failure),
        },
    }
}

fn flow_failure(err: RequestError) -> FlowError {
    FlowError::TransportOrServerFailure(err.to_string())
}
