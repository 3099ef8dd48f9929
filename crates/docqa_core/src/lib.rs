//! Docqa core: pure session/transcript state machine and view-model helpers.
mod effect;
mod error;
mod msg;
mod session;
mod state;
mod transcript;
mod update;
mod view_model;

pub use effect::Effect;
pub use error::FlowError;
pub use msg::Msg;
pub use session::{DocumentId, Session};
pub use state::{
    Answer, AppState, ChatRequest, RequestId, UploadSummary, READY_NOTICE, UPLOADING_NOTICE,
};
pub use transcript::{EntryKind, Transcript, TranscriptEntry};
pub use update::update;
pub use view_model::AppViewModel;
