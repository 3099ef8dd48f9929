use std::path::PathBuf;

use crate::{ChatRequest, FlowError, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the file to `/upload`.
    Upload { request_id: RequestId, path: PathBuf },
    /// Send the question to `/chat`.
    Chat {
        request_id: RequestId,
        request: ChatRequest,
    },
    /// Show a blocking alert for a precondition violation.
    Alert(FlowError),
}
