use std::path::PathBuf;

use crate::{Answer, FlowError, RequestId, UploadSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a local file to upload.
    FileSelected(PathBuf),
    /// User clicked Upload.
    UploadClicked,
    /// User edited the question input.
    QuestionChanged(String),
    /// User submitted the current question input.
    QuestionSubmitted,
    /// `/upload` resolved.
    UploadFinished {
        request_id: RequestId,
        result: Result<UploadSummary, FlowError>,
    },
    /// `/chat` resolved.
    ChatFinished {
        request_id: RequestId,
        result: Result<Answer, FlowError>,
    },
}
