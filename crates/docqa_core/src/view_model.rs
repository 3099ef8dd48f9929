/// Snapshot of everything the front-end shows apart from the transcript entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub has_document: bool,
    /// "Loaded document: <filename> (<n> chunks)" once an upload succeeded.
    pub document_info: Option<String>,
    pub selected_file: Option<String>,
    pub question_input: String,
    /// Pages cited by the latest answer, display-only.
    pub sources: Option<String>,
    /// A request is in flight; new submissions will be rejected.
    pub busy: bool,
    pub transcript_len: usize,
    pub dirty: bool,
}
