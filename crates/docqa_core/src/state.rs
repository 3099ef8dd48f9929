use std::path::{Path, PathBuf};

use crate::transcript::{EntryKind, Transcript};
use crate::view_model::AppViewModel;
use crate::{DocumentId, FlowError, Session};

pub type RequestId = u64;

pub const UPLOADING_NOTICE: &str = "Uploading PDF...";
pub const READY_NOTICE: &str = "PDF indexed. You can ask questions now.";

/// What `/upload` reported for an indexed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub document_id: DocumentId,
    pub filename: String,
    pub chunk_count: u64,
}

/// Question scoped to the document that was active when it was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub document_id: DocumentId,
    pub question: String,
}

/// Answer from `/chat` together with the pages its evidence came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Answer {
    pub text: String,
    pub source_pages: Vec<u32>,
}

impl Answer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_pages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Upload { request_id: RequestId },
    Chat { request_id: RequestId, question: String },
}

impl Pending {
    fn request_id(&self) -> RequestId {
        match self {
            Pending::Upload { request_id } | Pending::Chat { request_id, .. } => *request_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    session: Session,
    transcript: Transcript,
    selected_file: Option<PathBuf>,
    question_input: String,
    document_info: Option<String>,
    sources: Option<String>,
    pending: Option<Pending>,
    next_request_id: RequestId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            has_document: self.session.has_document(),
            document_info: self.document_info.clone(),
            selected_file: self.selected_file.as_deref().map(display_name),
            question_input: self.question_input.clone(),
            sources: self.sources.clone(),
            busy: self.pending.is_some(),
            transcript_len: self.transcript.len(),
            dirty: self.dirty,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Request id of the network call currently awaited, if any.
    pub fn awaiting(&self) -> Option<RequestId> {
        self.pending.as_ref().map(Pending::request_id)
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn select_file(&mut self, path: PathBuf) {
        if self.selected_file.as_ref() != Some(&path) {
            self.selected_file = Some(path);
            self.mark_dirty();
        }
    }

    pub(crate) fn set_question_input(&mut self, text: String) {
        if self.question_input != text {
            self.question_input = text;
            self.mark_dirty();
        }
    }

    /// Checks the upload preconditions and, when they hold, records the
    /// "uploading" notice and the pending request.
    pub(crate) fn begin_upload(&mut self) -> Result<(RequestId, PathBuf), FlowError> {
        let path = self.selected_file.clone().ok_or(FlowError::NoFileSelected)?;
        if self.pending.is_some() {
            return Err(FlowError::RequestInFlight);
        }

        let request_id = self.allocate_request_id();
        self.transcript.append(UPLOADING_NOTICE, EntryKind::System);
        self.pending = Some(Pending::Upload { request_id });
        self.mark_dirty();
        Ok((request_id, path))
    }

    /// Checks the chat preconditions in order (document, question, in-flight)
    /// and, when they hold, echoes the question and clears the input.
    pub(crate) fn begin_chat(&mut self) -> Result<(RequestId, ChatRequest), FlowError> {
        let document_id = self
            .session
            .document_id()
            .cloned()
            .ok_or(FlowError::NoDocumentLoaded)?;
        let question = self.question_input.trim();
        if question.is_empty() {
            return Err(FlowError::EmptyQuestion);
        }
        if self.pending.is_some() {
            return Err(FlowError::RequestInFlight);
        }
        let question = question.to_owned();

        let request_id = self.allocate_request_id();
        self.transcript
            .append(format!("You: {question}"), EntryKind::User);
        self.question_input.clear();
        self.pending = Some(Pending::Chat {
            request_id,
            question: question.clone(),
        });
        self.mark_dirty();
        Ok((
            request_id,
            ChatRequest {
                document_id,
                question,
            },
        ))
    }

    /// Applies an `/upload` completion. Stale completions are ignored.
    pub(crate) fn finish_upload(
        &mut self,
        request_id: RequestId,
        result: Result<UploadSummary, FlowError>,
    ) {
        match self.pending {
            Some(Pending::Upload { request_id: awaited }) if awaited == request_id => {}
            _ => return,
        }
        self.pending = None;

        // A blank id cannot scope a question, so it never loads a document.
        let result = result.and_then(|summary| {
            if summary.document_id.as_str().trim().is_empty() {
                Err(FlowError::TransportOrServerFailure(
                    "server returned an empty document id".to_string(),
                ))
            } else {
                Ok(summary)
            }
        });

        match result {
            Ok(summary) => {
                self.document_info = Some(format!(
                    "Loaded document: {} ({} chunks)",
                    summary.filename, summary.chunk_count
                ));
                self.session.set_document(summary.document_id);
                self.sources = None;
                self.transcript.append(READY_NOTICE, EntryKind::System);
            }
            Err(err) => {
                self.transcript
                    .append(format!("Upload failed: {err}"), EntryKind::Error);
            }
        }
        self.mark_dirty();
    }

    /// Applies a `/chat` completion. Stale completions are ignored.
    pub(crate) fn finish_chat(
        &mut self,
        request_id: RequestId,
        result: Result<Answer, FlowError>,
    ) {
        let question = match self.pending.take() {
            Some(Pending::Chat {
                request_id: awaited,
                question,
            }) if awaited == request_id => question,
            other => {
                self.pending = other;
                return;
            }
        };

        match result {
            Ok(answer) => {
                self.transcript
                    .append(format!("Bot: {}", answer.text), EntryKind::Bot);
                self.sources = format_sources(&answer.source_pages);
            }
            Err(err) => {
                self.transcript
                    .append(format!("Request failed: {err}"), EntryKind::Error);
                // Give the question back unless the user already typed a new one.
                if self.question_input.trim().is_empty() {
                    self.question_input = question;
                }
            }
        }
        self.mark_dirty();
    }

    fn allocate_request_id(&mut self) -> RequestId {
        self.next_request_id += 1;
        self.next_request_id
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn format_sources(pages: &[u32]) -> Option<String> {
    let mut unique: Vec<u32> = Vec::with_capacity(pages.len());
    for page in pages {
        if !unique.contains(page) {
            unique.push(*page);
        }
    }
    if unique.is_empty() {
        return None;
    }
    let listed = unique
        .iter()
        .map(|page| format!("page {page}"))
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!("Sources: {listed}"))
}
