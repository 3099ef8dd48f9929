use docqa_core::{AppState, AppViewModel, TranscriptEntry};

/// Output capability the app renders into.
///
/// Every call reflects a change; nothing is ever taken back, matching the
/// append-only transcript.
pub trait Surface {
    fn append_entry(&mut self, entry: &TranscriptEntry);
    fn set_document_info(&mut self, text: &str);
    fn set_selected_file(&mut self, name: &str);
    fn set_sources(&mut self, text: &str);
    /// The question input differs from the last render. This covers a
    /// refused submission whose text stays, a failed question coming back,
    /// and a kept question being sent. A line typed and sent within one
    /// batch never reaches this.
    fn set_question(&mut self, text: &str);
    fn show_help(&mut self, text: &str);
    fn alert(&mut self, message: &str);
}

/// Turns state snapshots into the minimal set of [`Surface`] calls.
#[derive(Debug, Default)]
pub struct Renderer {
    rendered_entries: usize,
    last: AppViewModel,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, state: &AppState, surface: &mut dyn Surface) {
        let view = state.view();

        if view.selected_file != self.last.selected_file {
            if let Some(name) = &view.selected_file {
                surface.set_selected_file(name);
            }
        }

        for entry in state.transcript().entries().iter().skip(self.rendered_entries) {
            surface.append_entry(entry);
        }
        self.rendered_entries = view.transcript_len;

        if view.document_info != self.last.document_info {
            if let Some(info) = &view.document_info {
                surface.set_document_info(info);
            }
        }
        if view.sources != self.last.sources {
            if let Some(sources) = &view.sources {
                surface.set_sources(sources);
            }
        }
        if view.question_input != self.last.question_input {
            surface.set_question(&view.question_input);
        }

        self.last = view;
    }
}
