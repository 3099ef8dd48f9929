use std::io::{self, Write};

use docqa_core::{EntryKind, TranscriptEntry};

use super::render::Surface;

/// Line-oriented surface; the newest entry is always the last line written.
pub struct TerminalSurface<W: Write> {
    out: W,
}

impl TerminalSurface<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        // Broken stdout leaves nothing useful to report to.
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn append_entry(&mut self, entry: &TranscriptEntry) {
        let marker = match entry.kind() {
            EntryKind::System => "--",
            EntryKind::User => ">>",
            EntryKind::Bot => "<<",
            EntryKind::Error => "!!",
        };
        self.line(&format!("{marker} {}", entry.text()));
    }

    fn set_document_info(&mut self, text: &str) {
        self.line(&format!("== {text} =="));
    }

    fn set_selected_file(&mut self, name: &str) {
        self.line(&format!("Selected file: {name}"));
    }

    fn set_sources(&mut self, text: &str) {
        self.line(&format!("   ({text})"));
    }

    fn set_question(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.line(&format!(
            "Question kept: \"{text}\". Press Enter to send it."
        ));
    }

    fn show_help(&mut self, text: &str) {
        self.line(text);
    }

    fn alert(&mut self, message: &str) {
        self.line(&format!("[!] {message}"));
    }
}
