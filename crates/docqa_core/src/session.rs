use std::fmt;

/// Opaque identifier handed out by the indexing service for an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which document, if any, questions are currently scoped to.
///
/// Starts unset and is only ever overwritten; there is no way back to unset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    document: Option<DocumentId>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_document(&mut self, id: DocumentId) {
        self.document = Some(id);
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    pub fn document_id(&self) -> Option<&DocumentId> {
        self.document.as_ref()
    }
}
