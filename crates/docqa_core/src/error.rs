/// Discriminated outcome of a flow that did not go through.
///
/// Precondition violations are reported to the user as alerts, an empty
/// question is dropped silently, and transport/server failures end up in the
/// transcript.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("Select a PDF first")]
    NoFileSelected,
    #[error("Upload a PDF first")]
    NoDocumentLoaded,
    #[error("question is empty")]
    EmptyQuestion,
    #[error("A request is already in progress")]
    RequestInFlight,
    #[error("{0}")]
    TransportOrServerFailure(String),
}

impl FlowError {
    /// Whether the UI should interrupt the user with a blocking alert.
    pub fn is_alert(&self) -> bool {
        matches!(
            self,
            FlowError::NoFileSelected | FlowError::NoDocumentLoaded | FlowError::RequestInFlight
        )
    }
}
