// Event types for async communication

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service accepted the request and is streaming
    StreamOpened,
    /// A non-empty fragment of generated text
    Fragment(String),
    /// The stream ended normally
    Completed,
    /// The request or the stream failed
    Failed(String),
}
