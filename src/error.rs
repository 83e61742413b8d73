use thiserror::Error;

/// Failure of an ingredient-detection round trip.
///
/// The backend's error bodies carry no `ingredients` field and therefore
/// surface as zero-ingredient detections, not as errors; this enum covers
/// only transport failures and bodies that are not JSON at all.
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Detection request failed: {0}")]
    RequestFailed(String),

    #[error("Unreadable detection response: {0}")]
    InvalidResponse(String),
}

/// Failure of a recipe-generation round trip.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Recipe request failed: {0}")]
    RequestFailed(String),

    #[error("Recipe response missing or malformed: {0}")]
    MalformedResponse(String),
}

/// Failure of a chat-query round trip.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Query request failed: {0}")]
    RequestFailed(String),

    /// The service answered with a non-success status. The message is the
    /// `detail` field of the error body, when one could be read.
    #[error("Server error: {status} - {}", .message.as_deref().unwrap_or("Unknown error"))]
    ServiceStatus { status: u16, message: Option<String> },

    #[error("Unreadable answer response: {0}")]
    InvalidResponse(String),
}
