//! Gateway to the ingredient-detection / recipe-generation / Q&A backend.
//!
//! The backend is reached through a trait so the session can run against the
//! production HTTP client or an in-memory fake. Each operation is a single
//! request/response round trip with no internal retry; whether a result is
//! still wanted when it arrives is the session's concern, not the gateway's.

mod fake;
mod http;

pub use fake::FakeBackend;
pub use http::{HttpBackend, HttpBackendBuilder};

use async_trait::async_trait;
use std::fmt;

use crate::error::{DetectionError, GenerationError, QueryError};
use crate::types::{ImagePayload, Recipe};

/// Trait for backend clients.
///
/// Implementations should be stateless from the session's point of view:
/// they receive owned or borrowed values and return new values, never holding
/// references into session state.
#[async_trait]
pub trait BackendClient: Send + Sync + fmt::Debug {
    /// Detect ingredient names in an image. An empty result is a valid
    /// detection, not an error.
    async fn detect_ingredients(&self, image: &ImagePayload)
        -> Result<Vec<String>, DetectionError>;

    /// Generate a recipe from a non-empty ingredient list.
    async fn generate_recipe(&self, ingredients: &[String]) -> Result<Recipe, GenerationError>;

    /// Answer a free-text cooking question as a list of response lines.
    async fn answer_query(&self, query: &str) -> Result<Vec<String>, QueryError>;
}
