//! Production backend client speaking JSON over HTTP.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{DetectionError, GenerationError, QueryError};
use crate::types::{ImagePayload, Recipe, Section, SectionBody};

use super::BackendClient;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Configuration for HttpBackend.
#[derive(Debug, Clone)]
pub struct HttpBackendBuilder {
    base_url: String,
    timeout: Duration,
}

impl Default for HttpBackendBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpBackendBuilder {
    /// Create a new builder with default settings.
    ///
    /// Environment variables:
    /// - `SOUSCHEF_API_URL`: backend base URL (default `http://127.0.0.1:8000`)
    pub fn new() -> Self {
        let base_url =
            std::env::var("SOUSCHEF_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Self {
            base_url,
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the backend base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the HttpBackend.
    pub fn build(self) -> Result<HttpBackend, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;

        Ok(HttpBackend {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

/// Backend client for a running detection/generation/Q&A service.
#[derive(Debug)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create a client with default configuration.
    pub fn new() -> Result<Self, reqwest::Error> {
        HttpBackendBuilder::new().build()
    }

    /// Get a builder for custom configuration.
    pub fn builder() -> HttpBackendBuilder {
        HttpBackendBuilder::new()
    }
}

// ============================================================================
// Wire formats
// ============================================================================

#[derive(Debug, Serialize)]
struct RecipeRequest<'a> {
    ingredients: &'a [String],
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

/// Detection response. `ingredients` maps each detected name to an occurrence
/// count; only the keys are used, in response order.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    ingredients: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct RecipeResponse {
    subsections: Option<Vec<WireSection>>,
}

#[derive(Debug, Deserialize)]
struct WireSection {
    heading: String,
    items: Option<Vec<String>>,
    steps: Option<Vec<String>>,
}

impl WireSection {
    fn into_section(self) -> Section {
        // `items` takes precedence when a section carries both; a section
        // carrying neither keeps its heading over an empty step list.
        let body = match (self.items, self.steps) {
            (Some(items), _) => SectionBody::Items(items),
            (None, Some(steps)) => SectionBody::Steps(steps),
            (None, None) => SectionBody::Steps(Vec::new()),
        };

        Section {
            heading: self.heading,
            body,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnswerResponse {
    details: Vec<String>,
}

/// Error body shape of the service's non-success responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

fn parse_upload_body(body: &str) -> Result<Vec<String>, DetectionError> {
    let response: UploadResponse =
        serde_json::from_str(body).map_err(|e| DetectionError::InvalidResponse(e.to_string()))?;

    Ok(response
        .ingredients
        .map(|found| found.keys().cloned().collect())
        .unwrap_or_default())
}

fn parse_recipe_body(body: &str) -> Result<Recipe, GenerationError> {
    let response: RecipeResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

    let sections = response.subsections.ok_or_else(|| {
        GenerationError::MalformedResponse("missing `subsections` list".to_string())
    })?;

    Ok(Recipe {
        sections: sections.into_iter().map(WireSection::into_section).collect(),
    })
}

fn parse_answer_body(body: &str) -> Result<Vec<String>, QueryError> {
    let response: AnswerResponse =
        serde_json::from_str(body).map_err(|e| QueryError::InvalidResponse(e.to_string()))?;

    Ok(response.details)
}

#[async_trait]
impl BackendClient for HttpBackend {
    async fn detect_ingredients(
        &self,
        image: &ImagePayload,
    ) -> Result<Vec<String>, DetectionError> {
        let part = reqwest::multipart::Part::bytes(image.bytes().to_vec())
            .file_name(image.name().to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        debug!(name = image.name(), bytes = image.bytes().len(), "uploading image for detection");
        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| DetectionError::RequestFailed(e.to_string()))?;

        // The body is parsed without consulting the status line; a body
        // without `ingredients` counts as zero detected names.
        let body = response
            .text()
            .await
            .map_err(|e| DetectionError::RequestFailed(e.to_string()))?;
        let names = parse_upload_body(&body)?;

        debug!(count = names.len(), "detection response parsed");
        Ok(names)
    }

    async fn generate_recipe(&self, ingredients: &[String]) -> Result<Recipe, GenerationError> {
        let request = RecipeRequest { ingredients };

        debug!(count = ingredients.len(), "requesting recipe");
        let response = self
            .client
            .post(format!("{}/recipe", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;

        parse_recipe_body(&body)
    }

    async fn answer_query(&self, query: &str) -> Result<Vec<String>, QueryError> {
        let request = QueryRequest { query };

        let response = self
            .client
            .post(format!("{}/chatbot", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| QueryError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| QueryError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail);
            debug!(status = status.as_u16(), "query rejected by service");
            return Err(QueryError::ServiceStatus {
                status: status.as_u16(),
                message,
            });
        }

        parse_answer_body(&body)
    }
}
