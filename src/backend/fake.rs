//! Fake backend for testing.
//!
//! Outcomes are scripted per operation and consumed in call order, letting
//! tests run the full session loop without network access. Optional
//! per-operation delays steer completion order in interleaving tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{DetectionError, GenerationError, QueryError};
use crate::types::{ImagePayload, Recipe};

use super::BackendClient;

/// A scripted backend for tests.
///
/// Each operation first drains its queue of one-shot outcomes, then falls
/// back to its default; with neither, the call fails.
#[derive(Debug, Default)]
pub struct FakeBackend {
    detections: Mutex<VecDeque<Result<Vec<String>, DetectionError>>>,
    default_names: Option<Vec<String>>,
    generations: Mutex<VecDeque<Result<Recipe, GenerationError>>>,
    default_recipe: Option<Recipe>,
    answers: Mutex<VecDeque<Result<Vec<String>, QueryError>>>,
    default_answer: Option<Vec<String>>,
    detect_delay: Option<Duration>,
    generate_delay: Option<Duration>,
    answer_delay: Option<Duration>,
}

impl FakeBackend {
    /// Create a fake with nothing scripted; every call fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default detection result.
    pub fn with_detected_names(mut self, names: &[&str]) -> Self {
        self.default_names = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    /// Set the default generation result.
    pub fn with_recipe(mut self, recipe: Recipe) -> Self {
        self.default_recipe = Some(recipe);
        self
    }

    /// Set the default answer lines.
    pub fn with_answer(mut self, lines: &[&str]) -> Self {
        self.default_answer = Some(lines.iter().map(|l| l.to_string()).collect());
        self
    }

    /// Queue a one-shot detection outcome ahead of the default.
    pub fn queue_detection(self, outcome: Result<Vec<String>, DetectionError>) -> Self {
        self.detections.lock().unwrap().push_back(outcome);
        self
    }

    /// Queue a one-shot generation outcome ahead of the default.
    pub fn queue_generation(self, outcome: Result<Recipe, GenerationError>) -> Self {
        self.generations.lock().unwrap().push_back(outcome);
        self
    }

    /// Queue a one-shot answer outcome ahead of the default.
    pub fn queue_answer(self, outcome: Result<Vec<String>, QueryError>) -> Self {
        self.answers.lock().unwrap().push_back(outcome);
        self
    }

    /// Delay every detection call by `delay`.
    pub fn with_detect_delay(mut self, delay: Duration) -> Self {
        self.detect_delay = Some(delay);
        self
    }

    /// Delay every generation call by `delay`.
    pub fn with_generate_delay(mut self, delay: Duration) -> Self {
        self.generate_delay = Some(delay);
        self
    }

    /// Delay every answer call by `delay`.
    pub fn with_answer_delay(mut self, delay: Duration) -> Self {
        self.answer_delay = Some(delay);
        self
    }
}

#[async_trait]
impl BackendClient for FakeBackend {
    async fn detect_ingredients(
        &self,
        _image: &ImagePayload,
    ) -> Result<Vec<String>, DetectionError> {
        if let Some(delay) = self.detect_delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(outcome) = self.detections.lock().unwrap().pop_front() {
            return outcome;
        }

        match &self.default_names {
            Some(names) => Ok(names.clone()),
            None => Err(DetectionError::RequestFailed(
                "FakeBackend: no detection scripted".to_string(),
            )),
        }
    }

    async fn generate_recipe(&self, _ingredients: &[String]) -> Result<Recipe, GenerationError> {
        if let Some(delay) = self.generate_delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(outcome) = self.generations.lock().unwrap().pop_front() {
            return outcome;
        }

        match &self.default_recipe {
            Some(recipe) => Ok(recipe.clone()),
            None => Err(GenerationError::RequestFailed(
                "FakeBackend: no recipe scripted".to_string(),
            )),
        }
    }

    async fn answer_query(&self, _query: &str) -> Result<Vec<String>, QueryError> {
        if let Some(delay) = self.answer_delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(outcome) = self.answers.lock().unwrap().pop_front() {
            return outcome;
        }

        match &self.default_answer {
            Some(lines) => Ok(lines.clone()),
            None => Err(QueryError::RequestFailed(
                "FakeBackend: no answer scripted".to_string(),
            )),
        }
    }
}
