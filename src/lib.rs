//! Session core for an ingredient-detection recipe chatbot.
//!
//! The crate models one conversational session: the user supplies a photo of
//! ingredients, a detection service names what it sees, the user corrects the
//! list, and a generation service turns the list into a recipe. Free-text
//! cooking questions can be asked at any point.
//!
//! The pieces layer cleanly:
//!
//! - [`session::SessionState`] holds everything presentation needs: the
//!   conversation log, both ingredient lists, the image, the mode, and the
//!   busy flag.
//! - [`reducer::reduce`] is the only way state changes. It takes an
//!   [`reducer::Action`] and returns [`reducer::Effect`]s for the runtime,
//!   performing no IO itself.
//! - [`workflow::Workflow`] drives the loop: it launches effects as tasks
//!   against a [`backend::BackendClient`] and applies completions in the
//!   order they arrive.
//! - [`backend::HttpBackend`] speaks the service's HTTP surface;
//!   [`backend::FakeBackend`] scripts outcomes for tests.

pub mod backend;
pub mod error;
pub mod ingredients;
pub mod reducer;
pub mod render;
pub mod session;
pub mod types;
pub mod workflow;

pub use backend::{BackendClient, FakeBackend, HttpBackend, HttpBackendBuilder};
pub use error::{DetectionError, GenerationError, QueryError};
pub use ingredients::IngredientList;
pub use reducer::{reduce, Action, Effect, RuntimeAction, UserAction};
pub use session::SessionState;
pub use types::{
    Author, ContentKind, ConversationEntry, ImagePayload, Recipe, Section, SectionBody,
    SessionMode,
};
pub use workflow::Workflow;
