//! Pure workflow transitions.
//!
//! Every change to a session goes through [`reduce`]: an [`Action`] comes in,
//! the state mutates, and any follow-up work comes back as [`Effect`] values
//! for the runtime to execute. Nothing here performs IO or spawns tasks, so
//! the whole workflow is testable by feeding actions in a chosen order.

use tracing::{debug, warn};

use crate::error::{DetectionError, GenerationError, QueryError};
use crate::render;
use crate::session::SessionState;
use crate::types::{ConversationEntry, ImagePayload, Recipe, SessionMode};

const EMPTY_INGREDIENTS_NOTICE: &str = "No ingredients detected. Please upload an image first.";
const EMPTY_QUERY_NOTICE: &str = "Please enter a question first.";
const DETECTION_FAILED_NOTICE: &str = "Error uploading the image. Please try again.";
const GENERATION_FAILED_NOTICE: &str = "Error generating the recipe. Please try again.";

/// Something the user did in the interface.
#[derive(Debug, Clone)]
pub enum UserAction {
    /// A new image was chosen; replaces any current one and starts detection.
    SupplyImage(ImagePayload),
    /// Overwrite the ingredient row at `index` with `text`.
    EditIngredient { index: usize, text: String },
    /// Append an empty ingredient row for the user to fill in.
    AddIngredient,
    /// Delete the ingredient row at `index`.
    RemoveIngredient { index: usize },
    /// Ask for a recipe from the current working list.
    RequestGeneration,
    /// Send a free-text cooking question.
    SubmitQuery { text: String },
}

/// A settled gateway call, reported back by the runtime.
#[derive(Debug)]
pub enum RuntimeAction {
    DetectionFinished {
        epoch: u64,
        outcome: Result<Vec<String>, DetectionError>,
    },
    GenerationFinished {
        epoch: u64,
        outcome: Result<Recipe, GenerationError>,
    },
    QueryFinished {
        outcome: Result<Vec<String>, QueryError>,
    },
}

#[derive(Debug)]
pub enum Action {
    User(UserAction),
    Runtime(RuntimeAction),
}

impl From<UserAction> for Action {
    fn from(action: UserAction) -> Self {
        Action::User(action)
    }
}

impl From<RuntimeAction> for Action {
    fn from(action: RuntimeAction) -> Self {
        Action::Runtime(action)
    }
}

/// Work the runtime must start on behalf of a transition. Epochs tie a call
/// back to the session so superseded results can be recognized and dropped.
#[derive(Debug, Clone)]
pub enum Effect {
    Detect { epoch: u64, image: ImagePayload },
    Generate { epoch: u64, ingredients: Vec<String> },
    Answer { query: String },
}

/// Apply one action to the session and return the effects it demands.
pub fn reduce(state: &mut SessionState, action: Action) -> Vec<Effect> {
    match action {
        Action::User(action) => reduce_user(state, action),
        Action::Runtime(action) => reduce_runtime(state, action),
    }
}

fn reduce_user(state: &mut SessionState, action: UserAction) -> Vec<Effect> {
    match action {
        UserAction::SupplyImage(image) => {
            state.set_image(image.clone());
            state.set_mode(SessionMode::Detecting);
            let epoch = state.begin_detection();
            vec![Effect::Detect { epoch, image }]
        }
        UserAction::EditIngredient { index, text } => {
            state.edit_ingredient(index, text);
            Vec::new()
        }
        UserAction::AddIngredient => {
            state.add_blank_ingredient();
            Vec::new()
        }
        UserAction::RemoveIngredient { index } => {
            state.remove_ingredient(index);
            Vec::new()
        }
        UserAction::RequestGeneration => {
            if state.working_ingredients().is_empty() {
                state.append_message(ConversationEntry::assistant_notice(EMPTY_INGREDIENTS_NOTICE));
                return Vec::new();
            }
            state.set_mode(SessionMode::GeneratingRecipe);
            let epoch = state.begin_generation();
            vec![Effect::Generate {
                epoch,
                ingredients: state.working_ingredients().to_vec(),
            }]
        }
        UserAction::SubmitQuery { text } => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                state.append_message(ConversationEntry::assistant_notice(EMPTY_QUERY_NOTICE));
                return Vec::new();
            }
            let query = trimmed.to_string();
            state.append_message(ConversationEntry::user(text));
            state.begin_query();
            vec![Effect::Answer { query }]
        }
    }
}

fn reduce_runtime(state: &mut SessionState, action: RuntimeAction) -> Vec<Effect> {
    match action {
        RuntimeAction::DetectionFinished { epoch, outcome } => {
            if !state.finish_detection(epoch) {
                debug!(epoch, "dropping superseded detection result");
                return Vec::new();
            }
            match outcome {
                Ok(names) => {
                    state.append_message(ConversationEntry::assistant(
                        render::detected_ingredients_message(&names),
                    ));
                    state.record_detection(names);
                    state.set_mode(SessionMode::IngredientsEditable);
                }
                Err(err) => {
                    warn!(error = %err, "ingredient detection failed");
                    state.append_message(ConversationEntry::assistant_notice(
                        DETECTION_FAILED_NOTICE,
                    ));
                    state.set_mode(SessionMode::AwaitingImage);
                }
            }
        }
        RuntimeAction::GenerationFinished { epoch, outcome } => {
            if !state.finish_generation(epoch) {
                debug!(epoch, "dropping superseded generation result");
                return Vec::new();
            }
            match outcome {
                Ok(recipe) => {
                    state.append_message(ConversationEntry::assistant(render::recipe_message(
                        &recipe,
                    )));
                }
                Err(err) => {
                    warn!(error = %err, "recipe generation failed");
                    state.append_message(ConversationEntry::assistant_notice(
                        GENERATION_FAILED_NOTICE,
                    ));
                }
            }
            // A re-upload may have taken the mode over while this call ran;
            // only a session still generating returns to editing.
            if state.mode() == SessionMode::GeneratingRecipe {
                state.set_mode(SessionMode::IngredientsEditable);
            }
        }
        RuntimeAction::QueryFinished { outcome } => {
            state.finish_query();
            match outcome {
                Ok(details) => {
                    state.append_message(ConversationEntry::assistant(render::answer_message(
                        &details,
                    )));
                }
                Err(err) => {
                    warn!(error = %err, "chat query failed");
                    state.append_message(ConversationEntry::assistant_notice(format!(
                        "Error: {err}. Please try again."
                    )));
                }
            }
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Author, ContentKind, Section, SectionBody};

    fn image(name: &str) -> ImagePayload {
        ImagePayload::new(name, vec![0xff, 0xd8])
    }

    fn sample_recipe() -> Recipe {
        Recipe {
            sections: vec![
                Section {
                    heading: "Ingredients".to_string(),
                    body: SectionBody::Items(vec!["2 eggs".to_string()]),
                },
                Section {
                    heading: "Steps".to_string(),
                    body: SectionBody::Steps(vec!["Beat the **eggs**.".to_string()]),
                },
            ],
        }
    }

    fn detect(state: &mut SessionState, names: &[&str]) -> Vec<Effect> {
        let effects = reduce(state, UserAction::SupplyImage(image("fridge.jpg")).into());
        let epoch = match effects.as_slice() {
            [Effect::Detect { epoch, .. }] => *epoch,
            other => panic!("expected one detect effect, got {other:?}"),
        };
        reduce(
            state,
            RuntimeAction::DetectionFinished {
                epoch,
                outcome: Ok(names.iter().map(|n| n.to_string()).collect()),
            }
            .into(),
        )
    }

    #[test]
    fn supplying_an_image_starts_detection() {
        let mut state = SessionState::new();
        let effects = reduce(&mut state, UserAction::SupplyImage(image("fridge.jpg")).into());

        assert_eq!(state.mode(), SessionMode::Detecting);
        assert!(!state.mode().ingredients_editable());
        assert!(state.busy());
        assert_eq!(state.image().map(|i| i.name()), Some("fridge.jpg"));
        match effects.as_slice() {
            [Effect::Detect { epoch: 1, image }] => assert_eq!(image.name(), "fridge.jpg"),
            other => panic!("expected one detect effect, got {other:?}"),
        }
    }

    #[test]
    fn detection_success_unlocks_editing() {
        let mut state = SessionState::new();
        let effects = detect(&mut state, &["egg", "flour"]);

        assert!(effects.is_empty());
        assert_eq!(state.mode(), SessionMode::IngredientsEditable);
        assert!(state.mode().ingredients_editable());
        assert!(!state.busy());
        assert_eq!(state.working_ingredients().entries(), ["egg", "flour"]);
        assert_eq!(
            state.detected_ingredients().unwrap(),
            ["egg".to_string(), "flour".to_string()]
        );

        let entry = &state.log()[0];
        assert_eq!(entry.author, Author::Assistant);
        assert!(entry.body.starts_with("<h4>Detected Ingredients:</h4>"));
        assert!(entry.body.contains("<li>egg</li>"));
    }

    #[test]
    fn empty_detection_still_unlocks_editing() {
        let mut state = SessionState::new();
        detect(&mut state, &[]);

        assert_eq!(state.mode(), SessionMode::IngredientsEditable);
        assert!(state.working_ingredients().is_empty());
        assert_eq!(state.detected_ingredients(), Some(&[][..]));
    }

    #[test]
    fn detection_failure_preserves_image_and_list() {
        let mut state = SessionState::new();
        detect(&mut state, &["egg"]);

        let effects = reduce(&mut state, UserAction::SupplyImage(image("blurry.jpg")).into());
        let epoch = match effects.as_slice() {
            [Effect::Detect { epoch, .. }] => *epoch,
            other => panic!("expected one detect effect, got {other:?}"),
        };
        reduce(
            &mut state,
            RuntimeAction::DetectionFinished {
                epoch,
                outcome: Err(DetectionError::RequestFailed("connection refused".to_string())),
            }
            .into(),
        );

        assert_eq!(state.mode(), SessionMode::AwaitingImage);
        assert_eq!(state.image().map(|i| i.name()), Some("blurry.jpg"));
        assert_eq!(state.working_ingredients().entries(), ["egg"]);

        let last = state.log().last().unwrap();
        assert_eq!(last.body, "Error uploading the image. Please try again.");
        assert_eq!(last.kind, ContentKind::PlainText);
    }

    #[test]
    fn superseded_detection_is_dropped() {
        let mut state = SessionState::new();
        let first = reduce(&mut state, UserAction::SupplyImage(image("one.jpg")).into());
        let second = reduce(&mut state, UserAction::SupplyImage(image("two.jpg")).into());
        let first_epoch = match first.as_slice() {
            [Effect::Detect { epoch, .. }] => *epoch,
            other => panic!("expected one detect effect, got {other:?}"),
        };
        let second_epoch = match second.as_slice() {
            [Effect::Detect { epoch, .. }] => *epoch,
            other => panic!("expected one detect effect, got {other:?}"),
        };

        reduce(
            &mut state,
            RuntimeAction::DetectionFinished {
                epoch: first_epoch,
                outcome: Ok(vec!["stale".to_string()]),
            }
            .into(),
        );
        assert!(state.log().is_empty());
        assert_eq!(state.mode(), SessionMode::Detecting);
        assert!(state.busy());

        reduce(
            &mut state,
            RuntimeAction::DetectionFinished {
                epoch: second_epoch,
                outcome: Ok(vec!["egg".to_string()]),
            }
            .into(),
        );
        assert_eq!(state.working_ingredients().entries(), ["egg"]);
        assert_eq!(state.mode(), SessionMode::IngredientsEditable);
        assert!(!state.busy());
    }

    #[test]
    fn row_edits_produce_no_effects() {
        let mut state = SessionState::new();
        detect(&mut state, &["egg", "flour"]);

        assert!(reduce(
            &mut state,
            UserAction::EditIngredient {
                index: 1,
                text: "butter".to_string()
            }
            .into()
        )
        .is_empty());
        assert!(reduce(&mut state, UserAction::AddIngredient.into()).is_empty());
        assert!(reduce(&mut state, UserAction::RemoveIngredient { index: 0 }.into()).is_empty());

        assert_eq!(state.working_ingredients().entries(), ["butter", ""]);
        assert_eq!(
            state.detected_ingredients().unwrap(),
            ["egg".to_string(), "flour".to_string()]
        );
    }

    #[test]
    fn generation_with_empty_list_is_refused_locally() {
        let mut state = SessionState::new();
        let effects = reduce(&mut state, UserAction::RequestGeneration.into());

        assert!(effects.is_empty());
        assert!(!state.busy());
        assert_eq!(state.mode(), SessionMode::AwaitingImage);
        assert_eq!(state.log().len(), 1);
        assert_eq!(
            state.log()[0].body,
            "No ingredients detected. Please upload an image first."
        );

        // Every press repeats the notice.
        reduce(&mut state, UserAction::RequestGeneration.into());
        assert_eq!(state.log().len(), 2);
    }

    #[test]
    fn generation_success_returns_to_editing() {
        let mut state = SessionState::new();
        detect(&mut state, &["egg"]);

        let effects = reduce(&mut state, UserAction::RequestGeneration.into());
        let (epoch, ingredients) = match effects.as_slice() {
            [Effect::Generate { epoch, ingredients }] => (*epoch, ingredients.clone()),
            other => panic!("expected one generate effect, got {other:?}"),
        };
        assert_eq!(ingredients, ["egg"]);
        assert_eq!(state.mode(), SessionMode::GeneratingRecipe);

        reduce(
            &mut state,
            RuntimeAction::GenerationFinished {
                epoch,
                outcome: Ok(sample_recipe()),
            }
            .into(),
        );

        assert_eq!(state.mode(), SessionMode::IngredientsEditable);
        assert!(!state.busy());
        let last = state.log().last().unwrap();
        assert!(last.body.starts_with("<h4>Generated Recipe:</h4>"));
        assert!(last.body.contains("<h5>Steps</h5>"));
        assert!(last.body.contains("<strong>eggs</strong>"));
    }

    #[test]
    fn generation_failure_keeps_list_for_retry() {
        let mut state = SessionState::new();
        detect(&mut state, &["egg"]);

        let effects = reduce(&mut state, UserAction::RequestGeneration.into());
        let epoch = match effects.as_slice() {
            [Effect::Generate { epoch, .. }] => *epoch,
            other => panic!("expected one generate effect, got {other:?}"),
        };
        reduce(
            &mut state,
            RuntimeAction::GenerationFinished {
                epoch,
                outcome: Err(GenerationError::MalformedResponse("missing heading".to_string())),
            }
            .into(),
        );

        assert_eq!(state.mode(), SessionMode::IngredientsEditable);
        assert_eq!(state.working_ingredients().entries(), ["egg"]);
        assert_eq!(
            state.log().last().unwrap().body,
            "Error generating the recipe. Please try again."
        );
    }

    #[test]
    fn superseded_generation_is_dropped() {
        let mut state = SessionState::new();
        detect(&mut state, &["egg"]);

        let first = reduce(&mut state, UserAction::RequestGeneration.into());
        let second = reduce(&mut state, UserAction::RequestGeneration.into());
        let first_epoch = match first.as_slice() {
            [Effect::Generate { epoch, .. }] => *epoch,
            other => panic!("expected one generate effect, got {other:?}"),
        };
        let second_epoch = match second.as_slice() {
            [Effect::Generate { epoch, .. }] => *epoch,
            other => panic!("expected one generate effect, got {other:?}"),
        };

        let before = state.log().len();
        reduce(
            &mut state,
            RuntimeAction::GenerationFinished {
                epoch: first_epoch,
                outcome: Ok(sample_recipe()),
            }
            .into(),
        );
        assert_eq!(state.log().len(), before);
        assert_eq!(state.mode(), SessionMode::GeneratingRecipe);

        reduce(
            &mut state,
            RuntimeAction::GenerationFinished {
                epoch: second_epoch,
                outcome: Ok(sample_recipe()),
            }
            .into(),
        );
        assert_eq!(state.log().len(), before + 1);
        assert_eq!(state.mode(), SessionMode::IngredientsEditable);
    }

    #[test]
    fn reupload_during_generation_takes_over_the_mode() {
        let mut state = SessionState::new();
        detect(&mut state, &["egg"]);

        let generate = reduce(&mut state, UserAction::RequestGeneration.into());
        let generate_epoch = match generate.as_slice() {
            [Effect::Generate { epoch, .. }] => *epoch,
            other => panic!("expected one generate effect, got {other:?}"),
        };

        let detect_effects = reduce(&mut state, UserAction::SupplyImage(image("next.jpg")).into());
        let detect_epoch = match detect_effects.as_slice() {
            [Effect::Detect { epoch, .. }] => *epoch,
            other => panic!("expected one detect effect, got {other:?}"),
        };
        reduce(
            &mut state,
            RuntimeAction::DetectionFinished {
                epoch: detect_epoch,
                outcome: Ok(vec!["milk".to_string()]),
            }
            .into(),
        );
        assert_eq!(state.mode(), SessionMode::IngredientsEditable);

        // The old generation is still current by epoch; its recipe appends
        // but the mode stays with the newer detection's outcome.
        reduce(
            &mut state,
            RuntimeAction::GenerationFinished {
                epoch: generate_epoch,
                outcome: Ok(sample_recipe()),
            }
            .into(),
        );
        assert_eq!(state.mode(), SessionMode::IngredientsEditable);
        assert!(state
            .log()
            .last()
            .unwrap()
            .body
            .starts_with("<h4>Generated Recipe:</h4>"));
    }

    #[test]
    fn blank_query_appends_notice_without_dispatch() {
        let mut state = SessionState::new();
        let effects = reduce(
            &mut state,
            UserAction::SubmitQuery {
                text: "   ".to_string(),
            }
            .into(),
        );

        assert!(effects.is_empty());
        assert!(!state.busy());
        assert_eq!(state.log().len(), 1);
        assert_eq!(state.log()[0].author, Author::Assistant);
        assert_eq!(state.log()[0].body, "Please enter a question first.");
    }

    #[test]
    fn query_echoes_user_text_before_dispatch() {
        let mut state = SessionState::new();
        let effects = reduce(
            &mut state,
            UserAction::SubmitQuery {
                text: "How do I poach an egg?".to_string(),
            }
            .into(),
        );

        match effects.as_slice() {
            [Effect::Answer { query }] => assert_eq!(query, "How do I poach an egg?"),
            other => panic!("expected one answer effect, got {other:?}"),
        }
        assert!(state.busy());
        assert_eq!(state.log()[0].author, Author::User);
        assert_eq!(state.log()[0].body, "How do I poach an egg?");
    }

    #[test]
    fn query_dispatch_is_trimmed_but_the_echo_is_not() {
        let mut state = SessionState::new();
        let effects = reduce(
            &mut state,
            UserAction::SubmitQuery {
                text: "  how hot is a broiler?  ".to_string(),
            }
            .into(),
        );

        match effects.as_slice() {
            [Effect::Answer { query }] => assert_eq!(query, "how hot is a broiler?"),
            other => panic!("expected one answer effect, got {other:?}"),
        }
        assert_eq!(state.log()[0].body, "  how hot is a broiler?  ");
    }

    #[test]
    fn query_during_generation_leaves_the_mode_alone() {
        let mut state = SessionState::new();
        detect(&mut state, &["egg"]);
        reduce(&mut state, UserAction::RequestGeneration.into());
        assert_eq!(state.mode(), SessionMode::GeneratingRecipe);

        reduce(
            &mut state,
            UserAction::SubmitQuery {
                text: "can I use oil instead of butter?".to_string(),
            }
            .into(),
        );
        assert_eq!(state.mode(), SessionMode::GeneratingRecipe);

        reduce(
            &mut state,
            RuntimeAction::QueryFinished {
                outcome: Ok(vec!["Yes, swap one for one.".to_string()]),
            }
            .into(),
        );
        assert_eq!(state.mode(), SessionMode::GeneratingRecipe);
        assert!(state.busy());

        let last = state.log().last().unwrap();
        assert_eq!(last.body, "<h4>Response:</h4>Yes, swap one for one.");
    }

    #[test]
    fn query_failure_notice_carries_the_error_text() {
        let mut state = SessionState::new();
        reduce(
            &mut state,
            UserAction::SubmitQuery {
                text: "hello".to_string(),
            }
            .into(),
        );
        reduce(
            &mut state,
            RuntimeAction::QueryFinished {
                outcome: Err(QueryError::ServiceStatus {
                    status: 500,
                    message: None,
                }),
            }
            .into(),
        );

        let last = state.log().last().unwrap();
        assert_eq!(
            last.body,
            "Error: Server error: 500 - Unknown error. Please try again."
        );
        assert_eq!(last.kind, ContentKind::PlainText);
        assert!(!state.busy());
    }
}
