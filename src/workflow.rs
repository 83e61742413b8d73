//! The async driver around the reducer.
//!
//! [`Workflow`] owns the session, a gateway handle, and a completion channel.
//! User actions go through the reducer synchronously; the effects that come
//! back are launched as tasks, and each task reports its outcome on the
//! channel as a [`RuntimeAction`]. Completions are applied strictly in
//! arrival order, so the conversation log reflects the order calls finished,
//! not the order they started.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::backend::BackendClient;
use crate::reducer::{self, Action, Effect, RuntimeAction, UserAction};
use crate::session::SessionState;

#[derive(Debug)]
pub struct Workflow {
    state: SessionState,
    backend: Arc<dyn BackendClient>,
    completions_tx: mpsc::UnboundedSender<RuntimeAction>,
    completions_rx: mpsc::UnboundedReceiver<RuntimeAction>,
}

impl Workflow {
    pub fn new(backend: Arc<dyn BackendClient>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            state: SessionState::new(),
            backend,
            completions_tx,
            completions_rx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Apply one user action and launch whatever gateway work it demands.
    /// Returns immediately; the calls run in spawned tasks.
    pub fn apply(&mut self, action: UserAction) {
        let effects = reducer::reduce(&mut self.state, Action::User(action));
        for effect in effects {
            self.launch(effect);
        }
    }

    /// Apply the next completion, waiting for one if none has arrived yet.
    /// Returns false once nothing is outstanding.
    pub async fn settle_next(&mut self) -> bool {
        if !self.state.busy() {
            return false;
        }
        let Some(completion) = self.completions_rx.recv().await else {
            return false;
        };
        let effects = reducer::reduce(&mut self.state, Action::Runtime(completion));
        for effect in effects {
            self.launch(effect);
        }
        true
    }

    /// Drain completions until no gateway call is outstanding.
    pub async fn run_until_idle(&mut self) {
        while self.settle_next().await {}
    }

    fn launch(&self, effect: Effect) {
        let backend = Arc::clone(&self.backend);
        let completions = self.completions_tx.clone();
        match effect {
            Effect::Detect { epoch, image } => {
                tokio::spawn(async move {
                    let outcome = backend.detect_ingredients(&image).await;
                    let report = RuntimeAction::DetectionFinished { epoch, outcome };
                    if completions.send(report).is_err() {
                        debug!("session dropped before detection settled");
                    }
                });
            }
            Effect::Generate { epoch, ingredients } => {
                tokio::spawn(async move {
                    let outcome = backend.generate_recipe(&ingredients).await;
                    let report = RuntimeAction::GenerationFinished { epoch, outcome };
                    if completions.send(report).is_err() {
                        debug!("session dropped before generation settled");
                    }
                });
            }
            Effect::Answer { query } => {
                tokio::spawn(async move {
                    let outcome = backend.answer_query(&query).await;
                    let report = RuntimeAction::QueryFinished { outcome };
                    if completions.send(report).is_err() {
                        debug!("session dropped before query settled");
                    }
                });
            }
        }
    }
}
