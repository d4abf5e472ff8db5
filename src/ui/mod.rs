//! Analysis client front ends (browser and terminal) over one reducer.

pub mod cli;
pub mod render;
pub mod server;
pub mod state;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::analysis::AnalysisClient;
use state::{Action, Effect, UiState};

/// Holds the current [`UiState`] and swaps in each new one.
///
/// The lock is only taken around `update`, never across a network call.
#[derive(Clone, Default)]
pub struct Store {
    state: Arc<Mutex<UiState>>,
}

impl Store {
    pub fn new(state: UiState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub async fn snapshot(&self) -> UiState {
        self.state.lock().await.clone()
    }

    /// Snapshot for rendering; the notice is dismissed in the same step so it
    /// is shown exactly once.
    pub async fn take_for_render(&self) -> UiState {
        let mut guard = self.state.lock().await;
        let snapshot = guard.clone();
        let (next, _) = guard.update(Action::DismissNotice);
        *guard = next;
        snapshot
    }

    pub async fn dispatch(&self, action: Action) -> Option<Effect> {
        let mut guard = self.state.lock().await;
        let (next, effect) = guard.update(action);
        *guard = next;
        effect
    }

    /// Dispatch, then run any resulting effects to completion.
    pub async fn dispatch_and_run(&self, client: &AnalysisClient, action: Action) {
        let mut effect = self.dispatch(action).await;
        while let Some(pending) = effect {
            let completed = run_effect(client, pending).await;
            effect = self.dispatch(completed).await;
        }
    }
}

pub async fn run_effect(client: &AnalysisClient, effect: Effect) -> Action {
    match effect {
        Effect::Analyze {
            generation,
            request,
        } => {
            info!("Analyzing {} (request {})", request.image.file_name, generation);
            let outcome = client.analyze(&request).await;
            if let Err(e) = &outcome {
                warn!("Analysis failed: {}", e);
            }
            Action::Completed {
                generation,
                outcome,
            }
        }
    }
}

/// Best-effort startup health check; a failure only produces a warning notice.
pub async fn check_backend(store: &Store, client: &AnalysisClient) {
    let healthy = match client.health().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Backend health check failed: {}", e);
            false
        }
    };
    store.dispatch(Action::BackendChecked(healthy)).await;
}
