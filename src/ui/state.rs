//! Analysis client state and its single update function.
//!
//! `UiState` is never mutated in place: every [`Action`] yields a new state
//! plus, at most, one [`Effect`] for the caller to run.

use crate::analysis::pii::{self, PiiStatus};
use crate::analysis::{AnalysisError, AnalysisRequest, AnalysisResult, ImageUpload};

pub const MISSING_INPUT: &str = "Please upload an image and enter a prompt.";
pub const ANALYSIS_DONE: &str = "Analysis completed successfully!";
pub const INPUTS_CLEARED: &str = "Inputs cleared successfully.";
pub const BACKEND_UNAVAILABLE: &str = "Warning: Backend service may be unavailable";
pub const ALREADY_RUNNING: &str = "An analysis is already in progress.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A one-shot message for the user
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Page background preference
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Background {
    #[default]
    Default,
    /// CSS color, e.g. `#f5f5f5`
    Color(String),
    /// Image URL used as a cover background
    Image(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UiState {
    pub image: Option<ImageUpload>,
    /// Data URL of `image`, rebuilt whenever a new image is selected
    pub preview: Option<String>,
    pub prompt: String,
    pub description: String,
    pub analysis: String,
    pub phase: Phase,
    pub notice: Option<Notice>,
    pub background: Background,
    /// Bumped on every accepted submit; completions for older values are dropped.
    pub generation: u64,
}

#[derive(Debug)]
pub enum Action {
    /// Result of the startup health check
    BackendChecked(bool),
    SelectImage(ImageUpload),
    EditPrompt(String),
    Submit,
    /// New inputs and a submit in one step. While an analysis is running the
    /// inputs are left as they are and only the rejection notice changes.
    SubmitWith {
        image: Option<ImageUpload>,
        prompt: Option<String>,
    },
    Completed {
        generation: u64,
        outcome: Result<AnalysisResult, AnalysisError>,
    },
    Clear,
    DismissNotice,
    SetBackground(Background),
}

/// Work the caller must perform, then report back with [`Action::Completed`]
#[derive(Debug, Clone)]
pub enum Effect {
    Analyze {
        generation: u64,
        request: AnalysisRequest,
    },
}

impl UiState {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Submitting
    }

    /// Verdict for the current analysis text, if there is any.
    pub fn pii_status(&self) -> Option<PiiStatus> {
        if self.analysis.is_empty() {
            None
        } else {
            Some(pii::classify(&self.analysis))
        }
    }

    pub fn update(&self, action: Action) -> (UiState, Option<Effect>) {
        let mut next = self.clone();

        match action {
            Action::BackendChecked(true) => {}
            Action::BackendChecked(false) => {
                next.notice = Some(Notice::new(Severity::Warning, BACKEND_UNAVAILABLE));
            }
            Action::SelectImage(image) => {
                next.preview = Some(image.preview_data_url());
                next.image = Some(image);
            }
            Action::EditPrompt(prompt) => {
                next.prompt = prompt;
            }
            Action::Submit => return self.submit(next),
            Action::SubmitWith { image, prompt } => {
                if self.is_loading() {
                    return self.submit(next);
                }
                if let Some(image) = image {
                    next.preview = Some(image.preview_data_url());
                    next.image = Some(image);
                }
                if let Some(prompt) = prompt {
                    next.prompt = prompt;
                }
                return next.submit(next.clone());
            }
            Action::Completed {
                generation,
                outcome,
            } => {
                if self.phase != Phase::Submitting || generation != self.generation {
                    return (next, None);
                }
                match outcome {
                    Ok(result) => {
                        next.description = result.description;
                        next.analysis = result.analysis;
                        next.phase = Phase::Succeeded;
                        next.notice = Some(Notice::new(Severity::Success, ANALYSIS_DONE));
                    }
                    Err(err) => {
                        next.phase = Phase::Failed;
                        next.notice = Some(Notice::new(
                            Severity::Error,
                            format!("Error: {}", err.user_message()),
                        ));
                    }
                }
            }
            Action::Clear => {
                next = UiState {
                    background: self.background.clone(),
                    generation: self.generation,
                    notice: Some(Notice::new(Severity::Info, INPUTS_CLEARED)),
                    ..UiState::default()
                };
            }
            Action::DismissNotice => {
                next.notice = None;
            }
            Action::SetBackground(background) => {
                next.background = background;
            }
        }

        (next, None)
    }

    fn submit(&self, mut next: UiState) -> (UiState, Option<Effect>) {
        if self.is_loading() {
            next.notice = Some(Notice::new(Severity::Info, ALREADY_RUNNING));
            return (next, None);
        }

        let image = match &self.image {
            Some(image) if !self.prompt.trim().is_empty() => image.clone(),
            _ => {
                next.notice = Some(Notice::new(Severity::Warning, MISSING_INPUT));
                return (next, None);
            }
        };

        next.generation = self.generation + 1;
        next.phase = Phase::Submitting;
        let effect = Effect::Analyze {
            generation: next.generation,
            request: AnalysisRequest {
                image,
                prompt: self.prompt.clone(),
            },
        };
        (next, Some(effect))
    }
}
