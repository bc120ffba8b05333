use crate::api::GenerativeService;
use crate::blueprint::BlueprintGenerator;
use crate::scene::{Blueprint, ReferenceImage, SceneCountHint};
use tracing::{error, info};

pub const IDLE_STATUS: &str = "PREPARING STUDIO...";
pub const INVALID_INPUT_MESSAGE: &str = "Please provide a reference image and an idea.";
pub const GENERATION_FAILED_MESSAGE: &str = "AI connection error. Please try again.";

/// Lifecycle of a single generation attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationState {
    pub is_generating: bool,
    pub status_message: String,
    /// User-facing message, never the underlying error
    pub error: Option<String>,
    pub result: Option<Blueprint>,
}

impl Default for GenerationState {
    fn default() -> Self {
        Self {
            is_generating: false,
            status_message: IDLE_STATUS.to_string(),
            error: None,
            result: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserInput {
    pub image: Option<ReferenceImage>,
    pub idea: String,
    pub scene_count: SceneCountHint,
}

impl UserInput {
    fn has_idea(&self) -> bool {
        !self.idea.trim().is_empty()
    }
}

/// Owns the user's inputs and the state of the current attempt.
///
/// `start_generation` takes `&mut self`, so at most one attempt can be in
/// flight per studio.
pub struct Studio<S> {
    generator: BlueprintGenerator<S>,
    input: UserInput,
    state: GenerationState,
}

impl<S: GenerativeService> Studio<S> {
    pub fn new(generator: BlueprintGenerator<S>) -> Self {
        Self {
            generator,
            input: UserInput::default(),
            state: GenerationState::default(),
        }
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn input(&self) -> &UserInput {
        &self.input
    }

    pub fn result(&self) -> Option<&Blueprint> {
        self.state.result.as_ref()
    }

    pub fn generator(&self) -> &BlueprintGenerator<S> {
        &self.generator
    }

    pub async fn start_generation(
        &mut self,
        image: Option<ReferenceImage>,
        idea: impl Into<String>,
        scene_count: SceneCountHint,
    ) -> &GenerationState {
        self.input = UserInput {
            image,
            idea: idea.into(),
            scene_count,
        };

        let Self {
            generator,
            input,
            state,
        } = self;
        let Some(image) = input.image.as_ref().filter(|_| input.has_idea()) else {
            state.is_generating = false;
            state.error = Some(INVALID_INPUT_MESSAGE.to_string());
            state.result = None;
            return state;
        };

        state.is_generating = true;
        state.status_message = "ANALYZING...".to_string();
        state.error = None;
        state.result = None;

        let outcome = generator
            .generate(image, &input.idea, input.scene_count, |progress| {
                info!("{}", progress);
                state.status_message = progress.to_string();
            })
            .await;

        state.is_generating = false;
        match outcome {
            Ok(blueprint) => state.result = Some(blueprint),
            Err(e) => {
                error!("Generation failed: {}", e);
                state.error = Some(GENERATION_FAILED_MESSAGE.to_string());
            }
        }
        state
    }

    /// Discard inputs and any result and return to the initial state.
    pub fn reset(&mut self) {
        self.input = UserInput::default();
        self.state = GenerationState {
            status_message: String::new(),
            ..GenerationState::default()
        };
    }
}
