//! Rap music video storyboards from a reference photo and a short idea.
//!
//! A [`studio::Studio`] owns the user's inputs and the state of one
//! generation attempt. It drives a [`blueprint::BlueprintGenerator`], which
//! asks the generative service for a structured blueprint and then renders
//! one portrait still per scene. The [`export`] helpers turn a finished
//! blueprint into files through an [`export::ArtifactExporter`].

pub mod api;
pub mod blueprint;
pub mod error;
pub mod export;
pub mod scene;
pub mod studio;

pub use error::{Result, StudioError};
