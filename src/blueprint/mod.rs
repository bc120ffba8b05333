mod prompt;

use crate::api::{GenerativeService, ImageRequest, StructuredRequest};
use crate::error::{Result, StudioError};
use crate::scene::{Blueprint, GeneratedImage, ReferenceImage, Scene, SceneCountHint};
use std::fmt;
use tracing::{info, warn};

/// Coarse status reported while a blueprint is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Analyzing,
    /// 1-based scene index
    RenderingScene { index: usize, total: usize },
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::Analyzing => write!(f, "ANALYZING IDEA & OPTIMIZING FLOW..."),
            Progress::RenderingScene { index, total } => {
                write!(f, "RENDERING SCENE {}/{}...", index, total)
            }
        }
    }
}

/// Two-phase orchestration: one structured blueprint request, then one
/// image request per scene, strictly in order.
pub struct BlueprintGenerator<S> {
    service: S,
}

impl<S: GenerativeService> BlueprintGenerator<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub async fn generate<F>(
        &self,
        image: &ReferenceImage,
        idea: &str,
        hint: SceneCountHint,
        mut on_progress: F,
    ) -> Result<Blueprint>
    where
        F: FnMut(&Progress),
    {
        on_progress(&Progress::Analyzing);

        let mut blueprint = self.synthesize(image, idea, hint).await?;
        info!(
            "Blueprint \"{}\" has {} scenes (hint was {})",
            blueprint.video_title,
            blueprint.script.len(),
            hint
        );

        let total = blueprint.script.len();
        for (i, scene) in blueprint.script.iter_mut().enumerate() {
            on_progress(&Progress::RenderingScene {
                index: i + 1,
                total,
            });
            // One attempt per scene; a failure leaves this scene pending.
            match self.render_scene(image, scene).await {
                Ok(rendered) => scene.image = Some(rendered),
                Err(e) => warn!("Failed to render scene {}: {}", i + 1, e),
            }
        }

        info!(
            "Rendered {}/{} scenes",
            blueprint.rendered_count(),
            total
        );
        Ok(blueprint)
    }

    async fn synthesize(
        &self,
        image: &ReferenceImage,
        idea: &str,
        hint: SceneCountHint,
    ) -> Result<Blueprint> {
        let system_instruction = prompt::system_instruction(hint);
        let user_prompt = prompt::user_prompt(idea, hint);
        let schema = prompt::response_schema();
        let request = StructuredRequest {
            image,
            system_instruction: &system_instruction,
            prompt: &user_prompt,
            response_schema: &schema,
        };
        let text = self.service.generate_structured(&request).await?;
        Blueprint::from_json(&text)
    }

    async fn render_scene(&self, image: &ReferenceImage, scene: &Scene) -> Result<GeneratedImage> {
        let image_prompt = prompt::scene_image_prompt(scene);
        let request = ImageRequest {
            image,
            prompt: &image_prompt,
            aspect_ratio: prompt::ASPECT_RATIO,
        };
        self.service
            .generate_images(&request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StudioError::invalid_response("image response carried no image payload"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockService;
    use crate::scene::fixtures::{blueprint_json, reference_image};

    fn hint(n: u8) -> SceneCountHint {
        SceneCountHint::try_from(n).unwrap()
    }

    #[tokio::test]
    async fn test_generate_renders_every_scene() {
        let generator = BlueprintGenerator::new(MockService::with_blueprint(blueprint_json(3)));
        let blueprint = generator
            .generate(&reference_image(), "a dream deferred", hint(3), |_| {})
            .await
            .unwrap();

        assert_eq!(blueprint.script.len(), 3);
        assert_eq!(blueprint.rendered_count(), 3);
        assert!(blueprint
            .script
            .iter()
            .all(|s| !s.lyrics.is_empty() && !s.visual_prompt.is_empty()));
        assert_eq!(
            blueprint.script[2].image.as_ref().unwrap().data,
            b"scene-3".to_vec()
        );
        assert_eq!(generator.service().structured_calls(), 1);
        assert_eq!(generator.service().image_calls(), 3);
    }

    #[tokio::test]
    async fn test_every_request_carries_the_reference_image() {
        let reference = reference_image();
        let generator = BlueprintGenerator::new(MockService::with_blueprint(blueprint_json(3)));
        let blueprint = generator
            .generate(&reference, "a dream deferred", hint(3), |_| {})
            .await
            .unwrap();

        let structured = generator.service().structured_log();
        assert_eq!(structured.len(), 1);
        assert_eq!(structured[0].image, reference.data);
        assert_eq!(
            structured[0].response_schema.as_ref(),
            Some(&prompt::response_schema())
        );
        assert!(structured[0]
            .system_instruction
            .as_deref()
            .unwrap()
            .contains("about 3 scenes"));

        let images = generator.service().image_log();
        assert_eq!(images.len(), blueprint.script.len());
        for (request, scene) in images.iter().zip(&blueprint.script) {
            assert_eq!(request.image, reference.data);
            assert_eq!(request.aspect_ratio.as_deref(), Some("9:16"));
            assert!(request.prompt.starts_with(scene.visual_prompt.as_str()));
            assert!(request.prompt.contains("9:16 Portrait orientation"));
            assert!(request.prompt.contains("No text."));
            assert!(request.prompt.contains("reference photo"));
        }
    }

    #[tokio::test]
    async fn test_progress_reports_each_scene_in_order() {
        let generator = BlueprintGenerator::new(MockService::with_blueprint(blueprint_json(4)));
        let mut events = Vec::new();
        generator
            .generate(&reference_image(), "city lights", hint(2), |p| events.push(*p))
            .await
            .unwrap();

        let mut expected = vec![Progress::Analyzing];
        expected.extend((1..=4).map(|index| Progress::RenderingScene { index, total: 4 }));
        assert_eq!(events, expected);
        assert_eq!(events[2].to_string(), "RENDERING SCENE 2/4...");
    }

    #[tokio::test]
    async fn test_scene_failure_is_isolated() {
        let service = MockService::with_blueprint(blueprint_json(3)).failing_image(2);
        let generator = BlueprintGenerator::new(service);
        let blueprint = generator
            .generate(&reference_image(), "a dream deferred", hint(3), |_| {})
            .await
            .unwrap();

        assert_eq!(blueprint.script.len(), 3);
        assert!(blueprint.script[0].is_rendered());
        assert!(!blueprint.script[1].is_rendered());
        assert!(blueprint.script[2].is_rendered());
        assert_eq!(generator.service().image_calls(), 3);
    }

    #[tokio::test]
    async fn test_missing_image_payload_leaves_scene_pending() {
        let service = MockService::with_blueprint(blueprint_json(2)).empty_image(1);
        let generator = BlueprintGenerator::new(service);
        let blueprint = generator
            .generate(&reference_image(), "idea", hint(2), |_| {})
            .await
            .unwrap();
        assert!(!blueprint.script[0].is_rendered());
        assert!(blueprint.script[1].is_rendered());
    }

    #[tokio::test]
    async fn test_zero_rendered_scenes_is_still_success() {
        let service = MockService::with_blueprint(blueprint_json(2))
            .failing_image(1)
            .failing_image(2);
        let generator = BlueprintGenerator::new(service);
        let blueprint = generator
            .generate(&reference_image(), "idea", hint(2), |_| {})
            .await
            .unwrap();
        assert_eq!(blueprint.script.len(), 2);
        assert_eq!(blueprint.rendered_count(), 0);
    }

    #[tokio::test]
    async fn test_synthesis_failure_aborts_before_images() {
        let generator = BlueprintGenerator::new(MockService::default());
        let mut events = Vec::new();
        let result = generator
            .generate(&reference_image(), "idea", hint(3), |p| events.push(*p))
            .await;

        assert!(matches!(result, Err(StudioError::Api(_))));
        assert_eq!(events, vec![Progress::Analyzing]);
        assert_eq!(generator.service().image_calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_blueprint_fails() {
        let generator = BlueprintGenerator::new(MockService::with_blueprint("{\"videoTitle\":"));
        let result = generator
            .generate(&reference_image(), "idea", hint(3), |_| {})
            .await;
        assert!(matches!(result, Err(StudioError::InvalidResponse(_))));
        assert_eq!(generator.service().image_calls(), 0);
    }

    #[tokio::test]
    async fn test_large_hint_forwarded_unchanged() {
        let generator = BlueprintGenerator::new(MockService::with_blueprint(blueprint_json(1)));
        let blueprint = generator
            .generate(&reference_image(), "one word", hint(15), |_| {})
            .await
            .unwrap();

        assert_eq!(blueprint.script.len(), 1);
        let structured = generator.service().structured_log();
        assert_eq!(structured[0].prompt, "Idea: one word\nTarget scene count: 15");
    }
}
