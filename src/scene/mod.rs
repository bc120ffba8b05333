use crate::error::{Result, StudioError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::warn;

/// Upper bound on the number of scenes in a storyboard.
pub const MAX_SCENES: usize = 15;

/// One beat of the music video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Free-form time marker, e.g. "0:00-0:05"
    pub time: String,
    pub lyrics: String,
    /// Cinematic direction: framing, lighting, lens, mood
    pub visual_prompt: String,
    pub setting: String,
    /// Present only once image synthesis succeeded for this scene
    #[serde(skip)]
    pub image: Option<GeneratedImage>,
}

impl Scene {
    pub fn new(
        time: impl Into<String>,
        lyrics: impl Into<String>,
        visual_prompt: impl Into<String>,
        setting: impl Into<String>,
    ) -> Self {
        Self {
            time: time.into(),
            lyrics: lyrics.into(),
            visual_prompt: visual_prompt.into(),
            setting: setting.into(),
            image: None,
        }
    }

    pub fn is_rendered(&self) -> bool {
        self.image.is_some()
    }

    /// Visual prompt followed by the quoted lyrics.
    pub fn prompt_with_lyrics(&self) -> String {
        format!("{} \"{}\"", self.visual_prompt, self.lyrics)
    }
}

/// Complete output of one generation attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub video_title: String,
    pub video_description: String,
    pub hashtags: Vec<String>,
    pub beat_description: String,
    pub total_duration: String,
    pub script: Vec<Scene>,
    /// Scenes beyond the limit that were cut from the service's answer
    #[serde(skip)]
    pub dropped_scenes: usize,
}

impl Blueprint {
    /// Parse the structured payload returned by the content service.
    pub fn from_json(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(StudioError::invalid_response("blueprint payload is empty"));
        }
        let blueprint: Blueprint = serde_json::from_str(strip_code_fence(text)).map_err(|e| {
            StudioError::invalid_response(format!("failed to parse blueprint JSON: {}", e))
        })?;
        blueprint.validated()
    }

    fn validated(mut self) -> Result<Self> {
        if self.script.is_empty() {
            return Err(StudioError::invalid_response("blueprint contains no scenes"));
        }
        for (i, scene) in self.script.iter().enumerate() {
            if scene.lyrics.trim().is_empty() {
                return Err(StudioError::invalid_response(format!(
                    "scene {} has no lyrics",
                    i + 1
                )));
            }
            if scene.visual_prompt.trim().is_empty() {
                return Err(StudioError::invalid_response(format!(
                    "scene {} has no visual prompt",
                    i + 1
                )));
            }
        }
        if self.script.len() > MAX_SCENES {
            warn!(
                "Service returned {} scenes, keeping the first {}",
                self.script.len(),
                MAX_SCENES
            );
            self.dropped_scenes = self.script.len() - MAX_SCENES;
            self.script.truncate(MAX_SCENES);
        }
        Ok(self)
    }

    pub fn rendered_count(&self) -> usize {
        self.script.iter().filter(|s| s.is_rendered()).count()
    }
}

// Schema-constrained responses are plain JSON, but some models still wrap it.
fn strip_code_fence(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// The user-supplied photo anchoring every generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ReferenceImage {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&data).map_err(|_| {
            StudioError::invalid_input("reference file is not a recognized image")
        })?;
        Ok(Self {
            mime_type: format.to_mime_type().to_string(),
            data,
        })
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let data = tokio::fs::read(path.as_ref()).await?;
        Self::from_bytes(data)
    }
}

/// Image payload returned by the image model.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Requested scene count. Only a hint: the service picks the final count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneCountHint(u8);

impl SceneCountHint {
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for SceneCountHint {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for SceneCountHint {
    type Error = StudioError;

    fn try_from(value: u8) -> Result<Self> {
        if (1..=MAX_SCENES as u8).contains(&value) {
            Ok(Self(value))
        } else {
            Err(StudioError::invalid_input(format!(
                "scene count must be between 1 and {}, got {}",
                MAX_SCENES, value
            )))
        }
    }
}

impl fmt::Display for SceneCountHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use serde_json::json;

    pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    pub fn reference_image() -> ReferenceImage {
        let mut data = PNG_MAGIC.to_vec();
        data.extend_from_slice(&[0u8; 16]);
        ReferenceImage::from_bytes(data).expect("png magic is recognized")
    }

    pub fn blueprint_json(scenes: usize) -> String {
        let script: Vec<_> = (0..scenes)
            .map(|i| {
                json!({
                    "time": format!("0:{:02}-0:{:02}", i * 5, i * 5 + 5),
                    "lyrics": format!("Line {} rides the beat, dreams stay on repeat", i + 1),
                    "visualPrompt": format!("Cinematic close-up {}, neon rim light, anamorphic flare", i + 1),
                    "setting": "Rooftop at night",
                })
            })
            .collect();
        json!({
            "videoTitle": "A Dream Deferred",
            "videoDescription": "A slow-burn verse about waiting",
            "hashtags": ["#rap", "#dream"],
            "beatDescription": "Boom bap, 90 BPM, dusty piano",
            "totalDuration": "0:15",
            "script": script,
        })
        .to_string()
    }

    pub fn blueprint(scenes: usize) -> Blueprint {
        Blueprint::from_json(&blueprint_json(scenes)).expect("fixture parses")
    }
}
