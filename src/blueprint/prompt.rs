//! Prompt and schema composition for the two generation phases.

use crate::scene::{Scene, SceneCountHint, MAX_SCENES};
use serde_json::{json, Value};

pub const ASPECT_RATIO: &str = "9:16";

const IMAGE_STYLE: &str = "9:16 Portrait orientation, cinematic music video style, \
professional color grading, hyper-realistic, 8k, bokeh, anamorphic lens. No text. \
Subject looks like the person in the reference photo.";

pub fn system_instruction(hint: SceneCountHint) -> String {
    format!(
        r#"You are a legendary rap producer and film director.
Task: analyze the user's idea and build a professional rap storyboard for a 9:16 vertical music video.

RULES:
1. SCENE BALANCE: The user asked for about {hint} scenes, but you decide the final count, anywhere from 1 to {max}, so the story is told completely and the lyrics never feel rushed. A long, deep idea deserves more scenes. A short idea deserves fewer, denser scenes.
2. LYRICS: Write lyrics with soul. Use metaphor, end rhyme and internal rhyme, and a professional flow. Each scene carries roughly 2-4 lines so it lands with emotional weight.
3. VISUAL PROMPT: Every scene gets an extremely detailed cinematic prompt, e.g. "Cinematic close-up, low key lighting, neon rim light, heavy rain, anamorphic lens flares, 8k resolution...". Describe camera framing, lighting, lens characteristics and the character's emotion.
4. OVERALL: The result must read as a professional piece of cinematic art.

Output strictly valid JSON."#,
        hint = hint,
        max = MAX_SCENES
    )
}

pub fn user_prompt(idea: &str, hint: SceneCountHint) -> String {
    format!("Idea: {}\nTarget scene count: {}", idea, hint)
}

pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "videoTitle": { "type": "STRING" },
            "videoDescription": { "type": "STRING" },
            "hashtags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "beatDescription": { "type": "STRING" },
            "totalDuration": { "type": "STRING" },
            "script": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "time": { "type": "STRING" },
                        "lyrics": { "type": "STRING" },
                        "visualPrompt": { "type": "STRING" },
                        "setting": { "type": "STRING" }
                    },
                    "required": ["time", "lyrics", "visualPrompt", "setting"]
                }
            }
        },
        "required": [
            "videoTitle",
            "videoDescription",
            "hashtags",
            "beatDescription",
            "totalDuration",
            "script"
        ]
    })
}

pub fn scene_image_prompt(scene: &Scene) -> String {
    format!("{}. {}", scene.visual_prompt.trim_end_matches('.'), IMAGE_STYLE)
}
