mod directory;

pub use directory::DirectoryExporter;

use crate::error::Result;
use crate::scene::{Blueprint, Scene};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Pause between consecutive image downloads.
pub const DOWNLOAD_DELAY: Duration = Duration::from_millis(400);

pub const BLUEPRINT_FILE_NAME: &str = "blueprint.json";

/// Host capabilities the export helpers write through.
#[async_trait]
pub trait ArtifactExporter: Send + Sync {
    async fn download_binary(&self, file_name: &str, data: &[u8]) -> Result<()>;

    async fn download_text(&self, file_name: &str, text: &str) -> Result<()>;

    async fn write_clipboard(&self, text: &str) -> Result<()>;
}

pub fn image_file_name(index: usize) -> String {
    format!("{}_RapScene.png", index)
}

/// `Full_Script_` + title with every whitespace run collapsed to `_`.
pub fn script_file_name(title: &str) -> String {
    let mut name = String::from("Full_Script_");
    let mut in_whitespace = false;
    for c in title.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                name.push('_');
            }
            in_whitespace = true;
        } else {
            name.push(c);
            in_whitespace = false;
        }
    }
    name.push_str(".txt");
    name
}

pub fn render_script(blueprint: &Blueprint) -> String {
    let mut content = format!("RAP SCRIPT AI - {}\n", blueprint.video_title);
    content.push_str(&format!("BEAT: {}\n", blueprint.beat_description));
    content.push_str(&format!("HASHTAGS: {}\n\n", blueprint.hashtags.join(" ")));
    for scene in &blueprint.script {
        content.push_str(&scene.prompt_with_lyrics());
        content.push_str("\n\n");
    }
    content
}

/// Human-readable overview of a storyboard, one line per scene.
pub fn render_summary(blueprint: &Blueprint) -> String {
    let mut out = format!("{}\n", blueprint.video_title);
    out.push_str(&format!("\"{}\"\n", blueprint.video_description));
    out.push_str(&format!(
        "{} | {} | {}\n",
        blueprint.total_duration,
        blueprint.beat_description,
        blueprint.hashtags.join(" ")
    ));
    if blueprint.dropped_scenes > 0 {
        out.push_str(&format!(
            "Storyboard cut short: kept the first {} scenes, dropped {}\n",
            blueprint.script.len(),
            blueprint.dropped_scenes
        ));
    }
    for (i, scene) in blueprint.script.iter().enumerate() {
        let status = if scene.is_rendered() { "rendered" } else { "pending" };
        out.push_str(&format!(
            "  [{}] {:<12} {:<24} {}\n",
            i + 1,
            scene.time,
            scene.setting,
            status
        ));
    }
    out
}

/// Downloads every rendered scene image in order, named by 1-based index.
/// Returns how many files were written.
pub async fn export_all_images(
    blueprint: &Blueprint,
    exporter: &dyn ArtifactExporter,
    delay: Duration,
) -> Result<usize> {
    let mut written = 0;
    for (i, scene) in blueprint.script.iter().enumerate() {
        let Some(image) = scene.image.as_ref() else {
            debug!("Scene {} has no image, skipping", i + 1);
            continue;
        };
        if written > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        exporter
            .download_binary(&image_file_name(i + 1), &image.data)
            .await?;
        written += 1;
    }
    info!("Exported {} scene images", written);
    Ok(written)
}

pub async fn export_script(blueprint: &Blueprint, exporter: &dyn ArtifactExporter) -> Result<()> {
    let file_name = script_file_name(&blueprint.video_title);
    exporter
        .download_text(&file_name, &render_script(blueprint))
        .await?;
    info!("Exported script to {}", file_name);
    Ok(())
}

pub async fn copy_scene(scene: &Scene, exporter: &dyn ArtifactExporter) -> Result<()> {
    exporter.write_clipboard(&scene.prompt_with_lyrics()).await
}

pub async fn export_blueprint_json(
    blueprint: &Blueprint,
    exporter: &dyn ArtifactExporter,
) -> Result<()> {
    let text = serde_json::to_string_pretty(blueprint)?;
    exporter.download_text(BLUEPRINT_FILE_NAME, &text).await
}
