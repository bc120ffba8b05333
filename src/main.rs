use anyhow::Context;
use clap::Parser;
use rap_script::api::{self, GeminiClient, GeminiConfig};
use rap_script::blueprint::BlueprintGenerator;
use rap_script::export::{self, ArtifactExporter, DirectoryExporter};
use rap_script::scene::{Blueprint, ReferenceImage, SceneCountHint};
use rap_script::studio::Studio;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rap-script")]
#[command(about = "Turn a photo and an idea into a rap music video storyboard", long_about = None)]
struct Args {
    /// Reference photo of the artist
    #[arg(short, long)]
    image: PathBuf,

    /// The idea, story or punchline to build the track around
    #[arg(short = 't', long, conflicts_with = "idea_file")]
    idea: Option<String>,

    /// Read the idea from a text file
    #[arg(short = 'f', long)]
    idea_file: Option<PathBuf>,

    /// Requested number of scenes (the model may choose differently)
    #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=15))]
    scenes: u8,

    /// Directory receiving scene images and the script
    #[arg(short, long, default_value = "./output")]
    out_dir: PathBuf,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model producing the structured blueprint
    #[arg(long, default_value = "gemini-3-pro-preview")]
    text_model: String,

    /// Model rendering scene images
    #[arg(long, default_value = "gemini-2.5-flash-image")]
    image_model: String,

    /// Base URL of the Gemini API
    #[arg(long, default_value = api::GEMINI_API_BASE)]
    api_base: String,

    /// Pause between image downloads, in milliseconds
    #[arg(long, default_value_t = export::DOWNLOAD_DELAY.as_millis() as u64)]
    download_delay_ms: u64,

    /// Print scene N (1-based) as "prompt \"lyrics\"" for pasting elsewhere
    #[arg(long)]
    copy_scene: Option<usize>,

    /// Also write the blueprint as JSON
    #[arg(long)]
    save_blueprint: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .init();

    dotenvy::dotenv().ok();

    let args = Args::parse();

    let Some(api_key) = args.api_key.clone().or_else(|| std::env::var("API_KEY").ok()) else {
        eprintln!("Error: GEMINI_API_KEY not found. Please set it via --api-key or the GEMINI_API_KEY environment variable");
        std::process::exit(1);
    };

    let idea = if let Some(text) = args.idea.clone() {
        text
    } else if let Some(path) = &args.idea_file {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read idea file: {}", path.display()))?
    } else {
        String::new()
    };

    let image = ReferenceImage::from_path(&args.image)
        .await
        .with_context(|| format!("Failed to load reference image: {}", args.image.display()))?;
    let hint = SceneCountHint::try_from(args.scenes)?;

    let client = GeminiClient::new(GeminiConfig {
        api_key,
        api_base: args.api_base.clone(),
        text_model: args.text_model.clone(),
        image_model: args.image_model.clone(),
        ..Default::default()
    })?;
    let mut studio = Studio::new(BlueprintGenerator::new(client));

    info!("Starting rap storyboard generation...");
    info!("Idea length: {} characters, scene hint: {}", idea.len(), hint);

    let state = studio.start_generation(Some(image), idea, hint).await;
    if let Some(message) = &state.error {
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
    let Some(blueprint) = studio.result() else {
        anyhow::bail!("generation finished without a result");
    };

    print_summary(blueprint);

    let exporter = DirectoryExporter::new(&args.out_dir);
    export_artifacts(blueprint, &exporter, &args).await?;

    info!("Storyboard ready in {}", args.out_dir.display());
    Ok(())
}

async fn export_artifacts(
    blueprint: &Blueprint,
    exporter: &dyn ArtifactExporter,
    args: &Args,
) -> anyhow::Result<()> {
    let delay = Duration::from_millis(args.download_delay_ms);
    export::export_all_images(blueprint, exporter, delay)
        .await
        .context("Failed to export scene images")?;
    export::export_script(blueprint, exporter)
        .await
        .context("Failed to export script")?;
    if args.save_blueprint {
        export::export_blueprint_json(blueprint, exporter)
            .await
            .context("Failed to export blueprint JSON")?;
    }

    if let Some(n) = args.copy_scene {
        match n.checked_sub(1).and_then(|i| blueprint.script.get(i)) {
            Some(scene) => export::copy_scene(scene, exporter).await?,
            None => warn!(
                "Scene {} does not exist, storyboard has {} scenes",
                n,
                blueprint.script.len()
            ),
        }
    }
    Ok(())
}

fn print_summary(blueprint: &Blueprint) {
    print!("{}", export::render_summary(blueprint));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_delay_defaults_to_export_constant() {
        let args = Args::try_parse_from(["rap-script", "--image", "face.jpg", "--idea", "rain"]).unwrap();
        assert_eq!(
            Duration::from_millis(args.download_delay_ms),
            export::DOWNLOAD_DELAY
        );
        assert_eq!(args.scenes, 3);
    }

    #[test]
    fn test_scene_hint_range_enforced_by_cli() {
        assert!(Args::try_parse_from(["rap-script", "--image", "face.jpg", "--scenes", "16"]).is_err());
        let args = Args::try_parse_from(["rap-script", "--image", "face.jpg", "--scenes", "15"]).unwrap();
        assert_eq!(args.scenes, 15);
    }
}
