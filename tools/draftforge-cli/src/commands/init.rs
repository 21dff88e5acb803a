//! Build a timeline file from media paths.

use std::path::PathBuf;

use draftforge_common::{AppConfig, MICROS_PER_SEC};
use draftforge_project_model::Timeline;

pub fn run(
    config: &AppConfig,
    media: Vec<PathBuf>,
    output: PathBuf,
    image_secs: Option<f64>,
    video_secs: Option<f64>,
) -> anyhow::Result<()> {
    let to_micros = |secs: f64| (secs * MICROS_PER_SEC as f64).round() as i64;
    let image_micros = image_secs.map_or(config.export.image_duration_micros, to_micros);
    let video_micros = video_secs.map_or(config.export.video_duration_micros, to_micros);
    if image_micros <= 0 || video_micros <= 0 {
        anyhow::bail!("clip durations must be positive");
    }

    let (timeline, skipped) = Timeline::from_media_paths(&media, image_micros, video_micros);
    for path in &skipped {
        println!("  Skipped (unknown media type): {}", path.display());
    }
    if timeline.is_empty() {
        anyhow::bail!("no usable media files given");
    }

    timeline
        .save(&output)
        .map_err(|e| anyhow::anyhow!("Failed to write timeline: {e}"))?;

    println!("Timeline written to {}", output.display());
    println!("  Clips: {}", timeline.len());
    println!(
        "  Duration: {:.2}s",
        timeline.total_duration() as f64 / MICROS_PER_SEC as f64
    );
    println!();
    println!("Edit effectName / transitionName / animations per clip, then run:");
    println!("  draftforge export {}", output.display());

    Ok(())
}
