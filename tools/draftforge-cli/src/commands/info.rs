//! Summarize a draft document.

use std::path::PathBuf;

use draftforge_common::MICROS_PER_SEC;
use draftforge_project_model::{DraftDocument, TRACK_EFFECT};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read draft: {e}"))?;
    let doc: DraftDocument = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse draft: {e}"))?;

    println!("Draft: {}", doc.name);
    println!("  ID: {}", doc.id);
    println!("  Version: {} ({})", doc.new_version, doc.version);
    println!(
        "  Duration: {:.2}s",
        doc.duration as f64 / MICROS_PER_SEC as f64
    );
    println!(
        "  Canvas: {}x{} @ {}fps",
        doc.canvas_config.width, doc.canvas_config.height, doc.fps
    );
    println!(
        "  App: {} {} on {}",
        doc.platform.app_source, doc.platform.app_version, doc.platform.os
    );
    println!();

    let m = &doc.materials;
    println!("Materials:");
    println!("  Media: {}", m.videos.len());
    println!("  Canvases: {}", m.canvases.len());
    println!("  Effects: {}", m.video_effects.len());
    println!("  Transitions: {}", m.transitions.len());
    println!("  Animations: {}", m.material_animations.len());
    println!(
        "  Support records: {} speeds, {} placeholders, {} sound mappings, {} vocal separations",
        m.speeds.len(),
        m.placeholder_infos.len(),
        m.sound_channel_mappings.len(),
        m.vocal_separations.len()
    );
    println!();

    println!("Tracks:");
    for track in &doc.tracks {
        println!("  {} ({} segments)", track.kind, track.segments.len());
    }
    if let Some(primary) = doc.primary_track() {
        println!();
        println!("Clips:");
        for (index, segment) in primary.segments.iter().enumerate() {
            let media = m
                .videos
                .iter()
                .find(|v| v.id == segment.material_id)
                .map_or("<missing>", |v| v.path.as_str());
            let range = segment.target_timerange;
            println!(
                "  {index}: {media} [{:.2}s - {:.2}s]",
                range.start as f64 / MICROS_PER_SEC as f64,
                range.end() as f64 / MICROS_PER_SEC as f64
            );
        }
    }

    let dangling = doc.dangling_references();
    if !dangling.is_empty() {
        println!();
        println!("Dangling references: {}", dangling.len());
    }
    if doc.tracks_of(TRACK_EFFECT).count() > 1 {
        println!("Note: more than one effect track");
    }

    Ok(())
}
