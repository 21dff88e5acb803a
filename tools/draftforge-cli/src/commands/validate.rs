//! Validate a draft document on disk.

use std::path::PathBuf;

use draftforge_export_engine::validate_value;

pub fn run(path: PathBuf, clips: Option<usize>) -> anyhow::Result<()> {
    println!("Validating draft at: {}", path.display());

    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read draft: {e}"))?;
    let document: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse draft: {e}"))?;

    // Without an expected count, compare against the primary track itself.
    let expected = clips.unwrap_or_else(|| primary_segment_count(&document));
    let report = validate_value(&document, expected);

    for warning in &report.warnings {
        println!("  Warning: {warning}");
    }
    if report.ok {
        println!("\nDraft is valid.");
        Ok(())
    } else {
        println!("\nValidation issues:");
        for reason in &report.reasons {
            println!("  - {reason}");
        }
        anyhow::bail!("{} issue(s) found", report.reasons.len())
    }
}

fn primary_segment_count(document: &serde_json::Value) -> usize {
    document["tracks"]
        .as_array()
        .and_then(|tracks| tracks.iter().find(|t| t["type"] == "video"))
        .and_then(|track| track["segments"].as_array())
        .map_or(0, Vec::len)
}
