//! Structural validation of a synthesized (or on-disk) draft.
//!
//! Checks run in a fixed order and stop at the first structural failure.
//! A segment/clip count mismatch is only a warning: templates may carry
//! extra pre-populated segments.

use std::collections::HashSet;

use draftforge_common::{DraftError, DraftResult};
use draftforge_project_model::{DraftDocument, TRACK_VIDEO};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Outcome of [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub ok: bool,
    /// Failures; empty when `ok`.
    pub reasons: Vec<String>,
    /// Non-fatal findings.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn fail(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reasons: vec![reason.into()],
            warnings: vec![],
        }
    }

    /// Convert a failed report into [`DraftError::Validation`].
    pub fn into_result(self) -> DraftResult<Self> {
        if self.ok {
            Ok(self)
        } else {
            Err(DraftError::validation(self.reasons))
        }
    }
}

/// Validate a typed document against the expected clip count.
pub fn validate(document: &DraftDocument, expected_clips: usize) -> ValidationReport {
    match serde_json::to_value(document) {
        Ok(value) => validate_value(&value, expected_clips),
        Err(e) => ValidationReport::fail(format!("document is not serializable: {e}")),
    }
}

/// Validate a raw JSON draft, e.g. a `draft_content.json` read from disk.
pub fn validate_value(document: &Value, expected_clips: usize) -> ValidationReport {
    let Some(materials) = document.get("materials").and_then(Value::as_object) else {
        return ValidationReport::fail("materials collection is missing");
    };

    let tracks = match document.get("tracks").and_then(Value::as_array) {
        Some(tracks) if !tracks.is_empty() => tracks,
        _ => return ValidationReport::fail("document has no tracks"),
    };

    let Some(primary) = tracks
        .iter()
        .find(|track| track.get("type").and_then(Value::as_str) == Some(TRACK_VIDEO))
    else {
        return ValidationReport::fail("no primary video track");
    };

    let segments = match primary.get("segments").and_then(Value::as_array) {
        Some(segments) if !segments.is_empty() => segments,
        _ => return ValidationReport::fail("primary track has no segments"),
    };

    for (track_index, track) in tracks.iter().enumerate() {
        let Some(segments) = track.get("segments").and_then(Value::as_array) else {
            continue;
        };
        let kind = track.get("type").and_then(Value::as_str).unwrap_or("untyped");
        for (index, segment) in segments.iter().enumerate() {
            if let Some(reason) = check_segment(segment) {
                return ValidationReport::fail(format!(
                    "{kind} track {track_index} segment {index}: {reason}"
                ));
            }
        }
    }

    let ids: HashSet<&str> = materials
        .values()
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(|record| record.get("id").and_then(Value::as_str))
        .collect();

    let mut reasons = vec![];
    for track in tracks {
        let segments = track
            .get("segments")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for segment in segments {
            for reference in segment_refs(segment) {
                if !ids.contains(reference) {
                    reasons.push(format!("dangling material reference {reference}"));
                }
            }
        }
    }

    let mut warnings = vec![];
    if segments.len() != expected_clips {
        warn!(
            segments = segments.len(),
            expected = expected_clips,
            "Primary segment count differs from clip count"
        );
        warnings.push(format!(
            "primary track has {} segments, expected {expected_clips}",
            segments.len()
        ));
    }

    debug!(
        ok = reasons.is_empty(),
        reasons = reasons.len(),
        warnings = warnings.len(),
        "Validated draft"
    );
    ValidationReport {
        ok: reasons.is_empty(),
        reasons,
        warnings,
    }
}

fn check_segment(segment: &Value) -> Option<&'static str> {
    let non_empty = |key: &str| {
        segment
            .get(key)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty())
    };
    if !non_empty("id") {
        return Some("missing id");
    }
    if !non_empty("material_id") {
        return Some("missing material reference");
    }
    if !segment
        .get("target_timerange")
        .is_some_and(Value::is_object)
    {
        return Some("missing target range");
    }
    None
}

fn segment_refs(segment: &Value) -> impl Iterator<Item = &str> {
    let material = segment.get("material_id").and_then(Value::as_str);
    let extra = segment
        .get("extra_material_refs")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str);
    material.into_iter().chain(extra)
}
