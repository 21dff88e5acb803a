//! Tracks and segments: placement of materials in time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Track type of the primary content track.
pub const TRACK_VIDEO: &str = "video";

/// Track type of the auxiliary effect track.
pub const TRACK_EFFECT: &str = "effect";

/// Half-open time range in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: i64,
    pub duration: i64,
}

impl TimeRange {
    pub fn new(start: i64, duration: i64) -> Self {
        Self { start, duration }
    }

    /// Exclusive end, saturating at `i64::MAX`.
    pub fn end(&self) -> i64 {
        self.start.saturating_add(self.duration)
    }
}

/// 2D scale/offset pair used by clip transforms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

/// On-canvas placement of a visual segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipTransform {
    pub alpha: f64,
    pub flip: Flip,
    pub rotation: f64,
    pub scale: Vec2,
    pub transform: Vec2,
}

impl Default for ClipTransform {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            flip: Flip::default(),
            rotation: 0.0,
            scale: Vec2 { x: 1.0, y: 1.0 },
            transform: Vec2::default(),
        }
    }
}

/// Placement of one material on a track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Segment {
    pub id: String,
    pub material_id: String,
    pub target_timerange: TimeRange,
    pub source_timerange: Option<TimeRange>,
    /// Ids of the auxiliary materials applied to this segment, in order.
    #[serde(deserialize_with = "crate::draft::null_as_default")]
    pub extra_material_refs: Vec<String>,
    pub clip: Option<ClipTransform>,
    pub speed: f64,
    pub volume: f64,
    pub last_nonzero_volume: f64,
    pub visible: bool,
    pub reverse: bool,
    pub enable_adjust: bool,
    pub is_placeholder: bool,
    pub render_index: i64,
    pub track_render_index: i64,
    pub track_attribute: i64,
    pub keyframe_refs: Vec<String>,
    pub common_keyframes: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Segment {
    /// Segment of a visual clip on the primary track.
    pub fn media(
        id: String,
        material_id: String,
        target: TimeRange,
        extra_material_refs: Vec<String>,
    ) -> Self {
        Self {
            id,
            material_id,
            target_timerange: target,
            source_timerange: Some(TimeRange::new(0, target.duration)),
            extra_material_refs,
            clip: Some(ClipTransform::default()),
            speed: 1.0,
            volume: 1.0,
            last_nonzero_volume: 1.0,
            visible: true,
            reverse: false,
            enable_adjust: true,
            is_placeholder: false,
            render_index: 0,
            track_render_index: 0,
            track_attribute: 0,
            keyframe_refs: vec![],
            common_keyframes: vec![],
            extra: Map::new(),
        }
    }

    /// Segment of an effect on the effect track.
    pub fn effect(id: String, material_id: String, target: TimeRange, render_index: i64) -> Self {
        Self {
            id,
            material_id,
            target_timerange: target,
            source_timerange: None,
            extra_material_refs: vec![],
            clip: None,
            speed: 1.0,
            volume: 1.0,
            last_nonzero_volume: 1.0,
            visible: true,
            reverse: false,
            enable_adjust: false,
            is_placeholder: false,
            render_index,
            track_render_index: 0,
            track_attribute: 0,
            keyframe_refs: vec![],
            common_keyframes: vec![],
            extra: Map::new(),
        }
    }
}

/// Ordered channel of segments of one kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Track {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub attribute: i64,
    pub flag: i64,
    pub is_default_name: bool,
    pub name: String,
    #[serde(deserialize_with = "crate::draft::null_as_default")]
    pub segments: Vec<Segment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Track {
    pub fn new(id: String, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            attribute: 0,
            flag: 0,
            is_default_name: true,
            name: String::new(),
            segments: vec![],
            extra: Map::new(),
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind == TRACK_VIDEO
    }

    /// Sum of segment durations, saturating at `i64::MAX`.
    pub fn duration(&self) -> i64 {
        self.segments.iter().fold(0i64, |acc, segment| {
            acc.saturating_add(segment.target_timerange.duration)
        })
    }
}
