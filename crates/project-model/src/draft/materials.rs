//! Material records: the draft's lookup table of assets and attributes.
//!
//! Every record carries an `id` that segments reference. Records parsed
//! from templates keep fields this crate does not model in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::track::TimeRange;
use crate::catalog::AdjustParam;
use crate::timeline::MediaKind;

/// Default pixel size recorded for media whose dimensions are unknown.
pub const DEFAULT_MEDIA_WIDTH: u32 = 1280;
pub const DEFAULT_MEDIA_HEIGHT: u32 = 720;

/// Render index the editor assigns to effect-track segments.
pub const EFFECT_RENDER_INDEX: i64 = 11_000;

/// Collections the editor expects besides the ones synthesized here.
pub const AUXILIARY_COLLECTIONS: &[&str] = &[
    "audio_balances",
    "audio_effects",
    "audio_fades",
    "audios",
    "beats",
    "chromas",
    "color_curves",
    "digital_humans",
    "drafts",
    "effects",
    "flowers",
    "green_screens",
    "handwrites",
    "hsl",
    "images",
    "log_color_wheels",
    "loudnesses",
    "manual_deformations",
    "masks",
    "material_colors",
    "plugin_effects",
    "primary_color_wheels",
    "realtime_denoises",
    "shapes",
    "smart_crops",
    "stickers",
    "tail_leaders",
    "text_templates",
    "texts",
    "video_trackings",
    "vocal_beautifys",
];

/// The draft's `materials` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Materials {
    #[serde(deserialize_with = "crate::draft::null_as_default")]
    pub videos: Vec<VideoMaterial>,
    #[serde(deserialize_with = "crate::draft::null_as_default")]
    pub canvases: Vec<CanvasMaterial>,
    #[serde(deserialize_with = "crate::draft::null_as_default")]
    pub speeds: Vec<SpeedMaterial>,
    #[serde(deserialize_with = "crate::draft::null_as_default")]
    pub placeholder_infos: Vec<PlaceholderInfo>,
    #[serde(deserialize_with = "crate::draft::null_as_default")]
    pub sound_channel_mappings: Vec<SoundChannelMapping>,
    #[serde(deserialize_with = "crate::draft::null_as_default")]
    pub vocal_separations: Vec<VocalSeparation>,
    #[serde(deserialize_with = "crate::draft::null_as_default")]
    pub video_effects: Vec<VideoEffectMaterial>,
    #[serde(deserialize_with = "crate::draft::null_as_default")]
    pub transitions: Vec<TransitionMaterial>,
    #[serde(deserialize_with = "crate::draft::null_as_default")]
    pub material_animations: Vec<MaterialAnimation>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Materials {
    /// Make sure every auxiliary collection exists as an array.
    pub fn ensure_collections(&mut self) {
        for name in AUXILIARY_COLLECTIONS {
            let slot = self
                .extra
                .entry(name.to_string())
                .or_insert_with(|| Value::Array(vec![]));
            if !slot.is_array() {
                *slot = Value::Array(vec![]);
            }
        }
    }

    /// Every material id in the table, typed and auxiliary collections alike.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = vec![];
        ids.extend(self.videos.iter().map(|m| m.id.as_str()));
        ids.extend(self.canvases.iter().map(|m| m.id.as_str()));
        ids.extend(self.speeds.iter().map(|m| m.id.as_str()));
        ids.extend(self.placeholder_infos.iter().map(|m| m.id.as_str()));
        ids.extend(self.sound_channel_mappings.iter().map(|m| m.id.as_str()));
        ids.extend(self.vocal_separations.iter().map(|m| m.id.as_str()));
        ids.extend(self.video_effects.iter().map(|m| m.id.as_str()));
        ids.extend(self.transitions.iter().map(|m| m.id.as_str()));
        ids.extend(self.material_animations.iter().map(|m| m.id.as_str()));
        for value in self.extra.values() {
            if let Some(items) = value.as_array() {
                ids.extend(
                    items
                        .iter()
                        .filter_map(|item| item.get("id").and_then(Value::as_str)),
                );
            }
        }
        ids
    }

    /// Total number of records across all collections.
    pub fn len(&self) -> usize {
        self.ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Normalized crop quad; the default covers the whole frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Crop {
    pub lower_left_x: f64,
    pub lower_left_y: f64,
    pub lower_right_x: f64,
    pub lower_right_y: f64,
    pub upper_left_x: f64,
    pub upper_left_y: f64,
    pub upper_right_x: f64,
    pub upper_right_y: f64,
}

impl Default for Crop {
    fn default() -> Self {
        Self {
            lower_left_x: 0.0,
            lower_left_y: 1.0,
            lower_right_x: 1.0,
            lower_right_y: 1.0,
            upper_left_x: 0.0,
            upper_left_y: 0.0,
            upper_right_x: 1.0,
            upper_right_y: 0.0,
        }
    }
}

/// An image or video asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoMaterial {
    pub id: String,
    /// `photo` or `video`.
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
    pub material_name: String,
    pub duration: i64,
    pub width: u32,
    pub height: u32,
    pub has_audio: bool,
    pub category_name: String,
    pub crop: Crop,
    pub crop_ratio: String,
    pub crop_scale: f64,
    pub local_material_id: String,
    pub source_platform: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VideoMaterial {
    /// Asset record for a local file. `path` is already boundary-formatted.
    pub fn local(id: String, path: String, kind: MediaKind, duration: i64) -> Self {
        let material_name = path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            id,
            kind: kind.material_type().to_string(),
            path,
            material_name,
            duration,
            width: DEFAULT_MEDIA_WIDTH,
            height: DEFAULT_MEDIA_HEIGHT,
            has_audio: kind == MediaKind::Video,
            category_name: "local".to_string(),
            crop: Crop::default(),
            crop_ratio: "free".to_string(),
            crop_scale: 1.0,
            local_material_id: String::new(),
            source_platform: 0,
            extra: Map::new(),
        }
    }
}

/// Background shared by all clips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasMaterial {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub color: String,
    pub blur: f64,
    pub image: String,
    pub album_image: String,
    pub image_id: String,
    pub image_name: String,
    pub source_platform: i64,
    pub team_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CanvasMaterial {
    pub fn solid(id: String) -> Self {
        Self {
            id,
            kind: "canvas_color".to_string(),
            ..Self::default()
        }
    }
}

/// Playback speed control.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedMaterial {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub mode: i64,
    pub speed: f64,
    pub curve_speed: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SpeedMaterial {
    /// Constant 1.0× speed without a curve.
    pub fn normal(id: String) -> Self {
        Self {
            id,
            kind: "speed".to_string(),
            mode: 0,
            speed: 1.0,
            curve_speed: None,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub meta_type: String,
    pub error_path: String,
    pub error_text: String,
    pub res_path: String,
    pub res_text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlaceholderInfo {
    pub fn empty(id: String) -> Self {
        Self {
            id,
            kind: "placeholder_info".to_string(),
            meta_type: "none".to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundChannelMapping {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub audio_channel_mapping: i64,
    pub is_config_open: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SoundChannelMapping {
    pub fn disabled(id: String) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocalSeparation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub choice: i64,
    pub production_path: String,
    pub removed_sounds: Vec<Value>,
    pub time_range: Option<TimeRange>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VocalSeparation {
    pub fn disabled(id: String) -> Self {
        Self {
            id,
            kind: "vocal_separation".to_string(),
            ..Self::default()
        }
    }
}

/// A visual effect applied over a time range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoEffectMaterial {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub effect_id: String,
    pub resource_id: String,
    pub category_id: String,
    pub category_name: String,
    pub adjust_params: Vec<AdjustParam>,
    pub apply_target_type: i64,
    pub platform: String,
    pub render_index: i64,
    pub value: f64,
    pub version: String,
    pub time_range: Option<TimeRange>,
    pub common_keyframes: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VideoEffectMaterial {
    pub fn new(
        id: String,
        name: impl Into<String>,
        resource_id: impl Into<String>,
        category: impl Into<String>,
        adjust_params: Vec<AdjustParam>,
    ) -> Self {
        let resource_id = resource_id.into();
        Self {
            id,
            kind: "video_effect".to_string(),
            name: name.into(),
            effect_id: resource_id.clone(),
            resource_id,
            category_id: String::new(),
            category_name: category.into(),
            adjust_params,
            apply_target_type: 0,
            platform: "all".to_string(),
            render_index: EFFECT_RENDER_INDEX,
            value: 1.0,
            version: String::new(),
            time_range: None,
            common_keyframes: vec![],
            extra: Map::new(),
        }
    }
}

/// A transition between a clip and its successor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionMaterial {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub effect_id: String,
    pub resource_id: String,
    pub category_id: String,
    pub category_name: String,
    pub duration: i64,
    pub is_overlap: bool,
    pub platform: String,
    pub path: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransitionMaterial {
    pub fn new(
        id: String,
        name: impl Into<String>,
        resource_id: impl Into<String>,
        category: impl Into<String>,
        duration: i64,
        is_overlap: bool,
    ) -> Self {
        let resource_id = resource_id.into();
        Self {
            id,
            kind: "transition".to_string(),
            name: name.into(),
            effect_id: resource_id.clone(),
            resource_id,
            category_id: String::new(),
            category_name: category.into(),
            duration,
            is_overlap,
            platform: "all".to_string(),
            path: String::new(),
            extra: Map::new(),
        }
    }
}

/// One animation inside a [`MaterialAnimation`] bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationEntry {
    pub id: String,
    /// Slot: `in`, `out`, or `group`.
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub resource_id: String,
    pub category_id: String,
    pub category_name: String,
    pub material_type: String,
    pub panel: String,
    pub platform: String,
    pub path: String,
    /// Offset from the segment start.
    pub start: i64,
    pub duration: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Bundle of a segment's in/out/group animations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialAnimation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub animations: Vec<AnimationEntry>,
    pub multi_language_current: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MaterialAnimation {
    pub fn new(id: String, animations: Vec<AnimationEntry>) -> Self {
        Self {
            id,
            kind: "sticker_animation".to_string(),
            animations,
            multi_language_current: "none".to_string(),
            extra: Map::new(),
        }
    }
}
