//! The draft document consumed by the external editor.
//!
//! The document is modeled as typed structs for every part the exporter
//! writes. Anything else a template carries is kept verbatim in the
//! `extra` maps, so cloning a template and serializing it again is
//! lossless.

pub mod materials;
pub mod track;

use std::collections::HashSet;

use draftforge_common::SchemaTarget;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::ids::IdGenerator;

pub use materials::*;
pub use track::*;

/// Deserialize an explicit `null` as the type's default.
///
/// Templates in the wild write `null` for empty collections.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Version fields written for a schema target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaProfile {
    pub version: i64,
    pub new_version: &'static str,
    pub app_id: i64,
    pub app_source: &'static str,
    pub app_version: &'static str,
}

impl SchemaProfile {
    pub fn for_target(target: SchemaTarget) -> Self {
        match target {
            SchemaTarget::Modern => Self {
                version: 360_000,
                new_version: "110.0.0",
                app_id: 3704,
                app_source: "lv",
                app_version: "5.9.0",
            },
            SchemaTarget::Legacy => Self {
                version: 360_000,
                new_version: "75.0.0",
                app_id: 3704,
                app_source: "lv",
                app_version: "3.9.0",
            },
        }
    }
}

/// Canvas size and aspect ratio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub ratio: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            ratio: "original".to_string(),
        }
    }
}

/// Platform block describing the app that wrote the draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformInfo {
    pub app_id: i64,
    pub app_source: String,
    pub app_version: String,
    pub device_id: String,
    pub hard_disk_id: String,
    pub mac_address: String,
    pub os: String,
    pub os_version: String,
}

impl PlatformInfo {
    /// Fresh platform block for one export.
    pub fn fresh(ids: &mut IdGenerator, profile: &SchemaProfile) -> Self {
        Self {
            app_id: profile.app_id,
            app_source: profile.app_source.to_string(),
            app_version: profile.app_version.to_string(),
            device_id: compact_hex(&ids.new_id()),
            hard_disk_id: compact_hex(&ids.new_id()),
            mac_address: compact_hex(&ids.new_id()),
            os: host_os().to_string(),
            os_version: String::new(),
        }
    }
}

fn compact_hex(id: &str) -> String {
    id.replace('-', "").to_ascii_lowercase()
}

fn host_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "mac",
        "windows" => "windows",
        other => other,
    }
}

const KEYFRAME_COLLECTIONS: &[&str] = &[
    "adjusts",
    "audios",
    "effects",
    "filters",
    "handwrites",
    "stickers",
    "texts",
    "videos",
];

/// Root of `draft_content.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftDocument {
    pub id: String,
    pub name: String,
    pub version: i64,
    pub new_version: String,
    /// Aggregate duration in microseconds.
    pub duration: i64,
    pub fps: f64,
    pub canvas_config: CanvasConfig,
    pub create_time: i64,
    pub update_time: i64,
    pub platform: PlatformInfo,
    pub last_modified_platform: PlatformInfo,
    #[serde(deserialize_with = "crate::draft::null_as_default")]
    pub materials: Materials,
    #[serde(deserialize_with = "crate::draft::null_as_default")]
    pub tracks: Vec<Track>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DraftDocument {
    /// Single normalization pass: every collection the editor requires exists.
    pub fn normalize(&mut self) {
        self.materials.ensure_collections();

        let keyframes = self
            .extra
            .entry("keyframes".to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !keyframes.is_object() {
            *keyframes = Value::Object(Map::new());
        }
        if let Some(map) = keyframes.as_object_mut() {
            for kind in KEYFRAME_COLLECTIONS {
                map.entry(kind.to_string())
                    .or_insert_with(|| Value::Array(vec![]));
            }
        }

        self.extra
            .entry("relationships".to_string())
            .or_insert_with(|| Value::Array(vec![]));
    }

    /// The first `video` track.
    pub fn primary_track(&self) -> Option<&Track> {
        self.tracks.iter().find(|track| track.is_video())
    }

    pub fn tracks_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Track> + 'a {
        self.tracks.iter().filter(move |track| track.kind == kind)
    }

    /// Set of every material id.
    pub fn material_ids(&self) -> HashSet<&str> {
        self.materials.ids().into_iter().collect()
    }

    /// Material/extra references that do not resolve to a material id.
    pub fn dangling_references(&self) -> Vec<String> {
        let ids = self.material_ids();
        let mut dangling = vec![];
        for track in &self.tracks {
            for segment in &track.segments {
                let refs = std::iter::once(&segment.material_id)
                    .chain(segment.extra_material_refs.iter());
                for reference in refs {
                    if !ids.contains(reference.as_str()) {
                        dangling.push(reference.clone());
                    }
                }
            }
        }
        dangling
    }
}

/// Companion `draft_meta_info.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftMetaInfo {
    pub draft_id: String,
    pub draft_name: String,
    pub draft_fold_path: String,
    pub draft_root_path: String,
    pub tm_draft_create: i64,
    pub tm_draft_modified: i64,
    pub tm_duration: i64,
    pub draft_materials_copied: bool,
}

impl DraftMetaInfo {
    /// Metadata describing `document` stored in `fold_path`.
    pub fn describe(document: &DraftDocument, fold_path: &str, root_path: &str) -> Self {
        Self {
            draft_id: document.id.clone(),
            draft_name: document.name.clone(),
            draft_fold_path: fold_path.to_string(),
            draft_root_path: root_path.to_string(),
            tm_draft_create: document.create_time,
            tm_draft_modified: document.update_time,
            tm_duration: document.duration,
            draft_materials_copied: false,
        }
    }
}
