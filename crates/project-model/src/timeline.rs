//! In-memory timeline: the ordered clips a draft is built from.
//!
//! The timeline only sequences clips and aggregates their durations.
//! Effect, transition, and animation names are resolved at export time.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Stable identifier of a clip within a timeline session.
pub type ClipId = u64;

/// Effect selection that means "no effect".
pub const NO_EFFECT: &str = "None";

/// Transition selection that means "hard cut".
pub const NO_TRANSITION: &str = "Cut";

/// Animation selection that means "no animation".
pub const NO_ANIMATION: &str = "None";

/// Kind of source media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Guess the media kind from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "bmp" | "gif" | "webp" | "tif" | "tiff" | "heic" => {
                Some(Self::Image)
            }
            "mp4" | "mov" | "mkv" | "avi" | "webm" | "m4v" | "flv" | "wmv" | "mpg" | "mpeg" => {
                Some(Self::Video)
            }
            _ => None,
        }
    }

    /// Value of the `type` field on the matching draft material.
    pub fn material_type(self) -> &'static str {
        match self {
            Self::Image => "photo",
            Self::Video => "video",
        }
    }
}

/// Entry/exit/combined animation selections of one clip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipAnimations {
    /// Entry animation.
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,

    /// Exit animation.
    #[serde(rename = "out", skip_serializing_if = "Option::is_none")]
    pub exit: Option<String>,

    /// Combined (whole-clip) animation.
    #[serde(rename = "group", skip_serializing_if = "Option::is_none")]
    pub combo: Option<String>,
}

impl ClipAnimations {
    /// Selected animations in slot order (`in`, `out`, `group`), no-ops removed.
    pub fn selected(&self) -> Vec<(AnimationSlot, &str)> {
        [
            (AnimationSlot::In, &self.entry),
            (AnimationSlot::Out, &self.exit),
            (AnimationSlot::Group, &self.combo),
        ]
        .into_iter()
        .filter_map(|(slot, name)| selection(name.as_deref(), NO_ANIMATION).map(|n| (slot, n)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.selected().is_empty()
    }
}

/// Slot an animation occupies on its clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationSlot {
    In,
    Out,
    Group,
}

impl AnimationSlot {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::Group => "group",
        }
    }
}

/// One media item placed on the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipEntry {
    #[serde(default)]
    pub id: ClipId,

    /// Path to the source asset.
    pub media_path: PathBuf,

    pub media_kind: MediaKind,

    /// On-screen duration in microseconds. Must be positive.
    pub duration_micros: i64,

    /// Selected effect name; `None`/"None" means no effect.
    #[serde(default, alias = "effectName", skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,

    /// Explicit effect duration replacing the clip duration on the effect track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_duration_micros: Option<i64>,

    /// Transition into the next clip; `None`/"Cut" means a hard cut.
    #[serde(
        default,
        alias = "transitionName",
        skip_serializing_if = "Option::is_none"
    )]
    pub transition_to_next: Option<String>,

    #[serde(default)]
    pub animations: ClipAnimations,
}

impl ClipEntry {
    /// Create a clip with no effect, transition, or animation.
    pub fn new(media_path: impl Into<PathBuf>, media_kind: MediaKind, duration_micros: i64) -> Self {
        Self {
            id: 0,
            media_path: media_path.into(),
            media_kind,
            duration_micros,
            effect: None,
            effect_duration_micros: None,
            transition_to_next: None,
            animations: ClipAnimations::default(),
        }
    }

    pub fn with_effect(mut self, name: impl Into<String>) -> Self {
        self.effect = Some(name.into());
        self
    }

    pub fn with_transition(mut self, name: impl Into<String>) -> Self {
        self.transition_to_next = Some(name.into());
        self
    }

    pub fn with_animations(mut self, animations: ClipAnimations) -> Self {
        self.animations = animations;
        self
    }

    /// Effect name, unless no effect is selected.
    pub fn selected_effect(&self) -> Option<&str> {
        selection(self.effect.as_deref(), NO_EFFECT)
    }

    /// Transition name, unless a hard cut is selected.
    pub fn selected_transition(&self) -> Option<&str> {
        selection(self.transition_to_next.as_deref(), NO_TRANSITION)
    }
}

/// Returns the trimmed selection unless it is empty or the no-op name.
fn selection<'a>(name: Option<&'a str>, no_op: &str) -> Option<&'a str> {
    let name = name?.trim();
    if name.is_empty() || name.eq_ignore_ascii_case(no_op) {
        None
    } else {
        Some(name)
    }
}

/// Ordered sequence of clips.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    /// Schema version of the timeline file.
    #[serde(default = "default_timeline_version")]
    pub version: String,

    pub clips: Vec<ClipEntry>,
}

fn default_timeline_version() -> String {
    "1.0".to_string()
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            version: default_timeline_version(),
            clips: Vec::new(),
        }
    }

    /// Build a timeline from clips, keeping their order and ids.
    pub fn from_clips(clips: Vec<ClipEntry>) -> Self {
        Self {
            version: default_timeline_version(),
            clips,
        }
    }

    /// Build a timeline from media files, one clip per file.
    ///
    /// Files with unrecognized extensions are skipped and returned separately.
    pub fn from_media_paths(
        paths: &[PathBuf],
        image_duration_micros: i64,
        video_duration_micros: i64,
    ) -> (Self, Vec<PathBuf>) {
        let mut timeline = Self::new();
        let mut skipped = vec![];
        for path in paths {
            match MediaKind::from_path(path) {
                Some(kind) => {
                    let duration = match kind {
                        MediaKind::Image => image_duration_micros,
                        MediaKind::Video => video_duration_micros,
                    };
                    timeline.push(ClipEntry::new(path.clone(), kind, duration));
                }
                None => {
                    warn!(path = %path.display(), "Skipping file with unknown media type");
                    skipped.push(path.clone());
                }
            }
        }
        (timeline, skipped)
    }

    /// Append a clip, assigning it the next free id. Returns that id.
    pub fn push(&mut self, mut clip: ClipEntry) -> ClipId {
        let id = self.clips.iter().map(|c| c.id).max().map_or(1, |max| max + 1);
        clip.id = id;
        self.clips.push(clip);
        id
    }

    /// Clips in timeline order.
    pub fn clips(&self) -> &[ClipEntry] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Sum of all clip durations in microseconds.
    pub fn total_duration(&self) -> i64 {
        self.clips
            .iter()
            .fold(0i64, |acc, clip| acc.saturating_add(clip.duration_micros))
    }

    /// Absolute start of the clip at `index`: sum of preceding durations.
    pub fn start_of(&self, index: usize) -> Option<i64> {
        if index >= self.clips.len() {
            return None;
        }
        Some(
            self.clips[..index]
                .iter()
                .fold(0i64, |acc, clip| acc.saturating_add(clip.duration_micros)),
        )
    }

    /// Load a timeline from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TimelineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| TimelineError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let timeline: Self = serde_json::from_str(&json).map_err(|e| TimelineError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(path = %path.display(), clips = timeline.len(), "Loaded timeline");
        Ok(timeline)
    }

    /// Save the timeline as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TimelineError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TimelineError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| TimelineError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| TimelineError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Errors that can occur when reading or writing timeline files.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_clips() -> Timeline {
        let mut timeline = Timeline::new();
        timeline.push(ClipEntry::new("/m/a.jpg", MediaKind::Image, 3_000_000));
        timeline.push(ClipEntry::new("/m/b.mp4", MediaKind::Video, 5_000_000));
        timeline.push(ClipEntry::new("/m/c.jpg", MediaKind::Image, 2_000_000));
        timeline
    }

    #[test]
    fn test_total_duration_and_starts() {
        let timeline = three_clips();
        assert_eq!(timeline.total_duration(), 10_000_000);
        assert_eq!(timeline.start_of(0), Some(0));
        assert_eq!(timeline.start_of(1), Some(3_000_000));
        assert_eq!(timeline.start_of(2), Some(8_000_000));
        assert_eq!(timeline.start_of(3), None);
    }

    #[test]
    fn test_push_assigns_increasing_ids() {
        let timeline = three_clips();
        let ids: Vec<ClipId> = timeline.clips().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_no_op_selections() {
        let clip = ClipEntry::new("/m/a.jpg", MediaKind::Image, 1)
            .with_effect("None")
            .with_transition("cut");
        assert_eq!(clip.selected_effect(), None);
        assert_eq!(clip.selected_transition(), None);

        let clip = clip.with_effect(" Blur ").with_transition("Fade");
        assert_eq!(clip.selected_effect(), Some("Blur"));
        assert_eq!(clip.selected_transition(), Some("Fade"));
    }

    #[test]
    fn test_animation_selection_skips_none() {
        let animations = ClipAnimations {
            entry: Some("Fade In".into()),
            exit: Some("None".into()),
            combo: Some("Swing".into()),
        };
        let selected = animations.selected();
        assert_eq!(
            selected,
            vec![(AnimationSlot::In, "Fade In"), (AnimationSlot::Group, "Swing")]
        );
        assert!(ClipAnimations::default().is_empty());
    }

    #[test]
    fn test_media_kind_from_extension() {
        assert_eq!(
            MediaKind::from_path(Path::new("/x/photo.JPG")),
            Some(MediaKind::Image)
        );
        assert_eq!(
            MediaKind::from_path(Path::new("clip.mov")),
            Some(MediaKind::Video)
        );
        assert_eq!(MediaKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(MediaKind::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_from_media_paths_skips_unknown() {
        let paths = vec![
            PathBuf::from("a.png"),
            PathBuf::from("readme.md"),
            PathBuf::from("b.mp4"),
        ];
        let (timeline, skipped) = Timeline::from_media_paths(&paths, 3_000_000, 5_000_000);
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.clips()[1].duration_micros, 5_000_000);
        assert_eq!(skipped, vec![PathBuf::from("readme.md")]);
    }

    #[test]
    fn test_ui_shape_deserializes() {
        let json = r#"{
            "clips": [
                {"mediaPath": "/m/a.jpg", "mediaKind": "image", "durationMicros": 3000000,
                 "effectName": "None", "transitionName": "Fade"},
                {"mediaPath": "/m/b.mp4", "mediaKind": "video", "durationMicros": 5000000,
                 "effect": "Blur", "animations": {"in": "Fade In"}}
            ]
        }"#;
        let timeline: Timeline = serde_json::from_str(json).unwrap();
        assert_eq!(timeline.version, "1.0");
        assert_eq!(timeline.clips[0].selected_transition(), Some("Fade"));
        assert_eq!(timeline.clips[1].selected_effect(), Some("Blur"));
        assert_eq!(
            timeline.clips[1].animations.entry.as_deref(),
            Some("Fade In")
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta").join("timeline.json");

        let timeline = three_clips();
        timeline.save(&path).unwrap();
        let loaded = Timeline::load(&path).unwrap();
        assert_eq!(loaded, timeline);
    }

    proptest::proptest! {
        #[test]
        fn test_starts_are_prefix_sums(durations in proptest::collection::vec(1i64..10_000_000, 0..40)) {
            let timeline = Timeline::from_clips(
                durations
                    .iter()
                    .map(|d| ClipEntry::new("/m/x.png", MediaKind::Image, *d))
                    .collect(),
            );
            let mut expected = 0;
            for (index, duration) in durations.iter().enumerate() {
                proptest::prop_assert_eq!(timeline.start_of(index), Some(expected));
                expected += duration;
            }
            proptest::prop_assert_eq!(timeline.total_duration(), expected);
        }
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Timeline::load("/definitely/not/here/timeline.json").unwrap_err();
        assert!(matches!(err, TimelineError::IoError { .. }));
    }
}
