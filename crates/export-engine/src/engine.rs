//! Draft synthesis.
//!
//! [`export`] turns a timeline into a complete draft document in a fixed
//! sequence of named steps (see [`DraftBuilder`]). The caller's template is
//! cloned, never mutated, and every record gets a fresh id. The only
//! non-determinism across runs is ids, timestamps, and platform metadata.

use draftforge_common::{DraftError, DraftResult, PathStyle, SchemaTarget};
use draftforge_project_model::{
    default_effect_parameters, AnimationEntry, AnimationSlot, CanvasConfig, CanvasMaterial,
    CatalogKind, Catalogs, ClipEntry, DraftDocument, IdGenerator, MaterialAnimation,
    PlaceholderInfo, PlatformInfo, SchemaProfile, Segment, SoundChannelMapping, SpeedMaterial,
    TimeRange, Timeline, Track, TransitionMaterial, VideoEffectMaterial, VideoMaterial,
    VocalSeparation, DEFAULT_ANIMATION_DURATION_MICROS, DEFAULT_TRANSITION_DURATION_MICROS,
    EFFECT_RENDER_INDEX, TRACK_EFFECT, TRACK_VIDEO,
};
use tracing::{debug, info, warn};

use crate::paths::format_media_path;
use crate::template::TemplateBundle;

/// Per-export settings.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Draft name written into the document.
    pub name: String,
    pub schema: SchemaTarget,
    pub path_style: PathStyle,
    pub fps: f64,
    /// Overrides the template canvas size when set.
    pub canvas: Option<CanvasConfig>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            name: "draftforge".to_string(),
            schema: SchemaTarget::default(),
            path_style: PathStyle::host(),
            fps: 30.0,
            canvas: None,
        }
    }
}

/// Recoverable problem noticed during synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportWarning {
    /// A selected name has no catalog entry; defaults were used.
    CatalogMiss {
        kind: CatalogKind,
        name: String,
        clip_index: usize,
    },
}

impl std::fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CatalogMiss {
                kind,
                name,
                clip_index,
            } => write!(
                f,
                "unknown {kind} \"{name}\" on clip {clip_index}, using defaults"
            ),
        }
    }
}

/// Result of a successful synthesis.
#[derive(Debug, Clone)]
pub struct DraftExport {
    pub document: DraftDocument,
    pub warnings: Vec<ExportWarning>,
}

/// Synthesize a draft from `timeline`.
///
/// Fails with [`DraftError::Input`] for an empty timeline or a malformed
/// clip; no partial document is produced in that case.
pub fn export(
    timeline: &Timeline,
    templates: &TemplateBundle,
    catalogs: &Catalogs,
    options: &ExportOptions,
) -> DraftResult<DraftExport> {
    export_with_ids(timeline, templates, catalogs, options, IdGenerator::new())
}

/// [`export`] with a caller-supplied id generator.
pub fn export_with_ids(
    timeline: &Timeline,
    templates: &TemplateBundle,
    catalogs: &Catalogs,
    options: &ExportOptions,
    ids: IdGenerator,
) -> DraftResult<DraftExport> {
    check_timeline(timeline)?;

    info!(
        clips = timeline.len(),
        duration_micros = timeline.total_duration(),
        schema = ?options.schema,
        "Starting draft export"
    );

    let mut builder = DraftBuilder::new(templates, catalogs, options, ids);
    builder.normalize_collections();
    builder.resolve_canvas();
    builder.add_support_records(timeline);
    builder.add_effects(timeline);
    builder.add_transitions(timeline);
    builder.add_animations(timeline);
    builder.add_primary_track(timeline);
    builder.add_effect_track(timeline);
    builder.finish_metadata();

    let export = builder.build();
    info!(
        materials = export.document.materials.len(),
        tracks = export.document.tracks.len(),
        duration_micros = export.document.duration,
        warnings = export.warnings.len(),
        "Draft export synthesized"
    );
    Ok(export)
}

/// Reject timelines the editor cannot load.
fn check_timeline(timeline: &Timeline) -> DraftResult<()> {
    if timeline.is_empty() {
        return Err(DraftError::input("timeline is empty, nothing to export"));
    }
    let mut total = 0i64;
    for (index, clip) in timeline.clips().iter().enumerate() {
        if clip.media_path.as_os_str().is_empty() {
            return Err(DraftError::input(format!(
                "clip {index} has no media path"
            )));
        }
        if clip.duration_micros <= 0 {
            return Err(DraftError::input(format!(
                "clip {index} ({}) has non-positive duration {}",
                clip.media_path.display(),
                clip.duration_micros
            )));
        }
        total = total.checked_add(clip.duration_micros).ok_or_else(|| {
            DraftError::input(format!(
                "timeline duration overflows at clip {index} ({})",
                clip.media_path.display()
            ))
        })?;
        if let Some(override_micros) = clip.effect_duration_micros {
            if override_micros <= 0 {
                return Err(DraftError::input(format!(
                    "clip {index} ({}) has non-positive effect duration {override_micros}",
                    clip.media_path.display()
                )));
            }
        }
    }
    Ok(())
}

/// Ids of the records attached to one clip's segment.
#[derive(Debug, Default)]
struct ClipRefs {
    speed: String,
    placeholder: String,
    sound_mapping: String,
    vocal_separation: String,
    transition: Option<String>,
    effect: Option<String>,
    animation: Option<String>,
}

/// Step-by-step construction of one draft.
pub struct DraftBuilder<'a> {
    templates: &'a TemplateBundle,
    catalogs: &'a Catalogs,
    options: &'a ExportOptions,
    ids: IdGenerator,
    document: DraftDocument,
    canvas_id: String,
    clip_refs: Vec<ClipRefs>,
    primary_ranges: Vec<TimeRange>,
    warnings: Vec<ExportWarning>,
}

impl<'a> DraftBuilder<'a> {
    /// Step 1: start from a deep copy of the base template.
    pub fn new(
        templates: &'a TemplateBundle,
        catalogs: &'a Catalogs,
        options: &'a ExportOptions,
        ids: IdGenerator,
    ) -> Self {
        Self {
            templates,
            catalogs,
            options,
            ids,
            document: templates.base.clone(),
            canvas_id: String::new(),
            clip_refs: vec![],
            primary_ranges: vec![],
            warnings: vec![],
        }
    }

    /// Step 2: every collection the editor requires exists.
    pub fn normalize_collections(&mut self) {
        self.document.normalize();
    }

    /// Step 3: one canvas shared by all clips.
    pub fn resolve_canvas(&mut self) {
        match self.document.materials.canvases.first_mut() {
            Some(canvas) => {
                if canvas.id.is_empty() {
                    canvas.id = self.ids.new_id();
                }
                self.canvas_id = canvas.id.clone();
                debug!(canvas_id = %self.canvas_id, "Reusing template canvas");
            }
            None => {
                let canvas = CanvasMaterial::solid(self.ids.new_id());
                self.canvas_id = canvas.id.clone();
                self.document.materials.canvases.push(canvas);
                debug!(canvas_id = %self.canvas_id, "Synthesized default canvas");
            }
        }
    }

    /// Step 4: speed, placeholder, sound mapping and vocal separation per clip.
    pub fn add_support_records(&mut self, timeline: &Timeline) {
        let materials = &mut self.document.materials;
        for _ in timeline.clips() {
            let speed = SpeedMaterial::normal(self.ids.new_id());
            let placeholder = PlaceholderInfo::empty(self.ids.new_id());
            let sound = SoundChannelMapping::disabled(self.ids.new_id());
            let vocal = VocalSeparation::disabled(self.ids.new_id());

            self.clip_refs.push(ClipRefs {
                speed: speed.id.clone(),
                placeholder: placeholder.id.clone(),
                sound_mapping: sound.id.clone(),
                vocal_separation: vocal.id.clone(),
                ..ClipRefs::default()
            });

            materials.speeds.push(speed);
            materials.placeholder_infos.push(placeholder);
            materials.sound_channel_mappings.push(sound);
            materials.vocal_separations.push(vocal);
        }
        debug!(count = self.clip_refs.len(), "Added per-clip support records");
    }

    /// Step 5: one effect record per effect-bearing clip, never shared.
    pub fn add_effects(&mut self, timeline: &Timeline) {
        for (index, clip) in timeline.clips().iter().enumerate() {
            let Some(name) = clip.selected_effect() else {
                continue;
            };
            let effect = self.resolve_effect(index, name);
            debug!(clip = index, effect = %effect.name, id = %effect.id, "Added effect");
            self.clip_refs[index].effect = Some(effect.id.clone());
            self.document.materials.video_effects.push(effect);
        }
    }

    /// Step 6: transitions, owned by the earlier clip of each boundary.
    pub fn add_transitions(&mut self, timeline: &Timeline) {
        let clips = timeline.clips();
        for (index, pair) in clips.windows(2).enumerate() {
            let Some(name) = pair[0].selected_transition() else {
                continue;
            };
            let cap = pair[0].duration_micros.min(pair[1].duration_micros);
            let transition = self.resolve_transition(index, name, cap);
            debug!(
                clip = index,
                transition = %transition.name,
                duration = transition.duration,
                overlap = transition.is_overlap,
                "Added transition"
            );
            self.clip_refs[index].transition = Some(transition.id.clone());
            self.document.materials.transitions.push(transition);
        }
        if let Some(last) = clips.last() {
            if last.selected_transition().is_some() {
                debug!("Ignoring transition on the last clip");
            }
        }
    }

    /// In/out/group animations, bundled per clip.
    pub fn add_animations(&mut self, timeline: &Timeline) {
        for (index, clip) in timeline.clips().iter().enumerate() {
            let selected = clip.animations.selected();
            if selected.is_empty() {
                continue;
            }
            let entries = selected
                .into_iter()
                .map(|(slot, name)| self.resolve_animation(index, clip, slot, name))
                .collect();
            let bundle = MaterialAnimation::new(self.ids.new_id(), entries);
            debug!(clip = index, id = %bundle.id, "Added animation bundle");
            self.clip_refs[index].animation = Some(bundle.id.clone());
            self.document.materials.material_animations.push(bundle);
        }
    }

    /// Step 7: media records and the primary track, clips back to back.
    ///
    /// A `video` track carried by the template is reused; its segments are
    /// replaced by the clip sequence.
    pub fn add_primary_track(&mut self, timeline: &Timeline) {
        let mut segments = Vec::with_capacity(timeline.len());
        let mut start = 0i64;

        for (index, clip) in timeline.clips().iter().enumerate() {
            let path = format_media_path(&clip.media_path, self.options.path_style);
            let media = VideoMaterial::local(
                self.ids.new_id(),
                path,
                clip.media_kind,
                clip.duration_micros,
            );

            let target = TimeRange::new(start, clip.duration_micros);
            let segment = Segment::media(
                self.ids.new_id(),
                media.id.clone(),
                target,
                self.extra_refs(index),
            );

            self.document.materials.videos.push(media);
            self.primary_ranges.push(target);
            segments.push(segment);
            start = start.saturating_add(clip.duration_micros);
        }

        let track = self.track_of_kind(TRACK_VIDEO);
        if !track.segments.is_empty() {
            debug!(
                dropped = track.segments.len(),
                "Replacing template segments on the primary track"
            );
        }
        track.segments = segments;
        debug!(segments = track.segments.len(), end = start, "Built primary track");
    }

    /// Step 8: a single effect track, only when some clip has an effect.
    ///
    /// Segments are appended to the template's `effect` track if it has one.
    pub fn add_effect_track(&mut self, timeline: &Timeline) {
        let mut segments = vec![];
        for (index, clip) in timeline.clips().iter().enumerate() {
            let Some(effect_id) = self.clip_refs[index].effect.clone() else {
                continue;
            };
            let clip_range = self.primary_ranges[index];
            let duration = clip
                .effect_duration_micros
                .map_or(clip_range.duration, |d| d.min(clip_range.duration));
            segments.push(Segment::effect(
                self.ids.new_id(),
                effect_id,
                TimeRange::new(clip_range.start, duration),
                EFFECT_RENDER_INDEX,
            ));
        }

        if segments.is_empty() {
            return;
        }
        let track = self.track_of_kind(TRACK_EFFECT);
        track.segments.extend(segments);
        debug!(segments = track.segments.len(), "Built effect track");
    }

    /// Step 9: duration, fresh document id, platform metadata and version.
    pub fn finish_metadata(&mut self) {
        let profile = SchemaProfile::for_target(self.options.schema);
        let now = chrono::Utc::now().timestamp();
        let doc = &mut self.document;

        doc.duration = doc.primary_track().map_or(0, Track::duration);
        doc.id = self.ids.new_id();
        doc.name = self.options.name.clone();
        doc.version = profile.version;
        doc.new_version = profile.new_version.to_string();
        doc.fps = self.options.fps;
        if let Some(canvas) = &self.options.canvas {
            doc.canvas_config = canvas.clone();
        }
        doc.create_time = now;
        doc.update_time = now;
        doc.platform = PlatformInfo::fresh(&mut self.ids, &profile);
        doc.last_modified_platform = PlatformInfo::fresh(&mut self.ids, &profile);
    }

    /// Step 10: hand over the finished document.
    pub fn build(self) -> DraftExport {
        DraftExport {
            document: self.document,
            warnings: self.warnings,
        }
    }

    /// The first track of `kind`, created when the template has none.
    ///
    /// A new primary track goes first; other kinds are appended.
    fn track_of_kind(&mut self, kind: &str) -> &mut Track {
        let position = self
            .document
            .tracks
            .iter()
            .position(|track| track.kind == kind);
        let index = match position {
            Some(index) => {
                let track = &mut self.document.tracks[index];
                if track.id.is_empty() {
                    track.id = self.ids.new_id();
                }
                debug!(kind, id = %track.id, "Reusing template track");
                index
            }
            None => {
                let track = Track::new(self.ids.new_id(), kind);
                if kind == TRACK_VIDEO {
                    self.document.tracks.insert(0, track);
                    0
                } else {
                    self.document.tracks.push(track);
                    self.document.tracks.len() - 1
                }
            }
        };
        &mut self.document.tracks[index]
    }

    /// Extra material refs in the editor's order.
    fn extra_refs(&self, index: usize) -> Vec<String> {
        let refs = &self.clip_refs[index];
        let mut out = vec![
            refs.speed.clone(),
            refs.placeholder.clone(),
            self.canvas_id.clone(),
            refs.sound_mapping.clone(),
            refs.vocal_separation.clone(),
        ];
        out.extend(refs.transition.iter().cloned());
        out.extend(refs.effect.iter().cloned());
        out.extend(refs.animation.iter().cloned());
        out
    }

    fn resolve_effect(&mut self, index: usize, name: &str) -> VideoEffectMaterial {
        let catalogs = self.catalogs;
        let id = self.ids.new_id();

        if let Some(entry) = catalogs.lookup(CatalogKind::Effect, name) {
            let params = self
                .templates
                .effect_definition(&entry.resource_id)
                .map(|def| def.adjust_params.clone())
                .filter(|params| !params.is_empty())
                .unwrap_or_else(|| entry.default_parameters.clone());
            let params = if params.is_empty() {
                default_effect_parameters()
            } else {
                params
            };
            return VideoEffectMaterial::new(
                id,
                &entry.name,
                &entry.resource_id,
                &entry.category,
                params,
            );
        }

        if let Some(def) = self.templates.effect_definition_by_name(name) {
            let params = if def.adjust_params.is_empty() {
                default_effect_parameters()
            } else {
                def.adjust_params.clone()
            };
            return VideoEffectMaterial::new(
                id,
                &def.name,
                &def.resource_id,
                &def.category_name,
                params,
            );
        }

        self.catalog_miss(CatalogKind::Effect, name, index);
        VideoEffectMaterial::new(id, name, "", "", default_effect_parameters())
    }

    fn resolve_transition(&mut self, index: usize, name: &str, cap: i64) -> TransitionMaterial {
        let catalogs = self.catalogs;
        let id = self.ids.new_id();

        let (name, resource_id, category, duration, overlap) =
            if let Some(entry) = catalogs.lookup(CatalogKind::Transition, name) {
                let def = self.templates.transition_definition(&entry.resource_id);
                let duration = def
                    .map(|d| d.duration)
                    .filter(|d| *d > 0)
                    .unwrap_or(entry.default_duration_micros);
                let overlap = def.map_or(entry.is_overlapping, |d| d.is_overlap);
                (
                    entry.name.clone(),
                    entry.resource_id.clone(),
                    entry.category.clone(),
                    duration,
                    overlap,
                )
            } else if let Some(def) = self.templates.transition_definition_by_name(name) {
                (
                    def.name.clone(),
                    def.resource_id.clone(),
                    def.category_name.clone(),
                    def.duration,
                    def.is_overlap,
                )
            } else {
                self.catalog_miss(CatalogKind::Transition, name, index);
                (
                    name.to_string(),
                    String::new(),
                    String::new(),
                    DEFAULT_TRANSITION_DURATION_MICROS,
                    false,
                )
            };

        let duration = if duration > 0 {
            duration
        } else {
            DEFAULT_TRANSITION_DURATION_MICROS
        };
        TransitionMaterial::new(
            id,
            name,
            resource_id,
            category,
            duration.min(cap),
            overlap,
        )
    }

    fn resolve_animation(
        &mut self,
        index: usize,
        clip: &ClipEntry,
        slot: AnimationSlot,
        name: &str,
    ) -> AnimationEntry {
        let catalogs = self.catalogs;
        let (name, resource_id, category, default_duration) =
            match catalogs.lookup(CatalogKind::Animation, name) {
                Some(entry) => (
                    entry.name.clone(),
                    entry.resource_id.clone(),
                    entry.category.clone(),
                    entry.default_duration_micros,
                ),
                None => {
                    self.catalog_miss(CatalogKind::Animation, name, index);
                    (
                        name.to_string(),
                        String::new(),
                        String::new(),
                        DEFAULT_ANIMATION_DURATION_MICROS,
                    )
                }
            };

        let clip_duration = clip.duration_micros;
        let default_duration = if default_duration > 0 {
            default_duration
        } else {
            DEFAULT_ANIMATION_DURATION_MICROS
        };
        let (start, duration) = match slot {
            AnimationSlot::In => (0, default_duration.min(clip_duration)),
            AnimationSlot::Out => {
                let duration = default_duration.min(clip_duration);
                (clip_duration - duration, duration)
            }
            AnimationSlot::Group => (0, clip_duration),
        };

        AnimationEntry {
            id: resource_id.clone(),
            kind: slot.as_str().to_string(),
            name,
            resource_id,
            category_id: String::new(),
            category_name: category,
            material_type: "video".to_string(),
            panel: "video".to_string(),
            platform: "all".to_string(),
            path: String::new(),
            start,
            duration,
            extra: Default::default(),
        }
    }

    fn catalog_miss(&mut self, kind: CatalogKind, name: &str, clip_index: usize) {
        warn!(%kind, selection = name, clip = clip_index, "Catalog miss, using defaults");
        self.warnings.push(ExportWarning::CatalogMiss {
            kind,
            name: name.to_string(),
            clip_index,
        });
    }
}
