use std::collections::HashSet;

use draftforge_common::PathStyle;
use draftforge_export_engine::{export_with_ids, validate, ExportOptions, TemplateBundle};
use draftforge_project_model::{
    Catalogs, ClipAnimations, ClipEntry, IdGenerator, MediaKind, Timeline,
};
use proptest::prelude::*;

fn clip_strategy() -> impl Strategy<Value = ClipEntry> {
    (
        1i64..20_000_000,
        any::<bool>(),
        prop::sample::select(vec!["None", "Blur", "VHS", "NotAnEffect"]),
        prop::sample::select(vec!["Cut", "Fade", "Spin", "NotATransition"]),
        prop::option::of(prop::sample::select(vec!["Fade In", "Spin In", "Nope"])),
        prop::option::of(1i64..30_000_000),
    )
        .prop_map(|(duration, video, effect, transition, entry, effect_duration)| {
            let (path, kind) = if video {
                ("/media/clip.mp4", MediaKind::Video)
            } else {
                ("/media/still.png", MediaKind::Image)
            };
            let mut clip = ClipEntry::new(path, kind, duration)
                .with_effect(effect)
                .with_transition(transition)
                .with_animations(ClipAnimations {
                    entry: entry.map(str::to_string),
                    ..ClipAnimations::default()
                });
            clip.effect_duration_micros = effect_duration;
            clip
        })
}

fn run(clips: Vec<ClipEntry>, seed: u64) -> draftforge_project_model::DraftDocument {
    let timeline = Timeline::from_clips(clips);
    let templates = TemplateBundle::from_base_json("{}").unwrap();
    let options = ExportOptions {
        path_style: PathStyle::Posix,
        ..ExportOptions::default()
    };
    export_with_ids(
        &timeline,
        &templates,
        &Catalogs::builtin().unwrap(),
        &options,
        IdGenerator::with_seed(seed),
    )
    .unwrap()
    .document
}

proptest! {
    #[test]
    fn primary_segments_start_at_prefix_sums(
        clips in prop::collection::vec(clip_strategy(), 1..12),
        seed in any::<u64>(),
    ) {
        let durations: Vec<i64> = clips.iter().map(|c| c.duration_micros).collect();
        let doc = run(clips, seed);
        let segments = &doc.primary_track().unwrap().segments;

        prop_assert_eq!(segments.len(), durations.len());
        let mut expected = 0i64;
        for (segment, duration) in segments.iter().zip(&durations) {
            prop_assert_eq!(segment.target_timerange.start, expected);
            prop_assert_eq!(segment.target_timerange.duration, *duration);
            expected += duration;
        }
        prop_assert_eq!(doc.duration, expected);
    }

    #[test]
    fn every_reference_resolves(
        clips in prop::collection::vec(clip_strategy(), 1..12),
        seed in any::<u64>(),
    ) {
        let count = clips.len();
        let doc = run(clips, seed);

        prop_assert!(doc.dangling_references().is_empty());
        let report = validate(&doc, count);
        prop_assert!(report.ok, "{:?}", report.reasons);

        let ids = doc.materials.ids();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        prop_assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn effect_segments_stay_inside_their_clip(
        clips in prop::collection::vec(clip_strategy(), 1..12),
        seed in any::<u64>(),
    ) {
        let doc = run(clips, seed);
        let primary = doc.primary_track().unwrap();
        for track in doc.tracks_of(draftforge_project_model::TRACK_EFFECT) {
            for segment in &track.segments {
                let owner = primary
                    .segments
                    .iter()
                    .find(|s| s.extra_material_refs.contains(&segment.material_id))
                    .unwrap();
                prop_assert_eq!(segment.target_timerange.start, owner.target_timerange.start);
                prop_assert!(segment.target_timerange.duration > 0);
                prop_assert!(segment.target_timerange.duration <= owner.target_timerange.duration);
            }
        }
    }
}
