use std::path::PathBuf;

use draftforge_common::{ErrorKind, PathStyle, SchemaTarget};
use draftforge_export_engine::{
    export, export_and_persist, load_templates, persist, validate, validate_value, Destination,
    ExportFailure, ExportOptions, ExportRequest, ExportStage, ExportWarning, Persisted,
    SinkOptions, TemplateBundle, TemplateSources,
};
use draftforge_project_model::{
    CatalogKind, Catalogs, ClipAnimations, ClipEntry, DraftDocument, MediaKind, Timeline,
    TRACK_EFFECT,
};
use serde_json::Value;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
}

fn base_only() -> TemplateSources {
    TemplateSources::new(
        fixtures()
            .join("templates")
            .join("draft_content_template.json"),
    )
}

fn full_sources() -> TemplateSources {
    let dir = fixtures().join("templates");
    TemplateSources {
        base: dir.join("draft_content_template.json"),
        effects: Some(dir.join("effects_template.json")),
        transitions: Some(dir.join("transitions_template.json")),
    }
}

fn three_clips() -> Timeline {
    Timeline::load(fixtures().join("timelines").join("three_clips.json"))
        .expect("fixture timeline should load")
}

fn options() -> ExportOptions {
    ExportOptions {
        name: "fixture".to_string(),
        path_style: PathStyle::Posix,
        ..ExportOptions::default()
    }
}

fn catalogs() -> Catalogs {
    Catalogs::builtin().expect("bundled catalog should parse")
}

#[tokio::test]
async fn three_clip_scenario_produces_expected_draft() {
    let templates = load_templates(&base_only()).await.unwrap();
    let timeline = three_clips();
    let draft = export(&timeline, &templates, &catalogs(), &options()).unwrap();
    let doc = &draft.document;
    let m = &doc.materials;

    assert!(draft.warnings.is_empty());
    assert_eq!(m.videos.len(), 3);
    assert_eq!(m.speeds.len(), 3);
    assert_eq!(m.placeholder_infos.len(), 3);
    assert_eq!(m.sound_channel_mappings.len(), 3);
    assert_eq!(m.vocal_separations.len(), 3);
    assert_eq!(m.canvases.len(), 1);
    assert_eq!(m.transitions.len(), 1);
    assert_eq!(m.video_effects.len(), 1);
    assert_eq!(m.video_effects[0].name, "Blur");

    let primary = doc.primary_track().unwrap();
    let starts: Vec<i64> = primary
        .segments
        .iter()
        .map(|s| s.target_timerange.start)
        .collect();
    assert_eq!(starts, vec![0, 3_000_000, 8_000_000]);

    // The transition belongs to the clip it follows.
    assert!(primary.segments[0]
        .extra_material_refs
        .contains(&m.transitions[0].id));
    assert!(!primary.segments[1]
        .extra_material_refs
        .contains(&m.transitions[0].id));

    let effect_tracks: Vec<_> = doc.tracks_of(TRACK_EFFECT).collect();
    assert_eq!(effect_tracks.len(), 1);
    assert_eq!(effect_tracks[0].segments.len(), 1);
    assert_eq!(effect_tracks[0].segments[0].material_id, m.video_effects[0].id);
    assert_eq!(
        effect_tracks[0].segments[0].target_timerange,
        primary.segments[1].target_timerange
    );

    assert_eq!(doc.duration, 10_000_000);
    assert_eq!(m.videos[0].path, "/media/a.jpg");
    assert!(!m.videos[0].has_audio);
    assert!(m.videos[1].has_audio);

    let report = validate(doc, timeline.len());
    assert!(report.ok, "{:?}", report.reasons);
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn template_definitions_override_catalog_defaults() {
    let templates = load_templates(&full_sources()).await.unwrap();
    assert!(templates.notes.is_empty());

    let draft = export(&three_clips(), &templates, &catalogs(), &options()).unwrap();
    let m = &draft.document.materials;
    assert_eq!(m.transitions[0].duration, 800_000);
    assert_eq!(m.video_effects[0].adjust_params[0].value, 0.8);
}

#[tokio::test]
async fn template_unknown_keys_survive_export() {
    let templates = load_templates(&base_only()).await.unwrap();
    let draft = export(&three_clips(), &templates, &catalogs(), &options()).unwrap();
    let value = serde_json::to_value(&draft.document).unwrap();

    assert_eq!(value["render_index_track_mode_on"], true);
    assert_eq!(value["config"]["maintrack_adsorb"], true);
    assert!(value["materials"]["beats"].is_array());
    assert!(value["keyframes"]["videos"].is_array());
    assert_ne!(value["id"], "91E08AC5-22FB-47E2-9AA0-7DC300FAEA2B");
}

#[tokio::test]
async fn zero_duration_clip_is_rejected_and_nothing_written() {
    let templates = load_templates(&base_only()).await.unwrap();
    let catalogs = catalogs();
    let timeline = Timeline::from_clips(vec![
        ClipEntry::new("/media/a.jpg", MediaKind::Image, 3_000_000),
        ClipEntry::new("/media/b.jpg", MediaKind::Image, 0),
    ]);
    let out = tempfile::tempdir().unwrap();
    let folder = out.path().join("draft");

    let failure = export_and_persist(
        ExportRequest {
            timeline: &timeline,
            templates: &templates,
            catalogs: &catalogs,
            options: options(),
            destination: Destination::project_folder(&folder),
            sink: SinkOptions::default(),
        },
        None,
    )
    .await
    .unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::Input);
    assert!(failure.into_document().is_none());
    assert!(!folder.exists());
}

#[tokio::test]
async fn overflowing_total_duration_is_rejected_and_nothing_written() {
    let templates = load_templates(&base_only()).await.unwrap();
    let catalogs = catalogs();
    let timeline = Timeline::from_clips(vec![
        ClipEntry::new("/media/a.mp4", MediaKind::Video, i64::MAX),
        ClipEntry::new("/media/b.jpg", MediaKind::Image, 1),
    ]);
    let out = tempfile::tempdir().unwrap();
    let folder = out.path().join("draft");

    let failure = export_and_persist(
        ExportRequest {
            timeline: &timeline,
            templates: &templates,
            catalogs: &catalogs,
            options: options(),
            destination: Destination::project_folder(&folder),
            sink: SinkOptions::default(),
        },
        None,
    )
    .await
    .unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::Input);
    assert!(failure.into_document().is_none());
    assert!(!folder.exists());
}

#[test]
fn template_with_existing_tracks_gets_no_duplicates() {
    let templates = TemplateBundle::from_base_json(
        r#"{"materials": {}, "tracks": [
            {"id": "TEMPLATE-VIDEO", "type": "video", "segments": []},
            {"id": "TEMPLATE-EFFECT", "type": "effect", "segments": []}
        ]}"#,
    )
    .unwrap();
    let timeline = Timeline::from_clips(vec![
        ClipEntry::new("/media/a.jpg", MediaKind::Image, 3_000_000).with_effect("Blur"),
        ClipEntry::new("/media/b.jpg", MediaKind::Image, 2_000_000),
    ]);

    let draft = export(&timeline, &templates, &catalogs(), &options()).unwrap();
    let doc = &draft.document;

    assert_eq!(doc.tracks.len(), 2);
    let primary = doc.primary_track().unwrap();
    assert_eq!(primary.id, "TEMPLATE-VIDEO");
    assert_eq!(primary.segments.len(), 2);

    let effect_tracks: Vec<_> = doc.tracks_of(TRACK_EFFECT).collect();
    assert_eq!(effect_tracks.len(), 1);
    assert_eq!(effect_tracks[0].id, "TEMPLATE-EFFECT");
    assert_eq!(effect_tracks[0].segments.len(), 1);

    let report = validate(doc, timeline.len());
    assert!(report.ok, "{:?}", report.reasons);
}

#[test]
fn template_null_collections_export_cleanly() {
    let templates = TemplateBundle::from_base_json(
        r#"{"materials": {"videos": null, "canvases": null}, "tracks": null}"#,
    )
    .unwrap();
    let timeline = Timeline::from_clips(vec![ClipEntry::new(
        "/media/a.jpg",
        MediaKind::Image,
        3_000_000,
    )]);

    let draft = export(&timeline, &templates, &catalogs(), &options()).unwrap();
    let doc = &draft.document;
    assert_eq!(doc.materials.videos.len(), 1);
    assert_eq!(doc.materials.canvases.len(), 1);
    assert_eq!(doc.tracks.len(), 1);

    let report = validate(doc, 1);
    assert!(report.ok, "{:?}", report.reasons);
}

#[test]
fn unknown_effect_falls_back_to_defaults() {
    let timeline = Timeline::from_clips(vec![ClipEntry::new(
        "/media/a.jpg",
        MediaKind::Image,
        3_000_000,
    )
    .with_effect("GlitchXYZ123")]);
    let templates = TemplateBundle::from_base_json(r#"{"materials": {}, "tracks": []}"#).unwrap();

    let draft = export(&timeline, &templates, &catalogs(), &options()).unwrap();
    let effect = &draft.document.materials.video_effects[0];
    assert_eq!(effect.resource_id, "");
    assert_eq!(effect.name, "GlitchXYZ123");
    assert_eq!(
        effect.adjust_params,
        draftforge_project_model::default_effect_parameters()
    );
    assert_eq!(
        draft.warnings,
        vec![ExportWarning::CatalogMiss {
            kind: CatalogKind::Effect,
            name: "GlitchXYZ123".to_string(),
            clip_index: 0,
        }]
    );
}

#[test]
fn none_and_cut_are_no_ops() {
    let timeline = Timeline::from_clips(vec![
        ClipEntry::new("/media/a.jpg", MediaKind::Image, 1_000_000)
            .with_effect("None")
            .with_transition("Cut"),
        ClipEntry::new("/media/b.jpg", MediaKind::Image, 1_000_000)
            .with_effect(" none ")
            .with_animations(ClipAnimations {
                entry: Some("None".to_string()),
                ..ClipAnimations::default()
            }),
    ]);
    let templates = TemplateBundle::from_base_json("{}").unwrap();
    let draft = export(&timeline, &templates, &catalogs(), &options()).unwrap();
    let doc = &draft.document;

    assert!(doc.materials.video_effects.is_empty());
    assert!(doc.materials.transitions.is_empty());
    assert!(doc.materials.material_animations.is_empty());
    assert_eq!(doc.tracks_of(TRACK_EFFECT).count(), 0);
    for segment in &doc.primary_track().unwrap().segments {
        assert_eq!(segment.extra_material_refs.len(), 5);
    }
}

#[tokio::test]
async fn repeated_exports_differ_only_in_ids_and_metadata() {
    let templates = load_templates(&full_sources()).await.unwrap();
    let timeline = three_clips();

    let first = export(&timeline, &templates, &catalogs(), &options()).unwrap();
    let second = export(&timeline, &templates, &catalogs(), &options()).unwrap();
    assert_ne!(first.document.id, second.document.id);

    let scrub = |doc: &DraftDocument| {
        let mut value = serde_json::to_value(doc).unwrap();
        scrub_volatile(&mut value);
        value
    };
    assert_eq!(scrub(&first.document), scrub(&second.document));
}

#[test]
fn schema_target_and_path_style_are_configurable() {
    let timeline = Timeline::from_clips(vec![ClipEntry::new(
        "c:/Users/me//clips/a.mp4",
        MediaKind::Video,
        1_000_000,
    )]);
    let templates = TemplateBundle::from_base_json("{}").unwrap();
    let options = ExportOptions {
        schema: SchemaTarget::Legacy,
        path_style: PathStyle::Windows,
        ..options()
    };
    let draft = export(&timeline, &templates, &catalogs(), &options).unwrap();
    let doc = &draft.document;

    assert_eq!(doc.new_version, "75.0.0");
    assert_eq!(doc.platform.app_version, "3.9.0");
    assert_eq!(doc.materials.videos[0].path, r"C:\Users\me\clips\a.mp4");

    let json = serde_json::to_string(doc).unwrap();
    assert!(json.contains(r#""path":"C:\\Users\\me\\clips\\a.mp4""#));
}

#[tokio::test]
async fn failed_persist_hands_back_the_document() {
    let templates = load_templates(&base_only()).await.unwrap();
    let catalogs = catalogs();
    let timeline = three_clips();
    let out = tempfile::tempdir().unwrap();
    let blocker = out.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();

    let failure = export_and_persist(
        ExportRequest {
            timeline: &timeline,
            templates: &templates,
            catalogs: &catalogs,
            options: options(),
            destination: Destination::project_folder(blocker.join("draft")),
            sink: SinkOptions::default(),
        },
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(failure, ExportFailure::NotPersisted { .. }));
    assert_eq!(failure.kind(), ErrorKind::Persist);
    let document = failure.into_document().unwrap();

    // Redirect without resynthesis.
    let persisted = persist(&document, &Destination::download(), SinkOptions::default())
        .await
        .unwrap();
    let Persisted::Download(payload) = persisted else {
        panic!("expected a download payload");
    };
    let value: Value = serde_json::from_slice(&payload.bytes).unwrap();
    assert_eq!(value["duration"], 10_000_000);
}

#[tokio::test]
async fn pipeline_writes_content_and_meta_info() {
    let templates = load_templates(&full_sources()).await.unwrap();
    let catalogs = catalogs();
    let timeline = three_clips();
    let out = tempfile::tempdir().unwrap();
    let stages = std::sync::Arc::new(std::sync::Mutex::new(Vec::<ExportStage>::new()));
    let seen = stages.clone();

    let report = export_and_persist(
        ExportRequest {
            timeline: &timeline,
            templates: &templates,
            catalogs: &catalogs,
            options: options(),
            destination: Destination::project_folder(out.path().join("nested").join("draft")),
            sink: SinkOptions {
                pretty: true,
                write_meta_info: true,
            },
        },
        Some(Box::new(move |stage: ExportStage| seen.lock().unwrap().push(stage))),
    )
    .await
    .unwrap();

    let Persisted::Written {
        path, meta_info, ..
    } = &report.persisted
    else {
        panic!("expected a written file");
    };
    assert!(path.ends_with("draft_content.json"));
    assert!(meta_info.as_ref().unwrap().exists());

    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(on_disk["id"], report.document.id.as_str());
    assert!(validate_value(&on_disk, 3).ok);

    assert_eq!(
        *stages.lock().unwrap(),
        vec![
            ExportStage::Synthesizing,
            ExportStage::Validating,
            ExportStage::Persisting,
            ExportStage::Complete,
        ]
    );
}

/// Replace fresh ids and timestamps with fixed markers.
fn scrub_volatile(value: &mut Value) {
    match value {
        Value::String(s) if is_generated_id(s) => *s = "<id>".to_string(),
        Value::Array(items) => items.iter_mut().for_each(scrub_volatile),
        Value::Object(map) => {
            for (key, item) in map.iter_mut() {
                if key == "create_time" || key == "update_time" {
                    *item = Value::Null;
                } else {
                    scrub_volatile(item);
                }
            }
        }
        _ => {}
    }
}

fn is_generated_id(s: &str) -> bool {
    let hex = |c: char| c.is_ascii_hexdigit();
    let uuid = s.len() == 36
        && s.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => hex(c),
        });
    let compact = s.len() == 32 && s.chars().all(hex);
    uuid || compact
}
