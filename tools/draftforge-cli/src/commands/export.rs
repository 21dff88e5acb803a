//! Export a timeline to a draft.

use std::path::PathBuf;

use draftforge_common::{AppConfig, SchemaTarget, MICROS_PER_SEC};
use draftforge_export_engine::{
    export_and_persist, load_templates, Destination, ExportOptions, ExportRequest, ExportStage,
    Persisted, SinkOptions, StageCallback, TemplateSources,
};
use draftforge_project_model::{CanvasConfig, Catalogs, Timeline};

pub struct ExportArgs {
    pub timeline: PathBuf,
    pub base: Option<PathBuf>,
    pub effects: Option<PathBuf>,
    pub transitions: Option<PathBuf>,
    pub project_dir: Option<PathBuf>,
    pub download: bool,
    pub name: Option<String>,
    pub schema: Option<SchemaTarget>,
    pub catalog: Option<PathBuf>,
}

pub async fn run(config: &AppConfig, args: ExportArgs) -> anyhow::Result<()> {
    println!("Exporting timeline: {}", args.timeline.display());

    let timeline = Timeline::load(&args.timeline)
        .map_err(|e| anyhow::anyhow!("Failed to load timeline: {e}"))?;

    let mut paths = config.templates.clone();
    if args.base.is_some() {
        paths.base = args.base;
    }
    if args.effects.is_some() {
        paths.effects = args.effects;
    }
    if args.transitions.is_some() {
        paths.transitions = args.transitions;
    }
    let sources = TemplateSources::from_config(&paths)
        .map_err(|e| anyhow::anyhow!("{e} (pass --base or set templates.base in the config)"))?;
    let templates = load_templates(&sources).await?;
    for note in &templates.notes {
        println!("  Note: {note}");
    }

    let catalogs = match &args.catalog {
        Some(path) => Catalogs::load(path)?,
        None => Catalogs::builtin()?,
    };

    let defaults = &config.export;
    let name = args.name.unwrap_or_else(|| {
        args.project_dir
            .as_ref()
            .and_then(|dir| dir.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "draftforge".to_string())
    });
    let options = ExportOptions {
        name,
        schema: args.schema.unwrap_or(defaults.schema),
        path_style: defaults.path_style.resolve(),
        fps: defaults.fps,
        canvas: Some(CanvasConfig {
            width: defaults.canvas_width,
            height: defaults.canvas_height,
            ..CanvasConfig::default()
        }),
    };

    let destination = match (&args.project_dir, args.download) {
        (Some(folder), false) => Destination::ProjectFolder {
            folder: folder.clone(),
            file_name: defaults.file_name.clone(),
        },
        _ => Destination::Download {
            file_name: defaults.file_name.clone(),
        },
    };

    println!("  Clips: {}", timeline.len());
    println!(
        "  Duration: {:.2}s",
        timeline.total_duration() as f64 / MICROS_PER_SEC as f64
    );
    println!("  Schema: {:?}", options.schema);

    let progress: StageCallback = Box::new(|stage| {
        let label = match stage {
            ExportStage::Synthesizing => "synthesizing",
            ExportStage::Validating => "validating",
            ExportStage::Persisting => "writing",
            ExportStage::Complete => "done",
            ExportStage::Failed => "failed",
        };
        println!("  [{label}]");
    });

    let request = ExportRequest {
        timeline: &timeline,
        templates: &templates,
        catalogs: &catalogs,
        options,
        destination,
        sink: SinkOptions {
            pretty: true,
            write_meta_info: defaults.write_meta_info,
        },
    };

    let report = match export_and_persist(request, Some(progress)).await {
        Ok(report) => report,
        Err(e) => {
            println!("\nExport failed ({}): {e}", e.kind());
            return Err(e.into());
        }
    };

    for warning in &report.warnings {
        println!("  Warning: {warning}");
    }
    for warning in &report.validation.warnings {
        println!("  Warning: {warning}");
    }

    match report.persisted {
        Persisted::Written {
            path, meta_info, ..
        } => {
            println!("\nDraft written: {}", path.display());
            if let Some(meta) = meta_info {
                println!("  Meta info: {}", meta.display());
            }
        }
        Persisted::Download(payload) => {
            let path = PathBuf::from(&payload.file_name);
            std::fs::write(&path, &payload.bytes)?;
            println!(
                "\nDraft saved as {} ({}, {} bytes)",
                path.display(),
                payload.mime_type,
                payload.bytes.len()
            );
        }
    }

    Ok(())
}
