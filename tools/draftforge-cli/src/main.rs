//! Draftforge CLI: build timelines and export editor drafts.
//!
//! Usage:
//!   draftforge init <MEDIA>...        Build a timeline file from media files
//!   draftforge export <TIMELINE>      Export a timeline to draft_content.json
//!   draftforge validate <DRAFT>       Validate a draft document
//!   draftforge info <DRAFT>           Summarize a draft document
//!   draftforge catalog [KIND]         List bundled effects, transitions, animations

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use draftforge_common::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "draftforge",
    about = "Turn clip timelines into video editor drafts",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a timeline file from media files
    Init {
        /// Image and video files, in playback order
        #[arg(required = true)]
        media: Vec<PathBuf>,

        /// Timeline file to write
        #[arg(short, long, default_value = "timeline.json")]
        output: PathBuf,

        /// Seconds each image stays on screen
        #[arg(long)]
        image_secs: Option<f64>,

        /// Seconds used for each video clip
        #[arg(long)]
        video_secs: Option<f64>,
    },

    /// Export a timeline to a draft
    Export {
        /// Timeline file
        timeline: PathBuf,

        /// Base draft template
        #[arg(long)]
        base: Option<PathBuf>,

        /// Effect definitions template
        #[arg(long)]
        effects: Option<PathBuf>,

        /// Transition definitions template
        #[arg(long)]
        transitions: Option<PathBuf>,

        /// Draft project folder to write into
        #[arg(short, long, conflicts_with = "download")]
        project_dir: Option<PathBuf>,

        /// Write the draft into the current directory as a download
        #[arg(long)]
        download: bool,

        /// Draft name
        #[arg(short, long)]
        name: Option<String>,

        /// Target schema
        #[arg(long, value_enum)]
        schema: Option<SchemaArg>,

        /// Custom catalog file replacing the bundled one
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Validate a draft document
    Validate {
        /// Path to draft_content.json
        path: PathBuf,

        /// Expected number of clips
        #[arg(long)]
        clips: Option<usize>,
    },

    /// Summarize a draft document
    Info {
        /// Path to draft_content.json
        path: PathBuf,
    },

    /// List catalog entries
    Catalog {
        /// Which catalog to list (all when omitted)
        #[arg(value_enum)]
        kind: Option<CatalogArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaArg {
    Modern,
    Legacy,
}

#[derive(Clone, Copy, ValueEnum)]
enum CatalogArg {
    Effects,
    Transitions,
    Animations,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    draftforge_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Init {
            media,
            output,
            image_secs,
            video_secs,
        } => commands::init::run(&config, media, output, image_secs, video_secs),
        Commands::Export {
            timeline,
            base,
            effects,
            transitions,
            project_dir,
            download,
            name,
            schema,
            catalog,
        } => {
            let args = commands::export::ExportArgs {
                timeline,
                base,
                effects,
                transitions,
                project_dir,
                download,
                name,
                schema: schema.map(|s| match s {
                    SchemaArg::Modern => draftforge_common::SchemaTarget::Modern,
                    SchemaArg::Legacy => draftforge_common::SchemaTarget::Legacy,
                }),
                catalog,
            };
            commands::export::run(&config, args).await
        }
        Commands::Validate { path, clips } => commands::validate::run(path, clips),
        Commands::Info { path } => commands::info::run(path),
        Commands::Catalog { kind } => commands::catalog::run(kind.map(|k| match k {
            CatalogArg::Effects => draftforge_project_model::CatalogKind::Effect,
            CatalogArg::Transitions => draftforge_project_model::CatalogKind::Transition,
            CatalogArg::Animations => draftforge_project_model::CatalogKind::Animation,
        })),
    }
}
