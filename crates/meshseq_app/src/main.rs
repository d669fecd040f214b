// SPDX-License-Identifier: MIT OR Apache-2.0
//! `meshseq` - mesh sequence to shape-key animation
//!
//! Command-line front end for the sequencer:
//! - `import` turns a directory of numbered frame files into objects
//! - `reload` re-ingests objects from the sources stored on them
//! - `info` summarises the objects of a scene
//!
//! Objects are kept in RON scene documents.

mod obj;
mod scene;
mod summary;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use meshseq_sequencer::{
    Axis, FrameFormat, ImportSettings, LogProgress, SequenceSource, SequenceState,
    ShapeKeySequencer,
};
use obj::WavefrontImporter;
use scene::SceneDocument;
use std::path::{Path, PathBuf};
use summary::ObjectSummary;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(
    name = "meshseq",
    version,
    about = "Turn numbered mesh files into a shape-key animated object"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a frame sequence into a scene
    Import {
        /// Directory holding the frame files
        directory: PathBuf,

        /// Scene file to add the objects to (created if missing)
        #[arg(long)]
        scene: PathBuf,

        /// Literal file name prefix shared by the frames
        #[arg(long, default_value = "")]
        prefix: String,

        /// Frame file format: obj, stl or ply
        #[arg(long, default_value = "obj")]
        format: FrameFormat,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Reload objects from their stored sequence sources
    Reload {
        /// Scene file
        scene: PathBuf,

        /// Object to reload; every reloadable object if omitted
        #[arg(long)]
        object: Option<String>,
    },

    /// Show the objects of a scene
    Info {
        /// Scene file
        scene: PathBuf,

        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Also show the shape key active at this frame
        #[arg(long)]
        frame: Option<u32>,
    },
}

/// Import settings: a RON file plus command-line overrides
#[derive(Args, Default)]
struct SettingsArgs {
    /// RON settings file; command-line options override it
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Uniform scale for the chosen format
    #[arg(long)]
    scale: Option<f32>,

    /// OBJ clamp size (0 disables)
    #[arg(long)]
    clamp_size: Option<f32>,

    /// Forward axis, e.g. -Z
    #[arg(long, allow_hyphen_values = true)]
    forward: Option<Axis>,

    /// Up axis, e.g. Y
    #[arg(long, allow_hyphen_values = true)]
    up: Option<Axis>,

    /// Split OBJ files by group as well as by object
    #[arg(long, default_value_t = false)]
    split_groups: bool,
}

impl SettingsArgs {
    /// Final settings for importing `format`
    fn resolve(&self, format: FrameFormat) -> Result<ImportSettings> {
        let mut settings = match &self.settings {
            Some(path) => ImportSettings::load(path)
                .with_context(|| format!("loading settings {}", path.display()))?,
            None => ImportSettings::default(),
        };
        if let Some(scale) = self.scale {
            match format {
                FrameFormat::Obj => settings.obj.global_scale = scale,
                FrameFormat::Stl => settings.stl.global_scale = scale,
                FrameFormat::Ply => settings.ply.global_scale = scale,
            }
        }
        if let Some(clamp_size) = self.clamp_size {
            settings.obj.clamp_size = clamp_size;
        }
        if let Some(forward) = self.forward {
            settings.axis_forward = forward;
        }
        if let Some(up) = self.up {
            settings.axis_up = up;
        }
        if self.split_groups {
            settings.obj.use_split_groups = true;
        }
        Ok(settings)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    tracing::debug!("meshseq v{}", env!("CARGO_PKG_VERSION"));

    match cli.cmd {
        Commands::Import {
            directory,
            scene,
            prefix,
            format,
            settings,
        } => {
            let import_settings = settings.resolve(format)?;
            let source = SequenceSource::new(directory, prefix, format);
            let added = run_import(&scene, &source, &import_settings)?;
            tracing::info!("Added {} object(s) to {}", added.len(), scene.display());
        }

        Commands::Reload { scene, object } => {
            let reloaded = run_reload(&scene, object.as_deref())?;
            tracing::info!("Reloaded {reloaded} object(s) in {}", scene.display());
        }

        Commands::Info { scene, json, frame } => print!("{}", render_info(&scene, json, frame)?),
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        tracing_subscriber::EnvFilter::new(format!(
            "meshseq_app={level},meshseq_sequencer={level}"
        ))
    });

    // Logs go to stderr so `info --json` output stays parseable
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Import into a scene, appending to it if it exists; returns the new object names
fn run_import(
    scene_path: &Path,
    source: &SequenceSource,
    settings: &ImportSettings,
) -> Result<Vec<String>> {
    let mut scene = SceneDocument::load_or_new(scene_path)
        .with_context(|| format!("loading scene {}", scene_path.display()))?;

    let objects = ShapeKeySequencer::new()
        .import(source, settings, &mut WavefrontImporter::new(), &mut LogProgress::new())
        .with_context(|| {
            format!(
                "importing {} from {}",
                source.file_mask(),
                source.directory.display()
            )
        })?;

    let mut added = Vec::with_capacity(objects.len());
    for object in objects {
        let id = scene.add_object(object);
        if let Some(object) = scene.objects.iter().find(|o| o.id == id) {
            added.push(object.name.clone());
        }
    }
    scene
        .save(scene_path)
        .with_context(|| format!("saving scene {}", scene_path.display()))?;
    Ok(added)
}

/// Reload one named object, or every Initialized one; returns how many were reloaded
fn run_reload(scene_path: &Path, name: Option<&str>) -> Result<usize> {
    let mut scene = SceneDocument::load(scene_path)
        .with_context(|| format!("loading scene {}", scene_path.display()))?;
    let sequencer = ShapeKeySequencer::new();
    let mut importer = WavefrontImporter::new();
    let mut progress = LogProgress::new();

    let reloaded = match name {
        Some(name) => {
            let Some(object) = scene.find_mut(name) else {
                bail!("No object named {name} in {}", scene_path.display());
            };
            sequencer
                .reload(object, &mut importer, &mut progress)
                .with_context(|| format!("reloading {name}"))?;
            1
        }
        None => {
            let mut reloaded = 0;
            for object in &mut scene.objects {
                if object.sequence_state() != SequenceState::Initialized {
                    tracing::debug!("Skipping {}: not a sequence object", object.name);
                    continue;
                }
                sequencer
                    .reload(object, &mut importer, &mut progress)
                    .with_context(|| format!("reloading {}", object.name))?;
                reloaded += 1;
            }
            if reloaded == 0 {
                bail!("No reloadable objects in {}", scene_path.display());
            }
            reloaded
        }
    };

    scene
        .save(scene_path)
        .with_context(|| format!("saving scene {}", scene_path.display()))?;
    Ok(reloaded)
}

/// Text (one line per object) or pretty JSON describing a scene
fn render_info(scene_path: &Path, json: bool, frame: Option<u32>) -> Result<String> {
    let scene = SceneDocument::load(scene_path)
        .with_context(|| format!("loading scene {}", scene_path.display()))?;
    let sequencer = ShapeKeySequencer::new();
    let summaries: Vec<ObjectSummary> = scene
        .objects
        .iter()
        .map(|object| {
            let summary = ObjectSummary::new(object, &sequencer);
            match frame {
                Some(frame) => summary.at_frame(object, frame),
                None => summary,
            }
        })
        .collect();

    if json {
        let mut out = serde_json::to_string_pretty(&summaries)?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(summaries.iter().map(|s| format!("{s}\n")).collect())
    }
}
