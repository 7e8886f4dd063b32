use anyhow::{anyhow, Context, Result};
use clap::Parser;
use neurofm::runtime::{native, RunOptions};
use neurofm::synth::config::{SynthConfig, VelocityMode};
use neurofm::synth::preset::{builtin_preset, Preset};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "neurofm", version, about = "Monophonic FM bass synth")]
struct Cli {
    /// TOML engine configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Built-in preset name or path to a preset JSON file
    #[arg(long)]
    preset: Option<String>,

    /// Scala (.scl) file to tune to
    #[arg(long)]
    scale: Option<PathBuf>,

    /// MIDI note that plays the scale's first degree
    #[arg(long)]
    root: Option<i32>,

    #[arg(long)]
    bpm: Option<f32>,

    /// Start the step sequencer with the demo pattern
    #[arg(long)]
    sequence: bool,

    #[arg(long)]
    no_midi: bool,

    /// Run the distortion stage at 4x
    #[arg(long)]
    oversample: bool,

    /// fixed, random or accent
    #[arg(long)]
    velocity_mode: Option<VelocityMode>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SynthConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SynthConfig::default(),
    };
    if cli.oversample {
        config.oversample = true;
    }
    if let Some(mode) = cli.velocity_mode {
        config.velocity_mode = mode;
    }

    let preset = cli.preset.as_deref().map(load_preset).transpose()?;
    if let Some(preset) = &preset {
        info!("Preset: {}", preset.name);
    }

    let scale = match &cli.scale {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading scale {}", path.display()))?;
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Custom".to_string());
            Some((name, text))
        }
        None => None,
    };

    native::start(RunOptions {
        config,
        preset,
        scale,
        root: cli.root,
        bpm: cli.bpm,
        sequence: cli.sequence,
        midi: !cli.no_midi,
    })?;
    Ok(())
}

fn load_preset(arg: &str) -> Result<Preset> {
    let path = Path::new(arg);
    if path.extension().is_some_and(|ext| ext == "json") || path.is_file() {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading preset {}", path.display()))?;
        return Ok(Preset::from_json(&json)?);
    }
    builtin_preset(arg).ok_or_else(|| anyhow!("no built-in preset named '{arg}'"))
}
