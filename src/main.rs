//! glyphswarm viewer
//!
//! Opens a window where a particle swarm spells out each phrase in turn.
//!
//! Usage:
//!   glyphswarm [PHRASES]... [--config <file.json>] [--width <px>] [--height <px>]
//!              [--render-scale <factor>] [--seed <n>]

use std::error::Error;

use clap::Parser;
use glyphswarm::{EngineConfig, Viewer};

const DEFAULT_PHRASES: [&str; 3] = ["Hello", "glyphswarm", "Rust"];

#[derive(Parser)]
#[command(name = "glyphswarm")]
#[command(about = "Particle swarm that morphs between text phrases")]
struct Args {
    /// Phrases to cycle through
    phrases: Vec<String>,

    /// Engine configuration (JSON; missing fields use defaults)
    #[arg(long)]
    config: Option<String>,

    /// Window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Window height in logical pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Canvas resolution relative to the window
    #[arg(long, default_value_t = 1.0)]
    render_scale: f32,

    /// Random seed for a reproducible swarm
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            log::info!("loaded config from {}", path);
            EngineConfig::from_json(&json)?
        }
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let phrases = if args.phrases.is_empty() {
        DEFAULT_PHRASES.iter().map(|s| s.to_string()).collect()
    } else {
        args.phrases
    };

    Viewer::new(phrases)
        .with_config(config)
        .with_size(args.width, args.height)
        .with_render_scale(args.render_scale)
        .run()?;

    Ok(())
}
