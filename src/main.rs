//! lilymoog - Moog-style synthesizer for lilypond-like note sequences

use anyhow::Result;
use clap::Parser;
use lilymoog::config;
use lilymoog::engine::{Engine, Recorder};
use lilymoog::sequence;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Render {
            config: config_path,
            script,
            output,
            prefill,
            postfill,
        } => {
            info!("Loading configuration from {:?}", config_path);
            let cfg = config::load_config(&config_path)?;

            info!("Parsing sequence from {:?}", script);
            let seq = sequence::load_sequence(&script)?;
            info!(events = seq.len(), "Sequence parsed");

            let sample_rate = cfg.sample_rate;
            let mut engine = Engine::new(cfg)?
                .with_prefill(prefill)
                .with_postfill(postfill);
            info!(
                sample_rate,
                frame_size = engine.frame_size(),
                "Rendering to {:?}",
                output
            );

            let mut recorder = Recorder::new(&output, sample_rate)?;
            let stats = engine.render(&seq, &mut recorder)?;
            let duration = recorder.duration_secs();
            recorder.finalize()?;

            info!(
                frames = stats.frames,
                busy = stats.busy,
                dropped = stats.dropped,
                "Rendered {:.2}s to {:?}",
                duration,
                output
            );
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    println!("  Tempo: {} bpm", cfg.tempo);
                    println!("  Sample rate: {} Hz", cfg.sample_rate);
                    println!("  Frame size: {} samples", cfg.frame_size());
                    println!(
                        "  Low-pass: fc={} Hz, Q={}, gain={}",
                        cfg.lp_fc, cfg.lp_q, cfg.lp_gain
                    );
                    println!(
                        "  ADSR: attack={} ms, decay={} ms, sustain={}, release={} ms",
                        cfg.attack_time, cfg.decay_time, cfg.sustain, cfg.release_time
                    );
                    println!("  Waveform: {:?}", cfg.waveform);
                    println!("  Coupling: {:?}", cfg.coupling);
                    println!("  Intensity: {}", cfg.intensity);
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let example_config = include_str!("../lilymoog.example.yaml");

            let path = "lilymoog.yaml";
            if std::path::Path::new(path).exists() {
                println!("lilymoog.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, example_config)?;
                println!("Created lilymoog.yaml with example configuration.");
            }
        }
    }

    Ok(())
}
