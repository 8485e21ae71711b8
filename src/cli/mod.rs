//! CLI interface for lilymoog

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Render lilypond-like note sequences with a Moog-style synthesizer
#[derive(Parser)]
#[command(name = "lilymoog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a sequence to a WAV file
    Render {
        /// Configuration file path
        #[arg(short, long, default_value = "lilymoog.yaml")]
        config: PathBuf,

        /// Sequence file path
        #[arg(short, long)]
        script: PathBuf,

        /// Output file path
        #[arg(short, long, default_value = "output.wav")]
        output: PathBuf,

        /// Silence inserted before the sequence, in sixteenth notes
        #[arg(short, long, default_value = "0")]
        prefill: u32,

        /// Silence inserted after the sequence, in sixteenth notes
        #[arg(short = 'P', long, default_value = "0")]
        postfill: u32,
    },

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "lilymoog.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from([
            "lilymoog", "render", "-c", "synth.yaml", "-s", "song.ly", "-p", "4", "-P", "8",
        ])
        .unwrap();
        assert!(!cli.verbose);
        match cli.command {
            Commands::Render {
                config,
                script,
                output,
                prefill,
                postfill,
            } => {
                assert_eq!(config, PathBuf::from("synth.yaml"));
                assert_eq!(script, PathBuf::from("song.ly"));
                assert_eq!(output, PathBuf::from("output.wav"));
                assert_eq!(prefill, 4);
                assert_eq!(postfill, 8);
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn test_render_requires_script() {
        assert!(Cli::try_parse_from(["lilymoog", "render", "-c", "synth.yaml"]).is_err());
    }

    #[test]
    fn test_negative_prefill_rejected() {
        assert!(Cli::try_parse_from(["lilymoog", "render", "-s", "a.ly", "-p", "-1"]).is_err());
    }

    #[test]
    fn test_verbose_flag() {
        let cli = Cli::try_parse_from(["lilymoog", "check", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
