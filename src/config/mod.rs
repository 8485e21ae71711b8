//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<SynthConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: SynthConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{Coupling, Waveform};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_config() {
        let yaml = r#"
tempo: 120
sample_rate: 44100
waveform: square
coupling: octave
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.tempo, 120.0);
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.waveform, Waveform::Square);
        assert_eq!(config.coupling, Coupling::Octave);
        assert_eq!(config.lp_fc, 400.0);
    }

    #[test]
    fn test_load_example_config() {
        let example = include_str!("../../lilymoog.example.yaml");
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(example.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config, SynthConfig::default());
    }

    #[test]
    fn test_load_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"sustain: 2.0\n").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_load_missing_config() {
        assert!(load_config(Path::new("/nonexistent/lilymoog.yaml")).is_err());
    }
}
