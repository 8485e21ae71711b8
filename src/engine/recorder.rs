//! WAV file recorder
//!
//! Writes rendered frames to mono 32-bit integer WAV files.

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::synth::Sample;

/// Shift from Q8.23 samples to full scale 32-bit PCM
const PCM_SHIFT: u32 = 8;

/// WAV file recorder
pub struct Recorder {
    writer: WavWriter<BufWriter<File>>,
    sample_rate: u32,
    samples_written: u64,
}

impl Recorder {
    /// Create a new recorder
    ///
    /// # Arguments
    /// * `path` - Output file path
    /// * `sample_rate` - Sample rate in Hz
    pub fn new(path: &Path, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Int,
        };

        let writer = WavWriter::create(path, spec)
            .with_context(|| format!("failed to create WAV file: {:?}", path))?;

        Ok(Self {
            writer,
            sample_rate,
            samples_written: 0,
        })
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of samples written
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Get the duration recorded in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples_written as f64 / self.sample_rate as f64
    }

    /// Write a single Q8.23 sample
    pub fn write_sample(&mut self, sample: Sample) -> Result<()> {
        self.writer
            .write_sample(sample << PCM_SHIFT)
            .context("failed to write sample")?;
        self.samples_written += 1;
        Ok(())
    }

    /// Write a frame of Q8.23 samples
    pub fn write_frame(&mut self, frame: &[Sample]) -> Result<()> {
        for &sample in frame {
            self.writer
                .write_sample(sample << PCM_SHIFT)
                .context("failed to write sample")?;
        }
        self.samples_written += frame.len() as u64;
        Ok(())
    }

    /// Finalize the WAV file
    ///
    /// This must be called to properly close the file and write the header.
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize().context("failed to finalize WAV file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::fixed::{SAMPLE_MAX, SAMPLE_MIN};
    use tempfile::NamedTempFile;

    #[test]
    fn test_recorder_creation() {
        let file = NamedTempFile::new().unwrap();
        let recorder = Recorder::new(file.path(), 48000).unwrap();

        assert_eq!(recorder.sample_rate(), 48000);
        assert_eq!(recorder.samples_written(), 0);
        assert_eq!(recorder.duration_secs(), 0.0);
    }

    #[test]
    fn test_recorder_write_frame() {
        let file = NamedTempFile::new().unwrap();
        let mut recorder = Recorder::new(file.path(), 48000).unwrap();

        recorder.write_frame(&[1, 2, 3, 4, 5]).unwrap();
        recorder.write_sample(-1).unwrap();

        assert_eq!(recorder.samples_written(), 6);
    }

    #[test]
    fn test_recorder_duration() {
        let file = NamedTempFile::new().unwrap();
        let mut recorder = Recorder::new(file.path(), 48000).unwrap();

        recorder.write_frame(&vec![0; 24000]).unwrap();

        assert!((recorder.duration_secs() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_recorder_rescales_to_32_bits() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        {
            let mut recorder = Recorder::new(&path, 48000).unwrap();
            recorder.write_frame(&[0, 1, -1, SAMPLE_MAX, SAMPLE_MIN]).unwrap();
            recorder.finalize().unwrap();
        }

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();

        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 48000);
        assert_eq!(spec.bits_per_sample, 32);
        assert_eq!(spec.sample_format, SampleFormat::Int);

        let samples: Vec<i32> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 256, -256, i32::MAX - 255, i32::MIN]);
    }
}
