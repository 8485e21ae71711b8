//! Sequence rendering
//!
//! Drives a [`Voice`] through a parsed [`Sequence`], one frame (a sixteenth
//! note) at a time, and hands the frames to a [`SampleSink`].

mod recorder;

pub use recorder::Recorder;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::config::SynthConfig;
use crate::sequence::{note_frequency, Event, FilterOverride, Note, Sequence};
use crate::synth::{Sample, SynthError, Voice};

/// Octave rank before the first rank update
pub const DEFAULT_RANK: i32 = 2;

/// Note length (in frames) before the first length update
pub const DEFAULT_LENGTH: u32 = 4;

/// Destination of rendered frames
pub trait SampleSink {
    fn write_frame(&mut self, frame: &[Sample]) -> Result<()>;
}

impl SampleSink for Vec<Sample> {
    fn write_frame(&mut self, frame: &[Sample]) -> Result<()> {
        self.extend_from_slice(frame);
        Ok(())
    }
}

impl SampleSink for Recorder {
    fn write_frame(&mut self, frame: &[Sample]) -> Result<()> {
        Recorder::write_frame(self, frame)
    }
}

/// Summary of a render
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub events: usize,
    pub frames: u64,
    /// Calls answered with `Busy` and retried on a later frame
    pub busy: usize,
    /// Calls still busy when their event ended
    pub dropped: usize,
}

/// Voice control applied at a frame boundary
#[derive(Debug, Clone, Copy)]
enum Control {
    Toggle(bool),
    Frequency(f64),
    Filter(FilterOverride),
    Sweep(f64),
}

/// Renders sequences with one configured voice
pub struct Engine {
    config: SynthConfig,
    voice: Voice,
    prefill: u32,
    postfill: u32,
}

impl Engine {
    /// Create a new engine with the given configuration
    pub fn new(config: SynthConfig) -> Result<Self> {
        let mut voice = Voice::new(&config.voice_params()).context("Failed to create voice")?;
        voice
            .set_intensity(config.intensity as f64)
            .context("Failed to set output intensity")?;

        Ok(Self {
            config,
            voice,
            prefill: 0,
            postfill: 0,
        })
    }

    /// Silent frames rendered before the sequence
    pub fn with_prefill(mut self, frames: u32) -> Self {
        self.prefill = frames;
        self
    }

    /// Silent frames rendered after the sequence
    pub fn with_postfill(mut self, frames: u32) -> Self {
        self.postfill = frames;
        self
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn voice(&self) -> &Voice {
        &self.voice
    }

    pub fn frame_size(&self) -> usize {
        self.voice.frame_size()
    }

    /// Render `sequence` into `sink`
    pub fn render<S: SampleSink + ?Sized>(
        &mut self,
        sequence: &Sequence,
        sink: &mut S,
    ) -> Result<RenderStats> {
        let mut stats = RenderStats::default();
        let mut rank = DEFAULT_RANK;
        let mut length = DEFAULT_LENGTH;

        self.render_silence(self.prefill, sink, &mut stats)?;

        for (index, event) in sequence.events.iter().enumerate() {
            let mut pending = controls(event, &mut rank)
                .with_context(|| format!("Event {}: invalid note", index + 1))?;
            if let Some(len) = event.length {
                length = len;
            }
            debug!(event = index + 1, note = ?event.note, rank, length, "playing event");

            for frame in 0..length {
                let frames_left = length - frame;
                let mut busy = Vec::new();
                for control in pending.drain(..) {
                    match self.apply(control, frames_left) {
                        Ok(()) => {}
                        Err(err) if err.is_retryable() => {
                            debug!(event = index + 1, ?control, %err, "retrying on next frame");
                            stats.busy += 1;
                            busy.push(control);
                        }
                        Err(err) => {
                            return Err(err)
                                .with_context(|| format!("Event {}: {:?} failed", index + 1, control));
                        }
                    }
                }
                pending = busy;
                self.render_frame(sink, &mut stats)?;
            }

            for control in pending {
                warn!(event = index + 1, ?control, "voice still busy at end of event, control dropped");
                stats.dropped += 1;
            }
            stats.events += 1;
        }

        self.render_silence(self.postfill, sink, &mut stats)?;
        Ok(stats)
    }

    fn render_silence<S: SampleSink + ?Sized>(
        &mut self,
        frames: u32,
        sink: &mut S,
        stats: &mut RenderStats,
    ) -> Result<()> {
        if frames == 0 {
            return Ok(());
        }
        self.voice.toggle(false)?;
        for _ in 0..frames {
            self.render_frame(sink, stats)?;
        }
        Ok(())
    }

    fn render_frame<S: SampleSink + ?Sized>(
        &mut self,
        sink: &mut S,
        stats: &mut RenderStats,
    ) -> Result<()> {
        let frame = self.voice.process();
        sink.write_frame(frame)?;
        stats.frames += 1;
        Ok(())
    }

    fn apply(&mut self, control: Control, frames_left: u32) -> Result<(), SynthError> {
        match control {
            Control::Toggle(on) => self.voice.toggle(on),
            Control::Frequency(f) => self.voice.set_frequency(f),
            Control::Filter(o) => {
                let current = self.voice.filter_parameters();
                self.voice.filter_update(
                    o.fc.unwrap_or(current.fc),
                    o.q.unwrap_or(current.q),
                    o.gain.unwrap_or(current.gain),
                )
            }
            Control::Sweep(target) => self.voice.filter_start_fc_sweep(target, frames_left as usize),
        }
    }
}

/// Voice calls requested by `event`, in application order.
///
/// Rests leave the running rank untouched.
fn controls(event: &Event, rank: &mut i32) -> Result<Vec<Control>> {
    let mut controls = Vec::with_capacity(4);

    if event.filter.has_update() {
        controls.push(Control::Filter(event.filter));
    }
    if let Some(target) = event.filter.sweep {
        controls.push(Control::Sweep(target));
    }

    match event.note {
        Note::Rest => controls.push(Control::Toggle(false)),
        Note::Name(name) => {
            *rank += event.rank_update;
            let frequency = note_frequency(*rank, &name)?;
            controls.push(Control::Frequency(frequency));
            controls.push(Control::Toggle(true));
        }
    }

    Ok(controls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::parse_sequence;
    use crate::synth::{Coupling, EnvelopeStage, Waveform};
    use tempfile::NamedTempFile;

    /// 80 samples per frame
    fn fast_config() -> SynthConfig {
        SynthConfig {
            tempo: 9000.0,
            attack_time: 0.5,
            decay_time: 0.5,
            release_time: 0.5,
            coupling: Coupling::None,
            ..SynthConfig::default()
        }
    }

    fn render(config: SynthConfig, text: &str) -> (Engine, Vec<Sample>, RenderStats) {
        let sequence = parse_sequence(text).unwrap();
        let mut engine = Engine::new(config).unwrap();
        let mut out = Vec::new();
        let stats = engine.render(&sequence, &mut out).unwrap();
        (engine, out, stats)
    }

    #[test]
    fn test_engine_creation() {
        let engine = Engine::new(SynthConfig::default()).unwrap();
        assert_eq!(engine.frame_size(), 7659);
        assert_eq!(engine.voice().sample_rate(), 48000.0);
        assert!((engine.voice().intensity() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_default_length_and_rank() {
        let (engine, out, stats) = render(fast_config(), "a");
        assert_eq!(out.len(), 4 * 80);
        assert_eq!(stats.frames, 4);
        assert_eq!(stats.events, 1);

        // A2
        assert!((engine.voice().frequency() - 110.0).abs() < 1e-9);
        assert!(out.iter().any(|&s| s != 0));
    }

    #[test]
    fn test_lengths_persist() {
        let (_, out, _) = render(fast_config(), "c8 d e1 f");
        assert_eq!(out.len(), (8 + 8 + 1 + 1) * 80);
    }

    #[test]
    fn test_rank_updates_accumulate() {
        let (engine, _, _) = render(fast_config(), "c' r,, a'");
        // Rests ignore their rank update: 2 + 1 + 1
        assert!((engine.voice().frequency() - 440.0).abs() < 1e-9);
    }

    #[test]
    fn test_rest_releases_note() {
        let (engine, out, _) = render(fast_config(), "c4 r8");
        assert_eq!(engine.voice().envelope().stage(), EnvelopeStage::Idle);

        let peak = |samples: &[Sample]| samples.iter().map(|s| s.abs()).max().unwrap_or(0);
        assert!(peak(&out[out.len() - 80..]) < peak(&out) / 100);
    }

    #[test]
    fn test_prefill_and_postfill() {
        let sequence = parse_sequence("g4").unwrap();
        let mut engine = Engine::new(fast_config())
            .unwrap()
            .with_prefill(2)
            .with_postfill(3);
        let mut out = Vec::new();
        let stats = engine.render(&sequence, &mut out).unwrap();

        assert_eq!(stats.frames, 2 + 4 + 3);
        assert!(out[..160].iter().all(|&s| s == 0));
        assert_eq!(engine.voice().envelope().stage(), EnvelopeStage::Idle);
    }

    #[test]
    fn test_filter_directives() {
        let (engine, _, _) = render(fast_config(), "\\fc=900 \\q=2 c4 \\gain=3 d");
        let params = engine.voice().filter_parameters();
        assert_eq!(params.fc, 900.0);
        assert_eq!(params.q, 2.0);
        assert_eq!(params.gain, 3.0);
    }

    #[test]
    fn test_sweep_lands_by_end_of_event() {
        let (engine, _, stats) = render(fast_config(), "\\sweep=2500 c16");
        assert_eq!(engine.voice().filter_parameters().fc, 2500.0);
        assert_eq!(stats.dropped, 0);
    }

    #[test]
    fn test_busy_frequency_is_retried() {
        let config = SynthConfig {
            waveform: Waveform::Sine,
            ..fast_config()
        };
        let (engine, _, stats) = render(config, "a1 b1 c'16");

        assert!(stats.busy > 0);
        assert_eq!(stats.dropped, 0);
        assert!((engine.voice().frequency() - 130.8127826502993).abs() < 1e-9);
    }

    #[test]
    fn test_busy_control_dropped_at_end_of_event() {
        let config = SynthConfig {
            waveform: Waveform::Sine,
            ..fast_config()
        };
        let (engine, _, stats) = render(config, "a1 b1 c'1");

        assert!(stats.dropped > 0);
        assert!((engine.voice().frequency() - 123.47082531403103).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_rank_aborts() {
        let sequence = parse_sequence("c''''''''").unwrap();
        let mut engine = Engine::new(fast_config()).unwrap();
        let mut out = Vec::new();
        let err = engine.render(&sequence, &mut out).unwrap_err();
        assert!(format!("{:#}", err).contains("rank 10"));
    }

    #[test]
    fn test_invalid_cutoff_aborts() {
        let sequence = parse_sequence("\\fc=30000 c").unwrap();
        let mut engine = Engine::new(fast_config()).unwrap();
        let mut out = Vec::new();
        assert!(engine.render(&sequence, &mut out).is_err());
    }

    #[test]
    fn test_render_to_wav() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let sequence = parse_sequence("c4 e g c'8 r4").unwrap();
        let mut engine = Engine::new(fast_config()).unwrap();
        let mut recorder = Recorder::new(&path, 48000).unwrap();
        let stats = engine.render(&sequence, &mut recorder).unwrap();
        assert_eq!(recorder.samples_written(), stats.frames * 80);
        recorder.finalize().unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len() as u64, stats.frames * 80);
        let samples: Vec<i32> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert!(samples.iter().any(|&s| s != 0));
        assert!(samples.iter().all(|&s| s % 256 == 0));
    }
}
