//! Offline TTS: piper subprocess → raw PCM → rodio playback.
//!
//! Pipeline:
//! 1. Message → piper stdin (one line)
//! 2. piper `--output-raw` → signed 16-bit little-endian mono PCM on stdout
//! 3. PCM → f32 samples
//! 4. Samples → rodio Sink at the voice's sample rate, scaled by volume

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStreamBuilder, Sink};
use tracing::{debug, info};

use crate::announcer::Announcer;
use crate::config::SpeechConfig;
use crate::error::{RelayError, Result};
use crate::event::NotificationEvent;

/// Where synthesized audio ends up.
pub trait AudioOutput {
    fn play(&self, samples: Vec<f32>, sample_rate: u32, volume: f32) -> Result<()>;
}

/// Default system output via rodio. Blocks until playback finishes.
pub struct RodioOutput;

impl AudioOutput for RodioOutput {
    fn play(&self, samples: Vec<f32>, sample_rate: u32, volume: f32) -> Result<()> {
        // SamplesBuffer asserts on a zero rate
        if sample_rate == 0 {
            return Err(RelayError::Playback("sample rate must be positive".into()));
        }

        let stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| RelayError::Playback(format!("Failed to open audio output: {e}")))?;

        // rodio 0.21: Sink::connect_new takes &Mixer
        let sink = Sink::connect_new(stream.mixer());
        sink.set_volume(volume);
        sink.append(SamplesBuffer::new(1, sample_rate, samples));
        sink.sleep_until_end();

        Ok(())
    }
}

pub struct PiperSpeaker<O = RodioOutput> {
    config: SpeechConfig,
    output: O,
}

impl PiperSpeaker<RodioOutput> {
    pub fn new(config: SpeechConfig) -> Self {
        Self::with_output(config, RodioOutput)
    }
}

impl<O: AudioOutput> PiperSpeaker<O> {
    pub fn with_output(config: SpeechConfig, output: O) -> Self {
        Self { config, output }
    }

    /// The synthesizer executable this speaker will run, if it exists.
    pub fn binary_path(&self) -> Option<PathBuf> {
        which::which(&self.config.binary).ok()
    }

    pub fn synthesis_args(&self) -> Vec<OsString> {
        vec![
            "--model".into(),
            self.config.model_path.clone().into_os_string(),
            "--config".into(),
            self.config.resolved_config_path().into_os_string(),
            "--length_scale".into(),
            self.config.length_scale.to_string().into(),
            "--output-raw".into(),
        ]
    }

    /// Run the synthesizer once and collect its PCM output as samples.
    pub fn synthesize(&self, binary: &Path, text: &str) -> Result<Vec<f32>> {
        let mut child = Command::new(binary)
            .args(self.synthesis_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RelayError::Synthesis(format!("Failed to spawn {}: {e}", binary.display())))?;

        // piper reads one utterance per line; stdin is closed when the handle drops
        let written = child.stdin.take().map_or(Ok(()), |mut stdin| {
            let line = text.replace(['\r', '\n'], " ");
            writeln!(stdin, "{line}")
        });

        // Always reap the child: an early exit (EPIPE above) explains itself on stderr.
        let output = child
            .wait_with_output()
            .map_err(|e| RelayError::Synthesis(format!("Synthesizer failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RelayError::Synthesis(format!(
                "{} exited with {}: {}",
                binary.display(),
                output.status,
                stderr.trim()
            )));
        }
        written.map_err(|e| RelayError::Synthesis(format!("Failed to write to synthesizer: {e}")))?;

        Ok(decode_pcm_s16le(&output.stdout))
    }
}

impl<O: AudioOutput> Announcer for PiperSpeaker<O> {
    fn name(&self) -> &'static str {
        "speech"
    }

    fn is_available(&self) -> bool {
        if !self.config.enabled {
            return false;
        }
        match self.binary_path() {
            Some(path) => {
                debug!("Synthesizer found at {}", path.display());
                true
            }
            None => {
                debug!("Synthesizer '{}' not found", self.config.binary);
                false
            }
        }
    }

    fn announce(&self, event: &NotificationEvent) -> Result<()> {
        if self.config.sample_rate == 0 {
            return Err(RelayError::Playback("speech.sample_rate must be positive".into()));
        }

        let binary = self
            .binary_path()
            .ok_or_else(|| RelayError::Synthesis(format!("'{}' not found", self.config.binary)))?;

        let t_gen = Instant::now();
        let samples = self.synthesize(&binary, &event.message)?;
        let gen_ms = t_gen.elapsed().as_millis();

        if samples.is_empty() {
            debug!("Synthesizer produced no audio");
            return Ok(());
        }

        info!(
            "Synthesized {:.1}s of audio in {gen_ms}ms",
            samples.len() as f32 / self.config.sample_rate as f32
        );

        self.output
            .play(samples, self.config.sample_rate, self.config.volume)
    }
}

/// Convert signed 16-bit little-endian PCM to f32 in [-1, 1).
/// A trailing odd byte is dropped.
pub fn decode_pcm_s16le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect()
}
