//! Speech reader: espeak-ng synthesis with rodio playback.
//!
//! At most one primary utterance exists at a time, driven as a small
//! state machine (Idle / Speaking / Paused). Short feedback phrases play
//! on a dedicated queueing sink outside the state machine, so feedback
//! can overlap the primary utterance.

use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::SpeechConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechState {
    Idle,
    Speaking,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpeechEvent {
    Speak,
    Pause,
    Resume,
    Stop,
    PlaybackEnded,
}

/// Transition table for the primary utterance. None means the event is a
/// no-op in the current state.
fn next_state(state: SpeechState, event: SpeechEvent) -> Option<SpeechState> {
    use SpeechEvent::*;
    use SpeechState::*;

    match (state, event) {
        // Speak always wins: an active utterance is stopped first.
        (_, Speak) => Some(Speaking),
        (Speaking, Pause) => Some(Paused),
        (Paused, Resume) => Some(Speaking),
        (Speaking | Paused, Stop) => Some(Idle),
        (Speaking, PlaybackEnded) => Some(Idle),
        _ => None,
    }
}

/// Decoded espeak-ng output ready for a rodio sink.
struct DecodedWav {
    channels: u16,
    sample_rate: u32,
    samples: Vec<f32>,
}

fn decode_wav(bytes: &[u8]) -> Result<DecodedWav, String> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| format!("Failed to parse WAV output: {e}"))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        // i16 [-32768, 32767] → f32 [-1, 1]
        hound::SampleFormat::Int => reader
            .samples::<i16>()
            .filter_map(Result::ok)
            .map(|s| f32::from(s) / 32768.0)
            .collect(),
        hound::SampleFormat::Float => reader.samples::<f32>().filter_map(Result::ok).collect(),
    };

    Ok(DecodedWav {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        samples,
    })
}

/// Owner of the primary utterance. The generation counter lets the
/// playback-end watcher detect that it has been superseded by a newer
/// speak or stop.
struct Session {
    state: SpeechState,
    sink: Option<Sink>,
    generation: u64,
}

pub struct SpeechReader {
    config: SpeechConfig,
    output_stream: Option<OutputStream>,
    feedback: Option<Sink>,
    session: Arc<Mutex<Session>>,
}

impl SpeechReader {
    /// Open the audio output. When the device cannot be opened (or speech
    /// is disabled in config) the reader runs in disabled mode: all
    /// operations become no-ops.
    pub fn new(config: SpeechConfig) -> Self {
        let output_stream = if config.enabled {
            match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => Some(stream),
                Err(e) => {
                    warn!("Failed to open audio output: {e}");
                    info!("Speech disabled — continuing without voice output");
                    None
                }
            }
        } else {
            None
        };

        // Feedback phrases queue on their own sink, independent of the
        // primary utterance.
        let feedback = output_stream
            .as_ref()
            .map(|stream| Sink::connect_new(stream.mixer()));

        Self {
            config,
            output_stream,
            feedback,
            session: Arc::new(Mutex::new(Session {
                state: SpeechState::Idle,
                sink: None,
                generation: 0,
            })),
        }
    }

    pub fn state(&self) -> SpeechState {
        self.session.lock().unwrap().state
    }

    /// Speak text aloud, stopping any active utterance first.
    pub async fn speak(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        // Stop-then-start: cancel before synthesis so the old utterance
        // does not keep playing while espeak runs.
        self.stop();

        let Some(stream) = &self.output_stream else {
            return;
        };

        let wav = match self.synthesize(text).await {
            Ok(wav) => wav,
            Err(e) => {
                warn!("Speech synthesis failed: {e}");
                return;
            }
        };
        if wav.samples.is_empty() {
            return;
        }

        let generation = {
            let mut session = self.session.lock().unwrap();
            if let Some(old) = session.sink.take() {
                old.stop();
            }
            let sink = Sink::connect_new(stream.mixer());
            sink.append(SamplesBuffer::new(wav.channels, wav.sample_rate, wav.samples));
            session.sink = Some(sink);
            session.state = SpeechState::Speaking;
            session.generation += 1;
            session.generation
        };
        debug!("Speaking {} chars", text.chars().count());

        // Watcher: return the session to Idle when playback drains.
        let session = Arc::clone(&self.session);
        tokio::task::spawn_blocking(move || loop {
            {
                let mut session = session.lock().unwrap();
                if session.generation != generation {
                    return;
                }
                let drained = session.sink.as_ref().map_or(true, Sink::empty);
                if drained {
                    if let Some(next) = next_state(session.state, SpeechEvent::PlaybackEnded) {
                        session.state = next;
                    }
                    session.sink = None;
                    debug!("Playback finished");
                    return;
                }
            }
            std::thread::sleep(Duration::from_millis(50));
        });
    }

    /// Pause playback. No-op unless speaking.
    pub fn pause(&self) {
        let mut session = self.session.lock().unwrap();
        if let Some(next) = next_state(session.state, SpeechEvent::Pause) {
            if let Some(sink) = &session.sink {
                sink.pause();
            }
            session.state = next;
            debug!("Speech paused");
        }
    }

    /// Resume playback. No-op unless paused.
    pub fn resume(&self) {
        let mut session = self.session.lock().unwrap();
        if let Some(next) = next_state(session.state, SpeechEvent::Resume) {
            if let Some(sink) = &session.sink {
                sink.play();
            }
            session.state = next;
            debug!("Speech resumed");
        }
    }

    /// Stop the primary utterance. No-op when idle.
    pub fn stop(&self) {
        let mut session = self.session.lock().unwrap();
        if let Some(next) = next_state(session.state, SpeechEvent::Stop) {
            if let Some(sink) = session.sink.take() {
                sink.stop();
            }
            session.state = next;
            session.generation += 1;
            debug!("Speech stopped");
        }
    }

    /// Queue a short status phrase on the feedback sink. Never touches the
    /// primary utterance; overlapping audio is possible by design.
    pub async fn say_feedback(&self, phrase: &str) {
        let Some(feedback) = &self.feedback else {
            return;
        };

        match self.synthesize(phrase).await {
            Ok(wav) if !wav.samples.is_empty() => {
                feedback.append(SamplesBuffer::new(wav.channels, wav.sample_rate, wav.samples));
            }
            Ok(_) => {}
            Err(e) => warn!("Feedback synthesis failed: {e}"),
        }
    }

    /// Run espeak-ng and decode its WAV output.
    async fn synthesize(&self, text: &str) -> Result<DecodedWav, String> {
        let output = Command::new(&self.config.engine)
            .arg("--stdout")
            .arg("-v")
            .arg(&self.config.voice)
            .arg("-s")
            .arg(self.config.rate.to_string())
            .arg("-p")
            .arg(self.config.pitch.to_string())
            .arg("-a")
            .arg(self.config.volume.to_string())
            .arg(text)
            .output()
            .await
            .map_err(|e| format!("Failed to run {}: {e}", self.config.engine))?;

        if !output.status.success() {
            return Err(format!("{} exited with {}", self.config.engine, output.status));
        }

        decode_wav(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SpeechEvent::*;
    use SpeechState::*;

    #[test]
    fn full_reading_cycle() {
        let mut state = Idle;
        for (event, expected) in [
            (Speak, Speaking),
            (Pause, Paused),
            (Resume, Speaking),
            (Stop, Idle),
        ] {
            state = next_state(state, event).unwrap();
            assert_eq!(state, expected);
        }
    }

    #[test]
    fn pause_while_idle_is_noop() {
        assert_eq!(next_state(Idle, Pause), None);
        assert_eq!(next_state(Paused, Pause), None);
    }

    #[test]
    fn resume_while_speaking_is_noop() {
        assert_eq!(next_state(Speaking, Resume), None);
        assert_eq!(next_state(Idle, Resume), None);
    }

    #[test]
    fn stop_ends_speaking_and_paused() {
        assert_eq!(next_state(Speaking, Stop), Some(Idle));
        assert_eq!(next_state(Paused, Stop), Some(Idle));
        assert_eq!(next_state(Idle, Stop), None);
    }

    #[test]
    fn playback_end_only_applies_while_speaking() {
        assert_eq!(next_state(Speaking, PlaybackEnded), Some(Idle));
        assert_eq!(next_state(Paused, PlaybackEnded), None);
        assert_eq!(next_state(Idle, PlaybackEnded), None);
    }

    #[test]
    fn speak_preempts_any_state() {
        assert_eq!(next_state(Idle, Speak), Some(Speaking));
        assert_eq!(next_state(Speaking, Speak), Some(Speaking));
        assert_eq!(next_state(Paused, Speak), Some(Speaking));
    }

    #[test]
    fn decodes_int16_wav() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut bytes = Vec::new();
        {
            let mut writer =
                hound::WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
            writer.write_sample(0i16).unwrap();
            writer.write_sample(16384i16).unwrap();
            writer.finalize().unwrap();
        }

        let wav = decode_wav(&bytes).unwrap();
        assert_eq!(wav.channels, 1);
        assert_eq!(wav.sample_rate, 22050);
        assert_eq!(wav.samples.len(), 2);
        assert!((wav.samples[1] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn rejects_non_wav_bytes() {
        assert!(decode_wav(b"not a wav").is_err());
    }
}
