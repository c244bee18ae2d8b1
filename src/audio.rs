//! Background music for the countdown and the celebration.

use std::f32::consts::TAU;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, Sink, Source};

use crate::app::AppStep;
use crate::error::{Result, WishError};

const SAMPLE_RATE: u32 = 44_100;

/// Something that can start and stop a looping track.
pub trait Playback {
    fn play(&mut self);
    fn pause(&mut self);
}

// stands in when no output device could be opened
pub struct Silence;

impl Playback for Silence {
    fn play(&mut self) {}
    fn pause(&mut self) {}
}

pub fn should_play(step: AppStep) -> bool {
    matches!(step, AppStep::Countdown | AppStep::Celebration)
}

/// Plays when the step calls for music and it isn't muted. The backend is
/// only touched when that changes.
pub struct SoundManager {
    backend: Box<dyn Playback>,
    playing: bool,
}

impl SoundManager {
    pub fn new(backend: Box<dyn Playback>) -> Self {
        Self {
            backend,
            playing: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn sync(&mut self, should_play: bool, muted: bool) {
        let want = should_play && !muted;
        if want == self.playing {
            return;
        }
        if want {
            self.backend.play();
        } else {
            self.backend.pause();
        }
        self.playing = want;
        tracing::debug!(playing = want, "music");
    }
}

// one looping track, starting paused
pub struct RodioPlayback {
    // dropping the stream stops all sound
    _stream: OutputStream,
    sink: Sink,
}

impl RodioPlayback {
    pub fn open(track: Option<&Path>) -> Result<Self> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| WishError::Audio(e.to_string()))?;
        let sink = Sink::try_new(&handle).map_err(|e| WishError::Audio(e.to_string()))?;
        sink.pause();

        match track {
            Some(path) => {
                let file = File::open(path)?;
                let source = Decoder::new(BufReader::new(file))
                    .map_err(|e| WishError::Audio(format!("{}: {}", path.display(), e)))?;
                sink.append(source.repeat_infinite());
                tracing::info!("music track: {}", path.display());
            }
            None => sink.append(jingle().repeat_infinite()),
        }

        Ok(Self {
            _stream: stream,
            sink,
        })
    }

    /// Falls back to [`Silence`] when the device or track can't be opened.
    pub fn open_or_silence(track: Option<&Path>) -> Box<dyn Playback> {
        match Self::open(track) {
            Ok(playback) => Box::new(playback),
            Err(e) => {
                tracing::warn!("music disabled: {}", e);
                Box::new(Silence)
            }
        }
    }
}

impl Playback for RodioPlayback {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }
}

// bell-like arpeggio, then a rest
fn jingle() -> SamplesBuffer<f32> {
    // C5 E5 G5 C6 G5 E5 C5 G4
    const NOTES: [f32; 8] = [523.25, 659.25, 783.99, 1046.5, 783.99, 659.25, 523.25, 392.0];
    const NOTE_SECS: f32 = 0.22;
    const REST_SECS: f32 = 0.9;

    let note_len = (SAMPLE_RATE as f32 * NOTE_SECS) as usize;
    let rest_len = (SAMPLE_RATE as f32 * REST_SECS) as usize;
    let mut samples = Vec::with_capacity(NOTES.len() * note_len + rest_len);

    for freq in NOTES {
        for i in 0..note_len {
            let t = i as f32 / SAMPLE_RATE as f32;
            let envelope = (-t * 9.0).exp();
            let tone = (TAU * freq * t).sin() + 0.3 * (TAU * freq * 2.0 * t).sin();
            samples.push(tone * envelope * 0.15);
        }
    }
    samples.resize(samples.len() + rest_len, 0.0);

    SamplesBuffer::new(1, SAMPLE_RATE, samples)
}
