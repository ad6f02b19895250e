//! Named audio triggers
//!
//! The simulation emits `SoundEvent`s as fire-and-forget values. Playback is
//! left to whatever `AudioSink` the host plugs into the `AudioManager`.

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundEvent {
    /// Player left the ground
    Jump,
    /// World color flipped
    Flip,
    /// Flip refused (cooling down or blocked)
    Denied,
    /// Player launched by a spring
    Spring,
    /// Player died
    Die,
    /// Unstable block vanished
    Break,
    /// Level exit reached
    Exit,
}

impl SoundEvent {
    pub const ALL: [SoundEvent; 7] = [
        SoundEvent::Jump,
        SoundEvent::Flip,
        SoundEvent::Denied,
        SoundEvent::Spring,
        SoundEvent::Die,
        SoundEvent::Break,
        SoundEvent::Exit,
    ];

    /// Asset name of the trigger
    pub fn name(&self) -> &'static str {
        match self {
            SoundEvent::Jump => "jump",
            SoundEvent::Flip => "flip",
            SoundEvent::Denied => "denied",
            SoundEvent::Spring => "spring",
            SoundEvent::Die => "die",
            SoundEvent::Break => "break",
            SoundEvent::Exit => "exit",
        }
    }

    /// Restart instead of overlapping when triggered while still playing
    pub fn interrupts_previous(&self) -> bool {
        matches!(self, SoundEvent::Spring | SoundEvent::Die | SoundEvent::Exit)
    }
}

/// Playback backend
pub trait AudioSink {
    fn play(&mut self, sound: SoundEvent);

    /// Stop any playing instance of `sound`
    fn stop(&mut self, _sound: SoundEvent) {}
}

/// Sink that only logs triggers (headless runs)
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, sound: SoundEvent) {
        log::debug!("sound: {}", sound.name());
    }
}

/// Audio manager for the game
pub struct AudioManager<S: AudioSink> {
    sink: S,
    muted: bool,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, muted: false }
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Play a sound effect
    pub fn play(&mut self, sound: SoundEvent) {
        if self.muted {
            return;
        }
        if sound.interrupts_previous() {
            self.sink.stop(sound);
        }
        self.sink.play(sound);
    }

    pub fn play_all(&mut self, sounds: impl IntoIterator<Item = SoundEvent>) {
        for sound in sounds {
            self.play(sound);
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
