use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{config::AudioConfig, Result};

/// Named sound events the puzzle triggers at gesture boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Select,
    Deselect,
    Swap,
    Submit,
    Correct,
    Win,
}

impl SoundCue {
    pub const ALL: [SoundCue; 6] = [
        SoundCue::Select,
        SoundCue::Deselect,
        SoundCue::Swap,
        SoundCue::Submit,
        SoundCue::Correct,
        SoundCue::Win,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SoundCue::Select => "select",
            SoundCue::Deselect => "deselect",
            SoundCue::Swap => "swap",
            SoundCue::Submit => "submit",
            SoundCue::Correct => "correct",
            SoundCue::Win => "win",
        }
    }
}

impl fmt::Display for SoundCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Playback capability supplied by the host application.
pub trait SoundBackend {
    fn play_named(&mut self, name: &str) -> Result<()>;
    fn set_volume(&mut self, volume: f32) -> Result<()>;
    fn set_muted(&mut self, muted: bool) -> Result<()>;
    fn dispose(&mut self) -> Result<()>;
}

/// Backend that accepts every call and plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentBackend;

impl SoundBackend for SilentBackend {
    fn play_named(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn set_volume(&mut self, _volume: f32) -> Result<()> {
        Ok(())
    }

    fn set_muted(&mut self, _muted: bool) -> Result<()> {
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Explicitly owned sound dispatcher.
///
/// The board is initialised on [`SoundBoard::init`] or lazily on the first
/// cue, and [`SoundBoard::dispose`] returns it to the uninitialised state.
/// Backend failures are logged and never reach the caller.
#[derive(Debug)]
pub struct SoundBoard<B: SoundBackend> {
    backend: B,
    config: AudioConfig,
    initialized: bool,
}

impl<B: SoundBackend> SoundBoard<B> {
    pub fn new(backend: B, config: AudioConfig) -> Self {
        Self {
            backend,
            config,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn volume(&self) -> f32 {
        self.config.volume
    }

    pub fn is_muted(&self) -> bool {
        self.config.muted
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Pushes the configured volume and mute state into the backend. Calling
    /// it again is a no-op.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        let volume = self.config.volume;
        let muted = self.config.muted;
        report("set_volume", self.backend.set_volume(volume));
        report("set_muted", self.backend.set_muted(muted));
        tracing::debug!(volume, muted, "sound board initialised");
    }

    pub fn play(&mut self, cue: SoundCue) {
        self.play_named(cue.name());
    }

    pub fn play_named(&mut self, name: &str) {
        self.init();
        if self.config.muted {
            tracing::trace!(name, "muted, skipping sound");
            return;
        }
        report(name, self.backend.play_named(name));
    }

    /// Sets the volume, clamped to `[0, 1]`.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            self.config.volume
        };
        self.config.volume = volume;
        if self.initialized {
            report("set_volume", self.backend.set_volume(volume));
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.config.muted = muted;
        if self.initialized {
            report("set_muted", self.backend.set_muted(muted));
        }
    }

    pub fn dispose(&mut self) {
        if !self.initialized {
            return;
        }
        report("dispose", self.backend.dispose());
        self.initialized = false;
    }
}

impl Default for SoundBoard<SilentBackend> {
    fn default() -> Self {
        Self::new(SilentBackend, AudioConfig::default())
    }
}

fn report(action: &str, result: Result<()>) {
    if let Err(err) = result {
        tracing::warn!(action, %err, "sound backend call failed");
    }
}
