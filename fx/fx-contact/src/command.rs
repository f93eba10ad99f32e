//! Effect commands and the seams to the host engine.
//!
//! The engine never touches audio, particle or light objects directly. Every
//! callback returns a list of [`Effect`]s that the host applies through an
//! [`EffectsBackend`]. This keeps the state machine deterministic and lets
//! tests observe exactly what a frame would have done.

use fx_types::{Color, PartId, Point3, Vector3};
use hashbrown::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One audio source on a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AudioChannel {
    /// Looping scrape sound.
    Scrape,
    /// Looping spark sound.
    Spark,
    /// One-shot impact sound.
    Bang,
    /// One-shot wheel impact sound.
    WheelImpact,
}

impl AudioChannel {
    /// Whether the channel loops until stopped.
    #[must_use]
    pub fn is_looping(self) -> bool {
        matches!(self, Self::Scrape | Self::Spark)
    }
}

/// One particle emitter on a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Emitter {
    /// Spark particles.
    Sparks,
    /// Dust particles.
    Dust,
}

/// A single instruction for the host.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EffectCommand {
    /// Instantiate a world-space particle emitter at the part origin with
    /// automatic emission disabled.
    CreateEmitter {
        /// Which emitter.
        emitter: Emitter,
        /// Host effect name to instantiate.
        effect: String,
    },
    /// Create a disabled point light without shadows.
    CreateLight {
        /// Light range.
        range: f64,
    },
    /// Create an audio source with no doppler and logarithmic rolloff.
    CreateChannel {
        /// Which channel.
        channel: AudioChannel,
        /// Clip to load.
        clip: String,
        /// Whether the source loops.
        looping: bool,
        /// Initial volume.
        volume: f64,
        /// Playback start offset into the clip (seconds).
        start_time: f64,
    },
    /// Emit a one-off burst of particles.
    Emit {
        /// Which emitter.
        emitter: Emitter,
        /// Burst origin.
        position: Point3<f64>,
        /// Number of particles.
        count: f64,
        /// Particle lifetime.
        energy: f64,
        /// Initial particle velocity.
        velocity: Vector3<f64>,
        /// Particle tint, if the emitter should be recolored first.
        color: Option<Color>,
    },
    /// Enable the light with the given color and intensity.
    SetLight {
        /// Light color.
        color: Color,
        /// Light intensity.
        intensity: f64,
    },
    /// Disable the light.
    DisableLight,
    /// Start a channel from the beginning.
    Play {
        /// Which channel.
        channel: AudioChannel,
        /// Playback pitch.
        pitch: f64,
        /// Playback volume.
        volume: f64,
    },
    /// Retune a channel that is already playing.
    Adjust {
        /// Which channel.
        channel: AudioChannel,
        /// Playback pitch.
        pitch: f64,
        /// Playback volume.
        volume: f64,
    },
    /// Stop a channel.
    Stop {
        /// Which channel.
        channel: AudioChannel,
    },
}

impl EffectCommand {
    /// Whether this command starts the given channel.
    #[must_use]
    pub fn plays(&self, channel: AudioChannel) -> bool {
        matches!(self, Self::Play { channel: c, .. } if *c == channel)
    }

    /// Whether this command stops the given channel.
    #[must_use]
    pub fn stops(&self, channel: AudioChannel) -> bool {
        matches!(self, Self::Stop { channel: c } if *c == channel)
    }
}

/// A command addressed to one part.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Effect {
    /// Part whose effect objects the command applies to.
    pub part: PartId,
    /// The instruction.
    pub command: EffectCommand,
}

impl Effect {
    /// Address a command to a part.
    #[must_use]
    pub fn new(part: PartId, command: EffectCommand) -> Self {
        Self { part, command }
    }
}

/// The host side: applies effect commands to real audio, particles and
/// lights.
pub trait EffectsBackend {
    /// Apply one effect.
    fn apply(&mut self, effect: &Effect);

    /// Apply effects in order.
    fn apply_all(&mut self, effects: &[Effect]) {
        for effect in effects {
            self.apply(effect);
        }
    }
}

/// A backend that records every effect it is given.
///
/// # Example
///
/// ```
/// use fx_contact::{AudioChannel, CommandLog, Effect, EffectCommand, EffectsBackend};
/// use fx_types::PartId;
///
/// let mut log = CommandLog::new();
/// log.apply(&Effect::new(
///     PartId::new(1),
///     EffectCommand::Stop { channel: AudioChannel::Scrape },
/// ));
///
/// assert_eq!(log.len(), 1);
/// assert_eq!(log.for_part(PartId::new(1)).count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandLog {
    effects: Vec<Effect>,
}

impl CommandLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded effect in order.
    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Recorded commands for one part.
    pub fn for_part(&self, part: PartId) -> impl Iterator<Item = &EffectCommand> {
        self.effects
            .iter()
            .filter(move |e| e.part == part)
            .map(|e| &e.command)
    }

    /// Number of recorded effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

impl EffectsBackend for CommandLog {
    fn apply(&mut self, effect: &Effect) {
        self.effects.push(effect.clone());
    }
}

/// The host's audio database.
pub trait ClipLibrary {
    /// Length in seconds of the named clip, or `None` if it does not exist.
    fn clip_length(&self, name: &str) -> Option<f64>;
}

impl ClipLibrary for HashMap<String, f64> {
    fn clip_length(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}
