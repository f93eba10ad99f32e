//! Per-part effect state.
//!
//! An [`EffectModule`] owns the handles a part needs for collision effects:
//! up to four audio channels, a spark emitter, a dust emitter and a light.
//! It tracks which of them are currently active so that every stop is
//! emitted exactly once.
//!
//! ```text
//!          impact            scrape (active)
//!   Idle ─────────▶ ImpactPlaying ─────────▶ Scraping
//!    ▲                   │                      │
//!    └───────────────────┴──── stop / exit ─────┘
//! ```

use fx_types::{ContactEvent, Environment, Part, PartId, Wheel};
use hashbrown::HashMap;
use rand::{Rng, RngCore};
use tracing::{debug, error, trace};

use crate::command::{AudioChannel, ClipLibrary, EffectCommand, Emitter};
use crate::config::{DUST_EFFECT, EffectConfig, LIGHT_RANGE, SPARK_EFFECT};
use crate::context::SimulationContext;
use crate::response::{ChannelLevel, ResponseCurve, ScrapeInput, can_spark, is_ragdoll};

/// Coarse lifecycle state of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleState {
    /// Nothing is playing.
    #[default]
    Idle,
    /// An impact sound was triggered since the last scrape evaluation.
    ImpactPlaying,
    /// Scrape effects are running.
    Scraping,
}

/// Collision effect state for one part.
#[derive(Debug, Clone)]
pub struct EffectModule {
    part: PartId,
    config: EffectConfig,
    curve: ResponseCurve,
    spark_capable: bool,
    spark_fx: bool,
    /// Created channels and whether each is currently playing.
    channels: HashMap<AudioChannel, bool>,
    light_on: bool,
    state: ModuleState,
}

impl EffectModule {
    /// Set up effects for `part`.
    ///
    /// Returns the module and the commands that create its emitters, light
    /// and audio channels. A configured spark clip that the library does not
    /// have disables sparks for this module; everything else keeps working.
    pub fn activate(
        id: PartId,
        part: &Part,
        config: EffectConfig,
        clips: &dyn ClipLibrary,
        env: &Environment,
        rng: &mut dyn RngCore,
    ) -> (Self, Vec<EffectCommand>) {
        let mut commands = Vec::new();
        let spark_fx = config.scrape_sparks;

        if spark_fx {
            commands.push(EffectCommand::CreateEmitter {
                emitter: Emitter::Sparks,
                effect: SPARK_EFFECT.to_string(),
            });
        }
        commands.push(EffectCommand::CreateEmitter {
            emitter: Emitter::Dust,
            effect: DUST_EFFECT.to_string(),
        });
        if spark_fx {
            commands.push(EffectCommand::CreateLight { range: LIGHT_RANGE });
        }

        let mut module = Self {
            part: id,
            curve: ResponseCurve::new(&config),
            spark_capable: spark_fx,
            spark_fx,
            channels: HashMap::new(),
            light_on: false,
            state: ModuleState::Idle,
            config,
        };

        let loop_volume = module.config.volume * env.ship_volume;

        if module.spark_capable {
            if let Some(clip) = module.config.spark_sound.clone() {
                let created = module.create_channel(
                    AudioChannel::Spark,
                    &clip,
                    loop_volume,
                    clips,
                    rng,
                    &mut commands,
                );
                if !created {
                    error!(
                        part = %id,
                        "CollisionFX: Spark sound \"{clip}\" not found, disabling sparks"
                    );
                    module.spark_capable = false;
                }
            }
        }

        if let Some(clip) = module.config.scrape_sound.clone() {
            module.create_channel(
                AudioChannel::Scrape,
                &clip,
                loop_volume,
                clips,
                rng,
                &mut commands,
            );
        }

        if let Some(clip) = module.config.collision_sound.clone() {
            module.create_channel(
                AudioChannel::Bang,
                &clip,
                env.ship_volume,
                clips,
                rng,
                &mut commands,
            );
        }

        if part.wheel.is_some() {
            if let Some(clip) = module.config.wheel_impact_sound.clone() {
                module.create_channel(
                    AudioChannel::WheelImpact,
                    &clip,
                    env.ship_volume,
                    clips,
                    rng,
                    &mut commands,
                );
            }
        }

        debug!(
            part = %id,
            name = %part.name,
            sparks = module.spark_capable,
            channels = module.channels.len(),
            "Activated collision effects"
        );

        (module, commands)
    }

    fn create_channel(
        &mut self,
        channel: AudioChannel,
        clip: &str,
        volume: f64,
        clips: &dyn ClipLibrary,
        rng: &mut dyn RngCore,
        commands: &mut Vec<EffectCommand>,
    ) -> bool {
        let Some(length) = clips.clip_length(clip) else {
            if channel != AudioChannel::Spark {
                error!(
                    part = %self.part,
                    ?channel,
                    "CollisionFX: Sound \"{clip}\" not found"
                );
            }
            return false;
        };

        let looping = channel.is_looping();
        let start_time = if looping && length > 0.0 {
            rng.gen_range(0.0..length)
        } else {
            0.0
        };

        commands.push(EffectCommand::CreateChannel {
            channel,
            clip: clip.to_string(),
            looping,
            volume,
            start_time,
        });
        self.channels.insert(channel, false);
        true
    }

    /// Part this module belongs to.
    #[must_use]
    pub fn part(&self) -> PartId {
        self.part
    }

    /// Configuration the module was activated with.
    #[must_use]
    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ModuleState {
        self.state
    }

    /// Whether this part may produce sparks.
    #[must_use]
    pub fn spark_capable(&self) -> bool {
        self.spark_capable
    }

    /// Whether scrape effects are enabled at all.
    #[must_use]
    pub fn scrape_enabled(&self) -> bool {
        self.config.scrape_sparks
    }

    /// Whether the channel was created.
    #[must_use]
    pub fn has_channel(&self, channel: AudioChannel) -> bool {
        self.channels.contains_key(&channel)
    }

    /// Whether the channel is playing.
    ///
    /// One-shots count as playing until the next scrape evaluation.
    #[must_use]
    pub fn is_playing(&self, channel: AudioChannel) -> bool {
        self.channels.get(&channel).copied().unwrap_or(false)
    }

    /// Whether the light is on.
    #[must_use]
    pub fn light_enabled(&self) -> bool {
        self.light_on
    }

    /// Whether scrape effects are running.
    #[must_use]
    pub fn is_scraping(&self) -> bool {
        self.state == ModuleState::Scraping
    }

    /// Play an impact sound.
    ///
    /// Wheel impacts use the wheel channel when one was created, everything
    /// else the bang channel; starting one stops the other. Pitch is drawn
    /// uniformly from `1 ± pitch_range`.
    ///
    /// The one-shot counts as playing, and the module stays in
    /// [`ModuleState::ImpactPlaying`], until the next scrape evaluation or
    /// stop.
    pub fn impact(
        &mut self,
        is_wheel: bool,
        env: &Environment,
        rng: &mut dyn RngCore,
    ) -> Vec<EffectCommand> {
        let (play, other) = if is_wheel && self.has_channel(AudioChannel::WheelImpact) {
            (AudioChannel::WheelImpact, AudioChannel::Bang)
        } else {
            (AudioChannel::Bang, AudioChannel::WheelImpact)
        };

        if !self.has_channel(play) {
            trace!(part = %self.part, channel = ?play, "No impact sound");
            return Vec::new();
        }

        let mut commands = Vec::new();
        self.stop_channel(other, &mut commands);

        let range = self.config.pitch_range;
        let pitch = rng.gen_range(1.0 - range..=1.0 + range);
        commands.push(EffectCommand::Play {
            channel: play,
            pitch,
            volume: env.ship_volume,
        });
        self.channels.insert(play, true);

        if self.state == ModuleState::Idle {
            self.state = ModuleState::ImpactPlaying;
        }
        trace!(part = %self.part, channel = ?play, pitch, "Impact");
        commands
    }

    /// Run one frame of scrape effects for a sustained contact.
    ///
    /// `part` is this module's part as currently found in the tree;
    /// `other_sparks` is the spark capability of the other part, or `true`
    /// when the other object is not an effect-bearing part.
    ///
    /// Stops everything when paused, when the part or its rigid body is
    /// gone, when the event carries no contact point, or when the part has an
    /// intact wheel.
    pub fn scrape(
        &mut self,
        event: &ContactEvent,
        part: Option<&Part>,
        other_sparks: bool,
        ctx: &mut SimulationContext,
    ) -> Vec<EffectCommand> {
        if ctx.is_paused() {
            return self.stop_scrape();
        }
        self.settle_impact();
        let Some(part) = part else {
            return self.stop_scrape();
        };
        let Some(velocity) = part.velocity() else {
            return self.stop_scrape();
        };
        if part.wheel.as_ref().is_some_and(Wheel::is_intact) {
            return self.stop_scrape();
        }

        let env = ctx.environment();
        let Some(point) = event.corrected_point(env.delta_time) else {
            return self.stop_scrape();
        };

        let input = ScrapeInput {
            speed: event.speed(),
            point,
            part_velocity: velocity,
            can_spark: can_spark(
                self.spark_capable,
                other_sparks,
                env,
                &event.collider,
                &event.object,
            ),
            emit_dust: part.wheel.is_none() && !is_ragdoll(&event.object),
            ship_volume: env.ship_volume,
        };
        let response = self.curve.evaluate(&input, ctx.rng());

        let mut commands = Vec::new();

        if let Some(burst) = response.sparks.filter(|_| self.spark_fx) {
            commands.push(EffectCommand::Emit {
                emitter: Emitter::Sparks,
                position: burst.position,
                count: burst.count,
                energy: burst.energy,
                velocity: burst.velocity,
                color: None,
            });
        }

        if let Some(burst) = response.dust {
            let color = ctx.dust_color(&event.collider);
            commands.push(EffectCommand::Emit {
                emitter: Emitter::Dust,
                position: burst.position,
                count: burst.count,
                energy: burst.energy,
                velocity: burst.velocity,
                color: Some(color),
            });
        }

        match response.light {
            Some(light) if self.spark_fx => {
                commands.push(EffectCommand::SetLight {
                    color: light.color,
                    intensity: light.intensity,
                });
                self.light_on = true;
            }
            _ => self.disable_light(&mut commands),
        }

        self.set_level(AudioChannel::Scrape, response.scrape_audio, &mut commands);
        self.set_level(AudioChannel::Spark, response.spark_audio, &mut commands);

        let next = if response.is_active() {
            ModuleState::Scraping
        } else {
            ModuleState::Idle
        };
        if next != self.state {
            debug!(
                part = %self.part,
                from = ?self.state,
                to = ?next,
                speed = input.speed,
                "Scrape state"
            );
        }
        self.state = next;
        commands
    }

    /// Stop the spark loop, the light and the scrape loop.
    ///
    /// Emits nothing for effects that are not running.
    pub fn stop_scrape(&mut self) -> Vec<EffectCommand> {
        let mut commands = Vec::new();
        self.stop_channel(AudioChannel::Spark, &mut commands);
        self.disable_light(&mut commands);
        self.stop_channel(AudioChannel::Scrape, &mut commands);
        self.settle_impact();
        if self.state == ModuleState::Scraping {
            self.state = ModuleState::Idle;
        }
        commands
    }

    /// One-shots finish on their own: forget them without a stop.
    fn settle_impact(&mut self) {
        for (channel, playing) in &mut self.channels {
            if !channel.is_looping() {
                *playing = false;
            }
        }
        if self.state == ModuleState::ImpactPlaying {
            self.state = ModuleState::Idle;
        }
    }

    /// Silence the scrape and spark loops for a game pause.
    pub fn pause(&mut self) -> Vec<EffectCommand> {
        let mut commands = Vec::new();
        self.stop_channel(AudioChannel::Scrape, &mut commands);
        self.stop_channel(AudioChannel::Spark, &mut commands);
        commands
    }

    /// Tear the module down, stopping anything still running.
    pub fn deactivate(mut self) -> Vec<EffectCommand> {
        debug!(part = %self.part, "Deactivated collision effects");
        self.stop_scrape()
    }

    fn stop_channel(&mut self, channel: AudioChannel, commands: &mut Vec<EffectCommand>) {
        if let Some(playing) = self.channels.get_mut(&channel) {
            if *playing {
                *playing = false;
                commands.push(EffectCommand::Stop { channel });
            }
        }
    }

    fn disable_light(&mut self, commands: &mut Vec<EffectCommand>) {
        if self.light_on {
            self.light_on = false;
            commands.push(EffectCommand::DisableLight);
        }
    }

    fn set_level(
        &mut self,
        channel: AudioChannel,
        level: ChannelLevel,
        commands: &mut Vec<EffectCommand>,
    ) {
        let Some(playing) = self.channels.get_mut(&channel) else {
            return;
        };
        match level {
            ChannelLevel::Silent => {
                if *playing {
                    *playing = false;
                    commands.push(EffectCommand::Stop { channel });
                }
            }
            ChannelLevel::Playing { pitch, volume } => {
                commands.push(if *playing {
                    EffectCommand::Adjust {
                        channel,
                        pitch,
                        volume,
                    }
                } else {
                    EffectCommand::Play {
                        channel,
                        pitch,
                        volume,
                    }
                });
                *playing = true;
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use fx_dust::{DustLibrary, StrSource};
    use fx_types::{
        Bounds, Collider, CollidingObject, Color, ContactPoint, Point3, Vector3, WheelModule,
    };
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const BANG: &str = "Sounds/Bang";
    const WHEEL: &str = "Sounds/WheelImpact";
    const SCRAPE: &str = "Sounds/Scrape";
    const SPARK: &str = "Sounds/Spark";

    fn clips() -> HashMap<String, f64> {
        [(BANG, 1.0), (WHEEL, 1.0), (SCRAPE, 4.0), (SPARK, 3.0)]
            .into_iter()
            .map(|(name, len)| (name.to_string(), len))
            .collect()
    }

    fn config() -> EffectConfig {
        EffectConfig::default()
            .with_collision_sound(BANG)
            .with_wheel_impact_sound(WHEEL)
            .with_scrape_sound(SCRAPE)
            .with_spark_sound(SPARK)
    }

    fn hull() -> Part {
        Part::new("hull", Point3::origin()).with_velocity(Vector3::new(0.0, 0.0, 20.0))
    }

    fn wheel() -> Wheel {
        Wheel::intact(Bounds::from_center(
            Point3::origin(),
            Vector3::new(0.5, 0.5, 0.5),
        ))
    }

    fn ctx() -> SimulationContext {
        SimulationContext::new(DustLibrary::new(StrSource::default())).with_seed(1)
    }

    fn activate(part: &Part, config: EffectConfig) -> (EffectModule, Vec<EffectCommand>) {
        let mut rng = StdRng::seed_from_u64(5);
        EffectModule::activate(
            PartId::new(0),
            part,
            config,
            &clips(),
            &Environment::default(),
            &mut rng,
        )
    }

    fn scraping(speed: f64) -> ContactEvent {
        ContactEvent::new(
            vec![ContactPoint::new(Point3::origin(), Vector3::zeros())],
            Vector3::new(speed, 0.0, 0.0),
            Collider::named("runway"),
            CollidingObject::named("runway"),
        )
    }

    #[test]
    fn test_activation_creates_effects() {
        let (module, commands) = activate(&hull(), config());

        assert!(module.spark_capable());
        assert!(module.has_channel(AudioChannel::Spark));
        assert!(module.has_channel(AudioChannel::Scrape));
        assert!(module.has_channel(AudioChannel::Bang));
        // No wheel collider, no wheel channel
        assert!(!module.has_channel(AudioChannel::WheelImpact));

        assert!(commands.contains(&EffectCommand::CreateLight { range: LIGHT_RANGE }));
        let emitters = commands
            .iter()
            .filter(|c| matches!(c, EffectCommand::CreateEmitter { .. }))
            .count();
        assert_eq!(emitters, 2);

        for command in &commands {
            if let EffectCommand::CreateChannel {
                channel,
                looping,
                volume,
                start_time,
                ..
            } = command
            {
                assert_eq!(*looping, channel.is_looping());
                if *looping {
                    assert_eq!(*volume, 0.5);
                    assert!(*start_time >= 0.0 && *start_time < 4.0);
                } else {
                    assert_eq!(*volume, 1.0);
                    assert_eq!(*start_time, 0.0);
                }
            }
        }
        assert_eq!(module.state(), ModuleState::Idle);
    }

    #[test]
    fn test_wheel_part_gets_wheel_channel() {
        let part = hull().with_wheel(wheel());
        let (module, _) = activate(&part, config());
        assert!(module.has_channel(AudioChannel::WheelImpact));
    }

    #[test]
    fn test_missing_spark_clip_disables_sparks_only() {
        let (mut module, commands) =
            activate(&hull(), config().with_spark_sound("Sounds/Nope"));
        assert!(!module.spark_capable());
        assert!(module.scrape_enabled());
        assert!(!module.has_channel(AudioChannel::Spark));
        assert!(module.has_channel(AudioChannel::Scrape));
        assert!(commands.iter().any(|c| matches!(
            c,
            EffectCommand::CreateChannel {
                channel: AudioChannel::Scrape,
                ..
            }
        )));

        let out = module.scrape(&scraping(20.0), Some(&hull()), true, &mut ctx());
        assert!(out.iter().any(|c| c.plays(AudioChannel::Scrape)));
        assert!(!out.iter().any(|c| matches!(c, EffectCommand::SetLight { .. })));
    }

    #[test]
    fn test_scrape_sparks_off_creates_no_spark_fx() {
        let (module, commands) = activate(&hull(), config().with_scrape_sparks(false));
        assert!(!module.spark_capable());
        assert!(
            !commands
                .iter()
                .any(|c| matches!(c, EffectCommand::CreateLight { .. }))
        );
        assert!(!module.has_channel(AudioChannel::Spark));
        assert!(module.has_channel(AudioChannel::Scrape));
    }

    #[test]
    fn test_impact_channels_exclude_each_other() {
        let part = hull().with_wheel(wheel());
        let (mut module, _) = activate(&part, config());
        let env = Environment::default();
        let mut rng = StdRng::seed_from_u64(2);

        let out = module.impact(false, &env, &mut rng);
        assert_eq!(out.len(), 1);
        assert!(out[0].plays(AudioChannel::Bang));
        assert_eq!(module.state(), ModuleState::ImpactPlaying);

        let out = module.impact(true, &env, &mut rng);
        assert!(out[0].stops(AudioChannel::Bang));
        assert!(out[1].plays(AudioChannel::WheelImpact));
        assert!(!module.is_playing(AudioChannel::Bang));
        assert!(module.is_playing(AudioChannel::WheelImpact));
    }

    #[test]
    fn test_impact_pitch_within_range() {
        let (mut module, _) = activate(&hull(), config().with_pitch_range(0.2));
        let env = Environment::default().with_ship_volume(0.7);
        let mut rng = StdRng::seed_from_u64(8);

        for _ in 0..100 {
            let out = module.impact(false, &env, &mut rng);
            let Some(EffectCommand::Play { pitch, volume, .. }) = out.last() else {
                panic!("expected a play command");
            };
            assert!((0.8..=1.2).contains(pitch));
            assert_eq!(*volume, 0.7);
        }
    }

    #[test]
    fn test_wheel_impact_without_wheel_clip_plays_bang() {
        // Wheeled part with only the collision sound configured
        let part = hull().with_wheel(wheel());
        let bang_only = EffectConfig::default().with_collision_sound(BANG);
        let (mut module, _) = activate(&part, bang_only);
        assert!(!module.has_channel(AudioChannel::WheelImpact));

        let mut rng = StdRng::seed_from_u64(2);
        let out = module.impact(true, &Environment::default(), &mut rng);
        assert_eq!(out.len(), 1);
        assert!(out[0].plays(AudioChannel::Bang));
        assert_eq!(module.state(), ModuleState::ImpactPlaying);

        // Same for a part without any wheel
        let (mut module, _) = activate(&hull(), config());
        let out = module.impact(true, &Environment::default(), &mut rng);
        assert_eq!(out.len(), 1);
        assert!(out[0].plays(AudioChannel::Bang));
    }

    #[test]
    fn test_impact_settles_on_next_scrape() {
        let (mut module, _) = activate(&hull(), config());
        let mut ctx = ctx();
        let mut rng = StdRng::seed_from_u64(4);

        module.impact(false, &Environment::default(), &mut rng);
        assert!(module.is_playing(AudioChannel::Bang));
        assert_eq!(module.state(), ModuleState::ImpactPlaying);

        // A silent scrape forgets the one-shot without stopping it
        let out = module.scrape(&scraping(0.5), Some(&hull()), true, &mut ctx);
        assert!(out.is_empty());
        assert!(!module.is_playing(AudioChannel::Bang));
        assert_eq!(module.state(), ModuleState::Idle);

        module.impact(false, &Environment::default(), &mut rng);
        assert!(module.stop_scrape().is_empty());
        assert!(!module.is_playing(AudioChannel::Bang));
        assert_eq!(module.state(), ModuleState::Idle);
    }

    #[test]
    fn test_scrape_starts_then_adjusts() {
        let (mut module, _) = activate(&hull(), config());
        let mut ctx = ctx();

        let first = module.scrape(&scraping(20.0), Some(&hull()), true, &mut ctx);
        assert!(first.iter().any(|c| c.plays(AudioChannel::Scrape)));
        assert!(first.iter().any(|c| c.plays(AudioChannel::Spark)));
        assert!(first.iter().any(|c| matches!(c, EffectCommand::SetLight { .. })));
        assert!(module.is_scraping());
        assert!(module.light_enabled());

        let second = module.scrape(&scraping(20.0), Some(&hull()), true, &mut ctx);
        assert!(!second.iter().any(|c| c.plays(AudioChannel::Scrape)));
        assert!(second.iter().any(|c| matches!(
            c,
            EffectCommand::Adjust {
                channel: AudioChannel::Scrape,
                ..
            }
        )));
    }

    #[test]
    fn test_scrape_emits_opposing_particles() {
        let (mut module, _) = activate(&hull(), config());
        let out = module.scrape(&scraping(20.0), Some(&hull()), true, &mut ctx());

        let emits: Vec<_> = out
            .iter()
            .filter_map(|c| match c {
                EffectCommand::Emit {
                    emitter,
                    count,
                    velocity,
                    color,
                    ..
                } => Some((*emitter, *count, *velocity, *color)),
                _ => None,
            })
            .collect();

        assert_eq!(emits.len(), 2);
        for (emitter, count, velocity, color) in emits {
            assert_eq!(count, 40.0);
            assert_eq!(velocity, Vector3::new(0.0, 0.0, -20.0));
            match emitter {
                Emitter::Sparks => assert_eq!(color, None),
                Emitter::Dust => assert_eq!(color, Some(Color::GENERIC_DUST)),
            }
        }
    }

    #[test]
    fn test_intact_wheel_never_scrapes() {
        let part = hull().with_wheel(wheel());
        let (mut module, _) = activate(&part, config());

        let out = module.scrape(&scraping(30.0), Some(&part), true, &mut ctx());
        assert!(out.is_empty());
        assert!(!module.is_scraping());
    }

    #[test]
    fn test_damaged_wheel_scrapes_without_dust() {
        let mut wheel = wheel();
        wheel.module = Some(WheelModule { damaged: true });
        let part = hull().with_wheel(wheel);
        let (mut module, _) = activate(&part, config());

        let out = module.scrape(&scraping(30.0), Some(&part), true, &mut ctx());
        assert!(out.iter().any(|c| c.plays(AudioChannel::Scrape)));
        assert!(!out.iter().any(|c| matches!(
            c,
            EffectCommand::Emit {
                emitter: Emitter::Dust,
                ..
            }
        )));
    }

    #[test]
    fn test_slow_scrape_stops_running_effects() {
        let (mut module, _) = activate(&hull(), config());
        let mut ctx = ctx();
        module.scrape(&scraping(20.0), Some(&hull()), true, &mut ctx);

        let out = module.scrape(&scraping(0.5), Some(&hull()), true, &mut ctx);
        assert!(out.iter().any(|c| c.stops(AudioChannel::Scrape)));
        assert!(out.iter().any(|c| c.stops(AudioChannel::Spark)));
        assert!(out.contains(&EffectCommand::DisableLight));
        assert_eq!(module.state(), ModuleState::Idle);

        // Nothing left to stop
        assert!(module.scrape(&scraping(0.5), Some(&hull()), true, &mut ctx).is_empty());
    }

    #[test]
    fn test_missing_body_or_part_stops() {
        let (mut module, _) = activate(&hull(), config());
        let mut ctx = ctx();
        module.scrape(&scraping(20.0), Some(&hull()), true, &mut ctx);

        let frozen = Part::new("hull", Point3::origin());
        let out = module.scrape(&scraping(20.0), Some(&frozen), true, &mut ctx);
        assert_eq!(out.len(), 3);
        assert!(!module.is_scraping());

        module.scrape(&scraping(20.0), Some(&hull()), true, &mut ctx);
        let out = module.scrape(&scraping(20.0), None, true, &mut ctx);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_other_part_without_sparks_blocks_sparks() {
        let (mut module, _) = activate(&hull(), config());
        let out = module.scrape(&scraping(20.0), Some(&hull()), false, &mut ctx());
        assert!(out.iter().any(|c| c.plays(AudioChannel::Scrape)));
        assert!(!out.iter().any(|c| c.plays(AudioChannel::Spark)));
        assert!(!module.light_enabled());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut module, _) = activate(&hull(), config());
        module.scrape(&scraping(20.0), Some(&hull()), true, &mut ctx());

        let first = module.stop_scrape();
        assert_eq!(
            first,
            vec![
                EffectCommand::Stop {
                    channel: AudioChannel::Spark
                },
                EffectCommand::DisableLight,
                EffectCommand::Stop {
                    channel: AudioChannel::Scrape
                },
            ]
        );
        assert!(module.stop_scrape().is_empty());
        assert!(module.pause().is_empty());
        assert!(module.deactivate().is_empty());
    }
}
