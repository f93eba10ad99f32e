//! Scrape response curves.
//!
//! Maps the speed of a sustained contact onto particle counts, audio pitch
//! and volume, and a flickering light. The curves are:
//!
//! ```text
//! emission  = clamp(2s, 0, 75)
//! energy    = s / 10
//! pitch     = max(1 + ln(s) / 5, 0.5)
//! volume    = s / fade * v * ship      (s < fade)
//!           = v * ship                 (otherwise)
//! intensity = U(0, 1) * I * min(s / (10 * s_min), 1)
//! color     = lerp(tan, red_orange, U(0, 1))
//! ```
//!
//! Everything below the configured minimum scrape speed is silent and dark.

use fx_dust::is_natural_terrain;
use fx_types::{Collider, CollidingObject, Color, Environment, Point3, Vector3};
use rand::{Rng, RngCore};

use crate::config::{EffectConfig, MAX_EMISSION, SCRAPE_PITCH_FLOOR};

/// Name prefixes of the host's ragdoll bones.
const RAGDOLL_PREFIXES: [&str; 2] = ["bn_", "be_"];

/// Particles per burst at speed `speed`.
#[must_use]
pub fn emission_count(speed: f64) -> f64 {
    (speed * 2.0).clamp(0.0, MAX_EMISSION)
}

/// Particle energy (lifetime) at speed `speed`.
#[must_use]
pub fn particle_energy(speed: f64) -> f64 {
    speed / 10.0
}

/// Scrape loop pitch at speed `speed`, never below [`SCRAPE_PITCH_FLOOR`].
///
/// # Example
///
/// ```
/// use fx_contact::scrape_pitch;
///
/// assert_eq!(scrape_pitch(1.0), 1.0);
/// assert!(scrape_pitch(100.0) > 1.9);
/// assert_eq!(scrape_pitch(0.01), 0.5);
/// ```
#[must_use]
pub fn scrape_pitch(speed: f64) -> f64 {
    (1.0 + speed.ln() / 5.0).max(SCRAPE_PITCH_FLOOR)
}

/// Scrape loop volume: linear fade-in up to `fade_speed`, then flat.
#[must_use]
pub fn scrape_volume(speed: f64, fade_speed: f64, volume: f64, ship_volume: f64) -> f64 {
    let full = volume * ship_volume;
    if speed < fade_speed {
        speed / fade_speed * full
    } else {
        full
    }
}

/// Fraction of the light intensity ceiling reachable at `speed`.
#[must_use]
pub fn light_intensity_multiplier(speed: f64, full_light_speed: f64) -> f64 {
    if speed >= full_light_speed {
        1.0
    } else {
        speed / full_light_speed
    }
}

/// Whether the colliding object is a kerbal ragdoll bone.
#[must_use]
pub fn is_ragdoll(object: &CollidingObject) -> bool {
    RAGDOLL_PREFIXES
        .iter()
        .any(|prefix| object.name.starts_with(prefix))
}

/// Whether a scrape may produce sparks.
///
/// All of: the scraping part may spark, the other part (if it is one) may
/// spark, the atmosphere is oxygenated, and the surface is neither terrain
/// nor a ragdoll.
#[must_use]
pub fn can_spark(
    part_sparks: bool,
    other_sparks: bool,
    env: &Environment,
    collider: &Collider,
    object: &CollidingObject,
) -> bool {
    part_sparks
        && other_sparks
        && env.supports_sparks()
        && !is_natural_terrain(&collider.name)
        && !is_ragdoll(object)
}

/// Inputs for one scrape evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeInput {
    /// Relative speed of the contact.
    pub speed: f64,
    /// Corrected contact point.
    pub point: Point3<f64>,
    /// Velocity of the scraping part's rigid body.
    pub part_velocity: Vector3<f64>,
    /// Result of [`can_spark`].
    pub can_spark: bool,
    /// Whether dust should be kicked up.
    pub emit_dust: bool,
    /// Master ship volume.
    pub ship_volume: f64,
}

/// One particle burst at the contact point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleBurst {
    /// Burst origin.
    pub position: Point3<f64>,
    /// Number of particles.
    pub count: f64,
    /// Particle lifetime.
    pub energy: f64,
    /// Initial particle velocity.
    pub velocity: Vector3<f64>,
}

/// State of the scrape light for this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightResponse {
    /// Light color.
    pub color: Color,
    /// Light intensity.
    pub intensity: f64,
}

/// Target state of an audio channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelLevel {
    /// The channel should not be playing.
    Silent,
    /// The channel should be playing with these parameters.
    Playing {
        /// Playback pitch.
        pitch: f64,
        /// Playback volume.
        volume: f64,
    },
}

impl ChannelLevel {
    /// Whether the channel should be playing.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing { .. })
    }
}

/// Everything a scrape frame should produce.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeResponse {
    /// Spark burst, if sparking.
    pub sparks: Option<ParticleBurst>,
    /// Dust burst, if kicking up dust. Color is chosen by the caller.
    pub dust: Option<ParticleBurst>,
    /// Light state; `None` turns the light off.
    pub light: Option<LightResponse>,
    /// Scrape loop.
    pub scrape_audio: ChannelLevel,
    /// Spark loop.
    pub spark_audio: ChannelLevel,
}

impl ScrapeResponse {
    /// A response that stops everything.
    #[must_use]
    pub fn silent() -> Self {
        Self {
            sparks: None,
            dust: None,
            light: None,
            scrape_audio: ChannelLevel::Silent,
            spark_audio: ChannelLevel::Silent,
        }
    }

    /// Whether any effect remains active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.light.is_some() || self.scrape_audio.is_playing() || self.spark_audio.is_playing()
    }
}

/// Response curves for one configured part.
///
/// # Example
///
/// ```
/// use fx_contact::{ChannelLevel, EffectConfig, ResponseCurve, ScrapeInput};
/// use nalgebra::{Point3, Vector3};
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let curve = ResponseCurve::new(&EffectConfig::default());
/// let mut rng = StdRng::seed_from_u64(7);
///
/// let response = curve.evaluate(
///     &ScrapeInput {
///         speed: 50.0,
///         point: Point3::origin(),
///         part_velocity: Vector3::new(0.0, 0.0, 50.0),
///         can_spark: true,
///         emit_dust: false,
///         ship_volume: 1.0,
///     },
///     &mut rng,
/// );
///
/// let sparks = response.sparks.unwrap();
/// assert_eq!(sparks.count, 75.0);
/// assert_eq!(sparks.velocity, Vector3::new(0.0, 0.0, -50.0));
/// assert!(response.dust.is_none());
/// assert!(matches!(response.spark_audio, ChannelLevel::Playing { .. }));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCurve {
    min_scrape_speed: f64,
    fade_speed: f64,
    volume: f64,
    light_ceiling: f64,
    full_light_speed: f64,
}

impl ResponseCurve {
    /// Build the curves from a part configuration.
    #[must_use]
    pub fn new(config: &EffectConfig) -> Self {
        Self {
            min_scrape_speed: config.min_scrape_speed,
            fade_speed: config.scrape_fade_speed,
            volume: config.volume,
            light_ceiling: config.spark_light_intensity,
            full_light_speed: config.full_light_speed(),
        }
    }

    /// Slowest speed that produces any effect.
    #[must_use]
    pub fn min_scrape_speed(&self) -> f64 {
        self.min_scrape_speed
    }

    /// Evaluate one scrape frame.
    ///
    /// Draws from `rng` only when the light is on: first the color blend,
    /// then the intensity.
    pub fn evaluate(&self, input: &ScrapeInput, rng: &mut dyn RngCore) -> ScrapeResponse {
        let speed = input.speed;
        if speed.is_nan() || speed < self.min_scrape_speed {
            return ScrapeResponse::silent();
        }

        let burst = ParticleBurst {
            position: input.point,
            count: emission_count(speed),
            energy: particle_energy(speed),
            velocity: -input.part_velocity,
        };

        let audio = ChannelLevel::Playing {
            pitch: scrape_pitch(speed),
            volume: scrape_volume(speed, self.fade_speed, self.volume, input.ship_volume),
        };

        let light = input.can_spark.then(|| {
            let blend: f32 = rng.gen();
            let flicker: f64 = rng.gen();
            LightResponse {
                color: Color::SPARK_TAN.lerp(Color::SPARK_RED_ORANGE, blend),
                intensity: flicker
                    * self.light_ceiling
                    * light_intensity_multiplier(speed, self.full_light_speed),
            }
        });

        ScrapeResponse {
            sparks: input.can_spark.then_some(burst),
            dust: input.emit_dust.then_some(burst),
            light,
            scrape_audio: audio,
            spark_audio: if input.can_spark {
                audio
            } else {
                ChannelLevel::Silent
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;

    fn input(speed: f64) -> ScrapeInput {
        ScrapeInput {
            speed,
            point: Point3::new(1.0, 2.0, 3.0),
            part_velocity: Vector3::new(speed, 0.0, 0.0),
            can_spark: true,
            emit_dust: true,
            ship_volume: 1.0,
        }
    }

    #[test]
    fn test_emission_clamps() {
        assert_eq!(emission_count(0.0), 0.0);
        assert_eq!(emission_count(10.0), 20.0);
        assert_eq!(emission_count(37.5), 75.0);
        assert_eq!(emission_count(1000.0), 75.0);
        assert_eq!(particle_energy(25.0), 2.5);
    }

    #[test]
    fn test_pitch_floor() {
        assert_eq!(scrape_pitch(1.0), 1.0);
        assert_relative_eq!(scrape_pitch(std::f64::consts::E), 1.2);
        assert_eq!(scrape_pitch(0.0), 0.5);
        // ln(s)/5 == -0.5 at s = e^-2.5
        assert_eq!(scrape_pitch(0.05), 0.5);
    }

    #[test]
    fn test_volume_fade() {
        assert_relative_eq!(scrape_volume(2.5, 5.0, 0.5, 1.0), 0.25);
        assert_relative_eq!(scrape_volume(5.0, 5.0, 0.5, 1.0), 0.5);
        assert_relative_eq!(scrape_volume(50.0, 5.0, 0.5, 0.4), 0.2);
    }

    #[test]
    fn test_volume_monotonic_and_bounded() {
        let mut last = 0.0;
        for i in 0..200 {
            let speed = f64::from(i) * 0.1;
            let v = scrape_volume(speed, 5.0, 0.5, 0.8);
            assert!(v >= last);
            assert!(v <= 0.5 * 0.8 + 1e-12);
            last = v;
        }
    }

    #[test]
    fn test_light_multiplier() {
        assert_relative_eq!(light_intensity_multiplier(5.0, 10.0), 0.5);
        assert_eq!(light_intensity_multiplier(10.0, 10.0), 1.0);
        assert_eq!(light_intensity_multiplier(99.0, 10.0), 1.0);
    }

    #[test]
    fn test_ragdoll_prefixes() {
        assert!(is_ragdoll(&CollidingObject::named("bn_spA01")));
        assert!(is_ragdoll(&CollidingObject::named("be_r_knee")));
        assert!(!is_ragdoll(&CollidingObject::named("kerbalEVA")));
        assert!(!is_ragdoll(&CollidingObject::named("bnx")));
    }

    #[test]
    fn test_spark_gates() {
        let air = Environment::default();
        let metal = Collider::named("Section4_Mesh");
        let hull = CollidingObject::named("mk1pod");

        assert!(can_spark(true, true, &air, &metal, &hull));
        assert!(!can_spark(false, true, &air, &metal, &hull));
        assert!(!can_spark(true, false, &air, &metal, &hull));
        assert!(!can_spark(true, true, &Environment::vacuum("Mun"), &metal, &hull));
        assert!(!can_spark(
            true,
            true,
            &air,
            &Collider::named("Zn1232223233"),
            &hull
        ));
        assert!(!can_spark(
            true,
            true,
            &air,
            &metal,
            &CollidingObject::named("bn_pelvis")
        ));

        let thin_no_oxygen = Environment {
            atmosphere_has_oxygen: false,
            ..Environment::default()
        };
        assert!(!can_spark(true, true, &thin_no_oxygen, &metal, &hull));
    }

    #[test]
    fn test_below_min_speed_is_silent() {
        let curve = ResponseCurve::new(&EffectConfig::default().with_min_scrape_speed(2.0));
        let mut rng = StepRng::new(0, 1);

        let response = curve.evaluate(&input(1.99), &mut rng);
        assert_eq!(response, ScrapeResponse::silent());
        assert!(!response.is_active());

        let response = curve.evaluate(&input(f64::NAN), &mut rng);
        assert_eq!(response, ScrapeResponse::silent());
    }

    #[test]
    fn test_bursts_oppose_part_velocity() {
        let curve = ResponseCurve::new(&EffectConfig::default());
        let mut rng = StdRng::seed_from_u64(3);

        let response = curve.evaluate(&input(12.0), &mut rng);
        let sparks = response.sparks.unwrap();
        let dust = response.dust.unwrap();

        assert_eq!(sparks, dust);
        assert_eq!(sparks.count, 24.0);
        assert_relative_eq!(sparks.energy, 1.2);
        assert_eq!(sparks.velocity, Vector3::new(-12.0, 0.0, 0.0));
        assert_eq!(sparks.position, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_light_bounds() {
        let config = EffectConfig::default().with_spark_light_intensity(0.5);
        let curve = ResponseCurve::new(&config);
        let mut rng = StdRng::seed_from_u64(11);

        for speed in [1.0, 4.0, 9.0, 10.0, 40.0] {
            for _ in 0..50 {
                let light = curve.evaluate(&input(speed), &mut rng).light.unwrap();
                let ceiling = 0.5 * light_intensity_multiplier(speed, 10.0);
                assert!(light.intensity >= 0.0);
                assert!(light.intensity <= ceiling);

                let (lo, hi) = (Color::SPARK_RED_ORANGE, Color::SPARK_TAN);
                assert!(light.color.g >= lo.g && light.color.g <= hi.g);
                assert!(light.color.b >= lo.b && light.color.b <= hi.b);
            }
        }
    }

    #[test]
    fn test_zero_draws_give_tan_and_dark() {
        let curve = ResponseCurve::new(&EffectConfig::default());
        let mut rng = StepRng::new(0, 0);

        let light = curve.evaluate(&input(20.0), &mut rng).light.unwrap();
        assert_eq!(light.color, Color::SPARK_TAN);
        assert_eq!(light.intensity, 0.0);
    }

    #[test]
    fn test_no_spark_keeps_scrape_audio() {
        let curve = ResponseCurve::new(&EffectConfig::default());
        let mut rng = StepRng::new(0, 1);

        let mut no_spark = input(20.0);
        no_spark.can_spark = false;
        let response = curve.evaluate(&no_spark, &mut rng);

        assert!(response.sparks.is_none());
        assert!(response.light.is_none());
        assert!(response.dust.is_some());
        assert_eq!(response.spark_audio, ChannelLevel::Silent);
        assert!(response.scrape_audio.is_playing());
        assert!(response.is_active());
    }
}
