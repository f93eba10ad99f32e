//! Per-part effect configuration.
//!
//! Each part that carries collision effects is configured once, at
//! activation, from the host's part definition. The values are immutable for
//! the lifetime of the module.

use fx_types::FxError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Relative speed an entering collision must exceed to play an impact sound.
pub const IMPACT_SPEED_THRESHOLD: f64 = 3.0;

/// Upper bound on particles emitted per scrape burst.
pub const MAX_EMISSION: f64 = 75.0;

/// Lowest pitch a scrape loop is allowed to play at.
pub const SCRAPE_PITCH_FLOOR: f64 = 0.5;

/// Range of the scrape point light.
pub const LIGHT_RANGE: f64 = 3.0;

/// Host particle effect used for sparks.
pub const SPARK_EFFECT: &str = "fx_exhaustSparks_flameout";

/// Host particle effect used for dust.
pub const DUST_EFFECT: &str = "fx_smokeTrail_light";

/// Effect parameters for one part.
///
/// Sound fields name clips in the host's audio database; `None` means the
/// part has no such sound.
///
/// # Example
///
/// ```
/// use fx_contact::EffectConfig;
///
/// let config = EffectConfig::default()
///     .with_scrape_sound("CollisionFX/Sounds/ScrapeMetal")
///     .with_spark_sound("CollisionFX/Sounds/SparkSqueal")
///     .with_min_scrape_speed(2.0);
///
/// assert!(config.validate().is_ok());
/// assert!(config.scrape_sparks);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EffectConfig {
    /// Loudness of the scrape and spark loops, before the ship volume.
    pub volume: f64,

    /// Whether scrape effects run at all, and whether this part may spark.
    pub scrape_sparks: bool,

    /// One-shot clip played on hard impacts.
    pub collision_sound: Option<String>,

    /// One-shot clip played when a wheel takes the impact.
    pub wheel_impact_sound: Option<String>,

    /// Looping clip played while scraping.
    pub scrape_sound: Option<String>,

    /// Looping clip played while sparking.
    pub spark_sound: Option<String>,

    /// Ceiling of the flickering scrape light intensity.
    pub spark_light_intensity: f64,

    /// Slowest contact speed that produces scrape effects.
    pub min_scrape_speed: f64,

    /// Impact pitch is drawn from `1 ± pitch_range`.
    pub pitch_range: f64,

    /// Below this speed scrape loops fade linearly towards silence.
    pub scrape_fade_speed: f64,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            volume: 0.5,
            scrape_sparks: true,
            collision_sound: None,
            wheel_impact_sound: None,
            scrape_sound: None,
            spark_sound: None,
            spark_light_intensity: 0.05,
            min_scrape_speed: 1.0,
            pitch_range: 0.3,
            scrape_fade_speed: 5.0,
        }
    }
}

impl EffectConfig {
    /// Set the loop volume.
    #[must_use]
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    /// Enable or disable scrape effects and sparks.
    #[must_use]
    pub fn with_scrape_sparks(mut self, enabled: bool) -> Self {
        self.scrape_sparks = enabled;
        self
    }

    /// Set the impact clip.
    #[must_use]
    pub fn with_collision_sound(mut self, clip: impl Into<String>) -> Self {
        self.collision_sound = non_empty(clip.into());
        self
    }

    /// Set the wheel impact clip.
    #[must_use]
    pub fn with_wheel_impact_sound(mut self, clip: impl Into<String>) -> Self {
        self.wheel_impact_sound = non_empty(clip.into());
        self
    }

    /// Set the scrape loop clip.
    #[must_use]
    pub fn with_scrape_sound(mut self, clip: impl Into<String>) -> Self {
        self.scrape_sound = non_empty(clip.into());
        self
    }

    /// Set the spark loop clip.
    #[must_use]
    pub fn with_spark_sound(mut self, clip: impl Into<String>) -> Self {
        self.spark_sound = non_empty(clip.into());
        self
    }

    /// Set the scrape light intensity ceiling.
    #[must_use]
    pub fn with_spark_light_intensity(mut self, intensity: f64) -> Self {
        self.spark_light_intensity = intensity;
        self
    }

    /// Set the minimum scrape speed.
    #[must_use]
    pub fn with_min_scrape_speed(mut self, speed: f64) -> Self {
        self.min_scrape_speed = speed;
        self
    }

    /// Set the impact pitch spread.
    #[must_use]
    pub fn with_pitch_range(mut self, range: f64) -> Self {
        self.pitch_range = range;
        self
    }

    /// Set the speed at which scrape loops reach full volume.
    #[must_use]
    pub fn with_scrape_fade_speed(mut self, speed: f64) -> Self {
        self.scrape_fade_speed = speed;
        self
    }

    /// Speed at which the scrape light reaches its full intensity range.
    #[must_use]
    pub fn full_light_speed(&self) -> f64 {
        self.min_scrape_speed * 10.0
    }

    /// Validate the configuration.
    pub fn validate(&self) -> fx_types::Result<()> {
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(FxError::invalid_config(
                "volume must be finite and non-negative",
            ));
        }
        if !self.min_scrape_speed.is_finite() || self.min_scrape_speed <= 0.0 {
            return Err(FxError::invalid_config("min_scrape_speed must be positive"));
        }
        if !self.scrape_fade_speed.is_finite() || self.scrape_fade_speed <= 0.0 {
            return Err(FxError::invalid_config("scrape_fade_speed must be positive"));
        }
        if !(0.0..1.0).contains(&self.pitch_range) {
            return Err(FxError::invalid_config("pitch_range must be in [0, 1)"));
        }
        if !self.spark_light_intensity.is_finite() || self.spark_light_intensity < 0.0 {
            return Err(FxError::invalid_config(
                "spark_light_intensity cannot be negative",
            ));
        }
        Ok(())
    }
}

fn non_empty(clip: String) -> Option<String> {
    if clip.trim().is_empty() {
        None
    } else {
        Some(clip)
    }
}
