//! Collision effect selection for vessel parts.
//!
//! This crate turns physics contact callbacks into audio, particle and light
//! commands:
//!
//! - **Impacts**: a hard first contact plays a one-shot bang, or a wheel
//!   thump when the wheel took the hit
//! - **Scrapes**: sustained contact drives looping scrape and spark sounds,
//!   spark and dust particles, and a flickering light
//! - **Attribution**: contacts reported against a parent are handed to the
//!   nearest small child part that actually touched the ground
//!
//! # Response Curves
//!
//! For a contact at relative speed `s`:
//!
//! ```text
//! particles = clamp(2s, 0, 75)
//! pitch     = max(1 + ln(s) / 5, 0.5)
//! volume    = v * ship * min(s / fade, 1)
//! ```
//!
//! Sparks additionally require an oxygen atmosphere, a non-terrain surface,
//! and both parts being spark-capable.
//!
//! # Example
//!
//! ```
//! use fx_contact::{
//!     AudioChannel, CollisionFx, CommandLog, EffectConfig, EffectsBackend, SimulationContext,
//! };
//! use fx_dust::{DustLibrary, StrSource};
//! use fx_types::{Collider, CollidingObject, ContactEvent, ContactPoint, Part, PartTree};
//! use hashbrown::HashMap;
//! use nalgebra::{Point3, Vector3};
//!
//! let mut tree = PartTree::new();
//! let pod = tree.add_root(Part::new("pod", Point3::origin()).with_velocity(Vector3::x()));
//!
//! let clips: HashMap<String, f64> = [("Bang".to_string(), 1.0)].into_iter().collect();
//! let mut ctx = SimulationContext::new(DustLibrary::new(StrSource::new(""))).with_seed(3);
//! let mut fx = CollisionFx::new();
//! let mut log = CommandLog::new();
//!
//! let config = EffectConfig::default().with_collision_sound("Bang");
//! let setup = fx.activate(&tree, pod, config, &clips, &mut ctx).unwrap();
//! log.apply_all(&setup);
//!
//! // A 10 m/s touchdown
//! let event = ContactEvent::new(
//!     vec![ContactPoint::new(Point3::origin(), Vector3::zeros())],
//!     Vector3::new(0.0, -10.0, 0.0),
//!     Collider::named("Zn1232223233"),
//!     CollidingObject::named("Kerbin"),
//! );
//! log.apply_all(&fx.on_collision_enter(&tree, pod, &event, &mut ctx));
//!
//! assert!(log.effects().iter().any(|e| e.command.plays(AudioChannel::Bang)));
//! ```
//!
//! # Host Independence
//!
//! Nothing here touches a game engine. The host feeds in a [`PartTree`]
//! snapshot and [`ContactEvent`]s, and applies the returned [`Effect`]s
//! through its own [`EffectsBackend`].

#![doc(html_root_url = "https://docs.rs/fx-contact/0.3.0")]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]

mod attribution;
mod command;
mod config;
mod context;
mod dispatcher;
mod module;
mod response;

pub use attribution::{Attribution, resolve_target};
pub use command::{
    AudioChannel, ClipLibrary, CommandLog, Effect, EffectCommand, EffectsBackend, Emitter,
};
pub use config::{
    DUST_EFFECT, EffectConfig, IMPACT_SPEED_THRESHOLD, LIGHT_RANGE, MAX_EMISSION,
    SCRAPE_PITCH_FLOOR, SPARK_EFFECT,
};
pub use context::SimulationContext;
pub use dispatcher::{CollisionFx, CollisionPhase};
pub use module::{EffectModule, ModuleState};
pub use response::{
    ChannelLevel, LightResponse, ParticleBurst, ResponseCurve, ScrapeInput, ScrapeResponse,
    can_spark, emission_count, is_ragdoll, light_intensity_multiplier, particle_energy,
    scrape_pitch, scrape_volume,
};

// Re-export types that appear in the public API
pub use fx_types::{ContactEvent, PartId, PartTree};

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use fx_dust::{DustLibrary, DustTable, LatitudeBands};
    use fx_types::{Collider, CollidingObject, Color, ContactPoint, Environment, Part};
    use hashbrown::HashMap;
    use nalgebra::{Point3, Vector3};
    use std::f64::consts::FRAC_PI_2;

    const SETTINGS: &str = r"
        DustBody
        {
            name = Kerbin
            Biomes
            {
                Grasslands = 0.65 0.48 0.34 0.05
            }
        }
    ";

    fn clips() -> HashMap<String, f64> {
        ["Bang", "Scrape", "Spark"]
            .into_iter()
            .map(|name| (name.to_string(), 1.0))
            .collect()
    }

    fn config() -> EffectConfig {
        EffectConfig::default()
            .with_collision_sound("Bang")
            .with_scrape_sound("Scrape")
            .with_spark_sound("Spark")
    }

    fn ground_scrape(speed: f64) -> ContactEvent {
        ContactEvent::new(
            vec![ContactPoint::new(Point3::origin(), Vector3::zeros())],
            Vector3::new(speed, 0.0, 0.0),
            Collider::named("Yp0333302322"),
            CollidingObject::named("Kerbin"),
        )
    }

    fn dust_color(effects: &[Effect]) -> Option<Color> {
        effects.iter().find_map(|e| match &e.command {
            EffectCommand::Emit {
                emitter: Emitter::Dust,
                color,
                ..
            } => *color,
            _ => None,
        })
    }

    #[test]
    fn test_terrain_scrape_uses_biome_dust_and_no_sparks() {
        let mut tree = PartTree::new();
        let hull = tree.add_root(Part::new("hull", Point3::origin()).with_velocity(Vector3::x()));

        let library = DustLibrary::preloaded(DustTable::parse_str(SETTINGS).unwrap());
        let mut ctx = SimulationContext::new(library)
            .with_seed(10)
            .with_biome_map(LatitudeBands::new().band(FRAC_PI_2, "Grasslands"));
        let mut fx = CollisionFx::new();
        fx.activate(&tree, hull, config(), &clips(), &mut ctx).unwrap();

        let effects = fx.on_collision_stay(&tree, hull, &ground_scrape(15.0), &mut ctx);

        assert_eq!(
            dust_color(&effects),
            Some(Color::rgba(0.65, 0.48, 0.34, 0.05))
        );
        assert!(effects.iter().any(|e| e.command.plays(AudioChannel::Scrape)));
        assert!(!effects.iter().any(|e| e.command.plays(AudioChannel::Spark)));
        assert!(!fx.module(hull).unwrap().light_enabled());
    }

    #[test]
    fn test_vacuum_never_sparks() {
        let mut tree = PartTree::new();
        let hull = tree.add_root(Part::new("hull", Point3::origin()).with_velocity(Vector3::x()));
        let mut ctx = SimulationContext::new(DustLibrary::preloaded(DustTable::new()))
            .with_seed(2)
            .with_environment(Environment::vacuum("Mun"));
        let mut fx = CollisionFx::new();
        fx.activate(&tree, hull, config(), &clips(), &mut ctx).unwrap();

        let event = ContactEvent::new(
            vec![ContactPoint::new(Point3::origin(), Vector3::zeros())],
            Vector3::new(30.0, 0.0, 0.0),
            Collider::named("runway"),
            CollidingObject::named("runway"),
        );
        for _ in 0..10 {
            let effects = fx.on_collision_stay(&tree, hull, &event, &mut ctx);
            assert!(!effects.iter().any(|e| matches!(
                e.command,
                EffectCommand::SetLight { .. }
                    | EffectCommand::Emit {
                        emitter: Emitter::Sparks,
                        ..
                    }
            )));
            assert!(!effects.iter().any(|e| e.command.plays(AudioChannel::Spark)));
        }
        let effects = fx.on_collision_stay(&tree, hull, &event, &mut ctx);
        assert_eq!(dust_color(&effects), Some(Color::GENERIC_DUST));
    }

    #[test]
    fn test_ragdoll_contact_scrapes_quietly() {
        let mut tree = PartTree::new();
        let hull = tree.add_root(Part::new("hull", Point3::origin()).with_velocity(Vector3::x()));
        let mut ctx =
            SimulationContext::new(DustLibrary::preloaded(DustTable::new())).with_seed(2);
        let mut fx = CollisionFx::new();
        fx.activate(&tree, hull, config(), &clips(), &mut ctx).unwrap();

        let event = ContactEvent::new(
            vec![ContactPoint::new(Point3::origin(), Vector3::zeros())],
            Vector3::new(8.0, 0.0, 0.0),
            Collider::named("bn_spine"),
            CollidingObject::named("bn_spine"),
        );
        let effects = fx.on_collision_stay(&tree, hull, &event, &mut ctx);
        assert!(effects.iter().all(|e| !matches!(e.command, EffectCommand::Emit { .. })));
        assert!(effects.iter().any(|e| e.command.plays(AudioChannel::Scrape)));
    }
}
