//! Physics-event-driven collision effects for spacecraft parts.
//!
//! This crate re-exports the complete effects stack:
//!
//! - [`fx_types`] - Core data types (part tree, contacts, environment, colors)
//! - [`fx_dust`] - Dust color settings, surface classification, biome lookup
//! - [`fx_contact`] - Attribution, response curves, effect modules, dispatch
//!
//! # Quick Start
//!
//! ```
//! use collision_fx::prelude::*;
//!
//! let mut tree = PartTree::new();
//! let hull = tree.add_root(
//!     Part::new("hull", Point3::origin()).with_velocity(Vector3::new(0.0, 0.0, 25.0)),
//! );
//!
//! let clips: HashMap<String, f64> = [("Scrape", 3.0), ("Spark", 2.0)]
//!     .into_iter()
//!     .map(|(name, len)| (name.to_string(), len))
//!     .collect();
//!
//! let mut ctx = SimulationContext::new(DustLibrary::new(StrSource::new(""))).with_seed(1);
//! let mut fx = CollisionFx::new();
//! let mut log = CommandLog::new();
//!
//! let config = EffectConfig::default()
//!     .with_scrape_sound("Scrape")
//!     .with_spark_sound("Spark");
//! log.apply_all(&fx.activate(&tree, hull, config, &clips, &mut ctx).unwrap());
//!
//! // Belly-landing on the runway
//! let event = ContactEvent::new(
//!     vec![ContactPoint::new(Point3::origin(), Vector3::zeros())],
//!     Vector3::new(0.0, 0.0, 25.0),
//!     Collider::named("runway_collider"),
//!     CollidingObject::named("runway"),
//! );
//! log.apply_all(&fx.on_collision_stay(&tree, hull, &event, &mut ctx));
//!
//! assert!(fx.module(hull).unwrap().is_playing(AudioChannel::Spark));
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                collision-fx (this crate)                │
//! │                Unified API / re-exports                 │
//! └─────────────────────────────────────────────────────────┘
//!                             │
//!                             ▼
//!                  ┌─────────────────────┐
//!                  │     fx-contact      │
//!                  │ Attribution, curves │
//!                  │  modules, dispatch  │
//!                  └──────────┬──────────┘
//!                             │
//!                             ▼
//!                  ┌─────────────────────┐
//!                  │       fx-dust       │
//!                  │ Settings, biomes,   │
//!                  │  terrain detection  │
//!                  └──────────┬──────────┘
//!                             │
//!                             ▼
//!                  ┌─────────────────────┐
//!                  │      fx-types       │
//!                  │    Data structs     │
//!                  └─────────────────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/collision-fx/0.3.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]

// Re-export sub-crates
pub use fx_contact;
pub use fx_dust;
pub use fx_types;

// Re-export nalgebra, hashbrown and rand for convenience
pub use hashbrown;
pub use nalgebra;
pub use rand;

/// Prelude module for convenient imports.
///
/// ```
/// use collision_fx::prelude::*;
/// ```
pub mod prelude {
    // ========================================================================
    // Core types from fx-types
    // ========================================================================

    // Part hierarchy
    pub use fx_types::{Bounds, Part, PartId, PartTree, RigidBody, Wheel, WheelModule};

    // Contacts and environment
    pub use fx_types::{Collider, CollidingObject, ContactEvent, ContactPoint, Environment};

    // Colors and errors
    pub use fx_types::{Color, FxError};

    // ========================================================================
    // Dust colors from fx-dust
    // ========================================================================

    pub use fx_dust::{
        BiomeColorCache, BiomeMap, ConfigSource, DustError, DustLibrary, DustLookup, DustTable,
        FileSource, LatitudeBands, StrSource, UniformBiome, is_natural_terrain,
    };

    // ========================================================================
    // Effect selection from fx-contact
    // ========================================================================

    pub use fx_contact::{
        AudioChannel, ClipLibrary, CollisionFx, CollisionPhase, CommandLog, Effect,
        EffectCommand, EffectConfig, EffectModule, EffectsBackend, Emitter, ModuleState,
        SimulationContext,
    };

    // ========================================================================
    // Math and collections
    // ========================================================================

    pub use hashbrown::HashMap;
    pub use nalgebra::{Point3, Vector3};
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let _config = EffectConfig::default();
        let _env = Environment::default();
        let _log = CommandLog::new();
        assert!(is_natural_terrain("Zn1232223233"));
    }

    #[test]
    fn test_minimal_session() {
        let mut tree = PartTree::new();
        let pod = tree.add_root(Part::new("pod", Point3::origin()));
        let mut ctx = SimulationContext::new(DustLibrary::new(StrSource::default()));
        let mut fx = CollisionFx::new();

        let clips: HashMap<String, f64> = HashMap::new();
        let setup = fx
            .activate(&tree, pod, EffectConfig::default(), &clips, &mut ctx)
            .expect("activation should succeed");

        // Dust emitter, spark emitter, light; no clips configured
        assert_eq!(setup.len(), 3);
        assert!(fx.is_active(pod));
    }
}
