//! Process-wide state shared by every effect module.

use fx_dust::{BiomeColorCache, BiomeMap, DustLibrary, surface_dust_color};
use fx_types::{Collider, Color, Environment};
use rand::{RngCore, SeedableRng};
use rand::rngs::StdRng;

/// State the host owns once and threads through every callback.
///
/// Holds the pause flag, the lazily loaded dust table and its single-slot
/// biome memo, the per-frame environment, and the random source used for
/// pitch and light flicker.
///
/// # Example
///
/// ```
/// use fx_contact::SimulationContext;
/// use fx_dust::{DustLibrary, StrSource};
/// use fx_types::Environment;
///
/// let mut ctx = SimulationContext::new(DustLibrary::new(StrSource::new("")))
///     .with_seed(42)
///     .with_environment(Environment::vacuum("Mun"));
///
/// assert!(!ctx.is_paused());
/// assert!(!ctx.environment().supports_sparks());
/// ```
pub struct SimulationContext {
    environment: Environment,
    paused: bool,
    dust: DustLibrary,
    biome_cache: BiomeColorCache,
    biome_map: Option<Box<dyn BiomeMap>>,
    rng: Box<dyn RngCore>,
}

impl std::fmt::Debug for SimulationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationContext")
            .field("environment", &self.environment)
            .field("paused", &self.paused)
            .field("dust", &self.dust)
            .field("biome_cache", &self.biome_cache)
            .field("has_biome_map", &self.biome_map.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self::new(DustLibrary::default())
    }
}

impl SimulationContext {
    /// Create a context around a dust library, with an unseeded random
    /// source and the default environment.
    #[must_use]
    pub fn new(dust: DustLibrary) -> Self {
        Self {
            environment: Environment::default(),
            paused: false,
            dust,
            biome_cache: BiomeColorCache::new(),
            biome_map: None,
            rng: Box::new(rand::thread_rng()),
        }
    }

    /// Use a seeded random source.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(Box::new(StdRng::seed_from_u64(seed)))
    }

    /// Use the given random source.
    #[must_use]
    pub fn with_rng(mut self, rng: Box<dyn RngCore>) -> Self {
        self.rng = rng;
        self
    }

    /// Use the given biome map for terrain dust.
    #[must_use]
    pub fn with_biome_map(mut self, map: impl BiomeMap + 'static) -> Self {
        self.biome_map = Some(Box::new(map));
        self
    }

    /// Set the starting environment.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Current environment.
    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Replace the environment. Called by the host once per physics frame.
    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = environment;
    }

    /// Mutable access to the environment.
    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    /// Replace the biome map, e.g. after switching bodies.
    pub fn set_biome_map(&mut self, map: Option<Box<dyn BiomeMap>>) {
        self.biome_map = map;
        self.biome_cache.clear();
    }

    /// Whether the game is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// The dust library.
    #[must_use]
    pub fn dust(&self) -> &DustLibrary {
        &self.dust
    }

    /// The random source.
    pub fn rng(&mut self) -> &mut dyn RngCore {
        self.rng.as_mut()
    }

    /// Dust color for a contact against `collider`.
    ///
    /// Loads the dust table on first use.
    pub fn dust_color(&mut self, collider: &Collider) -> Color {
        let table = self.dust.ensure_loaded();
        surface_dust_color(
            collider,
            &self.environment,
            self.biome_map.as_deref(),
            table,
            &mut self.biome_cache,
        )
    }
}
