//! Surface classification and biome color resolution.
//!
//! Procedurally generated terrain tiles are recognised by name alone: the
//! host names them `Xy##########` (two letters, ten digits). Anything else is
//! treated as a constructed surface and gets the generic dust color.

use fx_types::{Collider, Color, Environment};
use tracing::{debug, warn};

use crate::table::{DustLookup, DustMatch};

/// Length of a procedural terrain tile name.
const TERRAIN_NAME_LEN: usize = 12;

/// Whether a collider belongs to the procedural planetary terrain.
///
/// True iff the name is exactly 12 characters and characters 3 to 12 parse
/// as a base-10 integer. Renamed terrain tiles are misclassified as
/// constructed surfaces.
///
/// # Example
///
/// ```
/// use fx_dust::is_natural_terrain;
///
/// assert!(is_natural_terrain("Zn1232223233"));
/// assert!(!is_natural_terrain("Section4_Mesh"));
/// assert!(!is_natural_terrain("runway_collider"));
/// ```
#[must_use]
pub fn is_natural_terrain(collider_name: &str) -> bool {
    if collider_name.chars().count() != TERRAIN_NAME_LEN {
        return false;
    }
    collider_name
        .char_indices()
        .nth(2)
        .is_some_and(|(offset, _)| collider_name[offset..].parse::<i64>().is_ok())
}

/// Source of biome names for the current body.
///
/// Coordinates are in radians.
pub trait BiomeMap {
    /// Name of the biome at the given coordinates, if the map has one.
    fn biome_at(&self, latitude: f64, longitude: f64) -> Option<&str>;
}

/// A map reporting the same biome everywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBiome(pub String);

impl BiomeMap for UniformBiome {
    fn biome_at(&self, _latitude: f64, _longitude: f64) -> Option<&str> {
        Some(&self.0)
    }
}

/// A map made of latitude bands, symmetric about the equator.
///
/// Each band covers `|latitude| <= limit`; the first matching band wins.
///
/// # Example
///
/// ```
/// use fx_dust::{BiomeMap, LatitudeBands};
///
/// let map = LatitudeBands::new()
///     .band(60_f64.to_radians(), "Grasslands")
///     .band(90_f64.to_radians(), "Ice Caps");
///
/// assert_eq!(map.biome_at(10_f64.to_radians(), 0.0), Some("Grasslands"));
/// assert_eq!(map.biome_at(-75_f64.to_radians(), 1.0), Some("Ice Caps"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LatitudeBands {
    bands: Vec<(f64, String)>,
}

impl LatitudeBands {
    /// Create a map with no bands.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a band reaching up to `limit` radians from the equator.
    #[must_use]
    pub fn band(mut self, limit: f64, name: impl Into<String>) -> Self {
        self.bands.push((limit, name.into()));
        self
    }
}

impl BiomeMap for LatitudeBands {
    fn biome_at(&self, latitude: f64, _longitude: f64) -> Option<&str> {
        self.bands
            .iter()
            .find(|(limit, _)| latitude.abs() <= *limit)
            .map(|(_, name)| name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct CachedBiome {
    body: String,
    biome: String,
    color: Color,
}

/// Single-slot memo of the last resolved (body, biome) color.
///
/// Contacts stay in one biome for many consecutive frames, so the last hit
/// is kept and served again while both names match. Misses are never
/// cached.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BiomeColorCache {
    last: Option<CachedBiome>,
}

impl BiomeColorCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the dust color of `biome` on `body`.
    ///
    /// Unknown bodies and biomes are logged and resolve to
    /// [`Color::GENERIC_DUST`].
    pub fn resolve(&mut self, table: &impl DustLookup, body: &str, biome: &str) -> Color {
        if let Some(hit) = &self.last {
            if hit.body.eq_ignore_ascii_case(body) && hit.biome.eq_ignore_ascii_case(biome) {
                return hit.color;
            }
        }

        match table.lookup(body, biome) {
            DustMatch::Found(color) => {
                self.last = Some(CachedBiome {
                    body: body.to_string(),
                    biome: biome.to_string(),
                    color,
                });
                color
            }
            DustMatch::UnknownBody => {
                self.last = None;
                warn!(
                    "CollisionFX: Unable to find dust definition for body \"{body}\"; using default."
                );
                Color::GENERIC_DUST
            }
            DustMatch::UnknownBiome => {
                self.last = None;
                warn!(
                    "CollisionFX: Unable to find dust definition for biome \"{biome}\" on body \"{body}\"; using default."
                );
                Color::GENERIC_DUST
            }
        }
    }

    /// Forget the cached entry.
    pub fn clear(&mut self) {
        self.last = None;
    }

    /// Whether an entry is cached.
    #[must_use]
    pub fn is_warm(&self) -> bool {
        self.last.is_some()
    }
}

/// Dust color for a contact against `collider`.
///
/// Constructed surfaces get the generic color. Terrain is resolved through
/// the biome under the active vessel and the dust table.
pub fn surface_dust_color(
    collider: &Collider,
    env: &Environment,
    biome_map: Option<&dyn BiomeMap>,
    table: &impl DustLookup,
    cache: &mut BiomeColorCache,
) -> Color {
    if !is_natural_terrain(&collider.name) {
        return Color::GENERIC_DUST;
    }

    let biome = biome_map
        .and_then(|map| map.biome_at(env.latitude.to_radians(), env.longitude.to_radians()));
    let Some(biome) = biome else {
        debug!(body = %env.body_name, "No biome at vessel position; using default dust");
        return Color::GENERIC_DUST;
    };

    cache.resolve(table, &env.body_name, biome)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::table::DustTable;
    use std::cell::Cell;

    struct CountingTable {
        inner: DustTable,
        scans: Cell<usize>,
    }

    impl DustLookup for CountingTable {
        fn lookup(&self, body: &str, biome: &str) -> DustMatch {
            self.scans.set(self.scans.get() + 1);
            self.inner.lookup(body, biome)
        }
    }

    fn counting() -> CountingTable {
        let inner = DustTable::parse_str(
            r"
            DustBody
            {
                name = Kerbin
                Biomes
                {
                    Grasslands = 0.65 0.48 0.34 0.05
                    Deserts = 0.80 0.68 0.47 0.05
                }
            }
            DustBody
            {
                name = Mun
                Biomes
                {
                    Midlands = 0.5 0.5 0.5 0.02
                }
            }
            ",
        )
        .unwrap();
        CountingTable {
            inner,
            scans: Cell::new(0),
        }
    }

    #[test]
    fn test_terrain_names() {
        assert!(is_natural_terrain("Ab0123456789"));
        assert!(is_natural_terrain("Yp0333302322"));
        assert!(!is_natural_terrain("Section4_Mesh"));
        assert!(!is_natural_terrain("Ab012345678"));
        assert!(!is_natural_terrain("Ab01234567890"));
        assert!(!is_natural_terrain("Ab01234x6789"));
        assert!(!is_natural_terrain(""));
    }

    #[test]
    fn test_cache_serves_repeat_lookups() {
        let table = counting();
        let mut cache = BiomeColorCache::new();

        let first = cache.resolve(&table, "Kerbin", "Grasslands");
        for _ in 0..10 {
            assert_eq!(cache.resolve(&table, "kerbin", "GRASSLANDS"), first);
        }
        assert_eq!(table.scans.get(), 1);
        assert!(cache.is_warm());
    }

    #[test]
    fn test_cache_invalidates_on_new_biome() {
        let table = counting();
        let mut cache = BiomeColorCache::new();

        let grass = cache.resolve(&table, "Kerbin", "Grasslands");
        let desert = cache.resolve(&table, "Kerbin", "Deserts");
        assert_ne!(grass, desert);

        let mun = cache.resolve(&table, "Mun", "Midlands");
        assert_ne!(mun, desert);
        assert_eq!(table.scans.get(), 3);
    }

    #[test]
    fn test_misses_fall_back_and_are_not_cached() {
        let table = counting();
        let mut cache = BiomeColorCache::new();

        assert_eq!(cache.resolve(&table, "Eve", "Shores"), Color::GENERIC_DUST);
        assert_eq!(cache.resolve(&table, "Kerbin", "Tundra"), Color::GENERIC_DUST);
        assert_eq!(cache.resolve(&table, "Kerbin", "Tundra"), Color::GENERIC_DUST);
        assert_eq!(table.scans.get(), 3);
        assert!(!cache.is_warm());
    }

    #[test]
    fn test_surface_dust_color() {
        let table = counting();
        let mut cache = BiomeColorCache::new();
        let map = UniformBiome("Deserts".to_string());
        let env = Environment::default().at(5.0, 5.0);

        let building = Collider::named("model_vab_exterior_crawlerway_collider_v46");
        assert_eq!(
            surface_dust_color(&building, &env, Some(&map), &table, &mut cache),
            Color::GENERIC_DUST
        );
        assert_eq!(table.scans.get(), 0);

        let ground = Collider::named("Zn2101022132");
        let color = surface_dust_color(&ground, &env, Some(&map), &table, &mut cache);
        assert_eq!(color, Color::rgba(0.80, 0.68, 0.47, 0.05));

        // No biome map: generic color
        assert_eq!(
            surface_dust_color(&ground, &env, None, &table, &mut cache),
            Color::GENERIC_DUST
        );
    }

    #[test]
    fn test_latitude_bands_use_radians() {
        let map = LatitudeBands::new()
            .band(60_f64.to_radians(), "Grasslands")
            .band(90_f64.to_radians(), "Ice Caps");
        let table = counting();
        let mut cache = BiomeColorCache::new();
        let ground = Collider::named("Zn1232223233");

        let env = Environment::default().at(30.0, 0.0);
        let color = surface_dust_color(&ground, &env, Some(&map), &table, &mut cache);
        assert_eq!(color, Color::rgba(0.65, 0.48, 0.34, 0.05));

        // Ice Caps has no entry on Kerbin
        let env = Environment::default().at(-80.0, 0.0);
        let color = surface_dust_color(&ground, &env, Some(&map), &table, &mut cache);
        assert_eq!(color, Color::GENERIC_DUST);
    }
}
