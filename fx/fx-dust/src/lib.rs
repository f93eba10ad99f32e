//! Dust colors and surface classification for collision effects.
//!
//! When a part scrapes along the ground, the dust it kicks up is tinted by
//! the biome under the vessel. This crate owns everything needed to answer
//! "what color is the dust here":
//!
//! - Parse the settings file (a brace-delimited config-node format)
//! - Build the body → biome → color [`DustTable`], skipping bad records
//! - Classify a collider as procedural terrain or a constructed surface
//! - Memoize the last (body, biome) hit in a [`BiomeColorCache`]
//!
//! # Settings Format
//!
//! ```text
//! DustBody
//! {
//!     name = Kerbin
//!     Biomes
//!     {
//!         Grasslands = 0.65 0.48 0.34 0.05   // r g b a
//!         Deserts = 0.80 0.68 0.47           // alpha defaults to 1
//!     }
//! }
//! ```
//!
//! # Example
//!
//! ```
//! use fx_dust::{BiomeColorCache, DustLibrary, StrSource, UniformBiome, surface_dust_color};
//! use fx_types::{Collider, Color, Environment};
//!
//! let mut library = DustLibrary::new(StrSource::new(
//!     "DustBody\n{\n name = Kerbin\n Biomes\n {\n  Deserts = 0.8 0.68 0.47\n }\n}",
//! ));
//! let table = library.ensure_loaded();
//!
//! let mut cache = BiomeColorCache::new();
//! let map = UniformBiome("Deserts".to_string());
//! let env = Environment::default();
//!
//! let terrain = Collider::named("Zn2101022132");
//! let color = surface_dust_color(&terrain, &env, Some(&map), table, &mut cache);
//! assert_eq!(color, Color::rgb(0.8, 0.68, 0.47));
//!
//! let launchpad = Collider::named("launchpad_ramps");
//! let color = surface_dust_color(&launchpad, &env, Some(&map), table, &mut cache);
//! assert_eq!(color, Color::GENERIC_DUST);
//! ```

#![doc(html_root_url = "https://docs.rs/fx-dust/0.3.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::doc_markdown
)]

mod error;
mod parser;
mod source;
mod surface;
mod table;

pub use error::{DustError, Result};
pub use parser::{ConfigNode, parse_config_str};
pub use source::{ConfigSource, DEFAULT_CONFIG_PATH, DustLibrary, FileSource, StrSource, load_table};
pub use surface::{
    BiomeColorCache, BiomeMap, LatitudeBands, UniformBiome, is_natural_terrain, surface_dust_color,
};
pub use table::{
    BIOMES_NODE, DUST_BODY_NODE, DustBiome, DustBody, DustLookup, DustMatch, DustTable, parse_color,
};
