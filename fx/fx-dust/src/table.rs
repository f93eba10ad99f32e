//! Dust color table: celestial body → biome → color.
//!
//! Built from `DustBody` nodes of the settings file. Loading is lenient: a
//! bad record is logged and skipped, it never aborts the whole file.

use fx_types::Color;
use tracing::{debug, warn};

use crate::error::{DustError, Result};
use crate::parser::{ConfigNode, parse_config_str};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Node name of a body definition.
pub const DUST_BODY_NODE: &str = "DustBody";

/// Node name of the biome list inside a body definition.
pub const BIOMES_NODE: &str = "Biomes";

/// Dust color for one biome.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DustBiome {
    /// Biome name as written in the config.
    pub name: String,
    /// Dust particle color.
    pub color: Color,
}

/// Dust definitions for one celestial body.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DustBody {
    /// Body name as written in the config.
    pub name: String,
    /// Biomes in file order.
    pub biomes: Vec<DustBiome>,
}

impl DustBody {
    /// Find a biome by name, ignoring ASCII case.
    #[must_use]
    pub fn biome(&self, name: &str) -> Option<&DustBiome> {
        self.biomes
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
    }
}

/// Outcome of a color lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DustMatch {
    /// The body and biome were both found.
    Found(Color),
    /// No entry for the body.
    UnknownBody,
    /// The body exists but has no entry for the biome.
    UnknownBiome,
}

/// Anything that can map (body, biome) to a dust color.
///
/// Implemented by [`DustTable`]; tests substitute counting doubles to
/// observe how often the underlying table is scanned.
pub trait DustLookup {
    /// Look up the dust color for a biome on a body. Names are
    /// case-insensitive.
    fn lookup(&self, body: &str, biome: &str) -> DustMatch;
}

/// The full dust color table.
///
/// # Example
///
/// ```
/// use fx_dust::{DustLookup, DustMatch, DustTable};
///
/// let table = DustTable::parse_str(
///     "DustBody\n{\n name = Kerbin\n Biomes\n {\n  Shores = 0.65 0.48 0.34\n }\n}",
/// )
/// .unwrap();
///
/// assert!(matches!(table.lookup("KERBIN", "shores"), DustMatch::Found(_)));
/// assert_eq!(table.lookup("Kerbin", "Tundra"), DustMatch::UnknownBiome);
/// assert_eq!(table.lookup("Mun", "Shores"), DustMatch::UnknownBody);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DustTable {
    bodies: Vec<DustBody>,
}

impl DustTable {
    /// Create an empty table. Every lookup on it misses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from already-built bodies.
    #[must_use]
    pub fn from_bodies(bodies: Vec<DustBody>) -> Self {
        Self { bodies }
    }

    /// Parse config text and build the table.
    ///
    /// # Errors
    ///
    /// Returns an error only if the text is structurally malformed. Bad
    /// records are logged and skipped.
    pub fn parse_str(text: &str) -> Result<Self> {
        let root = parse_config_str(text)?;
        Ok(Self::from_config(&root))
    }

    /// Build the table from the `DustBody` children of a parsed root node.
    #[must_use]
    pub fn from_config(root: &ConfigNode) -> Self {
        let mut bodies = Vec::new();

        for node in root.nodes_named(DUST_BODY_NODE) {
            match load_body(node) {
                Ok(Some(body)) => {
                    debug!(body = %body.name, biomes = body.biomes.len(), "Loaded dust body");
                    bodies.push(body);
                }
                Ok(None) => {}
                Err(err) => warn!("CollisionFX: {err}"),
            }
        }

        Self { bodies }
    }

    /// All bodies in file order.
    #[must_use]
    pub fn bodies(&self) -> &[DustBody] {
        &self.bodies
    }

    /// Find a body by name, ignoring ASCII case.
    #[must_use]
    pub fn body(&self, name: &str) -> Option<&DustBody> {
        self.bodies
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
    }

    /// Number of bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the table has no bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl DustLookup for DustTable {
    fn lookup(&self, body: &str, biome: &str) -> DustMatch {
        match self.body(body) {
            None => DustMatch::UnknownBody,
            Some(b) => b
                .biome(biome)
                .map_or(DustMatch::UnknownBiome, |entry| DustMatch::Found(entry.color)),
        }
    }
}

/// Load one `DustBody` node.
///
/// Returns `Ok(None)` for bodies without a `Biomes` node; they are skipped.
fn load_body(node: &ConfigNode) -> Result<Option<DustBody>> {
    let name = node.value("name").ok_or(DustError::MissingBodyName)?;

    let Some(biome_node) = node.node(BIOMES_NODE) else {
        debug!(body = name, "DustBody has no Biomes node, skipping");
        return Ok(None);
    };

    let mut body = DustBody {
        name: name.to_string(),
        biomes: Vec::with_capacity(biome_node.values.len()),
    };

    for (biome, record) in &biome_node.values {
        match parse_color(record) {
            Ok(color) => body.biomes.push(DustBiome {
                name: biome.clone(),
                color,
            }),
            Err(reason) => {
                warn!(
                    "CollisionFX: {}",
                    DustError::invalid_color(name, biome.as_str(), reason)
                );
            }
        }
    }

    Ok(Some(body))
}

/// Parse a `r g b [a]` color record.
///
/// Components are non-negative decimal numbers separated by whitespace.
/// Alpha defaults to 1.
///
/// # Errors
///
/// Returns a description of the problem if the record has other than three
/// or four components, or a component is not a plain decimal number.
pub fn parse_color(record: &str) -> std::result::Result<Color, String> {
    let parts: Vec<&str> = record.split_whitespace().collect();
    if parts.len() > 4 {
        return Err("Too many parameters.".to_string());
    }
    if parts.len() < 3 {
        return Err("Too few parameters.".to_string());
    }

    let mut components = [1.0_f32; 4];
    for (slot, text) in components.iter_mut().zip(&parts) {
        *slot = parse_component(text)?;
    }

    let [r, g, b, a] = components;
    Ok(Color::rgba(r, g, b, a))
}

fn parse_component(text: &str) -> std::result::Result<f32, String> {
    let is_decimal = !text.is_empty()
        && text.chars().all(|c| c.is_ascii_digit() || c == '.')
        && text.chars().filter(|&c| c == '.').count() <= 1
        && text.chars().any(|c| c.is_ascii_digit());
    if !is_decimal {
        return Err(format!("\"{text}\" is not a valid number."));
    }
    text.parse::<f32>()
        .map_err(|_| format!("\"{text}\" is not a valid number."))
}
