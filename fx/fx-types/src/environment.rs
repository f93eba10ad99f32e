//! Per-frame environment state written by the host.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What the active vessel is currently flying through.
///
/// The host refreshes this once per physics frame before dispatching
/// collision callbacks.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Environment {
    /// Name of the celestial body the active vessel orbits.
    pub body_name: String,
    /// Vessel latitude in degrees.
    pub latitude: f64,
    /// Vessel longitude in degrees.
    pub longitude: f64,
    /// Local atmospheric density at the active vessel.
    pub atmosphere_density: f64,
    /// Whether the current body's atmosphere contains oxygen.
    pub atmosphere_has_oxygen: bool,
    /// Master ship volume setting in `[0, 1]`.
    pub ship_volume: f64,
    /// Duration of the current physics frame (seconds).
    pub delta_time: f64,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            body_name: "Kerbin".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            atmosphere_density: 1.225,
            atmosphere_has_oxygen: true,
            ship_volume: 1.0,
            delta_time: 0.02,
        }
    }
}

impl Environment {
    /// An airless body (no atmosphere, no oxygen).
    #[must_use]
    pub fn vacuum(body_name: impl Into<String>) -> Self {
        Self {
            body_name: body_name.into(),
            atmosphere_density: 0.0,
            atmosphere_has_oxygen: false,
            ..Self::default()
        }
    }

    /// Set the vessel's surface coordinates in degrees.
    #[must_use]
    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    /// Set the master ship volume.
    #[must_use]
    pub fn with_ship_volume(mut self, ship_volume: f64) -> Self {
        self.ship_volume = ship_volume;
        self
    }

    /// Set the frame duration.
    #[must_use]
    pub fn with_delta_time(mut self, delta_time: f64) -> Self {
        self.delta_time = delta_time;
        self
    }

    /// Metal-on-metal friction can only ignite in an oxygen atmosphere.
    #[must_use]
    pub fn supports_sparks(&self) -> bool {
        self.atmosphere_density > 0.0 && self.atmosphere_has_oxygen
    }
}
