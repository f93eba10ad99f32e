//! Linear RGBA colors for dust particles and scrape lights.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An RGBA color with components nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha (opacity).
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Dust used when no body/biome entry applies: faint grey.
    pub const GENERIC_DUST: Self = Self::rgba(0.8, 0.8, 0.8, 0.007);

    /// Tan / light orange end of the scrape light blend.
    pub const SPARK_TAN: Self = Self::rgb(254.0 / 255.0, 226.0 / 255.0, 160.0 / 255.0);

    /// Red-orange end of the scrape light blend.
    pub const SPARK_RED_ORANGE: Self = Self::rgb(239.0 / 255.0, 117.0 / 255.0, 5.0 / 255.0);

    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color with explicit alpha.
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Component-wise linear blend. `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lerp_endpoints() {
        let a = Color::SPARK_TAN;
        let b = Color::SPARK_RED_ORANGE;
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn test_lerp_midpoint_and_clamp() {
        let mid = Color::rgb(0.0, 0.0, 0.0).lerp(Color::rgb(1.0, 0.5, 0.2), 0.5);
        assert_relative_eq!(mid.r, 0.5);
        assert_relative_eq!(mid.g, 0.25);
        assert_relative_eq!(mid.b, 0.1);

        let over = Color::rgb(0.0, 0.0, 0.0).lerp(Color::WHITE, 3.0);
        assert_eq!(over, Color::WHITE);
    }

    #[test]
    fn test_rgb_is_opaque() {
        assert_eq!(Color::rgb(0.1, 0.2, 0.3).a, 1.0);
    }
}
