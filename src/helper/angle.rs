/// Shout out to cgmath for the idea https://github.com/rustgd/cgmath
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents an angle. Stored as f32 radians, constructable from either unit.
#[derive(Copy, Clone, PartialEq, PartialOrd, Default, Debug, Serialize, Deserialize)]
pub struct Angle {
    radians: f32,
}

impl Angle {
    pub const ZERO: Self = Self { radians: 0. };

    #[inline]
    pub const fn from_radians(radians: f32) -> Self {
        Self { radians }
    }

    #[inline]
    pub fn from_degrees(degrees: f32) -> Self {
        Self {
            radians: degrees.to_radians(),
        }
    }

    #[inline]
    pub fn radians(self) -> f32 {
        self.radians
    }

    #[inline]
    pub fn degrees(self) -> f32 {
        self.radians.to_degrees()
    }

    /// Half of this angle. Handy for field-of-view math where the half angle is what matters.
    #[inline]
    pub fn half(self) -> Self {
        Self {
            radians: self.radians * 0.5,
        }
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrees_to_radians() {
        let angle = Angle::from_degrees(180.);
        assert!((angle.radians() - std::f32::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn half_angle() {
        let angle = Angle::from_degrees(90.).half();
        assert!((angle.degrees() - 45.).abs() < 1e-4);
    }
}
