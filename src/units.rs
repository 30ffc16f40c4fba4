// Grid positions are unitless until the analyzer scales them by the cell size.

use std::ops::AddAssign;
use std::fmt;
use serde::{Deserialize, Serialize};

const NANOMETERS_PER_MILLIMETER: f64 = 1e6;
const MILLIMETERS_PER_METER: f64 = 1e3;

/// Physical length on the bench.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

impl Millimeters {
    pub const ZERO: Millimeters = Millimeters(0.0);

    /// Scale a length measured in grid cells.
    #[inline]
    pub fn from_grid(cells: f64, cell_size: Millimeters) -> Self {
        Self(cells * cell_size.0)
    }

    #[inline]
    pub fn from_nanometers(nm: f64) -> Self {
        Self(nm / NANOMETERS_PER_MILLIMETER)
    }

    #[inline]
    pub const fn value(&self) -> f64 {
        self.0
    }

    #[inline]
    pub fn abs_diff(&self, other: Millimeters) -> Self {
        Self((self.0 - other.0).abs())
    }
}

impl AddAssign for Millimeters {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl fmt::Display for Millimeters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.abs() >= MILLIMETERS_PER_METER {
            write!(f, "{:.4} m", self.0 / MILLIMETERS_PER_METER)
        } else {
            write!(f, "{:.2} mm", self.0)
        }
    }
}

/// Vacuum wavelength, stored in nanometres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wavelength(pub f64);

impl Wavelength {
    /// Helium-neon red line.
    pub const HENE: Wavelength = Wavelength(632.8);

    #[inline]
    pub const fn from_nanometers(nm: f64) -> Self {
        Self(nm)
    }

    #[inline]
    pub const fn as_nanometers(&self) -> f64 {
        self.0
    }

    #[inline]
    pub fn as_millimeters(&self) -> Millimeters {
        Millimeters::from_nanometers(self.0)
    }

    /// How many wavelengths fit into `length`. Zero for a non-positive wavelength.
    pub fn cycles_in(&self, length: Millimeters) -> f64 {
        let wl = self.as_millimeters().0;
        if wl > 0.0 && wl.is_finite() {
            length.0 / wl
        } else {
            0.0
        }
    }
}

impl Default for Wavelength {
    fn default() -> Self {
        Self::HENE
    }
}

impl fmt::Display for Wavelength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} nm", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_conversion() {
        let length = Millimeters::from_grid(7.0, Millimeters(30.0));
        assert_eq!(length.value(), 210.0);
    }

    #[test]
    fn test_wavelength_conversion() {
        let wl = Wavelength::from_nanometers(500.0);
        assert!((wl.as_millimeters().value() - 5e-4).abs() < 1e-15);
    }

    #[test]
    fn test_cycles_in_guards_zero_wavelength() {
        assert_eq!(Wavelength(0.0).cycles_in(Millimeters(10.0)), 0.0);
        assert!((Wavelength(500.0).cycles_in(Millimeters(1.0)) - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Millimeters(12.5)), "12.50 mm");
        assert_eq!(format!("{}", Millimeters(2500.0)), "2.5000 m");
        assert_eq!(format!("{}", Wavelength::HENE), "632.8 nm");
    }
}
