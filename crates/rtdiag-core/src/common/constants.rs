//! Physical constants in CGS units used by the line catalog and panels.

pub const C: f64 = 29_979_245_800.0;
pub const ANGSTROM: f64 = 1.0e-8;
pub const PARSEC: f64 = 3.086e18;

/// Convert a rest wavelength in Angstroms to a frequency in Hz.
pub fn angstrom_to_hz(wavelength: f64) -> f64 {
    C / (wavelength * ANGSTROM)
}
