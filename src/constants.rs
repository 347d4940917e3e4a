//! Physical and astronomical constants (SI units)

pub const PI: f64 = std::f64::consts::PI;

/// 2π
pub const PI2: f64 = 2.0 * PI;

/// Newton's gravitational constant (m³ kg⁻¹ s⁻²).
pub const G: f64 = 6.67430e-11;

/// Speed of light in vacuum (m/s).
pub const C: f64 = 2.99792458e8;

/// Reduced Planck constant (J s).
pub const H_BAR: f64 = 1.054571817e-34;

/// Solar mass (kg).
pub const SUN_M: f64 = 1.988409870698051e30;

/// Kilometre (m).
pub const KM: f64 = 1.0e3;

/// Earth's equatorial radius (m).
pub const EARTH_R: f64 = 6.3781366e6;

/// Earth's flattening.
pub const EARTH_FLATTENING: f64 = 0.003352810665;

/// Kilometres to (statute) miles.
pub const KM_TO_MILES: f64 = 0.62137119;
