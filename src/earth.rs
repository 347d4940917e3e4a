//! Functions to do with the Earth

use crate::constants::{EARTH_FLATTENING, EARTH_R, KM_TO_MILES};
use crate::numerics::TINY;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[default]
    Kilometres,
    /// Statute miles (one of the many definitions of a mile).
    Miles,
}

/// A position on the Earth's surface, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPosition {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn from_degrees(lon: f64, lat: f64) -> Self {
        Self::new(lon.to_radians(), lat.to_radians())
    }
}

/// Compute the distance between two points over the Earth's surface.
///
/// Uses the Andoyer-Lambert approximation for a flattened Earth. Longitudes and latitudes are in
/// radians. Coincident positions have distance 0.
pub fn distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64, unit: DistanceUnit) -> f64 {
    let r_e = EARTH_R * 1e-3;
    let fl = EARTH_FLATTENING;

    let mlat = (lat1 + lat2) / 2.0;
    let dlat2 = (lat1 - lat2) / 2.0;
    let dlon2 = (lon1 - lon2) / 2.0;

    let sins = dlat2.sin().powi(2) * dlon2.cos().powi(2) + mlat.cos().powi(2) * dlon2.sin().powi(2);
    let coss = dlat2.cos().powi(2) * dlon2.cos().powi(2) + mlat.sin().powi(2) * dlon2.sin().powi(2);
    if sins == 0.0 {
        return 0.0;
    }
    let rat = sins.sqrt().atan2(coss.sqrt());

    let r = (sins * coss).sqrt() / (rat + TINY);
    let dist = 2.0 * r_e * rat;

    let h1 = (3.0 * r - 1.0) / (2.0 * coss + TINY);
    let h2 = (3.0 * r + 1.0) / (2.0 * sins + TINY);

    let km = dist
        * (1.0 + fl * h1 * mlat.sin().powi(2) * dlat2.cos().powi(2)
            - fl * h2 * mlat.cos().powi(2) * dlat2.sin().powi(2));

    match unit {
        DistanceUnit::Kilometres => km,
        DistanceUnit::Miles => km * KM_TO_MILES,
    }
}

/// Distance between two [`GeoPosition`]s.
pub fn distance_between(a: GeoPosition, b: GeoPosition, unit: DistanceUnit) -> f64 {
    distance(a.lon, a.lat, b.lon, b.lat, unit)
}

/// Distances from one origin to many destinations, computed in parallel.
pub fn distances_from(origin: GeoPosition, targets: &[GeoPosition], unit: DistanceUnit) -> Vec<f64> {
    targets
        .par_iter()
        .map(|t| distance_between(origin, *t, unit))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_distance_amsterdam_paris() {
        let ams = GeoPosition::from_degrees(4.9041, 52.3676);
        let par = GeoPosition::from_degrees(2.3522, 48.8566);
        let km = distance_between(ams, par, DistanceUnit::Kilometres);
        assert_abs_diff_eq!(km, 430.246, epsilon = 0.01);

        let mi = distance_between(ams, par, DistanceUnit::Miles);
        assert_abs_diff_eq!(mi, km * 0.62137119, epsilon = 1e-9);
    }

    #[test]
    fn test_degree_lengths() {
        let equator = distance(0.0, 0.0, 1f64.to_radians(), 0.0, DistanceUnit::Kilometres);
        assert_abs_diff_eq!(equator, 111.3195, epsilon = 1e-3);

        let meridian = distance(0.0, 0.0, 0.0, 1f64.to_radians(), DistanceUnit::Kilometres);
        assert_abs_diff_eq!(meridian, 110.5731, epsilon = 1e-3);
    }

    #[test]
    fn test_symmetric_and_zero() {
        let a = GeoPosition::from_degrees(5.0, 52.0);
        let b = GeoPosition::from_degrees(-70.0, -33.0);
        assert_abs_diff_eq!(
            distance_between(a, b, DistanceUnit::Kilometres),
            distance_between(b, a, DistanceUnit::Kilometres),
            epsilon = 1e-9
        );
        assert_eq!(distance_between(a, a, DistanceUnit::Kilometres), 0.0);

        let d = distances_from(a, &[a, b], DistanceUnit::Kilometres);
        assert_eq!(d.len(), 2);
        assert_eq!(d[0], 0.0);
        assert!(d[1] > 10_000.0);
    }
}
