//! Solar Power Under Real Skies
//! Empirical fits of the power from an overcast sky as a function of rain.

use super::SolarError;

/// Below this rain rate (mm/h) the quadratic branch of the fits applies.
const RAIN_SPLIT: f64 = 0.05;

/// P/P_clear from an overcast sky, as a function of rain (mm/h).
///
/// Fit to the means of the rain bins.
pub fn cloud_power_from_rain_means(rain: f64) -> f64 {
    if rain > RAIN_SPLIT {
        0.74 * (-(rain + 2.97) / 2.3).exp()
    } else {
        80.0 * rain * rain - 8.0 * rain + 0.4 - 0.0009
    }
}

/// P/P_clear from an overcast sky, as a function of rain (mm/h).
///
/// Fit to the medians of the rain bins.
pub fn cloud_power_from_rain_medians(rain: f64) -> f64 {
    if rain > RAIN_SPLIT {
        2.06 * (-(rain + 10.67) / 3.78).exp()
    } else {
        52.0 * rain * rain - 5.2 * rain + 0.25 + 0.00085
    }
}

pub fn cloud_powers_from_rain_means(rain: &[f64]) -> Vec<f64> {
    rain.iter().map(|&r| cloud_power_from_rain_means(r)).collect()
}

pub fn cloud_powers_from_rain_medians(rain: &[f64]) -> Vec<f64> {
    rain.iter().map(|&r| cloud_power_from_rain_medians(r)).collect()
}

/// Solar power from a realistic sky, from the clear-sky power, cloud cover (%) and rain (mm/h).
///
/// The rain intensity where it rains is rain / cloud cover; the result is the cloud-cover weighted
/// sum of the clear and the overcast contributions, in the unit of `p_clear`.
pub fn solar_power_from_true_sky(
    p_clear: &[f64],
    cloud_cover: &[f64],
    rain: &[f64],
) -> Result<Vec<f64>, SolarError> {
    let n = p_clear.len();
    for got in [cloud_cover.len(), rain.len()] {
        if got != n {
            return Err(SolarError::LengthMismatch { expected: n, got });
        }
    }

    Ok(p_clear
        .iter()
        .zip(cloud_cover)
        .zip(rain)
        .map(|((&p, &clouds), &rain)| {
            let rain_int = if clouds > 0.0 {
                rain / clouds * 100.0
            } else {
                rain
            };
            let pp_clouds = cloud_power_from_rain_means(rain_int);
            p * (pp_clouds * clouds + 100.0 - clouds) / 100.0
        })
        .collect())
}
