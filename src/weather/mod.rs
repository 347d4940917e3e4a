//! Weather module - derived weather quantities and WP forecast data

pub mod forecast;

pub use forecast::{
    read_36h_forecast_data, read_36h_forecast_file, smoothen_36h_forecast_data, Forecast,
    ForecastError, ForecastHour, RainInterpolation,
};

/// Wind speed below which the wind chill is capped at the air temperature (m/s).
const CALM_WIND: f64 = 1.3;

/// Magnus-formula coefficients for the dew point.
const MAGNUS_B: f64 = 17.62;
const MAGNUS_C: f64 = 243.12;

/// Wind-chill ("real-feel") temperature in °C.
///
/// `temp` is the air temperature at 1.5 m (°C), `wind_vel` the wind velocity at 10 m (m/s); the
/// power 0.16 converts the latter to 1.5 m. The result is rounded to 0.1 °C.
pub fn wind_chill_temperature(temp: f64, wind_vel: f64) -> f64 {
    let mut wchil = 13.12 + 0.6215 * temp + (0.4867 * temp - 13.96) * wind_vel.powf(0.16);
    if wind_vel < CALM_WIND {
        wchil = wchil.min(temp);
    }
    (wchil * 10.0).round() / 10.0
}

/// Element-wise [`wind_chill_temperature`]; the shorter slice sets the length.
pub fn wind_chill_temperatures(temp: &[f64], wind_vel: &[f64]) -> Vec<f64> {
    temp.iter()
        .zip(wind_vel)
        .map(|(&t, &v)| wind_chill_temperature(t, v))
        .collect()
}

/// Dew point (°C) from the temperature (°C) and the relative humidity (fraction).
pub fn dew_point_from_tempc_rh(temp: f64, rh: f64) -> f64 {
    let gamma = rh.ln() + MAGNUS_B * temp / (MAGNUS_C + temp);
    MAGNUS_C * gamma / (MAGNUS_B - gamma)
}

/// Absolute humidity (g/m³) from the temperature (°C) and the relative humidity (fraction).
pub fn absolute_humidity_from_tempc_rh(temp: f64, rh: f64) -> f64 {
    let p_sat = 6.112 * (17.67 * temp / (temp + 243.5)).exp(); // hPa
    p_sat * rh * 100.0 * 2.1674 / (273.15 + temp)
}

/// Convert wind force (Beaufort) to wind speed (m/s): v = 0.836 B^1.5.
pub fn beaufort_to_wind_speed(force: f64) -> f64 {
    0.836 * force.powf(1.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_wind_chill() {
        assert_eq!(wind_chill_temperature(-5.0, 5.0), -11.2);
        assert_eq!(wind_chill_temperature(10.0, 10.0), 6.2);
        // Calm: never above the air temperature
        assert_eq!(wind_chill_temperature(20.0, 1.0), 20.0);
        assert_eq!(wind_chill_temperature(0.0, 0.0), 0.0);

        assert_eq!(
            wind_chill_temperatures(&[-5.0, 20.0], &[5.0, 1.0]),
            vec![-11.2, 20.0]
        );
    }

    #[test]
    fn test_humidity() {
        assert_abs_diff_eq!(dew_point_from_tempc_rh(20.0, 0.5), 9.255, epsilon = 1e-2);
        // Saturated air: dew point equals the temperature
        assert_abs_diff_eq!(dew_point_from_tempc_rh(15.0, 1.0), 15.0, epsilon = 1e-10);
        assert_abs_diff_eq!(absolute_humidity_from_tempc_rh(20.0, 0.5), 8.64, epsilon = 1e-2);
    }

    #[test]
    fn test_beaufort() {
        assert_eq!(beaufort_to_wind_speed(0.0), 0.0);
        assert_abs_diff_eq!(beaufort_to_wind_speed(4.0), 6.688, epsilon = 1e-12);
    }
}
