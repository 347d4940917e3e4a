//! WP Forecast Reader
//! Reads the 36-hour forecasts per town from WP data files, combines today's file with the latest
//! one and smoothens the coarse wind and rain predictions.

use super::{
    absolute_humidity_from_tempc_rh, beaufort_to_wind_speed, dew_point_from_tempc_rh,
    wind_chill_temperature,
};
use crate::fit::{polyfit, polyval, CubicSpline, FitError};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Number of hourly rows in a forecast block.
const FORECAST_HOURS: usize = 36;
/// The location must be found within this many lines.
const MAX_HEADER_LINES: usize = 443;
const MAX_FIT_DEGREE: usize = 11;
/// Rain is interpolated up to this many hours after midnight.
const MAX_RAIN_HOURS: f64 = 49.0;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Fit error: {0}")]
    Fit(#[from] FitError),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// One forecast hour for a single location.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastHour {
    pub dtm: NaiveDateTime,
    /// Hours since midnight of the first forecast day.
    pub time: f64,
    /// Cloud cover (%).
    pub clouds: f64,
    /// Rain (mm/h).
    pub rain: f64,
    /// Air temperature (°C).
    pub temp: f64,
    /// Air pressure (hPa).
    pub press: f64,
    /// Relative humidity (%).
    pub rh: f64,
    /// Wind speed (m/s).
    pub ws: f64,
    /// Wind direction (°).
    pub wd: f64,
    /// Wind-chill temperature (°C).
    pub wchil: f64,
    /// Dew point (°C).
    pub dp: f64,
    /// Absolute humidity (g/m³).
    pub ah: f64,
    /// Smoothed wind speed (m/s), set by [`smoothen_36h_forecast_data`].
    pub ws_fit: Option<f64>,
}

impl ForecastHour {
    /// Fill NaN fields from another row for the same hour.
    fn fill_from(&mut self, other: &ForecastHour) {
        let pairs = [
            (&mut self.clouds, other.clouds),
            (&mut self.rain, other.rain),
            (&mut self.temp, other.temp),
            (&mut self.press, other.press),
            (&mut self.rh, other.rh),
            (&mut self.ws, other.ws),
            (&mut self.wd, other.wd),
            (&mut self.wchil, other.wchil),
            (&mut self.dp, other.dp),
            (&mut self.ah, other.ah),
        ];
        for (field, value) in pairs {
            if field.is_nan() {
                *field = value;
            }
        }
        if self.ws_fit.is_none() {
            self.ws_fit = other.ws_fit;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    pub hours: Vec<ForecastHour>,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.hours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    pub fn times(&self) -> Vec<f64> {
        self.hours.iter().map(|h| h.time).collect()
    }

    /// Combine two forecasts hour by hour: values from `self` win, missing values are taken
    /// from `other`.
    pub fn combine_first(self, other: Forecast) -> Forecast {
        let mut rows: BTreeMap<i64, ForecastHour> = BTreeMap::new();
        for hour in other.hours {
            rows.insert(time_key(hour.time), hour);
        }
        for mut hour in self.hours {
            let key = time_key(hour.time);
            if let Some(old) = rows.get(&key) {
                hour.fill_from(old);
            }
            rows.insert(key, hour);
        }
        Forecast {
            hours: rows.into_values().collect(),
        }
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let dtm: Vec<i64> = self
            .hours
            .iter()
            .map(|h| h.dtm.and_utc().timestamp_millis())
            .collect();
        let col = |name: &str, f: fn(&ForecastHour) -> f64| {
            Column::new(name.into(), self.hours.iter().map(f).collect::<Vec<f64>>())
        };

        DataFrame::new(vec![
            Column::new("dtm".into(), dtm)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
            col("time", |h| h.time),
            col("clouds", |h| h.clouds),
            col("rain", |h| h.rain),
            col("temp", |h| h.temp),
            col("press", |h| h.press),
            col("rh", |h| h.rh),
            col("ws", |h| h.ws),
            col("wd", |h| h.wd),
            col("wchil", |h| h.wchil),
            col("dp", |h| h.dp),
            col("ah", |h| h.ah),
            Column::new(
                "ws_fit".into(),
                self.hours.iter().map(|h| h.ws_fit).collect::<Vec<Option<f64>>>(),
            ),
        ])
    }
}

/// Rain interpolated on a fine time grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RainInterpolation {
    /// Hours since midnight of the first forecast day.
    pub time: Vec<f64>,
    /// Rain (mm/h).
    pub rain: Vec<f64>,
}

impl RainInterpolation {
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Column::new("time".into(), self.time.clone()),
            Column::new("rain".into(), self.rain.clone()),
        ])
    }
}

/// Hours are compared at millihour resolution.
fn time_key(time: f64) -> i64 {
    (time * 1000.0).round() as i64
}

/// Read the forecast for one location from a WP 36h data file.
///
/// Returns `None` when the location does not appear in the file header.
pub fn read_36h_forecast_file(path: &Path, loc: &str) -> Result<Option<Forecast>, ForecastError> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines().enumerate();

    let mut found = false;
    for (_, line) in lines.by_ref().take(MAX_HEADER_LINES) {
        if line?.contains(loc) {
            found = true;
            break;
        }
    }
    if !found {
        debug!(file = %path.display(), loc, "Location not found in forecast file");
        return Ok(None);
    }

    // Two column-header lines
    for (_, line) in lines.by_ref().take(2) {
        line?;
    }

    let mut hours = Vec::with_capacity(FORECAST_HOURS);
    let mut time0 = None;
    for (i, line) in lines {
        if hours.len() == FORECAST_HOURS {
            break;
        }
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<f64> = line
            .split_whitespace()
            .map(|s| s.parse().unwrap_or(f64::NAN))
            .collect();
        let field = |k: usize| fields.get(k).copied().unwrap_or(f64::NAN);

        let time = *time0.get_or_insert(field(3)) + hours.len() as f64;
        let dtm = row_datetime(field(0), field(1), field(2), time).ok_or_else(|| {
            ForecastError::Parse {
                line: i + 1,
                message: format!("invalid date/time in '{}'", line.trim()),
            }
        })?;

        let temp = field(6);
        let rh = field(8);
        let ws = beaufort_to_wind_speed(field(9));
        hours.push(ForecastHour {
            dtm,
            time,
            clouds: field(4),
            rain: field(5),
            temp,
            press: field(7),
            rh,
            ws,
            wd: field(10),
            wchil: wind_chill_temperature(temp, ws),
            dp: dew_point_from_tempc_rh(temp, rh / 100.0),
            ah: absolute_humidity_from_tempc_rh(temp, rh / 100.0),
            ws_fit: None,
        });
    }

    debug!(file = %path.display(), loc, rows = hours.len(), "Read forecast file");
    Ok(Some(Forecast { hours }))
}

fn row_datetime(year: f64, month: f64, day: f64, time: f64) -> Option<NaiveDateTime> {
    if !(year.is_finite() && month.is_finite() && day.is_finite() && time.is_finite()) {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)?;
    let hour = time.rem_euclid(24.0) as u32;
    Some(date.and_time(NaiveTime::from_hms_opt(hour, 0, 0)?))
}

/// Read today's full-day forecast and the latest forecast from `dir` and combine them.
///
/// The latest data take precedence; values missing there are filled from today's file.
/// Returns `None` when neither file has data for the location.
pub fn read_36h_forecast_data(
    dir: &Path,
    loc: &str,
    today: NaiveDate,
) -> Result<Option<Forecast>, ForecastError> {
    let today_file = dir.join(format!("wp_weer_{}_36h.dat", today.format("%Y-%m-%d")));
    let latest_file = dir.join("wp_weer_latest_36h.dat");

    let today_fc = read_optional(&today_file, loc)?;
    let latest_fc = read_optional(&latest_file, loc)?;

    let combined = match (latest_fc, today_fc) {
        (None, None) => None,
        (Some(fc), None) | (None, Some(fc)) => Some(fc),
        (Some(latest), Some(today)) => Some(latest.combine_first(today)),
    };
    if let Some(fc) = &combined {
        info!(loc, hours = fc.len(), "Combined WP forecast");
    }
    Ok(combined)
}

fn read_optional(path: &Path, loc: &str) -> Result<Option<Forecast>, ForecastError> {
    if !path.exists() {
        warn!(file = %path.display(), "Forecast file not found");
        return Ok(None);
    }
    read_36h_forecast_file(path, loc)
}

/// Smoothen the wind speed with a polynomial fit and interpolate the rain with a spline.
pub fn smoothen_36h_forecast_data(
    mut fc: Forecast,
) -> Result<(Forecast, RainInterpolation), ForecastError> {
    if fc.is_empty() {
        return Ok((fc, RainInterpolation::default()));
    }
    info!("Smoothening WP forecast");

    let times = fc.times();
    let ws: Vec<f64> = fc.hours.iter().map(|h| h.ws).collect();
    let degree = MAX_FIT_DEGREE.min(times.len() - 1);
    let coefs = polyfit(&times, &ws, degree, None)?;

    for hour in &mut fc.hours {
        let ws_fit = polyval(&coefs, hour.time).max(0.0);
        hour.ws_fit = Some(ws_fit);
        hour.ws = (hour.ws * 10.0).round() / 10.0;
        hour.wchil = wind_chill_temperature(hour.temp, ws_fit);
    }

    let rain: Vec<f64> = fc.hours.iter().map(|h| h.rain).collect();
    let spline = CubicSpline::new(&times, &rain)?;
    let last = times[times.len() - 1];
    let range = (last + 1.0).min(MAX_RAIN_HOURS);
    let npts = (range * 10.0).round().max(0.0) as usize + 1;
    let grid: Vec<f64> = (0..npts).map(|k| k as f64 / 10.0).collect();
    let rain_ipol = RainInterpolation {
        rain: spline.eval_many(&grid).into_iter().map(|r| r.max(0.0)).collect(),
        time: grid,
    };

    debug!(points = rain_ipol.time.len(), "Interpolated WP rain");
    Ok((fc, rain_ipol))
}
