//! Solar-Panel Data
//! Reads the inverter's detailed log and writes SBFspot-style daily files.

use super::SolarError;
use crate::config::{ConfigError, IniConfig};
use crate::data::column_f64;
use crate::earth::GeoPosition;
use crate::numerics::{sprintf, Arg};
use crate::system;
use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use csv::{ReaderBuilder, StringRecord, Trim};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Columns of the detailed log, in file order; `x0`-`x9` are always zero.
pub const DETAILED_LOG_COLUMNS: [&str; 32] = [
    "date", "time", "SN1", "Type", "SN2", "Pdc", "x0", "Idc", "x1", "Vdc", "x2", "Pac", "x3",
    "x4", "Iac", "x5", "x6", "Vac", "x7", "x8", "Pdc2", "Pac2", "x9", "Eday", "Etot", "Freq",
    "t_oper", "t_feedin", "Btooth", "Cond", "Relay", "Tinv",
];

const TEXT_COLUMNS: [&str; 7] = ["date", "time", "SN1", "Type", "SN2", "Cond", "Relay"];

/// Constant, duplicate, always-zero and uninteresting columns.
const DEFAULT_DROPPED: [&str; 19] = [
    "SN1", "SN2", "Type", "Pdc2", "Pac2", "x0", "x1", "x2", "x3", "x4", "x5", "x6", "x7", "x8",
    "x9", "Eday", "t_oper", "t_feedin", "Btooth",
];
const STATUS_COLUMNS: [&str; 3] = ["Relay", "Cond", "Tinv"];
const ELECTRIC_COLUMNS: [&str; 6] = ["Pdc", "Idc", "Vdc", "Iac", "Vac", "Freq"];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%d/%m/%Y %H:%M:%S"];

/// Specifications of a solar-panel plant.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSpecs {
    pub name: String,
    /// Time zone of the inverter clock, e.g. `Europe/Amsterdam`.
    pub tz: String,
    pub inv_sn: String,
    pub inv_model: String,
    /// Geographic longitude (°, east positive).
    pub geo_lon: f64,
    /// Geographic latitude (°).
    pub geo_lat: f64,
}

impl PanelSpecs {
    /// Read the specs from an INI section with keys `name`, `tz`, `inv_sn`, `inv_model`,
    /// `geo_lon` and `geo_lat`.
    pub fn from_ini(ini: &IniConfig, section: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            name: ini.require(section, "name")?.to_string(),
            tz: ini.require(section, "tz")?.to_string(),
            inv_sn: ini.require(section, "inv_sn")?.to_string(),
            inv_model: ini.require(section, "inv_model")?.to_string(),
            geo_lon: ini.parse_value(section, "geo_lon")?,
            geo_lat: ini.parse_value(section, "geo_lat")?,
        })
    }

    pub fn from_file(path: &Path, section: &str) -> Result<Self, ConfigError> {
        Self::from_ini(&IniConfig::from_file(path)?, section)
    }

    pub fn position(&self) -> GeoPosition {
        GeoPosition::from_degrees(self.geo_lon, self.geo_lat)
    }

    fn time_zone(&self) -> Result<Tz, SolarError> {
        parse_tz(&self.tz)
    }
}

fn parse_tz(name: &str) -> Result<Tz, SolarError> {
    name.parse()
        .map_err(|_| SolarError::InvalidTimeZone(name.to_string()))
}

/// Options for [`read_detailed_log`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOptions {
    /// Only read the last N lines of the (long) log.
    pub last_only: Option<usize>,
    /// Index of the header line; it and all lines before it are skipped.
    pub header: Option<usize>,
    /// Remove constant, duplicate and uninteresting columns.
    pub rem_cols: bool,
    /// Remove rows without power (relay not closed, condition not Ok, Pdc or Pac zero).
    pub no_p0rows: bool,
    /// Remove the electricity details (DC/AC voltages and currents, Pdc, frequency).
    pub no_elec: bool,
    /// Remove the status columns (Cond, Relay, Tinv).
    pub no_cond: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            last_only: None,
            header: None,
            rem_cols: true,
            no_p0rows: false,
            no_elec: false,
            no_cond: true,
        }
    }
}

/// Read the inverter's comma-separated detailed log.
///
/// The result has a time-zone aware `dtm` column (in the plant's time zone) instead of the
/// `date` and `time` columns, and Pdc and Pac recomputed from current and voltage.
pub fn read_detailed_log(
    path: &Path,
    opts: &ReadOptions,
    specs: &PanelSpecs,
) -> Result<DataFrame, SolarError> {
    let tz = specs.time_zone()?;
    let records = match opts.last_only {
        Some(n) => {
            let text = system::tail_lines(path, n)?.join("\n");
            read_records(text.as_bytes())?
        }
        None => read_records(File::open(path)?)?,
    };
    let skip = opts.header.map_or(0, |h| h + 1);
    let records = records.get(skip..).unwrap_or_default();
    debug!(file = %path.display(), rows = records.len(), "Read detailed log");

    let mut df = records_to_frame(records)?;

    if opts.rem_cols {
        df = drop_columns(df, &DEFAULT_DROPPED)?;
    }

    if opts.no_p0rows {
        df = df
            .lazy()
            .filter(
                col("Relay")
                    .eq(lit("Closed"))
                    .and(col("Cond").eq(lit("Ok")))
                    .and(col("Pdc").gt(lit(0.0)))
                    .and(col("Pac").gt(lit(0.0))),
            )
            .collect()?;
        df = drop_columns(df, &STATUS_COLUMNS)?;
    } else if opts.no_cond {
        df = drop_columns(df, &STATUS_COLUMNS)?;
    }

    // Slightly more significant digits than the logged powers
    df = df
        .lazy()
        .with_columns([
            (col("Idc") * col("Vdc")).alias("Pdc"),
            (col("Iac") * col("Vac")).alias("Pac"),
        ])
        .collect()?;

    if opts.no_elec {
        df = drop_columns(df, &ELECTRIC_COLUMNS)?;
    }

    let dtm = localised_datetimes(&df, &tz)?;
    df.with_column(
        Column::new("dtm".into(), dtm).cast(&DataType::Datetime(
            TimeUnit::Milliseconds,
            Some(specs.tz.as_str().into()),
        ))?,
    )?;

    let mut order = vec!["dtm".to_string()];
    order.extend(
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .filter(|s| !matches!(s.as_str(), "dtm" | "date" | "time")),
    );
    Ok(df.select(order)?)
}

fn read_records<R: Read>(reader: R) -> Result<Vec<StringRecord>, csv::Error> {
    ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader)
        .records()
        .collect()
}

fn records_to_frame(records: &[StringRecord]) -> PolarsResult<DataFrame> {
    let columns = DETAILED_LOG_COLUMNS
        .iter()
        .enumerate()
        .map(|(k, &name)| {
            if TEXT_COLUMNS.contains(&name) {
                let values: Vec<Option<String>> = records
                    .iter()
                    .map(|r| field(r, k).map(str::to_string))
                    .collect();
                Column::new(name.into(), values)
            } else {
                let values: Vec<Option<f64>> = records
                    .iter()
                    .map(|r| field(r, k).and_then(|s| s.parse().ok()))
                    .collect();
                Column::new(name.into(), values)
            }
        })
        .collect();
    DataFrame::new(columns)
}

fn field(record: &StringRecord, k: usize) -> Option<&str> {
    record.get(k).filter(|s| !s.is_empty())
}

fn drop_columns(df: DataFrame, names: &[&str]) -> PolarsResult<DataFrame> {
    let keep: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .filter(|s| !names.contains(&s.as_str()))
        .collect();
    df.select(keep)
}

/// Combine the date and time columns into UTC milliseconds, reading them as local plant time.
fn localised_datetimes(df: &DataFrame, tz: &Tz) -> Result<Vec<Option<i64>>, SolarError> {
    let dates = df.column("date")?.str()?;
    let times = df.column("time")?.str()?;

    dates
        .into_iter()
        .zip(times)
        .map(|(date, time)| {
            let (Some(date), Some(time)) = (date, time) else {
                return Ok(None);
            };
            let text = format!("{date} {time}");
            let naive = DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(&text, f).ok())
                .ok_or_else(|| SolarError::Time(text.clone()))?;
            // Ambiguous times at the end of summer time take the first occurrence
            let local = tz
                .from_local_datetime(&naive)
                .earliest()
                .ok_or(SolarError::Time(text))?;
            Ok(Some(local.timestamp_millis()))
        })
        .collect()
}

/// Local date-times of a datetime column, in its own time zone (UTC when it has none).
fn local_datetimes(column: &Column) -> Result<Vec<Option<NaiveDateTime>>, SolarError> {
    let DataType::Datetime(unit, tz) = column.dtype() else {
        return Err(SolarError::NotDatetime(column.dtype().to_string()));
    };
    let tz = tz.as_ref().map(|t| parse_tz(t.as_str())).transpose()?;
    let per_ms = match unit {
        TimeUnit::Nanoseconds => 1_000_000,
        TimeUnit::Microseconds => 1_000,
        TimeUnit::Milliseconds => 1,
    };

    let ints = column.cast(&DataType::Int64)?;
    Ok(ints
        .i64()?
        .into_iter()
        .map(|v| {
            let utc = DateTime::from_timestamp_millis(v?.div_euclid(per_ms))?;
            Some(match tz {
                Some(tz) => utc.with_timezone(&tz).naive_local(),
                None => utc.naive_utc(),
            })
        })
        .collect())
}

/// Write one day of solar-panel data (columns `dtm`, `Etot` in kWh and `Pac` in W) to
/// `dir/prefix-YYYYMMDD.ext` in SBFspot format.
///
/// The prefix defaults to the plant name. Returns the file written, or `None` for an empty frame.
pub fn write_day_file(
    df: &DataFrame,
    dir: &Path,
    prefix: Option<&str>,
    ext: &str,
    specs: &PanelSpecs,
) -> Result<Option<PathBuf>, SolarError> {
    if df.height() == 0 {
        info!("No data available, no file created");
        return Ok(None);
    }

    let dtm = local_datetimes(df.column("dtm")?)?;
    let etot = column_f64(df, "Etot")?;
    let pac = column_f64(df, "Pac")?;

    let Some(first) = dtm.iter().flatten().next() else {
        info!("No valid times available, no file created");
        return Ok(None);
    };
    let prefix = prefix.unwrap_or(&specs.name);
    let path = dir.join(format!("{}-{}.{}", prefix, first.format("%Y%m%d"), ext));
    info!(file = %path.display(), "Saving day file");

    let mut out = BufWriter::new(File::create(&path)?);
    writeln!(out, "sep=;")?;
    writeln!(
        out,
        "Version CSV1|Tool SBFspot3.3.1 (Linux)|Linebreaks CR/LF|Delimiter semicolon|Decimalpoint dot|Precision 3"
    )?;
    writeln!(out)?;
    writeln!(out, ";SN: {0};SN: {0}", specs.inv_sn)?;
    writeln!(out, ";{0};{0}", specs.inv_model)?;
    writeln!(out, ";{0};{0}", specs.inv_sn)?;
    writeln!(out, ";Total yield;Power")?;
    writeln!(out, ";Counter;Analog")?;
    writeln!(out, "yyyy-MM-dd;HH:mm:ss;kWh;kW")?;

    for ((t, e), p) in dtm.iter().zip(&etot).zip(&pac) {
        let Some(t) = t else { continue };
        let args: [Arg; 4] = [
            t.format("%Y-%m-%d").to_string().into(),
            t.format("%H:%M:%S").to_string().into(),
            (*e).into(),
            (p / 1e3).into(),
        ];
        writeln!(out, "{}", sprintf("%s;%s;%0.3f;%5.3f", &args)?)?;
    }
    out.flush()?;
    Ok(Some(path))
}
