//! Sluyspy - command-line front end
//!
//! Runs the fit example, reads WP forecasts, computes distances and shows the environment.

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sluyspy::charts::{Figure, LineStyle, PlotStyle, PlotType};
use sluyspy::constants::PI2;
use sluyspy::earth::{distance_between, DistanceUnit, GeoPosition};
use sluyspy::fit::{curve_fit_chi2, LmOptions, ReportDetail, ReportOptions};
use sluyspy::numerics::linspace;
use sluyspy::weather::{read_36h_forecast_data, smoothen_36h_forecast_data};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "sluyspy", version, about = "Scientific helper functions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fit a sine to noisy data, print the fit report and plot the result.
    FitDemo {
        /// Output image.
        #[arg(short, long, default_value = "fit-example.png")]
        out: PathBuf,

        /// Number of data points.
        #[arg(short = 'n', long, default_value_t = 100)]
        points: usize,

        /// Random seed for the noise.
        #[arg(short, long, default_value_t = 1)]
        seed: u64,
    },
    /// Read, combine and smoothen the WP 36-hour forecast for a location.
    Forecast {
        /// Directory containing the wp_weer_*_36h.dat files.
        #[arg(short, long, env = "SLUYSPY_WPW_DIR")]
        dir: PathBuf,

        /// Location name as it appears in the forecast file.
        #[arg(short, long)]
        loc: String,

        /// Date of today's forecast file (default: today).
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Distance over the Earth's surface between two positions in degrees.
    Distance {
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lon2: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,

        /// Print the distance in miles rather than kilometres.
        #[arg(long)]
        miles: bool,
    },
    /// Print the computing environment as JSON.
    Env {
        /// Configuration file (default: ~/.python_environment.cfg).
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    sluyspy::init_logging("info");

    match Cli::parse().command {
        Command::FitDemo { out, points, seed } => fit_demo(out, points, seed),
        Command::Forecast { dir, loc, date } => forecast(dir, &loc, date),
        Command::Distance {
            lon1,
            lat1,
            lon2,
            lat2,
            miles,
        } => {
            let unit = if miles {
                DistanceUnit::Miles
            } else {
                DistanceUnit::Kilometres
            };
            let d = distance_between(
                GeoPosition::from_degrees(lon1, lat1),
                GeoPosition::from_degrees(lon2, lat2),
                unit,
            );
            println!("{d:.3} {}", if miles { "mi" } else { "km" });
            Ok(())
        }
        Command::Env { config } => {
            let env = sluyspy::config::environment(config.as_deref())
                .context("Failed to read the environment configuration")?;
            println!("{}", env.to_json()?);
            Ok(())
        }
    }
}

/// Offset, amplitude, angular scale and phase.
fn fitfun(x: f64, c: &[f64]) -> f64 {
    c[0] + c[1] * (c[2] / PI2 * x + c[3]).sin()
}

/// Standard normal deviate (Box-Muller).
fn normal(rng: &mut StdRng) -> f64 {
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (PI2 * u2).cos()
}

fn fit_demo(out: PathBuf, points: usize, seed: u64) -> Result<()> {
    if points < 5 {
        bail!("Need at least 5 points to fit 4 coefficients, got {points}");
    }
    let coefs_true = [1.0, 2.0, 3.0, 4.0];
    let sigma = 0.5 * coefs_true[1];
    let mut rng = StdRng::seed_from_u64(seed);

    let time = linspace(0.0, 2.0 * coefs_true[2] * PI2, points);
    let signal: Vec<f64> = time.iter().map(|&t| fitfun(t, &coefs_true)).collect();
    let data: Vec<f64> = signal
        .iter()
        .map(|&s| s + sigma * normal(&mut rng))
        .collect();
    let coefs0: Vec<f64> = coefs_true
        .iter()
        .map(|&c| c * (1.0 + 0.1 * normal(&mut rng)))
        .collect();

    let fit = curve_fit_chi2(fitfun, &time, &data, &coefs0, None, &LmOptions::default())
        .context("Fit failed")?;
    info!(
        evaluations = fit.evaluations,
        iterations = fit.iterations,
        "Fit converged"
    );

    let opts = ReportOptions {
        detail: ReportDetail::Coefficients,
        coef_names: Some(
            ["offset", "amplitude", "scale", "phase"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ),
        ..Default::default()
    };
    print!("{}", fit.quality.report(&opts));
    println!("coefs:     {:?}", fit.coefs);
    println!("dcoefs:    {:?}", fit.dcoefs);
    println!("red_chi2:  {}", fit.red_chi2);
    println!("var_cov:\n{}", fit.var_cov);

    let model: Vec<f64> = time.iter().map(|&t| fitfun(t, &fit.coefs)).collect();
    let mut fig = Figure::new(PlotStyle::new(PlotType::Both));
    fig.title("Sluyspy fit example plot")
        .labels("Time", "Data")
        .legend(true)
        .grid(true);
    fig.line(&time, &signal, LineStyle::Solid, Some("signal"))?;
    fig.line(&time, &data, LineStyle::Markers, Some("data"))?;
    fig.line(&time, &model, LineStyle::Dashed, Some("fit"))?;
    fig.save(&out)
        .with_context(|| format!("Failed to save {}", out.display()))?;
    info!(file = %out.display(), "Plot saved");
    Ok(())
}

fn forecast(dir: PathBuf, loc: &str, date: Option<NaiveDate>) -> Result<()> {
    let today = date.unwrap_or_else(|| Local::now().date_naive());
    let Some(fc) = read_36h_forecast_data(&dir, loc, today)
        .with_context(|| format!("Failed to read forecasts from {}", dir.display()))?
    else {
        bail!("No forecast data for {loc} in {}", dir.display());
    };
    let (fc, rain) = smoothen_36h_forecast_data(fc).context("Failed to smoothen the forecast")?;

    println!("{}", fc.to_dataframe()?);
    info!(points = rain.time.len(), "Rain interpolated");
    Ok(())
}
