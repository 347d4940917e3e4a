//! Compact Binary Coalescence Waveforms
//! Newtonian (!) inspiral signals in the time and frequency domain.

use super::GwError;
use crate::constants::{C, G, KM, PI, SUN_M};
use crate::numerics::{linspace, logspace10};
use polars::prelude::*;
use tracing::debug;

/// Neutron stars are assumed to have this radius; 11.5 km is also the Schwarzschild radius of a
/// 3.9 M☉ black hole.
const NS_RADIUS: f64 = 11.5 * KM;
const NS_MAX_MASS: f64 = 3.9 * SUN_M;

/// A compact binary: component masses (kg), distance (m) and cosine of the inclination
/// (±1 = face on, 0 = edge on).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binary {
    pub m1: f64,
    pub m2: f64,
    pub dist: f64,
    pub cosi: f64,
}

impl Binary {
    pub fn new(m1: f64, m2: f64, dist: f64, cosi: f64) -> Self {
        Self { m1, m2, dist, cosi }
    }

    pub fn total_mass(&self) -> f64 {
        self.m1 + self.m2
    }

    pub fn reduced_mass(&self) -> f64 {
        self.m1 * self.m2 / self.total_mass()
    }

    pub fn chirp_mass(&self) -> f64 {
        (self.m1 * self.m2 / self.total_mass().powf(1.0 / 3.0)).powf(3.0 / 5.0)
    }

    /// GW frequency at the innermost stable circular orbit (Hz).
    pub fn f_isco(&self) -> f64 {
        C.powi(3) / (6f64.powf(1.5) * PI * G * self.total_mass())
    }

    fn validate(&self) -> Result<(), GwError> {
        if !(self.m1 > 0.0 && self.m2 > 0.0) {
            return Err(GwError::InvalidInput("masses must be positive".into()));
        }
        if !(self.dist > 0.0) {
            return Err(GwError::InvalidInput("distance must be positive".into()));
        }
        Ok(())
    }

    /// Fourier amplitude h~(f) in 1/Hz.
    fn htilde(&self, fgw: f64) -> f64 {
        PI.powf(-2.0 / 3.0) * (5.0f64 / 24.0).sqrt() * C / self.dist
            * (G * self.chirp_mass() / C.powi(3)).powf(5.0 / 6.0)
            * fgw.powf(-7.0 / 6.0)
    }
}

fn component_radius(m: f64) -> f64 {
    if m < NS_MAX_MASS {
        NS_RADIUS
    } else {
        2.0 * G * m / C.powi(2)
    }
}

/// Compute a simple, Newtonian compact-binary-coalescence waveform.
///
/// The time grid has `npts` points from `tcoal - tlen` to `tcoal`. Points where the GW frequency
/// exceeds c³/(πGM) are dropped.
pub fn cbc_waveform(
    binary: &Binary,
    tlen: f64,
    tcoal: f64,
    npts: usize,
) -> Result<DataFrame, GwError> {
    binary.validate()?;

    let mt = binary.total_mass();
    let mu = binary.reduced_mass();
    let mc = binary.chirp_mass();
    let (m1, m2, dist, cosi) = (binary.m1, binary.m2, binary.dist, binary.cosi);

    let f_isco = binary.f_isco();
    let f_max = C.powi(3) / (PI * G * mt);
    debug!(f_isco, f_max, "cbc_waveform cut-off frequencies");

    let gmcc3 = G * mc / C.powi(3);
    let rs = 2.0 * G * mt / C.powi(2);

    let mut time = Vec::new();
    let mut fgw = Vec::new();
    for t in linspace(tcoal - tlen, tcoal, npts) {
        let f = 1.0 / PI * (5.0 / 256.0 / (tcoal - t)).powf(3.0 / 8.0) * gmcc3.powf(-5.0 / 8.0);
        if f < f_max {
            time.push(t);
            fgw.push(f);
        }
    }

    let dfdt: Vec<f64> = fgw
        .iter()
        .map(|f| 96.0 / 5.0 * PI.powf(8.0 / 3.0) * gmcc3.powf(5.0 / 3.0) * f.powf(11.0 / 3.0))
        .collect();
    let worb: Vec<f64> = fgw.iter().map(|f| f / 2.0 * 2.0 * PI).collect();
    let aorb: Vec<f64> = worb
        .iter()
        .map(|w| (G * mt / w.powi(2)).powf(1.0 / 3.0))
        .collect();
    let aorb_risco: Vec<f64> = aorb.iter().map(|a| a / rs / 6.0).collect();
    let vorb1: Vec<f64> = worb
        .iter()
        .zip(&aorb)
        .map(|(w, a)| w * a * m2 / mt / C)
        .collect();
    let vorb2: Vec<f64> = worb
        .iter()
        .zip(&aorb)
        .map(|(w, a)| w * a * m1 / mt / C)
        .collect();
    let ampl: Vec<f64> = worb
        .iter()
        .zip(&aorb)
        .map(|(w, a)| 4.0 / dist * G / C.powi(4) * mu * a.powi(2) * w.powi(2))
        .collect();

    let mut hpl = Vec::with_capacity(time.len());
    let mut hcr = Vec::with_capacity(time.len());
    let mut h = Vec::with_capacity(time.len());
    for ((t, w), a) in time.iter().zip(&worb).zip(&ampl) {
        let phase = 2.0 * w * (t - tcoal);
        let plus = a * (1.0 + cosi.powi(2)) / 2.0 * phase.cos();
        let cross = a * cosi * phase.sin();
        hpl.push(plus);
        hcr.push(cross);
        h.push((plus + cross) / 2.0 * 1e21);
    }
    let htilde: Vec<f64> = fgw.iter().map(|&f| binary.htilde(f)).collect();

    let df = DataFrame::new(vec![
        Column::new("time".into(), time),
        Column::new("fgw".into(), fgw),
        Column::new("dfdt".into(), dfdt),
        Column::new("worb".into(), worb),
        Column::new("aorb".into(), aorb),
        Column::new("aorb_Risco".into(), aorb_risco),
        Column::new("vorb1".into(), vorb1),
        Column::new("vorb2".into(), vorb2),
        Column::new("ampl".into(), ampl),
        Column::new("hpl".into(), hpl),
        Column::new("hcr".into(), hcr),
        Column::new("h".into(), h),
        Column::new("htilde".into(), htilde),
    ])?;

    Ok(df)
}

/// Compute a Newtonian CBC waveform amplitude in the frequency domain.
///
/// Frequencies are log-spaced between `f_low` and `f_high`; those above the Kepler frequency
/// for an orbit of 1.5 × the sum of the component radii are dropped. Output columns:
/// `fgw` (Hz), `htilde` (1/Hz) and `htilde_pSqrtHz` (1/√Hz).
pub fn cbc_waveform_frequency(
    binary: &Binary,
    f_low: f64,
    f_high: f64,
    npts: usize,
) -> Result<DataFrame, GwError> {
    binary.validate()?;
    if !(f_low > 0.0 && f_high > f_low) {
        return Err(GwError::InvalidInput(format!(
            "need 0 < f_low < f_high, got {f_low} and {f_high}"
        )));
    }

    let mt = binary.total_mass();
    let a_min = component_radius(binary.m1) + component_radius(binary.m2);
    let f_max = 1.0 / PI * (G * mt / (1.5 * a_min).powi(3)).sqrt();
    debug!(
        f_low,
        f_high,
        rs_km = 2.0 * G * mt / C.powi(2) / 1000.0,
        f_isco = binary.f_isco(),
        f_max,
        "cbc_waveform_frequency cut-off frequencies"
    );

    let fgw: Vec<f64> = logspace10(f_low, f_high, npts)
        .into_iter()
        .filter(|&f| f < f_max)
        .collect();
    let htilde: Vec<f64> = fgw.iter().map(|&f| binary.htilde(f)).collect();
    let per_sqrt_hz: Vec<f64> = htilde.iter().zip(&fgw).map(|(h, f)| h * f.sqrt()).collect();

    let df = DataFrame::new(vec![
        Column::new("fgw".into(), fgw),
        Column::new("htilde".into(), htilde),
        Column::new("htilde_pSqrtHz".into(), per_sqrt_hz),
    ])?;

    Ok(df)
}
