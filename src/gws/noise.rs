//! Interferometer Noise Curves
//! Simplified amplitude spectral density: shot noise, radiation pressure and an ad-hoc seismic wall.

use super::GwError;
use crate::constants::{C, H_BAR, PI, PI2};
use crate::numerics::logspace10;
use polars::prelude::*;
use tracing::debug;

const SEISMIC_ISOLATION: f64 = 1e-4;
/// m Hz^(3/2)
const SEISMIC_ALPHA: f64 = 1e-6;
const SEISMIC_POWER: i32 = 6;

/// Design parameters of a (simplified) laser interferometer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interferometer {
    /// Arm length (m).
    pub length: f64,
    /// Laser power (W).
    pub laser_power: f64,
    /// Laser wavelength (m).
    pub laser_wavelength: f64,
    /// Photodetector efficiency (0-1).
    pub photodetector_efficiency: f64,
    /// Mass of the end mirror / test mass (kg).
    pub mirror_mass: f64,
    /// Reflectivity of the input mirrors of the Fabry-Perot cavity (0-1).
    pub r_in: f64,
    /// Reflectivity of the end mirrors (0-1).
    pub r_end: f64,
    /// Power-recycling factor (>= 1).
    pub power_recycling: f64,
    /// Use Fabry-Perot cavities in the arms.
    pub fabry_perot: bool,
}

impl Interferometer {
    /// Cavity finesse; π/2 without Fabry-Perot cavities.
    pub fn finesse(&self) -> f64 {
        if self.fabry_perot {
            let rr = self.r_in * self.r_end;
            PI * rr.sqrt() / (1.0 - rr)
        } else {
            PI / 2.0
        }
    }

    /// Cavity pole frequency (Hz); 0 without Fabry-Perot cavities.
    pub fn pole_frequency(&self) -> f64 {
        if self.fabry_perot {
            C / (4.0 * self.finesse() * self.length)
        } else {
            0.0
        }
    }

    fn pole_factor(&self, freq: f64) -> f64 {
        if self.fabry_perot {
            (1.0 + (freq / self.pole_frequency()).powi(2)).sqrt()
        } else {
            1.0
        }
    }

    fn validate(&self) -> Result<(), GwError> {
        let positive = [
            ("length", self.length),
            ("laser_power", self.laser_power),
            ("laser_wavelength", self.laser_wavelength),
            ("photodetector_efficiency", self.photodetector_efficiency),
            ("mirror_mass", self.mirror_mass),
            ("power_recycling", self.power_recycling),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| !(*v > 0.0)) {
            return Err(GwError::InvalidInput(format!("{name} must be positive")));
        }
        if self.fabry_perot && !(self.r_in * self.r_end < 1.0) {
            return Err(GwError::InvalidInput(
                "mirror reflectivities must be below 1".into(),
            ));
        }
        Ok(())
    }
}

/// Compute a simplified noise curve for a gravitational-wave interferometer.
///
/// Output columns: `freq`, `asd_shot`, `asd_rad`, `asd_seis` and their sum `asd` (1/√Hz).
pub fn noise_curve(
    ifo: &Interferometer,
    f_low: f64,
    f_high: f64,
    npts: usize,
) -> Result<DataFrame, GwError> {
    ifo.validate()?;
    if !(f_low > 0.0 && f_high > f_low) {
        return Err(GwError::InvalidInput(format!(
            "need 0 < f_low < f_high, got {f_low} and {f_high}"
        )));
    }

    let freq = logspace10(f_low, f_high, npts);
    let fin = ifo.finesse();
    let len = ifo.length;
    let power = ifo.power_recycling * ifo.laser_power;
    let lam = ifo.laser_wavelength;

    let shot0 = 1.0 / (8.0 * fin * len)
        * ((4.0 * PI * H_BAR * C * lam) / (ifo.photodetector_efficiency * power)).sqrt();
    let rad0 = 16.0 * 2f64.sqrt() * fin / (ifo.mirror_mass * len)
        * ((H_BAR * power) / (PI2 * lam * C)).sqrt();

    let asd_shot: Vec<f64> = freq.iter().map(|&f| shot0 * ifo.pole_factor(f)).collect();
    let asd_rad: Vec<f64> = freq
        .iter()
        .map(|&f| rad0 / (PI2 * f).powi(2) / ifo.pole_factor(f))
        .collect();
    let asd_seis: Vec<f64> = freq
        .iter()
        .map(|&f| SEISMIC_ALPHA / f.powi(SEISMIC_POWER) / len * SEISMIC_ISOLATION)
        .collect();
    let asd: Vec<f64> = (0..freq.len())
        .map(|i| asd_shot[i] + asd_rad[i] + asd_seis[i])
        .collect();

    debug!(
        finesse = fin,
        leff_over_l = if ifo.fabry_perot { 2.0 * fin / PI } else { 1.0 },
        f_pole = ifo.pole_frequency(),
        min_asd = asd.iter().cloned().fold(f64::INFINITY, f64::min),
        "noise curve"
    );

    let df = DataFrame::new(vec![
        Column::new("freq".into(), freq),
        Column::new("asd_shot".into(), asd_shot),
        Column::new("asd_rad".into(), asd_rad),
        Column::new("asd_seis".into(), asd_seis),
        Column::new("asd".into(), asd),
    ])?;

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::column_f64;
    use approx::assert_relative_eq;

    fn ligo_like(fabry_perot: bool) -> Interferometer {
        Interferometer {
            length: 4e3,
            laser_power: 20.0,
            laser_wavelength: 1064e-9,
            photodetector_efficiency: 0.9,
            mirror_mass: 40.0,
            r_in: 0.986,
            r_end: 0.99999,
            power_recycling: 40.0,
            fabry_perot,
        }
    }

    #[test]
    fn test_finesse() {
        let ifo = ligo_like(true);
        assert!(ifo.finesse() > 200.0 && ifo.finesse() < 250.0);
        assert!(ifo.pole_frequency() > 70.0 && ifo.pole_frequency() < 90.0);

        let simple = ligo_like(false);
        assert_relative_eq!(simple.finesse(), PI / 2.0);
        assert_eq!(simple.pole_frequency(), 0.0);
    }

    #[test]
    fn test_noise_curve_shape() {
        let df = noise_curve(&ligo_like(true), 1.0, 1e4, 300).unwrap();
        assert_eq!(df.height(), 300);

        let asd = column_f64(&df, "asd").unwrap();
        let shot = column_f64(&df, "asd_shot").unwrap();
        let rad = column_f64(&df, "asd_rad").unwrap();
        let seis = column_f64(&df, "asd_seis").unwrap();
        for i in 0..asd.len() {
            assert_relative_eq!(asd[i], shot[i] + rad[i] + seis[i], max_relative = 1e-12);
        }

        // Bucket: noise is lowest somewhere in the middle
        let imin = asd
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert!(imin > 0 && imin < asd.len() - 1);
        assert!(shot.windows(2).all(|w| w[1] >= w[0]));
        assert!(rad.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_no_fabry_perot_has_flat_shot_noise() {
        let df = noise_curve(&ligo_like(false), 10.0, 1000.0, 50).unwrap();
        let shot = column_f64(&df, "asd_shot").unwrap();
        assert!(shot.iter().all(|&s| s == shot[0]));
    }

    #[test]
    fn test_invalid_interferometer() {
        let mut ifo = ligo_like(true);
        ifo.mirror_mass = 0.0;
        assert!(matches!(
            noise_curve(&ifo, 1.0, 10.0, 10),
            Err(GwError::InvalidInput(_))
        ));
    }
}
