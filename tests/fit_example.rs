use approx::assert_abs_diff_eq;
use sluyspy::constants::PI2;
use sluyspy::fit::{
    curve_fit_chi2, np_polyfit_chi2, polyval, FitModel, FitQuality, LmOptions, ReportDetail,
    ReportOptions,
};
use sluyspy::numerics::linspace;

fn fitfun(x: f64, c: &[f64]) -> f64 {
    c[0] + c[1] * (c[2] / PI2 * x + c[3]).sin()
}

#[test]
fn sine_fit_recovers_coefficients() {
    let truth = [1.0, 2.0, 3.0, 4.0];
    let time = linspace(0.0, 2.0 * truth[2] * PI2, 100);
    let data: Vec<f64> = time
        .iter()
        .enumerate()
        .map(|(i, &t)| fitfun(t, &truth) + 0.05 * (7.3 * i as f64).sin())
        .collect();

    let start = [1.1, 1.9, 3.05, 3.9];
    let fit = curve_fit_chi2(fitfun, &time, &data, &start, None, &LmOptions::default()).unwrap();

    for (c, t) in fit.coefs.iter().zip(truth) {
        assert_abs_diff_eq!(*c, t, epsilon = 0.05);
    }
    assert!(fit.red_chi2 < 0.01);
    assert!(fit.dcoefs.iter().all(|d| d.is_finite() && *d > 0.0));
    assert_eq!(fit.quality.ndat, 100);
    assert_eq!(fit.quality.ncoefs, 4);

    let report = fit.quality.report(&ReportOptions {
        detail: ReportDetail::Coefficients,
        coef_names: Some(vec!["offset".into(), "ampl".into(), "scale".into(), "phase".into()]),
        ..Default::default()
    });
    assert!(report.contains("offset"));
    assert!(report.contains("phase"));
    assert!(report.contains('±'));
}

#[test]
fn polynomial_fit_and_quality_agree() {
    let x = linspace(-2.0, 2.0, 21);
    let y: Vec<f64> = x.iter().map(|&v| 0.5 * v * v - v + 2.0).collect();

    let fit = np_polyfit_chi2(&x, &y, 2, None).unwrap();
    assert_abs_diff_eq!(fit.coefs[0], 0.5, epsilon = 1e-10);
    assert_abs_diff_eq!(fit.coefs[1], -1.0, epsilon = 1e-10);
    assert_abs_diff_eq!(fit.coefs[2], 2.0, epsilon = 1e-10);
    assert_abs_diff_eq!(polyval(&fit.coefs, 3.0), 3.5, epsilon = 1e-9);

    let quality = FitQuality::compute(FitModel::Polynomial(&fit.coefs), Some(&x), &y, None).unwrap();
    assert_eq!(quality.ndat, 21);
    assert_eq!(quality.ncoefs, 3);
    assert!(quality.chi2 < 1e-18);
    assert!(quality.sigmas_assumed);
}
