use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use sluyspy::weather::{read_36h_forecast_data, smoothen_36h_forecast_data};
use std::fmt::Write as _;
use std::fs;

/// Latest-forecast file for Utrecht starting at 06:00 on 2024-06-01, rain shower around hour 20.
fn latest_file() -> String {
    let mut text = String::from("WP weer 36h\nUtrecht\n");
    text.push_str("jaar mnd dag uur bew neersl temp druk rv wk wr\n");
    text.push_str("-- -- -- -- -- -- -- -- -- -- --\n");
    for i in 0..36 {
        let h = 6 + i;
        let rain = if (19..=21).contains(&h) { 1.5 } else { 0.0 };
        writeln!(
            text,
            "2024 6 {} {} 60 {} 18.0 1010 70 3 270",
            1 + h / 24,
            h % 24,
            rain
        )
        .unwrap();
    }
    text
}

#[test]
fn read_and_smoothen_latest_forecast() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("wp_weer_latest_36h.dat"), latest_file()).unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    // Today's file is missing: the latest forecast is used on its own
    let fc = read_36h_forecast_data(dir.path(), "Utrecht", today)
        .unwrap()
        .unwrap();
    assert_eq!(fc.len(), 36);
    assert_eq!(fc.hours[0].time, 6.0);

    let (fc, rain) = smoothen_36h_forecast_data(fc).unwrap();
    for hour in &fc.hours {
        let ws_fit = hour.ws_fit.unwrap();
        assert!(ws_fit >= 0.0);
        assert_abs_diff_eq!(ws_fit, 0.836 * 3f64.powf(1.5), epsilon = 1e-3);
        assert_abs_diff_eq!(hour.ws, 4.3, epsilon = 1e-12);
    }

    // Last hour 41: rain grid 0.0, 0.1, ..., 42.0
    assert_eq!(rain.time.len(), 421);
    assert_abs_diff_eq!(rain.time[420], 42.0, epsilon = 1e-12);
    assert!(rain.rain.iter().all(|&r| r >= 0.0));
    assert_abs_diff_eq!(rain.rain[200], 1.5, epsilon = 1e-9);

    let df = fc.to_dataframe().unwrap();
    assert_eq!(df.height(), 36);
    assert!(rain.to_dataframe().unwrap().height() == 421);
}

#[test]
fn unknown_location_gives_no_forecast() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("wp_weer_latest_36h.dat"), latest_file()).unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    assert!(read_36h_forecast_data(dir.path(), "Maastricht", today)
        .unwrap()
        .is_none());
}
