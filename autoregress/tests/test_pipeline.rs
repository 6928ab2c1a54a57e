use autoregress::{
    evaluate, forecast, ForecastModel, LaggedMeanRegression, RolloutConfig, RolloutError,
};
use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tempfile::tempdir;
use window_prep::store::{load_dataset, save_dataset};
use window_prep::{prepare, PrepareConfig, TargetScaling, TimeSeriesTable};

/// Three-hourly readings over roughly 50 days
fn weather_table(n: usize) -> TimeSeriesTable {
    let mut rng = StdRng::seed_from_u64(11);
    let noise = Normal::new(0.0, 0.3).unwrap();
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let timestamps: Vec<_> = (0..n).map(|i| start + Duration::hours(3 * i as i64)).collect();

    let temp: Vec<f64> = (0..n)
        .map(|i| 15.0 + 6.0 * (i as f64 * std::f64::consts::PI / 4.0).sin() + noise.sample(&mut rng))
        .collect();
    let rh: Vec<f64> = temp.iter().map(|t| 90.0 - 2.0 * t).collect();
    TimeSeriesTable::from_columns(&[("temp", temp), ("rh", rh)])
        .unwrap()
        .with_timestamps("timestamp", &timestamps)
        .unwrap()
}

fn config() -> PrepareConfig {
    PrepareConfig::new(vec!["temp", "rh"], "temp")
        .with_datetime_column("timestamp")
        .with_window(16)
        .with_horizon(1)
}

#[test]
fn test_prepare_train_forecast() {
    let table = weather_table(400);
    let dataset = prepare(&table, &config()).unwrap();
    let target_idx = dataset.meta.target_feature_index().unwrap();

    let model = LaggedMeanRegression::new(1, target_idx)
        .unwrap()
        .train(dataset.train.inputs.view(), dataset.train.targets.view())
        .unwrap();

    let accuracy = evaluate(&model, dataset.test.inputs.view(), dataset.test.targets.view()).unwrap();
    assert_eq!(accuracy.samples, dataset.test.len());
    assert!(accuracy.rmse.is_finite());

    let window = dataset.latest_input().unwrap();
    let rollout_config = RolloutConfig::new(8).with_interval("3h");
    let result = forecast(window, &dataset.meta, &rollout_config, &model, dataset.last_timestamp).unwrap();

    assert_eq!(result.horizon(), 8);
    assert!(result.values().iter().all(|v| v.is_finite()));

    let stamps = result.timestamps().unwrap();
    let last = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(3 * 399);
    assert_eq!(stamps[0], last + Duration::hours(3));
    assert_eq!(stamps[7], last + Duration::hours(24));
}

/// `level` rises by one per 3-hour step
fn linear_table(n: usize) -> TimeSeriesTable {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let timestamps: Vec<_> = (0..n).map(|i| start + Duration::hours(3 * i as i64)).collect();
    let level: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let offset: Vec<f64> = (0..n).map(|i| 50.0 - i as f64 * 0.5).collect();
    TimeSeriesTable::from_columns(&[("offset", offset), ("level", level)])
        .unwrap()
        .with_timestamps("timestamp", &timestamps)
        .unwrap()
}

#[rstest]
#[case(TargetScaling::Raw)]
#[case(TargetScaling::Standardized)]
fn test_forecast_continues_past_last_row(#[case] scaling: TargetScaling) {
    let config = PrepareConfig::new(vec!["offset", "level"], "level")
        .with_datetime_column("timestamp")
        .with_window(5)
        .with_target_scaling(scaling);
    let dataset = prepare(&linear_table(100), &config).unwrap();

    let model = LaggedMeanRegression::new(1, 1)
        .unwrap()
        .train(dataset.train.inputs.view(), dataset.train.targets.view())
        .unwrap();
    let rollout_config = RolloutConfig::new(4).with_interval("3h");
    let result = forecast(
        dataset.latest_input().unwrap(),
        &dataset.meta,
        &rollout_config,
        &model,
        dataset.last_timestamp,
    )
    .unwrap();

    for (value, expected) in result.values().iter().zip([100.0, 101.0, 102.0, 103.0]) {
        approx::assert_abs_diff_eq!(*value, expected, epsilon = 1e-6);
    }
    let first = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(3 * 100);
    assert_eq!(result.timestamps().unwrap()[0], first);
}

#[test]
fn test_standardized_targets_come_back_in_units() {
    let table = weather_table(200);
    let config = config().with_target_scaling(TargetScaling::Standardized);
    let dataset = prepare(&table, &config).unwrap();

    // predicting the training mean in standardized units is 0.0
    let zero = |_: ndarray::ArrayView3<'_, f64>| -> autoregress::Result<f64> { Ok(0.0) };
    let window = dataset.latest_input().unwrap();
    let result = forecast(window, &dataset.meta, &RolloutConfig::new(3), &zero, None).unwrap();

    let mean = dataset.target_scaler.mean;
    for value in result.values() {
        approx::assert_abs_diff_eq!(*value, mean, epsilon = 1e-9);
    }
    assert!(result.timestamps().is_none());
}

#[test]
fn test_forecast_from_saved_dataset() {
    let dir = tempdir().unwrap();
    let table = weather_table(300);
    let dataset = prepare(&table, &config()).unwrap();
    save_dataset(dir.path(), &dataset).unwrap();

    let stored = load_dataset(dir.path()).unwrap();
    let target_idx = stored.meta.target_feature_index().unwrap();
    let model = LaggedMeanRegression::new(2, target_idx)
        .unwrap()
        .train(stored.train.inputs.view(), stored.train.targets.view())
        .unwrap();

    let window = stored.test.last_input().unwrap();
    let result = forecast(window, &stored.meta, &RolloutConfig::default(), &model, None).unwrap();
    assert_eq!(result.values().len(), 40);

    let json_path = dir.path().join("forecast.json");
    result.write_json(&json_path).unwrap();
    let document: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(document["horizon"], 40);
    assert_eq!(document["pred"].as_array().unwrap().len(), 40);

    let csv_path = dir.path().join("forecast.csv");
    result.write_csv(&csv_path).unwrap();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "step,timestamp,pred");
    assert_eq!(lines.len(), 41);
    assert!(lines[1].starts_with("1,,"));
}

#[test]
fn test_prep_errors_pass_through() {
    let err: RolloutError = load_dataset("/nonexistent/prepared").unwrap_err().into();
    assert!(matches!(err, RolloutError::Prep(_)));
}
