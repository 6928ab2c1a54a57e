use autoregress::{
    evaluate, forecast, ForecastModel, Forecaster, LaggedMeanRegression, RolloutConfig,
};
use chrono::{Duration, TimeZone, Utc};
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing_subscriber::EnvFilter;
use window_prep::{prepare, PrepareConfig, TimeSeriesTable};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Synthetic 3-hourly weather: a daily temperature cycle plus noise
    let n = 1000;
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let noise = Normal::new(0.0, 0.5)?;
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let timestamps: Vec<_> = (0..n).map(|i| start + Duration::hours(3 * i as i64)).collect();
    let temp: Vec<f64> = (0..n)
        .map(|i| 12.0 + 7.0 * (i as f64 * std::f64::consts::PI / 4.0).sin() + noise.sample(&mut rng))
        .collect();
    let rh: Vec<f64> = temp.iter().map(|t| 85.0 - 1.5 * t + noise.sample(&mut rng)).collect();
    let wind: Vec<f64> = (0..n).map(|_| 4.0 + noise.sample(&mut rng).abs()).collect();

    let table = TimeSeriesTable::from_columns(&[("temp", temp), ("rh", rh), ("wind", wind)])?
        .with_timestamps("timestamp", &timestamps)?;
    println!("Generated {} rows", table.len());

    // Prepare windows of 48 steps with the default 70/15/15 split
    let config = PrepareConfig::new(vec!["temp", "rh", "wind"], "temp")
        .with_datetime_column("timestamp")
        .with_window(48);
    let dataset = prepare(&table, &config)?;
    println!(
        "Samples: train={}, val={}, test={}",
        dataset.train.len(),
        dataset.val.len(),
        dataset.test.len()
    );

    // Train the baseline and check it on the test partition
    let target_idx = dataset.meta.target_feature_index()?;
    let model = LaggedMeanRegression::new(1, target_idx)?
        .train(dataset.train.inputs.view(), dataset.train.targets.view())?;
    let accuracy = evaluate(&model, dataset.test.inputs.view(), dataset.test.targets.view())?;
    println!("{}", accuracy);

    // Roll forward five days of 3-hour steps
    let window = dataset.latest_input().ok_or("no window to start from")?;
    let rollout_config = RolloutConfig::default().with_interval("3h");
    let result = forecast(window, &dataset.meta, &rollout_config, &model, dataset.last_timestamp)?;

    println!(
        "Forecast for the next {} steps using {}:",
        result.horizon(),
        Forecaster::name(&model)
    );
    let stamps = result.timestamps().unwrap_or(&[]);
    for (i, value) in result.values().iter().enumerate() {
        match stamps.get(i) {
            Some(ts) => println!("{}: {:.2}", ts.format("%Y-%m-%d %H:%M"), value),
            None => println!("Step {}: {:.2}", i + 1, value),
        }
    }

    Ok(())
}
