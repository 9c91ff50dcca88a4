use super::*;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn assert_in_range(name: &str, value: f64, low: f64, high: f64) {
    assert!(
        value >= low && value < high,
        "{} = {} outside [{}, {})",
        name,
        value,
        low,
        high
    );
}

fn assert_sample_bounds(s: &TelemetrySample) {
    assert_in_range("solar.generation", s.solar.generation, 100.0, 500.0);
    assert_in_range("solar.irradiance", s.solar.irradiance, 200.0, 1000.0);
    assert_in_range("solar.efficiency", s.solar.efficiency, 20.0, 25.0);
    assert_in_range("solar.temperature", s.solar.temperature, 35.0, 45.0);

    assert_in_range("wind.generation", s.wind.generation, 50.0, 300.0);
    assert_in_range("wind.speed", s.wind.speed, 5.0, 15.0);
    assert!(s.wind.direction < 360);
    assert_in_range("wind.temperature", s.wind.temperature, 20.0, 35.0);

    assert_in_range("battery.soc", s.battery.soc, 60.0, 100.0);
    assert_in_range("battery.power", s.battery.power, -100.0, 100.0);
    assert_in_range("battery.voltage", s.battery.voltage, 400.0, 450.0);
    assert_in_range("battery.temperature", s.battery.temperature, 25.0, 35.0);
    assert_eq!(s.battery.capacity, 1000);
    assert!((500..1500).contains(&s.battery.cycles));

    assert_in_range("grid.import", s.grid.import, 0.0, 100.0);
    assert_in_range("grid.export", s.grid.export, 0.0, 150.0);
    assert_in_range("grid.frequency", s.grid.frequency, 49.5, 50.5);
    assert_in_range("grid.voltage", s.grid.voltage, 225.0, 235.0);
    assert_in_range("grid.power_factor", s.grid.power_factor, 0.9, 1.0);

    assert_in_range("load.total", s.load.total, 200.0, 600.0);
    assert_in_range("load.critical", s.load.critical, 50.0, 150.0);
    assert_in_range("load.non_critical", s.load.non_critical, 150.0, 450.0);

    assert_in_range("weather.temperature", s.weather.temperature, 20.0, 35.0);
    assert_in_range("weather.humidity", s.weather.humidity, 40.0, 70.0);
    assert_in_range("weather.pressure", s.weather.pressure, 1000.0, 1050.0);
    assert_in_range("weather.wind_speed", s.weather.wind_speed, 2.0, 12.0);
    assert!(s.weather.cloud_cover < 100);

    assert_eq!(s.source, SYNTHETIC_SOURCE);
}

#[test]
fn test_seeded_samples_within_bounds() {
    let now = Utc::now();
    for seed in 0..20u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..500 {
            let sample = synthesize_with(&mut rng, "campus-1", now);
            assert_sample_bounds(&sample);
        }
    }
}

#[test]
fn test_random_synthesizer_within_bounds() {
    let synthesizer = RandomSynthesizer;
    for _ in 0..2000 {
        let sample = synthesizer.synthesize("campus-2", Utc::now()).unwrap();
        assert_sample_bounds(&sample);
        assert_eq!(sample.site_id, "campus-2");
    }
}

#[test]
fn test_sample_keyed_to_requested_site_and_time() {
    let now = Utc::now();
    let mut rng = StdRng::seed_from_u64(7);

    let sample = synthesize_with(&mut rng, "not-in-catalog", now);

    assert_eq!(sample.site_id, "not-in-catalog");
    assert_eq!(sample.timestamp, now);
}

#[test]
fn test_successive_samples_differ() {
    let now = Utc::now();
    let mut rng = StdRng::seed_from_u64(42);

    let a = synthesize_with(&mut rng, "campus-1", now);
    let b = synthesize_with(&mut rng, "campus-1", now);

    assert_ne!(a, b);
}

#[test]
fn test_concurrent_synthesis() {
    let synthesizer = std::sync::Arc::new(RandomSynthesizer);
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let synthesizer = std::sync::Arc::clone(&synthesizer);
            std::thread::spawn(move || {
                let site_id = format!("site-{}", i);
                (0..100)
                    .map(|_| synthesizer.synthesize(&site_id, Utc::now()).unwrap())
                    .all(|s| s.site_id == site_id)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn test_sample_json_shape() {
    let mut rng = StdRng::seed_from_u64(1);
    let sample = synthesize_with(&mut rng, "campus-1", Utc::now());

    let json = serde_json::to_value(&sample).unwrap();

    assert_eq!(json["campusId"], "campus-1");
    assert_eq!(json["source"], "mock-iot");
    assert_eq!(json["battery"]["capacity"], 1000);
    assert!(json["grid"]["powerFactor"].is_f64());
    assert!(json["load"]["nonCritical"].is_f64());
    assert!(json["weather"]["windSpeed"].is_f64());
    assert!(json["weather"]["cloudCover"].is_u64());
    assert!(json["wind"]["direction"].is_u64());
    assert!(json["timestamp"].is_string());
}
