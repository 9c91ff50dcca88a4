use crate::telemetry::sample::*;
use chrono::{DateTime, Utc};
use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng};

/// Fixed rated battery capacity reported in every sample (kWh)
pub const BATTERY_CAPACITY_KWH: u32 = 1000;

/// Source of synthetic telemetry
///
/// Implementations must be callable concurrently without shared mutable
/// state; the scheduler and every session share one instance.
pub trait Synthesizer: Send + Sync {
    fn synthesize(&self, site_id: &str, now: DateTime<Utc>)
        -> Result<TelemetrySample, SynthesisError>;
}

/// Entropy-backed synthesizer
///
/// Each call seeds a fresh generator from the operating system, so no state
/// is shared between callers. An unavailable entropy source surfaces as
/// `SynthesisError::Entropy` for that one sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSynthesizer;

impl Synthesizer for RandomSynthesizer {
    fn synthesize(
        &self,
        site_id: &str,
        now: DateTime<Utc>,
    ) -> Result<TelemetrySample, SynthesisError> {
        let mut rng = StdRng::from_rng(OsRng).map_err(SynthesisError::Entropy)?;
        Ok(synthesize_with(&mut rng, site_id, now))
    }
}

/// Draw one sample from `rng`
///
/// Every field is independent and uniform within its fixed bounds; no
/// physical consistency between fields is modeled.
pub fn synthesize_with<R: Rng>(
    rng: &mut R,
    site_id: &str,
    now: DateTime<Utc>,
) -> TelemetrySample {
    TelemetrySample {
        site_id: site_id.to_string(),
        timestamp: now,
        solar: SolarReading {
            generation: rng.gen_range(100.0..500.0),
            irradiance: rng.gen_range(200.0..1000.0),
            efficiency: rng.gen_range(20.0..25.0),
            temperature: rng.gen_range(35.0..45.0),
        },
        wind: WindReading {
            generation: rng.gen_range(50.0..300.0),
            speed: rng.gen_range(5.0..15.0),
            direction: rng.gen_range(0..360),
            temperature: rng.gen_range(20.0..35.0),
        },
        battery: BatteryReading {
            soc: rng.gen_range(60.0..100.0),
            power: rng.gen_range(-100.0..100.0),
            voltage: rng.gen_range(400.0..450.0),
            temperature: rng.gen_range(25.0..35.0),
            capacity: BATTERY_CAPACITY_KWH,
            cycles: rng.gen_range(500..1500),
        },
        grid: GridReading {
            import: rng.gen_range(0.0..100.0),
            export: rng.gen_range(0.0..150.0),
            frequency: rng.gen_range(49.5..50.5),
            voltage: rng.gen_range(225.0..235.0),
            power_factor: rng.gen_range(0.9..1.0),
        },
        load: LoadReading {
            total: rng.gen_range(200.0..600.0),
            critical: rng.gen_range(50.0..150.0),
            non_critical: rng.gen_range(150.0..450.0),
        },
        weather: WeatherReading {
            temperature: rng.gen_range(20.0..35.0),
            humidity: rng.gen_range(40.0..70.0),
            pressure: rng.gen_range(1000.0..1050.0),
            wind_speed: rng.gen_range(2.0..12.0),
            cloud_cover: rng.gen_range(0..100),
        },
        source: SYNTHETIC_SOURCE.to_string(),
    }
}

/// Synthesis errors
#[derive(Debug)]
pub enum SynthesisError {
    /// Random source unavailable
    Entropy(rand::Error),
}

impl std::fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SynthesisError::Entropy(e) => write!(f, "entropy source unavailable: {}", e),
        }
    }
}

impl std::error::Error for SynthesisError {}
