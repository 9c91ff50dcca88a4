// Synthetic telemetry generation

mod sample;
mod synthesizer;

pub use sample::{
    BatteryReading, GridReading, LoadReading, SolarReading, TelemetrySample, WeatherReading,
    WindReading, SYNTHETIC_SOURCE,
};
pub use synthesizer::{
    synthesize_with, RandomSynthesizer, SynthesisError, Synthesizer, BATTERY_CAPACITY_KWH,
};

#[cfg(test)]
mod tests;
