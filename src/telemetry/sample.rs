use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance tag carried by every synthesized sample
pub const SYNTHETIC_SOURCE: &str = "mock-iot";

/// One multi-domain telemetry reading for a site
///
/// Immutable value; identity is (site_id, timestamp).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySample {
    /// Site this sample describes
    #[serde(rename = "campusId")]
    pub site_id: String,
    pub timestamp: DateTime<Utc>,
    pub solar: SolarReading,
    pub wind: WindReading,
    pub battery: BatteryReading,
    pub grid: GridReading,
    pub load: LoadReading,
    pub weather: WeatherReading,
    pub source: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolarReading {
    /// kW
    pub generation: f64,
    /// W/m²
    pub irradiance: f64,
    /// Percent
    pub efficiency: f64,
    /// °C
    pub temperature: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindReading {
    /// kW
    pub generation: f64,
    /// m/s
    pub speed: f64,
    /// Degrees
    pub direction: u16,
    /// °C
    pub temperature: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatteryReading {
    /// State of charge (percent)
    pub soc: f64,
    /// kW; negative = discharging
    pub power: f64,
    pub voltage: f64,
    pub temperature: f64,
    /// Rated capacity (kWh)
    pub capacity: u32,
    pub cycles: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridReading {
    /// kW
    pub import: f64,
    /// kW
    pub export: f64,
    /// Hz
    pub frequency: f64,
    pub voltage: f64,
    pub power_factor: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReading {
    pub total: f64,
    pub critical: f64,
    pub non_critical: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    /// °C
    pub temperature: f64,
    /// Percent
    pub humidity: f64,
    /// hPa
    pub pressure: f64,
    /// m/s
    pub wind_speed: f64,
    /// Percent
    pub cloud_cover: u8,
}
