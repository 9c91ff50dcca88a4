use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;


/// Site (campus) with a fixed energy-asset configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Globally unique identifier (e.g., "campus-1")
    pub id: String,
    pub name: String,
    pub location: Location,
    pub energy_sources: EnergySources,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySources {
    pub solar: SolarSource,
    pub wind: WindSource,
    pub battery: BatterySource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarSource {
    pub enabled: bool,
    /// Rated capacity (kW)
    pub capacity: f64,
    pub panels: u32,
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindSource {
    pub enabled: bool,
    /// Rated capacity (kW)
    pub capacity: f64,
    pub turbines: u32,
    /// Cut-in wind speed (m/s)
    pub cut_in_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatterySource {
    pub enabled: bool,
    /// Rated capacity (kWh)
    pub capacity: f64,
    /// Battery chemistry (e.g., "lithium-ion")
    #[serde(rename = "type")]
    pub chemistry: String,
    pub cycle_life: u32,
}

/// Read-only catalog of known sites
///
/// Order is preserved from construction; the broadcast scheduler ticks
/// sites in this order.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    sites: Vec<Site>,
    /// Secondary index: site id -> position in `sites`
    index: HashMap<String, usize>,
}

impl SiteRegistry {
    /// Build a registry from an ordered list of sites
    ///
    /// Fails if the list is empty or two sites share an identifier.
    pub fn from_sites(sites: Vec<Site>) -> Result<Self, CatalogError> {
        if sites.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut index = HashMap::with_capacity(sites.len());
        for (pos, site) in sites.iter().enumerate() {
            if index.insert(site.id.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateId(site.id.clone()));
            }
        }

        Ok(Self { sites, index })
    }

    /// Built-in two-campus catalog
    pub fn builtin() -> Self {
        let sites = builtin_sites();
        let index = sites
            .iter()
            .enumerate()
            .map(|(pos, site)| (site.id.clone(), pos))
            .collect();
        Self { sites, index }
    }

    /// Load a catalog from a TOML file containing `[[sites]]` tables
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(CatalogError::Io)?;
        let file: CatalogFile =
            toml::from_str(&contents).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_sites(file.sites)
    }

    /// Site identifiers in catalog order
    pub fn list_site_ids(&self) -> Vec<String> {
        self.sites.iter().map(|s| s.id.clone()).collect()
    }

    /// Look up one site by id
    pub fn get_site(&self, id: &str) -> Option<&Site> {
        self.index.get(id).map(|&pos| &self.sites[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All sites in catalog order
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    sites: Vec<Site>,
}

/// Catalog loading errors
#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Parse(String),
    DuplicateId(String),
    Empty,
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "failed to read site catalog: {}", e),
            CatalogError::Parse(e) => write!(f, "failed to parse site catalog: {}", e),
            CatalogError::DuplicateId(id) => write!(f, "duplicate site id '{}'", id),
            CatalogError::Empty => write!(f, "site catalog is empty"),
        }
    }
}

impl std::error::Error for CatalogError {}

fn builtin_sites() -> Vec<Site> {
    vec![
        Site {
            id: "campus-1".to_string(),
            name: "Green Valley Campus".to_string(),
            location: Location {
                address: "123 Renewable Street".to_string(),
                city: "EcoCity".to_string(),
                state: "CA".to_string(),
                country: "USA".to_string(),
                zip_code: "90210".to_string(),
                coordinates: Coordinates {
                    latitude: 34.0522,
                    longitude: -118.2437,
                },
            },
            energy_sources: EnergySources {
                solar: SolarSource {
                    enabled: true,
                    capacity: 500.0,
                    panels: 200,
                    efficiency: 0.22,
                },
                wind: WindSource {
                    enabled: true,
                    capacity: 300.0,
                    turbines: 5,
                    cut_in_speed: 3.5,
                },
                battery: BatterySource {
                    enabled: true,
                    capacity: 1000.0,
                    chemistry: "lithium-ion".to_string(),
                    cycle_life: 5000,
                },
            },
        },
        Site {
            id: "campus-2".to_string(),
            name: "Solar Ridge Campus".to_string(),
            location: Location {
                address: "456 Solar Avenue".to_string(),
                city: "SunCity".to_string(),
                state: "AZ".to_string(),
                country: "USA".to_string(),
                zip_code: "85001".to_string(),
                coordinates: Coordinates {
                    latitude: 33.4484,
                    longitude: -112.0740,
                },
            },
            energy_sources: EnergySources {
                solar: SolarSource {
                    enabled: true,
                    capacity: 750.0,
                    panels: 300,
                    efficiency: 0.24,
                },
                wind: WindSource {
                    enabled: false,
                    capacity: 0.0,
                    turbines: 0,
                    cut_in_speed: 0.0,
                },
                battery: BatterySource {
                    enabled: true,
                    capacity: 1500.0,
                    chemistry: "lithium-ion".to_string(),
                    cycle_life: 6000,
                },
            },
        },
    ]
}
