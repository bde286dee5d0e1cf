//! Simulated collection vehicles.

use ecoroute_geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a simulated vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(String);

impl VehicleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for VehicleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Kind of waste a truck collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleCategory {
    #[default]
    #[serde(alias = "GENERAL")]
    General,
    #[serde(alias = "ORGANICO")]
    Organic,
    #[serde(alias = "RECICLABLE")]
    Recyclable,
    #[serde(alias = "PELIGROSO")]
    Hazardous,
}

impl VehicleCategory {
    /// All categories, in seeding order
    pub const ALL: [Self; 4] = [Self::Organic, Self::Recyclable, Self::General, Self::Hazardous];

    /// Marker color as `#RRGGBB`
    pub fn color(&self) -> &'static str {
        match self {
            Self::General => "#212121",
            Self::Organic => "#795548",
            Self::Recyclable => "#28A745",
            Self::Hazardous => "#D32F2F",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Organic => "Organics",
            Self::Recyclable => "Recyclables",
            Self::Hazardous => "Hazardous",
        }
    }

    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Organic => "organic",
            Self::Recyclable => "recyclable",
            Self::Hazardous => "hazardous",
        }
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VehicleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "general" => Ok(Self::General),
            "organic" | "organico" => Ok(Self::Organic),
            "recyclable" | "reciclable" => Ok(Self::Recyclable),
            "hazardous" | "peligroso" => Ok(Self::Hazardous),
            other => Err(format!(
                "unknown category '{other}' (expected general, organic, recyclable or hazardous)"
            )),
        }
    }
}

/// A simulated truck on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub position: Coordinate,
    pub eta_minutes: u32,
    pub category: VehicleCategory,
}

impl Vehicle {
    pub fn new(
        id: impl Into<VehicleId>,
        position: Coordinate,
        eta_minutes: u32,
        category: VehicleCategory,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            eta_minutes,
            category,
        }
    }
}

/// Seed positions as (longitude, latitude), grouped by district.
const SEED_POSITIONS: [(f64, f64); 12] = [
    (-76.2425, -9.9300),
    (-76.2420, -9.9310),
    (-76.2430, -9.9315),
    (-76.2400, -9.9365),
    (-76.2410, -9.9370),
    (-76.2415, -9.9360),
    (-76.2380, -9.9330),
    (-76.2390, -9.9335),
    (-76.2385, -9.9340),
    (-76.2440, -9.9290),
    (-76.2450, -9.9295),
    (-76.2455, -9.9285),
];

const SEED_ETAS: [u32; 12] = [10, 12, 8, 5, 15, 7, 22, 18, 11, 9, 6, 14];

/// The ordered set of vehicles on one map.
///
/// Order matters: proximity ties resolve to the earlier vehicle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fleet {
    vehicles: Vec<Vehicle>,
}

impl Fleet {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Self { vehicles }
    }

    /// The twelve reference trucks, categories assigned round-robin
    pub fn seeded() -> Self {
        let vehicles = SEED_POSITIONS
            .iter()
            .zip(SEED_ETAS)
            .enumerate()
            .map(|(i, (&(lng, lat), eta))| {
                Vehicle::new(
                    format!("c{}", i + 1),
                    Coordinate::new(lat, lng),
                    eta,
                    VehicleCategory::ALL[i % VehicleCategory::ALL.len()],
                )
            })
            .collect();
        Self { vehicles }
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Vehicle> {
        self.vehicles.iter_mut()
    }

    pub fn first(&self) -> Option<&Vehicle> {
        self.vehicles.first()
    }

    pub fn get(&self, id: &VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| &v.id == id)
    }

    pub fn get_mut(&mut self, id: &VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| &v.id == id)
    }

    /// Vehicle at a list position
    pub fn at(&self, index: usize) -> Option<&Vehicle> {
        self.vehicles.get(index)
    }

    /// Positions in list order
    pub fn positions(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.vehicles.iter().map(|v| v.position)
    }
}

impl FromIterator<Vehicle> for Fleet {
    fn from_iter<T: IntoIterator<Item = Vehicle>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_fleet() {
        let fleet = Fleet::seeded();
        assert_eq!(fleet.len(), 12);

        let first = fleet.first().unwrap();
        assert_eq!(first.id.as_str(), "c1");
        assert_eq!(first.position, Coordinate::new(-9.93, -76.2425));
        assert_eq!(first.eta_minutes, 10);
        assert_eq!(first.category, VehicleCategory::Organic);

        let fifth = fleet.get(&"c5".into()).unwrap();
        assert_eq!(fifth.category, VehicleCategory::Organic);
        assert_eq!(fleet.at(3).unwrap().category, VehicleCategory::Hazardous);
        assert!(fleet.iter().all(|v| v.position.is_valid()));
    }

    #[test]
    fn test_category_wire_names() {
        let parsed: VehicleCategory = serde_json::from_str("\"ORGANICO\"").unwrap();
        assert_eq!(parsed, VehicleCategory::Organic);
        let parsed: VehicleCategory = serde_json::from_str("\"hazardous\"").unwrap();
        assert_eq!(parsed, VehicleCategory::Hazardous);
        assert_eq!(
            serde_json::to_string(&VehicleCategory::Recyclable).unwrap(),
            "\"recyclable\""
        );
    }

    #[test]
    fn test_category_parse_and_colors() {
        assert_eq!("Organic".parse::<VehicleCategory>(), Ok(VehicleCategory::Organic));
        assert_eq!("peligroso".parse::<VehicleCategory>(), Ok(VehicleCategory::Hazardous));
        assert!("paper".parse::<VehicleCategory>().is_err());
        assert_eq!(VehicleCategory::Recyclable.color(), "#28A745");
        assert_eq!(VehicleCategory::General.to_string(), "General");
    }
}
