//! Component catalog types - the read-only table of parts a design can draw from.
//!
//! The catalog is built once before a run, validated, and then shared
//! immutably by the encoder and the metric evaluator. Satellites reference
//! catalog entries by name; a name that misses the catalog is a fatal
//! configuration error, never a silent fallback.

use serde::{Deserialize, Serialize};

/// One off-the-shelf component (radio, sensor, computer, battery, ...).
///
/// Power values follow a sign convention: consumers report negative watts,
/// generators report positive watts, so summing across a design yields the
/// net figure directly.
///
/// `bitrate_down`, `bitrate_up` and `att_knowledge` are optional because a
/// missing capability is not the same thing as a measured zero: a part with
/// no radio has *no* bit-rate, and a part with no attitude sensor has no
/// knowledge figure at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub name: String,
    /// Body dimensions, millimetres.
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Mass, kilograms.
    pub mass: f64,
    /// Internal slot units this part consumes. May be fractional.
    #[serde(default)]
    pub internal_slots: f64,
    /// External slot units this part consumes. May be fractional.
    #[serde(default)]
    pub external_slots: f64,
    /// Nominal power, watts (negative = draw, positive = generation).
    #[serde(default)]
    pub power_nominal: f64,
    /// Peak transient power, watts, same sign convention.
    #[serde(default)]
    pub power_peak: f64,
    /// Observable wavelength band, nanometres. Zero when not an instrument.
    #[serde(default)]
    pub min_wavelength: f64,
    #[serde(default)]
    pub max_wavelength: f64,
    /// Sensing detail on the fuzzy `[0, 1]` scale.
    #[serde(default)]
    pub detail: f64,
    /// Down-link bit-rate, bits per second. `None` when the part has no radio.
    #[serde(default)]
    pub bitrate_down: Option<f64>,
    /// Up-link bit-rate, bits per second.
    #[serde(default)]
    pub bitrate_up: Option<f64>,
    /// Storage sizes, megabytes.
    #[serde(default)]
    pub data_storage: f64,
    #[serde(default)]
    pub code_storage: f64,
    #[serde(default)]
    pub ram: f64,
    /// Attitude knowledge, degrees. `None` when the part carries no sensor.
    #[serde(default)]
    pub att_knowledge: Option<f64>,
    /// Attitude control moment, milli-newton-metres.
    #[serde(default)]
    pub att_moment: f64,
    /// Battery discharge time, hours. Zero when the part holds no charge.
    #[serde(default)]
    pub discharge_time: f64,
    /// Unit price, dollars.
    #[serde(default)]
    pub price: f64,
    /// Whether the radio (if any) is full duplex.
    #[serde(default)]
    pub duplex: bool,
}

/// A chassis choice. Determines the slot budget and contributes its own
/// mass and price to the design totals; its dimensions define the volume
/// capacity components must fit inside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureRecord {
    pub name: String,
    /// Interior dimensions, millimetres.
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Mass, kilograms.
    pub mass: f64,
    /// Internal slot units offered.
    pub internal_slots: f64,
    /// External slot units offered.
    pub external_slots: f64,
    /// CubeSat size class in units (1.0, 1.5, 2.0, 3.0, ...).
    pub size_class: f64,
    #[serde(default)]
    pub price: f64,
}

impl StructureRecord {
    /// Interior volume capacity in cubic millimetres.
    pub fn volume_capacity(&self) -> f64 {
        self.x * self.y * self.z
    }
}

/// A solar panel choice. Four panels of the selected type are fitted,
/// scaled to the structure class, so a panel's figures are per-unit-area
/// of a single panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelRecord {
    pub name: String,
    /// Mass, kilograms.
    pub mass: f64,
    /// Generated power, watts (positive).
    pub power: f64,
    #[serde(default)]
    pub price: f64,
}

/// Catalog lookup and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Unknown structure '{0}'")]
    UnknownStructure(String),
    #[error("Unknown component '{0}'")]
    UnknownComponent(String),
    #[error("Unknown panel '{0}'")]
    UnknownPanel(String),
    #[error("Catalog has no {0}")]
    EmptyCategory(&'static str),
    #[error("Duplicate {category} name '{name}'")]
    DuplicateName { category: &'static str, name: String },
}

/// The immutable parts table an optimization run draws from.
///
/// Side and end panels are kept in separate lists because a satellite
/// selects exactly one of each; they are never interchangeable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub structures: Vec<StructureRecord>,
    pub components: Vec<ComponentRecord>,
    pub side_panels: Vec<PanelRecord>,
    pub end_panels: Vec<PanelRecord>,
}

impl Catalog {
    /// Check the catalog is usable: every category populated, no duplicate
    /// names within a category.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.structures.is_empty() {
            return Err(CatalogError::EmptyCategory("structures"));
        }
        if self.components.is_empty() {
            return Err(CatalogError::EmptyCategory("components"));
        }
        if self.side_panels.is_empty() {
            return Err(CatalogError::EmptyCategory("side panels"));
        }
        if self.end_panels.is_empty() {
            return Err(CatalogError::EmptyCategory("end panels"));
        }

        check_unique("structure", self.structures.iter().map(|s| s.name.as_str()))?;
        check_unique("component", self.components.iter().map(|c| c.name.as_str()))?;
        check_unique(
            "panel",
            self.side_panels
                .iter()
                .chain(self.end_panels.iter())
                .map(|p| p.name.as_str()),
        )?;

        Ok(())
    }

    /// Look up a structure by name.
    pub fn structure(&self, name: &str) -> Result<&StructureRecord, CatalogError> {
        self.structures
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| CatalogError::UnknownStructure(name.to_string()))
    }

    /// Look up a component by name.
    pub fn component(&self, name: &str) -> Result<&ComponentRecord, CatalogError> {
        self.components
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CatalogError::UnknownComponent(name.to_string()))
    }

    /// Look up a panel by name, searching side then end panels.
    pub fn panel(&self, name: &str) -> Result<&PanelRecord, CatalogError> {
        self.side_panels
            .iter()
            .chain(self.end_panels.iter())
            .find(|p| p.name == name)
            .ok_or_else(|| CatalogError::UnknownPanel(name.to_string()))
    }
}

fn check_unique<'a>(
    category: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = std::collections::HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CatalogError::DuplicateName {
                category,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_catalog() -> Catalog {
        Catalog {
            structures: vec![StructureRecord {
                name: "1U Frame".into(),
                x: 100.0,
                y: 100.0,
                z: 100.0,
                mass: 0.2,
                internal_slots: 4.0,
                external_slots: 2.0,
                size_class: 1.0,
                price: 1500.0,
            }],
            components: vec![ComponentRecord {
                name: "UHF Radio".into(),
                x: 90.0,
                y: 90.0,
                z: 20.0,
                mass: 0.1,
                internal_slots: 1.0,
                external_slots: 0.0,
                power_nominal: -0.5,
                power_peak: -2.0,
                min_wavelength: 0.0,
                max_wavelength: 0.0,
                detail: 0.0,
                bitrate_down: Some(9600.0),
                bitrate_up: Some(1200.0),
                data_storage: 0.0,
                code_storage: 0.0,
                ram: 0.0,
                att_knowledge: None,
                att_moment: 0.0,
                discharge_time: 0.0,
                price: 4000.0,
                duplex: true,
            }],
            side_panels: vec![PanelRecord {
                name: "Side Cell".into(),
                mass: 0.05,
                power: 2.0,
                price: 900.0,
            }],
            end_panels: vec![PanelRecord {
                name: "End Cell".into(),
                mass: 0.04,
                power: 1.8,
                price: 700.0,
            }],
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(minimal_catalog().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_category() {
        let mut catalog = minimal_catalog();
        catalog.end_panels.clear();
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::EmptyCategory("end panels"))
        ));
    }

    #[test]
    fn test_validate_duplicate_name() {
        let mut catalog = minimal_catalog();
        let dup = catalog.components[0].clone();
        catalog.components.push(dup);
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::DuplicateName { category: "component", .. })
        ));
    }

    #[test]
    fn test_lookup_miss_is_an_error() {
        let catalog = minimal_catalog();
        assert!(catalog.component("Flux Capacitor").is_err());
        assert!(catalog.structure("6U Frame").is_err());
        assert!(catalog.panel("Side Cell").is_ok());
        assert!(catalog.panel("End Cell").is_ok());
    }

    #[test]
    fn test_optional_fields_deserialize_absent() {
        let json = r#"{
            "name": "Magnetorquer",
            "x": 10.0, "y": 10.0, "z": 10.0,
            "mass": 0.05,
            "internal_slots": 0.25,
            "att_moment": 0.2
        }"#;
        let record: ComponentRecord = serde_json::from_str(json).unwrap();
        assert!(record.bitrate_down.is_none());
        assert!(record.att_knowledge.is_none());
        assert_eq!(record.att_moment, 0.2);
    }
}
