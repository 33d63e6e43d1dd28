//! Optimization inputs: energy prices, period loads and the catalogue of
//! solar installation sizes.
//!
//! A [`ParameterSet`] is immutable once built. Callers supply a
//! [`ParameterOverrides`] and merge it onto the defaults with
//! [`ParameterSet::merged`]. The merge is shallow: a supplied
//! `solar_installation_sizes` table replaces the default table as a whole
//! and is never merged entry by entry.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default catalogue: installation size (kWh) → unit cost (USD/kWh).
pub const DEFAULT_SOLAR_INSTALLATION_SIZES: [(i64, f64); 6] = [
    (3, 0.282),
    (5, 0.250),
    (6, 0.230),
    (8, 0.210),
    (10, 0.190),
    (12, 0.117),
];

/// Ordered mapping from installation size to unit cost.
///
/// Keys arriving as text (JSON/TOML object keys) are coerced to integers.
/// A key that is not an integer is rejected during deserialization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SolarSizeTable(BTreeMap<i64, f64>);

impl SolarSizeTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, size: i64, cost: f64) -> Option<f64> {
        self.0.insert(size, cost)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn cost(&self, size: i64) -> Option<f64> {
        self.0.get(&size).copied()
    }

    /// `(size, cost)` pairs in ascending size order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.0.iter().map(|(size, cost)| (*size, *cost))
    }

    pub fn sizes(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.keys().copied()
    }

    /// Parse the `3=0.282,5=0.25` shorthand used on the command line.
    pub fn parse_pairs(raw: &str) -> Result<Self, ConfigError> {
        let mut table = Self::new();
        for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (size, cost) = pair.split_once('=').ok_or_else(|| ConfigError::InvalidValue {
                field: "solar_installation_sizes",
                reason: format!("expected size=cost, got `{pair}`"),
            })?;
            let size = parse_size(size).map_err(|reason| ConfigError::InvalidValue {
                field: "solar_installation_sizes",
                reason,
            })?;
            let cost: f64 = cost.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "solar_installation_sizes",
                reason: format!("cost `{}` for size {size} is not a number", cost.trim()),
            })?;
            table.insert(size, cost);
        }
        Ok(table)
    }
}

impl FromIterator<(i64, f64)> for SolarSizeTable {
    fn from_iter<I: IntoIterator<Item = (i64, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn parse_size(raw: &str) -> Result<i64, String> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| format!("installation size `{}` is not an integer", raw.trim()))
}

impl Serialize for SolarSizeTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (size, cost) in &self.0 {
            map.serialize_entry(&size.to_string(), cost)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SolarSizeTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = SolarSizeTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from integer installation size to unit cost")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut table = SolarSizeTable::new();
                while let Some((key, cost)) = access.next_entry::<String, f64>()? {
                    let size = parse_size(&key).map_err(de::Error::custom)?;
                    table.insert(size, cost);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// Complete, validated-on-use input set for one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSet {
    /// USD per kWh drawn from the grid in the peak period.
    pub peak_price: f64,
    /// USD per kWh drawn from the grid in the off-peak period.
    pub off_peak_price: f64,
    /// USD per kWh of battery capacity.
    pub battery_cost_per_kw: f64,
    /// kWh required in the peak period.
    pub peak_consumption: f64,
    /// kWh required in the off-peak period.
    pub off_peak_consumption: f64,
    pub solar_installation_sizes: SolarSizeTable,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            peak_price: 0.5,
            off_peak_price: 0.4,
            battery_cost_per_kw: 0.15,
            peak_consumption: 10.0,
            off_peak_consumption: 20.0,
            solar_installation_sizes: DEFAULT_SOLAR_INSTALLATION_SIZES.into_iter().collect(),
        }
    }
}

impl ParameterSet {
    /// Defaults with `overrides` applied field by field.
    #[must_use]
    pub fn merged(overrides: &ParameterOverrides) -> Self {
        Self::default().with_overrides(overrides)
    }

    /// Apply `overrides` on top of `self`. Supplying a size table replaces
    /// the whole table.
    #[must_use]
    pub fn with_overrides(self, overrides: &ParameterOverrides) -> Self {
        Self {
            peak_price: overrides.peak_price.unwrap_or(self.peak_price),
            off_peak_price: overrides.off_peak_price.unwrap_or(self.off_peak_price),
            battery_cost_per_kw: overrides
                .battery_cost_per_kw
                .unwrap_or(self.battery_cost_per_kw),
            peak_consumption: overrides.peak_consumption.unwrap_or(self.peak_consumption),
            off_peak_consumption: overrides
                .off_peak_consumption
                .unwrap_or(self.off_peak_consumption),
            solar_installation_sizes: overrides
                .solar_installation_sizes
                .clone()
                .unwrap_or(self.solar_installation_sizes),
        }
    }

    /// Check every value is finite and strictly positive and that the size
    /// table is non-empty with positive sizes and costs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scalars = [
            ("peak_price", self.peak_price),
            ("off_peak_price", self.off_peak_price),
            ("battery_cost_per_kw", self.battery_cost_per_kw),
            ("peak_consumption", self.peak_consumption),
            ("off_peak_consumption", self.off_peak_consumption),
        ];
        for (field, value) in scalars {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }

        if self.solar_installation_sizes.is_empty() {
            return Err(ConfigError::EmptySizeTable);
        }
        for (size, cost) in self.solar_installation_sizes.iter() {
            if size <= 0 {
                return Err(ConfigError::InvalidSize {
                    size,
                    reason: "size must be positive".into(),
                });
            }
            if !cost.is_finite() || cost <= 0.0 {
                return Err(ConfigError::InvalidSize {
                    size,
                    reason: format!("unit cost must be positive, got {cost}"),
                });
            }
        }
        Ok(())
    }
}

/// Partial parameter set as supplied by a caller. Absent fields keep their
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_peak_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_cost_per_kw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_consumption: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_peak_consumption: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solar_installation_sizes: Option<SolarSizeTable>,
}

impl ParameterOverrides {
    /// Layer `other` over `self`; fields set in `other` win.
    #[must_use]
    pub fn overlay(self, other: Self) -> Self {
        Self {
            peak_price: other.peak_price.or(self.peak_price),
            off_peak_price: other.off_peak_price.or(self.off_peak_price),
            battery_cost_per_kw: other.battery_cost_per_kw.or(self.battery_cost_per_kw),
            peak_consumption: other.peak_consumption.or(self.peak_consumption),
            off_peak_consumption: other.off_peak_consumption.or(self.off_peak_consumption),
            solar_installation_sizes: other
                .solar_installation_sizes
                .or(self.solar_installation_sizes),
        }
    }
}
