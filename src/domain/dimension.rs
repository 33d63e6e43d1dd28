//! Physical dimensions carried by parameters, variables and constants.
//!
//! A [`Dimension`] is a vector of integer exponents over the base quantities
//! currency, energy and time. Power is energy per unit time. Multiplication
//! adds exponents, division subtracts them, and addition is only meaningful
//! between equal dimensions.

use std::fmt;
use std::ops::{Div, Mul};

use serde::Serialize;

/// Exponents over (currency, energy, time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Dimension {
    pub currency: i8,
    pub energy: i8,
    pub time: i8,
}

impl Dimension {
    /// Pure number.
    pub const DIMENSIONLESS: Self = Self::new(0, 0, 0);
    /// Money (USD).
    pub const CURRENCY: Self = Self::new(1, 0, 0);
    /// Energy (kWh). Storage and installation capacities are expressed in energy.
    pub const ENERGY: Self = Self::new(0, 1, 0);
    /// Time (h).
    pub const TIME: Self = Self::new(0, 0, 1);
    /// Power (kW = kWh/h).
    pub const POWER: Self = Self::new(0, 1, -1);
    /// Price of energy (USD/kWh).
    pub const CURRENCY_PER_ENERGY: Self = Self::new(1, -1, 0);

    #[must_use]
    pub const fn new(currency: i8, energy: i8, time: i8) -> Self {
        Self {
            currency,
            energy,
            time,
        }
    }

    #[must_use]
    pub const fn is_dimensionless(self) -> bool {
        self.currency == 0 && self.energy == 0 && self.time == 0
    }
}

impl Mul for Dimension {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.currency + rhs.currency,
            self.energy + rhs.energy,
            self.time + rhs.time,
        )
    }
}

impl Div for Dimension {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        Self::new(
            self.currency - rhs.currency,
            self.energy - rhs.energy,
            self.time - rhs.time,
        )
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return f.write_str("dimensionless");
        }
        if *self == Self::POWER {
            return f.write_str("kW");
        }

        let mut parts = Vec::with_capacity(3);
        for (symbol, exponent) in [("USD", self.currency), ("kWh", self.energy), ("h", self.time)] {
            match exponent {
                0 => {}
                1 => parts.push(symbol.to_string()),
                n => parts.push(format!("{symbol}^{n}")),
            }
        }
        f.write_str(&parts.join("·"))
    }
}

/// A constant together with its dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quantity {
    pub value: f64,
    pub dimension: Dimension,
}

impl Quantity {
    #[must_use]
    pub const fn new(value: f64, dimension: Dimension) -> Self {
        Self { value, dimension }
    }

    #[must_use]
    pub const fn dimensionless(value: f64) -> Self {
        Self::new(value, Dimension::DIMENSIONLESS)
    }

    #[must_use]
    pub const fn currency(value: f64) -> Self {
        Self::new(value, Dimension::CURRENCY)
    }

    #[must_use]
    pub const fn energy(value: f64) -> Self {
        Self::new(value, Dimension::ENERGY)
    }

    #[must_use]
    pub const fn currency_per_energy(value: f64) -> Self {
        Self::new(value, Dimension::CURRENCY_PER_ENERGY)
    }
}
