// Weight units and conversion
//
// Kilograms are the canonical unit. Every entry stores its weight in kg and
// carries the unit the user typed it in, so the original figure can be
// re-displayed without compounding conversion error.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pounds in one kilogram.
pub const POUNDS_PER_KG: f64 = 2.20462;

/// Kilograms in one pound.
pub const KG_PER_POUND: f64 = 0.453592;

/// Kilograms in one stone.
pub const KG_PER_STONE: f64 = 6.35029;

/// Unit a weight figure is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeightUnit {
    #[serde(rename = "kg")]
    Kilograms,
    #[serde(rename = "lbs")]
    Pounds,
    #[serde(rename = "st")]
    Stone,
}

impl WeightUnit {
    /// Every supported unit, in display-cycle order.
    pub const ALL: [WeightUnit; 3] = [
        WeightUnit::Kilograms,
        WeightUnit::Pounds,
        WeightUnit::Stone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Kilograms => "kg",
            WeightUnit::Pounds => "lbs",
            WeightUnit::Stone => "st",
        }
    }

    /// Parses a stored or typed unit tag. Accepts common spellings.
    pub fn parse(s: &str) -> Option<WeightUnit> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Some(WeightUnit::Kilograms),
            "lb" | "lbs" | "pound" | "pounds" => Some(WeightUnit::Pounds),
            "st" | "stone" | "stones" => Some(WeightUnit::Stone),
            _ => None,
        }
    }

    /// The unit after this one in the display cycle, wrapping around.
    pub fn next(&self) -> WeightUnit {
        match self {
            WeightUnit::Kilograms => WeightUnit::Pounds,
            WeightUnit::Pounds => WeightUnit::Stone,
            WeightUnit::Stone => WeightUnit::Kilograms,
        }
    }

    /// Converts a canonical kilogram figure into this unit.
    pub fn from_kilograms(&self, kg: f64) -> f64 {
        match self {
            WeightUnit::Kilograms => kg,
            WeightUnit::Pounds => kg * POUNDS_PER_KG,
            WeightUnit::Stone => kg / KG_PER_STONE,
        }
    }

    /// Converts a figure in this unit back to canonical kilograms.
    pub fn to_kilograms(&self, value: f64) -> f64 {
        match self {
            WeightUnit::Kilograms => value,
            WeightUnit::Pounds => value * KG_PER_POUND,
            WeightUnit::Stone => value * KG_PER_STONE,
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Renders a canonical kg weight in the given unit, one decimal place.
pub fn format_weight(kg: f64, unit: WeightUnit) -> String {
    format!("{:.1} {}", unit.from_kilograms(kg), unit)
}

/// Renders a percentage figure, one decimal place.
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}
