//! Stock insights
//!
//! Derived views over the cached inventory: dashboard totals, restock
//! priorities, shop readiness and the bit list filters. Everything here is
//! recomputed from the collections on demand.

use crate::data::{is_compatible, Bit, Collet};
use serde::{Deserialize, Serialize};

/// How ready the shop is to run its stocked bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessLevel {
    /// Fewer than 30% of stocked bits can be mounted
    Critical,
    /// Fewer than 80% of stocked bits can be mounted
    Warning,
    Good,
}

impl ReadinessLevel {
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            p if p < 30 => Self::Critical,
            p if p < 80 => Self::Warning,
            _ => Self::Good,
        }
    }
}

impl std::fmt::Display for ReadinessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "Critical"),
            Self::Warning => write!(f, "Warning"),
            Self::Good => write!(f, "Good"),
        }
    }
}

/// Dashboard summary of the inventory
#[derive(Debug, Clone, PartialEq)]
pub struct StockInsights {
    /// Sum of all bit stock
    pub total_bit_units: u64,
    /// Sum of all collet stock
    pub total_collet_units: u64,
    /// Low on stock and mountable, so restocking is urgent
    pub critical_bits: Vec<Bit>,
    /// Share of stocked bits that have an in-stock collet, 0-100
    pub readiness_percent: u8,
    pub readiness: ReadinessLevel,
}

impl StockInsights {
    /// Compute the summary for the current collections
    pub fn compute(bits: &[Bit], collets: &[Collet]) -> Self {
        let total_bit_units = bits.iter().map(|b| u64::from(b.stock)).sum();
        let total_collet_units = collets.iter().map(|c| u64::from(c.stock)).sum();

        let critical_bits = bits
            .iter()
            .filter(|b| b.is_low_stock() && is_compatible(&b.shank_diameter, collets))
            .cloned()
            .collect();

        let readiness_percent = readiness_percent(bits, collets);

        Self {
            total_bit_units,
            total_collet_units,
            critical_bits,
            readiness_percent,
            readiness: ReadinessLevel::from_percent(readiness_percent),
        }
    }
}

/// Percentage of bits with stock that can be mounted right now
pub fn readiness_percent(bits: &[Bit], collets: &[Collet]) -> u8 {
    let active: Vec<&Bit> = bits.iter().filter(|b| b.stock > 0).collect();
    if active.is_empty() {
        return 0;
    }

    let usable = active
        .iter()
        .filter(|b| is_compatible(&b.shank_diameter, collets))
        .count();

    ((usable as f64 / active.len() as f64) * 100.0).round() as u8
}

/// Category chips of the bit list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BitFilter {
    #[default]
    All,
    /// At or below minimum stock
    LowStock,
    /// No in-stock collet can hold it
    MissingCollet,
    /// Shank near 5 or 6 mm
    Shank6mm,
    /// Shank near 3 or 3.175 mm
    Shank3175mm,
}

impl BitFilter {
    /// Check if a bit belongs to this category
    pub fn matches(&self, bit: &Bit, collets: &[Collet]) -> bool {
        match self {
            Self::All => true,
            Self::LowStock => bit.is_low_stock(),
            Self::MissingCollet => !is_compatible(&bit.shank_diameter, collets),
            // List chips use wider windows than the resolver
            Self::Shank6mm => bit
                .shank_diameter
                .millimeters()
                .is_some_and(|v| (v - 5.0).abs() < 0.2 || (v - 6.0).abs() < 0.2),
            Self::Shank3175mm => bit
                .shank_diameter
                .millimeters()
                .is_some_and(|v| (v - 3.0).abs() < 0.2 || (v - 3.175).abs() < 0.05),
        }
    }
}

/// Case-insensitive search over name and type; a blank query matches all
pub fn matches_search(bit: &Bit, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    let query_lower = query.to_lowercase();
    bit.name.to_lowercase().contains(&query_lower)
        || bit.tool_type.to_lowercase().contains(&query_lower)
}

/// Apply a category filter and a search query, keeping list order
pub fn filter_bits<'a>(
    bits: &'a [Bit],
    collets: &[Collet],
    filter: BitFilter,
    query: &str,
) -> Vec<&'a Bit> {
    bits.iter()
        .filter(|b| filter.matches(b, collets) && matches_search(b, query))
        .collect()
}
