//! Shank-to-collet resolution
//!
//! This module provides:
//! - Classification of a shank diameter into one of the canonical collet sizes
//! - Stock-aware compatibility against the collet inventory
//! - The collet label shown for a bit (stored override or computed)
//!
//! Only two collet sizes exist in this shop. Anything outside the tolerance
//! bands below is unsupported; there is no interpolation.

use super::{Bit, Collet, ShankDiameter};
use serde::Serialize;

/// 1/8" collet
pub const COLLET_3175_MM: f64 = 3.175;
/// 6 mm collet
pub const COLLET_6_MM: f64 = 6.0;
/// Every size a requirement can resolve to
pub const CANONICAL_COLLET_SIZES: [f64; 2] = [COLLET_3175_MM, COLLET_6_MM];

/// Label for shanks no collet can hold
pub const UNAVAILABLE_LABEL: &str = "Pinça indisponível";
const LABEL_3175_MM: &str = "Usar Pinça 3.175mm";
const LABEL_6_MM: &str = "Usar Pinça 6mm";

/// Match window between a collet's size and the required size
const COLLET_MATCH_TOLERANCE: f64 = 0.01;

/// A nominal shank size and the collet that grips it
struct ToleranceBand {
    nominal: f64,
    tolerance: f64,
    collet: f64,
    label: &'static str,
}

// Checked in order, first match wins. The tight band around 3.175 keeps the
// exact imperial value apart from a metric 3 mm reading.
const TOLERANCE_BANDS: [ToleranceBand; 4] = [
    ToleranceBand {
        nominal: 3.0,
        tolerance: 0.15,
        collet: COLLET_3175_MM,
        label: LABEL_3175_MM,
    },
    ToleranceBand {
        nominal: COLLET_3175_MM,
        tolerance: 0.01,
        collet: COLLET_3175_MM,
        label: LABEL_3175_MM,
    },
    ToleranceBand {
        nominal: 5.0,
        tolerance: 0.15,
        collet: COLLET_6_MM,
        label: LABEL_6_MM,
    },
    ToleranceBand {
        nominal: 6.0,
        tolerance: 0.15,
        collet: COLLET_6_MM,
        label: LABEL_6_MM,
    },
];

/// Collet a bit needs, derived from its shank on every render
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColletRequirement {
    pub label: &'static str,
    /// One of [`CANONICAL_COLLET_SIZES`], or `None` when unsupported
    pub target_size: Option<f64>,
}

impl ColletRequirement {
    /// No collet in this shop fits
    pub const UNAVAILABLE: Self = Self {
        label: UNAVAILABLE_LABEL,
        target_size: None,
    };

    pub fn is_available(&self) -> bool {
        self.target_size.is_some()
    }
}

/// Resolve the collet required for a shank diameter
///
/// Empty or unreadable input resolves to [`ColletRequirement::UNAVAILABLE`].
pub fn resolve_collet(shank: &ShankDiameter) -> ColletRequirement {
    if shank.is_empty() {
        return ColletRequirement::UNAVAILABLE;
    }
    match shank.millimeters() {
        Some(mm) => resolve_millimeters(mm),
        None => ColletRequirement::UNAVAILABLE,
    }
}

/// Resolve the collet required for an already parsed diameter
pub fn resolve_millimeters(mm: f64) -> ColletRequirement {
    TOLERANCE_BANDS
        .iter()
        .find(|band| (mm - band.nominal).abs() < band.tolerance)
        .map(|band| ColletRequirement {
            label: band.label,
            target_size: Some(band.collet),
        })
        .unwrap_or(ColletRequirement::UNAVAILABLE)
}

/// Check whether an in-stock collet can hold this shank
///
/// Unsupported shanks are never compatible, whatever the inventory holds.
pub fn is_compatible(shank: &ShankDiameter, collets: &[Collet]) -> bool {
    let Some(target) = resolve_collet(shank).target_size else {
        return false;
    };

    collets
        .iter()
        .any(|c| c.in_stock() && (c.millimeters() - target).abs() < COLLET_MATCH_TOLERANCE)
}

/// Collet label shown for a bit
#[derive(Debug, Clone, PartialEq)]
pub struct ColletDisplay {
    /// Stored override when present, computed label otherwise
    pub label: String,
    /// The shown label says no collet is available
    pub is_error: bool,
    /// The label came from the stored override
    pub overridden: bool,
    /// What the resolver computes for this bit
    pub computed: ColletRequirement,
}

impl ColletDisplay {
    /// An override is shown and it differs from the computed label
    pub fn disagrees(&self) -> bool {
        self.overridden && self.label.trim() != self.computed.label
    }
}

/// Label shown for a bit; the stored override wins and is not reconciled
pub fn collet_display(bit: &Bit) -> ColletDisplay {
    let computed = bit.collet_requirement();
    let (label, overridden) = match bit.collet_override() {
        Some(label) => (label.to_string(), true),
        None => (computed.label.to_string(), false),
    };
    let is_error = label.to_lowercase().contains("indisponível");

    ColletDisplay {
        label,
        is_error,
        overridden,
        computed,
    }
}
