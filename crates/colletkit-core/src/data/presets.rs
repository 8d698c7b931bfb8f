//! Material cutting presets
//!
//! A simple preset table: each target material scales the bit's saved
//! cutting parameters. This is a starting point for the operator, not an
//! optimized feeds-and-speeds model.

use super::{parse_size, Bit};
use serde::{Deserialize, Serialize};

/// Base parameters used when the bit has none saved
const BASE_RPM: u32 = 18000;
const BASE_FEED_RATE: f64 = 1500.0;
const BASE_PLUNGE_RATE: f64 = 500.0;
const BASE_STEP_DOWN: f64 = 1.0;

const MIN_RPM: u32 = 8000;
const MAX_RPM: u32 = 24000;

/// Materials with a preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresetMaterial {
    Mdf,
    Plywood,
    Hardwood,
    Softwood,
    Acrylic,
    Aluminum,
    Brass,
    Hdpe,
}

impl PresetMaterial {
    /// Get all preset materials
    pub fn all() -> &'static [PresetMaterial] {
        &[
            PresetMaterial::Mdf,
            PresetMaterial::Plywood,
            PresetMaterial::Hardwood,
            PresetMaterial::Softwood,
            PresetMaterial::Acrylic,
            PresetMaterial::Aluminum,
            PresetMaterial::Brass,
            PresetMaterial::Hdpe,
        ]
    }

    /// Scale factors for (rpm, feed, plunge, step-down as fraction of diameter)
    fn factors(&self) -> (f64, f64, f64, f64) {
        match self {
            Self::Mdf => (1.0, 1.0, 1.0, 1.0),
            Self::Plywood => (1.0, 0.9, 0.9, 0.75),
            Self::Hardwood => (0.9, 0.7, 0.7, 0.5),
            Self::Softwood => (1.0, 1.1, 1.0, 1.0),
            Self::Acrylic => (0.8, 0.8, 0.6, 0.5),
            Self::Aluminum => (0.6, 0.35, 0.3, 0.25),
            Self::Brass => (0.55, 0.3, 0.25, 0.2),
            Self::Hdpe => (0.75, 1.0, 0.8, 0.75),
        }
    }
}

impl std::fmt::Display for PresetMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mdf => write!(f, "MDF"),
            Self::Plywood => write!(f, "Plywood"),
            Self::Hardwood => write!(f, "Hardwood"),
            Self::Softwood => write!(f, "Softwood"),
            Self::Acrylic => write!(f, "Acrylic"),
            Self::Aluminum => write!(f, "Aluminum"),
            Self::Brass => write!(f, "Brass"),
            Self::Hdpe => write!(f, "HDPE"),
        }
    }
}

impl std::str::FromStr for PresetMaterial {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mdf" => Ok(Self::Mdf),
            "plywood" | "compensado" => Ok(Self::Plywood),
            "hardwood" | "madeira dura" => Ok(Self::Hardwood),
            "softwood" | "pinus" | "madeira macia" => Ok(Self::Softwood),
            "acrylic" | "acrílico" | "acrilico" => Ok(Self::Acrylic),
            "aluminum" | "aluminium" | "alumínio" | "aluminio" => Ok(Self::Aluminum),
            "brass" | "latão" | "latao" => Ok(Self::Brass),
            "hdpe" | "polietileno" | "polymer" => Ok(Self::Hdpe),
            other => Err(format!("No preset for material: {}", other)),
        }
    }
}

/// Parameters suggested for a bit in a material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuttingPreset {
    pub rpm: u32,
    /// mm/min
    pub feed_rate: f64,
    /// mm/min
    pub plunge_rate: f64,
    /// mm per pass
    pub step_down: f64,
    pub description: String,
}

/// Scale a bit's saved parameters for a target material
pub fn calculate_preset(bit: &Bit, material: PresetMaterial) -> CuttingPreset {
    let (rpm_k, feed_k, plunge_k, step_k) = material.factors();
    let specs = &bit.specs;

    let base_rpm = if specs.rpm > 0 { specs.rpm } else { BASE_RPM };
    let base_feed = non_zero_or(specs.feed_rate, BASE_FEED_RATE);
    let base_plunge = non_zero_or(specs.plunge_rate, BASE_PLUNGE_RATE);

    let rpm = ((f64::from(base_rpm) * rpm_k / 100.0).round() * 100.0)
        .clamp(f64::from(MIN_RPM), f64::from(MAX_RPM)) as u32;

    let step_down = match parse_size(&bit.diameter).filter(|d| *d > 0.0) {
        Some(diameter) => diameter * step_k,
        None => non_zero_or(specs.step_down, BASE_STEP_DOWN) * step_k,
    };

    CuttingPreset {
        rpm,
        feed_rate: (base_feed * feed_k).round(),
        plunge_rate: (base_plunge * plunge_k).round(),
        step_down: (step_down * 10.0).round() / 10.0,
        description: format!("{} preset scaled from the saved {} parameters", material, bit.name),
    }
}

/// Preset by material name; `None` when the name has no preset
pub fn preset_for_name(bit: &Bit, material: &str) -> Option<CuttingPreset> {
    material
        .parse::<PresetMaterial>()
        .ok()
        .map(|m| calculate_preset(bit, m))
}

fn non_zero_or(value: f64, fallback: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        fallback
    }
}
