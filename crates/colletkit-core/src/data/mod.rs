//! Inventory data model
//!
//! Bits and collets as they are cached locally and handed to the resolver.
//! Field names serialize in camelCase, which is also the layout of the
//! persisted cache entries.

pub mod collet;
pub mod presets;
pub mod sizing;

pub use collet::{
    collet_display, is_compatible, resolve_collet, resolve_millimeters, ColletDisplay,
    ColletRequirement, CANONICAL_COLLET_SIZES, COLLET_3175_MM, COLLET_6_MM, UNAVAILABLE_LABEL,
};
pub use presets::{calculate_preset, preset_for_name, CuttingPreset, PresetMaterial};
pub use sizing::parse_size;

use serde::{Deserialize, Serialize};

/// Shank diameter as the upstream store keeps it
///
/// The hosted table stores this column inconsistently: plain numbers,
/// numbers with "mm", localized decimals. Both shapes are kept verbatim
/// and only interpreted through [`ShankDiameter::millimeters`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShankDiameter {
    /// Native numeric value
    Number(f64),
    /// Loosely formatted text
    Text(String),
}

impl ShankDiameter {
    /// Value in millimeters, or `None` when it cannot be read
    pub fn millimeters(&self) -> Option<f64> {
        match self {
            Self::Number(v) if v.is_nan() => None,
            Self::Number(v) => Some(*v),
            Self::Text(s) => parse_size(s),
        }
    }

    /// True when no value was entered at all
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }
}

impl Default for ShankDiameter {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl std::fmt::Display for ShankDiameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{}", v),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for ShankDiameter {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for ShankDiameter {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ShankDiameter {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Cutting parameters saved with a bit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CuttingSpecs {
    /// Spindle speed
    pub rpm: u32,
    /// Lateral feed in mm/min
    pub feed_rate: f64,
    /// Plunge feed in mm/min
    pub plunge_rate: f64,
    /// Depth per pass in mm
    pub step_down: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_length: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardness: Option<String>,
    /// Flute geometry tag, e.g. "2F"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<String>,
}

/// Where a bit is meant to be used
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Application {
    pub materials: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cut_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advantage: Option<String>,
}

/// A milling bit in stock
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Bit {
    pub id: String,
    pub name: String,
    /// Tool type / geometry tag, e.g. "Topo reto"
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Cutting diameter, unit suffixed ("3mm")
    pub diameter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub stock: u32,
    pub min_stock: u32,
    pub material: String,
    /// Authoritative compatibility input
    #[serde(alias = "colletSize")]
    pub shank_diameter: ShankDiameter,
    /// Stored collet label; wins over the computed one when non-blank
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_collet: Option<String>,
    pub has_collet: bool,
    pub specs: CuttingSpecs,
    pub application: Application,
}

impl Bit {
    /// Stock is at or below the minimum threshold
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }

    /// Collet this bit needs, computed from its shank diameter
    pub fn collet_requirement(&self) -> ColletRequirement {
        resolve_collet(&self.shank_diameter)
    }

    /// Stored override label, if it carries any text
    pub fn collet_override(&self) -> Option<&str> {
        self.recommended_collet
            .as_deref()
            .filter(|label| !label.trim().is_empty())
    }
}

/// A collet in stock
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Collet {
    pub id: String,
    pub name: String,
    /// Loosely formatted size, canonical unit mm
    pub size: String,
    #[serde(rename = "type")]
    pub collet_type: String,
    pub description: String,
    pub stock: u32,
    pub min_stock: u32,
    pub is_imperial: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Collet {
    /// Parsed size; unreadable sizes count as 0 and never match a collet size
    pub fn millimeters(&self) -> f64 {
        parse_size(&self.size).unwrap_or(0.0)
    }

    /// At least one unit on the shelf
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Partial bit update; only `Some` fields are written
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BitPatch {
    pub name: Option<String>,
    pub tool_type: Option<String>,
    pub diameter: Option<String>,
    pub image_url: Option<String>,
    pub stock: Option<u32>,
    pub min_stock: Option<u32>,
    pub material: Option<String>,
    pub shank_diameter: Option<ShankDiameter>,
    pub has_collet: Option<bool>,
    pub specs: Option<CuttingSpecs>,
    pub application: Option<Application>,
}

impl BitPatch {
    /// Patch that only changes stock
    pub fn stock(stock: u32) -> Self {
        Self {
            stock: Some(stock),
            ..Default::default()
        }
    }

    /// Apply the present fields to a bit
    pub fn apply(&self, bit: &mut Bit) {
        if let Some(v) = &self.name {
            bit.name = v.clone();
        }
        if let Some(v) = &self.tool_type {
            bit.tool_type = v.clone();
        }
        if let Some(v) = &self.diameter {
            bit.diameter = v.clone();
        }
        if let Some(v) = &self.image_url {
            bit.image_url = Some(v.clone());
        }
        if let Some(v) = self.stock {
            bit.stock = v;
        }
        if let Some(v) = self.min_stock {
            bit.min_stock = v;
        }
        if let Some(v) = &self.material {
            bit.material = v.clone();
        }
        if let Some(v) = &self.shank_diameter {
            bit.shank_diameter = v.clone();
        }
        if let Some(v) = self.has_collet {
            bit.has_collet = v;
        }
        if let Some(v) = &self.specs {
            bit.specs = v.clone();
        }
        if let Some(v) = &self.application {
            bit.application = v.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Fields of a bit about to be created
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewBit {
    pub name: String,
    pub tool_type: String,
    pub diameter: String,
    pub image_url: Option<String>,
    pub stock: u32,
    pub min_stock: u32,
    pub material: String,
    pub shank_diameter: ShankDiameter,
    pub has_collet: bool,
    pub specs: CuttingSpecs,
    pub application: Application,
}

impl NewBit {
    /// Materialize with an assigned id
    pub fn into_bit(self, id: impl Into<String>) -> Bit {
        Bit {
            id: id.into(),
            name: self.name,
            tool_type: self.tool_type,
            diameter: self.diameter,
            image_url: self.image_url,
            stock: self.stock,
            min_stock: self.min_stock,
            material: self.material,
            shank_diameter: self.shank_diameter,
            recommended_collet: None,
            has_collet: self.has_collet,
            specs: self.specs,
            application: self.application,
        }
    }
}

/// Fields of a collet about to be created
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCollet {
    pub name: String,
    pub size: String,
    pub collet_type: String,
    pub description: String,
    pub stock: u32,
    pub min_stock: u32,
    pub is_imperial: bool,
    pub image_url: Option<String>,
}

impl NewCollet {
    pub fn into_collet(self, id: impl Into<String>) -> Collet {
        Collet {
            id: id.into(),
            name: self.name,
            size: self.size,
            collet_type: self.collet_type,
            description: self.description,
            stock: self.stock,
            min_stock: self.min_stock,
            is_imperial: self.is_imperial,
            image_url: self.image_url,
        }
    }
}
