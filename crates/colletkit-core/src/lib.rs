//! # ColletKit Core
//!
//! Core types and logic for ColletKit.
//! Provides the inventory data model, the shank-to-collet resolver,
//! stock insights and the local storage abstraction.

pub mod data;
pub mod error;
pub mod insights;
pub mod storage;

pub use data::{
    calculate_preset, collet_display, is_compatible, parse_size, preset_for_name, resolve_collet,
    resolve_millimeters, Application, Bit, BitPatch, Collet, ColletDisplay, ColletRequirement,
    CuttingPreset, CuttingSpecs, NewBit, NewCollet, PresetMaterial, ShankDiameter,
    CANONICAL_COLLET_SIZES, COLLET_3175_MM, COLLET_6_MM, UNAVAILABLE_LABEL,
};

pub use error::{Error, Result, StorageError, StoreError};

pub use insights::{filter_bits, matches_search, BitFilter, ReadinessLevel, StockInsights};

pub use storage::{FileStorage, LocalStorage, MemoryStorage};
