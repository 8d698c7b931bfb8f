//! # ColletKit
//!
//! Inventory of CNC milling bits and the collets that hold them.
//!
//! ## Architecture
//!
//! ColletKit is organized as a workspace with multiple crates:
//!
//! 1. **colletkit-core** - Data model, size parsing, collet resolution, insights, local storage
//! 2. **colletkit-store** - Remote store, fallback data, identity and advisor collaborators
//! 3. **colletkit-settings** - Configuration files and the administrator gate
//! 4. **colletkit-cache** - Session inventory cache with quota-aware persistence
//! 5. **colletkit** - Main binary that integrates all crates

pub use colletkit_core::data;

pub use colletkit_core::{
    calculate_preset, collet_display, filter_bits, is_compatible, matches_search, parse_size,
    resolve_collet, Bit, BitFilter, BitPatch, Collet, ColletDisplay, ColletRequirement, Error,
    FileStorage, LocalStorage, MemoryStorage, NewBit, NewCollet, PresetMaterial, ReadinessLevel,
    Result, ShankDiameter, StockInsights, StorageError, StoreError,
};

pub use colletkit_store::{
    AdvisorError, AdvisorSuggestion, FallbackStore, GeminiAdvisor, IdentityProvider,
    InventoryStore, ParameterAdvisor, RestStore, StaticIdentity, TieredStore,
};

pub use colletkit_settings::{AdminGate, AdvisorSettings, Config, SettingsError};

pub use colletkit_cache::{InventoryCache, RefreshSummary, SaveOutcome, SaveStrategy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Build the cutting-parameter advisor from its config section
///
/// A missing API key is not an error: the advisor then answers with
/// demo suggestions.
pub fn build_advisor(settings: &AdvisorSettings) -> std::result::Result<GeminiAdvisor, AdvisorError> {
    GeminiAdvisor::from_env(
        &settings.api_key_env,
        settings.model.clone(),
        settings.temperature,
        std::time::Duration::from_secs(settings.timeout_secs),
    )
}

/// Ask the advisor for each bit in turn, keyed by bit name
pub async fn advise_bits(
    advisor: &dyn ParameterAdvisor,
    bits: &[Bit],
    material: &str,
) -> Vec<(String, AdvisorSuggestion)> {
    let mut suggestions = Vec::with_capacity(bits.len());
    for bit in bits {
        let suggestion = advisor.suggest(bit, material).await;
        if let Some(warning) = &suggestion.warning {
            tracing::warn!("{} in {}: {}", bit.name, material, warning);
        }
        suggestions.push((bit.name.clone(), suggestion));
    }
    suggestions
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct RecordingAdvisor {
        asked: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ParameterAdvisor for RecordingAdvisor {
        async fn suggest(&self, bit: &Bit, material: &str) -> AdvisorSuggestion {
            self.asked.lock().push((bit.id.clone(), material.to_string()));
            AdvisorSuggestion::fallback(format!("asked about {}", bit.name))
        }
    }

    fn named_bit(id: &str, name: &str) -> Bit {
        Bit {
            id: id.to_string(),
            name: name.to_string(),
            ..Bit::default()
        }
    }

    #[test]
    fn test_build_advisor_from_settings() {
        let settings = AdvisorSettings {
            model: "test-model".to_string(),
            api_key_env: "COLLETKIT_TEST_UNSET_ADVISOR_KEY".to_string(),
            ..AdvisorSettings::default()
        };
        let advisor = build_advisor(&settings).unwrap();
        assert_eq!(advisor.model(), "test-model");
        assert!(!advisor.has_key());
    }

    #[tokio::test]
    async fn test_advise_bits_asks_once_per_bit() {
        let advisor = RecordingAdvisor {
            asked: Mutex::new(Vec::new()),
        };
        let bits = vec![named_bit("a", "Flat 6mm"), named_bit("b", "Vbit 90")];

        let suggestions = advise_bits(&advisor, &bits, "MDF").await;

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].0, "Flat 6mm");
        assert_eq!(suggestions[1].0, "Vbit 90");
        assert!(suggestions[1].1.demo);
        let asked = advisor.asked.lock();
        assert_eq!(
            *asked,
            vec![
                ("a".to_string(), "MDF".to_string()),
                ("b".to_string(), "MDF".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_keyless_advisor_gives_demo_suggestions() {
        let settings = AdvisorSettings {
            api_key_env: "COLLETKIT_TEST_UNSET_ADVISOR_KEY".to_string(),
            timeout_secs: 1,
            ..AdvisorSettings::default()
        };
        let advisor = build_advisor(&settings).unwrap();
        let suggestions = advise_bits(&advisor, &[named_bit("a", "Flat 6mm")], "Acrylic").await;
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].1.demo);
    }
}
