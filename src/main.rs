use anyhow::Context;
use colletkit::{
    advise_bits, build_advisor, init_logging, AdminGate, Config, FallbackStore, FileStorage,
    InventoryCache, InventoryStore, LocalStorage, RestStore, StaticIdentity, TieredStore,
    BUILD_DATE, VERSION,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    tracing::info!("ColletKit {} (built {})", VERSION, BUILD_DATE);

    let config_path = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => Config::default_path()?,
    };
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let cache_dir = config.cache.resolve_directory()?;
    let mut storage = FileStorage::open(&cache_dir)
        .with_context(|| format!("opening cache in {}", cache_dir.display()))?;
    if let Some(quota) = config.cache.quota_bytes {
        storage = storage.with_quota(quota);
    }
    let storage: Arc<dyn LocalStorage> = Arc::new(storage);

    let store: Arc<dyn InventoryStore> = match (config.store.is_configured(), config.store.api_key()) {
        (true, Some(key)) => {
            let primary = RestStore::new(
                config.store.url.clone(),
                key,
                Duration::from_secs(config.store.timeout_secs),
            )?;
            Arc::new(TieredStore::new(primary, FallbackStore::sample()))
        }
        (true, None) => {
            tracing::warn!(
                "{} is not set, showing fallback data",
                config.store.api_key_env
            );
            Arc::new(FallbackStore::sample())
        }
        (false, _) => Arc::new(FallbackStore::sample()),
    };

    let admin = AdminGate::load(storage.clone(), config.admin.bootstrap.as_slice());
    let mut cache = InventoryCache::new(store, storage, admin);

    let identity = match &config.admin.identity {
        Some(email) => StaticIdentity::new(email.clone()),
        None => StaticIdentity::anonymous(),
    };
    cache.resolve_admin(&identity).await;

    if let Err(e) = cache.refresh().await {
        tracing::warn!("Showing last known inventory: {}", e);
    }

    report(&cache);

    // Optional second argument: material to ask cutting parameters for
    if let Some(material) = std::env::args().nth(2) {
        let advisor = build_advisor(&config.advisor)?;
        if !advisor.has_key() {
            tracing::warn!(
                "{} is not set, advisor answers in demo mode",
                config.advisor.api_key_env
            );
        }
        let critical = cache.insights().critical_bits;
        let bits = if critical.is_empty() {
            cache.bits()
        } else {
            critical.as_slice()
        };
        for (name, s) in advise_bits(&advisor, bits, &material).await {
            tracing::info!(
                "{} in {}: {} rpm, feed {} mm/min, plunge {} mm/min, step-down {} mm. {}",
                name,
                material,
                s.rpm,
                s.feed_rate,
                s.plunge_rate,
                s.step_down,
                s.explanation
            );
        }
    }

    Ok(())
}

fn report<S: InventoryStore>(cache: &InventoryCache<S>) {
    let insights = cache.insights();
    tracing::info!(
        "{} bit units, {} collet units, readiness {}% ({})",
        insights.total_bit_units,
        insights.total_collet_units,
        insights.readiness_percent,
        insights.readiness
    );

    for bit in &insights.critical_bits {
        tracing::warn!("Restock {}: {} left (min {})", bit.name, bit.stock, bit.min_stock);
    }

    for bit in cache.bits() {
        let label = cache
            .collet_display(&bit.id)
            .map(|d| d.label)
            .unwrap_or_default();
        let status = if cache.is_compatible(bit) {
            "ready"
        } else {
            "no collet"
        };
        tracing::info!(
            "{} [{}] shank {}: {} ({})",
            bit.name,
            bit.stock,
            bit.shank_diameter,
            label,
            status
        );
    }
}
