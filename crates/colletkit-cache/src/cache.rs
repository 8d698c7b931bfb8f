//! Inventory cache
//!
//! Holds the last-known bit and collet lists for the session. Lists are
//! read from local storage at startup, replaced wholesale on every
//! successful refresh and saved back through the quota-aware ladder.
//! Mutations go through the store and are followed by a refresh; the
//! administrator gate is checked before any of them.

use chrono::{DateTime, Utc};
use colletkit_core::{
    collet_display, filter_bits, is_compatible, Bit, BitFilter, BitPatch, Collet, ColletDisplay,
    Error, LocalStorage, NewBit, NewCollet, Result, StockInsights, StoreError,
};
use colletkit_settings::AdminGate;
use colletkit_store::{IdentityProvider, InventoryStore};
use std::sync::Arc;

use crate::strategy::{self, SaveOutcome};

/// Local storage key of the cached bits
pub const BITS_CACHE_KEY: &str = "cnc_bits_cache";

/// Local storage key of the cached collets
pub const COLLETS_CACHE_KEY: &str = "cnc_collets_cache";

/// What a successful refresh replaced
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSummary {
    pub bits: usize,
    pub collets: usize,
    pub refreshed_at: DateTime<Utc>,
    pub bits_saved: SaveOutcome,
    pub collets_saved: SaveOutcome,
}

pub struct InventoryCache<S> {
    store: S,
    storage: Arc<dyn LocalStorage>,
    admin: AdminGate,
    bits: Vec<Bit>,
    collets: Vec<Collet>,
    loading: bool,
    last_refreshed: Option<DateTime<Utc>>,
}

impl<S: InventoryStore> InventoryCache<S> {
    /// Build the cache from whatever local storage holds
    pub fn new(store: S, storage: Arc<dyn LocalStorage>, admin: AdminGate) -> Self {
        let bits: Vec<Bit> = strategy::load(storage.as_ref(), BITS_CACHE_KEY);
        let collets: Vec<Collet> = strategy::load(storage.as_ref(), COLLETS_CACHE_KEY);
        let loading = bits.is_empty() && collets.is_empty();

        tracing::debug!(
            "Cache started with {} bits and {} collets",
            bits.len(),
            collets.len()
        );

        Self {
            store,
            storage,
            admin,
            bits,
            collets,
            loading,
            last_refreshed: None,
        }
    }

    /// Re-fetch both lists; nothing is replaced unless both arrive
    pub async fn refresh(&mut self) -> std::result::Result<RefreshSummary, StoreError> {
        let fetched = tokio::try_join!(self.store.list_bits(), self.store.list_collets());
        self.loading = false;

        let (bits, collets) = match fetched {
            Ok(lists) => lists,
            Err(e) => {
                tracing::error!("Failed to refresh inventory: {}", e);
                return Err(e);
            }
        };

        let bits_saved = strategy::save(self.storage.as_ref(), BITS_CACHE_KEY, &bits);
        let collets_saved = strategy::save(self.storage.as_ref(), COLLETS_CACHE_KEY, &collets);

        self.bits = bits;
        self.collets = collets;
        let refreshed_at = Utc::now();
        self.last_refreshed = Some(refreshed_at);

        tracing::info!(
            "Inventory refreshed: {} bits, {} collets",
            self.bits.len(),
            self.collets.len()
        );

        Ok(RefreshSummary {
            bits: self.bits.len(),
            collets: self.collets.len(),
            refreshed_at,
            bits_saved,
            collets_saved,
        })
    }

    /// True until the first refresh attempt completes on an empty start
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }

    pub fn bits(&self) -> &[Bit] {
        &self.bits
    }

    pub fn collets(&self) -> &[Collet] {
        &self.collets
    }

    pub fn bit_by_id(&self, id: &str) -> Option<&Bit> {
        self.bits.iter().find(|b| b.id == id)
    }

    pub fn insights(&self) -> StockInsights {
        StockInsights::compute(&self.bits, &self.collets)
    }

    pub fn filtered_bits(&self, filter: BitFilter, query: &str) -> Vec<&Bit> {
        filter_bits(&self.bits, &self.collets, filter, query)
    }

    /// Whether an in-stock collet fits this bit
    pub fn is_compatible(&self, bit: &Bit) -> bool {
        is_compatible(&bit.shank_diameter, &self.collets)
    }

    /// Collet label shown for a cached bit
    pub fn collet_display(&self, id: &str) -> Option<ColletDisplay> {
        let shown = collet_display(self.bit_by_id(id)?);
        if shown.disagrees() {
            tracing::debug!(
                "Bit {} stored collet '{}' differs from computed '{}'",
                id,
                shown.label,
                shown.computed.label
            );
        }
        Some(shown)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn admin(&self) -> &AdminGate {
        &self.admin
    }

    pub fn admin_mut(&mut self) -> &mut AdminGate {
        &mut self.admin
    }

    /// Look up the signed-in user and cache their privilege
    pub async fn resolve_admin(&mut self, identity: &dyn IdentityProvider) -> bool {
        self.admin.resolve_current(identity).await
    }

    pub fn is_admin(&self) -> bool {
        self.admin.is_current_admin()
    }

    async fn after_write(&mut self, action: &str, written: std::result::Result<(), StoreError>) -> Result<()> {
        if let Err(e) = written {
            tracing::error!("{} failed: {}", action, e);
            return Err(Error::Store(e));
        }
        if let Err(e) = self.refresh().await {
            tracing::warn!("{} saved but the inventory could not be reloaded: {}", action, e);
        }
        Ok(())
    }

    /// Change a bit's stock by `delta`, never below zero
    pub async fn adjust_bit_stock(&mut self, id: &str, delta: i64) -> Result<u32> {
        self.admin.require_admin("adjust bit stock")?;
        let current = self
            .bit_by_id(id)
            .map(|b| b.stock)
            .ok_or_else(|| StoreError::NotFound(format!("bit {}", id)))?;
        let stock = apply_delta(current, delta);
        let written = self.store.update_bit_stock(id, stock).await;
        self.after_write("Stock update", written).await?;
        Ok(stock)
    }

    /// Change a collet's stock by `delta`, never below zero
    pub async fn adjust_collet_stock(&mut self, id: &str, delta: i64) -> Result<u32> {
        self.admin.require_admin("adjust collet stock")?;
        let current = self
            .collets
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.stock)
            .ok_or_else(|| StoreError::NotFound(format!("collet {}", id)))?;
        let stock = apply_delta(current, delta);
        let written = self.store.update_collet_stock(id, stock).await;
        self.after_write("Collet stock update", written).await?;
        Ok(stock)
    }

    pub async fn update_bit(&mut self, id: &str, patch: &BitPatch) -> Result<()> {
        self.admin.require_admin("edit bit")?;
        if patch.is_empty() {
            return Ok(());
        }
        let written = self.store.update_bit(id, patch).await;
        self.after_write("Bit update", written).await
    }

    pub async fn create_bit(&mut self, bit: &NewBit) -> Result<()> {
        self.admin.require_admin("create bit")?;
        let written = self.store.create_bit(bit).await;
        self.after_write("Bit creation", written).await
    }

    pub async fn create_collet(&mut self, collet: &NewCollet) -> Result<()> {
        self.admin.require_admin("create collet")?;
        let written = self.store.create_collet(collet).await;
        self.after_write("Collet creation", written).await
    }

    /// Populate the store with starter data and reload
    pub async fn seed(&mut self) -> Result<()> {
        self.admin.require_admin("seed database")?;
        let written = self.store.seed().await;
        self.after_write("Seeding", written).await
    }
}

fn apply_delta(stock: u32, delta: i64) -> u32 {
    i64::from(stock)
        .saturating_add(delta)
        .clamp(0, i64::from(u32::MAX)) as u32
}
