//! Primary store with in-memory fallback
//!
//! Reads go to the primary and degrade to the fallback data when it fails.
//! Records whose id is not a hosted UUID live only in the fallback, so
//! writes to them never reach the primary.

use async_trait::async_trait;
use colletkit_core::{Bit, BitPatch, Collet, NewBit, NewCollet, StoreError};

use crate::fallback::FallbackStore;
use crate::mapping::is_valid_uuid;
use crate::traits::InventoryStore;

pub struct TieredStore<P> {
    primary: P,
    fallback: FallbackStore,
}

impl<P: InventoryStore> TieredStore<P> {
    pub fn new(primary: P, fallback: FallbackStore) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn fallback(&self) -> &FallbackStore {
        &self.fallback
    }
}

#[async_trait]
impl<P: InventoryStore> InventoryStore for TieredStore<P> {
    async fn list_bits(&self) -> Result<Vec<Bit>, StoreError> {
        match self.primary.list_bits().await {
            Ok(bits) => Ok(bits),
            Err(e) => {
                tracing::warn!("Bit list unavailable, using fallback data: {}", e);
                self.fallback.list_bits().await
            }
        }
    }

    async fn list_collets(&self) -> Result<Vec<Collet>, StoreError> {
        match self.primary.list_collets().await {
            Ok(collets) => Ok(collets),
            Err(e) => {
                tracing::warn!("Collet list unavailable, using fallback data: {}", e);
                self.fallback.list_collets().await
            }
        }
    }

    async fn fetch_bit(&self, id: &str) -> Result<Option<Bit>, StoreError> {
        if is_valid_uuid(id) {
            match self.primary.fetch_bit(id).await {
                Ok(Some(bit)) => return Ok(Some(bit)),
                Ok(None) => {}
                Err(e) => tracing::warn!("Bit {} unavailable remotely: {}", id, e),
            }
        }
        self.fallback.fetch_bit(id).await
    }

    async fn update_bit(&self, id: &str, patch: &BitPatch) -> Result<(), StoreError> {
        if is_valid_uuid(id) {
            self.primary.update_bit(id, patch).await
        } else {
            self.fallback.update_bit(id, patch).await
        }
    }

    async fn create_bit(&self, bit: &NewBit) -> Result<(), StoreError> {
        self.primary.create_bit(bit).await
    }

    async fn update_bit_stock(&self, id: &str, stock: u32) -> Result<(), StoreError> {
        if is_valid_uuid(id) {
            self.primary.update_bit_stock(id, stock).await
        } else {
            self.fallback.update_bit_stock(id, stock).await
        }
    }

    async fn update_collet_stock(&self, id: &str, stock: u32) -> Result<(), StoreError> {
        if is_valid_uuid(id) {
            self.primary.update_collet_stock(id, stock).await
        } else {
            self.fallback.update_collet_stock(id, stock).await
        }
    }

    async fn create_collet(&self, collet: &NewCollet) -> Result<(), StoreError> {
        self.primary.create_collet(collet).await
    }

    async fn seed(&self) -> Result<(), StoreError> {
        self.primary.seed().await
    }
}
