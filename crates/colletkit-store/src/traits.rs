//! Collaborator interfaces
//!
//! The inventory core talks to the outside world through these traits:
//! the remote data store, the identity service and the cutting-parameter
//! advisor. Each has at least one implementation in this crate.

use async_trait::async_trait;
use colletkit_core::{Bit, BitPatch, Collet, NewBit, NewCollet, StoreError};
use std::sync::Arc;

use crate::advisor::AdvisorSuggestion;

/// Remote data store holding the bit and collet tables
///
/// Every failure is a [`StoreError`]. Readers treat it as "remote
/// unavailable"; writers hand it back to the action that started the write.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// All bits, newest first
    async fn list_bits(&self) -> Result<Vec<Bit>, StoreError>;

    /// All collets, newest first
    async fn list_collets(&self) -> Result<Vec<Collet>, StoreError>;

    /// A single bit, `None` when no such id exists
    async fn fetch_bit(&self, id: &str) -> Result<Option<Bit>, StoreError>;

    /// Write the present fields of a patch
    async fn update_bit(&self, id: &str, patch: &BitPatch) -> Result<(), StoreError>;

    async fn create_bit(&self, bit: &NewBit) -> Result<(), StoreError>;

    async fn update_bit_stock(&self, id: &str, stock: u32) -> Result<(), StoreError>;

    async fn update_collet_stock(&self, id: &str, stock: u32) -> Result<(), StoreError>;

    async fn create_collet(&self, collet: &NewCollet) -> Result<(), StoreError>;

    /// Populate an empty store with starter data
    async fn seed(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl<T: InventoryStore + ?Sized> InventoryStore for Arc<T> {
    async fn list_bits(&self) -> Result<Vec<Bit>, StoreError> {
        (**self).list_bits().await
    }

    async fn list_collets(&self) -> Result<Vec<Collet>, StoreError> {
        (**self).list_collets().await
    }

    async fn fetch_bit(&self, id: &str) -> Result<Option<Bit>, StoreError> {
        (**self).fetch_bit(id).await
    }

    async fn update_bit(&self, id: &str, patch: &BitPatch) -> Result<(), StoreError> {
        (**self).update_bit(id, patch).await
    }

    async fn create_bit(&self, bit: &NewBit) -> Result<(), StoreError> {
        (**self).create_bit(bit).await
    }

    async fn update_bit_stock(&self, id: &str, stock: u32) -> Result<(), StoreError> {
        (**self).update_bit_stock(id, stock).await
    }

    async fn update_collet_stock(&self, id: &str, stock: u32) -> Result<(), StoreError> {
        (**self).update_collet_stock(id, stock).await
    }

    async fn create_collet(&self, collet: &NewCollet) -> Result<(), StoreError> {
        (**self).create_collet(collet).await
    }

    async fn seed(&self) -> Result<(), StoreError> {
        (**self).seed().await
    }
}

/// Identity service of the signed-in user
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Email of the current user, `None` when signed out
    async fn current_user_email(&self) -> Option<String>;
}

/// Identity fixed at construction, e.g. from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    email: Option<String>,
}

impl StaticIdentity {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
        }
    }

    /// Nobody signed in
    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_user_email(&self) -> Option<String> {
        self.email.clone()
    }
}

/// Cutting-parameter advisor
///
/// Never fails: any problem yields a descriptive fallback suggestion.
#[async_trait]
pub trait ParameterAdvisor: Send + Sync {
    async fn suggest(&self, bit: &Bit, material: &str) -> AdvisorSuggestion;
}
