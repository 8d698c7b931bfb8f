//! In-memory fallback inventory
//!
//! Shown when the hosted store is unreachable, and the owner of every
//! record whose id is not a hosted UUID.

use async_trait::async_trait;
use colletkit_core::{
    Application, Bit, BitPatch, Collet, CuttingSpecs, NewBit, NewCollet, ShankDiameter,
    StoreError,
};
use parking_lot::RwLock;

use crate::traits::InventoryStore;

const SAMPLE_IMAGE_URL: &str =
    "https://ui-avatars.com/api/?name=TR&background=0D8ABC&color=fff&size=256";

/// Sample data held in memory
#[derive(Debug, Default)]
pub struct FallbackStore {
    bits: RwLock<Vec<Bit>>,
    collets: RwLock<Vec<Collet>>,
}

impl FallbackStore {
    /// Empty fallback
    pub fn new() -> Self {
        Self::default()
    }

    /// Fallback seeded with the demo bit and no collets
    pub fn sample() -> Self {
        Self::with_data(vec![sample_bit()], Vec::new())
    }

    pub fn with_data(bits: Vec<Bit>, collets: Vec<Collet>) -> Self {
        Self {
            bits: RwLock::new(bits),
            collets: RwLock::new(collets),
        }
    }

    pub fn bits(&self) -> Vec<Bit> {
        self.bits.read().clone()
    }

    pub fn collets(&self) -> Vec<Collet> {
        self.collets.read().clone()
    }

    fn local_id() -> String {
        format!("local-{}", uuid::Uuid::new_v4().simple())
    }
}

/// The demo bit: a 3mm flat end mill with a 3mm shank
pub fn sample_bit() -> Bit {
    Bit {
        id: "1".to_string(),
        name: "Topo reto 3mm".to_string(),
        tool_type: "Topo reto".to_string(),
        diameter: "3mm".to_string(),
        image_url: Some(SAMPLE_IMAGE_URL.to_string()),
        stock: 1,
        min_stock: 2,
        material: "Metal Duro (Tungstênio)".to_string(),
        shank_diameter: ShankDiameter::from("3"),
        recommended_collet: Some("Usar Pinça 3.175mm".to_string()),
        has_collet: true,
        specs: CuttingSpecs {
            rpm: 18000,
            feed_rate: 1500.0,
            plunge_rate: 500.0,
            step_down: 1.0,
            total_length: None,
            hardness: None,
            geometry: Some("2F".to_string()),
        },
        application: Application {
            materials: vec!["MDF".to_string()],
            cut_type: Some("Up-cut".to_string()),
            advantage: None,
        },
    }
}

#[async_trait]
impl InventoryStore for FallbackStore {
    async fn list_bits(&self) -> Result<Vec<Bit>, StoreError> {
        Ok(self.bits())
    }

    async fn list_collets(&self) -> Result<Vec<Collet>, StoreError> {
        Ok(self.collets())
    }

    async fn fetch_bit(&self, id: &str) -> Result<Option<Bit>, StoreError> {
        Ok(self.bits.read().iter().find(|b| b.id == id).cloned())
    }

    async fn update_bit(&self, id: &str, patch: &BitPatch) -> Result<(), StoreError> {
        let mut bits = self.bits.write();
        match bits.iter_mut().find(|b| b.id == id) {
            Some(bit) => patch.apply(bit),
            None => tracing::debug!("Fallback update ignored, no bit with id {}", id),
        }
        Ok(())
    }

    async fn create_bit(&self, bit: &NewBit) -> Result<(), StoreError> {
        self.bits.write().insert(0, bit.clone().into_bit(Self::local_id()));
        Ok(())
    }

    async fn update_bit_stock(&self, id: &str, stock: u32) -> Result<(), StoreError> {
        self.update_bit(id, &BitPatch::stock(stock)).await
    }

    async fn update_collet_stock(&self, id: &str, stock: u32) -> Result<(), StoreError> {
        let mut collets = self.collets.write();
        match collets.iter_mut().find(|c| c.id == id) {
            Some(collet) => collet.stock = stock,
            None => tracing::debug!("Fallback update ignored, no collet with id {}", id),
        }
        Ok(())
    }

    async fn create_collet(&self, collet: &NewCollet) -> Result<(), StoreError> {
        self.collets
            .write()
            .insert(0, collet.clone().into_collet(Self::local_id()));
        Ok(())
    }
}
