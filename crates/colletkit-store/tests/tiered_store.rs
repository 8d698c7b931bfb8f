use async_trait::async_trait;
use colletkit_core::{Bit, BitPatch, Collet, NewBit, NewCollet, StoreError};
use colletkit_store::{sample_bit, FallbackStore, InventoryStore, TieredStore};
use parking_lot::Mutex;

const HOSTED_ID: &str = "3f2504e0-4f89-11d3-9a0c-0305e82c3301";

/// Primary that records writes and can be switched off
#[derive(Default)]
struct RecordingStore {
    offline: bool,
    bits: Vec<Bit>,
    writes: Mutex<Vec<String>>,
}

impl RecordingStore {
    fn offline() -> Self {
        Self {
            offline: true,
            ..Default::default()
        }
    }

    fn with_bits(bits: Vec<Bit>) -> Self {
        Self {
            bits,
            ..Default::default()
        }
    }

    fn check(&self, context: &str) -> Result<(), StoreError> {
        if self.offline {
            Err(StoreError::remote(context, "connection refused"))
        } else {
            Ok(())
        }
    }

    fn record(&self, op: String) -> Result<(), StoreError> {
        self.check("Write")?;
        self.writes.lock().push(op);
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for RecordingStore {
    async fn list_bits(&self) -> Result<Vec<Bit>, StoreError> {
        self.check("FetchBits")?;
        Ok(self.bits.clone())
    }

    async fn list_collets(&self) -> Result<Vec<Collet>, StoreError> {
        self.check("FetchCollets")?;
        Ok(Vec::new())
    }

    async fn fetch_bit(&self, id: &str) -> Result<Option<Bit>, StoreError> {
        self.check("FetchBit")?;
        Ok(self.bits.iter().find(|b| b.id == id).cloned())
    }

    async fn update_bit(&self, id: &str, _patch: &BitPatch) -> Result<(), StoreError> {
        self.record(format!("update_bit {}", id))
    }

    async fn create_bit(&self, bit: &NewBit) -> Result<(), StoreError> {
        self.record(format!("create_bit {}", bit.name))
    }

    async fn update_bit_stock(&self, id: &str, stock: u32) -> Result<(), StoreError> {
        self.record(format!("update_bit_stock {} {}", id, stock))
    }

    async fn update_collet_stock(&self, id: &str, stock: u32) -> Result<(), StoreError> {
        self.record(format!("update_collet_stock {} {}", id, stock))
    }

    async fn create_collet(&self, collet: &NewCollet) -> Result<(), StoreError> {
        self.record(format!("create_collet {}", collet.name))
    }
}

#[tokio::test]
async fn test_reads_degrade_to_fallback() {
    let store = TieredStore::new(RecordingStore::offline(), FallbackStore::sample());
    let bits = store.list_bits().await.unwrap();
    assert_eq!(bits, vec![sample_bit()]);
    assert!(store.list_collets().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reads_prefer_primary() {
    let hosted = Bit {
        id: HOSTED_ID.to_string(),
        name: "V 90".to_string(),
        ..Default::default()
    };
    let store = TieredStore::new(
        RecordingStore::with_bits(vec![hosted.clone()]),
        FallbackStore::sample(),
    );
    assert_eq!(store.list_bits().await.unwrap(), vec![hosted.clone()]);
    assert_eq!(store.fetch_bit(HOSTED_ID).await.unwrap(), Some(hosted));
}

#[tokio::test]
async fn test_fetch_falls_back_for_local_ids() {
    let store = TieredStore::new(RecordingStore::default(), FallbackStore::sample());
    let bit = store.fetch_bit("1").await.unwrap();
    assert_eq!(bit.map(|b| b.name), Some("Topo reto 3mm".to_string()));
    assert_eq!(store.fetch_bit("nope").await.unwrap(), None);
}

#[tokio::test]
async fn test_local_ids_never_reach_primary() {
    let store = TieredStore::new(RecordingStore::default(), FallbackStore::sample());
    store.update_bit_stock("1", 7).await.unwrap();
    store
        .update_bit("1", &BitPatch {
            name: Some("Renamed".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(store.primary().writes.lock().is_empty());
    let bit = store.fallback().bits().remove(0);
    assert_eq!(bit.stock, 7);
    assert_eq!(bit.name, "Renamed");
}

#[tokio::test]
async fn test_hosted_ids_and_creates_go_to_primary() {
    let store = TieredStore::new(RecordingStore::default(), FallbackStore::sample());
    store.update_bit_stock(HOSTED_ID, 3).await.unwrap();
    store.update_collet_stock(HOSTED_ID, 2).await.unwrap();
    store
        .create_bit(&NewBit {
            name: "Ball nose".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let writes = store.primary().writes.lock().clone();
    assert_eq!(
        writes,
        vec![
            format!("update_bit_stock {} 3", HOSTED_ID),
            format!("update_collet_stock {} 2", HOSTED_ID),
            "create_bit Ball nose".to_string(),
        ]
    );
    assert_eq!(store.fallback().bits(), vec![sample_bit()]);
}

#[tokio::test]
async fn test_primary_write_errors_propagate() {
    let store = TieredStore::new(RecordingStore::offline(), FallbackStore::sample());
    let err = store.update_bit_stock(HOSTED_ID, 1).await.unwrap_err();
    assert_eq!(err.to_string(), "Write: connection refused");
}
