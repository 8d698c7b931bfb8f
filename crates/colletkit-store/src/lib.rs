//! # ColletKit Store
//!
//! Collaborators of the inventory core: the remote data store, the
//! in-memory fallback, the tiered store combining them, identity and the
//! cutting-parameter advisor.

pub mod advisor;
pub mod fallback;
pub mod mapping;
pub mod rest;
pub mod tiered;
pub mod traits;

pub use advisor::{AdvisorError, AdvisorSuggestion, GeminiAdvisor, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
pub use fallback::{sample_bit, FallbackStore};
pub use mapping::is_valid_uuid;
pub use rest::RestStore;
pub use tiered::TieredStore;
pub use traits::{IdentityProvider, InventoryStore, ParameterAdvisor, StaticIdentity};
