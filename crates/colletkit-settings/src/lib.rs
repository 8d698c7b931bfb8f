//! # ColletKit Settings
//!
//! Configuration files and the administrator gate.

pub mod admin;
pub mod config;
pub mod error;

pub use admin::{is_admin, normalize_email, AdminGate, ADMINS_KEY};
pub use config::{
    AdminSettings, AdvisorSettings, CacheSettings, Config, StoreSettings, INITIAL_ADMINS,
};
pub use error::{SettingsError, SettingsResult};
