//! Administrator access
//!
//! The administrator set is a list of normalized emails kept in local
//! storage. It is seeded from a bootstrap list the first time it is read
//! and written back after every change. It is never synced remotely.

use colletkit_core::{Error, LocalStorage, Result, StorageError};
use colletkit_store::IdentityProvider;
use std::sync::Arc;

/// Local storage key of the administrator set
pub const ADMINS_KEY: &str = "cnc_manager_admins_v2";

/// Trimmed, lower-cased email
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Membership test on normalized emails
pub fn is_admin(email: &str, admins: &[String]) -> bool {
    let email = normalize_email(email);
    !email.is_empty() && admins.iter().any(|a| normalize_email(a) == email)
}

/// Administrator set plus the privilege of the current session
pub struct AdminGate {
    storage: Arc<dyn LocalStorage>,
    admins: Vec<String>,
    current_email: Option<String>,
    current_is_admin: bool,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("admins", &self.admins)
            .field("current_email", &self.current_email)
            .field("current_is_admin", &self.current_is_admin)
            .finish()
    }
}

impl AdminGate {
    /// Read the stored set, seeding it from `bootstrap` when missing or unreadable
    pub fn load<S: AsRef<str>>(storage: Arc<dyn LocalStorage>, bootstrap: &[S]) -> Self {
        let stored = storage
            .get(ADMINS_KEY)
            .and_then(|raw| match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(list) => Some(list),
                Err(e) => {
                    tracing::warn!("Discarding unreadable administrator list: {}", e);
                    None
                }
            });

        let seeded = stored.is_none();
        let mut gate = Self {
            storage,
            admins: Vec::new(),
            current_email: None,
            current_is_admin: false,
        };

        let source: Vec<String> = match stored {
            Some(list) => list,
            None => bootstrap.iter().map(|s| s.as_ref().to_string()).collect(),
        };
        for email in source {
            gate.insert(&email);
        }

        if seeded {
            gate.persist();
        }
        gate
    }

    /// Write the set to local storage
    pub fn save(&self) -> std::result::Result<(), StorageError> {
        let json = serde_json::to_string(&self.admins).map_err(|e| {
            StorageError::Unavailable(format!("Failed to serialize administrators: {}", e))
        })?;
        self.storage.set(ADMINS_KEY, &json)
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::warn!("Failed to save administrators: {}", e);
        }
    }

    fn insert(&mut self, email: &str) -> bool {
        let email = normalize_email(email);
        if email.is_empty() || self.admins.contains(&email) {
            return false;
        }
        self.admins.push(email);
        true
    }

    pub fn admins(&self) -> &[String] {
        &self.admins
    }

    pub fn is_admin(&self, email: &str) -> bool {
        is_admin(email, &self.admins)
    }

    /// Add an administrator; returns whether the set changed
    pub fn add_admin(&mut self, email: &str) -> bool {
        let changed = self.insert(email);
        if changed {
            self.persist();
            self.refresh_current();
        }
        changed
    }

    /// Remove an administrator; returns whether the set changed
    pub fn remove_admin(&mut self, email: &str) -> bool {
        let email = normalize_email(email);
        let before = self.admins.len();
        self.admins.retain(|a| *a != email);
        let changed = self.admins.len() != before;
        if changed {
            self.persist();
            self.refresh_current();
        }
        changed
    }

    fn refresh_current(&mut self) {
        self.current_is_admin = self
            .current_email
            .as_deref()
            .is_some_and(|email| self.is_admin(email));
    }

    /// Ask the identity service who is signed in and cache the privilege
    pub async fn resolve_current(&mut self, identity: &dyn IdentityProvider) -> bool {
        self.current_email = identity.current_user_email().await;
        self.refresh_current();
        tracing::debug!(
            "Current user {:?} admin={}",
            self.current_email,
            self.current_is_admin
        );
        self.current_is_admin
    }

    pub fn current_email(&self) -> Option<&str> {
        self.current_email.as_deref()
    }

    pub fn is_current_admin(&self) -> bool {
        self.current_is_admin
    }

    /// Fail with [`Error::Unauthorized`] unless the current user is an administrator
    pub fn require_admin(&self, action: &str) -> Result<()> {
        if self.current_is_admin {
            Ok(())
        } else {
            tracing::warn!("Rejected '{}' for non-administrator", action);
            Err(Error::unauthorized(action))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colletkit_core::MemoryStorage;
    use colletkit_store::StaticIdentity;

    fn gate(storage: &Arc<MemoryStorage>) -> AdminGate {
        AdminGate::load(storage.clone(), &["Boss@Shop.io", "ops@shop.io"])
    }

    #[test]
    fn test_membership_is_case_and_space_insensitive() {
        let admins = vec!["a@b.com".to_string()];
        assert!(is_admin("A@B.COM ", &admins));
        assert!(is_admin("  a@b.com", &admins));
        assert!(!is_admin("c@b.com", &admins));
        assert!(!is_admin("", &admins));
    }

    #[test]
    fn test_seeds_and_persists_on_first_load() {
        let storage = Arc::new(MemoryStorage::new());
        let gate = gate(&storage);
        assert_eq!(gate.admins(), ["boss@shop.io", "ops@shop.io"]);
        assert_eq!(
            storage.get(ADMINS_KEY).as_deref(),
            Some(r#"["boss@shop.io","ops@shop.io"]"#)
        );
    }

    #[test]
    fn test_stored_set_wins_over_bootstrap() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(ADMINS_KEY, r#"["only@shop.io"]"#).unwrap();
        let gate = gate(&storage);
        assert_eq!(gate.admins(), ["only@shop.io"]);
    }

    #[test]
    fn test_unreadable_set_is_reseeded() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(ADMINS_KEY, "{oops").unwrap();
        let gate = gate(&storage);
        assert_eq!(gate.admins().len(), 2);
    }

    #[test]
    fn test_add_is_idempotent_and_remove_tolerates_absent() {
        let storage = Arc::new(MemoryStorage::new());
        let mut gate = gate(&storage);

        assert!(gate.add_admin(" New@Shop.io "));
        assert!(!gate.add_admin("new@shop.io"));
        assert_eq!(gate.admins().len(), 3);

        assert!(!gate.remove_admin("ghost@shop.io"));
        assert!(gate.remove_admin("NEW@shop.io"));
        assert_eq!(gate.admins().len(), 2);

        let reloaded = AdminGate::load(storage.clone(), &[] as &[&str]);
        assert_eq!(reloaded.admins(), gate.admins());
    }

    #[tokio::test]
    async fn test_current_user_resolution() {
        let storage = Arc::new(MemoryStorage::new());
        let mut gate = AdminGate::load(storage, &["A@B.com"]);

        assert!(gate.resolve_current(&StaticIdentity::new("a@b.COM")).await);
        assert!(gate.is_current_admin());
        assert!(gate.require_admin("seed").is_ok());

        gate.remove_admin("a@b.com");
        assert!(!gate.is_current_admin());
        let err = gate.require_admin("seed").unwrap_err();
        assert!(err.is_unauthorized());

        assert!(!gate.resolve_current(&StaticIdentity::anonymous()).await);
    }
}
