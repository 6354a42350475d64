//! SettingsPresenter: the named operations every front end drives.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::Mutex;
use tracing::debug;

use super::status::ProbeStatusBoard;
use super::view::ProfileView;
use crate::connections::{ConnectionStore, ConnectivityChecker, ProbeReport, ProfileId};
use crate::error::StoreError;

/// Owns the store and the checker on behalf of the front ends.
///
/// Mutations are serialized through the store lock. Probes clone the
/// profile out and run without holding it.
pub struct SettingsPresenter {
    store: Mutex<ConnectionStore>,
    checker: ConnectivityChecker,
    status: ProbeStatusBoard,
}

impl SettingsPresenter {
    pub fn new(store: ConnectionStore, checker: ConnectivityChecker) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(store),
            checker,
            status: ProbeStatusBoard::new(),
        })
    }

    /// One row per profile, in display order.
    pub async fn rows(&self) -> Vec<ProfileView> {
        let reports = self.status.snapshot().await;
        let store = self.store.lock().await;
        store
            .profiles()
            .iter()
            .map(|p| ProfileView::new(p, reports.get(&p.id).cloned()))
            .collect()
    }

    pub async fn row(&self, id: ProfileId) -> Option<ProfileView> {
        let report = self.status.get(id).await;
        let store = self.store.lock().await;
        store.get(id).map(|p| ProfileView::new(p, report))
    }

    pub async fn add_profile(&self) -> Result<ProfileId, StoreError> {
        self.store.lock().await.add_profile().await
    }

    pub async fn set_endpoint(&self, id: ProfileId, value: String) -> Result<(), StoreError> {
        self.store.lock().await.update_endpoint(id, value).await
    }

    pub async fn set_credential(
        &self,
        id: ProfileId,
        value: SecretString,
    ) -> Result<(), StoreError> {
        self.store.lock().await.update_credential(id, value).await
    }

    /// Run a connectivity probe for `id` and record the result on the
    /// status board. Only an unknown id is an error.
    pub async fn test_connection(&self, id: ProfileId) -> Result<ProbeReport, StoreError> {
        let profile = {
            let store = self.store.lock().await;
            store
                .get(id)
                .cloned()
                .ok_or(StoreError::ProfileNotFound { id: id.as_uuid() })?
        };

        let report = self.checker.report(&profile).await;
        self.status.record(report.clone()).await;
        Ok(report)
    }

    /// Resolve a full id or a unique id prefix typed by the user.
    pub async fn resolve(&self, reference: &str) -> Result<ProfileId, StoreError> {
        let reference = reference.trim().to_ascii_lowercase();
        if reference.is_empty() {
            return Err(StoreError::UnknownProfile { reference });
        }

        let store = self.store.lock().await;
        let matches: Vec<ProfileId> = store
            .profiles()
            .iter()
            .map(|p| p.id)
            .filter(|id| id.to_string().starts_with(&reference))
            .collect();
        debug!(reference = %reference, matches = matches.len(), "Resolved profile reference");

        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(StoreError::UnknownProfile { reference }),
            many => Err(StoreError::AmbiguousProfile {
                prefix: reference,
                matches: many.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::connections::MemoryBackend;
    use crate::connections::model::DEFAULT_ENDPOINT;

    fn presenter(raw: Option<serde_json::Value>) -> Arc<SettingsPresenter> {
        let store = ConnectionStore::from_raw(raw, Arc::new(MemoryBackend::new()), DEFAULT_ENDPOINT);
        SettingsPresenter::new(store, ConnectivityChecker::default())
    }

    #[tokio::test]
    async fn rows_follow_store_order() {
        let p = presenter(Some(json!({"gitHubConnections": [
            {"server": "https://a", "pat": ""},
            {"server": "https://b", "pat": "tok"},
        ]})));
        let rows = p.rows().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].endpoint, "https://a");
        assert!(!rows[0].credential_set);
        assert!(rows[1].credential_set);
    }

    #[tokio::test]
    async fn add_then_edit_through_presenter() {
        let p = presenter(None);
        let id = p.add_profile().await.unwrap();
        p.set_endpoint(id, "https://ghe.local".into()).await.unwrap();
        p.set_credential(id, SecretString::from("abc".to_string()))
            .await
            .unwrap();

        let row = p.row(id).await.unwrap();
        assert_eq!(row.endpoint, "https://ghe.local");
        assert!(row.credential_set);
    }

    #[tokio::test]
    async fn probe_error_is_recorded_not_raised() {
        let p = presenter(None);
        let id = p.add_profile().await.unwrap();
        p.set_endpoint(id, String::new()).await.unwrap();

        let report = p.test_connection(id).await.unwrap();
        assert!(!report.outcome.is_reachable());
        assert!(p.row(id).await.unwrap().last_probe.is_some());
    }

    #[tokio::test]
    async fn test_unknown_profile_is_not_found() {
        let p = presenter(None);
        let err = p.test_connection(ProfileId::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::ProfileNotFound { .. }));
    }

    #[tokio::test]
    async fn resolve_by_prefix() {
        let p = presenter(None);
        let id = p.add_profile().await.unwrap();
        let full = id.to_string();

        assert_eq!(p.resolve(&full).await.unwrap(), id);
        assert_eq!(p.resolve(&full[..8]).await.unwrap(), id);
        assert_eq!(p.resolve(&full[..8].to_uppercase()).await.unwrap(), id);
        assert!(matches!(
            p.resolve("zzzz").await,
            Err(StoreError::UnknownProfile { .. })
        ));
        assert!(p.resolve("").await.is_err());
    }

    #[tokio::test]
    async fn resolve_reports_ambiguity() {
        let p = presenter(None);
        for _ in 0..40 {
            p.add_profile().await.unwrap();
        }
        // With 40 random ids at least two share a first hex digit.
        let rows = p.rows().await;
        let first_chars: Vec<char> = rows
            .iter()
            .filter_map(|r| r.id.to_string().chars().next())
            .collect();
        let shared = first_chars
            .iter()
            .find(|c| first_chars.iter().filter(|d| d == c).count() > 1)
            .unwrap();
        assert!(matches!(
            p.resolve(&shared.to_string()).await,
            Err(StoreError::AmbiguousProfile { .. })
        ));
    }
}
