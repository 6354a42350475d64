//! ConnectionStore: the ordered profile list and its persistence.

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::backend::SettingsBackend;
use super::model::{ConnectionProfile, ConnectionSettings, ProfileId, log_safe_endpoint};
use crate::error::{PersistenceError, StoreError};

/// Owns the profile list. Every mutation is applied in memory first and then
/// saved through the backend; a failed save is reported but never undone.
pub struct ConnectionStore {
    settings: ConnectionSettings,
    default_endpoint: String,
    backend: Arc<dyn SettingsBackend>,
}

impl ConnectionStore {
    /// Materialize a store from an already-loaded document. Never fails.
    pub fn from_raw(
        raw: Option<Value>,
        backend: Arc<dyn SettingsBackend>,
        default_endpoint: impl Into<String>,
    ) -> Self {
        let default_endpoint = default_endpoint.into();
        let settings = ConnectionSettings::from_raw(raw.as_ref(), &default_endpoint);
        debug!(profiles = settings.profiles.len(), "Connection store loaded");
        Self {
            settings,
            default_endpoint,
            backend,
        }
    }

    /// Load the store through `backend`. Only a failed read propagates;
    /// unusable content yields an empty store.
    pub async fn open(
        backend: Arc<dyn SettingsBackend>,
        default_endpoint: impl Into<String>,
    ) -> Result<Self, PersistenceError> {
        let raw = backend.load_data().await?;
        Ok(Self::from_raw(raw, backend, default_endpoint))
    }

    /// Profiles in display order.
    pub fn profiles(&self) -> &[ConnectionProfile] {
        &self.settings.profiles
    }

    pub fn get(&self, id: ProfileId) -> Option<&ConnectionProfile> {
        self.settings.profiles.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.settings.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.profiles.is_empty()
    }

    /// The persisted document for the current state.
    pub fn serialize(&self) -> Value {
        self.settings.to_raw()
    }

    /// Append a profile with the default endpoint and no credential.
    ///
    /// If the save fails the profile is still in the store (last in
    /// [`profiles`](Self::profiles)).
    pub async fn add_profile(&mut self) -> Result<ProfileId, StoreError> {
        let profile = ConnectionProfile::with_defaults(&self.default_endpoint);
        let id = profile.id;
        self.settings.profiles.push(profile);
        info!(
            profile_id = %id,
            endpoint = %log_safe_endpoint(&self.default_endpoint),
            "Connection profile added"
        );
        self.persist().await?;
        Ok(id)
    }

    /// Replace a profile's endpoint. The value is not validated.
    pub async fn update_endpoint(
        &mut self,
        id: ProfileId,
        value: impl Into<String>,
    ) -> Result<(), StoreError> {
        let profile = self.get_mut(id)?;
        profile.endpoint = value.into();
        info!(profile_id = %id, endpoint = %profile.log_endpoint(), "Connection endpoint updated");
        self.persist().await?;
        Ok(())
    }

    /// Replace a profile's credential.
    pub async fn update_credential(
        &mut self,
        id: ProfileId,
        value: SecretString,
    ) -> Result<(), StoreError> {
        let profile = self.get_mut(id)?;
        profile.credential = value;
        info!(profile_id = %id, "Connection credential updated");
        self.persist().await?;
        Ok(())
    }

    fn get_mut(&mut self, id: ProfileId) -> Result<&mut ConnectionProfile, StoreError> {
        self.settings
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::ProfileNotFound { id: id.as_uuid() })
    }

    async fn persist(&self) -> Result<(), PersistenceError> {
        let raw = self.serialize();
        self.backend.save_data(&raw).await.inspect_err(|e| {
            warn!(error = %e, "Failed to save connection settings; keeping in-memory change");
        })
    }
}
