// ============================================================================
// Citizen Infrastructure - Backend Client Factory
// File: crates/citizen-infrastructure/src/backend/factory.rs
// ============================================================================
//! Chooses the hosted backend or the in-memory mock once, at startup, and
//! hands out request-scoped clients of that kind.

use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use citizen_core::ports::{BackendClient, BackendKind};
use citizen_shared::{BackendConfigStatus, BackendSettings};

use super::mock::{MockBackend, MockStore};
use super::remote::RemoteBackend;

pub struct BackendFactory {
    status: BackendConfigStatus,
    remote: Option<RemoteBackend>,
    store: Arc<MockStore>,
}

impl BackendFactory {
    /// Never fails: unusable settings select the mock and log why.
    pub fn new(settings: &BackendSettings, store: Arc<MockStore>) -> Self {
        if settings.in_memory {
            info!("In-memory backend requested, session gate active");
            return Self::in_memory(store);
        }

        let status = settings.status();
        if !status.is_valid() {
            warn!("Backend configuration is {}, using in-memory mock", status);
            return Self {
                status,
                remote: None,
                store,
            };
        }

        match Self::build_remote(settings) {
            Ok(remote) => {
                info!("Using hosted backend at {}", settings.url().unwrap_or_default());
                Self::with_remote(remote, store)
            }
            Err(e) => {
                warn!("Backend client could not be built ({}), using in-memory mock", e);
                Self {
                    status,
                    remote: None,
                    store,
                }
            }
        }
    }

    /// Hosted backend already built by the caller.
    pub fn with_remote(remote: RemoteBackend, store: Arc<MockStore>) -> Self {
        Self {
            status: BackendConfigStatus::Valid,
            remote: Some(remote),
            store,
        }
    }

    /// Treats the in-memory backend as configured, so the session gate is
    /// active. For local demos and end-to-end tests of the session flow.
    pub fn in_memory(store: Arc<MockStore>) -> Self {
        Self {
            status: BackendConfigStatus::Valid,
            remote: None,
            store,
        }
    }

    fn build_remote(settings: &BackendSettings) -> Result<RemoteBackend, String> {
        let url = settings.url().ok_or("missing url")?;
        let key = settings.anon_key().ok_or("missing anon key")?;
        let base = Url::parse(url).map_err(|e| e.to_string())?;
        let http = RemoteBackend::build_http_client(settings.timeout_seconds)
            .map_err(|e| e.to_string())?;
        Ok(RemoteBackend::new(http, base, key.to_string()))
    }

    pub fn status(&self) -> BackendConfigStatus {
        self.status
    }

    pub fn kind(&self) -> BackendKind {
        if self.remote.is_some() {
            BackendKind::Remote
        } else {
            BackendKind::Mock
        }
    }

    pub fn mock_store(&self) -> &Arc<MockStore> {
        &self.store
    }

    /// Client acting with the anon key only.
    pub fn client(&self) -> Arc<dyn BackendClient> {
        self.client_for(None)
    }

    /// Client acting on behalf of the holder of `access_token`.
    pub fn client_for(&self, access_token: Option<String>) -> Arc<dyn BackendClient> {
        match &self.remote {
            Some(remote) => Arc::new(remote.clone().with_access_token(access_token)),
            None => Arc::new(MockBackend::new(self.store.clone()).with_access_token(access_token)),
        }
    }
}
