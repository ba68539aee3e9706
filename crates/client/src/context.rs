//! Shared handles for every service.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::auth::AuthService;
use crate::cart::{CartError, CartManager};
use crate::catalog::CatalogService;
use crate::checkout::CheckoutSession;
use crate::config::ClientConfig;
use crate::profile::ProfileService;
use crate::referrals::ReferralService;
use crate::store::{CartRepository, FileStore, KeyValueStore, SessionRepository};

/// Client context shared by every screen.
///
/// Cheaply cloneable via `Arc`; owns the API client, the store, and the
/// configuration, and hands out the services built on them.
#[derive(Clone)]
pub struct ClientContext {
    inner: Arc<ClientContextInner>,
}

struct ClientContextInner {
    config: ClientConfig,
    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
    catalog: CatalogService,
}

impl ClientContext {
    /// Create a context backed by the on-disk store named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.store_path.clone()));
        Self::with_store(config, store)
    }

    /// Create a context over an explicit store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_store(
        config: ClientConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config)?;
        let catalog = CatalogService::new(api.clone());

        Ok(Self {
            inner: Arc::new(ClientContextInner {
                config,
                api,
                store,
                catalog,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    #[must_use]
    pub fn sessions(&self) -> SessionRepository {
        SessionRepository::new(Arc::clone(&self.inner.store))
    }

    #[must_use]
    pub fn carts(&self) -> CartRepository {
        CartRepository::new(Arc::clone(&self.inner.store))
    }

    #[must_use]
    pub fn auth(&self) -> AuthService {
        AuthService::new(self.inner.api.clone(), self.sessions())
    }

    #[must_use]
    pub fn profile(&self) -> ProfileService {
        ProfileService::new(self.inner.api.clone(), self.sessions())
    }

    #[must_use]
    pub fn referrals(&self) -> ReferralService {
        ReferralService::new(self.inner.api.clone(), self.sessions())
    }

    /// Load the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the stored cart cannot be read.
    pub async fn cart(&self) -> Result<CartManager, CartError> {
        CartManager::load(self.carts()).await
    }

    /// Start a checkout session. Call [`CheckoutSession::load`] next.
    #[must_use]
    pub fn checkout(&self) -> CheckoutSession {
        CheckoutSession::new(
            self.inner.api.clone(),
            self.sessions(),
            self.carts(),
            self.inner.config.retry,
        )
    }
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("config", &self.inner.config)
            .field("api", &self.inner.api)
            .finish_non_exhaustive()
    }
}
