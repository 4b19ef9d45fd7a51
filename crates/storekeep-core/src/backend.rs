//! Backend facade — the one place that talks to the network.
//!
//! Cheap to clone (`Arc` inner), so UI code can hand a copy to every
//! spawned task. Every mutation follows the same shape: perform the API
//! call, then refetch the affected snapshot(s). The client never patches
//! a snapshot locally, so it can never drift from the server.

use std::sync::Arc;

use tracing::{debug, info};

use storekeep_api::ApiClient;
use storekeep_api::types::{AppInfo, HealthStatus, Product, ProductDraft, User, UserDraft};

use crate::error::CoreError;
use crate::store::Store;

struct Inner {
    api: ApiClient,
    store: Store,
}

/// Clone-able handle over the API client and snapshot store.
#[derive(Clone)]
pub struct Backend {
    inner: Arc<Inner>,
}

impl Backend {
    /// Build a backend against the given base URL.
    pub fn new(base_url: &str) -> Result<Self, CoreError> {
        let api = ApiClient::new(base_url)?;
        Ok(Self {
            inner: Arc::new(Inner {
                api,
                store: Store::new(),
            }),
        })
    }

    /// The snapshot store. Read-only from the caller's perspective.
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    // ── Loads ────────────────────────────────────────────────────────
    //
    // On failure the `?` returns before `replace`, leaving the previous
    // snapshot untouched.

    pub async fn refresh_products(&self) -> Result<(), CoreError> {
        let products = self.inner.api.list_products().await?;
        info!(count = products.len(), "loaded products");
        self.inner.store.replace_products(products);
        Ok(())
    }

    pub async fn refresh_categories(&self) -> Result<(), CoreError> {
        let categories = self.inner.api.list_categories().await?;
        debug!(count = categories.len(), "loaded categories");
        self.inner.store.replace_categories(categories);
        Ok(())
    }

    pub async fn refresh_users(&self) -> Result<(), CoreError> {
        let users = self.inner.api.list_users().await?;
        info!(count = users.len(), "loaded users");
        self.inner.store.replace_users(users);
        Ok(())
    }

    // ── Product mutations ────────────────────────────────────────────

    /// Create (no id) or update (id present) a product, then reload both
    /// products and categories — category membership may have changed.
    pub async fn save_product(
        &self,
        draft: &ProductDraft,
        id: Option<i64>,
    ) -> Result<(), CoreError> {
        match id {
            Some(id) => {
                self.inner.api.update_product(id, draft).await?;
                info!(id, name = %draft.name, "updated product");
            }
            None => {
                let created = self.inner.api.create_product(draft).await?;
                info!(id = created.id, name = %created.name, "created product");
            }
        }
        self.refresh_products().await?;
        self.refresh_categories().await
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), CoreError> {
        self.inner.api.delete_product(id).await?;
        info!(id, "deleted product");
        self.refresh_products().await?;
        self.refresh_categories().await
    }

    /// Resolve a product id against the current snapshot for editing.
    pub fn product(&self, id: i64) -> Result<Product, CoreError> {
        self.inner
            .store
            .find_product(id)
            .ok_or(CoreError::NotFound {
                entity: "product",
                id,
            })
    }

    // ── User mutations ───────────────────────────────────────────────

    pub async fn save_user(&self, draft: &UserDraft, id: Option<i64>) -> Result<(), CoreError> {
        match id {
            Some(id) => {
                self.inner.api.update_user(id, draft).await?;
                info!(id, name = %draft.name, "updated user");
            }
            None => {
                let created = self.inner.api.create_user(draft).await?;
                info!(id = created.id, name = %created.name, "created user");
            }
        }
        self.refresh_users().await
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), CoreError> {
        self.inner.api.delete_user(id).await?;
        info!(id, "deleted user");
        self.refresh_users().await
    }

    pub async fn set_user_active(&self, id: i64, active: bool) -> Result<(), CoreError> {
        self.inner.api.set_user_active(id, active).await?;
        info!(id, active, "toggled user");
        self.refresh_users().await
    }

    /// Resolve a user id against the current snapshot for editing.
    pub fn user(&self, id: i64) -> Result<User, CoreError> {
        self.inner.store.find_user(id).ok_or(CoreError::NotFound {
            entity: "user",
            id,
        })
    }

    // ── Service probes (never cached) ────────────────────────────────

    pub async fn info(&self) -> Result<AppInfo, CoreError> {
        Ok(self.inner.api.get_info().await?)
    }

    pub async fn health(&self) -> Result<HealthStatus, CoreError> {
        Ok(self.inner.api.get_health().await?)
    }
}
