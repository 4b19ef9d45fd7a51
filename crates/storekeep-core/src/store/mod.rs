//! In-memory snapshot store — the single source of truth the filter
//! engine and form controllers read from. Nothing here touches the
//! network; loads go through [`crate::Backend`].

mod cell;

use std::sync::Arc;

use tokio::sync::watch;

use storekeep_api::types::{Product, User};

use cell::SnapshotCell;

/// Aggregates the three snapshot cells: products, users, categories.
pub struct Store {
    products: SnapshotCell<Product>,
    users: SnapshotCell<User>,
    categories: SnapshotCell<String>,
}

impl Store {
    pub(crate) fn new() -> Self {
        Self {
            products: SnapshotCell::new(),
            users: SnapshotCell::new(),
            categories: SnapshotCell::new(),
        }
    }

    // ── Replace (crate-internal; only Backend loads data) ────────────

    pub(crate) fn replace_products(&self, items: Vec<Product>) {
        self.products.replace(items);
    }

    pub(crate) fn replace_users(&self, items: Vec<User>) {
        self.users.replace(items);
    }

    pub(crate) fn replace_categories(&self, items: Vec<String>) {
        self.categories.replace(items);
    }

    // ── Snapshots ────────────────────────────────────────────────────

    pub fn products_snapshot(&self) -> Arc<Vec<Product>> {
        self.products.snapshot()
    }

    pub fn users_snapshot(&self) -> Arc<Vec<User>> {
        self.users.snapshot()
    }

    pub fn categories_snapshot(&self) -> Arc<Vec<String>> {
        self.categories.snapshot()
    }

    // ── Loaded flags (explicit, not emptiness checks) ────────────────

    pub fn products_loaded(&self) -> bool {
        self.products.is_loaded()
    }

    pub fn users_loaded(&self) -> bool {
        self.users.is_loaded()
    }

    pub fn categories_loaded(&self) -> bool {
        self.categories.is_loaded()
    }

    // ── Subscriptions ────────────────────────────────────────────────
    //
    // One receiver per cell; the UI forwards change notifications into
    // its own event loop.

    pub fn subscribe_products(&self) -> watch::Receiver<Arc<Vec<Product>>> {
        self.products.subscribe()
    }

    pub fn subscribe_users(&self) -> watch::Receiver<Arc<Vec<User>>> {
        self.users.subscribe()
    }

    pub fn subscribe_categories(&self) -> watch::Receiver<Arc<Vec<String>>> {
        self.categories.subscribe()
    }

    // ── Typed by-id lookup ───────────────────────────────────────────

    /// Find a product in the current snapshot. `None` means the view is
    /// stale — the caller decides how to surface that.
    pub fn find_product(&self, id: i64) -> Option<Product> {
        self.products.snapshot().iter().find(|p| p.id == id).cloned()
    }

    pub fn find_user(&self, id: i64) -> Option<User> {
        self.users.snapshot().iter().find(|u| u.id == id).cloned()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str) -> Product {
        Product {
            id,
            name: name.into(),
            category: "Tools".into(),
            description: None,
            price: 1.0,
            quantity: 1,
            is_available: true,
        }
    }

    #[test]
    fn find_product_by_id() {
        let store = Store::new();
        store.replace_products(vec![product(1, "Widget"), product(2, "Gizmo")]);

        assert_eq!(store.find_product(2).unwrap().name, "Gizmo");
        assert!(store.find_product(99).is_none());
    }

    #[test]
    fn loaded_flags_track_each_cell_independently() {
        let store = Store::new();
        assert!(!store.products_loaded());
        assert!(!store.users_loaded());

        store.replace_products(Vec::new());
        assert!(store.products_loaded());
        assert!(!store.users_loaded());
        assert!(!store.categories_loaded());
    }

    #[test]
    fn subscription_carries_each_replacement() {
        let store = Store::new();
        let mut products_rx = store.subscribe_products();
        let mut categories_rx = store.subscribe_categories();

        store.replace_products(vec![product(1, "Widget")]);
        assert!(products_rx.has_changed().unwrap());
        assert_eq!(products_rx.borrow_and_update()[0].name, "Widget");

        // Other cells are independent channels.
        assert!(!categories_rx.has_changed().unwrap());
        store.replace_categories(vec!["Tools".into()]);
        assert!(categories_rx.has_changed().unwrap());
    }
}
