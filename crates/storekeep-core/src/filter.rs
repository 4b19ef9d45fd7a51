//! Filter engine — pure predicates over the in-memory snapshots.
//!
//! Filters never touch the network and never mutate their input; the
//! result is recomputed in full on every criteria change. All active
//! criteria combine with AND, and with no active criteria the result is
//! the snapshot itself.

use storekeep_api::types::{Product, User};

/// Tri-state filter over a boolean field: everything, only set, only unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagFilter {
    #[default]
    All,
    On,
    Off,
}

impl FlagFilter {
    /// Next state in cycling order (All → On → Off → All).
    pub fn cycle(self) -> Self {
        match self {
            Self::All => Self::On,
            Self::On => Self::Off,
            Self::Off => Self::All,
        }
    }

    fn matches(self, flag: bool) -> bool {
        match self {
            Self::All => true,
            Self::On => flag,
            Self::Off => !flag,
        }
    }
}

// ── Products ─────────────────────────────────────────────────────────

/// Filter criteria for the product table.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring over name and description.
    pub query: String,
    /// Exact category match, `None` = all categories.
    pub category: Option<String>,
    pub availability: FlagFilter,
}

impl ProductFilter {
    /// Whether any criterion is active.
    pub fn is_active(&self) -> bool {
        !self.query.is_empty() || self.category.is_some() || self.availability != FlagFilter::All
    }

    pub fn matches(&self, product: &Product) -> bool {
        let q = self.query.to_lowercase();
        let text_ok = q.is_empty()
            || product.name.to_lowercase().contains(&q)
            || product
                .description
                .as_deref()
                .unwrap_or("")
                .to_lowercase()
                .contains(&q);

        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|c| product.category == c);

        text_ok && category_ok && self.availability.matches(product.is_available)
    }
}

/// Products satisfying every active criterion, in snapshot order.
pub fn filter_products(products: &[Product], filter: &ProductFilter) -> Vec<Product> {
    products
        .iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect()
}

// ── Users ────────────────────────────────────────────────────────────

/// Filter criteria for the user table.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Case-insensitive substring over name and email.
    pub query: String,
    pub active: FlagFilter,
}

impl UserFilter {
    pub fn is_active(&self) -> bool {
        !self.query.is_empty() || self.active != FlagFilter::All
    }

    pub fn matches(&self, user: &User) -> bool {
        let q = self.query.to_lowercase();
        let text_ok = q.is_empty()
            || user.name.to_lowercase().contains(&q)
            || user.email.to_lowercase().contains(&q);

        text_ok && self.active.matches(user.is_active)
    }
}

/// Users satisfying every active criterion, in snapshot order.
pub fn filter_users(users: &[User], filter: &UserFilter) -> Vec<User> {
    users.iter().filter(|u| filter.matches(u)).cloned().collect()
}
