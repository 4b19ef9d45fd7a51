//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;
use std::sync::Arc;

use storekeep_core::{AppInfo, HealthStatus, Product, ProductDraft, User, UserDraft};

use crate::screen::ScreenId;

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A toast notification. One at a time; a newer toast replaces the
/// current one and restarts the dismiss timer.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    #[allow(dead_code)]
    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Pending confirmation action.
#[derive(Debug, Clone)]
pub enum ConfirmAction {
    DeleteProduct { id: i64, name: String },
    DeleteUser { id: i64, name: String },
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteProduct { name, .. } => {
                write!(f, "Delete product {name}? This cannot be undone.")
            }
            Self::DeleteUser { name, .. } => {
                write!(f, "Delete user {name}? This cannot be undone.")
            }
        }
    }
}

/// Combined result of the info + health probes. Each side fails
/// independently; `None` renders as a "failed to load" panel.
#[derive(Debug, Clone, Default)]
pub struct ServiceInfo {
    pub info: Option<AppInfo>,
    pub health: Option<HealthStatus>,
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    ToggleHelp,

    // ── Loads ─────────────────────────────────────────────────────
    LoadProducts,
    LoadCategories,
    LoadUsers,
    LoadServiceInfo,

    // ── Data events (spawned load/mutation tasks report back) ─────
    ProductsUpdated(Arc<Vec<Product>>),
    ProductsLoadFailed,
    CategoriesUpdated(Arc<Vec<String>>),
    UsersUpdated(Arc<Vec<User>>),
    UsersLoadFailed,
    ServiceInfoUpdated(ServiceInfo),

    // ── Mutations ─────────────────────────────────────────────────
    SaveProduct {
        draft: ProductDraft,
        id: Option<i64>,
    },
    DeleteProduct(i64),
    SaveUser {
        draft: UserDraft,
        id: Option<i64>,
    },
    DeleteUser(i64),
    SetUserActive {
        id: i64,
        active: bool,
    },
    /// A save round-trip finished; the owning form closes on this.
    ProductSaved,
    UserSaved,

    // ── Confirm dialog ────────────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}
