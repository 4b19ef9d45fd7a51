//! Screen implementations. Each screen is a top-level Component.

mod info;
mod products;
mod users;

use crate::component::Component;
use crate::screen::ScreenId;

pub use info::InfoScreen;
pub use products::ProductsScreen;
pub use users::UsersScreen;

/// Where a screen's data is in its load lifecycle. Distinguishes
/// "never fetched" from "fetched and empty" from "last fetch failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loaded,
    Failed,
}

/// Create all screens in tab-bar order.
pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (ScreenId::Products, Box::new(ProductsScreen::new()) as Box<dyn Component>),
        (ScreenId::Users, Box::new(UsersScreen::new())),
        (ScreenId::Info, Box::new(InfoScreen::new())),
    ]
}
