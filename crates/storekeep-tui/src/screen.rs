//! Screen identifier enum for the tab bar.

use std::fmt;

/// Identifies each primary TUI screen, navigable by number keys 1-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Products, // 1
    Users, // 2
    Info,  // 3
}

impl ScreenId {
    /// All screens in tab-bar order.
    pub const ALL: [ScreenId; 3] = [Self::Products, Self::Users, Self::Info];

    /// Numeric key (1-3) for this screen.
    pub fn number(self) -> u8 {
        match self {
            Self::Products => 1,
            Self::Users => 2,
            Self::Info => 3,
        }
    }

    /// Screen from a numeric key (1-3). Returns None for out-of-range.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Products),
            2 => Some(Self::Users),
            3 => Some(Self::Info),
            _ => None,
        }
    }

    /// Next screen in tab order (wraps around).
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous screen in tab order (wraps around).
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Short label for the tab bar.
    pub fn label(self) -> &'static str {
        match self {
            Self::Products => "Products",
            Self::Users => "Users",
            Self::Info => "API Info",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_cycling_wraps() {
        assert_eq!(ScreenId::Products.next(), ScreenId::Users);
        assert_eq!(ScreenId::Info.next(), ScreenId::Products);
        assert_eq!(ScreenId::Products.prev(), ScreenId::Info);
    }

    #[test]
    fn number_round_trip() {
        for id in ScreenId::ALL {
            assert_eq!(ScreenId::from_number(id.number()), Some(id));
        }
        assert_eq!(ScreenId::from_number(4), None);
    }
}
