//! Status badges — ●/○ with fixed text and color per flag.

use ratatui::style::Style;
use ratatui::text::Span;

use crate::theme;

/// Badge for a product's availability flag.
pub fn availability_badge(available: bool) -> Span<'static> {
    if available {
        Span::styled("● Available", Style::default().fg(theme::SUCCESS_GREEN))
    } else {
        Span::styled("○ Unavailable", Style::default().fg(theme::ERROR_RED))
    }
}

/// Badge for a user's active flag.
pub fn active_badge(active: bool) -> Span<'static> {
    if active {
        Span::styled("● Active", Style::default().fg(theme::SUCCESS_GREEN))
    } else {
        Span::styled("○ Inactive", Style::default().fg(theme::ERROR_RED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_text_is_fixed_per_flag() {
        assert_eq!(availability_badge(true).content, "● Available");
        assert_eq!(availability_badge(false).content, "○ Unavailable");
        assert_eq!(active_badge(true).content, "● Active");
        assert_eq!(active_badge(false).content, "○ Inactive");
    }
}
