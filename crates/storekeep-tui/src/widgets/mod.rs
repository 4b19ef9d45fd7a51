//! Small reusable render helpers shared by the screens.

pub mod badge;
pub mod form;
pub mod sub_tabs;

use ratatui::layout::Rect;

/// A rect of at most `width`×`height`, centered within `area`.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width.saturating_sub(2));
    let h = height.min(area.height.saturating_sub(2));
    let x = (area.width.saturating_sub(w)) / 2;
    let y = (area.height.saturating_sub(h)) / 2;
    Rect::new(area.x + x, area.y + y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 80, 24);
        let rect = centered_rect(area, 40, 10);
        assert_eq!(rect.width, 40);
        assert_eq!(rect.height, 10);
        assert_eq!(rect.x, 20);
        assert_eq!(rect.y, 7);
    }

    #[test]
    fn centered_rect_clamps_to_small_areas() {
        let area = Rect::new(0, 0, 10, 4);
        let rect = centered_rect(area, 40, 10);
        assert!(rect.width <= area.width);
        assert!(rect.height <= area.height);
    }
}
