use ratatui::layout::Size;

/// Title row plus the separator under it.
pub const HEADER_ROWS: u16 = 2;

/// Rows kept free at the bottom for the bar separator, the bar and the footer.
pub const RESERVED_BOTTOM_ROWS: u16 = 3;

pub const CONTENT_TOP: u16 = HEADER_ROWS;
pub const CONTENT_LEFT: u16 = 2;

/// First row of a menu drawn under a one-line prompt.
pub const MENU_TOP: u16 = 5;
pub const MENU_LEFT: u16 = 4;

pub const MIN_BUTTON_WIDTH: u16 = 10;

pub struct ButtonBarRects {
    pub separator_row: u16,
    pub row: u16,
    pub button_width: u16,
}

/// Rows available to content starting at `top`.
pub fn visible_rows(size: Size, top: u16) -> u16 {
    size.height
        .saturating_sub(top)
        .saturating_sub(RESERVED_BOTTOM_ROWS)
}

/// Columns available to content drawn at `CONTENT_LEFT` with a matching right margin.
pub fn content_width(size: Size) -> u16 {
    size.width.saturating_sub(CONTENT_LEFT * 2)
}

pub fn get_button_bar_layout(size: Size, buttons: usize) -> Option<ButtonBarRects> {
    if size.height <= 2 || buttons == 0 {
        return None;
    }
    let row = size.height - 2;
    let share = size.width.saturating_sub(2) / buttons as u16;
    Some(ButtonBarRects {
        separator_row: row - 1,
        row,
        button_width: share.max(MIN_BUTTON_WIDTH),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bar_sits_above_the_last_row() {
        let rects = get_button_bar_layout(Size { width: 42, height: 20 }, 4).unwrap();
        assert_eq!(rects.row, 18);
        assert_eq!(rects.separator_row, 17);
        assert_eq!(rects.button_width, 10);
    }

    #[test]
    fn tiny_surfaces_have_no_bar_or_content() {
        assert!(get_button_bar_layout(Size { width: 80, height: 2 }, 3).is_none());
        assert!(get_button_bar_layout(Size { width: 80, height: 24 }, 0).is_none());
        assert_eq!(visible_rows(Size { width: 80, height: 4 }, CONTENT_TOP), 0);
        assert_eq!(content_width(Size { width: 3, height: 4 }), 0);
    }
}
