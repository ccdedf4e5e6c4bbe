use ratatui::style::{Color, Modifier, Style};

use super::{ClickRegion, Surface};
use crate::{
    enums::NAV_BASE,
    layout::{get_button_bar_layout, visible_rows, MIN_BUTTON_WIDTH},
};

/// Prefix marking a provider warning line; rendered highlighted.
pub const WARNING_PREFIX: &str = "⚠ ";

fn inverted() -> Style {
    Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
}

fn text_width(text: &str) -> u16 {
    text.chars().count().min(u16::MAX as usize) as u16
}

pub fn draw_separator(surface: &mut dyn Surface, y: u16, fill: char) {
    let width = surface.size().width;
    let line: String = std::iter::repeat(fill).take(width as usize).collect();
    surface.put(y, 0, &line, width, Style::default().fg(Color::DarkGray));
}

/// Inverted title row with an optional right-aligned subtitle, and a separator below.
pub fn draw_header(surface: &mut dyn Surface, title: &str, subtitle: Option<&str>) {
    let size = surface.size();
    if size.width == 0 || size.height == 0 {
        return;
    }
    let width = size.width;
    surface.put(0, 0, &" ".repeat(width as usize), width, inverted());
    let title_text = format!(" ➤ {title} ");
    let title_end = surface.put(0, 0, &title_text, width, inverted());

    if let Some(sub) = subtitle.filter(|s| !s.is_empty()) {
        let sub = format!("{sub} ");
        let col = width.saturating_sub(text_width(&sub) + 1);
        if col > title_end {
            surface.put(0, col, &sub, width - col, inverted());
        }
    }
    draw_separator(surface, 1, '─');
}

pub fn draw_footer(surface: &mut dyn Surface, text: &str) {
    let size = surface.size();
    if size.width == 0 || size.height == 0 {
        return;
    }
    let row = size.height - 1;
    let style = Style::default().add_modifier(Modifier::REVERSED);
    surface.put(row, 0, &" ".repeat(size.width as usize), size.width, style);
    surface.put(row, 0, &format!(" {text} "), size.width, style);
}

/// Draw a vertical menu and return one region per visible item, `action_id`
/// being the item index. Touch mode doubles the row height of each item.
pub fn draw_menu(
    surface: &mut dyn Surface,
    y: u16,
    x: u16,
    width: u16,
    items: &[String],
    selected: Option<usize>,
    touch_mode: bool,
) -> Vec<ClickRegion> {
    let item_height: u16 = if touch_mode { 2 } else { 1 };
    let fits = (visible_rows(surface.size(), y) / item_height) as usize;
    let mut regions = Vec::with_capacity(fits.min(items.len()));

    for (i, label) in items.iter().take(fits).enumerate() {
        let row = y + i as u16 * item_height;
        let is_selected = selected == Some(i);
        let (marker, style) = if is_selected {
            ("▶", inverted())
        } else {
            (" ", Style::default())
        };
        surface.put(row, x, &format!("{marker}   {label}"), width, style);
        regions.push(ClickRegion::new(
            row,
            row + item_height - 1,
            x,
            x + width.saturating_sub(1),
            i,
        ));
    }
    regions
}

/// Draw lines from row `y`, stopping where the bottom chrome begins.
/// Returns how many lines were drawn.
pub fn draw_text_block(
    surface: &mut dyn Surface,
    y: u16,
    x: u16,
    width: u16,
    lines: &[String],
) -> usize {
    let rows = visible_rows(surface.size(), y) as usize;
    for (i, line) in lines.iter().take(rows).enumerate() {
        let style = if line.starts_with(WARNING_PREFIX) {
            Style::default().fg(Color::Yellow)
        } else if line.starts_with('[') {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        surface.put(y + i as u16, x, line, width, style);
    }
    lines.len().min(rows)
}

/// Buttons that fit in `width` columns. When some must go, screen-specific
/// buttons are dropped from the end first so navigation stays reachable.
fn fitting_buttons<'a>(width: u16, buttons: &[(&'a str, usize)]) -> Vec<(&'a str, usize)> {
    let capacity = (width.saturating_sub(2) / MIN_BUTTON_WIDTH) as usize;
    if buttons.len() <= capacity {
        return buttons.to_vec();
    }
    let navs = buttons.iter().filter(|(_, id)| *id >= NAV_BASE).count().min(capacity);
    let mut content_left = capacity - navs;
    let mut navs_left = navs;
    buttons
        .iter()
        .filter(|(_, id)| {
            let budget = if *id >= NAV_BASE { &mut navs_left } else { &mut content_left };
            let keep = *budget > 0;
            *budget = budget.saturating_sub(1);
            keep
        })
        .copied()
        .collect()
}

/// Equal-width buttons on the second-to-last row. Buttons that do not fit are
/// left out, and so are their regions.
pub fn draw_button_bar(surface: &mut dyn Surface, buttons: &[(&str, usize)]) -> Vec<ClickRegion> {
    let size = surface.size();
    let buttons = fitting_buttons(size.width, buttons);
    let Some(bar) = get_button_bar_layout(size, buttons.len()) else {
        return Vec::new();
    };
    draw_separator(surface, bar.separator_row, '═');

    let width = bar.button_width;
    let mut regions = Vec::with_capacity(buttons.len());
    for (i, (label, action_id)) in buttons.iter().enumerate() {
        let x = 1 + i as u16 * width;
        if x + width > size.width.saturating_sub(1) {
            break;
        }
        let text = format!("{:^width$}", format!(" {label} "), width = width as usize);
        surface.put(bar.row, x, &text, width, inverted());
        regions.push(ClickRegion::new(bar.row, bar.row, x, x + width - 1, *action_id));
    }
    regions
}
