use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

/// One tappable rectangle produced by a render pass. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickRegion {
    pub y_start: u16,
    pub y_end: u16,
    pub x_start: u16,
    pub x_end: u16,
    pub action_id: usize,
}

impl ClickRegion {
    pub fn new(y_start: u16, y_end: u16, x_start: u16, x_end: u16, action_id: usize) -> Self {
        Self {
            y_start,
            y_end,
            x_start,
            x_end,
            action_id,
        }
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        self.y_start <= y && y <= self.y_end && self.x_start <= x && x <= self.x_end
    }

    /// Center cell of the region, handy for synthesizing taps.
    pub fn center(&self) -> (u16, u16) {
        (
            self.x_start + (self.x_end - self.x_start) / 2,
            self.y_start + (self.y_end - self.y_start) / 2,
        )
    }
}

/// Input handed to a screen: a pointer event, or the idle sentinel produced
/// when a bounded wait for input expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Pointer(MouseEvent),
    Idle,
}

pub fn is_primary_click(event: &InputEvent) -> bool {
    matches!(
        event,
        InputEvent::Pointer(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            ..
        })
    )
}

/// Action id of the first region (in draw order) containing the click.
///
/// Anything other than a primary-button press resolves to `None`.
pub fn resolve(event: &InputEvent, regions: &[ClickRegion]) -> Option<usize> {
    if !is_primary_click(event) {
        return None;
    }
    let InputEvent::Pointer(mouse) = event else {
        return None;
    };
    regions
        .iter()
        .find(|region| region.contains(mouse.column, mouse.row))
        .map(|region| region.action_id)
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crossterm::event::KeyModifiers;

    pub fn pointer(kind: MouseEventKind, x: u16, y: u16) -> InputEvent {
        InputEvent::Pointer(MouseEvent {
            kind,
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        })
    }

    pub fn tap(x: u16, y: u16) -> InputEvent {
        pointer(MouseEventKind::Down(MouseButton::Left), x, y)
    }

    pub fn tap_region(region: &ClickRegion) -> InputEvent {
        let (x, y) = region.center();
        tap(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use pretty_assertions::assert_eq;

    fn row_of_buttons() -> Vec<ClickRegion> {
        vec![
            ClickRegion::new(10, 10, 0, 9, 7),
            ClickRegion::new(10, 10, 10, 19, 8),
            ClickRegion::new(10, 10, 20, 29, 9),
        ]
    }

    #[test]
    fn adjacent_regions_resolve_to_their_own_id() {
        let regions = row_of_buttons();
        assert_eq!(resolve(&tap(9, 10), &regions), Some(7));
        assert_eq!(resolve(&tap(10, 10), &regions), Some(8));
        assert_eq!(resolve(&tap(19, 10), &regions), Some(8));
        assert_eq!(resolve(&tap(20, 10), &regions), Some(9));
    }

    #[test]
    fn first_region_in_draw_order_wins_on_overlap() {
        let regions = vec![
            ClickRegion::new(0, 5, 0, 20, 1),
            ClickRegion::new(2, 3, 5, 10, 2),
        ];
        assert_eq!(resolve(&tap(6, 2), &regions), Some(1));
    }

    #[test]
    fn misses_resolve_to_none() {
        let regions = row_of_buttons();
        assert_eq!(resolve(&tap(5, 9), &regions), None);
        assert_eq!(resolve(&tap(30, 10), &regions), None);
        assert_eq!(resolve(&tap(0, 0), &[]), None);
    }

    #[test]
    fn only_primary_presses_are_actionable() {
        let regions = row_of_buttons();
        for kind in [
            MouseEventKind::Down(MouseButton::Right),
            MouseEventKind::Down(MouseButton::Middle),
            MouseEventKind::Up(MouseButton::Left),
            MouseEventKind::Moved,
            MouseEventKind::Drag(MouseButton::Left),
            MouseEventKind::ScrollDown,
        ] {
            assert_eq!(resolve(&pointer(kind, 5, 10), &regions), None, "{kind:?}");
        }
        assert_eq!(resolve(&InputEvent::Idle, &regions), None);
    }

    #[test]
    fn multi_row_regions_cover_every_row() {
        let region = ClickRegion::new(4, 5, 2, 8, 0);
        assert!(region.contains(2, 4));
        assert!(region.contains(8, 5));
        assert!(!region.contains(8, 6));
        assert_eq!(region.center(), (5, 4));
    }
}
