//! Screens: one self-contained page of the dashboard each.
//!
//! A screen owns whatever it loaded from the [`Providers`], paints itself onto
//! a [`Surface`] and turns pointer events into a [`Transition`]. Screens only
//! react to the click regions produced by their own latest render; navigation
//! buttons in the bottom bar are always resolved before content regions.
//!
//! The set of screens is closed: [`ScreenId`] names them all and
//! [`build_screen`] constructs any of them, optionally from a [`Payload`]
//! carried over from the screen that requested the switch.

use std::sync::Arc;

use color_eyre::eyre::Result;

use crate::{
    config::DashboardSettings,
    enums::{NavButton, ScreenId},
    layout::{content_width, visible_rows, CONTENT_LEFT},
    providers::Providers,
    widgets::{
        draw::{draw_button_bar, draw_footer, draw_header, draw_text_block, WARNING_PREFIX},
        resolve, ClickRegion, InputEvent, Surface,
    },
};

pub mod info;
pub mod interfaces;
pub mod keylogger;
pub mod keypad;
pub mod menu;
pub mod netdiag;
pub mod packets;
pub mod port_scan;
pub mod sniffer;

/// Action ids of the scroll buttons used by text screens.
pub const SCROLL_UP: usize = 900;
pub const SCROLL_DOWN: usize = 901;

/// Value handed from one screen to the constructor of the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Interface(String),
    PortRange { range: String, target: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Switch {
        to: ScreenId,
        payload: Option<Payload>,
    },
    Quit,
}

impl Transition {
    pub fn to(to: ScreenId) -> Self {
        Transition::Switch { to, payload: None }
    }

    pub fn with(to: ScreenId, payload: Payload) -> Self {
        Transition::Switch {
            to,
            payload: Some(payload),
        }
    }
}

/// Everything a screen needs to load its data.
#[derive(Clone)]
pub struct ScreenContext {
    pub providers: Arc<dyn Providers>,
    pub settings: DashboardSettings,
}

impl ScreenContext {
    pub fn new(providers: Arc<dyn Providers>, settings: DashboardSettings) -> Self {
        Self {
            providers,
            settings,
        }
    }
}

pub trait Screen {
    fn id(&self) -> ScreenId;

    fn title(&self) -> String;

    /// Larger tap targets. The controller switches this on for every screen.
    fn set_touch_mode(&mut self, _enabled: bool) {}

    /// Whether the screen shows content that changes without input, so the
    /// controller should redraw on a timer.
    fn is_live(&self) -> bool {
        false
    }

    /// Paint the current state. Replaces the screen's click regions.
    fn render(&mut self, surface: &mut dyn Surface);

    fn handle_input(&mut self, event: &InputEvent) -> Transition;

    /// Release background work before the screen is dropped or parked.
    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Construct `id`. Every screen id maps to exactly one constructor.
pub fn build_screen(id: ScreenId, ctx: &ScreenContext, payload: Option<Payload>) -> Box<dyn Screen> {
    match id {
        ScreenId::Main => Box::new(menu::MenuScreen::main()),
        ScreenId::NetHub => Box::new(menu::MenuScreen::net_hub()),
        ScreenId::BtHub => Box::new(menu::MenuScreen::bt_hub()),
        ScreenId::Hacker => Box::new(menu::MenuScreen::hacker()),
        ScreenId::Interfaces => Box::new(interfaces::InterfacesScreen::new(ctx)),
        ScreenId::NetDiag => Box::new(netdiag::NetDiagScreen::new(ctx, payload)),
        ScreenId::NetDiagDetail => Box::new(netdiag::DetailScreen::new(ctx, payload)),
        ScreenId::Wifi
        | ScreenId::DnsRoutes
        | ScreenId::BtStatus
        | ScreenId::BtDevices
        | ScreenId::SysInfo
        | ScreenId::UsbInterceptor
        | ScreenId::Settings => Box::new(info::InfoScreen::new(id, ctx)),
        ScreenId::PortScan => Box::new(port_scan::PortScanScreen::new(ctx, payload)),
        ScreenId::CustomPortInput => Box::new(keypad::KeypadScreen::new(payload)),
        ScreenId::Sniffer => Box::new(sniffer::SnifferScreen::new(ctx, payload)),
        ScreenId::Packets => Box::new(packets::PacketsScreen::new(ctx, payload)),
        ScreenId::Keylogger => Box::new(keylogger::KeyloggerScreen::new(ctx)),
    }
}

/// What a tap hit: a navigation button or a screen specific region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Nav(NavButton),
    Content(usize),
}

/// Click regions of the latest render, split so navigation wins over content.
#[derive(Debug, Default)]
pub struct Regions {
    nav: Vec<ClickRegion>,
    content: Vec<ClickRegion>,
}

impl Regions {
    pub fn reset(&mut self) {
        self.nav.clear();
        self.content.clear();
    }

    pub fn add(&mut self, regions: impl IntoIterator<Item = ClickRegion>) {
        for region in regions {
            if NavButton::from_action(region.action_id).is_some() {
                self.nav.push(region);
            } else {
                self.content.push(region);
            }
        }
    }

    pub fn content(&self) -> &[ClickRegion] {
        &self.content
    }

    pub fn nav(&self) -> &[ClickRegion] {
        &self.nav
    }

    pub fn resolve(&self, event: &InputEvent) -> Option<Hit> {
        if let Some(id) = resolve(event, &self.nav) {
            return NavButton::from_action(id).map(Hit::Nav);
        }
        resolve(event, &self.content).map(Hit::Content)
    }
}

pub fn nav_label(button: NavButton) -> &'static str {
    match button {
        NavButton::Back => "◀ Back",
        NavButton::Home => "⌂ Home",
        NavButton::Refresh => "↻ Refresh",
        NavButton::Quit => "✕ Quit",
    }
}

pub fn nav(button: NavButton) -> (&'static str, usize) {
    (nav_label(button), button.action_id())
}

/// Back, Home and Quit; `Refresh` is left for the screen to handle.
pub fn navigate(button: NavButton, back: ScreenId) -> Option<Transition> {
    match button {
        NavButton::Back => Some(Transition::to(back)),
        NavButton::Home => Some(Transition::to(ScreenId::Main)),
        NavButton::Quit => Some(Transition::Quit),
        NavButton::Refresh => None,
    }
}

/// Clear the surface, draw header, footer and button bar, and record the bar's regions.
pub fn draw_chrome(
    surface: &mut dyn Surface,
    regions: &mut Regions,
    title: &str,
    subtitle: Option<&str>,
    footer: &str,
    buttons: &[(&str, usize)],
) {
    surface.clear();
    regions.reset();
    draw_header(surface, title, subtitle);
    regions.add(draw_button_bar(surface, buttons));
    draw_footer(surface, footer);
}

pub fn warning_lines(warnings: &[String]) -> Vec<String> {
    warnings
        .iter()
        .map(|w| format!("{WARNING_PREFIX}{w}"))
        .collect()
}

/// Scrollable block of text lines.
#[derive(Debug, Default)]
pub struct TextView {
    lines: Vec<String>,
    offset: usize,
    page: usize,
}

impl TextView {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    pub fn set_lines(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.offset = 0;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn draw(&mut self, surface: &mut dyn Surface, top: u16) -> usize {
        let size = surface.size();
        self.page = visible_rows(size, top) as usize;
        self.offset = self.offset.min(self.lines.len().saturating_sub(1));
        draw_text_block(
            surface,
            top,
            CONTENT_LEFT,
            content_width(size),
            &self.lines[self.offset.min(self.lines.len())..],
        )
    }

    pub fn scroll_up(&mut self) {
        self.offset = self.offset.saturating_sub(self.page.max(1));
    }

    pub fn scroll_down(&mut self) {
        if self.can_scroll_down() {
            self.offset += self.page.max(1);
        }
    }

    pub fn can_scroll_down(&self) -> bool {
        self.offset + self.page < self.lines.len()
    }

    pub fn rewind(&mut self) {
        self.offset = 0;
    }

    /// Handle the scroll buttons; `false` for any other action.
    pub fn scroll(&mut self, action_id: usize) -> bool {
        match action_id {
            SCROLL_UP => self.scroll_up(),
            SCROLL_DOWN => self.scroll_down(),
            _ => return false,
        }
        true
    }

    pub fn position(&self) -> String {
        if self.lines.is_empty() {
            return "Nothing to show".to_string();
        }
        let last = (self.offset + self.page).min(self.lines.len());
        format!("Lines {}-{} of {}", self.offset + 1, last, self.lines.len())
    }
}

#[cfg(test)]
pub mod testing {
    use ratatui::{buffer::Buffer, layout::Rect};

    use super::*;
    use crate::widgets::surface::testing::rows;

    pub const WIDTH: u16 = 80;
    pub const HEIGHT: u16 = 24;

    pub fn context(providers: crate::providers::fake::FakeProviders) -> ScreenContext {
        ScreenContext::new(Arc::new(providers), DashboardSettings::default())
    }

    /// Render into a fresh 80x24 buffer and return its rows.
    pub fn render(screen: &mut dyn Screen) -> Vec<String> {
        let mut buf = Buffer::empty(Rect::new(0, 0, WIDTH, HEIGHT));
        screen.render(&mut buf);
        rows(&buf)
    }

    /// Content rows only: below the header and above the button bar.
    pub fn content_rows(screen: &mut dyn Screen) -> Vec<String> {
        let all = render(screen);
        all[crate::layout::CONTENT_TOP as usize..(HEIGHT - crate::layout::RESERVED_BOTTOM_ROWS) as usize]
            .iter()
            .filter(|row| !row.trim().is_empty())
            .cloned()
            .collect()
    }
}
