use super::{draw_chrome, nav, navigate, Hit, Regions, Screen, Transition};
use crate::{
    enums::{NavButton, ScreenId},
    layout::{content_width, MENU_LEFT, MENU_TOP},
    widgets::{draw::draw_menu, InputEvent, Surface},
};

/// Where a menu entry leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Open(ScreenId),
    Exit,
}

/// The main menu and the hub screens: a list of entries, each opening a screen.
pub struct MenuScreen {
    id: ScreenId,
    title: &'static str,
    prompt: &'static str,
    entries: Vec<(&'static str, Entry)>,
    back: Option<ScreenId>,
    selected: Option<usize>,
    touch_mode: bool,
    regions: Regions,
}

impl MenuScreen {
    fn new(
        id: ScreenId,
        title: &'static str,
        prompt: &'static str,
        entries: Vec<(&'static str, Entry)>,
        back: Option<ScreenId>,
    ) -> Self {
        Self {
            id,
            title,
            prompt,
            entries,
            back,
            selected: None,
            touch_mode: false,
            regions: Regions::default(),
        }
    }

    pub fn main() -> Self {
        Self::new(
            ScreenId::Main,
            "netdeck",
            "Tap a section:",
            vec![
                ("Network", Entry::Open(ScreenId::NetHub)),
                ("Bluetooth", Entry::Open(ScreenId::BtHub)),
                ("System Info", Entry::Open(ScreenId::SysInfo)),
                ("Hacker Tools", Entry::Open(ScreenId::Hacker)),
                ("Settings", Entry::Open(ScreenId::Settings)),
                ("Exit", Entry::Exit),
            ],
            None,
        )
    }

    pub fn net_hub() -> Self {
        Self::new(
            ScreenId::NetHub,
            "Network",
            "Network tools:",
            vec![
                ("Interfaces", Entry::Open(ScreenId::Interfaces)),
                ("Diagnostics", Entry::Open(ScreenId::NetDiag)),
                ("WLAN", Entry::Open(ScreenId::Wifi)),
                ("DNS & Routes", Entry::Open(ScreenId::DnsRoutes)),
            ],
            Some(ScreenId::Main),
        )
    }

    pub fn bt_hub() -> Self {
        Self::new(
            ScreenId::BtHub,
            "Bluetooth",
            "Bluetooth tools:",
            vec![
                ("Status", Entry::Open(ScreenId::BtStatus)),
                ("Devices", Entry::Open(ScreenId::BtDevices)),
            ],
            Some(ScreenId::Main),
        )
    }

    pub fn hacker() -> Self {
        Self::new(
            ScreenId::Hacker,
            "Hacker Tools",
            "Use only on networks and devices you own:",
            vec![
                ("Port Scanner", Entry::Open(ScreenId::PortScan)),
                ("Packet Sniffer", Entry::Open(ScreenId::Sniffer)),
                ("Packet Summary", Entry::Open(ScreenId::Packets)),
                ("Keystroke Monitor", Entry::Open(ScreenId::Keylogger)),
                ("USB Devices", Entry::Open(ScreenId::UsbInterceptor)),
            ],
            Some(ScreenId::Main),
        )
    }

    fn buttons(&self) -> Vec<(&'static str, usize)> {
        match self.back {
            Some(_) => vec![nav(NavButton::Back), nav(NavButton::Home), nav(NavButton::Quit)],
            None => vec![nav(NavButton::Quit)],
        }
    }
}

impl Screen for MenuScreen {
    fn id(&self) -> ScreenId {
        self.id
    }

    fn title(&self) -> String {
        self.title.to_string()
    }

    fn set_touch_mode(&mut self, enabled: bool) {
        self.touch_mode = enabled;
    }

    fn render(&mut self, surface: &mut dyn Surface) {
        let footer = if self.id == ScreenId::Main {
            crate::utils::version_line()
        } else {
            format!("{} entries", self.entries.len())
        };
        let buttons = self.buttons();
        draw_chrome(surface, &mut self.regions, self.title, None, &footer, &buttons);
        surface.put(
            MENU_TOP - 2,
            MENU_LEFT,
            self.prompt,
            content_width(surface.size()),
            Default::default(),
        );
        let labels: Vec<String> = self.entries.iter().map(|(label, _)| label.to_string()).collect();
        let width = content_width(surface.size()).saturating_sub(MENU_LEFT);
        let items = draw_menu(
            surface,
            MENU_TOP,
            MENU_LEFT,
            width,
            &labels,
            self.selected,
            self.touch_mode,
        );
        self.regions.add(items);
    }

    fn handle_input(&mut self, event: &InputEvent) -> Transition {
        match self.regions.resolve(event) {
            Some(Hit::Nav(button)) => match self.back {
                Some(back) => navigate(button, back).unwrap_or(Transition::Stay),
                None if button == NavButton::Quit => Transition::Quit,
                None => Transition::Stay,
            },
            Some(Hit::Content(index)) => match self.entries.get(index) {
                Some((_, Entry::Open(target))) => {
                    self.selected = Some(index);
                    Transition::to(*target)
                }
                Some((_, Entry::Exit)) => Transition::Quit,
                None => Transition::Stay,
            },
            None => Transition::Stay,
        }
    }
}
