use chrono::{DateTime, Local};

use super::{
    draw_chrome, nav, navigate,
    sniffer::{interface_names, preferred_interface, wanted_interface},
    warning_lines, Hit, Payload, Regions, Screen, ScreenContext, TextView, Transition, SCROLL_DOWN, SCROLL_UP,
};
use crate::{
    enums::{NavButton, ScreenId},
    layout::CONTENT_TOP,
    widgets::{draw::draw_footer, InputEvent, Surface},
};

const IFACE: usize = 10;
const CAPTURE: usize = 11;

/// One-shot tshark summary. Capturing takes a few seconds, so it only runs on request.
pub struct PacketsScreen {
    ctx: ScreenContext,
    interfaces: Vec<String>,
    selected: usize,
    view: TextView,
    captured_at: Option<DateTime<Local>>,
    regions: Regions,
}

impl PacketsScreen {
    pub fn new(ctx: &ScreenContext, payload: Option<Payload>) -> Self {
        let (interfaces, warnings) = interface_names(ctx);
        let selected = preferred_interface(&interfaces, wanted_interface(payload).as_deref());
        let mut lines = warning_lines(&warnings);
        lines.push(match interfaces.get(selected) {
            Some(name) => format!("Tap Capture to summarize traffic on {name}"),
            None => "No interfaces found".to_string(),
        });
        Self {
            ctx: ctx.clone(),
            interfaces,
            selected,
            view: TextView::new(lines),
            captured_at: None,
            regions: Regions::default(),
        }
    }

    fn interface(&self) -> Option<&str> {
        self.interfaces.get(self.selected).map(String::as_str)
    }

    fn capture(&mut self) {
        let Some(interface) = self.interface().map(String::from) else {
            return;
        };
        log::info!("Packet summary on {interface}");
        let fetched = self.ctx.providers.packet_summary(&interface);
        let mut lines = warning_lines(&fetched.warnings);
        if fetched.data.is_empty() {
            lines.push(format!("No packets captured on {interface}"));
        }
        lines.extend(fetched.data);
        self.view.set_lines(lines);
        self.captured_at = Some(Local::now());
    }
}

impl Screen for PacketsScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Packets
    }

    fn title(&self) -> String {
        "Packet Summary".to_string()
    }

    fn render(&mut self, surface: &mut dyn Surface) {
        let subtitle = self.interface().map(String::from);
        draw_chrome(
            surface,
            &mut self.regions,
            "Packet Summary",
            subtitle.as_deref(),
            "",
            &[
                ("Iface", IFACE),
                ("Capture", CAPTURE),
                ("▲", SCROLL_UP),
                ("▼", SCROLL_DOWN),
                nav(NavButton::Back),
                nav(NavButton::Home),
                nav(NavButton::Quit),
            ],
        );
        self.view.draw(surface, CONTENT_TOP);
        let footer = match self.captured_at {
            Some(at) => format!("Captured {} | {}", at.format("%H:%M:%S"), self.view.position()),
            None => self.view.position(),
        };
        draw_footer(surface, &footer);
    }

    fn handle_input(&mut self, event: &InputEvent) -> Transition {
        match self.regions.resolve(event) {
            Some(Hit::Nav(button)) => navigate(button, ScreenId::Hacker).unwrap_or(Transition::Stay),
            Some(Hit::Content(IFACE)) => {
                if !self.interfaces.is_empty() {
                    self.selected = (self.selected + 1) % self.interfaces.len();
                }
                Transition::Stay
            }
            Some(Hit::Content(CAPTURE)) => {
                self.capture();
                Transition::Stay
            }
            Some(Hit::Content(action)) => {
                self.view.scroll(action);
                Transition::Stay
            }
            None => Transition::Stay,
        }
    }
}
