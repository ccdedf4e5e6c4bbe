use super::{
    draw_chrome, nav, navigate, warning_lines, Hit, Payload, Regions, Screen, ScreenContext, TextView,
    Transition, SCROLL_DOWN,
};
use crate::{
    enums::{NavButton, PortScanMode, ScreenId},
    layout::CONTENT_TOP,
    providers::{Fetched, PortSelection},
    widgets::{draw::draw_footer, InputEvent, Surface},
};

pub const LOOPBACK: &str = "127.0.0.1";
pub const NO_OPEN_PORTS: &str = "No open ports found";

const MODE: usize = 10;
const TARGET: usize = 11;
const SCAN: usize = 12;

/// Port scanner: local listening sockets or an nmap scan of a chosen target.
pub struct PortScanScreen {
    ctx: ScreenContext,
    mode: PortScanMode,
    targets: Vec<String>,
    target: usize,
    range: Option<String>,
    view: TextView,
    regions: Regions,
}

impl PortScanScreen {
    /// A `PortRange` payload comes back from the keypad: scan it right away.
    pub fn new(ctx: &ScreenContext, payload: Option<Payload>) -> Self {
        let mut screen = Self {
            ctx: ctx.clone(),
            mode: PortScanMode::default(),
            targets: Vec::new(),
            target: 0,
            range: None,
            view: TextView::default(),
            regions: Regions::default(),
        };
        screen.load_targets();
        if let Some(Payload::PortRange { range, target }) = payload {
            screen.mode = PortScanMode::Custom;
            screen.range = Some(range);
            if let Some(target) = target {
                screen.select_target(target);
            }
        }
        screen.scan();
        screen
    }

    fn load_targets(&mut self) {
        let fetched = self.ctx.providers.interfaces();
        self.targets = std::iter::once(LOOPBACK.to_string())
            .chain(
                fetched
                    .data
                    .iter()
                    .filter_map(|info| info.primary_ipv4())
                    .filter(|ip| *ip != LOOPBACK)
                    .map(String::from),
            )
            .collect();
        self.target = 0;
    }

    fn select_target(&mut self, target: String) {
        match self.targets.iter().position(|t| *t == target) {
            Some(index) => self.target = index,
            None => {
                self.targets.push(target);
                self.target = self.targets.len() - 1;
            }
        }
    }

    fn current_target(&self) -> &str {
        self.targets.get(self.target).map_or(LOOPBACK, String::as_str)
    }

    fn selection(&self) -> Option<PortSelection> {
        match self.mode {
            PortScanMode::Local => None,
            PortScanMode::Quick => Some(PortSelection::Fast),
            PortScanMode::Standard => Some(PortSelection::Top),
            PortScanMode::Custom => self.range.clone().map(PortSelection::Range),
        }
    }

    fn scan(&mut self) {
        let fetched = match (self.mode, self.selection()) {
            (PortScanMode::Local, _) => self.ctx.providers.check_open_ports(),
            (_, Some(ports)) => {
                log::info!("Scanning {} ({:?})", self.current_target(), ports);
                self.ctx.providers.nmap_scan(self.current_target(), &ports)
            }
            (_, None) => {
                self.view
                    .set_lines(vec!["Enter a port range with the keypad".to_string()]);
                return;
            }
        };
        self.view.set_lines(result_lines(fetched));
    }

    fn describe(&self) -> String {
        match (self.mode, &self.range) {
            (PortScanMode::Local, _) => "Local listening sockets".to_string(),
            (PortScanMode::Custom, Some(range)) => format!("Custom {range} on {}", self.current_target()),
            (mode, _) => format!("{mode} on {}", self.current_target()),
        }
    }

    fn cycle_mode(&mut self) -> Transition {
        self.mode = self.mode.next();
        if self.mode == PortScanMode::Custom {
            return Transition::with(
                ScreenId::CustomPortInput,
                Payload::Interface(self.current_target().to_string()),
            );
        }
        self.view
            .set_lines(vec![format!("{}: tap Scan to run", self.describe())]);
        Transition::Stay
    }

    fn cycle_target(&mut self) {
        if !self.targets.is_empty() {
            self.target = (self.target + 1) % self.targets.len();
        }
    }
}

fn result_lines(fetched: Fetched<Vec<String>>) -> Vec<String> {
    let mut lines = warning_lines(&fetched.warnings);
    if fetched.data.is_empty() {
        lines.push(NO_OPEN_PORTS.to_string());
    }
    lines.extend(fetched.data);
    lines
}

impl Screen for PortScanScreen {
    fn id(&self) -> ScreenId {
        ScreenId::PortScan
    }

    fn title(&self) -> String {
        "Port Scanner".to_string()
    }

    fn render(&mut self, surface: &mut dyn Surface) {
        let subtitle = self.describe();
        draw_chrome(
            surface,
            &mut self.regions,
            "Port Scanner",
            Some(&subtitle),
            "",
            &[
                ("Mode", MODE),
                ("Target", TARGET),
                ("Scan", SCAN),
                ("▼", SCROLL_DOWN),
                nav(NavButton::Back),
                nav(NavButton::Home),
                nav(NavButton::Quit),
            ],
        );
        self.view.draw(surface, CONTENT_TOP);
        let footer = format!("Target {} | {}", self.current_target(), self.view.position());
        draw_footer(surface, &footer);
    }

    fn handle_input(&mut self, event: &InputEvent) -> Transition {
        match self.regions.resolve(event) {
            Some(Hit::Nav(button)) => navigate(button, ScreenId::Hacker).unwrap_or(Transition::Stay),
            Some(Hit::Content(MODE)) => self.cycle_mode(),
            Some(Hit::Content(TARGET)) => {
                self.cycle_target();
                Transition::Stay
            }
            Some(Hit::Content(SCAN)) => {
                self.scan();
                Transition::Stay
            }
            Some(Hit::Content(SCROLL_DOWN)) => {
                // Wraps to the first page after the last.
                if self.view.can_scroll_down() {
                    self.view.scroll_down();
                } else {
                    self.view.rewind();
                }
                Transition::Stay
            }
            Some(Hit::Content(_)) | None => Transition::Stay,
        }
    }
}
