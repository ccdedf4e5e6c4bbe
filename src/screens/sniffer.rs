use std::time::Duration;

use color_eyre::eyre::Result;

use super::{draw_chrome, nav, navigate, warning_lines, Hit, Payload, Regions, Screen, ScreenContext, Transition};
use crate::{
    capture::{CaptureParams, LiveCapture},
    enums::{NavButton, ScreenId, SnifferMode},
    layout::{content_width, CONTENT_LEFT, CONTENT_TOP},
    widgets::{draw::draw_text_block, InputEvent, Surface},
};

const IFACE: usize = 10;
const PAUSE: usize = 11;
const CLEAR: usize = 12;

/// Pick the payload interface when it exists, else the first that is not loopback.
pub fn preferred_interface(names: &[String], wanted: Option<&str>) -> usize {
    wanted
        .and_then(|w| names.iter().position(|n| n == w))
        .or_else(|| names.iter().position(|n| n != "lo"))
        .unwrap_or(0)
}

pub(super) fn interface_names(ctx: &ScreenContext) -> (Vec<String>, Vec<String>) {
    let fetched = ctx.providers.interfaces();
    let names = fetched.data.into_iter().map(|info| info.name).collect();
    (names, fetched.warnings)
}

pub(super) fn wanted_interface(payload: Option<Payload>) -> Option<String> {
    match payload {
        Some(Payload::Interface(name)) => Some(name),
        _ => None,
    }
}

/// Live packet list fed by a background capture worker.
pub struct SnifferScreen {
    ctx: ScreenContext,
    capture: LiveCapture,
    mode: SnifferMode,
    interfaces: Vec<String>,
    selected: usize,
    warnings: Vec<String>,
    regions: Regions,
}

impl SnifferScreen {
    pub fn new(ctx: &ScreenContext, payload: Option<Payload>) -> Self {
        let (interfaces, warnings) = interface_names(ctx);
        let selected = preferred_interface(&interfaces, wanted_interface(payload).as_deref());
        let mut screen = Self {
            ctx: ctx.clone(),
            capture: LiveCapture::new(ctx.providers.clone()),
            mode: SnifferMode::default(),
            interfaces,
            selected,
            warnings,
            regions: Regions::default(),
        };
        screen.start_capture();
        screen
    }

    fn interface(&self) -> Option<&str> {
        self.interfaces.get(self.selected).map(String::as_str)
    }

    /// Start a worker for the selected interface unless paused or already running.
    fn start_capture(&mut self) {
        if !self.mode.captures() {
            return;
        }
        let Some(interface) = self.interface() else {
            return;
        };
        let settings = &self.ctx.settings;
        let params = CaptureParams {
            interface: interface.to_string(),
            batch: settings.capture_batch,
            interval: Duration::from_millis(settings.capture_interval_ms),
        };
        self.capture.start(params);
    }

    fn next_interface(&mut self) {
        if self.interfaces.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.interfaces.len();
        // A running worker keeps its interface for life; replace it.
        self.capture.stop();
        self.capture.clear();
        self.start_capture();
    }

    fn toggle_pause(&mut self) {
        self.mode = self.mode.toggle();
        if self.mode.captures() {
            self.start_capture();
        } else {
            self.capture.stop();
        }
    }

    fn empty_state(&self) -> String {
        match (self.mode, self.interface()) {
            (_, None) => "No interfaces found".to_string(),
            (SnifferMode::Paused, _) => "Paused".to_string(),
            (SnifferMode::Live, Some(name)) => format!("Waiting for packets on {name}"),
        }
    }
}

impl Screen for SnifferScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Sniffer
    }

    fn title(&self) -> String {
        "Packet Sniffer".to_string()
    }

    fn is_live(&self) -> bool {
        self.mode.captures() && self.capture.is_running()
    }

    fn render(&mut self, surface: &mut dyn Surface) {
        self.capture.drain_into_display();
        let pause = match self.mode {
            SnifferMode::Live => "Pause",
            SnifferMode::Paused => "Resume",
        };
        let footer = format!("{} | {} lines", self.mode, self.capture.display().len());
        let subtitle = self.interface().map(String::from);
        draw_chrome(
            surface,
            &mut self.regions,
            "Packet Sniffer",
            subtitle.as_deref(),
            &footer,
            &[
                ("Iface", IFACE),
                (pause, PAUSE),
                ("Clear", CLEAR),
                nav(NavButton::Back),
                nav(NavButton::Home),
                nav(NavButton::Quit),
            ],
        );

        let width = content_width(surface.size());
        let mut lines = warning_lines(&self.warnings);
        if self.capture.display().is_empty() {
            lines.push(self.empty_state());
        }
        lines.extend(self.capture.display().lines().cloned());
        draw_text_block(surface, CONTENT_TOP, CONTENT_LEFT, width, &lines);
    }

    fn handle_input(&mut self, event: &InputEvent) -> Transition {
        match self.regions.resolve(event) {
            Some(Hit::Nav(button)) => navigate(button, ScreenId::Hacker).unwrap_or(Transition::Stay),
            Some(Hit::Content(IFACE)) => {
                self.next_interface();
                Transition::Stay
            }
            Some(Hit::Content(PAUSE)) => {
                self.toggle_pause();
                Transition::Stay
            }
            Some(Hit::Content(CLEAR)) => {
                self.capture.clear();
                Transition::Stay
            }
            Some(Hit::Content(_)) | None => Transition::Stay,
        }
    }

    fn shutdown(&mut self) -> Result<()> {
        self.capture.stop();
        Ok(())
    }
}
