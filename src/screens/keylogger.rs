use super::{draw_chrome, nav, navigate, warning_lines, Hit, Regions, Screen, ScreenContext, Transition};
use crate::{
    enums::{NavButton, ScreenId},
    layout::{content_width, CONTENT_LEFT, MENU_LEFT, MENU_TOP},
    providers::{tools::keys_to_text, InputDevice},
    widgets::{
        draw::{draw_menu, draw_text_block},
        InputEvent, Surface,
    },
};

pub const MAX_DEVICES: usize = 4;
pub const NO_KEYBOARDS: &str = "No keyboard devices found";

/// Lists keyboards; tapping one records a short evtest session from it.
pub struct KeyloggerScreen {
    ctx: ScreenContext,
    devices: Vec<InputDevice>,
    warnings: Vec<String>,
    selected: Option<usize>,
    result: Vec<String>,
    touch_mode: bool,
    regions: Regions,
}

impl KeyloggerScreen {
    pub fn new(ctx: &ScreenContext) -> Self {
        let mut screen = Self {
            ctx: ctx.clone(),
            devices: Vec::new(),
            warnings: Vec::new(),
            selected: None,
            result: Vec::new(),
            touch_mode: false,
            regions: Regions::default(),
        };
        screen.refresh();
        screen
    }

    fn refresh(&mut self) {
        let fetched = self.ctx.providers.input_devices();
        self.devices = fetched
            .data
            .into_iter()
            .filter(|device| device.keyboard)
            .take(MAX_DEVICES)
            .collect();
        self.warnings = fetched.warnings;
        self.selected = None;
        self.result.clear();
    }

    fn record(&mut self, index: usize) {
        let Some(device) = self.devices.get(index) else {
            return;
        };
        log::info!("Recording keystrokes from {} ({})", device.name, device.path);
        let fetched = self.ctx.providers.capture_keystrokes(&device.path);
        let mut lines = warning_lines(&fetched.warnings);
        if fetched.data.is_empty() {
            lines.push(format!(
                "No key presses in {}s",
                self.ctx.settings.keystroke_capture_secs
            ));
        } else {
            lines.push(format!("Keys: {}", fetched.data.join(" ")));
            lines.push(format!("Text: {}", keys_to_text(&fetched.data)));
        }
        self.selected = Some(index);
        self.result = lines;
    }
}

impl Screen for KeyloggerScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Keylogger
    }

    fn title(&self) -> String {
        "Keystroke Monitor".to_string()
    }

    fn set_touch_mode(&mut self, enabled: bool) {
        self.touch_mode = enabled;
    }

    fn render(&mut self, surface: &mut dyn Surface) {
        let footer = format!(
            "Tap a keyboard to record {}s",
            self.ctx.settings.keystroke_capture_secs
        );
        draw_chrome(
            surface,
            &mut self.regions,
            "Keystroke Monitor",
            None,
            &footer,
            &[
                nav(NavButton::Refresh),
                nav(NavButton::Back),
                nav(NavButton::Home),
                nav(NavButton::Quit),
            ],
        );
        let size = surface.size();
        let width = content_width(size);
        let mut lines = warning_lines(&self.warnings);
        if self.devices.is_empty() {
            lines.push(NO_KEYBOARDS.to_string());
            draw_text_block(surface, MENU_TOP - 2, CONTENT_LEFT, width, &lines);
            return;
        }
        draw_text_block(surface, MENU_TOP - 2, CONTENT_LEFT, width, &lines);

        let labels: Vec<String> = self
            .devices
            .iter()
            .map(|device| format!("{} ({})", device.name, device.path))
            .collect();
        let items = draw_menu(
            surface,
            MENU_TOP,
            MENU_LEFT,
            width.saturating_sub(MENU_LEFT),
            &labels,
            self.selected,
            self.touch_mode,
        );
        let item_height = if self.touch_mode { 2 } else { 1 };
        let below = MENU_TOP + (items.len() as u16) * item_height + 1;
        self.regions.add(items);
        draw_text_block(surface, below, CONTENT_LEFT, width, &self.result);
    }

    fn handle_input(&mut self, event: &InputEvent) -> Transition {
        match self.regions.resolve(event) {
            Some(Hit::Nav(NavButton::Refresh)) => {
                self.refresh();
                Transition::Stay
            }
            Some(Hit::Nav(button)) => navigate(button, ScreenId::Hacker).unwrap_or(Transition::Stay),
            Some(Hit::Content(index)) => {
                self.record(index);
                Transition::Stay
            }
            None => Transition::Stay,
        }
    }
}
