use ratatui::style::{Modifier, Style};

use super::{draw_chrome, nav, navigate, Hit, Payload, Regions, Screen, Transition};
use crate::{
    enums::{NavButton, ScreenId},
    layout::{content_width, CONTENT_LEFT, CONTENT_TOP},
    providers::tools::is_valid_port_range,
    widgets::{ClickRegion, InputEvent, Surface},
};

const DASH: usize = 10;
const COMMA: usize = 11;
const BACKSPACE: usize = 12;
const CLEAR: usize = 13;
const OK: usize = 20;
const CANCEL: usize = 21;

const KEY_WIDTH: u16 = 8;
const KEY_GAP: u16 = 2;

/// Keys in display order, four rows of three plus a row of two.
const LAYOUT: [&[(&str, usize)]; 5] = [
    &[("1", 1), ("2", 2), ("3", 3)],
    &[("4", 4), ("5", 5), ("6", 6)],
    &[("7", 7), ("8", 8), ("9", 9)],
    &[("-", DASH), ("0", 0), (",", COMMA)],
    &[("⌫", BACKSPACE), ("C", CLEAR)],
];

/// Text accumulated from keypad taps: digits, and `-`/`,` separators.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PortInput {
    value: String,
}

impl PortInput {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn push_digit(&mut self, digit: char) {
        if digit.is_ascii_digit() {
            self.value.push(digit);
        }
    }

    /// A separator never follows another separator.
    pub fn push_separator(&mut self, separator: char) {
        if !matches!(separator, '-' | ',') || self.value.ends_with(['-', ',']) {
            return;
        }
        self.value.push(separator);
    }

    pub fn backspace(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }
}

/// Virtual keypad for a custom nmap port range.
pub struct KeypadScreen {
    input: PortInput,
    target: Option<String>,
    error: Option<String>,
    touch_mode: bool,
    regions: Regions,
}

impl KeypadScreen {
    /// An `Interface` payload is the scan target to hand back with the range.
    pub fn new(payload: Option<Payload>) -> Self {
        let target = match payload {
            Some(Payload::Interface(target)) => Some(target),
            Some(Payload::PortRange { target, .. }) => target,
            None => None,
        };
        Self {
            input: PortInput::default(),
            target,
            error: None,
            touch_mode: false,
            regions: Regions::default(),
        }
    }

    fn press(&mut self, key: usize) -> Transition {
        self.error = None;
        match key {
            0..=9 => {
                if let Some(digit) = char::from_digit(key as u32, 10) {
                    self.input.push_digit(digit);
                }
            }
            DASH => self.input.push_separator('-'),
            COMMA => self.input.push_separator(','),
            BACKSPACE => self.input.backspace(),
            CLEAR => self.input.clear(),
            OK => return self.confirm(),
            CANCEL => return Transition::to(ScreenId::PortScan),
            _ => {}
        }
        Transition::Stay
    }

    fn confirm(&mut self) -> Transition {
        let range = self.input.value().to_string();
        if !is_valid_port_range(&range) {
            self.error = Some(format!("'{range}' is not a valid port range"));
            return Transition::Stay;
        }
        Transition::with(
            ScreenId::PortScan,
            Payload::PortRange {
                range,
                target: self.target.clone(),
            },
        )
    }
}

impl Screen for KeypadScreen {
    fn id(&self) -> ScreenId {
        ScreenId::CustomPortInput
    }

    fn title(&self) -> String {
        "Port Range".to_string()
    }

    fn set_touch_mode(&mut self, enabled: bool) {
        self.touch_mode = enabled;
    }

    fn render(&mut self, surface: &mut dyn Surface) {
        draw_chrome(
            surface,
            &mut self.regions,
            "Port Range",
            self.target.as_deref(),
            "e.g. 22,80,8000-8100",
            &[("OK", OK), ("Cancel", CANCEL), nav(NavButton::Home), nav(NavButton::Quit)],
        );
        let width = content_width(surface.size());
        let bold = Style::default().add_modifier(Modifier::BOLD);
        surface.put(
            CONTENT_TOP,
            CONTENT_LEFT,
            &format!("Ports: {}_", self.input.value()),
            width,
            bold,
        );
        if let Some(error) = &self.error {
            surface.put(CONTENT_TOP + 1, CONTENT_LEFT, error, width, Default::default());
        }

        let key_height: u16 = if self.touch_mode { 2 } else { 1 };
        let mut keys = Vec::new();
        for (row, layout_row) in LAYOUT.iter().enumerate() {
            let y = CONTENT_TOP + 2 + row as u16 * key_height;
            for (col, (label, key)) in layout_row.iter().enumerate() {
                let x = CONTENT_LEFT + col as u16 * (KEY_WIDTH + KEY_GAP);
                let text = format!("[{label:^width$}]", width = (KEY_WIDTH - 2) as usize);
                if surface.put(y, x, &text, KEY_WIDTH, bold) < KEY_WIDTH {
                    continue;
                }
                keys.push(ClickRegion::new(y, y + key_height - 1, x, x + KEY_WIDTH - 1, *key));
            }
        }
        self.regions.add(keys);
    }

    fn handle_input(&mut self, event: &InputEvent) -> Transition {
        match self.regions.resolve(event) {
            Some(Hit::Nav(button)) => navigate(button, ScreenId::PortScan).unwrap_or(Transition::Stay),
            Some(Hit::Content(key)) => self.press(key),
            None => Transition::Stay,
        }
    }
}
