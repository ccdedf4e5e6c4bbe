use super::{
    draw_chrome, nav, navigate, warning_lines, Hit, Payload, Regions, Screen, ScreenContext, Transition,
    SCROLL_DOWN, SCROLL_UP,
};
use crate::{
    enums::{NavButton, ScreenId},
    layout::{content_width, visible_rows, CONTENT_LEFT, CONTENT_TOP},
    providers::InterfaceInfo,
    widgets::{draw::draw_text_block, ClickRegion, InputEvent, Surface},
};

pub const EMPTY_STATE: &str = "No interfaces found";

/// One tappable block per interface; a tap opens its diagnostics.
pub struct InterfacesScreen {
    ctx: ScreenContext,
    interfaces: Vec<InterfaceInfo>,
    warnings: Vec<String>,
    first: usize,
    regions: Regions,
}

pub fn interface_block(info: &InterfaceInfo) -> Vec<String> {
    let mut lines = vec![format!(
        "[{}] {}{}",
        info.name,
        info.state.as_deref().unwrap_or("?"),
        info.mtu
            .as_deref()
            .map(|mtu| format!("  mtu {mtu}"))
            .unwrap_or_default()
    )];
    if let Some(mac) = &info.mac {
        lines.push(format!("  MAC   {mac}"));
    }
    lines.extend(info.ipv4.iter().map(|a| format!("  IPv4  {a}")));
    lines.extend(info.ipv6.iter().map(|a| format!("  IPv6  {a}")));
    if !info.has_address() {
        lines.push("  no addresses".to_string());
    }
    lines
}

impl InterfacesScreen {
    pub fn new(ctx: &ScreenContext) -> Self {
        let mut screen = Self {
            ctx: ctx.clone(),
            interfaces: Vec::new(),
            warnings: Vec::new(),
            first: 0,
            regions: Regions::default(),
        };
        screen.refresh();
        screen
    }

    fn refresh(&mut self) {
        let fetched = self.ctx.providers.interfaces();
        self.interfaces = fetched.data;
        self.warnings = fetched.warnings;
        self.first = 0;
    }

    fn footer(&self) -> String {
        match self.interfaces.len() {
            0 => "Refresh to try again".to_string(),
            n => format!("{n} interfaces, tap one for diagnostics"),
        }
    }
}

impl Screen for InterfacesScreen {
    fn id(&self) -> ScreenId {
        ScreenId::Interfaces
    }

    fn title(&self) -> String {
        "Interfaces".to_string()
    }

    fn render(&mut self, surface: &mut dyn Surface) {
        let footer = self.footer();
        draw_chrome(
            surface,
            &mut self.regions,
            "Interfaces",
            None,
            &footer,
            &[
                ("▲", SCROLL_UP),
                ("▼", SCROLL_DOWN),
                nav(NavButton::Refresh),
                nav(NavButton::Back),
                nav(NavButton::Home),
                nav(NavButton::Quit),
            ],
        );
        let size = surface.size();
        let width = content_width(size);
        let bottom = CONTENT_TOP + visible_rows(size, CONTENT_TOP);

        let mut y = CONTENT_TOP;
        y += draw_text_block(surface, y, CONTENT_LEFT, width, &warning_lines(&self.warnings)) as u16;
        if self.interfaces.is_empty() {
            draw_text_block(surface, y, CONTENT_LEFT, width, &[EMPTY_STATE.to_string()]);
            return;
        }

        let mut blocks = Vec::new();
        for (index, info) in self.interfaces.iter().enumerate().skip(self.first) {
            if y >= bottom {
                break;
            }
            let shown = draw_text_block(surface, y, CONTENT_LEFT, width, &interface_block(info)) as u16;
            if shown == 0 {
                break;
            }
            blocks.push(ClickRegion::new(
                y,
                y + shown - 1,
                CONTENT_LEFT,
                CONTENT_LEFT + width.saturating_sub(1),
                index,
            ));
            y += shown + 1;
        }
        self.regions.add(blocks);
    }

    fn handle_input(&mut self, event: &InputEvent) -> Transition {
        match self.regions.resolve(event) {
            Some(Hit::Nav(NavButton::Refresh)) => {
                self.refresh();
                Transition::Stay
            }
            Some(Hit::Nav(button)) => navigate(button, ScreenId::NetHub).unwrap_or(Transition::Stay),
            Some(Hit::Content(SCROLL_UP)) => {
                self.first = self.first.saturating_sub(1);
                Transition::Stay
            }
            Some(Hit::Content(SCROLL_DOWN)) => {
                if self.first + 1 < self.interfaces.len() {
                    self.first += 1;
                }
                Transition::Stay
            }
            Some(Hit::Content(index)) => match self.interfaces.get(index) {
                Some(info) => Transition::with(ScreenId::NetDiagDetail, Payload::Interface(info.name.clone())),
                None => Transition::Stay,
            },
            None => Transition::Stay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{
        fake::{iface, FakeProviders},
        Fetched,
    };
    use crate::screens::testing::{content_rows, context, render};
    use crate::widgets::click::testing::{tap, tap_region};
    use pretty_assertions::assert_eq;

    fn interface_regions(screen: &InterfacesScreen) -> Vec<ClickRegion> {
        screen
            .regions
            .content()
            .iter()
            .filter(|r| r.action_id < SCROLL_UP)
            .copied()
            .collect()
    }

    #[test]
    fn empty_list_with_warning_shows_both_and_no_regions() {
        let ctx = context(FakeProviders {
            interfaces: Fetched::warning("ip addr: unknown error"),
            ..FakeProviders::default()
        });
        let mut screen = InterfacesScreen::new(&ctx);
        let rows = content_rows(&mut screen);
        assert_eq!(rows, vec!["  ⚠ ip addr: unknown error", "  No interfaces found"]);
        assert!(interface_regions(&screen).is_empty());
    }

    #[test]
    fn each_interface_is_a_block_opening_its_detail() {
        let ctx = context(FakeProviders::with_interfaces(vec![
            iface("eth0", &["192.168.1.20/24"]),
            iface("wlan0", &[]),
        ]));
        let mut screen = InterfacesScreen::new(&ctx);
        let rows = content_rows(&mut screen);
        assert_eq!(
            rows,
            vec![
                "  [eth0] UP",
                "    IPv4  192.168.1.20/24",
                "  [wlan0] UP",
                "    no addresses",
            ]
        );
        let regions = interface_regions(&screen);
        assert_eq!(regions.len(), 2);
        assert_eq!((regions[0].y_start, regions[0].y_end), (2, 3));
        assert_eq!(
            screen.handle_input(&tap_region(&regions[1])),
            Transition::with(ScreenId::NetDiagDetail, Payload::Interface("wlan0".into()))
        );
        // The blank row between blocks belongs to neither.
        assert_eq!(screen.handle_input(&tap(10, 4)), Transition::Stay);
    }

    #[test]
    fn blocks_that_do_not_fit_get_no_region() {
        let many: Vec<_> = (0..10).map(|i| iface(&format!("veth{i}"), &["10.0.0.1/8"])).collect();
        let ctx = context(FakeProviders::with_interfaces(many));
        let mut screen = InterfacesScreen::new(&ctx);
        render(&mut screen);
        let regions = interface_regions(&screen);
        assert!(regions.len() < 10);
        assert!(regions.iter().all(|r| r.y_end < 21));
    }

    #[test]
    fn block_lists_all_details() {
        let info = InterfaceInfo {
            name: "eth0".into(),
            state: Some("UP".into()),
            mac: Some("b8:27:eb:11:22:33".into()),
            ipv4: vec!["192.168.1.20/24".into()],
            ipv6: vec!["fe80::1/64".into()],
            mtu: Some("1500".into()),
        };
        assert_eq!(
            interface_block(&info),
            vec![
                "[eth0] UP  mtu 1500",
                "  MAC   b8:27:eb:11:22:33",
                "  IPv4  192.168.1.20/24",
                "  IPv6  fe80::1/64",
            ]
        );
    }
}
