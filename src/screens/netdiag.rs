use super::{
    draw_chrome, nav, navigate, warning_lines, Hit, Payload, Regions, Screen, ScreenContext, TextView,
    Transition, SCROLL_DOWN, SCROLL_UP,
};
use crate::{
    enums::{NavButton, ScreenId},
    layout::{content_width, CONTENT_TOP, MENU_LEFT, MENU_TOP},
    providers::InterfaceStats,
    widgets::{draw::draw_menu, InputEvent, Surface},
};

const DETAILS: usize = 100;

/// Interface picker for the diagnostics detail screen.
pub struct NetDiagScreen {
    ctx: ScreenContext,
    names: Vec<String>,
    warnings: Vec<String>,
    selected: Option<usize>,
    touch_mode: bool,
    regions: Regions,
}

impl NetDiagScreen {
    /// An `Interface` payload restores the selection, when that interface still exists.
    pub fn new(ctx: &ScreenContext, payload: Option<Payload>) -> Self {
        let mut screen = Self {
            ctx: ctx.clone(),
            names: Vec::new(),
            warnings: Vec::new(),
            selected: None,
            touch_mode: false,
            regions: Regions::default(),
        };
        screen.refresh();
        if let Some(Payload::Interface(name)) = payload {
            screen.selected = screen.names.iter().position(|n| *n == name);
        }
        screen
    }

    fn refresh(&mut self) {
        let previous = self.selected_name().map(String::from);
        let fetched = self.ctx.providers.interfaces();
        self.names = fetched.data.into_iter().map(|info| info.name).collect();
        self.warnings = fetched.warnings;
        self.selected = previous.and_then(|name| self.names.iter().position(|n| *n == name));
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected
            .and_then(|index| self.names.get(index))
            .map(String::as_str)
    }
}

impl Screen for NetDiagScreen {
    fn id(&self) -> ScreenId {
        ScreenId::NetDiag
    }

    fn title(&self) -> String {
        "Diagnostics".to_string()
    }

    fn set_touch_mode(&mut self, enabled: bool) {
        self.touch_mode = enabled;
    }

    fn render(&mut self, surface: &mut dyn Surface) {
        let selected = self.selected_name().map(String::from);
        let footer = match &selected {
            Some(name) => format!("Selected {name}, tap Details"),
            None => "Tap an interface, then Details".to_string(),
        };
        draw_chrome(
            surface,
            &mut self.regions,
            "Diagnostics",
            selected.as_deref(),
            &footer,
            &[
                ("Details", DETAILS),
                nav(NavButton::Refresh),
                nav(NavButton::Back),
                nav(NavButton::Home),
                nav(NavButton::Quit),
            ],
        );
        let width = content_width(surface.size());
        let mut notes = warning_lines(&self.warnings);
        if self.names.is_empty() {
            notes.push("No interfaces found".to_string());
        } else {
            notes.push("Select an interface:".to_string());
        }
        // Warnings and the prompt share the rows above the menu.
        for (i, line) in notes.iter().take((MENU_TOP - CONTENT_TOP) as usize).enumerate() {
            surface.put(CONTENT_TOP + i as u16, MENU_LEFT - 2, line, width, Default::default());
        }
        let items = draw_menu(
            surface,
            MENU_TOP,
            MENU_LEFT,
            width.saturating_sub(MENU_LEFT),
            &self.names,
            self.selected,
            self.touch_mode,
        );
        self.regions.add(items);
    }

    fn handle_input(&mut self, event: &InputEvent) -> Transition {
        match self.regions.resolve(event) {
            Some(Hit::Nav(NavButton::Refresh)) => {
                self.refresh();
                Transition::Stay
            }
            Some(Hit::Nav(button)) => navigate(button, ScreenId::NetHub).unwrap_or(Transition::Stay),
            Some(Hit::Content(DETAILS)) => {
                // No valid selection still opens the detail screen, which then shows nothing.
                let name = self.selected_name().unwrap_or_default().to_string();
                Transition::with(ScreenId::NetDiagDetail, Payload::Interface(name))
            }
            Some(Hit::Content(index)) if index < self.names.len() => {
                self.selected = Some(index);
                Transition::Stay
            }
            _ => Transition::Stay,
        }
    }
}

/// Everything known about one interface, plus a ping through it.
pub struct DetailScreen {
    ctx: ScreenContext,
    interface: String,
    view: TextView,
    regions: Regions,
}

pub fn detail_lines(stats: &InterfaceStats, dns: &[String], ping_host: &str) -> Vec<String> {
    let info = &stats.info;
    let mut lines = vec![
        "[Interface]".to_string(),
        format!("  Name   {}", info.name),
        format!("  State  {}", info.state.as_deref().unwrap_or("?")),
        format!("  MTU    {}", info.mtu.as_deref().unwrap_or("?")),
        format!("  MAC    {}", info.mac.as_deref().unwrap_or("none")),
    ];
    lines.extend(info.ipv4.iter().map(|a| format!("  IPv4   {a}")));
    lines.extend(info.ipv6.iter().map(|a| format!("  IPv6   {a}")));
    if !info.has_address() {
        lines.push("  no addresses".to_string());
    }

    lines.push("[Gateway]".to_string());
    lines.push(format!("  {}", stats.gateway.as_deref().unwrap_or("none")));

    lines.push("[DNS]".to_string());
    if dns.is_empty() {
        lines.push("  none configured".to_string());
    }
    lines.extend(dns.iter().map(|server| format!("  {server}")));

    lines.push(format!("[Ping {ping_host}]"));
    match &stats.ping {
        Some(ping) => {
            let verdict = if ping.reachable { "reachable" } else { "unreachable" };
            lines.push(format!("  {verdict}"));
            if let Some(summary) = ping.output.lines().rev().find(|l| !l.trim().is_empty()) {
                lines.push(format!("  {}", summary.trim()));
            }
        }
        None => lines.push("  skipped, no address".to_string()),
    }
    lines
}

impl DetailScreen {
    pub fn new(ctx: &ScreenContext, payload: Option<Payload>) -> Self {
        let interface = match payload {
            Some(Payload::Interface(name)) => name,
            _ => String::new(),
        };
        let mut screen = Self {
            ctx: ctx.clone(),
            interface,
            view: TextView::default(),
            regions: Regions::default(),
        };
        screen.refresh();
        screen
    }

    fn refresh(&mut self) {
        if self.interface.is_empty() {
            self.view.set_lines(vec!["No interface selected".to_string()]);
            return;
        }
        let providers = self.ctx.providers.as_ref();
        let stats = providers.interface_stats(&self.interface);
        let dns = providers.dns_servers();
        let mut lines = warning_lines(&stats.warnings);
        lines.extend(warning_lines(&dns.warnings));
        match &stats.data {
            Some(data) => lines.extend(detail_lines(data, &dns.data, &self.ctx.settings.ping_host)),
            None => lines.push(format!("No data for {}", self.interface)),
        }
        self.view.set_lines(lines);
    }
}

impl Screen for DetailScreen {
    fn id(&self) -> ScreenId {
        ScreenId::NetDiagDetail
    }

    fn title(&self) -> String {
        "Interface Detail".to_string()
    }

    fn render(&mut self, surface: &mut dyn Surface) {
        let subtitle = (!self.interface.is_empty()).then_some(self.interface.as_str());
        draw_chrome(
            surface,
            &mut self.regions,
            "Interface Detail",
            subtitle,
            "Back returns to the interface list",
            &[
                ("▲", SCROLL_UP),
                ("▼", SCROLL_DOWN),
                nav(NavButton::Refresh),
                nav(NavButton::Back),
                nav(NavButton::Home),
                nav(NavButton::Quit),
            ],
        );
        self.view.draw(surface, CONTENT_TOP);
    }

    fn handle_input(&mut self, event: &InputEvent) -> Transition {
        match self.regions.resolve(event) {
            Some(Hit::Nav(NavButton::Refresh)) => {
                self.refresh();
                Transition::Stay
            }
            Some(Hit::Nav(NavButton::Back)) => {
                Transition::with(ScreenId::NetDiag, Payload::Interface(self.interface.clone()))
            }
            Some(Hit::Nav(button)) => navigate(button, ScreenId::NetDiag).unwrap_or(Transition::Stay),
            Some(Hit::Content(action)) => {
                self.view.scroll(action);
                Transition::Stay
            }
            None => Transition::Stay,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::providers::{
        fake::{iface, FakeProviders},
        Fetched, InterfaceInfo, PingResult,
    };
    use crate::screens::testing::{content_rows, context, render};
    use crate::widgets::click::testing::tap_region;
    use pretty_assertions::assert_eq;

    fn three_interfaces() -> FakeProviders {
        let mut providers = FakeProviders::with_interfaces(vec![
            iface("eth0", &["192.168.1.20/24"]),
            iface("lo", &["127.0.0.1/8"]),
            iface("wlan0", &["192.168.1.30/24"]),
        ]);
        providers.stats = HashMap::from([(
            "wlan0".to_string(),
            InterfaceStats {
                info: iface("wlan0", &["192.168.1.30/24"]),
                gateway: Some("192.168.1.1".into()),
                ping: Some(PingResult {
                    reachable: true,
                    output: "1 packets transmitted, 1 received\nrtt min/avg/max/mdev = 9.1/9.1/9.1/0.0 ms\n".into(),
                }),
            },
        )]);
        providers.dns = Fetched::ok(vec!["192.168.1.1".into()]);
        providers
    }

    fn details_button(screen: &NetDiagScreen) -> crate::widgets::ClickRegion {
        *screen
            .regions
            .content()
            .iter()
            .find(|r| r.action_id == DETAILS)
            .unwrap()
    }

    #[test]
    fn selecting_and_opening_details_carries_the_interface() {
        let ctx = context(three_interfaces());
        let mut list = NetDiagScreen::new(&ctx, None);
        list.set_touch_mode(true);
        render(&mut list);
        let wlan0 = *list.regions.content().iter().find(|r| r.action_id == 2).unwrap();
        assert_eq!(list.handle_input(&tap_region(&wlan0)), Transition::Stay);
        assert_eq!(list.selected_name(), Some("wlan0"));

        render(&mut list);
        assert_eq!(
            list.handle_input(&tap_region(&details_button(&list))),
            Transition::with(ScreenId::NetDiagDetail, Payload::Interface("wlan0".into()))
        );
    }

    #[test]
    fn details_without_selection_carries_an_empty_name() {
        let ctx = context(three_interfaces());
        let mut list = NetDiagScreen::new(&ctx, None);
        render(&mut list);
        let transition = list.handle_input(&tap_region(&details_button(&list)));
        assert_eq!(
            transition,
            Transition::with(ScreenId::NetDiagDetail, Payload::Interface(String::new()))
        );

        let mut detail = DetailScreen::new(&ctx, Some(Payload::Interface(String::new())));
        assert_eq!(content_rows(&mut detail), vec!["  No interface selected"]);
    }

    #[test]
    fn payload_restores_the_selection() {
        let ctx = context(three_interfaces());
        let list = NetDiagScreen::new(&ctx, Some(Payload::Interface("wlan0".into())));
        assert_eq!(list.selected, Some(2));
        let gone = NetDiagScreen::new(&ctx, Some(Payload::Interface("eth9".into())));
        assert_eq!(gone.selected, None);
    }

    #[test]
    fn detail_shows_gateway_dns_and_ping() {
        let ctx = context(three_interfaces());
        let mut detail = DetailScreen::new(&ctx, Some(Payload::Interface("wlan0".into())));
        let rows = render(&mut detail);
        assert!(rows[0].contains("wlan0"));
        let lines = detail.view.lines().to_vec();
        assert!(lines.contains(&"  IPv4   192.168.1.30/24".to_string()));
        assert!(lines.contains(&"[Gateway]".to_string()));
        assert!(lines.contains(&"[Ping 1.1.1.1]".to_string()));
        assert!(lines.contains(&"  reachable".to_string()));
        assert!(lines.contains(&"  rtt min/avg/max/mdev = 9.1/9.1/9.1/0.0 ms".to_string()));
    }

    #[test]
    fn unknown_interface_shows_the_warning() {
        let ctx = context(three_interfaces());
        let mut detail = DetailScreen::new(&ctx, Some(Payload::Interface("eth0".into())));
        assert_eq!(
            content_rows(&mut detail),
            vec!["  ⚠ Interface eth0 not found", "  No data for eth0"]
        );
    }

    #[test]
    fn back_returns_to_the_list_with_the_interface() {
        let ctx = context(three_interfaces());
        let mut detail = DetailScreen::new(&ctx, Some(Payload::Interface("wlan0".into())));
        render(&mut detail);
        let back = detail.regions.nav()[1];
        assert_eq!(
            detail.handle_input(&tap_region(&back)),
            Transition::with(ScreenId::NetDiag, Payload::Interface("wlan0".into()))
        );
    }

    #[test]
    fn interface_without_address_skips_ping() {
        let stats = InterfaceStats {
            info: InterfaceInfo {
                name: "eth1".into(),
                ..InterfaceInfo::default()
            },
            gateway: None,
            ping: None,
        };
        let lines = detail_lines(&stats, &[], "1.1.1.1");
        assert!(lines.contains(&"  no addresses".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("  skipped, no address"));
    }
}
