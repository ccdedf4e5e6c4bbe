use super::{
    draw_chrome, nav, navigate, warning_lines, Hit, Regions, Screen, ScreenContext, TextView, Transition,
    SCROLL_DOWN, SCROLL_UP,
};
use crate::{
    enums::{NavButton, ScreenId},
    layout::CONTENT_TOP,
    providers::{Fetched, Providers},
    widgets::{draw::draw_footer, InputEvent, Surface},
};

/// Read-only pages: one provider call (or a few) rendered as scrollable text.
pub struct InfoScreen {
    id: ScreenId,
    ctx: ScreenContext,
    view: TextView,
    regions: Regions,
}

impl InfoScreen {
    pub fn new(id: ScreenId, ctx: &ScreenContext) -> Self {
        let mut screen = Self {
            id,
            ctx: ctx.clone(),
            view: TextView::default(),
            regions: Regions::default(),
        };
        screen.refresh();
        screen
    }

    fn refresh(&mut self) {
        let providers = self.ctx.providers.as_ref();
        let lines = match self.id {
            ScreenId::Wifi => wifi_lines(providers),
            ScreenId::DnsRoutes => dns_route_lines(providers),
            ScreenId::BtStatus => pair_lines(providers.bluetooth_status(), "No Bluetooth controller found"),
            ScreenId::BtDevices => bluetooth_device_lines(providers),
            ScreenId::SysInfo => pair_lines(providers.system_info(), "No system information available"),
            ScreenId::UsbInterceptor => usb_lines(providers),
            _ => settings_lines(&self.ctx),
        };
        log::debug!("{} loaded {} lines", self.id, lines.len());
        self.view.set_lines(lines);
    }

    fn back(&self) -> ScreenId {
        match self.id {
            ScreenId::Wifi | ScreenId::DnsRoutes => ScreenId::NetHub,
            ScreenId::BtStatus | ScreenId::BtDevices => ScreenId::BtHub,
            ScreenId::UsbInterceptor => ScreenId::Hacker,
            _ => ScreenId::Main,
        }
    }
}

fn with_warnings<T>(fetched: &Fetched<T>) -> Vec<String> {
    warning_lines(&fetched.warnings)
}

fn wifi_lines(providers: &dyn Providers) -> Vec<String> {
    let fetched = providers.wifi_status();
    let mut lines = with_warnings(&fetched);
    if fetched.data.is_empty() {
        lines.push("No wireless interfaces reported".to_string());
    }
    lines.extend(fetched.data);
    lines
}

fn dns_route_lines(providers: &dyn Providers) -> Vec<String> {
    let dns = providers.dns_servers();
    let routes = providers.routes();
    let mut lines = with_warnings(&dns);
    lines.extend(with_warnings(&routes));

    lines.push("[DNS servers]".to_string());
    if dns.data.is_empty() {
        lines.push("  none configured".to_string());
    }
    lines.extend(dns.data.iter().map(|server| format!("  {server}")));

    lines.push("[Default gateway]".to_string());
    lines.push(format!(
        "  {}",
        routes.data.default_gateway.as_deref().unwrap_or("none")
    ));

    lines.push("[Routes]".to_string());
    if routes.data.routes.is_empty() {
        lines.push("  no routes".to_string());
    }
    lines.extend(routes.data.routes.iter().map(|route| format!("  {route}")));
    lines
}

fn pair_lines(fetched: Fetched<Vec<(String, String)>>, empty: &str) -> Vec<String> {
    let mut lines = with_warnings(&fetched);
    if fetched.data.is_empty() {
        lines.push(empty.to_string());
    }
    let key_width = fetched.data.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    lines.extend(
        fetched
            .data
            .iter()
            .map(|(key, value)| format!("{:<key_width$}  {value}", format!("{key}:"), key_width = key_width + 1)),
    );
    lines
}

fn bluetooth_device_lines(providers: &dyn Providers) -> Vec<String> {
    let fetched = providers.bluetooth_devices();
    let mut lines = with_warnings(&fetched);
    if fetched.data.is_empty() {
        lines.push("No known Bluetooth devices".to_string());
    }
    lines.extend(
        fetched
            .data
            .iter()
            .map(|device| format!("{}  {}", device.mac, device.name)),
    );
    lines
}

fn usb_lines(providers: &dyn Providers) -> Vec<String> {
    let usb = providers.usb_devices();
    let keyboards = providers.libinput_keyboards();
    let mut lines = with_warnings(&usb);
    lines.extend(with_warnings(&keyboards));

    lines.push("[USB devices]".to_string());
    if usb.data.is_empty() {
        lines.push("  no USB devices found".to_string());
    }
    lines.extend(usb.data.iter().map(|device| {
        let flag = if device.keyboard { "KBD" } else { "   " };
        format!(
            "  {flag} {}:{} {} {}",
            device.bus, device.device, device.id, device.description
        )
    }));

    lines.push("[libinput keyboards]".to_string());
    if keyboards.data.is_empty() {
        lines.push("  none reported".to_string());
    }
    lines.extend(keyboards.data.iter().map(|name| format!("  {name}")));
    lines
}

fn settings_lines(ctx: &ScreenContext) -> Vec<String> {
    let config_dir = crate::utils::get_config_dir();
    let log_file = crate::utils::get_data_dir().join(crate::utils::LOG_FILE.as_str());
    let mut lines = vec!["[Effective settings]".to_string()];
    let rows = ctx.settings.describe();
    let key_width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    lines.extend(
        rows.iter()
            .map(|(key, value)| format!("  {key:<key_width$}  {value}")),
    );
    lines.push("[Files]".to_string());
    lines.push(format!("  Config dir  {}", config_dir.display()));
    lines.push(format!("  Log file    {}", log_file.display()));
    lines
}

impl Screen for InfoScreen {
    fn id(&self) -> ScreenId {
        self.id
    }

    fn title(&self) -> String {
        match self.id {
            ScreenId::Wifi => "WLAN",
            ScreenId::DnsRoutes => "DNS & Routes",
            ScreenId::BtStatus => "Bluetooth Status",
            ScreenId::BtDevices => "Bluetooth Devices",
            ScreenId::SysInfo => "System Info",
            ScreenId::UsbInterceptor => "USB Devices",
            _ => "Settings",
        }
        .to_string()
    }

    fn render(&mut self, surface: &mut dyn Surface) {
        let title = self.title();
        draw_chrome(
            surface,
            &mut self.regions,
            &title,
            None,
            "",
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
        draw_footer(surface, &self.view.position());
    }

    fn handle_input(&mut self, event: &InputEvent) -> Transition {
        match self.regions.resolve(event) {
            Some(Hit::Nav(NavButton::Refresh)) => {
                self.refresh();
                Transition::Stay
            }
            Some(Hit::Nav(button)) => navigate(button, self.back()).unwrap_or(Transition::Stay),
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
    use super::*;
    use crate::providers::{fake::FakeProviders, BluetoothDevice, RouteTable, UsbDevice};
    use crate::config::DashboardSettings;
    use crate::screens::testing::{content_rows, context, render};
    use std::sync::Arc;
    use crate::widgets::click::testing::tap_region;
    use pretty_assertions::assert_eq;

    #[test]
    fn dns_and_routes_are_sectioned() {
        let ctx = context(FakeProviders {
            dns: Fetched::ok(vec!["192.168.1.1".into()]),
            routes: Fetched::ok(RouteTable {
                default_gateway: Some("192.168.1.1".into()),
                routes: vec!["default via 192.168.1.1 dev eth0".into()],
            }),
            ..FakeProviders::default()
        });
        let mut screen = InfoScreen::new(ScreenId::DnsRoutes, &ctx);
        assert_eq!(
            content_rows(&mut screen),
            vec![
                "  [DNS servers]",
                "    192.168.1.1",
                "  [Default gateway]",
                "    192.168.1.1",
                "  [Routes]",
                "    default via 192.168.1.1 dev eth0",
            ]
        );
    }

    #[test]
    fn unavailable_tool_shows_the_warning_and_an_empty_state() {
        let ctx = context(FakeProviders {
            wifi: Fetched::warning("iw is not available (install with: sudo apt install iw)"),
            ..FakeProviders::default()
        });
        let mut screen = InfoScreen::new(ScreenId::Wifi, &ctx);
        let rows = content_rows(&mut screen);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("⚠ iw is not available"));
        assert!(rows[1].contains("No wireless interfaces reported"));
    }

    #[test]
    fn key_value_pairs_are_aligned() {
        let lines = pair_lines(
            Fetched::ok(vec![
                ("Name".into(), "pi".into()),
                ("Powered".into(), "yes".into()),
            ]),
            "none",
        );
        assert_eq!(lines, vec!["Name:     pi", "Powered:  yes"]);
    }

    #[test]
    fn usb_keyboards_are_flagged() {
        let ctx = context(FakeProviders {
            usb: Fetched::ok(vec![UsbDevice {
                bus: "001".into(),
                device: "004".into(),
                id: "046d:c31c".into(),
                description: "Logitech Keyboard K120".into(),
                keyboard: true,
            }]),
            libinput: Fetched::ok(vec!["Logitech USB Keyboard".into()]),
            ..FakeProviders::default()
        });
        let screen = InfoScreen::new(ScreenId::UsbInterceptor, &ctx);
        assert!(screen.view.lines().contains(&"  KBD 001:004 046d:c31c Logitech Keyboard K120".to_string()));
        assert!(screen.view.lines().contains(&"  Logitech USB Keyboard".to_string()));
    }

    #[test]
    fn refresh_reloads_and_back_goes_to_the_hub() {
        let providers = Arc::new(FakeProviders {
            bluetooth_devices: Fetched::ok(vec![BluetoothDevice {
                mac: "00:1A:7D:DA:71:13".into(),
                name: "K380".into(),
            }]),
            ..FakeProviders::default()
        });
        let ctx = ScreenContext::new(providers.clone(), DashboardSettings::default());
        let mut screen = InfoScreen::new(ScreenId::BtDevices, &ctx);
        render(&mut screen);
        assert_eq!(screen.view.lines(), ["00:1A:7D:DA:71:13  K380".to_string()]);

        let refresh = screen.regions.nav()[0];
        assert_eq!(screen.handle_input(&tap_region(&refresh)), Transition::Stay);
        assert_eq!(providers.calls(), vec!["bluetooth_devices", "bluetooth_devices"]);

        let back = screen.regions.nav()[1];
        assert_eq!(screen.handle_input(&tap_region(&back)), Transition::to(ScreenId::BtHub));
    }
}
