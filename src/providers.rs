//! Data providers: one blocking call per information category.
//!
//! Each call returns a [`Fetched`] value holding whatever could be gathered
//! plus an ordered list of human readable warnings, so a screen can show
//! partial results next to what went wrong. Providers never return errors and
//! never panic on unexpected command output; unparseable output simply yields
//! no data.
//!
//! [`SystemProviders`] is the production implementation. It shells out through
//! a [`CommandRunner`] and reads a few files under `/proc`, `/sys` and `/etc`.

use std::{sync::Arc, time::Duration};

use crate::{config::DashboardSettings, runner::CommandRunner};

pub mod bluetooth;
pub mod network;
pub mod system;
pub mod tools;

#[cfg(test)]
pub mod fake;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fetched<T> {
    pub data: T,
    pub warnings: Vec<String>,
}

impl<T> Fetched<T> {
    pub fn new(data: T, warnings: Vec<String>) -> Self {
        Self { data, warnings }
    }

    pub fn ok(data: T) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }
}

impl<T: Default> Fetched<T> {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            data: T::default(),
            warnings: vec![message.into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceInfo {
    pub name: String,
    pub state: Option<String>,
    pub mac: Option<String>,
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
    pub mtu: Option<String>,
}

impl InterfaceInfo {
    pub fn has_address(&self) -> bool {
        !self.ipv4.is_empty() || !self.ipv6.is_empty()
    }

    /// First IPv4 address without its prefix length.
    pub fn primary_ipv4(&self) -> Option<&str> {
        self.ipv4
            .first()
            .map(|cidr| cidr.split('/').next().unwrap_or(cidr.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingResult {
    pub reachable: bool,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceStats {
    pub info: InterfaceInfo,
    pub gateway: Option<String>,
    /// `None` when the interface has no address to ping from.
    pub ping: Option<PingResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteTable {
    pub default_gateway: Option<String>,
    pub routes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BluetoothDevice {
    pub mac: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDevice {
    pub name: String,
    /// Device node, e.g. `/dev/input/event3`.
    pub path: String,
    pub keyboard: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbDevice {
    pub bus: String,
    pub device: String,
    pub id: String,
    pub description: String,
    pub keyboard: bool,
}

/// Which ports an nmap scan covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSelection {
    /// nmap's 100 most common ports (`-F`).
    Fast,
    /// nmap's default 1000 ports.
    Top,
    /// A user supplied expression such as `22,80,8000-8100`.
    Range(String),
}

pub trait Providers: Send + Sync {
    fn interfaces(&self) -> Fetched<Vec<InterfaceInfo>>;
    fn interface_stats(&self, name: &str) -> Fetched<Option<InterfaceStats>>;
    fn dns_servers(&self) -> Fetched<Vec<String>>;
    fn routes(&self) -> Fetched<RouteTable>;
    fn wifi_status(&self) -> Fetched<Vec<String>>;
    fn bluetooth_status(&self) -> Fetched<Vec<(String, String)>>;
    fn bluetooth_devices(&self) -> Fetched<Vec<BluetoothDevice>>;
    fn system_info(&self) -> Fetched<Vec<(String, String)>>;
    fn check_open_ports(&self) -> Fetched<Vec<String>>;
    fn nmap_scan(&self, target: &str, ports: &PortSelection) -> Fetched<Vec<String>>;
    fn capture_packets(&self, interface: &str, count: usize) -> Fetched<Vec<String>>;
    fn packet_summary(&self, interface: &str) -> Fetched<Vec<String>>;
    fn input_devices(&self) -> Fetched<Vec<InputDevice>>;
    fn capture_keystrokes(&self, device_path: &str) -> Fetched<Vec<String>>;
    fn usb_devices(&self) -> Fetched<Vec<UsbDevice>>;
    fn libinput_keyboards(&self) -> Fetched<Vec<String>>;
}

pub struct SystemProviders {
    runner: Arc<dyn CommandRunner>,
    settings: DashboardSettings,
}

impl SystemProviders {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: DashboardSettings) -> Self {
        Self { runner, settings }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.settings.command_timeout_secs)
    }

    /// Budget for commands that bound themselves with `timeout <window>`.
    fn windowed_timeout(&self, window_secs: u64) -> Duration {
        Duration::from_secs(window_secs + self.settings.command_timeout_secs)
    }
}

impl Providers for SystemProviders {
    fn interfaces(&self) -> Fetched<Vec<InterfaceInfo>> {
        network::fetch_interfaces(self.runner.as_ref(), self.timeout())
    }

    fn interface_stats(&self, name: &str) -> Fetched<Option<InterfaceStats>> {
        network::fetch_interface_stats(
            self.runner.as_ref(),
            self.timeout(),
            name,
            &self.settings.ping_host,
        )
    }

    fn dns_servers(&self) -> Fetched<Vec<String>> {
        network::read_dns_servers(network::RESOLV_CONF)
    }

    fn routes(&self) -> Fetched<RouteTable> {
        network::fetch_routes(self.runner.as_ref(), self.timeout())
    }

    fn wifi_status(&self) -> Fetched<Vec<String>> {
        network::fetch_wifi_status(self.runner.as_ref(), self.timeout())
    }

    fn bluetooth_status(&self) -> Fetched<Vec<(String, String)>> {
        bluetooth::fetch_status(self.runner.as_ref(), self.timeout())
    }

    fn bluetooth_devices(&self) -> Fetched<Vec<BluetoothDevice>> {
        bluetooth::fetch_devices(self.runner.as_ref(), self.timeout())
    }

    fn system_info(&self) -> Fetched<Vec<(String, String)>> {
        system::fetch_system_info(self.runner.as_ref(), self.timeout())
    }

    fn check_open_ports(&self) -> Fetched<Vec<String>> {
        tools::fetch_open_ports(self.runner.as_ref(), self.timeout())
    }

    fn nmap_scan(&self, target: &str, ports: &PortSelection) -> Fetched<Vec<String>> {
        tools::run_nmap(
            self.runner.as_ref(),
            Duration::from_secs(self.settings.scan_timeout_secs),
            target,
            ports,
        )
    }

    fn capture_packets(&self, interface: &str, count: usize) -> Fetched<Vec<String>> {
        let window = self.settings.capture_window_secs;
        tools::capture_packets(
            self.runner.as_ref(),
            self.windowed_timeout(window),
            interface,
            count,
            window,
        )
    }

    fn packet_summary(&self, interface: &str) -> Fetched<Vec<String>> {
        let window = self.settings.capture_window_secs.max(3);
        tools::packet_summary(
            self.runner.as_ref(),
            self.windowed_timeout(window),
            interface,
            self.settings.packet_summary_count,
            window,
        )
    }

    fn input_devices(&self) -> Fetched<Vec<InputDevice>> {
        tools::read_input_devices(tools::INPUT_DEVICES)
    }

    fn capture_keystrokes(&self, device_path: &str) -> Fetched<Vec<String>> {
        let window = self.settings.keystroke_capture_secs;
        tools::capture_keystrokes(
            self.runner.as_ref(),
            self.windowed_timeout(window),
            device_path,
            window,
        )
    }

    fn usb_devices(&self) -> Fetched<Vec<UsbDevice>> {
        tools::fetch_usb_devices(self.runner.as_ref(), self.timeout())
    }

    fn libinput_keyboards(&self) -> Fetched<Vec<String>> {
        tools::fetch_libinput_keyboards(self.runner.as_ref(), self.timeout())
    }
}
