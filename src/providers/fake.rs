//! Canned [`Providers`] for screen and capture tests.

use std::{
    collections::HashMap,
    sync::Mutex,
    thread::{self, ThreadId},
};

use super::*;

#[derive(Default)]
pub struct FakeProviders {
    pub interfaces: Fetched<Vec<InterfaceInfo>>,
    pub stats: HashMap<String, InterfaceStats>,
    pub dns: Fetched<Vec<String>>,
    pub routes: Fetched<RouteTable>,
    pub wifi: Fetched<Vec<String>>,
    pub bluetooth_status: Fetched<Vec<(String, String)>>,
    pub bluetooth_devices: Fetched<Vec<BluetoothDevice>>,
    pub system: Fetched<Vec<(String, String)>>,
    pub open_ports: Fetched<Vec<String>>,
    pub nmap: Fetched<Vec<String>>,
    pub packets: Fetched<Vec<String>>,
    pub summary: Fetched<Vec<String>>,
    pub input_devices: Fetched<Vec<InputDevice>>,
    pub keystrokes: Fetched<Vec<String>>,
    pub usb: Fetched<Vec<UsbDevice>>,
    pub libinput: Fetched<Vec<String>>,
    /// Make `capture_packets` panic, to exercise worker isolation.
    pub panic_on_capture: bool,
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) capture_threads: Mutex<Vec<ThreadId>>,
}

pub fn iface(name: &str, ipv4: &[&str]) -> InterfaceInfo {
    InterfaceInfo {
        name: name.to_string(),
        state: Some("UP".to_string()),
        ipv4: ipv4.iter().map(|a| a.to_string()).collect(),
        ..InterfaceInfo::default()
    }
}

impl FakeProviders {
    pub fn with_interfaces(interfaces: Vec<InterfaceInfo>) -> Self {
        Self {
            interfaces: Fetched::ok(interfaces),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn capture_threads(&self) -> Vec<ThreadId> {
        self.capture_threads
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl Providers for FakeProviders {
    fn interfaces(&self) -> Fetched<Vec<InterfaceInfo>> {
        self.record("interfaces".into());
        self.interfaces.clone()
    }

    fn interface_stats(&self, name: &str) -> Fetched<Option<InterfaceStats>> {
        self.record(format!("interface_stats {name}"));
        match self.stats.get(name) {
            Some(stats) => Fetched::ok(Some(stats.clone())),
            None => Fetched::warning(format!("Interface {name} not found")),
        }
    }

    fn dns_servers(&self) -> Fetched<Vec<String>> {
        self.record("dns_servers".into());
        self.dns.clone()
    }

    fn routes(&self) -> Fetched<RouteTable> {
        self.record("routes".into());
        self.routes.clone()
    }

    fn wifi_status(&self) -> Fetched<Vec<String>> {
        self.record("wifi_status".into());
        self.wifi.clone()
    }

    fn bluetooth_status(&self) -> Fetched<Vec<(String, String)>> {
        self.record("bluetooth_status".into());
        self.bluetooth_status.clone()
    }

    fn bluetooth_devices(&self) -> Fetched<Vec<BluetoothDevice>> {
        self.record("bluetooth_devices".into());
        self.bluetooth_devices.clone()
    }

    fn system_info(&self) -> Fetched<Vec<(String, String)>> {
        self.record("system_info".into());
        self.system.clone()
    }

    fn check_open_ports(&self) -> Fetched<Vec<String>> {
        self.record("check_open_ports".into());
        self.open_ports.clone()
    }

    fn nmap_scan(&self, target: &str, ports: &PortSelection) -> Fetched<Vec<String>> {
        self.record(format!("nmap_scan {target} {ports:?}"));
        self.nmap.clone()
    }

    fn capture_packets(&self, interface: &str, count: usize) -> Fetched<Vec<String>> {
        if let Ok(mut threads) = self.capture_threads.lock() {
            threads.push(thread::current().id());
        }
        if self.panic_on_capture {
            panic!("capture backend exploded");
        }
        self.record(format!("capture_packets {interface} {count}"));
        self.packets.clone()
    }

    fn packet_summary(&self, interface: &str) -> Fetched<Vec<String>> {
        self.record(format!("packet_summary {interface}"));
        self.summary.clone()
    }

    fn input_devices(&self) -> Fetched<Vec<InputDevice>> {
        self.record("input_devices".into());
        self.input_devices.clone()
    }

    fn capture_keystrokes(&self, device_path: &str) -> Fetched<Vec<String>> {
        self.record(format!("capture_keystrokes {device_path}"));
        self.keystrokes.clone()
    }

    fn usb_devices(&self) -> Fetched<Vec<UsbDevice>> {
        self.record("usb_devices".into());
        self.usb.clone()
    }

    fn libinput_keyboards(&self) -> Fetched<Vec<String>> {
        self.record("libinput_keyboards".into());
        self.libinput.clone()
    }
}
