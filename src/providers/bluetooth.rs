use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;

use super::{BluetoothDevice, Fetched};
use crate::runner::{CommandFailure, CommandRunner};

lazy_static! {
    static ref CONTROLLER_RE: Regex = Regex::new(r"^Controller\s+([0-9A-Fa-f:]{17})(.*)$").unwrap();
    static ref DEVICE_RE: Regex = Regex::new(r"^Device\s+([0-9A-Fa-f:]{17})\s*(.*)$").unwrap();
}

fn bluetoothctl_warning(failure: CommandFailure) -> String {
    match failure {
        CommandFailure::NotFound(_) => {
            "bluetoothctl is not available (install with: sudo apt install bluez)".to_string()
        }
        other => format!("bluetoothctl: {other}"),
    }
}

/// Key/value pairs of `bluetoothctl show`, in output order.
pub fn parse_show(output: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in output.lines() {
        let line = line.trim();
        if let Some(caps) = CONTROLLER_RE.captures(line) {
            pairs.push(("Controller".to_string(), caps[1].to_string()));
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || (key.contains(' ') && key != "Discoverable Timeout") {
            continue;
        }
        pairs.push((key.to_string(), value.to_string()));
    }
    pairs
}

pub fn parse_devices(output: &str) -> Vec<BluetoothDevice> {
    output
        .lines()
        .filter_map(|line| DEVICE_RE.captures(line.trim()))
        .map(|caps| BluetoothDevice {
            mac: caps[1].to_uppercase(),
            name: match caps[2].trim() {
                "" => "(unnamed)".to_string(),
                name => name.to_string(),
            },
        })
        .collect()
}

pub fn fetch_status(runner: &dyn CommandRunner, timeout: Duration) -> Fetched<Vec<(String, String)>> {
    let out = runner.run(&["bluetoothctl", "show"], timeout);
    match out.failure() {
        None => {
            let pairs = parse_show(&out.stdout);
            if pairs.is_empty() {
                Fetched::warning("No Bluetooth controller reported")
            } else {
                Fetched::ok(pairs)
            }
        }
        Some(failure) => Fetched::warning(bluetoothctl_warning(failure)),
    }
}

pub fn fetch_devices(runner: &dyn CommandRunner, timeout: Duration) -> Fetched<Vec<BluetoothDevice>> {
    let out = runner.run(&["bluetoothctl", "devices"], timeout);
    match out.failure() {
        None => Fetched::ok(parse_devices(&out.stdout)),
        Some(failure) => Fetched::warning(bluetoothctl_warning(failure)),
    }
}
