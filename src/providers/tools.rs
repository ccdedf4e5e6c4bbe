//! Wrappers around the "hacker tool" utilities: ss, nmap, tcpdump, tshark,
//! evtest, lsusb and libinput.

use std::time::Duration;

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;

use super::{Fetched, InputDevice, PortSelection, UsbDevice};
use crate::runner::{CommandFailure, CommandOutput, CommandRunner, EXIT_TIMEOUT};

pub const INPUT_DEVICES: &str = "/proc/bus/input/devices";

const EV_KEY: u64 = 1 << 1;
const EV_REP: u64 = 1 << 20;

lazy_static! {
    static ref PORT_RANGE_RE: Regex = Regex::new(r"^\d{1,5}(-\d{1,5})?(,\d{1,5}(-\d{1,5})?)*$").unwrap();
    static ref NMAP_PORT_RE: Regex = Regex::new(r"^\d+/(tcp|udp)\s+open").unwrap();
    static ref EVTEST_KEY_RE: Regex =
        Regex::new(r"type 1 \(EV_KEY\), code \d+ \((KEY_\w+)\), value 1\b").unwrap();
    static ref LSUSB_RE: Regex =
        Regex::new(r"^Bus\s+(\d+)\s+Device\s+(\d+):\s+ID\s+([0-9a-fA-F]{4}:[0-9a-fA-F]{4})\s*(.*)$").unwrap();
}

fn tool_warning(tool: &str, package: &str, out: &CommandOutput) -> String {
    match out.failure() {
        Some(CommandFailure::NotFound(_)) => {
            format!("{tool} is not installed (install with: sudo apt install {package})")
        }
        Some(failure) => format!("{tool}: {failure}"),
        None => String::new(),
    }
}

/// Commands wrapped in `timeout <window>` exit with 124 once the window
/// closes; that is a normal end of capture, unlike our own runner timeout.
fn window_closed(out: &CommandOutput) -> bool {
    out.code == EXIT_TIMEOUT && !out.stderr.starts_with("Timeout after")
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .map(String::from)
        .collect()
}

/// `ss -tuln` rows as `"<proto> <state> <local address>"`.
pub fn parse_ss(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| !line.starts_with("Netid"))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            (fields.len() >= 5).then(|| format!("{} {} {}", fields[0], fields[1], fields[4]))
        })
        .collect()
}

pub fn fetch_open_ports(runner: &dyn CommandRunner, timeout: Duration) -> Fetched<Vec<String>> {
    let out = runner.run(&["ss", "-tuln"], timeout);
    if out.success() {
        Fetched::ok(parse_ss(&out.stdout))
    } else {
        Fetched::warning(tool_warning("ss", "iproute2", &out))
    }
}

/// Accepts `22`, `1-1024`, `22,80,443` and mixes of both, ports 1..=65535.
pub fn is_valid_port_range(range: &str) -> bool {
    if !PORT_RANGE_RE.is_match(range) {
        return false;
    }
    range.split(',').all(|part| {
        let bounds: Vec<u32> = part.split('-').filter_map(|p| p.parse().ok()).collect();
        let in_range = bounds.iter().all(|p| (1..=65_535).contains(p));
        match bounds.as_slice() {
            [_] => in_range,
            [start, end] => in_range && start <= end,
            _ => false,
        }
    })
}

pub fn nmap_argv<'a>(target: &'a str, ports: &'a PortSelection) -> Vec<&'a str> {
    let mut argv = vec!["nmap", "-T4"];
    match ports {
        PortSelection::Fast => argv.push("-F"),
        PortSelection::Top => {}
        PortSelection::Range(range) => {
            argv.push("-p");
            argv.push(range.as_str());
        }
    }
    argv.push(target);
    argv
}

/// Keep the per-host report lines and the open ports.
pub fn parse_nmap(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim_end)
        .filter(|line| line.starts_with("Nmap scan report for") || NMAP_PORT_RE.is_match(line))
        .map(String::from)
        .collect()
}

pub fn run_nmap(
    runner: &dyn CommandRunner,
    timeout: Duration,
    target: &str,
    ports: &PortSelection,
) -> Fetched<Vec<String>> {
    if let PortSelection::Range(range) = ports {
        if !is_valid_port_range(range) {
            return Fetched::warning(format!("Invalid port range: '{range}'"));
        }
    }
    let out = runner.run_privileged(&nmap_argv(target, ports), timeout);
    if !out.success() {
        return Fetched::warning(tool_warning("nmap", "nmap", &out));
    }
    Fetched::ok(parse_nmap(&out.stdout))
}

pub fn capture_packets(
    runner: &dyn CommandRunner,
    timeout: Duration,
    interface: &str,
    count: usize,
    window_secs: u64,
) -> Fetched<Vec<String>> {
    let window = window_secs.max(1).to_string();
    let count = count.max(1).to_string();
    let out = runner.run_privileged(
        &[
            "timeout", &window, "tcpdump", "-i", interface, "-nn", "-l", "-q", "-c", &count,
        ],
        timeout,
    );
    if out.success() || window_closed(&out) {
        Fetched::ok(non_empty_lines(&out.stdout))
    } else {
        Fetched::warning(tool_warning("tcpdump", "tcpdump", &out))
    }
}

pub fn packet_summary(
    runner: &dyn CommandRunner,
    timeout: Duration,
    interface: &str,
    count: usize,
    window_secs: u64,
) -> Fetched<Vec<String>> {
    let window = window_secs.to_string();
    let count = count.max(1).to_string();
    let out = runner.run_privileged(
        &["timeout", &window, "tshark", "-i", interface, "-c", &count],
        timeout,
    );
    if out.success() || window_closed(&out) {
        Fetched::ok(non_empty_lines(&out.stdout))
    } else {
        Fetched::warning(tool_warning("tshark", "tshark", &out))
    }
}

/// Parse `/proc/bus/input/devices`. Keyboards are devices with a `kbd`
/// handler that report key events with autorepeat, which leaves out power
/// buttons and similar single-key devices.
pub fn parse_input_devices(content: &str) -> Vec<InputDevice> {
    content
        .split("\n\n")
        .filter_map(|block| {
            let mut name = None;
            let mut handlers = "";
            let mut ev_bits = 0u64;
            for line in block.lines() {
                if let Some(rest) = line.strip_prefix("N: Name=") {
                    name = Some(rest.trim_matches('"').to_string());
                } else if let Some(rest) = line.strip_prefix("H: Handlers=") {
                    handlers = rest;
                } else if let Some(rest) = line.strip_prefix("B: EV=") {
                    ev_bits = u64::from_str_radix(rest.trim(), 16).unwrap_or(0);
                }
            }
            let event = handlers.split_whitespace().find(|h| h.starts_with("event"))?;
            let has_kbd = handlers.split_whitespace().any(|h| h == "kbd");
            Some(InputDevice {
                name: name.unwrap_or_else(|| "(unnamed)".to_string()),
                path: format!("/dev/input/{event}"),
                keyboard: has_kbd && ev_bits & EV_KEY != 0 && ev_bits & EV_REP != 0,
            })
        })
        .collect()
}

pub fn read_input_devices(path: &str) -> Fetched<Vec<InputDevice>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Fetched::ok(parse_input_devices(&content)),
        Err(e) => Fetched::warning(format!("{path} could not be read: {e}")),
    }
}

/// Key presses recorded by `evtest`, as key names.
pub fn parse_evtest(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| EVTEST_KEY_RE.captures(line))
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Best-effort text rendering of a key sequence; non printable keys show as `<NAME>`.
pub fn keys_to_text(keys: &[String]) -> String {
    keys.iter()
        .map(|key| {
            let short = key.trim_start_matches("KEY_");
            match short {
                "SPACE" => " ".to_string(),
                "ENTER" => "⏎".to_string(),
                "MINUS" => "-".to_string(),
                "DOT" => ".".to_string(),
                "COMMA" => ",".to_string(),
                "SLASH" => "/".to_string(),
                s if s.len() == 1 => s.to_lowercase(),
                s => format!("<{s}>"),
            }
        })
        .join("")
}

pub fn capture_keystrokes(
    runner: &dyn CommandRunner,
    timeout: Duration,
    device_path: &str,
    window_secs: u64,
) -> Fetched<Vec<String>> {
    let window = window_secs.max(1).to_string();
    let out = runner.run_privileged(&["timeout", &window, "evtest", device_path], timeout);
    if out.success() || window_closed(&out) {
        Fetched::ok(parse_evtest(&out.stdout))
    } else {
        Fetched::warning(tool_warning("evtest", "evtest", &out))
    }
}

pub fn parse_lsusb(output: &str) -> Vec<UsbDevice> {
    output
        .lines()
        .filter_map(|line| LSUSB_RE.captures(line.trim()))
        .map(|caps| {
            let description = caps[4].trim().to_string();
            UsbDevice {
                bus: caps[1].to_string(),
                device: caps[2].to_string(),
                id: caps[3].to_lowercase(),
                keyboard: description.to_lowercase().contains("keyboard"),
                description,
            }
        })
        .collect()
}

pub fn fetch_usb_devices(runner: &dyn CommandRunner, timeout: Duration) -> Fetched<Vec<UsbDevice>> {
    let out = runner.run(&["lsusb"], timeout);
    if out.success() {
        Fetched::ok(parse_lsusb(&out.stdout))
    } else {
        Fetched::warning(tool_warning("lsusb", "usbutils", &out))
    }
}

/// Names of devices that `libinput list-devices` reports with the keyboard capability.
pub fn parse_libinput_keyboards(output: &str) -> Vec<String> {
    let mut keyboards = Vec::new();
    let mut current: Option<&str> = None;
    for line in output.lines() {
        if let Some(rest) = line.strip_prefix("Device:") {
            current = Some(rest.trim());
        } else if let Some(rest) = line.strip_prefix("Capabilities:") {
            if rest.split_whitespace().any(|c| c == "keyboard") {
                keyboards.extend(current.take().map(String::from));
            }
        }
    }
    keyboards.into_iter().unique().collect()
}

pub fn fetch_libinput_keyboards(runner: &dyn CommandRunner, timeout: Duration) -> Fetched<Vec<String>> {
    let out = runner.run_privileged(&["libinput", "list-devices"], timeout);
    if out.success() {
        Fetched::ok(parse_libinput_keyboards(&out.stdout))
    } else {
        Fetched::warning(tool_warning("libinput", "libinput-tools", &out))
    }
}
