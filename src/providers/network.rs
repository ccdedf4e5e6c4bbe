use std::{collections::BTreeMap, time::Duration};

use lazy_static::lazy_static;
use regex::Regex;

use super::{Fetched, InterfaceInfo, InterfaceStats, PingResult, RouteTable};
use crate::runner::{CommandFailure, CommandRunner};

pub const RESOLV_CONF: &str = "/etc/resolv.conf";

lazy_static! {
    static ref HEADER_RE: Regex = Regex::new(r"^\d+:\s+([^:@\s]+)(?:@\S+)?:.*\bmtu\s+(\d+)").unwrap();
    static ref STATE_RE: Regex = Regex::new(r"\bstate\s+(\S+)").unwrap();
    static ref LINK_RE: Regex = Regex::new(r"^\s+link/\S+\s+([0-9a-f:]{17})").unwrap();
    static ref INET4_RE: Regex = Regex::new(r"^\s+inet\s+(\d+\.\d+\.\d+\.\d+/\d+)").unwrap();
    static ref INET6_RE: Regex = Regex::new(r"^\s+inet6\s+([0-9a-f:]+/\d+)").unwrap();
    static ref VIA_RE: Regex = Regex::new(r"\bvia\s+(\d+\.\d+\.\d+\.\d+)").unwrap();
}

/// Parse `ip addr` output. Physical interfaces come sorted by name with the
/// loopback last.
pub fn parse_ip_addr(output: &str) -> Vec<InterfaceInfo> {
    let mut infos: BTreeMap<String, InterfaceInfo> = BTreeMap::new();
    let mut current: Option<String> = None;

    for line in output.lines() {
        if let Some(caps) = HEADER_RE.captures(line) {
            let name = caps[1].to_string();
            let entry = infos.entry(name.clone()).or_insert_with(|| InterfaceInfo {
                name: name.clone(),
                ..InterfaceInfo::default()
            });
            entry.mtu = Some(caps[2].to_string());
            if let Some(state) = STATE_RE.captures(line) {
                entry.state = Some(state[1].to_string());
            }
            current = Some(name);
            continue;
        }

        let Some(info) = current.as_ref().and_then(|name| infos.get_mut(name)) else {
            continue;
        };
        if let Some(caps) = LINK_RE.captures(line) {
            info.mac = Some(caps[1].to_string());
        } else if let Some(caps) = INET4_RE.captures(line) {
            info.ipv4.push(caps[1].to_string());
        } else if let Some(caps) = INET6_RE.captures(line) {
            info.ipv6.push(caps[1].to_string());
        }
    }

    let loopback = infos.remove("lo");
    let mut ordered: Vec<InterfaceInfo> = infos.into_values().collect();
    ordered.extend(loopback);
    ordered
}

pub fn parse_gateway(output: &str) -> Option<String> {
    VIA_RE.captures(output).map(|caps| caps[1].to_string())
}

pub fn parse_resolv_conf(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("nameserver"))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(String::from)
        .collect()
}

pub fn fetch_interfaces(runner: &dyn CommandRunner, timeout: Duration) -> Fetched<Vec<InterfaceInfo>> {
    let mut warnings = Vec::new();

    let link = runner.run(&["ip", "-brief", "link"], timeout);
    if !link.success() {
        warnings.push(format!("ip -brief link: {}", link.error_text()));
    }

    let addr = runner.run(&["ip", "addr"], timeout);
    if !addr.success() {
        warnings.push(format!("ip addr: {}", addr.error_text()));
        return Fetched::new(Vec::new(), warnings);
    }

    Fetched::new(parse_ip_addr(&addr.stdout), warnings)
}

fn ping_via(runner: &dyn CommandRunner, interface: &str, host: &str) -> PingResult {
    let out = runner.run(
        &["ping", "-I", interface, "-c", "1", "-W", "2", host],
        Duration::from_secs(4),
    );
    if out.success() {
        return PingResult {
            reachable: true,
            output: out.stdout,
        };
    }
    let output = if !out.stderr.is_empty() {
        out.stderr
    } else if !out.stdout.is_empty() {
        out.stdout
    } else {
        "Ping failed".to_string()
    };
    PingResult {
        reachable: false,
        output,
    }
}

pub fn fetch_interface_stats(
    runner: &dyn CommandRunner,
    timeout: Duration,
    name: &str,
    ping_host: &str,
) -> Fetched<Option<InterfaceStats>> {
    let Fetched { data: interfaces, mut warnings } = fetch_interfaces(runner, timeout);

    let Some(info) = interfaces.into_iter().find(|iface| iface.name == name) else {
        warnings.push(format!("Interface {name} not found"));
        return Fetched::new(None, warnings);
    };

    let route = runner.run(&["ip", "route", "show", "dev", name], timeout);
    let gateway = if route.success() && !route.stdout.is_empty() {
        parse_gateway(&route.stdout)
    } else {
        let reason = if route.success() { "no route found" } else { route.error_text() };
        warnings.push(format!("Gateway: {reason}"));
        None
    };

    let ping = info
        .has_address()
        .then(|| ping_via(runner, name, ping_host));

    Fetched::new(Some(InterfaceStats { info, gateway, ping }), warnings)
}

pub fn read_dns_servers(path: &str) -> Fetched<Vec<String>> {
    match std::fs::read(path) {
        Ok(bytes) => Fetched::ok(parse_resolv_conf(&String::from_utf8_lossy(&bytes))),
        Err(e) => Fetched::warning(format!("{path} could not be read: {e}")),
    }
}

pub fn fetch_routes(runner: &dyn CommandRunner, timeout: Duration) -> Fetched<RouteTable> {
    let mut warnings = Vec::new();

    let default = runner.run(&["ip", "route", "show", "default"], timeout);
    let default_gateway = if default.success() && !default.stdout.is_empty() {
        parse_gateway(&default.stdout)
    } else {
        let reason = if default.success() { "no default route found" } else { default.error_text() };
        warnings.push(format!("Default route: {reason}"));
        None
    };

    let table = runner.run(&["ip", "route", "show"], timeout);
    let routes = if table.success() {
        table.stdout.lines().map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect()
    } else {
        warnings.push(format!("ip route: {}", table.error_text()));
        Vec::new()
    };

    Fetched::new(
        RouteTable {
            default_gateway,
            routes,
        },
        warnings,
    )
}

pub fn fetch_wifi_status(runner: &dyn CommandRunner, timeout: Duration) -> Fetched<Vec<String>> {
    let out = runner.run(&["iw", "dev"], timeout);
    match out.failure() {
        None => Fetched::ok(out.stdout.lines().take(200).map(String::from).collect()),
        Some(CommandFailure::NotFound(_)) => {
            Fetched::warning("iw is not available (install with: sudo apt install iw)")
        }
        Some(failure) => Fetched::warning(format!("iw dev: {failure} (no WLAN device found?)")),
    }
}
