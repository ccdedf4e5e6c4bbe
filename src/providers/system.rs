use std::time::Duration;

use super::Fetched;
use crate::runner::CommandRunner;

const HOSTNAME: &str = "/proc/sys/kernel/hostname";
const UPTIME: &str = "/proc/uptime";
const LOADAVG: &str = "/proc/loadavg";
const MEMINFO: &str = "/proc/meminfo";
const CPU_TEMP: &str = "/sys/class/thermal/thermal_zone0/temp";

/// (total, available) in kB.
pub fn parse_meminfo(content: &str) -> Option<(u64, u64)> {
    let field = |name: &str| {
        content
            .lines()
            .find(|line| line.starts_with(name))
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|value| value.parse::<u64>().ok())
    };
    let total = field("MemTotal:")?;
    let available = field("MemAvailable:").or_else(|| field("MemFree:"))?;
    Some((total, available))
}

pub fn format_memory(total_kb: u64, available_kb: u64) -> String {
    let used = total_kb.saturating_sub(available_kb);
    let percent = if total_kb == 0 { 0 } else { used * 100 / total_kb };
    format!(
        "{} MiB used / {} MiB total ({}%)",
        used / 1024,
        total_kb / 1024,
        percent
    )
}

pub fn parse_uptime(content: &str) -> Option<String> {
    let seconds = content.split_whitespace().next()?.parse::<f64>().ok()? as u64;
    let (days, hours, minutes) = (seconds / 86_400, seconds % 86_400 / 3_600, seconds % 3_600 / 60);
    Some(if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else {
        format!("{hours}h {minutes}m")
    })
}

pub fn parse_loadavg(content: &str) -> Option<String> {
    let parts: Vec<&str> = content.split_whitespace().take(3).collect();
    (parts.len() == 3).then(|| parts.join(" "))
}

/// Summary of the data line of `df -h /`.
pub fn parse_df(output: &str) -> Option<String> {
    let fields: Vec<&str> = output.lines().nth(1)?.split_whitespace().collect();
    if fields.len() < 5 {
        return None;
    }
    Some(format!(
        "{} used of {} ({} free, {})",
        fields[2], fields[1], fields[3], fields[4]
    ))
}

pub fn parse_cpu_temp(content: &str) -> Option<String> {
    let millis = content.trim().parse::<i64>().ok()?;
    Some(format!("{:.1} °C", millis as f64 / 1000.0))
}

fn read_proc(path: &str, warnings: &mut Vec<String>) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            warnings.push(format!("{path} could not be read: {e}"));
            None
        }
    }
}

pub fn fetch_system_info(runner: &dyn CommandRunner, timeout: Duration) -> Fetched<Vec<(String, String)>> {
    let mut warnings = Vec::new();
    let mut info: Vec<(String, String)> = Vec::new();
    let mut push = |key: &str, value: Option<String>| {
        info.push((key.to_string(), value.unwrap_or_else(|| "?".to_string())));
    };

    push(
        "Hostname",
        read_proc(HOSTNAME, &mut warnings).map(|s| s.trim().to_string()),
    );

    let kernel = runner.run(&["uname", "-r"], timeout);
    if !kernel.success() {
        warnings.push(format!("uname -r: {}", kernel.error_text()));
    }
    push("Kernel", kernel.success().then(|| kernel.stdout.clone()));

    push("Uptime", read_proc(UPTIME, &mut warnings).and_then(|s| parse_uptime(&s)));
    push("Load", read_proc(LOADAVG, &mut warnings).and_then(|s| parse_loadavg(&s)));
    push(
        "Memory",
        read_proc(MEMINFO, &mut warnings)
            .and_then(|s| parse_meminfo(&s))
            .map(|(total, available)| format_memory(total, available)),
    );

    let df = runner.run(&["df", "-h", "/"], timeout);
    if !df.success() {
        warnings.push(format!("df -h /: {}", df.error_text()));
    }
    push("Disk /", df.success().then(|| parse_df(&df.stdout)).flatten());

    // Not every board exposes a thermal zone, so a missing one is not a warning.
    push(
        "CPU temp",
        std::fs::read_to_string(CPU_TEMP).ok().and_then(|s| parse_cpu_temp(&s)),
    );

    Fetched::new(info, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_meminfo() {
        let meminfo = "MemTotal:        3884328 kB\nMemFree:          180000 kB\nMemAvailable:    2942164 kB\n";
        assert_eq!(parse_meminfo(meminfo), Some((3_884_328, 2_942_164)));
        assert_eq!(
            format_memory(3_884_328, 2_942_164),
            "920 MiB used / 3793 MiB total (24%)"
        );
        assert_eq!(parse_meminfo("MemTotal: 100 kB\nMemFree: 40 kB"), Some((100, 40)));
        assert_eq!(parse_meminfo("garbage"), None);
    }

    #[test]
    fn parses_uptime_and_load() {
        assert_eq!(parse_uptime("356521.43 1371263.56"), Some("4d 3h 2m".to_string()));
        assert_eq!(parse_uptime("3720.00 100.0"), Some("1h 2m".to_string()));
        assert_eq!(parse_uptime(""), None);
        assert_eq!(parse_loadavg("0.15 0.10 0.05 1/234 5678"), Some("0.15 0.10 0.05".to_string()));
        assert_eq!(parse_loadavg("0.15"), None);
    }

    #[test]
    fn parses_df_and_temperature() {
        let df = "Filesystem      Size  Used Avail Use% Mounted on\n/dev/root        29G  5.1G   23G  19% /";
        assert_eq!(parse_df(df), Some("5.1G used of 29G (23G free, 19%)".to_string()));
        assert_eq!(parse_df("Filesystem"), None);
        assert_eq!(parse_cpu_temp("48312\n"), Some("48.3 °C".to_string()));
        assert_eq!(parse_cpu_temp("n/a"), None);
    }
}
