//! Privilege checks for the commands that need root (nmap, tcpdump, tshark, evtest).

/// Markers in a command's stderr that mean "run me as root".
const PERMISSION_MARKERS: [&str; 4] = ["permission", "denied", "not permitted", "you must be root"];

/// Check if the current process already runs with an effective uid of 0
#[cfg(unix)]
pub fn has_root_privileges() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn has_root_privileges() -> bool {
    true
}

/// Whether stderr reports a permission problem worth one escalated retry.
pub fn is_permission_error(stderr: &str) -> bool {
    let lowered = stderr.to_lowercase();
    PERMISSION_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// `sudo -n` never prompts: with no cached credentials or NOPASSWD rule it
/// fails fast, and sudo's own error is what the user sees.
pub fn escalated_argv<'a>(argv: &[&'a str]) -> Vec<&'a str> {
    let mut escalated = Vec::with_capacity(argv.len() + 2);
    escalated.push("sudo");
    escalated.push("-n");
    escalated.extend_from_slice(argv);
    escalated
}

pub fn get_privilege_warning() -> String {
    let binary = std::env::current_exe()
        .ok()
        .and_then(|p| p.file_name().map(|s| s.to_string_lossy().to_string()))
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    format!(
        "WARNING: Running without elevated privileges.\n\
        Port scans, packet capture and keystroke monitoring will retry through `sudo -n`\n\
        and report a warning if that is not allowed.\n\
        For full functionality run: sudo {}",
        binary
    )
}
