use strum::{Display, EnumCount, EnumIter, EnumString, FromRepr, IntoStaticStr};

/// Every navigable screen. The serialized names are the stable screen ids.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumCount,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ScreenId {
    Main,
    NetHub,
    #[strum(to_string = "ifaces")]
    Interfaces,
    #[strum(to_string = "netdiag")]
    NetDiag,
    #[strum(to_string = "netdiag_detail")]
    NetDiagDetail,
    Wifi,
    DnsRoutes,
    BtHub,
    BtStatus,
    BtDevices,
    SysInfo,
    Hacker,
    PortScan,
    CustomPortInput,
    Sniffer,
    Packets,
    Keylogger,
    UsbInterceptor,
    Settings,
}

/// Buttons every screen may place in its bar. They resolve before content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr, EnumIter)]
pub enum NavButton {
    Back,
    Home,
    Refresh,
    Quit,
}

/// Action ids at or above this value belong to [`NavButton`]s.
pub const NAV_BASE: usize = 1000;

impl NavButton {
    pub fn action_id(&self) -> usize {
        NAV_BASE + *self as usize
    }

    pub fn from_action(action_id: usize) -> Option<Self> {
        action_id.checked_sub(NAV_BASE).and_then(Self::from_repr)
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr, EnumIter, EnumCount)]
pub enum PortScanMode {
    /// Listening sockets on this host, from `ss`.
    #[default]
    Local,
    Quick,
    Standard,
    Custom,
}

impl PortScanMode {
    pub fn next(&self) -> Self {
        let next_index = (*self as usize + 1) % Self::COUNT;
        Self::from_repr(next_index).unwrap_or(*self)
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SnifferMode {
    #[default]
    Live,
    Paused,
}

impl SnifferMode {
    pub fn toggle(&self) -> Self {
        match self {
            SnifferMode::Live => SnifferMode::Paused,
            SnifferMode::Paused => SnifferMode::Live,
        }
    }

    pub fn captures(&self) -> bool {
        matches!(self, SnifferMode::Live)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn screen_ids_are_stable_strings() {
        assert_eq!(ScreenId::Main.to_string(), "main");
        assert_eq!(ScreenId::NetHub.to_string(), "net_hub");
        assert_eq!(ScreenId::Interfaces.to_string(), "ifaces");
        assert_eq!(ScreenId::NetDiagDetail.to_string(), "netdiag_detail");
        assert_eq!(ScreenId::CustomPortInput.to_string(), "custom_port_input");
        assert_eq!(ScreenId::from_str("usb_interceptor"), Ok(ScreenId::UsbInterceptor));
        assert!(ScreenId::from_str("nonexistent").is_err());
        for id in ScreenId::iter() {
            let name: &'static str = id.into();
            assert_eq!(ScreenId::from_str(name), Ok(id));
        }
    }

    #[test]
    fn nav_actions_round_trip_and_stay_clear_of_content_ids() {
        for button in NavButton::iter() {
            assert!(button.action_id() >= NAV_BASE);
            assert_eq!(NavButton::from_action(button.action_id()), Some(button));
        }
        assert_eq!(NavButton::from_action(3), None);
        assert_eq!(NavButton::from_action(NAV_BASE + 40), None);
    }

    #[test]
    fn scan_modes_cycle() {
        let mut mode = PortScanMode::default();
        let mut seen = vec![mode];
        for _ in 0..PortScanMode::COUNT {
            mode = mode.next();
            seen.push(mode);
        }
        assert_eq!(
            seen,
            vec![
                PortScanMode::Local,
                PortScanMode::Quick,
                PortScanMode::Standard,
                PortScanMode::Custom,
                PortScanMode::Local,
            ]
        );
    }
}
