#![allow(dead_code)]

pub mod probe;
pub mod tunnel;

use std::cell::RefCell;
use std::rc::Rc;

use awg_sweep::{SweepSettings, TunnelTemplate};

/// Ordered record of every stub call, shared between tunnel and probe.
pub type EventLog = Rc<RefCell<Vec<String>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.borrow().clone()
}

/// Settings without pauses or progress output.
pub fn quiet_settings() -> SweepSettings {
    SweepSettings {
        show_progress: false,
        ..SweepSettings::default().without_delays()
    }
}

pub const CLIENT_TEMPLATE: &str = "\
[Interface]
PrivateKey = cHJpdmF0ZS1rZXktZm9yLXRlc3RzLW9ubHktMDAwMDA=
Address = 10.8.0.2/32
H1 = 11
H2 = 22
H3 = 33
H4 = 44

[Peer]
PublicKey = cHVibGljLWtleS1mb3ItdGVzdHMtb25seS0wMDAwMDA=
Endpoint = vpn.example.net:51820
AllowedIPs = 0.0.0.0/0
";

pub fn client_template() -> TunnelTemplate {
    TunnelTemplate::parse("client", CLIENT_TEMPLATE).expect("fixture template parses")
}
