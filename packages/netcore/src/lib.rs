//! Hardware-free core of the boot-time network bring-up.
//!
//! Everything that decides *what* happens while the device joins a network lives here:
//! credential cycling, the connect state machine and its async driver, the shared
//! network state, status colors, the screen layouts and the info page. The firmware
//! crate only binds these to esp-radio, RMT, I2C and embassy-net sockets.

#![no_std]

pub mod connect;
pub mod credentials;
pub mod feedback;
pub mod frame;
pub mod http;
pub mod info_page;
pub mod link;
pub mod screen;
pub mod ssd1306;
pub mod state;

pub use connect::{
    ConnectEngine, ConnectError, ConnectOutcome, ConnectPolicy, ConnectReport, Connection,
    ConnectionController,
};
pub use credentials::{
    parse_credential_list, ConfigError, Credential, CredentialList, CredentialStore,
};
pub use feedback::{Progress, ProgressReporter, StatusPhase, StatusSignaler};
pub use frame::{MonoFrame, Panel};
pub use link::{wait_for_link_loss, Clock, LinkStatus, NetworkLink};
pub use state::{NetworkIdentity, NetworkState};

pub const WIFI_SSID_MAX: usize = 32;
pub const WIFI_PASSWORD_MAX: usize = 64;
pub const MAX_CREDENTIALS: usize = 8;

/// Firmware identity shown on the panel and the info page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectInfo {
    pub name: &'static str,
    pub version: &'static str,
}
