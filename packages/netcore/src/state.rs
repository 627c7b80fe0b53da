use core::{cell::RefCell, net::Ipv4Addr};

use embassy_sync::blocking_mutex::{raw::RawMutex, Mutex};
use heapless::String;

use crate::WIFI_SSID_MAX;

/// Network the device joined and the address it was given.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkIdentity {
    ssid: String<WIFI_SSID_MAX>,
    address: Ipv4Addr,
}

impl NetworkIdentity {
    /// SSIDs longer than the 802.11 limit are cut at a char boundary.
    pub fn new(ssid: &str, address: Ipv4Addr) -> Self {
        let mut owned = String::new();
        for ch in ssid.chars() {
            if owned.push(ch).is_err() {
                break;
            }
        }
        Self {
            ssid: owned,
            address,
        }
    }

    pub fn ssid(&self) -> &str {
        self.ssid.as_str()
    }

    pub const fn address(&self) -> Ipv4Addr {
        self.address
    }
}

/// Result of the last successful connect, shared between the controller and its readers.
///
/// The identity is published as one record, so a reader sees either nothing or a
/// complete pair. `None` means no connect has succeeded yet.
pub struct NetworkState<M: RawMutex> {
    inner: Mutex<M, RefCell<Option<NetworkIdentity>>>,
}

impl<M: RawMutex> NetworkState<M> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Replaces any earlier identity.
    pub fn publish(&self, identity: NetworkIdentity) {
        self.inner.lock(|cell| {
            cell.replace(Some(identity));
        });
    }

    pub fn get(&self) -> Option<NetworkIdentity> {
        self.inner.lock(|cell| cell.borrow().clone())
    }

    pub fn is_connected(&self) -> bool {
        self.inner.lock(|cell| cell.borrow().is_some())
    }
}

impl<M: RawMutex> Default for NetworkState<M> {
    fn default() -> Self {
        Self::new()
    }
}
