use core::fmt;

use heapless::Vec;

use crate::{MAX_CREDENTIALS, WIFI_PASSWORD_MAX, WIFI_SSID_MAX};

pub type CredentialList<'a> = Vec<Credential<'a>, MAX_CREDENTIALS>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Credential<'a> {
    ssid: &'a str,
    password: &'a str,
}

impl<'a> Credential<'a> {
    pub fn new(ssid: &'a str, password: &'a str) -> Result<Self, ConfigError> {
        if ssid.is_empty() {
            return Err(ConfigError::EmptySsid);
        }
        if ssid.len() > WIFI_SSID_MAX {
            return Err(ConfigError::SsidTooLong);
        }
        if password.len() > WIFI_PASSWORD_MAX {
            return Err(ConfigError::PasswordTooLong);
        }
        Ok(Self { ssid, password })
    }

    pub const fn ssid(&self) -> &'a str {
        self.ssid
    }

    pub const fn password(&self) -> &'a str {
        self.password
    }

    /// An empty password selects an open network.
    pub const fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    NoCredentials,
    EmptySsid,
    SsidTooLong,
    PasswordTooLong,
    MissingSeparator,
    TooManyCredentials,
}

impl ConfigError {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoCredentials => "no_credentials",
            Self::EmptySsid => "empty_ssid",
            Self::SsidTooLong => "ssid_too_long",
            Self::PasswordTooLong => "password_too_long",
            Self::MissingSeparator => "missing_separator",
            Self::TooManyCredentials => "too_many_credentials",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, read-only list of networks tried in round-robin order.
#[derive(Clone, Copy, Debug)]
pub struct CredentialStore<'a> {
    entries: &'a [Credential<'a>],
}

impl<'a> CredentialStore<'a> {
    pub fn new(entries: &'a [Credential<'a>]) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::NoCredentials);
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Credential at `index`, wrapping past the end of the list.
    pub fn get(&self, index: usize) -> &'a Credential<'a> {
        &self.entries[index % self.entries.len()]
    }

    /// The credential following `current` and its index.
    pub fn next(&self, current: usize) -> (&'a Credential<'a>, usize) {
        let index = next_index(current, self.entries.len());
        (&self.entries[index], index)
    }
}

/// Round-robin successor. The connect machine and [`CredentialStore::next`] both advance
/// with it, so effect indices always name the credential the store hands out.
pub(crate) const fn next_index(current: usize, len: usize) -> usize {
    (current + 1) % len
}

/// Parses `ssid:password;ssid:password`.
///
/// Each entry is split on its first `:`, so SSIDs cannot contain one while passwords
/// can. Whitespace around entries and empty entries are ignored.
pub fn parse_credential_list(raw: &str) -> Result<CredentialList<'_>, ConfigError> {
    let mut list = CredentialList::new();
    for entry in raw.split(';') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (ssid, password) = entry.split_once(':').ok_or(ConfigError::MissingSeparator)?;
        let credential = Credential::new(ssid.trim(), password)?;
        list.push(credential).map_err(|_| ConfigError::TooManyCredentials)?;
    }
    if list.is_empty() {
        return Err(ConfigError::NoCredentials);
    }
    Ok(list)
}
