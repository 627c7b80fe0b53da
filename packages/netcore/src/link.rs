use core::{fmt::Debug, net::Ipv4Addr};

use embassy_time::{Duration, Instant};

use crate::credentials::Credential;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkStatus {
    NotConnected,
    Connected,
}

impl LinkStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotConnected => "not_connected",
            Self::Connected => "connected",
        }
    }
}

/// Station-side radio link.
///
/// `begin` only starts an association; progress is observed through `status`.
/// `Connected` means the link is usable, i.e. associated and holding an address.
#[allow(async_fn_in_trait)]
pub trait NetworkLink {
    type Error: Debug;

    async fn begin(&mut self, credential: &Credential<'_>) -> Result<(), Self::Error>;

    fn status(&mut self) -> LinkStatus;

    /// Address of the link; unspecified while not connected.
    fn local_address(&self) -> Ipv4Addr;
}

/// Monotonic time source plus the poll-interval sleep.
#[allow(async_fn_in_trait)]
pub trait Clock {
    fn now(&self) -> Instant;

    async fn sleep(&mut self, duration: Duration);
}

/// Polls `link` until it stops reporting `Connected` and returns when that was seen.
///
/// The caller lends the link for the whole wait, so whoever owns the radio keeps it up
/// for as long as the link is in use.
pub async fn wait_for_link_loss<L, C>(
    link: &mut L,
    clock: &mut C,
    poll_interval: Duration,
) -> Instant
where
    L: NetworkLink + ?Sized,
    C: Clock + ?Sized,
{
    loop {
        if link.status() != LinkStatus::Connected {
            return clock.now();
        }
        clock.sleep(poll_interval).await;
    }
}

impl<T: NetworkLink + ?Sized> NetworkLink for &mut T {
    type Error = T::Error;

    async fn begin(&mut self, credential: &Credential<'_>) -> Result<(), Self::Error> {
        (**self).begin(credential).await
    }

    fn status(&mut self) -> LinkStatus {
        (**self).status()
    }

    fn local_address(&self) -> Ipv4Addr {
        (**self).local_address()
    }
}

impl<T: Clock + ?Sized> Clock for &mut T {
    fn now(&self) -> Instant {
        (**self).now()
    }

    async fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration).await
    }
}
