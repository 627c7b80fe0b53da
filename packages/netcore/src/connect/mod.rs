//! Credential round-robin under one global deadline.
//!
//! [`ConnectEngine`] is the pure, clock-free machine: it is fed timestamps and link
//! samples and answers with effects. [`ConnectionController`] runs it against real (or
//! simulated) collaborators.

mod driver;
mod engine;
mod machine;
mod policy;


use core::fmt;

use embassy_time::{Duration, Instant};
use heapless::Vec;

use crate::{
    feedback::{Progress, StatusPhase},
    link::LinkStatus,
    state::NetworkIdentity,
};

pub use driver::ConnectionController;
pub use engine::ConnectEngine;
pub use policy::{
    ConnectPolicy, CONNECT_TIMEOUT_DEFAULT_MS, POLL_INTERVAL_DEFAULT_MS, RETRY_DELAY_DEFAULT_MS,
};

pub const MAX_EFFECTS_PER_STEP: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectEvent {
    Start { now: Instant },
    Tick { now: Instant, link: LinkStatus },
}

/// Side effect requested by one dispatch, executed in order by the driver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConnectEffect {
    Signal(StatusPhase),
    Begin { credential_index: usize },
    Report { credential_index: usize, progress: Progress },
    Publish { credential_index: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Still inside the current attempt; sleep one poll interval.
    Waiting,
    /// A new attempt was started; tick again without sleeping.
    Advanced,
    /// Connected or failed. See [`ConnectEngine::outcome`].
    Finished,
    /// The event does not apply to the current state.
    Ignored,
}

impl Step {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Advanced => "advanced",
            Self::Finished => "finished",
            Self::Ignored => "ignored",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConnectStep {
    pub step: Step,
    pub effects: Vec<ConnectEffect, MAX_EFFECTS_PER_STEP>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected { credential_index: usize },
    TimedOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectReport {
    pub attempts: u32,
    pub elapsed: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectError {
    /// The global deadline passed with no attempt reaching `Connected`.
    Timeout(ConnectReport),
}

impl ConnectError {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
        }
    }

    pub const fn report(self) -> ConnectReport {
        match self {
            Self::Timeout(report) => report,
        }
    }
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report();
        write!(
            f,
            "{} attempts={} elapsed_ms={}",
            self.as_str(),
            report.attempts,
            report.elapsed.as_millis()
        )
    }
}

/// Successful `connect`: what was published and how long it took.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    pub identity: NetworkIdentity,
    pub report: ConnectReport,
}
