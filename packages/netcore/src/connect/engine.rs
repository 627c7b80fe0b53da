use embassy_time::{Duration, Instant};
use statig::blocking::IntoStateMachineExt as _;

use super::machine::{ConnectMachine, DispatchContext};
use super::{ConnectEvent, ConnectOutcome, ConnectPolicy, ConnectReport, ConnectStep};
use crate::link::LinkStatus;

pub struct ConnectEngine {
    machine: statig::blocking::StateMachine<ConnectMachine>,
}

impl ConnectEngine {
    /// `credential_count` is the length of a non-empty credential store.
    pub fn new(policy: ConnectPolicy, credential_count: usize) -> Self {
        Self {
            machine: ConnectMachine::new(policy, credential_count).state_machine(),
        }
    }

    pub fn start(&mut self, now: Instant) -> ConnectStep {
        self.dispatch(ConnectEvent::Start { now })
    }

    pub fn tick(&mut self, now: Instant, link: LinkStatus) -> ConnectStep {
        self.dispatch(ConnectEvent::Tick { now, link })
    }

    pub fn outcome(&self) -> Option<ConnectOutcome> {
        self.machine.inner().outcome
    }

    pub fn attempts(&self) -> u32 {
        self.machine.inner().attempts
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.machine.inner().elapsed(now)
    }

    pub fn report(&self, now: Instant) -> ConnectReport {
        ConnectReport {
            attempts: self.attempts(),
            elapsed: self.elapsed(now),
        }
    }

    fn dispatch(&mut self, event: ConnectEvent) -> ConnectStep {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&event, &mut context);
        ConnectStep {
            step: context.step,
            effects: context.effects,
        }
    }
}
