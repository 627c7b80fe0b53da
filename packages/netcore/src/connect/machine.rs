use embassy_time::{Duration, Instant};
use heapless::Vec;
use statig::prelude::*;

use super::{
    ConnectEffect, ConnectEvent, ConnectOutcome, ConnectPolicy, Step, MAX_EFFECTS_PER_STEP,
};
use crate::{
    credentials::next_index,
    feedback::{Progress, StatusPhase},
    link::LinkStatus,
};

/// One try with one credential. Lives only as long as the `connecting` state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct AttemptContext {
    pub(super) credential_index: usize,
    pub(super) started_at: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct GlobalDeadline {
    start: Instant,
    timeout: Duration,
}

impl GlobalDeadline {
    fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start)
    }

    fn expired(&self, now: Instant) -> bool {
        self.elapsed(now) >= self.timeout
    }

    fn progress(&self, now: Instant) -> Progress {
        Progress::from_elapsed(self.elapsed(now), self.timeout)
    }
}

#[derive(Debug)]
pub(super) struct ConnectMachine {
    policy: ConnectPolicy,
    credential_count: usize,
    deadline: Option<GlobalDeadline>,
    pub(super) attempts: u32,
    pub(super) outcome: Option<ConnectOutcome>,
}

#[derive(Debug)]
pub(super) struct DispatchContext {
    pub(super) step: Step,
    pub(super) effects: Vec<ConnectEffect, MAX_EFFECTS_PER_STEP>,
}

impl Default for DispatchContext {
    fn default() -> Self {
        Self {
            step: Step::Ignored,
            effects: Vec::new(),
        }
    }
}

impl DispatchContext {
    fn emit(&mut self, effect: ConnectEffect) {
        // No dispatch produces more than MAX_EFFECTS_PER_STEP effects.
        let _ = self.effects.push(effect);
    }
}

impl ConnectMachine {
    pub(super) fn new(policy: ConnectPolicy, credential_count: usize) -> Self {
        Self {
            policy,
            credential_count: credential_count.max(1),
            deadline: None,
            attempts: 0,
            outcome: None,
        }
    }

    pub(super) fn elapsed(&self, now: Instant) -> Duration {
        self.deadline
            .map(|deadline| deadline.elapsed(now))
            .unwrap_or(Duration::from_ticks(0))
    }

    fn begin_attempt(
        &mut self,
        context: &mut DispatchContext,
        credential_index: usize,
        now: Instant,
    ) -> AttemptContext {
        self.attempts = self.attempts.saturating_add(1);
        context.emit(ConnectEffect::Begin { credential_index });
        context.emit(ConnectEffect::Signal(StatusPhase::Connecting));
        context.step = Step::Advanced;
        AttemptContext {
            credential_index,
            started_at: now,
        }
    }

    fn fail(&mut self, context: &mut DispatchContext, credential_index: usize) {
        context.emit(ConnectEffect::Report {
            credential_index,
            progress: Progress::COMPLETE,
        });
        context.emit(ConnectEffect::Signal(StatusPhase::ErrorWifi));
        context.step = Step::Finished;
        self.outcome = Some(ConnectOutcome::TimedOut);
    }
}

#[state_machine(initial = "State::idle()")]
impl ConnectMachine {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &ConnectEvent) -> Outcome<State> {
        match *event {
            ConnectEvent::Start { now } => {
                context.emit(ConnectEffect::Signal(StatusPhase::Scanning));
                self.deadline = Some(GlobalDeadline {
                    start: now,
                    timeout: self.policy.global_timeout(),
                });
                let attempt = self.begin_attempt(context, 0, now);
                Transition(State::connecting(attempt))
            }
            ConnectEvent::Tick { .. } => Handled,
        }
    }

    #[state]
    fn connecting(
        &mut self,
        attempt: &mut AttemptContext,
        context: &mut DispatchContext,
        event: &ConnectEvent,
    ) -> Outcome<State> {
        let ConnectEvent::Tick { now, link } = *event else {
            return Handled;
        };
        let Some(deadline) = self.deadline else {
            return Handled;
        };

        if link == LinkStatus::Connected {
            context.emit(ConnectEffect::Publish {
                credential_index: attempt.credential_index,
            });
            context.emit(ConnectEffect::Signal(StatusPhase::Connected));
            context.step = Step::Finished;
            self.outcome = Some(ConnectOutcome::Connected {
                credential_index: attempt.credential_index,
            });
            return Transition(State::connected());
        }

        let in_window =
            now.saturating_duration_since(attempt.started_at) < self.policy.retry_delay();
        if in_window && !deadline.expired(now) {
            context.emit(ConnectEffect::Report {
                credential_index: attempt.credential_index,
                progress: deadline.progress(now),
            });
            context.step = Step::Waiting;
            return Handled;
        }

        // Top of the next attempt: the deadline decides before any credential is touched.
        if deadline.expired(now) {
            self.fail(context, attempt.credential_index);
            return Transition(State::failed());
        }
        let index = next_index(attempt.credential_index, self.credential_count);
        let next = self.begin_attempt(context, index, now);
        Transition(State::connecting(next))
    }

    #[state]
    fn connected(&mut self, context: &mut DispatchContext) -> Outcome<State> {
        context.step = Step::Finished;
        Handled
    }

    #[state]
    fn failed(&mut self, context: &mut DispatchContext) -> Outcome<State> {
        context.step = Step::Finished;
        Handled
    }
}
