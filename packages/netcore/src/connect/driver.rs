use embassy_sync::blocking_mutex::raw::RawMutex;
use log::{info, warn};

use super::{
    ConnectEffect, ConnectEngine, ConnectError, ConnectOutcome, ConnectPolicy, Connection, Step,
};
use crate::{
    credentials::CredentialStore,
    feedback::{ProgressReporter, StatusSignaler},
    link::{Clock, NetworkLink},
    state::{NetworkIdentity, NetworkState},
};

/// Runs [`ConnectEngine`] against a link, a clock and the two feedback channels, and
/// publishes the joined network into `state`.
pub struct ConnectionController<'s, L, C, S, P, M: RawMutex> {
    link: L,
    clock: C,
    status: S,
    progress: P,
    state: &'s NetworkState<M>,
}

impl<'s, L, C, S, P, M> ConnectionController<'s, L, C, S, P, M>
where
    L: NetworkLink,
    C: Clock,
    S: StatusSignaler,
    P: ProgressReporter,
    M: RawMutex,
{
    pub fn new(link: L, clock: C, status: S, progress: P, state: &'s NetworkState<M>) -> Self {
        Self {
            link,
            clock,
            status,
            progress,
            state,
        }
    }

    pub fn link(&mut self) -> &mut L {
        &mut self.link
    }

    /// Tries `credentials` round-robin until one connects or `policy`'s global deadline
    /// passes. On failure the shared state is left as it was.
    pub async fn connect(
        &mut self,
        credentials: &CredentialStore<'_>,
        policy: ConnectPolicy,
    ) -> Result<Connection, ConnectError> {
        info!(
            "wifi: connect start networks={} timeout_ms={} retry_ms={} poll_ms={}",
            credentials.len(),
            policy.global_timeout_ms,
            policy.retry_delay_ms,
            policy.poll_interval_ms
        );
        let mut engine = ConnectEngine::new(policy, credentials.len());
        let mut published = None;
        let mut current = None;
        let mut step = engine.start(self.clock.now());
        loop {
            for effect in step.effects.iter() {
                if let Some(identity) = self.apply(credentials, &mut current, *effect).await {
                    published = Some(identity);
                }
            }
            match step.step {
                Step::Waiting => self.clock.sleep(policy.poll_interval()).await,
                Step::Advanced => {}
                Step::Finished | Step::Ignored => break,
            }
            let link = self.link.status();
            step = engine.tick(self.clock.now(), link);
        }

        let report = engine.report(self.clock.now());
        match (engine.outcome(), published) {
            (Some(ConnectOutcome::Connected { .. }), Some(identity)) => {
                info!(
                    "wifi: connected ssid={} ip={} attempts={} elapsed_ms={}",
                    identity.ssid(),
                    identity.address(),
                    report.attempts,
                    report.elapsed.as_millis()
                );
                Ok(Connection { identity, report })
            }
            _ => {
                warn!(
                    "wifi: connect failed attempts={} elapsed_ms={}",
                    report.attempts,
                    report.elapsed.as_millis()
                );
                Err(ConnectError::Timeout(report))
            }
        }
    }

    async fn apply(
        &mut self,
        credentials: &CredentialStore<'_>,
        current: &mut Option<usize>,
        effect: ConnectEffect,
    ) -> Option<NetworkIdentity> {
        match effect {
            ConnectEffect::Signal(phase) => self.status.set(phase),
            ConnectEffect::Begin { credential_index } => {
                // The first attempt takes the head of the list, every later one the
                // store's successor of the previous attempt.
                let (credential, credential_index) = match *current {
                    Some(previous) => credentials.next(previous),
                    None => (credentials.get(credential_index), credential_index),
                };
                *current = Some(credential_index);
                info!(
                    "wifi: attempt ssid={} index={} open={}",
                    credential.ssid(),
                    credential_index,
                    credential.is_open()
                );
                if let Err(err) = self.link.begin(credential).await {
                    warn!("wifi: begin failed ssid={} err={:?}", credential.ssid(), err);
                }
            }
            ConnectEffect::Report {
                credential_index,
                progress,
            } => {
                let credential = credentials.get(credential_index);
                self.progress.report(progress, credential.ssid(), None);
            }
            ConnectEffect::Publish { credential_index } => {
                let credential = credentials.get(credential_index);
                let identity = NetworkIdentity::new(credential.ssid(), self.link.local_address());
                self.state.publish(identity.clone());
                return Some(identity);
            }
        }
        None
    }
}
