use embassy_time::Duration;

// Baselines from the boot firmware this controller replaces: 20 s for the whole join,
// 500 ms per credential, 100 ms between status polls.
pub const CONNECT_TIMEOUT_DEFAULT_MS: u32 = 20_000;
pub const RETRY_DELAY_DEFAULT_MS: u32 = 500;
pub const POLL_INTERVAL_DEFAULT_MS: u32 = 100;

const CONNECT_TIMEOUT_MIN_MS: u32 = 1_000;
const CONNECT_TIMEOUT_MAX_MS: u32 = 600_000;
const RETRY_DELAY_MIN_MS: u32 = 100;
const RETRY_DELAY_MAX_MS: u32 = 60_000;
const POLL_INTERVAL_MIN_MS: u32 = 10;

/// Timing budget of one `connect` call.
///
/// The raw values are honored as given (a zero is read as 1 ms so time always moves);
/// `sanitized` is for values that come from build-time configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectPolicy {
    pub global_timeout_ms: u32,
    pub retry_delay_ms: u32,
    pub poll_interval_ms: u32,
}

impl ConnectPolicy {
    pub const fn defaults() -> Self {
        Self {
            global_timeout_ms: CONNECT_TIMEOUT_DEFAULT_MS,
            retry_delay_ms: RETRY_DELAY_DEFAULT_MS,
            poll_interval_ms: POLL_INTERVAL_DEFAULT_MS,
        }
    }

    pub const fn new(global_timeout_ms: u32, retry_delay_ms: u32, poll_interval_ms: u32) -> Self {
        Self {
            global_timeout_ms,
            retry_delay_ms,
            poll_interval_ms,
        }
    }

    pub const fn sanitized(self) -> Self {
        let global_timeout_ms = clamp_u32(
            self.global_timeout_ms,
            CONNECT_TIMEOUT_MIN_MS,
            CONNECT_TIMEOUT_MAX_MS,
        );
        let retry_delay_ms = clamp_u32(self.retry_delay_ms, RETRY_DELAY_MIN_MS, RETRY_DELAY_MAX_MS);
        let poll_interval_ms = clamp_u32(self.poll_interval_ms, POLL_INTERVAL_MIN_MS, retry_delay_ms);
        Self {
            global_timeout_ms,
            retry_delay_ms,
            poll_interval_ms,
        }
    }

    /// Defaults with any parseable override applied, then sanitized.
    pub fn from_overrides(
        global_timeout_ms: Option<&str>,
        retry_delay_ms: Option<&str>,
        poll_interval_ms: Option<&str>,
    ) -> Self {
        let defaults = Self::defaults();
        Self {
            global_timeout_ms: parse_ms(global_timeout_ms).unwrap_or(defaults.global_timeout_ms),
            retry_delay_ms: parse_ms(retry_delay_ms).unwrap_or(defaults.retry_delay_ms),
            poll_interval_ms: parse_ms(poll_interval_ms).unwrap_or(defaults.poll_interval_ms),
        }
        .sanitized()
    }

    pub fn global_timeout(&self) -> Duration {
        at_least_one_ms(self.global_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        at_least_one_ms(self.retry_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        at_least_one_ms(self.poll_interval_ms)
    }

    /// Worst-case attempt count, `ceil(global / retry)`.
    pub fn max_attempts(&self) -> u32 {
        let global = self.global_timeout_ms.max(1);
        let retry = self.retry_delay_ms.max(1);
        global.div_ceil(retry)
    }
}

impl Default for ConnectPolicy {
    fn default() -> Self {
        Self::defaults()
    }
}

fn parse_ms(value: Option<&str>) -> Option<u32> {
    value.and_then(|raw| raw.trim().parse().ok())
}

fn at_least_one_ms(ms: u32) -> Duration {
    Duration::from_millis(ms.max(1) as u64)
}

const fn clamp_u32(value: u32, min: u32, max: u32) -> u32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}
