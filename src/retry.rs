use std::thread;
use std::time::Duration;

use tracing::warn;

/// Exponential backoff settings applied around a fallible call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, backoff_multiplier: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            backoff_multiplier,
        }
    }

    /// A single attempt whose error propagates immediately.
    pub fn disabled() -> Self {
        Self::new(1, Duration::ZERO, 1.0)
    }

    pub fn backoff(&self) -> Backoff {
        Backoff {
            attempt: 1,
            attempts_remaining: self.max_attempts.max(1),
            current_delay: self.initial_delay,
            multiplier: self.backoff_multiplier,
        }
    }

    /// Runs `op`, sleeping on the current thread between transient failures.
    pub fn run<T, E, F, P>(&self, op: F, is_transient: P) -> Result<T, E>
    where
        F: FnMut(u32) -> Result<T, E>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        self.run_with_sleep(op, is_transient, thread::sleep)
    }

    /// Same as [`RetryPolicy::run`] with the sleep function supplied by the caller.
    ///
    /// `op` receives the 1-based attempt number. The last attempt is not
    /// guarded, so its error is returned exactly as `op` produced it.
    pub fn run_with_sleep<T, E, F, P, S>(
        &self,
        mut op: F,
        is_transient: P,
        mut sleep: S,
    ) -> Result<T, E>
    where
        F: FnMut(u32) -> Result<T, E>,
        P: Fn(&E) -> bool,
        S: FnMut(Duration),
        E: std::fmt::Display,
    {
        let mut backoff = self.backoff();

        while !backoff.is_final() {
            match op(backoff.attempt()) {
                Ok(value) => return Ok(value),
                Err(e) if is_transient(&e) => {
                    let delay = backoff.advance();
                    warn!(
                        "Attempt failed: {}. Retrying in {:?} ({} attempts left)",
                        e,
                        delay,
                        backoff.attempts_remaining()
                    );
                    sleep(delay);
                }
                Err(e) => return Err(e),
            }
        }

        op(backoff.attempt())
    }
}

/// Retry state: how many attempts are left and how long to wait before the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct Backoff {
    attempt: u32,
    attempts_remaining: u32,
    current_delay: Duration,
    multiplier: f64,
}

impl Backoff {
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }

    pub fn is_final(&self) -> bool {
        self.attempts_remaining <= 1
    }

    /// Consumes one attempt and returns the delay to wait before the next.
    pub fn advance(&mut self) -> Duration {
        let delay = self.current_delay;
        self.current_delay = scale(delay, self.multiplier);
        self.attempts_remaining = self.attempts_remaining.saturating_sub(1);
        self.attempt += 1;
        delay
    }
}

fn scale(delay: Duration, multiplier: f64) -> Duration {
    let secs = delay.as_secs_f64() * multiplier;
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
