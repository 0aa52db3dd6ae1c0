// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("transport error: {message}")]
    Transport { message: String, transient: bool },
    #[error("no API key configured")]
    MissingKey,
    #[error("model returned an empty reply")]
    Empty,
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retryable,
    Fatal,
}

/// Rate limits and server faults are worth another attempt, whether they
/// arrive as a status code or only inside an error message.
pub fn classify(status: Option<u16>, message: &str) -> RetryDecision {
    let rate_limited = status == Some(429)
        || message.contains("429")
        || message.contains("RESOURCE_EXHAUSTED");
    let server_fault = matches!(status, Some(500..=599))
        || message.contains("500")
        || message.contains("503");
    if rate_limited || server_fault {
        RetryDecision::Retryable
    } else {
        RetryDecision::Fatal
    }
}

impl CallError {
    pub fn decision(&self) -> RetryDecision {
        match self {
            CallError::Status { status, message } => classify(Some(*status), message),
            CallError::Transport { transient: true, .. } => RetryDecision::Retryable,
            CallError::Transport { message, .. } | CallError::Other(message) => {
                classify(None, message)
            }
            CallError::MissingKey | CallError::Empty => RetryDecision::Fatal,
        }
    }
}

impl From<reqwest::Error> for CallError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(s) => CallError::Status {
                status: s.as_u16(),
                message: e.to_string(),
            },
            None => CallError::Transport {
                transient: e.is_timeout() || e.is_connect(),
                message: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
            max_jitter_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// Never sleeps; used by tests and offline runs.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: 0,
            max_jitter_ms: 0,
        }
    }

    /// Backoff before the attempt that follows `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = 2u64.saturating_pow(attempt.saturating_sub(1));
        let base = self.base_delay_ms.saturating_mul(exponent);
        let jitter = if self.max_jitter_ms == 0 {
            0
        } else {
            (std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.subsec_nanos() as u64)
                .unwrap_or(0))
                % (self.max_jitter_ms + 1)
        };
        Duration::from_millis(base.saturating_add(jitter))
    }

    pub fn run<T>(&self, op: impl FnMut() -> Result<T, CallError>) -> Result<T, CallError> {
        self.run_with_sleep(op, std::thread::sleep)
    }

    /// Like [`run`](Self::run) with the sleep supplied by the caller.
    pub fn run_with_sleep<T>(
        &self,
        mut op: impl FnMut() -> Result<T, CallError>,
        mut sleep: impl FnMut(Duration),
    ) -> Result<T, CallError> {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Ok(v) => return Ok(v),
                Err(e) if e.decision() == RetryDecision::Retryable && attempt < attempts => {
                    let wait = self.delay(attempt);
                    tracing::warn!(
                        attempt,
                        attempts,
                        error = %e,
                        "retrying in {}ms",
                        wait.as_millis()
                    );
                    sleep(wait);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_reads_status_and_message() {
        assert_eq!(classify(Some(429), ""), RetryDecision::Retryable);
        assert_eq!(classify(Some(502), ""), RetryDecision::Retryable);
        assert_eq!(classify(None, "RESOURCE_EXHAUSTED: quota"), RetryDecision::Retryable);
        assert_eq!(classify(None, "upstream 503"), RetryDecision::Retryable);
        assert_eq!(classify(Some(400), "bad request"), RetryDecision::Fatal);
        assert_eq!(classify(Some(401), ""), RetryDecision::Fatal);
    }

    #[test]
    fn delays_double_without_jitter() {
        let p = RetryPolicy {
            max_attempts: 3,
            base_delay_ms: 1_000,
            max_jitter_ms: 0,
        };
        assert_eq!(p.delay(1), Duration::from_millis(1_000));
        assert_eq!(p.delay(2), Duration::from_millis(2_000));
    }

    #[test]
    fn jitter_stays_bounded() {
        let p = RetryPolicy::default();
        for attempt in 1..=3 {
            let d = p.delay(attempt).as_millis() as u64;
            let base = 1_000 * 2u64.pow(attempt - 1);
            assert!(d >= base && d <= base + 500);
        }
    }
}
