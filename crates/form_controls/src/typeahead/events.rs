//! Events posted by the debounce timer and lookup tasks, and the failure
//! shown to the user when a lookup does not produce results.

use client_core::SearchError;
use shared::domain::Suggestion;

use super::cache::CacheKey;

pub const TIMEOUT_MESSAGE: &str = "Search is taking too long. Please try again.";
pub const FAILURE_MESSAGE: &str = "Couldn't load suggestions. Please try again.";

/// Every event carries the token of the cycle that produced it; the
/// controller drops events whose token is no longer current.
#[derive(Debug)]
pub(crate) enum LookupEvent {
    DebounceElapsed {
        token: u64,
    },
    Finished {
        token: u64,
        key: CacheKey,
        outcome: LookupOutcome,
    },
}

impl LookupEvent {
    pub(crate) fn token(&self) -> u64 {
        match self {
            Self::DebounceElapsed { token } | Self::Finished { token, .. } => *token,
        }
    }
}

#[derive(Debug)]
pub(crate) enum LookupOutcome {
    Items(Vec<Suggestion>),
    TimedOut,
    Failed(SearchError),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Lookup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFailure {
    kind: FailureKind,
    cause: String,
}

impl LookupFailure {
    pub(crate) fn timed_out(after_ms: u128) -> Self {
        Self {
            kind: FailureKind::Timeout,
            cause: format!("no response after {after_ms}ms"),
        }
    }

    pub(crate) fn from_error(err: &SearchError) -> Self {
        let kind = match err {
            SearchError::Timeout => FailureKind::Timeout,
            _ => FailureKind::Lookup,
        };
        Self {
            kind,
            cause: err.to_string(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// User-facing text; timeouts read differently from other failures.
    pub fn message(&self) -> &'static str {
        match self.kind {
            FailureKind::Timeout => TIMEOUT_MESSAGE,
            FailureKind::Lookup => FAILURE_MESSAGE,
        }
    }

    pub fn cause(&self) -> &str {
        &self.cause
    }

    pub fn is_retryable(&self) -> bool {
        true
    }
}
