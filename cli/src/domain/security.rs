//! Rate limiting, confirmation policy and the in-memory security event log.
//!
//! `SecurityValidator` is owned by whoever constructs the executor; there is
//! no process-wide instance. The rate check and the counter increment happen
//! under a single lock acquisition.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use wslm_common::Operation;

use crate::domain::error::ValidationError;

/// Maximum number of retained security events.
pub const EVENT_LOG_CAPACITY: usize = 100;

/// Length of a rate window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Operations allowed per window when no override is configured.
pub const DEFAULT_LIMIT: u32 = 10;

// ── Policy ───────────────────────────────────────────────────────────────────

/// Per-operation limits over a fixed window.
#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
    pub default_limit: u32,
    pub window: Duration,
    pub overrides: HashMap<Operation, u32>,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            window: DEFAULT_WINDOW,
            overrides: HashMap::new(),
        }
    }
}

impl RateLimitPolicy {
    #[must_use]
    pub fn uniform(limit: u32, window: Duration) -> Self {
        Self {
            default_limit: limit,
            window,
            overrides: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_override(mut self, operation: Operation, limit: u32) -> Self {
        self.overrides.insert(operation, limit);
        self
    }

    #[must_use]
    pub fn limit_for(&self, operation: Operation) -> u32 {
        self.overrides
            .get(&operation)
            .copied()
            .unwrap_or(self.default_limit)
    }
}

// ── Events ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEventKind {
    ValidationRejected,
    RateLimited,
    ConfirmationDeclined,
    Executed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct SecurityEvent {
    pub at: DateTime<Utc>,
    pub operation: Operation,
    pub kind: SecurityEventKind,
    pub detail: String,
}

impl SecurityEvent {
    #[must_use]
    pub fn new(operation: Operation, kind: SecurityEventKind, detail: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            operation,
            kind,
            detail: detail.into(),
        }
    }
}

// ── Validator ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started_at: Instant,
}

/// Gatekeeper consulted before every spawn.
#[derive(Debug)]
pub struct SecurityValidator {
    policy: RateLimitPolicy,
    windows: Mutex<HashMap<Operation, Window>>,
    events: Mutex<VecDeque<SecurityEvent>>,
}

impl Default for SecurityValidator {
    fn default() -> Self {
        Self::new(RateLimitPolicy::default())
    }
}

impl SecurityValidator {
    #[must_use]
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            windows: Mutex::new(HashMap::new()),
            events: Mutex::new(VecDeque::with_capacity(EVENT_LOG_CAPACITY)),
        }
    }

    #[must_use]
    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Count one attempt of `operation` against its window.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::RateLimited` with the remaining window time
    /// when the limit is already reached. A rejected attempt is not counted.
    pub fn check_rate_limit(&self, operation: Operation) -> Result<(), ValidationError> {
        self.check_rate_limit_at(operation, Instant::now())
    }

    /// [`check_rate_limit`](Self::check_rate_limit) with an explicit clock.
    ///
    /// # Errors
    ///
    /// See [`check_rate_limit`](Self::check_rate_limit).
    pub fn check_rate_limit_at(
        &self,
        operation: Operation,
        now: Instant,
    ) -> Result<(), ValidationError> {
        let limit = self.policy.limit_for(operation);
        let window = self.policy.window;

        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = windows.entry(operation).or_insert(Window {
            count: 0,
            started_at: now,
        });

        let elapsed = now.saturating_duration_since(entry.started_at);
        if elapsed >= window {
            *entry = Window {
                count: 0,
                started_at: now,
            };
        }

        if entry.count >= limit {
            let retry_after = window.saturating_sub(now.saturating_duration_since(entry.started_at));
            tracing::debug!(
                operation = %operation,
                count = entry.count,
                limit,
                retry_after_ms = u64::try_from(retry_after.as_millis()).unwrap_or(u64::MAX),
                "rate limit exceeded"
            );
            return Err(ValidationError::RateLimited {
                operation,
                retry_after,
            });
        }

        entry.count += 1;
        Ok(())
    }

    /// Whether `operation` must be confirmed by the user before it runs.
    ///
    /// Delete and Terminate discard state; Import replaces an install
    /// directory; Export overwrites its target archive.
    #[must_use]
    pub fn requires_confirmation(operation: Operation) -> bool {
        match operation {
            Operation::Delete | Operation::Import | Operation::Export | Operation::Terminate => {
                true
            }
            Operation::List | Operation::Run | Operation::Create | Operation::SetDefault => false,
        }
    }

    /// Append an event, evicting the oldest one past [`EVENT_LOG_CAPACITY`].
    pub fn record_security_event(&self, event: SecurityEvent) {
        tracing::info!(
            operation = %event.operation,
            kind = ?event.kind,
            detail = %event.detail,
            "security event"
        );
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        if events.len() >= EVENT_LOG_CAPACITY {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Snapshot of retained events, oldest first.
    #[must_use]
    pub fn recent_events(&self) -> Vec<SecurityEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}
