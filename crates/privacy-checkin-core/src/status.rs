use thiserror::Error;

use crate::domain::TimestampMs;

pub const SUCCESS_TOAST_MS: u64 = 2_000;
pub const ERROR_TOAST_MS: u64 = 3_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPhase {
    Idle,
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Begin,
    Succeed,
    Fail,
    Dismiss,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("illegal status transition: {from:?} --{action:?}-->")]
pub struct StatusTransitionError {
    pub from: StatusPhase,
    pub action: StatusAction,
}

pub fn status_transition(
    from: StatusPhase,
    action: StatusAction,
) -> Result<(StatusPhase, &'static str), StatusTransitionError> {
    use StatusAction as A;
    use StatusPhase as S;
    match (from, action) {
        (_, A::Begin) => Ok((S::Pending, "operation_started")),
        (_, A::Succeed) => Ok((S::Success, "operation_succeeded")),
        (_, A::Fail) => Ok((S::Error, "operation_failed")),
        (S::Success | S::Error, A::Dismiss) => Ok((S::Idle, "toast_expired")),
        (S::Idle | S::Pending, A::Dismiss) => Err(StatusTransitionError { from, action }),
    }
}

/// Transient status toast. Settled toasts expire on their own; pending ones
/// stay until the operation settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusToast {
    phase: StatusPhase,
    message: String,
    dismiss_at: Option<TimestampMs>,
    success_ttl_ms: u64,
    error_ttl_ms: u64,
}

impl Default for StatusToast {
    fn default() -> Self {
        Self::with_timeouts(SUCCESS_TOAST_MS, ERROR_TOAST_MS)
    }
}

impl StatusToast {
    pub fn with_timeouts(success_ttl_ms: u64, error_ttl_ms: u64) -> Self {
        Self {
            phase: StatusPhase::Idle,
            message: String::new(),
            dismiss_at: None,
            success_ttl_ms,
            error_ttl_ms,
        }
    }

    pub fn phase(&self) -> StatusPhase {
        self.phase
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_visible(&self) -> bool {
        self.phase != StatusPhase::Idle
    }

    pub fn dismiss_at(&self) -> Option<TimestampMs> {
        self.dismiss_at
    }

    pub fn pending(&mut self, message: impl Into<String>) {
        self.apply(StatusAction::Begin, message.into(), None);
    }

    pub fn success(&mut self, message: impl Into<String>, now: TimestampMs) {
        let at = TimestampMs(now.0.saturating_add(self.success_ttl_ms));
        self.apply(StatusAction::Succeed, message.into(), Some(at));
    }

    pub fn error(&mut self, message: impl Into<String>, now: TimestampMs) {
        let at = TimestampMs(now.0.saturating_add(self.error_ttl_ms));
        self.apply(StatusAction::Fail, message.into(), Some(at));
    }

    /// Clears an expired toast. Returns true when the toast was dismissed.
    pub fn tick(&mut self, now: TimestampMs) -> bool {
        match self.dismiss_at {
            Some(at) if at.0 <= now.0 => self.dismiss().is_ok(),
            _ => false,
        }
    }

    pub fn dismiss(&mut self) -> Result<(), StatusTransitionError> {
        let (next, _) = status_transition(self.phase, StatusAction::Dismiss)?;
        self.phase = next;
        self.message.clear();
        self.dismiss_at = None;
        Ok(())
    }

    fn apply(&mut self, action: StatusAction, message: String, dismiss_at: Option<TimestampMs>) {
        // Begin/Succeed/Fail are legal from every phase.
        if let Ok((next, reason)) = status_transition(self.phase, action) {
            tracing::debug!(from = ?self.phase, to = ?next, reason, "status toast");
            self.phase = next;
            self.message = message;
            self.dismiss_at = dismiss_at;
        }
    }
}
