//! SLA countdown for approval steps

use chrono::{DateTime, Local, Utc};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::client::models::{ApprovalFlowSummary, ApprovalStep};
use crate::i18n::{Language, TimeUnit, fill};

/// How often SLA countdowns are recomputed while a step is pending
pub const SLA_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Where a step stands against its SLA
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaState {
    /// Seconds left; zero counts as remaining
    Remaining(i64),
    /// Seconds past the deadline, as a negative number
    Overdue(i64),
    /// Neither a deadline nor a remaining count is known
    Unset,
}

/// Seconds until the step's deadline, floored. Falls back to the server's
/// remaining count when there is no deadline.
pub fn remaining_seconds(step: &ApprovalStep, now: DateTime<Utc>) -> Option<i64> {
    match step.sla_deadline {
        Some(deadline) => Some((deadline - now).num_milliseconds().div_euclid(1000)),
        None => step.sla_seconds_remaining,
    }
}

pub fn sla_state(step: &ApprovalStep, now: DateTime<Utc>) -> SlaState {
    match remaining_seconds(step, now) {
        Some(s) if s >= 0 => SlaState::Remaining(s),
        Some(s) => SlaState::Overdue(s),
        None => SlaState::Unset,
    }
}

/// `value / divisor` rounded half toward positive infinity
fn round_div(value: i64, divisor: i64) -> i64 {
    (2 * value + divisor).div_euclid(2 * divisor)
}

/// Pick the display unit by magnitude and scale the value into it
pub fn relative_bucket(seconds: i64) -> (i64, TimeUnit) {
    let abs = seconds.abs();
    if abs < 60 {
        (seconds, TimeUnit::Seconds)
    } else if abs < 3_600 {
        (round_div(seconds, 60), TimeUnit::Minutes)
    } else if abs < 86_400 {
        (round_div(seconds, 3_600), TimeUnit::Hours)
    } else {
        (round_div(seconds, 86_400), TimeUnit::Days)
    }
}

/// Signed seconds as localized relative time ("in 5 minutes", "2 hours ago")
pub fn format_relative(seconds: i64, language: Language) -> String {
    let (value, unit) = relative_bucket(seconds);
    language.relative(value, unit)
}

/// Localized SLA line for a step
pub fn sla_message(step: &ApprovalStep, now: DateTime<Utc>, language: Language) -> String {
    let messages = language.messages();
    match sla_state(step, now) {
        SlaState::Remaining(s) => fill(messages.sla_remaining, "time", &format_relative(s, language)),
        SlaState::Overdue(s) => fill(messages.sla_overdue, "time", &format_relative(s, language)),
        SlaState::Unset => messages.sla_none.to_string(),
    }
}

/// The step's deadline in the local time zone
pub fn deadline_local(step: &ApprovalStep) -> Option<String> {
    step.sla_deadline
        .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
}

/// Periodic clock driving SLA re-rendering
///
/// The background task is aborted when the ticker is dropped.
pub struct SlaTicker {
    handle: JoinHandle<()>,
    rx: watch::Receiver<DateTime<Utc>>,
}

impl SlaTicker {
    /// Start ticking immediately, then every `period`
    pub fn start(period: Duration) -> Self {
        let (tx, rx) = watch::channel(Utc::now());
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if tx.send(Utc::now()).is_err() {
                    break;
                }
            }
        });
        Self { handle, rx }
    }

    /// Start a ticker only when some step is waiting on a decision
    pub fn start_if_pending(flows: &[ApprovalFlowSummary], period: Duration) -> Option<Self> {
        flows
            .iter()
            .any(ApprovalFlowSummary::has_pending_step)
            .then(|| Self::start(period))
    }

    /// Wait for the next tick and return its time
    pub async fn tick(&mut self) -> Option<DateTime<Utc>> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

impl Drop for SlaTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
