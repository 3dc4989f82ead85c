//! Toast notifications: a bounded, newest-first queue with expiry.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::orchestrator::{Step, StepStatus};
use crate::view::{Notice, StatusSink, StatusUpdate};

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(4500);
pub const DEFAULT_MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub title: String,
    pub subtitle: String,
    pub duration: Duration,
    pub created_at: DateTime<Utc>,
}

impl Toast {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(self.duration) {
            Ok(d) => now >= self.created_at + d,
            Err(_) => false,
        }
    }
}

#[derive(Debug)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
    max: usize,
    duration: Duration,
    next_id: u64,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOASTS)
    }
}

impl ToastQueue {
    pub fn new(max: usize) -> Self {
        Self {
            toasts: VecDeque::new(),
            max: max.max(1),
            duration: DEFAULT_TOAST_DURATION,
            next_id: 1,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn push(&mut self, kind: ToastKind, title: &str, subtitle: &str) -> u64 {
        self.push_at(kind, title, subtitle, Utc::now())
    }

    /// Newest first; the oldest toast is dropped once the queue is full.
    pub fn push_at(&mut self, kind: ToastKind, title: &str, subtitle: &str, now: DateTime<Utc>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push_front(Toast {
            id,
            kind,
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            duration: self.duration,
            created_at: now,
        });
        self.toasts.truncate(self.max);
        id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    /// Drop expired toasts, returning how many were removed.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.toasts.len();
        self.toasts.retain(|t| !t.is_expired(now));
        before - self.toasts.len()
    }

    pub fn toasts(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.front()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

/// Turns terminal step statuses and session notices into toasts.
#[derive(Debug, Default)]
pub struct ToastSink {
    queue: ToastQueue,
}

impl ToastSink {
    pub fn new(queue: ToastQueue) -> Self {
        Self { queue }
    }

    pub fn queue(&self) -> &ToastQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut ToastQueue {
        &mut self.queue
    }
}

fn success_title(step: Step) -> &'static str {
    match step {
        Step::Connect => "Wallet connected",
        Step::Sign => "Message signed",
        Step::BalanceCheck => "Balance checked",
        Step::Send => "Transaction sent",
    }
}

fn error_title(step: Step) -> &'static str {
    match step {
        Step::Connect => "Connection failed",
        Step::Sign => "Signature failed",
        Step::BalanceCheck => "Balance check failed",
        Step::Send => "Transaction failed",
    }
}

impl StatusSink for ToastSink {
    fn on_step_status(&mut self, update: &StatusUpdate) {
        match update.status {
            StepStatus::Success => {
                self.queue
                    .push(ToastKind::Success, success_title(update.step), &update.message);
            }
            StepStatus::Error => {
                self.queue
                    .push(ToastKind::Error, error_title(update.step), &update.message);
            }
            StepStatus::Idle | StepStatus::Pending => {}
        }
    }

    fn on_notice(&mut self, notice: &Notice) {
        match notice {
            Notice::NetworkSwitched { name, .. } => {
                self.queue
                    .push(ToastKind::Success, "Network switched", &format!("Now on {}", name));
            }
            Notice::NetworkSwitchFailed { message, .. } => {
                self.queue.push(ToastKind::Error, "Network switch failed", message);
            }
            Notice::Disconnected => {
                self.queue.push(ToastKind::Info, "Wallet disconnected", "");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ChainId;

    #[test]
    fn test_newest_first_and_bounded() {
        let mut queue = ToastQueue::new(2);
        queue.push(ToastKind::Info, "one", "");
        queue.push(ToastKind::Info, "two", "");
        queue.push(ToastKind::Info, "three", "");

        let titles: Vec<_> = queue.toasts().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["three", "two"]);
    }

    #[test]
    fn test_expiry() {
        let mut queue = ToastQueue::default();
        let start = Utc::now();
        queue.push_at(ToastKind::Info, "old", "", start);
        queue.push_at(ToastKind::Info, "new", "", start + chrono::Duration::seconds(3));

        assert_eq!(queue.latest().unwrap().duration, Duration::from_millis(4500));
        assert_eq!(queue.prune_expired(start + chrono::Duration::seconds(5)), 1);
        assert_eq!(queue.latest().unwrap().title, "new");
        assert_eq!(queue.prune_expired(start + chrono::Duration::seconds(8)), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dismiss() {
        let mut queue = ToastQueue::default();
        let id = queue.push(ToastKind::Error, "x", "");
        assert!(queue.dismiss(id));
        assert!(!queue.dismiss(id));
    }

    #[test]
    fn test_sink_ignores_pending() {
        let mut sink = ToastSink::default();
        let mut update = StatusUpdate {
            run_id: 1,
            address: "0x0000000000000000000000000000000000000001".parse().unwrap(),
            step: Step::Sign,
            status: StepStatus::Pending,
            message: "Check Wallet".into(),
        };
        sink.on_step_status(&update);
        assert!(sink.queue().is_empty());

        update.status = StepStatus::Error;
        update.message = "User rejected the request".into();
        sink.on_step_status(&update);
        let toast = sink.queue().latest().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.title, "Signature failed");
        assert_eq!(toast.subtitle, "User rejected the request");
    }

    #[test]
    fn test_sink_network_notices() {
        let mut sink = ToastSink::default();
        sink.on_notice(&Notice::NetworkSwitched {
            chain_id: ChainId::new(1),
            name: "Ethereum".into(),
        });
        assert_eq!(sink.queue().latest().unwrap().subtitle, "Now on Ethereum");
        sink.on_notice(&Notice::ConnectOpened);
        assert_eq!(sink.queue().len(), 1);
    }
}
