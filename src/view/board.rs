//! In-memory status board: the latest status of each step for the current run.

use serde::Serialize;

use crate::orchestrator::{Step, StepStatus};
use crate::shared::Address;
use crate::view::{Notice, StatusSink, StatusUpdate};

/// Message the send step carries while waiting for a receipt.
pub const CONFIRMING_MESSAGE: &str = "Confirming...";

/// Presentation of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepView {
    pub number: usize,
    pub title: &'static str,
    pub status: StepStatus,
    pub details: &'static str,
}

impl StepView {
    pub fn new(step: Step, status: StepStatus, confirming: bool) -> Self {
        Self {
            number: step.number(),
            title: step.title(),
            status,
            details: details(step, status, confirming),
        }
    }
}

fn details(step: Step, status: StepStatus, confirming: bool) -> &'static str {
    match (step, status) {
        (Step::Connect, StepStatus::Success) => "Connected",
        (Step::Connect, StepStatus::Error) => "Failed",
        (Step::Connect, _) => "Awaiting",
        (Step::Sign, StepStatus::Pending) => "Check Wallet",
        (Step::Sign, StepStatus::Success) => "Signed",
        (Step::Sign, StepStatus::Error) => "Rejected",
        (Step::BalanceCheck, StepStatus::Pending) => "Checking...",
        (Step::BalanceCheck, StepStatus::Success) => "Checked",
        (Step::Send, StepStatus::Pending) if confirming => CONFIRMING_MESSAGE,
        (Step::Send, StepStatus::Pending) => "Check Wallet",
        (Step::Send, StepStatus::Success) => "Success",
        (_, StepStatus::Error) => "Failed",
        (_, _) => "Pending",
    }
}

#[derive(Debug, Clone, Default)]
struct Entry {
    status: StepStatus,
    message: String,
}

/// Keeps the latest status per step. A new run id clears the board so an
/// earlier run never shows through.
#[derive(Debug, Default)]
pub struct StatusBoardSink {
    run_id: Option<u64>,
    address: Option<Address>,
    entries: [Entry; 4],
    history: Vec<StatusUpdate>,
}

impl StatusBoardSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self, run_id: Option<u64>, address: Option<Address>) {
        self.run_id = run_id;
        self.address = address;
        self.entries = Default::default();
        self.history.clear();
    }

    pub fn run_id(&self) -> Option<u64> {
        self.run_id
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub fn status(&self, step: Step) -> StepStatus {
        self.entries[step.number() - 1].status
    }

    pub fn message(&self, step: Step) -> &str {
        &self.entries[step.number() - 1].message
    }

    /// Updates received for the current run, oldest first.
    pub fn history(&self) -> &[StatusUpdate] {
        &self.history
    }

    pub fn views(&self) -> Vec<StepView> {
        Step::ALL
            .iter()
            .map(|step| {
                let entry = &self.entries[step.number() - 1];
                StepView::new(*step, entry.status, entry.message == CONFIRMING_MESSAGE)
            })
            .collect()
    }
}

impl StatusSink for StatusBoardSink {
    fn on_step_status(&mut self, update: &StatusUpdate) {
        if self.run_id != Some(update.run_id) {
            self.reset(Some(update.run_id), Some(update.address));
        }
        self.entries[update.step.number() - 1] = Entry {
            status: update.status,
            message: update.message.clone(),
        };
        self.history.push(update.clone());
    }

    fn on_notice(&mut self, notice: &Notice) {
        match notice {
            Notice::RunStarted { run_id, address } => self.reset(Some(*run_id), Some(*address)),
            Notice::Disconnected => self.reset(None, None),
            _ => {}
        }
    }
}
