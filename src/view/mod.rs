//! View/feedback layer.
//!
//! The orchestrator reports through [`StatusSink`]; sinks only observe and
//! can never influence control flow.

pub mod board;
pub mod setup;
pub mod toast;

pub use board::{StatusBoardSink, StepView};
pub use setup::SetupNotice;
pub use toast::{Toast, ToastKind, ToastQueue, ToastSink};

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use crate::network;
use crate::orchestrator::{Step, StepStatus};
use crate::shared::{Address, ChainId};

/// A step changed status in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub run_id: u64,
    pub address: Address,
    pub step: Step,
    pub status: StepStatus,
    pub message: String,
}

/// Session-level events that are not tied to a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    RunStarted { run_id: u64, address: Address },
    Disconnected,
    ConnectOpened,
    NetworkChanged { chain_id: Option<ChainId> },
    NetworkSwitched { chain_id: ChainId, name: String },
    NetworkSwitchFailed { chain_id: ChainId, message: String },
}

pub trait StatusSink {
    fn on_step_status(&mut self, update: &StatusUpdate);

    fn on_notice(&mut self, _notice: &Notice) {}
}

pub type SharedSink = Rc<RefCell<dyn StatusSink>>;

/// Logs every update through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn on_step_status(&mut self, update: &StatusUpdate) {
        let address = crate::shared::truncate_address(&update.address.to_string());
        match update.status {
            StepStatus::Error => tracing::warn!(
                run_id = update.run_id,
                address = %address,
                step = ?update.step,
                "{}",
                update.message
            ),
            _ => tracing::info!(
                run_id = update.run_id,
                address = %address,
                step = ?update.step,
                status = ?update.status,
                "{}",
                update.message
            ),
        }
    }

    fn on_notice(&mut self, notice: &Notice) {
        match notice {
            Notice::NetworkSwitchFailed { chain_id, message } => {
                tracing::warn!(chain_id = chain_id.get(), "Network switch failed: {}", message)
            }
            other => tracing::info!("{:?}", other),
        }
    }
}

/// Forwards to several sinks in order.
#[derive(Default)]
pub struct Fanout {
    sinks: Vec<SharedSink>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: SharedSink) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl StatusSink for Fanout {
    fn on_step_status(&mut self, update: &StatusUpdate) {
        for sink in &self.sinks {
            sink.borrow_mut().on_step_status(update);
        }
    }

    fn on_notice(&mut self, notice: &Notice) {
        for sink in &self.sinks {
            sink.borrow_mut().on_notice(notice);
        }
    }
}

/// Label for the network switch button.
pub fn switch_label(current: Option<ChainId>) -> String {
    let target = network::switch_target(current);
    if target.id == network::MAINNET.id {
        "Switch to Mainnet".to_string()
    } else {
        format!("Switch to {}", target.name)
    }
}
