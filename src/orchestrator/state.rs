//! Run state: steps, phases and the per-run status board.

use serde::Serialize;
use thiserror::Error;

use crate::actions::TxHandle;
use crate::error::ActionError;
use crate::shared::{Address, Signature, Wei};

// ─── Step ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Connect,
    Sign,
    BalanceCheck,
    Send,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Connect, Step::Sign, Step::BalanceCheck, Step::Send];

    /// The step that must succeed before this one may start.
    pub fn prerequisite(&self) -> Option<Step> {
        match self {
            Step::Connect => None,
            Step::Sign => Some(Step::Connect),
            Step::BalanceCheck => Some(Step::Sign),
            Step::Send => Some(Step::BalanceCheck),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::Connect => "Connect Wallet",
            Step::Sign => "Sign Message",
            Step::BalanceCheck => "Check Balance",
            Step::Send => "Send Transaction",
        }
    }

    /// 1-based position in the flow.
    pub fn number(&self) -> usize {
        self.index() + 1
    }

    fn index(&self) -> usize {
        match self {
            Step::Connect => 0,
            Step::Sign => 1,
            Step::BalanceCheck => 2,
            Step::Send => 3,
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Success | StepStatus::Error)
    }
}

// ─── RunPhase ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    ConnectDetected,
    Signing,
    SignSuccess,
    SignFailed,
    BalanceCheck,
    BalanceSuccess,
    BalanceFailed,
    Sending,
    SendSuccess,
    SendFailed,
}

impl RunPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunPhase::SignFailed
                | RunPhase::BalanceFailed
                | RunPhase::SendFailed
                | RunPhase::SendSuccess
        )
    }

    pub fn can_transition_to(&self, next: RunPhase) -> bool {
        use RunPhase::*;
        matches!(
            (*self, next),
            (Idle, ConnectDetected)
                | (ConnectDetected, Signing)
                | (ConnectDetected, BalanceCheck)
                | (Signing, SignSuccess)
                | (Signing, SignFailed)
                | (SignSuccess, BalanceCheck)
                | (BalanceCheck, BalanceSuccess)
                | (BalanceCheck, BalanceFailed)
                | (BalanceSuccess, Sending)
                | (Sending, SendSuccess)
                | (Sending, SendFailed)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Illegal phase transition {from:?} -> {to:?}")]
    IllegalPhase { from: RunPhase, to: RunPhase },
    #[error("{step} already finished with {status:?}")]
    AlreadyTerminal { step: Step, status: StepStatus },
    #[error("{step} cannot start before {prerequisite} succeeds")]
    PrerequisiteNotMet { step: Step, prerequisite: Step },
    #[error("{step} cannot return to Idle")]
    BackToIdle { step: Step },
}

// ─── StepBoard ───────────────────────────────────────────────────────────────

/// Status of every step in one run.
///
/// A terminal status is written at most once, and only after the step's
/// prerequisite succeeded. When no signature is required the sign step is
/// skipped and `BalanceCheck` depends on `Connect` directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepBoard {
    statuses: [StepStatus; 4],
    sign_required: bool,
}

impl StepBoard {
    pub fn new(sign_required: bool) -> Self {
        Self {
            statuses: [StepStatus::Idle; 4],
            sign_required,
        }
    }

    pub fn get(&self, step: Step) -> StepStatus {
        self.statuses[step.index()]
    }

    pub fn set(&mut self, step: Step, status: StepStatus) -> Result<(), TransitionError> {
        let current = self.get(step);
        if current.is_terminal() {
            return Err(TransitionError::AlreadyTerminal {
                step,
                status: current,
            });
        }
        if status == StepStatus::Idle {
            return Err(TransitionError::BackToIdle { step });
        }
        if let Some(prerequisite) = self.unmet_prerequisite(step) {
            return Err(TransitionError::PrerequisiteNotMet { step, prerequisite });
        }
        self.statuses[step.index()] = status;
        Ok(())
    }

    fn unmet_prerequisite(&self, step: Step) -> Option<Step> {
        let mut prerequisite = step.prerequisite()?;
        if prerequisite == Step::Sign && !self.sign_required {
            prerequisite = Step::Connect;
        }
        (self.get(prerequisite) != StepStatus::Success).then_some(prerequisite)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Step, StepStatus)> + '_ {
        Step::ALL.iter().map(move |step| (*step, self.get(*step)))
    }
}

// ─── ActionRun ───────────────────────────────────────────────────────────────

/// Broad classification of a step failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ProviderUnavailable,
    UserRejected,
    InsufficientBalance,
    NetworkSwitchFailed,
    Config,
    Provider,
    InvalidAmount,
    MalformedResponse,
    Reverted,
}

impl ErrorKind {
    pub fn of(error: &ActionError) -> Self {
        match error {
            ActionError::ProviderUnavailable => ErrorKind::ProviderUnavailable,
            ActionError::UserRejected(_) => ErrorKind::UserRejected,
            ActionError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            ActionError::NetworkSwitchFailed(_) => ErrorKind::NetworkSwitchFailed,
            ActionError::Config(_) => ErrorKind::Config,
            ActionError::Provider(_) => ErrorKind::Provider,
            ActionError::InvalidAmount(_) => ErrorKind::InvalidAmount,
            ActionError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            ActionError::Reverted(_) => ErrorKind::Reverted,
        }
    }
}

/// The error that stopped a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub step: Step,
    pub kind: ErrorKind,
    pub message: String,
}

/// One execution of the flow for one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRun {
    pub id: u64,
    pub address: Address,
    phase: RunPhase,
    steps: StepBoard,
    pub last_error: Option<ErrorInfo>,
    pub signature: Option<Signature>,
    pub balance: Option<Wei>,
    pub send_amount: Option<Wei>,
    pub tx: Option<TxHandle>,
}

impl ActionRun {
    pub fn new(id: u64, address: Address, sign_required: bool) -> Self {
        Self {
            id,
            address,
            phase: RunPhase::Idle,
            steps: StepBoard::new(sign_required),
            last_error: None,
            signature: None,
            balance: None,
            send_amount: None,
            tx: None,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn steps(&self) -> &StepBoard {
        &self.steps
    }

    pub fn step(&self, step: Step) -> StepStatus {
        self.steps.get(step)
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn advance(&mut self, next: RunPhase) -> Result<(), TransitionError> {
        if !self.phase.can_transition_to(next) {
            return Err(TransitionError::IllegalPhase {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }

    pub(crate) fn set_step(&mut self, step: Step, status: StepStatus) -> Result<(), TransitionError> {
        self.steps.set(step, status)
    }
}
