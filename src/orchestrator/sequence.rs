//! The connect → sign → balance → send sequence for one run.
//!
//! Steps run strictly in order; the first failure stops the run and every
//! later step stays `Idle`. Updates from a run that has been superseded are
//! still applied to its own record but never reach the sink.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use futures_timer::Delay;

use crate::actions::{Receipt, TxHandle, WalletActions};
use crate::config::{ConfirmationPolicy, FlowConfig, SendAmount};
use crate::error::ActionError;
use crate::orchestrator::state::{ActionRun, ErrorInfo, ErrorKind, RunPhase, Step, StepStatus};
use crate::shared::{truncate_address, Address, Wei};
use crate::view::board::CONFIRMING_MESSAGE;
use crate::view::{SharedSink, StatusUpdate};

/// Amount to send for a given balance.
///
/// With a reserve the result is `floor(balance * (100 - pct) / 100)`, and a
/// zero result is an insufficient balance.
pub fn send_amount(policy: SendAmount, balance: Wei) -> Result<Wei, ActionError> {
    match policy {
        SendAmount::ReservePercent(reserve_percent) => {
            let amount = balance.after_reserve(reserve_percent);
            if amount.is_zero() {
                return Err(ActionError::InsufficientBalance {
                    balance,
                    reserve_percent,
                });
            }
            Ok(amount)
        }
        SendAmount::Fixed(amount) => Ok(amount),
    }
}

/// Everything one run needs, captured when it starts.
pub(crate) struct RunContext {
    pub run: Rc<RefCell<ActionRun>>,
    pub generation: Rc<Cell<u64>>,
    pub sink: SharedSink,
    pub actions: WalletActions,
    pub flow: FlowConfig,
    pub native_symbol: &'static str,
}

type Halt = (Step, RunPhase, ActionError);

impl RunContext {
    fn run_id(&self) -> u64 {
        self.run.borrow().id
    }

    fn address(&self) -> Address {
        self.run.borrow().address
    }

    fn is_current(&self) -> bool {
        self.generation.get() == self.run_id()
    }

    fn advance(&self, phase: RunPhase) {
        let result = self.run.borrow_mut().advance(phase);
        match result {
            Ok(()) => tracing::info!(run_id = self.run_id(), phase = ?phase, "Run phase"),
            Err(e) => tracing::error!(run_id = self.run_id(), "{}", e),
        }
    }

    fn report(&self, step: Step, status: StepStatus, message: impl Into<String>) {
        let result = self.run.borrow_mut().set_step(step, status);
        if let Err(e) = result {
            tracing::error!(run_id = self.run_id(), "Status update rejected: {}", e);
            return;
        }
        if !self.is_current() {
            tracing::debug!(
                run_id = self.run_id(),
                step = ?step,
                status = ?status,
                "Dropping update from superseded run"
            );
            return;
        }

        let update = StatusUpdate {
            run_id: self.run_id(),
            address: self.address(),
            step,
            status,
            message: message.into(),
        };
        self.sink.borrow_mut().on_step_status(&update);
    }

    fn fail(&self, (step, phase, error): Halt) {
        let message = error.to_string();
        tracing::warn!(run_id = self.run_id(), step = ?step, "Step failed: {}", message);
        self.run.borrow_mut().last_error = Some(ErrorInfo {
            step,
            kind: ErrorKind::of(&error),
            message: message.clone(),
        });
        self.advance(phase);
        self.report(step, StepStatus::Error, message);
    }

    fn ether(&self, amount: Wei) -> String {
        format!("{} {}", amount.to_ether_string(), self.native_symbol)
    }
}

pub(crate) async fn execute(ctx: RunContext) -> ActionRun {
    if let Err(halt) = drive(&ctx).await {
        ctx.fail(halt);
    }
    let run = ctx.run.borrow().clone();
    run
}

async fn drive(ctx: &RunContext) -> Result<(), Halt> {
    let address = ctx.address();

    ctx.advance(RunPhase::ConnectDetected);
    ctx.report(
        Step::Connect,
        StepStatus::Success,
        format!("Connected: {}", truncate_address(&address.to_string())),
    );

    if ctx.flow.require_signature {
        ctx.advance(RunPhase::Signing);
        ctx.report(Step::Sign, StepStatus::Pending, "Check Wallet");
        let signature = ctx
            .actions
            .request_signature(address, &ctx.flow.signature_message)
            .await
            .map_err(|e| (Step::Sign, RunPhase::SignFailed, e))?;
        let message = format!("Signature: {}", signature);
        ctx.run.borrow_mut().signature = Some(signature);
        ctx.advance(RunPhase::SignSuccess);
        ctx.report(Step::Sign, StepStatus::Success, message);
    }

    let balance_failed = |e: ActionError| (Step::BalanceCheck, RunPhase::BalanceFailed, e);
    ctx.advance(RunPhase::BalanceCheck);
    ctx.report(Step::BalanceCheck, StepStatus::Pending, "Reading balance...");
    let balance = ctx
        .actions
        .read_balance(address)
        .await
        .map_err(balance_failed)?;
    ctx.run.borrow_mut().balance = Some(balance);
    let amount = send_amount(ctx.flow.send_amount, balance).map_err(balance_failed)?;
    ctx.run.borrow_mut().send_amount = Some(amount);
    ctx.advance(RunPhase::BalanceSuccess);
    ctx.report(
        Step::BalanceCheck,
        StepStatus::Success,
        format!("Balance: {}, sending {}", ctx.ether(balance), ctx.ether(amount)),
    );

    let send_failed = |e: ActionError| (Step::Send, RunPhase::SendFailed, e);
    ctx.advance(RunPhase::Sending);
    ctx.report(Step::Send, StepStatus::Pending, "Check Wallet");
    let recipient = ctx.flow.recipient.resolve(address);
    let tx = ctx
        .actions
        .submit_transaction_to(address, recipient, amount)
        .await
        .map_err(send_failed)?;
    ctx.run.borrow_mut().tx = Some(tx);

    if let ConfirmationPolicy::Receipt { poll_interval } = ctx.flow.confirmation {
        ctx.report(Step::Send, StepStatus::Pending, CONFIRMING_MESSAGE);
        wait_for_receipt(&ctx.actions, tx, poll_interval)
            .await
            .map_err(send_failed)?;
    }

    ctx.advance(RunPhase::SendSuccess);
    ctx.report(
        Step::Send,
        StepStatus::Success,
        format!("Transaction sent: {}", tx.hash),
    );
    Ok(())
}

/// Poll until a receipt shows up. There is no timeout.
async fn wait_for_receipt(
    actions: &WalletActions,
    tx: TxHandle,
    poll_interval: Duration,
) -> Result<Receipt, ActionError> {
    loop {
        if let Some(receipt) = actions.transaction_receipt(tx.hash).await? {
            if !receipt.success {
                return Err(ActionError::Reverted(tx.hash));
            }
            return Ok(receipt);
        }
        Delay::new(poll_interval).await;
    }
}
