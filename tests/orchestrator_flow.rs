//! End-to-end flow tests against a scripted wallet.
//!
//! Each test wires an `Orchestrator` to a `ScriptedProvider` and a
//! `StatusBoardSink`, feeds connection events, and checks both what the
//! wallet was asked and what the user would see.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde_json::json;

use wallet_actions::error::ProviderError;
use wallet_actions::orchestrator::{ErrorKind, TaskOutcome};
use wallet_actions::prelude::*;
use wallet_actions::provider::methods;
use wallet_actions::view::ToastKind;

const HASH: &str = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";
const DEAD: &str = "0x000000000000000000000000000000000000dEaD";

struct Harness {
    orchestrator: Orchestrator,
    wallet: Rc<ScriptedProvider>,
    board: Rc<RefCell<StatusBoardSink>>,
    toasts: Rc<RefCell<ToastSink>>,
}

fn address(n: u8) -> Address {
    format!("0x00000000000000000000000000000000000000{:02x}", n)
        .parse()
        .unwrap()
}

fn harness_with(config: AppConfig) -> Harness {
    let board = Rc::new(RefCell::new(StatusBoardSink::new()));
    let toasts = Rc::new(RefCell::new(ToastSink::default()));
    let sink = Fanout::new()
        .with(board.clone())
        .with(toasts.clone())
        .with(Rc::new(RefCell::new(TracingSink)));
    let wallet = Rc::new(ScriptedProvider::new());

    let mut orchestrator = Orchestrator::new(config, Rc::new(RefCell::new(sink)));
    orchestrator.dispatch(ConnectionEvent::Providers(Some(ProviderHandle::from_rc(
        wallet.clone(),
    ))));

    Harness {
        orchestrator,
        wallet,
        board,
        toasts,
    }
}

fn harness() -> Harness {
    harness_with(
        AppConfig::builder()
            .project_id("test-project")
            .build()
            .unwrap(),
    )
}

impl Harness {
    async fn connect(&mut self, who: Address) -> Option<ActionRun> {
        let task = self
            .orchestrator
            .dispatch(ConnectionEvent::Account(AccountState::connected(who)))?;
        match task.await {
            TaskOutcome::Run(run) => Some(run),
            other => panic!("expected a run, got {other:?}"),
        }
    }

    fn status(&self, step: Step) -> StepStatus {
        self.board.borrow().status(step)
    }
}

#[tokio::test]
async fn reserve_five_percent_of_one_million_wei() {
    let mut h = harness();
    h.wallet
        .respond(methods::PERSONAL_SIGN, json!("0xsigned"))
        .respond(methods::ETH_GET_BALANCE, json!("0xf4240"))
        .respond(methods::ETH_SEND_TRANSACTION, json!(HASH));

    let run = h.connect(address(1)).await.unwrap();

    assert_eq!(run.phase(), RunPhase::SendSuccess);
    assert_eq!(run.balance, Some(Wei::from(1_000_000u64)));
    assert_eq!(run.send_amount, Some(Wei::from(950_000u64)));
    assert_eq!(run.tx.unwrap().hash, HASH.parse::<TxHash>().unwrap());
    assert_eq!(run.signature.as_ref().unwrap().as_str(), "0xsigned");

    assert_eq!(
        h.wallet.methods(),
        vec![
            methods::PERSONAL_SIGN,
            methods::ETH_GET_BALANCE,
            methods::ETH_SEND_TRANSACTION
        ]
    );
    let send = &h.wallet.calls()[2];
    assert_eq!(send.params[0]["value"], json!("0xe7ef0"));
    assert_eq!(send.params[0]["to"], send.params[0]["from"]);

    for step in Step::ALL {
        assert_eq!(h.status(step), StepStatus::Success, "{step:?}");
    }
    assert_eq!(h.board.borrow().message(Step::Sign), "Signature: 0xsigned");
    let sent = h.board.borrow().message(Step::Send).to_string();
    assert!(sent.contains(HASH), "send status should show the hash: {sent}");

    let latest = h.toasts.borrow().queue().latest().cloned().unwrap();
    assert_eq!(latest.kind, ToastKind::Success);
    assert_eq!(latest.title, "Transaction sent");
    assert!(latest.subtitle.contains(HASH));

    let signed = h
        .toasts
        .borrow()
        .queue()
        .toasts()
        .find(|t| t.title == "Message signed")
        .cloned()
        .unwrap();
    assert_eq!(signed.subtitle, "Signature: 0xsigned");
}

#[tokio::test]
async fn ten_wei_sends_nine() {
    let mut h = harness();
    h.wallet
        .respond(methods::PERSONAL_SIGN, json!("0xsigned"))
        .respond(methods::ETH_GET_BALANCE, json!("0xa"))
        .respond(methods::ETH_SEND_TRANSACTION, json!({ "hash": HASH }));

    let run = h.connect(address(1)).await.unwrap();
    assert_eq!(run.send_amount, Some(Wei::from(9u64)));
    assert_eq!(h.wallet.calls()[2].params[0]["value"], json!("0x9"));
}

#[tokio::test]
async fn empty_balance_never_sends() {
    let mut h = harness();
    h.wallet
        .respond(methods::PERSONAL_SIGN, json!("0xsigned"))
        .respond(methods::ETH_GET_BALANCE, json!("0x0"));

    let run = h.connect(address(1)).await.unwrap();

    assert_eq!(run.phase(), RunPhase::BalanceFailed);
    assert_eq!(
        run.last_error.as_ref().unwrap().kind,
        ErrorKind::InsufficientBalance
    );
    assert_eq!(h.wallet.call_count(methods::ETH_SEND_TRANSACTION), 0);
    assert_eq!(h.status(Step::BalanceCheck), StepStatus::Error);
    assert_eq!(h.status(Step::Send), StepStatus::Idle);
}

#[tokio::test]
async fn rejected_signature_halts_the_run() {
    let mut h = harness();
    h.wallet
        .reject(methods::PERSONAL_SIGN, "User denied message signature.");

    let run = h.connect(address(1)).await.unwrap();

    assert_eq!(run.phase(), RunPhase::SignFailed);
    assert_eq!(run.last_error.as_ref().unwrap().kind, ErrorKind::UserRejected);
    assert_eq!(h.wallet.methods(), vec![methods::PERSONAL_SIGN]);
    assert_eq!(h.status(Step::Connect), StepStatus::Success);
    assert_eq!(h.status(Step::Sign), StepStatus::Error);
    assert_eq!(h.status(Step::BalanceCheck), StepStatus::Idle);
    assert_eq!(h.status(Step::Send), StepStatus::Idle);
    assert_eq!(
        h.board.borrow().message(Step::Sign),
        "User denied message signature."
    );
}

#[tokio::test]
async fn rejected_transaction_fails_send_step_only() {
    let mut h = harness();
    h.wallet
        .respond(methods::PERSONAL_SIGN, json!("0xsigned"))
        .respond(methods::ETH_GET_BALANCE, json!("0x64"))
        .reject(methods::ETH_SEND_TRANSACTION, "User denied transaction signature.");

    let run = h.connect(address(1)).await.unwrap();
    assert_eq!(run.phase(), RunPhase::SendFailed);
    assert_eq!(h.status(Step::BalanceCheck), StepStatus::Success);
    assert_eq!(h.status(Step::Send), StepStatus::Error);
}

#[tokio::test]
async fn duplicate_notifications_through_event_loop() {
    let mut h = harness_with(
        AppConfig::builder()
            .project_id("test-project")
            .require_signature(false)
            .build()
            .unwrap(),
    );
    h.wallet
        .respond(methods::ETH_GET_BALANCE, json!("0x64"))
        .respond(methods::ETH_SEND_TRANSACTION, json!(HASH));

    let (events, mut rx) = channel();
    for _ in 0..3 {
        events.account_payload(&json!({
            "address": address(1).to_string(),
            "isConnected": true,
        }));
    }
    events.network_payload(&json!({ "chainId": "eip155:11155111" }));
    drop(events);

    h.orchestrator.run(&mut rx).await;

    assert_eq!(h.wallet.call_count(methods::ETH_GET_BALANCE), 1);
    assert_eq!(h.wallet.call_count(methods::ETH_SEND_TRANSACTION), 1);
    assert_eq!(h.wallet.call_count(methods::PERSONAL_SIGN), 0);
    assert_eq!(h.status(Step::Sign), StepStatus::Idle);
    assert_eq!(h.status(Step::Send), StepStatus::Success);
    assert_eq!(h.orchestrator.generation(), 1);
    assert_eq!(h.orchestrator.store().chain_id(), Some(ChainId::new(11_155_111)));
}

#[tokio::test]
async fn provider_reported_after_account_still_drives_the_run() {
    let mut h = harness();
    h.orchestrator.dispatch(ConnectionEvent::Providers(None));
    h.wallet
        .respond(methods::PERSONAL_SIGN, json!("0xsigned"))
        .respond(methods::ETH_GET_BALANCE, json!("0xf4240"))
        .respond(methods::ETH_SEND_TRANSACTION, json!(HASH));

    let (events, mut rx) = channel();
    events.account(AccountState::connected(address(1)));
    events.providers(Some(ProviderHandle::from_rc(h.wallet.clone())));
    drop(events);

    h.orchestrator.run(&mut rx).await;

    let run = h.orchestrator.current_run().unwrap();
    assert_eq!(run.phase(), RunPhase::SendSuccess, "{:?}", run.last_error);
    assert_eq!(h.wallet.call_count(methods::ETH_SEND_TRANSACTION), 1);
    assert_eq!(h.status(Step::Send), StepStatus::Success);
}

#[tokio::test]
async fn disconnect_request_resets_and_allows_reconnect() {
    let mut h = harness();
    h.wallet
        .respond(methods::PERSONAL_SIGN, json!("0xsigned"))
        .respond(methods::ETH_GET_BALANCE, json!("0x0"));
    h.connect(address(1)).await.unwrap();
    assert_eq!(h.status(Step::Sign), StepStatus::Success);

    assert!(h.orchestrator.dispatch(ConnectionEvent::Disconnect).is_none());
    assert_eq!(h.orchestrator.handled_address(), None);
    for step in Step::ALL {
        assert_eq!(h.status(step), StepStatus::Idle, "{step:?}");
    }
    let latest = h.toasts.borrow().queue().latest().cloned().unwrap();
    assert_eq!(latest.title, "Wallet disconnected");

    h.wallet.respond(methods::PERSONAL_SIGN, json!("0xagain"));
    h.wallet.respond(methods::ETH_GET_BALANCE, json!("0x0"));
    let again = h.connect(address(1)).await.expect("fresh run after disconnect");
    assert_eq!(again.signature.unwrap().as_str(), "0xagain");
}

#[tokio::test]
async fn reconnect_starts_fresh_run_without_stale_status() {
    let mut h = harness();
    h.wallet
        .reject(methods::PERSONAL_SIGN, "User denied message signature.");
    let first = h.connect(address(1)).await.unwrap();
    assert_eq!(first.phase(), RunPhase::SignFailed);
    assert_eq!(h.status(Step::Sign), StepStatus::Error);

    h.orchestrator
        .dispatch(ConnectionEvent::Account(AccountState::disconnected()));
    assert_eq!(h.status(Step::Sign), StepStatus::Idle);
    assert_eq!(h.status(Step::Connect), StepStatus::Idle);

    h.wallet
        .respond(methods::PERSONAL_SIGN, json!("0xsigned"))
        .respond(methods::ETH_GET_BALANCE, json!("0x64"))
        .respond(methods::ETH_SEND_TRANSACTION, json!(HASH));
    let second = h.connect(address(1)).await.unwrap();

    assert_ne!(second.id, first.id);
    assert!(second.last_error.is_none());
    assert_eq!(second.phase(), RunPhase::SendSuccess);
    assert!(h
        .board
        .borrow()
        .history()
        .iter()
        .all(|update| update.run_id == second.id));
}

#[tokio::test]
async fn switching_accounts_starts_a_new_run() {
    let mut h = harness();
    h.wallet
        .reject(methods::PERSONAL_SIGN, "nope")
        .reject(methods::PERSONAL_SIGN, "nope");

    let a = h.connect(address(1)).await.unwrap();
    let b = h.connect(address(2)).await.unwrap();
    assert_eq!(a.address, address(1));
    assert_eq!(b.address, address(2));
    assert_eq!(h.board.borrow().address(), Some(address(2)));
    assert_eq!(h.wallet.call_count(methods::PERSONAL_SIGN), 2);
}

#[tokio::test]
async fn fixed_amount_to_burn_address() {
    let dead: Address = DEAD.parse().unwrap();
    let mut h = harness_with(
        AppConfig::builder()
            .project_id("test-project")
            .signature_message("Hello Welcome to your first wallet connect test")
            .fixed_amount(Wei::from_ether_str("0.0001").unwrap())
            .recipient(Recipient::Fixed(dead))
            .build()
            .unwrap(),
    );
    h.wallet
        .respond(methods::PERSONAL_SIGN, json!("0xsigned"))
        .respond(methods::ETH_GET_BALANCE, json!("0xde0b6b3a7640000"))
        .respond(methods::ETH_SEND_TRANSACTION, json!({ "transactionHash": HASH }));

    let run = h.connect(address(1)).await.unwrap();
    assert_eq!(run.phase(), RunPhase::SendSuccess);

    let tx = &h.wallet.calls()[2].params[0];
    assert_eq!(tx["to"].as_str().unwrap().to_lowercase(), DEAD.to_lowercase());
    assert_eq!(tx["value"], json!("0x5af3107a4000"));
}

#[tokio::test]
async fn receipt_policy_waits_for_confirmation() {
    let mut h = harness_with(
        AppConfig::builder()
            .project_id("test-project")
            .require_signature(false)
            .confirmation(ConfirmationPolicy::Receipt {
                poll_interval: Duration::from_millis(5),
            })
            .build()
            .unwrap(),
    );
    h.wallet
        .respond(methods::ETH_GET_BALANCE, json!("0x64"))
        .respond(methods::ETH_SEND_TRANSACTION, json!(HASH))
        .respond(methods::ETH_GET_TRANSACTION_RECEIPT, json!(null))
        .respond(
            methods::ETH_GET_TRANSACTION_RECEIPT,
            json!({ "transactionHash": HASH, "status": "0x1", "blockNumber": "0x2" }),
        );

    let run = h.connect(address(1)).await.unwrap();
    assert_eq!(run.phase(), RunPhase::SendSuccess);
    assert_eq!(h.wallet.call_count(methods::ETH_GET_TRANSACTION_RECEIPT), 2);

    let history = h.board.borrow().history().to_vec();
    assert!(history
        .iter()
        .any(|u| u.step == Step::Send && u.message == "Confirming..."));
}

#[tokio::test]
async fn reverted_transaction_fails_send() {
    let mut h = harness_with(
        AppConfig::builder()
            .project_id("test-project")
            .require_signature(false)
            .confirmation(ConfirmationPolicy::Receipt {
                poll_interval: Duration::from_millis(5),
            })
            .build()
            .unwrap(),
    );
    h.wallet
        .respond(methods::ETH_GET_BALANCE, json!("0x64"))
        .respond(methods::ETH_SEND_TRANSACTION, json!(HASH))
        .respond(
            methods::ETH_GET_TRANSACTION_RECEIPT,
            json!({ "transactionHash": HASH, "status": "0x0" }),
        );

    let run = h.connect(address(1)).await.unwrap();
    assert_eq!(run.phase(), RunPhase::SendFailed);
    assert_eq!(run.last_error.unwrap().kind, ErrorKind::Reverted);
    assert!(run.tx.is_some());
}

#[tokio::test]
async fn provider_transport_error_is_reported_not_retried() {
    let mut h = harness();
    h.wallet
        .respond(methods::PERSONAL_SIGN, json!("0xsigned"))
        .fail(
            methods::ETH_GET_BALANCE,
            ProviderError::Transport("HTTP 502: bad gateway".into()),
        );

    let run = h.connect(address(1)).await.unwrap();
    assert_eq!(run.phase(), RunPhase::BalanceFailed);
    assert_eq!(run.last_error.unwrap().kind, ErrorKind::Provider);
    assert_eq!(h.wallet.call_count(methods::ETH_GET_BALANCE), 1);
}
