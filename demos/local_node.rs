//! Run the full connect → sign → balance → send flow against a local dev node.
//!
//! ```bash
//! anvil &
//! PROJECT_ID=local cargo run --example local_node --features native
//! ```
//!
//! Environment (or `.env`): `PROJECT_ID`, `RPC_URL`, `RESERVE_PERCENT`,
//! `SIGNATURE_MESSAGE`, `REQUIRE_SIGNATURE`, `RUST_LOG`.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use tracing_subscriber::EnvFilter;

use wallet_actions::network::LOCAL_DEV;
use wallet_actions::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wallet_actions=info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            let notice = SetupNotice::for_error(&e);
            eprintln!("{}\n\n{}\n", notice.title, notice.summary);
            for (i, step) in notice.steps.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, step);
            }
            return Err(e.into());
        }
    };

    let rpc_url = std::env::var("RPC_URL").unwrap_or_else(|_| LOCAL_DEV.rpc_url.to_string());
    let provider = ProviderHandle::new(JsonRpcProvider::new(&rpc_url)?);

    let accounts = provider.request("eth_accounts", Value::Array(vec![])).await?;
    let address: Address = accounts
        .get(0)
        .and_then(Value::as_str)
        .ok_or("node exposes no unlocked accounts")?
        .parse()?;

    let board = Rc::new(RefCell::new(StatusBoardSink::new()));
    let toasts = Rc::new(RefCell::new(ToastSink::default()));
    let sink = Fanout::new()
        .with(Rc::new(RefCell::new(TracingSink)))
        .with(board.clone())
        .with(toasts.clone());
    let mut orchestrator = Orchestrator::new(config, Rc::new(RefCell::new(sink)));

    let (events, mut rx) = channel();
    events.providers(Some(provider));
    events.network(NetworkState::on(LOCAL_DEV.id));
    events.account(AccountState::connected(address));
    drop(events);

    orchestrator.run(&mut rx).await;

    println!();
    for view in board.borrow().views() {
        println!("{}. {:<18} {:?} ({})", view.number, view.title, view.status, view.details);
    }
    for toast in toasts.borrow().queue().toasts() {
        println!("[{:?}] {}: {}", toast.kind, toast.title, toast.subtitle);
    }
    if let Some(run) = orchestrator.current_run() {
        if let Some(tx) = run.tx {
            println!("tx: {}", tx.hash);
        }
    }

    Ok(())
}
