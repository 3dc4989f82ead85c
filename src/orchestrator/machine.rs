//! `Orchestrator` — consumes connection events and drives action runs.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures_util::future::LocalBoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};

use crate::actions::WalletActions;
use crate::config::AppConfig;
use crate::error::ActionError;
use crate::network;
use crate::orchestrator::events::{ConnectionEvent, EventReceiver};
use crate::orchestrator::sequence::{self, RunContext};
use crate::orchestrator::state::ActionRun;
use crate::session::SessionControl;
use crate::shared::{Address, ChainId};
use crate::store::{AccountState, ConnectionStore, ConnectionUpdate};
use crate::view::{Notice, SharedSink};

/// Work started by an event: an action run or a network switch.
pub type Task = LocalBoxFuture<'static, TaskOutcome>;

#[derive(Debug)]
pub enum TaskOutcome {
    Run(ActionRun),
    NetworkSwitch {
        chain_id: ChainId,
        result: Result<(), String>,
    },
}

pub struct Orchestrator {
    config: AppConfig,
    store: ConnectionStore,
    sink: SharedSink,
    session: Option<Rc<dyn SessionControl>>,
    /// Address the current run was started for.
    handled: Option<Address>,
    /// Id of the current run; bumped on every new run and on disconnect.
    generation: Rc<Cell<u64>>,
    current: Option<Rc<RefCell<ActionRun>>>,
}

impl Orchestrator {
    pub fn new(config: AppConfig, sink: SharedSink) -> Self {
        Self {
            config,
            store: ConnectionStore::new(),
            sink,
            session: None,
            handled: None,
            generation: Rc::new(Cell::new(0)),
            current: None,
        }
    }

    /// Use a pre-populated store (observers included).
    pub fn with_store(mut self, store: ConnectionStore) -> Self {
        self.store = store;
        self
    }

    /// Route connect-UI and network-switch requests through a session.
    /// Without one, network switches go straight to the wallet provider.
    pub fn with_session(mut self, session: Rc<dyn SessionControl>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &ConnectionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ConnectionStore {
        &mut self.store
    }

    pub fn handled_address(&self) -> Option<Address> {
        self.handled
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Snapshot of the current run, if one is active.
    pub fn current_run(&self) -> Option<ActionRun> {
        self.current.as_ref().map(|run| run.borrow().clone())
    }

    /// Process events until every sender is dropped, then let in-flight
    /// work finish.
    pub async fn run(&mut self, events: &mut EventReceiver) {
        let mut in_flight: FuturesUnordered<Task> = FuturesUnordered::new();

        loop {
            tokio::select! {
                biased;

                event = events.recv() => match event {
                    Some(event) => {
                        if let Some(task) = self.dispatch(event) {
                            in_flight.push(task);
                        }
                    }
                    None => break,
                },
                Some(outcome) = in_flight.next(), if !in_flight.is_empty() => {
                    self.on_task_finished(outcome);
                }
            }
        }

        while let Some(outcome) = in_flight.next().await {
            self.on_task_finished(outcome);
        }
        tracing::debug!("Event queue closed, orchestrator stopped");
    }

    /// Apply one event. Returns the work it started, which the caller must poll.
    pub fn dispatch(&mut self, event: ConnectionEvent) -> Option<Task> {
        match event {
            ConnectionEvent::Account(account) => {
                self.store.update(ConnectionUpdate::Account(account));
                self.on_address(account.address)
            }
            ConnectionEvent::Network(network) => {
                self.store.update(ConnectionUpdate::Network(network));
                self.notify(&Notice::NetworkChanged {
                    chain_id: network.chain_id,
                });
                None
            }
            ConnectionEvent::Providers(provider) => {
                tracing::debug!(present = provider.is_some(), "Provider changed");
                self.store.update(ConnectionUpdate::Provider(provider));
                None
            }
            ConnectionEvent::SwitchNetwork(chain_id) => Some(self.switch_network(chain_id)),
            ConnectionEvent::OpenConnect => {
                match &self.session {
                    Some(session) => session.open(),
                    None => tracing::warn!("No session attached, cannot open the connect UI"),
                }
                self.notify(&Notice::ConnectOpened);
                None
            }
            ConnectionEvent::Disconnect => {
                if let Some(session) = self.session.clone() {
                    // The session reports the cleared account back as an event.
                    session.disconnect();
                    return None;
                }
                tracing::debug!("No session attached, disconnecting locally");
                let account = AccountState::disconnected();
                self.store.update(ConnectionUpdate::Account(account));
                self.on_address(account.address)
            }
        }
    }

    fn on_address(&mut self, address: Option<Address>) -> Option<Task> {
        match address {
            None => {
                if self.handled.take().is_some() {
                    self.generation.set(self.generation.get() + 1);
                    self.current = None;
                    tracing::info!("Wallet disconnected");
                    self.notify(&Notice::Disconnected);
                }
                None
            }
            Some(address) if self.handled == Some(address) => {
                tracing::debug!(%address, "Address already handled");
                None
            }
            Some(address) => {
                self.handled = Some(address);
                Some(self.start_run(address))
            }
        }
    }

    fn start_run(&mut self, address: Address) -> Task {
        let run_id = self.generation.get() + 1;
        self.generation.set(run_id);

        let flow = self.config.flow().clone();
        let run = Rc::new(RefCell::new(ActionRun::new(
            run_id,
            address,
            flow.require_signature,
        )));
        self.current = Some(run.clone());

        tracing::info!(run_id, %address, "Starting action run");
        self.notify(&Notice::RunStarted { run_id, address });

        let native_symbol = self
            .store
            .chain_id()
            .and_then(network::by_id)
            .map(|c| c.native_symbol)
            .unwrap_or("ETH");

        let ctx = RunContext {
            run,
            generation: self.generation.clone(),
            sink: self.sink.clone(),
            actions: WalletActions::from_store(self.store.reader()),
            flow,
            native_symbol,
        };
        sequence::execute(ctx).map(TaskOutcome::Run).boxed_local()
    }

    fn switch_network(&self, chain_id: ChainId) -> Task {
        let chain = self.config.chain(chain_id).cloned();
        let session = self.session.clone();
        let actions = WalletActions::from_store(self.store.reader());
        let sink = self.sink.clone();

        async move {
            let result = match &chain {
                None => Err(ActionError::NetworkSwitchFailed(format!(
                    "chain {} is not supported",
                    chain_id
                ))),
                Some(chain) => match session {
                    Some(session) => session.switch_network(chain).await,
                    None => actions.switch_network(chain).await,
                },
            };

            let notice = match &result {
                Ok(()) => Notice::NetworkSwitched {
                    chain_id,
                    name: chain.map(|c| c.name.to_string()).unwrap_or_default(),
                },
                Err(e) => Notice::NetworkSwitchFailed {
                    chain_id,
                    message: e.to_string(),
                },
            };
            sink.borrow_mut().on_notice(&notice);

            TaskOutcome::NetworkSwitch {
                chain_id,
                result: result.map_err(|e| e.to_string()),
            }
        }
        .boxed_local()
    }

    fn on_task_finished(&self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Run(run) => {
                let current = run.id == self.generation.get();
                tracing::info!(
                    run_id = run.id,
                    phase = ?run.phase(),
                    current,
                    "Action run finished"
                );
            }
            TaskOutcome::NetworkSwitch { chain_id, result } => {
                tracing::debug!(chain_id = chain_id.get(), ok = result.is_ok(), "Network switch finished");
            }
        }
    }

    fn notify(&self, notice: &Notice) {
        self.sink.borrow_mut().on_notice(notice);
    }
}
