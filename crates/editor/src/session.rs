//! Session driver: one task owns the pipeline state.
//!
//! Raw names go through the debouncer and the change filter, then into the
//! sequencer. Remote calls run as their own tasks and post completions back
//! over a channel, so every state transition happens on the driver task and
//! the sequencer needs no locking.
//!
//! ```text
//! on_name_change ─► Debouncer ─► ChangeFilter ─► Sequencer ─► NameRegistry
//!                                                    ▲              │
//!                                                    └── FlowStore ◄┘ (if free)
//! ```

use std::error::Error as _;
use std::sync::Arc;

use flowguard_core::{Flow, FlowName};
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::debounce::Debouncer;
use crate::error::ServiceError;
use crate::lifecycle::Lifecycle;
use crate::sequencer::{CheckOutcome, EditorState, SaveOutcome, SequenceToken, Sequencer};
use crate::service::{FlowStore, NameRegistry};
use crate::snapshot::SnapshotStore;
use crate::suppress::ChangeFilter;

/// The remote capabilities a session works against.
#[derive(Clone)]
pub struct Collaborators {
    pub registry: Arc<dyn NameRegistry>,
    pub store: Arc<dyn FlowStore>,
    pub snapshots: Arc<dyn SnapshotStore>,
}

/// A live name-editing session for one flow.
///
/// Must be started inside a tokio runtime. Dropping the handle tears the
/// session down.
pub struct NameEditSession {
    input: Option<mpsc::UnboundedSender<String>>,
    state: watch::Receiver<EditorState>,
    lifecycle: Lifecycle,
    join: Option<JoinHandle<()>>,
}

impl NameEditSession {
    /// Start a session, seeding the flow from the snapshot store.
    pub fn start(config: EditorConfig, collaborators: Collaborators) -> Self {
        let flow = match collaborators.snapshots.load_last() {
            Ok(Some(flow)) => {
                info!(flow_id = %flow.id, name = %flow.name, "resuming from last saved flow");
                flow
            }
            Ok(None) => Flow::default(),
            Err(err) => {
                warn!(error = %err, "failed to load last saved flow; starting from default");
                Flow::default()
            }
        };
        Self::start_with(config, collaborators, flow)
    }

    /// Start a session editing `flow`.
    pub fn start_with(config: EditorConfig, collaborators: Collaborators, flow: Flow) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let sequencer = Sequencer::new(flow);
        let (state_tx, state_rx) = watch::channel(sequencer.state().clone());
        let lifecycle = Lifecycle::new();

        let driver = Driver {
            debouncer: Debouncer::new(config.debounce),
            filter: ChangeFilter::new(),
            sequencer,
            collaborators,
            lifecycle: lifecycle.clone(),
            state_tx,
            completion_tx,
        };
        let join = tokio::spawn(driver.run(input_rx, completion_rx));

        Self {
            input: Some(input_tx),
            state: state_rx,
            lifecycle,
            join: Some(join),
        }
    }

    /// Feed one raw value of the name field (every keystroke is fine).
    pub fn on_name_change(&self, name: impl Into<String>) {
        let Some(input) = self.lifecycle.gate(self.input.as_ref()).flatten() else {
            debug!("name change after teardown ignored");
            return;
        };
        if input.send(name.into()).is_err() {
            debug!("name change after driver exit ignored");
        }
    }

    pub fn state(&self) -> EditorState {
        self.state.borrow().clone()
    }

    pub fn is_saving(&self) -> bool {
        self.state.borrow().is_saving
    }

    pub fn is_name_taken(&self) -> bool {
        self.state.borrow().is_name_taken()
    }

    pub fn current_flow(&self) -> Flow {
        self.state.borrow().flow.clone()
    }

    /// Watch every published state change.
    pub fn subscribe(&self) -> watch::Receiver<EditorState> {
        self.state.clone()
    }

    /// Stop applying anything to the session state. Idempotent.
    pub fn teardown(&self) {
        if self.lifecycle.teardown() {
            info!("editor session torn down");
        }
    }

    /// Tear down and wait for the driver task to exit.
    pub async fn shutdown(mut self) {
        self.teardown();
        self.join_driver().await;
    }

    /// Close the input and wait until the last settled edit has been resolved.
    ///
    /// A pending debounced value is processed right away instead of waiting
    /// out its quiet period.
    pub async fn finish(mut self) -> EditorState {
        self.input.take();
        self.join_driver().await;
        self.state()
    }

    async fn join_driver(&mut self) {
        if let Some(join) = self.join.take() {
            if let Err(err) = join.await {
                warn!(error = %err, "editor driver task failed");
            }
        }
    }
}

/// A collaborator call that panicked or was cancelled still has to resolve its sequence.
fn lost_call(err: JoinError) -> ServiceError {
    warn!(error = %err, "collaborator call did not complete");
    ServiceError::Unavailable(format!("call did not complete: {err}"))
}

impl Drop for NameEditSession {
    fn drop(&mut self) {
        self.lifecycle.teardown();
    }
}

enum Completion {
    Check {
        token: SequenceToken,
        result: Result<bool, ServiceError>,
    },
    Save {
        token: SequenceToken,
        result: Result<Flow, ServiceError>,
    },
}

struct Driver {
    debouncer: Debouncer<String>,
    filter: ChangeFilter,
    sequencer: Sequencer,
    collaborators: Collaborators,
    lifecycle: Lifecycle,
    state_tx: watch::Sender<EditorState>,
    completion_tx: mpsc::UnboundedSender<Completion>,
}

impl Driver {
    async fn run(
        mut self,
        mut input: mpsc::UnboundedReceiver<String>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        let lifecycle = self.lifecycle.clone();
        let mut input_open = true;

        loop {
            if lifecycle.is_torn_down() {
                break;
            }
            if !input_open && self.debouncer.is_idle() && !self.sequencer.is_in_flight() {
                break;
            }

            let deadline = self.debouncer.deadline();

            tokio::select! {
                biased;

                _ = lifecycle.torn_down() => break,

                Some(completion) = completions.recv() => self.on_completion(completion),

                received = input.recv(), if input_open => match received {
                    Some(raw) => self.debouncer.push(raw, Instant::now()),
                    None => {
                        input_open = false;
                        if let Some(settled) = self.debouncer.flush() {
                            self.on_settled(settled);
                        }
                    }
                },

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(settled) = self.debouncer.take_settled(Instant::now()) {
                        self.on_settled(settled);
                    }
                }
            }
        }

        debug!("editor driver stopped");
    }

    fn on_settled(&mut self, settled: String) {
        if self.lifecycle.is_torn_down() {
            return;
        }

        let name = match self.filter.admit(settled, self.sequencer.flow()) {
            Ok(name) => name,
            Err(reason) => {
                debug!(?reason, "settled name suppressed");
                return;
            }
        };

        let token = self.sequencer.begin(name.clone());
        info!(%token, name = %name, "checking name");
        self.publish();
        self.spawn_check(token, name);
    }

    fn on_completion(&mut self, completion: Completion) {
        if self.lifecycle.is_torn_down() {
            return;
        }

        match completion {
            Completion::Check { token, result } => match self.sequencer.on_check(token, result) {
                CheckOutcome::Stale => debug!(%token, "discarding superseded name check"),
                CheckOutcome::Taken => {
                    info!(%token, "name is taken");
                    self.publish();
                }
                CheckOutcome::Save(candidate) => {
                    info!(%token, name = %candidate.name, "name available; saving");
                    self.spawn_save(token, candidate);
                }
                CheckOutcome::Failed => {
                    self.warn_failure(token);
                    self.publish();
                }
            },
            Completion::Save { token, result } => match self.sequencer.on_save(token, result) {
                SaveOutcome::Stale => debug!(%token, "discarding superseded save"),
                SaveOutcome::Saved(flow) => {
                    info!(%token, name = %flow.name, version = flow.version, "flow saved");
                    if let Err(err) = self.collaborators.snapshots.store_last(&flow) {
                        warn!(error = %err, "failed to store last saved flow");
                    }
                    self.publish();
                }
                SaveOutcome::Failed => {
                    self.warn_failure(token);
                    self.publish();
                }
            },
        }
    }

    fn spawn_check(&self, token: SequenceToken, name: FlowName) {
        let registry = Arc::clone(&self.collaborators.registry);
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let call = tokio::spawn(async move { registry.is_name_taken(name.as_str()).await });
            let result = call.await.unwrap_or_else(|err| Err(lost_call(err)));
            // The driver may be gone; the result is simply dropped then.
            let _ = tx.send(Completion::Check { token, result });
        });
    }

    fn spawn_save(&self, token: SequenceToken, candidate: Flow) {
        let store = Arc::clone(&self.collaborators.store);
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let call = tokio::spawn(async move { store.save_flow(candidate).await });
            let result = call.await.unwrap_or_else(|err| Err(lost_call(err)));
            let _ = tx.send(Completion::Save { token, result });
        });
    }

    fn warn_failure(&self, token: SequenceToken) {
        if let Some(err) = &self.sequencer.state().last_error {
            match err.source() {
                Some(cause) => warn!(%token, error = %err, %cause, "edit sequence failed"),
                None => warn!(%token, error = %err, "edit sequence failed"),
            }
        }
    }

    fn publish(&self) {
        if let Some(state) = self.lifecycle.gate(self.sequencer.state()) {
            self.state_tx.send_replace(state.clone());
        }
    }
}
