use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use flowguard_core::{Flow, FlowName};
use flowguard_editor::{
    Collaborators, EditorConfig, EditorError, FlowStore, NameEditSession, NameRegistry,
    ServiceError, SnapshotError, SnapshotStore, Validation,
};

const DEBOUNCE: Duration = Duration::from_millis(1000);

/// Per-name answers and delays; unknown names are free and answer after 100ms.
#[derive(Default)]
struct ScriptedRegistry {
    answers: HashMap<&'static str, (u64, Result<bool, ServiceError>)>,
    calls: Mutex<Vec<String>>,
    completed: Mutex<Vec<String>>,
}

impl ScriptedRegistry {
    fn answer(
        mut self,
        name: &'static str,
        delay_ms: u64,
        result: Result<bool, ServiceError>,
    ) -> Self {
        self.answers.insert(name, (delay_ms, result));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl NameRegistry for ScriptedRegistry {
    async fn is_name_taken(&self, name: &str) -> Result<bool, ServiceError> {
        self.calls.lock().unwrap().push(name.to_string());
        let (delay_ms, result) = self
            .answers
            .get(name)
            .cloned()
            .unwrap_or((100, Ok(false)));
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        self.completed.lock().unwrap().push(name.to_string());
        result
    }
}

/// Saves after a per-name delay (default 500ms), bumping the version.
#[derive(Default)]
struct ScriptedStore {
    delays: HashMap<&'static str, u64>,
    failing: Vec<&'static str>,
    calls: Mutex<Vec<String>>,
    completed: Mutex<Vec<String>>,
}

impl ScriptedStore {
    fn delay(mut self, name: &'static str, delay_ms: u64) -> Self {
        self.delays.insert(name, delay_ms);
        self
    }

    fn failing(mut self, name: &'static str) -> Self {
        self.failing.push(name);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl FlowStore for ScriptedStore {
    async fn save_flow(&self, flow: Flow) -> Result<Flow, ServiceError> {
        let name = flow.name.as_str().to_string();
        self.calls.lock().unwrap().push(name.clone());
        let delay_ms = self.delays.get(name.as_str()).copied().unwrap_or(500);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        self.completed.lock().unwrap().push(name.clone());

        if self.failing.iter().any(|f| *f == name) {
            return Err(ServiceError::Unavailable("store down".into()));
        }
        Ok(Flow {
            version: flow.version + 1,
            ..flow
        })
    }
}

#[derive(Default)]
struct MemorySnapshots {
    last: Mutex<Option<Flow>>,
}

impl SnapshotStore for MemorySnapshots {
    fn load_last(&self) -> Result<Option<Flow>, SnapshotError> {
        Ok(self.last.lock().unwrap().clone())
    }

    fn store_last(&self, flow: &Flow) -> Result<(), SnapshotError> {
        *self.last.lock().unwrap() = Some(flow.clone());
        Ok(())
    }
}

struct Harness {
    registry: Arc<ScriptedRegistry>,
    store: Arc<ScriptedStore>,
    snapshots: Arc<MemorySnapshots>,
    session: NameEditSession,
}

fn start(registry: ScriptedRegistry, store: ScriptedStore) -> Harness {
    start_with_snapshots(registry, store, MemorySnapshots::default())
}

fn start_with_snapshots(
    registry: ScriptedRegistry,
    store: ScriptedStore,
    snapshots: MemorySnapshots,
) -> Harness {
    let registry = Arc::new(registry);
    let store = Arc::new(store);
    let snapshots = Arc::new(snapshots);
    let session = NameEditSession::start(
        EditorConfig::default().with_debounce(DEBOUNCE),
        Collaborators {
            registry: registry.clone(),
            store: store.clone(),
            snapshots: snapshots.clone(),
        },
    );
    Harness {
        registry,
        store,
        snapshots,
        session,
    }
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn fast_taken_result_is_not_overwritten_by_slow_stale_check() {
    let h = start(
        ScriptedRegistry::default()
            .answer("stale", 5000, Ok(false))
            .answer("taken", 100, Ok(true)),
        ScriptedStore::default().delay("stale", 5000),
    );

    h.session.on_name_change("stale");
    advance(1001).await;
    assert_eq!(h.registry.calls(), vec!["stale"]);
    assert!(h.session.is_saving());

    h.session.on_name_change("taken");
    advance(1001).await;
    assert_eq!(h.registry.calls(), vec!["stale", "taken"]);

    // "taken" answers first.
    advance(200).await;
    assert!(h.session.is_name_taken());
    assert!(!h.session.is_saving());

    // Let the slow "stale" check finish.
    advance(10_000).await;
    assert!(h.registry.completed().contains(&"stale".to_string()));
    assert!(h.session.is_name_taken());
    assert!(!h.session.is_saving());
    assert!(h.store.calls().is_empty(), "superseded check must not trigger a save");
    assert!(h.session.current_flow().has_name("My Flow"));
}

#[tokio::test(start_paused = true)]
async fn superseded_save_completes_but_is_ignored() {
    let h = start(
        ScriptedRegistry::default()
            .answer("stale", 100, Ok(false))
            .answer("taken", 100, Ok(true)),
        ScriptedStore::default().delay("stale", 5000),
    );

    h.session.on_name_change("stale");
    advance(1200).await;
    assert_eq!(h.store.calls(), vec!["stale"]);

    h.session.on_name_change("taken");
    advance(1200).await;
    assert!(h.session.is_name_taken());
    assert!(!h.session.is_saving());

    advance(10_000).await;
    // Cooperative cancellation: the old save really ran to completion.
    assert_eq!(h.store.completed(), vec!["stale"]);
    let state = h.session.state();
    assert!(state.flow.has_name("My Flow"));
    assert_eq!(state.validation, Validation::Taken);
    assert!(!state.is_saving);
    assert!(h.snapshots.load_last().unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn available_name_is_saved() {
    let h = start(ScriptedRegistry::default(), ScriptedStore::default());

    h.session.on_name_change("valid-name");
    advance(1001).await;
    assert!(h.session.is_saving(), "saving flag goes up before the check answers");
    assert_eq!(h.session.state().validation, Validation::Unknown);

    advance(1000).await;
    let state = h.session.state();
    assert!(!state.is_saving);
    assert!(!state.is_name_taken());
    assert_eq!(state.validation, Validation::Available);
    assert!(state.flow.has_name("valid-name"));
    assert_eq!(state.flow.version, 1);
    assert_eq!(h.snapshots.load_last().unwrap(), Some(state.flow));
}

#[tokio::test(start_paused = true)]
async fn current_name_triggers_no_calls() {
    let h = start(ScriptedRegistry::default(), ScriptedStore::default());

    h.session.on_name_change("My Flow");
    advance(2000).await;
    h.session.on_name_change("  My Flow  ");
    advance(2000).await;

    assert!(h.registry.calls().is_empty());
    assert!(h.store.calls().is_empty());
    assert!(!h.session.is_saving());
}

#[tokio::test(start_paused = true)]
async fn blank_names_trigger_no_calls() {
    let h = start(ScriptedRegistry::default(), ScriptedStore::default());

    h.session.on_name_change("");
    advance(2000).await;
    h.session.on_name_change("   ");
    advance(2000).await;

    assert!(h.registry.calls().is_empty());
    assert!(h.store.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn typing_burst_is_checked_once() {
    let h = start(ScriptedRegistry::default(), ScriptedStore::default());

    h.session.on_name_change("a");
    advance(300).await;
    h.session.on_name_change("ab");
    advance(300).await;
    h.session.on_name_change("abc");
    advance(999).await;
    assert!(h.registry.calls().is_empty(), "quiet period restarts on each keystroke");

    advance(2000).await;
    assert_eq!(h.registry.calls(), vec!["abc"]);
    assert!(h.session.current_flow().has_name("abc"));
}

#[tokio::test(start_paused = true)]
async fn teardown_freezes_state_while_calls_finish() {
    let h = start(
        ScriptedRegistry::default(),
        ScriptedStore::default().delay("Billing", 5000),
    );

    h.session.on_name_change("Billing");
    advance(1200).await;
    assert_eq!(h.store.calls(), vec!["Billing"]);
    let frozen = h.session.state();

    h.session.teardown();
    h.session.teardown();
    advance(10_000).await;

    assert_eq!(h.store.completed(), vec!["Billing"]);
    assert_eq!(h.session.state(), frozen);
    assert!(h.session.current_flow().has_name("My Flow"));
    assert!(h.snapshots.load_last().unwrap().is_none());

    h.session.on_name_change("Other");
    advance(5000).await;
    assert_eq!(h.registry.calls(), vec!["Billing"]);
}

#[tokio::test(start_paused = true)]
async fn teardown_cancels_pending_debounce() {
    let h = start(ScriptedRegistry::default(), ScriptedStore::default());

    h.session.on_name_change("Billing");
    advance(500).await;
    h.session.teardown();
    advance(5000).await;

    assert!(h.registry.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn repeating_a_saved_name_is_absorbed() {
    let h = start(ScriptedRegistry::default(), ScriptedStore::default());

    h.session.on_name_change("Billing");
    advance(3000).await;
    let first = h.session.state();
    assert!(first.flow.has_name("Billing"));

    h.session.on_name_change("Billing");
    advance(3000).await;
    assert_eq!(h.registry.calls(), vec!["Billing"]);
    assert_eq!(h.session.state(), first);

    h.session.on_name_change("Billing 2");
    advance(3000).await;
    h.session.on_name_change("Billing");
    advance(3000).await;

    let state = h.session.state();
    assert_eq!(h.registry.calls(), vec!["Billing", "Billing 2", "Billing"]);
    assert!(state.flow.has_name("Billing"));
    assert_eq!(state.flow.version, 3);
    assert_eq!(state.validation, Validation::Available);
    assert!(!state.is_saving);
}

#[tokio::test(start_paused = true)]
async fn failures_are_recorded_and_cleared_by_next_edit() {
    let h = start(
        ScriptedRegistry::default().answer("flaky", 100, Err(ServiceError::Timeout)),
        ScriptedStore::default().failing("broken"),
    );

    h.session.on_name_change("flaky");
    advance(2000).await;
    let state = h.session.state();
    assert!(!state.is_saving);
    assert_eq!(state.last_error, Some(EditorError::Check(ServiceError::Timeout)));

    h.session.on_name_change("broken");
    advance(2000).await;
    let state = h.session.state();
    assert!(!state.is_saving);
    assert!(matches!(state.last_error, Some(EditorError::Save(_))));
    assert!(state.flow.has_name("My Flow"));

    h.session.on_name_change("Billing");
    advance(2000).await;
    let state = h.session.state();
    assert_eq!(state.last_error, None);
    assert!(state.flow.has_name("Billing"));
}

#[tokio::test(start_paused = true)]
async fn session_resumes_from_snapshot() {
    let saved = Flow {
        version: 4,
        ..Flow::default().with_name(FlowName::parse("Saved earlier").unwrap())
    };
    let h = start_with_snapshots(
        ScriptedRegistry::default(),
        ScriptedStore::default(),
        MemorySnapshots {
            last: Mutex::new(Some(saved.clone())),
        },
    );

    assert_eq!(h.session.current_flow(), saved);
    h.session.on_name_change("Saved earlier");
    advance(2000).await;
    assert!(h.registry.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn finish_processes_pending_edit_without_waiting_out_debounce() {
    let h = start(ScriptedRegistry::default(), ScriptedStore::default());
    let registry = h.registry.clone();

    h.session.on_name_change("Billing");
    let started = tokio::time::Instant::now();
    let state = h.session.finish().await;

    assert!(started.elapsed() < DEBOUNCE + Duration::from_millis(600));
    assert_eq!(registry.calls(), vec!["Billing"]);
    assert!(state.flow.has_name("Billing"));
    assert!(!state.is_saving);
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_saving_then_saved() {
    let h = start(ScriptedRegistry::default(), ScriptedStore::default());
    let mut rx = h.session.subscribe();

    h.session.on_name_change("Billing");
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_saving);

    rx.changed().await.unwrap();
    let state = rx.borrow_and_update().clone();
    assert!(!state.is_saving);
    assert!(state.flow.has_name("Billing"));
}

#[tokio::test(start_paused = true)]
async fn dropping_the_session_tears_it_down() {
    let h = start(
        ScriptedRegistry::default(),
        ScriptedStore::default().delay("Billing", 5000),
    );
    let rx = h.session.subscribe();

    h.session.on_name_change("Billing");
    advance(1200).await;
    assert_eq!(h.store.calls(), vec!["Billing"]);

    let Harness {
        store,
        snapshots,
        session,
        ..
    } = h;
    drop(session);
    advance(10_000).await;

    assert_eq!(store.completed(), vec!["Billing"]);
    let last_seen = rx.borrow().clone();
    assert!(last_seen.is_saving, "state frozen mid-save");
    assert_eq!(last_seen.validation, Validation::Unknown);
    assert!(last_seen.flow.has_name("My Flow"));
    assert!(snapshots.load_last().unwrap().is_none());
}

/// Panics on "boom"; every other name is free after 100ms.
struct PanickingRegistry;

#[async_trait]
impl NameRegistry for PanickingRegistry {
    async fn is_name_taken(&self, name: &str) -> Result<bool, ServiceError> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if name == "boom" {
            panic!("registry blew up");
        }
        Ok(false)
    }
}

#[tokio::test(start_paused = true)]
async fn panicking_check_fails_the_sequence_instead_of_hanging() {
    let snapshots = Arc::new(MemorySnapshots::default());
    let session = NameEditSession::start(
        EditorConfig::default().with_debounce(DEBOUNCE),
        Collaborators {
            registry: Arc::new(PanickingRegistry),
            store: Arc::new(ScriptedStore::default()),
            snapshots: snapshots.clone(),
        },
    );

    session.on_name_change("boom");
    advance(2000).await;
    let state = session.state();
    assert!(!state.is_saving);
    assert!(matches!(
        state.last_error,
        Some(EditorError::Check(ServiceError::Unavailable(_)))
    ));
    assert!(state.flow.has_name("My Flow"));

    session.on_name_change("Billing");
    let state = tokio::time::timeout(Duration::from_secs(60), session.finish())
        .await
        .expect("session finishes after a panicked call");
    assert!(state.last_error.is_none());
    assert!(state.flow.has_name("Billing"));
    assert_eq!(snapshots.load_last().unwrap(), Some(state.flow));
}
