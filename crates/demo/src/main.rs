//! Drives a name-editing session from stdin against the simulated services.
//!
//! ```text
//! printf 'stale\n:wait 1200\ntaken\n:wait 7000\n' | flowguard-demo
//! ```

mod script;

use std::sync::Arc;

use anyhow::Context;
use flowguard_core::Flow;
use flowguard_editor::{Collaborators, EditorConfig, EditorState, NameEditSession, Validation};
use flowguard_infra::{
    JsonFileSnapshotStore, SimulatedFlowStore, SimulatedLatency, SimulatedNameRegistry,
};
use flowguard_observability::LogFormat;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use crate::script::Command;

const SNAPSHOT_ENV: &str = "FLOWGUARD_SNAPSHOT_PATH";
const DEFAULT_SNAPSHOT_PATH: &str = "last_saved_flow.json";
const LOG_FORMAT_ENV: &str = "FLOWGUARD_LOG_FORMAT";

#[derive(Serialize)]
struct StateView<'a> {
    flow: &'a Flow,
    is_saving: bool,
    is_name_taken: bool,
    validation: Validation,
    last_error: Option<String>,
}

impl<'a> From<&'a EditorState> for StateView<'a> {
    fn from(state: &'a EditorState) -> Self {
        Self {
            flow: &state.flow,
            is_saving: state.is_saving,
            is_name_taken: state.is_name_taken(),
            validation: state.validation,
            last_error: state
                .last_error
                .as_ref()
                .map(|err| format!("{:#}", anyhow::Error::new(err.clone()))),
        }
    }
}

fn render(state: &EditorState) -> anyhow::Result<String> {
    serde_json::to_string(&StateView::from(state)).context("failed to encode state")
}

async fn print_states(mut rx: watch::Receiver<EditorState>) -> anyhow::Result<()> {
    while rx.changed().await.is_ok() {
        let line = render(&rx.borrow_and_update())?;
        println!("{line}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let format = std::env::var(LOG_FORMAT_ENV)
        .ok()
        .and_then(|raw| LogFormat::parse(&raw))
        .unwrap_or_default();
    flowguard_observability::tracing::init(format);

    let snapshot_path = std::env::var(SNAPSHOT_ENV).unwrap_or_else(|_| {
        tracing::info!("{SNAPSHOT_ENV} not set; using ./{DEFAULT_SNAPSHOT_PATH}");
        DEFAULT_SNAPSHOT_PATH.to_string()
    });
    let config = EditorConfig::from_env();
    let latency = SimulatedLatency::from_env();
    tracing::info!(
        debounce_ms = config.debounce.as_millis() as u64,
        check_ms = latency.check.as_millis() as u64,
        save_ms = latency.save.as_millis() as u64,
        slow_save_ms = latency.slow_save.as_millis() as u64,
        "starting editor session"
    );

    let session = NameEditSession::start(
        config,
        Collaborators {
            registry: Arc::new(SimulatedNameRegistry::new(&latency)),
            store: Arc::new(SimulatedFlowStore::new(latency)),
            snapshots: Arc::new(JsonFileSnapshotStore::new(snapshot_path)),
        },
    );
    println!("{}", render(&session.state())?);
    let printer = tokio::spawn(print_states(session.subscribe()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match script::parse_line(&line) {
            Ok(Command::Type(name)) => session.on_name_change(name),
            Ok(Command::Wait(pause)) => tokio::time::sleep(pause).await,
            Ok(Command::Quit) => break,
            Err(err) => tracing::warn!(error = %err, "skipping script line"),
        }
    }

    let final_state = session.finish().await;
    printer.await.context("state printer panicked")??;
    tracing::info!(
        name = %final_state.flow.name,
        version = final_state.flow.version,
        "session finished"
    );
    Ok(())
}
