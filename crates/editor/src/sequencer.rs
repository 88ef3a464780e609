//! Token-checked check → save state machine.
//!
//! Every accepted edit mints a new [`SequenceToken`] and makes it current.
//! Completions carry the token they were started with; a completion whose token
//! is no longer current is a no-op. That single check is what keeps a slow,
//! superseded request from overwriting the result of a newer one, whatever
//! order the responses arrive in.
//!
//! The machine is synchronous and owns no timers or tasks. The session driver
//! starts the remote calls and feeds their results back in.

use flowguard_core::{DomainError, Entity, Flow, FlowName};
use serde::Serialize;

use crate::error::{EditorError, ServiceError};

/// Generation counter identifying one edit-to-save attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceToken(u64);

impl core::fmt::Display for SequenceToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Uniqueness verdict for the current candidate name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Validation {
    #[default]
    Unknown,
    Taken,
    Available,
}

/// Where the current sequence is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Checking,
    Saving,
    /// Terminal until the next edit supersedes it.
    Taken,
}

/// State visible to observers of the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    pub flow: Flow,
    pub is_saving: bool,
    pub validation: Validation,
    pub last_error: Option<EditorError>,
}

impl EditorState {
    pub fn new(flow: Flow) -> Self {
        Self {
            flow,
            is_saving: false,
            validation: Validation::Unknown,
            last_error: None,
        }
    }

    pub fn is_name_taken(&self) -> bool {
        self.validation == Validation::Taken
    }
}

/// Result of feeding a check response into the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Superseded or unexpected; nothing changed.
    Stale,
    /// Name is taken; the sequence stops without saving.
    Taken,
    /// Name is free; the caller must save this candidate under the same token.
    Save(Flow),
    /// The check failed; the error is recorded.
    Failed,
}

/// Result of feeding a save response into the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Superseded or unexpected; nothing changed.
    Stale,
    /// The persisted flow is now current.
    Saved(Flow),
    /// The save failed; the error is recorded.
    Failed,
}

/// Cancelling sequencer over a single flow.
#[derive(Debug)]
pub struct Sequencer {
    state: EditorState,
    phase: Phase,
    current: Option<(SequenceToken, FlowName)>,
    minted: u64,
}

impl Sequencer {
    pub fn new(flow: Flow) -> Self {
        Self {
            state: EditorState::new(flow),
            phase: Phase::Idle,
            current: None,
            minted: 0,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn flow(&self) -> &Flow {
        &self.state.flow
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True while the current sequence still waits on a remote call.
    pub fn is_in_flight(&self) -> bool {
        matches!(self.phase, Phase::Checking | Phase::Saving)
    }

    pub fn current_token(&self) -> Option<SequenceToken> {
        self.current.as_ref().map(|(token, _)| *token)
    }

    pub fn is_current(&self, token: SequenceToken) -> bool {
        self.current_token() == Some(token)
    }

    /// Start a new sequence for `name`, superseding any sequence in flight.
    ///
    /// The saving flag goes up immediately, before any remote call is made.
    pub fn begin(&mut self, name: FlowName) -> SequenceToken {
        self.minted += 1;
        let token = SequenceToken(self.minted);

        self.current = Some((token, name));
        self.phase = Phase::Checking;
        self.state.is_saving = true;
        self.state.validation = Validation::Unknown;
        self.state.last_error = None;

        token
    }

    pub fn on_check(
        &mut self,
        token: SequenceToken,
        result: Result<bool, ServiceError>,
    ) -> CheckOutcome {
        if !self.is_current(token) || self.phase != Phase::Checking {
            return CheckOutcome::Stale;
        }

        match result {
            Ok(true) => {
                self.phase = Phase::Taken;
                self.state.validation = Validation::Taken;
                self.state.is_saving = false;
                CheckOutcome::Taken
            }
            Ok(false) => {
                let Some((_, name)) = &self.current else {
                    return CheckOutcome::Stale;
                };
                self.phase = Phase::Saving;
                CheckOutcome::Save(self.state.flow.with_name(name.clone()))
            }
            Err(err) => {
                self.fail(EditorError::Check(err));
                CheckOutcome::Failed
            }
        }
    }

    pub fn on_save(
        &mut self,
        token: SequenceToken,
        result: Result<Flow, ServiceError>,
    ) -> SaveOutcome {
        if !self.is_current(token) || self.phase != Phase::Saving {
            return SaveOutcome::Stale;
        }

        match result {
            Ok(saved) if !saved.is_same_entity(&self.state.flow) => {
                self.fail(EditorError::Domain(DomainError::invariant(format!(
                    "store returned flow {} while saving flow {}",
                    saved.id, self.state.flow.id
                ))));
                SaveOutcome::Failed
            }
            Ok(saved) => {
                self.phase = Phase::Idle;
                self.state.flow = saved.clone();
                self.state.is_saving = false;
                self.state.validation = Validation::Available;
                SaveOutcome::Saved(saved)
            }
            Err(err) => {
                self.fail(EditorError::Save(err));
                SaveOutcome::Failed
            }
        }
    }

    fn fail(&mut self, error: EditorError) {
        self.phase = Phase::Idle;
        self.state.is_saving = false;
        self.state.last_error = Some(error);
    }
}
