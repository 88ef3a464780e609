//! Unguarded sequencer kept as a counter-example.
//!
//! This is the "apply whatever comes back" version: completions are applied
//! as they arrive with no token check. With out-of-order responses a slow,
//! superseded save overwrites the state written by a newer edit. It exists so
//! tests can show the race that [`crate::sequencer::Sequencer`] closes; the
//! session never uses it.

use flowguard_core::{Flow, FlowName};

use crate::error::{EditorError, ServiceError};
use crate::sequencer::{EditorState, Validation};

#[derive(Debug)]
pub struct UnguardedSequencer {
    state: EditorState,
}

impl UnguardedSequencer {
    pub fn new(flow: Flow) -> Self {
        Self {
            state: EditorState::new(flow),
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn begin(&mut self) {
        self.state.is_saving = true;
    }

    /// Applies the check result for `name`; returns the candidate to save if free.
    pub fn on_check(
        &mut self,
        name: FlowName,
        result: Result<bool, ServiceError>,
    ) -> Option<Flow> {
        match result {
            Ok(true) => {
                self.state.validation = Validation::Taken;
                self.state.is_saving = false;
                None
            }
            Ok(false) => {
                self.state.validation = Validation::Unknown;
                Some(self.state.flow.with_name(name))
            }
            Err(err) => {
                self.state.is_saving = false;
                self.state.last_error = Some(EditorError::Check(err));
                None
            }
        }
    }

    pub fn on_save(&mut self, result: Result<Flow, ServiceError>) {
        match result {
            Ok(flow) => {
                self.state.flow = flow;
                self.state.is_saving = false;
            }
            Err(err) => {
                self.state.is_saving = false;
                self.state.last_error = Some(EditorError::Save(err));
            }
        }
    }
}
