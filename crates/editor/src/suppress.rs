//! Change suppression between debouncing and the sequencer.

use flowguard_core::{Flow, FlowName};

/// Why a settled value never reached the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppressed {
    /// Same raw value as the previous settled value.
    Repeated,
    /// Nothing left after trimming.
    Blank,
    /// Equal to the flow's current name.
    Unchanged,
}

/// Filters settled values that carry no intent to change the flow.
///
/// The repeat check compares raw settled values and remembers every value that
/// passes it, including ones later dropped as blank or unchanged.
#[derive(Debug, Default)]
pub struct ChangeFilter {
    last_settled: Option<String>,
}

impl ChangeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&mut self, settled: String, current: &Flow) -> Result<FlowName, Suppressed> {
        if self.last_settled.as_deref() == Some(settled.as_str()) {
            return Err(Suppressed::Repeated);
        }

        let name = FlowName::parse(&settled).map_err(|_| Suppressed::Blank);
        self.last_settled = Some(settled);
        let name = name?;

        if current.has_name(name.as_str()) {
            return Err(Suppressed::Unchanged);
        }
        Ok(name)
    }
}
