//! Session-scoped wizard context: per-step state, current step and history

use std::collections::BTreeMap;

use serde_json::Value;
use uuid::Uuid;

/// Identifier of a step in a wizard graph
pub type StepId = String;

/// Opaque per-step payload stored in the context
pub type Payload = Value;

/// Mutable state of one wizard session.
///
/// The history is never empty and its last entry always equals the current
/// step id. Only the engine moves the current step; the state bag is written
/// through [`WizardContext::update_state`].
#[derive(Debug, Clone, PartialEq)]
pub struct WizardContext {
    session_id: Uuid,
    state: BTreeMap<StepId, Payload>,
    current_step_id: StepId,
    history: Vec<StepId>,
    revision: u64,
}

impl WizardContext {
    /// Create a fresh context positioned at `start_id`
    pub fn new(start_id: impl Into<StepId>) -> Self {
        Self::resume(start_id, BTreeMap::new(), Vec::new())
    }

    /// Create a context seeded with prior state and history.
    ///
    /// A non-empty `initial_history` is used verbatim and its last entry
    /// becomes the current step; otherwise history starts as `[start_id]`.
    /// Entries are not checked against any graph.
    pub fn resume(
        start_id: impl Into<StepId>,
        initial_state: BTreeMap<StepId, Payload>,
        initial_history: Vec<StepId>,
    ) -> Self {
        let start_id = start_id.into();
        let history = if initial_history.is_empty() {
            vec![start_id]
        } else {
            initial_history
        };
        let current_step_id = history[history.len() - 1].clone();

        Self {
            session_id: Uuid::new_v4(),
            state: initial_state,
            current_step_id,
            history,
            revision: 0,
        }
    }

    /// Unique id of this session, used for log correlation
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn current_step_id(&self) -> &str {
        &self.current_step_id
    }

    /// Visited step ids, oldest first
    pub fn history(&self) -> &[StepId] {
        &self.history
    }

    /// The whole state bag, keyed by step id
    pub fn state(&self) -> &BTreeMap<StepId, Payload> {
        &self.state
    }

    /// Payload recorded for a step, if any
    pub fn step_state(&self, step_id: &str) -> Option<&Payload> {
        self.state.get(step_id)
    }

    /// Look up a field inside a step's payload
    pub fn field(&self, step_id: &str, field: &str) -> Option<&Value> {
        self.state.get(step_id).and_then(|payload| payload.get(field))
    }

    /// Counter bumped on every mutation; a shell re-renders when it changes
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the payload stored for `step_id`.
    ///
    /// The id does not have to name a step of any graph.
    pub fn update_state(&mut self, step_id: impl Into<StepId>, payload: Payload) {
        self.state.insert(step_id.into(), payload);
        self.revision += 1;
    }

    pub(crate) fn push_step(&mut self, step_id: StepId) {
        self.current_step_id = step_id.clone();
        self.history.push(step_id);
        self.revision += 1;
    }

    /// Pop the last history entry. Returns the popped id, or `None` when
    /// only the starting entry is left.
    pub(crate) fn pop_step(&mut self) -> Option<StepId> {
        if self.history.len() <= 1 {
            return None;
        }
        let popped = self.history.pop();
        self.current_step_id = self.history[self.history.len() - 1].clone();
        self.revision += 1;
        popped
    }
}
