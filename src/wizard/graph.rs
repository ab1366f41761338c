//! Immutable id -> step lookup

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use super::step::Step;

/// The wizard graph.
///
/// Steps reference each other by id only, so cycles are fine. Nothing is
/// validated at construction: dangling transition targets show up at
/// navigation time as no-ops. A later step with an already-used id replaces
/// the earlier one.
pub struct WizardGraph<R, P = Value> {
    steps: HashMap<String, Step<R, P>>,
}

impl<R, P> WizardGraph<R, P> {
    pub fn new(steps: impl IntoIterator<Item = Step<R, P>>) -> Self {
        let steps = steps
            .into_iter()
            .map(|step| (step.id().to_string(), step))
            .collect();
        Self { steps }
    }

    pub fn get(&self, id: &str) -> Option<&Step<R, P>> {
        self.steps.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.steps.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step ids in sorted order
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.steps.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl<R, P> FromIterator<Step<R, P>> for WizardGraph<R, P> {
    fn from_iter<I: IntoIterator<Item = Step<R, P>>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<R: fmt::Debug, P> fmt::Debug for WizardGraph<R, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardGraph")
            .field("steps", &self.ids())
            .finish()
    }
}
