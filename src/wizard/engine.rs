//! Wizard engine: binds a graph to one session context and drives navigation

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use super::context::{Payload, StepId, WizardContext};
use super::graph::WizardGraph;
use super::step::Step;
use crate::buttons::{ButtonResolver, ButtonsByPosition};

/// Why a navigation call left the wizard where it was
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StayReason {
    /// The current step's transition returned `None`
    Terminal,
    /// The transition named a step the graph doesn't contain
    DanglingTarget(StepId),
    /// The transition named the current step
    SelfLoop,
    /// The current step id is not in the graph (bad resume state)
    MissingNode,
    /// History holds only the starting entry
    AtStart,
}

/// Outcome of `go_next` / `go_back`.
///
/// Navigation never fails; callers that only care about the resulting
/// state can ignore this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Advanced { from: StepId, to: StepId },
    Retreated { from: StepId, to: StepId },
    Stayed(StayReason),
}

impl Transition {
    /// Whether the current step changed
    pub fn moved(&self) -> bool {
        !matches!(self, Transition::Stayed(_))
    }
}

/// Everything a shell needs for one render cycle
#[derive(Debug)]
pub struct RenderFrame<'a, R, P> {
    pub step_id: &'a str,
    pub render: &'a R,
    pub props: P,
    /// Fingerprint from the step's hash function; a change means remount
    pub render_key: Option<String>,
    pub is_last_step: bool,
    pub buttons: ButtonsByPosition,
}

/// Runtime view over one [`WizardGraph`] and one [`WizardContext`].
///
/// The engine keeps no state of its own besides the context: the current
/// node, its props and the terminal flag are recomputed on every read.
pub struct WizardEngine<R, P = Value> {
    graph: Arc<WizardGraph<R, P>>,
    context: WizardContext,
}

impl<R, P> WizardEngine<R, P> {
    /// Start a new session at `start_id`
    pub fn new(graph: Arc<WizardGraph<R, P>>, start_id: impl Into<StepId>) -> Self {
        Self::from_context(graph, WizardContext::new(start_id))
    }

    /// Start a session from previously collected state and history.
    ///
    /// History entries are not validated against the graph; a bad entry
    /// leaves [`WizardEngine::current_node`] returning `None`.
    pub fn resume(
        graph: Arc<WizardGraph<R, P>>,
        start_id: impl Into<StepId>,
        initial_state: BTreeMap<StepId, Payload>,
        initial_history: Vec<StepId>,
    ) -> Self {
        Self::from_context(
            graph,
            WizardContext::resume(start_id, initial_state, initial_history),
        )
    }

    /// Wrap an existing context
    pub fn from_context(graph: Arc<WizardGraph<R, P>>, context: WizardContext) -> Self {
        tracing::debug!(
            session_id = %context.session_id(),
            step = context.current_step_id(),
            "wizard session opened"
        );
        Self { graph, context }
    }

    /// Drop the engine and keep the session context
    pub fn into_context(self) -> WizardContext {
        self.context
    }

    pub fn graph(&self) -> &Arc<WizardGraph<R, P>> {
        &self.graph
    }

    pub fn context(&self) -> &WizardContext {
        &self.context
    }

    pub fn current_step_id(&self) -> &str {
        self.context.current_step_id()
    }

    pub fn history(&self) -> &[StepId] {
        self.context.history()
    }

    /// The descriptor for the current step
    pub fn current_node(&self) -> Option<&Step<R, P>> {
        self.graph.get(self.context.current_step_id())
    }

    /// Props for the current step, computed from the context now
    pub fn props(&self) -> Option<P> {
        self.current_node().map(|node| node.props(&self.context))
    }

    /// Fingerprint of the current step's rendered instance
    pub fn render_key(&self) -> Option<String> {
        let node = self.current_node()?;
        if !node.has_hash() {
            return None;
        }
        let props = node.props(&self.context);
        node.hash(&self.context, &props)
    }

    /// Whether the current step is terminal.
    ///
    /// A missing current node counts as terminal since nothing can follow it.
    pub fn is_last_step(&self) -> bool {
        self.current_node()
            .map_or(true, |node| node.next(&self.context).is_none())
    }

    /// Advance along the current step's transition.
    ///
    /// Only moves when the target exists in the graph and differs from the
    /// current step; anything else leaves the session untouched.
    pub fn go_next(&mut self) -> Transition {
        let Some(node) = self.current_node() else {
            tracing::trace!(step = self.current_step_id(), "go_next on missing node");
            return Transition::Stayed(StayReason::MissingNode);
        };

        let outcome = match node.next(&self.context) {
            None => Err(StayReason::Terminal),
            Some(target) if target == self.context.current_step_id() => {
                Err(StayReason::SelfLoop)
            }
            Some(target) if !self.graph.contains(&target) => {
                Err(StayReason::DanglingTarget(target))
            }
            Some(target) => Ok(target),
        };

        match outcome {
            Ok(target) => {
                let from = self.context.current_step_id().to_string();
                self.context.push_step(target.clone());
                tracing::debug!(
                    session_id = %self.context.session_id(),
                    from = %from,
                    to = %target,
                    depth = self.context.history().len(),
                    "wizard advanced"
                );
                Transition::Advanced { from, to: target }
            }
            Err(reason) => {
                tracing::trace!(
                    step = self.current_step_id(),
                    reason = ?reason,
                    "go_next stayed"
                );
                Transition::Stayed(reason)
            }
        }
    }

    /// Return to the previously visited step
    pub fn go_back(&mut self) -> Transition {
        match self.context.pop_step() {
            Some(from) => {
                let to = self.context.current_step_id().to_string();
                tracing::debug!(
                    session_id = %self.context.session_id(),
                    from = %from,
                    to = %to,
                    "wizard retreated"
                );
                Transition::Retreated { from, to }
            }
            None => Transition::Stayed(StayReason::AtStart),
        }
    }

    /// Replace the payload stored for `step_id`.
    ///
    /// Call this before `go_next` when the transition depends on the data
    /// just collected. Unknown step ids are accepted.
    pub fn update_step_state(&mut self, step_id: impl Into<StepId>, payload: Payload) {
        let step_id = step_id.into();
        tracing::debug!(
            session_id = %self.context.session_id(),
            step = %step_id,
            "step state updated"
        );
        self.context.update_state(step_id, payload);
    }

    /// Resolved buttons for the current step
    pub fn buttons(&self, resolver: &ButtonResolver) -> ButtonsByPosition {
        let step_buttons = self.current_node().and_then(Step::buttons);
        resolver.resolve(step_buttons, &self.context, self.is_last_step())
    }

    /// Snapshot for one render cycle, or `None` if the current node is missing
    pub fn frame(&self, resolver: &ButtonResolver) -> Option<RenderFrame<'_, R, P>> {
        let node = self.current_node()?;
        let props = node.props(&self.context);
        let render_key = node.hash(&self.context, &props);
        let is_last_step = node.next(&self.context).is_none();
        let buttons = resolver.resolve(node.buttons(), &self.context, is_last_step);

        Some(RenderFrame {
            step_id: node.id(),
            render: node.render(),
            props,
            render_key,
            is_last_step,
            buttons,
        })
    }
}

impl<R, P> std::fmt::Debug for WizardEngine<R, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardEngine")
            .field("steps", &self.graph.len())
            .field("context", &self.context)
            .finish()
    }
}
