//! Graph-driven wizard navigation.
//!
//! A [`WizardGraph`] maps step ids to [`Step`] descriptors. A
//! [`WizardEngine`] binds a shared graph to one session's
//! [`WizardContext`] and exposes the derived view (current node, props,
//! terminal flag) plus the navigation operations.

pub mod context;
pub mod engine;
pub mod graph;
pub mod step;

pub use context::{Payload, StepId, WizardContext};
pub use engine::{RenderFrame, StayReason, Transition, WizardEngine};
pub use graph::WizardGraph;
pub use step::{Step, StepBuilder};
