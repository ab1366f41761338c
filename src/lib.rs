//! stepgraph - graph-driven multi-step wizards
//!
//! The navigation engine lives in [`wizard`]; [`buttons`] resolves the
//! navigation controls for a step and [`form_data`] turns collected step
//! state into a submittable form. The [`ui`] module is a terminal shell
//! that drives the [`demo`] wizard.

pub mod buttons;
pub mod config;
pub mod demo;
pub mod fingerprint;
pub mod form_data;
pub mod logging;
pub mod ui;
pub mod wizard;

pub use buttons::{
    resolve_buttons, ButtonConfig, ButtonDefinition, ButtonKind, ButtonPosition, ButtonResolver,
    ButtonVariant, ButtonsByPosition, ResolvedButton, StepButtons,
};
pub use form_data::{aggregate_form_data, tag, ComponentType, FormData, FormPart, TaggedPayload};
pub use wizard::{
    Payload, RenderFrame, StayReason, Step, StepBuilder, StepId, Transition, WizardContext,
    WizardEngine, WizardGraph,
};
