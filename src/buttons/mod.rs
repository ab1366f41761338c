//! Navigation button resolution.
//!
//! A wizard carries one default [`ButtonConfig`]; each step may override it,
//! either statically or as a function of the context. Resolution merges the
//! two layers per button key and per field, then groups the visible buttons
//! by position for the shell to lay out.

use std::fmt;

use crate::wizard::WizardContext;

pub mod types;

pub use types::*;

pub(crate) type ButtonsFn = Box<dyn Fn(&WizardContext) -> ButtonConfig + Send + Sync>;

/// A step's button override
pub enum StepButtons {
    Static(ButtonConfig),
    Dynamic(ButtonsFn),
}

impl StepButtons {
    /// The concrete config for the given context
    pub fn evaluate(&self, ctx: &WizardContext) -> ButtonConfig {
        match self {
            StepButtons::Static(config) => config.clone(),
            StepButtons::Dynamic(f) => f(ctx),
        }
    }
}

impl fmt::Debug for StepButtons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepButtons::Static(config) => f.debug_tuple("Static").field(config).finish(),
            StepButtons::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<ButtonConfig> for StepButtons {
    fn from(config: ButtonConfig) -> Self {
        StepButtons::Static(config)
    }
}

/// Merge the wizard default with a step override and group by position.
///
/// A key present in neither layer is not shown, nor is one whose merged
/// `visible` is false.
pub fn resolve_buttons(
    defaults: &ButtonConfig,
    step: Option<&StepButtons>,
    ctx: &WizardContext,
) -> ButtonsByPosition {
    let step_config = step.map(|s| s.evaluate(ctx));
    let mut resolved = ButtonsByPosition::default();

    for &kind in ButtonKind::all() {
        let from_step = step_config.as_ref().and_then(|c| c.get(kind));
        let merged = match (from_step, defaults.get(kind)) {
            (None, None) => continue,
            (Some(step_def), Some(default_def)) => step_def.over(default_def),
            (Some(def), None) | (None, Some(def)) => def.clone(),
        };

        if let Some(button) = finalize(kind, &merged) {
            resolved.push(button);
        }
    }

    resolved
}

fn finalize(kind: ButtonKind, definition: &ButtonDefinition) -> Option<ResolvedButton> {
    if !definition.visible.unwrap_or(true) {
        return None;
    }
    Some(ResolvedButton {
        kind,
        position: definition
            .position
            .unwrap_or_else(|| kind.default_position()),
        label: definition
            .label
            .clone()
            .unwrap_or_else(|| kind.default_label().to_string()),
        variant: definition.variant.unwrap_or_else(|| kind.default_variant()),
        disabled: definition.disabled.unwrap_or(false),
    })
}

/// Wizard-wide resolver holding the default layout.
///
/// On a terminal step the next button becomes the completion button: its
/// label switches to `finish_label` unless the step set a label itself.
#[derive(Debug, Clone)]
pub struct ButtonResolver {
    defaults: ButtonConfig,
    finish_label: Option<String>,
}

impl ButtonResolver {
    pub fn new(defaults: ButtonConfig) -> Self {
        Self {
            defaults,
            finish_label: None,
        }
    }

    pub fn with_finish_label(mut self, label: impl Into<String>) -> Self {
        self.finish_label = Some(label.into());
        self
    }

    pub fn defaults(&self) -> &ButtonConfig {
        &self.defaults
    }

    pub fn resolve(
        &self,
        step: Option<&StepButtons>,
        ctx: &WizardContext,
        is_last_step: bool,
    ) -> ButtonsByPosition {
        let Some(finish_label) = self.finish_label.as_ref().filter(|_| is_last_step) else {
            return resolve_buttons(&self.defaults, step, ctx);
        };

        let step_config = step.map(|s| s.evaluate(ctx));
        let step_sets_label = step_config
            .as_ref()
            .and_then(|c| c.next.as_ref())
            .is_some_and(|d| d.label.is_some());

        let mut resolved = resolve_buttons(
            &self.defaults,
            step_config.map(StepButtons::Static).as_ref(),
            ctx,
        );
        if !step_sets_label {
            for button in resolved
                .left
                .iter_mut()
                .chain(resolved.center.iter_mut())
                .chain(resolved.right.iter_mut())
                .filter(|b| b.kind == ButtonKind::Next)
            {
                button.label = finish_label.clone();
            }
        }
        resolved
    }
}

impl Default for ButtonResolver {
    fn default() -> Self {
        Self::new(ButtonConfig::wizard_default())
    }
}
