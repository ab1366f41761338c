//! Step descriptors: one node of the wizard graph

use std::fmt;

use serde_json::Value;

use super::context::{StepId, WizardContext};
use crate::buttons::{ButtonConfig, StepButtons};

pub(crate) type PropsFn<P> = Box<dyn Fn(&WizardContext) -> P + Send + Sync>;
pub(crate) type HashFn<P> = Box<dyn Fn(&WizardContext, &P) -> String + Send + Sync>;
pub(crate) type NextFn = Box<dyn Fn(&WizardContext) -> Option<StepId> + Send + Sync>;

/// A reachable step of the wizard.
///
/// `R` is the render unit handed to the shell untouched; `P` is the props
/// type produced for it from the current context.
pub struct Step<R, P = Value> {
    id: StepId,
    render: R,
    props: PropsFn<P>,
    hash: Option<HashFn<P>>,
    next: NextFn,
    buttons: Option<StepButtons>,
}

impl<R, P> Step<R, P> {
    /// Start building a step with the given id and render unit
    pub fn builder(id: impl Into<StepId>, render: R) -> StepBuilder<R, P> {
        StepBuilder {
            id: id.into(),
            render,
            props: None,
            hash: None,
            next: None,
            buttons: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The opaque render unit for this step
    pub fn render(&self) -> &R {
        &self.render
    }

    /// Produce the props for this step from the current context
    pub fn props(&self, ctx: &WizardContext) -> P {
        (self.props)(ctx)
    }

    /// Fingerprint of the rendered instance, if this step defines one.
    ///
    /// `None` means the shell should re-render with fresh props and never
    /// force a remount.
    pub fn hash(&self, ctx: &WizardContext, props: &P) -> Option<String> {
        self.hash.as_ref().map(|hash| hash(ctx, props))
    }

    pub fn has_hash(&self) -> bool {
        self.hash.is_some()
    }

    /// Evaluate the transition function. `None` marks a terminal step.
    pub fn next(&self, ctx: &WizardContext) -> Option<StepId> {
        (self.next)(ctx)
    }

    /// Step-level button override, if any
    pub fn buttons(&self) -> Option<&StepButtons> {
        self.buttons.as_ref()
    }
}

impl<R: fmt::Debug, P> fmt::Debug for Step<R, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("id", &self.id)
            .field("render", &self.render)
            .field("has_hash", &self.hash.is_some())
            .field("buttons", &self.buttons)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Step`]
pub struct StepBuilder<R, P = Value> {
    id: StepId,
    render: R,
    props: Option<PropsFn<P>>,
    hash: Option<HashFn<P>>,
    next: Option<NextFn>,
    buttons: Option<StepButtons>,
}

impl<R, P> StepBuilder<R, P> {
    /// Set the props function
    pub fn props<F>(mut self, f: F) -> Self
    where
        F: Fn(&WizardContext) -> P + Send + Sync + 'static,
    {
        self.props = Some(Box::new(f));
        self
    }

    /// Set the render fingerprint function
    pub fn hash<F>(mut self, f: F) -> Self
    where
        F: Fn(&WizardContext, &P) -> String + Send + Sync + 'static,
    {
        self.hash = Some(Box::new(f));
        self
    }

    /// Set a dynamic transition function
    pub fn next<F>(mut self, f: F) -> Self
    where
        F: Fn(&WizardContext) -> Option<StepId> + Send + Sync + 'static,
    {
        self.next = Some(Box::new(f));
        self
    }

    /// Always transition to `target`
    pub fn then(self, target: impl Into<StepId>) -> Self {
        let target = target.into();
        self.next(move |_| Some(target.clone()))
    }

    /// Static button override
    pub fn buttons(mut self, config: ButtonConfig) -> Self {
        self.buttons = Some(StepButtons::Static(config));
        self
    }

    /// Button override computed from the context
    pub fn buttons_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&WizardContext) -> ButtonConfig + Send + Sync + 'static,
    {
        self.buttons = Some(StepButtons::Dynamic(Box::new(f)));
        self
    }

    /// Finish the step with `f` as its props function. Works for props
    /// types without a `Default`.
    pub fn build_with_props<F>(self, f: F) -> Step<R, P>
    where
        F: Fn(&WizardContext) -> P + Send + Sync + 'static,
    {
        self.assemble(Box::new(f))
    }

    /// Finish the step, or `None` if no props function was set
    pub fn try_build(mut self) -> Option<Step<R, P>> {
        let props = self.props.take()?;
        Some(self.assemble(props))
    }

    fn assemble(self, props: PropsFn<P>) -> Step<R, P> {
        Step {
            id: self.id,
            render: self.render,
            props,
            hash: self.hash,
            next: self.next.unwrap_or_else(|| Box::new(|_| None)),
            buttons: self.buttons,
        }
    }
}

impl<R, P: Default + 'static> StepBuilder<R, P> {
    /// Finish the step. Without a props function the step yields
    /// `P::default()`; without a transition function it is terminal.
    pub fn build(mut self) -> Step<R, P> {
        let props = self
            .props
            .take()
            .unwrap_or_else(|| Box::new(|_| P::default()));
        self.assemble(props)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_are_terminal_and_null_props() {
        let step: Step<&str> = Step::builder("done", "summary").build();
        let ctx = WizardContext::new("done");

        assert_eq!(step.id(), "done");
        assert_eq!(*step.render(), "summary");
        assert_eq!(step.props(&ctx), Value::Null);
        assert_eq!(step.next(&ctx), None);
        assert_eq!(step.hash(&ctx, &Value::Null), None);
        assert!(step.buttons().is_none());
    }

    #[test]
    fn test_next_reads_context() {
        let step: Step<&str> = Step::builder("plan", "select")
            .next(|ctx| match ctx.field("plan", "tier").and_then(Value::as_str) {
                Some("pro") => Some("billing".to_string()),
                _ => Some("summary".to_string()),
            })
            .build();

        let mut ctx = WizardContext::new("plan");
        assert_eq!(step.next(&ctx).as_deref(), Some("summary"));

        ctx.update_state("plan", json!({"tier": "pro"}));
        assert_eq!(step.next(&ctx).as_deref(), Some("billing"));
    }

    #[test]
    fn test_hash_receives_props() {
        let step: Step<&str, u32> = Step::builder("count", "counter")
            .props(|ctx| ctx.state().len() as u32)
            .hash(|_, props| format!("n{props}"))
            .build();

        let mut ctx = WizardContext::new("count");
        ctx.update_state("x", json!(null));
        let props = step.props(&ctx);

        assert!(step.has_hash());
        assert_eq!(step.hash(&ctx, &props).as_deref(), Some("n1"));
    }

    #[derive(Debug, PartialEq)]
    struct Quote {
        amount: u32,
    }

    #[test]
    fn test_build_with_props_without_default() {
        let step: Step<(), Quote> = Step::builder("quote", ())
            .then("pay")
            .build_with_props(|ctx| Quote {
                amount: ctx.state().len() as u32 * 10,
            });

        let mut ctx = WizardContext::new("quote");
        ctx.update_state("items", json!(["a"]));

        assert_eq!(step.props(&ctx), Quote { amount: 10 });
        assert_eq!(step.next(&ctx).as_deref(), Some("pay"));
    }

    #[test]
    fn test_try_build_requires_props() {
        let missing = Step::<(), Quote>::builder("quote", ()).try_build();
        assert!(missing.is_none());

        let step = Step::<(), Quote>::builder("quote", ())
            .props(|_| Quote { amount: 5 })
            .try_build()
            .unwrap();
        assert_eq!(step.props(&WizardContext::new("quote")), Quote { amount: 5 });
        assert_eq!(step.next(&WizardContext::new("quote")), None);
    }

    #[test]
    fn test_then_is_static_transition() {
        let step: Step<()> = Step::builder("a", ()).then("b").build();
        assert_eq!(
            step.next(&WizardContext::new("a")).as_deref(),
            Some("b")
        );
    }
}
