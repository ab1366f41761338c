//! Sample onboarding wizard used by the terminal shell.
//!
//! ```text
//! welcome -> account -(business)-> company -> name -(business)-> documents -> review
//!                    \-(personal)----------/      \-(personal)--------------/
//! ```

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::buttons::{ButtonConfig, ButtonDefinition, ButtonKind, ButtonVariant};
use crate::fingerprint::step_fingerprint;
use crate::form_data::{aggregate_form_data, ComponentType, FormPart};
use crate::wizard::{Step, WizardContext, WizardGraph};

pub const START: &str = "welcome";

/// Render units of the demo wizard, dispatched on by the shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StepView {
    /// Static text, no input
    Info,
    /// Pick one of `props.options`
    Choice,
    /// Free text; `required` steps cannot continue while empty
    Text { required: bool, multiline: bool },
    /// Comma-separated file paths
    Files,
    /// Summary of everything collected
    Review,
}

impl StepView {
    /// Component the collected payload is tagged with
    pub fn component_type(&self) -> Option<ComponentType> {
        match self {
            StepView::Info | StepView::Review => None,
            StepView::Choice => Some(ComponentType::Select),
            StepView::Text {
                multiline: true, ..
            } => Some(ComponentType::TextArea),
            StepView::Text { .. } => Some(ComponentType::TextInput),
            StepView::Files => Some(ComponentType::FileUpload),
        }
    }
}

fn is_business(ctx: &WizardContext) -> bool {
    ctx.field("account", "value").and_then(Value::as_str) == Some("business")
}

/// Previously entered value for a step, so going back shows it again
fn prefill(ctx: &WizardContext, step_id: &str) -> Value {
    ctx.field(step_id, "value").cloned().unwrap_or(Value::Null)
}

/// Build the demo graph
pub fn onboarding_graph() -> Arc<WizardGraph<StepView>> {
    let steps = vec![
        Step::builder("welcome", StepView::Info)
            .props(|_| {
                json!({
                    "title": "Welcome",
                    "body": "This wizard sets up a new account. Business accounts \
                             need a company name and supporting documents.",
                })
            })
            .buttons(
                ButtonConfig::default()
                    .with(ButtonKind::Previous, ButtonDefinition::hidden())
                    .with(ButtonKind::Next, ButtonDefinition::labelled("Get started")),
            )
            .then("account")
            .build(),
        Step::builder("account", StepView::Choice)
            .props(|ctx| {
                json!({
                    "title": "Account type",
                    "options": ["personal", "business"],
                    "selected": prefill(ctx, "account"),
                })
            })
            .next(|ctx| {
                if is_business(ctx) {
                    Some("company".to_string())
                } else {
                    Some("name".to_string())
                }
            })
            .build(),
        Step::builder(
            "company",
            StepView::Text {
                required: true,
                multiline: false,
            },
        )
        .props(|ctx| {
            json!({
                "title": "Company name",
                "placeholder": "Acme Ltd",
                "value": prefill(ctx, "company"),
            })
        })
        .then("name")
        .build(),
        Step::builder(
            "name",
            StepView::Text {
                required: true,
                multiline: false,
            },
        )
        .props(|ctx| {
            let title = if is_business(ctx) {
                "Contact person"
            } else {
                "Your name"
            };
            json!({"title": title, "placeholder": "Ada Lovelace", "value": prefill(ctx, "name")})
        })
        // The title depends on the account type; remount when it changes
        .hash(|_, props| step_fingerprint("name", &props["title"]))
        .next(|ctx| {
            if is_business(ctx) {
                Some("documents".to_string())
            } else {
                Some("review".to_string())
            }
        })
        .build(),
        Step::builder("documents", StepView::Files)
            .props(|ctx| {
                json!({
                    "title": "Supporting documents",
                    "placeholder": "/path/to/registration.pdf, /path/to/id.png",
                    "value": prefill(ctx, "documents"),
                })
            })
            .then("review")
            .build(),
        Step::builder("review", StepView::Review)
            .props(|ctx| {
                json!({
                    "title": "Review",
                    "lines": review_lines(ctx),
                })
            })
            .hash(|_, props| step_fingerprint("review", props))
            .buttons_with(|ctx| {
                let label = if is_business(ctx) {
                    "Submit application"
                } else {
                    "Create account"
                };
                ButtonConfig::default().with(
                    ButtonKind::Next,
                    ButtonDefinition::labelled(label).with_variant(ButtonVariant::Primary),
                )
            })
            .build(),
    ];

    Arc::new(WizardGraph::new(steps))
}

/// One line per submitted form entry
pub fn review_lines(ctx: &WizardContext) -> Vec<String> {
    aggregate_form_data(ctx.state())
        .entries()
        .iter()
        .map(|(key, part)| match part {
            FormPart::Text(text) => format!("{key}: {text}"),
            FormPart::File(file) => format!("{key}: {} ({})", file.name, file.path.display()),
        })
        .collect()
}
