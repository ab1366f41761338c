//! Integration tests for the public wizard API
//!
//! Drives a small checkout wizard end to end: branching navigation, button
//! resolution against a configured default layout, and aggregation of the
//! collected answers into form data.
//!
//! ```bash
//! cargo test --test wizard_integration
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};
use stepgraph::config::Config;
use stepgraph::fingerprint::step_fingerprint;
use stepgraph::{
    aggregate_form_data, tag, ButtonConfig, ButtonDefinition, ButtonKind, ButtonPosition,
    ComponentType, FormPart, StayReason, Step, TaggedPayload, Transition, WizardEngine,
    WizardGraph,
};
use tempfile::TempDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Cart,
    Shipping,
    Pickup,
    Payment,
    Confirm,
}

fn wants_delivery(ctx: &stepgraph::WizardContext) -> bool {
    ctx.field("cart", "value").and_then(Value::as_str) == Some("delivery")
}

fn checkout_graph() -> Arc<WizardGraph<Screen>> {
    Arc::new(WizardGraph::new([
        Step::builder("cart", Screen::Cart)
            .props(|_| json!({"options": ["delivery", "pickup"]}))
            .buttons(ButtonConfig::default().with(ButtonKind::Previous, ButtonDefinition::hidden()))
            .next(|ctx| {
                Some(if wants_delivery(ctx) {
                    "shipping".to_string()
                } else {
                    "pickup".to_string()
                })
            })
            .build(),
        Step::builder("shipping", Screen::Shipping)
            .then("payment")
            .build(),
        Step::builder("pickup", Screen::Pickup).then("payment").build(),
        Step::builder("payment", Screen::Payment)
            .then("confirm")
            .build(),
        Step::builder("confirm", Screen::Confirm)
            .props(|ctx| json!({"entries": aggregate_form_data(ctx.state()).len()}))
            .hash(|_, props| step_fingerprint("confirm", props))
            .build(),
    ]))
}

#[test]
fn test_delivery_checkout_end_to_end() {
    let mut engine = WizardEngine::new(checkout_graph(), "cart");

    engine.update_step_state("cart", tag(ComponentType::Select, json!("delivery")));
    engine.go_next();
    assert_eq!(engine.current_step_id(), "shipping");
    assert_eq!(engine.current_node().map(|n| *n.render()), Some(Screen::Shipping));

    engine.update_step_state(
        "shipping",
        TaggedPayload::new(ComponentType::TextArea, json!("1 Main St\nSpringfield"))
            .with_field("address")
            .into_payload(),
    );
    engine.go_next();
    engine.update_step_state(
        "payment",
        tag(ComponentType::MultiSelect, json!(["card", "voucher"])),
    );
    engine.go_next();

    assert_eq!(engine.current_step_id(), "confirm");
    assert!(engine.is_last_step());
    assert_eq!(
        engine.history(),
        ["cart", "shipping", "payment", "confirm"]
    );
    assert_eq!(engine.go_next(), Transition::Stayed(StayReason::Terminal));

    let form = aggregate_form_data(engine.context().state());
    assert_eq!(form.text("cart"), Some("delivery"));
    assert_eq!(form.text("address"), Some("1 Main St\nSpringfield"));
    assert_eq!(form.text("payment"), Some(r#"["card","voucher"]"#));
    assert!(form.get_all("shipping").is_empty());
}

#[test]
fn test_changing_an_earlier_answer_reroutes() {
    let mut engine = WizardEngine::new(checkout_graph(), "cart");
    engine.update_step_state("cart", tag(ComponentType::Select, json!("delivery")));
    engine.go_next();

    engine.go_back();
    engine.update_step_state("cart", tag(ComponentType::Select, json!("pickup")));
    engine.go_next();

    assert_eq!(engine.current_step_id(), "pickup");
    assert_eq!(engine.history(), ["cart", "pickup"]);
}

#[test]
fn test_confirm_render_key_follows_collected_answers() {
    let mut engine = WizardEngine::resume(
        checkout_graph(),
        "cart",
        BTreeMap::new(),
        vec!["cart".into(), "pickup".into(), "payment".into(), "confirm".into()],
    );
    let before = engine.render_key();

    engine.update_step_state("pickup", tag(ComponentType::DatePicker, json!("2026-11-02")));

    assert!(before.is_some());
    assert_ne!(engine.render_key(), before);
    assert_eq!(engine.props(), Some(json!({"entries": 1})));
}

#[test]
fn test_configured_defaults_merge_with_step_overrides() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("checkout.toml");
    std::fs::write(
        &path,
        "finish_label = \"Place order\"\n\n[buttons.cancel]\nposition = \"center\"\n",
    )
    .unwrap();
    let config = Config::load_from(None, path.to_str()).unwrap();
    let resolver = config.button_resolver();

    let mut engine = WizardEngine::new(checkout_graph(), "cart");
    let first = engine.buttons(&resolver);
    assert!(first.find(ButtonKind::Previous).is_none());
    assert_eq!(first.get(ButtonPosition::Center)[0].kind, ButtonKind::Cancel);
    assert_eq!(first.find(ButtonKind::Next).unwrap().label, "Next");

    engine.update_step_state("cart", tag(ComponentType::Select, json!("pickup")));
    engine.go_next();
    engine.go_next();
    engine.go_next();

    let last = engine.frame(&resolver).unwrap();
    assert!(last.is_last_step);
    assert_eq!(last.buttons.find(ButtonKind::Next).unwrap().label, "Place order");
    assert_eq!(last.buttons.find(ButtonKind::Previous).unwrap().label, "Back");
}

#[test]
fn test_file_answers_become_file_parts() {
    let mut engine = WizardEngine::new(checkout_graph(), "cart");
    engine.update_step_state(
        "payment",
        tag(
            ComponentType::FileUpload,
            json!([
                {"name": "receipt.pdf", "path": "/tmp/receipt.pdf", "contentType": "application/pdf"},
                {"name": "id.png", "path": "/tmp/id.png"}
            ]),
        ),
    );

    let form = aggregate_form_data(engine.context().state());
    let parts = form.get_all("payment");

    assert_eq!(parts.len(), 2);
    match parts[0] {
        FormPart::File(file) => {
            assert_eq!(file.name, "receipt.pdf");
            assert_eq!(file.content_type.as_deref(), Some("application/pdf"));
        }
        FormPart::Text(_) => panic!("expected a file part"),
    }
}

#[test]
fn test_engines_share_one_graph() {
    let graph = checkout_graph();
    let mut first = WizardEngine::new(Arc::clone(&graph), "cart");
    let second = WizardEngine::new(Arc::clone(&graph), "cart");

    first.update_step_state("cart", tag(ComponentType::Select, json!("delivery")));
    first.go_next();

    assert_eq!(first.current_step_id(), "shipping");
    assert_eq!(second.current_step_id(), "cart");
    assert!(second.context().state().is_empty());
    assert_ne!(first.context().session_id(), second.context().session_id());
}
