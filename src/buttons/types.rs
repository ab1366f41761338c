//! Type definitions for wizard navigation buttons

use serde::{Deserialize, Serialize};

/// The three navigation controls a wizard step can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonKind {
    Previous,
    Next,
    Cancel,
}

impl ButtonKind {
    /// All kinds, in declaration order
    pub fn all() -> &'static [ButtonKind] {
        &[ButtonKind::Previous, ButtonKind::Next, ButtonKind::Cancel]
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            ButtonKind::Previous => "Back",
            ButtonKind::Next => "Next",
            ButtonKind::Cancel => "Cancel",
        }
    }

    pub fn default_position(&self) -> ButtonPosition {
        match self {
            ButtonKind::Previous => ButtonPosition::Left,
            ButtonKind::Next => ButtonPosition::Right,
            ButtonKind::Cancel => ButtonPosition::Left,
        }
    }

    pub fn default_variant(&self) -> ButtonVariant {
        match self {
            ButtonKind::Previous => ButtonVariant::Secondary,
            ButtonKind::Next => ButtonVariant::Primary,
            ButtonKind::Cancel => ButtonVariant::Tertiary,
        }
    }
}

/// Horizontal slot a button is laid out in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonPosition {
    Left,
    Center,
    Right,
}

impl ButtonPosition {
    pub fn all() -> &'static [ButtonPosition] {
        &[
            ButtonPosition::Left,
            ButtonPosition::Center,
            ButtonPosition::Right,
        ]
    }
}

/// Styling variant passed through to the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    Primary,
    Secondary,
    Tertiary,
    Danger,
}

/// One layer of a button definition.
///
/// Every field is optional so a step can override a single field (say the
/// label) and inherit the rest from the wizard-wide default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<ButtonPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<ButtonVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

impl ButtonDefinition {
    /// Definition carrying only a label
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Definition that hides the button
    pub fn hidden() -> Self {
        Self {
            visible: Some(false),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_position(mut self, position: ButtonPosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    /// Field-wise overlay: fields set on `self` win over `base`
    pub fn over(&self, base: &ButtonDefinition) -> ButtonDefinition {
        ButtonDefinition {
            visible: self.visible.or(base.visible),
            position: self.position.or(base.position),
            label: self.label.clone().or_else(|| base.label.clone()),
            variant: self.variant.or(base.variant),
            disabled: self.disabled.or(base.disabled),
        }
    }
}

/// Button layout for a wizard or a single step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<ButtonDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<ButtonDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel: Option<ButtonDefinition>,
}

impl ButtonConfig {
    /// Wizard-wide layout showing all three buttons with built-in labels
    pub fn wizard_default() -> Self {
        let full = |kind: ButtonKind| ButtonDefinition {
            visible: Some(true),
            position: Some(kind.default_position()),
            label: Some(kind.default_label().to_string()),
            variant: Some(kind.default_variant()),
            disabled: Some(false),
        };
        Self {
            previous: Some(full(ButtonKind::Previous)),
            next: Some(full(ButtonKind::Next)),
            cancel: Some(full(ButtonKind::Cancel)),
        }
    }

    pub fn get(&self, kind: ButtonKind) -> Option<&ButtonDefinition> {
        match kind {
            ButtonKind::Previous => self.previous.as_ref(),
            ButtonKind::Next => self.next.as_ref(),
            ButtonKind::Cancel => self.cancel.as_ref(),
        }
    }

    /// Set the definition for one key
    pub fn with(mut self, kind: ButtonKind, definition: ButtonDefinition) -> Self {
        let slot = match kind {
            ButtonKind::Previous => &mut self.previous,
            ButtonKind::Next => &mut self.next,
            ButtonKind::Cancel => &mut self.cancel,
        };
        *slot = Some(definition);
        self
    }
}

/// A fully resolved, visible button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedButton {
    #[serde(rename = "type")]
    pub kind: ButtonKind,
    pub position: ButtonPosition,
    pub label: String,
    pub variant: ButtonVariant,
    pub disabled: bool,
}

/// Visible buttons grouped by position, each group in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonsByPosition {
    pub left: Vec<ResolvedButton>,
    pub center: Vec<ResolvedButton>,
    pub right: Vec<ResolvedButton>,
}

impl ButtonsByPosition {
    pub fn get(&self, position: ButtonPosition) -> &[ResolvedButton] {
        match position {
            ButtonPosition::Left => &self.left,
            ButtonPosition::Center => &self.center,
            ButtonPosition::Right => &self.right,
        }
    }

    pub(crate) fn push(&mut self, button: ResolvedButton) {
        match button.position {
            ButtonPosition::Left => self.left.push(button),
            ButtonPosition::Center => self.center.push(button),
            ButtonPosition::Right => self.right.push(button),
        }
    }

    /// All buttons, left to right
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedButton> {
        self.left
            .iter()
            .chain(self.center.iter())
            .chain(self.right.iter())
    }

    pub fn find(&self, kind: ButtonKind) -> Option<&ResolvedButton> {
        self.iter().find(|b| b.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.center.is_empty() && self.right.is_empty()
    }

    /// Apply the active step's "can continue" signal to the next button.
    ///
    /// Only ever disables; a button disabled by configuration stays disabled.
    pub fn with_can_continue(mut self, can_continue: bool) -> Self {
        if !can_continue {
            for button in self
                .left
                .iter_mut()
                .chain(self.center.iter_mut())
                .chain(self.right.iter_mut())
                .filter(|b| b.kind == ButtonKind::Next)
            {
                button.disabled = true;
            }
        }
        self
    }
}
