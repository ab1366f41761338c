//! Input widgets mounted for the current wizard step

use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::{Block, Borders, ListState};
use serde_json::{json, Value};
use tui_textarea::TextArea;

use crate::demo::StepView;

/// Live input state of the mounted step.
///
/// Rebuilt from props whenever the shell remounts the step, so it never
/// outlives a change of step or render key.
pub enum StepInput {
    /// Nothing to collect
    Static,
    /// Single choice from a list
    Choice {
        options: Vec<String>,
        state: ListState,
    },
    /// Text entry (also used for comma-separated file paths)
    Text {
        textarea: Box<TextArea<'static>>,
        required: bool,
        multiline: bool,
    },
}

impl StepInput {
    /// Build the input for a view, prefilled from its props
    pub fn mount(view: &StepView, props: &Value) -> Self {
        match view {
            StepView::Info | StepView::Review => StepInput::Static,
            StepView::Choice => {
                let options: Vec<String> = props["options"]
                    .as_array()
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                let selected = props["selected"]
                    .as_str()
                    .and_then(|s| options.iter().position(|o| o == s))
                    .unwrap_or(0);
                let mut state = ListState::default();
                if !options.is_empty() {
                    state.select(Some(selected));
                }
                StepInput::Choice { options, state }
            }
            StepView::Text {
                required,
                multiline,
            } => {
                let prefill = props["value"].as_str().unwrap_or_default().to_string();
                StepInput::Text {
                    textarea: Box::new(text_area(props, &prefill)),
                    required: *required,
                    multiline: *multiline,
                }
            }
            StepView::Files => {
                let prefill = props["value"]
                    .as_array()
                    .map(|files| {
                        files
                            .iter()
                            .filter_map(|f| f["path"].as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    })
                    .unwrap_or_default();
                StepInput::Text {
                    textarea: Box::new(text_area(props, &prefill)),
                    required: false,
                    multiline: false,
                }
            }
        }
    }

    /// Whether keys like `q` belong to the input rather than the shell
    pub fn captures_text(&self) -> bool {
        matches!(self, StepInput::Text { .. })
    }

    /// Whether Enter should insert a newline instead of advancing
    pub fn is_multiline(&self) -> bool {
        matches!(
            self,
            StepInput::Text {
                multiline: true,
                ..
            }
        )
    }

    /// Returns true if the key was consumed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self {
            StepInput::Static => false,
            StepInput::Choice { options, state } => {
                let len = options.len();
                if len == 0 {
                    return false;
                }
                match key.code {
                    KeyCode::Up | KeyCode::Char('k') => {
                        let i = state.selected().map_or(0, |i| if i == 0 { len - 1 } else { i - 1 });
                        state.select(Some(i));
                        true
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        let i = state.selected().map_or(0, |i| (i + 1) % len);
                        state.select(Some(i));
                        true
                    }
                    _ => false,
                }
            }
            StepInput::Text { textarea, .. } => textarea.input(key),
        }
    }

    /// The "can continue" signal for the next button
    pub fn can_continue(&self) -> bool {
        match self {
            StepInput::Static => true,
            StepInput::Choice { state, .. } => state.selected().is_some(),
            StepInput::Text {
                textarea, required, ..
            } => !*required || textarea.lines().iter().any(|l| !l.trim().is_empty()),
        }
    }

    /// Collected value for the step payload, shaped for the given view
    pub fn value(&self, view: &StepView) -> Value {
        match (self, view) {
            (StepInput::Choice { options, state }, _) => state
                .selected()
                .and_then(|i| options.get(i))
                .map_or(Value::Null, |s| json!(s)),
            (StepInput::Text { textarea, .. }, StepView::Files) => {
                Value::Array(parse_file_list(&textarea.lines().join(",")))
            }
            (StepInput::Text { textarea, .. }, _) => {
                json!(textarea.lines().join("\n").trim())
            }
            (StepInput::Static, _) => Value::Null,
        }
    }
}

fn text_area(props: &Value, prefill: &str) -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_block(Block::default().borders(Borders::ALL));
    if let Some(placeholder) = props["placeholder"].as_str() {
        textarea.set_placeholder_text(placeholder.to_string());
    }
    textarea.insert_str(prefill);
    textarea
}

/// Turn `a.pdf, /tmp/b.png` into file descriptors
pub fn parse_file_list(input: &str) -> Vec<Value> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|raw| {
            let path = PathBuf::from(raw);
            let name = Path::new(raw)
                .file_name()
                .map_or_else(|| raw.to_string(), |n| n.to_string_lossy().to_string());
            json!({"name": name, "path": path})
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_choice_prefills_selected_option() {
        let props = json!({"options": ["a", "b", "c"], "selected": "c"});
        let input = StepInput::mount(&StepView::Choice, &props);

        assert_eq!(input.value(&StepView::Choice), json!("c"));
    }

    #[test]
    fn test_choice_wraps_around() {
        let props = json!({"options": ["a", "b"]});
        let mut input = StepInput::mount(&StepView::Choice, &props);

        assert!(input.handle_key(key(KeyCode::Up)));
        assert_eq!(input.value(&StepView::Choice), json!("b"));
        assert!(input.handle_key(key(KeyCode::Down)));
        assert_eq!(input.value(&StepView::Choice), json!("a"));
    }

    #[test]
    fn test_required_text_blocks_until_typed() {
        let view = StepView::Text {
            required: true,
            multiline: false,
        };
        let mut input = StepInput::mount(&view, &json!({}));

        assert!(!input.can_continue());
        input.handle_key(key(KeyCode::Char('A')));
        assert!(input.can_continue());
        assert_eq!(input.value(&view), json!("A"));
    }

    #[test]
    fn test_text_prefill() {
        let view = StepView::Text {
            required: true,
            multiline: false,
        };
        let input = StepInput::mount(&view, &json!({"value": "Ada"}));
        assert!(input.can_continue());
        assert_eq!(input.value(&view), json!("Ada"));
    }

    #[test]
    fn test_files_round_trip_through_prefill() {
        let props = json!({"value": [{"name": "a.pdf", "path": "/tmp/a.pdf"}]});
        let input = StepInput::mount(&StepView::Files, &props);

        assert_eq!(
            input.value(&StepView::Files),
            json!([{"name": "a.pdf", "path": "/tmp/a.pdf"}])
        );
    }

    #[test]
    fn test_parse_file_list() {
        let files = parse_file_list(" /tmp/a.pdf ,, b.png");
        assert_eq!(files.len(), 2);
        assert_eq!(files[0]["name"], "a.pdf");
        assert_eq!(files[1]["path"], "b.png");
    }

    #[test]
    fn test_static_input() {
        let input = StepInput::mount(&StepView::Info, &json!({}));
        assert!(input.can_continue());
        assert!(!input.captures_text());
        assert_eq!(input.value(&StepView::Info), Value::Null);
    }
}
