//! Terminal shell: renders the current wizard frame and maps keys to
//! engine operations

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};
use serde_json::Value;

use super::input::StepInput;
use crate::buttons::{ButtonPosition, ButtonResolver, ButtonVariant, ResolvedButton};
use crate::demo::StepView;
use crate::form_data::tag;
use crate::wizard::{Transition, WizardContext, WizardEngine};

/// What a key press did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellAction {
    /// Nothing the caller needs to react to
    None,
    Advanced,
    Retreated,
    /// The terminal step was confirmed
    Completed,
    Cancelled,
}

/// Identity of the mounted input: a new step or a new render key remounts
#[derive(Debug, Clone, PartialEq, Eq)]
struct Mounted {
    step_id: String,
    render_key: Option<String>,
}

pub struct WizardShell {
    engine: WizardEngine<StepView>,
    resolver: ButtonResolver,
    input: StepInput,
    mounted: Option<Mounted>,
    seen_revision: Option<u64>,
    status: Option<String>,
}

impl WizardShell {
    pub fn new(engine: WizardEngine<StepView>, resolver: ButtonResolver) -> Self {
        let mut shell = Self {
            engine,
            resolver,
            input: StepInput::Static,
            mounted: None,
            seen_revision: None,
            status: None,
        };
        shell.sync_mount();
        shell
    }

    pub fn engine(&self) -> &WizardEngine<StepView> {
        &self.engine
    }

    pub fn into_context(self) -> WizardContext {
        self.engine.into_context()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Remount the input if the step or its render key changed since the
    /// last context revision we looked at
    fn sync_mount(&mut self) {
        let revision = self.engine.context().revision();
        if self.seen_revision == Some(revision) {
            return;
        }
        self.seen_revision = Some(revision);

        let Some(node) = self.engine.current_node() else {
            self.input = StepInput::Static;
            self.mounted = None;
            return;
        };
        let current = Mounted {
            step_id: node.id().to_string(),
            render_key: self.engine.render_key(),
        };
        if self.mounted.as_ref() == Some(&current) {
            return;
        }

        let props = node.props(self.engine.context());
        self.input = StepInput::mount(node.render(), &props);
        tracing::debug!(step = %current.step_id, "mounted step input");
        self.mounted = Some(current);
    }

    pub fn can_continue(&self) -> bool {
        self.engine.current_node().is_some() && self.input.can_continue()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ShellAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return ShellAction::Cancelled;
        }

        let action = match key.code {
            KeyCode::Esc => self.back(),
            KeyCode::Tab => self.advance(),
            KeyCode::Enter if !self.input.is_multiline() => self.advance(),
            KeyCode::Char('q') if !self.input.captures_text() => ShellAction::Cancelled,
            _ => {
                self.input.handle_key(key);
                ShellAction::None
            }
        };
        self.sync_mount();
        action
    }

    fn back(&mut self) -> ShellAction {
        self.status = None;
        match self.engine.go_back() {
            Transition::Retreated { .. } => ShellAction::Retreated,
            _ => ShellAction::None,
        }
    }

    /// Store the step's answer, then advance or complete
    fn advance(&mut self) -> ShellAction {
        if !self.can_continue() {
            self.status = Some("This step needs an answer before continuing".to_string());
            return ShellAction::None;
        }
        self.status = None;

        let Some(view) = self.engine.current_node().map(|n| n.render().clone()) else {
            return ShellAction::None;
        };
        if let Some(component) = view.component_type() {
            let step_id = self.engine.current_step_id().to_string();
            let value = self.input.value(&view);
            self.engine.update_step_state(step_id, tag(component, value));
        }

        if self.engine.is_last_step() {
            return ShellAction::Completed;
        }
        match self.engine.go_next() {
            Transition::Advanced { .. } => ShellAction::Advanced,
            _ => ShellAction::None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);

        let (title, props, buttons) = {
            let Some(current) = self.engine.frame(&self.resolver) else {
                let missing = Paragraph::new(format!(
                    "Step '{}' does not exist. Press Esc to go back.",
                    self.engine.current_step_id()
                ))
                .style(Style::default().fg(Color::Red))
                .block(Block::default().borders(Borders::ALL).title(" Wizard "));
                frame.render_widget(missing, area);
                return;
            };
            let title = current.props["title"]
                .as_str()
                .unwrap_or(current.step_id)
                .to_string();
            (title, current.props, current.buttons)
        };
        let buttons = buttons.with_can_continue(self.input.can_continue());

        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    title,
                    Style::default()
                        .fg(Color::LightCyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
            ]))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1), // Breadcrumb
                Constraint::Length(1), // Spacer
                Constraint::Min(3),    // Step body
                Constraint::Length(1), // Status
                Constraint::Length(1), // Buttons
            ])
            .split(inner);

        let breadcrumb = Paragraph::new(self.engine.history().join(" › "))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(breadcrumb, chunks[0]);

        self.render_body(frame, chunks[2], &props);

        if let Some(status) = &self.status {
            let status = Paragraph::new(status.as_str()).style(Style::default().fg(Color::Yellow));
            frame.render_widget(status, chunks[3]);
        }

        render_buttons(frame, chunks[4], |position| buttons.get(position).to_vec());
    }

    fn render_body(&mut self, frame: &mut Frame, area: Rect, props: &Value) {
        let review_lines = props["lines"].as_array();
        match &mut self.input {
            StepInput::Static => {
                let lines: Vec<Line> = match review_lines {
                    Some(lines) if !lines.is_empty() => lines
                        .iter()
                        .filter_map(Value::as_str)
                        .map(|l| Line::from(l.to_string()))
                        .collect(),
                    Some(_) => vec![Line::from("Nothing to submit.")],
                    None => vec![Line::from(
                        props["body"].as_str().unwrap_or_default().to_string(),
                    )],
                };
                frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
            }
            StepInput::Choice { options, state } => {
                let items: Vec<ListItem> = options
                    .iter()
                    .map(|o| ListItem::new(o.clone()))
                    .collect();
                let list = List::new(items)
                    .highlight_style(
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                    .highlight_symbol("› ");
                frame.render_stateful_widget(list, area, state);
            }
            StepInput::Text { textarea, .. } => {
                let height = area.height.min(3);
                let text_area = Rect { height, ..area };
                frame.render_widget(&**textarea, text_area);
            }
        }
    }
}

fn button_style(button: &ResolvedButton) -> Style {
    if button.disabled {
        return Style::default().fg(Color::DarkGray);
    }
    match button.variant {
        ButtonVariant::Primary => Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD),
        ButtonVariant::Secondary => Style::default().fg(Color::White),
        ButtonVariant::Tertiary => Style::default().fg(Color::Gray),
        ButtonVariant::Danger => Style::default().fg(Color::White).bg(Color::Red),
    }
}

fn render_buttons<F>(frame: &mut Frame, area: Rect, buttons_at: F)
where
    F: Fn(ButtonPosition) -> Vec<ResolvedButton>,
{
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    for (i, &position) in ButtonPosition::all().iter().enumerate() {
        let mut spans = Vec::new();
        for button in buttons_at(position) {
            if !spans.is_empty() {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(format!("[ {} ]", button.label), button_style(&button)));
        }
        let alignment = match position {
            ButtonPosition::Left => Alignment::Left,
            ButtonPosition::Center => Alignment::Center,
            ButtonPosition::Right => Alignment::Right,
        };
        frame.render_widget(
            Paragraph::new(Line::from(spans)).alignment(alignment),
            columns[i],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons::ButtonKind;
    use crate::demo::{onboarding_graph, START};
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn shell() -> WizardShell {
        WizardShell::new(
            WizardEngine::new(onboarding_graph(), START),
            ButtonResolver::default().with_finish_label("Finish"),
        )
    }

    fn type_text(shell: &mut WizardShell, text: &str) {
        for c in text.chars() {
            shell.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn screen_text(shell: &mut WizardShell) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| shell.render(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_personal_flow_completes() {
        let mut shell = shell();

        assert_eq!(shell.handle_key(key(KeyCode::Enter)), ShellAction::Advanced);
        // "personal" is preselected
        assert_eq!(shell.handle_key(key(KeyCode::Enter)), ShellAction::Advanced);
        type_text(&mut shell, "Ada");
        assert_eq!(shell.handle_key(key(KeyCode::Enter)), ShellAction::Advanced);
        assert_eq!(shell.engine().current_step_id(), "review");
        assert_eq!(shell.handle_key(key(KeyCode::Enter)), ShellAction::Completed);

        let ctx = shell.into_context();
        assert_eq!(ctx.field("name", "value"), Some(&json!("Ada")));
        assert_eq!(ctx.field("account", "value"), Some(&json!("personal")));
    }

    #[test]
    fn test_required_text_blocks_advance() {
        let mut shell = shell();
        shell.handle_key(key(KeyCode::Enter));
        shell.handle_key(key(KeyCode::Enter));

        assert_eq!(shell.engine().current_step_id(), "name");
        assert!(!shell.can_continue());
        assert_eq!(shell.handle_key(key(KeyCode::Enter)), ShellAction::None);
        assert!(shell.status().is_some());
        assert_eq!(shell.engine().current_step_id(), "name");
    }

    #[test]
    fn test_escape_goes_back_and_keeps_answers() {
        let mut shell = shell();
        shell.handle_key(key(KeyCode::Enter));
        shell.handle_key(key(KeyCode::Down));
        shell.handle_key(key(KeyCode::Enter));
        assert_eq!(shell.engine().current_step_id(), "company");

        assert_eq!(shell.handle_key(key(KeyCode::Esc)), ShellAction::Retreated);
        assert_eq!(shell.engine().current_step_id(), "account");
        // Remounted input shows the stored business choice again
        assert_eq!(shell.handle_key(key(KeyCode::Enter)), ShellAction::Advanced);
        assert_eq!(shell.engine().current_step_id(), "company");
    }

    #[test]
    fn test_escape_at_start_is_noop() {
        let mut shell = shell();
        assert_eq!(shell.handle_key(key(KeyCode::Esc)), ShellAction::None);
        assert_eq!(shell.engine().history(), ["welcome"]);
    }

    #[test]
    fn test_cancel_keys() {
        let mut shell = shell();
        assert_eq!(shell.handle_key(key(KeyCode::Char('q'))), ShellAction::Cancelled);
        assert_eq!(
            shell.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            ShellAction::Cancelled
        );
    }

    #[test]
    fn test_q_is_text_on_text_steps() {
        let mut shell = shell();
        shell.handle_key(key(KeyCode::Enter));
        shell.handle_key(key(KeyCode::Enter));

        assert_eq!(shell.handle_key(key(KeyCode::Char('q'))), ShellAction::None);
        assert!(shell.can_continue());
    }

    #[test]
    fn test_render_shows_title_and_buttons() {
        let mut shell = shell();
        let text = screen_text(&mut shell);

        assert!(text.contains("Welcome"));
        assert!(text.contains("[ Get started ]"));
        assert!(text.contains("[ Cancel ]"));
        assert!(!text.contains("[ Back ]"));
    }

    #[test]
    fn test_render_review_uses_step_label() {
        let mut shell = shell();
        shell.handle_key(key(KeyCode::Enter));
        shell.handle_key(key(KeyCode::Enter));
        type_text(&mut shell, "Ada");
        shell.handle_key(key(KeyCode::Enter));

        let text = screen_text(&mut shell);
        assert!(text.contains("name: Ada"));
        assert!(text.contains("[ Create account ]"));
        assert!(text.contains("[ Back ]"));
    }

    #[test]
    fn test_render_missing_step() {
        let engine = WizardEngine::resume(
            onboarding_graph(),
            START,
            Default::default(),
            vec!["welcome".to_string(), "vanished".to_string()],
        );
        let mut shell = WizardShell::new(engine, ButtonResolver::default());

        let text = screen_text(&mut shell);
        assert!(text.contains("Step 'vanished' does not exist"));
        assert_eq!(shell.handle_key(key(KeyCode::Enter)), ShellAction::None);
        assert_eq!(shell.handle_key(key(KeyCode::Esc)), ShellAction::Retreated);
    }

    #[test]
    fn test_next_button_disabled_until_answer() {
        let mut shell = shell();
        shell.handle_key(key(KeyCode::Enter));
        shell.handle_key(key(KeyCode::Enter));

        let buttons = shell
            .engine()
            .buttons(&ButtonResolver::default())
            .with_can_continue(shell.can_continue());
        assert!(buttons.find(ButtonKind::Next).unwrap().disabled);
    }
}
