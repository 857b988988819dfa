use crate::core::templates::TemplateKind;
use crate::domain::errors::{PromptError, Result};
use crate::infra::console::{Console, Line};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    cursor, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, info, warn};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::{io, time::Duration};

/// What the picker loop decided after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickerAction {
    Continue,
    Confirm,
    Cancel,
}

struct PickerApp {
    entries: Vec<TemplateKind>,
    state: ListState,
    title: String,
    help_message: String,
}

impl PickerApp {
    fn new(title: String) -> Self {
        let mut state = ListState::default();
        state.select(Some(0));

        PickerApp {
            entries: TemplateKind::ALL.to_vec(),
            state,
            title,
            help_message: String::from(
                "↑/↓: Navigate | 1-5: Jump | Enter: Confirm | q/Esc: Quit",
            ),
        }
    }

    fn next(&mut self) {
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.entries.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    fn previous(&mut self) {
        let i = match self.state.selected() {
            Some(0) | None => self.entries.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn jump_to(&mut self, number: usize) -> bool {
        match self.entries.iter().position(|kind| kind.number() == number) {
            Some(i) => {
                self.state.select(Some(i));
                true
            }
            None => false,
        }
    }

    fn selected(&self) -> Option<TemplateKind> {
        self.state.selected().and_then(|i| self.entries.get(i).copied())
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> PickerAction {
        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => PickerAction::Cancel,
            KeyCode::Char('q') | KeyCode::Esc => PickerAction::Cancel,
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let number = c.to_digit(10).unwrap_or_default() as usize;
                if self.jump_to(number) {
                    PickerAction::Confirm
                } else {
                    PickerAction::Continue
                }
            }
            KeyCode::Down => {
                self.next();
                PickerAction::Continue
            }
            KeyCode::Up => {
                self.previous();
                PickerAction::Continue
            }
            KeyCode::Enter => PickerAction::Confirm,
            _ => PickerAction::Continue,
        }
    }
}

fn ui(f: &mut Frame, app: &mut PickerApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.area());

    let title = Paragraph::new(Span::styled(
        app.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    f.render_widget(title, chunks[0]);

    let selected_style = Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let items: Vec<ListItem> = app
        .entries
        .iter()
        .map(|kind| {
            ListItem::new(Span::raw(format!(
                "{}: {} ({})",
                kind.number(),
                kind.description(),
                kind.name()
            )))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Templates"))
        .highlight_style(selected_style)
        .highlight_symbol("» ");

    f.render_stateful_widget(list, chunks[1], &mut app.state);

    let controls = Paragraph::new(Span::styled(
        app.help_message.clone(),
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(controls, chunks[2]);
}

/// Restores the terminal when dropped, whichever way the picker exits.
struct TerminalGuard {
    restore: fn(),
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard {
            restore: restore_terminal,
        };
        execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        (self.restore)();
    }
}

fn restore_terminal() {
    if let Err(e) = disable_raw_mode() {
        warn!("Could not leave raw mode: {}", e);
    }
    if let Err(e) = execute!(
        io::stderr(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        cursor::Show
    ) {
        warn!("Could not restore the terminal screen: {}", e);
    }
}

// Drawn on stderr so that `--stdout` output stays clean.
fn run_tui() -> anyhow::Result<Option<TemplateKind>> {
    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stderr()))?;

    let mut app = PickerApp::new("Select a prompt template".to_string());
    let action = run_app(&mut terminal, &mut app)?;

    match action {
        PickerAction::Confirm => Ok(app.selected()),
        _ => Ok(None),
    }
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut PickerApp) -> anyhow::Result<PickerAction> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.handle_key(key.code, key.modifiers) {
                    PickerAction::Continue => {}
                    action => return Ok(action),
                }
            }
        }
    }
}

/// Numbered menu on plain stdin; re-prompts until a valid number is given.
fn select_by_number(console: &mut dyn Console) -> Result<TemplateKind> {
    console.say("\nAvailable templates:");
    for kind in TemplateKind::ALL {
        console.say(&format!("{}: {}", kind.number(), kind.description()));
    }

    loop {
        let answer = match console.read_line("\nSelect a template number (1-5): ")? {
            Line::Text(answer) => answer,
            Line::EndOfInput => return Err(PromptError::SelectionCancelled),
        };

        match answer.trim().parse::<usize>().ok().and_then(TemplateKind::from_number) {
            Some(kind) => return Ok(kind),
            None => console.say("Invalid number. Please enter a number from 1 to 5."),
        }
    }
}

/// Picks the template: a preselection wins, then the list picker or the numbered menu.
pub fn select_template(
    preselected: Option<&str>,
    use_tui: bool,
    console: &mut dyn Console,
) -> anyhow::Result<TemplateKind> {
    if let Some(name) = preselected {
        let kind: TemplateKind = name.parse()?;
        info!("Using preselected template '{}'", kind.name());
        return Ok(kind);
    }

    if use_tui {
        debug!("Opening template picker");
        return match run_tui()? {
            Some(kind) => {
                info!("Selected template '{}'", kind.name());
                Ok(kind)
            }
            None => {
                warn!("Template selection cancelled");
                Err(PromptError::SelectionCancelled.into())
            }
        };
    }

    Ok(select_by_number(console)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::console::ScriptedConsole;

    #[test]
    fn test_picker_navigation_wraps() {
        let mut app = PickerApp::new("Test".to_string());
        app.previous();
        assert_eq!(app.selected(), Some(TemplateKind::Code));
        app.next();
        assert_eq!(app.selected(), Some(TemplateKind::Review));
        app.next();
        assert_eq!(app.selected(), Some(TemplateKind::Revise));
    }

    #[test]
    fn test_picker_keys() {
        let mut app = PickerApp::new("Test".to_string());
        assert_eq!(app.handle_key(KeyCode::Down, KeyModifiers::NONE), PickerAction::Continue);
        assert_eq!(app.handle_key(KeyCode::Enter, KeyModifiers::NONE), PickerAction::Confirm);
        assert_eq!(app.selected(), Some(TemplateKind::Revise));

        assert_eq!(app.handle_key(KeyCode::Char('4'), KeyModifiers::NONE), PickerAction::Confirm);
        assert_eq!(app.selected(), Some(TemplateKind::Ask));

        assert_eq!(app.handle_key(KeyCode::Char('9'), KeyModifiers::NONE), PickerAction::Continue);
        assert_eq!(
            app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            PickerAction::Cancel
        );
        assert_eq!(app.handle_key(KeyCode::Esc, KeyModifiers::NONE), PickerAction::Cancel);
    }

    #[test]
    fn test_terminal_guard_restores_on_early_error() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static RESTORED: AtomicUsize = AtomicUsize::new(0);

        fn count_restore() {
            RESTORED.fetch_add(1, Ordering::SeqCst);
        }

        fn failing_setup() -> io::Result<()> {
            let _guard = TerminalGuard {
                restore: count_restore,
            };
            let setup: io::Result<()> = Err(io::Error::other("backend unavailable"));
            setup?;
            Ok(())
        }

        assert!(failing_setup().is_err());
        assert_eq!(RESTORED.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_select_by_number_retries() {
        let mut console = ScriptedConsole::new(["7", "x", "3"]);
        let kind = select_template(None, false, &mut console).unwrap();

        assert_eq!(kind, TemplateKind::Error);
        assert!(console.transcript.iter().any(|l| l.starts_with("Invalid number")));
    }

    #[test]
    fn test_select_end_of_input_cancels() {
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        let err = select_template(None, false, &mut console).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PromptError>(),
            Some(PromptError::SelectionCancelled)
        ));
    }

    #[test]
    fn test_preselected_template() {
        let mut console = ScriptedConsole::default();
        assert_eq!(
            select_template(Some("review"), true, &mut console).unwrap(),
            TemplateKind::Review
        );
        assert!(select_template(Some("nope"), false, &mut console).is_err());
    }
}
