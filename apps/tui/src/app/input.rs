use crate::app::state::{App, UserAction};
use crossterm::event::KeyCode;

/// Key bindings shown in the help popup and the shortcut bar.
pub const KEY_BINDINGS: &[(&str, &str)] = &[
    ("r", "Refresh prediction for the current location"),
    ("m", "Enter sensor readings manually"),
    ("Tab / ↑ ↓", "Move between form fields"),
    ("Enter", "Submit the form"),
    ("Del", "Clear all form fields"),
    ("Esc", "Close popup, or quit"),
    ("F1", "Toggle this help"),
    ("q", "Quit"),
];

pub fn handle_input(app: &mut App, key: KeyCode) -> Option<UserAction> {
    if handle_help_toggle(app, key) {
        return None;
    }

    if app.form.open {
        return handle_form_input(app, key);
    }

    handle_main_input(app, key)
}

fn handle_help_toggle(app: &mut App, key: KeyCode) -> bool {
    if key == KeyCode::F(1) {
        app.show_help = !app.show_help;
        return true;
    }

    if app.show_help {
        if key == KeyCode::Esc {
            app.show_help = false;
        }
        return true;
    }

    false
}

fn handle_main_input(app: &mut App, key: KeyCode) -> Option<UserAction> {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.running = false;
            None
        }
        KeyCode::Char('r') => Some(UserAction::Refresh),
        KeyCode::Char('m') => {
            app.form.open = true;
            None
        }
        _ => None,
    }
}

fn handle_form_input(app: &mut App, key: KeyCode) -> Option<UserAction> {
    match key {
        KeyCode::Esc => {
            app.form.open = false;
        }
        KeyCode::Enter => {
            app.form.open = false;
            return Some(UserAction::Submit(app.form.overrides()));
        }
        KeyCode::Tab | KeyCode::Down => app.form.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.form.prev_field(),
        KeyCode::Backspace => app.form.pop_char(),
        KeyCode::Delete => app.form.clear(),
        KeyCode::Char(ch) => app.form.push_char(ch),
        _ => {}
    }
    None
}
