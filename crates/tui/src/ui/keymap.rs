use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which surface currently owns the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    Dashboard,
    List,
    Report,
    TextInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    Cancel,
    Submit,
    Backspace,
    Up,
    Down,
    PrevMonth,
    NextMonth,
    AddExpense,
    AddIncome,
    AddRecurring,
    OpenExpenses,
    OpenIncomes,
    OpenReport,
    Delete,
    Input(char),
    None,
}

pub fn map_key(key: KeyEvent, context: KeyContext) -> AppAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char('c') = key.code {
            return AppAction::Quit;
        }
        return AppAction::None;
    }

    match context {
        KeyContext::TextInput => match key.code {
            KeyCode::Esc => AppAction::Cancel,
            KeyCode::Enter => AppAction::Submit,
            KeyCode::Backspace => AppAction::Backspace,
            KeyCode::Char(ch) => AppAction::Input(ch),
            _ => AppAction::None,
        },
        KeyContext::List => match key.code {
            KeyCode::Char('q') => AppAction::Quit,
            KeyCode::Esc | KeyCode::Char('x') => AppAction::Cancel,
            KeyCode::Up | KeyCode::Char('k') => AppAction::Up,
            KeyCode::Down | KeyCode::Char('j') => AppAction::Down,
            KeyCode::Delete | KeyCode::Char('d') => AppAction::Delete,
            _ => AppAction::None,
        },
        KeyContext::Report => match key.code {
            KeyCode::Char('q') => AppAction::Quit,
            KeyCode::Esc | KeyCode::Char('x') | KeyCode::Char('p') => AppAction::Cancel,
            _ => AppAction::None,
        },
        KeyContext::Dashboard => match key.code {
            KeyCode::Char('q') => AppAction::Quit,
            KeyCode::Char('[') => AppAction::PrevMonth,
            KeyCode::Char(']') => AppAction::NextMonth,
            KeyCode::Char('a') => AppAction::AddExpense,
            KeyCode::Char('n') => AppAction::AddIncome,
            KeyCode::Char('r') => AppAction::AddRecurring,
            KeyCode::Char('e') => AppAction::OpenExpenses,
            KeyCode::Char('i') => AppAction::OpenIncomes,
            KeyCode::Char('p') => AppAction::OpenReport,
            _ => AppAction::None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn list_keys() {
        assert_eq!(map_key(key(KeyCode::Char('j')), KeyContext::List), AppAction::Down);
        assert_eq!(map_key(key(KeyCode::Up), KeyContext::List), AppAction::Up);
        assert_eq!(map_key(key(KeyCode::Delete), KeyContext::List), AppAction::Delete);
        assert_eq!(map_key(key(KeyCode::Char('x')), KeyContext::List), AppAction::Cancel);
    }

    #[test]
    fn text_input_swallows_shortcuts() {
        assert_eq!(
            map_key(key(KeyCode::Char('q')), KeyContext::TextInput),
            AppAction::Input('q')
        );
        assert_eq!(
            map_key(key(KeyCode::Char('d')), KeyContext::TextInput),
            AppAction::Input('d')
        );
    }

    #[test]
    fn ctrl_c_always_quits() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for context in [
            KeyContext::Dashboard,
            KeyContext::List,
            KeyContext::Report,
            KeyContext::TextInput,
        ] {
            assert_eq!(map_key(ctrl_c, context), AppAction::Quit);
        }
    }

    #[test]
    fn dashboard_month_navigation() {
        assert_eq!(
            map_key(key(KeyCode::Char('[')), KeyContext::Dashboard),
            AppAction::PrevMonth
        );
        assert_eq!(
            map_key(key(KeyCode::Char(']')), KeyContext::Dashboard),
            AppAction::NextMonth
        );
    }

    #[test]
    fn report_toggles_from_the_dashboard() {
        assert_eq!(
            map_key(key(KeyCode::Char('p')), KeyContext::Dashboard),
            AppAction::OpenReport
        );
        assert_eq!(map_key(key(KeyCode::Char('p')), KeyContext::Report), AppAction::Cancel);
        assert_eq!(map_key(key(KeyCode::Char('d')), KeyContext::Report), AppAction::None);
    }
}
