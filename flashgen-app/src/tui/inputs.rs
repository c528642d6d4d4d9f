use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Up,
    Down,
    Generate,
    ToggleAccept,
    Edit,
    Remove,
    SaveApproved,
    SaveAll,
    Reset,
    EditText,
    // Text entry
    Char(char),
    Paste(String),
    Backspace,
    NextField,
    Confirm,
    Cancel,
    None,
}

/// Maps a terminal event. While `typing`, printable keys are text, not
/// commands.
pub fn map_event(ev: Event, typing: bool) -> Action {
    match ev {
        Event::Paste(s) if typing => Action::Paste(s),
        Event::Key(KeyEvent { code, modifiers, kind, .. }) if kind != KeyEventKind::Release => {
            if typing {
                return match (code, modifiers) {
                    (KeyCode::Esc, _) => Action::Cancel,
                    (KeyCode::Enter, KeyModifiers::CONTROL) | (KeyCode::Char('s'), KeyModifiers::CONTROL) => Action::Confirm,
                    (KeyCode::Enter, _) => Action::Char('\n'),
                    (KeyCode::Tab, _) => Action::NextField,
                    (KeyCode::Backspace, _) => Action::Backspace,
                    (KeyCode::Char(c), _) => Action::Char(c),
                    _ => Action::None,
                };
            }
            match (code, modifiers) {
                (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => Action::Quit,
                (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Action::Up,
                (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Action::Down,
                (KeyCode::Char('g'), _) => Action::Generate,
                (KeyCode::Char(' '), _) | (KeyCode::Char('a'), _) => Action::ToggleAccept,
                (KeyCode::Char('e'), _) | (KeyCode::Enter, _) => Action::Edit,
                (KeyCode::Char('d'), _) | (KeyCode::Delete, _) => Action::Remove,
                (KeyCode::Char('s'), KeyModifiers::NONE) => Action::SaveApproved,
                (KeyCode::Char('S'), _) => Action::SaveAll,
                (KeyCode::Char('r'), _) => Action::Reset,
                (KeyCode::Char('t'), _) => Action::EditText,
                _ => Action::None,
            }
        }
        _ => Action::None,
    }
}
