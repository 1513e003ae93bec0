use crossterm::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Quit,
    Refresh,
    StartEarlier,
    StartLater,
    EndEarlier,
    EndLater,
    ResetRange,
}

pub fn parse_main_command(key_code: &KeyCode) -> Option<UiCommand> {
    match key_code {
        KeyCode::Esc => Some(UiCommand::Quit),
        KeyCode::Left => Some(UiCommand::StartEarlier),
        KeyCode::Right => Some(UiCommand::StartLater),
        KeyCode::Down => Some(UiCommand::EndEarlier),
        KeyCode::Up => Some(UiCommand::EndLater),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'q' => Some(UiCommand::Quit),
            'r' => Some(UiCommand::Refresh),
            'h' => Some(UiCommand::StartEarlier),
            'l' => Some(UiCommand::StartLater),
            'j' => Some(UiCommand::EndEarlier),
            'k' => Some(UiCommand::EndLater),
            'a' | '0' => Some(UiCommand::ResetRange),
            _ => None,
        },
        _ => None,
    }
}
