//! Key and mouse bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Action from a key press or mouse event. Mouse actions carry the terminal
/// cell under the pointer; the app maps it onto the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Press { column: u16, row: u16 },
    Drag { column: u16, row: u16 },
    Release,
    Restart,
    Quit,
    None,
}

/// Map key event to action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    match code {
        KeyCode::Char('c') if modifiers == KeyModifiers::CONTROL => Action::Quit,
        KeyCode::Char('q') | KeyCode::Esc if no_mod => Action::Quit,
        KeyCode::Char('r') | KeyCode::Char('R') if no_mod => Action::Restart,
        _ => Action::None,
    }
}

/// Map mouse event to action. Only the left button selects.
pub fn mouse_to_action(mouse: MouseEvent) -> Action {
    let MouseEvent {
        kind, column, row, ..
    } = mouse;
    match kind {
        MouseEventKind::Down(MouseButton::Left) => Action::Press { column, row },
        MouseEventKind::Drag(MouseButton::Left) => Action::Drag { column, row },
        MouseEventKind::Up(MouseButton::Left) => Action::Release,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 12,
            row: 4,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_keys() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(key_to_action(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Char('r'))), Action::Restart);
        assert_eq!(key_to_action(key(KeyCode::Char('x'))), Action::None);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn test_left_button_cycle() {
        assert_eq!(
            mouse_to_action(mouse(MouseEventKind::Down(MouseButton::Left))),
            Action::Press { column: 12, row: 4 }
        );
        assert_eq!(
            mouse_to_action(mouse(MouseEventKind::Drag(MouseButton::Left))),
            Action::Drag { column: 12, row: 4 }
        );
        assert_eq!(
            mouse_to_action(mouse(MouseEventKind::Up(MouseButton::Left))),
            Action::Release
        );
    }

    #[test]
    fn test_other_buttons_ignored() {
        assert_eq!(
            mouse_to_action(mouse(MouseEventKind::Down(MouseButton::Right))),
            Action::None
        );
        assert_eq!(mouse_to_action(mouse(MouseEventKind::Moved)), Action::None);
        assert_eq!(
            mouse_to_action(mouse(MouseEventKind::ScrollDown)),
            Action::None
        );
    }
}
