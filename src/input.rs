//! Key and mouse bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tumbletiles::{BoardLayout, Point};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    /// Discard the group under the cursor.
    Activate,
    /// Feed a column now (rate-limited by the board cooldown).
    Feed,
    /// Toggle the live animator count in the sidebar.
    ShowCount,
    Restart,
    Pause,
    Quit,
    None,
}

/// Map key event to action. Arrows or WASD move the cursor; `k` feeds a column.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod && modifiers != KeyModifiers::CONTROL {
        return Action::None;
    }
    match code {
        KeyCode::Char('c') if modifiers == KeyModifiers::CONTROL => Action::Quit,
        KeyCode::Char('q') | KeyCode::Esc if no_mod => Action::Quit,
        KeyCode::Char('p') if no_mod => Action::Pause,
        KeyCode::Left | KeyCode::Char('a') if no_mod => Action::CursorLeft,
        KeyCode::Right | KeyCode::Char('d') if no_mod => Action::CursorRight,
        KeyCode::Up | KeyCode::Char('w') if no_mod => Action::CursorUp,
        KeyCode::Down | KeyCode::Char('s') if no_mod => Action::CursorDown,
        KeyCode::Enter | KeyCode::Char(' ') if no_mod => Action::Activate,
        KeyCode::Char('k') if no_mod => Action::Feed,
        KeyCode::Char('c') if no_mod => Action::ShowCount,
        KeyCode::Char('r' | 'R') if no_mod => Action::Restart,
        _ => Action::None,
    }
}

/// Cell under a left-button release, translated through the board's on-screen rect.
pub fn mouse_to_cell(
    mouse: MouseEvent,
    board_rect: Rect,
    layout: &BoardLayout,
    width: usize,
    height: usize,
) -> Option<(usize, usize)> {
    if mouse.kind != MouseEventKind::Up(MouseButton::Left) {
        return None;
    }
    if mouse.column < board_rect.x || mouse.row < board_rect.y {
        return None;
    }
    let point = Point::new(
        f32::from(mouse.column - board_rect.x),
        f32::from(mouse.row - board_rect.y),
    );
    layout.cell_at(point, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::TERMINAL_LAYOUT;

    fn release_at(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn feed_and_count_keys() {
        let key = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        assert_eq!(key_to_action(key('k')), Action::Feed);
        assert_eq!(key_to_action(key('c')), Action::ShowCount);
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(key_to_action(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)), Action::Activate);
    }

    #[test]
    fn mouse_release_maps_to_two_char_cells() {
        let rect = Rect::new(10, 5, 28, 8);
        let cell = mouse_to_cell(release_at(15, 7), rect, &TERMINAL_LAYOUT, 14, 8);
        assert_eq!(cell, Some((2, 2)));
        assert_eq!(mouse_to_cell(release_at(9, 7), rect, &TERMINAL_LAYOUT, 14, 8), None);
        assert_eq!(mouse_to_cell(release_at(38, 7), rect, &TERMINAL_LAYOUT, 14, 8), None);
    }

    #[test]
    fn only_left_release_counts() {
        let mut event = release_at(12, 6);
        event.kind = MouseEventKind::Down(MouseButton::Left);
        assert_eq!(
            mouse_to_cell(event, Rect::new(10, 5, 28, 8), &TERMINAL_LAYOUT, 14, 8),
            None
        );
    }
}
