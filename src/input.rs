//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  Adding a new keybinding is
//! a single match arm in [`handle_key_event`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::App;

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::PageDown | KeyCode::Char('n') => app.next_page(),
        KeyCode::PageUp | KeyCode::Char('p') => app.previous_page(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{make_item, ListFeed};
    use crossterm::event::{KeyEventState, KeyModifiers};
    use std::sync::{Arc, Mutex};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        let items = (1..=15).map(|id| make_item(id, "t")).collect();
        let mut app = App::new(Arc::new(ListFeed(Mutex::new(items))), "t", 10);
        app.refresh();
        app
    }

    #[test]
    fn q_and_esc_quit() {
        let mut a = app();
        handle_key_event(&mut a, press(KeyCode::Char('q')));
        assert!(a.quit);

        let mut b = app();
        handle_key_event(&mut b, press(KeyCode::Esc));
        assert!(b.quit);
    }

    #[test]
    fn vim_keys_scroll() {
        let mut a = app();
        handle_key_event(&mut a, press(KeyCode::Char('j')));
        handle_key_event(&mut a, press(KeyCode::Char('j')));
        assert_eq!(a.list_state.selected(), Some(1));
        handle_key_event(&mut a, press(KeyCode::Char('k')));
        assert_eq!(a.list_state.selected(), Some(0));
        handle_key_event(&mut a, press(KeyCode::Char('G')));
        assert_eq!(a.list_state.selected(), Some(9));
    }

    #[test]
    fn n_and_p_page() {
        let mut a = app();
        handle_key_event(&mut a, press(KeyCode::Char('n')));
        assert_eq!(a.offset, 10);
        handle_key_event(&mut a, press(KeyCode::PageUp));
        assert_eq!(a.offset, 0);
    }

    #[test]
    fn releases_are_ignored() {
        let mut a = app();
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_key_event(&mut a, release);
        assert!(!a.quit);
    }
}
