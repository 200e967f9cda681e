//! Event Handling - Keyboard input processing

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use super::focus::{ScrollEvent, SelectionEvent};
use super::state::{AppState, ScrollPanel};

/// Actions that can be triggered by user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleFocus(ScrollPanel),
    Scroll,
    None,
}

/// Terminal events the UI loop reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermEvent {
    Key(KeyEvent),
    Resize,
}

/// Handle keyboard events
///
/// Only key presses count: repeat and release events are ignored so a held
/// hotkey can't flicker focus on and off.
pub fn handle_key_event(key: KeyEvent, state: &mut AppState) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }

    // Global keybindings
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Char('q')) => return Action::Quit,
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => return Action::Quit,
        _ => {}
    }

    // Panel focus hotkeys
    if let (KeyModifiers::NONE, KeyCode::Char(c)) = (key.modifiers, key.code) {
        if let Some(panel) = ScrollPanel::from_hotkey(c) {
            state.scroll_mut(panel).apply(ScrollEvent::ToggleFocus);
            return Action::ToggleFocus(panel);
        }
    }

    // Scrolling: arrows drive focused panels and the process cursor
    match key.code {
        KeyCode::Up => {
            state.scroll_all(ScrollEvent::ScrollUp(1));
            state.select_process(SelectionEvent::Up);
            Action::Scroll
        }
        KeyCode::Down => {
            state.scroll_all(ScrollEvent::ScrollDown(1));
            state.select_process(SelectionEvent::Down);
            Action::Scroll
        }
        KeyCode::PageUp => {
            state.scroll_all(ScrollEvent::PageUp);
            Action::Scroll
        }
        KeyCode::PageDown => {
            state.scroll_all(ScrollEvent::PageDown);
            Action::Scroll
        }
        KeyCode::Char('g') => {
            state.select_process(SelectionEvent::JumpFirst);
            Action::Scroll
        }
        KeyCode::Char('G') => {
            state.select_process(SelectionEvent::JumpLast);
            Action::Scroll
        }
        _ => Action::None,
    }
}

/// Poll for terminal events with timeout
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<TermEvent>> {
    if event::poll(timeout)? {
        match event::read()? {
            Event::Key(key) => return Ok(Some(TermEvent::Key(key))),
            Event::Resize(_, _) => return Ok(Some(TermEvent::Resize)),
            _ => {}
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::ProcessRow;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn with_processes(n: u32) -> AppState {
        let mut state = AppState::default();
        state.apply(super::super::state::PanelUpdate::Processes(
            (0..n)
                .map(|pid| ProcessRow {
                    pid,
                    name: "p".into(),
                    cpu: 0.0,
                    rss: 0,
                    mem_percent: 0.0,
                })
                .collect(),
        ));
        state
    }

    #[test]
    fn test_quit_action() {
        let mut state = AppState::default();
        assert_eq!(handle_key_event(press(KeyCode::Char('q')), &mut state), Action::Quit);
    }

    #[test]
    fn test_ctrl_c_quit() {
        let mut state = AppState::default();
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(key, &mut state), Action::Quit);
    }

    #[test]
    fn test_hotkey_toggles_focus() {
        let mut state = AppState::default();
        let action = handle_key_event(press(KeyCode::Char('d')), &mut state);
        assert_eq!(action, Action::ToggleFocus(ScrollPanel::Docker));
        assert!(state.docker_scroll.is_focused());
        assert!(!state.projects_scroll.is_focused());

        handle_key_event(press(KeyCode::Char('d')), &mut state);
        assert!(!state.docker_scroll.is_focused());
    }

    #[test]
    fn test_release_and_repeat_are_ignored() {
        let mut state = AppState::default();
        for kind in [KeyEventKind::Release, KeyEventKind::Repeat] {
            let key = KeyEvent {
                code: KeyCode::Char('r'),
                modifiers: KeyModifiers::NONE,
                kind,
                state: KeyEventState::NONE,
            };
            assert_eq!(handle_key_event(key, &mut state), Action::None);
        }
        assert!(!state.projects_scroll.is_focused());
    }

    #[test]
    fn test_arrows_move_process_selection_without_focus() {
        let mut state = with_processes(5);
        handle_key_event(press(KeyCode::Down), &mut state);
        handle_key_event(press(KeyCode::Down), &mut state);
        assert_eq!(state.process_selection.selected_index(), 2);
        handle_key_event(press(KeyCode::Up), &mut state);
        assert_eq!(state.process_selection.selected_index(), 1);
    }

    #[test]
    fn test_jump_keys() {
        let mut state = with_processes(20);
        let shift_g = KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT);
        handle_key_event(shift_g, &mut state);
        assert_eq!(state.process_selection.selected_index(), 19);
        handle_key_event(press(KeyCode::Char('g')), &mut state);
        assert_eq!(state.process_selection.selected_index(), 0);
    }

    #[test]
    fn test_page_down_needs_focus() {
        let mut state = AppState::default();
        state.ports = Some(
            (0..10)
                .map(|i| crate::sources::PortStatus {
                    name: format!("svc{}", i),
                    port: 8000 + i,
                    open: false,
                })
                .collect(),
        );
        state.remeasure(ScrollPanel::Ports, 4);

        handle_key_event(press(KeyCode::PageDown), &mut state);
        assert_eq!(state.ports_scroll.scroll_offset(), 0);

        handle_key_event(press(KeyCode::Char('p')), &mut state);
        handle_key_event(press(KeyCode::PageDown), &mut state);
        assert_eq!(state.ports_scroll.scroll_offset(), 4);
    }
}
