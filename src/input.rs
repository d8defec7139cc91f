use std::{sync::Arc, thread::{self, JoinHandle}, time::Duration};

use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use log::{debug, error, info};

use crate::clock::SessionControl;
use crate::snake::Direction::{self, *};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    DirectionPressed(Direction),
    PauseRequested,
    ResumeRequested,
    QuitRequested,
}

pub fn map_key(key: &KeyEvent, paused: bool) -> Option<InputEvent> {
    if is_ctrl_c(key) {
        return Some(InputEvent::QuitRequested);
    }

    let event = match key.code {
        KeyCode::Char('w') | KeyCode::Up => InputEvent::DirectionPressed(Up),
        KeyCode::Char('a') | KeyCode::Left => InputEvent::DirectionPressed(Left),
        KeyCode::Char('s') | KeyCode::Down => InputEvent::DirectionPressed(Down),
        KeyCode::Char('d') | KeyCode::Right => InputEvent::DirectionPressed(Right),
        KeyCode::Char('p') | KeyCode::Char(' ') if paused => InputEvent::ResumeRequested,
        KeyCode::Char('p') | KeyCode::Char(' ') => InputEvent::PauseRequested,
        KeyCode::Esc => InputEvent::QuitRequested,
        _ => return None,
    };
    Some(event)
}

pub fn apply(control: &SessionControl, event: InputEvent) {
    match event {
        InputEvent::DirectionPressed(dir) => {
            if !control.is_paused() && !control.is_over() {
                control.set_intended_direction(dir); // Ignored while paused or over
            }
        },
        InputEvent::PauseRequested => control.pause(),
        InputEvent::ResumeRequested => control.resume(),
        InputEvent::QuitRequested => control.stop(),
    }
}

pub fn spawn(control: Arc<SessionControl>) -> JoinHandle<crossterm::Result<()>> {
    thread::spawn(move || listen(&control, next_key))
}

fn next_key() -> crossterm::Result<Option<KeyEvent>> {
    if poll(POLL_INTERVAL)? {
        if let Event::Key(key) = read()? {
            return Ok(Some(key));
        }
    }
    Ok(None)
}

// A read failure stops the session as well: nothing else can quit it.
fn listen<F>(control: &SessionControl, mut next_key: F) -> crossterm::Result<()>
where
    F: FnMut() -> crossterm::Result<Option<KeyEvent>>,
{
    while control.is_running() {
        let key = match next_key() {
            Ok(Some(key)) => key,
            Ok(None) => continue,
            Err(e) => {
                error!("Reading input failed, stopping: {}", e);
                control.stop();
                return Err(e);
            },
        };

        if let Some(event) = map_key(&key, control.is_paused()) {
            debug!("Input: {:?}", event);
            apply(control, event);
        }
    }

    info!("Input thread finished");
    Ok(())
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    use crossterm::ErrorKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent { code, modifiers: KeyModifiers::NONE }
    }

    #[test]
    fn keys_map_to_events() {
        assert_eq!(map_key(&key(KeyCode::Up), false), Some(InputEvent::DirectionPressed(Up)));
        assert_eq!(map_key(&key(KeyCode::Char('a')), false), Some(InputEvent::DirectionPressed(Left)));
        assert_eq!(map_key(&key(KeyCode::Char('s')), false), Some(InputEvent::DirectionPressed(Down)));
        assert_eq!(map_key(&key(KeyCode::Right), false), Some(InputEvent::DirectionPressed(Right)));
        assert_eq!(map_key(&key(KeyCode::Esc), false), Some(InputEvent::QuitRequested));
        assert_eq!(map_key(&key(KeyCode::Char('x')), false), None);

        let ctrl_c = KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL };
        assert_eq!(map_key(&ctrl_c, false), Some(InputEvent::QuitRequested));
    }

    #[test]
    fn pause_key_toggles() {
        assert_eq!(map_key(&key(KeyCode::Char('p')), false), Some(InputEvent::PauseRequested));
        assert_eq!(map_key(&key(KeyCode::Char(' ')), true), Some(InputEvent::ResumeRequested));
    }

    #[test]
    fn steering_is_ignored_while_paused_or_over() {
        let control = SessionControl::new(Left);

        apply(&control, InputEvent::PauseRequested);
        apply(&control, InputEvent::DirectionPressed(Up));
        assert_eq!(control.intended_direction(), Left);

        apply(&control, InputEvent::ResumeRequested);
        apply(&control, InputEvent::DirectionPressed(Up));
        assert_eq!(control.intended_direction(), Up);

        control.mark_over();
        apply(&control, InputEvent::DirectionPressed(Down));
        assert_eq!(control.intended_direction(), Up);

        apply(&control, InputEvent::QuitRequested);
        assert!(!control.is_running());
    }

    #[test]
    fn keys_are_applied_until_quit() {
        let control = SessionControl::new(Left);
        let mut keys = vec![key(KeyCode::Esc), key(KeyCode::Char('x')), key(KeyCode::Char('w'))];

        let result = listen(&control, || Ok(keys.pop()));

        assert!(result.is_ok());
        assert_eq!(control.intended_direction(), Up);
        assert!(!control.is_running());
    }

    #[test]
    fn read_failure_stops_the_session() {
        let control = SessionControl::new(Left);
        let mut calls = 0;

        let result = listen(&control, || {
            calls += 1;
            match calls {
                1 => Ok(None),
                2 => Ok(Some(key(KeyCode::Down))),
                _ => Err(ErrorKind::IoError(io::Error::new(io::ErrorKind::Other, "no tty"))),
            }
        });

        assert!(result.is_err());
        assert_eq!(calls, 3);
        assert_eq!(control.intended_direction(), Down);
        assert!(!control.is_running());
    }
}
