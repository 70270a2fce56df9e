//! Terminal keyboard input
//!
//! Keys are read from the terminal with crossterm in raw mode. Reads never
//! block the runtime: the source checks for a pending event and sleeps
//! briefly when there is none.

use async_trait::async_trait;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use jogkit_communication::{InputSource, RetryPrompt};
use jogkit_core::{ConnectionError, InputKey};
use std::io::{self, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

/// Default pause between checks for a pending terminal event
pub const DEFAULT_KEY_POLL: Duration = Duration::from_millis(20);

static RAW_MODE_ENABLED: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

/// Keeps the terminal in raw mode until dropped, and restores it on panic
pub struct RawModeGuard(());

impl RawModeGuard {
    pub fn enable() -> io::Result<Self> {
        install_terminal_panic_hook();
        enable_raw_mode()?;
        RAW_MODE_ENABLED.store(true, Ordering::SeqCst);
        Ok(Self(()))
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    if RAW_MODE_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = disable_raw_mode();
    }
}

fn install_terminal_panic_hook() {
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal();
            previous(info);
        }));
    });
}

/// Translate a crossterm key event. Releases and repeats are ignored; Ctrl-C
/// is reported as [`InputKey::Escape`] since raw mode swallows the signal.
pub fn map_key_event(event: &KeyEvent) -> Option<InputKey> {
    if event.kind != KeyEventKind::Press {
        return None;
    }

    let key = match event.code {
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => InputKey::Escape,
        KeyCode::Left => InputKey::Left,
        KeyCode::Right => InputKey::Right,
        KeyCode::Up => InputKey::Up,
        KeyCode::Down => InputKey::Down,
        KeyCode::Char(c) => InputKey::Char(c),
        KeyCode::Enter => InputKey::Enter,
        KeyCode::Esc => InputKey::Escape,
        _ => InputKey::Other,
    };
    Some(key)
}

/// Wait for the next key press without blocking the runtime
async fn next_terminal_key(poll_interval: Duration) -> io::Result<InputKey> {
    loop {
        if event::poll(Duration::ZERO)? {
            if let Event::Key(key_event) = event::read()? {
                if let Some(key) = map_key_event(&key_event) {
                    return Ok(key);
                }
            }
        } else {
            tokio::time::sleep(poll_interval).await;
        }
    }
}

/// Key presses from the controlling terminal
#[derive(Debug, Clone, Copy)]
pub struct TerminalKeySource {
    poll_interval: Duration,
}

impl Default for TerminalKeySource {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_KEY_POLL,
        }
    }
}

#[async_trait]
impl InputSource for TerminalKeySource {
    async fn next_key(&mut self) -> Option<InputKey> {
        match next_terminal_key(self.poll_interval).await {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::error!("Failed to read keyboard input: {}", e);
                None
            }
        }
    }

    fn discard_pending(&mut self) {
        let mut discarded = 0;
        while matches!(event::poll(Duration::ZERO), Ok(true)) {
            match event::read() {
                Ok(Event::Key(_)) => discarded += 1,
                Ok(_) => {}
                Err(_) => break,
            }
        }
        if discarded > 0 {
            tracing::debug!("Discarded {} key events typed while busy", discarded);
        }
    }
}

/// Asks "retry? (Y/N)" on the terminal
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompt {
    poll_interval: Duration,
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_KEY_POLL,
        }
    }
}

#[async_trait]
impl RetryPrompt for TerminalPrompt {
    async fn confirm_retry(&mut self, error: &ConnectionError) -> bool {
        let mut stdout = io::stdout();
        let _ = write!(stdout, "Error: {}. Do you want to retry? (Y/N)\r\n", error);
        let _ = stdout.flush();

        match next_terminal_key(self.poll_interval).await {
            Ok(key) => is_yes(key),
            Err(e) => {
                tracing::error!("Failed to read answer: {}", e);
                false
            }
        }
    }
}

/// Only `y`/`Y` confirms
pub fn is_yes(key: InputKey) -> bool {
    key.normalized() == InputKey::Char('y')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_map_arrows_and_letters() {
        assert_eq!(
            map_key_event(&press(KeyCode::Left, KeyModifiers::NONE)),
            Some(InputKey::Left)
        );
        assert_eq!(
            map_key_event(&press(KeyCode::Char('H'), KeyModifiers::SHIFT)),
            Some(InputKey::Char('H'))
        );
        assert_eq!(
            map_key_event(&press(KeyCode::F(1), KeyModifiers::NONE)),
            Some(InputKey::Other)
        );
    }

    #[test]
    fn test_ctrl_c_quits() {
        assert_eq!(
            map_key_event(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(InputKey::Escape)
        );
        assert_eq!(
            map_key_event(&press(KeyCode::Char('c'), KeyModifiers::NONE)),
            Some(InputKey::Char('c'))
        );
    }

    #[test]
    fn test_release_is_ignored() {
        let mut event = press(KeyCode::Up, KeyModifiers::NONE);
        event.kind = KeyEventKind::Release;
        assert_eq!(map_key_event(&event), None);
    }

    #[test]
    fn test_only_y_confirms() {
        assert!(is_yes(InputKey::Char('y')));
        assert!(is_yes(InputKey::Char('Y')));
        assert!(!is_yes(InputKey::Char('n')));
        assert!(!is_yes(InputKey::Enter));
    }
}
