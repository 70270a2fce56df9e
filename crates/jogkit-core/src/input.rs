//! Discrete input events delivered by an input source

use std::fmt;

/// A key press, independent of the terminal library that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKey {
    Left,
    Right,
    Up,
    Down,
    /// A printable character, as typed
    Char(char),
    Enter,
    Escape,
    /// Any key without a dedicated variant
    Other,
}

impl InputKey {
    /// Fold letters to lower case so bindings match regardless of shift state
    pub fn normalized(self) -> Self {
        match self {
            InputKey::Char(c) => InputKey::Char(c.to_ascii_lowercase()),
            other => other,
        }
    }
}

impl fmt::Display for InputKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKey::Left => write!(f, "Left"),
            InputKey::Right => write!(f, "Right"),
            InputKey::Up => write!(f, "Up"),
            InputKey::Down => write!(f, "Down"),
            InputKey::Char(c) => write!(f, "'{}'", c),
            InputKey::Enter => write!(f, "Enter"),
            InputKey::Escape => write!(f, "Escape"),
            InputKey::Other => write!(f, "<other>"),
        }
    }
}
