//! Keyboard bindings
//!
//! The table is the single place where keys are tied to machine actions.

use crate::firmware::grbl::{commands, Axis};
use jogkit_core::{Command, InputKey};
use jogkit_settings::MachineSettings;
use std::fmt;

/// Operator action bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Relative jog of one step; `direction` is `1` or `-1`
    Jog { axis: Axis, direction: i8 },
    Home,
    ResetAlarm,
    MoveToCenter,
    StatusQuery,
    Quit,
}

/// Key to action table. Letter keys are matched lower-case.
pub static KEY_BINDINGS: &[(InputKey, Action)] = &[
    (InputKey::Left, Action::Jog { axis: Axis::X, direction: -1 }),
    (InputKey::Right, Action::Jog { axis: Axis::X, direction: 1 }),
    (InputKey::Up, Action::Jog { axis: Axis::Y, direction: 1 }),
    (InputKey::Down, Action::Jog { axis: Axis::Y, direction: -1 }),
    (InputKey::Char('h'), Action::Home),
    (InputKey::Char('x'), Action::ResetAlarm),
    (InputKey::Char('c'), Action::MoveToCenter),
    (InputKey::Char('s'), Action::StatusQuery),
    (InputKey::Char('q'), Action::Quit),
    (InputKey::Escape, Action::Quit),
];

/// Look up the action bound to `key`
pub fn action_for(key: InputKey) -> Option<Action> {
    let key = key.normalized();
    KEY_BINDINGS
        .iter()
        .find(|(bound, _)| *bound == key)
        .map(|(_, action)| *action)
}

impl Action {
    /// The command this action sends, or `None` for [`Action::Quit`]
    pub fn command(&self, machine: &MachineSettings) -> Option<Command> {
        match *self {
            Action::Jog { axis, direction } => Some(commands::jog(
                axis,
                i64::from(direction) * i64::from(machine.jog_step),
                machine.jog_speed,
            )),
            Action::Home => Some(commands::home()),
            Action::ResetAlarm => Some(commands::reset_alarms()),
            Action::MoveToCenter => {
                let (x, y) = machine.work_area_center();
                Some(commands::move_to(x, y, machine.rapid_speed))
            }
            Action::StatusQuery => Some(commands::status_query()),
            Action::Quit => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Jog { axis, direction } if *direction < 0 => write!(f, "jog {}-", axis),
            Action::Jog { axis, .. } => write!(f, "jog {}+", axis),
            Action::Home => write!(f, "home"),
            Action::ResetAlarm => write!(f, "reset alarm"),
            Action::MoveToCenter => write!(f, "move to center"),
            Action::StatusQuery => write!(f, "status query"),
            Action::Quit => write!(f, "quit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jogkit_core::Payload;

    #[test]
    fn test_arrow_keys_jog() {
        let machine = MachineSettings::default();
        let line = |key| match action_for(key).and_then(|a| a.command(&machine)) {
            Some(cmd) => cmd.payload().clone(),
            None => panic!("no command for {key}"),
        };

        assert_eq!(line(InputKey::Left), Payload::Line("G91 G0 X-10 F10000".into()));
        assert_eq!(line(InputKey::Right), Payload::Line("G91 G0 X10 F10000".into()));
        assert_eq!(line(InputKey::Up), Payload::Line("G91 G0 Y10 F10000".into()));
        assert_eq!(line(InputKey::Down), Payload::Line("G91 G0 Y-10 F10000".into()));
    }

    #[test]
    fn test_letters_are_case_insensitive() {
        assert_eq!(action_for(InputKey::Char('H')), Some(Action::Home));
        assert_eq!(action_for(InputKey::Char('x')), Some(Action::ResetAlarm));
        assert_eq!(action_for(InputKey::Char('Q')), Some(Action::Quit));
        assert_eq!(action_for(InputKey::Escape), Some(Action::Quit));
        assert_eq!(action_for(InputKey::Char('z')), None);
        assert_eq!(action_for(InputKey::Enter), None);
    }

    #[test]
    fn test_center_uses_integer_halves() {
        let machine = MachineSettings {
            work_area_x: 791,
            work_area_y: 261,
            ..MachineSettings::default()
        };
        let cmd = Action::MoveToCenter.command(&machine).unwrap();
        assert_eq!(cmd.to_bytes(), b"$J=G90 G21 X395 Y130 F20000\n".to_vec());
    }

    #[test]
    fn test_jog_step_is_configurable() {
        let machine = MachineSettings {
            jog_step: 1,
            jog_speed: 500,
            ..MachineSettings::default()
        };
        let cmd = Action::Jog { axis: Axis::Y, direction: -1 }
            .command(&machine)
            .unwrap();
        assert_eq!(cmd.to_bytes(), b"G91 G0 Y-1 F500\n".to_vec());
        assert!(Action::Quit.command(&machine).is_none());
    }

    #[test]
    fn test_table_has_no_duplicate_keys() {
        for (i, (key, _)) in KEY_BINDINGS.iter().enumerate() {
            assert!(KEY_BINDINGS[i + 1..].iter().all(|(other, _)| other != key));
        }
    }
}
