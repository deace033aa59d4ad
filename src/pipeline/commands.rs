//! User commands
//!
//! Key presses and other UI signals become [`Command`] values on a queue. The
//! loop drains the queue once per cycle, before it reads the settings.

use crossbeam_channel::{Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Analyse for the other colour
    SwitchSide,
    ToggleLegitMode,
    /// Remove the current suggestion
    ClearAnnotations,
}

impl Command {
    /// `v` switches side, `b` toggles legit mode, `c` clears
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'v' => Some(Command::SwitchSide),
            'b' => Some(Command::ToggleLegitMode),
            'c' => Some(Command::ClearAnnotations),
            _ => None,
        }
    }
}

pub type CommandSender = Sender<Command>;
pub type CommandReceiver = Receiver<Command>;

pub fn command_channel() -> (CommandSender, CommandReceiver) {
    crossbeam_channel::unbounded()
}

/// Everything queued right now, oldest first
pub fn drain(receiver: &CommandReceiver) -> Vec<Command> {
    receiver.try_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Command::from_key('v'), Some(Command::SwitchSide));
        assert_eq!(Command::from_key('B'), Some(Command::ToggleLegitMode));
        assert_eq!(Command::from_key('c'), Some(Command::ClearAnnotations));
        assert_eq!(Command::from_key('x'), None);
    }

    #[test]
    fn test_drain_preserves_order_and_empties_queue() {
        let (tx, rx) = command_channel();
        tx.send(Command::SwitchSide).unwrap();
        tx.send(Command::ClearAnnotations).unwrap();
        assert_eq!(drain(&rx), vec![Command::SwitchSide, Command::ClearAnnotations]);
        assert!(drain(&rx).is_empty());
    }
}
