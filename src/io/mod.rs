// Purpose - normalized input events from whatever captures the keyboard

pub mod keymap;

pub use keymap::normalize_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Down,
    Up,
}

/// One key edge, with the key already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub key: String,
    pub edge: Edge,
    /// Auto-repeat key-down generated by holding the key.
    pub repeat: bool,
}

impl InputEvent {
    pub fn down(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            edge: Edge::Down,
            repeat: false,
        }
    }

    pub fn up(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            edge: Edge::Up,
            repeat: false,
        }
    }

    pub fn repeat(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            edge: Edge::Down,
            repeat: true,
        }
    }
}
