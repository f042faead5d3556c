pub mod controller;

pub use controller::{Controller, Key, TransportSnapshot};

/// Map a line of terminal input to a transport key. Arrow keys are spelled
/// out because stdin delivers lines, not key events.
pub fn parse_key(input: &str) -> Option<Key> {
    match input.trim() {
        "" | "space" => Some(Key::Space),
        "left" => Some(Key::Left),
        "right" => Some(Key::Right),
        s => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Key::Char(c)),
                _ => None,
            }
        }
    }
}
