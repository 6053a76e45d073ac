//! Synthetic HID input.
//!
//! [`InputSynthesizer`] posts raw pointer and key events; [`InputDriver`]
//! builds clicks, key presses and typing out of them and waits a settle delay
//! after each one so the target app can react before the next event.

use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::types::Point;
use crate::error::{HarnessError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Move,
    Down,
    Up,
}

/// Mouse button types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
}

impl MouseButton {
    fn to_enigo(self) -> Button {
        match self {
            MouseButton::Left => Button::Left,
            MouseButton::Right => Button::Right,
        }
    }
}

/// Modifier keys held for the duration of a key event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub cmd: bool,
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        cmd: false,
        shift: false,
        alt: false,
        ctrl: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn cmd() -> Self {
        Self {
            cmd: true,
            ..Self::NONE
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    fn keys(&self) -> Vec<Key> {
        let mut keys = Vec::new();
        if self.cmd {
            keys.push(Key::Meta);
        }
        if self.shift {
            keys.push(Key::Shift);
        }
        if self.alt {
            keys.push(Key::Alt);
        }
        if self.ctrl {
            keys.push(Key::Control);
        }
        keys
    }

    /// Human-readable prefix like `Cmd+Shift+`
    pub fn label(&self) -> String {
        let names: Vec<&str> = [
            (self.cmd, "Cmd"),
            (self.shift, "Shift"),
            (self.alt, "Alt"),
            (self.ctrl, "Ctrl"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();
        if names.is_empty() {
            String::new()
        } else {
            format!("{}+", names.join("+"))
        }
    }
}

/// Raw event sink
pub trait InputSynthesizer {
    fn post_pointer(&self, kind: PointerKind, at: Point, button: MouseButton) -> Result<()>;

    /// `keycode` is a macOS virtual key code
    fn post_key(&self, keycode: u16, down: bool, modifiers: Modifiers) -> Result<()>;
}

/// Enigo-backed synthesizer posting through the system HID event tap
pub struct EnigoSynthesizer {
    enigo: Mutex<Enigo>,
}

impl EnigoSynthesizer {
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| anyhow::anyhow!("Failed to create input controller: {:?}", e))?;
        Ok(Self {
            enigo: Mutex::new(enigo),
        })
    }

    fn with_enigo<T>(&self, f: impl FnOnce(&mut Enigo) -> Result<T>) -> Result<T> {
        let mut enigo = self
            .enigo
            .lock()
            .map_err(|_| anyhow::anyhow!("input controller lock poisoned"))?;
        f(&mut enigo)
    }
}

impl InputSynthesizer for EnigoSynthesizer {
    fn post_pointer(&self, kind: PointerKind, at: Point, button: MouseButton) -> Result<()> {
        self.with_enigo(|enigo| {
            enigo
                .move_mouse(at.x.round() as i32, at.y.round() as i32, Coordinate::Abs)
                .map_err(|e| anyhow::anyhow!("Failed to move mouse: {:?}", e))?;
            let direction = match kind {
                PointerKind::Move => return Ok(()),
                PointerKind::Down => Direction::Press,
                PointerKind::Up => Direction::Release,
            };
            enigo
                .button(button.to_enigo(), direction)
                .map_err(|e| anyhow::anyhow!("Failed to post mouse button: {:?}", e))?;
            Ok(())
        })
    }

    fn post_key(&self, keycode: u16, down: bool, modifiers: Modifiers) -> Result<()> {
        self.with_enigo(|enigo| {
            let mods = modifiers.keys();
            let mut send = |key: Key, direction: Direction| {
                enigo
                    .key(key, direction)
                    .map_err(|e| anyhow::anyhow!("Failed to post key: {:?}", e))
            };
            if down {
                for m in &mods {
                    send(*m, Direction::Press)?;
                }
                send(Key::Other(u32::from(keycode)), Direction::Press)?;
            } else {
                send(Key::Other(u32::from(keycode)), Direction::Release)?;
                for m in mods.iter().rev() {
                    send(*m, Direction::Release)?;
                }
            }
            Ok(())
        })
    }
}

/// US-layout macOS virtual key code for a key name (case-insensitive)
pub fn key_code(name: &str) -> Option<u16> {
    let code = match name.to_lowercase().as_str() {
        "a" => 0,
        "b" => 11,
        "c" => 8,
        "d" => 2,
        "e" => 14,
        "f" => 3,
        "g" => 5,
        "h" => 4,
        "i" => 34,
        "j" => 38,
        "k" => 40,
        "l" => 37,
        "m" => 46,
        "n" => 45,
        "o" => 31,
        "p" => 35,
        "q" => 12,
        "r" => 15,
        "s" => 1,
        "t" => 17,
        "u" => 32,
        "v" => 9,
        "w" => 13,
        "x" => 7,
        "y" => 16,
        "z" => 6,
        "0" => 29,
        "1" => 18,
        "2" => 19,
        "3" => 20,
        "4" => 21,
        "5" => 23,
        "6" => 22,
        "7" => 26,
        "8" => 28,
        "9" => 25,
        "return" | "enter" => 36,
        "tab" => 48,
        "space" => 49,
        "escape" => 53,
        "delete" | "backspace" => 51,
        "up" => 126,
        "down" => 125,
        "left" => 123,
        "right" => 124,
        "comma" => 43,
        "period" => 47,
        "slash" => 44,
        "semicolon" => 41,
        "minus" => 27,
        "equal" => 24,
        "bracket_left" => 33,
        "bracket_right" => 30,
        "f1" => 122,
        "f2" => 120,
        "f3" => 99,
        "f4" => 118,
        "f5" => 96,
        "f6" => 97,
        "f7" => 98,
        "f8" => 100,
        "f9" => 101,
        "f10" => 109,
        "f11" => 103,
        "f12" => 111,
        _ => return None,
    };
    Some(code)
}

/// Key name and shift state that produce `ch` on a US layout
pub fn char_key(ch: char) -> Option<(&'static str, bool)> {
    let shifted = match ch {
        '!' => Some("1"),
        '@' => Some("2"),
        '#' => Some("3"),
        '$' => Some("4"),
        '%' => Some("5"),
        '^' => Some("6"),
        '&' => Some("7"),
        '*' => Some("8"),
        '(' => Some("9"),
        ')' => Some("0"),
        '_' => Some("minus"),
        '+' => Some("equal"),
        '{' => Some("bracket_left"),
        '}' => Some("bracket_right"),
        ':' => Some("semicolon"),
        '<' => Some("comma"),
        '>' => Some("period"),
        '?' => Some("slash"),
        _ => None,
    };
    if let Some(name) = shifted {
        return Some((name, true));
    }

    let plain = match ch {
        ' ' => "space",
        '\n' => "return",
        '\t' => "tab",
        ',' => "comma",
        '.' => "period",
        '/' => "slash",
        ';' => "semicolon",
        '-' => "minus",
        '=' => "equal",
        '[' => "bracket_left",
        ']' => "bracket_right",
        _ if ch.is_ascii_alphanumeric() => {
            const NAMES: &str = "abcdefghijklmnopqrstuvwxyz0123456789";
            let lower = ch.to_ascii_lowercase();
            let index = NAMES.find(lower)?;
            return Some((&NAMES[index..index + 1], ch.is_ascii_uppercase()));
        }
        _ => return None,
    };
    Some((plain, false))
}

/// Higher-level input built from raw events, with a settle delay after each
pub struct InputDriver {
    synth: Box<dyn InputSynthesizer>,
    settle: Duration,
}

impl InputDriver {
    pub fn new(synth: Box<dyn InputSynthesizer>, settle: Duration) -> Self {
        Self { synth, settle }
    }

    fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    pub fn move_mouse(&self, at: Point) -> Result<()> {
        self.synth.post_pointer(PointerKind::Move, at, MouseButton::Left)?;
        self.pause(self.settle);
        Ok(())
    }

    /// Move to `at`, then one or two down/up pairs
    pub fn click(&self, at: Point, button: MouseButton, double: bool) -> Result<()> {
        debug!("click {:?} at ({:.0}, {:.0}) double={}", button, at.x, at.y, double);
        self.move_mouse(at)?;
        let clicks = if double { 2 } else { 1 };
        for _ in 0..clicks {
            self.synth.post_pointer(PointerKind::Down, at, button)?;
            self.synth.post_pointer(PointerKind::Up, at, button)?;
            self.pause(self.settle);
        }
        Ok(())
    }

    /// Press and release a named key. Unknown names are a configuration error.
    pub fn press_key(&self, name: &str, modifiers: Modifiers) -> Result<()> {
        let code = key_code(name).ok_or_else(|| {
            HarnessError::configuration(format!("unknown key '{name}'"))
        })?;
        debug!("key {}{}", modifiers.label(), name);
        self.synth.post_key(code, true, modifiers)?;
        self.synth.post_key(code, false, modifiers)?;
        self.pause(self.settle);
        Ok(())
    }

    /// Type `text` one character at a time; returns the number typed.
    /// Characters with no US-layout key are skipped.
    pub fn type_text(&self, text: &str, delay: Option<Duration>) -> Result<usize> {
        let delay = delay.unwrap_or(self.settle);
        let mut typed = 0;
        for ch in text.chars() {
            let Some((name, shift)) = char_key(ch) else {
                warn!("skipping unsupported character {:?}", ch);
                continue;
            };
            let Some(code) = key_code(name) else {
                warn!("no key code for {:?} (char {:?})", name, ch);
                continue;
            };
            let modifiers = if shift { Modifiers::shift() } else { Modifiers::NONE };
            self.synth.post_key(code, true, modifiers)?;
            self.synth.post_key(code, false, modifiers)?;
            self.pause(delay);
            typed += 1;
        }
        Ok(typed)
    }
}
