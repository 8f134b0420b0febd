//! Keyboard Dispatch
//!
//! Each composite widget declares a `key -> action` table evaluated at its
//! root. Keys with an entry are consumed (default prevented, propagation
//! stopped); everything else passes through untouched.

use trellis_dom::{KeyboardInput, UiEvent};

/// Navigation-relevant keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Space,
    Escape,
    Tab,
    Backspace,
    /// Single printable character (typeahead)
    Char(char),
}

impl Key {
    /// Parse a DOM `key` value
    pub fn parse(key: &str) -> Option<Self> {
        Some(match key {
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Enter" => Self::Enter,
            " " | "Spacebar" => Self::Space,
            "Escape" | "Esc" => Self::Escape,
            "Tab" => Self::Tab,
            "Backspace" => Self::Backspace,
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if !c.is_control() => Self::Char(c),
                    _ => return None,
                }
            }
        })
    }

    /// Enter and Space act as a click on button-like elements
    pub fn is_activation(&self) -> bool {
        matches!(self, Self::Enter | Self::Space)
    }
}

/// Key with the shift state that selects an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Binding {
    key: Key,
    shift: bool,
}

/// Per-widget key table
#[derive(Debug, Clone)]
pub struct KeyDispatch<A> {
    entries: Vec<(Binding, A)>,
    /// Printable characters map to this action when set
    typeahead: Option<A>,
}

impl<A> Default for KeyDispatch<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            typeahead: None,
        }
    }
}

impl<A: Copy> KeyDispatch<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key (without shift)
    pub fn on(mut self, key: Key, action: A) -> Self {
        self.entries.push((Binding { key, shift: false }, action));
        self
    }

    /// Bind a key with shift held
    pub fn on_shift(mut self, key: Key, action: A) -> Self {
        self.entries.push((Binding { key, shift: true }, action));
        self
    }

    /// Route printable characters to `action`
    pub fn typeahead(mut self, action: A) -> Self {
        self.typeahead = Some(action);
        self
    }

    /// Look up the action for an input without touching any event
    pub fn resolve(&self, input: &KeyboardInput) -> Option<A> {
        if input.has_command_modifier() {
            return None;
        }
        let key = Key::parse(&input.key)?;
        let binding = Binding {
            key,
            shift: input.shift,
        };
        if let Some((_, action)) = self.entries.iter().find(|(b, _)| *b == binding) {
            return Some(*action);
        }
        match key {
            Key::Char(c) if !c.is_whitespace() => self.typeahead,
            _ => None,
        }
    }

    /// Resolve a keydown and consume it when an action exists
    pub fn dispatch(&self, event: &mut UiEvent) -> Option<A> {
        let action = self.resolve(event.key()?)?;
        event.consume();
        Some(action)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
