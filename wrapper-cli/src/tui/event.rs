use std::{collections::HashMap, str::FromStr};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::error::Error;

const DEFAULTS: &str = include_str!("../../default_keymap.toml");

#[derive(Debug, Default, Clone, PartialEq)]
pub struct EventProcessor {
    pub input_mode: InputMode,
    pub definitions: EventDefinitions,
}

impl EventProcessor {
    pub fn new(definitions: EventDefinitions) -> Self {
        EventProcessor {
            input_mode: Default::default(),
            definitions,
        }
    }

    pub fn input_mode(&mut self, input_mode: InputMode) {
        self.input_mode = input_mode;
    }

    pub fn process(&self, event: Event) -> Action {
        match event {
            Event::FocusGained
            | Event::FocusLost
            | Event::Mouse(_)
            | Event::Paste(_)
            | Event::Resize(_, _) => Action::Nop,
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                self.process_key_event(key_event)
            }
            Event::Key(_) => Action::Nop,
        }
    }

    pub fn process_key_event(&self, event: KeyEvent) -> Action {
        self.definitions
            .0
            .get(&self.input_mode)
            .and_then(|map| map.0.get(&KeyBinding::from(event)))
            .copied()
            .unwrap_or_else(|| self.unbound(event))
    }

    /// Unbound keys type themselves while editing and do nothing otherwise.
    fn unbound(&self, event: KeyEvent) -> Action {
        let chorded = event
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        match (self.input_mode, event.code) {
            (InputMode::Edit, KeyCode::Tab) => Action::Unhandled('\t'),
            (InputMode::Edit, KeyCode::Char(c)) if !chorded => Action::Unhandled(c),
            _ => Action::Nop,
        }
    }
}

#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    #[default]
    Normal,
    Edit,
}

/// Key bindings per input mode.
/// Modes given in the config replace the defaults binding by binding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "HashMap<InputMode, ActionMap>")]
pub struct EventDefinitions(pub HashMap<InputMode, ActionMap>);

impl Default for EventDefinitions {
    fn default() -> Self {
        let definitions = toml::from_str(DEFAULTS).expect("should be able to load default keymaps");
        EventDefinitions(definitions)
    }
}

impl From<HashMap<InputMode, ActionMap>> for EventDefinitions {
    fn from(overrides: HashMap<InputMode, ActionMap>) -> Self {
        let mut definitions = EventDefinitions::default();
        for (mode, bindings) in overrides {
            definitions.0.entry(mode).or_default().0.extend(bindings.0);
        }
        definitions
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct ActionMap(pub HashMap<KeyBinding, Action>);

/// A key plus the modifiers that change its meaning.
/// Written as `ctrl-s`, `alt-left`, `G`, `esc` and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct KeyBinding {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        KeyBinding {
            code,
            // shift is already part of the char or of BackTab
            modifiers: modifiers & (KeyModifiers::CONTROL | KeyModifiers::ALT),
        }
    }
}

impl From<KeyEvent> for KeyBinding {
    fn from(event: KeyEvent) -> Self {
        KeyBinding::new(event.code, event.modifiers)
    }
}

impl FromStr for KeyBinding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || Error::KeyBinding(s.to_string());

        let (prefix, key) = match s.rsplit_once('-') {
            Some((prefix, key)) if !key.is_empty() => (Some(prefix), key),
            _ => (None, s),
        };

        let mut modifiers = KeyModifiers::NONE;
        for modifier in prefix.into_iter().flat_map(|prefix| prefix.split('-')) {
            modifiers |= match modifier {
                "ctrl" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                _ => return Err(bad()),
            };
        }

        let code = match key {
            "enter" => KeyCode::Enter,
            "esc" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "backspace" => KeyCode::Backspace,
            "delete" => KeyCode::Delete,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return Err(bad()),
                }
            }
        };

        Ok(KeyBinding::new(code, modifiers))
    }
}

impl TryFrom<String> for KeyBinding {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Beginning,
    End,
    Left,
    Right,
    Up,
    Down,
    Edit,
    LeftWord,
    RightWord,
    Enter,
    Escape,
    Backspace,
    Submit,
    Quit,
    #[serde(skip)]
    Unhandled(char),
    Nop,
}
