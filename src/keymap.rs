//! In-palette keyboard shortcuts
//!
//! Ctrl and Cmd (meta) are interchangeable so the same bindings work on
//! every platform. Keys that are not bound fall through to the input field.
//! Tab actions (pin, mute, close, grouping) are bound in tab mode only.

use serde::{Deserialize, Serialize};

use crate::protocol::PaletteMode;

/// A key press as the host reports it (`KeyboardEvent.key` naming)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInput {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
}

impl KeyInput {
    pub fn plain(key: impl Into<String>) -> Self {
        KeyInput {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn ctrl(key: impl Into<String>) -> Self {
        KeyInput {
            key: key.into(),
            ctrl: true,
            ..Default::default()
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaletteCommand {
    Close,
    SelectNext,
    SelectPrevious,
    Execute,
    TogglePin,
    ToggleMute,
    CloseTab,
    ToggleGrouping,
    SwitchMode(PaletteMode),
}

impl PaletteCommand {
    /// Commands that act on the tab list
    pub fn is_tab_only(&self) -> bool {
        matches!(
            self,
            PaletteCommand::TogglePin
                | PaletteCommand::ToggleMute
                | PaletteCommand::CloseTab
                | PaletteCommand::ToggleGrouping
        )
    }

    /// The command bound to `input` in `mode`, if any.
    pub fn from_key(input: &KeyInput, mode: PaletteMode) -> Option<Self> {
        Self::binding(input)
            .filter(|command| mode == PaletteMode::Tabs || !command.is_tab_only())
    }

    fn binding(input: &KeyInput) -> Option<Self> {
        let key = input.key.as_str();
        if input.alt {
            return None;
        }
        if input.command() {
            // Letters arrive uppercase while shift is held
            let letter = key.to_ascii_lowercase();
            return match (letter.as_str(), input.shift) {
                ("p", true) => Some(PaletteCommand::TogglePin),
                ("p", false) => Some(PaletteCommand::SwitchMode(PaletteMode::Tabs)),
                ("m", false) => Some(PaletteCommand::ToggleMute),
                ("x", false) => Some(PaletteCommand::CloseTab),
                ("g", false) => Some(PaletteCommand::ToggleGrouping),
                ("f", false) => Some(PaletteCommand::SwitchMode(PaletteMode::Content)),
                _ => None,
            };
        }
        match key {
            "Escape" => Some(PaletteCommand::Close),
            "ArrowDown" => Some(PaletteCommand::SelectNext),
            "ArrowUp" => Some(PaletteCommand::SelectPrevious),
            "Enter" => Some(PaletteCommand::Execute),
            "Delete" => Some(PaletteCommand::CloseTab),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_keys() {
        assert_eq!(
            PaletteCommand::from_key(&KeyInput::plain("Escape"), PaletteMode::Tabs),
            Some(PaletteCommand::Close)
        );
        assert_eq!(
            PaletteCommand::from_key(&KeyInput::plain("ArrowDown"), PaletteMode::Tabs),
            Some(PaletteCommand::SelectNext)
        );
        assert_eq!(
            PaletteCommand::from_key(&KeyInput::plain("ArrowUp"), PaletteMode::Tabs),
            Some(PaletteCommand::SelectPrevious)
        );
        assert_eq!(
            PaletteCommand::from_key(&KeyInput::plain("Enter"), PaletteMode::Tabs),
            Some(PaletteCommand::Execute)
        );
        assert_eq!(
            PaletteCommand::from_key(&KeyInput::plain("Delete"), PaletteMode::Tabs),
            Some(PaletteCommand::CloseTab)
        );
        for key in ["a", "p"] {
            assert_eq!(
                PaletteCommand::from_key(&KeyInput::plain(key), PaletteMode::Tabs),
                None
            );
        }
    }

    #[test]
    fn test_command_shortcuts() {
        assert_eq!(
            PaletteCommand::from_key(&KeyInput::ctrl("P").with_shift(), PaletteMode::Tabs),
            Some(PaletteCommand::TogglePin)
        );
        assert_eq!(
            PaletteCommand::from_key(&KeyInput::ctrl("p"), PaletteMode::Tabs),
            Some(PaletteCommand::SwitchMode(PaletteMode::Tabs))
        );
        assert_eq!(
            PaletteCommand::from_key(&KeyInput::ctrl("f"), PaletteMode::Tabs),
            Some(PaletteCommand::SwitchMode(PaletteMode::Content))
        );
        assert_eq!(
            PaletteCommand::from_key(&KeyInput::ctrl("g"), PaletteMode::Tabs),
            Some(PaletteCommand::ToggleGrouping)
        );
        assert_eq!(
            PaletteCommand::from_key(&KeyInput::ctrl("x"), PaletteMode::Tabs),
            Some(PaletteCommand::CloseTab)
        );
        assert_eq!(
            PaletteCommand::from_key(&KeyInput::ctrl("z"), PaletteMode::Tabs),
            None
        );
    }

    #[test]
    fn test_tab_actions_unbound_in_content_mode() {
        for input in [
            KeyInput::plain("Delete"),
            KeyInput::ctrl("x"),
            KeyInput::ctrl("m"),
            KeyInput::ctrl("g"),
            KeyInput::ctrl("P").with_shift(),
        ] {
            assert_eq!(PaletteCommand::from_key(&input, PaletteMode::Content), None);
        }
        assert_eq!(
            PaletteCommand::from_key(&KeyInput::ctrl("p"), PaletteMode::Content),
            Some(PaletteCommand::SwitchMode(PaletteMode::Tabs))
        );
        assert_eq!(
            PaletteCommand::from_key(&KeyInput::plain("Enter"), PaletteMode::Content),
            Some(PaletteCommand::Execute)
        );
    }

    #[test]
    fn test_meta_equals_ctrl() {
        let input = KeyInput {
            key: "m".to_string(),
            meta: true,
            ..Default::default()
        };
        assert_eq!(
            PaletteCommand::from_key(&input, PaletteMode::Tabs),
            Some(PaletteCommand::ToggleMute)
        );
    }

    #[test]
    fn test_alt_is_never_bound() {
        let input = KeyInput {
            key: "Escape".to_string(),
            alt: true,
            ..Default::default()
        };
        assert_eq!(PaletteCommand::from_key(&input, PaletteMode::Tabs), None);
    }

    #[test]
    fn test_key_input_deserializes_with_defaults() {
        let input: KeyInput = serde_json::from_str(r#"{"key":"g","ctrl":true}"#).unwrap();
        assert_eq!(input, KeyInput::ctrl("g"));
    }
}
