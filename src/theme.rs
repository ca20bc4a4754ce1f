//! Light and dark palettes for the TUI, with the choice remembered under the
//! dark-mode key.

use ratatui::style::Color;
use tracing::warn;

use crate::storage::{KeyValueStore, DARK_MODE_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Colors the UI pulls from the active theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub highlight: Color,
}

impl Theme {
    /// Dark only when the stored flag is exactly `"true"`. Read failures fall
    /// back to light.
    pub fn load(storage: &dyn KeyValueStore) -> Self {
        match storage.get(DARK_MODE_KEY) {
            Ok(Some(flag)) if flag == "true" => Theme::Dark,
            Ok(_) => Theme::Light,
            Err(err) => {
                warn!(error = %err, "could not read theme preference");
                Theme::Light
            }
        }
    }

    pub fn save(self, storage: &dyn KeyValueStore) {
        let flag = if self.is_dark() { "true" } else { "false" };
        if let Err(err) = storage.set(DARK_MODE_KEY, flag) {
            warn!(error = %err, "could not store theme preference");
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    /// Indicator shown in the footer, the sun/moon pair from the toggle.
    pub fn toggle_icon(self) -> &'static str {
        match self {
            Theme::Light => "🌙",
            Theme::Dark => "☀️",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                background: Color::Reset,
                text: Color::Reset,
                muted: Color::DarkGray,
                accent: Color::Blue,
                highlight: Color::Yellow,
            },
            Theme::Dark => Palette {
                background: Color::Black,
                text: Color::Gray,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                highlight: Color::LightYellow,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn only_literal_true_enables_dark_mode() {
        assert_eq!(Theme::load(&MemoryStore::new()), Theme::Light);
        let stored = MemoryStore::new().with_entry(DARK_MODE_KEY, "true");
        assert_eq!(Theme::load(&stored), Theme::Dark);
        let stored = MemoryStore::new().with_entry(DARK_MODE_KEY, "TRUE");
        assert_eq!(Theme::load(&stored), Theme::Light);
        assert_eq!(Theme::load(&MemoryStore::unavailable()), Theme::Light);
    }

    #[test]
    fn toggle_round_trips_through_storage() {
        let storage = MemoryStore::new();
        let theme = Theme::Light.toggled();
        theme.save(&storage);
        assert_eq!(storage.get(DARK_MODE_KEY).unwrap().as_deref(), Some("true"));
        assert_eq!(Theme::load(&storage), Theme::Dark);

        theme.toggled().save(&storage);
        assert_eq!(Theme::load(&storage), Theme::Light);
    }
}
