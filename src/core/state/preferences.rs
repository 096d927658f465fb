use std::path::PathBuf;

use console::Color;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::error::LauncherResult;
use crate::core::storage;
use crate::core::version::GameVersion;

pub const DEFAULT_THEME: &str = "cyan-violet";
pub const DEFAULT_LANGUAGE: &str = "en";

/// A named pair of accent colours used by the terminal front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub id: &'static str,
    pub label: &'static str,
    /// Name stored in `prefs.json` by earlier launcher releases.
    pub legacy: &'static str,
    pub primary: (u8, u8, u8),
    pub secondary: (u8, u8, u8),
}

impl Theme {
    pub fn primary_color(&self) -> Color {
        Color::Color256(rgb_to_ansi256(self.primary))
    }

    pub fn secondary_color(&self) -> Color {
        Color::Color256(rgb_to_ansi256(self.secondary))
    }
}

#[rustfmt::skip]
pub const THEMES: &[Theme] = &[
    theme("cyan-violet",     "Cyan / Violet",     "Cyan / Viola",      (0, 210, 220),   (130, 80, 255)),
    theme("sky-blue",        "Sky / Blue",        "Azzurro / Blu",     (100, 200, 255), (30, 80, 220)),
    theme("violet-pink",     "Violet / Pink",     "Viola / Rosa",      (140, 80, 255),  (255, 100, 180)),
    theme("blue-violet",     "Blue / Violet",     "Blu / Viola",       (60, 100, 255),  (180, 60, 255)),
    theme("pink-violet",     "Pink / Violet",     "Rosa / Viola",      (255, 120, 200), (130, 60, 255)),
    theme("red",             "Red",               "Rosso",             (220, 50, 50),   (255, 100, 100)),
    theme("green",           "Green",             "Verde",             (40, 200, 80),   (100, 255, 150)),
    theme("yellow",          "Yellow",            "Giallo",            (255, 220, 50),  (255, 180, 80)),
    theme("violet",          "Violet",            "Viola",             (160, 60, 255),  (200, 130, 255)),
    theme("orange",          "Orange",            "Arancione",         (255, 140, 30),  (255, 200, 80)),
    theme("ice-blue",        "Ice Blue",          "Blu Ghiaccio",      (150, 220, 255), (60, 140, 220)),
    theme("red-yellow",      "Red / Yellow",      "Rosso / Giallo",    (220, 40, 40),   (255, 220, 50)),
    theme("green-yellow",    "Green / Yellow",    "Verde / Giallo",    (40, 200, 80),   (255, 220, 50)),
    theme("red-orange",      "Red / Orange",      "Rosso / Arancione", (200, 30, 30),   (255, 160, 40)),
    theme("blue-cyan",       "Blue / Cyan",       "Blu / Cyan",        (30, 80, 220),   (0, 220, 220)),
    theme("pink-orange",     "Pink / Orange",     "Rosa / Arancione",  (255, 100, 180), (255, 160, 50)),
    theme("green-cyan",      "Green / Cyan",      "Verde / Cyan",      (40, 200, 100),  (0, 220, 220)),
    theme("violet-blue",     "Violet / Blue",     "Viola / Blu",       (180, 60, 255),  (60, 100, 255)),
    theme("yellow-green",    "Yellow / Green",    "Giallo / Verde",    (255, 220, 50),  (40, 200, 80)),
    theme("orange-red",      "Orange / Red",      "Arancione / Rosso", (255, 180, 40),  (220, 40, 40)),
    theme("white-grey",      "White / Grey",      "Bianco / Grigio",   (240, 240, 240), (140, 140, 140)),
    theme("neon-green-blue", "Neon Green / Blue", "Neon Verde / Blu",  (0, 255, 120),   (0, 120, 255)),
    theme("neon-pink-cyan",  "Neon Pink / Cyan",  "Neon Rosa / Cyan",  (255, 50, 200),  (0, 255, 220)),
    theme("sunset",          "Sunset",            "Sunset",            (255, 80, 80),   (255, 200, 50)),
    theme("ocean",           "Ocean",             "Ocean",             (0, 100, 200),   (0, 220, 180)),
    theme("forest",          "Forest",            "Forest",            (30, 120, 50),   (100, 220, 80)),
    theme("lava",            "Lava",              "Lava",              (255, 60, 0),    (255, 200, 0)),
    theme("midnight",        "Midnight",          "Midnight",          (40, 0, 120),    (120, 80, 255)),
    theme("cotton-candy",    "Cotton Candy",      "Cotton Candy",      (255, 150, 200), (150, 200, 255)),
    theme("aurora",          "Aurora",            "Aurora",            (0, 255, 150),   (150, 0, 255)),
];

const fn theme(
    id: &'static str,
    label: &'static str,
    legacy: &'static str,
    primary: (u8, u8, u8),
    secondary: (u8, u8, u8),
) -> Theme {
    Theme {
        id,
        label,
        legacy,
        primary,
        secondary,
    }
}

/// `(code, display name)` for every selectable language.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("it", "Italiano"),
    ("es", "Español"),
    ("fr", "Français"),
    ("de", "Deutsch"),
    ("pt", "Português"),
];

pub fn find_theme(id: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|theme| theme.id == id)
}

/// Theme stored under either its id or its older display name.
fn find_stored_theme(stored: &str) -> Option<&'static Theme> {
    find_theme(stored).or_else(|| THEMES.iter().find(|theme| theme.legacy == stored))
}

/// Theme for `id`, or the default theme.
pub fn theme_or_default(id: &str) -> &'static Theme {
    find_theme(id).unwrap_or(&THEMES[0])
}

pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}

/// Nearest xterm-256 palette entry in the 6x6x6 colour cube.
fn rgb_to_ansi256((r, g, b): (u8, u8, u8)) -> u8 {
    let level = |c: u8| -> u8 {
        if c < 48 {
            0
        } else if c < 115 {
            1
        } else {
            (c - 35) / 40
        }
    };
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

/// User-level settings persisted in `prefs.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preferences {
    pub version: GameVersion,
    pub theme: String,
    pub active_account: usize,
    pub language: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: GameVersion::latest(),
            theme: DEFAULT_THEME.to_string(),
            active_account: 0,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Field-by-field view of whatever is on disk.
#[derive(Deserialize, Default)]
#[serde(default)]
struct StoredPreferences {
    version: Value,
    theme: Value,
    active_account: Value,
    language: Value,
}

impl StoredPreferences {
    /// Keep each field that is valid, reset the rest to its default.
    fn normalize(self) -> Preferences {
        let defaults = Preferences::default();

        let version = self
            .version
            .as_str()
            .and_then(|raw| GameVersion::parse(raw).ok())
            .unwrap_or(defaults.version);
        let theme = self
            .theme
            .as_str()
            .and_then(find_stored_theme)
            .map_or(defaults.theme, |theme| theme.id.to_string());
        let language = match self.language.as_str() {
            Some(code) if language_name(code).is_some() => code.to_string(),
            _ => defaults.language,
        };
        let active_account = self
            .active_account
            .as_u64()
            .and_then(|index| usize::try_from(index).ok())
            .unwrap_or(defaults.active_account);

        Preferences {
            version,
            theme,
            active_account,
            language,
        }
    }
}

/// Reads and writes the preference record.
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The persisted record, or the default when missing or unreadable.
    pub fn load(&self) -> Preferences {
        match storage::read_json::<StoredPreferences>(&self.path) {
            Some(stored) => stored.normalize(),
            None => {
                debug!("Using default preferences");
                Preferences::default()
            }
        }
    }

    pub fn save(&self, prefs: &Preferences) -> LauncherResult<()> {
        storage::write_json_atomic(&self.path, prefs)
    }
}
