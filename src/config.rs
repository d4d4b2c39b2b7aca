use std::{net::IpAddr, path::PathBuf, time::Duration};

use crossterm::style::{Color, Stylize};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::lookup::Endpoints;

pub const CONFIG_FILE: &str = "shelfmark.toml";
pub const ENV_PREFIX: &str = "SHELFMARK_";

const COLOR_TEXT: Color = Color::Rgb {
    r: 202,
    g: 211,
    b: 245,
};
const COLOR_DIMMED: Color = Color::Rgb {
    r: 110,
    g: 115,
    b: 141,
};
const COLOR_TITLE: Color = Color::Rgb {
    r: 245,
    g: 169,
    b: 127,
};
const COLOR_AUTHOR: Color = Color::Rgb {
    r: 125,
    g: 196,
    b: 228,
};
const COLOR_RATING: Color = Color::Rgb {
    r: 198,
    g: 160,
    b: 246,
};
const COLOR_READ: Color = Color::Rgb {
    r: 166,
    g: 218,
    b: 149,
};
const COLOR_ERROR: Color = Color::Rgb {
    r: 237,
    g: 135,
    b: 150,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    pub bold:   bool,
    pub italic: bool,
    pub color:  Color,
}

impl StyleConfig {
    pub fn paint(&self, s: impl ToString) -> String {
        let mut s = s.to_string().with(self.color);
        if self.bold {
            s = s.bold();
        }
        if self.italic {
            s = s.italic();
        }
        s.to_string()
    }

    fn colored(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            color:  COLOR_TEXT,
            bold:   false,
            italic: false,
        }
    }
}

/// How the CLI renders books.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub title:   StyleConfig,
    pub author:  StyleConfig,
    pub details: StyleConfig,
    pub rating:  StyleConfig,
    pub read:    StyleConfig,
    pub error:   StyleConfig,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title:   StyleConfig {
                bold: true,
                ..StyleConfig::colored(COLOR_TITLE)
            },
            author:  StyleConfig::colored(COLOR_AUTHOR),
            details: StyleConfig {
                italic: true,
                ..StyleConfig::colored(COLOR_DIMMED)
            },
            rating:  StyleConfig::colored(COLOR_RATING),
            read:    StyleConfig::colored(COLOR_READ),
            error:   StyleConfig {
                bold: true,
                ..StyleConfig::colored(COLOR_ERROR)
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Collection file, `~` is expanded.
    pub data_file:           PathBuf,
    pub lookup_timeout_secs: u64,
    pub open_library_url:    String,
    pub covers_url:          String,
    pub google_books_url:    String,
    pub server_port:         u16,
    /// Falls back to this machine's address on the local network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_address:      Option<IpAddr>,
    pub display:             DisplayConfig,
}

impl Config {
    pub fn default_as_string() -> Result<String, toml::ser::Error> {
        toml::to_string(&Self::default())
    }

    /// Defaults, overridden by `shelfmark.toml`, overridden by `SHELFMARK_*`
    /// environment variables.
    pub fn read_config() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn data_path(&self) -> PathBuf {
        shellexpand::path::tilde(&self.data_file).into_owned()
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    pub fn endpoints(&self) -> Endpoints {
        let trim = |url: &str| url.trim_end_matches('/').to_string();
        Endpoints {
            open_library: trim(&self.open_library_url),
            covers:       trim(&self.covers_url),
            google_books: trim(&self.google_books_url),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let endpoints = Endpoints::default();
        Self {
            data_file:           PathBuf::from("~/.local/share/shelfmark/books.json"),
            lookup_timeout_secs: 8,
            open_library_url:    endpoints.open_library,
            covers_url:          endpoints.covers,
            google_books_url:    endpoints.google_books,
            server_port:         3000,
            server_address:      None,
            display:             DisplayConfig::default(),
        }
    }
}
