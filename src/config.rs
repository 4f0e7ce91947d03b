use serde::Deserialize;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use log::info;
use std::fs;
use thiserror::Error;
use tiny_skia::Color;

use crate::dataset::{self, Dataset};
use crate::model::{Category, Entry};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_opener")]
    pub opener: String,
    #[serde(default = "default_bar_height")]
    pub bar_height: u32,
}

fn default_opener() -> String { "xdg-open".to_string() }
fn default_bar_height() -> u32 { 48 }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            opener: default_opener(),
            bar_height: default_bar_height(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct CategoryConfig {
    pub name: String,
    /// Built-in glyph name (`globe`, `cube`, `reader`, `magnifier`) or a path
    /// to an image or SVG file.
    pub icon: Option<String>,
    #[serde(default)]
    pub entries: Vec<EntryConfig>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct EntryConfig {
    pub label: String,
    pub link: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ThemeConfig {
    #[serde(default = "default_popover_width")]
    pub popover_width: u32,
    #[serde(default = "default_max_list_height")]
    pub max_list_height: u32,
    #[serde(default = "default_padding")]
    pub padding: f32,
    #[serde(default = "default_row_height")]
    pub row_height: f32,
    #[serde(default = "default_border_radius")]
    pub border_radius: f32,
    #[serde(default = "default_bar_background")]
    pub bar_background: String,
    #[serde(default = "default_backdrop")]
    pub backdrop: String,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_border_color")]
    pub border_color: String,
    #[serde(default = "default_text")]
    pub text: String,
    #[serde(default = "default_muted_text")]
    pub muted_text: String,
    #[serde(default = "default_selection_background")]
    pub selection_background: String,
}

fn default_popover_width() -> u32 { 420 }
fn default_max_list_height() -> u32 { 288 }
fn default_padding() -> f32 { 12.0 }
fn default_row_height() -> f32 { 36.0 }
fn default_border_radius() -> f32 { 8.0 }
fn default_bar_background() -> String { "f8fafcff".to_string() }
fn default_backdrop() -> String { "ffffffcc".to_string() }
fn default_background() -> String { "ffffffff".to_string() }
fn default_border_color() -> String { "d1d5dbff".to_string() }
fn default_text() -> String { "0f172aff".to_string() }
fn default_muted_text() -> String { "64748bff".to_string() }
fn default_selection_background() -> String { "e5e7ebff".to_string() }

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            popover_width: default_popover_width(),
            max_list_height: default_max_list_height(),
            padding: default_padding(),
            row_height: default_row_height(),
            border_radius: default_border_radius(),
            bar_background: default_bar_background(),
            backdrop: default_backdrop(),
            background: default_background(),
            border_color: default_border_color(),
            text: default_text(),
            muted_text: default_muted_text(),
            selection_background: default_selection_background(),
        }
    }
}

impl ThemeConfig {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 8 || !hex.is_ascii() {
            return Color::BLACK;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
        let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
        let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
        let a = u8::from_str_radix(&hex[6..8], 16).unwrap_or(255);

        Color::from_rgba8(r, g, b, a)
    }
}

impl Config {
    /// Dataset declared by the config, or the built-in links when the config
    /// declares no categories.
    pub fn dataset(&self) -> Dataset {
        if self.categories.is_empty() {
            return dataset::builtin();
        }
        Dataset::from_categories(self.categories.iter().map(|c| {
            Category::new(
                c.name.clone(),
                c.entries
                    .iter()
                    .map(|e| Entry::new(e.label.clone(), e.link.clone()))
                    .collect(),
            )
        }))
    }

    /// Category name -> configured icon spec.
    pub fn icon_specs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.categories
            .iter()
            .filter_map(|c| c.icon.as_deref().map(|icon| (c.name.as_str(), icon)))
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "universal-search", "universal-search")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Loads `explicit` if given (it must exist), otherwise the per-user config
/// file if present, otherwise defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                info!("Config: no config file, using defaults");
                return Ok(Config::default());
            }
        },
    };

    let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
        path: config_path.clone(),
        source,
    })?;
    let config = parse_config(&content).map_err(|source| ConfigError::Parse {
        path: config_path.clone(),
        source,
    })?;
    info!(
        "Config: loaded {} categories from {:?}",
        config.categories.len(),
        config_path
    );
    Ok(config)
}

fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[general]
opener = "firefox --new-tab"

[theme]
row_height = 40.0

[[categories]]
name = "Documentation"
icon = "globe"

[[categories.entries]]
label = "Readme"
link = "https://example.org/readme"

[[categories.entries]]
label = "Guide"
link = "https://example.org/guide"

[[categories]]
name = "Links"

[[categories.entries]]
label = "Repo"
link = "https://example.org/repo"
"#;

    #[test]
    fn parses_categories_in_file_order() {
        let config = parse_config(SAMPLE).unwrap();
        let ds = config.dataset();
        let names: Vec<_> = ds.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Documentation", "Links"]);
        assert_eq!(ds.get("Documentation").unwrap().entries[1].label, "Guide");
        assert_eq!(config.general.opener, "firefox --new-tab");
        assert_eq!(config.general.bar_height, 48);
        assert_eq!(config.theme.row_height, 40.0);
        assert_eq!(config.theme.popover_width, 420);
    }

    #[test]
    fn icon_specs_only_lists_configured_icons() {
        let config = parse_config(SAMPLE).unwrap();
        let icons: Vec<_> = config.icon_specs().collect();
        assert_eq!(icons, [("Documentation", "globe")]);
    }

    #[test]
    fn empty_config_falls_back_to_builtin_dataset() {
        let config = parse_config("").unwrap();
        assert_eq!(config.dataset(), dataset::builtin());
        assert_eq!(config.general.opener, "xdg-open");
    }

    #[test]
    fn entry_without_link_is_a_parse_error() {
        let bad = "[[categories]]\nname = \"X\"\n[[categories.entries]]\nlabel = \"y\"\n";
        assert!(parse_config(bad).is_err());
    }

    #[test]
    fn load_reads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.categories.len(), 2);
    }

    #[test]
    fn load_reports_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_config(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"categories = 3").unwrap();
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn parse_color_reads_rgba_hex() {
        let c = ThemeConfig::parse_color("#ff000080");
        assert_eq!(c.red(), 1.0);
        assert_eq!(c.green(), 0.0);
        assert!((c.alpha() - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(ThemeConfig::parse_color("fff"), Color::BLACK);
        assert_eq!(ThemeConfig::parse_color("aéééb"), Color::BLACK);
        assert_eq!(ThemeConfig::parse_color("#ééééff"), Color::BLACK);
    }
}
