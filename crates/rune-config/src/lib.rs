//! Rune configuration system
//!
//! Loads text layout settings from `rune.toml`, with environment variables
//! taking precedence over the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use rune_text::{DEFAULT_SLOW_LAYOUT_THRESHOLD, Dimensions, TextFlags};
use thiserror::Error;

/// Errors raised while reading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RuneConfig {
    /// Text measurement and dp-scaled constants
    pub text: TextConfig,
    /// Layout behavior switches
    pub layout: LayoutConfig,
}

/// Text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextConfig {
    /// Path to a font file (.ttf/.otf); fixed-advance metrics are used without one
    pub font: Option<PathBuf>,
    /// Text size in pixels
    pub text_size: f32,
    /// Display density; every dp constant is multiplied by it
    pub density: f32,
    /// Extra spacing between lines in dp
    pub line_spacing: Option<f32>,
    /// Extra spacing between lines in article mode, in dp
    pub article_line_spacing: Option<f32>,
    /// Padding added to the glyph height to size emoji, in dp
    pub emoji_padding: Option<f32>,
    /// Tolerance around parts for touch hits, in dp
    pub touch_padding: Option<f32>,
    /// Movement that cancels a press, in dp
    pub touch_slop: Option<f32>,
    /// Padding of background and press highlights, in dp
    pub highlight_padding: Option<f32>,
    /// Corner radius of highlight regions, in dp
    pub corner_radius: Option<f32>,
    /// Maximum number of lines before truncation
    pub max_lines: Option<usize>,
    /// Layouts slower than this many milliseconds are logged as warnings
    pub slow_layout_ms: Option<u64>,
}

/// Layout configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub align_center: bool,
    pub all_bold: bool,
    pub article: bool,
    pub no_spacing: bool,
    pub ellipsize_no_fill: bool,
    pub ellipsize_newline: bool,
    pub ignore_continuous_newlines: bool,
    pub ignore_newlines: bool,
    pub all_clickable: bool,
    pub no_clickable: bool,
    pub always_break: bool,
    pub clip_text_area: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font: None,
            text_size: 16.0,
            density: 1.0,
            line_spacing: None,
            article_line_spacing: None,
            emoji_padding: None,
            touch_padding: None,
            touch_slop: None,
            highlight_padding: None,
            corner_radius: None,
            max_lines: None,
            slow_layout_ms: None,
        }
    }
}

impl RuneConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from `rune.toml` in the current directory, or
    /// return the defaults if it is missing or invalid
    pub fn load_or_default() -> Self {
        Self::load_from_file("rune.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Ok(font) = std::env::var("RUNE_TEXT_FONT") {
            self.text.font = Some(PathBuf::from(font));
        }
        if let Some(size) = env_parse::<f32>("RUNE_TEXT_SIZE") {
            self.text.text_size = size;
        }
        if let Some(density) = env_parse::<f32>("RUNE_TEXT_DENSITY") {
            self.text.density = density;
        }
        if let Some(max_lines) = env_parse::<usize>("RUNE_MAX_LINES") {
            self.text.max_lines = Some(max_lines);
        }
        if let Ok(val) = std::env::var("RUNE_IGNORE_NEWLINES") {
            self.layout.ignore_newlines = val == "1" || val.eq_ignore_ascii_case("true");
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from rune.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }

    /// Density-scaled constants, with configured dp values replacing the
    /// defaults.
    pub fn dimensions(&self) -> Dimensions {
        let density = if self.text.density > 0.0 {
            self.text.density
        } else {
            1.0
        };
        let mut dims = Dimensions::from_density(density);
        let text = &self.text;
        let overrides = [
            (text.line_spacing, &mut dims.line_spacing),
            (text.article_line_spacing, &mut dims.article_line_spacing),
            (text.emoji_padding, &mut dims.emoji_padding),
            (text.touch_padding, &mut dims.touch_padding),
            (text.touch_slop, &mut dims.touch_slop),
            (text.highlight_padding, &mut dims.highlight_padding),
            (text.corner_radius, &mut dims.corner_radius),
        ];
        for (value, slot) in overrides {
            if let Some(dp) = value {
                *slot = dp * density;
            }
        }
        dims
    }

    pub fn text_flags(&self) -> TextFlags {
        let l = &self.layout;
        [
            (l.align_center, TextFlags::ALIGN_CENTER),
            (l.all_bold, TextFlags::ALL_BOLD),
            (l.article, TextFlags::ARTICLE),
            (l.no_spacing, TextFlags::NO_SPACING),
            (l.ellipsize_no_fill, TextFlags::ELLIPSIZE_NO_FILL),
            (l.ellipsize_newline, TextFlags::ELLIPSIZE_NEWLINE),
            (l.ignore_continuous_newlines, TextFlags::IGNORE_CONTINUOUS_NEWLINES),
            (l.ignore_newlines, TextFlags::IGNORE_NEWLINES),
            (l.all_clickable, TextFlags::ALL_CLICKABLE),
            (l.no_clickable, TextFlags::NO_CLICKABLE),
            (l.always_break, TextFlags::ALWAYS_BREAK),
            (l.clip_text_area, TextFlags::NEED_CLIP_TEXT_AREA),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        .fold(TextFlags::empty(), |flags, (_, flag)| flags | flag)
    }

    pub fn slow_layout_threshold(&self) -> Duration {
        self.text
            .slow_layout_ms
            .map_or(DEFAULT_SLOW_LAYOUT_THRESHOLD, Duration::from_millis)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = RuneConfig::default();
        assert_eq!(config.text.text_size, 16.0);
        assert_eq!(config.text.density, 1.0);
        assert_eq!(config.text_flags(), TextFlags::empty());
        assert_eq!(config.dimensions(), Dimensions::default());
    }

    #[test]
    fn test_toml_serialization() {
        let mut config = RuneConfig::default();
        config.text.max_lines = Some(3);
        config.layout.all_bold = true;
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: RuneConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[text]\ntext_size = 14.0\ndensity = 2.0\ntouch_slop = 10.0\n\n\
             [layout]\nignore_newlines = true\nalign_center = true"
        )
        .unwrap();

        let config = RuneConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.text.text_size, 14.0);
        assert_eq!(
            config.text_flags(),
            TextFlags::IGNORE_NEWLINES | TextFlags::ALIGN_CENTER
        );
        let dims = config.dimensions();
        assert_eq!(dims.touch_slop, 20.0);
        assert_eq!(dims.line_spacing, 4.0);
    }

    #[test]
    fn test_missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = RuneConfig::load_from_file(dir.path().join("rune.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[text]\ntext_size = \"big\"").unwrap();
        assert!(matches!(
            RuneConfig::load_from_file(&bad),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_slow_layout_threshold() {
        let mut config = RuneConfig::default();
        assert_eq!(config.slow_layout_threshold(), DEFAULT_SLOW_LAYOUT_THRESHOLD);
        config.text.slow_layout_ms = Some(40);
        assert_eq!(config.slow_layout_threshold(), Duration::from_millis(40));
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("RUNE_MAX_LINES", "4");
            std::env::set_var("RUNE_IGNORE_NEWLINES", "true");
            std::env::set_var("RUNE_TEXT_DENSITY", "not-a-number");
        }

        let mut config = RuneConfig::default();
        config.merge_with_env();

        assert_eq!(config.text.max_lines, Some(4));
        assert!(config.layout.ignore_newlines);
        assert_eq!(config.text.density, 1.0);

        unsafe {
            std::env::remove_var("RUNE_MAX_LINES");
            std::env::remove_var("RUNE_IGNORE_NEWLINES");
            std::env::remove_var("RUNE_TEXT_DENSITY");
        }
    }
}
