use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use supports_color::Stream;

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Default configuration template, every option commented with its default value
    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write the default template to `config.toml`. Refuses to overwrite unless `force`.
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }

    /// Load `config.toml` from this directory layered over the defaults.
    pub fn load(&self) -> Result<AppConfig> {
        let config_path = self.config_path("config.toml");
        let mut config = AppConfig::default();
        if config_path.exists() {
            config.merge(read_config_file(&config_path)?);
        }
        config.validate()?;
        Ok(config)
    }
}

fn read_config_file(config_path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(config_path).map_err(|e| {
        eyre!(
            "Failed to read config file at {}: {}",
            config_path.display(),
            e
        )
    })?;

    toml::from_str(&content).map_err(|e| {
        eyre!(
            "Failed to parse config file at {}: {}",
            config_path.display(),
            e
        )
    })
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version
    pub version: String,
    pub loading: LoadingConfig,
    pub display: DisplayConfig,
    pub performance: PerformanceConfig,
    pub chart: ChartConfig,
    pub upload: UploadConfig,
    pub theme: ThemeConfig,
    pub debug: DebugConfig,
    pub logging: LoggingConfig,
}

/// CSV parsing options. Excel cells carry their own types.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LoadingConfig {
    /// Parse ISO-looking CSV text columns as dates. Off by default so date text stays categorical.
    pub try_parse_dates: bool,
    /// Rows used to infer CSV column types. None scans the whole file.
    pub infer_schema_length: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub table_cell_padding: u16,
    pub row_numbers: bool,
    pub max_column_width: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    /// Cap on rows fed to the bar and line charts. None plots every row.
    pub row_limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UploadConfig {
    /// Remember paths entered in the upload prompt (paths only, never file contents)
    pub enable_history: bool,
    pub history_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorConfig {
    pub primary: String,
    pub error: String,
    pub dimmed: String,
    pub background: String,
    pub controls_bg: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub table_header: String,
    pub selector_focused: String,
    pub modal_border_error: String,
    pub chart_series_color_1: String,
    pub chart_series_color_2: String,
    pub chart_series_color_3: String,
    pub chart_series_color_4: String,
    pub chart_series_color_5: String,
    pub chart_series_color_6: String,
    pub chart_series_color_7: String,
    pub heatmap_undefined: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset (e.g. "info", "storeviz=debug")
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            loading: LoadingConfig::default(),
            display: DisplayConfig::default(),
            performance: PerformanceConfig::default(),
            chart: ChartConfig::default(),
            upload: UploadConfig::default(),
            theme: ThemeConfig::default(),
            debug: DebugConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            table_cell_padding: 2,
            row_numbers: false,
            max_column_width: 40,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self { row_limit: None }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            enable_history: true,
            history_limit: 100,
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            primary: "cyan".to_string(),
            error: "red".to_string(),
            dimmed: "dark_gray".to_string(),
            background: "reset".to_string(),
            controls_bg: "indexed(236)".to_string(),
            text_primary: "white".to_string(),
            text_secondary: "dark_gray".to_string(),
            table_header: "cyan".to_string(),
            selector_focused: "yellow".to_string(),
            modal_border_error: "red".to_string(),
            chart_series_color_1: "#636efa".to_string(),
            chart_series_color_2: "#ef553b".to_string(),
            chart_series_color_3: "#00cc96".to_string(),
            chart_series_color_4: "#ab63fa".to_string(),
            chart_series_color_5: "#ffa15a".to_string(),
            chart_series_color_6: "#19d3f3".to_string(),
            chart_series_color_7: "#ff6692".to_string(),
            heatmap_undefined: "dark_gray".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Merge another config into this one (other takes precedence where it differs from defaults)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.loading.merge(other.loading);
        self.display.merge(other.display);
        self.performance.merge(other.performance);
        self.chart.merge(other.chart);
        self.upload.merge(other.upload);
        self.theme.colors.merge(other.theme.colors);
        self.debug.merge(other.debug);
        self.logging.merge(other.logging);
    }

    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        if self.chart.row_limit == Some(0) {
            return Err(eyre!("chart.row_limit must be greater than 0"));
        }

        if self.loading.infer_schema_length == Some(0) {
            return Err(eyre!(
                "loading.infer_schema_length must be greater than 0 (omit it to scan all rows)"
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(eyre!("logging.level must not be empty"));
        }

        let parser = ColorParser::new();
        for (name, value) in self.theme.colors.entries() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }

        Ok(())
    }
}

impl LoadingConfig {
    pub fn merge(&mut self, other: Self) {
        if other.try_parse_dates {
            self.try_parse_dates = true;
        }
        if other.infer_schema_length.is_some() {
            self.infer_schema_length = other.infer_schema_length;
        }
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        if other.table_cell_padding != default.table_cell_padding {
            self.table_cell_padding = other.table_cell_padding;
        }
        if other.row_numbers != default.row_numbers {
            self.row_numbers = other.row_numbers;
        }
        if other.max_column_width != default.max_column_width {
            self.max_column_width = other.max_column_width;
        }
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        if other.event_poll_interval_ms != PerformanceConfig::default().event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl ChartConfig {
    pub fn merge(&mut self, other: Self) {
        if other.row_limit.is_some() {
            self.row_limit = other.row_limit;
        }
    }
}

impl UploadConfig {
    pub fn merge(&mut self, other: Self) {
        let default = UploadConfig::default();
        if other.enable_history != default.enable_history {
            self.enable_history = other.enable_history;
        }
        if other.history_limit != default.history_limit {
            self.history_limit = other.history_limit;
        }
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        if other.enabled {
            self.enabled = true;
        }
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        if other.level != LoggingConfig::default().level {
            self.level = other.level;
        }
    }
}

impl ColorConfig {
    /// Theme key and configured value for every color.
    pub fn entries(&self) -> [(&'static str, &String); 18] {
        [
            ("primary", &self.primary),
            ("error", &self.error),
            ("dimmed", &self.dimmed),
            ("background", &self.background),
            ("controls_bg", &self.controls_bg),
            ("text_primary", &self.text_primary),
            ("text_secondary", &self.text_secondary),
            ("table_header", &self.table_header),
            ("selector_focused", &self.selector_focused),
            ("modal_border_error", &self.modal_border_error),
            ("chart_series_color_1", &self.chart_series_color_1),
            ("chart_series_color_2", &self.chart_series_color_2),
            ("chart_series_color_3", &self.chart_series_color_3),
            ("chart_series_color_4", &self.chart_series_color_4),
            ("chart_series_color_5", &self.chart_series_color_5),
            ("chart_series_color_6", &self.chart_series_color_6),
            ("chart_series_color_7", &self.chart_series_color_7),
            ("heatmap_undefined", &self.heatmap_undefined),
        ]
    }

    fn entries_mut(&mut self) -> [(&'static str, &mut String); 18] {
        [
            ("primary", &mut self.primary),
            ("error", &mut self.error),
            ("dimmed", &mut self.dimmed),
            ("background", &mut self.background),
            ("controls_bg", &mut self.controls_bg),
            ("text_primary", &mut self.text_primary),
            ("text_secondary", &mut self.text_secondary),
            ("table_header", &mut self.table_header),
            ("selector_focused", &mut self.selector_focused),
            ("modal_border_error", &mut self.modal_border_error),
            ("chart_series_color_1", &mut self.chart_series_color_1),
            ("chart_series_color_2", &mut self.chart_series_color_2),
            ("chart_series_color_3", &mut self.chart_series_color_3),
            ("chart_series_color_4", &mut self.chart_series_color_4),
            ("chart_series_color_5", &mut self.chart_series_color_5),
            ("chart_series_color_6", &mut self.chart_series_color_6),
            ("chart_series_color_7", &mut self.chart_series_color_7),
            ("heatmap_undefined", &mut self.heatmap_undefined),
        ]
    }

    pub fn merge(&mut self, other: Self) {
        let default = ColorConfig::default();
        let overrides: HashMap<&'static str, String> = other
            .entries()
            .into_iter()
            .zip(default.entries())
            .filter(|((_, value), (_, default_value))| value != default_value)
            .map(|((name, value), _)| (name, value.clone()))
            .collect();
        for (name, slot) in self.entries_mut() {
            if let Some(value) = overrides.get(name) {
                *slot = value.clone();
            }
        }
    }
}

/// Color parser with terminal capability detection
#[derive(Debug, Clone, Copy)]
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    /// Create a new ColorParser with automatic terminal capability detection
    pub fn new() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        let support = supports_color::on(Stream::Stdout);

        Self {
            supports_true_color: support.as_ref().map(|s| s.has_16m).unwrap_or(false),
            supports_256: support.as_ref().map(|s| s.has_256).unwrap_or(false),
            no_color,
        }
    }

    /// Parse a color string (hex, `indexed(n)` or named) into a terminal color
    pub fn parse(&self, s: &str) -> Result<Color> {
        if self.no_color {
            return Ok(Color::Reset);
        }

        let trimmed = s.trim();

        if trimmed.starts_with('#') && trimmed.len() == 7 {
            let (r, g, b) = parse_hex(trimmed)?;
            return Ok(self.rgb(r, g, b));
        }

        let lower = trimmed.to_lowercase();
        if let Some(num_str) = lower
            .strip_prefix("indexed(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let num = num_str.trim().parse::<u8>().map_err(|_| {
                eyre!(
                    "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                    trimmed
                )
            })?;
            return Ok(Color::Indexed(num));
        }

        match lower.as_str() {
            "black" => Ok(Color::Black),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "magenta" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            "white" => Ok(Color::White),

            "bright_black" | "bright black" => Ok(Color::Indexed(8)),
            "bright_red" | "bright red" => Ok(Color::Indexed(9)),
            "bright_green" | "bright green" => Ok(Color::Indexed(10)),
            "bright_yellow" | "bright yellow" => Ok(Color::Indexed(11)),
            "bright_blue" | "bright blue" => Ok(Color::Indexed(12)),
            "bright_magenta" | "bright magenta" => Ok(Color::Indexed(13)),
            "bright_cyan" | "bright cyan" => Ok(Color::Indexed(14)),
            "bright_white" | "bright white" => Ok(Color::Indexed(15)),

            "gray" | "grey" | "dark_gray" | "dark gray" | "dark_grey" | "dark grey" => {
                Ok(Color::Indexed(8))
            }
            "light_gray" | "light gray" | "light_grey" | "light grey" => Ok(Color::Indexed(7)),

            "reset" | "default" => Ok(Color::Reset),

            _ => Err(eyre!(
                "Unknown color name: '{}'. Supported: basic ANSI colors (red, blue, etc.), \
                 bright variants (bright_red, etc.), indexed(n), or hex colors (#ff0000)",
                trimmed
            )),
        }
    }

    /// Convert RGB values to the richest color the terminal supports.
    /// Used for the heatmap scale, which is computed rather than configured.
    pub fn rgb(&self, r: u8, g: u8, b: u8) -> Color {
        if self.no_color {
            Color::Reset
        } else if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    let component = |range: std::ops::Range<usize>, name: &str| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(|| eyre!("Invalid {} component in hex color: {}", name, s))
    };
    Ok((
        component(1..3, "red")?,
        component(3..5, "green")?,
        component(5..7, "blue")?,
    ))
}

/// Nearest index in the xterm 256-color palette
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 10 {
        // grayscale ramp 232-255
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        return if gray < 8 {
            16
        } else if gray > 247 {
            231
        } else {
            232 + ((gray - 8) * 24 / 240) as u8
        };
    }

    // 6x6x6 color cube 16-231
    let r_idx = (r as u16 * 5 / 255) as u8;
    let g_idx = (g as u16 * 5 / 255) as u8;
    let b_idx = (b as u16 * 5 / 255) as u8;

    16 + 36 * r_idx + 6 * g_idx + b_idx
}

/// Nearest of the 8 basic ANSI colors
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    match (r > 128, g > 128, b > 128) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let mut colors = HashMap::new();
        for (name, value) in config.colors.entries() {
            colors.insert(name.to_string(), parser.parse(value)?);
        }
        Ok(Self { colors })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }

    /// Color for the n-th chart series, cycling through the 7 configured series colors
    pub fn series_color(&self, index: usize) -> Color {
        const SERIES: [&str; 7] = [
            "chart_series_color_1",
            "chart_series_color_2",
            "chart_series_color_3",
            "chart_series_color_4",
            "chart_series_color_5",
            "chart_series_color_6",
            "chart_series_color_7",
        ];
        self.get(SERIES[index % SERIES.len()])
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_merge_keeps_unchanged_fields() {
        let mut base = ColorConfig::default();
        let other = ColorConfig {
            primary: "magenta".to_string(),
            ..ColorConfig::default()
        };
        base.merge(other);
        assert_eq!(base.primary, "magenta");
        assert_eq!(base.error, "red");
    }

    #[test]
    fn test_parse_hex_components() {
        assert_eq!(parse_hex("#ff8000").unwrap(), (255, 128, 0));
        assert!(parse_hex("#gg0000").is_err());
    }

    #[test]
    fn test_series_color_cycles() {
        let theme = Theme {
            colors: HashMap::from([
                ("chart_series_color_1".to_string(), Color::Red),
                ("chart_series_color_2".to_string(), Color::Blue),
            ]),
        };
        assert_eq!(theme.series_color(0), Color::Red);
        assert_eq!(theme.series_color(1), Color::Blue);
        assert_eq!(theme.series_color(7), Color::Red);
    }
}
