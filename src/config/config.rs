use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::sort_engine::WeekdayMapping;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub markup: MarkupConfig,
    pub sort: SortConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

/// Where the schedule lives in the markup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// id of the `<table>` element
    pub table_id: String,

    /// id of the `<tbody>` holding the rows
    pub body_id: String,

    /// Row attribute carrying the group key
    pub group_attribute: String,

    /// Header attribute marking a column as sortable
    pub sortable_attribute: String,

    /// Header attribute carrying the semantic column name ("time", "day")
    pub name_attribute: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Give Friday and Saturday their own ordinals in "day" columns.
    /// When false they sort together with unknown values, after Thursday.
    pub full_week: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Colored terminal output
    pub use_color: bool,

    /// Print hidden rows (dimmed) instead of leaving them out
    pub show_hidden_rows: bool,

    /// Leading column with the group key
    pub show_group_column: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is not set
    pub level: String,

    /// Also write logs to a file in the data directory
    pub log_to_file: bool,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            table_id: "schedule".to_string(),
            body_id: "schedule-body".to_string(),
            group_attribute: "data-group".to_string(),
            sortable_attribute: "data-sortable".to_string(),
            name_attribute: "data-name".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_color: true,
            show_hidden_rows: false,
            show_group_column: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: true,
        }
    }
}

impl SortConfig {
    pub fn weekday_mapping(&self) -> WeekdayMapping {
        if self.full_week {
            WeekdayMapping::FullWeek
        } else {
            WeekdayMapping::SundayToThursday
        }
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults
    /// when no file exists
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("course-table").join("config.toml"))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# Course Table Configuration File
# Location: ~/.config/course-table/config.toml (Linux)
#           %APPDATA%\course-table\config.toml (Windows)

[markup]
# id of the schedule <table>; the first table is used when not found
table_id = "schedule"

# id of the <tbody> holding the course rows
body_id = "schedule-body"

# Row attribute naming the course a row belongs to
group_attribute = "data-group"

# Header attribute that makes a column clickable for sorting
sortable_attribute = "data-sortable"

# Header attribute naming the column type ("time" or "day" sort specially)
name_attribute = "data-name"

[sort]
# Give Friday and Saturday their own place after Thursday.
# When false they sort with unknown day values.
full_week = false

[display]
# Colored terminal output
use_color = true

# Print filtered-out rows dimmed instead of hiding them
show_hidden_rows = false

# Show the group key as the first column
show_group_column = true

[logging]
# Log level used when RUST_LOG is not set
level = "info"

# Write logs to ~/.local/share/course-table/logs as well
log_to_file = true
"#
        .to_string()
    }

    /// Initialize config with a setup wizard
    pub fn init_wizard() -> Result<Self> {
        println!("Course Table Configuration Setup");
        println!("================================");

        print!("Does your terminal support colors? (y/n) [y]: ");
        std::io::Write::flush(&mut std::io::stdout())?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        let mut config = Config::default();
        config.display.use_color = !input.trim().eq_ignore_ascii_case("n");

        print!("Do courses meet on Fridays or Saturdays? (y/n) [n]: ");
        std::io::Write::flush(&mut std::io::stdout())?;
        input.clear();
        std::io::stdin().read_line(&mut input)?;
        config.sort.full_week = input.trim().eq_ignore_ascii_case("y");

        config.save()?;

        println!("\nConfiguration saved to: {:?}", Config::get_config_path()?);
        println!("You can edit this file directly to customize further.");

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.markup.table_id, "schedule");
        assert_eq!(config.markup.body_id, "schedule-body");
        assert!(!config.sort.full_week);
        assert_eq!(
            config.sort.weekday_mapping(),
            WeekdayMapping::SundayToThursday
        );
    }

    #[test]
    fn test_commented_template_parses() {
        let config: Config = toml::from_str(&Config::create_default_with_comments()).unwrap();
        assert_eq!(config.markup.group_attribute, "data-group");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[sort]\nfull_week = true\n").unwrap();
        assert_eq!(config.sort.weekday_mapping(), WeekdayMapping::FullWeek);
        assert_eq!(config.markup.name_attribute, "data-name");
        assert!(config.display.use_color);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.markup.body_id, parsed.markup.body_id);
        assert_eq!(config.display.use_color, parsed.display.use_color);
    }
}
