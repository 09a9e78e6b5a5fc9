//! Configuration management for the textpad host.
//!
//! Handles:
//! - Command-line argument parsing
//! - The optional TOML settings file
//! - Merging both, with command-line flags taking precedence

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::UNTITLED_NAME;
use crate::session::CloseDecision;

const SETTINGS_FILE: &str = "settings.toml";

/// Whole-text tools selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Transform {
    Upper,
    Lower,
    Invert,
    SortAsc,
    SortDesc,
    Unique,
}

/// Command-line arguments for textpad
#[derive(Debug, Parser)]
#[command(name = "textpad")]
#[command(about = "Open, transform and save text documents")]
#[command(version)]
pub struct Args {
    /// Files to open; a new untitled document is created when none are given
    pub files: Vec<PathBuf>,

    /// Settings file to use instead of the one in the user config directory
    #[arg(long, help = "Path to a settings.toml file")]
    pub config: Option<PathBuf>,

    /// Apply a tool to the whole text of the current document
    #[arg(long, value_enum)]
    pub transform: Option<Transform>,

    /// Print statistics for every open document
    #[arg(long)]
    pub stats: bool,

    /// Print statistics as JSON
    #[arg(long, requires = "stats")]
    pub json: bool,

    /// Save the current document to its own path
    #[arg(long, conflicts_with = "save_as")]
    pub save: bool,

    /// Save the current document to a new path
    #[arg(long, value_name = "PATH")]
    pub save_as: Option<PathBuf>,

    /// What to do with unsaved documents on exit
    #[arg(long, value_enum)]
    pub on_unsaved: Option<CloseDecision>,

    /// Name shown for documents that were never saved
    #[arg(long)]
    pub untitled_name: Option<String>,

    /// Log level for the application
    #[arg(long, help = "Log level (trace, debug, info, warn, error)")]
    pub log_level: Option<String>,
}

/// Contents of the settings file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub untitled_name: Option<String>,
    pub log_level: Option<String>,
    pub on_unsaved: Option<CloseDecision>,
}

impl Settings {
    /// Parse a settings file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Invalid settings file {}", path.display()))
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub untitled_name: String,
    pub log_level: String,
    pub on_unsaved: CloseDecision,
    /// Settings file that was read, if any
    pub settings_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            untitled_name: UNTITLED_NAME.to_string(),
            log_level: "info".to_string(),
            on_unsaved: CloseDecision::Cancel,
            settings_path: None,
        }
    }
}

impl Config {
    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: &Args) -> Result<Self> {
        // An explicit --config must exist; the default location is optional
        let settings_path = match &args.config {
            Some(path) => Some(path.clone()),
            None => default_settings_path().filter(|p| p.is_file()),
        };

        let settings = match &settings_path {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        Ok(Self::merge(args, settings, settings_path))
    }

    fn merge(args: &Args, settings: Settings, settings_path: Option<PathBuf>) -> Self {
        let defaults = Config::default();
        Config {
            untitled_name: args
                .untitled_name
                .clone()
                .or(settings.untitled_name)
                .unwrap_or(defaults.untitled_name),
            log_level: args
                .log_level
                .clone()
                .or(settings.log_level)
                .unwrap_or(defaults.log_level),
            on_unsaved: args
                .on_unsaved
                .or(settings.on_unsaved)
                .unwrap_or(defaults.on_unsaved),
            settings_path,
        }
    }
}

/// `<config dir>/textpad/settings.toml`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("textpad").join(SETTINGS_FILE))
}
