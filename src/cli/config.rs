use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::browser::session::DEFAULT_SERVER_SCRIPT;
use crate::wizard::debug::DebugPolicy;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "nts-harness",
    version,
    about = "Wizard form test harness and product screenshot generator for NTS"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug verbosity (-v up to -vvvvv): 2 prints form data, 3-5 add screenshots
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: nts-harness.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run wizard specs from YAML files
    Run {
        /// Path to a wizard spec YAML file or a directory of them
        #[arg(long)]
        spec: String,

        /// Output format: console, json
        #[arg(long)]
        format: Option<String>,

        /// Write the report to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Directory for debug and failure screenshots
        #[arg(long)]
        screenshot_dir: Option<String>,

        /// Base URL joined onto relative start and navigate URLs
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Generate screenshots of the NTS service
    Screenshots {
        /// Screenshot plan YAML file
        #[arg(long)]
        plan: Option<String>,

        /// Frontend hostname (without scheme)
        #[arg(long)]
        hostname: Option<String>,

        /// Base URL of the fixture admin API
        #[arg(long)]
        fixtures_api: Option<String>,

        /// Parent directory for timestamped screenshot runs
        #[arg(short, long)]
        output_dir: Option<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `nts-harness.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub screenshots: ScreenshotsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_server_script")]
    pub server_script: String,

    pub base_url: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            server_script: default_server_script(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub verbosity: u8,

    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: String,

    #[serde(default = "default_console")]
    pub format: String,

    pub output: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            screenshot_dir: default_screenshot_dir(),
            format: default_console(),
            output: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotsConfig {
    #[serde(default = "default_screenshots_path")]
    pub path: String,

    pub frontend_hostname: Option<String>,

    pub fixtures_api: Option<String>,

    #[serde(default = "default_diary_password")]
    pub diary_password: String,

    pub plan: Option<String>,
}

impl Default for ScreenshotsConfig {
    fn default() -> Self {
        Self {
            path: default_screenshots_path(),
            frontend_hostname: None,
            fixtures_api: None,
            diary_password: default_diary_password(),
            plan: None,
        }
    }
}

// Serde default helpers
fn default_server_script() -> String { DEFAULT_SERVER_SCRIPT.to_string() }
fn default_screenshot_dir() -> String { "var/screenshots".to_string() }
fn default_console() -> String { "console".to_string() }
fn default_screenshots_path() -> String { "var/product-screenshots".to_string() }
fn default_diary_password() -> String { "password".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("nts-harness.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => match serde_yaml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = config_path, error = %e, "ignoring malformed config file");
                AppConfig::default()
            }
        },
        Err(_) => AppConfig::default(),
    }
}

/// Debug verbosity: the `-v` count when given, else the config value, capped at 5.
pub fn resolve_verbosity(cli_verbose: u8, config: &RunConfig) -> u8 {
    let level = if cli_verbose > 0 { cli_verbose } else { config.verbosity };
    level.min(DebugPolicy::MAX_LEVEL)
}
