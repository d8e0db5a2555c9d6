use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reporter: ReporterOptions,
    #[serde(default)]
    pub source: SourceConfig,
}

/// Switches for the reporter. Every flag defaults to `false`; keys may be
/// written in snake_case or in the host's camelCase spelling.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReporterOptions {
    #[serde(alias = "suppressBrowserLogs")]
    pub suppress_browser_logs: bool,
    #[serde(alias = "suppressErrorReport")]
    pub suppress_error_report: bool,
    #[serde(alias = "earlyErrorReport")]
    pub early_error_report: bool,
    #[serde(alias = "suppressErrorHighlighting")]
    pub suppress_error_highlighting: bool,
    #[serde(alias = "omitExternalStackFrames")]
    pub omit_external_stack_frames: bool,
    #[serde(alias = "renderOnRunCompleteOnly")]
    pub render_on_run_complete_only: bool,
}

/// Where host events come from when no command is given on the command line.
#[derive(Debug, Default, Deserialize)]
pub struct SourceConfig {
    /// Host command whose stdout carries NDJSON events, split like a shell would.
    /// Example: "npx karma start --single-run"
    pub command: Option<String>,
}

impl Config {
    /// Load `brief.toml` from `dir`, falling back to defaults if absent or invalid.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join("brief.toml");
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config");
                Self::default()
            }
        }
    }
}
