use serde::Deserialize;

use super::stats::Stats;

/// A browser instance as described by the host runner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Browser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    /// Counters for the browser's whole run so far, as of its latest spec.
    pub last_result: Stats,
}

/// Hosts disagree on whether browser ids are strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

/// The outcome of a single spec in one browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpecResult {
    pub success: bool,
    pub skipped: bool,
    /// Enclosing suite names, outermost first.
    pub suite: Vec<String>,
    pub description: String,
    pub log: Vec<Option<String>>,
}

impl SpecResult {
    /// Only genuine failures with a known location are worth keeping.
    pub fn is_reportable_failure(&self) -> bool {
        !self.success && !self.skipped && !self.suite.is_empty()
    }

    /// The failure text of the first log entry, if the host sent one.
    pub fn first_log(&self) -> Option<&str> {
        self.log.first().and_then(|entry| entry.as_deref())
    }
}

/// Lifecycle events delivered by the host runner, one at a time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HostEvent {
    RunStart {
        #[serde(default)]
        browsers: Vec<Browser>,
    },
    BrowserStart {
        browser: Browser,
    },
    BrowserError {
        browser: Browser,
        #[serde(default)]
        error: serde_json::Value,
    },
    BrowserLog {
        browser: Browser,
        #[serde(default)]
        log: String,
        #[serde(default)]
        level: Option<String>,
    },
    SpecComplete {
        browser: Browser,
        #[serde(default)]
        result: SpecResult,
    },
    RunComplete,
}
